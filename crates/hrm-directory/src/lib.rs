//! HRM Directory
//!
//! Identity directory access for the admin console:
//! - [`DirectoryClient`] trait over users, groups and memberships
//! - [`OktaClient`] backed by the Okta management API
//! - [`InMemoryDirectory`] for development mode and tests
//! - Group membership reconciliation ([`membership::reconcile`])

pub mod client;
pub mod error;
pub mod membership;
pub mod memory;
pub mod model;
pub mod okta;

pub use client::DirectoryClient;
pub use error::{DirectoryError, Result};
pub use membership::{
    reconcile, Direction, MembershipDiff, MembershipStore, MutationFailure, ReconcileError,
    ReconcileReport,
};
pub use memory::{InMemoryDirectory, Mutation};
pub use model::{DirectoryGroup, DirectoryUser, GroupMember, NewGroup, NewUser};
pub use okta::{OktaClient, OktaConfig};
