//! Group Membership Reconciliation
//!
//! Brings a principal's group memberships in line with a desired set:
//!
//! 1. Read the current memberships fresh from the store
//! 2. `to_add = desired - current`, `to_remove = current - desired`
//! 3. Apply each add, then each remove, one call at a time
//!
//! A failed read aborts before anything is written. A failed add or remove
//! is logged and recorded in the report; the remaining operations still
//! run. There is no rollback, so a partial failure leaves a mix of applied
//! and unapplied changes. Concurrent reconciliations of the same principal
//! are not serialized.

use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::DirectoryClient;
use crate::error::DirectoryError;

/// The three capabilities reconciliation needs from a directory.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Current group ids of `principal`
    async fn current_groups(&self, principal: &str) -> Result<HashSet<String>, DirectoryError>;

    /// Idempotent add
    async fn add(&self, principal: &str, group: &str) -> Result<(), DirectoryError>;

    /// Idempotent remove
    async fn remove(&self, principal: &str, group: &str) -> Result<(), DirectoryError>;
}

#[async_trait]
impl<T> MembershipStore for T
where
    T: DirectoryClient + ?Sized,
{
    async fn current_groups(&self, principal: &str) -> Result<HashSet<String>, DirectoryError> {
        Ok(self
            .groups_for_user(principal)
            .await?
            .into_iter()
            .map(|g| g.id)
            .collect())
    }

    async fn add(&self, principal: &str, group: &str) -> Result<(), DirectoryError> {
        self.add_member(principal, group).await
    }

    async fn remove(&self, principal: &str, group: &str) -> Result<(), DirectoryError> {
        self.remove_member(principal, group).await
    }
}

/// Set difference between desired and current memberships.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDiff {
    pub to_add: HashSet<String>,
    pub to_remove: HashSet<String>,
}

impl MembershipDiff {
    pub fn between(desired: &HashSet<String>, current: &HashSet<String>) -> Self {
        Self {
            to_add: desired.difference(current).cloned().collect(),
            to_remove: current.difference(desired).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Number of mutations the diff calls for
    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_remove.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Add,
    Remove,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Add => f.write_str("add"),
            Direction::Remove => f.write_str("remove"),
        }
    }
}

/// A single add or remove that the store rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationFailure {
    pub group: String,
    pub direction: Direction,
    pub message: String,
}

/// Outcome of a reconciliation that got past the lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub failed: Vec<MutationFailure>,
}

impl ReconcileReport {
    /// True when every planned mutation succeeded
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total store calls issued
    pub fn attempted(&self) -> usize {
        self.added.len() + self.removed.len() + self.failed.len()
    }
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Principal id must not be empty")]
    EmptyPrincipal,

    #[error("Failed to read memberships of {principal}: {source}")]
    Lookup {
        principal: String,
        #[source]
        source: DirectoryError,
    },
}

/// Make `principal`'s memberships equal `desired`.
pub async fn reconcile<S>(
    store: &S,
    principal: &str,
    desired: &HashSet<String>,
) -> Result<ReconcileReport, ReconcileError>
where
    S: MembershipStore + ?Sized,
{
    if principal.is_empty() {
        return Err(ReconcileError::EmptyPrincipal);
    }

    let current = store
        .current_groups(principal)
        .await
        .map_err(|source| ReconcileError::Lookup {
            principal: principal.to_string(),
            source,
        })?;

    let diff = MembershipDiff::between(desired, &current);
    if diff.is_empty() {
        debug!(principal = %principal, groups = current.len(), "Memberships already up to date");
        return Ok(ReconcileReport::default());
    }

    debug!(
        principal = %principal,
        to_add = diff.to_add.len(),
        to_remove = diff.to_remove.len(),
        "Applying membership diff"
    );

    let mut report = ReconcileReport::default();

    for group in &diff.to_add {
        match store.add(principal, group).await {
            Ok(()) => report.added.push(group.clone()),
            Err(e) => {
                warn!(principal = %principal, group = %group, error = %e, "Failed to add membership");
                report.failed.push(MutationFailure {
                    group: group.clone(),
                    direction: Direction::Add,
                    message: e.to_string(),
                });
            }
        }
    }

    for group in &diff.to_remove {
        match store.remove(principal, group).await {
            Ok(()) => report.removed.push(group.clone()),
            Err(e) => {
                warn!(principal = %principal, group = %group, error = %e, "Failed to remove membership");
                report.failed.push(MutationFailure {
                    group: group.clone(),
                    direction: Direction::Remove,
                    message: e.to_string(),
                });
            }
        }
    }

    info!(
        principal = %principal,
        added = report.added.len(),
        removed = report.removed.len(),
        failed = report.failed.len(),
        "Membership reconciliation finished"
    );

    Ok(report)
}
