//! HRM Console
//!
//! Admin console over the identity directory:
//! - Employee and group listings, creation and deletion
//! - Group assignment per employee, applied by membership reconciliation
//! - Cookie sessions opened by directory primary authentication

pub mod auth_api;
pub mod directory_api;
pub mod error;
pub mod forms;
pub mod membership_api;
pub mod middleware;
pub mod router;
pub mod session;
pub mod views;

pub use error::{ConsoleError, Result};
pub use forms::EntityKind;
pub use middleware::{ConsoleState, SessionLayer, SessionUser};
pub use router::console_router;
pub use session::{SessionClaims, SessionService, SessionSettings};
