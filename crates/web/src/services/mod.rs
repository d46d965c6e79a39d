//! Business logic services for the web UI.
//!
//! Services borrow the backend client for the length of one request and
//! hold no state of their own beyond what the caller hands them.
//!
//! - [`session`] - Connectivity check, session restore, login/signup/logout
//! - [`dashboard`] - Restaurant listing, create/update with cover photo, delete

pub mod dashboard;
pub mod session;

pub use dashboard::{Confirmation, DashboardError, DashboardService, DeleteOutcome};
pub use session::{Restore, SessionController, SessionError};
