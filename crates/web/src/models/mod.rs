//! Request- and session-scoped models for the web UI.
//!
//! - [`session`] - What is kept in the browser session between requests
//! - [`alert`] - Blocking alerts shown after a failed action
//! - [`restaurant_form`] - The chef's create/edit form
//! - [`upload`] - A selected cover photo awaiting submission

pub mod alert;
pub mod restaurant_form;
pub mod session;
pub mod upload;

pub use alert::Alert;
pub use restaurant_form::{FormMode, RestaurantForm};
pub use session::{AuthSession, session_keys};
pub use upload::{PendingUpload, UploadError};
