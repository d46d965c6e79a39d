//! Blocking alerts.
//!
//! A failed action redirects or re-renders with an alert code; the page then
//! shows the matching message in a modal dialog.

/// An alert shown after a failed user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alert {
    LoginFailed,
    SignupFailed,
    SaveFailed,
    DeleteFailed,
}

impl Alert {
    /// Code carried in the `error` query parameter.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::LoginFailed => "login_failed",
            Self::SignupFailed => "signup_failed",
            Self::SaveFailed => "save_failed",
            Self::DeleteFailed => "delete_failed",
        }
    }

    /// Parse a code from the query string; unknown codes show nothing.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        [
            Self::LoginFailed,
            Self::SignupFailed,
            Self::SaveFailed,
            Self::DeleteFailed,
        ]
        .into_iter()
        .find(|a| a.code() == code)
    }

    /// Text of the dialog.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::LoginFailed => "Login failed. Please check your credentials.",
            Self::SignupFailed => "Signup failed. The email might already be in use.",
            Self::SaveFailed => "Error saving restaurant.",
            Self::DeleteFailed => "Could not delete restaurant.",
        }
    }
}
