//! Session and connectivity state.
//!
//! A page load starts in [`SessionPhase::Checking`]. The reachability probe
//! and the session lookup move it to exactly one of `Disconnected`,
//! `Anonymous` or `Authenticated`. After that only login and logout move it,
//! and `Disconnected` never moves again.

use serde::{Deserialize, Serialize};

use super::User;

/// Where a browser is in the connect/login lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Checking,
    Disconnected,
    Anonymous,
    Authenticated(User),
}

/// Something that happened to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The reachability probe failed at the transport level.
    BackendUnreachable,
    /// The backend answered but there is no usable session.
    NoSession,
    /// The backend answered and the stored session resolved to a user.
    SessionRestored(User),
    /// Credentials were accepted (directly or right after signup).
    LoggedIn(User),
    /// The user logged out.
    LoggedOut,
}

/// Indicator shown in the corner of every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
        }
    }

    /// CSS modifier for the indicator dot.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Connecting => "status-connecting",
            Self::Connected => "status-connected",
            Self::Disconnected => "status-disconnected",
        }
    }
}

/// A transition that the lifecycle does not allow.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("backend is disconnected; no further transitions until reload")]
    Disconnected,
    #[error("cannot apply {event} while {phase}")]
    Invalid {
        phase: &'static str,
        event: &'static str,
    },
}

impl SessionPhase {
    /// Apply an event, returning the next phase.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Disconnected`] for any event once
    /// disconnected, and [`TransitionError::Invalid`] for events that make
    /// no sense in the current phase (for example logging out while
    /// anonymous).
    pub fn apply(self, event: SessionEvent) -> Result<Self, TransitionError> {
        match (self, event) {
            (Self::Disconnected, _) => Err(TransitionError::Disconnected),
            (Self::Checking, SessionEvent::BackendUnreachable) => Ok(Self::Disconnected),
            (Self::Checking, SessionEvent::NoSession) => Ok(Self::Anonymous),
            (Self::Checking, SessionEvent::SessionRestored(user))
            | (Self::Anonymous, SessionEvent::LoggedIn(user)) => Ok(Self::Authenticated(user)),
            (Self::Authenticated(_), SessionEvent::LoggedOut) => Ok(Self::Anonymous),
            (phase, event) => Err(TransitionError::Invalid {
                phase: phase.name(),
                event: event.name(),
            }),
        }
    }

    /// Indicator state for this phase.
    #[must_use]
    pub const fn connection(&self) -> ConnectionStatus {
        match self {
            Self::Checking => ConnectionStatus::Connecting,
            Self::Disconnected => ConnectionStatus::Disconnected,
            Self::Anonymous | Self::Authenticated(_) => ConnectionStatus::Connected,
        }
    }

    /// The logged-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    const fn name(&self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Disconnected => "disconnected",
            Self::Anonymous => "anonymous",
            Self::Authenticated(_) => "authenticated",
        }
    }
}

impl SessionEvent {
    const fn name(&self) -> &'static str {
        match self {
            Self::BackendUnreachable => "backend-unreachable",
            Self::NoSession => "no-session",
            Self::SessionRestored(_) => "session-restored",
            Self::LoggedIn(_) => "logged-in",
            Self::LoggedOut => "logged-out",
        }
    }
}
