//! Session and connectivity controller.
//!
//! Drives a [`SessionPhase`] through one request: the root page bootstraps
//! from `Checking`, the auth actions resume from whatever the browser
//! session says and move to the next phase.

use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use foodiefinds_core::{NewUser, SessionEvent, SessionPhase, TransitionError, User};

use crate::manifest::{AccessToken, BackendApi, BackendError};
use crate::models::Alert;

/// Errors from session actions.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Credentials were not accepted, or the user could not be fetched
    /// afterwards.
    #[error("login failed: {0}")]
    Login(#[source] BackendError),

    /// The account could not be created.
    #[error("signup failed: {0}")]
    Signup(#[source] BackendError),

    /// The action is not possible in the current phase.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl SessionError {
    /// Alert to show the user, if this failure is one they should see.
    #[must_use]
    pub const fn alert(&self) -> Option<Alert> {
        match self {
            Self::Login(_) => Some(Alert::LoginFailed),
            Self::Signup(_) => Some(Alert::SignupFailed),
            Self::Transition(_) => None,
        }
    }
}

/// Outcome of bootstrapping a page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restore {
    /// The reachability probe failed; no session lookup was made.
    Unreachable,
    /// The backend is up but there is no user. `token_rejected` is set when
    /// a stored token was tried and failed, so the caller can drop it.
    NoSession { token_rejected: bool },
    /// The stored token resolved to a user.
    Restored,
}

/// Session controller for one request.
pub struct SessionController<'a> {
    backend: &'a dyn BackendApi,
    phase: SessionPhase,
}

impl<'a> SessionController<'a> {
    /// Start a fresh page load in the `Checking` phase.
    #[must_use]
    pub fn new(backend: &'a dyn BackendApi) -> Self {
        Self::resume(backend, SessionPhase::Checking)
    }

    /// Continue from a phase recovered from the browser session.
    #[must_use]
    pub const fn resume(backend: &'a dyn BackendApi, phase: SessionPhase) -> Self {
        Self { backend, phase }
    }

    #[must_use]
    pub const fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    #[must_use]
    pub fn into_phase(self) -> SessionPhase {
        self.phase
    }

    fn apply(&mut self, event: SessionEvent) -> Result<(), TransitionError> {
        let current = std::mem::take(&mut self.phase);
        match current.clone().apply(event) {
            Ok(next) => {
                self.phase = next;
                Ok(())
            }
            Err(err) => {
                self.phase = current;
                Err(err)
            }
        }
    }

    /// Probe the backend and restore the stored session, if any.
    ///
    /// Only transport failures lead to `Unreachable`, whether of the probe
    /// or of the user lookup; the health status code is not checked. Any
    /// other lookup failure leaves the user anonymous and marks the stored
    /// token as rejected.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Transition` when called outside `Checking`.
    #[instrument(skip_all, fields(has_token = token.is_some()))]
    pub async fn bootstrap(&mut self, token: Option<&AccessToken>) -> Result<Restore, SessionError> {
        if self.phase != SessionPhase::Checking {
            return Err(TransitionError::Invalid {
                phase: "settled",
                event: "bootstrap",
            }
            .into());
        }

        if let Err(e) = self.backend.probe_health().await {
            warn!(error = %e, "Backend unreachable");
            self.apply(SessionEvent::BackendUnreachable)?;
            return Ok(Restore::Unreachable);
        }

        let Some(token) = token else {
            self.apply(SessionEvent::NoSession)?;
            return Ok(Restore::NoSession {
                token_rejected: false,
            });
        };

        match self.backend.current_user(token).await {
            Ok(user) => {
                debug!(user_id = %user.id, "Session restored");
                self.apply(SessionEvent::SessionRestored(user))?;
                Ok(Restore::Restored)
            }
            Err(e) if e.is_unreachable() => {
                warn!(error = %e, "Backend unreachable during session lookup");
                self.apply(SessionEvent::BackendUnreachable)?;
                Ok(Restore::Unreachable)
            }
            Err(e) => {
                debug!(error = %e, "Stored session not usable");
                self.apply(SessionEvent::NoSession)?;
                Ok(Restore::NoSession {
                    token_rejected: true,
                })
            }
        }
    }

    fn ensure_anonymous(&self) -> Result<(), TransitionError> {
        match self.phase {
            SessionPhase::Anonymous => Ok(()),
            SessionPhase::Disconnected => Err(TransitionError::Disconnected),
            SessionPhase::Checking => Err(TransitionError::Invalid {
                phase: "checking",
                event: "logged_in",
            }),
            SessionPhase::Authenticated(_) => Err(TransitionError::Invalid {
                phase: "authenticated",
                event: "logged_in",
            }),
        }
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Login` if the backend refuses the credentials
    /// or the user cannot be fetched with the new token, and
    /// `SessionError::Transition` unless the phase is `Anonymous`.
    #[instrument(skip(self, password))]
    pub async fn login(
        &mut self,
        email: &str,
        password: &SecretString,
    ) -> Result<(AccessToken, User), SessionError> {
        self.ensure_anonymous()?;

        let token = self
            .backend
            .login(email, password)
            .await
            .map_err(SessionError::Login)?;
        let user = self
            .backend
            .current_user(&token)
            .await
            .map_err(SessionError::Login)?;

        self.apply(SessionEvent::LoggedIn(user.clone()))?;
        info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok((token, user))
    }

    /// Create an account, then log in with the same credentials.
    ///
    /// The token returned by signup itself is not used. If the follow-up
    /// login fails the account still exists.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Signup` if the account cannot be created and
    /// `SessionError::Login` if the follow-up login fails.
    #[instrument(skip(self, user, password), fields(email = %user.email, role = %user.role))]
    pub async fn signup(
        &mut self,
        user: &NewUser,
        password: &SecretString,
    ) -> Result<(AccessToken, User), SessionError> {
        self.ensure_anonymous()?;

        self.backend
            .signup(user, password)
            .await
            .map_err(SessionError::Signup)?;
        info!("Account created");

        self.login(&user.email, password).await
    }

    /// Log out.
    ///
    /// The local session ends even if the backend call fails.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Transition` unless the phase is
    /// `Authenticated`.
    #[instrument(skip_all)]
    pub async fn logout(&mut self, token: &AccessToken) -> Result<(), SessionError> {
        if self.phase.user().is_none() {
            return Err(TransitionError::Invalid {
                phase: "anonymous",
                event: "logged_out",
            }
            .into());
        }

        if let Err(e) = self.backend.logout(token).await {
            warn!(error = %e, "Backend logout failed; ending local session anyway");
        }
        self.apply(SessionEvent::LoggedOut)?;
        info!("User logged out");
        Ok(())
    }
}
