//! Authentication route handlers.
//!
//! Every action ends in a redirect to `/`: on success the root page renders
//! the dashboard, on failure the landing view shows the alert named in the
//! `error` query parameter.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{error, warn};

use foodiefinds_core::{NewUser, Role, SessionPhase, User};

use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::manifest::AccessToken;
use crate::middleware::{CurrentSession, set_auth};
use crate::models::AuthSession;
use crate::services::{SessionController, SessionError};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

// =============================================================================
// Helpers
// =============================================================================

/// Phase implied by what the browser session holds.
fn phase_of(auth: Option<&AuthSession>) -> SessionPhase {
    auth.map_or(SessionPhase::Anonymous, |a| {
        SessionPhase::Authenticated(a.user.clone())
    })
}

/// Redirect target for a failed action.
fn failure_redirect(err: &SessionError, signup_mode: bool) -> Redirect {
    let Some(alert) = err.alert() else {
        return Redirect::to("/");
    };
    if signup_mode {
        Redirect::to(&format!("/?mode=signup&error={}", alert.code()))
    } else {
        Redirect::to(&format!("/?error={}", alert.code()))
    }
}

/// Persist a successful login and send the browser to the dashboard.
async fn complete_login(
    session: &tower_sessions::Session,
    token: &AccessToken,
    user: User,
) -> Response {
    set_sentry_user(&user.id, Some(&user.email));
    add_breadcrumb("auth", "Logged in", Some(&[("role", user.role.as_str())][..]));

    if let Err(e) = set_auth(session, &AuthSession::new(token, user)).await {
        error!(error = %e, "Failed to store session");
        return Redirect::to("/?error=login_failed").into_response();
    }
    Redirect::to("/").into_response()
}

async fn login_with(
    state: &AppState,
    current: CurrentSession,
    email: &str,
    password: &SecretString,
) -> Response {
    let mut controller =
        SessionController::resume(state.backend(), phase_of(current.auth.as_ref()));
    match controller.login(email, password).await {
        Ok((token, user)) => complete_login(&current.session, &token, user).await,
        Err(e) => {
            warn!(error = %e, "Login failed");
            failure_redirect(&e, false).into_response()
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    current: CurrentSession,
    Form(form): Form<LoginForm>,
) -> Response {
    let password = SecretString::from(form.password);
    login_with(&state, current, &form.email, &password).await
}

/// Log in with the configured demo chef account.
pub async fn demo(State(state): State<AppState>, current: CurrentSession) -> Response {
    let demo = state.config().demo.clone();
    login_with(&state, current, &demo.email, &demo.password).await
}

/// Handle signup form submission: create the account, then log in.
pub async fn signup(
    State(state): State<AppState>,
    current: CurrentSession,
    Form(form): Form<SignupForm>,
) -> Response {
    let password = SecretString::from(form.password);
    let new_user = NewUser {
        name: form.name,
        email: form.email,
        role: form.role,
    };

    let mut controller =
        SessionController::resume(state.backend(), phase_of(current.auth.as_ref()));
    match controller.signup(&new_user, &password).await {
        Ok((token, user)) => complete_login(&current.session, &token, user).await,
        Err(e) => {
            warn!(error = %e, "Signup failed");
            failure_redirect(&e, true).into_response()
        }
    }
}

/// Log out and return to the landing view.
pub async fn logout(State(state): State<AppState>, current: CurrentSession) -> Response {
    let CurrentSession { session, auth } = current;

    if let Some(auth) = auth {
        let token = auth.access_token();
        let mut controller = SessionController::resume(
            state.backend(),
            SessionPhase::Authenticated(auth.user),
        );
        if let Err(e) = controller.logout(&token).await {
            warn!(error = %e, "Logout rejected");
        }
    }

    // drops the token, the cached user and the restaurant list together
    if let Err(e) = session.flush().await {
        error!(error = %e, "Failed to flush session");
    }
    clear_sentry_user();

    Redirect::to("/").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::BackendError;
    use foodiefinds_core::TransitionError;

    #[test]
    fn test_failure_redirects_carry_alert_code() {
        let login = SessionError::Login(BackendError::Unauthorized);
        let signup = SessionError::Signup(BackendError::Rejected {
            status: 400,
            message: "taken".to_string(),
        });
        let transition = SessionError::Transition(TransitionError::Disconnected);

        let location = |r: Redirect| {
            r.into_response()
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        assert_eq!(location(failure_redirect(&login, false)).as_deref(), Some("/?error=login_failed"));
        assert_eq!(
            location(failure_redirect(&signup, true)).as_deref(),
            Some("/?mode=signup&error=signup_failed")
        );
        assert_eq!(location(failure_redirect(&transition, false)).as_deref(), Some("/"));
    }
}
