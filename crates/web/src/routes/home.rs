//! Root page: the session/connectivity controller's entry point.
//!
//! Every load probes the backend, restores the stored session if there is
//! one, and renders exactly one of the disconnected page, the landing view
//! or the dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use foodiefinds_core::{ConnectionStatus, SessionPhase, User};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CurrentSession, clear_auth};
use crate::models::{Alert, AuthSession, RestaurantForm, session_keys};
use crate::routes::restaurants::FormView;
use crate::services::{Restore, SessionController};
use crate::state::AppState;

/// Query parameters of the root page.
#[derive(Debug, Default, Deserialize)]
pub struct RootQuery {
    /// `signup` switches the landing view to the signup form.
    pub mode: Option<String>,
    /// Alert code from a failed action.
    pub error: Option<String>,
}

impl RootQuery {
    fn signup(&self) -> bool {
        self.mode.as_deref() == Some("signup")
    }

    fn alert(&self) -> Option<Alert> {
        self.error.as_deref().and_then(Alert::from_code)
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Shown when the backend could not be reached.
#[derive(Template, WebTemplate)]
#[template(path = "disconnected.html")]
pub struct DisconnectedTemplate {
    pub status: ConnectionStatus,
    pub alert: Option<Alert>,
    pub backend_url: String,
}

/// Login/signup page.
#[derive(Template, WebTemplate)]
#[template(path = "landing.html")]
pub struct LandingTemplate {
    pub status: ConnectionStatus,
    pub alert: Option<Alert>,
    pub signup: bool,
    pub admin_url: String,
}

/// Dashboard shell; the grid loads as a fragment.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub status: ConnectionStatus,
    pub alert: Option<Alert>,
    pub user: User,
    pub form: FormView,
    pub form_alert: Option<Alert>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Render the page for whatever phase the session bootstraps into.
#[instrument(skip_all, fields(has_session = current.auth.is_some()))]
pub async fn root(
    State(state): State<AppState>,
    current: CurrentSession,
    Query(query): Query<RootQuery>,
) -> Result<Response> {
    let CurrentSession { session, auth } = current;
    let token = auth.as_ref().map(AuthSession::access_token);

    let mut controller = SessionController::new(state.backend());
    let outcome = controller
        .bootstrap(token.as_ref())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let status = controller.phase().connection();
    let alert = query.alert();

    let response = match (outcome, controller.into_phase(), token) {
        (Restore::Unreachable, _, _) => DisconnectedTemplate {
            status,
            alert: None,
            backend_url: state.config().backend.base_url.clone(),
        }
        .into_response(),
        (Restore::Restored, SessionPhase::Authenticated(user), Some(token)) => {
            // keep the cached copy in step with the backend
            session
                .insert(session_keys::AUTH, AuthSession::new(&token, user.clone()))
                .await?;
            DashboardTemplate {
                status,
                alert,
                user,
                form: FormView::from_form(&RestaurantForm::new()),
                form_alert: None,
            }
            .into_response()
        }
        (outcome, _, _) => {
            if matches!(outcome, Restore::NoSession { token_rejected: true }) {
                tracing::info!("Dropping stored session the backend no longer accepts");
                clear_auth(&session).await?;
            }
            LandingTemplate {
                status,
                alert,
                signup: query.signup(),
                admin_url: state.config().backend.admin_url(),
            }
            .into_response()
        }
    };

    Ok(response)
}
