//! Authentication extractors and session helpers.

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use foodiefinds_core::RestaurantList;

use crate::models::{AuthSession, session_keys};

/// Header HTMX sets on every request it issues.
pub const HX_REQUEST: &str = "hx-request";

/// Header telling HTMX to do a full-page navigation.
const HX_REDIRECT: &str = "hx-redirect";

/// Extractor that requires a logged-in user.
///
/// Page requests without one are redirected to `/`; HTMX requests get a
/// `401` with `HX-Redirect: /` so the whole page navigates instead of a
/// fragment being swapped.
///
/// ```rust,ignore
/// async fn handler(RequireAuth(auth): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", auth.user.name)
/// }
/// ```
pub struct RequireAuth(pub AuthSession);

/// Rejection for [`RequireAuth`].
pub enum AuthRejection {
    /// Redirect to the root page (for page requests).
    RedirectToRoot,
    /// 401 with an HTMX redirect (for fragment requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToRoot => Redirect::to("/").into_response(),
            Self::Unauthorized => {
                let mut response = StatusCode::UNAUTHORIZED.into_response();
                response
                    .headers_mut()
                    .insert(HX_REDIRECT, HeaderValue::from_static("/"));
                response
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let is_htmx = parts.headers.contains_key(HX_REQUEST);
        let rejection = || {
            if is_htmx {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToRoot
            }
        };

        let session = parts.extensions.get::<Session>().ok_or_else(rejection)?;
        let auth: AuthSession = session
            .get(session_keys::AUTH)
            .await
            .ok()
            .flatten()
            .ok_or_else(rejection)?;

        Ok(Self(auth))
    }
}

/// Extractor for the browser session together with any stored auth.
///
/// Never rejects; the root page decides what to render from it.
pub struct CurrentSession {
    pub session: Session,
    pub auth: Option<AuthSession>,
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts.extensions.get::<Session>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Session layer missing",
        ))?;
        let auth = session
            .get::<AuthSession>(session_keys::AUTH)
            .await
            .ok()
            .flatten();

        Ok(Self { session, auth })
    }
}

/// Store the logged-in user and token.
///
/// Cycles the session ID first so a pre-login cookie cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_auth(
    session: &Session,
    auth: &AuthSession,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::AUTH, auth).await
}

/// Forget the logged-in user, the token and the restaurant list.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_auth(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<AuthSession>(session_keys::AUTH).await?;
    session
        .remove::<RestaurantList>(session_keys::RESTAURANTS)
        .await?;
    Ok(())
}

/// The restaurant list as last fetched and patched, if any.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn load_restaurants(
    session: &Session,
) -> Result<Option<RestaurantList>, tower_sessions::session::Error> {
    session.get(session_keys::RESTAURANTS).await
}

/// Replace the stored restaurant list.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn store_restaurants(
    session: &Session,
    list: &RestaurantList,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::RESTAURANTS, list).await
}
