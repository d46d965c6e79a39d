//! Restaurant dashboard route handlers.
//!
//! HTMX requests get fragments back; plain form posts are redirected to `/`
//! with an alert code on failure, so the pages work without JavaScript.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Path, State, multipart::Field},
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use foodiefinds_core::{
    ConnectionStatus, Cuisine, Restaurant, RestaurantId, RestaurantList, User,
};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::manifest::AccessToken;
use crate::middleware::{RequireAuth, load_restaurants, store_restaurants};
use crate::models::{Alert, AuthSession, FormMode, PendingUpload, RestaurantForm, UploadError};
use crate::routes::is_htmx;
use crate::services::{Confirmation, DashboardService, DeleteOutcome};
use crate::state::AppState;

/// Multipart field carrying the cover photo.
const COVER_PHOTO_FIELD: &str = "coverPhoto";

/// Event HTMX fires when a picked file was not an image.
const UPLOAD_REJECTED_EVENT: &str = "upload-rejected";

// =============================================================================
// View Models
// =============================================================================

/// One restaurant card in the grid.
#[derive(Debug, Clone)]
pub struct RestaurantCard {
    pub id: String,
    pub name: String,
    pub owner_name: String,
    pub cuisine: &'static str,
    pub description: String,
    pub image_url: String,
    /// Edit/delete controls are shown only to the owner.
    pub can_manage: bool,
}

impl RestaurantCard {
    #[must_use]
    pub fn new(restaurant: &Restaurant, viewer: &User) -> Self {
        Self {
            id: restaurant.id.to_string(),
            name: restaurant.name.clone(),
            owner_name: restaurant.owner_name().to_string(),
            cuisine: restaurant.cuisine.as_str(),
            description: restaurant.description.clone(),
            image_url: restaurant.card_image_url().to_string(),
            can_manage: viewer.owns(restaurant.owner_id.as_ref()),
        }
    }

    fn all(list: &RestaurantList, viewer: &User) -> Vec<Self> {
        list.iter().map(|r| Self::new(r, viewer)).collect()
    }
}

/// A cuisine choice on the form.
#[derive(Debug, Clone)]
pub struct CuisineOption {
    pub value: &'static str,
    pub selected: bool,
}

/// Form values as rendered.
#[derive(Debug, Clone)]
pub struct FormView {
    pub name: String,
    pub description: String,
    pub cuisines: Vec<CuisineOption>,
    pub preview: Option<String>,
    pub editing: bool,
}

impl FormView {
    #[must_use]
    pub fn from_form(form: &RestaurantForm) -> Self {
        Self {
            name: form.name.clone(),
            description: form.description.clone(),
            cuisines: Cuisine::ALL
                .into_iter()
                .map(|c| CuisineOption {
                    value: c.as_str(),
                    selected: c == form.cuisine,
                })
                .collect(),
            preview: form.preview().map(str::to_string),
            editing: matches!(form.mode(), FormMode::Edit(_)),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// The restaurant grid fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/restaurant_grid.html")]
pub struct RestaurantGridTemplate {
    pub cards: Vec<RestaurantCard>,
    pub chef: bool,
    pub oob: bool,
    pub grid_alert: Option<Alert>,
}

/// The create form fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/restaurant_form.html")]
pub struct RestaurantFormTemplate {
    pub form: FormView,
    pub form_alert: Option<Alert>,
}

/// Response to a successful save: a fresh form plus the patched grid,
/// swapped out of band.
#[derive(Template, WebTemplate)]
#[template(path = "restaurants/saved.html")]
pub struct RestaurantSavedTemplate {
    pub form: FormView,
    pub form_alert: Option<Alert>,
    pub cards: Vec<RestaurantCard>,
    pub chef: bool,
    pub oob: bool,
    pub grid_alert: Option<Alert>,
}

/// Cover photo preview fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/image_preview.html")]
pub struct ImagePreviewTemplate {
    pub preview: Option<String>,
    pub rejected: bool,
}

/// Delete confirmation page, for browsers without JavaScript.
#[derive(Template, WebTemplate)]
#[template(path = "restaurants/confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub status: ConnectionStatus,
    pub alert: Option<Alert>,
    pub id: String,
    pub name: String,
}

/// Delete form data.
#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub confirmed: bool,
}

// =============================================================================
// Helpers
// =============================================================================

fn service<'a>(state: &'a AppState, token: &'a AccessToken) -> DashboardService<'a> {
    DashboardService::new(
        state.backend(),
        token,
        state.config().backend.restaurants_per_page,
    )
}

fn grid_template(
    list: &RestaurantList,
    auth: &AuthSession,
    grid_alert: Option<Alert>,
) -> RestaurantGridTemplate {
    RestaurantGridTemplate {
        cards: RestaurantCard::all(list, &auth.user),
        chef: auth.user.is_chef(),
        oob: false,
        grid_alert,
    }
}

fn bad_request(err: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(err.to_string())
}

/// Read an uploaded file part.
async fn read_upload(
    field: Field<'_>,
) -> Result<std::result::Result<Option<PendingUpload>, UploadError>> {
    let file_name = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(bad_request)?;
    Ok(PendingUpload::from_part(
        file_name.as_deref(),
        content_type.as_deref(),
        bytes.to_vec(),
    ))
}

/// Build the form from a multipart submission.
///
/// A file that is not an image is dropped and the rest of the form kept.
async fn read_form(mut multipart: Multipart) -> Result<RestaurantForm> {
    let mut form = RestaurantForm::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => form.name = field.text().await.map_err(bad_request)?,
            "description" => form.description = field.text().await.map_err(bad_request)?,
            "cuisine" => {
                form.cuisine = field
                    .text()
                    .await
                    .map_err(bad_request)?
                    .parse::<Cuisine>()
                    .map_err(bad_request)?;
            }
            COVER_PHOTO_FIELD => {
                if let Err(e) = form.set_image(read_upload(field).await?) {
                    warn!(error = %e, "Ignoring non-image cover photo");
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// The list this browser is looking at, falling back to a fresh fetch.
async fn current_list(
    state: &AppState,
    auth: &AuthSession,
    session: &Session,
) -> Result<RestaurantList> {
    if let Some(list) = load_restaurants(session).await? {
        return Ok(list);
    }
    let token = auth.access_token();
    Ok(service(state, &token).load().await.unwrap_or_default())
}

// =============================================================================
// Handlers
// =============================================================================

/// Fetch the full listing and render the grid.
///
/// A failed fetch is logged and renders an empty grid.
#[instrument(skip_all)]
pub async fn grid(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    session: Session,
) -> Result<RestaurantGridTemplate> {
    let token = auth.access_token();
    let list = service(&state, &token).load().await.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to fetch restaurants");
        RestaurantList::default()
    });
    store_restaurants(&session, &list).await?;

    Ok(grid_template(&list, &auth, None))
}

/// Create a restaurant from the form.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    session: Session,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response> {
    let mut form = read_form(multipart).await?;
    let mut list = current_list(&state, &auth, &session).await?;
    let token = auth.access_token();

    match service(&state, &token).save(&mut list, &mut form).await {
        Ok(kind) => {
            store_restaurants(&session, &list).await?;
            add_breadcrumb("restaurants", &format!("Restaurant {kind:?}"), None);

            if !is_htmx(&headers) {
                return Ok(Redirect::to("/").into_response());
            }
            Ok(RestaurantSavedTemplate {
                form: FormView::from_form(&form),
                form_alert: None,
                cards: RestaurantCard::all(&list, &auth.user),
                chef: auth.user.is_chef(),
                oob: true,
                grid_alert: None,
            }
            .into_response())
        }
        Err(e) => {
            let alert = e.alert();
            if !is_htmx(&headers) {
                let target = alert.map_or_else(|| "/".to_string(), |a| format!("/?error={}", a.code()));
                return Ok(Redirect::to(&target).into_response());
            }
            // the file input cannot be refilled, so do not show a preview
            // for a file that will not be resubmitted
            form.clear_image();
            Ok(RestaurantFormTemplate {
                form: FormView::from_form(&form),
                form_alert: alert,
            }
            .into_response())
        }
    }
}

/// Render a preview for a picked file.
///
/// Anything that is not an image clears the preview and fires
/// `upload-rejected` so the page can reset the file input.
#[instrument(skip_all)]
pub async fn preview(RequireAuth(_): RequireAuth, mut multipart: Multipart) -> Result<Response> {
    let mut form = RestaurantForm::new();
    let mut rejected = false;

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        if field.name() == Some(COVER_PHOTO_FIELD) {
            rejected = form.set_image(read_upload(field).await?).is_err();
        }
    }

    let fragment = ImagePreviewTemplate {
        preview: form.preview().map(str::to_string),
        rejected,
    };
    if rejected {
        return Ok((AppendHeaders([("HX-Trigger", UPLOAD_REJECTED_EVENT)]), fragment).into_response());
    }
    Ok(fragment.into_response())
}

/// Empty preview, after the user clears the selection.
pub async fn clear_preview(RequireAuth(_): RequireAuth) -> ImagePreviewTemplate {
    ImagePreviewTemplate {
        preview: None,
        rejected: false,
    }
}

/// Ask for confirmation before deleting.
pub async fn confirm_delete(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    session: Session,
    Path(id): Path<String>,
) -> Result<ConfirmDeleteTemplate> {
    let id = RestaurantId::new(id);
    let list = current_list(&state, &auth, &session).await?;
    let restaurant = list
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("restaurant {id}")))?;

    Ok(ConfirmDeleteTemplate {
        status: ConnectionStatus::Connected,
        alert: None,
        id: id.to_string(),
        name: restaurant.name.clone(),
    })
}

/// Delete a restaurant once confirmed.
#[instrument(skip_all)]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    session: Session,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Result<Response> {
    let id = RestaurantId::new(id);
    let mut list = current_list(&state, &auth, &session).await?;
    let token = auth.access_token();

    let result = service(&state, &token)
        .delete(&mut list, &id, Confirmation::from_bool(form.confirmed))
        .await;

    let grid_alert = match result {
        Ok(DeleteOutcome::Deleted) => {
            store_restaurants(&session, &list).await?;
            add_breadcrumb("restaurants", "Restaurant deleted", Some(&[("id", id.as_str())][..]));
            None
        }
        Ok(DeleteOutcome::Cancelled) => None,
        Err(e) => e.alert(),
    };

    if !is_htmx(&headers) {
        let target = grid_alert.map_or_else(|| "/".to_string(), |a| format!("/?error={}", a.code()));
        return Ok(Redirect::to(&target).into_response());
    }
    Ok(grid_template(&list, &auth, grid_alert).into_response())
}
