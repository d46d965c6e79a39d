//! Restaurant dashboard operations.
//!
//! Loads the listing and performs mutations, patching the caller's
//! [`RestaurantList`] after each success instead of refetching.

use thiserror::Error;
use tracing::{error, info, instrument};

use foodiefinds_core::{RestaurantId, RestaurantList, SaveKind};

use crate::manifest::{AccessToken, BackendApi, BackendError, RestaurantQuery};
use crate::models::{Alert, FormMode, RestaurantForm};

/// Entity the cover photo upload is attached to.
pub const COVER_PHOTO_ENTITY: &str = "restaurants";

/// Property the cover photo upload is stored under.
pub const COVER_PHOTO_PROPERTY: &str = "coverPhoto";

/// Errors from dashboard operations.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("failed to load restaurants: {0}")]
    Load(#[source] BackendError),
    #[error("failed to upload cover photo: {0}")]
    Upload(#[source] BackendError),
    #[error("failed to save restaurant: {0}")]
    Save(#[source] BackendError),
    #[error("failed to delete restaurant: {0}")]
    Delete(#[source] BackendError),
}

impl DashboardError {
    /// Alert to show, if any. Load failures only show an empty grid.
    #[must_use]
    pub const fn alert(&self) -> Option<Alert> {
        match self {
            Self::Load(_) => None,
            Self::Upload(_) | Self::Save(_) => Some(Alert::SaveFailed),
            Self::Delete(_) => Some(Alert::DeleteFailed),
        }
    }
}

/// The user's answer to "delete this restaurant?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    #[must_use]
    pub const fn from_bool(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Declined
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// Dashboard operations on behalf of one logged-in user.
pub struct DashboardService<'a> {
    backend: &'a dyn BackendApi,
    token: &'a AccessToken,
    per_page: u32,
}

impl<'a> DashboardService<'a> {
    #[must_use]
    pub const fn new(backend: &'a dyn BackendApi, token: &'a AccessToken, per_page: u32) -> Self {
        Self {
            backend,
            token,
            per_page,
        }
    }

    /// Fetch the full listing, owner included, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Load` if the backend call fails.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<RestaurantList, DashboardError> {
        let query = RestaurantQuery::newest_with_owner(self.per_page);
        let restaurants = self
            .backend
            .find_restaurants(self.token, &query)
            .await
            .map_err(DashboardError::Load)?;
        Ok(RestaurantList::new(restaurants))
    }

    /// Submit the form: upload the cover photo if one is pending, then
    /// create or update, and patch `list` with the saved record.
    ///
    /// On success the form is reset. On failure the form keeps its field
    /// values and the list is untouched.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Upload` or `DashboardError::Save`.
    #[instrument(skip(self, list, form), fields(name = %form.name, mode = ?form.mode()))]
    pub async fn save(
        &self,
        list: &mut RestaurantList,
        form: &mut RestaurantForm,
    ) -> Result<SaveKind, DashboardError> {
        let cover_photo = match form.pending().cloned() {
            Some(upload) => Some(
                self.backend
                    .upload_image(
                        self.token,
                        COVER_PHOTO_ENTITY,
                        COVER_PHOTO_PROPERTY,
                        upload.into_image(),
                    )
                    .await
                    .map_err(|e| {
                        error!(error = %e, "Cover photo upload failed");
                        DashboardError::Upload(e)
                    })?,
            ),
            None => None,
        };

        let payload = form.payload(cover_photo);
        let (saved, kind) = match form.mode() {
            FormMode::Create => (
                self.backend.create_restaurant(self.token, &payload).await,
                SaveKind::Created,
            ),
            FormMode::Edit(id) => (
                self.backend.update_restaurant(self.token, &id, &payload).await,
                SaveKind::Updated,
            ),
        };
        let saved = saved.map_err(|e| {
            error!(error = %e, "Saving restaurant failed");
            DashboardError::Save(e)
        })?;

        info!(id = %saved.id, ?kind, "Restaurant saved");
        list.apply_saved(saved, kind);
        form.reset();
        Ok(kind)
    }

    /// Delete a restaurant once the user has confirmed.
    ///
    /// A declined confirmation makes no backend call.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Delete` if the backend call fails; the list
    /// is then unchanged.
    #[instrument(skip(self, list))]
    pub async fn delete(
        &self,
        list: &mut RestaurantList,
        id: &RestaurantId,
        confirmation: Confirmation,
    ) -> Result<DeleteOutcome, DashboardError> {
        if confirmation == Confirmation::Declined {
            return Ok(DeleteOutcome::Cancelled);
        }

        self.backend
            .delete_restaurant(self.token, id)
            .await
            .map_err(|e| {
                error!(error = %e, "Deleting restaurant failed");
                DashboardError::Delete(e)
            })?;

        list.remove(id);
        info!("Restaurant deleted");
        Ok(DeleteOutcome::Deleted)
    }
}
