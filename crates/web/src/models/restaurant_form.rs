//! The chef's create/edit form.

use foodiefinds_core::{Cuisine, Photo, Restaurant, RestaurantId, RestaurantInput};

use super::upload::{PendingUpload, UploadError};

/// Whether submitting the form creates a new listing or updates one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(RestaurantId),
}

/// Field values of the restaurant form.
///
/// Built from the submitted request; on a failed save it is rendered back
/// so the user keeps what they typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantForm {
    pub name: String,
    pub description: String,
    pub cuisine: Cuisine,
    pending: Option<PendingUpload>,
    preview: Option<String>,
    existing: Option<RestaurantId>,
}

impl Default for RestaurantForm {
    fn default() -> Self {
        Self::new()
    }
}

impl RestaurantForm {
    /// Empty create form.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            cuisine: Cuisine::default(),
            pending: None,
            preview: None,
            existing: None,
        }
    }

    /// Form pre-filled from an existing restaurant.
    ///
    /// The preview shows the stored thumbnail until another image is picked.
    #[must_use]
    pub fn for_existing(restaurant: &Restaurant) -> Self {
        Self {
            name: restaurant.name.clone(),
            description: restaurant.description.clone(),
            cuisine: restaurant.cuisine,
            pending: None,
            preview: restaurant
                .cover_photo
                .as_ref()
                .and_then(Photo::thumbnail_url)
                .map(str::to_string),
            existing: Some(restaurant.id.clone()),
        }
    }

    #[must_use]
    pub fn mode(&self) -> FormMode {
        self.existing
            .clone()
            .map_or(FormMode::Create, FormMode::Edit)
    }

    /// Take the result of reading a selected file.
    ///
    /// A rejected file clears both the pending upload and the preview.
    /// `Ok(None)` (nothing selected) leaves the current selection alone.
    ///
    /// # Errors
    ///
    /// Passes the rejection through after clearing the selection.
    pub fn set_image(
        &mut self,
        selected: Result<Option<PendingUpload>, UploadError>,
    ) -> Result<(), UploadError> {
        match selected {
            Ok(Some(upload)) => {
                self.preview = Some(upload.preview_data_url());
                self.pending = Some(upload);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => {
                self.clear_image();
                Err(err)
            }
        }
    }

    pub fn clear_image(&mut self) {
        self.pending = None;
        self.preview = None;
    }

    /// URL rendered in the preview box, if any.
    #[must_use]
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    #[must_use]
    pub const fn pending(&self) -> Option<&PendingUpload> {
        self.pending.as_ref()
    }

    /// Payload for create/update, with the uploaded photo if there was one.
    #[must_use]
    pub fn payload(&self, cover_photo: Option<Photo>) -> RestaurantInput {
        RestaurantInput {
            name: self.name.clone(),
            description: self.description.clone(),
            cuisine: self.cuisine,
            cover_photo,
        }
    }

    /// Back to an empty create form.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use foodiefinds_core::UserId;

    fn png() -> Result<Option<PendingUpload>, UploadError> {
        PendingUpload::from_part(Some("dish.png"), Some("image/png"), vec![1, 2, 3])
    }

    #[test]
    fn test_new_form_defaults_to_american_create() {
        let form = RestaurantForm::new();
        assert_eq!(form.cuisine, Cuisine::American);
        assert_eq!(form.mode(), FormMode::Create);
        assert!(form.preview().is_none());
    }

    #[test]
    fn test_for_existing_is_edit_mode_with_thumbnail_preview() {
        let restaurant = Restaurant {
            id: RestaurantId::from(9),
            name: "Sushi Go".to_string(),
            description: "Rolls".to_string(),
            cuisine: Cuisine::Japanese,
            cover_photo: Some(Photo::from_sizes([("thumbnail", "http://b/t.jpg")])),
            owner_id: Some(UserId::from(1)),
            owner: None,
            created_at: None,
        };
        let form = RestaurantForm::for_existing(&restaurant);
        assert_eq!(form.mode(), FormMode::Edit(RestaurantId::from(9)));
        assert_eq!(form.preview(), Some("http://b/t.jpg"));
        assert_eq!(form.cuisine, Cuisine::Japanese);
    }

    #[test]
    fn test_image_selection_sets_data_url_preview() {
        let mut form = RestaurantForm::new();
        form.set_image(png()).unwrap();
        assert!(form.preview().unwrap().starts_with("data:image/png;base64,"));
        assert!(form.pending().is_some());
    }

    #[test]
    fn test_non_image_clears_selection() {
        let mut form = RestaurantForm::new();
        form.set_image(png()).unwrap();

        let rejected = PendingUpload::from_part(Some("a.txt"), Some("text/plain"), b"hi".to_vec());
        assert!(form.set_image(rejected).is_err());
        assert!(form.preview().is_none());
        assert!(form.pending().is_none());
    }

    #[test]
    fn test_payload_without_photo() {
        let mut form = RestaurantForm::new();
        form.name = "Luigi's".to_string();
        form.description = "Pasta".to_string();
        form.cuisine = Cuisine::Italian;

        let payload = serde_json::to_value(form.payload(None)).unwrap();
        assert_eq!(
            payload,
            serde_json::json!({"name": "Luigi's", "description": "Pasta", "cuisine": "Italian"})
        );
    }

    #[test]
    fn test_reset() {
        let mut form = RestaurantForm::new();
        form.name = "x".to_string();
        form.set_image(png()).unwrap();
        form.reset();
        assert_eq!(form, RestaurantForm::new());
    }
}
