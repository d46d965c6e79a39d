//! Restaurant listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Cuisine, Photo, RestaurantId, UserId};

/// Placeholder image for restaurants without a cover photo.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/400x300";

/// Owner relation, present when the listing was fetched with `owner` included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: UserId,
    pub name: String,
}

/// A restaurant listing as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cuisine: Cuisine,
    #[serde(default)]
    pub cover_photo: Option<Photo>,
    #[serde(default)]
    pub owner_id: Option<UserId>,
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Restaurant {
    /// Image shown on the card: the thumbnail, or the placeholder.
    #[must_use]
    pub fn card_image_url(&self) -> &str {
        self.cover_photo
            .as_ref()
            .and_then(Photo::thumbnail_url)
            .unwrap_or(PLACEHOLDER_IMAGE_URL)
    }

    /// Owner name shown on the card.
    #[must_use]
    pub fn owner_name(&self) -> &str {
        self.owner.as_ref().map_or("Unknown", |o| o.name.as_str())
    }
}

/// Create/update payload.
///
/// Only set fields are serialized; `coverPhoto` is omitted entirely when no
/// photo was uploaded so an update never clears an existing photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantInput {
    pub name: String,
    pub description: String,
    pub cuisine: Cuisine,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_photo: Option<Photo>,
}

/// Whether a saved record was newly created or an update of an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Created,
    Updated,
}

/// The restaurant list a user is looking at.
///
/// Fetched in full when the dashboard loads, then patched locally after each
/// successful mutation instead of being refetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestaurantList(Vec<Restaurant>);

impl RestaurantList {
    #[must_use]
    pub const fn new(restaurants: Vec<Restaurant>) -> Self {
        Self(restaurants)
    }

    /// Apply a successful save: creations go to the front, updates replace
    /// the entry with the same id in place.
    ///
    /// An update for an id that is not in the list leaves the list unchanged.
    pub fn apply_saved(&mut self, restaurant: Restaurant, kind: SaveKind) {
        match kind {
            SaveKind::Created => self.0.insert(0, restaurant),
            SaveKind::Updated => {
                if let Some(slot) = self.0.iter_mut().find(|r| r.id == restaurant.id) {
                    *slot = restaurant;
                }
            }
        }
    }

    /// Remove the entry with the given id, returning it if it was present.
    pub fn remove(&mut self, id: &RestaurantId) -> Option<Restaurant> {
        let index = self.0.iter().position(|r| r.id == *id)?;
        Some(self.0.remove(index))
    }

    #[must_use]
    pub fn get(&self, id: &RestaurantId) -> Option<&Restaurant> {
        self.0.iter().find(|r| r.id == *id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Restaurant> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Restaurant> {
        self.0
    }
}

impl<'a> IntoIterator for &'a RestaurantList {
    type Item = &'a Restaurant;
    type IntoIter = std::slice::Iter<'a, Restaurant>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Restaurant>> for RestaurantList {
    fn from(restaurants: Vec<Restaurant>) -> Self {
        Self(restaurants)
    }
}
