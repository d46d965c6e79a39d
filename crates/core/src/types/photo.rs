//! Uploaded images.
//!
//! The backend resizes every uploaded image into a set of named sizes
//! (`thumbnail`, `large`, ...) and stores the map of size name to URL on the
//! owning record. Depending on the backend version a size is either a bare
//! URL string or an object with a `url` field; both are accepted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Size name used for restaurant cards.
pub const THUMBNAIL: &str = "thumbnail";

/// One stored size of an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    Url(String),
    Object { url: String },
}

impl ImageRef {
    /// URL of this size.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) | Self::Object { url } => url,
        }
    }
}

/// An uploaded photo: size name to stored image.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Photo(BTreeMap<String, ImageRef>);

impl Photo {
    /// Build a photo from `(size, url)` pairs.
    #[must_use]
    pub fn from_sizes<I, K, V>(sizes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            sizes
                .into_iter()
                .map(|(k, v)| (k.into(), ImageRef::Url(v.into())))
                .collect(),
        )
    }

    /// URL of a named size, if present.
    #[must_use]
    pub fn size(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(ImageRef::url)
    }

    /// URL of the thumbnail size, if present.
    #[must_use]
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.size(THUMBNAIL)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_url_sizes() {
        let photo: Photo = serde_json::from_str(
            r#"{"thumbnail": "http://backend/storage/t.jpg", "large": "http://backend/storage/l.jpg"}"#,
        )
        .unwrap();
        assert_eq!(photo.thumbnail_url(), Some("http://backend/storage/t.jpg"));
        assert_eq!(photo.size("large"), Some("http://backend/storage/l.jpg"));
    }

    #[test]
    fn test_object_sizes() {
        let photo: Photo =
            serde_json::from_str(r#"{"thumbnail": {"url": "http://backend/t.jpg"}}"#).unwrap();
        assert_eq!(photo.thumbnail_url(), Some("http://backend/t.jpg"));
    }

    #[test]
    fn test_missing_thumbnail() {
        let photo = Photo::from_sizes([("large", "http://backend/l.jpg")]);
        assert_eq!(photo.thumbnail_url(), None);
        assert!(!photo.is_empty());
    }
}
