//! Cover photo uploads.
//!
//! A file picked (or dropped) on the form becomes a [`PendingUpload`]: the
//! bytes plus a `data:` URL preview. It lives only for the request that
//! carries it.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

use crate::manifest::ImageUpload;

/// Errors for a selected file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    /// The file's content type is not `image/*`.
    #[error("not an image: {0}")]
    NotAnImage(String),
}

/// An image selected on the form and not yet stored on the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingUpload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for PendingUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl PendingUpload {
    /// Accept a submitted file part.
    ///
    /// Returns `Ok(None)` when nothing was selected (browsers send an empty
    /// part for an untouched file input).
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::NotAnImage`] when the content type does not
    /// start with `image/`.
    pub fn from_part(
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Option<Self>, UploadError> {
        let file_name = file_name.unwrap_or_default();
        if bytes.is_empty() && file_name.is_empty() {
            return Ok(None);
        }

        let content_type = content_type.unwrap_or_default().trim().to_ascii_lowercase();
        if !content_type.starts_with("image/") || bytes.is_empty() {
            return Err(UploadError::NotAnImage(content_type));
        }

        Ok(Some(Self {
            file_name: if file_name.is_empty() {
                "upload".to_string()
            } else {
                file_name.to_string()
            },
            content_type,
            bytes,
        }))
    }

    /// `data:` URL for rendering a preview.
    #[must_use]
    pub fn preview_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.bytes)
        )
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Hand the file over to the backend client.
    #[must_use]
    pub fn into_image(self) -> ImageUpload {
        ImageUpload {
            file_name: self.file_name,
            content_type: self.content_type,
            bytes: self.bytes,
        }
    }
}
