//! Manifest backend access.
//!
//! # Architecture
//!
//! - [`BackendApi`] is the only way the rest of the crate reaches the backend.
//!   Handlers get it from `AppState` as an `Arc<dyn BackendApi>`.
//! - [`ManifestClient`] implements it over the Manifest REST API with
//!   `reqwest`.
//! - `FakeBackend` (tests and the `test-support` feature) implements it in
//!   memory and records every call.
//!
//! # Error classification
//!
//! Connectivity problems and authentication problems are different
//! [`BackendError`] variants, decided from the transport error kind and the
//! HTTP status. Nothing inspects error message text.

mod client;
#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use client::ManifestClient;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{BackendCall, FakeBackend, Operation};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use foodiefinds_core::{NewUser, Photo, Restaurant, RestaurantId, RestaurantInput, User};

/// Errors returned by the backend client.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend could not be reached (connection refused, DNS, timeout,
    /// connection reset mid-request).
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// The backend rejected the credentials or token (401/403).
    #[error("unauthorized")]
    Unauthorized,

    /// The requested record does not exist.
    #[error("not found")]
    NotFound,

    /// The backend refused the request as invalid (other 4xx).
    #[error("rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The backend failed (5xx).
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl BackendError {
    /// Whether this is a connectivity failure rather than an answer from
    /// the backend.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    /// Whether the backend refused the caller's identity.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body);
        match status {
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound,
            400..=499 => Self::Rejected { status, message },
            _ => Self::Server { status, message },
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else if let Some(status) = err.status() {
            Self::from_status(status.as_u16(), "")
        } else {
            // connect, timeout, request and body errors all mean the
            // exchange with the backend did not complete
            Self::Unreachable(err.to_string())
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// The backend answers `{"message": "..."}` or `{"message": ["...", "..."]}`
/// for validation failures; anything else is passed through truncated.
fn extract_message(body: &str) -> String {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Message {
        One(String),
        Many(Vec<String>),
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        message: Message,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            message: Message::One(m),
        }) => m,
        Ok(ErrorBody {
            message: Message::Many(ms),
        }) => ms.join("; "),
        Err(_) => body.chars().take(200).collect(),
    }
}

/// Bearer token issued by the backend on login or signup.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for the `Authorization` header or the session store.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "ASC")]
    Ascending,
    #[serde(rename = "DESC")]
    Descending,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Options for listing restaurants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantQuery {
    /// Relations to include in each record.
    pub relations: Vec<String>,
    /// Property to sort by.
    pub order_by: String,
    /// Sort direction.
    pub order: SortOrder,
    /// Page size.
    pub per_page: u32,
}

impl RestaurantQuery {
    /// Full listing for the dashboard: owner included, newest first.
    #[must_use]
    pub fn newest_with_owner(per_page: u32) -> Self {
        Self {
            relations: vec!["owner".to_string()],
            order_by: "createdAt".to_string(),
            order: SortOrder::Descending,
            per_page,
        }
    }
}

/// An image file to store on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name.
    pub file_name: String,
    /// MIME type, always `image/*`.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Capability set the UI needs from the backend.
///
/// Every call that acts on behalf of a user takes that user's
/// [`AccessToken`]; the client itself holds no per-user state.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Check that the backend answers at all.
    ///
    /// Any HTTP response counts as reachable; only transport failures are
    /// errors.
    async fn probe_health(&self) -> Result<(), BackendError>;

    /// Resolve a token to the user it belongs to.
    async fn current_user(&self, token: &AccessToken) -> Result<User, BackendError>;

    /// Exchange credentials for a token.
    async fn login(&self, email: &str, password: &SecretString)
    -> Result<AccessToken, BackendError>;

    /// End the session behind a token.
    async fn logout(&self, token: &AccessToken) -> Result<(), BackendError>;

    /// Create a user account.
    async fn signup(&self, user: &NewUser, password: &SecretString)
    -> Result<AccessToken, BackendError>;

    /// List restaurants.
    async fn find_restaurants(
        &self,
        token: &AccessToken,
        query: &RestaurantQuery,
    ) -> Result<Vec<Restaurant>, BackendError>;

    /// Create a restaurant owned by the token's user.
    async fn create_restaurant(
        &self,
        token: &AccessToken,
        input: &RestaurantInput,
    ) -> Result<Restaurant, BackendError>;

    /// Replace the fields of an existing restaurant.
    async fn update_restaurant(
        &self,
        token: &AccessToken,
        id: &RestaurantId,
        input: &RestaurantInput,
    ) -> Result<Restaurant, BackendError>;

    /// Delete a restaurant.
    async fn delete_restaurant(
        &self,
        token: &AccessToken,
        id: &RestaurantId,
    ) -> Result<(), BackendError>;

    /// Store an image for a property of an entity, returning its sizes.
    async fn upload_image(
        &self,
        token: &AccessToken,
        entity: &str,
        property: &str,
        image: ImageUpload,
    ) -> Result<Photo, BackendError>;
}
