//! Manifest REST API client implementation.
//!
//! Talks to the backend's JSON API with `reqwest`. Users authenticate
//! against the `users` authenticable entity; restaurants live in the
//! `restaurants` collection.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use foodiefinds_core::{NewUser, Photo, Restaurant, RestaurantId, RestaurantInput, User};

use super::{AccessToken, BackendApi, BackendError, ImageUpload, RestaurantQuery};
use crate::config::BackendConfig;

/// Slug of the authenticable user entity.
const USERS: &str = "users";

/// Slug of the restaurant collection.
const RESTAURANTS: &str = "restaurants";

/// Token response from login and signup.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Paginated listing response.
#[derive(Debug, Deserialize)]
struct Paginated<T> {
    data: Vec<T>,
}

// =============================================================================
// ManifestClient
// =============================================================================

/// Client for the Manifest REST API.
#[derive(Clone)]
pub struct ManifestClient {
    inner: Arc<ManifestClientInner>,
}

struct ManifestClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl ManifestClient {
    /// Create a new client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("foodiefinds/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ManifestClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// Backend origin this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{path}", self.inner.base_url)
    }

    fn listing_url(&self, query: &RestaurantQuery) -> Result<Url, BackendError> {
        let mut url = Url::parse(&self.endpoint(&format!("collections/{RESTAURANTS}")))
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            if !query.relations.is_empty() {
                pairs.append_pair("relations", &query.relations.join(","));
            }
            pairs
                .append_pair("orderBy", &query.order_by)
                .append_pair("order", query.order.as_str())
                .append_pair("perPage", &query.per_page.to_string());
        }
        Ok(url)
    }

    /// Send a request and decode a JSON body from a success response.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(BackendError::from_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Decode(e.to_string())
        })
    }

    /// Send a request whose response body is irrelevant.
    async fn send_empty(&self, request: reqwest::RequestBuilder) -> Result<(), BackendError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::from_status(status.as_u16(), &body));
        }

        Ok(())
    }
}

#[async_trait]
impl BackendApi for ManifestClient {
    #[instrument(skip(self), fields(backend = %self.inner.base_url))]
    async fn probe_health(&self) -> Result<(), BackendError> {
        // The status code is deliberately ignored: any answer means the
        // backend process is up.
        let response = self
            .inner
            .client
            .get(self.endpoint("health"))
            .send()
            .await
            .map_err(|e| BackendError::Unreachable(e.to_string()))?;
        debug!(status = %response.status(), "Health probe answered");
        Ok(())
    }

    #[instrument(skip_all)]
    async fn current_user(&self, token: &AccessToken) -> Result<User, BackendError> {
        let request = self
            .inner
            .client
            .get(self.endpoint(&format!("auth/{USERS}/me")))
            .bearer_auth(token.expose());
        self.send_json(request).await
    }

    #[instrument(skip(self, password))]
    async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AccessToken, BackendError> {
        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
        });
        let request = self
            .inner
            .client
            .post(self.endpoint(&format!("auth/{USERS}/login")))
            .json(&body);
        let response: TokenResponse = self.send_json(request).await?;
        Ok(AccessToken::new(response.token))
    }

    async fn logout(&self, _token: &AccessToken) -> Result<(), BackendError> {
        // Tokens are stateless JWTs; logging out means the caller forgets it.
        debug!("Discarding backend token");
        Ok(())
    }

    #[instrument(skip(self, password), fields(email = %user.email, role = %user.role))]
    async fn signup(
        &self,
        user: &NewUser,
        password: &SecretString,
    ) -> Result<AccessToken, BackendError> {
        let body = serde_json::json!({
            "name": user.name,
            "email": user.email,
            "password": password.expose_secret(),
            "role": user.role,
        });
        let request = self
            .inner
            .client
            .post(self.endpoint(&format!("auth/{USERS}/signup")))
            .json(&body);
        let response: TokenResponse = self.send_json(request).await?;
        Ok(AccessToken::new(response.token))
    }

    #[instrument(skip(self, token))]
    async fn find_restaurants(
        &self,
        token: &AccessToken,
        query: &RestaurantQuery,
    ) -> Result<Vec<Restaurant>, BackendError> {
        let url = self.listing_url(query)?;
        let request = self.inner.client.get(url).bearer_auth(token.expose());
        let page: Paginated<Restaurant> = self.send_json(request).await?;
        debug!(count = page.data.len(), "Fetched restaurants");
        Ok(page.data)
    }

    #[instrument(skip(self, token, input), fields(name = %input.name))]
    async fn create_restaurant(
        &self,
        token: &AccessToken,
        input: &RestaurantInput,
    ) -> Result<Restaurant, BackendError> {
        let request = self
            .inner
            .client
            .post(self.endpoint(&format!("collections/{RESTAURANTS}")))
            .bearer_auth(token.expose())
            .json(input);
        self.send_json(request).await
    }

    #[instrument(skip(self, token, input), fields(id = %id))]
    async fn update_restaurant(
        &self,
        token: &AccessToken,
        id: &RestaurantId,
        input: &RestaurantInput,
    ) -> Result<Restaurant, BackendError> {
        let request = self
            .inner
            .client
            .put(self.endpoint(&format!("collections/{RESTAURANTS}/{id}")))
            .bearer_auth(token.expose())
            .json(input);
        self.send_json(request).await
    }

    #[instrument(skip(self, token), fields(id = %id))]
    async fn delete_restaurant(
        &self,
        token: &AccessToken,
        id: &RestaurantId,
    ) -> Result<(), BackendError> {
        let request = self
            .inner
            .client
            .delete(self.endpoint(&format!("collections/{RESTAURANTS}/{id}")))
            .bearer_auth(token.expose());
        self.send_empty(request).await
    }

    #[instrument(skip(self, token, image), fields(file = %image.file_name, size = image.bytes.len()))]
    async fn upload_image(
        &self,
        token: &AccessToken,
        entity: &str,
        property: &str,
        image: ImageUpload,
    ) -> Result<Photo, BackendError> {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;
        let form = Form::new()
            .part("image", part)
            .text("entity", entity.to_string())
            .text("property", property.to_string());

        let request = self
            .inner
            .client
            .post(self.endpoint("upload/image"))
            .bearer_auth(token.expose())
            .multipart(form);
        self.send_json(request).await
    }
}
