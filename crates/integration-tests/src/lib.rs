//! Integration tests for FoodieFinds.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests against the in-memory backend
//! cargo test -p foodiefinds-integration-tests
//!
//! # Tests against a running Manifest backend
//! MANIFEST_BACKEND_URL=http://localhost:1111 \
//!     cargo test -p foodiefinds-integration-tests -- --ignored
//! ```
//!
//! [`TestApp`] drives the full router (sessions, request IDs, static files)
//! with `tower::ServiceExt::oneshot`, carrying the session cookie between
//! requests the way a browser would.

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use tower::ServiceExt;

use foodiefinds_web::config::WebConfig;
use foodiefinds_web::manifest::FakeBackend;
use foodiefinds_web::routes;
use foodiefinds_web::state::AppState;

pub use foodiefinds_web::manifest::{BackendCall, Operation};

/// Backend origin the test configuration points at.
pub const TEST_BACKEND_URL: &str = "http://backend.test";

/// Password given to every account the helpers create.
pub const TEST_PASSWORD: &str = "password";

const SESSION_COOKIE: &str = "ff_session";
const MULTIPART_BOUNDARY: &str = "foodiefinds-test-boundary";

/// Configuration for in-process tests.
#[must_use]
pub fn test_config() -> WebConfig {
    WebConfig::from_lookup(|key| match key {
        "MANIFEST_BACKEND_URL" => Some(TEST_BACKEND_URL.to_string()),
        "FOODIEFINDS_STATIC_DIR" => Some(concat!(env!("CARGO_MANIFEST_DIR"), "/../web/static").to_string()),
        _ => None,
    })
    .expect("test configuration is valid")
}

/// One part of a multipart body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Target of a redirect, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }

    /// Value of an arbitrary header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// The application wired to a [`FakeBackend`], plus one browser's cookie.
pub struct TestApp {
    router: Router,
    pub backend: Arc<FakeBackend>,
    cookie: Option<String>,
}

impl TestApp {
    #[must_use]
    pub fn new(backend: FakeBackend) -> Self {
        let backend = Arc::new(backend);
        let state = AppState::with_backend(test_config(), backend.clone());
        Self {
            router: routes::app(state),
            backend,
            cookie: None,
        }
    }

    /// A second browser against the same backend, starting without a cookie.
    #[must_use]
    pub fn new_browser(&self) -> Self {
        Self {
            router: self.router.clone(),
            backend: self.backend.clone(),
            cookie: None,
        }
    }

    /// Whether the browser currently holds a session cookie.
    #[must_use]
    pub const fn has_cookie(&self) -> bool {
        self.cookie.is_some()
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::get(uri), Body::empty()).await
    }

    pub async fn htmx_get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).header("hx-request", "true"), Body::empty())
            .await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(request, Body::from(encode_form(fields))).await
    }

    pub async fn htmx_post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("hx-request", "true");
        self.send(request, Body::from(encode_form(fields))).await
    }

    pub async fn post_multipart(&mut self, uri: &str, parts: &[Part<'_>], htmx: bool) -> TestResponse {
        let mut request = Request::post(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        );
        if htmx {
            request = request.header("hx-request", "true");
        }
        self.send(request, Body::from(encode_multipart(parts))).await
    }

    /// Register an account on the backend and log this browser into it.
    pub async fn login_as(&mut self, name: &str, email: &str, role: foodiefinds_core::Role) -> foodiefinds_core::User {
        let user = self.backend.add_user(name, email, TEST_PASSWORD, role).await;
        let response = self
            .post_form("/auth/login", &[("email", email), ("password", TEST_PASSWORD)])
            .await;
        assert_eq!(response.location(), Some("/"), "login should succeed");
        user
    }

    async fn send(&mut self, mut request: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, format!("{SESSION_COOKIE}={cookie}"));
        }
        let request = request.body(body).expect("request builds");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let (parts, body) = response.into_parts();
        self.remember_cookie(&parts.headers);
        let bytes = to_bytes(body, usize::MAX).await.expect("body reads");

        TestResponse {
            status: parts.status,
            headers: parts.headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn remember_cookie(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let Some(pair) = value.split(';').next() else { continue };
            let Some((name, cookie)) = pair.split_once('=') else { continue };
            if name.trim() != SESSION_COOKIE {
                continue;
            }
            let expired = value.to_ascii_lowercase().contains("max-age=0");
            self.cookie = if cookie.is_empty() || expired {
                None
            } else {
                Some(cookie.to_string())
            };
        }
    }
}

fn encode_form(fields: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}

fn encode_multipart(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
                );
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}
