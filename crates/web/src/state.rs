//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::WebConfig;
use crate::manifest::{BackendApi, BackendError, ManifestClient};

/// Application state shared across all handlers.
///
/// Cheaply cloneable; the backend client sits behind a trait object so
/// tests can swap in an in-memory fake.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    backend: Arc<dyn BackendApi>,
}

impl AppState {
    /// Create state talking to the configured Manifest backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: WebConfig) -> Result<Self, BackendError> {
        let backend = ManifestClient::new(&config.backend)?;
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    /// Create state with an explicit backend implementation.
    #[must_use]
    pub fn with_backend(config: WebConfig, backend: Arc<dyn BackendApi>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, backend }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// The backend client.
    #[must_use]
    pub fn backend(&self) -> &dyn BackendApi {
        self.inner.backend.as_ref()
    }
}
