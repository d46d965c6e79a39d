//! Web configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MANIFEST_BACKEND_URL` - Origin of the Manifest backend (e.g., http://localhost:1111)
//!
//! ## Optional
//! - `FOODIEFINDS_HOST` - Bind address (default: 127.0.0.1)
//! - `FOODIEFINDS_PORT` - Listen port (default: 3000)
//! - `FOODIEFINDS_BASE_URL` - Public URL of this site (default: http://localhost:3000)
//! - `FOODIEFINDS_DEMO_EMAIL` - Demo login email (default: chef@example.com)
//! - `FOODIEFINDS_DEMO_PASSWORD` - Demo login password (default: password)
//! - `FOODIEFINDS_RESTAURANTS_PER_PAGE` - Listing page size requested from the backend (default: 100)
//! - `FOODIEFINDS_MAX_UPLOAD_BYTES` - Request body limit for uploads (default: 10 MiB)
//! - `FOODIEFINDS_STATIC_DIR` - Directory served under `/static` (default: crates/web/static)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_DEMO_EMAIL: &str = "chef@example.com";
const DEFAULT_DEMO_PASSWORD: &str = "password";
const DEFAULT_PER_PAGE: u32 = 100;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Web application configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for this site
    pub base_url: String,
    /// Manifest backend connection settings
    pub backend: BackendConfig,
    /// Credentials used by the "Login as Demo Chef" button
    pub demo: DemoLogin,
    /// Maximum accepted request body size for uploads, in bytes
    pub max_upload_bytes: usize,
    /// Directory of CSS/JS assets
    pub static_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error event sample rate
    pub sentry_sample_rate: f32,
    /// Sentry performance trace sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Manifest backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Backend origin without a trailing slash
    pub base_url: String,
    /// Page size requested when listing restaurants
    pub restaurants_per_page: u32,
}

impl BackendConfig {
    /// URL of the backend's admin panel.
    #[must_use]
    pub fn admin_url(&self) -> String {
        format!("{}/admin", self.base_url)
    }
}

/// Demo login credentials.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct DemoLogin {
    pub email: String,
    pub password: SecretString,
}

impl std::fmt::Debug for DemoLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoLogin")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let host = vars
            .or_default("FOODIEFINDS_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("FOODIEFINDS_HOST".to_string(), e.to_string()))?;
        let port = vars.parse_or("FOODIEFINDS_PORT", 3000_u16)?;
        let base_url = vars.or_default("FOODIEFINDS_BASE_URL", "http://localhost:3000");

        let backend = BackendConfig {
            base_url: normalize_backend_url(&vars.required("MANIFEST_BACKEND_URL")?)?,
            restaurants_per_page: vars
                .parse_or("FOODIEFINDS_RESTAURANTS_PER_PAGE", DEFAULT_PER_PAGE)?,
        };

        let demo = DemoLogin {
            email: vars.or_default("FOODIEFINDS_DEMO_EMAIL", DEFAULT_DEMO_EMAIL),
            password: SecretString::from(
                vars.or_default("FOODIEFINDS_DEMO_PASSWORD", DEFAULT_DEMO_PASSWORD),
            ),
        };

        Ok(Self {
            host,
            port,
            base_url,
            backend,
            demo,
            max_upload_bytes: vars.parse_or("FOODIEFINDS_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            static_dir: PathBuf::from(vars.or_default("FOODIEFINDS_STATIC_DIR", "crates/web/static")),
            sentry_dsn: vars.optional("SENTRY_DSN"),
            sentry_environment: vars.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: vars.parse_or("SENTRY_SAMPLE_RATE", 1.0_f32)?,
            sentry_traces_sample_rate: vars.parse_or("SENTRY_TRACES_SAMPLE_RATE", 0.0_f32)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        (self.0)(key)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to a default when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

/// Validate the backend origin and strip any trailing slash.
fn normalize_backend_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("MANIFEST_BACKEND_URL".to_string(), reason);

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("must have a host".to_string()));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}
