//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `GREENHOUSE_API_URL` - Backend base URL (default: `http://localhost:5000/api`)
//! - `GREENHOUSE_API_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `GREENHOUSE_API_TOKEN` - Bearer token sent with every request
//! - `GREENHOUSE_REFETCH_DELAY_MS` - Delay before the confirmatory wishlist
//!   re-fetch (default: 500)
//! - `GREENHOUSE_TAX_RATE` - Tax shown on the cart summary (default: 0.10)
//! - `GREENHOUSE_IDENTITY_FILE` - Where the local user identity is stored
//!   (default: `<config dir>/greenhouse/identity`)

use std::path::PathBuf;
use std::time::Duration;

use greenhouse_core::TaxRate;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Backend used when `GREENHOUSE_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REFETCH_DELAY_MS: u64 = 500;
const IDENTITY_FILE_NAME: &str = "identity";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend API configuration
    pub api: ApiConfig,
    /// Delay before re-fetching the wishlist after a mutation
    pub refetch_delay: Duration,
    /// Tax surcharge shown on the cart summary
    pub tax_rate: TaxRate,
    /// File holding the persisted user identity
    pub identity_file: PathBuf,
}

/// Backend API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Optional bearer token
    pub token: Option<SecretString>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ApiConfig {
    /// API configuration for `base_url` with the default timeout and no token.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("GREENHOUSE_API_URL", base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token: None,
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("GREENHOUSE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = parse_base_url("GREENHOUSE_API_URL", &base_url)?;

        let timeout_secs = parse_or_default(
            "GREENHOUSE_API_TIMEOUT_SECS",
            lookup("GREENHOUSE_API_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "GREENHOUSE_API_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let token = lookup("GREENHOUSE_API_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);

        let refetch_delay_ms = parse_or_default(
            "GREENHOUSE_REFETCH_DELAY_MS",
            lookup("GREENHOUSE_REFETCH_DELAY_MS"),
            DEFAULT_REFETCH_DELAY_MS,
        )?;

        let tax_rate = match lookup("GREENHOUSE_TAX_RATE") {
            Some(raw) => raw.parse::<TaxRate>().map_err(|e| {
                ConfigError::InvalidEnvVar("GREENHOUSE_TAX_RATE".to_string(), e.to_string())
            })?,
            None => TaxRate::default(),
        };

        let identity_file = lookup("GREENHOUSE_IDENTITY_FILE")
            .map_or_else(default_identity_file, PathBuf::from);

        Ok(Self {
            api: ApiConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
                token,
            },
            refetch_delay: Duration::from_millis(refetch_delay_ms),
            tax_rate,
            identity_file,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and check a backend base URL.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }

    Ok(url)
}

/// Parse an optional numeric variable, falling back to `default`.
fn parse_or_default(key: &str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    raw.map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// `<config dir>/greenhouse/identity`, or a dotfile in the working directory
/// when the platform has no config directory.
fn default_identity_file() -> PathBuf {
    dirs::config_dir().map_or_else(
        || PathBuf::from(".greenhouse-identity"),
        |dir| dir.join("greenhouse").join(IDENTITY_FILE_NAME),
    )
}
