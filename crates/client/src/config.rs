//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CARTWHEEL_API_URL` - Base URL of the storefront REST API (e.g. `https://shop.example/api`)
//!
//! ## Optional
//! - `CARTWHEEL_API_TOKEN` - Bearer token sent with every request
//! - `CARTWHEEL_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 15)
//! - `CARTWHEEL_PAGE_LIMIT` - Products per category page (default: 20)
//! - `CARTWHEEL_CACHE_POLICY` - `unbounded`, `lru:<pages>`, or `ttl:<secs>` (default: unbounded)
//! - `CARTWHEEL_SEARCH_DEBOUNCE_MS` - Delay before a suggestion fetch (default: 400)
//! - `CARTWHEEL_SEARCH_MIN_CHARS` - Shortest query that fetches suggestions (default: 2)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::catalog::CachePolicy;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_PAGE_LIMIT: u32 = 20;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 400;
const DEFAULT_SEARCH_MIN_CHARS: usize = 2;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, without a trailing slash
    pub api_url: Url,
    /// Bearer token for authenticated endpoints
    pub api_token: Option<SecretString>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Products requested per category page
    pub page_limit: u32,
    /// Eviction policy for the category page cache
    pub cache_policy: CachePolicy,
    /// Delay before a suggestion fetch is issued
    pub search_debounce: Duration,
    /// Shortest query (in characters) that fetches suggestions
    pub search_min_chars: usize,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("request_timeout", &self.request_timeout)
            .field("page_limit", &self.page_limit)
            .field("cache_policy", &self.cache_policy)
            .field("search_debounce", &self.search_debounce)
            .field("search_min_chars", &self.search_min_chars)
            .finish()
    }
}

impl ClientConfig {
    /// Create a configuration with defaults for everything but the API URL.
    #[must_use]
    pub const fn new(api_url: Url) -> Self {
        Self {
            api_url,
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            page_limit: DEFAULT_PAGE_LIMIT,
            cache_policy: CachePolicy::Unbounded,
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            search_min_chars: DEFAULT_SEARCH_MIN_CHARS,
        }
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(SecretString::from(token.into()));
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the cache eviction policy.
    #[must_use]
    pub const fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    /// Set the suggestion debounce interval.
    #[must_use]
    pub const fn with_search_debounce(mut self, debounce: Duration) -> Self {
        self.search_debounce = debounce;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any
    /// variable fails to parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("CARTWHEEL_API_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("CARTWHEEL_API_URL".to_string()))?;
        let api_url = parse_api_url(&raw_url)?;

        let api_token = lookup("CARTWHEEL_API_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .map(SecretString::from);

        let request_timeout = Duration::from_secs(parse_or_default(
            &lookup,
            "CARTWHEEL_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);
        let page_limit = parse_or_default(&lookup, "CARTWHEEL_PAGE_LIMIT", DEFAULT_PAGE_LIMIT)?;
        if page_limit == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CARTWHEEL_PAGE_LIMIT".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let cache_policy =
            parse_or_default(&lookup, "CARTWHEEL_CACHE_POLICY", CachePolicy::Unbounded)?;
        let search_debounce = Duration::from_millis(parse_or_default(
            &lookup,
            "CARTWHEEL_SEARCH_DEBOUNCE_MS",
            DEFAULT_SEARCH_DEBOUNCE_MS,
        )?);
        let search_min_chars = parse_or_default(
            &lookup,
            "CARTWHEEL_SEARCH_MIN_CHARS",
            DEFAULT_SEARCH_MIN_CHARS,
        )?;

        Ok(Self {
            api_url,
            api_token,
            request_timeout,
            page_limit,
            cache_policy,
            search_debounce,
            search_min_chars,
        })
    }

    /// Build the full URL for an API path (e.g. `cart/update`).
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and validate the API base URL.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        ConfigError::InvalidEnvVar("CARTWHEEL_API_URL".to_string(), e.to_string())
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "CARTWHEEL_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Parse an optional variable, falling back to a default when unset.
fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        _ => Ok(default),
    }
}
