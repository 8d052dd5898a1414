//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `KASRA_API_BASE_URL` - REST API root (default: `http://localhost:3000/api`)
//! - `KASRA_STATE_DIR` - Directory holding persisted client state (default: `.kasra`)
//! - `KASRA_CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime in seconds (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
const DEFAULT_STATE_DIR: &str = ".kasra";
const DEFAULT_CACHE_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
///
/// Implements `Debug` manually to redact the Sentry DSN.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// REST API root; every endpoint path is appended to it.
    pub api_base_url: Url,
    /// Directory of the on-disk key-value store.
    pub state_dir: PathBuf,
    /// Lifetime of cached catalog responses.
    pub catalog_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<SecretString>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("api_base_url", &self.api_base_url.as_str())
            .field("state_dir", &self.state_dir)
            .field("catalog_cache_ttl", &self.catalog_cache_ttl)
            .field(
                "sentry_dsn",
                &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"),
            )
            .field("sentry_environment", &self.sentry_environment)
            .finish()
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

    /// Build a configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvSource(lookup);

        let api_base_url = parse_base_url(
            "KASRA_API_BASE_URL",
            &env.get_or_default("KASRA_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;
        let state_dir = PathBuf::from(env.get_or_default("KASRA_STATE_DIR", DEFAULT_STATE_DIR));
        let ttl_secs = env
            .get_or_default("KASRA_CATALOG_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)
            .trim()
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("KASRA_CATALOG_CACHE_TTL_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            api_base_url,
            state_dir,
            catalog_cache_ttl: Duration::from_secs(ttl_secs),
            sentry_dsn: env.get_optional("SENTRY_DSN").map(SecretString::from),
            sentry_environment: env.get_optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at `base_url` with every other value defaulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not an absolute http(s) URL.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url("api_base_url", base_url)?,
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            catalog_cache_ttl: Duration::from_secs(300),
            sentry_dsn: None,
            sentry_environment: None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct EnvSource<F>(F);

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating blank values as unset.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key)
            .unwrap_or_else(|| default.to_string())
    }
}

/// Parse the API root, normalizing it to end with a slash so joins append.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:3000/api/");
        assert_eq!(config.state_dir, PathBuf::from(".kasra"));
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("KASRA_API_BASE_URL", "https://shop.example.ir/api/"),
            ("KASRA_STATE_DIR", "/tmp/kasra"),
            ("KASRA_CATALOG_CACHE_TTL_SECS", "60"),
            ("SENTRY_ENVIRONMENT", "staging"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url.as_str(), "https://shop.example.ir/api/");
        assert_eq!(config.state_dir, PathBuf::from("/tmp/kasra"));
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(60));
        assert_eq!(config.sentry_environment.as_deref(), Some("staging"));
    }

    #[test]
    fn test_invalid_ttl() {
        let err =
            StorefrontConfig::from_lookup(lookup(&[("KASRA_CATALOG_CACHE_TTL_SECS", "soon")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "KASRA_CATALOG_CACHE_TTL_SECS"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(StorefrontConfig::for_base_url("not a url").is_err());
        assert!(StorefrontConfig::for_base_url("ftp://example.com/api").is_err());
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config =
            StorefrontConfig::from_lookup(lookup(&[("SENTRY_DSN", "  "), ("KASRA_STATE_DIR", "")]))
                .unwrap();
        assert!(config.sentry_dsn.is_none());
        assert_eq!(config.state_dir, PathBuf::from(".kasra"));
    }

    #[test]
    fn test_debug_redacts_dsn() {
        let config = StorefrontConfig::from_lookup(lookup(&[(
            "SENTRY_DSN",
            "https://super_secret_key@o1.ingest.sentry.io/1",
        )]))
        .unwrap();
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_key"));
    }
}
