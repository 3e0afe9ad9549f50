//! Configuration module for environment variable parsing.
//!
//! Everything is read once at startup. A `.env` file in the working
//! directory is loaded first if present. Unlike optional tuning knobs,
//! the API token and the webhook public key are required: the process
//! refuses to start without them.

use std::env;
use std::fmt;
use std::fs;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "https://api.fordefi.com";

/// Error raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("cannot read public key file {path}: {source}")]
    KeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid webhook public key: {0}")]
    InvalidPublicKey(String),
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Base URL of the Fordefi API
    pub api_base_url: Url,

    /// Bearer token of the Fordefi API user
    pub api_user_token: String,

    /// PEM-encoded public key Fordefi signs webhooks with
    pub public_key_pem: String,

    /// Timeout for each outbound API call in milliseconds
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api_base_url = optional_var("FORDEFI_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        Ok(Config {
            port: parse_var("PORT", 8000)?,
            api_base_url: parse_base_url("FORDEFI_API_BASE_URL", &api_base_url)?,
            api_user_token: required_var("FORDEFI_API_USER_TOKEN")?,
            public_key_pem: load_public_key_pem()?,
            request_timeout_ms: parse_var("REQUEST_TIMEOUT_MS", 10_000)?,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("api_base_url", &self.api_base_url.as_str())
            .field("api_user_token", &"<redacted>")
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish_non_exhaustive()
    }
}

/// Read the webhook public key, inline PEM taking precedence over a file path.
fn load_public_key_pem() -> Result<String, ConfigError> {
    if let Some(pem) = optional_var("FORDEFI_PUBLIC_KEY_PEM") {
        return Ok(pem);
    }

    let path = required_var("FORDEFI_PUBLIC_KEY_PATH")?;
    read_key_file(&path)
}

fn read_key_file(path: &str) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::KeyFile {
        path: path.to_string(),
        source,
    })
}

/// Read an env var, treating empty or whitespace-only values as unset.
fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    optional_var(name).ok_or(ConfigError::Missing(name))
}

/// Parse an optional env var, falling back to `default` when unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional_var(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw,
        }),
    }
}

fn parse_base_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::Invalid {
        name,
        value: raw.to_string(),
    };

    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(invalid());
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_var_valid() {
        env::set_var("TEST_PARSE_VAR_VALID", " 1500 ");
        let result: u64 = parse_var("TEST_PARSE_VAR_VALID", 0).unwrap();
        assert_eq!(result, 1500);
        env::remove_var("TEST_PARSE_VAR_VALID");
    }

    #[test]
    fn test_parse_var_default() {
        let result: u16 = parse_var("NONEXISTENT_VAR", 8000).unwrap();
        assert_eq!(result, 8000);
    }

    #[test]
    fn test_parse_var_invalid() {
        env::set_var("TEST_PARSE_VAR_INVALID", "eighty");
        let result: Result<u16, _> = parse_var("TEST_PARSE_VAR_INVALID", 8000);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: "TEST_PARSE_VAR_INVALID", .. })
        ));
        env::remove_var("TEST_PARSE_VAR_INVALID");
    }

    #[test]
    fn test_required_var() {
        assert!(matches!(
            required_var("NONEXISTENT_REQUIRED_VAR"),
            Err(ConfigError::Missing("NONEXISTENT_REQUIRED_VAR"))
        ));

        env::set_var("TEST_REQUIRED_BLANK", "   ");
        assert!(required_var("TEST_REQUIRED_BLANK").is_err());
        env::remove_var("TEST_REQUIRED_BLANK");
    }

    #[test]
    fn test_parse_base_url() {
        let url = parse_base_url("X", "https://api.fordefi.com").unwrap();
        assert_eq!(url.host_str(), Some("api.fordefi.com"));

        assert!(parse_base_url("X", "not a url").is_err());
        assert!(parse_base_url("X", "mailto:ops@example.com").is_err());
        assert!(parse_base_url("X", "ftp://example.com").is_err());
    }

    #[test]
    fn test_read_key_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "-----BEGIN PUBLIC KEY-----").unwrap();

        let pem = read_key_file(file.path().to_str().unwrap()).unwrap();
        assert!(pem.starts_with("-----BEGIN PUBLIC KEY-----"));

        assert!(matches!(
            read_key_file("/nonexistent/fordefi.pem"),
            Err(ConfigError::KeyFile { .. })
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = Config {
            port: 8000,
            api_base_url: Url::parse(DEFAULT_API_BASE_URL).unwrap(),
            api_user_token: "super-secret".to_string(),
            public_key_pem: String::new(),
            request_timeout_ms: 10_000,
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }
}
