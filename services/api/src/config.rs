//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub explain_model: String,
    pub max_output_tokens: u32,
    pub generation_timeout: Duration,
    pub pdf_converter: String,
    pub allowed_origin: String,
    pub max_input_bytes: usize,
    pub session_ttl: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address = parse_or(&lookup, "BIND_ADDRESS", SocketAddr::from(([0, 0, 0, 0], 3000)))?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Generation Service ---
        // The key is consumed once, when the shared client is built at startup.
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;
        let openai_base_url = lookup("OPENAI_BASE_URL").filter(|u| !u.trim().is_empty());
        let explain_model = lookup("EXPLAIN_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());
        let max_output_tokens = parse_or(&lookup, "MAX_OUTPUT_TOKENS", 8000u32)?;
        let generation_timeout_secs = parse_or(&lookup, "GENERATION_TIMEOUT_SECS", 120u64)?;
        if generation_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "GENERATION_TIMEOUT_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        // --- Export & Web Settings ---
        let pdf_converter = lookup("PDF_CONVERTER").unwrap_or_else(|| "wkhtmltopdf".to_string());
        let allowed_origin =
            lookup("ALLOWED_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());
        let max_input_bytes = parse_or(&lookup, "MAX_INPUT_BYTES", 1024 * 1024usize)?;
        let session_ttl_secs = parse_or(&lookup, "SESSION_TTL_SECS", 3600u64)?;

        Ok(Self {
            bind_address,
            log_level,
            openai_api_key,
            openai_base_url,
            explain_model,
            max_output_tokens,
            generation_timeout: Duration::from_secs(generation_timeout_secs),
            pdf_converter,
            allowed_origin,
            max_input_bytes,
            session_ttl: Duration::from_secs(session_ttl_secs),
        })
    }
}

/// Parses `key` if set, otherwise falls back to `default`.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_key_is_set() {
        let config = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.explain_model, "gpt-4o-mini");
        assert_eq!(config.pdf_converter, "wkhtmltopdf");
        assert_eq!(config.max_input_bytes, 1024 * 1024);
        assert_eq!(config.session_ttl, Duration::from_secs(3600));
        assert_eq!(config.generation_timeout, Duration::from_secs(120));
        assert!(config.openai_base_url.is_none());
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref v) if v == "OPENAI_API_KEY"));
    }

    #[test]
    fn invalid_values_are_reported_by_name() {
        let err = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("BIND_ADDRESS", "not-an-address"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v, _) if v == "BIND_ADDRESS"));

        let err = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("RUST_LOG", "chatty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v, _) if v == "RUST_LOG"));

        let err = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("SESSION_TTL_SECS", "-5"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v, _) if v == "SESSION_TTL_SECS"));

        let err = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("GENERATION_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v, _) if v == "GENERATION_TIMEOUT_SECS"));
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("EXPLAIN_MODEL", "gpt-4o"),
            ("MAX_OUTPUT_TOKENS", "4000"),
            ("RUST_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.explain_model, "gpt-4o");
        assert_eq!(config.max_output_tokens, 4000);
        assert_eq!(config.log_level, Level::DEBUG);
    }
}
