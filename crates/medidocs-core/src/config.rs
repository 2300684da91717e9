//! Configuration module
//!
//! Client configuration read from the environment (and `.env` when present).

use std::env;
use std::time::Duration;

use crate::error::DocumentError;

// Common constants
const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1/fileupload/fileuploadapi/";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const PREVIEW_REVOKE_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base endpoint of the file upload API, always ending in `/`.
    pub api_url: String,
    /// Whether `api_url` came from the environment rather than the built-in default.
    pub api_url_explicit: bool,
    pub request_timeout_secs: u64,
    pub preview_revoke_secs: u64,
    pub environment: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_url_explicit: false,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            preview_revoke_secs: PREVIEW_REVOKE_SECS,
            environment: "development".to_string(),
        }
    }
}

impl ClientConfig {
    /// Config pointing at an explicit base endpoint, other settings at their defaults.
    pub fn with_api_url(api_url: &str) -> Self {
        Self {
            api_url: normalize_base_url(api_url),
            api_url_explicit: true,
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self, DocumentError> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let explicit_url = env::var("MEDIDOCS_API_URL")
            .or_else(|_| env::var("API_URL"))
            .ok()
            .filter(|u| !u.trim().is_empty());

        let config = Self {
            api_url_explicit: explicit_url.is_some(),
            api_url: normalize_base_url(explicit_url.as_deref().unwrap_or(DEFAULT_API_URL)),
            request_timeout_secs: parse_secs(
                "MEDIDOCS_TIMEOUT_SECS",
                env::var("MEDIDOCS_TIMEOUT_SECS").ok(),
                REQUEST_TIMEOUT_SECS,
            )?,
            preview_revoke_secs: parse_secs(
                "MEDIDOCS_PREVIEW_REVOKE_SECS",
                env::var("MEDIDOCS_PREVIEW_REVOKE_SECS").ok(),
                PREVIEW_REVOKE_SECS,
            )?,
            environment,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the client is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), DocumentError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(DocumentError::Config(format!(
                "API URL must be an http(s) URL, got {}",
                self.api_url
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(DocumentError::Config(
                "MEDIDOCS_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        if self.is_production() {
            if !self.api_url_explicit {
                return Err(DocumentError::Config(
                    "MEDIDOCS_API_URL must be set in production".to_string(),
                ));
            }
            let host = self
                .api_url
                .split("://")
                .nth(1)
                .unwrap_or_default()
                .to_lowercase();
            if host.starts_with("localhost") || host.starts_with("127.0.0.1") {
                return Err(DocumentError::Config(
                    "MEDIDOCS_API_URL cannot point to localhost in production".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn preview_revoke_delay(&self) -> Duration {
        Duration::from_secs(self.preview_revoke_secs)
    }
}

/// Read a seconds value; unset means `default`, anything unparsable is a config error.
fn parse_secs(name: &str, value: Option<String>, default: u64) -> Result<u64, DocumentError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| DocumentError::Config(format!("{} must be a valid number", name))),
    }
}

fn normalize_base_url(url: &str) -> String {
    format!("{}/", url.trim().trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.is_production());
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.preview_revoke_delay(), Duration::from_secs(10));
    }

    #[test]
    fn test_base_url_is_normalized() {
        let config = ClientConfig::with_api_url("https://records.example.org/api/upload//");
        assert_eq!(config.api_url, "https://records.example.org/api/upload/");
        let config = ClientConfig::with_api_url("https://records.example.org/api/upload");
        assert_eq!(config.api_url, "https://records.example.org/api/upload/");
    }

    #[test]
    fn test_seconds_values_are_parsed_strictly() {
        assert_eq!(parse_secs("MEDIDOCS_PREVIEW_REVOKE_SECS", None, 10), Ok(10));
        assert_eq!(
            parse_secs("MEDIDOCS_PREVIEW_REVOKE_SECS", Some(" 30 ".into()), 10),
            Ok(30)
        );

        for name in ["MEDIDOCS_TIMEOUT_SECS", "MEDIDOCS_PREVIEW_REVOKE_SECS"] {
            let err = parse_secs(name, Some("ten".into()), 10).unwrap_err();
            assert_eq!(
                err,
                DocumentError::Config(format!("{} must be a valid number", name))
            );
        }
    }

    #[test]
    fn test_rejects_non_http_url() {
        let config = ClientConfig::with_api_url("ftp://files.example.org/");
        assert!(matches!(config.validate(), Err(DocumentError::Config(_))));
    }

    #[test]
    fn test_production_requires_explicit_remote_url() {
        let mut config = ClientConfig::default();
        config.environment = "Production".to_string();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::with_api_url("http://localhost:8000/api/");
        config.environment = "prod".to_string();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::with_api_url("https://records.example.org/api/");
        config.environment = "production".to_string();
        assert!(config.validate().is_ok());
    }
}
