//! services/portal/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use booking_portal_core::domain::SortKey;
use reqwest::Url;
use std::path::PathBuf;
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
    pub api_base_url: Url,
    pub session_file: PathBuf,
    pub login_route: String,
    pub home_route: String,
    pub sort_key: SortKey,
    pub log_level: Level,
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

        // --- Remote API ---
        let base_url_str = std::env::var("PORTAL_API_BASE_URL")
            .map_err(|_| ConfigError::MissingVar("PORTAL_API_BASE_URL".to_string()))?;
        let api_base_url = parse_base_url(&base_url_str)?;

        // --- Local Session Persistence ---
        let session_file = std::env::var("PORTAL_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.portal/session.json"));

        // --- Routes ---
        let login_route =
            std::env::var("PORTAL_LOGIN_ROUTE").unwrap_or_else(|_| "/login".to_string());
        let home_route = std::env::var("PORTAL_HOME_ROUTE").unwrap_or_else(|_| "/".to_string());

        // --- Listing ---
        let sort_key = match std::env::var("PORTAL_SORT_KEY") {
            Ok(raw) => raw
                .trim()
                .to_lowercase()
                .parse::<SortKey>()
                .map_err(|e| ConfigError::InvalidValue("PORTAL_SORT_KEY".to_string(), e))?,
            Err(_) => SortKey::default(),
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            api_base_url,
            session_file,
            login_route,
            home_route,
            sort_key,
            log_level,
        })
    }
}

/// Parses the API base URL, making sure it ends in `/` so relative endpoint
/// paths join beneath it rather than replacing its last segment.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    let url = Url::parse(&normalized).map_err(|e| {
        ConfigError::InvalidValue("PORTAL_API_BASE_URL".to_string(), e.to_string())
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidValue(
            "PORTAL_API_BASE_URL".to_string(),
            format!("'{}' cannot be used as a base URL", raw),
        ));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = parse_base_url("http://localhost:4000/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:4000/api/");
        assert_eq!(
            url.join("user/getAppointments").unwrap().as_str(),
            "http://localhost:4000/api/user/getAppointments"
        );
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        assert!(matches!(
            parse_base_url("not a url"),
            Err(ConfigError::InvalidValue(_, _))
        ));
        assert!(parse_base_url("mailto:someone@example.com").is_err());
    }

    // Environment variables are process-global, so every env-driven case lives
    // in this one test.
    #[test]
    fn test_from_env() {
        std::env::remove_var("PORTAL_API_BASE_URL");
        assert!(matches!(Config::from_env(), Err(ConfigError::MissingVar(_))));

        std::env::set_var("PORTAL_API_BASE_URL", "http://localhost:4000/api");
        std::env::remove_var("PORTAL_SESSION_FILE");
        std::env::remove_var("PORTAL_LOGIN_ROUTE");
        std::env::remove_var("PORTAL_HOME_ROUTE");
        std::env::remove_var("PORTAL_SORT_KEY");
        std::env::set_var("RUST_LOG", "debug");
        let config = Config::from_env().unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:4000/api/");
        assert_eq!(config.session_file, PathBuf::from("./.portal/session.json"));
        assert_eq!(config.login_route, "/login");
        assert_eq!(config.home_route, "/");
        assert_eq!(config.sort_key, SortKey::Date);
        assert_eq!(config.log_level, Level::DEBUG);

        std::env::set_var("PORTAL_SORT_KEY", "Upcoming");
        assert_eq!(Config::from_env().unwrap().sort_key, SortKey::Upcoming);
        std::env::set_var("PORTAL_SORT_KEY", "newest");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidValue(var, _)) if var == "PORTAL_SORT_KEY"
        ));
        std::env::remove_var("PORTAL_SORT_KEY");

        std::env::set_var("RUST_LOG", "chatty");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidValue(var, _)) if var == "RUST_LOG"
        ));
        std::env::remove_var("RUST_LOG");
    }
}
