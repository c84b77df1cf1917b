//! Client configuration.
//!
//! Settings come from the process environment (optionally seeded from a
//! `.env` file): the API origin, where the session is persisted, the request
//! timeout and the default flash lifetime.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_SESSION_FILE: &str = "~/.helpdesk/session.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// Server origin without the `/api` suffix and without a trailing slash.
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub request_timeout_seconds: u64,
    pub flash_timeout_ms: u64,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_base = lookup("HELPDESK_API_BASE_URL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = raw_base.trim_end_matches('/').to_string();

        let raw_session_file = lookup("HELPDESK_SESSION_FILE")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_FILE.to_string());
        let session_file = expanduser::expanduser(&raw_session_file)
            .with_context(|| format!("HELPDESK_SESSION_FILE could not be expanded: {raw_session_file}"))?;

        let request_timeout_seconds = lookup("HELPDESK_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|| "20".to_string())
            .trim()
            .parse::<u64>()
            .context("HELPDESK_REQUEST_TIMEOUT_SECONDS must be a valid number")?;

        let flash_timeout_ms = lookup("HELPDESK_FLASH_TIMEOUT_MS")
            .unwrap_or_else(|| "2500".to_string())
            .trim()
            .parse::<u64>()
            .context("HELPDESK_FLASH_TIMEOUT_MS must be a valid number")?;

        Ok(Config {
            api_base_url,
            session_file,
            request_timeout_seconds,
            flash_timeout_ms,
        })
    }

    /// Root every REST path is appended to.
    pub fn api_root(&self) -> String {
        format!("{}/api", self.api_base_url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn flash_timeout(&self) -> Duration {
        Duration::from_millis(self.flash_timeout_ms)
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
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api_root(), "http://127.0.0.1:8000/api");
        assert_eq!(config.request_timeout_seconds, 20);
        assert_eq!(config.flash_timeout(), Duration::from_millis(2500));
        assert!(config.session_file.ends_with(".helpdesk/session.json"));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = Config::from_lookup(lookup_from(&[(
            "HELPDESK_API_BASE_URL",
            " https://desk.example.com/ ",
        )]))
        .unwrap();
        assert_eq!(config.api_root(), "https://desk.example.com/api");
    }

    #[test]
    fn test_invalid_number_names_variable() {
        let error = Config::from_lookup(lookup_from(&[(
            "HELPDESK_FLASH_TIMEOUT_MS",
            "soon",
        )]))
        .unwrap_err();
        assert!(error.to_string().contains("HELPDESK_FLASH_TIMEOUT_MS"));
    }
}
