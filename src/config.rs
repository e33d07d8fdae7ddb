//! Configuration management for the CareLink MCP Server
//!
//! All configuration is environment-sourced, read once at startup, and
//! passed down explicitly. In mock mode, API credentials are not required.

use crate::error::{EmrError, Result};

/// Log verbosity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn from_env(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("debug") => LogLevel::Debug,
            Some("warn") => LogLevel::Warn,
            Some("error") => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }

    /// Directive string for the tracing env filter
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration for the CareLink MCP Server
#[derive(Debug, Clone)]
pub struct Config {
    /// CareLink EMR API base URL
    pub api_url: String,

    /// CareLink EMR API key
    pub api_key: String,

    /// OAuth client credentials for the EMR API (unused until live mode lands)
    pub client_id: Option<String>,
    pub client_secret: Option<String>,

    /// Dashboard store connection (sync enabled only when both are present)
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,

    /// Whether to serve from the in-memory mock dataset
    pub mock_mode: bool,

    /// Log verbosity
    pub log_level: LogLevel,

    /// Outbound request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Mock mode is on when explicitly requested or when no API URL is set.
    pub fn from_env() -> Self {
        let api_url = std::env::var("CARELINK_API_URL").ok();
        let mock_mode = std::env::var("CARELINK_MOCK_MODE")
            .map(|v| v == "true")
            .unwrap_or(false)
            || api_url.is_none();

        let supabase_url = std::env::var("SUPABASE_URL").ok();
        let supabase_key = std::env::var("SUPABASE_ANON_KEY").ok();

        Self {
            api_url: api_url.unwrap_or_else(|| "https://api.carelink.example.com".to_string()),
            api_key: std::env::var("CARELINK_API_KEY").unwrap_or_default(),
            client_id: std::env::var("CARELINK_CLIENT_ID").ok(),
            client_secret: std::env::var("CARELINK_CLIENT_SECRET").ok(),
            supabase_url,
            supabase_key,
            mock_mode,
            log_level: LogLevel::from_env(std::env::var("LOG_LEVEL").ok()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30_000),
        }
    }

    /// Whether dashboard sync is enabled
    pub fn supabase_enabled(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_key.is_some()
    }

    /// Validate configuration for live (non-mock) use.
    ///
    /// Missing API settings outside mock mode are a hard startup failure.
    pub fn validate(&self) -> Result<()> {
        if self.mock_mode {
            return Ok(());
        }

        if self.api_url.is_empty() {
            return Err(EmrError::Config {
                message: "CARELINK_API_URL is required when not in mock mode".to_string(),
            });
        }
        if self.api_key.is_empty() {
            return Err(EmrError::Config {
                message: "CARELINK_API_KEY is required when not in mock mode".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            api_url: String::new(),
            api_key: String::new(),
            client_id: None,
            client_secret: None,
            supabase_url: None,
            supabase_key: None,
            mock_mode: true,
            log_level: LogLevel::Info,
            request_timeout_ms: 30_000,
        }
    }

    #[test]
    fn test_mock_mode_skips_validation() {
        let config = base_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_live_mode_requires_api_settings() {
        let config = Config {
            mock_mode: false,
            api_url: "https://emr.example.com".to_string(),
            ..base_config()
        };
        assert!(matches!(
            config.validate(),
            Err(EmrError::Config { .. })
        ));
    }

    #[test]
    fn test_supabase_requires_both_settings() {
        let mut config = base_config();
        assert!(!config.supabase_enabled());

        config.supabase_url = Some("https://proj.supabase.co".to_string());
        assert!(!config.supabase_enabled());

        config.supabase_key = Some("anon-key".to_string());
        assert!(config.supabase_enabled());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(
            LogLevel::from_env(Some("debug".to_string())),
            LogLevel::Debug
        );
        assert_eq!(LogLevel::from_env(Some("bogus".to_string())), LogLevel::Info);
        assert_eq!(LogLevel::from_env(None), LogLevel::Info);
    }
}
