use crate::error::{LedgerError, Result};
use std::time::Duration;

pub const API_URL_VAR: &str = "PROGRESS_LEDGER_API_URL";
pub const TIMEOUT_VAR: &str = "PROGRESS_LEDGER_TIMEOUT_SECS";

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    /// Applied to every request so a stalled call ends in an error.
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads `PROGRESS_LEDGER_API_URL` and `PROGRESS_LEDGER_TIMEOUT_SECS`,
    /// falling back to the defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_values(
            std::env::var(API_URL_VAR).ok(),
            std::env::var(TIMEOUT_VAR).ok(),
        )
    }

    pub fn from_values(base_url: Option<String>, timeout_secs: Option<String>) -> Result<Self> {
        let mut config = match base_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(LedgerError::Config(format!(
                        "{} must be an http(s) URL, got '{}'",
                        API_URL_VAR, url
                    )));
                }
                Self::new(url)
            }
            _ => Self::default(),
        };

        if let Some(raw) = timeout_secs {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                LedgerError::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    TIMEOUT_VAR, raw
                ))
            })?;
            if secs == 0 {
                return Err(LedgerError::Config(format!(
                    "{} must be greater than zero",
                    TIMEOUT_VAR
                )));
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
