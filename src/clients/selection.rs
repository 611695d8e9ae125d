//! Configuration-driven choice of acquisition strategy.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use super::{ApiClient, BrowserClient, ProfileSource};
use crate::config::Settings;
use crate::error::AcquireResult;

/// Acquisition strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AcquisitionStrategy {
    /// Remote data API (default).
    #[default]
    Api,
    /// Logged-in browser session.
    Browser,
}

impl AcquisitionStrategy {
    /// Parse a strategy name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "api" | "proxycurl" => Some(Self::Api),
            "browser" | "selenium" => Some(Self::Browser),
            _ => None,
        }
    }

    /// Strategy for a configured value. Absent or unrecognized means API.
    pub fn from_config(value: Option<&str>) -> Self {
        match value {
            None => Self::default(),
            Some(s) => Self::parse(s).unwrap_or_else(|| {
                warn!("Unknown acquisition strategy '{}', using api", s);
                Self::default()
            }),
        }
    }
}

impl fmt::Display for AcquisitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => write!(f, "api"),
            Self::Browser => write!(f, "browser"),
        }
    }
}

impl FromStr for AcquisitionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!(
                "Invalid acquisition strategy '{}'. Valid options: api, browser",
                s
            )
        })
    }
}

/// Build the client for the configured strategy.
pub async fn build_source(settings: &Settings) -> AcquireResult<Box<dyn ProfileSource>> {
    let strategy = AcquisitionStrategy::from_config(settings.strategy.as_deref());
    tracing::debug!("Using {} acquisition strategy", strategy);

    Ok(match strategy {
        AcquisitionStrategy::Api => Box::new(ApiClient::new(&settings.api)?),
        AcquisitionStrategy::Browser => Box::new(BrowserClient::from_settings(&settings.browser).await),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_or_unknown_defaults_to_api() {
        assert_eq!(AcquisitionStrategy::from_config(None), AcquisitionStrategy::Api);
        assert_eq!(
            AcquisitionStrategy::from_config(Some("carrier-pigeon")),
            AcquisitionStrategy::Api
        );
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            AcquisitionStrategy::from_config(Some(" Browser ")),
            AcquisitionStrategy::Browser
        );
        assert_eq!("API".parse::<AcquisitionStrategy>(), Ok(AcquisitionStrategy::Api));
        assert!("ftp".parse::<AcquisitionStrategy>().is_err());
    }

    #[tokio::test]
    async fn test_build_source_follows_settings() {
        let source = build_source(&Settings::default()).await.unwrap();
        assert_eq!(source.strategy(), AcquisitionStrategy::Api);

        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.strategy = Some("browser".to_string());
        settings.browser.cooldown_dir = Some(dir.path().to_path_buf());
        let source = build_source(&settings).await.unwrap();
        assert_eq!(source.strategy(), AcquisitionStrategy::Browser);

        let record = source.get_profile("https://www.linkedin.com/in/x", true).await.unwrap();
        assert_eq!(record.get_str("full_name"), Some("Test Test"));
    }
}
