//! Error types for profile acquisition.
//!
//! Only page-level, session-level and upstream failures are represented here.
//! Per-field and per-section absences never become errors; the extractor
//! absorbs them into empty or omitted values.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type for acquisition operations.
pub type AcquireResult<T> = Result<T, AcquireError>;

/// Errors that cross the acquisition boundary.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The profile page never reached a recognizable rendered state.
    #[error("profile page did not render within {timeout:?}: {identifier}")]
    LoadFailure {
        identifier: String,
        timeout: Duration,
    },

    /// The login flow could not complete; the session has been torn down.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The remote data API answered with a non-success status.
    #[error("upstream API returned {status}: {detail}")]
    Upstream { status: u16, detail: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("browser automation error: {0}")]
    Automation(#[from] AutomationError),

    /// A profile load was attempted on a session that never logged in.
    #[error("session is not authenticated")]
    NotAuthenticated,

    #[error("configuration error: {0}")]
    Config(String),

    /// The background acquisition task panicked or was aborted.
    #[error("acquisition task failed: {0}")]
    Task(String),
}

impl AcquireError {
    /// Caller-facing description of a failed acquisition.
    ///
    /// Internal detail stays in logs; users only learn that the profile
    /// could not be obtained.
    pub fn user_message(&self) -> &'static str {
        match self {
            AcquireError::Config(_) => "profile acquisition is not configured",
            AcquireError::Upstream { status: 404, .. } | AcquireError::LoadFailure { .. } => {
                "profile not found"
            }
            _ => "profile unavailable",
        }
    }
}

/// Failures raised by a browser automation backend.
///
/// Element lookups failing is an expected condition in many places; callers
/// decide whether it is fatal.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("protocol error: {0}")]
    Protocol(String),

    /// No usable browser backend (feature disabled or browser missing).
    #[error("browser unavailable: {0}")]
    Unavailable(String),
}

/// Failures loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// An explicitly requested config file does not exist.
    #[error("config file not found: {}", .0.display())]
    Missing(PathBuf),
}

/// Failures reading or writing the persisted cooldown marker.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cooldown marker I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid cooldown marker timestamp: {0}")]
    Parse(#[from] chrono::ParseError),
}
