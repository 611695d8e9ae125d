//! Settings for profile acquisition.
//!
//! Values come from a TOML file (when one is found) and are then overridden
//! by environment variables. Every field has a default, so an empty or
//! missing file yields a usable configuration for mock mode.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Application name used for config and data directories.
pub const APP_NAME: &str = "profacquire";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "profacquire.toml";

/// Realistic desktop browser identification string.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Top-level settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Acquisition strategy: "api" or "browser". Absent means API.
    #[serde(default)]
    pub strategy: Option<String>,

    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub browser: BrowserSettings,

    /// File these settings were read from, if any.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

/// Remote data-API strategy settings.
#[derive(Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_api_endpoint")]
    pub endpoint: String,

    /// Bearer credential.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

/// Browser strategy settings.
#[derive(Clone, Deserialize)]
pub struct BrowserSettings {
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Run in headless mode (default: true).
    #[serde(default = "default_headless")]
    pub headless: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Seconds to keep retrying an element lookup before giving up.
    #[serde(default = "default_implicit_wait")]
    pub implicit_wait_secs: u64,

    #[serde(default = "default_login_timeout")]
    pub login_timeout_secs: u64,

    #[serde(default = "default_page_load_timeout")]
    pub page_load_timeout_secs: u64,

    /// Minimum seconds between two live acquisitions for one credential.
    #[serde(default = "default_cooldown")]
    pub cooldown_secs: u64,

    /// Directory holding per-credential cooldown markers.
    #[serde(default)]
    pub cooldown_dir: Option<PathBuf>,

    #[serde(default = "default_login_url")]
    pub login_url: String,

    /// Element whose presence marks a rendered profile page.
    #[serde(default = "default_profile_ready_selector")]
    pub profile_ready_selector: String,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to an existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Proxy server URL (e.g., "socks5://127.0.0.1:1080").
    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_api_endpoint() -> String {
    "https://nubela.co/proxycurl/api/v2/linkedin".to_string()
}

fn default_api_timeout() -> u64 {
    10
}

fn default_headless() -> bool {
    true
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_implicit_wait() -> u64 {
    10
}

fn default_login_timeout() -> u64 {
    15
}

fn default_page_load_timeout() -> u64 {
    15
}

fn default_cooldown() -> u64 {
    120
}

fn default_login_url() -> String {
    "https://www.linkedin.com/login".to_string()
}

fn default_profile_ready_selector() -> String {
    "h1[class*='text-heading']".to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            endpoint: default_api_endpoint(),
            api_key: None,
            timeout_secs: default_api_timeout(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            headless: default_headless(),
            user_agent: default_user_agent(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            implicit_wait_secs: default_implicit_wait(),
            login_timeout_secs: default_login_timeout(),
            page_load_timeout_secs: default_page_load_timeout(),
            cooldown_secs: default_cooldown(),
            cooldown_dir: None,
            login_url: default_login_url(),
            profile_ready_selector: default_profile_ready_selector(),
            chrome_args: Vec::new(),
            remote_url: None,
            proxy: None,
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl BrowserSettings {
    pub fn implicit_wait(&self) -> Duration {
        Duration::from_secs(self.implicit_wait_secs)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Resolved directory for cooldown markers.
    pub fn cooldown_dir(&self) -> PathBuf {
        self.cooldown_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|dir| dir.join(APP_NAME))
                .unwrap_or_else(|| PathBuf::from(".").join(format!(".{}", APP_NAME)))
        })
    }
}

fn redact(secret: &Option<String>) -> &'static str {
    if secret.is_some() {
        "<redacted>"
    } else {
        "<unset>"
    }
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact(&self.api_key))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl fmt::Debug for BrowserSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserSettings")
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("headless", &self.headless)
            .field("user_agent", &self.user_agent)
            .field("window_width", &self.window_width)
            .field("window_height", &self.window_height)
            .field("implicit_wait_secs", &self.implicit_wait_secs)
            .field("login_timeout_secs", &self.login_timeout_secs)
            .field("page_load_timeout_secs", &self.page_load_timeout_secs)
            .field("cooldown_secs", &self.cooldown_secs)
            .field("cooldown_dir", &self.cooldown_dir)
            .field("login_url", &self.login_url)
            .field("profile_ready_selector", &self.profile_ready_selector)
            .field("chrome_args", &self.chrome_args)
            .field("remote_url", &self.remote_url)
            .field("proxy", &self.proxy)
            .finish()
    }
}

impl Settings {
    /// Load settings, applying environment overrides.
    ///
    /// Discovery order: `explicit` (must exist), `./profacquire.toml`,
    /// `<config_dir>/profacquire/config.toml`, then built-in defaults.
    pub async fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match discover_path(explicit)? {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::load_from_path(&path).await?
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                Self::default()
            }
        };

        Ok(settings.with_env_overrides())
    }

    /// Parse a TOML config file. Environment overrides are not applied.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let mut settings: Settings =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        settings.source_path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Empty values are ignored.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(val) = var("ACQUISITION_STRATEGY") {
            self.strategy = Some(val);
        }
        if let Some(val) = var("PROFILE_API_ENDPOINT") {
            self.api.endpoint = val;
        }
        if let Some(val) = var("PROXYCURL_API_KEY") {
            self.api.api_key = Some(val);
        }
        if let Some(val) = var("LINKEDIN_USERNAME") {
            self.browser.username = Some(val);
        }
        if let Some(val) = var("LINKEDIN_PASSWORD") {
            self.browser.password = Some(val);
        }
        if let Some(val) = var("BROWSER_URL") {
            self.browser.remote_url = Some(val);
        }
        if let Some(val) = var("COOLDOWN_SECS") {
            match val.trim().parse() {
                Ok(secs) => self.browser.cooldown_secs = secs,
                Err(_) => tracing::warn!("Ignoring invalid COOLDOWN_SECS value: {}", val),
            }
        }

        // Set proxy from SOCKS_PROXY if not already configured
        if self.browser.proxy.is_none() {
            if let Some(val) = var("SOCKS_PROXY") {
                self.browser.proxy = Some(val);
            }
        }

        self
    }
}

/// Find the config file to load, if any.
fn discover_path(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    // Priority 1: Explicit --config flag
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        return Ok(Some(path.to_path_buf()));
    }

    // Priority 2: Working directory
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Ok(Some(local));
    }

    // Priority 3: User config directory
    Ok(dirs::config_dir()
        .map(|dir| dir.join(APP_NAME).join("config.toml"))
        .filter(|path| path.exists()))
}
