//! Automation backend seam.
//!
//! The session manager only talks to these traits, so the Chromium backend
//! can be replaced by a scripted fake in tests.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::BrowserSettings;
use crate::error::AutomationError;

pub type AutomationResult<T> = Result<T, AutomationError>;

/// How to create an automation handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub user_agent: String,
    /// Element lookups keep retrying for this long before failing.
    pub implicit_wait: Duration,
    /// Budget for a single navigation or DevTools request.
    pub request_timeout: Duration,
    pub chrome_args: Vec<String>,
    pub remote_url: Option<String>,
    pub proxy: Option<String>,
}

impl LaunchOptions {
    pub fn from_settings(settings: &BrowserSettings) -> Self {
        Self {
            headless: settings.headless,
            window_width: settings.window_width,
            window_height: settings.window_height,
            user_agent: settings.user_agent.clone(),
            implicit_wait: settings.implicit_wait(),
            request_timeout: settings.page_load_timeout(),
            chrome_args: settings.chrome_args.clone(),
            remote_url: settings.remote_url.clone(),
            proxy: settings.proxy.clone(),
        }
    }

    /// Launch arguments for a local browser.
    pub fn chrome_args(&self) -> Vec<String> {
        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            format!("--window-size={},{}", self.window_width, self.window_height),
            format!("--user-agent={}", self.user_agent),
        ];

        if let Some(ref proxy) = self.proxy {
            args.push(format!("--proxy-server={}", proxy));
        }

        args.extend(self.chrome_args.iter().cloned());
        args
    }
}

/// Creates automation handles.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, options: &LaunchOptions) -> AutomationResult<Box<dyn BrowserHandle>>;
}

/// One live automation handle: a single browser tab.
#[async_trait]
pub trait BrowserHandle: Send + Sync {
    async fn navigate(&self, url: &str) -> AutomationResult<()>;

    async fn current_url(&self) -> AutomationResult<String>;

    /// Type text into the element matching `selector`.
    async fn type_into(&self, selector: &str, text: &str) -> AutomationResult<()>;

    async fn click(&self, selector: &str) -> AutomationResult<()>;

    /// Whether an element matching `selector` appears within `timeout`.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> AutomationResult<bool>;

    /// Rendered HTML of the current page.
    async fn content(&self) -> AutomationResult<String>;

    /// Release the underlying browser.
    async fn quit(&self) -> AutomationResult<()>;
}
