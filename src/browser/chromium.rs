//! Chromium backend over the DevTools protocol (chromiumoxide).

#[cfg(feature = "browser")]
use std::path::{Path, PathBuf};
#[cfg(feature = "browser")]
use std::time::Duration;

use async_trait::async_trait;
#[cfg(feature = "browser")]
use tokio::sync::Mutex;
#[cfg(feature = "browser")]
use tokio::time::Instant;
#[cfg(feature = "browser")]
use tracing::{debug, info};

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::element::Element;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;

use super::driver::{AutomationResult, BrowserHandle, BrowserLauncher, LaunchOptions};
use crate::error::AutomationError;

/// Interval between element lookups while waiting.
#[cfg(feature = "browser")]
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launches local Chrome or attaches to a remote DevTools endpoint.
#[derive(Debug, Default, Clone)]
pub struct ChromiumLauncher;

impl ChromiumLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "browser")]
impl ChromiumLauncher {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    const CHROME_COMMANDS: &'static [&'static str] = &[
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ];

    /// Find a Chrome executable on this machine.
    fn find_chrome() -> AutomationResult<PathBuf> {
        if let Some(path) = Self::CHROME_PATHS
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
        {
            info!("Found Chrome at: {}", path.display());
            return Ok(path.to_path_buf());
        }

        if let Some(path) = Self::CHROME_COMMANDS
            .iter()
            .find_map(|cmd| which::which(cmd).ok())
        {
            info!("Found Chrome in PATH: {}", path.display());
            return Ok(path);
        }

        Err(AutomationError::Unavailable(
            "Chrome/Chromium not found. Please install it:\n\
             - Arch/Manjaro: sudo pacman -S chromium\n\
             - Ubuntu/Debian: sudo apt install chromium-browser\n\
             - Fedora: sudo dnf install chromium\n\
             - Or set BROWSER_URL to a remote DevTools endpoint"
                .to_string(),
        ))
    }

    async fn launch_local(&self, options: &LaunchOptions) -> AutomationResult<Browser> {
        info!("Launching browser (headless={})", options.headless);

        let chrome_path = Self::find_chrome()?;
        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .window_size(options.window_width, options.window_height)
            .request_timeout(options.request_timeout);

        // with_head means NOT headless
        if !options.headless {
            builder = builder.with_head();
        }

        for arg in options.chrome_args() {
            builder = builder.arg(arg);
        }

        let config = builder.build().map_err(|e| {
            AutomationError::Unavailable(format!("Failed to build browser config: {}", e))
        })?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AutomationError::Unavailable(format!("Failed to launch browser: {}", e)))?;

        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(browser)
    }

    async fn connect_remote(&self, url: &str, options: &LaunchOptions) -> AutomationResult<Browser> {
        info!(
            "Connecting to remote browser at {} (timeout: {:?})",
            url, options.request_timeout
        );

        // Get WebSocket URL from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let unavailable =
            |e: reqwest::Error| AutomationError::Unavailable(format!("remote browser: {}", e));
        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .timeout(options.request_timeout)
            .send()
            .await
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AutomationError::Unavailable("No webSocketDebuggerUrl in response".to_string())
            })?;

        info!("Connecting to WebSocket: {}", ws_url);

        let handler_config = chromiumoxide::handler::HandlerConfig {
            request_timeout: options.request_timeout,
            ..Default::default()
        };

        let (browser, mut handler) = Browser::connect_with_config(ws_url, handler_config)
            .await
            .map_err(|e| {
                AutomationError::Unavailable(format!("Failed to connect to remote browser: {}", e))
            })?;

        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(browser)
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, options: &LaunchOptions) -> AutomationResult<Box<dyn BrowserHandle>> {
        let browser = match options.remote_url {
            Some(ref url) => self.connect_remote(url, options).await?,
            None => self.launch_local(options).await?,
        };

        let page = browser.new_page("about:blank").await.map_err(protocol)?;
        page.execute(SetUserAgentOverrideParams::new(options.user_agent.clone()))
            .await
            .map_err(protocol)?;

        Ok(Box::new(ChromiumHandle {
            browser: Mutex::new(Some(browser)),
            page,
            implicit_wait: options.implicit_wait,
            request_timeout: options.request_timeout,
            remote: options.remote_url.is_some(),
        }))
    }
}

#[cfg(feature = "browser")]
fn protocol(e: chromiumoxide::error::CdpError) -> AutomationError {
    AutomationError::Protocol(e.to_string())
}

/// A single tab in a launched or attached browser.
#[cfg(feature = "browser")]
struct ChromiumHandle {
    browser: Mutex<Option<Browser>>,
    page: Page,
    implicit_wait: Duration,
    request_timeout: Duration,
    /// Attached browsers are left running on quit.
    remote: bool,
}

#[cfg(feature = "browser")]
impl ChromiumHandle {
    /// Poll for an element until it appears or `timeout` elapses.
    async fn poll_element(&self, selector: &str, timeout: Duration) -> Option<Element> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.page.find_element(selector).await {
                Ok(element) => return Some(element),
                Err(e) if Instant::now() >= deadline => {
                    debug!("Element {} not found: {}", selector, e);
                    return None;
                }
                Err(_) => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }
    }

    async fn find(&self, selector: &str) -> AutomationResult<Element> {
        self.poll_element(selector, self.implicit_wait)
            .await
            .ok_or_else(|| AutomationError::ElementNotFound(selector.to_string()))
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl BrowserHandle for ChromiumHandle {
    async fn navigate(&self, url: &str) -> AutomationResult<()> {
        info!("Navigating to {}", url);
        tokio::time::timeout(self.request_timeout, self.page.goto(url))
            .await
            .map_err(|_| AutomationError::Timeout(self.request_timeout))?
            .map_err(|e| AutomationError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> AutomationResult<String> {
        Ok(self.page.url().await.map_err(protocol)?.unwrap_or_default())
    }

    async fn type_into(&self, selector: &str, text: &str) -> AutomationResult<()> {
        let element = self.find(selector).await?;
        element.click().await.map_err(protocol)?;
        element.type_str(text).await.map_err(protocol)?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> AutomationResult<()> {
        let element = self.find(selector).await?;
        element.click().await.map_err(protocol)?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> AutomationResult<bool> {
        debug!("Waiting for selector: {}", selector);
        Ok(self.poll_element(selector, timeout).await.is_some())
    }

    async fn content(&self) -> AutomationResult<String> {
        self.page.content().await.map_err(protocol)
    }

    async fn quit(&self) -> AutomationResult<()> {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return Ok(());
        };

        let _ = self.page.clone().close().await;
        if !self.remote {
            browser.close().await.map_err(protocol)?;
            let _ = browser.wait().await;
        }
        Ok(())
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, _options: &LaunchOptions) -> AutomationResult<Box<dyn BrowserHandle>> {
        Err(AutomationError::Unavailable(
            "Browser support not compiled. Rebuild with: cargo build --features browser"
                .to_string(),
        ))
    }
}

#[cfg(all(test, not(feature = "browser")))]
mod tests {
    use super::*;
    use crate::config::BrowserSettings;

    #[tokio::test]
    async fn test_stub_launcher_reports_missing_feature() {
        let options = LaunchOptions::from_settings(&BrowserSettings::default());
        let err = ChromiumLauncher::new().launch(&options).await.err().unwrap();
        assert!(err.to_string().contains("--features browser"));
    }
}
