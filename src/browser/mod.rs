//! Login-gated browser sessions.
//!
//! A [`SessionManager`] exclusively owns one automation handle and walks it
//! through `Uninitialized -> Ready -> Authenticated -> Closed`. Any
//! unrecoverable automation error during login moves it to `Failed`.
//! Sessions are not safe for concurrent use; callers serialize access.

mod chromium;
mod driver;

pub use chromium::ChromiumLauncher;
pub use driver::{AutomationResult, BrowserHandle, BrowserLauncher, LaunchOptions};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::BrowserSettings;
use crate::error::{AcquireError, AcquireResult, AutomationError};

/// URL fragments that only appear once a login went through.
const POST_LOGIN_MARKERS: &[&str] = &["feed", "checkpoint", "/in/"];

const USERNAME_FIELD: &str = "#username";
const PASSWORD_FIELD: &str = "#password";
const SUBMIT_BUTTON: &str = "button[type='submit']";

const LOGIN_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Lifecycle of a browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    /// Handle created, not logged in.
    Ready,
    Authenticated,
    Closed,
    /// Torn down after an unrecoverable automation error.
    Failed,
}

/// Login credential pair.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both halves of the pair, if configured.
    pub fn from_settings(settings: &BrowserSettings) -> Option<Self> {
        match (&settings.username, &settings.password) {
            (Some(username), Some(password)) => Some(Self::new(username, password)),
            _ => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Session parameters that do not change across acquisitions.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub launch: LaunchOptions,
    pub login_url: String,
    pub login_timeout: Duration,
    pub page_load_timeout: Duration,
    /// Presence of this element marks a rendered profile page.
    pub profile_ready_selector: String,
}

impl SessionConfig {
    pub fn from_settings(settings: &BrowserSettings) -> Self {
        Self {
            launch: LaunchOptions::from_settings(settings),
            login_url: settings.login_url.clone(),
            login_timeout: settings.login_timeout(),
            page_load_timeout: settings.page_load_timeout(),
            profile_ready_selector: settings.profile_ready_selector.clone(),
        }
    }
}

/// Owns one automation handle and its login state.
pub struct SessionManager {
    launcher: Arc<dyn BrowserLauncher>,
    config: SessionConfig,
    handle: Option<Box<dyn BrowserHandle>>,
    state: SessionState,
}

impl SessionManager {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, config: SessionConfig) -> Self {
        Self {
            launcher,
            config,
            handle: None,
            state: SessionState::Uninitialized,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Create the automation handle if there is none.
    ///
    /// Idempotent while `Ready` or `Authenticated`; a `Closed` or `Failed`
    /// session gets a fresh handle.
    pub async fn ensure_session(&mut self) -> AcquireResult<()> {
        if self.handle.is_some()
            && matches!(self.state, SessionState::Ready | SessionState::Authenticated)
        {
            return Ok(());
        }

        info!(
            "Starting browser session (headless={}, {}x{})",
            self.config.launch.headless,
            self.config.launch.window_width,
            self.config.launch.window_height
        );
        let handle = self.launcher.launch(&self.config.launch).await?;
        self.handle = Some(handle);
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Log in with `credentials`. No-op when already authenticated.
    ///
    /// All-or-nothing: on any failure the session is torn down, moved to
    /// `Failed`, and an authentication error is returned.
    pub async fn login(&mut self, credentials: &Credentials) -> AcquireResult<()> {
        if self.is_authenticated() {
            debug!("Session already authenticated");
            return Ok(());
        }

        self.ensure_session().await?;

        let result = match self.handle.as_deref() {
            Some(handle) => submit_login(handle, &self.config, credentials).await,
            None => Err(AutomationError::Unavailable("no browser session".to_string())),
        };

        match result {
            Ok(()) => {
                info!("Successfully logged in as {}", credentials.username);
                self.state = SessionState::Authenticated;
                Ok(())
            }
            Err(e) => {
                warn!("Login failed for {}: {}", credentials.username, e);
                self.teardown().await;
                self.state = SessionState::Failed;
                Err(AcquireError::Authentication(e.to_string()))
            }
        }
    }

    /// Navigate to a profile and return its rendered HTML.
    ///
    /// A page that fails to navigate in time, or never shows the ready
    /// marker, is a load failure; the session stays usable afterwards.
    pub async fn load_profile(&mut self, identifier: &str) -> AcquireResult<String> {
        if !self.is_authenticated() {
            return Err(AcquireError::NotAuthenticated);
        }
        let handle = self
            .handle
            .as_deref()
            .ok_or(AcquireError::NotAuthenticated)?;

        match handle.navigate(identifier).await {
            Ok(()) => {}
            Err(AutomationError::Timeout(timeout)) => {
                warn!("Profile navigation timed out after {:?}: {}", timeout, identifier);
                return Err(AcquireError::LoadFailure {
                    identifier: identifier.to_string(),
                    timeout,
                });
            }
            Err(e) => return Err(e.into()),
        }

        let timeout = self.config.page_load_timeout;
        if !handle
            .wait_for(&self.config.profile_ready_selector, timeout)
            .await?
        {
            warn!("Profile page did not render within {:?}: {}", timeout, identifier);
            return Err(AcquireError::LoadFailure {
                identifier: identifier.to_string(),
                timeout,
            });
        }

        Ok(handle.content().await?)
    }

    /// Release the handle if present and mark the session closed.
    ///
    /// Safe to call any number of times. A `Failed` session stays `Failed`.
    pub async fn close(&mut self) {
        self.teardown().await;
        if self.state != SessionState::Failed {
            self.state = SessionState::Closed;
        }
    }

    async fn teardown(&mut self) {
        if let Some(handle) = self.handle.take() {
            info!("Closing browser session");
            if let Err(e) = handle.quit().await {
                warn!("Error closing browser session: {}", e);
            }
        }
        if self.state == SessionState::Authenticated {
            self.state = SessionState::Ready;
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        // Last-resort guard: the handle's own Drop releases the browser
        // process if no orderly close ran.
        if self.handle.is_some() {
            warn!("Browser session dropped without close");
        }
    }
}

/// Fill and submit the login form, then wait for a post-login URL.
async fn submit_login(
    handle: &dyn BrowserHandle,
    config: &SessionConfig,
    credentials: &Credentials,
) -> AutomationResult<()> {
    handle.navigate(&config.login_url).await?;
    handle.type_into(USERNAME_FIELD, &credentials.username).await?;
    handle.type_into(PASSWORD_FIELD, &credentials.password).await?;
    handle.click(SUBMIT_BUTTON).await?;

    let deadline = Instant::now() + config.login_timeout;
    loop {
        let url = handle.current_url().await?;
        if POST_LOGIN_MARKERS.iter().any(|marker| url.contains(marker)) {
            debug!("Post-login URL reached: {}", url);
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(AutomationError::Timeout(config.login_timeout));
        }
        tokio::time::sleep(LOGIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted handle: login lands on `post_login_url`, profile pages
    /// render only when `profile_renders` is set.
    #[derive(Default)]
    struct FakeState {
        url: String,
        quits: usize,
        typed: Vec<(String, String)>,
    }

    struct FakeHandle {
        state: Arc<Mutex<FakeState>>,
        post_login_url: String,
        profile_renders: bool,
        missing_field: Option<&'static str>,
        navigation_stalls: bool,
    }

    #[async_trait]
    impl BrowserHandle for FakeHandle {
        async fn navigate(&self, url: &str) -> AutomationResult<()> {
            if self.navigation_stalls && url.contains("/in/") {
                return Err(AutomationError::Timeout(Duration::from_secs(30)));
            }
            self.state.lock().unwrap().url = url.to_string();
            Ok(())
        }

        async fn current_url(&self) -> AutomationResult<String> {
            Ok(self.state.lock().unwrap().url.clone())
        }

        async fn type_into(&self, selector: &str, text: &str) -> AutomationResult<()> {
            if self.missing_field == Some(selector) {
                return Err(AutomationError::ElementNotFound(selector.to_string()));
            }
            self.state
                .lock()
                .unwrap()
                .typed
                .push((selector.to_string(), text.to_string()));
            Ok(())
        }

        async fn click(&self, _selector: &str) -> AutomationResult<()> {
            self.state.lock().unwrap().url = self.post_login_url.clone();
            Ok(())
        }

        async fn wait_for(&self, _selector: &str, timeout: Duration) -> AutomationResult<bool> {
            if !self.profile_renders {
                tokio::time::sleep(timeout).await;
            }
            Ok(self.profile_renders)
        }

        async fn content(&self) -> AutomationResult<String> {
            Ok("<html><body><h1>Jane Doe</h1></body></html>".to_string())
        }

        async fn quit(&self) -> AutomationResult<()> {
            self.state.lock().unwrap().quits += 1;
            Ok(())
        }
    }

    struct FakeLauncher {
        state: Arc<Mutex<FakeState>>,
        launches: AtomicUsize,
        post_login_url: String,
        profile_renders: bool,
        missing_field: Option<&'static str>,
        navigation_stalls: bool,
    }

    impl FakeLauncher {
        fn new(post_login_url: &str, profile_renders: bool) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeState::default())),
                launches: AtomicUsize::new(0),
                post_login_url: post_login_url.to_string(),
                profile_renders,
                missing_field: None,
                navigation_stalls: false,
            }
        }
    }

    #[async_trait]
    impl BrowserLauncher for FakeLauncher {
        async fn launch(&self, _options: &LaunchOptions) -> AutomationResult<Box<dyn BrowserHandle>> {
            self.launches.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeHandle {
                state: self.state.clone(),
                post_login_url: self.post_login_url.clone(),
                profile_renders: self.profile_renders,
                missing_field: self.missing_field,
                navigation_stalls: self.navigation_stalls,
            }))
        }
    }

    fn manager(launcher: Arc<FakeLauncher>) -> SessionManager {
        SessionManager::new(launcher, SessionConfig::from_settings(&BrowserSettings::default()))
    }

    fn credentials() -> Credentials {
        Credentials::new("jane@example.com", "hunter2")
    }

    #[tokio::test]
    async fn test_ensure_session_is_idempotent() {
        let launcher = Arc::new(FakeLauncher::new("https://www.linkedin.com/feed/", true));
        let mut session = manager(launcher.clone());
        assert_eq!(session.state(), SessionState::Uninitialized);

        session.ensure_session().await.unwrap();
        session.ensure_session().await.unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_login_and_load_profile() {
        let launcher = Arc::new(FakeLauncher::new("https://www.linkedin.com/feed/", true));
        let mut session = manager(launcher.clone());

        session.login(&credentials()).await.unwrap();
        assert_eq!(session.state(), SessionState::Authenticated);
        {
            let state = launcher.state.lock().unwrap();
            assert_eq!(
                state.typed,
                vec![
                    ("#username".to_string(), "jane@example.com".to_string()),
                    ("#password".to_string(), "hunter2".to_string()),
                ]
            );
        }

        // Second login is a no-op.
        session.login(&credentials()).await.unwrap();
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);

        let html = session
            .load_profile("https://www.linkedin.com/in/janedoe")
            .await
            .unwrap();
        assert!(html.contains("Jane Doe"));

        session.close().await;
        session.close().await;
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(launcher.state.lock().unwrap().quits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_timeout_tears_down() {
        let launcher = Arc::new(FakeLauncher::new("https://www.linkedin.com/login?error", true));
        let mut session = manager(launcher.clone());

        let err = session.login(&credentials()).await.unwrap_err();
        assert!(matches!(err, AcquireError::Authentication(_)));
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(launcher.state.lock().unwrap().quits, 1);

        session.close().await;
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(launcher.state.lock().unwrap().quits, 1);
    }

    #[tokio::test]
    async fn test_missing_login_control_is_authentication_failure() {
        let mut launcher = FakeLauncher::new("https://www.linkedin.com/feed/", true);
        launcher.missing_field = Some(PASSWORD_FIELD);
        let launcher = Arc::new(launcher);
        let mut session = manager(launcher.clone());

        let err = session.login(&credentials()).await.unwrap_err();
        assert!(matches!(err, AcquireError::Authentication(ref msg) if msg.contains("#password")));
        assert_eq!(session.state(), SessionState::Failed);

        // A failed session is recreated on the next attempt.
        session.ensure_session().await.unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_load_profile_requires_authentication() {
        let launcher = Arc::new(FakeLauncher::new("https://www.linkedin.com/feed/", true));
        let mut session = manager(launcher);
        session.ensure_session().await.unwrap();

        let err = session
            .load_profile("https://www.linkedin.com/in/janedoe")
            .await
            .unwrap_err();
        assert!(matches!(err, AcquireError::NotAuthenticated));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrendered_profile_is_load_failure_and_session_survives() {
        let launcher = Arc::new(FakeLauncher::new("https://www.linkedin.com/checkpoint/lg", false));
        let mut session = manager(launcher.clone());
        session.login(&credentials()).await.unwrap();

        let err = session
            .load_profile("https://www.linkedin.com/in/nobody")
            .await
            .unwrap_err();
        assert!(matches!(err, AcquireError::LoadFailure { .. }));
        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(launcher.state.lock().unwrap().quits, 0);

        session.close().await;
    }

    #[tokio::test]
    async fn test_navigation_timeout_is_load_failure() {
        let mut launcher = FakeLauncher::new("https://www.linkedin.com/feed/", true);
        launcher.navigation_stalls = true;
        let launcher = Arc::new(launcher);
        let mut session = manager(launcher.clone());
        session.login(&credentials()).await.unwrap();

        let err = session
            .load_profile("https://www.linkedin.com/in/janedoe")
            .await
            .unwrap_err();
        match &err {
            AcquireError::LoadFailure { identifier, timeout } => {
                assert_eq!(identifier, "https://www.linkedin.com/in/janedoe");
                assert_eq!(*timeout, Duration::from_secs(30));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.user_message(), "profile not found");
        assert_eq!(session.state(), SessionState::Authenticated);

        session.close().await;
    }
}
