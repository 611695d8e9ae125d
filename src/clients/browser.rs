//! Live browser strategy.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{mock_record, AcquisitionStrategy, ProfileSource};
use crate::browser::{ChromiumLauncher, Credentials, SessionConfig, SessionManager};
use crate::config::BrowserSettings;
use crate::cooldown::{CooldownGovernor, MemoryTimestampStore, SystemClock};
use crate::error::{AcquireError, AcquireResult};
use crate::extract::extract_profile;
use crate::normalize::{normalize_serialized, NormalizedRecord};

/// Acquires profiles by logging in and rendering the profile page.
///
/// One credential, one session and one cooldown per client. Acquisitions
/// are serialized; each runs on its own task so that a caller dropping the
/// future does not interrupt session teardown.
pub struct BrowserClient {
    credentials: Option<Credentials>,
    acquirer: Arc<Mutex<Acquirer>>,
}

/// State touched by a live acquisition, guarded as one unit.
struct Acquirer {
    session: SessionManager,
    governor: CooldownGovernor,
}

impl BrowserClient {
    pub fn new(
        session: SessionManager,
        governor: CooldownGovernor,
        credentials: Option<Credentials>,
    ) -> Self {
        Self {
            credentials,
            acquirer: Arc::new(Mutex::new(Acquirer { session, governor })),
        }
    }

    /// Chromium-backed client with a per-credential persisted cooldown.
    pub async fn from_settings(settings: &BrowserSettings) -> Self {
        let credentials = Credentials::from_settings(settings);
        let governor = match credentials {
            Some(ref creds) => {
                CooldownGovernor::for_credential(
                    settings.cooldown(),
                    &settings.cooldown_dir(),
                    &creds.username,
                )
                .await
            }
            // Unused: acquisitions fail on missing credentials first.
            None => {
                CooldownGovernor::new(
                    settings.cooldown(),
                    Arc::new(SystemClock),
                    Arc::new(MemoryTimestampStore::default()),
                )
                .await
            }
        };

        let session = SessionManager::new(
            Arc::new(ChromiumLauncher::new()),
            SessionConfig::from_settings(settings),
        );

        Self::new(session, governor, credentials)
    }
}

impl Acquirer {
    async fn acquire(
        &mut self,
        identifier: &str,
        credentials: &Credentials,
    ) -> AcquireResult<NormalizedRecord> {
        self.governor.await_turn().await;

        // Inner call so the session is always closed
        let result = self.acquire_inner(identifier, credentials).await;
        self.session.close().await;
        result
    }

    async fn acquire_inner(
        &mut self,
        identifier: &str,
        credentials: &Credentials,
    ) -> AcquireResult<NormalizedRecord> {
        self.session.ensure_session().await?;
        self.session.login(credentials).await?;
        let html = self.session.load_profile(identifier).await?;

        let record = extract_profile(&html);
        if record.full_name.is_empty() {
            warn!("Rendered profile had no name: {}", identifier);
        }
        info!(
            "Extracted profile {} ({} experiences, {} education)",
            identifier,
            record.experiences.len(),
            record.education.len()
        );

        Ok(normalize_serialized(&record))
    }
}

#[async_trait]
impl ProfileSource for BrowserClient {
    fn strategy(&self) -> AcquisitionStrategy {
        AcquisitionStrategy::Browser
    }

    async fn get_profile(&self, identifier: &str, mock: bool) -> AcquireResult<NormalizedRecord> {
        if mock {
            return Ok(mock_record());
        }

        let credentials = self.credentials.clone().ok_or_else(|| {
            AcquireError::Config(
                "browser credentials not configured (set LINKEDIN_USERNAME and LINKEDIN_PASSWORD)"
                    .to_string(),
            )
        })?;

        let acquirer = self.acquirer.clone();
        let identifier = identifier.to_string();
        let task = tokio::spawn(async move {
            let mut acquirer = acquirer.lock_owned().await;
            acquirer.acquire(&identifier, &credentials).await
        });

        task.await
            .map_err(|e| AcquireError::Task(e.to_string()))?
    }
}
