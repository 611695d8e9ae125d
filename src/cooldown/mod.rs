//! Cooldown between live acquisitions.
//!
//! A fixed minimum interval separates two operations for one credential.
//! The last operation time is persisted so a restarted process keeps
//! honoring a cooldown that an earlier run started.

mod clock;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{FileTimestampStore, MemoryTimestampStore, TimestampStore};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

/// Enforces a minimum interval between operations.
///
/// `await_turn` takes `&mut self`: the wait-then-record step is one critical
/// section, so callers sharing a governor must hold a lock across it.
pub struct CooldownGovernor {
    interval: Duration,
    clock: Arc<dyn Clock>,
    store: Arc<dyn TimestampStore>,
    last_operation: Option<DateTime<Utc>>,
}

impl CooldownGovernor {
    /// Create a governor, reading back any previously persisted timestamp.
    ///
    /// An unreadable marker is logged and treated as absent.
    pub async fn new(
        interval: Duration,
        clock: Arc<dyn Clock>,
        store: Arc<dyn TimestampStore>,
    ) -> Self {
        let last_operation = match store.load().await {
            Ok(Some(at)) => {
                info!("Loaded last operation time: {}", at);
                Some(at)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Error loading last operation time: {}", e);
                None
            }
        };

        Self {
            interval,
            clock,
            store,
            last_operation,
        }
    }

    /// Governor on the system clock, persisted per credential under `dir`.
    pub async fn for_credential(interval: Duration, dir: &Path, username: &str) -> Self {
        let store = FileTimestampStore::for_credential(dir, username);
        debug!("Cooldown marker: {}", store.path().display());
        Self::new(interval, Arc::new(SystemClock), Arc::new(store)).await
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_operation(&self) -> Option<DateTime<Utc>> {
        self.last_operation
    }

    /// How long an operation starting now would have to wait.
    ///
    /// Never more than one interval, even if the recorded time lies in the
    /// future.
    pub fn remaining(&self) -> Duration {
        let Some(last) = self.last_operation else {
            return Duration::ZERO;
        };

        match (self.clock.now() - last).to_std() {
            Ok(elapsed) => self.interval.saturating_sub(elapsed),
            // Negative elapsed time: the marker is ahead of this clock.
            Err(_) => self.interval,
        }
    }

    /// Pick up a newer time another governor on the same store recorded.
    async fn reload(&mut self) {
        match self.store.load().await {
            Ok(Some(stored)) if self.last_operation.map_or(true, |last| stored > last) => {
                debug!("Found newer last operation time: {}", stored);
                self.last_operation = Some(stored);
            }
            Ok(_) => {}
            Err(e) => warn!("Error reloading last operation time: {}", e),
        }
    }

    /// Wait out the cooldown, then record a new operation time.
    ///
    /// The first call with no recorded history proceeds immediately. The
    /// recorded time never moves backwards. Returns the recorded time.
    pub async fn await_turn(&mut self) -> DateTime<Utc> {
        self.reload().await;

        let wait = self.remaining();
        if !wait.is_zero() {
            info!("Waiting {:.1} seconds for cooldown...", wait.as_secs_f64());
            self.clock.sleep(wait).await;
        }

        let now = self.clock.now();
        let recorded = match self.last_operation {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_operation = Some(recorded);

        match self.store.save(recorded).await {
            Ok(()) => debug!("Updated last operation time: {}", recorded),
            Err(e) => error!("Error saving last operation time: {}", e),
        }

        recorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use async_trait::async_trait;
    use chrono::TimeZone;

    const INTERVAL: Duration = Duration::from_secs(120);

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn secs(n: i64) -> chrono::Duration {
        chrono::Duration::seconds(n)
    }

    async fn governor(
        clock: &Arc<ManualClock>,
        store: Arc<dyn TimestampStore>,
    ) -> CooldownGovernor {
        CooldownGovernor::new(INTERVAL, clock.clone(), store).await
    }

    #[tokio::test]
    async fn test_first_call_proceeds_immediately() {
        let clock = Arc::new(ManualClock::new(t0()));
        let store = Arc::new(MemoryTimestampStore::default());
        let mut gov = governor(&clock, store.clone()).await;

        assert_eq!(gov.await_turn().await, t0());
        assert!(clock.sleeps().is_empty());
        assert_eq!(store.load().await.unwrap(), Some(t0()));
    }

    #[tokio::test]
    async fn test_waits_until_interval_elapsed() {
        let clock = Arc::new(ManualClock::new(t0() + secs(30)));
        let store = Arc::new(MemoryTimestampStore::new(Some(t0())));
        let mut gov = governor(&clock, store.clone()).await;

        assert_eq!(gov.remaining(), Duration::from_secs(90));
        let recorded = gov.await_turn().await;

        assert_eq!(clock.sleeps(), vec![Duration::from_secs(90)]);
        assert_eq!(recorded, t0() + secs(120));
        assert_eq!(store.load().await.unwrap(), Some(t0() + secs(120)));
    }

    #[tokio::test]
    async fn test_elapsed_interval_proceeds_and_records_now() {
        let clock = Arc::new(ManualClock::new(t0() + secs(300)));
        let store = Arc::new(MemoryTimestampStore::new(Some(t0())));
        let mut gov = governor(&clock, store.clone()).await;

        assert_eq!(gov.await_turn().await, t0() + secs(300));
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_consecutive_turns_are_spaced() {
        let clock = Arc::new(ManualClock::new(t0()));
        let mut gov = governor(&clock, Arc::new(MemoryTimestampStore::default())).await;

        gov.await_turn().await;
        clock.advance(Duration::from_secs(20));
        gov.await_turn().await;

        assert_eq!(clock.sleeps(), vec![Duration::from_secs(100)]);
        assert_eq!(gov.last_operation(), Some(t0() + secs(120)));
    }

    #[tokio::test]
    async fn test_restart_reproduces_wait() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn TimestampStore> = Arc::new(FileTimestampStore::for_credential(
            dir.path(),
            "jane@example.com",
        ));

        let clock = Arc::new(ManualClock::new(t0()));
        let mut first = governor(&clock, store.clone()).await;
        first.await_turn().await;
        drop(first);

        clock.advance(Duration::from_secs(10));
        let mut second = governor(&clock, store).await;
        assert_eq!(second.last_operation(), Some(t0()));
        second.await_turn().await;

        assert_eq!(clock.sleeps(), vec![Duration::from_secs(110)]);
    }

    #[tokio::test]
    async fn test_future_marker_waits_one_interval_and_stays_monotonic() {
        let clock = Arc::new(ManualClock::new(t0()));
        let future = t0() + secs(3600);
        let store = Arc::new(MemoryTimestampStore::new(Some(future)));
        let mut gov = governor(&clock, store.clone()).await;

        let recorded = gov.await_turn().await;
        assert_eq!(clock.sleeps(), vec![INTERVAL]);
        assert_eq!(recorded, future);
        assert_eq!(store.load().await.unwrap(), Some(future));
    }

    #[tokio::test]
    async fn test_governors_sharing_a_marker_see_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(t0()));
        let marker = || -> Arc<dyn TimestampStore> {
            Arc::new(FileTimestampStore::for_credential(dir.path(), "jane"))
        };

        let mut a = governor(&clock, marker()).await;
        let mut b = governor(&clock, marker()).await;

        a.await_turn().await;
        clock.advance(Duration::from_secs(5));
        let recorded = b.await_turn().await;

        assert_eq!(clock.sleeps(), vec![Duration::from_secs(115)]);
        assert_eq!(recorded, t0() + secs(120));
    }

    struct BrokenStore;

    #[async_trait]
    impl TimestampStore for BrokenStore {
        async fn load(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk gone")))
        }

        async fn save(&self, _at: DateTime<Utc>) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk gone")))
        }
    }

    #[tokio::test]
    async fn test_store_failures_do_not_block_turns() {
        let clock = Arc::new(ManualClock::new(t0()));
        let mut gov = governor(&clock, Arc::new(BrokenStore)).await;

        assert_eq!(gov.last_operation(), None);
        assert_eq!(gov.await_turn().await, t0());
        assert_eq!(gov.last_operation(), Some(t0()));
    }
}
