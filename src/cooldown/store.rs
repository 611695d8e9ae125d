//! Durable storage for the last-operation timestamp.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::error::StoreError;

/// Holds a single timestamp.
#[async_trait]
pub trait TimestampStore: Send + Sync {
    /// The stored timestamp, or `None` if nothing was ever recorded.
    async fn load(&self) -> Result<Option<DateTime<Utc>>, StoreError>;

    async fn save(&self, at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// A marker file containing one RFC 3339 timestamp.
#[derive(Debug, Clone)]
pub struct FileTimestampStore {
    path: PathBuf,
}

impl FileTimestampStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Marker for one credential inside `dir`.
    ///
    /// The file name is derived from a hash of the username so that
    /// different credentials never share a cooldown and the username is
    /// not written to disk.
    pub fn for_credential(dir: &Path, username: &str) -> Self {
        let digest = hex::encode(Sha256::digest(username.as_bytes()));
        Self::new(dir.join(format!("cooldown-{}", &digest[..16])))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TimestampStore for FileTimestampStore {
    async fn load(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let contents = contents.trim();
        if contents.is_empty() {
            return Ok(None);
        }

        Ok(Some(
            DateTime::parse_from_rfc3339(contents)?.with_timezone(&Utc),
        ))
    }

    async fn save(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write then rename so a crash never leaves a half-written marker.
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, at.to_rfc3339()).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Process-local store, for tests and credential-less configurations.
#[derive(Debug, Default)]
pub struct MemoryTimestampStore {
    value: Mutex<Option<DateTime<Utc>>>,
}

impl MemoryTimestampStore {
    pub fn new(initial: Option<DateTime<Utc>>) -> Self {
        Self {
            value: Mutex::new(initial),
        }
    }
}

#[async_trait]
impl TimestampStore for MemoryTimestampStore {
    async fn load(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(*self.value.lock().unwrap_or_else(|e| e.into_inner()))
    }

    async fn save(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = Some(at);
        Ok(())
    }
}
