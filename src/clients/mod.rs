//! Profile acquisition clients.
//!
//! Both strategies answer the same single-operation contract,
//! [`ProfileSource::get_profile`], and both return normalized records.

mod api;
mod browser;
mod mock;
mod selection;

pub use api::ApiClient;
pub use browser::BrowserClient;
pub use mock::mock_record;
pub use selection::{build_source, AcquisitionStrategy};

use async_trait::async_trait;

use crate::error::AcquireResult;
use crate::normalize::NormalizedRecord;

/// Something that can acquire a profile by identifier.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    fn strategy(&self) -> AcquisitionStrategy;

    /// Acquire and normalize one profile.
    ///
    /// With `mock` set, returns the canned record without any I/O.
    async fn get_profile(&self, identifier: &str, mock: bool) -> AcquireResult<NormalizedRecord>;
}
