//! Profile acquisition and extraction engine.
//!
//! Turns a profile identifier (a canonical profile URL) into a normalized
//! structured record, either through a remote data API or through a
//! logged-in browser session that renders the page and extracts fields with
//! ordered fallback locators.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use profacquire::clients::build_source;
//! use profacquire::config::Settings;
//!
//! let settings = Settings::load(None).await?;
//! let source = build_source(&settings).await?;
//! let record = source
//!     .get_profile("https://www.linkedin.com/in/janedoe", false)
//!     .await?;
//! println!("{}", serde_json::to_string_pretty(&record)?);
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod clients;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;

pub use clients::{build_source, AcquisitionStrategy, ProfileSource};
pub use error::{AcquireError, AcquireResult};
pub use models::ProfileRecord;
pub use normalize::NormalizedRecord;
