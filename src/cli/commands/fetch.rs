//! Profile acquisition command.

use anyhow::Context;
use console::style;

use profacquire::clients::{build_source, AcquisitionStrategy};
use profacquire::config::Settings;

use super::super::helpers::print_record;

/// Acquire one profile and print it.
pub async fn cmd_fetch(
    settings: &Settings,
    identifier: &str,
    strategy: Option<AcquisitionStrategy>,
    mock: bool,
    compact: bool,
) -> anyhow::Result<()> {
    let mut settings = settings.clone();
    if let Some(strategy) = strategy {
        settings.strategy = Some(strategy.to_string());
    }

    let source = build_source(&settings)
        .await
        .context("Failed to create profile client")?;

    if !mock {
        eprintln!(
            "{} Acquiring {} via {}",
            style("→").cyan(),
            identifier,
            source.strategy()
        );
    }

    match source.get_profile(identifier, mock).await {
        Ok(record) => print_record(&record, compact),
        Err(e) => {
            tracing::error!("Acquisition failed for {}: {}", identifier, e);
            eprintln!("{} {}", style("✗").red(), e.user_message());
            Err(anyhow::anyhow!(e.user_message()))
        }
    }
}
