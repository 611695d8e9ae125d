//! Offline extraction over a saved page.

use std::path::Path;

use anyhow::Context;
use console::style;

use profacquire::extract::extract_profile;
use profacquire::normalize::normalize_serialized;

use super::super::helpers::print_record;

/// Run the field extractor over a saved HTML file and print the record.
pub async fn cmd_extract(html_file: &Path, compact: bool) -> anyhow::Result<()> {
    let html = tokio::fs::read_to_string(html_file)
        .await
        .with_context(|| format!("Failed to read {}", html_file.display()))?;

    let record = extract_profile(&html);
    if record.full_name.is_empty() {
        eprintln!(
            "{} No profile name found; the page layout may have changed (rerun with -v and RUST_LOG=profacquire=debug)",
            style("!").yellow()
        );
    }

    print_record(&normalize_serialized(&record), compact)
}
