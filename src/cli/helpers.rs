//! Shared helper functions for CLI commands.

use profacquire::normalize::NormalizedRecord;

/// Print a record as JSON on stdout.
pub fn print_record(record: &NormalizedRecord, compact: bool) -> anyhow::Result<()> {
    let json = if compact {
        serde_json::to_string(record)?
    } else {
        serde_json::to_string_pretty(record)?
    };
    println!("{}", json);
    Ok(())
}

/// Format a duration as whole minutes and seconds.
pub fn format_wait(wait: std::time::Duration) -> String {
    let secs = wait.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}
