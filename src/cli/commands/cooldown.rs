//! Cooldown status command.

use console::style;

use profacquire::config::Settings;
use profacquire::cooldown::CooldownGovernor;

use super::super::helpers::format_wait;

/// Show the last recorded operation and remaining wait without recording.
pub async fn cmd_cooldown(settings: &Settings) -> anyhow::Result<()> {
    let Some(ref username) = settings.browser.username else {
        println!(
            "{} No browser credential configured (set LINKEDIN_USERNAME)",
            style("!").yellow()
        );
        return Ok(());
    };

    let browser = &settings.browser;
    let governor =
        CooldownGovernor::for_credential(browser.cooldown(), &browser.cooldown_dir(), username)
            .await;

    println!("{}", style("Cooldown").bold());
    println!("  Credential:     {}", username);
    println!("  Interval:       {}", format_wait(governor.interval()));

    match governor.last_operation() {
        Some(at) => println!("  Last operation: {}", at.to_rfc3339()),
        None => println!("  Last operation: {}", style("never").dim()),
    }

    let remaining = governor.remaining();
    if remaining.is_zero() {
        println!("  Status:         {}", style("ready").green());
    } else {
        println!(
            "  Status:         {} ({} remaining)",
            style("cooling down").yellow(),
            format_wait(remaining)
        );
    }

    Ok(())
}
