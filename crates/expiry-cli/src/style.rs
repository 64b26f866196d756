//! Visual styling utilities for the CLI.

use std::time::Duration;

use expiry_core::{Alert, ExpiryKind, StoreFailure};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tabled::settings::Style;

/// Standard spinner tick characters (Braille dots animation)
const SPINNER_TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Standard spinner tick interval
const SPINNER_TICK_MS: u64 = 80;

/// Spinner shown while databases are scanned. Draws to stderr and stays
/// hidden when stderr is not a terminal.
pub fn scanning_spinner(count: usize) -> ProgressBar {
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_TICK_CHARS);
    let pb = ProgressBar::new_spinner();
    pb.set_style(style);
    pb.set_message(format!("Scanning {} database(s)...", count));
    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    pb
}

/// Format a success message.
pub fn format_success(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[OK] {}", message)
    } else {
        format!("{} {}", "[OK]".green(), message)
    }
}

/// Format an info message.
pub fn format_info(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[--] {}", message)
    } else {
        format!("{} {}", "[--]".cyan(), message)
    }
}

/// Format a warning message.
pub fn format_warning(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[!!] {}", message)
    } else {
        format!("{} {}", "[!!]".yellow(), message)
    }
}

/// Format a title header.
pub fn format_title(title: &str, no_color: bool) -> String {
    let rule = "━".repeat(title.chars().count());
    if no_color {
        format!("{}\n{}", title, rule)
    } else {
        format!("{}\n{}", title.bold(), rule.dimmed())
    }
}

/// One line for an alert, coloured by severity.
pub fn format_alert(alert: &Alert, no_color: bool) -> String {
    let line = format!("{}: {}", alert.title(), alert.message());
    let tag = match alert.kind() {
        ExpiryKind::Upcoming => "[!!]",
        ExpiryKind::Expired => "[XX]",
    };
    if no_color {
        return format!("{} {}", tag, line);
    }
    match alert.kind() {
        ExpiryKind::Upcoming => format!("{} {}", tag.yellow(), line),
        ExpiryKind::Expired => format!("{} {}", tag.red(), line),
    }
}

/// One line for a store that could not be read.
pub fn format_failure(failure: &StoreFailure, no_color: bool) -> String {
    let line = format!(
        "\"{}\" ({}): {}",
        failure.store.display_name,
        failure.store.location.display(),
        failure.reason
    );
    if no_color {
        format!("[??] {}", line)
    } else {
        format!("{} {}", "[??]".magenta(), line.dimmed())
    }
}

/// Days until expiry as a table cell, coloured when close.
pub fn format_days_left(days: i64, no_color: bool) -> String {
    let text = match days {
        d if d < 0 => "expired".to_string(),
        0 => "today".to_string(),
        1 => "1 day".to_string(),
        d => format!("{} days", d),
    };
    if no_color {
        return text;
    }
    match days {
        d if d < 0 => text.red().to_string(),
        d if d < 7 => text.yellow().to_string(),
        _ => text,
    }
}

/// Apply the table style used throughout the CLI.
pub fn apply_table_style(table: &mut tabled::Table) {
    table.with(Style::rounded());
}
