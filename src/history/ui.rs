//! Text formatting for history listings.
//!
//! Used by the command-line front end to render the log.

use super::models::OutcomeRecord;
use crate::models::CANCELLED_MESSAGE;
use chrono::{DateTime, Local, Utc};

const RULE: &str = "───────────────────────────────────────────────────────────";

/// Outcome classification as shown in listings.
pub fn status_label(entry: &OutcomeRecord) -> String {
    if entry.response.status != 0 {
        return format!("{} {}", entry.response.status, entry.response.status_text)
            .trim_end()
            .to_string();
    }
    match &entry.error {
        Some(error) => match &error.code {
            Some(code) => format!("failed ({})", code),
            None => "failed".to_string(),
        },
        None if entry.response.body.as_deref() == Some(CANCELLED_MESSAGE) => {
            "cancelled".to_string()
        }
        None => "0".to_string(),
    }
}

/// One line per entry, newest first.
pub fn format_history_list(entries: &[OutcomeRecord]) -> Vec<String> {
    entries.iter().map(format_history_entry).collect()
}

/// Formats a single entry as `METHOD URL - STATUS (relative time)`.
///
/// The display name is appended in brackets when it differs from the URL.
pub fn format_history_entry(entry: &OutcomeRecord) -> String {
    let mut line = format!(
        "{} {} - {} ({}, {}ms)",
        entry.request.method,
        entry.request.url,
        status_label(entry),
        format_relative_time(&entry.timestamp),
        entry.response.time_ms
    );
    if let Some(name) = &entry.metadata.name {
        line.push_str(&format!(" [{}]", name));
    }
    line
}

/// Multi-line view of one entry including headers and a body preview.
pub fn format_history_details(entry: &OutcomeRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Entry: {}\n", entry.id));
    output.push_str(&format!("Recorded: {}\n", format_timestamp(&entry.timestamp)));
    if let Some(environment) = &entry.metadata.environment {
        output.push_str(&format!("Environment: {}\n", environment));
    }
    if let Some(tags) = entry.metadata.tags.as_ref().filter(|t| !t.is_empty()) {
        output.push_str(&format!("Tags: {}\n", tags.join(", ")));
    }

    output.push_str("\nREQUEST\n");
    output.push_str(RULE);
    output.push('\n');
    output.push_str(&format!("{} {}\n", entry.request.method, entry.request.url));
    for (key, value) in entry.request.headers.iter() {
        output.push_str(&format!("  {}: {}\n", key, value));
    }
    if let Some(body) = entry.request.body.as_deref().filter(|b| !b.is_empty()) {
        output.push_str("\nBody:\n");
        output.push_str(&format_body_preview(body, 500));
    }

    output.push_str("\nRESPONSE\n");
    output.push_str(RULE);
    output.push('\n');
    output.push_str(&format!(
        "{} in {}ms\n",
        status_label(entry),
        entry.response.time_ms
    ));
    for (key, value) in entry.response.headers.iter() {
        output.push_str(&format!("  {}: {}\n", key, value));
    }
    match entry.response.body.as_deref() {
        Some(body) if !body.is_empty() => {
            output.push_str("\nBody:\n");
            output.push_str(&format_body_preview(body, 1000));
        }
        _ => output.push_str("\nBody: [Empty]\n"),
    }

    if let Some(error) = &entry.error {
        output.push_str(&format!("\nError: {}\n", error.message));
    }

    output
}

/// Formats a timestamp in local time as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    let local_time: DateTime<Local> = timestamp.with_timezone(&Local);
    local_time.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Formats a relative time description (e.g., "2 hours ago", "yesterday").
pub fn format_relative_time(timestamp: &DateTime<Utc>) -> String {
    format_relative_time_from(timestamp, Utc::now())
}

fn format_relative_time_from(timestamp: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(*timestamp);
    let plural = |n: i64| if n == 1 { "" } else { "s" };

    if duration.num_seconds() < 60 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        let minutes = duration.num_minutes();
        format!("{} minute{} ago", minutes, plural(minutes))
    } else if duration.num_hours() < 24 {
        let hours = duration.num_hours();
        format!("{} hour{} ago", hours, plural(hours))
    } else if duration.num_days() == 1 {
        "yesterday".to_string()
    } else if duration.num_days() < 7 {
        format!("{} days ago", duration.num_days())
    } else {
        let weeks = duration.num_weeks();
        format!("{} week{} ago", weeks, plural(weeks))
    }
}

/// Trims a body and truncates it to `max_chars` characters.
fn format_body_preview(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    let total = trimmed.chars().count();

    if total <= max_chars {
        format!("  {}\n", trimmed)
    } else {
        let preview: String = trimmed.chars().take(max_chars).collect();
        format!(
            "  {}...\n  [Truncated - {} total characters]\n",
            preview, total
        )
    }
}

/// Summary counts over a set of entries.
pub fn format_history_stats(entries: &[OutcomeRecord]) -> String {
    let total = entries.len();
    let failed = entries.iter().filter(|e| e.is_failure()).count();
    let cancelled = entries
        .iter()
        .filter(|e| !e.is_failure() && e.response.status == 0)
        .count();
    let completed = total - failed - cancelled;

    format!(
        "Total: {} | Completed: {} | Failed: {} | Cancelled: {}",
        total, completed, failed, cancelled
    )
}
