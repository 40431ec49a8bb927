use chrono::{SecondsFormat, Utc};

/// Returns the current UTC datetime as an RFC 3339 string with second
/// precision, e.g. `2026-08-06T14:02:59Z`.
pub fn current_datetime_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Formats a Duration into an HH:MM:SS string.
pub fn format_duration(dur: std::time::Duration) -> String {
    let total_secs = dur.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}
