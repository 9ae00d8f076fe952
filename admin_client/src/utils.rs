use chrono::{DateTime, Utc};

/// `2024-08-27T10:00:00Z` → `Aug 27, 2024`.
pub fn format_short_us(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}
