//! Date helper functions

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Format a date using Moment.js-compatible format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "YYYY-MM-DD") // -> "2024-01-15"
/// ```
pub fn format_date<Z: TimeZone>(date: &DateTime<Z>, format: &str) -> String
where
    Z::Offset: std::fmt::Display,
{
    let chrono_format = moment_to_chrono_format(format);
    date.format(&chrono_format).to_string()
}

/// Format a UTC timestamp in the site time zone
pub fn local_date(date: &DateTime<Utc>, tz: Tz, format: &str) -> String {
    format_date(&date.with_timezone(&tz), format)
}

/// Format date in full format (like "January 15, 2024")
pub fn full_date<Z: TimeZone>(date: &DateTime<Z>) -> String
where
    Z::Offset: std::fmt::Display,
{
    date.format("%B %-d, %Y").to_string()
}

/// Generate a <time> HTML element, displayed in the site time zone
pub fn time_tag(date: &DateTime<Utc>, tz: Tz) -> String {
    let local = date.with_timezone(&tz);
    format!(
        r#"<time datetime="{}">{}</time>"#,
        local.format("%Y-%m-%dT%H:%M:%S%:z"),
        full_date(&local)
    )
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
        ("dddd", "%A"),
        ("ddd", "%a"),
        ("ZZ", "%z"),
    ];

    let mut result = format.to_string();
    for (from, to) in replacements {
        result = result.replace(from, to);
    }
    result
}
