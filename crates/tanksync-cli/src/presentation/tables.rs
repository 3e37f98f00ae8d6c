//! Table formatting utilities for CLI output.

use chrono::{Local, TimeZone};

/// Truncates a string to a maximum length in characters, adding "..." if needed.
///
/// # Examples
///
/// ```rust
/// use tanksync_cli::presentation::truncate_string;
///
/// assert_eq!(truncate_string("Hello", 10), "Hello");
/// assert_eq!(truncate_string("Hello World", 8), "Hello...");
/// ```
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Print a horizontal separator line.
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

/// Format epoch milliseconds as local time, `--` when unset.
pub fn format_timestamp(ms: i64) -> String {
    if ms <= 0 {
        return "--".to_string();
    }
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map_or_else(|| "--".to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string_no_truncation_needed() {
        assert_eq!(truncate_string("short", 10), "short");
    }

    #[test]
    fn test_truncate_string_counts_characters() {
        assert_eq!(truncate_string("❄❄❄❄❄❄", 5), "❄❄...");
    }

    #[test]
    fn test_unset_timestamp() {
        assert_eq!(format_timestamp(0), "--");
    }
}
