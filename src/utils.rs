//! Utility functions for paths and alert time option parsing.

use std::path::PathBuf;

use chrono::NaiveTime;

/// Joins a directory path with a file name.
///
/// # Examples
///
/// ```
/// let path = get_path("/var/lib/muezzin", "settings.json");
/// assert_eq!(path, "/var/lib/muezzin/settings.json");
/// ```
pub fn get_path(dir_path: &str, file_name: &str) -> String {
    let path_buf: PathBuf = [dir_path, file_name].iter().collect();
    path_buf.to_string_lossy().into_owned()
}

/// Parses a signed minute offset option such as `"+40"`, `"-15"` or `"0"`.
pub fn parse_signed_minutes(value: &str) -> Option<i64> {
    let value = value.trim();
    let digits = value.strip_prefix('+').unwrap_or(value);
    digits.parse().ok()
}

/// Parses a local clock time option such as `"09:00"`.
pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Formats a signed offset as a human readable phrase, e.g. `"15 minutes before"`.
pub fn describe_offset(minutes: i64) -> String {
    match minutes {
        0 => "at".to_string(),
        1 => "1 minute after".to_string(),
        -1 => "1 minute before".to_string(),
        m if m > 0 => format!("{} minutes after", m),
        m => format!("{} minutes before", m.unsigned_abs()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_path_simple() {
        let path = get_path("/home/user", "settings.json");
        #[cfg(unix)]
        assert_eq!(path, "/home/user/settings.json");
        #[cfg(windows)]
        assert_eq!(path, "\\home\\user\\settings.json");
    }

    #[test]
    fn test_get_path_relative() {
        let path = get_path(".", "location.json");
        #[cfg(unix)]
        assert_eq!(path, "./location.json");
        #[cfg(windows)]
        assert_eq!(path, ".\\location.json");
    }

    #[test]
    fn test_parse_signed_minutes() {
        assert_eq!(parse_signed_minutes("+40"), Some(40));
        assert_eq!(parse_signed_minutes("-15"), Some(-15));
        assert_eq!(parse_signed_minutes("0"), Some(0));
        assert_eq!(parse_signed_minutes(" 20 "), Some(20));
        assert_eq!(parse_signed_minutes("quarter-day"), None);
        assert_eq!(parse_signed_minutes("+"), None);
    }

    #[test]
    fn test_parse_clock_time() {
        assert_eq!(
            parse_clock_time("09:30"),
            NaiveTime::from_hms_opt(9, 30, 0)
        );
        assert_eq!(parse_clock_time("25:00"), None);
        assert_eq!(parse_clock_time("+15"), None);
    }

    #[test]
    fn test_describe_offset() {
        assert_eq!(describe_offset(0), "at");
        assert_eq!(describe_offset(1), "1 minute after");
        assert_eq!(describe_offset(-20), "20 minutes before");
        assert_eq!(describe_offset(45), "45 minutes after");
        assert_eq!(
            describe_offset(i64::MIN),
            "9223372036854775808 minutes before"
        );
    }
}
