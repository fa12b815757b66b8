//! Line formatting

use std::fmt::Write;

use crate::config::LogConfig;

use super::entry::{LogEntry, UNKNOWN_CATEGORY};

/// Timestamp layout, millisecond precision
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Format an entry as a single line (without trailing newline)
///
/// Field order: timestamp, level, category, function[:line], message, thread.
/// Disabled or missing fields are left out entirely.
pub fn format_entry(config: &LogConfig, entry: &LogEntry) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(6);

    if config.enable_timestamp {
        parts.push(entry.timestamp.format(TIMESTAMP_FORMAT).to_string());
    }

    parts.push(entry.level.label().to_string());

    if config.enable_category {
        let category = if entry.category.is_empty() {
            UNKNOWN_CATEGORY
        } else {
            &entry.category
        };
        parts.push(category.to_string());
    }

    if config.enable_function {
        if let Some(function) = entry.function.as_deref().filter(|f| !f.is_empty()) {
            let mut site = function.to_string();
            if config.enable_line_number {
                if let Some(line) = entry.line.filter(|l| *l > 0) {
                    let _ = write!(site, ":{}", line);
                }
            }
            parts.push(site);
        }
    }

    parts.push(entry.message.clone());

    if config.enable_thread_id {
        parts.push(format!("{:x}", entry.thread_id));
    }

    parts.join(&config.field_separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use chrono::{Local, TimeZone};

    fn bare_config() -> LogConfig {
        LogConfig {
            enable_timestamp: false,
            enable_thread_id: false,
            ..LogConfig::default()
        }
    }

    #[test]
    fn test_format_minimal_fields() {
        let entry = LogEntry::new(LogLevel::Info, "net", "connected");
        let line = format_entry(&bare_config(), &entry);
        assert_eq!(line, "INFO  | net | connected");
    }

    #[test]
    fn test_format_function_and_line() {
        let entry = LogEntry::new(LogLevel::Warning, "ui", "slow frame")
            .with_location("src/ui/window.rs", 42)
            .with_function("app::ui::window");
        let line = format_entry(&bare_config(), &entry);
        assert_eq!(line, "WARN  | ui | app::ui::window:42 | slow frame");

        let config = LogConfig {
            enable_line_number: false,
            ..bare_config()
        };
        assert_eq!(
            format_entry(&config, &entry),
            "WARN  | ui | app::ui::window | slow frame"
        );
    }

    #[test]
    fn test_format_omits_line_without_function() {
        let entry = LogEntry::new(LogLevel::Debug, "db", "query").with_location("db.rs", 7);
        assert_eq!(format_entry(&bare_config(), &entry), "DEBUG | db | query");
    }

    #[test]
    fn test_format_timestamp_and_thread() {
        let mut entry = LogEntry::new(LogLevel::Critical, "io", "disk gone");
        entry.timestamp = Local.with_ymd_and_hms(2026, 1, 21, 14, 30, 45).unwrap();
        entry.thread_id = 0x2a;

        let config = LogConfig::default();
        let line = format_entry(&config, &entry);
        assert_eq!(line, "2026-01-21 14:30:45.000 | ERROR | io | disk gone | 2a");
    }

    #[test]
    fn test_format_custom_separator_and_no_category() {
        let entry = LogEntry::new(LogLevel::Fatal, "core", "abort");
        let config = LogConfig {
            field_separator: " ".to_string(),
            enable_category: false,
            ..bare_config()
        };
        assert_eq!(format_entry(&config, &entry), "FATAL abort");
    }

    #[test]
    fn test_format_empty_category_placeholder() {
        let mut entry = LogEntry::new(LogLevel::Info, "x", "msg");
        entry.category.clear();
        assert_eq!(format_entry(&bare_config(), &entry), "INFO  | ? | msg");
    }
}
