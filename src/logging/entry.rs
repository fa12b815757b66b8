//! Log entries and call-site metadata

use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};

use super::level::LogLevel;

/// Category used when the emitter did not supply one
pub const UNKNOWN_CATEGORY: &str = "?";

static NEXT_THREAD_TAG: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_TAG: u64 = NEXT_THREAD_TAG.fetch_add(1, Ordering::Relaxed);
}

/// Small per-thread identifier, assigned the first time a thread logs
pub fn current_thread_tag() -> u64 {
    THREAD_TAG.with(|tag| *tag)
}

/// Derive a category from a source path: the name of the file's parent directory
///
/// `src/net/socket.rs` yields `net`; a bare file name yields `.`.
pub fn category_from_path(path: &str) -> String {
    let mut parts = path.rsplit(['/', '\\']);
    let _file = parts.next();
    match parts.next() {
        Some(dir) if !dir.is_empty() => dir.to_string(),
        _ => ".".to_string(),
    }
}

/// A single log event
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// When the entry was emitted
    pub timestamp: DateTime<Local>,
    /// Grouping tag (e.g. the originating module)
    pub category: String,
    /// Severity
    pub level: LogLevel,
    /// Source file of the call site, if known
    pub file: Option<String>,
    /// Function or module path of the call site, if known
    pub function: Option<String>,
    /// Line of the call site, if known
    pub line: Option<u32>,
    /// Message text
    pub message: String,
    /// Tag of the emitting thread
    pub thread_id: u64,
}

impl LogEntry {
    /// Create an entry stamped with the current time and thread
    pub fn new(level: LogLevel, category: impl Into<String>, message: impl Into<String>) -> Self {
        let category = category.into();
        Self {
            timestamp: Local::now(),
            category: if category.is_empty() {
                UNKNOWN_CATEGORY.to_string()
            } else {
                category
            },
            level,
            file: None,
            function: None,
            line: None,
            message: message.into(),
            thread_id: current_thread_tag(),
        }
    }

    /// Create an entry carrying the caller's file and line
    #[track_caller]
    pub fn here(level: LogLevel, category: impl Into<String>, message: impl Into<String>) -> Self {
        let location = Location::caller();
        Self::new(level, category, message).with_location(location.file(), location.line())
    }

    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_category_defaults() {
        let entry = LogEntry::new(LogLevel::Info, "", "hello");
        assert_eq!(entry.category, "?");
    }

    #[test]
    fn test_here_captures_location() {
        let entry = LogEntry::here(LogLevel::Debug, "test", "msg");
        assert!(entry.file.as_deref().unwrap().ends_with("entry.rs"));
        assert!(entry.line.unwrap() > 0);
        assert!(entry.function.is_none());
    }

    #[test]
    fn test_category_from_path() {
        assert_eq!(category_from_path("src/net/socket.rs"), "net");
        assert_eq!(category_from_path("C:\\app\\ui\\window.rs"), "ui");
        assert_eq!(category_from_path("main.rs"), ".");
        assert_eq!(category_from_path("/main.rs"), ".");
    }

    #[test]
    fn test_thread_tags_differ_between_threads() {
        let here = current_thread_tag();
        assert_eq!(here, current_thread_tag());
        let other = std::thread::spawn(current_thread_tag).join().unwrap();
        assert_ne!(here, other);
    }
}
