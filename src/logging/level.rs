//! Severity levels and output targets

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// Log severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    #[serde(alias = "error")]
    Critical,
    Fatal,
}

impl LogLevel {
    /// Fixed-width label used in formatted lines
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO ",
            LogLevel::Warning => "WARN ",
            LogLevel::Critical => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Lowercase name, matching the config file spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Critical => "critical",
            LogLevel::Fatal => "fatal",
        }
    }

    /// Critical and Fatal go to stderr and are flushed immediately
    pub fn is_severe(&self) -> bool {
        *self >= LogLevel::Critical
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warning,
            tracing::Level::ERROR => LogLevel::Critical,
        }
    }
}

/// Where formatted entries are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTarget {
    Console,
    File,
    Both,
}

impl OutputTarget {
    fn bits(self) -> u8 {
        match self {
            OutputTarget::Console => 0b01,
            OutputTarget::File => 0b10,
            OutputTarget::Both => 0b11,
        }
    }

    /// Check whether every sink in `flag` is part of this target
    pub fn includes(self, flag: OutputTarget) -> bool {
        self.bits() & flag.bits() == flag.bits()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputTarget::Console => "console",
            OutputTarget::File => "file",
            OutputTarget::Both => "both",
        }
    }
}

impl BitOr for OutputTarget {
    type Output = OutputTarget;

    fn bitor(self, rhs: OutputTarget) -> OutputTarget {
        match self.bits() | rhs.bits() {
            0b01 => OutputTarget::Console,
            0b10 => OutputTarget::File,
            _ => OutputTarget::Both,
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Critical);
        assert!(LogLevel::Critical < LogLevel::Fatal);
    }

    #[test]
    fn test_labels_are_fixed_width() {
        for level in [
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warning,
            LogLevel::Critical,
            LogLevel::Fatal,
        ] {
            assert_eq!(level.label().len(), 5);
        }
        assert_eq!(LogLevel::Critical.label(), "ERROR");
    }

    #[test]
    fn test_from_tracing_level() {
        assert_eq!(LogLevel::from(tracing::Level::TRACE), LogLevel::Debug);
        assert_eq!(LogLevel::from(tracing::Level::WARN), LogLevel::Warning);
        assert_eq!(LogLevel::from(tracing::Level::ERROR), LogLevel::Critical);
    }

    #[test]
    fn test_target_includes() {
        assert!(OutputTarget::Both.includes(OutputTarget::Console));
        assert!(OutputTarget::Both.includes(OutputTarget::File));
        assert!(!OutputTarget::Console.includes(OutputTarget::File));
        assert!(!OutputTarget::File.includes(OutputTarget::Both));
        assert_eq!(
            OutputTarget::Console | OutputTarget::File,
            OutputTarget::Both
        );
    }
}
