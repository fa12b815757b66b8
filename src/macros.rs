//! Call-site logging macros
//!
//! Each macro records `file!()`, `line!()` and `module_path!()` (as the
//! function field). Without an explicit `category:` the category is the name
//! of the calling file's parent directory.
//!
//! ```ignore
//! log_info!(logger, "listening on {}", addr);
//! log_warn!(logger, category: "net", "retrying {} more times", left);
//! ```

/// Log at an explicit level
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr, category: $category:expr, $($arg:tt)+) => {
        $logger.log(
            $crate::logging::LogEntry::new($level, $category, format!($($arg)+))
                .with_location(file!(), line!())
                .with_function(module_path!()),
        )
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $crate::log_at!(
            $logger,
            $level,
            category: $crate::logging::category_from_path(file!()),
            $($arg)+
        )
    };
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::logging::LogLevel::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::logging::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::logging::LogLevel::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::logging::LogLevel::Critical, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::logging::LogLevel::Fatal, $($arg)+)
    };
}
