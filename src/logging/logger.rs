//! The logging service
//!
//! A [`Logger`] is a cheap, cloneable handle. All clones share one mutex that
//! serializes configuration changes and the formatting and writing of each
//! entry, so lines from concurrent threads never interleave.
//!
//! Lifecycle: `Logger::new()` is uninitialized and drops everything until
//! [`Logger::initialize`]. [`Logger::shutdown`] returns it to the
//! uninitialized state; it can be initialized again afterwards.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::config::{default_log_dir, LogConfig};

use super::console::{ConsoleStream, ConsoleWriter, StdConsole};
use super::entry::LogEntry;
use super::error::LoggerError;
use super::file_writer::LogFile;
use super::flush::FlushTimer;
use super::format::format_entry;
use super::hooks::{DiagnosticHook, DiagnosticSink};
use super::level::{LogLevel, OutputTarget};
use super::rotation;

thread_local! {
    static IN_LOGGER: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as inside the logger
///
/// A panic hook or tracing bridge firing while this thread already holds the
/// state lock would otherwise deadlock on it.
struct ReentryGuard;

impl ReentryGuard {
    fn enter() -> Option<Self> {
        IN_LOGGER.with(|inside| {
            if inside.replace(true) {
                None
            } else {
                Some(ReentryGuard)
            }
        })
    }
}

impl Drop for ReentryGuard {
    fn drop(&mut self) {
        IN_LOGGER.with(|inside| inside.set(false));
    }
}

/// Report an internal failure on the console error stream
fn report(console: &dyn ConsoleWriter, err: &LoggerError) {
    console.write_line(ConsoleStream::Stderr, &format!("logger: {}", err.chain()));
}

fn ensure_directory(path: &Path) -> Result<(), LoggerError> {
    fs::create_dir_all(path).map_err(|source| LoggerError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve an empty directory to the platform default for `app_name`
fn resolve_directory(dir: PathBuf, app_name: &str) -> PathBuf {
    if dir.as_os_str().is_empty() {
        default_log_dir(app_name)
    } else {
        dir
    }
}

#[derive(Default)]
struct LoggerState {
    initialized: bool,
    config: LogConfig,
    file: Option<LogFile>,
    flush_timer: Option<FlushTimer>,
}

impl LoggerState {
    fn open_file(&mut self, console: &dyn ConsoleWriter) {
        let path = rotation::active_path(&self.config.log_directory, &self.config.log_file_prefix);
        match LogFile::open(&path) {
            Ok(file) => self.file = Some(file),
            Err(e) => {
                report(console, &e);
                self.file = None;
            }
        }
    }

    fn close_file(&mut self, console: &dyn ConsoleWriter) {
        if let Some(file) = self.file.take() {
            if let Err(e) = file.close() {
                report(console, &e);
            }
        }
    }

    /// Move the active file into the backup chain and open a fresh one
    ///
    /// Backups stay next to the file being rotated; the fresh file goes into
    /// the currently configured directory.
    fn rotate(&mut self, console: &dyn ConsoleWriter) {
        let Some(dir) = self
            .file
            .as_ref()
            .and_then(|f| f.path().parent().map(Path::to_path_buf))
        else {
            return;
        };

        self.close_file(console);
        for failure in rotation::rotate_files(
            &dir,
            &self.config.log_file_prefix,
            self.config.max_file_count,
        ) {
            report(console, &failure);
        }
        self.open_file(console);
    }

    fn write_file(&mut self, line: &str, level: LogLevel, console: &dyn ConsoleWriter) {
        let incoming = line.len() as u64 + 1;
        let max_size = self.config.max_file_size;
        if self
            .file
            .as_ref()
            .is_some_and(|f| f.would_overflow(incoming, max_size))
        {
            self.rotate(console);
        }

        let flush_now = !self.config.auto_flush || level.is_severe();
        let Some(file) = self.file.as_mut() else {
            return;
        };

        let mut result = file.write_line(line);
        if result.is_ok() && flush_now {
            result = file.flush();
        }
        if let Err(e) = result {
            report(console, &e);
        }
    }
}

struct Shared {
    state: Mutex<LoggerState>,
    console: Box<dyn ConsoleWriter>,
    hooks: Vec<Box<dyn DiagnosticHook>>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, LoggerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if !state.initialized {
            return;
        }
        state.initialized = false;
        // Signals the timer without joining; this may run on the timer thread
        state.flush_timer.take();
        if let Some(file) = state.file.take() {
            if let Err(e) = file.close() {
                report(self.console.as_ref(), &e);
            }
        }
        for hook in &self.hooks {
            hook.uninstall();
        }
    }
}

/// Builder for a [`Logger`] with a custom console and diagnostic hooks
pub struct LoggerBuilder {
    console: Box<dyn ConsoleWriter>,
    hooks: Vec<Box<dyn DiagnosticHook>>,
}

impl LoggerBuilder {
    fn new() -> Self {
        Self {
            console: Box::new(StdConsole),
            hooks: Vec::new(),
        }
    }

    /// Replace the console writer (stdout/stderr by default)
    pub fn console(mut self, console: impl ConsoleWriter + 'static) -> Self {
        self.console = Box::new(console);
        self
    }

    /// Add a hook installed on initialize and removed on shutdown
    pub fn hook(mut self, hook: impl DiagnosticHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            shared: Arc::new(Shared {
                state: Mutex::new(LoggerState::default()),
                console: self.console,
                hooks: self.hooks,
            }),
        }
    }
}

/// Thread-safe logging service handle
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
}

/// Non-owning logger handle, used by hooks and the flush timer
#[derive(Clone)]
pub struct WeakLogger {
    shared: Weak<Shared>,
}

impl WeakLogger {
    pub fn upgrade(&self) -> Option<Logger> {
        self.shared.upgrade().map(|shared| Logger { shared })
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Create an uninitialized logger writing to stdout/stderr, without hooks
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn downgrade(&self) -> WeakLogger {
        WeakLogger {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Start logging with `config`
    ///
    /// Does nothing if already initialized. Fails only when the log directory
    /// cannot be created, in which case the logger stays uninitialized. A log
    /// file that cannot be opened is reported on the console and file output
    /// is skipped until the next rotation or target change.
    pub fn initialize(&self, config: LogConfig) -> Result<(), LoggerError> {
        if self.is_initialized() {
            return Ok(());
        }

        let mut config = config;
        config.log_directory = resolve_directory(config.log_directory, &config.app_name);

        let summary = {
            let console = self.shared.console.as_ref();
            let mut state = self.shared.lock_state();
            if state.initialized {
                return Ok(());
            }

            ensure_directory(&config.log_directory)?;
            if let Err(e) = rotation::prune_backups(
                &config.log_directory,
                &config.log_file_prefix,
                config.max_file_count,
            ) {
                report(console, &e);
            }

            state.config = config;
            if state.config.target.includes(OutputTarget::File) {
                state.open_file(console);
            }

            if state.config.auto_flush && state.config.flush_interval_ms > 0 {
                state.flush_timer = self.start_flush_timer(&state.config);
            }
            state.initialized = true;

            format!(
                "Logger initialized - target: {}, level: {}, directory: {}",
                state.config.target,
                state.config.min_level,
                state.config.log_directory.display()
            )
        };

        let sink = DiagnosticSink::new(self.downgrade());
        for hook in &self.shared.hooks {
            hook.install(sink.clone());
        }

        self.log(LogEntry::new(LogLevel::Info, "logger", summary).with_function("Logger::initialize"));
        Ok(())
    }

    fn start_flush_timer(&self, config: &LogConfig) -> Option<FlushTimer> {
        let weak = self.downgrade();
        let timer = FlushTimer::start(config.flush_interval(), move || match weak.upgrade() {
            Some(logger) => {
                logger.flush();
                true
            }
            None => false,
        });

        match timer {
            Ok(timer) => Some(timer),
            Err(e) => {
                report(self.shared.console.as_ref(), &e);
                None
            }
        }
    }

    /// Stop logging: remove hooks, stop the flush timer, flush and close the file
    ///
    /// Does nothing if not initialized. Not meant to race with another
    /// `shutdown` or `initialize` on a different thread.
    pub fn shutdown(&self) {
        let timer = {
            let mut state = self.shared.lock_state();
            if !state.initialized {
                return;
            }
            state.initialized = false;
            state.flush_timer.take()
        };

        for hook in &self.shared.hooks {
            hook.uninstall();
        }

        // The timer thread takes the state lock on every tick
        if let Some(timer) = timer {
            timer.stop();
        }

        let mut state = self.shared.lock_state();
        state.close_file(self.shared.console.as_ref());
    }

    pub fn is_initialized(&self) -> bool {
        self.shared.lock_state().initialized
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> LogConfig {
        self.shared.lock_state().config.clone()
    }

    /// Path of the open log file, if file output is active
    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.shared
            .lock_state()
            .file
            .as_ref()
            .map(|f| f.path().to_path_buf())
    }

    pub fn set_log_level(&self, level: LogLevel) {
        self.shared.lock_state().config.min_level = level;
    }

    /// Change the output target for subsequent entries
    ///
    /// Adding file output opens the active file; removing it closes the file.
    pub fn set_output_target(&self, target: OutputTarget) {
        let console = self.shared.console.as_ref();
        let mut state = self.shared.lock_state();
        state.config.target = target;
        if !state.initialized {
            return;
        }

        if target.includes(OutputTarget::File) {
            if state.file.is_none() {
                state.open_file(console);
            }
        } else {
            state.close_file(console);
        }
    }

    /// Change the log directory, creating it if needed
    ///
    /// An already open file is not moved; the new directory is used from the
    /// next rotation on. If file output is wanted but no file is open, one is
    /// opened in the new directory.
    pub fn set_log_directory(&self, dir: impl Into<PathBuf>) -> Result<(), LoggerError> {
        let app_name = self.shared.lock_state().config.app_name.clone();
        let dir = resolve_directory(dir.into(), &app_name);

        let console = self.shared.console.as_ref();
        let mut state = self.shared.lock_state();
        ensure_directory(&dir)?;
        state.config.log_directory = dir;

        if state.initialized
            && state.config.target.includes(OutputTarget::File)
            && state.file.is_none()
        {
            state.open_file(console);
        }
        Ok(())
    }

    /// Write one entry to every enabled target
    ///
    /// Entries are dropped when the logger is not initialized or the level is
    /// below the configured minimum.
    pub fn log(&self, entry: LogEntry) {
        let Some(_guard) = ReentryGuard::enter() else {
            return;
        };

        let console = self.shared.console.as_ref();
        let mut state = self.shared.lock_state();
        if !state.initialized || entry.level < state.config.min_level {
            return;
        }

        let line = format_entry(&state.config, &entry);

        if state.config.target.includes(OutputTarget::Console) {
            let stream = if entry.level.is_severe() {
                ConsoleStream::Stderr
            } else {
                ConsoleStream::Stdout
            };
            console.write_line(stream, &line);
        }

        if state.config.target.includes(OutputTarget::File) {
            state.write_file(&line, entry.level, console);
        }
    }

    /// Flush buffered file output
    pub fn flush(&self) {
        let Some(_guard) = ReentryGuard::enter() else {
            return;
        };

        let mut state = self.shared.lock_state();
        if let Some(file) = state.file.as_mut() {
            if let Err(e) = file.flush() {
                report(self.shared.console.as_ref(), &e);
            }
        }
    }

    #[track_caller]
    pub fn debug(&self, category: &str, message: impl Into<String>) {
        self.log(LogEntry::here(LogLevel::Debug, category, message));
    }

    #[track_caller]
    pub fn info(&self, category: &str, message: impl Into<String>) {
        self.log(LogEntry::here(LogLevel::Info, category, message));
    }

    #[track_caller]
    pub fn warning(&self, category: &str, message: impl Into<String>) {
        self.log(LogEntry::here(LogLevel::Warning, category, message));
    }

    #[track_caller]
    pub fn critical(&self, category: &str, message: impl Into<String>) {
        self.log(LogEntry::here(LogLevel::Critical, category, message));
    }

    #[track_caller]
    pub fn fatal(&self, category: &str, message: impl Into<String>) {
        self.log(LogEntry::here(LogLevel::Fatal, category, message));
    }
}
