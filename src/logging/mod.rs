//! Logging service
//!
//! Level-gated, category-tagged logging to the console and a size-rotated
//! file, with hooks that pull in `tracing` events and panics.

mod buffer;
mod console;
mod entry;
mod error;
mod file_writer;
mod flush;
mod format;
mod hooks;
mod level;
mod logger;
pub mod rotation;

pub use buffer::{ConsoleLine, LineBuffer};
pub use console::{ConsoleStream, ConsoleWriter, StdConsole};
pub use entry::{category_from_path, current_thread_tag, LogEntry, UNKNOWN_CATEGORY};
pub use error::LoggerError;
pub use file_writer::LogFile;
pub use flush::FlushTimer;
pub use format::{format_entry, TIMESTAMP_FORMAT};
pub use hooks::{
    Diagnostic, DiagnosticHook, DiagnosticLayer, DiagnosticSink, PanicHook, TracingBridge,
};
pub use level::{LogLevel, OutputTarget};
pub use logger::{Logger, LoggerBuilder, WeakLogger};
