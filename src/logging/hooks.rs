//! Host diagnostic hooks
//!
//! A [`DiagnosticHook`] connects some process-wide diagnostic stream to the
//! logger while it is initialized. Two hooks are provided:
//!
//! - [`TracingBridge`] forwards `tracing` events through a [`DiagnosticLayer`]
//!   that the application adds to its subscriber once.
//! - [`PanicHook`] records panics as Fatal entries and chains to the
//!   previously installed panic hook.
//!
//! ```ignore
//! use applog::logging::{Logger, TracingBridge};
//! use tracing_subscriber::prelude::*;
//!
//! let bridge = TracingBridge::new();
//! tracing_subscriber::registry().with(bridge.layer()).init();
//!
//! let logger = Logger::builder().hook(bridge).build();
//! logger.initialize(config)?;
//! tracing::info!("routed into the logger");
//! ```

use std::fmt;
use std::panic::{self, PanicHookInfo};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use super::entry::{LogEntry, UNKNOWN_CATEGORY};
use super::level::LogLevel;
use super::logger::WeakLogger;

/// A message from the host's diagnostic stream
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: LogLevel,
    pub category: Option<String>,
    pub file: Option<String>,
    pub function: Option<String>,
    pub line: Option<u32>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            category: None,
            file: None,
            function: None,
            line: None,
            message: message.into(),
        }
    }

    /// Translate into a log entry, filling in `?` for a missing category
    pub fn into_entry(self) -> LogEntry {
        let category = self
            .category
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());

        let mut entry = LogEntry::new(self.level, category, self.message);
        entry.file = self.file;
        entry.function = self.function;
        entry.line = self.line;
        entry
    }
}

/// Handle given to hooks for delivering diagnostics to the logger
///
/// Holds only a weak reference; once the logger is gone, emits are ignored.
#[derive(Clone)]
pub struct DiagnosticSink {
    logger: WeakLogger,
}

impl DiagnosticSink {
    pub(crate) fn new(logger: WeakLogger) -> Self {
        Self { logger }
    }

    pub fn emit(&self, diagnostic: Diagnostic) {
        if let Some(logger) = self.logger.upgrade() {
            logger.log(diagnostic.into_entry());
        }
    }

    pub fn flush(&self) {
        if let Some(logger) = self.logger.upgrade() {
            logger.flush();
        }
    }

    /// Check whether the logger behind this sink still exists
    pub fn is_connected(&self) -> bool {
        self.logger.upgrade().is_some()
    }
}

impl fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticSink")
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// A process-wide diagnostic source the logger attaches to while initialized
///
/// `install` is called once per successful `Logger::initialize` and
/// `uninstall` once per `Logger::shutdown`.
pub trait DiagnosticHook: Send + Sync {
    fn name(&self) -> &str;
    fn install(&self, sink: DiagnosticSink);
    fn uninstall(&self);
}

type SinkSlot = Arc<RwLock<Option<DiagnosticSink>>>;

/// Routes `tracing` events to the logger
///
/// Clones share the same routing slot, so one clone can be handed to the
/// logger while another produces the layer.
#[derive(Clone, Default)]
pub struct TracingBridge {
    slot: SinkSlot,
}

impl TracingBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer to add to the application's tracing subscriber
    pub fn layer(&self) -> DiagnosticLayer {
        DiagnosticLayer {
            slot: Arc::clone(&self.slot),
        }
    }

    pub fn is_installed(&self) -> bool {
        self.slot.read().map(|s| s.is_some()).unwrap_or(false)
    }
}

impl DiagnosticHook for TracingBridge {
    fn name(&self) -> &str {
        "tracing"
    }

    fn install(&self, sink: DiagnosticSink) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(sink);
    }

    fn uninstall(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Tracing layer that forwards events while its bridge is installed
///
/// Target becomes the category, module path the function. Event fields other
/// than `message` are appended as `key=value`.
pub struct DiagnosticLayer {
    slot: SinkSlot,
}

impl<S> Layer<S> for DiagnosticLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let sink = match self.slot.read() {
            Ok(slot) => slot.clone(),
            Err(_) => None,
        };
        let Some(sink) = sink else {
            return;
        };

        let metadata = event.metadata();
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        sink.emit(Diagnostic {
            level: LogLevel::from(*metadata.level()),
            category: Some(metadata.target().to_string()),
            file: metadata.file().map(str::to_string),
            function: metadata.module_path().map(str::to_string),
            line: metadata.line(),
            message: visitor.finish(),
        });
    }
}

/// Collects the message and remaining fields of a tracing event
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.join(" ")
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

type PanicHandler = dyn Fn(&PanicHookInfo<'_>) + Send + Sync + 'static;

/// Logs panics as Fatal entries in category `panic`
///
/// Uninstalling restores the hook that was current at install time. A panic
/// hook set by other code after this one was installed is discarded then, so
/// hooks must be removed in the reverse order they were added.
#[derive(Default)]
pub struct PanicHook {
    previous: Mutex<Option<Arc<PanicHandler>>>,
}

impl PanicHook {
    pub fn new() -> Self {
        Self::default()
    }
}

fn panic_diagnostic(info: &PanicHookInfo<'_>) -> Diagnostic {
    let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    };

    let thread = std::thread::current();
    let mut diagnostic = Diagnostic::new(
        LogLevel::Fatal,
        format!(
            "thread '{}' panicked: {}",
            thread.name().unwrap_or("<unnamed>"),
            payload
        ),
    );
    diagnostic.category = Some("panic".to_string());
    if let Some(location) = info.location() {
        diagnostic.file = Some(location.file().to_string());
        diagnostic.line = Some(location.line());
    }
    diagnostic
}

impl DiagnosticHook for PanicHook {
    fn name(&self) -> &str {
        "panic"
    }

    fn install(&self, sink: DiagnosticSink) {
        // The panic hook cannot be replaced from a panicking thread
        if std::thread::panicking() {
            return;
        }

        let mut previous = self.previous.lock().unwrap_or_else(PoisonError::into_inner);
        if previous.is_some() {
            return;
        }

        let chained: Arc<PanicHandler> = Arc::from(panic::take_hook());
        *previous = Some(Arc::clone(&chained));

        panic::set_hook(Box::new(move |info| {
            sink.emit(panic_diagnostic(info));
            sink.flush();
            chained(info);
        }));
    }

    fn uninstall(&self) {
        if std::thread::panicking() {
            return;
        }

        let previous = self
            .previous
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(previous) = previous {
            drop(panic::take_hook());
            panic::set_hook(Box::new(move |info| previous(info)));
        }
    }
}
