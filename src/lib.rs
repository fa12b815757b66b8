//! applog - application logging service
//!
//! Level-gated, category-tagged logging to the console and a size-rotated
//! log file, fed by application call sites, `tracing` events and panics.

#[macro_use]
mod macros;

pub mod config;
pub mod logging;
