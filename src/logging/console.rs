//! Console output seam
//!
//! The logger never touches stdout/stderr directly; it goes through a
//! [`ConsoleWriter`] so embedders can redirect console output.

use std::io::{self, Write};

/// Which standard stream a console line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

/// Receives formatted console lines and internal error reports
pub trait ConsoleWriter: Send + Sync {
    fn write_line(&self, stream: ConsoleStream, line: &str);
}

/// Writes to the process's standard output and error streams
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl ConsoleWriter for StdConsole {
    fn write_line(&self, stream: ConsoleStream, line: &str) {
        // Console failures (closed pipe etc.) must never reach the caller
        let _ = match stream {
            ConsoleStream::Stdout => writeln!(io::stdout().lock(), "{}", line),
            ConsoleStream::Stderr => writeln!(io::stderr().lock(), "{}", line),
        };
    }
}
