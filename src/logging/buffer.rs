//! In-memory console for embedding a log view
//!
//! Provides a thread-safe ring buffer of console lines, usable as the
//! logger's [`ConsoleWriter`] when output should be shown inside the
//! application instead of on a terminal.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use super::console::{ConsoleStream, ConsoleWriter};

/// A console line and the stream it was written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub stream: ConsoleStream,
    pub text: String,
}

/// Thread-safe ring buffer of console lines
///
/// Cloning shares the same underlying buffer.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    lines: Arc<RwLock<VecDeque<ConsoleLine>>>,
    max_lines: usize,
}

impl LineBuffer {
    /// Create a buffer holding at most `max_lines` lines
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: Arc::new(RwLock::new(VecDeque::with_capacity(max_lines.min(1024)))),
            max_lines,
        }
    }

    /// Get all lines (oldest first)
    pub fn all_lines(&self) -> Vec<ConsoleLine> {
        self.lines
            .read()
            .map(|l| l.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Get the text of lines written to one stream
    pub fn stream_lines(&self, stream: ConsoleStream) -> Vec<String> {
        self.lines
            .read()
            .map(|l| {
                l.iter()
                    .filter(|line| line.stream == stream)
                    .map(|line| line.text.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.lines.read().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.write() {
            lines.clear();
        }
    }
}

impl ConsoleWriter for LineBuffer {
    fn write_line(&self, stream: ConsoleStream, line: &str) {
        if self.max_lines == 0 {
            return;
        }
        if let Ok(mut lines) = self.lines.write() {
            if lines.len() >= self.max_lines {
                lines.pop_front();
            }
            lines.push_back(ConsoleLine {
                stream,
                text: line.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_buffer_push_and_retrieve() {
        let buffer = LineBuffer::new(100);

        buffer.write_line(ConsoleStream::Stdout, "line 1");
        buffer.write_line(ConsoleStream::Stderr, "error 1");
        buffer.write_line(ConsoleStream::Stdout, "line 2");

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.stream_lines(ConsoleStream::Stdout), vec!["line 1", "line 2"]);
        assert_eq!(buffer.stream_lines(ConsoleStream::Stderr), vec!["error 1"]);
    }

    #[test]
    fn test_line_buffer_capacity() {
        let buffer = LineBuffer::new(3);

        for i in 0..5 {
            buffer.write_line(ConsoleStream::Stdout, &format!("msg {}", i));
        }

        let lines = buffer.all_lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, "msg 2");
        assert_eq!(lines[2].text, "msg 4");
    }

    #[test]
    fn test_clones_share_lines() {
        let buffer = LineBuffer::new(10);
        let view = buffer.clone();
        buffer.write_line(ConsoleStream::Stdout, "shared");
        assert_eq!(view.len(), 1);
        view.clear();
        assert!(buffer.is_empty());
    }
}
