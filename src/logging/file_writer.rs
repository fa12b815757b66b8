//! Append-mode log file with size tracking
//!
//! Wraps the active log file in a `BufWriter` and keeps a running byte count
//! so rotation can be decided without a metadata call per write.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::error::LoggerError;

/// The active log file
#[derive(Debug)]
pub struct LogFile {
    path: PathBuf,
    writer: BufWriter<File>,
    len: u64,
}

impl LogFile {
    /// Open (or create) a log file for appending
    pub fn open(path: &Path) -> Result<Self, LoggerError> {
        let open_error = |source| LoggerError::OpenFile {
            path: path.to_path_buf(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(open_error)?;
        let len = file.metadata().map_err(open_error)?.len();

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            len,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes in the file, including buffered writes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check whether appending `incoming` bytes would push the file past `max_size`
    ///
    /// An empty file never overflows, so a single oversized line still gets written.
    /// A `max_size` of zero disables the limit.
    pub fn would_overflow(&self, incoming: u64, max_size: u64) -> bool {
        max_size > 0 && self.len > 0 && self.len + incoming > max_size
    }

    /// Append one line followed by a newline
    pub fn write_line(&mut self, line: &str) -> Result<(), LoggerError> {
        self.writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.write_all(b"\n"))
            .map_err(|source| LoggerError::Write {
                path: self.path.clone(),
                source,
            })?;
        self.len += line.len() as u64 + 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), LoggerError> {
        self.writer.flush().map_err(|source| LoggerError::Flush {
            path: self.path.clone(),
            source,
        })
    }

    /// Flush and close the file
    pub fn close(mut self) -> Result<(), LoggerError> {
        self.flush()
    }
}
