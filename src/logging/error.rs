//! Error types for the logging service

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the logger's file and directory handling
///
/// Only directory creation is returned to callers; everything else is
/// reported on the console error stream and the logger keeps running.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to create log directory {}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file {}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to rename {} to {}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove {}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write log file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to flush log file {}", path.display())]
    Flush {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start flush timer")]
    Timer(#[source] io::Error),
}

impl LoggerError {
    /// Render the error and its source chain on one line
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            out.push_str(": ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_includes_io_source() {
        let err = LoggerError::OpenFile {
            path: PathBuf::from("/tmp/app.log"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.chain(), "failed to open log file /tmp/app.log: denied");
    }
}
