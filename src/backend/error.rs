//! Backend Error Types
//!
//! Errors surfaced by the capture backend: startup failures returned to the
//! caller, and the fatal poll loop errors that end the poller thread.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

/// Capture backend error types
#[derive(Error, Debug)]
pub enum BackendError {
    /// Device directory could not be listed
    #[error("Cannot read device directory {}: {source}", .path.display())]
    DeviceDirectory {
        /// Directory that was scanned
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// libinput failed to read events from the kernel
    #[error("libinput dispatch failed: {0}")]
    Dispatch(#[source] std::io::Error),

    /// Waiting on the context descriptor failed
    #[error("poll on input descriptor failed: {0}")]
    Poll(#[from] nix::Error),

    /// Poller thread could not be started
    #[error("Failed to spawn poller thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    /// Poller thread exited before reporting startup status
    #[error("Poller thread exited during startup")]
    StartupAborted,

}

/// Error classification for the poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Interrupted call, retry immediately
    Transient,
    /// Ends the poll loop
    Fatal,
}

/// Classify error for the poll loop's retry decision
pub fn classify_error(error: &BackendError) -> ErrorType {
    match error {
        BackendError::Poll(nix::Error::EINTR) => ErrorType::Transient,
        BackendError::Dispatch(e) if e.kind() == std::io::ErrorKind::Interrupted => {
            ErrorType::Transient
        }
        BackendError::DeviceDirectory { .. }
        | BackendError::Dispatch(_)
        | BackendError::Poll(_)
        | BackendError::ThreadSpawn(_)
        | BackendError::StartupAborted => ErrorType::Fatal,
    }
}

impl BackendError {
    /// Whether the poll loop should simply try again
    pub fn is_transient(&self) -> bool {
        classify_error(self) == ErrorType::Transient
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_eintr_is_transient() {
        assert!(BackendError::Poll(nix::Error::EINTR).is_transient());
        let interrupted = io::Error::from(io::ErrorKind::Interrupted);
        assert!(BackendError::Dispatch(interrupted).is_transient());
    }

    #[test]
    fn test_error_classification() {
        assert_eq!(
            classify_error(&BackendError::Poll(nix::Error::EBADF)),
            ErrorType::Fatal
        );
        assert_eq!(
            classify_error(&BackendError::DeviceDirectory {
                path: PathBuf::from("/dev/input"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            }),
            ErrorType::Fatal
        );
        let other = io::Error::from(io::ErrorKind::BrokenPipe);
        assert_eq!(
            classify_error(&BackendError::Dispatch(other)),
            ErrorType::Fatal
        );
    }

    #[test]
    fn test_display_includes_path() {
        let err = BackendError::DeviceDirectory {
            path: PathBuf::from("/nonexistent"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/nonexistent"));
    }
}
