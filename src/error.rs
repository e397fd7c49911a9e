//! Error types for the sample stream server.
//!
//! Errors fall in two groups that the server treats very differently:
//!
//! - **Fatal errors** (`Bind`, `Config`, `File`, `SinkClosed`): surfaced to
//!   the caller. Nothing more can be served after one of these.
//! - **Session errors** (`Connection`, `Framing`, `Oversize`, `Decode`,
//!   `Timeout`, `Sink`): terminate the current session only. The listener
//!   logs them and goes back to accepting.
//!
//! ```rust
//! use bci_stream::StreamError;
//!
//! let error = StreamError::framing(12);
//! assert!(error.is_recoverable());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::types::FRAME_SIZE;

/// Result type alias for stream operations.
pub type Result<T, E = StreamError> = std::result::Result<T, E>;

/// Main error type for the sample stream server.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StreamError {
    #[error("Failed to bind listener on {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Connection error: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Truncated frame: received {received} of {expected} bytes before end of stream")]
    Framing { received: usize, expected: usize },

    #[error("Frame buffer is {len} bytes, a frame is exactly {expected}")]
    Oversize { len: usize, expected: usize },

    #[error("Cannot decode sample from {len} bytes (need at least {required})")]
    Decode { len: usize, required: usize },

    #[error("No frame received within {duration:?}")]
    Timeout { duration: Duration },

    #[error("Sample sink closed")]
    SinkClosed,

    #[error("Sample sink failed: {context}")]
    Sink {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("File error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StreamError {
    /// Returns whether the server can keep running after this error.
    ///
    /// Recoverable errors end the current session only.
    pub fn is_recoverable(&self) -> bool {
        match self {
            StreamError::Connection { .. } => true,
            StreamError::Framing { .. } => true,
            StreamError::Oversize { .. } => true,
            StreamError::Decode { .. } => true,
            StreamError::Timeout { .. } => true,
            StreamError::Sink { .. } => true,
            StreamError::SinkClosed => false,
            StreamError::Bind { .. } => false,
            StreamError::Config { .. } => false,
            StreamError::File { .. } => false,
        }
    }

    /// Returns suggested operator actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            StreamError::Bind { .. } => vec![
                "Check that no other process is listening on the port",
                "Choose a different server.port in the configuration",
                "Ports below 1024 may require elevated privileges",
            ],
            StreamError::Connection { .. } => vec![
                "Check the board's WiFi link quality",
                "Restart streaming from the control plane",
            ],
            StreamError::Framing { .. } => vec![
                "Verify the board is configured for raw output",
                "Check that the board firmware emits 33-byte packets",
            ],
            StreamError::Oversize { .. } => vec![
                "Split the buffer into 33-byte frames before wrapping it",
            ],
            StreamError::Decode { .. } => vec![
                "Frames must be validated before decoding",
                "Report this as a bug",
            ],
            StreamError::Timeout { .. } => vec![
                "Increase server.idle_timeout_ms",
                "Check that the board was told to start streaming",
            ],
            StreamError::SinkClosed => vec![
                "Keep the sample receiver alive while the server runs",
            ],
            StreamError::Sink { .. } => vec![
                "Check the output file is writable",
                "Ensure sufficient disk space",
            ],
            StreamError::Config { .. } => vec![
                "Check the configuration file against the documented keys",
            ],
            StreamError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
        }
    }

    /// Helper constructor for bind errors.
    pub fn bind_failed(addr: SocketAddr, source: std::io::Error) -> Self {
        StreamError::Bind { addr, source }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        StreamError::Connection { reason: reason.into(), source: None }
    }

    /// Helper constructor for connection errors with an I/O source.
    pub fn connection_failed_with_source(reason: impl Into<String>, source: std::io::Error) -> Self {
        StreamError::Connection { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for a frame cut short by end of stream.
    pub fn framing(received: usize) -> Self {
        StreamError::Framing { received, expected: FRAME_SIZE }
    }

    /// Helper constructor for a buffer longer than one frame.
    pub fn oversize(len: usize) -> Self {
        StreamError::Oversize { len, expected: FRAME_SIZE }
    }

    /// Helper constructor for sink I/O errors.
    pub fn sink_failed(context: impl Into<String>, source: std::io::Error) -> Self {
        StreamError::Sink { context: context.into(), source }
    }

    /// Helper constructor for configuration errors.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        StreamError::Config { reason: reason.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        StreamError::File { path, source }
    }
}

impl From<std::io::Error> for StreamError {
    fn from(err: std::io::Error) -> Self {
        StreamError::Connection { reason: err.kind().to_string(), source: Some(err) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn framing_errors_report_both_byte_counts(received in 1usize..FRAME_SIZE) {
                let msg = StreamError::framing(received).to_string();
                prop_assert!(msg.contains(&received.to_string()));
                prop_assert!(msg.contains(&FRAME_SIZE.to_string()));
            }

            #[test]
            fn connection_errors_keep_their_reason(reason in ".*") {
                let error = StreamError::connection_failed(reason.clone());
                prop_assert!(error.to_string().contains(&reason));
                prop_assert!(error.is_recoverable());
            }
        }
    }

    #[test]
    fn startup_errors_are_fatal() {
        let addr: SocketAddr = "0.0.0.0:3000".parse().unwrap();
        let bind = StreamError::bind_failed(
            addr,
            std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
        );
        assert!(!bind.is_recoverable());
        assert!(bind.to_string().contains("0.0.0.0:3000"));
        assert!(!StreamError::invalid_config("bad").is_recoverable());
        assert!(!StreamError::SinkClosed.is_recoverable());
    }

    #[test]
    fn session_errors_are_recoverable() {
        assert!(StreamError::framing(3).is_recoverable());
        assert!(StreamError::Timeout { duration: Duration::from_secs(1) }.is_recoverable());
        assert!(StreamError::oversize(40).is_recoverable());
        assert!(StreamError::Decode { len: 2, required: 5 }.is_recoverable());
    }

    #[test]
    fn oversize_message_does_not_claim_truncation() {
        let msg = StreamError::oversize(34).to_string();
        assert!(msg.contains("34"));
        assert!(msg.contains(&FRAME_SIZE.to_string()));
        assert!(!msg.contains("Truncated"));
    }

    #[test]
    fn io_errors_become_connection_errors() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err: StreamError = io_err.into();
        match err {
            StreamError::Connection { source: Some(source), .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::ConnectionReset);
            }
            other => panic!("Expected Connection error, got {other:?}"),
        }
    }

    #[test]
    fn every_error_has_suggestions() {
        let errors = [
            StreamError::framing(1),
            StreamError::oversize(34),
            StreamError::SinkClosed,
            StreamError::invalid_config("x"),
            StreamError::connection_failed("x"),
        ];
        for error in &errors {
            assert!(!error.recovery_suggestions().is_empty(), "{error:?}");
        }
    }

    #[test]
    fn error_is_send_sync_static() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<StreamError>();
    }
}
