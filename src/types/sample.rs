//! Decoded samples and session bookkeeping

use std::fmt;
use std::net::SocketAddr;

use crate::error::StreamError;

/// Smallest value a 24-bit sample can hold.
pub const SAMPLE_MIN: i32 = -(1 << 23);

/// Largest value a 24-bit sample can hold.
pub const SAMPLE_MAX: i32 = (1 << 23) - 1;

/// Identifier of one accepted connection, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One sensor reading decoded from one frame.
///
/// `Display` prints the bare value, which is the one-value-per-line format
/// downstream plotting tools read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Session the frame arrived on
    pub session: SessionId,
    /// Position of the frame within its session, from 0
    pub sequence: u64,
    /// Signed 24-bit reading
    pub value: i32,
}

impl Sample {
    pub fn new(session: SessionId, sequence: u64, value: i32) -> Self {
        debug_assert!((SAMPLE_MIN..=SAMPLE_MAX).contains(&value));
        Self { session, sequence, value }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Why a session stopped.
#[derive(Debug)]
pub enum SessionEnd {
    /// Peer closed the connection on a frame boundary
    PeerClosed,
    /// Server shutdown was requested
    Cancelled,
    /// Downstream consumer went away
    SinkClosed,
    /// Connection, framing, timeout or sink failure
    Failed(StreamError),
}

impl SessionEnd {
    /// Whether the session ended without an error.
    pub fn is_clean(&self) -> bool {
        matches!(self, SessionEnd::PeerClosed | SessionEnd::Cancelled)
    }
}

/// Outcome of one drained connection.
#[derive(Debug)]
pub struct SessionSummary {
    pub session: SessionId,
    pub peer: Option<SocketAddr>,
    /// Complete frames decoded and emitted
    pub frames: u64,
    pub end: SessionEnd,
}

/// Listener state, observable through [`crate::SampleServer::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    /// No connection; waiting in accept
    Waiting,
    /// Draining a connection
    Connected { session: SessionId, peer: SocketAddr },
}
