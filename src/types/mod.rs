//! Core types flowing through the server.
//!
//! - [`Frame`] is one fixed-size device report as received
//! - [`Sample`] is the reading decoded from a frame, tagged with its session
//! - [`SessionSummary`] and [`ServerStatus`] describe connection lifecycle
//!
//! ```rust
//! use bci_stream::types::{Frame, FRAME_SIZE};
//!
//! let mut bytes = [0u8; FRAME_SIZE];
//! bytes[2..5].copy_from_slice(&[0xFF, 0xFF, 0xFE]);
//! assert_eq!(Frame::new(bytes).sample(), -2);
//! ```

mod frame;
mod sample;

pub use frame::{FRAME_SIZE, Frame, SAMPLE_RANGE};
pub use sample::{
    SAMPLE_MAX, SAMPLE_MIN, Sample, ServerStatus, SessionEnd, SessionId, SessionSummary,
};
