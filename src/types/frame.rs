//! Fixed-size device frames

use std::ops::Range;

use crate::error::{Result, StreamError};

/// Length of one device report on the wire.
pub const FRAME_SIZE: usize = 33;

/// Byte range of the 24-bit sample inside a frame.
pub const SAMPLE_RANGE: Range<usize> = 2..5;

/// One complete device report.
///
/// The layout is opaque apart from [`SAMPLE_RANGE`]. A `Frame` can only be
/// built from exactly [`FRAME_SIZE`] bytes, so holding one means the frame
/// was fully received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_SIZE]);

impl Frame {
    /// Wrap a complete frame buffer.
    pub fn new(bytes: [u8; FRAME_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build a frame from a slice that must be exactly [`FRAME_SIZE`] long.
    ///
    /// A short slice is a [`StreamError::Framing`] error, a long one is
    /// [`StreamError::Oversize`].
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > FRAME_SIZE {
            return Err(StreamError::oversize(bytes.len()));
        }
        let array: [u8; FRAME_SIZE] =
            bytes.try_into().map_err(|_| StreamError::framing(bytes.len()))?;
        Ok(Self(array))
    }

    /// Raw frame bytes.
    pub fn as_bytes(&self) -> &[u8; FRAME_SIZE] {
        &self.0
    }

    /// The three sample bytes, most significant first.
    pub fn sample_bytes(&self) -> [u8; 3] {
        [self.0[SAMPLE_RANGE.start], self.0[SAMPLE_RANGE.start + 1], self.0[SAMPLE_RANGE.start + 2]]
    }

    /// Decode the embedded sample.
    pub fn sample(&self) -> i32 {
        crate::codec::decode_i24_be(self.sample_bytes())
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_requires_exact_length() {
        assert!(Frame::from_slice(&[0u8; FRAME_SIZE]).is_ok());

        match Frame::from_slice(&[0u8; FRAME_SIZE - 1]) {
            Err(StreamError::Framing { received, expected }) => {
                assert_eq!(received, FRAME_SIZE - 1);
                assert_eq!(expected, FRAME_SIZE);
            }
            other => panic!("Expected framing error, got {other:?}"),
        }

        match Frame::from_slice(&[0u8; FRAME_SIZE + 1]) {
            Err(StreamError::Oversize { len, expected }) => {
                assert_eq!(len, FRAME_SIZE + 1);
                assert_eq!(expected, FRAME_SIZE);
            }
            other => panic!("Expected oversize error, got {other:?}"),
        }
    }

    #[test]
    fn sample_bytes_come_from_offsets_two_to_four() {
        let mut bytes = [0xEEu8; FRAME_SIZE];
        bytes[2] = 0x01;
        bytes[3] = 0x02;
        bytes[4] = 0x03;
        let frame = Frame::new(bytes);

        assert_eq!(frame.sample_bytes(), [0x01, 0x02, 0x03]);
        assert_eq!(frame.sample(), 0x010203);
    }

    #[test]
    fn other_bytes_do_not_affect_sample() {
        let mut a = [0x00u8; FRAME_SIZE];
        let mut b = [0xFFu8; FRAME_SIZE];
        a[SAMPLE_RANGE].copy_from_slice(&[0x80, 0x00, 0x01]);
        b[SAMPLE_RANGE].copy_from_slice(&[0x80, 0x00, 0x01]);
        assert_eq!(Frame::new(a).sample(), Frame::new(b).sample());
    }
}
