//! Frame builders shared by unit tests and benchmarks

#![cfg(any(test, feature = "benchmark"))]

use crate::codec::encode_i24_be;
use crate::types::{FRAME_SIZE, Frame, SAMPLE_RANGE};

/// Filler for the bytes of a frame the decoder ignores.
pub const FILLER: u8 = 0xA0;

/// Wire bytes of one frame carrying `value`.
///
/// # Panics
///
/// Panics when `value` does not fit in 24 bits.
pub fn frame_bytes(value: i32) -> [u8; FRAME_SIZE] {
    let mut bytes = [FILLER; FRAME_SIZE];
    let sample = encode_i24_be(value).unwrap_or_else(|| panic!("{value} is not a 24-bit sample"));
    bytes[SAMPLE_RANGE].copy_from_slice(&sample);
    bytes
}

/// A frame carrying `value`.
pub fn frame(value: i32) -> Frame {
    Frame::new(frame_bytes(value))
}

/// Back-to-back wire bytes for `values`, one frame each.
pub fn wire_bytes(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|&v| frame_bytes(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_bytes_are_frame_aligned() {
        let wire = wire_bytes(&[1, 2, 3]);
        assert_eq!(wire.len(), 3 * FRAME_SIZE);
        assert_eq!(Frame::from_slice(&wire[FRAME_SIZE..2 * FRAME_SIZE]).unwrap().sample(), 2);
    }

    #[test]
    fn filler_surrounds_sample() {
        let bytes = frame_bytes(0);
        assert_eq!(bytes[0], FILLER);
        assert_eq!(bytes[5], FILLER);
        assert_eq!(frame(0).sample(), 0);
    }
}
