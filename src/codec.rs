//! Sample decoding
//!
//! The board packs each reading as a 24-bit big-endian two's-complement
//! integer at bytes 2..5 of the frame.

use crate::error::{Result, StreamError};
use crate::types::{SAMPLE_MAX, SAMPLE_MIN, SAMPLE_RANGE};

const SIGN_BIT: u32 = 0x80_0000;
const MODULUS: i32 = 0x100_0000;

/// Decode three big-endian bytes as a signed 24-bit integer.
pub fn decode_i24_be(bytes: [u8; 3]) -> i32 {
    let raw = u32::from(bytes[0]) << 16 | u32::from(bytes[1]) << 8 | u32::from(bytes[2]);
    if raw & SIGN_BIT != 0 { raw as i32 - MODULUS } else { raw as i32 }
}

/// Encode a signed 24-bit integer as three big-endian bytes.
///
/// Returns `None` when `value` does not fit in 24 bits.
pub fn encode_i24_be(value: i32) -> Option<[u8; 3]> {
    if !(SAMPLE_MIN..=SAMPLE_MAX).contains(&value) {
        return None;
    }
    let [_, b0, b1, b2] = value.to_be_bytes();
    Some([b0, b1, b2])
}

/// Decode the sample embedded in a raw frame buffer.
///
/// `data` must reach at least the end of the sample range; anything shorter
/// is rejected instead of being decoded from whatever bytes are present.
pub fn decode_sample(data: &[u8]) -> Result<i32> {
    let bytes = data
        .get(SAMPLE_RANGE)
        .ok_or(StreamError::Decode { len: data.len(), required: SAMPLE_RANGE.end })?;

    Ok(decode_i24_be([bytes[0], bytes[1], bytes[2]]))
}
