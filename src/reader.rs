//! Frame reader over any async byte stream

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

use crate::types::{FRAME_SIZE, Frame};
use crate::{Result, StreamError};

/// Reads fixed-size frames from a byte stream.
///
/// Each reader owns its own assembly buffer, so a new reader per connection
/// never sees bytes left over from an earlier one.
pub struct FrameReader<R> {
    inner: R,
    buf: [u8; FRAME_SIZE],
    idle_timeout: Option<Duration>,
    frames: u64,
    fragmented: u64,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, buf: [0; FRAME_SIZE], idle_timeout: None, frames: 0, fragmented: 0 }
    }

    /// Fail a read with [`StreamError::Timeout`] when no complete frame
    /// arrives within `timeout`.
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Read the next complete frame.
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - all [`FRAME_SIZE`] bytes arrived
    /// - `Ok(None)` - the stream ended on a frame boundary
    /// - `Err(StreamError::Framing)` - the stream ended inside a frame
    /// - `Err(StreamError::Timeout)` - the idle timeout elapsed
    /// - `Err(StreamError::Connection)` - the underlying read failed
    pub async fn next_frame(&mut self) -> Result<Option<Frame>> {
        match self.idle_timeout {
            Some(duration) => tokio::time::timeout(duration, self.read_frame())
                .await
                .map_err(|_| StreamError::Timeout { duration })?,
            None => self.read_frame().await,
        }
    }

    async fn read_frame(&mut self) -> Result<Option<Frame>> {
        let mut filled = 0;
        let mut reads = 0u32;

        while filled < FRAME_SIZE {
            let n = self
                .inner
                .read(&mut self.buf[filled..])
                .await
                .map_err(|e| StreamError::connection_failed_with_source("read failed", e))?;

            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(StreamError::framing(filled));
            }

            filled += n;
            reads += 1;
            if filled < FRAME_SIZE {
                trace!(filled, "Partial frame, waiting for more bytes");
            }
        }

        self.frames += 1;
        if reads > 1 {
            self.fragmented += 1;
        }
        Ok(Some(Frame::new(self.buf)))
    }

    /// Complete frames read so far.
    pub fn frames_read(&self) -> u64 {
        self.frames
    }

    /// Complete frames that needed more than one read to assemble.
    pub fn fragmented_frames(&self) -> u64 {
        self.fragmented
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{frame_bytes, wire_bytes};
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn reads_back_to_back_frames_in_order() {
        let wire = wire_bytes(&[1, -1, 8_388_607]);
        let mut reader = FrameReader::new(&wire[..]);

        assert_eq!(reader.next_frame().await.unwrap().unwrap().sample(), 1);
        assert_eq!(reader.next_frame().await.unwrap().unwrap().sample(), -1);
        assert_eq!(reader.next_frame().await.unwrap().unwrap().sample(), 8_388_607);
        assert!(reader.next_frame().await.unwrap().is_none());
        assert_eq!(reader.frames_read(), 3);
        assert_eq!(reader.fragmented_frames(), 0);
    }

    #[tokio::test]
    async fn empty_stream_is_a_clean_close() {
        let mut reader = FrameReader::new(&[][..]);
        assert!(reader.next_frame().await.unwrap().is_none());
        assert_eq!(reader.frames_read(), 0);
    }

    #[tokio::test]
    async fn truncated_final_frame_is_a_framing_error() {
        let mut wire = wire_bytes(&[42]);
        wire.extend_from_slice(&frame_bytes(7)[..10]);
        let mut reader = FrameReader::new(&wire[..]);

        assert_eq!(reader.next_frame().await.unwrap().unwrap().sample(), 42);
        match reader.next_frame().await {
            Err(StreamError::Framing { received, expected }) => {
                assert_eq!(received, 10);
                assert_eq!(expected, FRAME_SIZE);
            }
            other => panic!("Expected framing error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fragmented_frame_is_reassembled() {
        let (mut tx, rx) = tokio::io::duplex(64);
        let bytes = frame_bytes(-12_345);

        let writer = tokio::spawn(async move {
            for chunk in bytes.chunks(5) {
                tx.write_all(chunk).await.unwrap();
                tx.flush().await.unwrap();
                tokio::task::yield_now().await;
            }
        });

        let mut reader = FrameReader::new(rx);
        let frame = reader.next_frame().await.unwrap().unwrap();
        assert_eq!(frame.sample(), -12_345);

        writer.await.unwrap();
        assert!(reader.next_frame().await.unwrap().is_none());
        assert_eq!(reader.frames_read(), 1);
        assert_eq!(reader.fragmented_frames(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_timeout_fires_without_data() {
        let (_tx, rx) = tokio::io::duplex(64);
        let mut reader = FrameReader::new(rx).with_idle_timeout(Some(Duration::from_secs(2)));

        match reader.next_frame().await {
            Err(StreamError::Timeout { duration }) => assert_eq!(duration, Duration::from_secs(2)),
            other => panic!("Expected timeout, got {other:?}"),
        }
    }
}
