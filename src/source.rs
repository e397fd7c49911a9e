//! Frame source trait

use std::net::SocketAddr;
use tokio::io::AsyncRead;

use crate::reader::FrameReader;
use crate::types::Frame;
use crate::Result;

/// Anything that yields complete frames in arrival order.
///
/// The session driver only sees this trait, so frames can come from a live
/// TCP connection, a recorded capture or an in-memory buffer in tests.
#[async_trait::async_trait]
pub trait FrameSource: Send {
    /// Get the next complete frame
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - New frame available
    /// - `Ok(None)` - Source ended on a frame boundary
    /// - `Err(e)` - Source failed; the session ends
    async fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Remote address, for network sources
    fn peer(&self) -> Option<SocketAddr> {
        None
    }
}

#[async_trait::async_trait]
impl<R: AsyncRead + Unpin + Send> FrameSource for FrameReader<R> {
    async fn next_frame(&mut self) -> Result<Option<Frame>> {
        FrameReader::next_frame(self).await
    }
}
