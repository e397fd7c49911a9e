//! Frames from an accepted TCP connection

use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::reader::FrameReader;
use crate::source::FrameSource;
use crate::types::Frame;
use crate::Result;

/// One accepted board connection.
///
/// The stream is owned here; dropping the source closes the connection.
pub struct TcpSource {
    reader: FrameReader<TcpStream>,
    peer: SocketAddr,
}

impl TcpSource {
    pub fn new(stream: TcpStream, peer: SocketAddr, idle_timeout: Option<Duration>) -> Self {
        Self { reader: FrameReader::new(stream).with_idle_timeout(idle_timeout), peer }
    }
}

#[async_trait::async_trait]
impl FrameSource for TcpSource {
    async fn next_frame(&mut self) -> Result<Option<Frame>> {
        self.reader.next_frame().await
    }

    fn peer(&self) -> Option<SocketAddr> {
        Some(self.peer)
    }
}
