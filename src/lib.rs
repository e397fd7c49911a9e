//! TCP sample stream server for OpenBCI-style WiFi boards.
//!
//! Once the board has been told (over its HTTP control interface) to stream
//! raw data to this host, it opens a TCP connection and sends fixed-size
//! 33-byte frames. Each frame carries one 24-bit big-endian two's-complement
//! reading at bytes 2..5. This crate accepts that connection, decodes every
//! complete frame and hands the samples, in order, to a [`SampleSink`].
//!
//! # Features
//!
//! - **One connection at a time**: accept, drain, accept again
//! - **Strict framing**: fragmented frames are reassembled, truncated frames
//!   are never decoded, and a clean close never produces a sample
//! - **Pluggable sinks**: stdout, file, channel stream, latest-value watch
//! - **Replay**: raw capture files go through the same reader and driver
//!
//! ## Example
//!
//! ```rust,no_run
//! use bci_stream::{SampleServer, ServerConfig, sinks::ChannelSink};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> bci_stream::Result<()> {
//!     let mut server = SampleServer::bind(ServerConfig::new(3000)).await?;
//!     let (mut sink, mut samples) = ChannelSink::channel();
//!
//!     tokio::spawn(async move {
//!         while let Some(sample) = samples.next().await {
//!             println!("{}", sample);
//!         }
//!     });
//!
//!     server.serve(&mut sink).await
//! }
//! ```

pub mod codec;
pub mod config;
pub mod driver;
mod error;
pub mod reader;
pub mod server;
pub mod sink;
pub mod sinks;
pub mod source;
pub mod sources;
pub mod stream;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

pub use codec::{decode_i24_be, decode_sample, encode_i24_be};
pub use config::{Config, DeviceConfig, ServerConfig, SinkConfig};
pub use driver::Driver;
pub use error::*;
pub use reader::FrameReader;
pub use server::SampleServer;
pub use sink::SampleSink;
pub use source::FrameSource;
pub use sources::{ReplaySource, TcpSource};
pub use types::*;
