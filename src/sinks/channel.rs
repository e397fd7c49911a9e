//! In-process sinks

use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::{UnboundedReceiverStream, WatchStream};

use crate::sink::SampleSink;
use crate::types::Sample;
use crate::{Result, StreamError};

/// Forwards every sample to an unbounded channel.
///
/// Sending never waits, so a slow consumer cannot stall frame reading. The
/// receiving half is a [`futures::Stream`] of samples in arrival order.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Sample>,
}

impl ChannelSink {
    pub fn channel() -> (Self, UnboundedReceiverStream<Sample>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, UnboundedReceiverStream::new(rx))
    }
}

#[async_trait::async_trait]
impl SampleSink for ChannelSink {
    async fn emit(&mut self, sample: Sample) -> Result<()> {
        self.tx.send(sample).map_err(|_| StreamError::SinkClosed)
    }
}

/// Publishes only the most recent sample, for live displays.
pub struct WatchSink {
    tx: watch::Sender<Option<Sample>>,
}

impl WatchSink {
    pub fn channel() -> (Self, watch::Receiver<Option<Sample>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, rx)
    }

    /// Stream of the latest sample, skipping values the reader was too slow for.
    pub fn subscribe(&self) -> impl futures::Stream<Item = Sample> + 'static {
        use futures::StreamExt;
        WatchStream::new(self.tx.subscribe()).filter_map(|opt| async move { opt })
    }
}

#[async_trait::async_trait]
impl SampleSink for WatchSink {
    async fn emit(&mut self, sample: Sample) -> Result<()> {
        self.tx.send(Some(sample)).map_err(|_| StreamError::SinkClosed)
    }
}
