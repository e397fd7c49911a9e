//! Sample sink implementations

mod channel;
mod line;

pub use channel::{ChannelSink, WatchSink};
pub use line::{FileSink, LineSink, StdoutSink};

use crate::config::SinkConfig;
use crate::sink::SampleSink;
use crate::Result;

/// Build the sink described by `config`.
pub async fn from_config(config: &SinkConfig) -> Result<Box<dyn SampleSink>> {
    let sink: Box<dyn SampleSink> = match config {
        SinkConfig::Stdout => Box::new(LineSink::stdout()),
        SinkConfig::File { path } => Box::new(LineSink::append_to(path).await?),
    };
    Ok(sink)
}
