//! Sample sink trait

use crate::types::Sample;
use crate::Result;

/// Downstream consumer of decoded samples.
///
/// Samples arrive strictly in frame order. Implementations must not hold the
/// decode path indefinitely: buffer, drop to a channel, or write through.
#[async_trait::async_trait]
pub trait SampleSink: Send {
    /// Accept one sample
    ///
    /// Returning [`crate::StreamError::SinkClosed`] tells the driver nobody is
    /// listening any more; any other error fails the current session.
    async fn emit(&mut self, sample: Sample) -> Result<()>;

    /// Push buffered samples downstream. Called when a session ends.
    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl<S: SampleSink + ?Sized> SampleSink for Box<S> {
    async fn emit(&mut self, sample: Sample) -> Result<()> {
        (**self).emit(sample).await
    }

    async fn flush(&mut self) -> Result<()> {
        (**self).flush().await
    }
}
