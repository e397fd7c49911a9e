//! Per-session frame → sample pipeline

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::codec::decode_sample;
use crate::sink::SampleSink;
use crate::source::FrameSource;
use crate::types::{Sample, SessionEnd, SessionId, SessionSummary};
use crate::StreamError;

/// Drains one frame source into a sink.
///
/// The loop is the session state machine: wait for a complete frame, decode
/// it, emit the sample, repeat. End of stream on a frame boundary, any source
/// error, sink closure and cancellation all close the session. Only one
/// decode is ever in flight.
pub struct Driver;

impl Driver {
    /// Run a session to completion and report how it ended.
    pub async fn run_session<S, K>(
        session: SessionId,
        mut source: S,
        sink: &mut K,
        cancel: &CancellationToken,
    ) -> SessionSummary
    where
        S: FrameSource,
        K: SampleSink + ?Sized,
    {
        let peer = source.peer();
        info!(session = %session, peer = ?peer, "Session started");

        let mut frames = 0u64;

        let mut end = loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(session = %session, "Session cancelled during read");
                    break SessionEnd::Cancelled;
                }
                result = source.next_frame() => result,
            };

            let frame = match result {
                Ok(Some(frame)) => frame,
                Ok(None) => break SessionEnd::PeerClosed,
                Err(e) => break SessionEnd::Failed(e),
            };

            let value = match decode_sample(frame.as_ref()) {
                Ok(value) => value,
                Err(e) => {
                    if cfg!(debug_assertions) {
                        panic!("complete frame failed to decode: {e}");
                    }
                    break SessionEnd::Failed(e);
                }
            };

            trace!(session = %session, sequence = frames, value, "Frame decoded");

            match sink.emit(Sample::new(session, frames, value)).await {
                Ok(()) => frames += 1,
                Err(StreamError::SinkClosed) => break SessionEnd::SinkClosed,
                Err(e) => break SessionEnd::Failed(e),
            }
        };

        if let Err(e) = sink.flush().await {
            warn!(session = %session, error = %e, "Failed to flush sink at session end");
            if end.is_clean() {
                end = SessionEnd::Failed(e);
            }
        }

        // the source, and with it the connection, is dropped here on every path
        drop(source);

        match &end {
            SessionEnd::PeerClosed => {
                info!(session = %session, frames, "Peer closed connection");
            }
            SessionEnd::Cancelled => {
                info!(session = %session, frames, "Session cancelled");
            }
            SessionEnd::SinkClosed => {
                warn!(session = %session, frames, "Sample sink closed, dropping session");
            }
            SessionEnd::Failed(e) => {
                error!(session = %session, frames, error = %e, "Session failed");
            }
        }

        SessionSummary { session, peer, frames, end }
    }
}
