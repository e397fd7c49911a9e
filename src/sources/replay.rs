//! Replay of raw capture files
//!
//! A capture is the board's byte stream saved verbatim, e.g. with
//! `nc -l 3000 > capture.bin`.

use std::path::Path;
use tokio::fs::File;
use tokio::io::BufReader;
use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::reader::FrameReader;
use crate::source::FrameSource;
use crate::types::Frame;
use crate::{Result, StreamError};

/// Fastest pacing the board itself can produce
pub const MAX_REPLAY_RATE: f64 = 16_000.0;

/// Frame source that reads a raw capture file
pub struct ReplaySource {
    reader: FrameReader<BufReader<File>>,
    /// Frame pacing; `None` replays as fast as the sink accepts
    pacing: Option<Interval>,
}

impl ReplaySource {
    /// Open a capture file for replay.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .await
            .map_err(|e| StreamError::file_error(path.to_path_buf(), e))?;

        let len = file.metadata().await.map(|m| m.len()).unwrap_or(0);
        info!(path = %path.display(), bytes = len, "Opened capture file");

        Ok(Self { reader: FrameReader::new(BufReader::new(file)), pacing: None })
    }

    /// Pace replay at `hz` frames per second, the board's sample rate.
    ///
    /// Rates above [`MAX_REPLAY_RATE`] are capped. A rate that is not a
    /// positive finite number is a configuration error.
    pub fn with_rate(mut self, hz: f64) -> Result<Self> {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(StreamError::invalid_config(format!(
                "replay rate must be a positive number of Hz, got {hz}"
            )));
        }
        let hz = hz.min(MAX_REPLAY_RATE);
        let mut pacing = interval(Duration::from_secs_f64(1.0 / hz));
        pacing.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.pacing = Some(pacing);
        debug!(hz, "Replay pacing set");
        Ok(self)
    }
}

#[async_trait::async_trait]
impl FrameSource for ReplaySource {
    async fn next_frame(&mut self) -> Result<Option<Frame>> {
        if let Some(pacing) = self.pacing.as_mut() {
            pacing.tick().await;
        }

        let frame = self.reader.next_frame().await?;
        if frame.is_none() {
            debug!(
                frames = self.reader.frames_read(),
                fragmented = self.reader.fragmented_frames(),
                "Reached end of capture"
            );
        }
        Ok(frame)
    }
}
