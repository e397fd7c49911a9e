//! One-value-per-line text output

use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter, Stdout};
use tracing::info;

use crate::sink::SampleSink;
use crate::types::Sample;
use crate::{Result, StreamError};

/// Writes each sample value as a decimal line.
///
/// This is the format the plotting tools read.
pub struct LineSink<W> {
    writer: BufWriter<W>,
    /// Flush after every line instead of only at session end
    flush_each: bool,
    line: String,
}

/// Line output on standard output, flushed per sample.
pub type StdoutSink = LineSink<Stdout>;

/// Line output appended to a file, flushed at session end.
pub type FileSink = LineSink<File>;

impl<W: AsyncWrite + Unpin + Send> LineSink<W> {
    pub fn new(writer: W, flush_each: bool) -> Self {
        Self { writer: BufWriter::new(writer), flush_each, line: String::with_capacity(16) }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl LineSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout(), true)
    }
}

impl LineSink<File> {
    /// Open `path` for appending, creating it when missing.
    pub async fn append_to<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| StreamError::file_error(path.to_path_buf(), e))?;

        info!(path = %path.display(), "Writing samples to file");
        Ok(Self::new(file, false))
    }
}

#[async_trait::async_trait]
impl<W: AsyncWrite + Unpin + Send> SampleSink for LineSink<W> {
    async fn emit(&mut self, sample: Sample) -> Result<()> {
        use std::fmt::Write;

        self.line.clear();
        // writing to a String cannot fail
        let _ = writeln!(self.line, "{}", sample);

        self.writer
            .write_all(self.line.as_bytes())
            .await
            .map_err(|e| StreamError::sink_failed("write sample", e))?;

        if self.flush_each {
            self.flush().await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await.map_err(|e| StreamError::sink_failed("flush samples", e))
    }
}
