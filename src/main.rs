//! `bci-stream` - receive a board's sample stream and print one value per line.
//!
//! ```text
//! bci-stream [CONFIG.yaml]
//! bci-stream --replay CAPTURE.bin [--rate HZ] [CONFIG.yaml]
//! ```
//!
//! Logs go to stderr (filtered by `RUST_LOG`, default `info`), samples go to
//! the sink named in the configuration.

use anyhow::{Context, bail};
use bci_stream::{
    Config, Driver, ReplaySource, SampleServer, SessionEnd, SessionId, SessionSummary, sinks,
};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    replay: Option<PathBuf>,
    rate: Option<f64>,
}

fn parse_args<I>(argv: I) -> anyhow::Result<Args>
where
    I: IntoIterator<Item = String>,
{
    let mut args = Args::default();
    let mut iter = argv.into_iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--replay" => {
                args.replay = Some(iter.next().context("--replay needs a capture file")?.into());
            }
            "--rate" => {
                let hz = iter.next().context("--rate needs a value in Hz")?;
                let rate: f64 = hz.parse().with_context(|| format!("invalid rate: {hz}"))?;
                if !rate.is_finite() || rate <= 0.0 {
                    bail!("--rate must be a positive number of Hz, got {hz}");
                }
                args.rate = Some(rate);
            }
            flag if flag.starts_with('-') => bail!("unknown option: {flag}"),
            path if args.config.is_none() => args.config = Some(path.into()),
            extra => bail!("unexpected argument: {extra}"),
        }
    }

    Ok(args)
}

/// Cancel `cancel` once `signal` fires. A signal that cannot be installed is
/// logged and leaves the token alone.
async fn cancel_on_interrupt<F>(signal: F, cancel: CancellationToken)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("Interrupt received, shutting down");
            cancel.cancel();
        }
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl-C, interrupts will not stop the server");
        }
    }
}

/// Map how a replay ended onto the process result.
fn replay_outcome(capture: &Path, summary: SessionSummary) -> anyhow::Result<()> {
    match summary.end {
        SessionEnd::Failed(e) => Err(e).with_context(|| {
            format!("replay of {} failed after {} frames", capture.display(), summary.frames)
        }),
        SessionEnd::SinkClosed => bail!("sample sink closed during replay"),
        SessionEnd::Cancelled => {
            warn!(frames = summary.frames, "Replay interrupted");
            Ok(())
        }
        SessionEnd::PeerClosed => Ok(()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = parse_args(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::default(),
    };

    let mut sink = sinks::from_config(&config.sink).await.context("opening sample sink")?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_interrupt(tokio::signal::ctrl_c(), cancel.clone()));

    if let Some(capture) = &args.replay {
        let mut source = ReplaySource::open(capture).await?;
        if let Some(hz) = args.rate {
            source = source.with_rate(hz)?;
        }

        let summary = Driver::run_session(SessionId(1), source, &mut sink, &cancel).await;
        return replay_outcome(capture, summary);
    }

    info!(
        device = %config.device.socket_addr(),
        port = config.server.port,
        "Point the board's TCP output at this host"
    );

    let mut server = SampleServer::bind(config.server.clone())
        .await
        .context("starting sample server")?;

    let shutdown = server.shutdown_token();
    tokio::spawn(async move {
        cancel.cancelled().await;
        shutdown.cancel();
    });

    server.serve(&mut sink).await?;
    Ok(())
}
