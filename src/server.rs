//! TCP listener serving one board connection at a time
//!
//! The server accepts a connection, drains it through the [`Driver`] until it
//! ends, and goes back to accepting. Session failures are logged and never
//! stop the listener. Only a bind failure or a closed sample sink is fatal.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::driver::Driver;
use crate::sink::SampleSink;
use crate::sources::TcpSource;
use crate::types::{ServerStatus, SessionEnd, SessionId, SessionSummary};
use crate::{Result, StreamError};

/// Pause after a failed accept so a persistent failure does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Sample stream server bound to its listening socket.
pub struct SampleServer {
    listener: TcpListener,
    config: ServerConfig,
    status: watch::Sender<ServerStatus>,
    cancel: CancellationToken,
    next_session: u64,
}

impl SampleServer {
    /// Bind the listening socket described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Config`] for settings the server cannot run
    /// with and [`StreamError::Bind`] when the address is unavailable.
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        config.validate()?;

        let addr = config.socket_addr();
        let listener =
            TcpListener::bind(addr).await.map_err(|e| StreamError::bind_failed(addr, e))?;

        let local = listener.local_addr().unwrap_or(addr);
        info!(
            addr = %local,
            idle_timeout_ms = config.idle_timeout_ms,
            "Sample server listening"
        );

        let (status, _) = watch::channel(ServerStatus::Waiting);

        Ok(Self { listener, config, status, cancel: CancellationToken::new(), next_session: 1 })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| StreamError::connection_failed_with_source("local address", e))
    }

    /// Watch the listener move between waiting and connected.
    pub fn status(&self) -> watch::Receiver<ServerStatus> {
        self.status.subscribe()
    }

    /// Token that stops the server when cancelled.
    ///
    /// Cancelling ends the active session and makes [`serve`](Self::serve)
    /// return.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Serve connections one after another until shutdown.
    ///
    /// Accept failures and session failures are logged and serving continues.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::SinkClosed`] once the sink stops accepting
    /// samples, since no later session could deliver any.
    pub async fn serve<K>(&mut self, sink: &mut K) -> Result<()>
    where
        K: SampleSink + ?Sized,
    {
        loop {
            match self.serve_one(sink).await {
                Ok(Some(summary)) if matches!(summary.end, SessionEnd::SinkClosed) => {
                    error!(
                        session = %summary.session,
                        frames = summary.frames,
                        "Sample sink closed, stopping server"
                    );
                    return Err(StreamError::SinkClosed);
                }
                Ok(Some(summary)) => {
                    debug!(
                        session = %summary.session,
                        frames = summary.frames,
                        "Session finished, waiting for next connection"
                    );
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }

            if self.cancel.is_cancelled() {
                break;
            }
        }

        info!("Sample server stopped");
        Ok(())
    }

    /// Accept and drain exactly one connection.
    ///
    /// Returns `Ok(None)` when shutdown is requested while waiting for a
    /// connection.
    pub async fn serve_one<K>(&mut self, sink: &mut K) -> Result<Option<SessionSummary>>
    where
        K: SampleSink + ?Sized,
    {
        let Some((stream, peer)) = self.accept().await? else {
            return Ok(None);
        };

        let session = SessionId(self.next_session);
        self.next_session += 1;

        self.status.send_replace(ServerStatus::Connected { session, peer });

        let source = TcpSource::new(stream, peer, self.config.idle_timeout());
        let summary = Driver::run_session(session, source, sink, &self.cancel).await;

        self.status.send_replace(ServerStatus::Waiting);
        Ok(Some(summary))
    }

    async fn accept(&self) -> Result<Option<(TcpStream, SocketAddr)>> {
        info!("Waiting for a connection");

        tokio::select! {
            _ = self.cancel.cancelled() => Ok(None),
            accepted = self.listener.accept() => {
                let (stream, peer) = accepted
                    .map_err(|e| StreamError::connection_failed_with_source("accept failed", e))?;
                info!(peer = %peer, "Connection accepted");
                Ok(Some((stream, peer)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::ChannelSink;
    use crate::test_utils::wire_bytes;
    use futures::StreamExt;
    use std::net::{IpAddr, Ipv4Addr};
    use tokio::io::AsyncWriteExt;

    fn loopback() -> ServerConfig {
        ServerConfig::new(0).with_bind_addr(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let first = SampleServer::bind(loopback()).await.unwrap();
        let taken = first.local_addr().unwrap().port();

        match SampleServer::bind(loopback().with_port(taken)).await {
            Err(e @ StreamError::Bind { .. }) => assert!(!e.is_recoverable()),
            Err(other) => panic!("Expected bind error, got {other:?}"),
            Ok(_) => panic!("Expected bind error, got a server"),
        }
    }

    #[tokio::test]
    async fn serve_one_drains_a_connection() {
        let mut server = SampleServer::bind(loopback()).await.unwrap();
        let addr = server.local_addr().unwrap();
        let (mut sink, samples) = ChannelSink::channel();

        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream.write_all(&wire_bytes(&[10, -20, 30])).await.unwrap();
        });

        let summary = server.serve_one(&mut sink).await.unwrap().unwrap();
        client.await.unwrap();
        drop(sink);

        assert_eq!(summary.session, SessionId(1));
        assert!(matches!(summary.end, SessionEnd::PeerClosed));
        assert_eq!(summary.frames, 3);
        let values: Vec<i32> = samples.map(|s| s.value).collect().await;
        assert_eq!(values, vec![10, -20, 30]);
    }

    #[tokio::test]
    async fn status_tracks_connection() {
        let mut server = SampleServer::bind(loopback()).await.unwrap();
        let addr = server.local_addr().unwrap();
        let mut status = server.status();
        assert_eq!(*status.borrow(), ServerStatus::Waiting);

        let (mut sink, _samples) = ChannelSink::channel();
        let client = tokio::spawn(async move {
            let _stream = TcpStream::connect(addr).await.unwrap();
            status.wait_for(|s| matches!(s, ServerStatus::Connected { .. })).await.unwrap();
            // dropping the stream ends the session
        });

        server.serve_one(&mut sink).await.unwrap().unwrap();
        client.await.unwrap();
        assert_eq!(*server.status().borrow(), ServerStatus::Waiting);
    }

    #[tokio::test]
    async fn shutdown_while_waiting_stops_serve() {
        let mut server = SampleServer::bind(loopback()).await.unwrap();
        let token = server.shutdown_token();
        let (mut sink, _samples) = ChannelSink::channel();

        token.cancel();
        server.serve(&mut sink).await.unwrap();
        assert!(server.serve_one(&mut sink).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_binding() {
        let mut config = loopback();
        config.idle_timeout_ms = Some(0);

        match SampleServer::bind(config).await {
            Err(e @ StreamError::Config { .. }) => assert!(!e.is_recoverable()),
            Err(other) => panic!("Expected config error, got {other:?}"),
            Ok(_) => panic!("Expected config error, got a server"),
        }
    }

    #[tokio::test]
    async fn closed_sink_stops_serve() {
        let mut server = SampleServer::bind(loopback()).await.unwrap();
        let addr = server.local_addr().unwrap();
        let (mut sink, samples) = ChannelSink::channel();
        drop(samples);

        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream.write_all(&wire_bytes(&[1, 2])).await.unwrap();
        });

        let result = tokio::time::timeout(Duration::from_secs(5), server.serve(&mut sink))
            .await
            .expect("serve should stop once the sink is closed");
        client.await.unwrap();

        assert!(matches!(result, Err(StreamError::SinkClosed)));
    }
}
