//! Static configuration
//!
//! Configuration is read once at startup and passed by value into the
//! components that need it.
//!
//! ```yaml
//! server:
//!   port: 3000
//!   bind_addr: 0.0.0.0
//!   idle_timeout_ms: 10000
//! device:
//!   ip: 192.168.4.1
//!   port: 80
//! sink:
//!   kind: file
//!   path: samples.txt
//! ```

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Result, StreamError};

/// Port the board streams to unless configured otherwise.
pub const DEFAULT_PORT: u16 = 3000;

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub device: DeviceConfig,
    pub sink: SinkConfig,
}

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// TCP port to accept the board's stream on
    pub port: u16,
    /// Local address to bind, all interfaces by default
    pub bind_addr: IpAddr,
    /// Give up on a session when no complete frame arrives within this window
    pub idle_timeout_ms: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            idle_timeout_ms: None,
        }
    }
}

impl ServerConfig {
    /// Listener on `port`, all interfaces, no idle timeout.
    pub fn new(port: u16) -> Self {
        Self { port, ..Self::default() }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Restrict the listener to one local address.
    pub fn with_bind_addr(mut self, addr: IpAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the per-frame idle timeout, rounded up to whole milliseconds.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        let ms = timeout.as_micros().div_ceil(1000).max(1);
        self.idle_timeout_ms = Some(u64::try_from(ms).unwrap_or(u64::MAX));
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_ms.map(Duration::from_millis)
    }

    /// Reject listener settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.idle_timeout_ms == Some(0) {
            return Err(StreamError::invalid_config(
                "server.idle_timeout_ms must be positive (omit it to disable the timeout)",
            ));
        }
        Ok(())
    }
}

/// Where the board's HTTP control interface lives.
///
/// The server never talks to the board itself. The address is kept here so
/// the control-plane tooling and the server are configured from one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    pub ip: IpAddr,
    pub port: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        // WiFi shield access-point address
        Self { ip: IpAddr::V4(Ipv4Addr::new(192, 168, 4, 1)), port: 80 }
    }
}

impl DeviceConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

/// Destination for decoded samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkConfig {
    /// One value per line on standard output
    #[default]
    Stdout,
    /// One value per line appended to a file
    File { path: PathBuf },
}

impl Config {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml_ng::from_str(yaml)
            .map_err(|e| StreamError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| StreamError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        if self.device.port == 0 {
            return Err(StreamError::invalid_config("device.port must not be 0"));
        }
        if let SinkConfig::File { path } = &self.sink {
            if path.as_os_str().is_empty() {
                return Err(StreamError::invalid_config("sink.path must not be empty"));
            }
        }
        Ok(())
    }
}
