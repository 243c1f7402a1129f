//! Server configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable selecting the listen port.
pub const PORT_ENV: &str = "PORT";

/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;

/// Server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: IpAddr,
    /// Listen port (HTTP and WebSocket share it)
    pub port: u16,
    /// Directory holding `index.html` and the client assets
    pub static_dir: PathBuf,
    /// Per-connection outbound queue; messages beyond it are dropped for that connection
    pub outbound_queue: usize,
    /// Inbound event queue shared by all connections
    pub inbound_queue: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public"),
            outbound_queue: 64,
            inbound_queue: 256,
        }
    }
}

impl ServerConfig {
    /// Defaults with `PORT` applied from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_port_var(std::env::var(PORT_ENV).ok().as_deref())
    }

    /// Apply a raw `PORT` value. Unset or blank keeps the current port.
    pub fn with_port_var(mut self, value: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.port = raw
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.to_string()))?;
        }
        Ok(self)
    }

    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_binds_all_interfaces_on_3000() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address().to_string(), "0.0.0.0:3000");
        assert!(config.static_dir.ends_with("public"));
    }

    #[test]
    fn port_variable_overrides_default() {
        let config = ServerConfig::default().with_port_var(Some("8080")).unwrap();
        assert_eq!(config.port, 8080);

        let config = ServerConfig::default().with_port_var(None).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);

        let config = ServerConfig::default().with_port_var(Some("  ")).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = ServerConfig::default()
            .with_port_var(Some("http"))
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidPort("http".into()));

        assert!(ServerConfig::default()
            .with_port_var(Some("70000"))
            .is_err());
    }
}
