//! Server configuration.

use std::net::SocketAddr;

/// Default bind address for the HTTP server.
const DEFAULT_BIND: &str = "127.0.0.1:8642";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.parse().expect("default bind address parses"),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment, falling back to defaults.
    /// `SLIPWAY_BIND` overrides the listen address.
    pub fn load() -> anyhow::Result<Self> {
        let bind = match std::env::var("SLIPWAY_BIND") {
            Ok(addr) => addr.parse()?,
            Err(_) => DEFAULT_BIND.parse()?,
        };
        Ok(Self { bind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bind_is_loopback() {
        let config = ServerConfig::default();
        assert!(config.bind.ip().is_loopback());
        assert_eq!(config.bind.port(), 8642);
    }
}
