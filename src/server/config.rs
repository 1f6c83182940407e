//! Server configuration.

use std::net::SocketAddr;

use crate::config::ModelConfig;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub addr: SocketAddr,
    /// Artifact bundle configuration
    pub model: ModelConfig,
    /// Eagerly load artifacts at startup instead of on first request
    pub preload: bool,
    /// CORS enabled (allow-all, matching the reference deployment)
    pub cors_enabled: bool,
    /// Enable request logging
    pub logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8000".parse().expect("valid default address"),
            model: ModelConfig::default(),
            preload: false,
            cors_enabled: true,
            logging: true,
        }
    }
}

impl ServerConfig {
    /// Create with custom port
    pub fn with_port(mut self, port: u16) -> Self {
        self.addr = SocketAddr::new(self.addr.ip(), port);
        self
    }

    /// Bind to all interfaces
    pub fn bind_all(mut self) -> Self {
        let port = self.addr.port();
        self.addr = SocketAddr::new("0.0.0.0".parse().expect("valid address"), port);
        self
    }

    /// Set address directly
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Set the artifact bundle configuration
    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    /// Load artifacts eagerly at startup
    pub fn with_preload(mut self) -> Self {
        self.preload = true;
        self
    }

    /// Disable CORS
    pub fn without_cors(mut self) -> Self {
        self.cors_enabled = false;
        self
    }

    /// Disable logging
    pub fn without_logging(mut self) -> Self {
        self.logging = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let config = ServerConfig::default().with_port(9000).bind_all();
        assert_eq!(config.addr.port(), 9000);
        assert!(config.addr.ip().is_unspecified());

        let config = ServerConfig::default().without_cors().with_preload();
        assert!(!config.cors_enabled);
        assert!(config.preload);
    }
}
