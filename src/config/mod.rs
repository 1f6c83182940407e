//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables (`SENTIMENT_*`)
//! - CLI arguments (for the server binary)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Artifact bundle configuration
    #[serde(default)]
    pub model: ModelConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("SENTIMENT_HOST") {
            config.http.host = host;
        }
        if let Ok(port) = std::env::var("SENTIMENT_PORT") {
            if let Ok(port) = port.parse() {
                config.http.port = port;
            }
        }
        if let Ok(dir) = std::env::var("SENTIMENT_MODEL_DIR") {
            config.model.root = PathBuf::from(dir);
        }
        if let Ok(id) = std::env::var("SENTIMENT_TOKENIZER_ID") {
            config.model.tokenizer_id = id;
        }
        if let Ok(cache) = std::env::var("SENTIMENT_TOKENIZER_CACHE") {
            config.model.tokenizer_cache = Some(PathBuf::from(cache));
        }

        config
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Artifact bundle configuration.
///
/// The bundle root holds a subdirectory with the serialized network and a
/// sibling JSON file with the label-encoding table. The tokenizer is
/// resolved by identifier unless `tokenizer.json` exists in the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Bundle root directory
    pub root: PathBuf,

    /// Network subdirectory name inside the root
    pub network_subdir: String,

    /// Label-encoding table file name inside the root
    pub label_file: String,

    /// Well-known tokenizer identifier
    pub tokenizer_id: String,

    /// Writable tokenizer download-cache override (sandboxed deployments)
    pub tokenizer_cache: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./models/sentiment"),
            network_subdir: "network".to_string(),
            label_file: "label_encoder.json".to_string(),
            tokenizer_id: "distilbert-base-uncased".to_string(),
            tokenizer_cache: None,
        }
    }
}

impl ModelConfig {
    /// Full path of the network directory.
    pub fn network_dir(&self) -> PathBuf {
        self.root.join(&self.network_subdir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.http.port, 8000);
        assert_eq!(config.model.tokenizer_id, "distilbert-base-uncased");
        assert_eq!(
            config.model.network_dir(),
            PathBuf::from("./models/sentiment/network")
        );
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
            [http]
            host = "0.0.0.0"
            port = 9000

            [model]
            root = "/srv/artifacts"
            network_subdir = "net"
            label_file = "labels.json"
            tokenizer_id = "bert-base-uncased"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.model.network_dir(), PathBuf::from("/srv/artifacts/net"));
        assert_eq!(config.model.label_file, "labels.json");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[http]\nport = 4242\n").unwrap();
        assert_eq!(config.http.port, 4242);
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.model.label_file, "label_encoder.json");
    }
}
