//! Server state.

use super::config::ServerConfig;
use crate::inference::SentimentService;

/// Application state shared across handlers.
///
/// Constructed once at startup and passed to handlers behind an `Arc`;
/// the service's load-once lifecycle lives here instead of in a hidden
/// global.
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Sentiment inference service
    pub service: SentimentService,
}

impl AppState {
    /// Create new application state with an unloaded service.
    pub fn new(config: ServerConfig) -> Self {
        let service = SentimentService::new(config.model.clone());
        Self { config, service }
    }

    /// Create state around an existing service instance.
    ///
    /// Lets tests and embedders inject a pre-loaded or stubbed service.
    pub fn with_service(config: ServerConfig, service: SentimentService) -> Self {
        Self { config, service }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_unloaded() {
        let state = AppState::new(ServerConfig::default());
        assert!(!state.service.is_loaded());
    }
}
