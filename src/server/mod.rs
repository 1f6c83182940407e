//! Sentiment HTTP server.
//!
//! Axum routing and schema validation around the inference service:
//! - `GET /` - welcome message
//! - `GET /health` - liveness plus model lifecycle state
//! - `GET /info` - static endpoint descriptor
//! - `POST /predict-sentiment/` - classify a text
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sentiment::server::{create_router, AppState, ServerConfig};
//!
//! let state = Arc::new(AppState::new(ServerConfig::default()));
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! ```

mod config;
mod handlers;
mod state;

pub use config::ServerConfig;
pub use handlers::{
    create_router, health_check, HealthResponse, RootResponse, SentimentRequest,
    SentimentResponse, PREDICTION_ERROR_PREFIX,
};
pub use state::AppState;
