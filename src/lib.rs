//! # Sentiment Core - Binary Sentiment Classification over HTTP
//!
//! Serves a pretrained binary sentiment classifier behind an HTTP API.
//! Three serialized artifacts are loaded once per process - the network
//! weights, the subword tokenizer, and the label-encoding table - then
//! prediction requests run a short fixed pipeline:
//!
//! ```text
//! Client                          Server
//!    |                              |
//!    |-- POST /predict-sentiment/ ->|  tokenize (fixed 128 positions)
//!    |                              |  forward pass -> P(positive)
//!    |                              |  threshold at 0.5, decode label
//!    |<-- {text, sentiment, conf} --|
//! ```
//!
//! Labels follow the training data's encoding: `"0"` is negative, `"4"`
//! is positive. The reported confidence is always the raw positive-class
//! probability, never folded around the decision boundary.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sentiment::server::{create_router, AppState, ServerConfig};
//!
//! let state = Arc::new(AppState::new(ServerConfig::default()));
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! Or classify directly, without the HTTP layer:
//!
//! ```rust,ignore
//! use sentiment::{ModelConfig, SentimentService};
//!
//! let service = SentimentService::new(ModelConfig::default());
//! let prediction = service.predict("I really enjoyed this movie!")?;
//! assert_eq!(prediction.label, "4");
//! ```
//!
//! ## Modules
//!
//! - [`inference`]: artifact loading and the prediction pipeline
//! - [`server`]: HTTP API (Axum-based)
//! - [`config`]: configuration management
//! - [`error`]: error types and result alias

pub mod config;
pub mod error;
pub mod inference;
pub mod server;

// Re-exports for convenience
pub use config::{Config, HttpConfig, ModelConfig};
pub use error::{Result, SentimentError};
pub use inference::{
    LabelTable, Network, NetworkOutput, Prediction, SentimentNet, SentimentService,
    SentimentTokenizer, MAX_SEQUENCE_LEN, POSITIVE_THRESHOLD,
};
pub use server::{AppState, ServerConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
