//! Sentiment inference service.
//!
//! The service owns three co-located artifacts describing one training
//! run: the serialized network, the subword tokenizer matching its
//! vocabulary, and the label-encoding table. All three are loaded lazily
//! on the first prediction (or eagerly via [`SentimentService::initialize`])
//! and are read-only afterwards, so concurrent requests share them freely.
//!
//! # Pipeline
//!
//! ```text
//! text → tokenize (fixed 128 positions) → forward pass → extract scalar
//!      → threshold at 0.5 → decode label → (label, raw probability)
//! ```
//!
//! The reported confidence is always the raw positive-class probability,
//! never recalibrated: a scalar of 0.3 yields label "0" with confidence
//! 0.3, not 0.7. Downstream consumers depend on that exact behavior.
//!
//! # Example
//!
//! ```rust,ignore
//! use sentiment::{ModelConfig, SentimentService};
//!
//! let service = SentimentService::new(ModelConfig::default());
//! let prediction = service.predict("I really enjoyed this movie!")?;
//! println!("{} ({:.2})", prediction.label, prediction.confidence);
//! ```

mod labels;
mod model;
mod tokenizer;

use std::sync::{Arc, Mutex, PoisonError};

pub use labels::LabelTable;
pub use model::{Network, NetworkOutput, SentimentNet, OUTPUT_FIELD};
pub use tokenizer::{EncodedText, SentimentTokenizer, MAX_SEQUENCE_LEN};

use crate::config::ModelConfig;
use crate::error::{Result, SentimentError};

/// Closed decision boundary: a scalar of exactly 0.5 classifies positive.
pub const POSITIVE_THRESHOLD: f32 = 0.5;

/// File name of the serialized network inside the network directory.
pub const NETWORK_FILE: &str = "model.safetensors";

/// A single classification result.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// External label string from the label-encoding table.
    pub label: String,
    /// Raw positive-class probability in [0, 1], regardless of which
    /// label won.
    pub confidence: f32,
}

/// Artifacts resident in memory once the service is loaded.
struct Artifacts {
    network: Box<dyn Network>,
    tokenizer: SentimentTokenizer,
    labels: LabelTable,
}

/// Lazily-loading sentiment classification service.
///
/// One long-lived instance per process, shared by reference across
/// request handlers. The lifecycle is {Unloaded, Loaded}: created
/// Unloaded, transitioned to Loaded at most once, never back. The
/// transition is guarded by a mutex so concurrent first requests cause
/// exactly one load; a failed load leaves the state Unloaded and the
/// next call retries.
pub struct SentimentService {
    config: ModelConfig,
    artifacts: Mutex<Option<Arc<Artifacts>>>,
}

impl SentimentService {
    /// Create an unloaded service for the given artifact bundle.
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            artifacts: Mutex::new(None),
        }
    }

    /// Assemble an already-loaded service from its parts.
    ///
    /// Used by embedders and tests that supply their own network or
    /// tokenizer instead of reading the artifact bundle.
    pub fn from_parts(
        network: Box<dyn Network>,
        tokenizer: SentimentTokenizer,
        labels: LabelTable,
    ) -> Self {
        Self {
            config: ModelConfig::default(),
            artifacts: Mutex::new(Some(Arc::new(Artifacts {
                network,
                tokenizer,
                labels,
            }))),
        }
    }

    /// Load all three artifacts and transition to Loaded.
    ///
    /// Idempotent in its target state: once Loaded, this is a no-op.
    /// On failure nothing is retained and the state stays Unloaded.
    pub fn initialize(&self) -> Result<()> {
        self.artifacts().map(|_| ())
    }

    /// Whether the artifacts are resident in memory. Pure read.
    pub fn is_loaded(&self) -> bool {
        self.lock().is_some()
    }

    /// Classify `text`, lazily loading the artifacts on first use.
    ///
    /// Empty input is valid and produces a result. The input is truncated
    /// or padded to exactly [`MAX_SEQUENCE_LEN`] token positions before
    /// the forward pass.
    pub fn predict(&self, text: &str) -> Result<Prediction> {
        let artifacts = self.artifacts()?;

        let encoded = artifacts.tokenizer.encode(text)?;
        let output = artifacts
            .network
            .forward(&encoded.input_ids, &encoded.attention_mask)?;
        let score = output.extract(OUTPUT_FIELD)?;

        let index = usize::from(score >= POSITIVE_THRESHOLD);
        let label = artifacts.labels.decode(index)?.to_string();

        Ok(Prediction {
            label,
            confidence: score,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Arc<Artifacts>>> {
        self.artifacts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the loaded artifacts, loading them under the lock if the
    /// service is still Unloaded. Holding the lock for the whole load
    /// serializes concurrent first requests; later calls only clone the
    /// `Arc` and run without it.
    fn artifacts(&self) -> Result<Arc<Artifacts>> {
        let mut guard = self.lock();
        if let Some(artifacts) = guard.as_ref() {
            return Ok(Arc::clone(artifacts));
        }

        let loaded = Arc::new(self.load_artifacts().map_err(|e| {
            tracing::error!(error = %e, "artifact loading failed");
            e
        })?);
        *guard = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    fn load_artifacts(&self) -> Result<Artifacts> {
        let root = self.config.root.as_path();
        let network_dir = self.config.network_dir();

        if !network_dir.is_dir() {
            return Err(SentimentError::ArtifactNotFound(network_dir));
        }

        tracing::info!(path = %network_dir.display(), "loading network weights");
        let network = SentimentNet::load(network_dir.join(NETWORK_FILE))?;

        let tokenizer = self.load_tokenizer()?;

        let label_path = root.join(&self.config.label_file);
        tracing::info!(path = %label_path.display(), "loading label table");
        let labels = LabelTable::load(label_path)?;

        tracing::info!(
            vocab_size = network.vocab_size(),
            hidden_size = network.hidden_size(),
            tokenizer_vocab = tokenizer.vocab_size(),
            "artifacts loaded"
        );

        Ok(Artifacts {
            network: Box::new(network),
            tokenizer,
            labels,
        })
    }

    fn load_tokenizer(&self) -> Result<SentimentTokenizer> {
        // Restricted deployments redirect the download cache to a
        // writable location before the first fetch.
        if let Some(cache) = &self.config.tokenizer_cache {
            std::fs::create_dir_all(cache)?;
            std::env::set_var("HF_HOME", cache);
        }

        let local = self.config.root.join("tokenizer.json");
        if local.is_file() {
            tracing::info!(path = %local.display(), "loading tokenizer from local file");
            SentimentTokenizer::from_file(local)
        } else {
            tracing::info!(id = %self.config.tokenizer_id, "resolving tokenizer by identifier");
            SentimentTokenizer::from_pretrained(&self.config.tokenizer_id)
        }
    }
}
