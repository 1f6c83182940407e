//! Label-encoding table.
//!
//! Bidirectional mapping between the network's internal class indices
//! {0, 1} and the external label strings the training data used
//! ("0" = negative, "4" = positive). Persisted next to the network as a
//! two-element JSON array ordered by class index.

use std::path::Path;

use crate::error::{Result, SentimentError};

/// Number of classes in a binary decision.
const NUM_CLASSES: usize = 2;

/// Index <-> label-string mapping for the binary decision.
#[derive(Debug, Clone)]
pub struct LabelTable {
    classes: Vec<String>,
}

impl LabelTable {
    /// Load the table from a JSON file holding exactly two label strings.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(SentimentError::ArtifactNotFound(path.to_path_buf()));
        }

        let data = std::fs::read_to_string(path)?;
        let classes: Vec<String> = serde_json::from_str(&data)
            .map_err(|e| SentimentError::Deserialization(format!("label table: {e}")))?;

        Self::from_classes(classes)
    }

    /// Build a table directly from class strings ordered by index.
    pub fn from_classes(classes: Vec<String>) -> Result<Self> {
        if classes.len() != NUM_CLASSES {
            return Err(SentimentError::Deserialization(format!(
                "label table must hold exactly {NUM_CLASSES} classes, got {}",
                classes.len()
            )));
        }
        Ok(Self { classes })
    }

    /// Decode a class index to its external label string.
    pub fn decode(&self, index: usize) -> Result<&str> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| {
                SentimentError::InferenceOutput(format!("class index {index} out of range"))
            })
    }

    /// Encode an external label string back to its class index.
    pub fn encode(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }

    /// All label strings, ordered by class index.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}
