//! Native sentiment network with inference from safetensors weights.
//!
//! The network consumes two parallel integer sequences (token ids and an
//! attention mask) of fixed length and produces one scalar in [0, 1]: the
//! probability of the positive class.
//!
//! ## Architecture (from actual weights)
//!
//! ```text
//! Token ids → Embedding [vocab, hidden]
//!           ↓ masked mean pooling (attention mask excludes padding)
//! Nx Encoder layers: Linear(hidden, hidden) + ReLU
//!           ↓
//! Head "dense": Linear(hidden, 1) → sigmoid → P(positive)
//! ```
//!
//! The head keeps its serialized name, so the forward pass publishes its
//! scalar under the `dense` field of a [`NetworkOutput::NamedFields`]
//! structure. Callers extract the designated field explicitly and fail
//! with an error if it is absent rather than silently defaulting.

use std::collections::HashMap;
use std::path::Path;

use ndarray::{Array1, Array2};
use safetensors::tensor::Dtype;
use safetensors::SafeTensors;

use crate::error::{Result, SentimentError};

/// Name of the output field carrying the final scalar prediction.
pub const OUTPUT_FIELD: &str = "dense";

/// Network forward-pass output.
///
/// Depending on how a checkpoint was exported, the final prediction is
/// either a bare scalar or one field of a named structure.
#[derive(Debug, Clone)]
pub enum NetworkOutput {
    /// Direct scalar output.
    Scalar(f32),
    /// Named output structure, one scalar per head.
    NamedFields(HashMap<String, f32>),
}

impl NetworkOutput {
    /// Extract the scalar designated by `field`.
    ///
    /// A [`NetworkOutput::Scalar`] carries exactly one value and ignores
    /// the field name; a [`NetworkOutput::NamedFields`] must contain it.
    pub fn extract(&self, field: &str) -> Result<f32> {
        match self {
            NetworkOutput::Scalar(value) => Ok(*value),
            NetworkOutput::NamedFields(fields) => {
                fields.get(field).copied().ok_or_else(|| {
                    SentimentError::InferenceOutput(format!(
                        "output field '{field}' absent, have: {:?}",
                        fields.keys().collect::<Vec<_>>()
                    ))
                })
            },
        }
    }
}

/// Forward-pass seam between the service and a concrete network.
///
/// The production implementation is [`SentimentNet`]; tests substitute
/// fixed-output stubs.
pub trait Network: Send + Sync {
    /// Run the network on parallel token-id and attention-mask sequences.
    fn forward(&self, input_ids: &[u32], attention_mask: &[u32]) -> Result<NetworkOutput>;
}

/// Linear layer (dense)
#[derive(Debug, Clone)]
struct Linear {
    weight: Array2<f32>, // [out_features, in_features]
    bias: Option<Array1<f32>>,
}

impl Linear {
    fn new(weight: Array2<f32>, bias: Option<Array1<f32>>) -> Self {
        Self { weight, bias }
    }

    fn forward(&self, x: &Array1<f32>) -> Array1<f32> {
        // y = Wx + b
        let mut y = self.weight.dot(x);
        if let Some(ref b) = self.bias {
            y += b;
        }
        y
    }
}

/// Sigmoid activation: 1 / (1 + e^-x)
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Complete sentiment network
#[derive(Debug, Clone)]
pub struct SentimentNet {
    embed: Array2<f32>,
    encoder: Vec<Linear>,
    head: Linear,
    vocab_size: usize,
    hidden_size: usize,
}

impl SentimentNet {
    /// Load network weights from a safetensors file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(SentimentError::ArtifactNotFound(path.to_path_buf()));
        }

        let data = std::fs::read(path)?;
        let tensors = SafeTensors::deserialize(&data)
            .map_err(|e| SentimentError::Deserialization(format!("safetensors parse: {e}")))?;

        let embed = load_tensor_2d(&tensors, "embed.weight")?;
        let vocab_size = embed.shape()[0];
        let hidden_size = embed.shape()[1];
        if vocab_size == 0 || hidden_size == 0 {
            return Err(SentimentError::Deserialization(format!(
                "degenerate embedding table: [{vocab_size}, {hidden_size}]"
            )));
        }

        // Encoder layers are numbered contiguously from zero; depth is
        // discovered from the checkpoint rather than fixed.
        let mut encoder = Vec::new();
        for i in 0.. {
            let name = format!("encoder.{i}.weight");
            if tensors.tensor(&name).is_err() {
                break;
            }
            encoder.push(load_linear(&tensors, &format!("encoder.{i}"))?);
        }

        let head = load_linear(&tensors, OUTPUT_FIELD)?;
        if head.weight.shape()[0] != 1 {
            return Err(SentimentError::Deserialization(format!(
                "head '{OUTPUT_FIELD}' must have one output unit, got {}",
                head.weight.shape()[0]
            )));
        }

        Ok(Self {
            embed,
            encoder,
            head,
            vocab_size,
            hidden_size,
        })
    }

    /// Vocabulary size from the embedding table.
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Hidden dimension from the embedding table.
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Encode sequences to a pooled hidden representation.
    ///
    /// Mean pooling over embeddings of positions with a non-zero attention
    /// mask; padding positions contribute nothing. A token id outside the
    /// embedding table means the tokenizer and network disagree on the
    /// vocabulary, which is surfaced instead of clamped away.
    fn encode(&self, input_ids: &[u32], attention_mask: &[u32]) -> Result<Array1<f32>> {
        let mut pooled = Array1::zeros(self.hidden_size);
        let mut count = 0usize;

        for (&token_id, &mask) in input_ids.iter().zip(attention_mask) {
            if mask == 0 {
                continue;
            }
            let idx = token_id as usize;
            if idx >= self.vocab_size {
                return Err(SentimentError::InferenceOutput(format!(
                    "token id {token_id} outside embedding table of {} entries",
                    self.vocab_size
                )));
            }
            pooled = pooled + self.embed.row(idx).to_owned();
            count += 1;
        }

        if count > 0 {
            pooled /= count as f32;
        }
        Ok(pooled)
    }
}

impl Network for SentimentNet {
    fn forward(&self, input_ids: &[u32], attention_mask: &[u32]) -> Result<NetworkOutput> {
        if input_ids.len() != attention_mask.len() {
            return Err(SentimentError::InferenceOutput(format!(
                "parallel inputs disagree: {} ids vs {} mask positions",
                input_ids.len(),
                attention_mask.len()
            )));
        }

        let mut hidden = self.encode(input_ids, attention_mask)?;
        for layer in &self.encoder {
            hidden = layer.forward(&hidden).mapv(|v| v.max(0.0));
        }

        let logit = self.head.forward(&hidden)[0];
        let probability = sigmoid(logit);

        let mut fields = HashMap::new();
        fields.insert(OUTPUT_FIELD.to_string(), probability);
        Ok(NetworkOutput::NamedFields(fields))
    }
}

// Helper functions for loading tensors

fn load_tensor_1d(tensors: &SafeTensors, name: &str) -> Result<Array1<f32>> {
    let view = tensors
        .tensor(name)
        .map_err(|e| SentimentError::Deserialization(format!("tensor '{name}' not found: {e}")))?;

    check_dtype(name, view.dtype())?;

    let data: Vec<f32> = view
        .data()
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    Ok(Array1::from_vec(data))
}

fn check_dtype(name: &str, dtype: Dtype) -> Result<()> {
    if dtype == Dtype::F32 {
        Ok(())
    } else {
        Err(SentimentError::Deserialization(format!(
            "tensor '{name}': expected F32, got {dtype:?}"
        )))
    }
}

fn load_tensor_2d(tensors: &SafeTensors, name: &str) -> Result<Array2<f32>> {
    let view = tensors
        .tensor(name)
        .map_err(|e| SentimentError::Deserialization(format!("tensor '{name}' not found: {e}")))?;

    check_dtype(name, view.dtype())?;

    let shape = view.shape();
    if shape.len() != 2 {
        return Err(SentimentError::Deserialization(format!(
            "expected 2D tensor for '{name}', got {shape:?}"
        )));
    }

    let data: Vec<f32> = view
        .data()
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    Array2::from_shape_vec((shape[0], shape[1]), data)
        .map_err(|e| SentimentError::Deserialization(format!("shape mismatch for '{name}': {e}")))
}

fn load_linear(tensors: &SafeTensors, prefix: &str) -> Result<Linear> {
    let weight = load_tensor_2d(tensors, &format!("{prefix}.weight"))?;
    let bias = load_tensor_1d(tensors, &format!("{prefix}.bias")).ok();
    Ok(Linear::new(weight, bias))
}

#[cfg(test)]
mod tests {
    use safetensors::tensor::TensorView;

    use super::*;

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
    }

    #[test]
    fn test_linear() {
        let weight = Array2::from_shape_vec((2, 3), vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0]).unwrap();
        let layer = Linear::new(weight, None);

        let x = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        let y = layer.forward(&x);

        assert_eq!(y.len(), 2);
        assert!((y[0] - 1.0).abs() < 1e-6);
        assert!((y[1] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_extract_scalar_ignores_field_name() {
        let out = NetworkOutput::Scalar(0.3);
        assert!((out.extract(OUTPUT_FIELD).unwrap() - 0.3).abs() < 1e-6);
        assert!((out.extract("anything").unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_extract_named_field() {
        let mut fields = HashMap::new();
        fields.insert("dense".to_string(), 0.95_f32);
        let out = NetworkOutput::NamedFields(fields);

        assert!((out.extract("dense").unwrap() - 0.95).abs() < 1e-6);
        assert!(matches!(
            out.extract("logits"),
            Err(SentimentError::InferenceOutput(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_artifact_not_found() {
        let err = SentimentNet::load("/nonexistent/model.safetensors").unwrap_err();
        assert!(matches!(err, SentimentError::ArtifactNotFound(_)));
    }

    #[test]
    fn test_forward_on_tiny_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");
        crate::inference::test_support::write_tiny_network(&path);

        let net = SentimentNet::load(&path).unwrap();
        assert_eq!(net.vocab_size(), 16);
        assert_eq!(net.hidden_size(), 4);

        let ids = vec![1, 2, 3, 0, 0, 0];
        let mask = vec![1, 1, 1, 0, 0, 0];
        let out = net.forward(&ids, &mask).unwrap();
        let p = out.extract(OUTPUT_FIELD).unwrap();
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_forward_rejects_mismatched_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");
        crate::inference::test_support::write_tiny_network(&path);

        let net = SentimentNet::load(&path).unwrap();
        let err = net.forward(&[1, 2, 3], &[1, 1]).unwrap_err();
        assert!(matches!(err, SentimentError::InferenceOutput(_)));
    }

    #[test]
    fn test_out_of_vocab_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");
        crate::inference::test_support::write_tiny_network(&path);

        let net = SentimentNet::load(&path).unwrap();
        let err = net.forward(&[1, 999], &[1, 1]).unwrap_err();
        assert!(matches!(err, SentimentError::InferenceOutput(_)));

        // Out-of-range ids on padding positions are never touched.
        let out = net.forward(&[1, 999], &[1, 0]).unwrap();
        assert!((0.0..=1.0).contains(&out.extract(OUTPUT_FIELD).unwrap()));
    }

    #[test]
    fn test_empty_embedding_table_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");

        let empty: Vec<u8> = Vec::new();
        let head_w: Vec<u8> = [0.4_f32, -0.2, 0.3, 0.1]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let tensors = vec![
            (
                "embed.weight",
                TensorView::new(Dtype::F32, vec![0, 4], &empty).unwrap(),
            ),
            (
                "dense.weight",
                TensorView::new(Dtype::F32, vec![1, 4], &head_w).unwrap(),
            ),
        ];
        safetensors::tensor::serialize_to_file(tensors, &None, &path).unwrap();

        let err = SentimentNet::load(&path).unwrap_err();
        assert!(matches!(err, SentimentError::Deserialization(_)));
    }

    #[test]
    fn test_non_f32_checkpoint_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");

        // Same byte width as F32, different interpretation.
        let ints: Vec<u8> = [1_i32, 2, 3, 4].iter().flat_map(|v| v.to_le_bytes()).collect();
        let tensors = vec![(
            "embed.weight",
            TensorView::new(Dtype::I32, vec![2, 2], &ints).unwrap(),
        )];
        safetensors::tensor::serialize_to_file(tensors, &None, &path).unwrap();

        let err = SentimentNet::load(&path).unwrap_err();
        assert!(matches!(err, SentimentError::Deserialization(_)));
    }

    #[test]
    fn test_all_padding_input_still_produces_probability() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");
        crate::inference::test_support::write_tiny_network(&path);

        let net = SentimentNet::load(&path).unwrap();
        let out = net.forward(&[0; 8], &[0; 8]).unwrap();
        let p = out.extract(OUTPUT_FIELD).unwrap();
        assert!((0.0..=1.0).contains(&p));
    }
}
