//! Subword tokenization for model input preparation.
//!
//! Wraps a HuggingFace tokenizer configured for a fixed sequence length:
//! every input, empty strings included, is truncated or padded to exactly
//! [`MAX_SEQUENCE_LEN`] positions so the network always sees two parallel
//! sequences of the same shape.

use std::path::Path;

use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::error::{Result, SentimentError};

/// Fixed input sequence length. Design constant, not configurable per request.
pub const MAX_SEQUENCE_LEN: usize = 128;

/// Token id used for padding positions.
const PAD_TOKEN: &str = "[PAD]";

/// Tokenized request text: parallel sequences of exactly
/// [`MAX_SEQUENCE_LEN`] positions each.
#[derive(Debug, Clone)]
pub struct EncodedText {
    /// Subword token ids.
    pub input_ids: Vec<u32>,
    /// 1 for real tokens, 0 for padding.
    pub attention_mask: Vec<u32>,
}

/// Tokenizer matched to the network's training vocabulary.
pub struct SentimentTokenizer {
    inner: Tokenizer,
}

impl SentimentTokenizer {
    /// Resolve a tokenizer by its well-known identifier
    /// (e.g. `distilbert-base-uncased`).
    ///
    /// The download cache honors the standard HuggingFace environment
    /// variables; restricted deployments point them at a writable
    /// directory before calling this.
    pub fn from_pretrained(identifier: &str) -> Result<Self> {
        let tokenizer = Tokenizer::from_pretrained(identifier, None)
            .map_err(|e| SentimentError::TokenizerLoad(format!("{identifier}: {e}")))?;
        Self::configured(tokenizer)
    }

    /// Load a tokenizer from a local `tokenizer.json` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| SentimentError::TokenizerLoad(format!("{}: {e}", path.display())))?;
        Self::configured(tokenizer)
    }

    /// Wrap an already-built tokenizer, applying the fixed-length
    /// truncation and padding configuration.
    pub fn from_tokenizer(tokenizer: Tokenizer) -> Result<Self> {
        Self::configured(tokenizer)
    }

    fn configured(mut tokenizer: Tokenizer) -> Result<Self> {
        let pad_id = tokenizer.token_to_id(PAD_TOKEN).unwrap_or(0);

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LEN,
                ..TruncationParams::default()
            }))
            .map_err(|e| SentimentError::TokenizerLoad(format!("truncation config: {e}")))?;

        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(MAX_SEQUENCE_LEN),
            pad_id,
            pad_token: PAD_TOKEN.to_string(),
            ..PaddingParams::default()
        }));

        Ok(Self { inner: tokenizer })
    }

    /// Tokenize `text` into fixed-length parallel sequences.
    ///
    /// Longer inputs are truncated, shorter ones padded, so both returned
    /// sequences always hold exactly [`MAX_SEQUENCE_LEN`] positions.
    pub fn encode(&self, text: &str) -> Result<EncodedText> {
        let encoding = self
            .inner
            .encode(text, true)
            .map_err(|e| SentimentError::Tokenizer(e.to_string()))?;

        Ok(EncodedText {
            input_ids: encoding.get_ids().to_vec(),
            attention_mask: encoding.get_attention_mask().to_vec(),
        })
    }

    /// Vocabulary size, including added special tokens.
    pub fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::test_support::tiny_tokenizer;

    #[test]
    fn test_fixed_length_for_short_input() {
        let tokenizer = tiny_tokenizer();
        let encoded = tokenizer.encode("hello world").unwrap();

        assert_eq!(encoded.input_ids.len(), MAX_SEQUENCE_LEN);
        assert_eq!(encoded.attention_mask.len(), MAX_SEQUENCE_LEN);
        // Real tokens first, padding after.
        assert_eq!(encoded.attention_mask[0], 1);
        assert_eq!(*encoded.attention_mask.last().unwrap(), 0);
    }

    #[test]
    fn test_fixed_length_for_long_input() {
        let tokenizer = tiny_tokenizer();
        let long = "hello ".repeat(400);
        let encoded = tokenizer.encode(&long).unwrap();

        assert_eq!(encoded.input_ids.len(), MAX_SEQUENCE_LEN);
        assert_eq!(encoded.attention_mask.len(), MAX_SEQUENCE_LEN);
        assert!(encoded.attention_mask.iter().all(|&m| m == 1));
    }

    #[test]
    fn test_empty_string_is_valid_input() {
        let tokenizer = tiny_tokenizer();
        let encoded = tokenizer.encode("").unwrap();

        assert_eq!(encoded.input_ids.len(), MAX_SEQUENCE_LEN);
        assert_eq!(encoded.attention_mask.len(), MAX_SEQUENCE_LEN);
    }

    #[test]
    fn test_unknown_words_map_to_unk() {
        let tokenizer = tiny_tokenizer();
        let encoded = tokenizer.encode("zzzzqqqq").unwrap();

        assert_eq!(encoded.input_ids.len(), MAX_SEQUENCE_LEN);
        assert_eq!(encoded.attention_mask[0], 1);
    }
}
