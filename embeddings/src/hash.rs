//! Deterministic hash-based embeddings.
//!
//! Each output component is derived from a positional multiplicative
//! hash of the lower-cased text, seeded by the component index and
//! passed through a MurmurHash3-style finalizer. The whole text and each
//! of its adjacent byte pairs contribute one such value, and the
//! component is their mean. Sharing byte pairs is what gives reordered
//! words and single-character typos a moderate similarity instead of an
//! unrelated vector.

use crate::error::{EmbeddingError, Result};

/// Maximum text length in bytes.
pub const MAX_TEXT_BYTES: usize = 8192;

/// Multiplier of the positional hash.
const HASH_MULTIPLIER: u64 = 31;

/// Seed multiplier for the second positional hash.
const SECOND_SEED_MULTIPLIER: u64 = 37;

const FINALIZER_SHIFT: u32 = 33;
const FINALIZER_C1: u64 = 0xff51_afd7_ed55_8ccd;
const FINALIZER_C2: u64 = 0xc4ce_b9fe_1a85_ec53;

/// Low 31 bits of a finalized hash.
const VALUE_MASK: u64 = 0x7fff_ffff;
const VALUE_SCALE: f64 = 2_147_483_648.0; // 2^31

/// Largest `f32` strictly below 1.0.
const MAX_COMPONENT: f32 = 1.0 - f32::EPSILON / 2.0;

/// Positional hash: `hash = hash * 31 + byte * (position + 1)`, wrapping.
pub fn positional_hash(bytes: &[u8], seed: u64) -> u64 {
    bytes.iter().enumerate().fold(seed, |hash, (position, &byte)| {
        hash.wrapping_mul(HASH_MULTIPLIER)
            .wrapping_add(u64::from(byte).wrapping_mul(position as u64 + 1))
    })
}

/// Combine two positional hashes seeded with `index` and `index * 37`.
pub fn combined_hash(bytes: &[u8], index: u64) -> u64 {
    let first = positional_hash(bytes, index);
    let second = positional_hash(bytes, index.wrapping_mul(SECOND_SEED_MULTIPLIER));
    first ^ (second << 16)
}

/// MurmurHash3 64-bit finalizer.
pub fn finalize(mut hash: u64) -> u64 {
    hash ^= hash >> FINALIZER_SHIFT;
    hash = hash.wrapping_mul(FINALIZER_C1);
    hash ^= hash >> FINALIZER_SHIFT;
    hash = hash.wrapping_mul(FINALIZER_C2);
    hash ^= hash >> FINALIZER_SHIFT;
    hash
}

/// Map a finalized hash to `[-1, 1)`.
pub fn hash_to_unit(hash: u64) -> f64 {
    let normalized = (hash & VALUE_MASK) as f64 / VALUE_SCALE;
    normalized * 2.0 - 1.0
}

fn feature_value(bytes: &[u8], index: u64) -> f64 {
    hash_to_unit(finalize(combined_hash(bytes, index)))
}

/// Hash-based embedding generator.
#[derive(Debug, Clone, Copy)]
pub struct HashEngine {
    max_text_bytes: usize,
}

impl HashEngine {
    /// Create an engine accepting texts of up to [`MAX_TEXT_BYTES`] bytes.
    pub fn new() -> Self {
        Self {
            max_text_bytes: MAX_TEXT_BYTES,
        }
    }

    /// Set the maximum accepted text length in bytes.
    pub fn with_max_text_bytes(mut self, max_text_bytes: usize) -> Self {
        self.max_text_bytes = max_text_bytes;
        self
    }

    /// Maximum accepted text length in bytes.
    pub fn max_text_bytes(&self) -> usize {
        self.max_text_bytes
    }

    /// Check `text` and `dimension` without generating anything.
    pub fn validate(&self, text: &str, dimension: usize) -> Result<()> {
        if text.is_empty() {
            return Err(EmbeddingError::EmptyText);
        }
        if text.len() > self.max_text_bytes {
            return Err(EmbeddingError::TextTooLong {
                length: text.len(),
                max_length: self.max_text_bytes,
            });
        }
        if dimension == 0 {
            return Err(EmbeddingError::InvalidDimension {
                dimension,
                max: usize::MAX,
            });
        }
        Ok(())
    }

    /// Generate a `dimension`-long embedding of `text`.
    ///
    /// Identical inputs always produce bit-identical output, letter case
    /// is ignored, and every component lies in `[-1, 1)`.
    pub fn generate(&self, text: &str, dimension: usize) -> Result<Vec<f32>> {
        self.validate(text, dimension)?;

        let lowered = text.to_lowercase();
        let bytes = lowered.as_bytes();

        let mut features: Vec<&[u8]> = Vec::with_capacity(bytes.len());
        features.push(bytes);
        features.extend(bytes.windows(2));
        let count = features.len() as f64;

        let embedding = (0..dimension as u64)
            .map(|index| {
                let sum: f64 = features
                    .iter()
                    .map(|feature| feature_value(feature, index))
                    .sum();
                ((sum / count) as f32).min(MAX_COMPONENT)
            })
            .collect();

        Ok(embedding)
    }

    /// Generate embeddings for several texts, stopping at the first error.
    pub fn generate_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        dimension: usize,
    ) -> Result<Vec<Vec<f32>>> {
        texts
            .iter()
            .map(|text| self.generate(text.as_ref(), dimension))
            .collect()
    }
}

impl Default for HashEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a hash embedding with the default bounds.
pub fn hash_embed(text: &str, dimension: usize) -> Result<Vec<f32>> {
    HashEngine::new().generate(text, dimension)
}
