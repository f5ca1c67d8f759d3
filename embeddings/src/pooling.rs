//! Pooling of per-token hidden states into one sentence vector.

use serde::{Deserialize, Serialize};

use crate::error::{EmbeddingError, Result};

/// How to reduce `[seq_len, hidden]` hidden states to `[hidden]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pooling {
    /// First token (`[CLS]`).
    #[default]
    Cls,
    /// Mean over tokens whose attention mask is set.
    Mean,
    /// Last token whose attention mask is set.
    LastToken,
}

/// Pool one sequence of hidden states.
///
/// `hidden` is row-major `[seq_len, hidden_dim]`; `attention_mask` has
/// one entry per token.
pub fn pool(
    hidden: &[f32],
    seq_len: usize,
    hidden_dim: usize,
    attention_mask: &[i64],
    pooling: Pooling,
) -> Result<Vec<f32>> {
    if seq_len == 0 || hidden_dim == 0 {
        return Err(EmbeddingError::Inference(
            "model returned an empty hidden state".to_string(),
        ));
    }
    if hidden.len() < seq_len * hidden_dim {
        return Err(EmbeddingError::Inference(format!(
            "hidden state has {} values, expected {}",
            hidden.len(),
            seq_len * hidden_dim
        )));
    }

    let row = |token: usize| &hidden[token * hidden_dim..(token + 1) * hidden_dim];

    match pooling {
        Pooling::Cls => Ok(row(0).to_vec()),
        Pooling::LastToken => Ok(row(last_attended_index(attention_mask, seq_len)).to_vec()),
        Pooling::Mean => {
            let mut sum = vec![0.0f32; hidden_dim];
            let mut count = 0usize;
            for token in 0..seq_len {
                if attention_mask.get(token).copied().unwrap_or(1) == 0 {
                    continue;
                }
                for (acc, value) in sum.iter_mut().zip(row(token)) {
                    *acc += value;
                }
                count += 1;
            }
            if count > 0 {
                let scale = count as f32;
                for value in &mut sum {
                    *value /= scale;
                }
            }
            Ok(sum)
        }
    }
}

/// Index of the last token with a non-zero attention mask.
fn last_attended_index(attention_mask: &[i64], seq_len: usize) -> usize {
    attention_mask
        .iter()
        .take(seq_len)
        .rposition(|&m| m != 0)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // 3 tokens, hidden size 2.
    const HIDDEN: [f32; 6] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];

    #[test]
    fn test_cls_takes_first_token() {
        let pooled = pool(&HIDDEN, 3, 2, &[1, 1, 1], Pooling::Cls).unwrap();
        assert_eq!(pooled, vec![1.0, 2.0]);
    }

    #[test]
    fn test_last_token_skips_padding() {
        let pooled = pool(&HIDDEN, 3, 2, &[1, 1, 0], Pooling::LastToken).unwrap();
        assert_eq!(pooled, vec![3.0, 4.0]);

        let pooled = pool(&HIDDEN, 3, 2, &[1, 1, 1], Pooling::LastToken).unwrap();
        assert_eq!(pooled, vec![5.0, 6.0]);
    }

    #[test]
    fn test_mean_ignores_masked_tokens() {
        let pooled = pool(&HIDDEN, 3, 2, &[1, 1, 0], Pooling::Mean).unwrap();
        assert_eq!(pooled, vec![2.0, 3.0]);

        let pooled = pool(&HIDDEN, 3, 2, &[1, 1, 1], Pooling::Mean).unwrap();
        assert_eq!(pooled, vec![3.0, 4.0]);
    }

    #[test]
    fn test_short_hidden_state_is_an_inference_error() {
        let err = pool(&HIDDEN, 4, 2, &[1, 1, 1, 1], Pooling::Cls).unwrap_err();
        assert!(matches!(err, EmbeddingError::Inference(_)));
    }

    #[test]
    fn test_pooling_deserializes_snake_case() {
        let pooling: Pooling = serde_json::from_str("\"last_token\"").unwrap();
        assert_eq!(pooling, Pooling::LastToken);
    }
}
