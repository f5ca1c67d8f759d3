//! Vector math kernel shared by the hash and model backends.
//!
//! Reductions accumulate into a fixed number of lanes over
//! `chunks_exact`, so the loop vectorizes and the summation order only
//! depends on the vector length. The same input always yields the same
//! bits on a given build.

use crate::error::{EmbeddingError, Result};

/// Accumulator width. Eight `f64` lanes fill one AVX-512 register.
const LANES: usize = 8;

fn check_lengths(a: &[f32], b: &[f32]) -> Result<()> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(())
}

/// Lane-wise sum of `a[i] * b[i]`. Callers check lengths.
///
/// Products accumulate in `f64`, where the square of any finite `f32`
/// neither overflows nor underflows.
fn lane_dot(a: &[f32], b: &[f32]) -> f64 {
    let chunks_a = a.chunks_exact(LANES);
    let chunks_b = b.chunks_exact(LANES);
    let tail_a = chunks_a.remainder();
    let tail_b = chunks_b.remainder();

    let mut lanes = [0.0f64; LANES];
    for (xa, xb) in chunks_a.zip(chunks_b) {
        for lane in 0..LANES {
            lanes[lane] += f64::from(xa[lane]) * f64::from(xb[lane]);
        }
    }

    let mut tail = 0.0f64;
    for (&x, &y) in tail_a.iter().zip(tail_b) {
        tail += f64::from(x) * f64::from(y);
    }

    lanes.iter().sum::<f64>() + tail
}

fn magnitude(v: &[f32]) -> f64 {
    lane_dot(v, v).sqrt()
}

/// Compute the dot product between two vectors.
pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f32> {
    check_lengths(a, b)?;
    Ok(lane_dot(a, b) as f32)
}

/// Compute the L2 norm of a vector. The zero vector has norm 0.0.
pub fn norm(v: &[f32]) -> f32 {
    magnitude(v) as f32
}

/// Normalize a vector to unit length in place.
///
/// A zero vector is left unchanged.
pub fn normalize_in_place(v: &mut [f32]) {
    let magnitude = magnitude(v);
    if magnitude > 0.0 {
        for x in v.iter_mut() {
            *x = (f64::from(*x) / magnitude) as f32;
        }
    }
}

/// Return a unit-length copy of `v`, or the zero vector unchanged.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let mut out = v.to_vec();
    normalize_in_place(&mut out);
    out
}

/// Compute the cosine similarity between two vectors.
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 means identical direction
/// - 0.0 means orthogonal vectors, or either vector is zero
/// - -1.0 means opposite vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    check_lengths(a, b)?;

    let magnitude_a = magnitude(a);
    let magnitude_b = magnitude(b);

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Ok(0.0);
    }

    let cosine = lane_dot(a, b) / (magnitude_a * magnitude_b);
    Ok(cosine.clamp(-1.0, 1.0) as f32)
}

/// Elementwise sum of two vectors.
pub fn add(a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
    check_lengths(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| x + y).collect())
}
