//! Cosine similarity between embedding vectors.

use crate::error::{Error, Result};

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal (unrelated)
/// - `-1.0` = opposite direction
///
/// Empty inputs or mismatched lengths are a precondition violation and
/// fail with [`Error::InvalidInput`]. A zero-norm vector yields exactly
/// `0.0` rather than dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.is_empty() || b.is_empty() {
        return Err(Error::InvalidInput(
            "embedding vectors must be non-empty".to_string(),
        ));
    }
    if a.len() != b.len() {
        return Err(Error::InvalidInput(format!(
            "embedding vectors must have the same length ({} vs {})",
            a.len(),
            b.len()
        )));
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return Ok(0.0);
    }

    Ok(dot / denom)
}
