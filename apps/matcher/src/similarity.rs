use crate::error::MatchError;

fn same_len(a: &[f32], b: &[f32]) -> Result<(), MatchError> {
    if a.len() == b.len() {
        Ok(())
    } else {
        Err(MatchError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        })
    }
}

/// Dot product. Equals cosine similarity when both vectors are L2-normalised.
pub fn dot(a: &[f32], b: &[f32]) -> Result<f32, MatchError> {
    same_len(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Cosine similarity in `[-1, 1]`; 0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, MatchError> {
    same_len(a, b)?;
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    Ok(if denom == 0.0 { 0.0 } else { dot / denom })
}

/// Scales a vector to unit length in place. Zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}
