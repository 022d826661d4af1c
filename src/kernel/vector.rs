use crate::error::VectorError;

fn check_len(a: &[f64], b: &[f64]) -> Result<(), VectorError> {
    if a.len() != b.len() {
        return Err(VectorError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}

/// Euclidean norm.
pub fn magnitude(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

pub fn dot(a: &[f64], b: &[f64]) -> Result<f64, VectorError> {
    check_len(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Cosine of the angle between `a` and `b`.
///
/// A zero-magnitude operand yields `0.0` rather than NaN.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64, VectorError> {
    let d = dot(a, b)?;
    let mag_a = magnitude(a);
    let mag_b = magnitude(b);
    if mag_a == 0.0 || mag_b == 0.0 {
        return Ok(0.0);
    }
    // Rounding can push |cos| a hair past 1.0 for parallel vectors.
    Ok((d / (mag_a * mag_b)).clamp(-1.0, 1.0))
}

/// `prior_weight * prior[i] + (1 - prior_weight) * evidence[i]`.
pub fn blend(prior: &[f64], evidence: &[f64], prior_weight: f64) -> Result<Vec<f64>, VectorError> {
    check_len(prior, evidence)?;
    Ok(prior
        .iter()
        .zip(evidence)
        .map(|(p, e)| p * prior_weight + e * (1.0 - prior_weight))
        .collect())
}

/// Magnitude of the per-component difference.
pub fn distance(a: &[f64], b: &[f64]) -> Result<f64, VectorError> {
    check_len(a, b)?;
    Ok(a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt())
}
