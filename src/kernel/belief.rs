use serde::{Deserialize, Serialize};
use tracing::warn;

use super::vector;
use crate::error::MalformedResponseError;

/// Number of feature axes: Complexity, Brightness, Motion, Familiarity.
pub const FEATURE_DIM: usize = 4;

/// Share of the prior kept on every update. Fixed; `alpha` does not feed it.
pub const BELIEF_RETENTION: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_DIM]);

impl FeatureVector {
    pub const NEUTRAL: FeatureVector = FeatureVector([0.5; FEATURE_DIM]);

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Checks length and finiteness; out-of-range components are clamped into [0, 1].
    pub fn from_components(
        field: &'static str,
        values: &[f64],
    ) -> Result<Self, MalformedResponseError> {
        if values.len() != FEATURE_DIM {
            return Err(MalformedResponseError::VectorLength {
                field,
                expected: FEATURE_DIM,
                actual: values.len(),
            });
        }
        let mut out = [0.0; FEATURE_DIM];
        for (slot, &v) in out.iter_mut().zip(values) {
            if !v.is_finite() {
                return Err(MalformedResponseError::NonFinite { field });
            }
            if !(0.0..=1.0).contains(&v) {
                warn!(field, value = v, "feature component out of range, clamping");
            }
            *slot = v.clamp(0.0, 1.0);
        }
        Ok(FeatureVector(out))
    }
}

/// Persistent prior carried between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeliefState(pub FeatureVector);

impl Default for BeliefState {
    fn default() -> Self {
        Self::uniform()
    }
}

impl BeliefState {
    pub fn uniform() -> Self {
        BeliefState(FeatureVector::NEUTRAL)
    }

    pub fn as_slice(&self) -> &[f64] {
        self.0.as_slice()
    }

    /// Exponential smoothing toward the new evidence: `0.7 * prior + 0.3 * sensory`.
    pub fn update(&self, sensory: &FeatureVector) -> BeliefState {
        let mut next = [0.0; FEATURE_DIM];
        for (i, slot) in next.iter_mut().enumerate() {
            *slot = BELIEF_RETENTION * self.0 .0[i] + (1.0 - BELIEF_RETENTION) * sensory.0[i];
        }
        BeliefState(FeatureVector(next))
    }

    /// Size of the step from `self` to `next`.
    pub fn delta(&self, next: &BeliefState) -> f64 {
        // Both sides are FEATURE_DIM long, so the length check cannot fail.
        vector::distance(self.as_slice(), next.as_slice()).unwrap_or(0.0)
    }
}
