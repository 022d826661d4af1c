use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::belief::{BeliefState, FeatureVector};
use super::percept::{
    Activations, MotorAction, ObjectRecognition, Percept, PrefrontalPrediction, V1Features,
};
use super::vector;

/// Resting firing rate in Hz before activation and surprise are added.
pub const BASE_FIRING_RATE: f64 = 10.0;
pub const ACTIVATION_GAIN: f64 = 0.5;
pub const SURPRISE_GAIN: f64 = 120.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BottomUp {
    pub v1: V1Features,
    pub it: ObjectRecognition,
    pub feature_vector: FeatureVector,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopDown {
    pub pfc: PrefrontalPrediction,
    pub predicted_vector: FeatureVector,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsciousPercept {
    pub narrative: String,
    pub surprise_factor: f64,
    pub firing_rate: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleMetrics {
    pub prediction_error: f64,
    pub cosine_similarity: f64,
    pub belief_update_delta: f64,
}

/// Immutable snapshot of one completed cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleResult {
    pub cycle_id: Uuid,
    pub bottom_up: BottomUp,
    pub top_down: TopDown,
    pub motor: MotorAction,
    pub activations: Activations,
    pub conscious: ConsciousPercept,
    pub metrics: CycleMetrics,
    pub new_belief_state: BeliefState,
    /// Passed through untouched; the belief blend does not read it.
    pub alpha_requested: f64,
}

/// `1 - cos(sensory, predicted)`.
pub fn prediction_error(sensory: &FeatureVector, predicted: &FeatureVector) -> (f64, f64) {
    let similarity = vector::cosine_similarity(sensory.as_slice(), predicted.as_slice())
        .unwrap_or(0.0);
    (1.0 - similarity, similarity)
}

/// Cosmetic display metric; nothing branches on it.
pub fn firing_rate(activations: &Activations, prediction_error: f64) -> i64 {
    let avg = (activations.v1 as f64 + activations.it as f64 + activations.pfc as f64) / 3.0;
    (BASE_FIRING_RATE + ACTIVATION_GAIN * avg + SURPRISE_GAIN * prediction_error).round() as i64
}

/// Pure composition of a decoded percept with the current prior.
pub fn compose_cycle(
    cycle_id: Uuid,
    percept: Percept,
    prior: &BeliefState,
    alpha: f64,
) -> CycleResult {
    let (error, similarity) = prediction_error(&percept.sensory, &percept.predicted);
    let new_belief_state = prior.update(&percept.sensory);
    let belief_update_delta = prior.delta(&new_belief_state);
    let firing_rate = firing_rate(&percept.activations, error);

    CycleResult {
        cycle_id,
        bottom_up: BottomUp {
            v1: percept.v1,
            it: percept.it,
            feature_vector: percept.sensory,
        },
        top_down: TopDown {
            pfc: percept.pfc,
            predicted_vector: percept.predicted,
        },
        motor: percept.motor,
        activations: percept.activations,
        conscious: ConsciousPercept {
            narrative: percept.narrative,
            surprise_factor: error,
            firing_rate,
        },
        metrics: CycleMetrics {
            prediction_error: error,
            cosine_similarity: similarity,
            belief_update_delta,
        },
        new_belief_state,
        alpha_requested: alpha,
    }
}
