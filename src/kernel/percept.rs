//! Strict decoding of the perception reply.
//!
//! The service is asked for one JSON document. Only the two feature vectors
//! may be absent (they fall back to the neutral vector); every other field is
//! mandatory and a missing one fails the whole cycle.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::belief::FeatureVector;
use crate::error::MalformedResponseError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V1Features {
    pub edges: String,
    pub contrast: f64,
    pub motion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecognition {
    pub object_label: String,
    pub category: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefrontalPrediction {
    pub prediction: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotorAction {
    pub action: String,
    pub target: String,
    pub confidence: f64,
    pub reasoning: String,
}

/// Region activation levels, integer percentages 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activations {
    pub v1: u8,
    pub it: u8,
    pub pfc: u8,
    pub motor: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[allow(clippy::upper_case_acronyms)]
pub enum BrainRegion {
    V1,
    IT,
    PFC,
    MOTOR,
}

impl Activations {
    pub fn level(&self, region: BrainRegion) -> u8 {
        match region {
            BrainRegion::V1 => self.v1,
            BrainRegion::IT => self.it,
            BrainRegion::PFC => self.pfc,
            BrainRegion::MOTOR => self.motor,
        }
    }
}

/// Wire shape. Everything optional so we can name the missing field ourselves.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPercept {
    sensory_vector: Option<Vec<f64>>,
    prediction_vector: Option<Vec<f64>>,
    v1: Option<V1Features>,
    it: Option<ObjectRecognition>,
    pfc: Option<PrefrontalPrediction>,
    motor: Option<MotorAction>,
    activations: Option<RawActivations>,
    narrative: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawActivations {
    v1: Option<f64>,
    it: Option<f64>,
    pfc: Option<f64>,
    motor: Option<f64>,
}

/// A validated perception reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Percept {
    pub sensory: FeatureVector,
    pub predicted: FeatureVector,
    pub v1: V1Features,
    pub it: ObjectRecognition,
    pub pfc: PrefrontalPrediction,
    pub motor: MotorAction,
    pub activations: Activations,
    pub narrative: String,
}

/// Removes every ```` ```json ```` / ```` ``` ```` marker and surrounding whitespace.
pub fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, MalformedResponseError> {
    value.ok_or(MalformedResponseError::MissingField(field))
}

fn feature_or_neutral(
    raw: Option<Vec<f64>>,
    field: &'static str,
) -> Result<FeatureVector, MalformedResponseError> {
    match raw {
        Some(values) => FeatureVector::from_components(field, &values),
        None => {
            warn!(field, "vector missing from response, using neutral vector");
            Ok(FeatureVector::NEUTRAL)
        }
    }
}

fn percentage(value: Option<f64>, field: &'static str) -> Result<u8, MalformedResponseError> {
    let v = required(value, field)?;
    if !v.is_finite() {
        return Err(MalformedResponseError::NonFinite { field });
    }
    Ok(v.round().clamp(0.0, 100.0) as u8)
}

pub fn decode_percept(text: &str) -> Result<Percept, MalformedResponseError> {
    let cleaned = strip_fences(text);
    let body = if cleaned.is_empty() { "{}" } else { cleaned.as_str() };
    let raw: RawPercept = serde_json::from_str(body)?;

    let activations = required(raw.activations, "activations")?;
    let activations = Activations {
        v1: percentage(activations.v1, "activations.v1")?,
        it: percentage(activations.it, "activations.it")?,
        pfc: percentage(activations.pfc, "activations.pfc")?,
        motor: percentage(activations.motor, "activations.motor")?,
    };

    Ok(Percept {
        sensory: feature_or_neutral(raw.sensory_vector, "sensoryVector")?,
        predicted: feature_or_neutral(raw.prediction_vector, "predictionVector")?,
        v1: required(raw.v1, "v1")?,
        it: required(raw.it, "it")?,
        pfc: required(raw.pfc, "pfc")?,
        motor: required(raw.motor, "motor")?,
        activations,
        narrative: required(raw.narrative, "narrative")?,
    })
}
