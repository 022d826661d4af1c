mod common;

use common::SAMPLE_RESPONSE;
use cortex::error::MalformedResponseError;
use cortex::kernel::belief::FeatureVector;
use cortex::kernel::percept::{decode_percept, strip_fences, BrainRegion};

fn without(field: &str) -> String {
    let mut value: serde_json::Value = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
    value.as_object_mut().unwrap().remove(field);
    value.to_string()
}

#[test]
fn test_decode_plain_response() {
    let percept = decode_percept(SAMPLE_RESPONSE).expect("sample should decode");
    assert_eq!(percept.sensory, FeatureVector([0.8, 0.9, 0.1, 0.5]));
    assert_eq!(percept.predicted, FeatureVector([0.7, 0.9, 0.0, 0.6]));
    assert_eq!(percept.it.object_label, "Coffee Mug");
    assert_eq!(percept.motor.action, "Reach and Grasp");
    assert_eq!(percept.activations.level(BrainRegion::IT), 92);
    assert_eq!(percept.activations.level(BrainRegion::MOTOR), 45);
}

#[test]
fn test_decode_fenced_response() {
    let fenced = format!("```json\n{}\n```", SAMPLE_RESPONSE);
    let plain = decode_percept(SAMPLE_RESPONSE).unwrap();
    assert_eq!(decode_percept(&fenced).unwrap(), plain);

    let bare_fence = format!("```\n{}```  ", SAMPLE_RESPONSE);
    assert_eq!(decode_percept(&bare_fence).unwrap(), plain);
}

#[test]
fn test_strip_fences() {
    assert_eq!(strip_fences("  ```json{\"a\":1}```\n"), "{\"a\":1}");
    assert_eq!(strip_fences("{}"), "{}");
}

#[test]
fn test_missing_vectors_fall_back_to_neutral() {
    let percept = decode_percept(&without("sensoryVector")).unwrap();
    assert_eq!(percept.sensory, FeatureVector::NEUTRAL);
    assert_eq!(percept.predicted, FeatureVector([0.7, 0.9, 0.0, 0.6]));

    let percept = decode_percept(&without("predictionVector")).unwrap();
    assert_eq!(percept.predicted, FeatureVector::NEUTRAL);
}

#[test]
fn test_missing_mandatory_fields_fail() {
    for field in ["v1", "it", "pfc", "motor", "activations", "narrative"] {
        match decode_percept(&without(field)) {
            Err(MalformedResponseError::MissingField(name)) => assert_eq!(name, field),
            other => panic!("expected MissingField({}), got {:?}", field, other),
        }
    }
}

#[test]
fn test_missing_activation_entry_fails() {
    let mut value: serde_json::Value = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
    value["activations"].as_object_mut().unwrap().remove("pfc");
    match decode_percept(&value.to_string()) {
        Err(MalformedResponseError::MissingField(name)) => assert_eq!(name, "activations.pfc"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_empty_and_garbage_text() {
    assert!(matches!(
        decode_percept(""),
        Err(MalformedResponseError::MissingField(_))
    ));
    assert!(matches!(
        decode_percept("```json```"),
        Err(MalformedResponseError::MissingField(_))
    ));
    assert!(matches!(
        decode_percept("the model declined to answer"),
        Err(MalformedResponseError::Json(_))
    ));
}

#[test]
fn test_wrong_vector_length_fails() {
    let mut value: serde_json::Value = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
    value["sensoryVector"] = serde_json::json!([0.1, 0.2]);
    assert!(matches!(
        decode_percept(&value.to_string()),
        Err(MalformedResponseError::VectorLength { field: "sensoryVector", expected: 4, actual: 2 })
    ));
}

#[test]
fn test_activations_are_rounded_and_clamped() {
    let mut value: serde_json::Value = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
    value["activations"] = serde_json::json!({ "v1": 101.6, "it": -3, "pfc": 44.5, "motor": 12.2 });
    let percept = decode_percept(&value.to_string()).unwrap();
    assert_eq!(percept.activations.v1, 100);
    assert_eq!(percept.activations.it, 0);
    assert_eq!(percept.activations.pfc, 45);
    assert_eq!(percept.activations.motor, 12);
}
