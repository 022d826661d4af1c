use cortex::error::MalformedResponseError;
use cortex::kernel::belief::{BeliefState, FeatureVector, FEATURE_DIM};

#[test]
fn test_uniform_prior() {
    let belief = BeliefState::uniform();
    assert_eq!(belief.as_slice(), &[0.5; FEATURE_DIM]);
    assert_eq!(BeliefState::default(), belief);
}

#[test]
fn test_belief_update_fixed_blend() {
    let belief = BeliefState::uniform();
    let sensory = FeatureVector([0.8, 0.9, 0.1, 0.5]);

    let next = belief.update(&sensory);
    let expected = [0.59, 0.62, 0.38, 0.5];
    for (got, want) in next.as_slice().iter().zip(expected) {
        assert!((got - want).abs() < 1e-9, "got {} want {}", got, want);
    }

    // |0.3 * (sensory - 0.5)|
    let expected_delta = 0.3 * (0.09f64 + 0.16 + 0.16).sqrt();
    assert!((belief.delta(&next) - expected_delta).abs() < 1e-9);
}

#[test]
fn test_belief_converges_toward_constant_input() {
    let sensory = FeatureVector([1.0, 0.0, 1.0, 0.0]);
    let mut belief = BeliefState::uniform();
    let mut last_delta = f64::MAX;
    for _ in 0..20 {
        let next = belief.update(&sensory);
        let delta = belief.delta(&next);
        assert!(delta < last_delta, "steps must shrink");
        last_delta = delta;
        belief = next;
    }
    assert!((belief.as_slice()[0] - 1.0).abs() < 0.01);
    assert!(belief.as_slice()[1] < 0.01);
}

#[test]
fn test_feature_vector_validation() {
    let err = FeatureVector::from_components("sensoryVector", &[0.1, 0.2, 0.3]).unwrap_err();
    assert!(matches!(
        err,
        MalformedResponseError::VectorLength { field: "sensoryVector", expected: 4, actual: 3 }
    ));

    let err = FeatureVector::from_components("sensoryVector", &[0.1, f64::NAN, 0.3, 0.4]).unwrap_err();
    assert!(matches!(err, MalformedResponseError::NonFinite { .. }));

    let clamped = FeatureVector::from_components("predictionVector", &[1.4, -0.2, 0.5, 1.0]).unwrap();
    assert_eq!(clamped, FeatureVector([1.0, 0.0, 0.5, 1.0]));
}
