use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::kernel::phase::Phase;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TelemetryEvent {
    PhaseTransition {
        cycle_id: Uuid,
        from: Phase,
        to: Phase,
    },

    CycleCompleted {
        cycle_id: Uuid,
        prediction_error: f64,
        belief_update_delta: f64,
        firing_rate: i64,
    },

    CycleFailed {
        cycle_id: Uuid,
        /// Phase the cycle was in when it failed.
        phase: Phase,
        kind: String,
    },

    /// A trigger arrived while another cycle was in flight.
    CycleRejected,

    SpeechLifecycle(SpeechLifecycleEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeechLifecycleEvent {
    Requested,
    Generated,
    Failed,
}
