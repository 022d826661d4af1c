use std::collections::VecDeque;

use super::event::{SpeechLifecycleEvent, TelemetryEvent};

#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub cycle_stats: CycleStats,
    pub phase_stats: PhaseStats,
    pub speech_stats: SpeechStats,
}

#[derive(Debug, Clone, Default)]
pub struct CycleStats {
    pub completed: u64,
    pub failed: u64,
    pub rejected: u64,
    pub avg_prediction_error: f64,
    pub max_prediction_error: f64,
    pub avg_belief_delta: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PhaseStats {
    pub transitions: u64,
    /// Transitions back to IDLE caused by a failure.
    pub resets: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SpeechStats {
    pub requested: u64,
    pub generated: u64,
    pub failed: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    let mut error_sum = 0.0;
    let mut delta_sum = 0.0;

    for event in events {
        match event {
            TelemetryEvent::PhaseTransition { .. } => {
                snap.phase_stats.transitions += 1;
            }
            TelemetryEvent::CycleCompleted {
                prediction_error,
                belief_update_delta,
                ..
            } => {
                snap.cycle_stats.completed += 1;
                error_sum += prediction_error;
                delta_sum += belief_update_delta;
                if *prediction_error > snap.cycle_stats.max_prediction_error {
                    snap.cycle_stats.max_prediction_error = *prediction_error;
                }
            }
            TelemetryEvent::CycleFailed { .. } => {
                snap.cycle_stats.failed += 1;
                snap.phase_stats.resets += 1;
            }
            TelemetryEvent::CycleRejected => snap.cycle_stats.rejected += 1,
            TelemetryEvent::SpeechLifecycle(kind) => match kind {
                SpeechLifecycleEvent::Requested => snap.speech_stats.requested += 1,
                SpeechLifecycleEvent::Generated => snap.speech_stats.generated += 1,
                SpeechLifecycleEvent::Failed => snap.speech_stats.failed += 1,
            },
        }
    }

    if snap.cycle_stats.completed > 0 {
        let n = snap.cycle_stats.completed as f64;
        snap.cycle_stats.avg_prediction_error = error_sum / n;
        snap.cycle_stats.avg_belief_delta = delta_sum / n;
    }

    snap
}
