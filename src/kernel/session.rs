use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use super::belief::BeliefState;
use super::cycle::{compose_cycle, CycleResult};
use super::percept::decode_percept;
use super::phase::{Pacing, Phase, PhaseEvent, PhaseSequencer};
use super::telemetry::event::{SpeechLifecycleEvent, TelemetryEvent};
use super::telemetry::metrics::TelemetrySnapshot;
use super::telemetry::recorder::TelemetryRecorder;
use crate::audio::clip::SpeechClip;
use crate::error::{CycleError, SynthesisError};
use crate::services::llm::backend::InferenceBackend;
use crate::vision::input::ImageInput;

pub const LOG_CAPACITY: usize = 5;
pub const INITIAL_LOG_ENTRY: &str = "System Initialized. Awaiting sensory input.";
const PHASE_EVENT_CAPACITY: usize = 64;

/// Everything a session remembers between cycles.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub cycle_count: u64,
    pub alpha: f64,
    pub belief_state: BeliefState,
    pub phase: Phase,
    /// Newest first.
    pub simulation_log: VecDeque<String>,
    pub last_result: Option<CycleResult>,
}

impl SessionState {
    pub fn new(alpha: f64) -> Self {
        let mut simulation_log = VecDeque::with_capacity(LOG_CAPACITY);
        simulation_log.push_front(INITIAL_LOG_ENTRY.to_string());
        Self {
            cycle_count: 0,
            alpha,
            belief_state: BeliefState::uniform(),
            phase: Phase::Idle,
            simulation_log,
            last_result: None,
        }
    }

    /// Folds a completed cycle into the state.
    pub fn apply(&mut self, result: &CycleResult) {
        self.cycle_count += 1;
        self.belief_state = result.new_belief_state;
        let entry = format!(
            "Cycle {}: Error {:.2} → Belief Updated → Motor: {}",
            self.cycle_count, result.metrics.prediction_error, result.motor.action
        );
        self.simulation_log.push_front(entry);
        self.simulation_log.truncate(LOG_CAPACITY);
        self.last_result = Some(result.clone());
    }
}

/// Releases a busy flag on drop.
struct FlagGuard<'a>(&'a AtomicBool);

impl<'a> FlagGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| FlagGuard(flag))
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One simulated brain. Owns the belief state; cycles run strictly one at a time.
pub struct Session<B: InferenceBackend> {
    backend: Arc<B>,
    pacing: Pacing,
    state: Mutex<SessionState>,
    processing: AtomicBool,
    speaking: AtomicBool,
    phase_tx: broadcast::Sender<PhaseEvent>,
    telemetry: Mutex<TelemetryRecorder>,
}

impl<B: InferenceBackend> Session<B> {
    pub fn new(backend: Arc<B>, pacing: Pacing, alpha: f64) -> Self {
        let (phase_tx, _) = broadcast::channel(PHASE_EVENT_CAPACITY);
        Self {
            backend,
            pacing,
            state: Mutex::new(SessionState::new(alpha)),
            processing: AtomicBool::new(false),
            speaking: AtomicBool::new(false),
            phase_tx,
            telemetry: Mutex::new(TelemetryRecorder::new()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, event: TelemetryEvent) {
        self.telemetry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(event);
    }

    pub fn snapshot(&self) -> SessionState {
        self.state().clone()
    }

    pub fn belief_state(&self) -> BeliefState {
        self.state().belief_state
    }

    pub fn phase(&self) -> Phase {
        self.state().phase
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PhaseEvent> {
        self.phase_tx.subscribe()
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.telemetry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    /// Back to the initial state. Telemetry is kept.
    pub fn reset(&self) {
        let mut state = self.state();
        let alpha = state.alpha;
        *state = SessionState::new(alpha);
        info!("session reset");
    }

    /// Mirrors the sequencer's latest transition into state and telemetry.
    fn step(&self, sequencer: &PhaseSequencer) {
        if let Some(event) = sequencer.history().last() {
            self.record(TelemetryEvent::PhaseTransition {
                cycle_id: event.cycle_id,
                from: event.from,
                to: event.to,
            });
        }
        self.state().phase = sequencer.phase();
    }

    /// Runs one full cycle: inference, scoring, pacing, then belief update.
    ///
    /// Rejected with [`CycleError::Busy`] while another cycle is in flight.
    pub async fn run_cycle(&self, image: &ImageInput) -> Result<CycleResult, CycleError> {
        let _busy = match FlagGuard::acquire(&self.processing) {
            Some(guard) => guard,
            None => {
                warn!("cycle rejected: another cycle is in flight");
                self.record(TelemetryEvent::CycleRejected);
                return Err(CycleError::Busy);
            }
        };

        let cycle_id = Uuid::new_v4();
        let (prior, alpha) = {
            let state = self.state();
            (state.belief_state, state.alpha)
        };

        let mut sequencer = PhaseSequencer::new(cycle_id, self.pacing, self.phase_tx.clone());
        sequencer.begin();
        self.step(&sequencer);

        let outcome = async {
            let text = self.backend.perceive(image).await?;
            let percept = decode_percept(&text)?;
            Ok::<_, CycleError>(compose_cycle(cycle_id, percept, &prior, alpha))
        }
        .await;

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                let failed_in = sequencer.phase();
                sequencer.fail();
                self.step(&sequencer);
                warn!(cycle = %cycle_id, phase = failed_in.label(), "simulation failed: {}", e);
                self.record(TelemetryEvent::CycleFailed {
                    cycle_id,
                    phase: failed_in,
                    kind: e.kind().to_string(),
                });
                return Err(e);
            }
        };

        sequencer.pace(|seq| self.step(seq)).await;

        self.state().apply(&result);
        self.record(TelemetryEvent::CycleCompleted {
            cycle_id,
            prediction_error: result.metrics.prediction_error,
            belief_update_delta: result.metrics.belief_update_delta,
            firing_rate: result.conscious.firing_rate,
        });
        info!(
            cycle = %cycle_id,
            error = result.metrics.prediction_error,
            motor = %result.motor.action,
            "cycle complete"
        );

        sequencer.complete();
        self.step(&sequencer);

        Ok(result)
    }

    /// Synthesizes the last narrative.
    ///
    /// `Ok(None)` when there is nothing to say or a synthesis is already running.
    pub async fn speak(&self) -> Result<Option<SpeechClip>, SynthesisError> {
        let narrative = match &self.state().last_result {
            Some(result) if !result.conscious.narrative.trim().is_empty() => {
                result.conscious.narrative.clone()
            }
            _ => return Ok(None),
        };

        let _speaking = match FlagGuard::acquire(&self.speaking) {
            Some(guard) => guard,
            None => return Ok(None),
        };

        self.record(TelemetryEvent::SpeechLifecycle(SpeechLifecycleEvent::Requested));
        let clip = async {
            let audio = self.backend.synthesize(&narrative).await?;
            SpeechClip::from_base64(&audio)
        }
        .await;

        match clip {
            Ok(clip) => {
                self.record(TelemetryEvent::SpeechLifecycle(SpeechLifecycleEvent::Generated));
                Ok(Some(clip))
            }
            Err(e) => {
                warn!("speech synthesis failed: {}", e);
                self.record(TelemetryEvent::SpeechLifecycle(SpeechLifecycleEvent::Failed));
                Err(e)
            }
        }
    }
}
