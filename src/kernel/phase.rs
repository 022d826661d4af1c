use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

/// Animation-pacing phases of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Idle,
    /// Retina -> V1. The inference call runs here.
    SensoryIntake,
    /// V1 -> IT.
    BottomUp,
    /// PFC -> IT/V1.
    TopDownPrediction,
    /// Prediction error is shown.
    CorticalComparison,
    /// Terminal display phase.
    MotorExecution,
}

impl Default for Phase {
    fn default() -> Self {
        Self::Idle
    }
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "IDLE",
            Phase::SensoryIntake => "SENSORY INTAKE",
            Phase::BottomUp => "BOTTOM UP",
            Phase::TopDownPrediction => "TOP DOWN PREDICTION",
            Phase::CorticalComparison => "CORTICAL COMPARISON",
            Phase::MotorExecution => "MOTOR EXECUTION",
        }
    }
}

/// Requests a transition. The graph decides whether it is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseRequest {
    Begin,
    Advance,
    Fail,
    Complete,
}

pub struct PhaseGraph;

impl PhaseGraph {
    /// Pure function: (current, request) -> next. `None` means the request is ignored.
    pub fn transition(current: Phase, request: PhaseRequest) -> Option<Phase> {
        use Phase::*;
        use PhaseRequest::*;

        match (current, request) {
            (Idle, Fail) => None,
            (_, Fail) => Some(Idle),

            (Idle, Begin) => Some(SensoryIntake),

            (SensoryIntake, Advance) => Some(BottomUp),
            (BottomUp, Advance) => Some(TopDownPrediction),
            (TopDownPrediction, Advance) => Some(CorticalComparison),
            (CorticalComparison, Advance) => Some(MotorExecution),

            (MotorExecution, Complete) => Some(Idle),

            _ => None,
        }
    }
}

/// Dwell times after entering each paced phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    #[serde(with = "millis")]
    pub bottom_up: Duration,
    #[serde(with = "millis")]
    pub top_down: Duration,
    #[serde(with = "millis")]
    pub comparison: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            bottom_up: Duration::from_millis(1000),
            top_down: Duration::from_millis(1200),
            comparison: Duration::from_millis(800),
        }
    }
}

impl Pacing {
    pub fn instant() -> Self {
        Self {
            bottom_up: Duration::ZERO,
            top_down: Duration::ZERO,
            comparison: Duration::ZERO,
        }
    }

    pub fn dwell(&self, phase: Phase) -> Duration {
        match phase {
            Phase::BottomUp => self.bottom_up,
            Phase::TopDownPrediction => self.top_down,
            Phase::CorticalComparison => self.comparison,
            _ => Duration::ZERO,
        }
    }

    pub fn total(&self) -> Duration {
        self.bottom_up + self.top_down + self.comparison
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseEvent {
    pub cycle_id: Uuid,
    pub from: Phase,
    pub to: Phase,
}

/// One live instance per cycle. Walks the graph and publishes every step.
pub struct PhaseSequencer {
    cycle_id: Uuid,
    phase: Phase,
    pacing: Pacing,
    events: broadcast::Sender<PhaseEvent>,
    history: Vec<PhaseEvent>,
}

impl PhaseSequencer {
    pub fn new(cycle_id: Uuid, pacing: Pacing, events: broadcast::Sender<PhaseEvent>) -> Self {
        Self {
            cycle_id,
            phase: Phase::Idle,
            pacing,
            events,
            history: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Every transition taken so far, oldest first.
    pub fn history(&self) -> &[PhaseEvent] {
        &self.history
    }

    /// Applies `request`; returns the new phase or `None` if the graph refused it.
    pub fn request(&mut self, request: PhaseRequest) -> Option<Phase> {
        let next = PhaseGraph::transition(self.phase, request)?;
        let event = PhaseEvent {
            cycle_id: self.cycle_id,
            from: self.phase,
            to: next,
        };
        self.phase = next;
        self.history.push(event);
        info!(cycle = %self.cycle_id, phase = next.label(), "phase");
        // No subscribers is fine.
        let _ = self.events.send(event);
        Some(next)
    }

    pub fn begin(&mut self) -> Option<Phase> {
        self.request(PhaseRequest::Begin)
    }

    pub fn fail(&mut self) -> Phase {
        self.request(PhaseRequest::Fail);
        self.phase
    }

    /// Takes the next paced step; returns how long to dwell there.
    /// `None` once MOTOR_EXECUTION has been reached.
    pub fn advance(&mut self) -> Option<Duration> {
        let next = self.request(PhaseRequest::Advance)?;
        Some(self.pacing.dwell(next))
    }

    /// Walks BOTTOM_UP -> TOP_DOWN_PREDICTION -> CORTICAL_COMPARISON -> MOTOR_EXECUTION.
    /// `on_step` sees every transition before its dwell starts.
    pub async fn pace(&mut self, mut on_step: impl FnMut(&PhaseSequencer)) {
        while let Some(dwell) = self.advance() {
            on_step(&*self);
            dwell_for(self.phase, dwell).await;
        }
    }

    pub fn complete(&mut self) -> Option<Phase> {
        self.request(PhaseRequest::Complete)
    }
}

async fn dwell_for(phase: Phase, dwell: Duration) {
    if !dwell.is_zero() {
        debug!(phase = phase.label(), ms = dwell.as_millis() as u64, "dwell");
        tokio::time::sleep(dwell).await;
    }
}
