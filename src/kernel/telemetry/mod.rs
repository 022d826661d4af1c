//! Cycle telemetry.
//!
//! # INVARIANT
//! Telemetry is a read-only side channel. Session logic never reads it back
//! to make a decision.
//!
//! # PRIVACY
//! Events carry no image bytes and no narrative text. Only ids, phases,
//! scalar metrics and failure kinds.

pub mod event;
pub mod metrics;
pub mod recorder;
