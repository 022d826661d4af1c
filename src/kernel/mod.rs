pub mod belief;
pub mod cycle;
pub mod percept;
pub mod phase;
pub mod session;
pub mod telemetry;
pub mod vector;
