pub mod audio;
pub mod config;
pub mod error;
pub mod kernel;
pub mod services;
pub mod vision;

pub use kernel::cycle::CycleResult;
pub use kernel::session::Session;
