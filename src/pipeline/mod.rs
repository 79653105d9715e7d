//! Cycle-level model of the ping-pong FFT core.

pub mod agu;
pub mod butterfly;
pub mod config;
pub mod delay;
pub mod engine;
pub mod memory;

pub use self::agu::{AguState, StageGeometry};
pub use self::butterfly::BFU_LATENCY;
pub use self::config::PipelineConfig;
pub use self::engine::{ControlInputs, CoreStatus, FftCore, RunStats};
pub use self::memory::{BankId, PortPriority};
