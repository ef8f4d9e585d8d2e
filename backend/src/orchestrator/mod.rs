//! Orchestrator - population construction and the day loop
//!
//! See `engine.rs` for the runner, `config.rs` for starting conditions and
//! `report.rs` for the end-of-run summary.

pub mod config;
pub mod engine;
pub mod report;

// Re-export main types for convenience
pub use config::{ConfigError, PopulationConfig};
pub use engine::{clinics_of_hospital, Population, SimulationError};
pub use report::{ActorSummary, FinalReport, OpeningTotals};
