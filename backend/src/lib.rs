//! Health Economy Simulator Core
//!
//! Multi-threaded simulation of a small healthcare economy: ambulances bring
//! sick patients to hospitals, hospitals forward them to clinics, clinics
//! treat them with consumables bought from suppliers and send them back to
//! hospitals for rehabilitation, and a single insurer pays for every service.
//!
//! # Architecture
//!
//! - **core**: Day barrier
//! - **models**: Domain types (catalog, per-actor ledger)
//! - **settlement**: Pending bills and first-eligible settlement
//! - **actors**: Capability protocol and the five roles
//! - **orchestrator**: Population construction, worker threads, report
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All money values are i64
//! 2. All randomness is deterministic (one seeded RNG per actor)
//! 3. Money and patients are conserved across a whole run
//! 4. No thread ever holds two actor locks at once

// Module declarations
pub mod actors;
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod settlement;

// Re-exports for convenience
pub use actors::{
    Actor, ActorError, Ambulance, AmbulanceBuilder, Capability, CapabilitySet, Clinic,
    ClinicBuilder, ClinicSpecialty, DayContext, Directory, Hospital, HospitalBuilder, Insurance,
    InsuranceBuilder, Role, Supplier, SupplierBuilder, SupplierKind,
};
pub use core::clock::DayClock;
pub use models::{ActorId, EmployeeRole, ItemKind, Ledger, LedgerError, ServiceKind};
pub use orchestrator::{
    ActorSummary, ConfigError, FinalReport, Population, PopulationConfig, SimulationError,
};
pub use rng::RngManager;
pub use settlement::{Bill, BillError, BillQueue, SettlementOutcome};
