//! Domain models for the healthcare economy

pub mod catalog;
pub mod ledger;

/// Stable identifier of an actor, equal to its index in the population
pub type ActorId = usize;

// Re-exports
pub use catalog::{EmployeeRole, ItemKind, ServiceKind};
pub use ledger::{Ledger, LedgerError};
