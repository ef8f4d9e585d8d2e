//! Settlement Module
//!
//! Pending bills and the first-eligible settlement pass shared by clinics
//! (bills owed to suppliers) and the insurer (bills owed to providers).
//!
//! # Critical Invariants
//!
//! 1. **All-or-nothing**: a bill is paid in full or not at all
//! 2. **Money Conservation**: every debited amount is credited to exactly one
//!    beneficiary by the caller
//! 3. **Insertion order**: bills are scanned oldest first, never reordered

pub mod bills;

// Re-export public API
pub use bills::{Bill, BillError, BillQueue, SettlementOutcome};
