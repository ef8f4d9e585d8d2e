//! Deterministic random number generation
//!
//! Every random choice an actor makes (destination hospital, batch size,
//! supplier, produced item) is drawn from that actor's own xorshift64*
//! generator. CRITICAL: no role routine may use any other source.

mod xorshift;

pub use xorshift::RngManager;
