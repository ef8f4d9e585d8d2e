//! Scheduling primitives: the day barrier

pub mod clock;
