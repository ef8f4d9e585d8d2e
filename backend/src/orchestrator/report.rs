//! End-of-run report
//!
//! Captures every actor's final state after the workers have been joined,
//! plus the population-wide totals used to check the two conservation laws:
//!
//! - **Money**: Σ funds + Σ salaries paid = opening funds + contributions
//! - **Patients**: Σ (sick + rehab + freed) = opening sick pool

use crate::actors::{Actor, Directory, Role};
use crate::models::ActorId;
use crate::orchestrator::config::PopulationConfig;
use serde::Serialize;
use std::fmt;

/// Final state of one actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorSummary {
    pub id: ActorId,
    pub role: Role,
    pub funds: i64,
    /// Salaries paid over the whole run (count of employees paid)
    pub employees_paid: u64,
    /// Money handed out as salaries
    pub paid_to_employees: i64,
    /// Patients held (sick, rehab and freed)
    pub patients: u64,
}

impl ActorSummary {
    pub fn of(actor: &dyn Actor) -> Self {
        let ledger = actor.ledger();
        let role = actor.role();
        let paid_to_employees = role
            .staff()
            .map_or(0, |staff| ledger.amount_paid_to_employees(staff));
        Self {
            id: actor.id(),
            role,
            funds: ledger.funds(),
            employees_paid: ledger.employees_paid(),
            paid_to_employees,
            patients: actor.patients(),
        }
    }
}

/// Opening totals, recorded before the first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpeningTotals {
    pub funds: i64,
    pub patients: u64,
}

impl OpeningTotals {
    pub fn of(directory: &Directory) -> Self {
        Self {
            funds: directory.iter().map(|actor| actor.funds()).sum(),
            patients: directory.iter().map(|actor| actor.patients()).sum(),
        }
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalReport {
    pub config: PopulationConfig,
    /// Days actually simulated
    pub days: usize,
    pub actors: Vec<ActorSummary>,
    pub opening: OpeningTotals,
    /// Contributions the insurer received over the run
    pub contributions: i64,
    /// Bills the insurer still owes at the end
    pub pending_insurer_bills: usize,
    pub pending_insurer_total: i64,
}

impl FinalReport {
    /// Σ funds over all actors
    pub fn total_funds(&self) -> i64 {
        self.actors.iter().map(|actor| actor.funds).sum()
    }

    /// Σ salaries paid over all actors
    pub fn total_paid_to_employees(&self) -> i64 {
        self.actors.iter().map(|actor| actor.paid_to_employees).sum()
    }

    pub fn total_patients(&self) -> u64 {
        self.actors.iter().map(|actor| actor.patients).sum()
    }

    pub fn expected_funds(&self) -> i64 {
        self.opening.funds + self.contributions
    }

    pub fn observed_funds(&self) -> i64 {
        self.total_funds() + self.total_paid_to_employees()
    }

    pub fn funds_balanced(&self) -> bool {
        self.expected_funds() == self.observed_funds()
    }

    pub fn patients_balanced(&self) -> bool {
        self.opening.patients == self.total_patients()
    }

    pub fn actors_with_role(&self, role: Role) -> impl Iterator<Item = &ActorSummary> {
        self.actors.iter().filter(move |actor| actor.role == role)
    }
}

impl fmt::Display for FinalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulated {} day(s), seed {}", self.days, self.config.seed)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>4}  {:<10} {:>10} {:>10} {:>10}",
            "id", "role", "funds", "salaries", "patients"
        )?;
        for actor in &self.actors {
            writeln!(
                f,
                "{:>4}  {:<10} {:>10} {:>10} {:>10}",
                actor.id,
                actor.role.to_string(),
                actor.funds,
                actor.paid_to_employees,
                actor.patients
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "money:    expected {} observed {} ({})",
            self.expected_funds(),
            self.observed_funds(),
            if self.funds_balanced() { "balanced" } else { "UNBALANCED" }
        )?;
        writeln!(
            f,
            "patients: expected {} observed {} ({})",
            self.opening.patients,
            self.total_patients(),
            if self.patients_balanced() { "balanced" } else { "UNBALANCED" }
        )?;
        write!(
            f,
            "insurer:  {} pending bill(s) worth {}",
            self.pending_insurer_bills, self.pending_insurer_total
        )
    }
}
