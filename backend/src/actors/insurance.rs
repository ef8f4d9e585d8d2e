//! Insurance actor
//!
//! The single payer of the economy. Providers invoice it for the services
//! they render; each day it receives the insured population's contribution
//! and settles every pending bill its funds cover.
//!
//! Capabilities: `invoice`. The insurer cannot be paid through `pay`:
//! contributions are its only income.

use crate::actors::{deliver_payments, lock, Actor, ActorError, DayContext, Role};
use crate::models::ledger::Ledger;
use crate::models::ActorId;
use crate::settlement::{Bill, BillQueue};
use std::sync::Mutex;

/// Contribution received at the start of every day
pub const DAILY_CONTRIBUTION: i64 = 1;

#[derive(Debug)]
struct InsuranceState {
    ledger: Ledger,
    bills: BillQueue,
}

#[derive(Debug)]
pub struct Insurance {
    id: ActorId,
    daily_contribution: i64,
    state: Mutex<InsuranceState>,
}

impl Insurance {
    pub fn pending_bills(&self) -> usize {
        lock(&self.state).bills.len()
    }

    pub fn pending_bills_total(&self) -> i64 {
        lock(&self.state).bills.total()
    }

    /// Snapshot of the bill queue, oldest first
    pub fn bills(&self) -> Vec<Bill> {
        lock(&self.state).bills.iter().copied().collect()
    }

    /// Daily contribution credited by [`Insurance::receive_contributions`]
    pub fn daily_contribution(&self) -> i64 {
        self.daily_contribution
    }

    pub fn receive_contributions(&self) {
        lock(&self.state).ledger.credit(self.daily_contribution);
    }

    /// Pay every pending bill current funds cover, oldest first
    ///
    /// Returns the amount delivered to providers.
    pub fn pay_bills(&self, ctx: &mut DayContext<'_>) -> Result<i64, ActorError> {
        let outcome = {
            let mut state = lock(&self.state);
            let InsuranceState { ledger, bills } = &mut *state;
            bills.settle_from(ledger)
        };
        let remaining = outcome.remaining;
        if outcome.settled.is_empty() {
            return Ok(0);
        }

        match deliver_payments(ctx.directory, self.id, outcome.settled) {
            Ok(delivered) => {
                tracing::debug!(insurer = self.id, delivered, remaining, "bills settled");
                Ok(delivered)
            }
            Err(undelivered) => {
                let mut state = lock(&self.state);
                state.ledger.credit(undelivered.total());
                state.bills.restore_front(undelivered.bills);
                Err(undelivered.error)
            }
        }
    }
}

impl Actor for Insurance {
    fn id(&self) -> ActorId {
        self.id
    }

    fn role(&self) -> Role {
        Role::Insurance
    }

    fn ledger(&self) -> Ledger {
        lock(&self.state).ledger.clone()
    }

    fn invoice(&self, amount: i64, beneficiary: ActorId) -> Result<(), ActorError> {
        lock(&self.state).bills.push(beneficiary, amount)?;
        tracing::debug!(insurer = self.id, beneficiary, amount, "invoice received");
        Ok(())
    }

    fn run_day(&self, ctx: &mut DayContext<'_>) -> Result<(), ActorError> {
        self.receive_contributions();
        self.pay_bills(ctx)?;
        Ok(())
    }
}

/// Builder for [`Insurance`]
///
/// # Example
/// ```
/// use health_economy_core::{Actor, InsuranceBuilder};
///
/// let insurer = InsuranceBuilder::new(9).funds(1_000).build();
/// insurer.invoice(40, 3).unwrap();
///
/// assert_eq!(insurer.pending_bills(), 1);
/// assert!(insurer.invoice(0, 3).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct InsuranceBuilder {
    id: ActorId,
    daily_contribution: i64,
    ledger: Ledger,
}

impl InsuranceBuilder {
    pub fn new(id: ActorId) -> Self {
        Self {
            id,
            daily_contribution: DAILY_CONTRIBUTION,
            ledger: Ledger::new(0),
        }
    }

    pub fn funds(mut self, funds: i64) -> Self {
        self.ledger.set_funds(funds);
        self
    }

    pub fn daily_contribution(mut self, amount: i64) -> Self {
        self.daily_contribution = amount;
        self
    }

    pub fn build(self) -> Insurance {
        Insurance {
            id: self.id,
            daily_contribution: self.daily_contribution,
            state: Mutex::new(InsuranceState {
                ledger: self.ledger,
                bills: BillQueue::new(),
            }),
        }
    }
}
