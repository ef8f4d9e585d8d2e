//! Pending bills and their settlement
//!
//! A bill is an obligation the owning actor must pay to a beneficiary. Bills
//! are queued in arrival order and settled by a single pass over the queue:
//!
//! ```text
//! for each bill, oldest first:
//!     funds cover amount?  → debit payer, hand bill to caller for payment
//!     otherwise            → keep it queued for a later day
//! ```
//!
//! # Critical Invariants
//!
//! - **No partial payment**: a bill is either paid in full or left untouched
//! - **First eligible wins**: the pass never reorders bills by age or size;
//!   a large unpayable bill does not block smaller ones behind it
//! - **Positive amounts**: zero or negative bills are rejected at insertion
//!
//! Settlement only debits the payer's ledger. Crediting the beneficiary is
//! done by the caller through the beneficiary's `pay` capability, after the
//! payer's lock has been released.

use crate::models::ledger::Ledger;
use crate::models::ActorId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// Errors raised when recording a bill
#[derive(Debug, Error, PartialEq)]
pub enum BillError {
    #[error("Bill amount must be positive, got {amount}")]
    NonPositive { amount: i64 },
}

/// A recorded, not yet paid obligation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    /// Actor owed the money
    pub beneficiary: ActorId,
    /// Amount owed (always > 0)
    pub amount: i64,
}

/// Result of one settlement pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettlementOutcome {
    /// Bills whose amount has been debited from the payer, in queue order.
    /// The caller still has to credit each beneficiary.
    pub settled: Vec<Bill>,
    /// Number of bills left in the queue
    pub remaining: usize,
}

impl SettlementOutcome {
    pub fn settled_value(&self) -> i64 {
        self.settled.iter().map(|bill| bill.amount).sum()
    }
}

/// Ordered queue of pending bills owned by one actor
///
/// # Example
/// ```
/// use health_economy_core::{BillQueue, Ledger};
///
/// let mut bills = BillQueue::new();
/// bills.push(7, 300).unwrap();
/// bills.push(8, 50).unwrap();
///
/// let mut payer = Ledger::new(100);
/// let outcome = bills.settle_from(&mut payer);
///
/// // The 300 bill stays queued, the 50 bill behind it is paid
/// assert_eq!(outcome.settled.len(), 1);
/// assert_eq!(outcome.settled[0].beneficiary, 8);
/// assert_eq!(payer.funds(), 50);
/// assert_eq!(bills.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillQueue {
    bills: VecDeque<Bill>,
}

impl BillQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bill at the back of the queue
    pub fn push(&mut self, beneficiary: ActorId, amount: i64) -> Result<(), BillError> {
        if amount <= 0 {
            return Err(BillError::NonPositive { amount });
        }
        self.bills.push_back(Bill {
            beneficiary,
            amount,
        });
        Ok(())
    }

    /// Put bills back at the front, keeping their relative order
    ///
    /// Used when a payment could not be delivered and must be retried.
    pub fn restore_front(&mut self, bills: Vec<Bill>) {
        for bill in bills.into_iter().rev() {
            self.bills.push_front(bill);
        }
    }

    pub fn len(&self) -> usize {
        self.bills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bills.is_empty()
    }

    /// Sum of all pending amounts
    pub fn total(&self) -> i64 {
        self.bills.iter().map(|bill| bill.amount).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bill> {
        self.bills.iter()
    }

    /// Settle every bill the payer can currently cover, oldest first
    ///
    /// Each settled bill is debited from `payer` and removed from the queue.
    /// Bills that cannot be covered keep their position.
    pub fn settle_from(&mut self, payer: &mut Ledger) -> SettlementOutcome {
        let mut settled = Vec::new();
        let mut still_pending = VecDeque::with_capacity(self.bills.len());

        for bill in self.bills.drain(..) {
            if payer.debit(bill.amount).is_ok() {
                settled.push(bill);
            } else {
                still_pending.push_back(bill);
            }
        }

        self.bills = still_pending;
        SettlementOutcome {
            settled,
            remaining: self.bills.len(),
        }
    }
}
