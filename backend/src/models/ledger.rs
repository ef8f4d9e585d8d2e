//! Ledger model
//!
//! The economic state of one actor:
//! - Funds (i64 currency units)
//! - Inventory, one non-negative count per item kind
//! - Number of employees paid so far
//!
//! A `Ledger` is plain data. Actors keep theirs behind their own mutex and
//! only touch it while holding that lock, which is what makes every
//! capability call atomic. Nothing in this module blocks.
//!
//! CRITICAL: All money values are i64. Guarded paths never let funds go
//! negative: `debit` refuses instead.

use crate::models::catalog::{EmployeeRole, ItemKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during ledger operations
///
/// These are the "insufficient resource" outcomes. Routines treat them as a
/// normal negative result and skip, never as a failure.
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("Insufficient stock of {item}: required {required}, available {available}")]
    InsufficientStock {
        item: ItemKind,
        required: u32,
        available: u32,
    },
}

/// Funds, inventory and payroll counter of one actor
///
/// # Example
/// ```
/// use health_economy_core::{ItemKind, Ledger};
///
/// let mut ledger = Ledger::new(100);
/// ledger.add_stock(ItemKind::Pill, 3);
///
/// ledger.debit(40).unwrap();
/// assert_eq!(ledger.funds(), 60);
/// assert_eq!(ledger.take_stock(ItemKind::Pill, 5), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    /// Current funds
    funds: i64,

    /// Inventory. Kinds never stocked are simply absent (count 0).
    stock: BTreeMap<ItemKind, u32>,

    /// Employees paid since the start of the run
    employees_paid: u64,
}

impl Ledger {
    /// Create a ledger with opening funds and an empty inventory
    pub fn new(funds: i64) -> Self {
        Self {
            funds,
            stock: BTreeMap::new(),
            employees_paid: 0,
        }
    }

    pub fn funds(&self) -> i64 {
        self.funds
    }

    pub fn employees_paid(&self) -> u64 {
        self.employees_paid
    }

    /// Check whether `amount` can be debited without going negative
    pub fn can_pay(&self, amount: i64) -> bool {
        amount <= self.funds
    }

    /// Remove funds
    ///
    /// Fails, leaving funds untouched, when the amount is not covered.
    ///
    /// # Example
    /// ```
    /// use health_economy_core::{Ledger, LedgerError};
    ///
    /// let mut ledger = Ledger::new(10);
    /// assert_eq!(
    ///     ledger.debit(11),
    ///     Err(LedgerError::InsufficientFunds { required: 11, available: 10 })
    /// );
    /// assert_eq!(ledger.funds(), 10);
    /// ```
    pub fn debit(&mut self, amount: i64) -> Result<(), LedgerError> {
        if !self.can_pay(amount) {
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available: self.funds,
            });
        }
        self.funds -= amount;
        Ok(())
    }

    /// Add funds
    pub fn credit(&mut self, amount: i64) {
        self.funds += amount;
    }

    /// Overwrite funds (builders and scheduled income only)
    pub(crate) fn set_funds(&mut self, funds: i64) {
        self.funds = funds;
    }

    /// Pay one salary of `role`
    ///
    /// Debits the salary and counts one more employee paid. Money leaves the
    /// simulated economy here and is accounted for through
    /// [`Ledger::amount_paid_to_employees`].
    pub fn pay_employee(&mut self, role: EmployeeRole) -> Result<(), LedgerError> {
        self.debit(role.salary())?;
        self.employees_paid += 1;
        Ok(())
    }

    /// Pay up to `count` salaries of `role`, as many as funds cover
    ///
    /// Returns how many employees were actually paid.
    pub fn pay_employees_up_to(&mut self, role: EmployeeRole, count: u32) -> u32 {
        let salary = role.salary();
        let affordable = if salary > 0 {
            (self.funds.max(0) / salary).min(i64::from(count))
        } else {
            i64::from(count)
        };
        // affordable is within 0..=count, so it fits
        let paid = u32::try_from(affordable).unwrap_or(0);
        self.funds -= salary * i64::from(paid);
        self.employees_paid += u64::from(paid);
        paid
    }

    /// Total salary handed out, for a ledger whose staff all share `role`
    pub fn amount_paid_to_employees(&self, role: EmployeeRole) -> i64 {
        // employees_paid never exceeds what i64 funds could have paid for
        i64::try_from(self.employees_paid).unwrap_or(i64::MAX) * role.salary()
    }

    /// Current count of `item`
    pub fn stock(&self, item: ItemKind) -> u32 {
        self.stock.get(&item).copied().unwrap_or(0)
    }

    pub fn set_stock(&mut self, item: ItemKind, qty: u32) {
        self.stock.insert(item, qty);
    }

    pub fn add_stock(&mut self, item: ItemKind, qty: u32) {
        *self.stock.entry(item).or_insert(0) += qty;
    }

    /// Remove up to `qty` units of `item`, returning how many were removed
    pub fn take_stock(&mut self, item: ItemKind, qty: u32) -> u32 {
        let held = self.stock.entry(item).or_insert(0);
        let taken = qty.min(*held);
        *held -= taken;
        taken
    }

    /// Remove exactly `qty` units of `item`, or nothing at all
    pub fn consume(&mut self, item: ItemKind, qty: u32) -> Result<(), LedgerError> {
        let available = self.stock(item);
        if available < qty {
            return Err(LedgerError::InsufficientStock {
                item,
                required: qty,
                available,
            });
        }
        self.take_stock(item, qty);
        Ok(())
    }

}
