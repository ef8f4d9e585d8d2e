//! Supplier actor
//!
//! Produces consumables and sells them to clinics.
//!
//! Each day a supplier picks one item of its catalog at random and, if it
//! can afford one supplier salary, produces one unit of it. Clinics buy
//! through [`Actor::buy`]; the returned bill is paid later through
//! [`Actor::pay`], never deducted automatically.
//!
//! Capabilities: `buy`, `pay`.

use crate::actors::{check_payment, lock, Actor, ActorError, DayContext, Role};
use crate::models::catalog::{EmployeeRole, ItemKind};
use crate::models::ledger::Ledger;
use crate::models::ActorId;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// The two kinds of supplier and what they produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplierKind {
    /// Scalpels, thermometers and stethoscopes
    MedicalDevices,
    /// Syringes and pills
    Pharmacy,
}

impl SupplierKind {
    pub fn catalog(self) -> &'static [ItemKind] {
        match self {
            SupplierKind::MedicalDevices => {
                &[ItemKind::Scalpel, ItemKind::Thermometer, ItemKind::Stethoscope]
            }
            SupplierKind::Pharmacy => &[ItemKind::Syringe, ItemKind::Pill],
        }
    }
}

/// A producer and seller of consumables
#[derive(Debug)]
pub struct Supplier {
    id: ActorId,
    catalog: Vec<ItemKind>,
    state: Mutex<Ledger>,
}

impl Supplier {
    pub fn catalog(&self) -> &[ItemKind] {
        &self.catalog
    }

    /// Current stock of `item`
    pub fn stock(&self, item: ItemKind) -> u32 {
        lock(&self.state).stock(item)
    }

    /// Try to produce one unit of a random catalog item
    ///
    /// Returns the produced item, or `None` if the catalog is empty or one
    /// supplier salary is not affordable today.
    pub fn produce(&self, rng: &mut RngManager) -> Option<ItemKind> {
        let item = *rng.choose(&self.catalog)?;
        let mut ledger = lock(&self.state);
        ledger.pay_employee(EmployeeRole::Supplier).ok()?;
        ledger.add_stock(item, 1);
        Some(item)
    }
}

impl Actor for Supplier {
    fn id(&self) -> ActorId {
        self.id
    }

    fn role(&self) -> Role {
        Role::Supplier
    }

    fn ledger(&self) -> Ledger {
        lock(&self.state).clone()
    }

    fn sells(&self, item: ItemKind) -> bool {
        self.catalog.contains(&item)
    }

    fn buy(&self, item: ItemKind, qty: u32) -> Result<i64, ActorError> {
        if !self.sells(item) {
            return Ok(0);
        }
        let sold = lock(&self.state).take_stock(item, qty);
        let bill = i64::from(sold) * item.unit_price();
        tracing::debug!(supplier = self.id, %item, requested = qty, sold, bill, "sale");
        Ok(bill)
    }

    fn pay(&self, amount: i64) -> Result<(), ActorError> {
        check_payment(amount)?;
        lock(&self.state).credit(amount);
        Ok(())
    }

    fn run_day(&self, ctx: &mut DayContext<'_>) -> Result<(), ActorError> {
        match self.produce(ctx.rng) {
            Some(item) => tracing::debug!(supplier = self.id, day = ctx.day, %item, "produced"),
            None => tracing::debug!(supplier = self.id, day = ctx.day, "production skipped"),
        }
        Ok(())
    }
}

/// Builder for [`Supplier`]
///
/// # Example
/// ```
/// use health_economy_core::{Actor, ItemKind, SupplierBuilder, SupplierKind};
///
/// let pharmacy = SupplierBuilder::of_kind(4, SupplierKind::Pharmacy)
///     .funds(200)
///     .stock(ItemKind::Pill, 10)
///     .build();
///
/// assert!(pharmacy.sells(ItemKind::Syringe));
/// assert_eq!(pharmacy.buy(ItemKind::Pill, 3).unwrap(), 3 * ItemKind::Pill.unit_price());
/// assert_eq!(pharmacy.stock(ItemKind::Pill), 7);
/// ```
#[derive(Debug, Clone)]
pub struct SupplierBuilder {
    id: ActorId,
    catalog: Vec<ItemKind>,
    ledger: Ledger,
}

impl SupplierBuilder {
    pub fn new(id: ActorId, catalog: impl Into<Vec<ItemKind>>) -> Self {
        let catalog = catalog.into();
        let mut ledger = Ledger::new(0);
        for item in &catalog {
            ledger.set_stock(*item, 0);
        }
        Self {
            id,
            catalog,
            ledger,
        }
    }

    pub fn of_kind(id: ActorId, kind: SupplierKind) -> Self {
        Self::new(id, kind.catalog())
    }

    pub fn funds(mut self, funds: i64) -> Self {
        self.ledger.set_funds(funds);
        self
    }

    pub fn stock(mut self, item: ItemKind, qty: u32) -> Self {
        self.ledger.set_stock(item, qty);
        self
    }

    pub fn build(self) -> Supplier {
        Supplier {
            id: self.id,
            catalog: self.catalog,
            state: Mutex::new(self.ledger),
        }
    }
}
