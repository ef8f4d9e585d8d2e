//! Clinic actor
//!
//! Treats sick patients sent by hospitals, one per day, and sends them back
//! to a hospital for rehabilitation.
//!
//! # Daily routine
//!
//! 1. `pay_bills`: settle the supplier bills current funds cover
//! 2. `order_resources`: buy one unit of every out-of-stock resource
//! 3. `treat_one`: treat one queued sick patient if resources, funds and a
//!    patient are all available
//! 4. `send_patients_to_rehab`: offer every treated patient to a hospital and
//!    invoice the insurer a treatment per admitted patient
//!
//! A clinic with unpaid supplier bills, or without funds, refuses new sick
//! patients. It has no bed limit otherwise.
//!
//! Capabilities: `transfer` (sick patients), `pay`.

use crate::actors::{
    check_payment, deliver_payments, lock, Actor, ActorError, DayContext, Role,
};
use crate::models::catalog::{EmployeeRole, ItemKind, ServiceKind};
use crate::models::ledger::Ledger;
use crate::models::ActorId;
use crate::settlement::BillQueue;
use serde::{Deserialize, Serialize};
use std::iter;
use std::sync::Mutex;

/// Clinic specialty and the resources one treatment consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClinicSpecialty {
    Pulmonology,
    Cardiology,
    Neurology,
}

impl ClinicSpecialty {
    pub const ALL: [ClinicSpecialty; 3] = [
        ClinicSpecialty::Pulmonology,
        ClinicSpecialty::Cardiology,
        ClinicSpecialty::Neurology,
    ];

    pub fn resources(self) -> &'static [ItemKind] {
        match self {
            ClinicSpecialty::Pulmonology => &[ItemKind::Pill, ItemKind::Thermometer],
            ClinicSpecialty::Cardiology => &[ItemKind::Syringe, ItemKind::Stethoscope],
            ClinicSpecialty::Neurology => &[ItemKind::Pill, ItemKind::Scalpel],
        }
    }
}

#[derive(Debug)]
struct ClinicState {
    ledger: Ledger,
    /// Unpaid supplier bills
    bills: BillQueue,
}

#[derive(Debug)]
pub struct Clinic {
    id: ActorId,
    resources: Vec<ItemKind>,
    hospitals: Vec<ActorId>,
    suppliers: Vec<ActorId>,
    insurer: Option<ActorId>,
    state: Mutex<ClinicState>,
}

impl Clinic {
    /// Resources one treatment consumes
    pub fn resources(&self) -> &[ItemKind] {
        &self.resources
    }

    pub fn stock(&self, item: ItemKind) -> u32 {
        lock(&self.state).ledger.stock(item)
    }

    pub fn sick_patients(&self) -> u32 {
        self.stock(ItemKind::SickPatient)
    }

    pub fn rehab_patients(&self) -> u32 {
        self.stock(ItemKind::RehabPatient)
    }

    /// Number of unpaid supplier bills
    pub fn pending_bills(&self) -> usize {
        lock(&self.state).bills.len()
    }

    /// Total value of unpaid supplier bills
    pub fn pending_bills_total(&self) -> i64 {
        lock(&self.state).bills.total()
    }

    /// Settle the supplier bills current funds cover
    ///
    /// Returns the amount delivered to suppliers. If a supplier cannot be
    /// paid, the undelivered bills go back to the front of the queue and
    /// their amount back into funds.
    pub fn pay_bills(&self, ctx: &mut DayContext<'_>) -> Result<i64, ActorError> {
        let outcome = {
            let mut state = lock(&self.state);
            let ClinicState { ledger, bills } = &mut *state;
            bills.settle_from(ledger)
        };
        if outcome.settled.is_empty() {
            return Ok(0);
        }

        match deliver_payments(ctx.directory, self.id, outcome.settled) {
            Ok(delivered) => Ok(delivered),
            Err(undelivered) => {
                let mut state = lock(&self.state);
                state.ledger.credit(undelivered.total());
                state.bills.restore_front(undelivered.bills);
                Err(undelivered.error)
            }
        }
    }

    /// Buy one unit of every resource that is out of stock
    ///
    /// The supplier is picked uniformly among those selling the resource.
    /// Returns how many units were bought.
    pub fn order_resources(&self, ctx: &mut DayContext<'_>) -> Result<u32, ActorError> {
        let mut bought = 0;
        for &item in &self.resources {
            if self.stock(item) > 0 {
                continue;
            }
            let mut sellers = Vec::with_capacity(self.suppliers.len());
            for &id in &self.suppliers {
                if ctx.directory.get(id)?.sells(item) {
                    sellers.push(id);
                }
            }
            let Some(&supplier_id) = ctx.rng.choose(&sellers) else {
                tracing::warn!(clinic = self.id, %item, "no supplier sells resource");
                continue;
            };

            let bill = ctx.directory.get(supplier_id)?.buy(item, 1)?;
            if bill > 0 {
                let mut state = lock(&self.state);
                state.ledger.add_stock(item, 1);
                state.bills.push(supplier_id, bill)?;
                bought += 1;
            }
        }
        Ok(bought)
    }

    /// Treat one sick patient
    ///
    /// Needs one unit of every resource, one specialist salary and a queued
    /// patient; otherwise nothing changes. Returns whether a patient was
    /// treated.
    pub fn treat_one(&self) -> bool {
        let mut state = lock(&self.state);
        let ledger = &mut state.ledger;
        let ready = ledger.stock(ItemKind::SickPatient) > 0
            && ledger.can_pay(EmployeeRole::TreatmentSpecialist.salary())
            && self.resources.iter().all(|item| ledger.stock(*item) > 0);
        if !ready {
            return false;
        }

        if ledger.pay_employee(EmployeeRole::TreatmentSpecialist).is_err() {
            return false;
        }
        // stock was checked above under the same lock
        let consumed = self
            .resources
            .iter()
            .copied()
            .chain(iter::once(ItemKind::SickPatient))
            .all(|item| ledger.consume(item, 1).is_ok());
        if consumed {
            ledger.add_stock(ItemKind::RehabPatient, 1);
        }
        consumed
    }

    /// Offer every treated patient to a random connected hospital
    ///
    /// Returns how many the hospital admitted.
    pub fn send_patients_to_rehab(&self, ctx: &mut DayContext<'_>) -> Result<u32, ActorError> {
        if self.rehab_patients() == 0 {
            return Ok(0);
        }
        let hospital_id = ctx.pick(self.id, "hospital", &self.hospitals)?;
        let hospital = ctx.directory.get(hospital_id)?;
        let insurer_id = self.insurer.ok_or(ActorError::MissingRoute {
            actor: self.id,
            route: "insurer",
        })?;
        let insurer = ctx.directory.get(insurer_id)?;

        let offered = {
            let mut state = lock(&self.state);
            let treated = state.ledger.stock(ItemKind::RehabPatient);
            state.ledger.take_stock(ItemKind::RehabPatient, treated)
        };

        let outcome = hospital
            .transfer(ItemKind::RehabPatient, offered)
            .map(|admitted| admitted.min(offered));
        let kept = offered - outcome.as_ref().copied().unwrap_or(0);
        lock(&self.state)
            .ledger
            .add_stock(ItemKind::RehabPatient, kept);
        let admitted = outcome?;

        if admitted > 0 {
            insurer.invoice(ServiceKind::Treatment.price_for(admitted), self.id)?;
        }
        tracing::debug!(clinic = self.id, hospital = hospital_id, offered, admitted, "rehab transfer");
        Ok(admitted)
    }
}

impl Actor for Clinic {
    fn id(&self) -> ActorId {
        self.id
    }

    fn role(&self) -> Role {
        Role::Clinic
    }

    fn ledger(&self) -> Ledger {
        lock(&self.state).ledger.clone()
    }

    fn patients(&self) -> u64 {
        let state = lock(&self.state);
        u64::from(state.ledger.stock(ItemKind::SickPatient))
            + u64::from(state.ledger.stock(ItemKind::RehabPatient))
    }

    fn transfer(&self, item: ItemKind, qty: u32) -> Result<u32, ActorError> {
        if item != ItemKind::SickPatient {
            return Ok(0);
        }
        let mut state = lock(&self.state);
        if state.ledger.funds() <= 0 || !state.bills.is_empty() {
            return Ok(0);
        }
        state.ledger.add_stock(ItemKind::SickPatient, qty);
        Ok(qty)
    }

    fn pay(&self, amount: i64) -> Result<(), ActorError> {
        check_payment(amount)?;
        lock(&self.state).ledger.credit(amount);
        Ok(())
    }

    fn run_day(&self, ctx: &mut DayContext<'_>) -> Result<(), ActorError> {
        let paid = self.pay_bills(ctx)?;
        let bought = self.order_resources(ctx)?;
        let treated = self.treat_one();
        let to_rehab = self.send_patients_to_rehab(ctx)?;
        tracing::debug!(clinic = self.id, day = ctx.day, paid, bought, treated, to_rehab, "day done");
        Ok(())
    }
}

/// Builder for [`Clinic`]
///
/// # Example
/// ```
/// use health_economy_core::{Actor, ClinicBuilder, ClinicSpecialty, ItemKind};
///
/// let clinic = ClinicBuilder::new(7, ClinicSpecialty::Pulmonology)
///     .funds(300)
///     .build();
///
/// assert_eq!(clinic.transfer(ItemKind::SickPatient, 4).unwrap(), 4);
/// assert_eq!(clinic.patients(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct ClinicBuilder {
    id: ActorId,
    resources: Vec<ItemKind>,
    hospitals: Vec<ActorId>,
    suppliers: Vec<ActorId>,
    insurer: Option<ActorId>,
    ledger: Ledger,
    bills: BillQueue,
}

impl ClinicBuilder {
    pub fn new(id: ActorId, specialty: ClinicSpecialty) -> Self {
        Self::with_resources(id, specialty.resources())
    }

    /// Clinic consuming an arbitrary set of resources per treatment
    pub fn with_resources(id: ActorId, resources: impl Into<Vec<ItemKind>>) -> Self {
        let resources = resources.into();
        let mut ledger = Ledger::new(0);
        ledger.set_stock(ItemKind::SickPatient, 0);
        ledger.set_stock(ItemKind::RehabPatient, 0);
        for item in &resources {
            ledger.set_stock(*item, 0);
        }
        Self {
            id,
            resources,
            hospitals: Vec::new(),
            suppliers: Vec::new(),
            insurer: None,
            ledger,
            bills: BillQueue::new(),
        }
    }

    pub fn funds(mut self, funds: i64) -> Self {
        self.ledger.set_funds(funds);
        self
    }

    pub fn stock(mut self, item: ItemKind, qty: u32) -> Self {
        self.ledger.set_stock(item, qty);
        self
    }

    /// Seed an unpaid bill owed to `supplier`
    pub fn bill(mut self, supplier: ActorId, amount: i64) -> Result<Self, ActorError> {
        self.bills.push(supplier, amount)?;
        Ok(self)
    }

    pub fn hospitals(mut self, hospitals: Vec<ActorId>) -> Self {
        self.hospitals = hospitals;
        self
    }

    pub fn suppliers(mut self, suppliers: Vec<ActorId>) -> Self {
        self.suppliers = suppliers;
        self
    }

    pub fn insurer(mut self, insurer: ActorId) -> Self {
        self.insurer = Some(insurer);
        self
    }

    pub fn build(self) -> Clinic {
        Clinic {
            id: self.id,
            resources: self.resources,
            hospitals: self.hospitals,
            suppliers: self.suppliers,
            insurer: self.insurer,
            state: Mutex::new(ClinicState {
                ledger: self.ledger,
                bills: self.bills,
            }),
        }
    }
}
