//! Hospital actor
//!
//! Admits sick patients from ambulances, forwards them to clinics, and
//! hosts treated patients through a fixed-length rehabilitation.
//!
//! # Daily routine
//!
//! 1. Send every queued sick patient to a random connected clinic and
//!    invoice the insurer a pre-treatment stay per admitted patient
//! 2. Advance every rehabilitation countdown by one day; patients reaching
//!    zero are discharged ("freed") and the insurer is invoiced a rehab per
//!    discharged patient
//! 3. Pay one nursing salary per staffed bed, occupied or not, as far as
//!    funds allow
//!
//! # Beds
//!
//! Occupancy counts sick patients, rehab patients and sick patients
//! currently being offered to a clinic. `transfer` admits
//! `min(requested, max_beds - occupancy)` under the hospital's lock, so any
//! number of concurrent callers can never push occupancy past `max_beds`.
//!
//! Capabilities: `transfer` (sick and rehab patients), `pay`.

use crate::actors::{check_payment, lock, Actor, ActorError, DayContext, Role};
use crate::models::catalog::{EmployeeRole, ItemKind, ServiceKind};
use crate::models::ledger::Ledger;
use crate::models::ActorId;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Days a patient spends in rehabilitation
pub const REHAB_DAYS: u32 = 5;

#[derive(Debug)]
struct HospitalState {
    ledger: Ledger,
    /// Remaining rehab days, one entry per rehab patient, admission order
    rehab_timers: VecDeque<u32>,
    /// Sick patients taken out of the queue while a clinic decides
    in_transit: u32,
    /// Patients discharged after completing rehab
    freed: u32,
}

impl HospitalState {
    fn occupancy(&self) -> u32 {
        self.ledger.stock(ItemKind::SickPatient)
            + self.ledger.stock(ItemKind::RehabPatient)
            + self.in_transit
    }

    fn admit_rehab(&mut self, count: u32) {
        self.ledger.add_stock(ItemKind::RehabPatient, count);
        self.rehab_timers
            .extend(std::iter::repeat(REHAB_DAYS).take(count as usize));
    }
}

#[derive(Debug)]
pub struct Hospital {
    id: ActorId,
    max_beds: u32,
    nursing_staff: u32,
    clinics: Vec<ActorId>,
    insurer: Option<ActorId>,
    state: Mutex<HospitalState>,
}

impl Hospital {
    pub fn max_beds(&self) -> u32 {
        self.max_beds
    }

    pub fn nursing_staff(&self) -> u32 {
        self.nursing_staff
    }

    pub fn sick_patients(&self) -> u32 {
        lock(&self.state).ledger.stock(ItemKind::SickPatient)
    }

    pub fn rehab_patients(&self) -> u32 {
        lock(&self.state).ledger.stock(ItemKind::RehabPatient)
    }

    pub fn freed(&self) -> u32 {
        lock(&self.state).freed
    }

    /// Beds currently taken
    pub fn occupancy(&self) -> u32 {
        lock(&self.state).occupancy()
    }

    fn insurer_id(&self) -> Result<ActorId, ActorError> {
        self.insurer.ok_or(ActorError::MissingRoute {
            actor: self.id,
            route: "insurer",
        })
    }

    /// Offer every queued sick patient to a random connected clinic
    ///
    /// Returns how many the clinic admitted.
    pub fn transfer_sick_patients_to_clinic(
        &self,
        ctx: &mut DayContext<'_>,
    ) -> Result<u32, ActorError> {
        if self.sick_patients() == 0 {
            return Ok(0);
        }
        let clinic_id = ctx.pick(self.id, "clinic", &self.clinics)?;
        let clinic = ctx.directory.get(clinic_id)?;
        let insurer = ctx.directory.get(self.insurer_id()?)?;

        let offered = {
            let mut state = lock(&self.state);
            let queued = state.ledger.stock(ItemKind::SickPatient);
            let offered = state.ledger.take_stock(ItemKind::SickPatient, queued);
            state.in_transit += offered;
            offered
        };

        let outcome = clinic
            .transfer(ItemKind::SickPatient, offered)
            .map(|admitted| admitted.min(offered));
        {
            let mut state = lock(&self.state);
            state.in_transit -= offered;
            let kept = offered - outcome.as_ref().copied().unwrap_or(0);
            state.ledger.add_stock(ItemKind::SickPatient, kept);
        }
        let admitted = outcome?;

        if admitted > 0 {
            insurer.invoice(ServiceKind::PreTreatmentStay.price_for(admitted), self.id)?;
        }
        tracing::debug!(hospital = self.id, clinic = clinic_id, offered, admitted, "sick transfer");
        Ok(admitted)
    }

    /// Advance every rehabilitation by one day
    ///
    /// Returns how many patients completed rehab and were discharged.
    pub fn update_rehab(&self, ctx: &mut DayContext<'_>) -> Result<u32, ActorError> {
        let insurer = ctx.directory.get(self.insurer_id()?)?;

        let completed = {
            let mut state = lock(&self.state);
            for remaining in state.rehab_timers.iter_mut() {
                *remaining = remaining.saturating_sub(1);
            }
            let before = state.rehab_timers.len();
            state.rehab_timers.retain(|remaining| *remaining > 0);
            // at most rehab_timers.len() patients, which fits in u32 by construction
            let completed = u32::try_from(before - state.rehab_timers.len()).unwrap_or(u32::MAX);
            let discharged = state.ledger.take_stock(ItemKind::RehabPatient, completed);
            state.freed += discharged;
            discharged
        };

        if completed > 0 {
            insurer.invoice(ServiceKind::Rehab.price_for(completed), self.id)?;
        }
        Ok(completed)
    }

    /// Pay one nursing salary per staffed bed, as far as funds allow
    ///
    /// Returns how many nurses were paid.
    pub fn pay_nursing_staff(&self) -> u32 {
        let paid = lock(&self.state)
            .ledger
            .pay_employees_up_to(EmployeeRole::NursingStaff, self.nursing_staff);
        if paid < self.nursing_staff {
            tracing::warn!(
                hospital = self.id,
                paid,
                staff = self.nursing_staff,
                "payroll not fully covered"
            );
        }
        paid
    }
}

impl Actor for Hospital {
    fn id(&self) -> ActorId {
        self.id
    }

    fn role(&self) -> Role {
        Role::Hospital
    }

    fn ledger(&self) -> Ledger {
        lock(&self.state).ledger.clone()
    }

    fn patients(&self) -> u64 {
        let state = lock(&self.state);
        u64::from(state.occupancy()) + u64::from(state.freed)
    }

    fn transfer(&self, item: ItemKind, qty: u32) -> Result<u32, ActorError> {
        let mut state = lock(&self.state);
        let free_beds = self.max_beds.saturating_sub(state.occupancy());
        let admitted = match item {
            ItemKind::SickPatient if state.ledger.funds() > 0 => {
                let admitted = qty.min(free_beds);
                state.ledger.add_stock(ItemKind::SickPatient, admitted);
                admitted
            }
            ItemKind::RehabPatient => {
                let admitted = qty.min(free_beds);
                state.admit_rehab(admitted);
                admitted
            }
            _ => 0,
        };
        Ok(admitted)
    }

    fn pay(&self, amount: i64) -> Result<(), ActorError> {
        check_payment(amount)?;
        lock(&self.state).ledger.credit(amount);
        Ok(())
    }

    fn run_day(&self, ctx: &mut DayContext<'_>) -> Result<(), ActorError> {
        let to_clinic = self.transfer_sick_patients_to_clinic(ctx)?;
        let discharged = self.update_rehab(ctx)?;
        let nurses = self.pay_nursing_staff();
        tracing::debug!(hospital = self.id, day = ctx.day, to_clinic, discharged, nurses, "day done");
        Ok(())
    }
}

/// Builder for [`Hospital`]
///
/// Nursing staff defaults to one nurse per bed.
///
/// # Example
/// ```
/// use health_economy_core::{Actor, HospitalBuilder, ItemKind};
///
/// let hospital = HospitalBuilder::new(3, 5).funds(1_000).build();
///
/// assert_eq!(hospital.transfer(ItemKind::SickPatient, 10).unwrap(), 5);
/// assert_eq!(hospital.transfer(ItemKind::SickPatient, 2).unwrap(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct HospitalBuilder {
    id: ActorId,
    max_beds: u32,
    nursing_staff: u32,
    clinics: Vec<ActorId>,
    insurer: Option<ActorId>,
    ledger: Ledger,
    rehab: u32,
}

impl HospitalBuilder {
    pub fn new(id: ActorId, max_beds: u32) -> Self {
        let mut ledger = Ledger::new(0);
        ledger.set_stock(ItemKind::SickPatient, 0);
        ledger.set_stock(ItemKind::RehabPatient, 0);
        Self {
            id,
            max_beds,
            nursing_staff: max_beds,
            clinics: Vec::new(),
            insurer: None,
            ledger,
            rehab: 0,
        }
    }

    pub fn funds(mut self, funds: i64) -> Self {
        self.ledger.set_funds(funds);
        self
    }

    pub fn nursing_staff(mut self, staff: u32) -> Self {
        self.nursing_staff = staff;
        self
    }

    /// Seed queued sick patients (not bounded by beds)
    pub fn sick_patients(mut self, count: u32) -> Self {
        self.ledger.set_stock(ItemKind::SickPatient, count);
        self
    }

    /// Seed patients that just started rehab
    pub fn rehab_patients(mut self, count: u32) -> Self {
        self.rehab = count;
        self
    }

    pub fn clinics(mut self, clinics: Vec<ActorId>) -> Self {
        self.clinics = clinics;
        self
    }

    pub fn insurer(mut self, insurer: ActorId) -> Self {
        self.insurer = Some(insurer);
        self
    }

    pub fn build(self) -> Hospital {
        let mut state = HospitalState {
            ledger: self.ledger,
            rehab_timers: VecDeque::new(),
            in_transit: 0,
            freed: 0,
        };
        state.admit_rehab(self.rehab);
        Hospital {
            id: self.id,
            max_beds: self.max_beds,
            nursing_staff: self.nursing_staff,
            clinics: self.clinics,
            insurer: self.insurer,
            state: Mutex::new(state),
        }
    }
}
