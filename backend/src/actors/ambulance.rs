//! Ambulance actor
//!
//! Brings sick patients from the field to hospitals.
//!
//! Each day, if the ambulance can afford one emergency-staff salary and
//! still carries sick patients, it sends a random batch of 1 to 5 of them to
//! a random hospital, pays the crew and invoices the insurer for the salary.
//! The trip is paid whether or not the hospital had room: patients it turns
//! away stay in the ambulance. Otherwise the day is skipped: the same
//! preconditions are simply evaluated again tomorrow.
//!
//! Capabilities: `pay`.

use crate::actors::{check_payment, lock, Actor, ActorError, DayContext, Role};
use crate::models::catalog::{EmployeeRole, ItemKind};
use crate::models::ledger::Ledger;
use crate::models::ActorId;
use std::sync::Mutex;

/// Largest batch of patients sent in one trip
pub const MAX_BATCH: u32 = 5;

/// Outcome of one dispatch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Not enough funds for the crew, or nobody left to carry
    Skipped,
    /// Patients were sent to `hospital`, which admitted `admitted` of `sent`
    Sent {
        hospital: ActorId,
        sent: u32,
        admitted: u32,
    },
}

impl Dispatch {
    pub fn admitted(self) -> u32 {
        match self {
            Dispatch::Skipped => 0,
            Dispatch::Sent { admitted, .. } => admitted,
        }
    }
}

#[derive(Debug)]
pub struct Ambulance {
    id: ActorId,
    hospitals: Vec<ActorId>,
    insurer: Option<ActorId>,
    state: Mutex<Ledger>,
}

impl Ambulance {
    /// Sick patients still on board
    pub fn sick_patients(&self) -> u32 {
        lock(&self.state).stock(ItemKind::SickPatient)
    }

    /// Send one batch of patients to a random hospital
    pub fn send_patients(&self, ctx: &mut DayContext<'_>) -> Result<Dispatch, ActorError> {
        let salary = EmployeeRole::EmergencyStaff.salary();
        {
            let ledger = lock(&self.state);
            if !ledger.can_pay(salary) || ledger.stock(ItemKind::SickPatient) == 0 {
                return Ok(Dispatch::Skipped);
            }
        }

        let hospital_id = ctx.pick(self.id, "hospital", &self.hospitals)?;
        let insurer_id = self.insurer.ok_or(ActorError::MissingRoute {
            actor: self.id,
            route: "insurer",
        })?;
        let hospital = ctx.directory.get(hospital_id)?;
        let insurer = ctx.directory.get(insurer_id)?;

        let wanted = u32::try_from(ctx.rng.range(1, i64::from(MAX_BATCH) + 1)).unwrap_or(1);
        let sent = lock(&self.state).take_stock(ItemKind::SickPatient, wanted);

        let admitted = match hospital.transfer(ItemKind::SickPatient, sent) {
            Ok(admitted) => admitted.min(sent),
            Err(err) => {
                lock(&self.state).add_stock(ItemKind::SickPatient, sent);
                return Err(err);
            }
        };

        let crew_paid = {
            let mut ledger = lock(&self.state);
            ledger.add_stock(ItemKind::SickPatient, sent - admitted);
            ledger.pay_employee(EmployeeRole::EmergencyStaff).is_ok()
        };
        if crew_paid {
            insurer.invoice(salary, self.id)?;
        }

        Ok(Dispatch::Sent {
            hospital: hospital_id,
            sent,
            admitted,
        })
    }
}

impl Actor for Ambulance {
    fn id(&self) -> ActorId {
        self.id
    }

    fn role(&self) -> Role {
        Role::Ambulance
    }

    fn ledger(&self) -> Ledger {
        lock(&self.state).clone()
    }

    fn patients(&self) -> u64 {
        u64::from(self.sick_patients())
    }

    fn pay(&self, amount: i64) -> Result<(), ActorError> {
        check_payment(amount)?;
        lock(&self.state).credit(amount);
        Ok(())
    }

    fn run_day(&self, ctx: &mut DayContext<'_>) -> Result<(), ActorError> {
        let dispatch = self.send_patients(ctx)?;
        tracing::debug!(ambulance = self.id, day = ctx.day, ?dispatch, "dispatch");
        Ok(())
    }
}

/// Builder for [`Ambulance`]
///
/// # Example
/// ```
/// use health_economy_core::{Actor, AmbulanceBuilder};
///
/// let ambulance = AmbulanceBuilder::new(0)
///     .funds(200)
///     .sick_patients(900)
///     .hospitals(vec![2, 3])
///     .insurer(9)
///     .build();
///
/// assert_eq!(ambulance.patients(), 900);
/// ```
#[derive(Debug, Clone)]
pub struct AmbulanceBuilder {
    id: ActorId,
    hospitals: Vec<ActorId>,
    insurer: Option<ActorId>,
    ledger: Ledger,
}

impl AmbulanceBuilder {
    pub fn new(id: ActorId) -> Self {
        let mut ledger = Ledger::new(0);
        ledger.set_stock(ItemKind::SickPatient, 0);
        Self {
            id,
            hospitals: Vec::new(),
            insurer: None,
            ledger,
        }
    }

    pub fn funds(mut self, funds: i64) -> Self {
        self.ledger.set_funds(funds);
        self
    }

    pub fn sick_patients(mut self, count: u32) -> Self {
        self.ledger.set_stock(ItemKind::SickPatient, count);
        self
    }

    pub fn hospitals(mut self, hospitals: Vec<ActorId>) -> Self {
        self.hospitals = hospitals;
        self
    }

    pub fn insurer(mut self, insurer: ActorId) -> Self {
        self.insurer = Some(insurer);
        self
    }

    pub fn build(self) -> Ambulance {
        Ambulance {
            id: self.id,
            hospitals: self.hospitals,
            insurer: self.insurer,
            state: Mutex::new(self.ledger),
        }
    }
}
