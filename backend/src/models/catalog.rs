//! Catalog of everything that changes hands in the economy
//!
//! Item kinds, employee roles and billable services, together with their
//! fixed prices. These are pure lookups: nothing here holds state.
//!
//! CRITICAL: All money values are i64 (whole currency units)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of "items" held in an actor's inventory.
///
/// Patients are inventory too: they move between actors through
/// `transfer` exactly like goods do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    SickPatient,
    RehabPatient,
    Syringe,
    Pill,
    Scalpel,
    Thermometer,
    Stethoscope,
    /// Sentinel for "no item" (e.g. an empty catalog)
    Nothing,
}

impl ItemKind {
    /// Price of one unit when sold by a supplier
    ///
    /// Patients and the sentinel have no price.
    ///
    /// # Example
    /// ```
    /// use health_economy_core::ItemKind;
    ///
    /// assert_eq!(ItemKind::Pill.unit_price() + ItemKind::Thermometer.unit_price(), 11);
    /// assert_eq!(ItemKind::SickPatient.unit_price(), 0);
    /// ```
    pub fn unit_price(self) -> i64 {
        match self {
            ItemKind::Syringe => 3,
            ItemKind::Pill => 5,
            ItemKind::Scalpel => 8,
            ItemKind::Thermometer => 6,
            ItemKind::Stethoscope => 12,
            ItemKind::SickPatient | ItemKind::RehabPatient | ItemKind::Nothing => 0,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemKind::SickPatient => "Sick Patient",
            ItemKind::RehabPatient => "Rehab Patient",
            ItemKind::Syringe => "Syringe",
            ItemKind::Pill => "Pill",
            ItemKind::Scalpel => "Scalpel",
            ItemKind::Thermometer => "Thermometer",
            ItemKind::Stethoscope => "Stethoscope",
            ItemKind::Nothing => "Nothing",
        };
        f.write_str(name)
    }
}

/// Kinds of employees, each paid a fixed salary per use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmployeeRole {
    /// Works in supplier shops
    Supplier,
    /// Works in ambulances
    EmergencyStaff,
    /// Works in hospitals
    NursingStaff,
    /// Works in clinics
    TreatmentSpecialist,
}

impl EmployeeRole {
    /// Salary paid each time one employee of this role works
    ///
    /// # Example
    /// ```
    /// use health_economy_core::EmployeeRole;
    ///
    /// assert_eq!(EmployeeRole::TreatmentSpecialist.salary(), 20);
    /// ```
    pub fn salary(self) -> i64 {
        match self {
            EmployeeRole::Supplier => 5,
            EmployeeRole::EmergencyStaff => 2,
            EmployeeRole::NursingStaff => 2,
            EmployeeRole::TreatmentSpecialist => 20,
        }
    }
}

/// Care services billed to the insurer, per patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceKind {
    /// Hospital stay before a clinic takes the patient
    PreTreatmentStay,
    /// Clinic treatment
    Treatment,
    /// Completed hospital rehabilitation
    Rehab,
}

impl ServiceKind {
    pub fn price(self) -> i64 {
        match self {
            ServiceKind::PreTreatmentStay => 10,
            ServiceKind::Treatment => 40,
            ServiceKind::Rehab => 25,
        }
    }

    /// Price for `patients` patients
    pub fn price_for(self, patients: u32) -> i64 {
        self.price() * i64::from(patients)
    }
}
