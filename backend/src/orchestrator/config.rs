//! Population configuration and starting conditions

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Starting conditions
// ============================================================================

/// Opening funds of every actor, by role
pub mod funds {
    pub const AMBULANCE: i64 = 200;
    pub const SUPPLIER: i64 = 200;
    pub const CLINIC: i64 = 300;
    pub const HOSPITAL: i64 = 1_000;
    pub const INSURER: i64 = 1_000;
}

/// Opening supplier stock, per item of its catalog
pub mod stock {
    use crate::models::catalog::ItemKind;

    pub const SCALPEL: u32 = 400;
    pub const THERMOMETER: u32 = 350;
    pub const STETHOSCOPE: u32 = 600;
    pub const PILL: u32 = 350;
    pub const SYRINGE: u32 = 530;

    /// Opening stock of `item` for a supplier that sells it
    pub fn initial(item: ItemKind) -> u32 {
        match item {
            ItemKind::Scalpel => SCALPEL,
            ItemKind::Thermometer => THERMOMETER,
            ItemKind::Stethoscope => STETHOSCOPE,
            ItemKind::Pill => PILL,
            ItemKind::Syringe => SYRINGE,
            _ => 0,
        }
    }
}

/// Sick patients every ambulance starts with
pub const SICK_PER_AMBULANCE: u32 = 900;

/// Beds per hospital, also its nursing staff
pub const HOSPITAL_BEDS: u32 = 35;

// ============================================================================
// Configuration
// ============================================================================

/// Errors raised by [`PopulationConfig::validate`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be > 0")]
    Zero { field: &'static str },
}

/// Shape of a simulated population
///
/// The insurer count is fixed at one.
///
/// # Example
/// ```
/// use health_economy_core::PopulationConfig;
///
/// let config = PopulationConfig { days: 3, ..Default::default() };
/// assert!(config.validate().is_ok());
///
/// let empty = PopulationConfig { hospitals: 0, ..Default::default() };
/// assert!(empty.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Days to simulate
    pub days: usize,
    pub ambulances: usize,
    pub suppliers: usize,
    pub clinics: usize,
    pub hospitals: usize,
    /// Master seed; every actor derives its own generator from it
    pub seed: u64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            days: 6,
            ambulances: 2,
            suppliers: 3,
            clinics: 3,
            hospitals: 2,
            seed: 12345,
        }
    }
}

impl PopulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("days", self.days),
            ("ambulances", self.ambulances),
            ("suppliers", self.suppliers),
            ("clinics", self.clinics),
            ("hospitals", self.hospitals),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(ConfigError::Zero { field });
            }
        }
        Ok(())
    }

    /// Ambulances, suppliers, hospitals, clinics and the insurer
    pub fn total_actors(&self) -> usize {
        self.ambulances + self.suppliers + self.hospitals + self.clinics + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_population() {
        let config = PopulationConfig::default();
        assert_eq!(config.total_actors(), 11);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_count_names_the_field() {
        let config = PopulationConfig {
            suppliers: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Zero { field: "suppliers" })
        );
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "suppliers must be > 0"
        );
    }
}
