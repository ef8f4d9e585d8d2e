//! Population runner
//!
//! Builds a population from a [`PopulationConfig`], runs one worker thread
//! per actor and drives them day by day through a [`DayClock`].
//!
//! # Architecture
//!
//! ```text
//! runner                          worker (one per actor)
//! ------                          ----------------------
//! for each day:                   loop:
//!   start_next_day()      ──►       worker_wait_day_start()
//!                                   stop flag set? → exit
//!                                   run_day()  (may call other actors)
//!   wait_all_done()       ◄──       worker_end_day()
//! set stop flag
//! start_next_day()        ──►       (wakes, sees the flag, exits)
//! join every worker
//! ```
//!
//! # Critical Invariants
//!
//! 1. **Barrier integrity**: a worker always ends the day it started, even if
//!    its routine failed or panicked, so the runner can never deadlock
//! 2. **Determinism of choices**: each actor draws from its own generator,
//!    seeded from the master seed and its id
//! 3. **Clean shutdown**: errors are reported only after every worker has
//!    been joined
//!
//! # Example
//!
//! ```rust
//! use health_economy_core::{Population, PopulationConfig};
//!
//! let config = PopulationConfig { days: 2, ..Default::default() };
//! let report = Population::run(&config).unwrap();
//!
//! assert_eq!(report.days, 2);
//! assert!(report.funds_balanced());
//! assert!(report.patients_balanced());
//! ```

use crate::actors::{
    Actor, ActorError, Ambulance, AmbulanceBuilder, Clinic, ClinicBuilder, ClinicSpecialty,
    DayContext, Directory, Hospital, HospitalBuilder, Insurance, InsuranceBuilder, Supplier,
    SupplierBuilder, SupplierKind,
};
use crate::core::clock::DayClock;
use crate::models::ActorId;
use crate::orchestrator::config::{
    funds, stock, ConfigError, PopulationConfig, HOSPITAL_BEDS, SICK_PER_AMBULANCE,
};
use crate::orchestrator::report::{ActorSummary, FinalReport, OpeningTotals};
use crate::rng::RngManager;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Failed to wire population: {0}")]
    Wiring(#[from] ActorError),

    #[error("Failed to spawn worker for actor {actor}: {source}")]
    Spawn {
        actor: ActorId,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker for actor {actor} panicked")]
    WorkerPanicked { actor: ActorId },

    #[error("Actor {actor} failed: {source}")]
    Actor {
        actor: ActorId,
        #[source]
        source: ActorError,
    },
}

/// How a worker thread ended
enum WorkerExit {
    Clean,
    Failed(ActorError),
    Panicked,
}

// ============================================================================
// Population
// ============================================================================

/// A fully wired population and its per-actor generators
#[derive(Debug)]
pub struct Population {
    config: PopulationConfig,
    directory: Directory,
    ambulances: Vec<Arc<Ambulance>>,
    suppliers: Vec<Arc<Supplier>>,
    hospitals: Vec<Arc<Hospital>>,
    clinics: Vec<Arc<Clinic>>,
    insurer: Arc<Insurance>,
    /// One generator per actor, indexed by id
    rngs: Vec<RngManager>,
    opening: OpeningTotals,
    days_run: usize,
}

impl Population {
    /// Build and wire every actor of `config`
    ///
    /// Ids are assigned in order: ambulances, suppliers, hospitals, clinics,
    /// then the insurer.
    pub fn build(config: &PopulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let ambulance_ids: Vec<ActorId> = (0..config.ambulances).collect();
        let supplier_ids: Vec<ActorId> =
            (ambulance_ids.len()..ambulance_ids.len() + config.suppliers).collect();
        let first_hospital = ambulance_ids.len() + supplier_ids.len();
        let hospital_ids: Vec<ActorId> = (first_hospital..first_hospital + config.hospitals).collect();
        let first_clinic = first_hospital + hospital_ids.len();
        let clinic_ids: Vec<ActorId> = (first_clinic..first_clinic + config.clinics).collect();
        let insurer_id = first_clinic + clinic_ids.len();

        let ambulances: Vec<Arc<Ambulance>> = ambulance_ids
            .iter()
            .map(|&id| {
                Arc::new(
                    AmbulanceBuilder::new(id)
                        .funds(funds::AMBULANCE)
                        .sick_patients(SICK_PER_AMBULANCE)
                        .hospitals(hospital_ids.clone())
                        .insurer(insurer_id)
                        .build(),
                )
            })
            .collect();

        let suppliers: Vec<Arc<Supplier>> = supplier_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| {
                let kind = if i % 2 == 0 {
                    SupplierKind::MedicalDevices
                } else {
                    SupplierKind::Pharmacy
                };
                let builder = kind
                    .catalog()
                    .iter()
                    .fold(SupplierBuilder::of_kind(id, kind), |builder, &item| {
                        builder.stock(item, stock::initial(item))
                    });
                Arc::new(builder.funds(funds::SUPPLIER).build())
            })
            .collect();

        let hospitals: Vec<Arc<Hospital>> = hospital_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| {
                Arc::new(
                    HospitalBuilder::new(id, HOSPITAL_BEDS)
                        .funds(funds::HOSPITAL)
                        .clinics(clinics_of_hospital(i, &clinic_ids, hospital_ids.len()))
                        .insurer(insurer_id)
                        .build(),
                )
            })
            .collect();

        let clinics: Vec<Arc<Clinic>> = clinic_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| {
                let specialty = ClinicSpecialty::ALL[i % ClinicSpecialty::ALL.len()];
                Arc::new(
                    ClinicBuilder::new(id, specialty)
                        .funds(funds::CLINIC)
                        .hospitals(hospital_ids.clone())
                        .suppliers(supplier_ids.clone())
                        .insurer(insurer_id)
                        .build(),
                )
            })
            .collect();

        let insurer = Arc::new(InsuranceBuilder::new(insurer_id).funds(funds::INSURER).build());

        let mut directory = Directory::new();
        for actor in &ambulances {
            directory.insert(actor.clone())?;
        }
        for actor in &suppliers {
            directory.insert(actor.clone())?;
        }
        for actor in &hospitals {
            directory.insert(actor.clone())?;
        }
        for actor in &clinics {
            directory.insert(actor.clone())?;
        }
        directory.insert(insurer.clone())?;

        let rngs = (0..directory.len())
            .map(|id| RngManager::for_actor(config.seed, id))
            .collect();
        let opening = OpeningTotals::of(&directory);

        tracing::info!(
            actors = directory.len(),
            ambulances = config.ambulances,
            suppliers = config.suppliers,
            hospitals = config.hospitals,
            clinics = config.clinics,
            seed = config.seed,
            "population built"
        );

        Ok(Self {
            config: config.clone(),
            directory,
            ambulances,
            suppliers,
            hospitals,
            clinics,
            insurer,
            rngs,
            opening,
            days_run: 0,
        })
    }

    /// Build a population, run it for `config.days` days and report
    pub fn run(config: &PopulationConfig) -> Result<FinalReport, SimulationError> {
        let mut population = Self::build(config)?;
        population.run_days(config.days)?;
        let report = population.report();
        tracing::info!(
            days = report.days,
            funds_balanced = report.funds_balanced(),
            patients_balanced = report.patients_balanced(),
            pending_insurer_bills = report.pending_insurer_bills,
            "simulation finished"
        );
        Ok(report)
    }

    /// Run `days` more days, one worker thread per actor
    ///
    /// Every worker is joined before this returns, whatever the outcome.
    pub fn run_days(&mut self, days: usize) -> Result<(), SimulationError> {
        let clock = DayClock::new(self.directory.len());
        let stop = AtomicBool::new(false);
        let first_day = self.days_run;
        let directory = &self.directory;

        let outcome = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(directory.len());
            let mut spawn_error = None;

            for (actor, rng) in directory.iter().zip(self.rngs.iter_mut()) {
                let id = actor.id();
                let clock = &clock;
                let stop = &stop;
                let spawned = thread::Builder::new()
                    .name(format!("{}-{}", actor.role(), id).to_lowercase())
                    .spawn_scoped(scope, move || {
                        worker_loop(actor.as_ref(), directory, clock, stop, rng, first_day)
                    });
                match spawned {
                    Ok(handle) => handles.push((id, handle)),
                    Err(source) => {
                        spawn_error = Some(SimulationError::Spawn { actor: id, source });
                        break;
                    }
                }
            }

            // workers that did spawn are still released and joined below
            if spawn_error.is_none() {
                for _ in 0..days {
                    clock.start_next_day();
                    clock.wait_all_done();
                }
            }
            stop.store(true, Ordering::SeqCst);
            clock.start_next_day();

            let mut first_error = spawn_error;
            for (actor, handle) in handles {
                let exit = handle.join().unwrap_or(WorkerExit::Panicked);
                let error = match exit {
                    WorkerExit::Clean => continue,
                    WorkerExit::Failed(source) => SimulationError::Actor { actor, source },
                    WorkerExit::Panicked => SimulationError::WorkerPanicked { actor },
                };
                first_error.get_or_insert(error);
            }
            first_error
        });

        self.days_run += clock.current_day();
        match outcome {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Snapshot of every actor; call between runs, never during one
    pub fn report(&self) -> FinalReport {
        FinalReport {
            config: self.config.clone(),
            days: self.days_run,
            actors: self
                .directory
                .iter()
                .map(|actor| ActorSummary::of(actor.as_ref()))
                .collect(),
            opening: self.opening,
            contributions: self.insurer.daily_contribution() * self.days_run as i64,
            pending_insurer_bills: self.insurer.pending_bills(),
            pending_insurer_total: self.insurer.pending_bills_total(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn days_run(&self) -> usize {
        self.days_run
    }

    pub fn ambulances(&self) -> &[Arc<Ambulance>] {
        &self.ambulances
    }

    pub fn suppliers(&self) -> &[Arc<Supplier>] {
        &self.suppliers
    }

    pub fn hospitals(&self) -> &[Arc<Hospital>] {
        &self.hospitals
    }

    pub fn clinics(&self) -> &[Arc<Clinic>] {
        &self.clinics
    }

    pub fn insurer(&self) -> &Arc<Insurance> {
        &self.insurer
    }
}

/// Clinics routed from hospital `index`
///
/// Hospital `i` gets its own block `[i·⌊C/H⌋, (i+1)·⌊C/H⌋)`; the last
/// `C mod H` clinics are shared by every hospital.
pub fn clinics_of_hospital(index: usize, clinics: &[ActorId], hospitals: usize) -> Vec<ActorId> {
    if hospitals == 0 {
        return Vec::new();
    }
    let per_hospital = clinics.len() / hospitals;
    let shared = clinics.len() % hospitals;
    let own = index * per_hospital..(index + 1) * per_hospital;
    let mut routed: Vec<ActorId> = clinics.get(own).map(<[ActorId]>::to_vec).unwrap_or_default();
    routed.extend_from_slice(&clinics[clinics.len() - shared..]);
    routed
}

fn worker_loop(
    actor: &dyn Actor,
    directory: &Directory,
    clock: &DayClock,
    stop: &AtomicBool,
    rng: &mut RngManager,
    first_day: usize,
) -> WorkerExit {
    tracing::info!(actor = actor.id(), role = %actor.role(), "worker started");
    let mut exit = WorkerExit::Clean;
    loop {
        clock.worker_wait_day_start();
        if stop.load(Ordering::SeqCst) {
            break;
        }

        let day = first_day + clock.current_day();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut ctx = DayContext::new(day, directory, rng);
            actor.run_day(&mut ctx)
        }));
        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::error!(actor = actor.id(), day, error = %err, "routine failed");
                if matches!(exit, WorkerExit::Clean) {
                    exit = WorkerExit::Failed(err);
                }
            }
            Err(_) => {
                tracing::error!(actor = actor.id(), day, "routine panicked");
                exit = WorkerExit::Panicked;
            }
        }
        clock.worker_end_day();
    }
    tracing::info!(actor = actor.id(), "worker stopped");
    exit
}
