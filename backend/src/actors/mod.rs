//! Actor capability protocol
//!
//! Every participant of the economy is an [`Actor`]. Actors talk to each
//! other only through four capability operations:
//!
//! | Operation | Effect on the invoked actor |
//! |-----------|-----------------------------|
//! | `transfer(item, qty)` | admits up to `qty` units, returns how many |
//! | `buy(item, qty)` | sells up to `qty` units, returns the bill |
//! | `invoice(amount, beneficiary)` | records that it owes `beneficiary` |
//! | `pay(amount)` | receives `amount` |
//!
//! A role enables a subset of them (its [`CapabilitySet`]). The trait's
//! default implementations reject every call with
//! [`ActorError::Unsupported`], so a role only overrides what it supports
//! and the rejection is identical no matter what happened before.
//!
//! # Critical Invariants
//!
//! 1. **One lock per actor**: funds, inventory and pending bills of an actor
//!    live behind a single mutex; every capability call holds it for its
//!    whole read-modify-write
//! 2. **No nested locks**: an actor never calls another actor while holding
//!    its own lock, so no two actor locks are ever held by one thread
//! 3. **Conservation**: when an outgoing call fails, whatever was reserved
//!    for it (patients, money) is put back before the error is returned

pub mod ambulance;
pub mod clinic;
pub mod hospital;
pub mod insurance;
pub mod supplier;

use crate::models::catalog::{EmployeeRole, ItemKind};
use crate::models::ledger::Ledger;
use crate::models::ActorId;
use crate::rng::RngManager;
use crate::settlement::{Bill, BillError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub use ambulance::{Ambulance, AmbulanceBuilder};
pub use clinic::{Clinic, ClinicBuilder, ClinicSpecialty};
pub use hospital::{Hospital, HospitalBuilder};
pub use insurance::{Insurance, InsuranceBuilder};
pub use supplier::{Supplier, SupplierBuilder, SupplierKind};

// ============================================================================
// Roles and capabilities
// ============================================================================

/// The five kinds of actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Ambulance,
    Supplier,
    Clinic,
    Hospital,
    Insurance,
}

impl Role {
    /// Capabilities this role enables
    ///
    /// # Example
    /// ```
    /// use health_economy_core::{Capability, Role};
    ///
    /// let caps = Role::Supplier.capabilities();
    /// assert!(caps.contains(Capability::Buy));
    /// assert!(!caps.contains(Capability::Transfer));
    /// ```
    pub fn capabilities(self) -> CapabilitySet {
        match self {
            Role::Ambulance => CapabilitySet::EMPTY.with(Capability::Pay),
            Role::Supplier => CapabilitySet::EMPTY
                .with(Capability::Buy)
                .with(Capability::Pay),
            Role::Clinic | Role::Hospital => CapabilitySet::EMPTY
                .with(Capability::Transfer)
                .with(Capability::Pay),
            Role::Insurance => CapabilitySet::EMPTY.with(Capability::Invoice),
        }
    }

    /// Staff paid by this role, `None` for the insurer
    pub fn staff(self) -> Option<EmployeeRole> {
        match self {
            Role::Ambulance => Some(EmployeeRole::EmergencyStaff),
            Role::Supplier => Some(EmployeeRole::Supplier),
            Role::Clinic => Some(EmployeeRole::TreatmentSpecialist),
            Role::Hospital => Some(EmployeeRole::NursingStaff),
            Role::Insurance => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One of the four capability operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Transfer,
    Buy,
    Invoice,
    Pay,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Transfer,
        Capability::Buy,
        Capability::Invoice,
        Capability::Pay,
    ];

    const fn bit(self) -> u8 {
        match self {
            Capability::Transfer => 1,
            Capability::Buy => 1 << 1,
            Capability::Invoice => 1 << 2,
            Capability::Pay => 1 << 3,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Transfer => "transfer",
            Capability::Buy => "buy",
            Capability::Invoice => "invoice",
            Capability::Pay => "pay",
        };
        f.write_str(name)
    }
}

/// Set of enabled capabilities, as a bitset
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    pub const EMPTY: CapabilitySet = CapabilitySet(0);

    pub const fn with(self, capability: Capability) -> Self {
        CapabilitySet(self.0 | capability.bit())
    }

    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |capability| self.contains(*capability))
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors of the capability protocol
///
/// None of these is a normal outcome. Running short of funds or stock is
/// reported through zero results instead; an `ActorError` always means the
/// population was wired wrong.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActorError {
    #[error("{role} {actor} does not support {capability}()")]
    Unsupported {
        actor: ActorId,
        role: Role,
        capability: Capability,
    },

    #[error("Unknown actor {0}")]
    UnknownActor(ActorId),

    #[error("Actor {actor} has no {route} to send to")]
    MissingRoute { actor: ActorId, route: &'static str },

    #[error("Invalid amount {amount}")]
    InvalidAmount { amount: i64 },

    #[error("Actor id {0} registered twice")]
    DuplicateActor(ActorId),
}

impl From<BillError> for ActorError {
    fn from(err: BillError) -> Self {
        match err {
            BillError::NonPositive { amount } => ActorError::InvalidAmount { amount },
        }
    }
}

// ============================================================================
// The Actor trait
// ============================================================================

/// An economic participant
///
/// Implementors are shared between threads as `Arc<dyn Actor>`: their own
/// worker thread runs [`Actor::run_day`] while other threads call the
/// capability operations concurrently.
///
/// # Example
///
/// A test double that only accepts payments:
///
/// ```
/// use health_economy_core::{Actor, ActorError, Capability, DayContext, Ledger, Role};
/// use std::sync::Mutex;
///
/// #[derive(Debug)]
/// struct PiggyBank(Mutex<Ledger>);
///
/// impl Actor for PiggyBank {
///     fn id(&self) -> usize { 0 }
///     fn role(&self) -> Role { Role::Ambulance }
///     fn ledger(&self) -> Ledger { self.0.lock().unwrap().clone() }
///     fn pay(&self, amount: i64) -> Result<(), ActorError> {
///         self.0.lock().unwrap().credit(amount);
///         Ok(())
///     }
///     fn run_day(&self, _ctx: &mut DayContext<'_>) -> Result<(), ActorError> { Ok(()) }
/// }
///
/// let piggy = PiggyBank(Mutex::new(Ledger::new(0)));
/// piggy.pay(5).unwrap();
/// assert_eq!(piggy.funds(), 5);
/// assert!(matches!(
///     piggy.buy(health_economy_core::ItemKind::Pill, 1),
///     Err(ActorError::Unsupported { capability: Capability::Buy, .. })
/// ));
/// ```
pub trait Actor: Send + Sync + fmt::Debug {
    fn id(&self) -> ActorId;

    fn role(&self) -> Role;

    /// Capabilities this actor answers; defaults to its role's set
    fn capabilities(&self) -> CapabilitySet {
        self.role().capabilities()
    }

    /// Consistent copy of the actor's ledger, taken under its lock
    fn ledger(&self) -> Ledger;

    fn funds(&self) -> i64 {
        self.ledger().funds()
    }

    fn employees_paid(&self) -> u64 {
        self.ledger().employees_paid()
    }

    /// Patients currently accounted to this actor (sick, rehab and freed)
    fn patients(&self) -> u64 {
        0
    }

    /// Whether `buy(item, _)` can ever succeed on this actor
    fn sells(&self, _item: ItemKind) -> bool {
        false
    }

    /// Admit up to `qty` units of `item`; returns the admitted count
    fn transfer(&self, _item: ItemKind, _qty: u32) -> Result<u32, ActorError> {
        Err(ActorError::Unsupported {
            actor: self.id(),
            role: self.role(),
            capability: Capability::Transfer,
        })
    }

    /// Sell up to `qty` units of `item`; returns the bill (0 if nothing sold)
    fn buy(&self, _item: ItemKind, _qty: u32) -> Result<i64, ActorError> {
        Err(ActorError::Unsupported {
            actor: self.id(),
            role: self.role(),
            capability: Capability::Buy,
        })
    }

    /// Record that this actor owes `amount` to `beneficiary`
    fn invoice(&self, _amount: i64, _beneficiary: ActorId) -> Result<(), ActorError> {
        Err(ActorError::Unsupported {
            actor: self.id(),
            role: self.role(),
            capability: Capability::Invoice,
        })
    }

    /// Receive `amount`
    fn pay(&self, _amount: i64) -> Result<(), ActorError> {
        Err(ActorError::Unsupported {
            actor: self.id(),
            role: self.role(),
            capability: Capability::Pay,
        })
    }

    /// One day of this actor's role routine
    ///
    /// Must always return: a routine that cannot act skips the day.
    fn run_day(&self, ctx: &mut DayContext<'_>) -> Result<(), ActorError>;
}

// ============================================================================
// Directory and day context
// ============================================================================

/// Lookup table from actor id to actor
///
/// Built once before the first day and read-only afterwards. Actors refer
/// to each other by id and resolve through the directory at call time, so
/// there are no reference cycles between actors.
#[derive(Debug, Default, Clone)]
pub struct Directory {
    actors: BTreeMap<ActorId, Arc<dyn Actor>>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, actor: Arc<dyn Actor>) -> Result<(), ActorError> {
        let id = actor.id();
        if self.actors.contains_key(&id) {
            return Err(ActorError::DuplicateActor(id));
        }
        self.actors.insert(id, actor);
        Ok(())
    }

    pub fn get(&self, id: ActorId) -> Result<&Arc<dyn Actor>, ActorError> {
        self.actors.get(&id).ok_or(ActorError::UnknownActor(id))
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Actors in id order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Actor>> {
        self.actors.values()
    }
}

/// What a role routine gets to work with for one day
pub struct DayContext<'a> {
    /// Index of the day being run (0-based)
    pub day: usize,
    /// Every actor of the population
    pub directory: &'a Directory,
    /// This actor's own generator
    pub rng: &'a mut RngManager,
}

impl<'a> DayContext<'a> {
    pub fn new(day: usize, directory: &'a Directory, rng: &'a mut RngManager) -> Self {
        Self {
            day,
            directory,
            rng,
        }
    }

    /// Uniformly pick one id from a routing table
    pub(crate) fn pick(
        &mut self,
        actor: ActorId,
        route: &'static str,
        ids: &[ActorId],
    ) -> Result<ActorId, ActorError> {
        self.rng
            .choose(ids)
            .copied()
            .ok_or(ActorError::MissingRoute { actor, route })
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Lock an actor's state
///
/// Critical sections are plain arithmetic on owned data, so a poisoned lock
/// still guards consistent state and is recovered.
pub(crate) fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reject negative incoming payments
pub(crate) fn check_payment(amount: i64) -> Result<(), ActorError> {
    if amount < 0 {
        return Err(ActorError::InvalidAmount { amount });
    }
    Ok(())
}

/// A batch of bills whose payment failed part-way
#[derive(Debug)]
pub(crate) struct UndeliveredPayments {
    /// The failed bill and every bill after it, in order
    pub bills: Vec<Bill>,
    pub error: ActorError,
}

impl UndeliveredPayments {
    pub fn total(&self) -> i64 {
        self.bills.iter().map(|bill| bill.amount).sum()
    }
}

/// Credit each settled bill's beneficiary through its `pay` capability
///
/// Must be called without holding the payer's lock. Stops at the first
/// failure and hands the remaining bills back so the payer can re-credit
/// itself and requeue them.
pub(crate) fn deliver_payments(
    directory: &Directory,
    payer: ActorId,
    settled: Vec<Bill>,
) -> Result<i64, UndeliveredPayments> {
    let mut delivered = 0;
    let mut bills = settled.into_iter();
    while let Some(bill) = bills.next() {
        let result = directory
            .get(bill.beneficiary)
            .and_then(|beneficiary| beneficiary.pay(bill.amount));
        if let Err(error) = result {
            let mut undelivered = vec![bill];
            undelivered.extend(bills);
            return Err(UndeliveredPayments {
                bills: undelivered,
                error,
            });
        }
        tracing::debug!(
            payer,
            beneficiary = bill.beneficiary,
            amount = bill.amount,
            "bill paid"
        );
        delivered += bill.amount;
    }
    Ok(delivered)
}
