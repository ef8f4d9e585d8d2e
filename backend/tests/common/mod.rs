//! Shared test doubles and helpers

#![allow(dead_code)]

use health_economy_core::{
    Actor, ActorError, ActorId, DayContext, Directory, ItemKind, Ledger, RngManager, Role,
};
use std::sync::{Arc, Mutex};

/// Build a directory from a list of actors
pub fn directory(actors: Vec<Arc<dyn Actor>>) -> Directory {
    let mut directory = Directory::new();
    for actor in actors {
        directory.insert(actor).unwrap();
    }
    directory
}

/// Run `f` with a fresh day context over `directory`
pub fn with_ctx<R>(directory: &Directory, seed: u64, f: impl FnOnce(&mut DayContext<'_>) -> R) -> R {
    let mut rng = RngManager::new(seed);
    let mut ctx = DayContext::new(0, directory, &mut rng);
    f(&mut ctx)
}

/// Recording double that answers every capability
///
/// `transfer` admits up to `admit_limit` units per call (unbounded when
/// `None`); `invoice` and `pay` are recorded.
#[derive(Debug)]
pub struct Recorder {
    id: ActorId,
    role: Role,
    admit_limit: Option<u32>,
    ledger: Mutex<Ledger>,
    transfers: Mutex<Vec<(ItemKind, u32)>>,
    invoices: Mutex<Vec<(i64, ActorId)>>,
}

impl Recorder {
    pub fn new(id: ActorId, role: Role) -> Self {
        Self {
            id,
            role,
            admit_limit: None,
            ledger: Mutex::new(Ledger::new(0)),
            transfers: Mutex::new(Vec::new()),
            invoices: Mutex::new(Vec::new()),
        }
    }

    pub fn admitting(mut self, limit: u32) -> Self {
        self.admit_limit = Some(limit);
        self
    }

    pub fn transfers(&self) -> Vec<(ItemKind, u32)> {
        self.transfers.lock().unwrap().clone()
    }

    pub fn invoices(&self) -> Vec<(i64, ActorId)> {
        self.invoices.lock().unwrap().clone()
    }

    pub fn invoiced_total(&self) -> i64 {
        self.invoices().iter().map(|(amount, _)| amount).sum()
    }
}

impl Actor for Recorder {
    fn id(&self) -> ActorId {
        self.id
    }

    fn role(&self) -> Role {
        self.role
    }

    fn ledger(&self) -> Ledger {
        self.ledger.lock().unwrap().clone()
    }

    fn transfer(&self, item: ItemKind, qty: u32) -> Result<u32, ActorError> {
        let admitted = self.admit_limit.map_or(qty, |limit| qty.min(limit));
        self.transfers.lock().unwrap().push((item, qty));
        self.ledger.lock().unwrap().add_stock(item, admitted);
        Ok(admitted)
    }

    fn invoice(&self, amount: i64, beneficiary: ActorId) -> Result<(), ActorError> {
        self.invoices.lock().unwrap().push((amount, beneficiary));
        Ok(())
    }

    fn pay(&self, amount: i64) -> Result<(), ActorError> {
        self.ledger.lock().unwrap().credit(amount);
        Ok(())
    }

    fn run_day(&self, _ctx: &mut DayContext<'_>) -> Result<(), ActorError> {
        Ok(())
    }
}
