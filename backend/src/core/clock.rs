//! Day barrier for the simulation
//!
//! The simulation advances in discrete days. Every actor runs on its own
//! thread and must execute exactly one round of work per day, all of them
//! together. `DayClock` is the shared rendezvous that enforces this.
//!
//! # Protocol
//!
//! ```text
//! coordinator                         participant (xP)
//! -----------                         ----------------
//! start_next_day()  ── opens day d ─▶ worker_wait_day_start()
//!                                     ... one day of work ...
//! wait_all_done()   ◀── P reports ──  worker_end_day()  (report)
//!   closed = d + 1
//!   ── wakes everyone ─────────────▶  worker_end_day()  (returns)
//! ```
//!
//! Both gates are keyed on day numbers rather than permits. A participant
//! that reported day d stays in `worker_end_day` until day d is closed, and
//! `worker_wait_day_start` only lets it through once a later day is opened,
//! so a fast participant can neither run a day twice nor take the turn of a
//! slow one.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Barrier state, guarded by a single mutex
#[derive(Debug, Default)]
struct ClockState {
    /// Days opened by `start_next_day` (the shutdown release included)
    opened: usize,
    /// Days fully completed
    closed: usize,
    /// Done reports collected for the open day
    reported: usize,
}

/// Two-phase day barrier shared by the runner and every actor thread
///
/// # Example
/// ```
/// use health_economy_core::DayClock;
/// use std::sync::Arc;
/// use std::thread;
///
/// let clock = Arc::new(DayClock::new(1));
/// let worker = {
///     let clock = Arc::clone(&clock);
///     thread::spawn(move || {
///         clock.worker_wait_day_start();
///         // ... one day of work ...
///         clock.worker_end_day();
///     })
/// };
///
/// clock.start_next_day();
/// clock.wait_all_done();
/// worker.join().unwrap();
/// assert_eq!(clock.current_day(), 1);
/// ```
#[derive(Debug)]
pub struct DayClock {
    /// Number of threads that take part in every day
    participants: usize,
    state: Mutex<ClockState>,
    changed: Condvar,
}

impl DayClock {
    /// Create a clock for a fixed number of participants
    ///
    /// # Panics
    /// Panics if `participants` is zero: such a barrier could never close.
    pub fn new(participants: usize) -> Self {
        assert!(participants > 0, "participants must be positive");
        Self {
            participants,
            state: Mutex::new(ClockState::default()),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ClockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_until<'a, F>(
        &self,
        guard: MutexGuard<'a, ClockState>,
        mut ready: F,
    ) -> MutexGuard<'a, ClockState>
    where
        F: FnMut(&ClockState) -> bool,
    {
        self.changed
            .wait_while(guard, |state| !ready(state))
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Release every participant into the next day
    ///
    /// Also used once more at shutdown so that parked participants wake up
    /// and observe their stop flag. Opening a day while the previous one is
    /// still running is a no-op.
    pub fn start_next_day(&self) {
        let mut state = self.lock();
        if state.opened == state.closed {
            state.opened += 1;
            state.reported = 0;
            self.changed.notify_all();
        }
    }

    /// Block until every participant reported the open day done
    ///
    /// Advances the day counter, then lets the participants leave
    /// `worker_end_day`.
    pub fn wait_all_done(&self) {
        let participants = self.participants;
        let mut state = self.wait_until(self.lock(), |state| state.reported >= participants);
        state.reported = 0;
        state.closed += 1;
        self.changed.notify_all();
    }

    /// Participant side: block until the coordinator opens a day
    pub fn worker_wait_day_start(&self) {
        let _open = self.wait_until(self.lock(), |state| state.opened > state.closed);
    }

    /// Participant side: report the day done and wait until it is closed
    pub fn worker_end_day(&self) {
        let mut state = self.lock();
        let day = state.closed;
        state.reported += 1;
        self.changed.notify_all();
        let _closed = self.wait_until(state, |state| state.closed > day);
    }

    /// Number of days fully completed
    pub fn current_day(&self) -> usize {
        self.lock().closed
    }

    /// Done reports collected for the open day
    pub fn reported(&self) -> usize {
        self.lock().reported
    }

    pub fn participants(&self) -> usize {
        self.participants
    }
}
