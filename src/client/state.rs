//! State shared between the client facade and its workers

use super::FetchCallback;
use crate::observability::Metrics;
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// A caller's fetch intent: key plus completion callback.
pub(crate) struct Request {
    pub key: String,
    pub on_complete: FetchCallback,
}

/// Queue state guarded by the client mutex.
pub(crate) struct State {
    /// Not-yet-started requests, in submission order.
    pub queue: VecDeque<Request>,
    /// Key of the request each worker slot is currently transferring.
    pub active: Vec<Option<String>>,
    pub keep_running: bool,
}

/// Everything a worker needs to share with the facade and its siblings.
///
/// The mutex covers the pending queue and the active-slot keys. The per-slot
/// cancellation flags live outside it so a transfer can poll its own flag
/// without taking the lock.
pub(crate) struct Shared {
    state: Mutex<State>,
    pub work_available: Condvar,
    pub canceled: Vec<AtomicBool>,
    pub metrics: Metrics,
}

impl Shared {
    pub fn new(worker_count: usize) -> Self {
        Self {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                active: vec![None; worker_count],
                keep_running: true,
            }),
            work_available: Condvar::new(),
            canceled: (0..worker_count).map(|_| AtomicBool::new(false)).collect(),
            metrics: Metrics::new(),
        }
    }

    /// Lock the queue state. A poisoned lock must not strand shutdown or the
    /// remaining callbacks, so the guard is recovered from it.
    pub fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block on the condition variable until signaled.
    pub fn wait<'a>(&'a self, guard: MutexGuard<'a, State>) -> MutexGuard<'a, State> {
        self.work_available
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }
}
