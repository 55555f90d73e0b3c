//! Single-flight guard: at most one conversation turn in flight.
//!
//! The flag is set before a turn's first await and cleared when the
//! [`FlightPermit`] drops, so every exit path of a turn (success, error,
//! unwinding panic) releases it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared busy flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    busy: Arc<AtomicBool>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the guard held. Returns `false` if it already was.
    pub fn try_acquire(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Clear the held state. Safe to call when not held.
    pub fn release(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Scoped acquisition: the returned permit releases the guard on drop.
    pub fn enter(&self) -> Option<FlightPermit> {
        if self.try_acquire() {
            Some(FlightPermit {
                guard: self.clone(),
            })
        } else {
            None
        }
    }
}

/// Proof that the current task holds the [`SingleFlight`] guard.
#[derive(Debug)]
#[must_use = "the guard is released as soon as the permit is dropped"]
pub struct FlightPermit {
    guard: SingleFlight,
}

impl Drop for FlightPermit {
    fn drop(&mut self) {
        self.guard.release();
    }
}
