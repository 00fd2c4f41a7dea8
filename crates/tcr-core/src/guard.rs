//! # Reentrancy Guard
//!
//! Mutating operations on the registry and the arbitrator call out to
//! collaborators (the asset ledger, the arbitrator, registration hooks).
//! A collaborator that calls back into the same component on the same
//! thread before the outer call returns is rejected with
//! [`CoreError::Reentrancy`]. Calls from other threads wait for the outer
//! call to finish, so mutators on one component are serialized.

use std::cell::Cell;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

use crate::error::CoreError;

/// Serializes mutators and rejects same-thread re-entry.
#[derive(Debug)]
pub struct ReentrancyGuard {
    lock: ReentrantMutex<Cell<bool>>,
    component: &'static str,
}

impl ReentrancyGuard {
    /// Create a guard for the named component.
    pub fn new(component: &'static str) -> Self {
        Self {
            lock: ReentrantMutex::new(Cell::new(false)),
            component,
        }
    }

    /// Enter a mutator. The returned token releases the guard on drop.
    pub fn enter(&self) -> Result<Entered<'_>, CoreError> {
        let held = self.lock.lock();
        if held.get() {
            tracing::warn!(component = self.component, "reentrant call rejected");
            return Err(CoreError::Reentrancy {
                component: self.component,
            });
        }
        held.set(true);
        Ok(Entered { held })
    }

    /// Whether the current thread is inside a mutator of this component.
    pub fn is_entered(&self) -> bool {
        self.lock.lock().get()
    }
}

/// Proof of being inside a guarded mutator.
#[must_use = "the guard is released as soon as the token is dropped"]
pub struct Entered<'a> {
    held: ReentrantMutexGuard<'a, Cell<bool>>,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        self.held.set(false);
    }
}

impl std::fmt::Debug for Entered<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entered").finish_non_exhaustive()
    }
}
