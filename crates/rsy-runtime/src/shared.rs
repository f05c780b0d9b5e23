//! Shared runtime handle for an update gate.
//!
//! The gate itself is not synchronized; this wraps it in a mutex that is
//! only held for the duration of a single gate call, never across a
//! reconcile attempt.

use std::sync::{Arc, Mutex, MutexGuard};

use rsy_gate::{Clock, ExclusionLock, SystemClock, UpdateGate};

/// Cloneable (Arc) handle to one gate.
pub struct SharedGate<C: Clock = SystemClock> {
    inner: Arc<Mutex<UpdateGate<C>>>,
}

impl<C: Clock> Clone for SharedGate<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Clock> SharedGate<C> {
    pub fn new(gate: UpdateGate<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(gate)),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().is_dirty()
    }

    pub fn set_dirty(&self, value: bool) {
        self.lock().set_dirty(value);
    }

    /// See [`UpdateGate::should_update`]; this is a mutating read.
    pub fn should_update(&self) -> bool {
        self.lock().should_update()
    }

    pub fn exclusion_lock(&self) -> Option<ExclusionLock> {
        self.lock().exclusion_lock().cloned()
    }

    pub fn last_update_time_ms(&self) -> Option<i64> {
        self.lock().last_update_time_ms()
    }

    /// Gate calls cannot panic mid-update, so a poisoned mutex still holds a
    /// consistent gate.
    fn lock(&self) -> MutexGuard<'_, UpdateGate<C>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
