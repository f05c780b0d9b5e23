//! Exclusion lock shared between a gate and the code that reconciles.
//!
//! Backed by a single-permit [`Semaphore`] so the gate can ask "is anyone
//! holding this?" without taking the lock itself.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Cloneable handle to a reconciliation lock.
///
/// The gate only calls [`is_locked`][ExclusionLock::is_locked]. Callers take
/// an [`ExclusionGuard`] around their reconciliation work; dropping the
/// guard releases the lock.
#[derive(Clone, Debug)]
pub struct ExclusionLock {
    permits: Arc<Semaphore>,
}

/// Proof that the holder owns the exclusion lock. Released on drop.
#[derive(Debug)]
pub struct ExclusionGuard {
    _permit: OwnedSemaphorePermit,
}

impl Default for ExclusionLock {
    fn default() -> Self {
        Self::new()
    }
}

impl ExclusionLock {
    pub fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(1)),
        }
    }

    /// `true` while some caller holds an [`ExclusionGuard`].
    pub fn is_locked(&self) -> bool {
        self.permits.available_permits() == 0
    }

    /// Take the lock if it is free.
    pub fn try_acquire(&self) -> Option<ExclusionGuard> {
        Arc::clone(&self.permits)
            .try_acquire_owned()
            .ok()
            .map(|permit| ExclusionGuard { _permit: permit })
    }

    /// Wait until the lock is free, then take it.
    pub async fn acquire(&self) -> ExclusionGuard {
        // The semaphore is never closed, so acquisition cannot fail.
        match Arc::clone(&self.permits).acquire_owned().await {
            Ok(permit) => ExclusionGuard { _permit: permit },
            Err(_) => unreachable!("exclusion semaphore closed"),
        }
    }
}
