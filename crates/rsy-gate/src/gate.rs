//! Update gate state machine.
//!
//! # Invariants
//!
//! - **Clean means unscheduled**: while `dirty == false`,
//!   `next_update_time_ms` is `None`.
//! - **Fresh dirt is eligible now**: a clean→dirty edge schedules the next
//!   attempt at `now`, pushed out to `last_update + min_update_interval` when
//!   that floor lies later.
//! - **Clean schedules auto-redirty**: a dirty→clean edge sets
//!   `next_auto_dirty = now + auto_dirty_interval` when configured.
//! - **No attempt while clean or locked**: `should_update` returns `false`
//!   when clean or while the exclusion lock is held.
//! - **At most one attempt per retry window**: after `should_update` returns
//!   `true`, it returns `false` for `retry_interval` unless the caller
//!   re-dirties the gate through a clean→dirty edge.
//!
//! Auto-redirty is evaluated only when `should_update` is polled. A gate
//! that is never polled never redirties.

use tracing::debug;

use crate::{Clock, ExclusionLock, GateError, GatePolicy, SystemClock};

/// Tracks whether a resource is out of sync and regulates reconcile attempts.
///
/// Usage: call [`set_dirty(true)`][UpdateGate::set_dirty] when the resource
/// needs work, poll [`should_update`][UpdateGate::should_update] to decide
/// when to attempt it, and call `set_dirty(false)` after a successful
/// reconciliation. A failed attempt needs no action; the retry interval
/// governs the next one.
#[derive(Debug)]
pub struct UpdateGate<C: Clock = SystemClock> {
    clock: C,
    policy: GatePolicy,
    dirty: bool,
    next_update_time_ms: Option<i64>,
    last_update_time_ms: Option<i64>,
    next_auto_dirty_time_ms: Option<i64>,
    lock: Option<ExclusionLock>,
}

impl UpdateGate<SystemClock> {
    /// Build a gate on the wall clock.
    pub fn new(initial_dirty: bool, policy: GatePolicy) -> Result<Self, GateError> {
        Self::with_clock(initial_dirty, policy, SystemClock)
    }
}

impl<C: Clock> UpdateGate<C> {
    /// Build a gate reading time from `clock`.
    ///
    /// Fails with [`GateError::InvalidConfiguration`] if any policy duration
    /// is negative.
    pub fn with_clock(initial_dirty: bool, policy: GatePolicy, clock: C) -> Result<Self, GateError> {
        policy.validate()?;

        let now = clock.now_ms();
        let next_update_time_ms = initial_dirty.then_some(now);
        let next_auto_dirty_time_ms = match policy.auto_dirty_interval_ms {
            Some(interval) if !initial_dirty => Some(now.saturating_add(interval)),
            _ => None,
        };
        let lock = policy.use_exclusion_lock.then(ExclusionLock::new);

        Ok(Self {
            clock,
            policy,
            dirty: initial_dirty,
            next_update_time_ms,
            last_update_time_ms: None,
            next_auto_dirty_time_ms,
            lock,
        })
    }

    // -----------------------------------------------------------------------
    // Dirty state
    // -----------------------------------------------------------------------

    /// `true` if the resource is known to be out of sync.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the resource dirty or clean.
    ///
    /// Scheduling bookkeeping happens only on an actual edge; setting the
    /// current value again is a no-op.
    pub fn set_dirty(&mut self, value: bool) {
        match (self.dirty, value) {
            (false, true) => {
                let now = self.clock.now_ms();
                let floor = match (self.policy.min_update_interval_ms, self.last_update_time_ms) {
                    (Some(min), Some(last)) => last.saturating_add(min),
                    _ => now,
                };
                self.next_update_time_ms = Some(now.max(floor));
            }
            (true, false) => {
                self.next_update_time_ms = None;
                if let Some(interval) = self.policy.auto_dirty_interval_ms {
                    self.next_auto_dirty_time_ms =
                        Some(self.clock.now_ms().saturating_add(interval));
                }
            }
            _ => {}
        }
        self.dirty = value;
    }

    // -----------------------------------------------------------------------
    // Polling
    // -----------------------------------------------------------------------

    /// Whether an attempt to reconcile should be made right now.
    ///
    /// This is a mutating read: an elapsed auto-dirty deadline flips the gate
    /// dirty first, and a `true` result starts a new retry window
    /// (`next = now + retry_interval`, `last = now`).
    pub fn should_update(&mut self) -> bool {
        let now = self.clock.now_ms();

        if let Some(at) = self.next_auto_dirty_time_ms {
            if now >= at {
                debug!(due_ms = at, now_ms = now, "update gate auto-dirtied");
                self.set_dirty(true);
                self.next_auto_dirty_time_ms = None;
            }
        }

        if !self.dirty {
            return false;
        }
        if self.lock.as_ref().is_some_and(ExclusionLock::is_locked) {
            return false;
        }
        match self.next_update_time_ms {
            Some(next) if now < next => false,
            _ => {
                self.next_update_time_ms = Some(now.saturating_add(self.policy.retry_interval_ms));
                self.last_update_time_ms = Some(now);
                true
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The exclusion lock, when the policy enables one.
    pub fn exclusion_lock(&self) -> Option<&ExclusionLock> {
        self.lock.as_ref()
    }

    pub fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    /// Earliest time `should_update` may next return `true`. `None` while clean.
    pub fn next_update_time_ms(&self) -> Option<i64> {
        self.next_update_time_ms
    }

    /// Last time `should_update` returned `true`.
    pub fn last_update_time_ms(&self) -> Option<i64> {
        self.last_update_time_ms
    }

    /// Pending auto-redirty deadline, if any.
    pub fn next_auto_dirty_time_ms(&self) -> Option<i64> {
        self.next_auto_dirty_time_ms
    }
}
