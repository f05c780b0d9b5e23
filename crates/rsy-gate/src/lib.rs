//! rsy-gate
//!
//! Update gate: dirty-flag tracking with retry backoff, minimum update
//! spacing, periodic auto-redirty and an optional exclusion lock.
//!
//! Architectural decisions:
//! - The gate answers "should the caller reconcile now?"; it never performs
//!   the reconciliation itself
//! - All time values are `i64` milliseconds read from an injected [`Clock`]
//! - The gate only *queries* the exclusion lock; callers hold it
//! - Not internally synchronized; see `rsy-runtime` for a shared wrapper

mod clock;
mod gate;
mod lock;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use gate::UpdateGate;
pub use lock::{ExclusionGuard, ExclusionLock};
pub use types::*;
