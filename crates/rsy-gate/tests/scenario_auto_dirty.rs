//! Scenario: periodic auto-redirty
//!
//! # Invariants under test
//!
//! 1. A gate clean since `t0` with `auto_dirty_interval = A` fires exactly
//!    once when polled at or after `t0 + A`, with no explicit `set_dirty`.
//! 2. Cleaning the gate again re-arms the deadline from the new clean time.
//! 3. Auto-redirty happens only through polling.

use rsy_gate::{GatePolicy, ManualClock, UpdateGate};

fn policy() -> GatePolicy {
    GatePolicy::default()
        .with_retry_interval_ms(5_000)
        .with_auto_dirty_interval_ms(60_000)
}

#[test]
fn clean_gate_redirties_after_interval() {
    let clock = ManualClock::new(0);
    let mut gate = UpdateGate::with_clock(false, policy(), clock.clone()).unwrap();

    clock.set_ms(59_999);
    assert!(!gate.should_update());
    assert!(!gate.is_dirty());

    clock.set_ms(61_000);
    assert!(gate.should_update(), "auto-dirty must fire on the first poll past the deadline");
    assert!(gate.is_dirty());
    assert_eq!(gate.next_auto_dirty_time_ms(), None);
    assert!(!gate.should_update(), "exactly once per window");
}

#[test]
fn cleaning_rearms_deadline() {
    let clock = ManualClock::new(0);
    let mut gate = UpdateGate::with_clock(true, policy(), clock.clone()).unwrap();
    assert_eq!(gate.next_auto_dirty_time_ms(), None);

    assert!(gate.should_update());
    clock.set_ms(2_000);
    gate.set_dirty(false);
    assert_eq!(gate.next_auto_dirty_time_ms(), Some(62_000));

    clock.set_ms(62_000);
    assert!(gate.should_update());
}

#[test]
fn unpolled_gate_stays_clean() {
    let clock = ManualClock::new(0);
    let gate = UpdateGate::with_clock(false, policy(), clock.clone()).unwrap();
    clock.set_ms(10 * 60_000);
    assert!(!gate.is_dirty(), "auto-dirty is a side effect of should_update only");
}
