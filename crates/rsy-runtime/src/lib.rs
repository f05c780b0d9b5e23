//! rsy-runtime
//!
//! Multi-task wiring for update gates.
//!
//! [`SharedGate`] makes one gate pollable from several tasks;
//! [`spawn_gate_poller`] is the caller-driven polling loop that turns
//! `should_update` results into reconcile attempts.

mod poller;
mod shared;

pub use poller::{spawn_gate_poller, PollerStats};
pub use shared::SharedGate;
