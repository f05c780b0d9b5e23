//! Gate timeline replay on a manual clock.

use anyhow::{bail, Context, Result};
use rsy_gate::{ExclusionGuard, GatePolicy, ManualClock, UpdateGate};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateOp {
    Dirty,
    Clean,
    Poll,
    Lock,
    Unlock,
}

impl GateOp {
    fn as_str(&self) -> &'static str {
        match self {
            GateOp::Dirty => "dirty",
            GateOp::Clean => "clean",
            GateOp::Poll => "poll",
            GateOp::Lock => "lock",
            GateOp::Unlock => "unlock",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GateEvent {
    pub t_ms: i64,
    pub op: GateOp,
}

/// Parse `"0:dirty,1000:poll"`. Times must be non-decreasing.
pub fn parse_events(raw: &str) -> Result<Vec<GateEvent>> {
    let mut out = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (t, op) = item
            .split_once(':')
            .with_context(|| format!("event '{item}' must look like <t_ms>:<op>"))?;
        let t_ms: i64 = t
            .trim()
            .parse()
            .with_context(|| format!("event '{item}': bad time"))?;
        let op = match op.trim().to_ascii_lowercase().as_str() {
            "dirty" => GateOp::Dirty,
            "clean" => GateOp::Clean,
            "poll" => GateOp::Poll,
            "lock" => GateOp::Lock,
            "unlock" => GateOp::Unlock,
            other => bail!(
                "event '{item}': unknown op '{other}'. expected one of: dirty | clean | poll | lock | unlock"
            ),
        };
        if let Some(prev) = out.last().map(|e: &GateEvent| e.t_ms) {
            if t_ms < prev {
                bail!("event '{item}': time went backwards ({t_ms} < {prev})");
            }
        }
        out.push(GateEvent { t_ms, op });
    }
    if out.is_empty() {
        bail!("no events given");
    }
    Ok(out)
}

/// Replay `events` against a fresh gate built at t=0. Returns one line per
/// event.
pub fn run_trace(
    policy: GatePolicy,
    initially_dirty: bool,
    events: &[GateEvent],
) -> Result<Vec<String>> {
    let clock = ManualClock::new(0);
    let mut gate = UpdateGate::with_clock(initially_dirty, policy, clock.clone())?;
    let mut held: Option<ExclusionGuard> = None;
    let mut lines = Vec::with_capacity(events.len());

    for ev in events {
        clock.set_ms(ev.t_ms);
        let mut extra = String::new();
        match ev.op {
            GateOp::Dirty => gate.set_dirty(true),
            GateOp::Clean => gate.set_dirty(false),
            GateOp::Poll => {
                let fire = gate.should_update();
                extra = format!(" should_update={fire}");
            }
            GateOp::Lock => {
                let lock = gate
                    .exclusion_lock()
                    .context("gate has no exclusion lock (use_exclusion_lock: false)")?;
                if held.is_some() {
                    bail!("t_ms={}: lock already held", ev.t_ms);
                }
                held = lock.try_acquire();
            }
            GateOp::Unlock => {
                if held.take().is_none() {
                    bail!("t_ms={}: unlock without lock", ev.t_ms);
                }
            }
        }
        lines.push(format!(
            "t_ms={} op={}{} dirty={} next_update_ms={}",
            ev.t_ms,
            ev.op.as_str(),
            extra,
            gate.is_dirty(),
            opt_ms(gate.next_update_time_ms()),
        ));
    }
    Ok(lines)
}

fn opt_ms(v: Option<i64>) -> String {
    v.map(|ms| ms.to_string()).unwrap_or_else(|| "-".to_string())
}
