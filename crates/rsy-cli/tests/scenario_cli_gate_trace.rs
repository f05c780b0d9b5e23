use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn base_yaml() -> String {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../config/defaults/base.yaml")
        .to_string_lossy()
        .to_string()
}

/// profile_sync: retry 5s, min interval 30s, exclusion lock on.
#[test]
fn gate_trace_honours_min_interval_and_lock() -> anyhow::Result<()> {
    let base = base_yaml();
    Command::cargo_bin("rsy")?
        .args([
            "gate-trace",
            "--config",
            base.as_str(),
            "--gate",
            "profile_sync",
            "--events",
            "0:dirty,0:poll,0:clean,1000:dirty,1000:poll,30000:lock,30000:poll,30500:unlock,30500:poll",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "t_ms=0 op=poll should_update=true dirty=true next_update_ms=5000",
        ))
        .stdout(predicate::str::contains(
            "t_ms=1000 op=poll should_update=false dirty=true next_update_ms=30000",
        ))
        .stdout(predicate::str::contains(
            "t_ms=30000 op=poll should_update=false",
        ))
        .stdout(predicate::str::contains(
            "t_ms=30500 op=poll should_update=true dirty=true next_update_ms=35500",
        ));
    Ok(())
}

#[test]
fn gate_trace_auto_dirty_refires() -> anyhow::Result<()> {
    let base = base_yaml();
    Command::cargo_bin("rsy")?
        .args([
            "gate-trace",
            "--config",
            base.as_str(),
            "--gate",
            "friends",
            "--initially-dirty",
            "--events",
            "0:poll,100:clean,200000:poll,300100:poll",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "t_ms=200000 op=poll should_update=false dirty=false",
        ))
        .stdout(predicate::str::contains(
            "t_ms=300100 op=poll should_update=true dirty=true",
        ));
    Ok(())
}

#[test]
fn gate_trace_unknown_gate_fails() -> anyhow::Result<()> {
    let base = base_yaml();
    Command::cargo_bin("rsy")?
        .args([
            "gate-trace",
            "--config",
            base.as_str(),
            "--gate",
            "nope",
            "--events",
            "0:poll",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config missing gates.nope"));
    Ok(())
}
