use std::path::Path;

use anyhow::Result;
use rsy_apputil::{handle_leftover_log_file, JsonlFileSink, LeftoverOutcome};

pub fn run_log_leftover(path: &str, sink_path: &str, submit: bool) -> Result<&'static str> {
    let sink = JsonlFileSink::new(sink_path)?;
    let outcome = handle_leftover_log_file(Path::new(path), submit, &sink)?;
    Ok(match outcome {
        LeftoverOutcome::NoFile => "NO_FILE",
        LeftoverOutcome::Submitted => "SUBMITTED",
        LeftoverOutcome::SubmitFailed => "SUBMIT_FAILED",
        LeftoverOutcome::Discarded => "DISCARDED",
    })
}
