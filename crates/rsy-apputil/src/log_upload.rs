//! Debug-log upload pacing.
//!
//! # Invariants
//!
//! - **Settle before sending**: the first new log line after a clean period
//!   opens a settle window; no upload happens until it has elapsed.
//! - **One upload per window**: uploads are spaced by the reupload interval,
//!   whether the previous one succeeded or failed.
//! - **Suppression is final**: once suppressed, the scheduler never asks for
//!   an upload again in this process.
//! - **Success clears, failure retries**: a successful upload marks the log
//!   sent and the gate clean; a failure leaves it dirty for the next window.
//! - **Full log is final**: once a line arrives while the host log buffer is
//!   full, the next upload is the last one this process makes.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rsy_config::{AppSection, LogUploadConfig};
use rsy_gate::{Clock, GateError, GatePolicy, SystemClock, UpdateGate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Report payload
// ---------------------------------------------------------------------------

/// Host facts captured at upload time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LogSnapshot {
    pub log: String,
    /// Foreground session name; `None` when it could not be determined.
    pub session: Option<String>,
    pub activity: Option<String>,
    pub user_ran_commands: bool,
    pub user_modded: bool,
    /// Real time since launch, seconds.
    pub time_s: f64,
}

/// Wire format of an uploaded debug log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogReport {
    pub log: String,
    pub version: String,
    pub build: u32,
    pub user_agent_string: String,
    pub session: String,
    pub activity: String,
    pub fatal: u8,
    pub user_ran_commands: bool,
    pub time: f64,
    pub user_modded: bool,
}

const UNAVAILABLE: &str = "unavailable";

impl LogReport {
    pub fn new(app: &AppSection, snap: LogSnapshot) -> Self {
        Self {
            log: snap.log,
            version: app.version.clone(),
            build: app.build_number,
            user_agent_string: app.user_agent.clone(),
            session: snap.session.unwrap_or_else(|| UNAVAILABLE.to_string()),
            activity: snap.activity.unwrap_or_else(|| UNAVAILABLE.to_string()),
            fatal: 0,
            user_ran_commands: snap.user_ran_commands,
            time: snap.time_s,
            user_modded: snap.user_modded,
        }
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Destination for log reports. `Ok` means the report was accepted.
pub trait LogSink {
    fn put(&self, report: &LogReport) -> Result<()>;
}

/// Appends one JSON line per report.
#[derive(Clone, Debug)]
pub struct JsonlFileSink {
    path: PathBuf,
}

impl JsonlFileSink {
    /// Creates parent directories of `path` if needed.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create_dir_all {:?}", parent))?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for JsonlFileSink {
    fn put(&self, report: &LogReport) -> Result<()> {
        let line = serde_json::to_string(report).context("serialize log report")?;
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open log sink {:?}", self.path))?;
        writeln!(f, "{line}").with_context(|| format!("write log sink {:?}", self.path))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// What the caller should do this poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogUploadAction {
    Idle,
    Upload,
}

/// Result of one [`LogUploadScheduler::pump`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogUploadOutcome {
    Idle,
    Sent,
    Failed,
}

pub struct LogUploadScheduler<C: Clock + Clone = SystemClock> {
    clock: C,
    gate: UpdateGate<C>,
    settle_delay_ms: i64,
    settle_until_ms: Option<i64>,
    suppressed: bool,
    log_sent: bool,
    log_full: bool,
    final_upload_taken: bool,
}

impl<C: Clock + Clone> LogUploadScheduler<C> {
    pub fn new(cfg: &LogUploadConfig, clock: C) -> Result<Self, GateError> {
        if cfg.settle_delay_ms < 0 {
            return Err(GateError::InvalidConfiguration {
                field: "settle_delay_ms",
                value_ms: cfg.settle_delay_ms,
            });
        }
        if cfg.reupload_interval_ms < 0 {
            return Err(GateError::InvalidConfiguration {
                field: "reupload_interval_ms",
                value_ms: cfg.reupload_interval_ms,
            });
        }
        let policy = GatePolicy::default()
            .with_retry_interval_ms(cfg.reupload_interval_ms)
            .with_min_update_interval_ms(cfg.reupload_interval_ms);
        let gate = UpdateGate::with_clock(false, policy, clock.clone())?;
        Ok(Self {
            clock,
            gate,
            settle_delay_ms: cfg.settle_delay_ms,
            settle_until_ms: None,
            suppressed: false,
            log_sent: false,
            log_full: false,
            final_upload_taken: false,
        })
    }

    /// Record that new log content was printed.
    ///
    /// `log_full` is the host's "log buffer is full" flag at print time. It
    /// latches: no re-upload is scheduled after the next one.
    pub fn note_log_line(&mut self, log_full: bool) {
        self.log_full |= log_full;
        if !self.gate.is_dirty() {
            self.settle_until_ms = Some(self.clock.now_ms().saturating_add(self.settle_delay_ms));
        }
        self.gate.set_dirty(true);
    }

    /// Unsent log content exists.
    pub fn has_new(&self) -> bool {
        self.gate.is_dirty()
    }

    /// Decide whether to upload now. An `Upload` result consumes the current
    /// window; report the outcome with [`record_upload_result`][Self::record_upload_result].
    pub fn poll(&mut self) -> LogUploadAction {
        if self.suppressed || self.final_upload_taken {
            return LogUploadAction::Idle;
        }
        if let Some(until) = self.settle_until_ms {
            if self.clock.now_ms() < until {
                return LogUploadAction::Idle;
            }
        }
        if self.gate.should_update() {
            self.settle_until_ms = None;
            if self.log_full {
                self.final_upload_taken = true;
            }
            return LogUploadAction::Upload;
        }
        LogUploadAction::Idle
    }

    pub fn record_upload_result(&mut self, ok: bool) {
        if ok {
            self.gate.set_dirty(false);
            self.log_sent = true;
        }
    }

    /// Poll, and on `Upload` build a report and hand it to `sink`.
    ///
    /// `snapshot` is only called when an upload actually happens.
    pub fn pump(
        &mut self,
        app: &AppSection,
        sink: &dyn LogSink,
        snapshot: impl FnOnce() -> LogSnapshot,
    ) -> LogUploadOutcome {
        if self.poll() == LogUploadAction::Idle {
            return LogUploadOutcome::Idle;
        }
        let report = LogReport::new(app, snapshot());
        match sink.put(&report) {
            Ok(()) => {
                self.record_upload_result(true);
                info!(bytes = report.log.len(), "debug log uploaded");
                LogUploadOutcome::Sent
            }
            Err(err) => {
                self.record_upload_result(false);
                let error = format!("{err:#}");
                warn!(%error, "debug log upload failed");
                LogUploadOutcome::Failed
            }
        }
    }

    /// Stop uploading for the rest of the process (development builds).
    pub fn suppress(&mut self) {
        if !self.suppressed {
            info!("suppressing debug reports");
        }
        self.suppressed = true;
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// A full log has been seen and its last upload already taken.
    pub fn is_closed(&self) -> bool {
        self.final_upload_taken
    }

    /// At least one upload has succeeded.
    pub fn log_sent(&self) -> bool {
        self.log_sent
    }
}

// ---------------------------------------------------------------------------
// Leftover log from a previous run
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeftoverOutcome {
    NoFile,
    /// Uploaded and deleted.
    Submitted,
    /// Upload failed; file kept for next launch.
    SubmitFailed,
    /// User opted out of debug info; deleted unsent.
    Discarded,
}

/// Deal with a report a previous run wrote but never uploaded.
pub fn handle_leftover_log_file(
    path: &Path,
    submit: bool,
    sink: &dyn LogSink,
) -> Result<LeftoverOutcome> {
    if !path.exists() {
        return Ok(LeftoverOutcome::NoFile);
    }

    if !submit {
        fs::remove_file(path).with_context(|| format!("remove leftover log {:?}", path))?;
        return Ok(LeftoverOutcome::Discarded);
    }

    let raw = fs::read_to_string(path).with_context(|| format!("read leftover log {:?}", path))?;
    let report: LogReport = serde_json::from_str(&raw)
        .with_context(|| format!("leftover log {:?} is not a log report", path))?;

    match sink.put(&report) {
        Ok(()) => {
            fs::remove_file(path).with_context(|| format!("remove leftover log {:?}", path))?;
            info!(path = %path.display(), "leftover debug log submitted");
            Ok(LeftoverOutcome::Submitted)
        }
        Err(err) => {
            let error = format!("{err:#}");
            warn!(path = %path.display(), %error, "leftover debug log upload failed; keeping file");
            Ok(LeftoverOutcome::SubmitFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsy_gate::ManualClock;

    fn cfg() -> LogUploadConfig {
        LogUploadConfig {
            settle_delay_ms: 3_000,
            reupload_interval_ms: 600_000,
            leftover_path: None,
        }
    }

    #[test]
    fn report_fills_unavailable_names() {
        let report = LogReport::new(&AppSection::default(), LogSnapshot::default());
        assert_eq!(report.session, "unavailable");
        assert_eq!(report.activity, "unavailable");
        assert_eq!(report.fatal, 0);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("userAgentString").is_some());
        assert!(json.get("userRanCommands").is_some());
    }

    #[test]
    fn negative_settle_delay_is_rejected() {
        let mut c = cfg();
        c.settle_delay_ms = -1;
        assert!(LogUploadScheduler::new(&c, ManualClock::new(0)).is_err());
    }

    #[test]
    fn negative_reupload_interval_names_its_own_key() {
        let mut c = cfg();
        c.reupload_interval_ms = -5;
        let err = LogUploadScheduler::new(&c, ManualClock::new(0))
            .err()
            .expect("rejected");
        assert_eq!(
            err,
            GateError::InvalidConfiguration {
                field: "reupload_interval_ms",
                value_ms: -5,
            }
        );
    }

    #[test]
    fn settle_window_only_opens_on_fresh_dirt() {
        let clock = ManualClock::new(0);
        let mut s = LogUploadScheduler::new(&cfg(), clock.clone()).unwrap();
        s.note_log_line(false);
        clock.set_ms(2_000);
        s.note_log_line(false);
        clock.set_ms(3_000);
        assert_eq!(s.poll(), LogUploadAction::Upload);
    }
}
