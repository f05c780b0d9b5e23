//! Scenario: debug-log upload pacing
//!
//! # Invariants under test
//!
//! 1. The first upload waits out the settle delay after the first new line.
//! 2. After a successful upload, new lines are held until the reupload
//!    interval has passed since the previous upload started.
//! 3. A failed upload keeps the log pending and is retried one reupload
//!    interval later.
//! 4. Suppression stops all uploads.
//! 5. Once a line arrives with the host log full, the next upload is the
//!    last one.

use std::cell::{Cell, RefCell};

use anyhow::Result;
use rsy_apputil::{
    AppContext, LogReport, LogSink, LogSnapshot, LogUploadAction, LogUploadOutcome,
};
use rsy_config::AppConfig;
use rsy_gate::ManualClock;

#[derive(Default)]
struct RecordingSink {
    fail: Cell<bool>,
    sent: RefCell<Vec<LogReport>>,
}

impl LogSink for RecordingSink {
    fn put(&self, report: &LogReport) -> Result<()> {
        if self.fail.get() {
            anyhow::bail!("master server unreachable");
        }
        self.sent.borrow_mut().push(report.clone());
        Ok(())
    }
}

fn snapshot(text: &str) -> LogSnapshot {
    LogSnapshot {
        log: text.to_string(),
        session: Some("FreeForAllSession".to_string()),
        activity: None,
        time_s: 12.5,
        ..LogSnapshot::default()
    }
}

fn context() -> (AppContext<ManualClock>, ManualClock) {
    let clock = ManualClock::new(0);
    let mut cfg = AppConfig::default();
    cfg.app.version = "1.4.148".to_string();
    cfg.app.build_number = 20125;
    let ctx = AppContext::from_config(&cfg, clock.clone()).unwrap();
    (ctx, clock)
}

#[test]
fn first_upload_waits_for_settle_delay() {
    let (mut ctx, clock) = context();
    let sink = RecordingSink::default();

    assert_eq!(ctx.pump_log_upload(&sink, || snapshot("x")), LogUploadOutcome::Idle);

    ctx.handle_log_line(false);
    clock.set_ms(2_999);
    assert_eq!(ctx.pump_log_upload(&sink, || snapshot("x")), LogUploadOutcome::Idle);

    clock.set_ms(3_000);
    assert_eq!(
        ctx.pump_log_upload(&sink, || snapshot("ERROR: boom")),
        LogUploadOutcome::Sent
    );
    assert!(ctx.log_upload.log_sent());
    assert!(!ctx.log_upload.has_new());

    let sent = sink.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].log, "ERROR: boom");
    assert_eq!(sent[0].version, "1.4.148");
    assert_eq!(sent[0].build, 20125);
    assert_eq!(sent[0].session, "FreeForAllSession");
    assert_eq!(sent[0].activity, "unavailable");
}

#[test]
fn later_lines_wait_for_reupload_interval() {
    let (mut ctx, clock) = context();
    let sink = RecordingSink::default();

    ctx.handle_log_line(false);
    clock.set_ms(3_000);
    assert_eq!(ctx.pump_log_upload(&sink, || snapshot("a")), LogUploadOutcome::Sent);

    clock.set_ms(10_000);
    ctx.handle_log_line(false);
    clock.set_ms(13_000);
    assert_eq!(ctx.pump_log_upload(&sink, || snapshot("b")), LogUploadOutcome::Idle);
    clock.set_ms(602_999);
    assert_eq!(ctx.pump_log_upload(&sink, || snapshot("b")), LogUploadOutcome::Idle);

    clock.set_ms(603_000);
    assert_eq!(ctx.pump_log_upload(&sink, || snapshot("b")), LogUploadOutcome::Sent);
    assert_eq!(sink.sent.borrow().len(), 2);
}

#[test]
fn failed_upload_is_retried_next_window() {
    let (mut ctx, clock) = context();
    let sink = RecordingSink::default();
    sink.fail.set(true);

    ctx.handle_log_line(false);
    clock.set_ms(3_000);
    assert_eq!(ctx.pump_log_upload(&sink, || snapshot("a")), LogUploadOutcome::Failed);
    assert!(ctx.log_upload.has_new());
    assert!(!ctx.log_upload.log_sent());

    sink.fail.set(false);
    clock.set_ms(4_000);
    assert_eq!(ctx.log_upload.poll(), LogUploadAction::Idle);

    clock.set_ms(603_000);
    assert_eq!(ctx.pump_log_upload(&sink, || snapshot("a")), LogUploadOutcome::Sent);
}

#[test]
fn suppressed_reports_never_upload() {
    let (mut ctx, clock) = context();
    let sink = RecordingSink::default();

    ctx.suppress_debug_reports();
    ctx.handle_log_line(false);
    clock.set_ms(10_000_000);
    assert_eq!(ctx.pump_log_upload(&sink, || snapshot("a")), LogUploadOutcome::Idle);
    assert!(ctx.log_upload.is_suppressed());
    assert!(ctx.log_upload.has_new());
    assert!(sink.sent.borrow().is_empty());
}

#[test]
fn snapshot_is_only_taken_when_uploading() {
    let (mut ctx, _clock) = context();
    let sink = RecordingSink::default();
    let outcome = ctx.pump_log_upload(&sink, || panic!("no upload due"));
    assert_eq!(outcome, LogUploadOutcome::Idle);
}

#[test]
fn full_log_allows_one_last_upload() {
    let (mut ctx, clock) = context();
    let sink = RecordingSink::default();

    ctx.handle_log_line(true);
    clock.set_ms(3_000);
    assert_eq!(ctx.pump_log_upload(&sink, || snapshot("a")), LogUploadOutcome::Sent);
    assert!(ctx.log_upload.is_closed());

    // Well past the reupload interval: no further window is scheduled.
    clock.set_ms(700_000);
    ctx.handle_log_line(false);
    clock.set_ms(800_000);
    assert_eq!(ctx.pump_log_upload(&sink, || snapshot("b")), LogUploadOutcome::Idle);
    assert!(ctx.log_upload.has_new());
    assert_eq!(sink.sent.borrow().len(), 1);
}

#[test]
fn log_filling_mid_run_ends_uploads_after_next_window() {
    let (mut ctx, clock) = context();
    let sink = RecordingSink::default();

    ctx.handle_log_line(false);
    clock.set_ms(3_000);
    assert_eq!(ctx.pump_log_upload(&sink, || snapshot("a")), LogUploadOutcome::Sent);
    assert!(!ctx.log_upload.is_closed());

    clock.set_ms(700_000);
    ctx.handle_log_line(true);
    clock.set_ms(703_000);
    assert_eq!(ctx.pump_log_upload(&sink, || snapshot("b")), LogUploadOutcome::Sent);

    clock.set_ms(1_400_000);
    ctx.handle_log_line(false);
    clock.set_ms(1_500_000);
    assert_eq!(ctx.pump_log_upload(&sink, || snapshot("c")), LogUploadOutcome::Idle);
    assert_eq!(sink.sent.borrow().len(), 2);
}
