//! Explicit application context.
//!
//! Holds the mutable process-level state the utilities share: identity,
//! debug-report settings, log-upload pacing, ad pacing and the live-object
//! audit latch. Built once from config and passed to whoever needs it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rsy_config::{AppConfig, AppSection};
use rsy_gate::{Clock, SystemClock};

use crate::{
    handle_leftover_log_file, is_browser_likely_available, AdPacer, LeftoverOutcome,
    LiveObjectAudit, LogSink, LogSnapshot, LogUploadOutcome, LogUploadScheduler,
};

pub struct AppContext<C: Clock + Clone = SystemClock> {
    pub app: AppSection,
    pub log_upload: LogUploadScheduler<C>,
    pub ads: AdPacer,
    pub live_objects: LiveObjectAudit,
    /// Where a previous run leaves its unsent report (`log_upload.leftover_path`).
    pub leftover_path: Option<PathBuf>,
}

impl<C: Clock + Clone> AppContext<C> {
    pub fn from_config(cfg: &AppConfig, clock: C) -> Result<Self> {
        let log_upload =
            LogUploadScheduler::new(&cfg.log_upload, clock).context("log_upload config invalid")?;
        Ok(Self {
            app: cfg.app.clone(),
            log_upload,
            ads: AdPacer::new(cfg.ads.clone()),
            live_objects: LiveObjectAudit::new(),
            leftover_path: cfg.log_upload.leftover_path.as_ref().map(PathBuf::from),
        })
    }

    /// Called for every debug log print, with the host's log-full flag.
    pub fn handle_log_line(&mut self, log_full: bool) {
        self.log_upload.note_log_line(log_full);
    }

    /// Drive log upload; call periodically.
    pub fn pump_log_upload(
        &mut self,
        sink: &dyn LogSink,
        snapshot: impl FnOnce() -> LogSnapshot,
    ) -> LogUploadOutcome {
        self.log_upload.pump(&self.app, sink, snapshot)
    }

    /// Submit or discard the configured leftover report, per the user's
    /// "submit debug info" setting. `NoFile` when no path is configured.
    pub fn handle_leftover_log(&self, sink: &dyn LogSink) -> Result<LeftoverOutcome> {
        match &self.leftover_path {
            Some(path) => handle_leftover_log_file(path, self.app.submit_debug_info, sink),
            None => Ok(LeftoverOutcome::NoFile),
        }
    }

    pub fn suppress_debug_reports(&mut self) {
        self.log_upload.suppress();
    }

    pub fn browser_likely_available(&self, has_touchscreen: bool) -> bool {
        is_browser_likely_available(&self.app.platform, self.app.vr_mode, has_touchscreen)
    }
}
