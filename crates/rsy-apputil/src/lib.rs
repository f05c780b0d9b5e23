//! rsy-apputil
//!
//! Application-level utilities that used to hang off a process-wide app
//! singleton, re-expressed over an explicit [`AppContext`]:
//!
//! - Debug-log upload pacing and leftover-log handling
//! - Between-game ad pacing
//! - Live-object leak audit after a session ends
//! - Platform heuristics
//!
//! Host-engine facts (foreground session name, log text, ad availability)
//! are plain inputs; nothing here talks to an engine.

mod ads;
mod context;
mod live_objects;
mod log_upload;
mod platform;

pub use ads::{AdCallbackGuard, AdDecision, AdEnvironment, AdPacer, AdSkipReason};
pub use context::AppContext;
pub use live_objects::{LeakReport, LiveObject, LiveObjectAudit, ObjectKind};
pub use log_upload::{
    handle_leftover_log_file, JsonlFileSink, LeftoverOutcome, LogReport, LogSink, LogSnapshot,
    LogUploadAction, LogUploadOutcome, LogUploadScheduler,
};
pub use platform::is_browser_likely_available;
