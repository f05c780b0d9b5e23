//! Typed configuration sections.
//!
//! Every section has serde defaults, so an empty document yields a usable
//! configuration. Unknown keys inside a section are rejected.

use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use rsy_gate::GatePolicy;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Root
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    /// Named update-gate policies (`gates.<name>`).
    pub gates: BTreeMap<String, GatePolicy>,
    pub log_upload: LogUploadConfig,
    pub ads: AdTuning,
}

impl AppConfig {
    /// Policy for the named gate, validated.
    pub fn gate_policy(&self, name: &str) -> Result<GatePolicy> {
        let policy = self
            .gates
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("config missing gates.{name}"))?;
        policy
            .validate()
            .with_context(|| format!("gates.{name} is invalid"))?;
        Ok(policy)
    }
}

// ---------------------------------------------------------------------------
// app
// ---------------------------------------------------------------------------

/// Identity and platform facts reported with debug logs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppSection {
    pub version: String,
    pub build_number: u32,
    pub user_agent: String,
    /// "Submit Debug Info" user setting.
    pub submit_debug_info: bool,
    pub platform: String,
    pub vr_mode: bool,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            version: "0.0.0".to_string(),
            build_number: 0,
            user_agent: "unknown".to_string(),
            submit_debug_info: true,
            platform: "unknown".to_string(),
            vr_mode: false,
        }
    }
}

// ---------------------------------------------------------------------------
// log_upload
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogUploadConfig {
    /// Delay between the first new log line and the upload, so related
    /// lines land in the same report.
    pub settle_delay_ms: i64,
    /// Spacing between uploads, and the retry window after a failed one.
    pub reupload_interval_ms: i64,
    /// Where a report that could not be uploaded before exit is kept.
    pub leftover_path: Option<String>,
}

impl Default for LogUploadConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 3_000,
            reupload_interval_ms: 600_000,
            leftover_path: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ads
// ---------------------------------------------------------------------------

/// Interstitial pacing knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdTuning {
    /// Initial accumulator on the first or second launch.
    pub start_val_first_launch: f64,
    /// Initial accumulator on later launches.
    pub start_val: f64,
    /// Interval multiplier applied after a short ad.
    pub short_interval_mult: f64,
    /// Fire the completion callback ourselves if the ad network has not
    /// called back within this long.
    pub fallback_callback_ms: i64,
    /// Curve used when video ads are available.
    pub video: AdCurve,
    /// Curve used for static interstitials.
    pub static_ads: AdCurve,
}

impl Default for AdTuning {
    fn default() -> Self {
        Self {
            start_val_first_launch: 0.99,
            start_val: 1.0,
            short_interval_mult: 1.0,
            fallback_callback_ms: 5_000,
            video: AdCurve::default(),
            static_ads: AdCurve::default(),
        }
    }
}

/// Launch-count interpolation between a "new player" and "regular player"
/// end point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdCurve {
    pub min_launch_count: f64,
    pub max_launch_count: f64,
    pub min_lc_scale: f64,
    pub max_lc_scale: f64,
    pub min_lc_interval_s: f64,
    pub max_lc_interval_s: f64,
}

impl Default for AdCurve {
    fn default() -> Self {
        Self {
            min_launch_count: 0.0,
            max_launch_count: 5.0,
            min_lc_scale: 0.25,
            max_lc_scale: 0.34,
            min_lc_interval_s: 360.0,
            max_lc_interval_s: 300.0,
        }
    }
}
