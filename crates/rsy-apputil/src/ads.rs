//! Between-game ad pacing.
//!
//! An accumulator (`ad_amt`) grows by a launch-count dependent increment on
//! every opportunity; crossing 1.0 shows an ad. After the first crossing, an
//! ad is also shown whenever the launch-count dependent interval has passed
//! since the last completed ad.

use rsy_config::{AdCurve, AdTuning};
use tracing::error;

/// Host facts at the moment an ad opportunity arises.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdEnvironment {
    pub can_show_ad: bool,
    pub have_pro: bool,
    pub in_tournament: bool,
    pub launch_count: u32,
    pub has_video_ads: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdSkipReason {
    /// No network or no ad provider.
    Unavailable,
    /// Pro upgrade disables interstitials.
    ProAccount,
    /// Never during tournaments.
    Tournament,
    /// Pacing threshold not reached yet.
    Pacing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdDecision {
    Show,
    Skip(AdSkipReason),
}

impl AdDecision {
    pub fn is_show(&self) -> bool {
        matches!(self, AdDecision::Show)
    }
}

#[derive(Clone, Debug)]
pub struct AdPacer {
    tuning: AdTuning,
    ad_amt: Option<f64>,
    attempted_first_ad: bool,
    last_completion_ms: Option<i64>,
    last_ad_was_short: bool,
}

impl AdPacer {
    pub fn new(tuning: AdTuning) -> Self {
        Self {
            tuning,
            ad_amt: None,
            attempted_first_ad: false,
            last_completion_ms: None,
            last_ad_was_short: false,
        }
    }

    /// Decide whether to show an ad at this opportunity.
    ///
    /// Updates the pacing accumulator unless the opportunity is skipped for
    /// availability reasons.
    pub fn decide(&mut self, env: &AdEnvironment, now_ms: i64) -> AdDecision {
        if !env.can_show_ad {
            return AdDecision::Skip(AdSkipReason::Unavailable);
        }
        if env.have_pro {
            return AdDecision::Skip(AdSkipReason::ProAccount);
        }
        if env.in_tournament {
            return AdDecision::Skip(AdSkipReason::Tournament);
        }

        let interval_mult = if self.last_ad_was_short {
            self.tuning.short_interval_mult
        } else {
            1.0
        };

        let (amt, interval_s) = match self.ad_amt {
            None => {
                let start = if env.launch_count <= 1 {
                    self.tuning.start_val_first_launch
                } else {
                    self.tuning.start_val
                };
                (start, None)
            }
            Some(amt) => {
                let curve = if env.has_video_ads {
                    &self.tuning.video
                } else {
                    &self.tuning.static_ads
                };
                let (incr, interval) = curve_point(curve, env.launch_count);
                (amt + incr, Some(interval))
            }
        };

        if amt >= 1.0 {
            self.ad_amt = Some(amt % 1.0);
            self.attempted_first_ad = true;
            return AdDecision::Show;
        }

        let interval_elapsed = match (self.last_completion_ms, interval_s) {
            (None, _) => true,
            (Some(last), Some(interval)) => {
                (now_ms - last) as f64 > interval * interval_mult * 1000.0
            }
            (Some(_), None) => false,
        };
        if self.attempted_first_ad && interval_elapsed {
            self.ad_amt = Some(0.0);
            return AdDecision::Show;
        }

        self.ad_amt = Some(amt);
        AdDecision::Skip(AdSkipReason::Pacing)
    }

    /// The ad network reported completion.
    pub fn record_completion(&mut self, now_ms: i64, was_short: bool) {
        self.last_completion_ms = Some(now_ms);
        self.last_ad_was_short = was_short;
    }

    pub fn ad_amt(&self) -> Option<f64> {
        self.ad_amt
    }

    pub fn tuning(&self) -> &AdTuning {
        &self.tuning
    }

    /// Completion guard for an ad shown at `now_ms`, with the fallback
    /// deadline taken from `fallback_callback_ms`.
    pub fn callback_guard(
        &self,
        call: impl FnOnce() + Send + 'static,
        purpose: impl Into<String>,
        last_network: impl Into<String>,
        network_set_ms: i64,
        now_ms: i64,
    ) -> AdCallbackGuard {
        AdCallbackGuard::new(call, purpose, last_network, network_set_ms)
            .with_fallback_after(now_ms, self.tuning.fallback_callback_ms)
    }
}

/// (increment, interval seconds) for a launch count.
fn curve_point(curve: &AdCurve, launch_count: u32) -> (f64, f64) {
    let lc = f64::from(launch_count);
    let lc_amt = if lc < curve.min_launch_count {
        0.0
    } else if lc > curve.max_launch_count || curve.max_launch_count <= curve.min_launch_count {
        1.0
    } else {
        (lc - curve.min_launch_count) / (curve.max_launch_count - curve.min_launch_count)
    };
    let incr = (1.0 - lc_amt) * curve.min_lc_scale + lc_amt * curve.max_lc_scale;
    let interval = (1.0 - lc_amt) * curve.min_lc_interval_s + lc_amt * curve.max_lc_interval_s;
    (incr, interval)
}

// ---------------------------------------------------------------------------
// Completion callback guard
// ---------------------------------------------------------------------------

/// Runs the post-ad continuation exactly once: either when the ad network
/// reports completion, or from the fallback timer if it never does.
pub struct AdCallbackGuard {
    call: Option<Box<dyn FnOnce() + Send>>,
    purpose: String,
    last_network: String,
    network_set_ms: i64,
    fallback_due_ms: Option<i64>,
}

impl AdCallbackGuard {
    pub fn new(
        call: impl FnOnce() + Send + 'static,
        purpose: impl Into<String>,
        last_network: impl Into<String>,
        network_set_ms: i64,
    ) -> Self {
        Self {
            call: Some(Box::new(call)),
            purpose: purpose.into(),
            last_network: last_network.into(),
            network_set_ms,
            fallback_due_ms: None,
        }
    }

    /// Arm the fallback: [`poll`][Self::poll] fires it once `after_ms` has
    /// passed since `created_ms`.
    pub fn with_fallback_after(mut self, created_ms: i64, after_ms: i64) -> Self {
        self.fallback_due_ms = Some(created_ms.saturating_add(after_ms));
        self
    }

    pub fn fallback_due_ms(&self) -> Option<i64> {
        self.fallback_due_ms
    }

    /// Timer tick. Fires the fallback when it is armed and due; returns
    /// `true` if this ran the continuation.
    pub fn poll(&mut self, now_ms: i64) -> bool {
        match self.fallback_due_ms {
            Some(due) if now_ms >= due => self.fire_fallback(now_ms),
            _ => false,
        }
    }

    /// Completion reported by the ad network. Returns `true` if this ran
    /// the continuation.
    pub fn complete(&mut self) -> bool {
        match self.call.take() {
            Some(call) => {
                call();
                true
            }
            None => false,
        }
    }

    /// Fallback timer fired. Runs the continuation if the network never
    /// called back, and logs which network let us down.
    pub fn fire_fallback(&mut self, now_ms: i64) -> bool {
        if self.call.is_none() {
            return false;
        }
        error!(
            network = %self.last_network,
            network_set_secs_ago = (now_ms - self.network_set_ms) / 1000,
            purpose = %self.purpose,
            "relying on fallback ad-callback"
        );
        self.complete()
    }

    pub fn has_run(&self) -> bool {
        self.call.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_interpolates_between_end_points() {
        let c = AdCurve::default();
        let (incr, interval) = curve_point(&c, 0);
        assert!((incr - 0.25).abs() < 1e-9);
        assert!((interval - 360.0).abs() < 1e-9);

        let (incr, interval) = curve_point(&c, 99);
        assert!((incr - 0.34).abs() < 1e-9);
        assert!((interval - 300.0).abs() < 1e-9);

        let (_, interval) = curve_point(&c, 2);
        assert!((interval - 336.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_curve_uses_max_end() {
        let c = AdCurve {
            min_launch_count: 3.0,
            max_launch_count: 3.0,
            ..AdCurve::default()
        };
        let (incr, _) = curve_point(&c, 3);
        assert!((incr - 0.34).abs() < 1e-9);
    }
}
