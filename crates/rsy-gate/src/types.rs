use serde::{Deserialize, Serialize};

/// Default retry spacing after an attempt that was not confirmed clean.
pub const DEFAULT_RETRY_INTERVAL_MS: i64 = 5_000;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Timing policy for an [`UpdateGate`][crate::UpdateGate].
///
/// All durations are milliseconds. Deserialisable so named gates can be
/// declared in layered config (`gates.<name>.*`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatePolicy {
    /// Wait before re-offering an attempt that was taken but not followed by
    /// `set_dirty(false)`.
    pub retry_interval_ms: i64,
    /// Minimum spacing between the starts of two attempts, even when every
    /// attempt succeeds. `None` disables the floor.
    pub min_update_interval_ms: Option<i64>,
    /// Mark the gate dirty again this long after it became clean. `None`
    /// disables auto-redirty.
    pub auto_dirty_interval_ms: Option<i64>,
    /// Suppress attempts while the gate's exclusion lock is held.
    pub use_exclusion_lock: bool,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
            min_update_interval_ms: None,
            auto_dirty_interval_ms: None,
            use_exclusion_lock: false,
        }
    }
}

impl GatePolicy {
    pub fn with_retry_interval_ms(mut self, ms: i64) -> Self {
        self.retry_interval_ms = ms;
        self
    }

    pub fn with_min_update_interval_ms(mut self, ms: i64) -> Self {
        self.min_update_interval_ms = Some(ms);
        self
    }

    pub fn with_auto_dirty_interval_ms(mut self, ms: i64) -> Self {
        self.auto_dirty_interval_ms = Some(ms);
        self
    }

    pub fn with_exclusion_lock(mut self) -> Self {
        self.use_exclusion_lock = true;
        self
    }

    /// Reject negative durations.
    ///
    /// Fields are checked in declaration order; the first offender is
    /// reported.
    pub fn validate(&self) -> Result<(), GateError> {
        check_non_negative("retry_interval_ms", self.retry_interval_ms)?;
        if let Some(ms) = self.min_update_interval_ms {
            check_non_negative("min_update_interval_ms", ms)?;
        }
        if let Some(ms) = self.auto_dirty_interval_ms {
            check_non_negative("auto_dirty_interval_ms", ms)?;
        }
        Ok(())
    }
}

fn check_non_negative(field: &'static str, value_ms: i64) -> Result<(), GateError> {
    if value_ms < 0 {
        return Err(GateError::InvalidConfiguration { field, value_ms });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Construction-time failure. Gate operations themselves never fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateError {
    /// A policy duration was negative.
    InvalidConfiguration { field: &'static str, value_ms: i64 },
}

impl std::fmt::Display for GateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateError::InvalidConfiguration { field, value_ms } => write!(
                f,
                "invalid gate configuration: {field} must be >= 0 (got {value_ms}ms)"
            ),
        }
    }
}

impl std::error::Error for GateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        assert_eq!(GatePolicy::default().validate(), Ok(()));
    }

    #[test]
    fn negative_optional_interval_is_rejected() {
        let p = GatePolicy::default().with_auto_dirty_interval_ms(-1);
        assert_eq!(
            p.validate(),
            Err(GateError::InvalidConfiguration {
                field: "auto_dirty_interval_ms",
                value_ms: -1
            })
        );
    }

    #[test]
    fn policy_deserializes_with_defaults() {
        let p: GatePolicy =
            serde_json::from_str(r#"{ "min_update_interval_ms": 30000 }"#).unwrap();
        assert_eq!(p.retry_interval_ms, DEFAULT_RETRY_INTERVAL_MS);
        assert_eq!(p.min_update_interval_ms, Some(30_000));
        assert!(!p.use_exclusion_lock);
    }
}
