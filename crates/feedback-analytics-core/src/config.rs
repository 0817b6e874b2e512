use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::AnalyticsResult;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Gap threshold on a 7-point scale.
pub const DEFAULT_ALIGNMENT_THRESHOLD: Decimal = dec!(1.0);
pub const DEFAULT_SCALE_MAX: Decimal = dec!(7);
/// Smallest cohort an organization rollup is published for.
pub const DEFAULT_MIN_COHORT_SIZE: usize = 5;
/// Longest configurable trend window (a century)
pub const MAX_WINDOW_DAYS: u32 = 36_525;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Deployment-level knobs for the analytics pipeline.
///
/// Every field has a default, so a partial config file (or none at all)
/// is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// |gap| at or below this value is classified as aligned
    pub alignment_threshold: Decimal,
    /// Scale maximum used when authoring rating questions without one
    pub default_scale_max: Decimal,
    /// Organization rollups with fewer contributors are withheld
    pub min_cohort_size: usize,
    /// Fixed durations backing each trend window
    pub windows: WindowDurations,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            alignment_threshold: DEFAULT_ALIGNMENT_THRESHOLD,
            default_scale_max: DEFAULT_SCALE_MAX,
            min_cohort_size: DEFAULT_MIN_COHORT_SIZE,
            windows: WindowDurations::default(),
        }
    }
}

/// Length of each trend window in days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowDurations {
    pub week_days: u32,
    pub month_days: u32,
    pub quarter_days: u32,
    pub year_days: u32,
}

impl Default for WindowDurations {
    fn default() -> Self {
        Self {
            week_days: 7,
            month_days: 30,
            quarter_days: 90,
            year_days: 365,
        }
    }
}

impl AnalyticsConfig {
    /// Reject values that would make classification or windowing meaningless.
    pub fn validate(&self) -> AnalyticsResult<()> {
        if self.alignment_threshold < Decimal::ZERO {
            return Err(AnalyticsError::invalid(
                "alignment_threshold",
                "must be zero or positive",
            ));
        }
        if self.default_scale_max < Decimal::ONE {
            return Err(AnalyticsError::invalid(
                "default_scale_max",
                "must be at least 1",
            ));
        }
        if self.min_cohort_size == 0 {
            return Err(AnalyticsError::invalid(
                "min_cohort_size",
                "must be at least 1",
            ));
        }
        let w = &self.windows;
        for (field, days) in [
            ("windows.week_days", w.week_days),
            ("windows.month_days", w.month_days),
            ("windows.quarter_days", w.quarter_days),
            ("windows.year_days", w.year_days),
        ] {
            if days == 0 {
                return Err(AnalyticsError::invalid(field, "must be at least 1 day"));
            }
            if days > MAX_WINDOW_DAYS {
                return Err(AnalyticsError::invalid(
                    field,
                    format!("must be at most {MAX_WINDOW_DAYS} days"),
                ));
            }
        }
        Ok(())
    }
}
