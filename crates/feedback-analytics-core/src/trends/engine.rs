//! Period-over-period performance metrics.
//!
//! Records are assigned to a window by `started_at`. With `w` the window
//! length and `now` the `as_of` instant:
//!
//! - current  = `[now - w, now]`
//! - previous = `[now - 2w, now - w)`
//!
//! Each metric is computed for both windows, then compared:
//! `change = (current - previous) / previous × 100`, with `100` when only
//! the current window has activity and `0` when neither has. A difference
//! under 0.01 is stable. Empty windows contribute `0`, never NaN.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{AnalyticsConfig, WindowDurations};
use crate::error::AnalyticsError;
use crate::stats::{mean_or_zero, percent_change, safe_div};
use crate::types::{with_metadata, ComputationOutput, Percent, TrendDirection};
use crate::AnalyticsResult;

const STABLE_EPSILON: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Reporting window selected on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    Week,
    Month,
    Quarter,
    Year,
}

impl TimeWindow {
    pub fn days(self, durations: &WindowDurations) -> u32 {
        match self {
            TimeWindow::Week => durations.week_days,
            TimeWindow::Month => durations.month_days,
            TimeWindow::Quarter => durations.quarter_days,
            TimeWindow::Year => durations.year_days,
        }
    }

    pub fn duration(self, durations: &WindowDurations) -> Duration {
        Duration::days(i64::from(self.days(durations)))
    }
}

/// An assigned assessment as seen by the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Overall score, present once the assessment has been scored
    #[serde(default)]
    pub score: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    CompletionRate,
    AverageScore,
    CompletedCount,
    AverageCompletionMinutes,
}

impl MetricKind {
    pub fn label(self) -> &'static str {
        match self {
            MetricKind::CompletionRate => "Completion Rate",
            MetricKind::AverageScore => "Average Score",
            MetricKind::CompletedCount => "Assessments Completed",
            MetricKind::AverageCompletionMinutes => "Avg. Time to Complete (min)",
        }
    }
}

/// One dashboard metric with its period-over-period movement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceMetric {
    pub metric: MetricKind,
    pub label: String,
    /// Current-window value, 2 dp
    pub value: Decimal,
    /// Previous-window value, 2 dp
    pub previous_value: Decimal,
    /// Percent change vs previous window, 1 dp
    pub change_pct: Percent,
    pub trend: TrendDirection,
}

/// Input for the trend engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendInput {
    pub records: Vec<AssessmentRecord>,
    pub window: TimeWindow,
    /// End of the current window
    pub as_of: DateTime<Utc>,
    #[serde(default)]
    pub config: Option<AnalyticsConfig>,
}

/// Trend engine output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendOutput {
    pub window: TimeWindow,
    pub current_start: DateTime<Utc>,
    pub previous_start: DateTime<Utc>,
    pub as_of: DateTime<Utc>,
    pub current_records: usize,
    pub previous_records: usize,
    pub metrics: Vec<PerformanceMetric>,
    /// Completed records whose completion precedes their start
    pub skipped_durations: usize,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct WindowStats {
    records: usize,
    completion_rate: Decimal,
    average_score: Decimal,
    completed: Decimal,
    average_minutes: Decimal,
    skipped_durations: usize,
}

fn window_stats<'a>(
    records: impl Iterator<Item = &'a AssessmentRecord>,
    as_of: DateTime<Utc>,
) -> WindowStats {
    let mut total = 0usize;
    let mut completed = 0usize;
    let mut scores: Vec<Decimal> = Vec::new();
    let mut minutes: Vec<Decimal> = Vec::new();
    let mut skipped = 0usize;

    for record in records {
        total += 1;
        let Some(done) = record.completed_at.filter(|t| *t <= as_of) else {
            continue;
        };
        completed += 1;
        if let Some(score) = record.score {
            scores.push(score);
        }
        let elapsed = done - record.started_at;
        if elapsed < Duration::zero() {
            skipped += 1;
        } else {
            minutes.push(Decimal::from(elapsed.num_seconds()) / dec!(60));
        }
    }

    WindowStats {
        records: total,
        completion_rate: safe_div(Decimal::from(completed), Decimal::from(total)) * dec!(100),
        average_score: mean_or_zero(&scores),
        completed: Decimal::from(completed),
        average_minutes: mean_or_zero(&minutes),
        skipped_durations: skipped,
    }
}

fn direction(current: Decimal, previous: Decimal) -> TrendDirection {
    let delta = current - previous;
    if delta.abs() < STABLE_EPSILON {
        TrendDirection::Stable
    } else if delta > Decimal::ZERO {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    }
}

/// Build one metric from raw current / previous values.
pub fn performance_metric(
    kind: MetricKind,
    current: Decimal,
    previous: Decimal,
) -> PerformanceMetric {
    PerformanceMetric {
        metric: kind,
        label: kind.label().to_string(),
        value: current.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        previous_value: previous.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        change_pct: percent_change(current, previous)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero),
        trend: direction(current, previous),
    }
}

// ---------------------------------------------------------------------------
// Function 1: compute_metrics
// ---------------------------------------------------------------------------

/// Partition records into the current and previous windows ending at
/// `as_of` and compare the four dashboard metrics.
pub fn compute_metrics(
    records: &[AssessmentRecord],
    window: TimeWindow,
    as_of: DateTime<Utc>,
    durations: &WindowDurations,
) -> AnalyticsResult<TrendOutput> {
    let length = window.duration(durations);
    let out_of_range = || {
        AnalyticsError::invalid(
            "as_of",
            format!(
                "{:?} window ending at {} starts before the representable range",
                window, as_of
            ),
        )
    };
    let current_start = as_of.checked_sub_signed(length).ok_or_else(out_of_range)?;
    let previous_start = current_start.checked_sub_signed(length).ok_or_else(out_of_range)?;

    let current = window_stats(
        records
            .iter()
            .filter(|r| r.started_at >= current_start && r.started_at <= as_of),
        as_of,
    );
    let previous = window_stats(
        records
            .iter()
            .filter(|r| r.started_at >= previous_start && r.started_at < current_start),
        as_of,
    );

    let metrics = vec![
        performance_metric(
            MetricKind::CompletionRate,
            current.completion_rate,
            previous.completion_rate,
        ),
        performance_metric(
            MetricKind::AverageScore,
            current.average_score,
            previous.average_score,
        ),
        performance_metric(MetricKind::CompletedCount, current.completed, previous.completed),
        performance_metric(
            MetricKind::AverageCompletionMinutes,
            current.average_minutes,
            previous.average_minutes,
        ),
    ];

    Ok(TrendOutput {
        window,
        current_start,
        previous_start,
        as_of,
        current_records: current.records,
        previous_records: previous.records,
        metrics,
        skipped_durations: current.skipped_durations + previous.skipped_durations,
    })
}

// ---------------------------------------------------------------------------
// Function 2: analyze_trends
// ---------------------------------------------------------------------------

/// Dashboard performance metrics for the selected window.
pub fn analyze_trends(input: &TrendInput) -> AnalyticsResult<ComputationOutput<TrendOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let config = input.config.clone().unwrap_or_default();
    config.validate()?;

    let output = compute_metrics(&input.records, input.window, input.as_of, &config.windows)?;

    if output.skipped_durations > 0 {
        tracing::warn!(
            skipped = output.skipped_durations,
            "records completed before they started were left out of time-to-complete"
        );
        warnings.push(format!(
            "{} record(s) have a completion time before their start time and were excluded from time-to-complete",
            output.skipped_durations
        ));
    }
    if output.previous_records == 0 {
        warnings.push(
            "No records in the previous window; changes are reported against zero".to_string(),
        );
    }
    let outside = input.records.len() - output.current_records - output.previous_records;
    tracing::debug!(
        window = ?input.window,
        current = output.current_records,
        previous = output.previous_records,
        outside,
        "computed performance trends"
    );

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Current vs previous fixed-length window; change = (cur - prev) / prev × 100",
        &serde_json::json!({
            "window": input.window,
            "window_days": input.window.days(&config.windows),
            "as_of": input.as_of,
            "records": input.records.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
