use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

use feedback_analytics_core::ratings::{
    self, classify_gap, GapAnalysisInput, NormalizationInput,
};
use feedback_analytics_core::types::{with_metadata, Alignment};
use feedback_analytics_core::AnalyticsConfig;

use crate::config;
use crate::input;

/// Arguments for response normalization
#[derive(Args)]
pub struct NormalizeArgs {
    /// Path to JSON input file (questions + responses)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_normalize(args: NormalizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let normalize_input: NormalizationInput =
        input::read_input(args.input.as_deref(), "normalization")?;
    let result = ratings::normalize_responses(&normalize_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for per-question gap analysis
#[derive(Args)]
pub struct GapsArgs {
    /// Path to JSON input file (questions + responses)
    #[arg(long)]
    pub input: Option<String>,

    /// Alignment threshold (overrides input and --config)
    #[arg(long)]
    pub threshold: Option<Decimal>,
}

pub fn run_gaps(
    args: GapsArgs,
    loaded: Option<&AnalyticsConfig>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut gap_input: GapAnalysisInput = input::read_input(args.input.as_deref(), "gap analysis")?;
    config::inject(&mut gap_input.config, loaded);
    if let Some(t) = args.threshold {
        config::override_with(&mut gap_input.config, |c| c.alignment_threshold = t);
    }
    let result = ratings::analyze_gaps(&gap_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for classifying a single gap
#[derive(Args)]
pub struct ClassifyArgs {
    /// Self-rating minus reviewer mean
    #[arg(long, allow_hyphen_values = true)]
    pub gap: Decimal,

    /// Alignment threshold (defaults to the configured value)
    #[arg(long)]
    pub threshold: Option<Decimal>,
}

#[derive(Serialize)]
struct Classification {
    gap: Decimal,
    threshold: Decimal,
    alignment: Alignment,
}

pub fn run_classify(
    args: ClassifyArgs,
    loaded: Option<&AnalyticsConfig>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let threshold = match args.threshold {
        Some(t) => t,
        None => loaded.cloned().unwrap_or_default().alignment_threshold,
    };
    if threshold < Decimal::ZERO {
        return Err("--threshold must be non-negative".into());
    }

    let result = Classification {
        gap: args.gap,
        threshold,
        alignment: classify_gap(args.gap, threshold),
    };
    let output = with_metadata(
        "gap > threshold → blind_spot; gap < -threshold → hidden_strength; otherwise aligned",
        &serde_json::json!({ "alignment_threshold": threshold.to_string() }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        result,
    );
    Ok(serde_json::to_value(output)?)
}
