use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use feedback_analytics_core::individual::{self, IndividualReportInput};
use feedback_analytics_core::rollup::{self, RollupInput};
use feedback_analytics_core::AnalyticsConfig;

use crate::config;
use crate::input;

/// Arguments for rolling question results up to sections and competencies
#[derive(Args)]
pub struct RollupArgs {
    /// Path to JSON input file (sections of classified question results)
    #[arg(long)]
    pub input: Option<String>,

    /// Alignment threshold (overrides input and --config)
    #[arg(long)]
    pub threshold: Option<Decimal>,
}

pub fn run_rollup(
    args: RollupArgs,
    loaded: Option<&AnalyticsConfig>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut rollup_input: RollupInput = input::read_input(args.input.as_deref(), "rollup")?;
    config::inject(&mut rollup_input.config, loaded);
    if let Some(t) = args.threshold {
        config::override_with(&mut rollup_input.config, |c| c.alignment_threshold = t);
    }
    let result = rollup::roll_up_assessment(&rollup_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a full individual report
#[derive(Args)]
pub struct IndividualArgs {
    /// Path to JSON input file (assessment definition + responses)
    #[arg(long)]
    pub input: Option<String>,

    /// Number of strengths / development areas to list
    #[arg(long)]
    pub top: Option<usize>,

    /// Alignment threshold (overrides input and --config)
    #[arg(long)]
    pub threshold: Option<Decimal>,
}

pub fn run_individual(
    args: IndividualArgs,
    loaded: Option<&AnalyticsConfig>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut report_input: IndividualReportInput =
        input::read_input(args.input.as_deref(), "individual report")?;
    config::inject(&mut report_input.config, loaded);
    if let Some(t) = args.threshold {
        config::override_with(&mut report_input.config, |c| c.alignment_threshold = t);
    }
    if args.top.is_some() {
        report_input.top_n = args.top;
    }
    let result = individual::analyze_individual(&report_input)?;
    Ok(serde_json::to_value(result)?)
}
