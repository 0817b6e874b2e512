use clap::Args;
use serde_json::Value;

use feedback_analytics_core::organization::{self, OrganizationInput};
use feedback_analytics_core::AnalyticsConfig;

use crate::config;
use crate::input;

/// Arguments for an anonymised cohort rollup
#[derive(Args)]
pub struct OrganizationArgs {
    /// Path to JSON input file (per-individual section / competency results)
    #[arg(long)]
    pub input: Option<String>,

    /// Minimum contributors before anything is published
    #[arg(long)]
    pub min_cohort: Option<usize>,
}

pub fn run_organization(
    args: OrganizationArgs,
    loaded: Option<&AnalyticsConfig>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut org_input: OrganizationInput =
        input::read_input(args.input.as_deref(), "organization rollup")?;
    config::inject(&mut org_input.config, loaded);
    if let Some(min) = args.min_cohort {
        config::override_with(&mut org_input.config, |c| c.min_cohort_size = min);
    }
    let result = organization::aggregate_organization(&org_input)?;
    Ok(serde_json::to_value(result)?)
}
