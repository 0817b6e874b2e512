use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use serde_json::Value;

use feedback_analytics_core::trends::{self, TimeWindow, TrendInput};
use feedback_analytics_core::AnalyticsConfig;

use crate::config;
use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WindowArg {
    Week,
    Month,
    Quarter,
    Year,
}

impl From<WindowArg> for TimeWindow {
    fn from(w: WindowArg) -> Self {
        match w {
            WindowArg::Week => TimeWindow::Week,
            WindowArg::Month => TimeWindow::Month,
            WindowArg::Quarter => TimeWindow::Quarter,
            WindowArg::Year => TimeWindow::Year,
        }
    }
}

/// Arguments for dashboard trend metrics
#[derive(Args)]
pub struct TrendsArgs {
    /// Path to JSON input file (assessment records, window, as_of)
    #[arg(long)]
    pub input: Option<String>,

    /// Override the reporting window
    #[arg(long)]
    pub window: Option<WindowArg>,

    /// Override the end of the current window (RFC 3339)
    #[arg(long)]
    pub as_of: Option<DateTime<Utc>>,
}

pub fn run_trends(
    args: TrendsArgs,
    loaded: Option<&AnalyticsConfig>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut trend_input: TrendInput = input::read_input(args.input.as_deref(), "trend metrics")?;
    config::inject(&mut trend_input.config, loaded);
    if let Some(window) = args.window {
        trend_input.window = window.into();
    }
    if let Some(as_of) = args.as_of {
        trend_input.as_of = as_of;
    }
    let result = trends::analyze_trends(&trend_input)?;
    Ok(serde_json::to_value(result)?)
}
