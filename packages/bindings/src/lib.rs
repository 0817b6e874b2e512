use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

use feedback_analytics_core::AnalyticsResult;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse the JSON input, run the operation, serialize the envelope.
fn call<I, O>(input_json: &str, op: impl FnOnce(&I) -> AnalyticsResult<O>) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = op(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

#[napi]
pub fn normalize_responses(input_json: String) -> NapiResult<String> {
    call(&input_json, feedback_analytics_core::ratings::normalize_responses)
}

#[napi]
pub fn analyze_gaps(input_json: String) -> NapiResult<String> {
    call(&input_json, feedback_analytics_core::ratings::analyze_gaps)
}

/// Classify a single gap. Both arguments are decimal strings, e.g. "-1.5".
#[napi]
pub fn classify_gap(gap: String, threshold: String) -> NapiResult<String> {
    let gap: Decimal = gap.parse().map_err(to_napi_error)?;
    let threshold: Decimal = threshold.parse().map_err(to_napi_error)?;
    if threshold < Decimal::ZERO {
        return Err(to_napi_error("threshold must be non-negative"));
    }
    let alignment = feedback_analytics_core::ratings::classify_gap(gap, threshold);
    serde_json::to_string(&alignment).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Rollup
// ---------------------------------------------------------------------------

#[napi]
pub fn roll_up_assessment(input_json: String) -> NapiResult<String> {
    call(&input_json, feedback_analytics_core::rollup::roll_up_assessment)
}

#[napi]
pub fn analyze_individual(input_json: String) -> NapiResult<String> {
    call(&input_json, feedback_analytics_core::individual::analyze_individual)
}

// ---------------------------------------------------------------------------
// Organization
// ---------------------------------------------------------------------------

#[napi]
pub fn aggregate_organization(input_json: String) -> NapiResult<String> {
    call(&input_json, feedback_analytics_core::organization::aggregate_organization)
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_trends(input_json: String) -> NapiResult<String> {
    call(&input_json, feedback_analytics_core::trends::analyze_trends)
}

#[napi]
pub fn compare_to_peers(input_json: String) -> NapiResult<String> {
    call(&input_json, feedback_analytics_core::peers::compare_to_peers)
}
