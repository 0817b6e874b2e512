use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::stats::mean;
use crate::types::{with_metadata, ComputationOutput, Percent, Rating};
use crate::AnalyticsResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for placing one individual within their organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerInput {
    pub individual_score: Rating,
    /// Mean scores of everyone in the comparison population
    pub population: Vec<Rating>,
}

/// Position of a percentile within the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuartileBand {
    TopQuartile,
    UpperMiddle,
    LowerMiddle,
    BottomQuartile,
}

impl QuartileBand {
    fn from_percentile(percentile: Percent) -> Self {
        if percentile >= dec!(75) {
            QuartileBand::TopQuartile
        } else if percentile >= dec!(50) {
            QuartileBand::UpperMiddle
        } else if percentile >= dec!(25) {
            QuartileBand::LowerMiddle
        } else {
            QuartileBand::BottomQuartile
        }
    }
}

/// Peer standing. Every derived field is `None` for an empty population.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeerComparison {
    pub available: bool,
    pub individual_score: Rating,
    /// Share of the population scoring at or below the individual, 0-100
    pub percentile: Option<Percent>,
    /// 1 + number of peers scoring strictly higher
    pub rank: Option<usize>,
    pub population_size: usize,
    pub population_mean: Option<Rating>,
    pub band: Option<QuartileBand>,
}

// ---------------------------------------------------------------------------
// Function 1: compare_with_population
// ---------------------------------------------------------------------------

/// Percentile and rank of `individual` within `population`.
pub fn compare_with_population(individual: Rating, population: &[Rating]) -> PeerComparison {
    if population.is_empty() {
        return PeerComparison {
            available: false,
            individual_score: individual,
            percentile: None,
            rank: None,
            population_size: 0,
            population_mean: None,
            band: None,
        };
    }

    let at_or_below = population.iter().filter(|p| **p <= individual).count();
    let above = population.iter().filter(|p| **p > individual).count();

    let percentile = (Decimal::from(at_or_below) / Decimal::from(population.len()) * dec!(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    PeerComparison {
        available: true,
        individual_score: individual,
        percentile: Some(percentile),
        rank: Some(above + 1),
        population_size: population.len(),
        population_mean: mean(population),
        band: Some(QuartileBand::from_percentile(percentile)),
    }
}

// ---------------------------------------------------------------------------
// Function 2: compare_to_peers
// ---------------------------------------------------------------------------

/// Place an individual's score within their comparison population. An empty
/// population is not an error; the comparison is marked unavailable.
pub fn compare_to_peers(
    input: &PeerInput,
) -> AnalyticsResult<ComputationOutput<PeerComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let comparison = compare_with_population(input.individual_score, &input.population);
    if !comparison.available {
        warnings.push(
            "Comparison population is empty; percentile and rank not available".to_string(),
        );
    }
    tracing::debug!(
        population = comparison.population_size,
        rank = ?comparison.rank,
        "compared individual to peers"
    );

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Percentile = share of population <= individual; rank = strictly higher + 1",
        &serde_json::json!({
            "population_size": input.population.len(),
        }),
        warnings,
        elapsed,
        comparison,
    ))
}
