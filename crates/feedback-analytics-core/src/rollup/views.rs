//! Ranked presentations of rollup results.
//!
//! Anything without a reviewer average is left out of every ranking; it is
//! never sorted as if it scored zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rollup::aggregator::{CompetencyResult, SectionResult};
use crate::types::{Alignment, Rating};

/// A result that can be placed in a ranking.
pub trait Ranked {
    fn key(&self) -> &str;
    fn label(&self) -> &str;
    fn self_average(&self) -> Option<Rating>;
    fn reviewer_average(&self) -> Option<Rating>;
    fn alignment(&self) -> Option<Alignment>;
}

impl Ranked for CompetencyResult {
    fn key(&self) -> &str {
        &self.competency_id
    }
    fn label(&self) -> &str {
        &self.name
    }
    fn self_average(&self) -> Option<Rating> {
        self.self_average
    }
    fn reviewer_average(&self) -> Option<Rating> {
        self.reviewer_average
    }
    fn alignment(&self) -> Option<Alignment> {
        self.alignment
    }
}

impl Ranked for SectionResult {
    fn key(&self) -> &str {
        &self.section_id
    }
    fn label(&self) -> &str {
        &self.title
    }
    fn self_average(&self) -> Option<Rating> {
        self.self_average
    }
    fn reviewer_average(&self) -> Option<Rating> {
        self.reviewer_average
    }
    fn alignment(&self) -> Option<Alignment> {
        self.alignment
    }
}

/// One line of a ranked view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedEntry {
    pub id: String,
    pub name: String,
    pub reviewer_average: Rating,
    pub self_average: Option<Rating>,
    pub gap: Option<Decimal>,
    pub alignment: Option<Alignment>,
}

/// Strengths, development areas and perception gaps for one individual.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Highlights {
    /// Highest reviewer averages, best first
    pub strengths: Vec<RankedEntry>,
    /// Lowest reviewer averages not already listed as strengths, weakest first
    pub development_areas: Vec<RankedEntry>,
    pub blind_spots: Vec<RankedEntry>,
    pub hidden_strengths: Vec<RankedEntry>,
}

fn entry<T: Ranked>(item: &T, reviewer_average: Rating) -> RankedEntry {
    let self_average = item.self_average();
    RankedEntry {
        id: item.key().to_string(),
        name: item.label().to_string(),
        reviewer_average,
        self_average,
        gap: self_average.map(|s| s - reviewer_average),
        alignment: item.alignment(),
    }
}

/// Items with a reviewer average, highest first. Ties keep input order.
pub fn sorted_by_score<T: Ranked>(items: &[T]) -> Vec<RankedEntry> {
    let mut scored: Vec<RankedEntry> = items
        .iter()
        .filter_map(|item| item.reviewer_average().map(|avg| entry(item, avg)))
        .collect();
    scored.sort_by(|a, b| b.reviewer_average.cmp(&a.reviewer_average));
    scored
}

/// Top-`n` strengths, bottom-`n` development areas, and every blind spot /
/// hidden strength among the scored items.
pub fn highlights<T: Ranked>(items: &[T], n: usize) -> Highlights {
    let ranked = sorted_by_score(items);

    let strengths: Vec<RankedEntry> = ranked.iter().take(n).cloned().collect();
    let development_areas: Vec<RankedEntry> = ranked
        .iter()
        .skip(strengths.len())
        .rev()
        .take(n)
        .cloned()
        .collect();

    let with_alignment = |wanted: Alignment| -> Vec<RankedEntry> {
        ranked
            .iter()
            .filter(|e| e.alignment == Some(wanted))
            .cloned()
            .collect()
    };

    Highlights {
        strengths,
        development_areas,
        blind_spots: with_alignment(Alignment::BlindSpot),
        hidden_strengths: with_alignment(Alignment::HiddenStrength),
    }
}
