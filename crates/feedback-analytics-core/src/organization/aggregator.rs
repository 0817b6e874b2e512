//! Organization-level rollup across many individuals.
//!
//! This is the only place individuals' results are combined. Reviewer means
//! are means of each individual's reviewer average (the raw reviewer
//! ratings are not available at this layer). Self-ratings, gaps and
//! comments never leave: every self field is `None`, every comment list is
//! empty, and no respondent identifier exists in either the input or the
//! output types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

use crate::config::AnalyticsConfig;
use crate::rollup::aggregator::{CompetencyResult, SectionResult};
use crate::stats::mean;
use crate::types::{with_metadata, Alignment, ComputationOutput, Rating};
use crate::AnalyticsResult;

// ---------------------------------------------------------------------------
// Types — Input
// ---------------------------------------------------------------------------

/// One anonymous individual's derived results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualSummary {
    pub sections: Vec<SectionResult>,
    #[serde(default)]
    pub competencies: Vec<CompetencyResult>,
}

/// Input for an organization (or filtered cohort) rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationInput {
    pub individuals: Vec<IndividualSummary>,
    #[serde(default)]
    pub config: Option<AnalyticsConfig>,
}

// ---------------------------------------------------------------------------
// Types — Output
// ---------------------------------------------------------------------------

/// Whether the cohort was large enough to publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortStatus {
    Published,
    InsufficientData,
}

/// Anonymized per-question view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrganizationQuestionResult {
    pub question_id: String,
    /// Always None
    pub self_rating: Option<Rating>,
    pub mean_reviewer_rating: Option<Rating>,
    /// Always empty
    pub comments: Vec<String>,
    pub contributors: usize,
}

/// Anonymized competency view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrganizationCompetencyResult {
    pub competency_id: String,
    pub name: String,
    /// Always None
    pub self_average: Option<Rating>,
    pub reviewer_average: Option<Rating>,
    /// Always None
    pub gap: Option<Decimal>,
    /// Always None
    pub alignment: Option<Alignment>,
    pub contributors: usize,
}

/// Anonymized section view, one per section title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrganizationSectionResult {
    pub title: String,
    pub questions: Vec<OrganizationQuestionResult>,
    /// Always None
    pub self_average: Option<Rating>,
    /// Mean of individuals' section reviewer averages
    pub reviewer_average: Option<Rating>,
    /// Always None
    pub gap: Option<Decimal>,
    /// Always None
    pub alignment: Option<Alignment>,
    pub competencies: Vec<OrganizationCompetencyResult>,
    pub contributors: usize,
}

/// Organization rollup output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrganizationReport {
    pub status: CohortStatus,
    pub cohort_size: usize,
    pub min_cohort_size: usize,
    pub sections: Vec<OrganizationSectionResult>,
    pub competencies: Vec<OrganizationCompetencyResult>,
    /// Sections, competencies and questions withheld for too few contributors
    pub suppressed: usize,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Collects per-key reviewer averages in first-seen order.
///
/// Values are kept per individual so that one person listing the same key
/// several times still counts as a single contributor.
#[derive(Default)]
struct Pool<'a> {
    order: Vec<&'a str>,
    entries: HashMap<&'a str, (&'a str, Vec<(usize, Vec<Decimal>)>)>,
}

impl<'a> Pool<'a> {
    fn add(
        &mut self,
        individual: usize,
        key: &'a str,
        label: &'a str,
        reviewer_average: Option<Rating>,
    ) {
        let entry = self.entries.entry(key).or_insert_with(|| {
            self.order.push(key);
            (label, Vec::new())
        });
        let Some(avg) = reviewer_average else {
            return;
        };
        // Individuals are added in order, so a repeat is always the last slot
        match entry.1.last_mut() {
            Some((who, values)) if *who == individual => values.push(avg),
            _ => entry.1.push((individual, vec![avg])),
        }
    }

    /// (key, label, mean-of-means, distinct contributors) in first-seen order.
    fn drain(self) -> Vec<(&'a str, &'a str, Option<Rating>, usize)> {
        let Pool { order, entries } = self;
        order
            .into_iter()
            .filter_map(|key| {
                entries.get(key).map(|(label, per_individual)| {
                    let means: Vec<Decimal> = per_individual
                        .iter()
                        .filter_map(|(_, values)| mean(values))
                        .collect();
                    (key, *label, mean(&means), means.len())
                })
            })
            .collect()
    }
}

fn competency_rows(
    pool: Pool<'_>,
    min: usize,
    suppressed: &mut usize,
) -> Vec<OrganizationCompetencyResult> {
    pool.drain()
        .into_iter()
        .filter(|(_, _, _, contributors)| {
            let keep = *contributors >= min;
            if !keep {
                *suppressed += 1;
            }
            keep
        })
        .map(|(id, name, reviewer_average, contributors)| OrganizationCompetencyResult {
            competency_id: id.to_string(),
            name: name.to_string(),
            self_average: None,
            reviewer_average,
            gap: None,
            alignment: None,
            contributors,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Function 1: aggregate_cohort
// ---------------------------------------------------------------------------

/// Fold individuals' results into anonymized organization results.
///
/// A cohort smaller than `min_cohort_size` publishes nothing; within a
/// published cohort any entry with fewer contributors than the minimum is
/// withheld.
pub fn aggregate_cohort(
    individuals: &[IndividualSummary],
    min_cohort_size: usize,
) -> OrganizationReport {
    if individuals.len() < min_cohort_size {
        tracing::warn!(
            cohort_size = individuals.len(),
            min_cohort_size,
            "cohort below minimum size; organization rollup withheld"
        );
        return OrganizationReport {
            status: CohortStatus::InsufficientData,
            cohort_size: individuals.len(),
            min_cohort_size,
            sections: Vec::new(),
            competencies: Vec::new(),
            suppressed: 0,
        };
    }

    let mut suppressed = 0usize;

    let mut section_pool = Pool::default();
    let mut question_pools: HashMap<&str, Pool<'_>> = HashMap::new();
    let mut section_competency_pools: HashMap<&str, Pool<'_>> = HashMap::new();
    let mut competency_pool = Pool::default();

    for (idx, individual) in individuals.iter().enumerate() {
        for section in &individual.sections {
            let title = section.title.as_str();
            section_pool.add(idx, title, title, section.reviewer_average);

            let questions = question_pools.entry(title).or_default();
            for q in &section.questions {
                questions.add(idx, &q.question_id, &q.question_id, q.mean_reviewer_rating);
            }

            let competencies = section_competency_pools.entry(title).or_default();
            for c in &section.competencies {
                competencies.add(idx, &c.competency_id, &c.name, c.reviewer_average);
            }
        }
        for c in &individual.competencies {
            competency_pool.add(idx, &c.competency_id, &c.name, c.reviewer_average);
        }
    }

    let mut sections: Vec<OrganizationSectionResult> = Vec::new();
    for (title, _, reviewer_average, contributors) in section_pool.drain() {
        if contributors < min_cohort_size {
            suppressed += 1;
            continue;
        }

        let questions: Vec<OrganizationQuestionResult> = question_pools
            .remove(title)
            .map(Pool::drain)
            .unwrap_or_default()
            .into_iter()
            .filter(|(_, _, _, n)| {
                let keep = *n >= min_cohort_size;
                if !keep {
                    suppressed += 1;
                }
                keep
            })
            .map(|(id, _, mean_reviewer_rating, contributors)| OrganizationQuestionResult {
                question_id: id.to_string(),
                self_rating: None,
                mean_reviewer_rating,
                comments: Vec::new(),
                contributors,
            })
            .collect();

        let competencies = section_competency_pools
            .remove(title)
            .map(|pool| competency_rows(pool, min_cohort_size, &mut suppressed))
            .unwrap_or_default();

        sections.push(OrganizationSectionResult {
            title: title.to_string(),
            questions,
            self_average: None,
            reviewer_average,
            gap: None,
            alignment: None,
            competencies,
            contributors,
        });
    }

    let competencies = competency_rows(competency_pool, min_cohort_size, &mut suppressed);

    if suppressed > 0 {
        tracing::warn!(suppressed, min_cohort_size, "entries below minimum contributors withheld");
    }

    OrganizationReport {
        status: CohortStatus::Published,
        cohort_size: individuals.len(),
        min_cohort_size,
        sections,
        competencies,
        suppressed,
    }
}

// ---------------------------------------------------------------------------
// Function 2: aggregate_organization
// ---------------------------------------------------------------------------

/// Privacy-preserving organization rollup with the cohort-size guard taken
/// from configuration.
pub fn aggregate_organization(
    input: &OrganizationInput,
) -> AnalyticsResult<ComputationOutput<OrganizationReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let config = input.config.clone().unwrap_or_default();
    config.validate()?;

    let report = aggregate_cohort(&input.individuals, config.min_cohort_size);

    match report.status {
        CohortStatus::InsufficientData => warnings.push(format!(
            "Cohort of {} is below the minimum of {}; no organization results published",
            report.cohort_size, report.min_cohort_size
        )),
        CohortStatus::Published if report.suppressed > 0 => warnings.push(format!(
            "{} entr(ies) had fewer than {} contributors and were withheld",
            report.suppressed, report.min_cohort_size
        )),
        CohortStatus::Published => {}
    }
    tracing::debug!(
        cohort_size = report.cohort_size,
        sections = report.sections.len(),
        "aggregated organization"
    );

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Anonymized mean-of-means of individual reviewer averages; self-ratings and comments excluded",
        &serde_json::json!({
            "min_cohort_size": config.min_cohort_size,
            "individuals": input.individuals.len(),
        }),
        warnings,
        elapsed,
        report,
    ))
}
