use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

use crate::config::AnalyticsConfig;
use crate::error::AnalyticsError;
use crate::ratings::gap::{classify_gap, QuestionResult};
use crate::stats::mean;
use crate::types::{with_metadata, Alignment, ComputationOutput, Rating};
use crate::AnalyticsResult;

// ---------------------------------------------------------------------------
// Types — Input
// ---------------------------------------------------------------------------

/// Display name for a competency identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetencyDefinition {
    pub id: String,
    pub name: String,
}

/// One section of an assessment with its classified questions.
///
/// Each question result carries its own competency associations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionDefinition {
    pub id: String,
    pub title: String,
    pub questions: Vec<QuestionResult>,
}

/// Input for rolling one individual's question results up the hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollupInput {
    pub sections: Vec<SectionDefinition>,
    /// Optional competency catalogue; unknown ids are named by their id
    #[serde(default)]
    pub competencies: Vec<CompetencyDefinition>,
    #[serde(default)]
    pub config: Option<AnalyticsConfig>,
}

// ---------------------------------------------------------------------------
// Types — Output
// ---------------------------------------------------------------------------

/// Self vs reviewer means for one competency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompetencyResult {
    pub competency_id: String,
    pub name: String,
    pub self_average: Option<Rating>,
    pub reviewer_average: Option<Rating>,
    pub gap: Option<Decimal>,
    pub alignment: Option<Alignment>,
    /// Classifiable questions contributing to the means
    pub question_count: usize,
}

/// Self vs reviewer means for one section, with its question detail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionResult {
    pub section_id: String,
    pub title: String,
    pub questions: Vec<QuestionResult>,
    pub self_average: Option<Rating>,
    pub reviewer_average: Option<Rating>,
    pub gap: Option<Decimal>,
    pub alignment: Option<Alignment>,
    /// Competencies evidenced by this section's questions only
    pub competencies: Vec<CompetencyResult>,
}

/// Whole-assessment means, each question with reviewer ratings counted once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssessmentResult {
    pub self_average: Option<Rating>,
    pub reviewer_average: Option<Rating>,
    pub gap: Option<Decimal>,
    pub alignment: Option<Alignment>,
    pub rated_questions: usize,
    pub total_questions: usize,
}

/// Full rollup for one individual.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RollupOutput {
    pub sections: Vec<SectionResult>,
    pub competencies: Vec<CompetencyResult>,
    pub overall: AssessmentResult,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Means over the questions that have a reviewer mean. The self average
/// uses whichever of those carry a self-rating; the gap exists only when
/// both averages do, and alignment is re-derived from it.
#[derive(Debug, Clone, Copy)]
struct Aggregate {
    self_average: Option<Rating>,
    reviewer_average: Option<Rating>,
    gap: Option<Decimal>,
    alignment: Option<Alignment>,
    count: usize,
}

fn aggregate<'a>(
    questions: impl IntoIterator<Item = &'a QuestionResult>,
    threshold: Decimal,
) -> Aggregate {
    let mut self_ratings: Vec<Decimal> = Vec::new();
    let mut reviewer_means: Vec<Decimal> = Vec::new();

    for q in questions {
        let Some(r) = q.mean_reviewer_rating else {
            continue;
        };
        reviewer_means.push(r);
        if let Some(s) = q.self_rating {
            self_ratings.push(s);
        }
    }

    let self_average = mean(&self_ratings);
    let reviewer_average = mean(&reviewer_means);
    let gap = match (self_average, reviewer_average) {
        (Some(s), Some(r)) => Some(s - r),
        _ => None,
    };

    Aggregate {
        self_average,
        reviewer_average,
        gap,
        alignment: gap.map(|g| classify_gap(g, threshold)),
        count: reviewer_means.len(),
    }
}

/// Competency ids in order of first reference.
fn competency_order<'a>(questions: impl IntoIterator<Item = &'a QuestionResult>) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for q in questions {
        for id in &q.competency_ids {
            if !seen.contains(&id.as_str()) {
                seen.push(id.as_str());
            }
        }
    }
    seen
}

fn roll_up_competencies<'a>(
    questions: &[&'a QuestionResult],
    names: &HashMap<&str, &str>,
    threshold: Decimal,
) -> Vec<CompetencyResult> {
    competency_order(questions.iter().copied())
        .into_iter()
        .map(|id| {
            let agg = aggregate(
                questions
                    .iter()
                    .copied()
                    .filter(|q| q.competency_ids.iter().any(|c| c == id)),
                threshold,
            );
            CompetencyResult {
                competency_id: id.to_string(),
                name: names.get(id).copied().unwrap_or(id).to_string(),
                self_average: agg.self_average,
                reviewer_average: agg.reviewer_average,
                gap: agg.gap,
                alignment: agg.alignment,
                question_count: agg.count,
            }
        })
        .collect()
}

fn validate_sections(sections: &[SectionDefinition]) -> AnalyticsResult<()> {
    let mut ids: Vec<&str> = Vec::with_capacity(sections.len());
    for section in sections {
        if ids.contains(&section.id.as_str()) {
            return Err(AnalyticsError::invalid(
                "sections.id",
                format!("duplicate section '{}'", section.id),
            ));
        }
        ids.push(section.id.as_str());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Function 1: roll_up
// ---------------------------------------------------------------------------

/// Fold question results into section, competency and whole-assessment
/// results for one individual.
///
/// Competency means pool every reviewer-rated question declaring the
/// competency across all sections; a question feeding two competencies
/// counts toward both.
pub fn roll_up(
    sections: &[SectionDefinition],
    catalogue: &[CompetencyDefinition],
    threshold: Decimal,
) -> RollupOutput {
    let names: HashMap<&str, &str> = catalogue
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();

    let section_results: Vec<SectionResult> = sections
        .iter()
        .map(|section| {
            let agg = aggregate(&section.questions, threshold);
            let scoped: Vec<&QuestionResult> = section.questions.iter().collect();
            SectionResult {
                section_id: section.id.clone(),
                title: section.title.clone(),
                questions: section.questions.clone(),
                self_average: agg.self_average,
                reviewer_average: agg.reviewer_average,
                gap: agg.gap,
                alignment: agg.alignment,
                competencies: roll_up_competencies(&scoped, &names, threshold),
            }
        })
        .collect();

    let all_questions: Vec<&QuestionResult> =
        sections.iter().flat_map(|s| s.questions.iter()).collect();
    let competencies = roll_up_competencies(&all_questions, &names, threshold);

    let overall_agg = aggregate(all_questions.iter().copied(), threshold);
    let overall = AssessmentResult {
        self_average: overall_agg.self_average,
        reviewer_average: overall_agg.reviewer_average,
        gap: overall_agg.gap,
        alignment: overall_agg.alignment,
        rated_questions: overall_agg.count,
        total_questions: all_questions.len(),
    };

    RollupOutput {
        sections: section_results,
        competencies,
        overall,
    }
}

// ---------------------------------------------------------------------------
// Function 2: roll_up_assessment
// ---------------------------------------------------------------------------

/// Validate the input and roll it up, reporting sections and competencies
/// that have no reviewer-rated questions.
pub fn roll_up_assessment(
    input: &RollupInput,
) -> AnalyticsResult<ComputationOutput<RollupOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let config = input.config.clone().unwrap_or_default();
    config.validate()?;
    validate_sections(&input.sections)?;

    let output = roll_up(&input.sections, &input.competencies, config.alignment_threshold);

    for section in output.sections.iter().filter(|s| s.reviewer_average.is_none()) {
        warnings.push(format!(
            "Section '{}' has no reviewer-rated questions and is excluded from rankings",
            section.title
        ));
    }
    for competency in output.competencies.iter().filter(|c| c.reviewer_average.is_none()) {
        warnings.push(format!(
            "Competency '{}' has no reviewer-rated questions",
            competency.name
        ));
    }
    tracing::debug!(
        sections = output.sections.len(),
        competencies = output.competencies.len(),
        rated = output.overall.rated_questions,
        "rolled up assessment"
    );

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Question → section / competency / assessment means over reviewer-rated questions; alignment recomputed from aggregated gap",
        &serde_json::json!({
            "alignment_threshold": config.alignment_threshold.to_string(),
            "sections": input.sections.len(),
            "catalogued_competencies": input.competencies.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
