//! Individual report pipeline.
//!
//! Chains normalization, gap classification and rollup for one respondent:
//! raw responses in, section / competency / assessment results plus ranked
//! highlights out. Questions nobody answered yet still appear in their
//! section with every derived field undefined.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

use crate::config::AnalyticsConfig;
use crate::error::AnalyticsError;
use crate::ratings::gap::{classify_question, AlignmentCounts, QuestionResult};
use crate::ratings::normalizer::{normalize_response, Question, QuestionResponse};
use crate::rollup::aggregator::{
    roll_up, AssessmentResult, CompetencyDefinition, CompetencyResult, SectionDefinition,
    SectionResult,
};
use crate::rollup::views::{highlights, Highlights};
use crate::types::{with_metadata, ComputationOutput};
use crate::AnalyticsResult;

const DEFAULT_TOP_N: usize = 3;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A section of the published assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionOutline {
    pub id: String,
    pub title: String,
    pub questions: Vec<Question>,
}

/// Published assessment structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentDefinition {
    pub title: String,
    pub sections: Vec<SectionOutline>,
    #[serde(default)]
    pub competencies: Vec<CompetencyDefinition>,
}

/// Input for one respondent's full report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualReportInput {
    pub assessment: AssessmentDefinition,
    pub responses: Vec<QuestionResponse>,
    /// Size of the strengths / development-area lists (default 3)
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub config: Option<AnalyticsConfig>,
}

/// Full individual report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualReport {
    pub assessment_title: String,
    pub sections: Vec<SectionResult>,
    pub competencies: Vec<CompetencyResult>,
    pub overall: AssessmentResult,
    pub counts: AlignmentCounts,
    pub highlights: Highlights,
    /// Free-text answers to non-rating questions, by question id
    pub open_responses: Vec<OpenResponse>,
}

/// Comments left on a question that is not scored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenResponse {
    pub question_id: String,
    pub comments: Vec<String>,
}

// ---------------------------------------------------------------------------
// Function: analyze_individual
// ---------------------------------------------------------------------------

/// Build a respondent's report from the assessment definition and their raw
/// responses.
pub fn analyze_individual(
    input: &IndividualReportInput,
) -> AnalyticsResult<ComputationOutput<IndividualReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let config = input.config.clone().unwrap_or_default();
    config.validate()?;
    let threshold = config.alignment_threshold;

    let mut by_question: HashMap<&str, &QuestionResponse> = HashMap::new();
    for response in &input.responses {
        if by_question
            .insert(response.question_id.as_str(), response)
            .is_some()
        {
            return Err(AnalyticsError::invalid(
                "responses.question_id",
                format!("more than one response for '{}'", response.question_id),
            ));
        }
    }

    let known: Vec<&str> = input
        .assessment
        .sections
        .iter()
        .flat_map(|s| s.questions.iter().map(|q| q.id.as_str()))
        .collect();
    if let Some(stray) = input
        .responses
        .iter()
        .find(|r| !known.contains(&r.question_id.as_str()))
    {
        return Err(AnalyticsError::invalid(
            "responses.question_id",
            format!("unknown question '{}'", stray.question_id),
        ));
    }

    let mut clamped = 0usize;
    let mut unanswered = 0usize;
    let mut open_responses: Vec<OpenResponse> = Vec::new();
    let mut sections: Vec<SectionDefinition> = Vec::with_capacity(input.assessment.sections.len());

    for outline in &input.assessment.sections {
        let mut questions: Vec<QuestionResult> = Vec::new();
        for question in &outline.questions {
            let empty = QuestionResponse {
                question_id: question.id.clone(),
                self_rating: None,
                reviewer_ratings: Vec::new(),
                comments: Vec::new(),
            };
            let response = match by_question.get(question.id.as_str()) {
                Some(r) => *r,
                None => {
                    unanswered += 1;
                    &empty
                }
            };
            let normalized = normalize_response(question, response)?;
            clamped += normalized.clamped_values;

            if question.is_rating() {
                questions.push(classify_question(question, &normalized, threshold));
            } else if !normalized.comments.is_empty() {
                open_responses.push(OpenResponse {
                    question_id: question.id.clone(),
                    comments: normalized.comments,
                });
            }
        }
        sections.push(SectionDefinition {
            id: outline.id.clone(),
            title: outline.title.clone(),
            questions,
        });
    }

    if clamped > 0 {
        warnings.push(format!(
            "{clamped} rating(s) fell outside their question scale and were clamped"
        ));
    }
    if unanswered > 0 {
        warnings.push(format!("{unanswered} question(s) have no response yet"));
    }

    let rollup = roll_up(&sections, &input.assessment.competencies, threshold);
    let all_questions: Vec<QuestionResult> = rollup
        .sections
        .iter()
        .flat_map(|s| s.questions.iter().cloned())
        .collect();
    let counts = AlignmentCounts::from_results(&all_questions);
    let top_n = input.top_n.unwrap_or(DEFAULT_TOP_N);
    let highlights = highlights(&rollup.competencies, top_n);

    tracing::debug!(
        assessment = %input.assessment.title,
        sections = rollup.sections.len(),
        competencies = rollup.competencies.len(),
        unclassified = counts.unclassified,
        "built individual report"
    );

    let output = IndividualReport {
        assessment_title: input.assessment.title.clone(),
        sections: rollup.sections,
        competencies: rollup.competencies,
        overall: rollup.overall,
        counts,
        highlights,
        open_responses,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Individual 360 report: normalize → per-question gap → section / competency rollup",
        &serde_json::json!({
            "alignment_threshold": threshold.to_string(),
            "top_n": top_n,
            "responses": input.responses.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
