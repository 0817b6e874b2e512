use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::AnalyticsConfig;
use crate::ratings::normalizer::{normalize_all, NormalizedResponse, Question, QuestionResponse};
use crate::stats::mean;
use crate::types::{with_metadata, Alignment, ComputationOutput, Rating};
use crate::AnalyticsResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Self-vs-reviewer comparison for one question.
///
/// `gap` and `alignment` are only present when the question has both a
/// self-rating and at least one reviewer rating; such a result is
/// "classifiable". Rollups take every result with a reviewer mean.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionResult {
    pub question_id: String,
    pub self_rating: Option<Rating>,
    /// Arithmetic mean of reviewer ratings; None with zero reviewers
    pub mean_reviewer_rating: Option<Rating>,
    pub reviewer_count: usize,
    /// self_rating - mean_reviewer_rating
    pub gap: Option<Decimal>,
    pub alignment: Option<Alignment>,
    /// Competencies the question feeds in rollups
    #[serde(default)]
    pub competency_ids: Vec<String>,
    #[serde(default)]
    pub comments: Vec<String>,
}

impl QuestionResult {
    pub fn is_classifiable(&self) -> bool {
        self.gap.is_some()
    }
}

/// Input for classifying one respondent's answers question by question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapAnalysisInput {
    pub questions: Vec<Question>,
    pub responses: Vec<QuestionResponse>,
    #[serde(default)]
    pub config: Option<AnalyticsConfig>,
}

/// Tally of per-question classifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlignmentCounts {
    pub aligned: usize,
    pub blind_spot: usize,
    pub hidden_strength: usize,
    /// Missing reviewer data or self-rating
    pub unclassified: usize,
}

impl AlignmentCounts {
    pub fn from_results(results: &[QuestionResult]) -> Self {
        let mut counts = Self::default();
        for r in results {
            match r.alignment {
                Some(Alignment::Aligned) => counts.aligned += 1,
                Some(Alignment::BlindSpot) => counts.blind_spot += 1,
                Some(Alignment::HiddenStrength) => counts.hidden_strength += 1,
                None => counts.unclassified += 1,
            }
        }
        counts
    }
}

/// Per-question gap analysis output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapAnalysisOutput {
    pub questions: Vec<QuestionResult>,
    pub counts: AlignmentCounts,
}

// ---------------------------------------------------------------------------
// Function 1: classify_gap
// ---------------------------------------------------------------------------

/// Classify a signed gap. The boundary is inclusive: `|gap| == threshold`
/// is aligned.
pub fn classify_gap(gap: Decimal, threshold: Decimal) -> Alignment {
    if gap > threshold {
        Alignment::BlindSpot
    } else if gap < -threshold {
        Alignment::HiddenStrength
    } else {
        Alignment::Aligned
    }
}

// ---------------------------------------------------------------------------
// Function 2: classify_response
// ---------------------------------------------------------------------------

/// Turn a normalized response into a [`QuestionResult`].
pub fn classify_response(response: &NormalizedResponse, threshold: Decimal) -> QuestionResult {
    let mean_reviewer_rating = mean(&response.reviewer_ratings);

    let gap = match (response.self_rating, mean_reviewer_rating) {
        (Some(self_rating), Some(reviewer_mean)) => Some(self_rating - reviewer_mean),
        _ => None,
    };

    QuestionResult {
        question_id: response.question_id.clone(),
        self_rating: response.self_rating,
        mean_reviewer_rating,
        reviewer_count: response.reviewer_ratings.len(),
        gap,
        alignment: gap.map(|g| classify_gap(g, threshold)),
        competency_ids: Vec::new(),
        comments: response.comments.clone(),
    }
}

/// Classify a response and attach its question's competency associations.
pub(crate) fn classify_question(
    question: &Question,
    response: &NormalizedResponse,
    threshold: Decimal,
) -> QuestionResult {
    QuestionResult {
        competency_ids: question.competency_ids.clone(),
        ..classify_response(response, threshold)
    }
}

// ---------------------------------------------------------------------------
// Function 3: analyze_gaps
// ---------------------------------------------------------------------------

/// Normalize and classify every response of one respondent.
pub fn analyze_gaps(
    input: &GapAnalysisInput,
) -> AnalyticsResult<ComputationOutput<GapAnalysisOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let config = input.config.clone().unwrap_or_default();
    config.validate()?;
    let threshold = config.alignment_threshold;

    let normalized = normalize_all(&input.questions, &input.responses)?;
    let clamped: usize = normalized.iter().map(|(n, _)| n.clamped_values).sum();
    if clamped > 0 {
        warnings.push(format!(
            "{clamped} rating(s) fell outside their question scale and were clamped"
        ));
    }

    let questions: Vec<QuestionResult> = normalized
        .iter()
        .filter(|(_, question)| question.is_rating())
        .map(|(n, question)| classify_question(question, n, threshold))
        .collect();

    let counts = AlignmentCounts::from_results(&questions);
    if counts.unclassified > 0 {
        warnings.push(format!(
            "{} question(s) lack reviewer ratings or a self-rating and were not classified",
            counts.unclassified
        ));
    }
    tracing::debug!(
        questions = questions.len(),
        unclassified = counts.unclassified,
        %threshold,
        "classified question gaps"
    );

    let output = GapAnalysisOutput { questions, counts };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Self vs reviewer-mean gap per question, |gap| <= threshold is aligned",
        &serde_json::json!({
            "alignment_threshold": threshold.to_string(),
            "responses": input.responses.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn normalized(self_rating: Option<Decimal>, reviewers: &[Decimal]) -> NormalizedResponse {
        NormalizedResponse {
            question_id: "q1".to_string(),
            self_rating,
            reviewer_ratings: reviewers.to_vec(),
            comments: Vec::new(),
            clamped_values: 0,
        }
    }

    #[test]
    fn classify_boundaries() {
        let t = dec!(1.0);
        assert_eq!(classify_gap(dec!(0), t), Alignment::Aligned);
        assert_eq!(classify_gap(dec!(1.0), t), Alignment::Aligned);
        assert_eq!(classify_gap(dec!(-1.0), t), Alignment::Aligned);
        assert_eq!(classify_gap(dec!(1.0001), t), Alignment::BlindSpot);
        assert_eq!(classify_gap(dec!(-1.0001), t), Alignment::HiddenStrength);
    }

    #[test]
    fn zero_threshold_only_exact_match_is_aligned() {
        assert_eq!(classify_gap(dec!(0), dec!(0)), Alignment::Aligned);
        assert_eq!(classify_gap(dec!(0.01), dec!(0)), Alignment::BlindSpot);
    }

    #[test]
    fn no_reviewers_leaves_everything_undefined() {
        let r = classify_response(&normalized(Some(dec!(6)), &[]), dec!(1));
        assert_eq!(r.mean_reviewer_rating, None);
        assert_eq!(r.gap, None);
        assert_eq!(r.alignment, None);
        assert_eq!(r.reviewer_count, 0);
        assert!(!r.is_classifiable());
    }

    #[test]
    fn no_self_rating_keeps_reviewer_mean() {
        let r = classify_response(&normalized(None, &[dec!(4), dec!(5)]), dec!(1));
        assert_eq!(r.mean_reviewer_rating, Some(dec!(4.5)));
        assert_eq!(r.gap, None);
        assert!(!r.is_classifiable());
    }

    #[test]
    fn reference_scenario() {
        let q1 = classify_response(&normalized(Some(dec!(5)), &[dec!(4), dec!(4)]), dec!(1.0));
        assert_eq!(q1.gap, Some(dec!(1)));
        assert_eq!(q1.alignment, Some(Alignment::Aligned));

        let q2 = classify_response(&normalized(Some(dec!(4)), &[dec!(6), dec!(7)]), dec!(1.0));
        assert_eq!(q2.mean_reviewer_rating, Some(dec!(6.5)));
        assert_eq!(q2.gap, Some(dec!(-2.5)));
        assert_eq!(q2.alignment, Some(Alignment::HiddenStrength));
    }

    #[test]
    fn analyze_gaps_skips_non_rating_questions() {
        use crate::ratings::normalizer::QuestionType;

        let input = GapAnalysisInput {
            questions: vec![
                Question::rating("q1", "Communicates clearly", dec!(7)),
                Question {
                    id: "q2".to_string(),
                    text: "Comments".to_string(),
                    question_type: QuestionType::FreeText,
                    scale_max: None,
                    competency_ids: Vec::new(),
                },
            ],
            responses: vec![
                QuestionResponse {
                    question_id: "q1".to_string(),
                    self_rating: Some(dec!(7)),
                    reviewer_ratings: vec![Some(dec!(5))],
                    comments: Vec::new(),
                },
                QuestionResponse {
                    question_id: "q2".to_string(),
                    self_rating: None,
                    reviewer_ratings: Vec::new(),
                    comments: vec!["Keep it up".to_string()],
                },
            ],
            config: None,
        };
        let out = analyze_gaps(&input).unwrap();
        assert_eq!(out.result.questions.len(), 1);
        assert_eq!(out.result.counts.blind_spot, 1);
        assert!(out.warnings.is_empty());
    }
}
