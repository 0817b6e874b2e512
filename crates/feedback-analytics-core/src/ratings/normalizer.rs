use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

use crate::config::AnalyticsConfig;
use crate::error::AnalyticsError;
use crate::types::{with_metadata, ComputationOutput, Rating};
use crate::AnalyticsResult;

// ---------------------------------------------------------------------------
// Types — Assessment definition
// ---------------------------------------------------------------------------

/// Kind of answer a question collects. Only `Rating` questions are scored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Rating,
    MultipleChoice,
    YesNo,
    FreeText,
}

/// A published assessment question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    /// Prompt shown to the respondent
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Upper bound of the rating scale (rating questions only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_max: Option<Decimal>,
    /// Competencies this question evidences; may be several
    #[serde(default)]
    pub competency_ids: Vec<String>,
}

impl Question {
    /// Rating question on a `1..=scale_max` scale.
    pub fn rating(id: &str, text: &str, scale_max: Decimal) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            question_type: QuestionType::Rating,
            scale_max: Some(scale_max),
            competency_ids: Vec::new(),
        }
    }

    /// Rating question authored without an explicit scale; takes the
    /// deployment's `default_scale_max`.
    pub fn rating_with_default_scale(id: &str, text: &str, config: &AnalyticsConfig) -> Self {
        Self::rating(id, text, config.default_scale_max)
    }

    pub fn with_competencies(mut self, competency_ids: &[&str]) -> Self {
        self.competency_ids = competency_ids.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn is_rating(&self) -> bool {
        self.question_type == QuestionType::Rating
    }
}

// ---------------------------------------------------------------------------
// Types — Responses
// ---------------------------------------------------------------------------

/// A submitted answer as delivered by the persistence layer.
///
/// Reviewer identities are not carried; individual reviewer slots may be
/// `null` when a reviewer skipped the question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub question_id: String,
    #[serde(default)]
    pub self_rating: Option<Decimal>,
    #[serde(default)]
    pub reviewer_ratings: Vec<Option<Decimal>>,
    #[serde(default)]
    pub comments: Vec<String>,
}

/// A response whose ratings all lie within `[1, scale_max]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedResponse {
    pub question_id: String,
    pub self_rating: Option<Rating>,
    pub reviewer_ratings: Vec<Rating>,
    pub comments: Vec<String>,
    /// Number of values pulled back into range
    pub clamped_values: usize,
}

/// Input for batch normalization of one respondent's answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationInput {
    pub questions: Vec<Question>,
    pub responses: Vec<QuestionResponse>,
}

/// Batch normalization output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationOutput {
    pub responses: Vec<NormalizedResponse>,
    pub clamped_values: usize,
    /// Responses to non-rating questions (kept for comments only)
    pub unscored_responses: usize,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn clamp(value: Decimal, scale_max: Decimal, clamped: &mut usize) -> Decimal {
    if value < Decimal::ONE {
        *clamped += 1;
        Decimal::ONE
    } else if value > scale_max {
        *clamped += 1;
        scale_max
    } else {
        value
    }
}

fn scale_for(question: &Question) -> AnalyticsResult<Decimal> {
    match question.scale_max {
        None => Err(AnalyticsError::invalid(
            format!("questions[{}].scale_max", question.id),
            "rating questions require a scale maximum",
        )),
        Some(max) if max <= Decimal::ZERO => Err(AnalyticsError::invalid(
            format!("questions[{}].scale_max", question.id),
            format!("scale maximum must be positive, got {max}"),
        )),
        Some(max) if max < Decimal::ONE => Err(AnalyticsError::invalid(
            format!("questions[{}].scale_max", question.id),
            format!("scale maximum must be at least 1, got {max}"),
        )),
        Some(max) => Ok(max),
    }
}

// ---------------------------------------------------------------------------
// Function 1: normalize_response
// ---------------------------------------------------------------------------

/// Clamp a raw response's ratings onto `[1, scale_max]`.
///
/// Absent self-ratings stay `None` and skipped reviewer slots are dropped;
/// nothing is ever replaced by zero. Non-rating questions keep only their
/// comments.
pub fn normalize_response(
    question: &Question,
    response: &QuestionResponse,
) -> AnalyticsResult<NormalizedResponse> {
    if question.id != response.question_id {
        return Err(AnalyticsError::invalid(
            "question_id",
            format!(
                "response for '{}' paired with question '{}'",
                response.question_id, question.id
            ),
        ));
    }

    if !question.is_rating() {
        return Ok(NormalizedResponse {
            question_id: response.question_id.clone(),
            self_rating: None,
            reviewer_ratings: Vec::new(),
            comments: response.comments.clone(),
            clamped_values: 0,
        });
    }

    let scale_max = scale_for(question)?;
    let mut clamped = 0usize;

    let self_rating = response
        .self_rating
        .map(|r| clamp(r, scale_max, &mut clamped));

    let reviewer_ratings: Vec<Rating> = response
        .reviewer_ratings
        .iter()
        .flatten()
        .map(|r| clamp(*r, scale_max, &mut clamped))
        .collect();

    Ok(NormalizedResponse {
        question_id: response.question_id.clone(),
        self_rating,
        reviewer_ratings,
        comments: response.comments.clone(),
        clamped_values: clamped,
    })
}

/// Pair every response with its question definition and normalize it.
///
/// Responses referencing an unknown question are a validation error.
pub(crate) fn normalize_all<'a>(
    questions: &'a [Question],
    responses: &[QuestionResponse],
) -> AnalyticsResult<Vec<(NormalizedResponse, &'a Question)>> {
    let by_id: HashMap<&str, &Question> = questions.iter().map(|q| (q.id.as_str(), q)).collect();

    responses
        .iter()
        .map(|response| {
            let question = *by_id.get(response.question_id.as_str()).ok_or_else(|| {
                AnalyticsError::invalid(
                    "responses.question_id",
                    format!("unknown question '{}'", response.question_id),
                )
            })?;
            normalize_response(question, response).map(|n| (n, question))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Function 2: normalize_responses
// ---------------------------------------------------------------------------

/// Normalize a respondent's full answer set against the assessment's
/// question definitions.
pub fn normalize_responses(
    input: &NormalizationInput,
) -> AnalyticsResult<ComputationOutput<NormalizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let normalized = normalize_all(&input.questions, &input.responses)?;

    let unscored_responses = normalized.iter().filter(|(_, q)| !q.is_rating()).count();
    let responses: Vec<NormalizedResponse> = normalized.into_iter().map(|(n, _)| n).collect();
    let clamped_values: usize = responses.iter().map(|r| r.clamped_values).sum();

    if clamped_values > 0 {
        tracing::warn!(clamped_values, "ratings outside the question scale were clamped");
        warnings.push(format!(
            "{clamped_values} rating(s) fell outside their question scale and were clamped"
        ));
    }
    tracing::debug!(
        responses = responses.len(),
        unscored_responses,
        "normalized responses"
    );

    let output = NormalizationOutput {
        responses,
        clamped_values,
        unscored_responses,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Rating normalization: clamp to [1, scale_max], absent ratings preserved",
        &serde_json::json!({
            "questions": input.questions.len(),
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

    fn response(self_rating: Option<Decimal>, reviewers: &[Option<Decimal>]) -> QuestionResponse {
        QuestionResponse {
            question_id: "q1".to_string(),
            self_rating,
            reviewer_ratings: reviewers.to_vec(),
            comments: vec!["Great listener".to_string()],
        }
    }

    #[test]
    fn in_range_values_pass_through() {
        let q = Question::rating("q1", "Listens actively", dec!(7));
        let n = normalize_response(&q, &response(Some(dec!(5)), &[Some(dec!(4)), Some(dec!(6))]))
            .unwrap();
        assert_eq!(n.self_rating, Some(dec!(5)));
        assert_eq!(n.reviewer_ratings, vec![dec!(4), dec!(6)]);
        assert_eq!(n.clamped_values, 0);
        assert_eq!(n.comments, vec!["Great listener".to_string()]);
    }

    #[test]
    fn default_scale_comes_from_config() {
        let config = AnalyticsConfig {
            default_scale_max: dec!(5),
            ..AnalyticsConfig::default()
        };
        let q = Question::rating_with_default_scale("q1", "Listens actively", &config);
        let n = normalize_response(&q, &response(Some(dec!(6)), &[Some(dec!(5))])).unwrap();
        assert_eq!(n.self_rating, Some(dec!(5)));
        assert_eq!(n.clamped_values, 1);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let q = Question::rating("q1", "Listens actively", dec!(7));
        let n = normalize_response(&q, &response(Some(dec!(9)), &[Some(dec!(0)), Some(dec!(7.5))]))
            .unwrap();
        assert_eq!(n.self_rating, Some(dec!(7)));
        assert_eq!(n.reviewer_ratings, vec![dec!(1), dec!(7)]);
        assert_eq!(n.clamped_values, 3);
    }

    #[test]
    fn absent_ratings_are_not_zero() {
        let q = Question::rating("q1", "Listens actively", dec!(7));
        let n = normalize_response(&q, &response(None, &[None, Some(dec!(3)), None])).unwrap();
        assert_eq!(n.self_rating, None);
        assert_eq!(n.reviewer_ratings, vec![dec!(3)]);
    }

    #[test]
    fn missing_scale_is_validation_error() {
        let mut q = Question::rating("q1", "Listens actively", dec!(7));
        q.scale_max = None;
        let err = normalize_response(&q, &response(Some(dec!(5)), &[])).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput { .. }));
    }

    #[test]
    fn non_positive_scale_is_validation_error() {
        let q = Question::rating("q1", "Listens actively", dec!(0));
        assert!(normalize_response(&q, &response(Some(dec!(5)), &[])).is_err());
        let q = Question::rating("q1", "Listens actively", dec!(-3));
        assert!(normalize_response(&q, &response(Some(dec!(5)), &[])).is_err());
    }

    #[test]
    fn non_rating_question_keeps_comments_only() {
        let q = Question {
            id: "q1".to_string(),
            text: "Anything else?".to_string(),
            question_type: QuestionType::FreeText,
            scale_max: None,
            competency_ids: Vec::new(),
        };
        let n = normalize_response(&q, &response(Some(dec!(5)), &[Some(dec!(4))])).unwrap();
        assert_eq!(n.self_rating, None);
        assert!(n.reviewer_ratings.is_empty());
        assert_eq!(n.comments.len(), 1);
    }

    #[test]
    fn mismatched_question_rejected() {
        let q = Question::rating("q2", "Delegates", dec!(7));
        assert!(normalize_response(&q, &response(Some(dec!(5)), &[])).is_err());
    }

    #[test]
    fn batch_reports_clamped_values_as_warning() {
        let input = NormalizationInput {
            questions: vec![Question::rating("q1", "Listens actively", dec!(5))],
            responses: vec![response(Some(dec!(6)), &[Some(dec!(4))])],
        };
        let out = normalize_responses(&input).unwrap();
        assert_eq!(out.result.clamped_values, 1);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn batch_rejects_unknown_question() {
        let input = NormalizationInput {
            questions: vec![Question::rating("q9", "Other", dec!(7))],
            responses: vec![response(Some(dec!(6)), &[])],
        };
        assert!(normalize_responses(&input).is_err());
    }
}
