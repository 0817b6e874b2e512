//! Per-question stage: bring raw responses onto the question's scale, then
//! compare the self-rating against the reviewer mean.

pub mod gap;
pub mod normalizer;

pub use gap::{
    analyze_gaps, classify_gap, classify_response, AlignmentCounts, GapAnalysisInput,
    QuestionResult,
};
pub use normalizer::{
    normalize_response, normalize_responses, NormalizationInput, NormalizedResponse, Question,
    QuestionResponse, QuestionType,
};
