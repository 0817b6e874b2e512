//! Per-individual rollup: questions → sections / competencies → assessment.

pub mod aggregator;
pub mod views;

pub use aggregator::{
    roll_up, roll_up_assessment, AssessmentResult, CompetencyDefinition, CompetencyResult,
    RollupInput, RollupOutput, SectionDefinition, SectionResult,
};
pub use views::{highlights, sorted_by_score, Highlights, RankedEntry};
