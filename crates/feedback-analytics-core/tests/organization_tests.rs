use feedback_analytics_core::individual::{
    analyze_individual, AssessmentDefinition, IndividualReportInput, SectionOutline,
};
use feedback_analytics_core::organization::{
    aggregate_organization, CohortStatus, IndividualSummary, OrganizationInput,
};
use feedback_analytics_core::ratings::{Question, QuestionResponse};
use feedback_analytics_core::AnalyticsConfig;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn assessment() -> AssessmentDefinition {
    AssessmentDefinition {
        title: "Team Lead 360".to_string(),
        sections: vec![
            SectionOutline {
                id: "people".to_string(),
                title: "People".to_string(),
                questions: vec![Question::rating("q1", "Develops others", dec!(7))
                    .with_competencies(&["coaching"])],
            },
            SectionOutline {
                id: "results".to_string(),
                title: "Results".to_string(),
                questions: vec![
                    Question::rating("q2", "Delivers on commitments", dec!(7))
                        .with_competencies(&["execution"]),
                ],
            },
        ],
        competencies: Vec::new(),
    }
}

/// Run one respondent through the individual pipeline and keep only the
/// derived results, the way the reporting layer hands them over.
fn summary(self_rating: Decimal, people: &[Decimal], results: &[Decimal]) -> IndividualSummary {
    let responses = vec![
        QuestionResponse {
            question_id: "q1".to_string(),
            self_rating: Some(self_rating),
            reviewer_ratings: people.iter().map(|r| Some(*r)).collect(),
            comments: vec!["Alex micromanages the sprint board".to_string()],
        },
        QuestionResponse {
            question_id: "q2".to_string(),
            self_rating: Some(self_rating),
            reviewer_ratings: results.iter().map(|r| Some(*r)).collect(),
            comments: vec!["Always ships on time".to_string()],
        },
    ];
    let report = analyze_individual(&IndividualReportInput {
        assessment: assessment(),
        responses,
        top_n: None,
        config: None,
    })
    .unwrap()
    .result;
    IndividualSummary {
        sections: report.sections,
        competencies: report.competencies,
    }
}

fn config(min_cohort_size: usize) -> Option<AnalyticsConfig> {
    Some(AnalyticsConfig {
        min_cohort_size,
        ..AnalyticsConfig::default()
    })
}

/// Walk a JSON tree and collect every value stored under `key`.
fn values_under<'a>(value: &'a Value, key: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                if k == key {
                    out.push(v);
                }
                values_under(v, key, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                values_under(item, key, out);
            }
        }
        _ => {}
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[test]
fn test_reviewer_mean_is_mean_of_means() {
    let input = OrganizationInput {
        individuals: vec![
            // reviewer means 4 and 6 → org 5, even though the raw ratings
            // pooled would give (3+5+6)/3
            summary(dec!(7), &[dec!(3), dec!(5)], &[dec!(4)]),
            summary(dec!(2), &[dec!(6)], &[dec!(6)]),
        ],
        config: config(2),
    };
    let out = aggregate_organization(&input).unwrap();
    let report = &out.result;

    assert_eq!(report.status, CohortStatus::Published);
    assert_eq!(report.sections.len(), 2);
    assert_eq!(report.sections[0].title, "People");
    assert_eq!(report.sections[0].reviewer_average, Some(dec!(5)));
    assert_eq!(report.sections[0].contributors, 2);
    assert_eq!(report.sections[1].reviewer_average, Some(dec!(5)));

    let coaching = report
        .competencies
        .iter()
        .find(|c| c.competency_id == "coaching")
        .unwrap();
    assert_eq!(coaching.reviewer_average, Some(dec!(5)));
}

#[test]
fn test_output_never_carries_self_ratings_or_comments() {
    let input = OrganizationInput {
        individuals: (0..6)
            .map(|i| summary(Decimal::from(i + 1), &[dec!(4), dec!(5)], &[dec!(6)]))
            .collect(),
        config: config(5),
    };
    let out = aggregate_organization(&input).unwrap();
    let json = serde_json::to_value(&out).unwrap();

    for key in ["self_average", "self_rating", "gap", "alignment"] {
        let mut found = Vec::new();
        values_under(&json, key, &mut found);
        assert!(!found.is_empty(), "expected '{}' fields in output", key);
        assert!(
            found.iter().all(|v| v.is_null()),
            "'{}' must always be null, got {:?}",
            key,
            found
        );
    }

    let mut comments = Vec::new();
    values_under(&json, "comments", &mut comments);
    assert!(comments
        .iter()
        .all(|v| v.as_array().map(|a| a.is_empty()).unwrap_or(false)));
    assert!(!json.to_string().contains("micromanages"));
}

#[test]
fn test_single_respondent_cohort_is_withheld() {
    let input = OrganizationInput {
        individuals: vec![summary(dec!(5), &[dec!(4)], &[dec!(4)])],
        config: None,
    };
    let out = aggregate_organization(&input).unwrap();
    assert_eq!(out.result.status, CohortStatus::InsufficientData);
    assert_eq!(out.result.cohort_size, 1);
    assert!(out.result.sections.is_empty());
    assert!(out.result.competencies.is_empty());
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_sections_without_enough_reviewer_data_are_suppressed() {
    let individuals = vec![
        summary(dec!(5), &[dec!(4)], &[]),
        summary(dec!(5), &[dec!(5)], &[]),
        summary(dec!(5), &[dec!(6)], &[dec!(6)]),
    ];
    let input = OrganizationInput {
        individuals,
        config: config(3),
    };
    let report = aggregate_organization(&input).unwrap().result;

    let titles: Vec<&str> = report.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["People"]);
    // Results section and the cohort-wide execution competency
    assert_eq!(report.suppressed, 2);
    assert!(report
        .competencies
        .iter()
        .all(|c| c.competency_id != "execution"));
}
