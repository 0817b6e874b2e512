use chrono::{DateTime, Duration, TimeZone, Utc};
use feedback_analytics_core::config::WindowDurations;
use feedback_analytics_core::peers::{compare_to_peers, PeerInput};
use feedback_analytics_core::trends::{
    analyze_trends, compute_metrics, AssessmentRecord, MetricKind, TimeWindow, TrendInput,
};
use feedback_analytics_core::{AnalyticsConfig, TrendDirection};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap()
}

fn completed(days_ago: i64, minutes: i64, score: Decimal) -> AssessmentRecord {
    let started_at = as_of() - Duration::days(days_ago);
    AssessmentRecord {
        started_at,
        completed_at: Some(started_at + Duration::minutes(minutes)),
        score: Some(score),
    }
}

fn pending(days_ago: i64) -> AssessmentRecord {
    AssessmentRecord {
        started_at: as_of() - Duration::days(days_ago),
        completed_at: None,
        score: None,
    }
}

// ===========================================================================
// Trend engine
// ===========================================================================

#[test]
fn test_activity_only_in_current_window_is_full_increase() {
    let records = vec![
        completed(1, 20, dec!(5)),
        completed(2, 20, dec!(5)),
        completed(3, 20, dec!(5)),
        completed(4, 20, dec!(5)),
        completed(5, 20, dec!(5)),
    ];
    let out =
        compute_metrics(&records, TimeWindow::Month, as_of(), &WindowDurations::default()).unwrap();
    let count = out
        .metrics
        .iter()
        .find(|m| m.metric == MetricKind::CompletedCount)
        .unwrap();
    assert_eq!(count.value, dec!(5));
    assert_eq!(count.previous_value, dec!(0));
    assert_eq!(count.change_pct, dec!(100));
    assert_eq!(count.trend, TrendDirection::Up);
}

#[test]
fn test_equal_windows_are_stable() {
    let mut records: Vec<AssessmentRecord> = (1..=10).map(|d| completed(d, 30, dec!(6))).collect();
    records.extend((31..=40).map(|d| completed(d, 30, dec!(6))));
    let out =
        compute_metrics(&records, TimeWindow::Month, as_of(), &WindowDurations::default()).unwrap();

    for metric in &out.metrics {
        assert_eq!(metric.change_pct, dec!(0), "{}", metric.label);
        assert_eq!(metric.trend, TrendDirection::Stable, "{}", metric.label);
    }
    assert_eq!(out.current_records, 10);
    assert_eq!(out.previous_records, 10);
}

#[test]
fn test_quarter_window_with_completion_drop() {
    let records = vec![
        // current quarter: 1 of 4 completed
        completed(10, 45, dec!(4)),
        pending(20),
        pending(30),
        pending(40),
        // previous quarter: 2 of 2 completed
        completed(100, 15, dec!(6)),
        completed(120, 15, dec!(5)),
    ];
    let input = TrendInput {
        records,
        window: TimeWindow::Quarter,
        as_of: as_of(),
        config: None,
    };
    let out = analyze_trends(&input).unwrap();
    let metrics = &out.result.metrics;

    let completion = &metrics[0];
    assert_eq!(completion.metric, MetricKind::CompletionRate);
    assert_eq!(completion.value, dec!(25));
    assert_eq!(completion.previous_value, dec!(100));
    assert_eq!(completion.change_pct, dec!(-75));
    assert_eq!(completion.trend, TrendDirection::Down);

    let minutes = &metrics[3];
    assert_eq!(minutes.metric, MetricKind::AverageCompletionMinutes);
    assert_eq!(minutes.value, dec!(45));
    assert_eq!(minutes.previous_value, dec!(15));
    assert_eq!(minutes.change_pct, dec!(200));
    assert_eq!(minutes.trend, TrendDirection::Up);
}

#[test]
fn test_configured_window_length_is_used() {
    let mut config = AnalyticsConfig::default();
    config.windows.week_days = 14;
    let input = TrendInput {
        records: vec![completed(10, 5, dec!(3))],
        window: TimeWindow::Week,
        as_of: as_of(),
        config: Some(config),
    };
    let out = analyze_trends(&input).unwrap();
    assert_eq!(out.result.current_records, 1);
    assert_eq!(out.result.current_start, as_of() - Duration::days(14));
}

#[test]
fn test_invalid_window_config_rejected() {
    let mut config = AnalyticsConfig::default();
    config.windows.year_days = 0;
    let input = TrendInput {
        records: Vec::new(),
        window: TimeWindow::Year,
        as_of: as_of(),
        config: Some(config),
    };
    assert!(analyze_trends(&input).is_err());
}

#[test]
fn test_trend_input_parses_rfc3339_json() {
    let json = r#"{
        "records": [
            { "started_at": "2024-12-20T09:00:00Z", "completed_at": "2024-12-20T09:40:00Z", "score": "5.5" },
            { "started_at": "2024-12-21T09:00:00Z" }
        ],
        "window": "month",
        "as_of": "2024-12-31T00:00:00Z"
    }"#;
    let input: TrendInput = serde_json::from_str(json).unwrap();
    let out = analyze_trends(&input).unwrap();
    assert_eq!(out.result.metrics[0].value, dec!(50));
    assert_eq!(out.result.metrics[1].value, dec!(5.5));
    assert_eq!(out.result.metrics[3].value, dec!(40));
}

// ===========================================================================
// Peer comparison
// ===========================================================================

#[test]
fn test_peer_reference_population() {
    let out = compare_to_peers(&PeerInput {
        individual_score: dec!(5),
        population: vec![dec!(3), dec!(4), dec!(5), dec!(6), dec!(7)],
    })
    .unwrap();
    assert_eq!(out.result.percentile, Some(dec!(60)));
    assert_eq!(out.result.rank, Some(3));
    assert_eq!(out.result.population_size, 5);
    assert!(out.warnings.is_empty());
}

#[test]
fn test_peer_top_and_bottom() {
    let population = vec![dec!(3), dec!(4), dec!(5), dec!(6), dec!(7)];
    let top = compare_to_peers(&PeerInput {
        individual_score: dec!(7),
        population: population.clone(),
    })
    .unwrap()
    .result;
    assert_eq!(top.rank, Some(1));
    assert_eq!(top.percentile, Some(dec!(100)));

    let below_all = compare_to_peers(&PeerInput {
        individual_score: dec!(2),
        population,
    })
    .unwrap()
    .result;
    assert_eq!(below_all.rank, Some(6));
    assert_eq!(below_all.percentile, Some(dec!(0)));
}

#[test]
fn test_peer_empty_population_not_available() {
    let out = compare_to_peers(&PeerInput {
        individual_score: dec!(5),
        population: Vec::new(),
    })
    .unwrap();
    assert!(!out.result.available);
    assert_eq!(out.result.percentile, None);
    assert_eq!(out.result.rank, None);
}
