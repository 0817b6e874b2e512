pub mod engine;

pub use engine::{
    analyze_trends, compute_metrics, performance_metric, AssessmentRecord, MetricKind,
    PerformanceMetric, TimeWindow, TrendInput, TrendOutput,
};
