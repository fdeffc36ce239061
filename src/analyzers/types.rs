//! Data types produced by the scoring pipeline.

use serde::Serialize;

use crate::record::MetricValues;

/// Per-institution averages of every metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstitutionSummary {
    pub institution: String,
    /// Number of monthly records averaged.
    pub records: usize,
    pub metrics: MetricValues,
}

/// Metrics rescaled to [0, 1] across institutions, higher always better.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSummary {
    pub institution: String,
    pub metrics: MetricValues,
}

/// Raw averages of an institution together with its composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub institution: String,
    pub records: usize,
    pub metrics: MetricValues,
    pub score: f64,
}
