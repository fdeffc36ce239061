use serde::Serialize;

use crate::analyzers::types::InstitutionSummary;
use crate::analyzers::utility::pearson;
use crate::record::Metric;

/// Metrics shown side by side in the comparison panel by default.
pub const COMPARISON_METRICS: [Metric; 3] = [
    Metric::ActiveRate,
    Metric::SatisfactionScore,
    Metric::MonthlyComplaints,
];

/// Long-format row of the comparison panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub institution: String,
    pub metric: Metric,
    pub value: f64,
}

/// Pearson correlations between every pair of metric averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    /// Row-major over [`Metric::ALL`]; `None` where undefined.
    pub values: [[Option<f64>; 6]; 6],
}

impl CorrelationMatrix {
    pub fn get(&self, a: Metric, b: Metric) -> Option<f64> {
        self.values[a as usize][b as usize]
    }
}

/// Unpivots the chosen metrics of every summary, one row per institution
/// and metric.
pub fn comparison(summaries: &[InstitutionSummary], metrics: &[Metric]) -> Vec<ComparisonRow> {
    summaries
        .iter()
        .flat_map(|s| {
            metrics.iter().map(move |&metric| ComparisonRow {
                institution: s.institution.clone(),
                metric,
                value: s.metrics.get(metric),
            })
        })
        .collect()
}

/// Correlates metric averages across institutions.
///
/// A pair is `None` when there are fewer than two institutions or either
/// column is constant.
pub fn correlation_matrix(summaries: &[InstitutionSummary]) -> CorrelationMatrix {
    let columns: Vec<Vec<f64>> = Metric::ALL
        .iter()
        .map(|&m| summaries.iter().map(|s| s.metrics.get(m)).collect())
        .collect();

    let mut values = [[None; 6]; 6];
    for (i, row) in values.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = pearson(&columns[i], &columns[j]);
        }
    }

    CorrelationMatrix { values }
}
