use std::collections::HashMap;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::analyzers::types::{InstitutionSummary, NormalizedSummary, RankedResult};
use crate::error::{RaterError, RaterResult};
use crate::record::Metric;

/// How far the weight total may drift from 1.0 before a warning is logged.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Default weights used to rank institutions.
static DEFAULT_WEIGHTS: &[(Metric, f64)] = &[
    (Metric::ClientCount, 0.20),
    (Metric::SatisfactionScore, 0.25),
    (Metric::DigitalChannelUsagePercent, 0.15),
    (Metric::ActiveRate, 0.20),
    (Metric::WaitTimeMinutes, 0.10),
    (Metric::MonthlyComplaints, 0.10),
];

/// Mapping from metric to its share of the composite score.
#[derive(Debug, Clone, PartialEq)]
pub struct Weights(HashMap<Metric, f64>);

impl Default for Weights {
    fn default() -> Self {
        Self(DEFAULT_WEIGHTS.iter().copied().collect())
    }
}

impl Weights {
    /// Builds a mapping without validating it; [`Weights::validate`] does that.
    pub fn new(entries: impl IntoIterator<Item = (Metric, f64)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.0.get(&metric).copied()
    }

    /// Total over the six metrics, always added in [`Metric::ALL`] order.
    pub fn sum(&self) -> f64 {
        Metric::ALL.iter().filter_map(|m| self.get(*m)).sum()
    }

    /// Checks the mapping covers exactly the six metrics with non-negative,
    /// finite weights. Logs a warning when the total is not close to 1.0.
    pub fn validate(&self) -> RaterResult<()> {
        let missing: Vec<&str> = Metric::ALL
            .iter()
            .filter(|m| !self.0.contains_key(m))
            .map(|m| m.name())
            .collect();
        if !missing.is_empty() {
            return Err(RaterError::WeightMismatch {
                reason: format!("no weight for {}", missing.join(", ")),
            });
        }

        for metric in Metric::ALL {
            let w = self.0[&metric];
            if !w.is_finite() || w < 0.0 {
                return Err(RaterError::WeightMismatch {
                    reason: format!("weight for {metric} must be a non-negative number, got {w}"),
                });
            }
        }

        let total = self.sum();
        if !total.is_finite() {
            return Err(RaterError::WeightMismatch {
                reason: format!("weights add up to {total}"),
            });
        }
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            warn!(total, "Weights do not sum to 1.0; scores may fall outside [0, 1]");
        }

        Ok(())
    }
}

impl FromStr for Weights {
    type Err = RaterError;

    /// Parses `"Metric=0.2,Metric=0.3,..."`; metric names follow [`Metric::from_str`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut entries = HashMap::new();
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').ok_or_else(|| RaterError::WeightMismatch {
                reason: format!("expected 'Metric=weight', got '{pair}'"),
            })?;
            let metric: Metric = name.parse().map_err(|_| RaterError::WeightMismatch {
                reason: format!("'{}' is not one of the six metrics", name.trim()),
            })?;
            let weight: f64 = value.trim().parse().map_err(|_| RaterError::WeightMismatch {
                reason: format!("weight for {metric} is not a number: '{}'", value.trim()),
            })?;
            if entries.insert(metric, weight).is_some() {
                return Err(RaterError::WeightMismatch {
                    reason: format!("metric {metric} is weighted more than once"),
                });
            }
        }

        let weights = Weights(entries);
        weights.validate()?;
        Ok(weights)
    }
}

/// Combines normalized metrics into one score per institution and ranks them.
///
/// Scores are joined back onto the raw averages in `summaries` by institution
/// name. The sort is stable, so tied institutions keep their input order.
///
/// # Errors
///
/// [`RaterError::WeightMismatch`] if `weights` fails [`Weights::validate`],
/// [`RaterError::MissingNormalized`] if a summary has no normalized row.
#[tracing::instrument(skip_all, fields(institutions = summaries.len()))]
pub fn score(
    summaries: &[InstitutionSummary],
    normalized: &[NormalizedSummary],
    weights: &Weights,
) -> RaterResult<Vec<RankedResult>> {
    weights.validate()?;

    let scores: HashMap<&str, f64> = normalized
        .iter()
        .map(|n| {
            let total = n
                .metrics
                .iter()
                .map(|(metric, value)| weights.get(metric).unwrap_or(0.0) * value)
                .sum::<f64>();
            (n.institution.as_str(), total)
        })
        .collect();

    let mut ranked = summaries
        .iter()
        .map(|summary| {
            let score = scores
                .get(summary.institution.as_str())
                .copied()
                .ok_or_else(|| RaterError::MissingNormalized {
                    institution: summary.institution.clone(),
                })?;
            Ok(RankedResult {
                institution: summary.institution.clone(),
                records: summary.records,
                metrics: summary.metrics,
                score,
            })
        })
        .collect::<RaterResult<Vec<_>>>()?;

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    if let Some(top) = ranked.first() {
        debug!(top = %top.institution, score = top.score, "Institutions ranked");
    }
    Ok(ranked)
}
