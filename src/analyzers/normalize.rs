//! Min-max rescaling of institution averages.
//!
//! Bounds are computed per call and passed explicitly to [`rescale`]; nothing
//! is fitted or cached between calls.

use tracing::{debug, warn};

use crate::analyzers::types::{InstitutionSummary, NormalizedSummary};
use crate::error::{RaterError, RaterResult};
use crate::record::{Direction, Metric, MetricValues};

/// Value assigned to every institution when a column has no spread.
pub const DEGENERATE_VALUE: f64 = 0.5;

/// Observed range of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// `None` for an empty iterator.
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(Bounds { min: v, max: v }),
            Some(b) => Some(Bounds {
                min: b.min.min(v),
                max: b.max.max(v),
            }),
        })
    }

    pub fn is_degenerate(&self) -> bool {
        self.half_span() == 0.0
    }

    // Halved so `max - min` stays finite for any pair of finite bounds.
    fn half_span(&self) -> f64 {
        self.max / 2.0 - self.min / 2.0
    }
}

/// Maps `x` linearly so `bounds.min` becomes 0 and `bounds.max` becomes 1.
pub fn rescale(x: f64, bounds: Bounds) -> f64 {
    if bounds.is_degenerate() {
        return DEGENERATE_VALUE;
    }
    ((x / 2.0 - bounds.min / 2.0) / bounds.half_span()).clamp(0.0, 1.0)
}

/// Resolves the direction of every metric from the two column sets.
///
/// The sets must be disjoint and together name all six metrics.
pub fn partition(beneficial: &[Metric], detrimental: &[Metric]) -> RaterResult<[Direction; 6]> {
    let mut directions: [Option<Direction>; 6] = [None; 6];

    for (set, direction) in [
        (beneficial, Direction::Beneficial),
        (detrimental, Direction::Detrimental),
    ] {
        for &metric in set {
            let slot = &mut directions[metric as usize];
            if slot.is_some() {
                return Err(RaterError::InvalidPartition {
                    reason: format!("metric {metric} is listed more than once"),
                });
            }
            *slot = Some(direction);
        }
    }

    let mut resolved = [Direction::Beneficial; 6];
    for metric in Metric::ALL {
        resolved[metric as usize] =
            directions[metric as usize].ok_or_else(|| RaterError::InvalidPartition {
                reason: format!("metric {metric} is neither beneficial nor detrimental"),
            })?;
    }
    Ok(resolved)
}

/// Rescales every metric to [0, 1] across `summaries`, inverting the
/// detrimental ones so higher is always better.
///
/// Output rows are aligned one-to-one with `summaries`.
///
/// # Errors
///
/// [`RaterError::EmptyDataset`] for no summaries, [`RaterError::InvalidPartition`]
/// when the column sets overlap or leave a metric out.
#[tracing::instrument(skip_all, fields(institutions = summaries.len()))]
pub fn normalize(
    summaries: &[InstitutionSummary],
    beneficial: &[Metric],
    detrimental: &[Metric],
) -> RaterResult<Vec<NormalizedSummary>> {
    let directions = partition(beneficial, detrimental)?;

    let mut column_bounds = [Bounds { min: 0.0, max: 0.0 }; 6];
    for metric in Metric::ALL {
        let bounds = Bounds::of(summaries.iter().map(|s| s.metrics.get(metric)))
            .ok_or(RaterError::EmptyDataset)?;
        if bounds.is_degenerate() {
            warn!(
                metric = %metric,
                value = bounds.min,
                "All institutions tie on metric; using {DEGENERATE_VALUE}"
            );
        } else {
            debug!(metric = %metric, min = bounds.min, max = bounds.max, "Column bounds");
        }
        column_bounds[metric as usize] = bounds;
    }

    Ok(summaries
        .iter()
        .map(|summary| NormalizedSummary {
            institution: summary.institution.clone(),
            metrics: MetricValues::from_fn(|metric| {
                let scaled = rescale(summary.metrics.get(metric), column_bounds[metric as usize]);
                match directions[metric as usize] {
                    Direction::Beneficial => scaled,
                    Direction::Detrimental => 1.0 - scaled,
                }
            }),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BENEFICIAL: [Metric; 3] = [
        Metric::ClientCount,
        Metric::SatisfactionScore,
        Metric::DigitalChannelUsagePercent,
    ];
    const DETRIMENTAL: [Metric; 3] = [
        Metric::ActiveRate,
        Metric::WaitTimeMinutes,
        Metric::MonthlyComplaints,
    ];

    fn summary(name: &str, f: impl FnMut(Metric) -> f64) -> InstitutionSummary {
        InstitutionSummary {
            institution: name.to_string(),
            records: 1,
            metrics: MetricValues::from_fn(f),
        }
    }

    #[test]
    fn test_rescale_endpoints() {
        let bounds = Bounds { min: 2.0, max: 6.0 };
        assert_eq!(rescale(2.0, bounds), 0.0);
        assert_eq!(rescale(4.0, bounds), 0.5);
        assert_eq!(rescale(6.0, bounds), 1.0);
    }

    #[test]
    fn test_rescale_degenerate_bounds() {
        let bounds = Bounds { min: 3.0, max: 3.0 };
        assert_eq!(rescale(3.0, bounds), DEGENERATE_VALUE);
    }

    #[test]
    fn test_rescale_extreme_bounds_stays_finite() {
        let bounds = Bounds { min: -1.7e308, max: 1.7e308 };
        assert_eq!(rescale(-1.7e308, bounds), 0.0);
        assert_eq!(rescale(0.0, bounds), 0.5);
        assert_eq!(rescale(1.7e308, bounds), 1.0);
        assert!(!bounds.is_degenerate());
    }

    #[test]
    fn test_bounds_of_empty() {
        assert_eq!(Bounds::of(Vec::new()), None);
        assert_eq!(
            Bounds::of(vec![3.0, -1.0, 2.0]),
            Some(Bounds { min: -1.0, max: 3.0 })
        );
    }

    #[test]
    fn test_detrimental_columns_are_inverted() {
        let summaries = vec![
            summary("A", |_| 1.5),
            summary("B", |_| 3.5),
            summary("C", |_| 5.5),
        ];
        let normalized = normalize(&summaries, &BENEFICIAL, &DETRIMENTAL).unwrap();

        assert_eq!(normalized[0].metrics.get(Metric::ActiveRate), 1.0);
        assert_eq!(normalized[1].metrics.get(Metric::ActiveRate), 0.5);
        assert_eq!(normalized[2].metrics.get(Metric::ActiveRate), 0.0);

        assert_eq!(normalized[0].metrics.get(Metric::ClientCount), 0.0);
        assert_eq!(normalized[2].metrics.get(Metric::ClientCount), 1.0);
    }

    #[test]
    fn test_single_institution_is_degenerate_not_crash() {
        let summaries = vec![summary("Only", |m| m as usize as f64 * 3.0)];
        let normalized = normalize(&summaries, &BENEFICIAL, &DETRIMENTAL).unwrap();

        assert_eq!(normalized.len(), 1);
        for (_, value) in normalized[0].metrics.iter() {
            assert_eq!(value, DEGENERATE_VALUE);
        }
    }

    #[test]
    fn test_values_stay_in_unit_interval() {
        let summaries = vec![
            summary("A", |m| (m as usize as f64 + 1.0) * 1000.0),
            summary("B", |m| -(m as usize as f64)),
            summary("C", |_| 0.001),
            summary("D", |m| if m == Metric::ClientCount { 1e9 } else { 42.0 }),
        ];
        let normalized = normalize(&summaries, &BENEFICIAL, &DETRIMENTAL).unwrap();

        for row in &normalized {
            for (_, value) in row.metrics.iter() {
                assert!((0.0..=1.0).contains(&value), "{value} out of range");
            }
        }
    }

    #[test]
    fn test_extreme_averages_normalize_without_nan() {
        let summaries = vec![
            summary("Low", |_| -1.7e308),
            summary("Mid", |_| 0.0),
            summary("High", |_| 1.7e308),
        ];
        let normalized = normalize(&summaries, &BENEFICIAL, &DETRIMENTAL).unwrap();

        for row in &normalized {
            for (_, value) in row.metrics.iter() {
                assert!((0.0..=1.0).contains(&value), "{value} out of range");
            }
        }
        assert_eq!(normalized[1].metrics.get(Metric::ClientCount), 0.5);
        assert_eq!(normalized[2].metrics.get(Metric::ClientCount), 1.0);
        assert_eq!(normalized[2].metrics.get(Metric::ActiveRate), 0.0);
    }

    #[test]
    fn test_output_aligned_with_input() {
        let summaries = vec![summary("Z", |_| 1.0), summary("A", |_| 2.0)];
        let normalized = normalize(&summaries, &BENEFICIAL, &DETRIMENTAL).unwrap();
        assert_eq!(normalized[0].institution, "Z");
        assert_eq!(normalized[1].institution, "A");
    }

    #[test]
    fn test_empty_summaries() {
        let result = normalize(&[], &BENEFICIAL, &DETRIMENTAL);
        assert!(matches!(result, Err(RaterError::EmptyDataset)));
    }

    #[test]
    fn test_overlapping_partition() {
        let result = partition(&[Metric::ActiveRate], &DETRIMENTAL);
        assert!(matches!(result, Err(RaterError::InvalidPartition { .. })));
    }

    #[test]
    fn test_incomplete_partition() {
        let err = partition(&BENEFICIAL, &[Metric::ActiveRate]).unwrap_err();
        assert!(err.to_string().contains("WaitTimeMinutes"));
    }
}
