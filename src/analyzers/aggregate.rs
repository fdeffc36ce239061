use std::collections::BTreeMap;

use tracing::debug;

use crate::analyzers::types::InstitutionSummary;
use crate::analyzers::utility::mean;
use crate::error::{RaterError, RaterResult};
use crate::record::{MetricValues, Record};

/// Groups records by institution and averages every metric.
///
/// Summaries come back ordered by institution name so repeated runs over the
/// same data produce identical output.
///
/// # Errors
///
/// [`RaterError::EmptyDataset`] when `records` is empty,
/// [`RaterError::MalformedInput`] when an average overflows.
#[tracing::instrument(skip(records), fields(records = records.len()))]
pub fn aggregate(records: &[Record]) -> RaterResult<Vec<InstitutionSummary>> {
    if records.is_empty() {
        return Err(RaterError::EmptyDataset);
    }

    let mut groups: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for record in records {
        groups.entry(record.institution.as_str()).or_default().push(record);
    }

    let summaries = groups
        .into_iter()
        .map(|(institution, rows)| {
            let metrics = MetricValues::from_fn(|metric| {
                let series: Vec<f64> = rows.iter().map(|r| r.metrics.get(metric)).collect();
                mean(&series)
            });

            // finite inputs can still overflow when summed
            if let Some((metric, value)) = metrics.iter().find(|(_, v)| !v.is_finite()) {
                return Err(RaterError::malformed(
                    None,
                    metric.name(),
                    format!("average for institution '{institution}' is not finite ({value})"),
                ));
            }

            Ok(InstitutionSummary {
                institution: institution.to_string(),
                records: rows.len(),
                metrics,
            })
        })
        .collect::<RaterResult<Vec<_>>>()?;

    debug!(institutions = summaries.len(), "Records aggregated");
    Ok(summaries)
}
