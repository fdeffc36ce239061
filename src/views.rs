//! Ad-hoc filtered views over the raw records.

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use crate::analyzers::normalize::Bounds;
use crate::record::{Metric, Record};

/// One point of a metric's monthly series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Monthly series of a single metric for one institution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstitutionSeries {
    pub institution: String,
    pub points: Vec<SeriesPoint>,
}

/// Records of one institution, oldest first.
pub fn filter_institution<'a>(records: &'a [Record], institution: &str) -> Vec<&'a Record> {
    let mut rows: Vec<&Record> = records
        .iter()
        .filter(|r| r.institution == institution)
        .collect();
    rows.sort_by_key(|r| r.date);

    if rows.is_empty() {
        warn!(institution, "No records for institution");
    }
    rows
}

/// Records dated within `months` calendar months of the latest date in the
/// dataset, in their original order.
pub fn trailing_months(records: &[Record], months: u32) -> Vec<&Record> {
    let Some(latest) = records.iter().map(|r| r.date).max() else {
        return Vec::new();
    };
    let cutoff = latest
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN);
    debug!(%latest, %cutoff, months, "Trailing window");

    records.iter().filter(|r| r.date >= cutoff).collect()
}

/// Per-institution monthly series of `metric`, institutions by name and
/// points by date.
pub fn metric_series(records: &[Record], metric: Metric) -> Vec<InstitutionSeries> {
    let mut groups: BTreeMap<&str, Vec<SeriesPoint>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.institution.as_str())
            .or_default()
            .push(SeriesPoint {
                date: record.date,
                value: record.metrics.get(metric),
            });
    }

    groups
        .into_iter()
        .map(|(institution, mut points)| {
            points.sort_by_key(|p| p.date);
            InstitutionSeries {
                institution: institution.to_string(),
                points,
            }
        })
        .collect()
}

/// Lowest and highest raw value of `metric` across every record.
pub fn metric_range(records: &[Record], metric: Metric) -> Option<Bounds> {
    Bounds::of(records.iter().map(|r| r.metrics.get(metric)))
}
