//! CSV loader for the monthly banking dataset.
//!
//! The header row is resolved against the fixed [`Metric`] schema before any
//! row is read. Any problem in any row fails the whole load.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::error::{RaterError, RaterResult};
use crate::record::{Metric, MetricValues, Record};

const DATE_COLUMN: (&str, &str) = ("Date", "Fecha");
const INSTITUTION_COLUMN: (&str, &str) = ("InstitutionName", "Banco");

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Positions of the required columns within the header row.
struct ColumnMap {
    date: usize,
    institution: usize,
    metrics: [(Metric, usize); 6],
}

impl ColumnMap {
    fn resolve(headers: &StringRecord) -> RaterResult<Self> {
        let find = |canonical: &str, legacy: &str| -> RaterResult<usize> {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(canonical) || h.eq_ignore_ascii_case(legacy))
                .ok_or_else(|| RaterError::malformed(None, canonical, "required column is missing"))
        };

        let date = find(DATE_COLUMN.0, DATE_COLUMN.1)?;
        let institution = find(INSTITUTION_COLUMN.0, INSTITUTION_COLUMN.1)?;

        let mut metrics = [(Metric::ActiveRate, 0); 6];
        for (slot, metric) in metrics.iter_mut().zip(Metric::ALL) {
            *slot = (metric, find(metric.name(), metric.legacy_name())?);
        }

        Ok(Self {
            date,
            institution,
            metrics,
        })
    }
}

/// Loads every record from the CSV file at `path`.
///
/// # Errors
///
/// [`RaterError::Io`] if the file cannot be opened, [`RaterError::MalformedInput`]
/// for a missing column or a bad value, [`RaterError::Csv`] for structural CSV
/// problems such as a row with the wrong number of fields.
#[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_records(path: impl AsRef<Path>) -> RaterResult<Vec<Record>> {
    let file = File::open(path.as_ref())?;
    let records = read_records(file)?;
    info!(records = records.len(), "Dataset loaded");
    Ok(records)
}

/// Parses records from any reader producing CSV with a header row.
pub fn read_records<R: Read>(reader: R) -> RaterResult<Vec<Record>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let columns = ColumnMap::resolve(rdr.headers()?)?;
    debug!(
        date_col = columns.date,
        institution_col = columns.institution,
        "Header resolved"
    );

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        records.push(parse_row(&row, &columns)?);
    }

    Ok(records)
}

fn parse_row(row: &StringRecord, columns: &ColumnMap) -> RaterResult<Record> {
    let line = row.position().map(|p| p.line());
    let field = |idx: usize| row.get(idx).unwrap_or_default();

    let raw_date = field(columns.date);
    let date = parse_date(raw_date).ok_or_else(|| {
        RaterError::malformed(line, DATE_COLUMN.0, format!("unparseable date '{raw_date}'"))
    })?;

    let institution = field(columns.institution);
    if institution.is_empty() {
        return Err(RaterError::malformed(
            line,
            INSTITUTION_COLUMN.0,
            "institution name is empty",
        ));
    }

    let mut metrics = MetricValues::default();
    for (metric, idx) in columns.metrics {
        let raw = field(idx);
        let value: f64 = raw.parse().map_err(|_| {
            RaterError::malformed(line, metric.name(), format!("expected a number, got '{raw}'"))
        })?;
        if !value.is_finite() {
            return Err(RaterError::malformed(
                line,
                metric.name(),
                format!("value '{raw}' is not finite"),
            ));
        }
        metrics.set(metric, value);
    }

    Ok(Record {
        date,
        institution: institution.to_string(),
        metrics,
    })
}

/// Parses a calendar date, dropping any time-of-day component.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}
