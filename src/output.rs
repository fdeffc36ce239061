//! Output formatting and persistence for rankings and views.
//!
//! Supports plain-text tables, JSON serialization, and CSV export.

use std::fmt::{self, Write};
use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;
use tracing::debug;

use crate::analyzers::normalize::Bounds;
use crate::analyzers::types::RankedResult;
use crate::error::RaterResult;
use crate::record::{Metric, Record};
use crate::stats::{ComparisonRow, CorrelationMatrix};
use crate::views::InstitutionSeries;

/// Ranking table: position, institution and score.
pub fn render_ranking(ranked: &[RankedResult]) -> Result<String, fmt::Error> {
    let width = name_width(ranked.iter().map(|r| r.institution.as_str()));
    let mut out = String::new();

    writeln!(out, "### Weighted institution ranking ###")?;
    writeln!(out)?;
    writeln!(out, "{:>3}  {:<width$}  {:>6}", "#", "Institution", "Score")?;
    for (i, result) in ranked.iter().enumerate() {
        writeln!(
            out,
            "{:>3}  {:<width$}  {:>6.4}",
            i + 1,
            result.institution,
            result.score
        )?;
    }
    Ok(out)
}

/// Table of raw records with the chosen metric columns.
pub fn render_records(records: &[&Record], metrics: &[Metric]) -> Result<String, fmt::Error> {
    let width = name_width(records.iter().map(|r| r.institution.as_str()));
    let mut out = String::new();

    write!(out, "{:<10}  {:<width$}", "Date", "Institution")?;
    for metric in metrics {
        write!(out, "  {:>w$}", metric.name(), w = metric.name().len().max(10))?;
    }
    writeln!(out)?;

    for record in records {
        write!(out, "{:<10}  {:<width$}", record.date, record.institution)?;
        for metric in metrics {
            write!(
                out,
                "  {:>w$.2}",
                record.metrics.get(*metric),
                w = metric.name().len().max(10)
            )?;
        }
        writeln!(out)?;
    }
    Ok(out)
}

/// Comparison panel, one line per institution and metric.
pub fn render_comparison(rows: &[ComparisonRow]) -> Result<String, fmt::Error> {
    let width = name_width(rows.iter().map(|r| r.institution.as_str()));
    let mut out = String::new();

    writeln!(out, "### Key metrics by institution ###")?;
    for row in rows {
        writeln!(
            out,
            "{:<width$}  {:<26}  {:>14.2}",
            row.institution,
            row.metric.name(),
            row.value
        )?;
    }
    Ok(out)
}

/// Correlation matrix; undefined cells print as `n/a`.
pub fn render_correlations(matrix: &CorrelationMatrix) -> Result<String, fmt::Error> {
    let mut out = String::new();

    writeln!(out, "### Correlations between metric averages ###")?;
    write!(out, "{:<26}", "")?;
    for metric in Metric::ALL {
        write!(out, "  {:>8}", abbreviate(metric))?;
    }
    writeln!(out)?;

    for a in Metric::ALL {
        write!(out, "{:<26}", a.name())?;
        for b in Metric::ALL {
            match matrix.get(a, b) {
                Some(r) => write!(out, "  {:>8.2}", r)?,
                None => write!(out, "  {:>8}", "n/a")?,
            }
        }
        writeln!(out)?;
    }
    Ok(out)
}

/// Monthly series per institution, followed by the dataset-wide band.
pub fn render_series(
    metric: Metric,
    series: &[InstitutionSeries],
    range: Option<Bounds>,
) -> Result<String, fmt::Error> {
    let mut out = String::new();

    writeln!(out, "### Monthly {} by institution ###", metric.name())?;
    for entry in series {
        writeln!(out, "{}", entry.institution)?;
        for point in &entry.points {
            writeln!(out, "  {}  {:>12.2}", point.date, point.value)?;
        }
    }
    if let Some(bounds) = range {
        writeln!(out, "Range across all institutions: {:.2} .. {:.2}", bounds.min, bounds.max)?;
    }
    Ok(out)
}

/// Pretty-printed JSON of any serializable view.
pub fn to_json(value: &impl Serialize) -> RaterResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Writes the ranking as CSV: institution, record count, the six raw
/// averages and the score. Overwrites `path`.
pub fn write_ranking_csv(path: impl AsRef<Path>, ranked: &[RankedResult]) -> RaterResult<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), rows = ranked.len(), "Writing ranking CSV");

    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;

    let mut header = vec!["InstitutionName".to_string(), "Records".to_string()];
    header.extend(Metric::ALL.iter().map(|m| m.name().to_string()));
    header.push("Score".to_string());
    writer.write_record(&header)?;

    for result in ranked {
        let mut row = vec![result.institution.clone(), result.records.to_string()];
        row.extend(result.metrics.iter().map(|(_, v)| v.to_string()));
        row.push(result.score.to_string());
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names.map(|n| n.chars().count()).max().unwrap_or(0).max("Institution".len())
}

fn abbreviate(metric: Metric) -> &'static str {
    match metric {
        Metric::ActiveRate => "Rate",
        Metric::ClientCount => "Clients",
        Metric::SatisfactionScore => "NPS",
        Metric::WaitTimeMinutes => "Wait",
        Metric::MonthlyComplaints => "Claims",
        Metric::DigitalChannelUsagePercent => "Digital%",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MetricValues;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn ranked() -> Vec<RankedResult> {
        vec![
            RankedResult {
                institution: "Bancolombia".to_string(),
                records: 12,
                metrics: MetricValues::from_fn(|_| 2.0),
                score: 0.8125,
            },
            RankedResult {
                institution: "BBVA".to_string(),
                records: 12,
                metrics: MetricValues::from_fn(|_| 1.0),
                score: 0.25,
            },
        ]
    }

    #[test]
    fn test_render_ranking() {
        let table = render_ranking(&ranked()).unwrap();
        let lines: Vec<_> = table.lines().collect();

        assert!(lines[2].contains("Institution"));
        assert!(lines[3].contains("Bancolombia"));
        assert!(lines[3].contains("0.8125"));
        assert!(lines[4].trim_start().starts_with('2'));
    }

    #[test]
    fn test_render_correlations_marks_undefined() {
        let matrix = CorrelationMatrix {
            values: [[None; 6]; 6],
        };
        let table = render_correlations(&matrix).unwrap();
        assert!(table.contains("n/a"));
        assert_eq!(table.lines().count(), 8);
    }

    #[test]
    fn test_render_records_and_series() {
        let record = Record {
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            institution: "Davivienda".to_string(),
            metrics: MetricValues::from_fn(|_| 14.5),
        };
        let table = render_records(&[&record], &[Metric::ActiveRate]).unwrap();
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("2024-03-01"));
        assert!(lines[1].ends_with("14.50"));

        let bounds = Bounds { min: 1.0, max: 2.0 };
        let series = render_series(Metric::ActiveRate, &[], Some(bounds)).unwrap();
        assert!(series.ends_with("1.00 .. 2.00\n"));
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&ranked()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["institution"], "Bancolombia");
        assert_eq!(parsed[0]["metrics"]["ActiveRate"], 2.0);
    }

    #[test]
    fn test_write_ranking_csv() {
        let path = temp_path("bank_rater_test_ranking.csv");
        let _ = fs::remove_file(&path);

        write_ranking_csv(&path, &ranked()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("InstitutionName,Records,ActiveRate"));
        assert!(lines[0].ends_with("Score"));
        assert!(lines[1].starts_with("Bancolombia,12,2,"));
        assert!(lines[1].ends_with("0.8125"));

        fs::remove_file(&path).unwrap();
    }
}
