//! Fixed schema of the monthly banking dataset.
//!
//! Every row carries a date, an institution name and the six [`Metric`]s.
//! Column names are checked against this schema when the file is loaded, so
//! nothing downstream looks columns up by string.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::RaterError;

/// Whether a higher raw value is better or worse for an institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Beneficial,
    Detrimental,
}

/// One of the six numeric metrics tracked per institution and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Metric {
    ActiveRate,
    ClientCount,
    SatisfactionScore,
    WaitTimeMinutes,
    MonthlyComplaints,
    DigitalChannelUsagePercent,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::ActiveRate,
        Metric::ClientCount,
        Metric::SatisfactionScore,
        Metric::WaitTimeMinutes,
        Metric::MonthlyComplaints,
        Metric::DigitalChannelUsagePercent,
    ];

    /// Canonical column header.
    pub fn name(self) -> &'static str {
        match self {
            Metric::ActiveRate => "ActiveRate",
            Metric::ClientCount => "ClientCount",
            Metric::SatisfactionScore => "SatisfactionScore",
            Metric::WaitTimeMinutes => "WaitTimeMinutes",
            Metric::MonthlyComplaints => "MonthlyComplaints",
            Metric::DigitalChannelUsagePercent => "DigitalChannelUsagePercent",
        }
    }

    /// Header used by the legacy Spanish-language exports of the dataset.
    pub fn legacy_name(self) -> &'static str {
        match self {
            Metric::ActiveRate => "Tasa_Activa",
            Metric::ClientCount => "Clientes",
            Metric::SatisfactionScore => "Satisfaccion_NPS",
            Metric::WaitTimeMinutes => "Tiempo_Espera_Min",
            Metric::MonthlyComplaints => "Reclamos_Mensuales",
            Metric::DigitalChannelUsagePercent => "Uso_Canales_Digitales_%",
        }
    }

    /// Default partition: interest rate, wait time and complaints are costs.
    pub fn default_direction(self) -> Direction {
        match self {
            Metric::ActiveRate | Metric::WaitTimeMinutes | Metric::MonthlyComplaints => {
                Direction::Detrimental
            }
            Metric::ClientCount
            | Metric::SatisfactionScore
            | Metric::DigitalChannelUsagePercent => Direction::Beneficial,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = RaterError;

    /// Accepts the canonical or legacy header, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Metric::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s) || m.legacy_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| RaterError::UnknownMetric { name: s.to_string() })
    }
}

/// The six metric values of a row or summary, indexed by [`Metric`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricValues([f64; 6]);

impl MetricValues {
    pub fn from_fn(mut f: impl FnMut(Metric) -> f64) -> Self {
        let mut values = [0.0; 6];
        for metric in Metric::ALL {
            values[metric.index()] = f(metric);
        }
        Self(values)
    }

    pub fn get(&self, metric: Metric) -> f64 {
        self.0[metric.index()]
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        self.0[metric.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL.into_iter().map(|m| (m, self.get(m)))
    }
}

impl Serialize for MetricValues {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(Metric::ALL.len()))?;
        for (metric, value) in self.iter() {
            map.serialize_entry(metric.name(), &value)?;
        }
        map.end()
    }
}

/// One month of metrics for one institution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub date: NaiveDate,
    pub institution: String,
    pub metrics: MetricValues,
}
