pub mod analyzers;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod record;
pub mod stats;
pub mod views;

pub use analyzers::analyzer::rank;
pub use config::ScoringConfig;
pub use error::{RaterError, RaterResult};
pub use record::{Direction, Metric, MetricValues, Record};
