//! Run-time scoring configuration.
//!
//! There is no configuration file: callers start from [`ScoringConfig::default`]
//! and override the weights from the command line.

use crate::analyzers::score::Weights;
use crate::record::{Direction, Metric};

/// Column partition and weights driving one ranking run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub beneficial: Vec<Metric>,
    pub detrimental: Vec<Metric>,
    pub weights: Weights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let (beneficial, detrimental) = Metric::ALL
            .into_iter()
            .partition(|m| m.default_direction() == Direction::Beneficial);

        Self {
            beneficial,
            detrimental,
            weights: Weights::default(),
        }
    }
}

impl ScoringConfig {
    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_partition() {
        let config = ScoringConfig::default();
        assert_eq!(
            config.beneficial,
            vec![
                Metric::ClientCount,
                Metric::SatisfactionScore,
                Metric::DigitalChannelUsagePercent
            ]
        );
        assert_eq!(
            config.detrimental,
            vec![
                Metric::ActiveRate,
                Metric::WaitTimeMinutes,
                Metric::MonthlyComplaints
            ]
        );
    }

    #[test]
    fn test_with_weights_replaces_mapping() {
        let weights = Weights::new(Metric::ALL.map(|m| (m, 1.0 / 6.0)));
        let config = ScoringConfig::default().with_weights(weights.clone());
        assert_eq!(config.weights, weights);
    }
}
