use tracing::info;

use crate::analyzers::aggregate::aggregate;
use crate::analyzers::normalize::normalize;
use crate::analyzers::score::score;
use crate::analyzers::types::RankedResult;
use crate::config::ScoringConfig;
use crate::error::RaterResult;
use crate::record::Record;

/// Runs aggregate, normalize and score over `records`.
#[tracing::instrument(skip_all, fields(records = records.len()))]
pub fn rank(records: &[Record], config: &ScoringConfig) -> RaterResult<Vec<RankedResult>> {
    let summaries = aggregate(records)?;
    let normalized = normalize(&summaries, &config.beneficial, &config.detrimental)?;
    let ranked = score(&summaries, &normalized, &config.weights)?;

    info!(institutions = ranked.len(), "Ranking complete");
    Ok(ranked)
}
