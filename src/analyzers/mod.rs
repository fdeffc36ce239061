//! Institution aggregation, normalization and composite scoring.
//!
//! Monthly records are averaged per institution, rescaled to [0, 1] so that
//! higher is better for every metric, and combined with a weight mapping into
//! one score used for ranking.

pub mod aggregate;
pub mod analyzer;
pub mod normalize;
pub mod score;
pub mod types;
pub mod utility;
