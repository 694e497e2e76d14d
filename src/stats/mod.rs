//! Statistical helpers shared by the network and sociometric layers.
//!
//! - [`ranking`]: dense ranks, rankings and relevance weights
//! - [`quantile`]: linear percentiles and adaptive threshold selection
//! - [`descriptive`]: summary statistics (`DescriptiveStatsEngine`)

pub mod descriptive;
pub mod quantile;
pub mod ranking;

pub use descriptive::{describe, DescriptiveStats, DescriptiveStatsEngine};
pub use quantile::{quantile, select_adaptive_quantiles, QuantileSelection};
pub use ranking::{dense_rank, relevance_weight, RankEntry, RankOrder, Ranking};
