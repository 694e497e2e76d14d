//! Extreme-rank selection per metric.
//!
//! For a ranking, the rank distribution's quantile at `relevance_quantile`
//! (best performers) or `1 − relevance_quantile` (worst performers) is the
//! cut-off. Selected nodes are re-ranked densely among themselves and get
//! the weight `weight_scale / rerank^weight_exponent`.

use serde::Serialize;

use crate::network::models::{NodeId, PerValence, Valence};
use crate::stats::{dense_rank, quantile, relevance_weight, RankOrder, Ranking};
use crate::AnalysisConfig;

/// Which layer produced a piece of evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    Network,
    Sociometric,
}

/// Which end of a ranking is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    /// Lowest ranks (rank 1 side)
    Best,
    /// Highest ranks
    Worst,
}

/// One selected (node, metric) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelevantRow {
    pub node: NodeId,
    pub valence: Valence,
    pub metric: String,
    pub value: f64,
    /// Rank in the full ranking
    pub rank: usize,
    /// Dense rank among the selected nodes
    pub relevance_rank: usize,
    pub weight: f64,
    pub source: EvidenceSource,
}

pub struct RelevantNodeSelector<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> RelevantNodeSelector<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Select from one ranking.
    ///
    /// When every node shares rank 1 the cut-off is 1 as well, so every
    /// node is selected at relevance rank 1.
    pub fn select(
        &self,
        ranking: &Ranking,
        valence: Valence,
        source: EvidenceSource,
        extreme: Extreme,
    ) -> Vec<RelevantRow> {
        let ranks: Vec<f64> = ranking.entries.iter().map(|e| e.rank as f64).collect();

        let q = self.config.relevance_quantile;
        let selected: Vec<_> = match extreme {
            Extreme::Best => {
                let cut = quantile(&ranks, q).unwrap_or(0.0);
                ranking.entries.iter().filter(|e| e.rank as f64 <= cut).collect()
            }
            Extreme::Worst => {
                let cut = quantile(&ranks, 1.0 - q).unwrap_or(f64::INFINITY);
                ranking.entries.iter().filter(|e| e.rank as f64 >= cut).collect()
            }
        };

        let order = match extreme {
            Extreme::Best => RankOrder::Ascending,
            Extreme::Worst => RankOrder::Descending,
        };
        let original: Vec<f64> = selected.iter().map(|e| e.rank as f64).collect();
        let reranked = dense_rank(&original, order);

        selected
            .into_iter()
            .zip(reranked)
            .map(|(entry, relevance_rank)| RelevantRow {
                node: entry.node.clone(),
                valence,
                metric: ranking.metric.clone(),
                value: entry.value,
                rank: entry.rank,
                relevance_rank,
                weight: relevance_weight(
                    relevance_rank,
                    self.config.weight_scale,
                    self.config.weight_exponent,
                ),
                source,
            })
            .collect()
    }

    /// Network evidence: best performers of every centrality ranking, per
    /// valence.
    pub fn select_network(
        &self,
        rankings: &PerValence<Vec<Ranking>>,
    ) -> PerValence<Vec<RelevantRow>> {
        rankings.map(|valence, list| {
            list.iter()
                .flat_map(|ranking| {
                    self.select(ranking, valence, EvidenceSource::Network, Extreme::Best)
                })
                .collect()
        })
    }
}
