//! Dense ranking and relevance weights.
//!
//! Dense ranking: tied values share a rank and the next distinct value gets
//! the previous rank + 1, so rank sequences never have gaps. Values are
//! compared after rounding to [`RANK_PRECISION`], which keeps iterative
//! algorithms' last-bit noise from splitting structurally tied nodes.

use serde::Serialize;

use crate::network::models::NodeId;

/// Values closer than this are treated as ties.
pub const RANK_PRECISION: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    /// Smallest value gets rank 1
    Ascending,
    /// Largest value gets rank 1
    Descending,
}

fn tie_key(value: f64) -> i64 {
    (value / RANK_PRECISION).round() as i64
}

/// Dense rank of every value, in input order.
pub fn dense_rank(values: &[f64], order: RankOrder) -> Vec<usize> {
    let mut keys: Vec<i64> = values.iter().map(|&v| tie_key(v)).collect();
    keys.sort_unstable();
    keys.dedup();
    if order == RankOrder::Descending {
        keys.reverse();
    }

    values
        .iter()
        .map(|&v| {
            let key = tie_key(v);
            let pos = match order {
                RankOrder::Ascending => keys.binary_search(&key),
                RankOrder::Descending => keys.binary_search_by(|probe| key.cmp(probe)),
            };
            pos.map(|p| p + 1).unwrap_or(0)
        })
        .collect()
}

/// `scale / rank^exponent`; strictly decreasing in `rank` for `rank ≥ 1`.
pub fn relevance_weight(rank: usize, scale: f64, exponent: f64) -> f64 {
    scale / (rank.max(1) as f64).powf(exponent)
}

/// One node's position in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankEntry {
    pub node: NodeId,
    pub value: f64,
    pub rank: usize,
}

/// Nodes of one metric, sorted by dense rank ascending (rank 1 first).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub metric: String,
    pub entries: Vec<RankEntry>,
}

impl Ranking {
    /// Rank `values` (aligned with `nodes`) and sort. Ties keep input order.
    pub fn from_values(
        metric: impl Into<String>,
        nodes: &[NodeId],
        values: &[f64],
        order: RankOrder,
    ) -> Self {
        let ranks = dense_rank(values, order);
        Self::from_ranks(metric, nodes, values, &ranks)
    }

    /// Build from precomputed ranks.
    pub fn from_ranks(
        metric: impl Into<String>,
        nodes: &[NodeId],
        values: &[f64],
        ranks: &[usize],
    ) -> Self {
        let mut entries: Vec<RankEntry> = nodes
            .iter()
            .zip(values)
            .zip(ranks)
            .map(|((node, &value), &rank)| RankEntry {
                node: node.clone(),
                value,
                rank,
            })
            .collect();
        entries.sort_by_key(|e| e.rank);
        Self {
            metric: metric.into(),
            entries,
        }
    }

    pub fn rank_of(&self, node: &str) -> Option<usize> {
        self.entries.iter().find(|e| e.node == node).map(|e| e.rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_dense(ranks: &[usize]) -> bool {
        let mut distinct: Vec<usize> = ranks.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        distinct.iter().enumerate().all(|(i, &r)| r == i + 1)
    }

    #[test]
    fn test_dense_rank_descending_with_ties() {
        let ranks = dense_rank(&[0.5, 0.9, 0.5, 0.1, 0.9], RankOrder::Descending);
        assert_eq!(ranks, vec![2, 1, 2, 3, 1]);
        assert!(is_dense(&ranks));
    }

    #[test]
    fn test_dense_rank_ascending_negative_values() {
        let ranks = dense_rank(&[-2.0, 3.0, 0.0, -2.0], RankOrder::Ascending);
        assert_eq!(ranks, vec![1, 3, 2, 1]);
    }

    #[test]
    fn test_float_noise_is_a_tie() {
        let ranks = dense_rank(&[0.2, 0.1 + 0.1, 0.3], RankOrder::Descending);
        assert_eq!(ranks, vec![2, 2, 1]);
    }

    #[test]
    fn test_dense_rank_many_shapes() {
        let samples: Vec<Vec<f64>> = vec![
            vec![],
            vec![1.0],
            vec![3.0, 3.0, 3.0],
            vec![5.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0],
            (0..40).map(|i| ((i * 7) % 11) as f64 / 3.0).collect(),
        ];
        for values in samples {
            for order in [RankOrder::Ascending, RankOrder::Descending] {
                assert!(is_dense(&dense_rank(&values, order)), "{:?}", values);
            }
        }
    }

    #[test]
    fn test_weight_strictly_decreasing() {
        let weights: Vec<f64> = (1..=50).map(|r| relevance_weight(r, 10.0, 0.8)).collect();
        assert!((weights[0] - 10.0).abs() < f64::EPSILON);
        assert!(weights.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_ranking_sorted_by_rank() {
        let nodes: Vec<NodeId> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let ranking = Ranking::from_values("x", &nodes, &[1.0, 3.0, 2.0], RankOrder::Descending);
        let order: Vec<&str> = ranking.entries.iter().map(|e| e.node.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
        assert_eq!(ranking.rank_of("A"), Some(3));
    }
}
