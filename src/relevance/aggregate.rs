//! Merge relevant-node evidence from both layers.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::network::models::{NodeId, PerValence, Valence};
use crate::AnalysisConfig;

use super::selector::{EvidenceSource, RelevantRow};

/// One metric that put a node on the relevance list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evidence {
    pub metric: String,
    pub value: f64,
    pub rank: usize,
    pub source: EvidenceSource,
}

/// A node with enough evidence to be reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelevantNode {
    pub node: NodeId,
    pub valence: Valence,
    pub evidence: Vec<Evidence>,
    pub sources: BTreeSet<EvidenceSource>,
    pub weight: f64,
}

pub struct CrossAnalysisAggregator;

impl CrossAnalysisAggregator {
    /// Group rows by (node, valence), keep nodes with at least
    /// `min_appearances` rows, add `cross_source_bonus` when both layers
    /// contributed, and sort by weight descending (node id breaks ties).
    pub fn aggregate<I>(rows: I, config: &AnalysisConfig) -> PerValence<Vec<RelevantNode>>
    where
        I: IntoIterator<Item = RelevantRow>,
    {
        let mut grouped: BTreeMap<(Valence, NodeId), RelevantNode> = BTreeMap::new();
        for row in rows {
            let entry = grouped
                .entry((row.valence, row.node.clone()))
                .or_insert_with(|| RelevantNode {
                    node: row.node.clone(),
                    valence: row.valence,
                    evidence: Vec::new(),
                    sources: BTreeSet::new(),
                    weight: 0.0,
                });
            entry.weight += row.weight;
            entry.sources.insert(row.source);
            entry.evidence.push(Evidence {
                metric: row.metric,
                value: row.value,
                rank: row.rank,
                source: row.source,
            });
        }

        let mut out: PerValence<Vec<RelevantNode>> = PerValence::new(Vec::new(), Vec::new());
        for (_, mut node) in grouped {
            if node.evidence.len() < config.min_appearances {
                continue;
            }
            if node.sources.len() > 1 {
                node.weight += config.cross_source_bonus;
            }
            match node.valence {
                Valence::A => out.a.push(node),
                Valence::B => out.b.push(node),
            }
        }

        for list in [&mut out.a, &mut out.b] {
            list.sort_by(|x, y| {
                y.weight
                    .total_cmp(&x.weight)
                    .then_with(|| x.node.cmp(&y.node))
            });
        }

        tracing::debug!(
            relevant_a = out.a.len(),
            relevant_b = out.b.len(),
            "Relevant nodes aggregated"
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        node: &str,
        valence: Valence,
        metric: &str,
        weight: f64,
        source: EvidenceSource,
    ) -> RelevantRow {
        RelevantRow {
            node: node.to_string(),
            valence,
            metric: metric.to_string(),
            value: 1.0,
            rank: 1,
            relevance_rank: 1,
            weight,
            source,
        }
    }

    #[test]
    fn test_single_appearance_is_dropped() {
        let out = CrossAnalysisAggregator::aggregate(
            vec![row("A", Valence::A, "katz", 10.0, EvidenceSource::Network)],
            &AnalysisConfig::default(),
        );
        assert!(out.a.is_empty() && out.b.is_empty());
    }

    #[test]
    fn test_weights_summed_with_cross_source_bonus() {
        let rows = vec![
            row("A", Valence::A, "katz", 10.0, EvidenceSource::Network),
            row("A", Valence::A, "rp", 5.0, EvidenceSource::Sociometric),
            row("B", Valence::A, "katz", 10.0, EvidenceSource::Network),
            row("B", Valence::A, "hub", 10.0, EvidenceSource::Network),
            row("B", Valence::B, "rr", 10.0, EvidenceSource::Sociometric),
        ];
        let out = CrossAnalysisAggregator::aggregate(rows, &AnalysisConfig::default());

        let order: Vec<(&str, f64)> = out.a.iter().map(|n| (n.node.as_str(), n.weight)).collect();
        assert_eq!(order, vec![("A", 25.0), ("B", 20.0)]);
        assert_eq!(out.a[0].evidence.len(), 2);
        // B's single B-valence row does not qualify on its own.
        assert!(out.b.is_empty());
    }

    #[test]
    fn test_equal_weights_sorted_by_node() {
        let rows = vec![
            row("C", Valence::B, "x", 3.0, EvidenceSource::Network),
            row("C", Valence::B, "y", 3.0, EvidenceSource::Network),
            row("A", Valence::B, "x", 3.0, EvidenceSource::Network),
            row("A", Valence::B, "y", 3.0, EvidenceSource::Network),
        ];
        let out = CrossAnalysisAggregator::aggregate(rows, &AnalysisConfig::default());
        let nodes: Vec<&str> = out.b.iter().map(|n| n.node.as_str()).collect();
        assert_eq!(nodes, vec!["A", "C"]);
    }
}
