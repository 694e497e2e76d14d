//! Network-level (macro) and node-level (micro) statistics.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::stats::{dense_rank, DescriptiveStats, DescriptiveStatsEngine, RankOrder, Ranking};
use crate::AnalysisConfig;

use super::algorithms::{
    betweenness_centrality, closeness_centrality, degree_centralization, density, hub_scores,
    in_degree_centrality, katz_centrality, pagerank, reciprocity, transitivity,
};
use super::models::{
    CentralityMetric, DegreeStatus, EdgeClassification, MacroStats, MicroRow, MicroStats, Network,
    NodeId,
};

/// A node's rank for one metric in both valences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossRankEntry {
    pub node: NodeId,
    pub rank_a: usize,
    pub rank_b: usize,
}

/// One metric ranked side by side across valences, sorted by `rank_a`
/// then `rank_b`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossValenceRanking {
    pub metric: CentralityMetric,
    pub entries: Vec<CrossRankEntry>,
}

pub struct NetworkStatsEngine;

impl NetworkStatsEngine {
    pub fn macro_stats(network: &Network, classification: &EdgeClassification) -> MacroStats {
        let graph = &network.graph;
        let reciprocal_pairs = classification.reciprocal_pairs();
        MacroStats {
            valence: network.valence,
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            reciprocal_pairs,
            density: density(graph),
            centralization: degree_centralization(graph),
            transitivity: transitivity(graph),
            reciprocity: reciprocity(reciprocal_pairs, graph.edge_count()),
        }
    }

    /// One row per member with every centrality and its dense rank.
    ///
    /// Nodes without any edge get every centrality forced to `0.0` before
    /// ranking, whatever the algorithm produced for them.
    pub fn micro_stats(network: &Network, config: &AnalysisConfig) -> Result<MicroStats> {
        let graph = &network.graph;
        let valence = network.valence;

        let mut columns: BTreeMap<CentralityMetric, Vec<f64>> = BTreeMap::new();
        columns.insert(CentralityMetric::InDegree, in_degree_centrality(graph));
        columns.insert(CentralityMetric::Katz, katz_centrality(graph, config, valence)?);
        columns.insert(CentralityMetric::PageRank, pagerank(graph, config));
        columns.insert(CentralityMetric::Betweenness, betweenness_centrality(graph));
        columns.insert(CentralityMetric::Closeness, closeness_centrality(graph));
        columns.insert(CentralityMetric::Hub, hub_scores(graph, config, valence));

        let statuses: Vec<DegreeStatus> = graph
            .graph
            .node_indices()
            .map(|idx| DegreeStatus::from_degrees(graph.in_degree(idx), graph.out_degree(idx)))
            .collect();

        for values in columns.values_mut() {
            for (value, status) in values.iter_mut().zip(&statuses) {
                if *status == DegreeStatus::Isolated {
                    *value = 0.0;
                }
            }
        }

        let ranks: BTreeMap<CentralityMetric, Vec<usize>> = columns
            .iter()
            .map(|(&metric, values)| (metric, dense_rank(values, RankOrder::Descending)))
            .collect();

        let rows = graph
            .graph
            .node_indices()
            .map(|idx| {
                let i = idx.index();
                MicroRow {
                    node: graph.graph[idx].clone(),
                    out_neighbors: graph.out_neighbors(idx),
                    in_degree: graph.in_degree(idx),
                    out_degree: graph.out_degree(idx),
                    degree_status: statuses[i],
                    centrality: columns.iter().map(|(&m, v)| (m, v[i])).collect(),
                    ranks: ranks.iter().map(|(&m, r)| (m, r[i])).collect(),
                }
            })
            .collect();

        Ok(MicroStats { valence, rows })
    }

    /// One ranking per centrality, rank 1 first.
    pub fn rankings(micro: &MicroStats) -> Vec<Ranking> {
        let nodes: Vec<NodeId> = micro.rows.iter().map(|r| r.node.clone()).collect();
        CentralityMetric::ALL
            .iter()
            .map(|&metric| {
                let values = micro.column(metric);
                let ranks: Vec<usize> = micro.rows.iter().map(|r| r.rank(metric)).collect();
                Ranking::from_ranks(metric.name(), &nodes, &values, &ranks)
            })
            .collect()
    }

    pub fn descriptives(micro: &MicroStats) -> BTreeMap<String, DescriptiveStats> {
        DescriptiveStatsEngine::describe_columns(
            CentralityMetric::ALL
                .iter()
                .map(|&metric| (metric.name(), micro.column(metric))),
        )
    }

    /// Side-by-side ranks of both valences. Both tables must cover the
    /// same members in the same order.
    pub fn cross_valence_rankings(a: &MicroStats, b: &MicroStats) -> Vec<CrossValenceRanking> {
        CentralityMetric::ALL
            .iter()
            .map(|&metric| {
                let mut entries: Vec<CrossRankEntry> = a
                    .rows
                    .iter()
                    .zip(&b.rows)
                    .map(|(row_a, row_b)| CrossRankEntry {
                        node: row_a.node.clone(),
                        rank_a: row_a.rank(metric),
                        rank_b: row_b.rank(metric),
                    })
                    .collect();
                entries.sort_by_key(|e| (e.rank_a, e.rank_b));
                CrossValenceRanking { metric, entries }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::classify::EdgeClassifier;
    use crate::network::extraction::NetworkBuilder;
    use crate::network::models::{AnalysisInput, NominationEntry, PerValence};

    fn build(a: &[(&str, Option<&str>)], b: &[(&str, Option<&str>)]) -> PerValence<Network> {
        let to_entries = |rows: &[(&str, Option<&str>)]| {
            rows.iter()
                .map(|(s, t)| NominationEntry::new(*s, *t))
                .collect::<Vec<_>>()
        };
        let input = AnalysisInput {
            a: to_entries(a),
            b: to_entries(b),
        };
        NetworkBuilder::build_all(&input).unwrap()
    }

    #[test]
    fn test_isolated_node_centralities_forced_to_zero() {
        let nets = build(
            &[("A", Some("B,C")), ("B", Some("A")), ("C", None), ("D", None)],
            &[],
        );
        let micro = NetworkStatsEngine::micro_stats(&nets.a, &AnalysisConfig::default()).unwrap();
        let d = micro.row("D").unwrap();

        assert_eq!(d.degree_status, DegreeStatus::Isolated);
        for metric in CentralityMetric::ALL {
            assert_eq!(d.value(metric), 0.0, "{}", metric);
        }
        assert_eq!(micro.row("C").unwrap().degree_status, DegreeStatus::NoOutgoing);
    }

    #[test]
    fn test_micro_ranks_descending_and_dense() {
        let nets = build(
            &[("A", Some("B,C")), ("B", Some("C")), ("C", None), ("D", Some("C"))],
            &[],
        );
        let micro = NetworkStatsEngine::micro_stats(&nets.a, &AnalysisConfig::default()).unwrap();

        // C is nominated three times
        assert_eq!(micro.row("C").unwrap().rank(CentralityMetric::InDegree), 1);
        assert_eq!(micro.row("B").unwrap().rank(CentralityMetric::InDegree), 2);
        assert_eq!(micro.row("A").unwrap().rank(CentralityMetric::InDegree), 3);
        assert_eq!(micro.row("D").unwrap().rank(CentralityMetric::InDegree), 3);

        let rankings = NetworkStatsEngine::rankings(&micro);
        assert_eq!(rankings.len(), CentralityMetric::ALL.len());
        assert_eq!(rankings[0].metric, "in_degree");
        assert_eq!(rankings[0].entries[0].node, "C");
    }

    #[test]
    fn test_macro_stats_reciprocal_pairs() {
        let nets = build(
            &[("A", Some("B,C")), ("B", Some("A")), ("C", None), ("D", None)],
            &[],
        );
        let c = EdgeClassifier::classify(&nets.a, &nets.b);
        let m = NetworkStatsEngine::macro_stats(&nets.a, &c);

        assert_eq!((m.node_count, m.edge_count, m.reciprocal_pairs), (4, 3, 1));
        assert!((m.density - 0.25).abs() < 1e-12);
        assert!((m.reciprocity - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_cross_valence_rankings_align_nodes() {
        let nets = build(
            &[("A", Some("B")), ("B", None), ("C", Some("B"))],
            &[("A", Some("C")), ("B", Some("C")), ("C", None)],
        );
        let config = AnalysisConfig::default();
        let a = NetworkStatsEngine::micro_stats(&nets.a, &config).unwrap();
        let b = NetworkStatsEngine::micro_stats(&nets.b, &config).unwrap();

        let cross = NetworkStatsEngine::cross_valence_rankings(&a, &b);
        let in_degree = &cross[0];
        assert_eq!(in_degree.metric, CentralityMetric::InDegree);
        assert_eq!(
            in_degree.entries[0],
            CrossRankEntry {
                node: "B".into(),
                rank_a: 1,
                rank_b: 2
            }
        );
        let c = in_degree.entries.iter().find(|e| e.node == "C").unwrap();
        assert_eq!((c.rank_a, c.rank_b), (2, 1));
    }
}
