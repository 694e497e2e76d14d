//! Sociometric analysis over both valences.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::network::models::{EdgeClassification, Network, NodeId, PerValence, Valence};
use crate::relevance::{EvidenceSource, Extreme, RelevantNodeSelector, RelevantRow};
use crate::stats::{DescriptiveStats, DescriptiveStatsEngine, RankOrder, Ranking};
use crate::AnalysisConfig;

use super::indices::{compute_indices, Indices, SociometricIndex};
use super::status::{classify, Balance, Impact, SociometricStatus, StatusThresholds};

/// Name of the status ranking.
pub const STATUS_METRIC: &str = "status";

/// One member's indices and classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SociometricRow {
    pub node: NodeId,
    #[serde(flatten)]
    pub indices: Indices,
    pub impact: Impact,
    pub balance: Balance,
    pub status: SociometricStatus,
}

/// Group-level cohesion (valence A) and conflict (valence B).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SociometricMacro {
    /// `2·pairs(A) / edges(A)`
    pub cohesion_i: f64,
    /// `pairs(A) / n`
    pub cohesion_ii: f64,
    /// `2·pairs(B) / edges(B)`
    pub conflict_i: f64,
    /// `pairs(B) / n`
    pub conflict_ii: f64,
    pub status_counts: BTreeMap<SociometricStatus, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SociometricReport {
    pub rows: Vec<SociometricRow>,
    pub thresholds: StatusThresholds,
    pub macro_stats: SociometricMacro,
    pub rankings: Vec<Ranking>,
    pub descriptives: BTreeMap<String, DescriptiveStats>,
    /// Sociometric evidence: `a` positive relevance, `b` negative relevance
    pub relevant: PerValence<Vec<RelevantRow>>,
}

impl SociometricReport {
    pub fn row(&self, node: &str) -> Option<&SociometricRow> {
        self.rows.iter().find(|r| r.node == node)
    }

    pub fn ranking(&self, metric: &str) -> Option<&Ranking> {
        self.rankings.iter().find(|r| r.metric == metric)
    }
}

pub struct SociometricEngine;

impl SociometricEngine {
    pub fn analyze(
        networks: &PerValence<Network>,
        classifications: &PerValence<EdgeClassification>,
        config: &AnalysisConfig,
    ) -> SociometricReport {
        let indexed = compute_indices(&networks.a.adjacency, &networks.b.adjacency);
        let indices: Vec<Indices> = indexed.iter().map(|(_, i)| *i).collect();
        let thresholds = StatusThresholds::select(&indices, config.quantile_tolerance);

        let rows: Vec<SociometricRow> = indexed
            .into_iter()
            .map(|(node, indices)| {
                let impact = thresholds.impact_of(indices.im);
                let balance = thresholds.balance_of(indices.bl);
                SociometricRow {
                    node,
                    indices,
                    impact,
                    balance,
                    status: classify(&indices, impact, balance),
                }
            })
            .collect();

        let macro_stats = Self::macro_stats(&rows, networks, classifications);
        let rankings = Self::rankings(&rows);
        let descriptives = DescriptiveStatsEngine::describe_columns(
            SociometricIndex::ALL
                .iter()
                .map(|&index| (index.name(), column(&rows, index))),
        );
        let relevant = Self::relevant(&rankings, config);

        tracing::debug!(
            nodes = rows.len(),
            impact_pair = ?(thresholds.impact.low_q, thresholds.impact.high_q),
            balance_pair = ?(thresholds.balance.low_q, thresholds.balance.high_q),
            "Sociometric statuses assigned"
        );

        SociometricReport {
            rows,
            thresholds,
            macro_stats,
            rankings,
            descriptives,
            relevant,
        }
    }

    fn macro_stats(
        rows: &[SociometricRow],
        networks: &PerValence<Network>,
        classifications: &PerValence<EdgeClassification>,
    ) -> SociometricMacro {
        let n = rows.len();
        let ratios = |valence: Valence| {
            let pairs = classifications.get(valence).reciprocal_pairs() as f64;
            let edges = networks.get(valence).edges.len();
            let per_edge = if edges == 0 { 0.0 } else { 2.0 * pairs / edges as f64 };
            let per_node = if n == 0 { 0.0 } else { pairs / n as f64 };
            (per_edge, per_node)
        };
        let (cohesion_i, cohesion_ii) = ratios(Valence::A);
        let (conflict_i, conflict_ii) = ratios(Valence::B);

        let mut status_counts = BTreeMap::new();
        for row in rows {
            *status_counts.entry(row.status).or_insert(0) += 1;
        }

        SociometricMacro {
            cohesion_i,
            cohesion_ii,
            conflict_i,
            conflict_ii,
            status_counts,
        }
    }

    /// Every index ranked descending, plus the status ranked by desirability.
    fn rankings(rows: &[SociometricRow]) -> Vec<Ranking> {
        let nodes: Vec<NodeId> = rows.iter().map(|r| r.node.clone()).collect();
        let mut rankings: Vec<Ranking> = SociometricIndex::ALL
            .iter()
            .map(|&index| {
                Ranking::from_values(
                    index.name(),
                    &nodes,
                    &column(rows, index),
                    RankOrder::Descending,
                )
            })
            .collect();

        let ordinals: Vec<f64> = rows.iter().map(|r| r.status.ordinal() as f64).collect();
        rankings.push(Ranking::from_values(
            STATUS_METRIC,
            &nodes,
            &ordinals,
            RankOrder::Ascending,
        ));
        rankings
    }

    /// Positive relevance from the favourable indices; negative relevance
    /// from received and given rejections plus the worst end of balance,
    /// activity and status.
    fn relevant(rankings: &[Ranking], config: &AnalysisConfig) -> PerValence<Vec<RelevantRow>> {
        use SociometricIndex::*;

        let selector = RelevantNodeSelector::new(config);
        let pick = |metrics: &[&str], valence: Valence, extreme: Extreme| -> Vec<RelevantRow> {
            rankings
                .iter()
                .filter(|r| metrics.contains(&r.metric.as_str()))
                .flat_map(|r| selector.select(r, valence, EvidenceSource::Sociometric, extreme))
                .collect()
        };

        let positive = [Rp, Gp, Mp, Bl, Or, Ai, Ii].map(SociometricIndex::name);
        let mut a = pick(&positive, Valence::A, Extreme::Best);
        a.extend(pick(&[STATUS_METRIC], Valence::A, Extreme::Best));

        let negative = [Rr, Gr, Mr, Im].map(SociometricIndex::name);
        let mut b = pick(&negative, Valence::B, Extreme::Best);
        b.extend(pick(
            &[Bl.name(), Ai.name(), STATUS_METRIC],
            Valence::B,
            Extreme::Worst,
        ));

        PerValence::new(a, b)
    }
}

fn column(rows: &[SociometricRow], index: SociometricIndex) -> Vec<f64> {
    rows.iter().map(|r| r.indices.get(index) as f64).collect()
}
