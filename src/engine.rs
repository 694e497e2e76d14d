//! Analysis engine: orchestrates the full pipeline.
//!
//! The `AnalysisEngine` trait is the single entry point for consumers (the
//! CLI, tests, embedding services). One call runs four fork-join stages,
//! each joined before the next starts:
//!
//! 1. **Build**: nominations → one `Network` per valence
//! 2. **Structure** (per valence): edge classification, components
//! 3. **Statistics** (per valence): macro stats, micro stats
//! 4. **Summaries**: per-valence descriptives and rankings, in parallel
//!    with the sociometric layer
//!
//! A final step merges cross-valence rankings and relevance evidence.
//! Stage outputs are collected in a [`ReportBuilder`]; reading a slot that
//! has not been filled yet is a [`AnalysisError::MissingStage`] error.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{AnalysisError, Result};
use crate::events::{AnalysisEvent, ListenerSet, ProgressListener, Stage};
use crate::network::models::{
    AnalysisInput, ComponentSet, EdgeClassification, MacroStats, MicroStats, Network, NodeId,
    PerValence, Valence,
};
use crate::network::{
    ComponentFinder, CrossValenceRanking, EdgeClassifier, NetworkBuilder, NetworkStatsEngine,
};
use crate::relevance::{CrossAnalysisAggregator, RelevantNode, RelevantNodeSelector, RelevantRow};
use crate::sociometry::{SociometricEngine, SociometricReport};
use crate::stats::{DescriptiveStats, Ranking};
use crate::AnalysisConfig;

// ============================================================================
// Output types
// ============================================================================

/// Everything computed for one valence.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkReport {
    #[serde(flatten)]
    pub network: Network,
    pub classification: EdgeClassification,
    pub components: ComponentSet,
    pub macro_stats: MacroStats,
    pub micro_stats: MicroStats,
    pub rankings: Vec<Ranking>,
    pub descriptives: BTreeMap<String, DescriptiveStats>,
}

/// The complete, immutable result of one analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub members: Vec<NodeId>,
    pub networks: PerValence<NetworkReport>,
    pub cross_valence_rankings: Vec<CrossValenceRanking>,
    /// Network-layer evidence before aggregation
    pub network_relevant: PerValence<Vec<RelevantRow>>,
    pub sociometry: SociometricReport,
    /// Aggregated relevance: `a` positive, `b` negative
    pub relevant: PerValence<Vec<RelevantNode>>,
}

impl AnalysisReport {
    pub fn network(&self, valence: Valence) -> &NetworkReport {
        self.networks.get(valence)
    }
}

// ============================================================================
// Report builder
// ============================================================================

/// Stage results, filled strictly in dependency order.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    networks: Option<PerValence<Network>>,
    classifications: Option<PerValence<EdgeClassification>>,
    components: Option<PerValence<ComponentSet>>,
    macro_stats: Option<PerValence<MacroStats>>,
    micro_stats: Option<PerValence<MicroStats>>,
    rankings: Option<PerValence<Vec<Ranking>>>,
    descriptives: Option<PerValence<BTreeMap<String, DescriptiveStats>>>,
    sociometry: Option<SociometricReport>,
    cross_valence_rankings: Option<Vec<CrossValenceRanking>>,
    network_relevant: Option<PerValence<Vec<RelevantRow>>>,
    relevant: Option<PerValence<Vec<RelevantNode>>>,
}

fn require<'a, T>(slot: &'a Option<T>, stage: &'static str) -> Result<&'a T> {
    slot.as_ref().ok_or(AnalysisError::MissingStage(stage))
}

fn take<T>(slot: Option<T>, stage: &'static str) -> Result<T> {
    slot.ok_or(AnalysisError::MissingStage(stage))
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn networks(&self) -> Result<&PerValence<Network>> {
        require(&self.networks, "networks")
    }

    pub fn classifications(&self) -> Result<&PerValence<EdgeClassification>> {
        require(&self.classifications, "classifications")
    }

    pub fn micro_stats(&self) -> Result<&PerValence<MicroStats>> {
        require(&self.micro_stats, "micro_stats")
    }

    pub fn rankings(&self) -> Result<&PerValence<Vec<Ranking>>> {
        require(&self.rankings, "rankings")
    }

    pub fn sociometry(&self) -> Result<&SociometricReport> {
        require(&self.sociometry, "sociometry")
    }

    pub fn network_relevant(&self) -> Result<&PerValence<Vec<RelevantRow>>> {
        require(&self.network_relevant, "network_relevant")
    }

    pub fn with_networks(self, networks: PerValence<Network>) -> Self {
        Self {
            networks: Some(networks),
            ..self
        }
    }

    pub fn with_structure(
        self,
        classifications: PerValence<EdgeClassification>,
        components: PerValence<ComponentSet>,
    ) -> Self {
        Self {
            classifications: Some(classifications),
            components: Some(components),
            ..self
        }
    }

    pub fn with_statistics(
        self,
        macro_stats: PerValence<MacroStats>,
        micro_stats: PerValence<MicroStats>,
    ) -> Self {
        Self {
            macro_stats: Some(macro_stats),
            micro_stats: Some(micro_stats),
            ..self
        }
    }

    pub fn with_summaries(
        self,
        descriptives: PerValence<BTreeMap<String, DescriptiveStats>>,
        rankings: PerValence<Vec<Ranking>>,
        sociometry: SociometricReport,
    ) -> Self {
        Self {
            descriptives: Some(descriptives),
            rankings: Some(rankings),
            sociometry: Some(sociometry),
            ..self
        }
    }

    pub fn with_cross_valence(
        self,
        cross_valence_rankings: Vec<CrossValenceRanking>,
        network_relevant: PerValence<Vec<RelevantRow>>,
    ) -> Self {
        Self {
            cross_valence_rankings: Some(cross_valence_rankings),
            network_relevant: Some(network_relevant),
            ..self
        }
    }

    pub fn with_relevant(self, relevant: PerValence<Vec<RelevantNode>>) -> Self {
        Self {
            relevant: Some(relevant),
            ..self
        }
    }

    /// Assemble the report. Fails if any stage is missing.
    pub fn build(self) -> Result<AnalysisReport> {
        let networks = take(self.networks, "networks")?;
        let classifications = take(self.classifications, "classifications")?;
        let components = take(self.components, "components")?;
        let macro_stats = take(self.macro_stats, "macro_stats")?;
        let micro_stats = take(self.micro_stats, "micro_stats")?;
        let rankings = take(self.rankings, "rankings")?;
        let descriptives = take(self.descriptives, "descriptives")?;

        let members = networks.a.members.clone();

        let PerValence { a: net_a, b: net_b } = networks;
        let PerValence { a: cls_a, b: cls_b } = classifications;
        let PerValence { a: cmp_a, b: cmp_b } = components;
        let PerValence { a: mac_a, b: mac_b } = macro_stats;
        let PerValence { a: mic_a, b: mic_b } = micro_stats;
        let PerValence { a: rnk_a, b: rnk_b } = rankings;
        let PerValence { a: dsc_a, b: dsc_b } = descriptives;

        Ok(AnalysisReport {
            members,
            networks: PerValence::new(
                NetworkReport {
                    network: net_a,
                    classification: cls_a,
                    components: cmp_a,
                    macro_stats: mac_a,
                    micro_stats: mic_a,
                    rankings: rnk_a,
                    descriptives: dsc_a,
                },
                NetworkReport {
                    network: net_b,
                    classification: cls_b,
                    components: cmp_b,
                    macro_stats: mac_b,
                    micro_stats: mic_b,
                    rankings: rnk_b,
                    descriptives: dsc_b,
                },
            ),
            cross_valence_rankings: take(self.cross_valence_rankings, "cross_valence_rankings")?,
            network_relevant: take(self.network_relevant, "network_relevant")?,
            sociometry: take(self.sociometry, "sociometry")?,
            relevant: take(self.relevant, "relevant")?,
        })
    }
}

// ============================================================================
// Trait
// ============================================================================

/// Analysis engine trait: single entry point for sociometric analysis.
///
/// Consumers use `Arc<dyn AnalysisEngine>` for dependency injection.
pub trait AnalysisEngine: Send + Sync {
    /// Run the whole pipeline on one request. Never returns a partial report.
    fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisReport>;
}

// ============================================================================
// Concrete implementation
// ============================================================================

/// Run `f` for both valences in parallel.
fn per_valence<T, F>(f: F) -> PerValence<T>
where
    T: Send,
    F: Fn(Valence) -> T + Sync,
{
    let (a, b) = rayon::join(|| f(Valence::A), || f(Valence::B));
    PerValence::new(a, b)
}

/// Like [`per_valence`], failing with the first error (valence A first).
fn try_per_valence<T, F>(f: F) -> Result<PerValence<T>>
where
    T: Send,
    F: Fn(Valence) -> Result<T> + Sync,
{
    let PerValence { a, b } = per_valence(f);
    Ok(PerValence::new(a?, b?))
}

pub struct SociogramEngine {
    config: AnalysisConfig,
    listeners: ListenerSet,
}

impl SociogramEngine {
    /// Create an engine with a validated configuration.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            listeners: ListenerSet::new(),
        })
    }

    pub fn with_listener(mut self, listener: Arc<dyn ProgressListener>) -> Self {
        self.listeners.add(listener);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn emit(&self, start: Instant, stage: Stage, valence: Option<Valence>) {
        let elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(stage = ?stage, valence = ?valence, elapsed_ms, "Stage completed");
        self.listeners.emit(&AnalysisEvent {
            stage,
            valence,
            elapsed_ms,
        });
    }

    fn structure(&self, start: Instant, builder: ReportBuilder) -> Result<ReportBuilder> {
        let networks = builder.networks()?;
        let min_size = self.config.min_component_size;

        let both = per_valence(|valence| {
            let network = networks.get(valence);
            let reference = networks.get(valence.other());
            let (classification, components) = rayon::join(
                || EdgeClassifier::classify(network, reference),
                || ComponentFinder::find(network, min_size),
            );
            self.emit(start, Stage::Classify, Some(valence));
            self.emit(start, Stage::Components, Some(valence));
            (classification, components)
        });

        let PerValence { a, b } = both;
        Ok(builder.with_structure(PerValence::new(a.0, b.0), PerValence::new(a.1, b.1)))
    }

    fn statistics(&self, start: Instant, builder: ReportBuilder) -> Result<ReportBuilder> {
        let networks = builder.networks()?;
        let classifications = builder.classifications()?;

        let both = try_per_valence(|valence| {
            let network = networks.get(valence);
            let (macro_stats, micro_stats) = rayon::join(
                || NetworkStatsEngine::macro_stats(network, classifications.get(valence)),
                || NetworkStatsEngine::micro_stats(network, &self.config),
            );
            self.emit(start, Stage::MacroStats, Some(valence));
            let micro_stats = micro_stats?;
            self.emit(start, Stage::MicroStats, Some(valence));
            Ok((macro_stats, micro_stats))
        })?;

        let PerValence { a, b } = both;
        Ok(builder.with_statistics(PerValence::new(a.0, b.0), PerValence::new(a.1, b.1)))
    }

    fn summaries(&self, start: Instant, builder: ReportBuilder) -> Result<ReportBuilder> {
        let networks = builder.networks()?;
        let classifications = builder.classifications()?;
        let micro = builder.micro_stats()?;

        let (per_network, sociometry) = rayon::join(
            || {
                per_valence(|valence| {
                    let stats = micro.get(valence);
                    let (descriptives, rankings) = rayon::join(
                        || NetworkStatsEngine::descriptives(stats),
                        || NetworkStatsEngine::rankings(stats),
                    );
                    self.emit(start, Stage::Descriptives, Some(valence));
                    self.emit(start, Stage::Rankings, Some(valence));
                    (descriptives, rankings)
                })
            },
            || {
                let report = SociometricEngine::analyze(networks, classifications, &self.config);
                self.emit(start, Stage::Sociometry, None);
                report
            },
        );

        let PerValence { a, b } = per_network;
        Ok(builder.with_summaries(
            PerValence::new(a.0, b.0),
            PerValence::new(a.1, b.1),
            sociometry,
        ))
    }

    fn aggregation(&self, start: Instant, builder: ReportBuilder) -> Result<ReportBuilder> {
        let micro = builder.micro_stats()?;
        let rankings = builder.rankings()?;

        let cross = NetworkStatsEngine::cross_valence_rankings(&micro.a, &micro.b);
        let network_relevant = RelevantNodeSelector::new(&self.config).select_network(rankings);
        let builder = builder.with_cross_valence(cross, network_relevant);

        let network_rows = builder.network_relevant()?;
        let sociometric_rows = &builder.sociometry()?.relevant;
        let rows = network_rows
            .a
            .iter()
            .chain(&network_rows.b)
            .chain(&sociometric_rows.a)
            .chain(&sociometric_rows.b)
            .cloned();
        let relevant = CrossAnalysisAggregator::aggregate(rows, &self.config);
        self.emit(start, Stage::Aggregation, None);

        Ok(builder.with_relevant(relevant))
    }
}

impl AnalysisEngine for SociogramEngine {
    fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisReport> {
        let start = Instant::now();

        let networks = NetworkBuilder::build_all(input)?;
        self.emit(start, Stage::Build, None);
        let builder = ReportBuilder::new().with_networks(networks);

        let builder = self.structure(start, builder)?;
        let builder = self.statistics(start, builder)?;
        let builder = self.summaries(start, builder)?;
        let builder = self.aggregation(start, builder)?;
        let report = builder.build()?;

        self.emit(start, Stage::Completed, None);
        tracing::info!(
            members = report.members.len(),
            edges_a = report.networks.a.network.edges.len(),
            edges_b = report.networks.b.network.edges.len(),
            relevant_a = report.relevant.a.len(),
            relevant_b = report.relevant.b.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Analysis completed"
        );
        Ok(report)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::models::{CentralityMetric, NominationEntry};
    use std::sync::Mutex;

    fn input() -> AnalysisInput {
        AnalysisInput {
            a: vec![
                NominationEntry::new("A", Some("B,C")),
                NominationEntry::new("B", Some("A")),
                NominationEntry::new("C", Some("A")),
                NominationEntry::new("D", None),
            ],
            b: vec![
                NominationEntry::new("A", None),
                NominationEntry::new("B", Some("C")),
                NominationEntry::new("C", Some("B")),
                NominationEntry::new("D", None),
            ],
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Stage>>);

    impl ProgressListener for Recorder {
        fn on_event(&self, event: &AnalysisEvent) -> anyhow::Result<()> {
            if let Ok(mut stages) = self.0.lock() {
                stages.push(event.stage);
            }
            Ok(())
        }
    }

    #[test]
    fn test_missing_stage_is_reported() {
        let builder = ReportBuilder::new();
        assert!(matches!(
            builder.classifications(),
            Err(AnalysisError::MissingStage("classifications"))
        ));
        assert!(matches!(
            ReportBuilder::new().build(),
            Err(AnalysisError::MissingStage("networks"))
        ));
    }

    #[test]
    fn test_stages_cannot_run_out_of_order() {
        let engine = SociogramEngine::new(AnalysisConfig::default()).unwrap();
        let networks = NetworkBuilder::build_all(&input()).unwrap();
        let builder = ReportBuilder::new().with_networks(networks);

        let err = engine.statistics(Instant::now(), builder).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingStage("classifications")));
    }

    #[test]
    fn test_full_pipeline_emits_every_stage_in_barrier_order() {
        let recorder = Arc::new(Recorder::default());
        let engine = SociogramEngine::new(AnalysisConfig::default())
            .unwrap()
            .with_listener(recorder.clone());
        let report = engine.analyze(&input()).unwrap();
        assert_eq!(report.members, vec!["A", "B", "C", "D"]);

        let stages = recorder.0.lock().unwrap().clone();
        assert_eq!(stages.first(), Some(&Stage::Build));
        assert_eq!(stages.last(), Some(&Stage::Completed));
        let position = |s: Stage| stages.iter().rposition(|&x| x == s).unwrap();
        let first = |s: Stage| stages.iter().position(|&x| x == s).unwrap();
        assert!(position(Stage::Classify) < first(Stage::MacroStats));
        assert!(position(Stage::MicroStats) < first(Stage::Rankings));
        assert!(position(Stage::Rankings) < first(Stage::Aggregation));
        // Two valences for each per-valence stage.
        assert_eq!(stages.iter().filter(|&&s| s == Stage::MicroStats).count(), 2);
    }

    #[test]
    fn test_invalid_config_rejected_up_front() {
        let config = AnalysisConfig {
            pagerank_damping: 1.5,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            SociogramEngine::new(config),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    /// Twelve members who all choose each other.
    fn dense_group() -> AnalysisInput {
        let names: Vec<String> = (b'A'..=b'L').map(|c| (c as char).to_string()).collect();
        let a = names
            .iter()
            .map(|source| {
                let targets: Vec<&str> = names
                    .iter()
                    .filter(|t| *t != source)
                    .map(String::as_str)
                    .collect();
                NominationEntry::new(source.as_str(), Some(targets.join(",").as_str()))
            })
            .collect();
        AnalysisInput { a, b: vec![] }
    }

    #[test]
    fn test_dense_group_completes() {
        let engine = SociogramEngine::new(AnalysisConfig::default()).unwrap();
        let report = engine.analyze(&dense_group()).unwrap();
        assert_eq!(report.networks.a.network.edges.len(), 12 * 11);
        let katz = report.networks.a.micro_stats.column(CentralityMetric::Katz);
        assert!(katz.iter().all(|v| (v - katz[0]).abs() < 1e-9 && *v > 0.0));
    }

    #[test]
    fn test_katz_iteration_limit_aborts_without_report() {
        let input = AnalysisInput {
            a: vec![
                NominationEntry::new("A", Some("B")),
                NominationEntry::new("B", Some("C")),
                NominationEntry::new("C", Some("A")),
            ],
            b: vec![],
        };
        let config = AnalysisConfig {
            katz_max_iterations: 2,
            ..AnalysisConfig::default()
        };
        let err = SociogramEngine::new(config).unwrap().analyze(&input).unwrap_err();
        assert!(matches!(err, AnalysisError::NoConvergence { valence: Valence::A, .. }));
    }
}
