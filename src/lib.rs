//! Sociogram
//!
//! Sociometric analysis engine for small groups:
//! - Positive (A) and negative (B) nomination networks on petgraph
//! - Reciprocity and cross-network edge classification
//! - Centralities, components and network-level measures per valence
//! - Sociometric indices and adaptive-quantile status classification
//! - Relevant-node selection and cross-layer evidence aggregation
//!
//! The engine is a pure batch transform: [`AnalysisInput`] in,
//! [`AnalysisReport`] out. It does no I/O and keeps no state between calls.

pub mod engine;
pub mod error;
pub mod events;
pub mod network;
pub mod relevance;
pub mod sociometry;
pub mod stats;

pub use engine::{AnalysisEngine, AnalysisReport, NetworkReport, ReportBuilder, SociogramEngine};
pub use error::{AnalysisError, Result};
pub use events::{AnalysisEvent, ListenerSet, ProgressListener, Stage};
pub use network::{AnalysisInput, NominationEntry, Valence};

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// Configuration
// ============================================================================

/// Looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "sociogram.yaml";

/// Tuning parameters for the whole analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// PageRank damping factor (default: 0.85)
    pub pagerank_damping: f64,
    /// PageRank convergence tolerance (default: 1e-6)
    pub pagerank_tolerance: f64,
    /// PageRank maximum iterations (default: 100)
    pub pagerank_max_iterations: usize,
    /// Katz attenuation factor (default: 0.1)
    pub katz_alpha: f64,
    /// Katz exogenous centrality (default: 1.0)
    pub katz_beta: f64,
    /// Katz per-node tolerance, scaled by the node count (default: 1e-6)
    pub katz_tolerance: f64,
    /// Katz maximum iterations (default: 1000)
    pub katz_max_iterations: usize,
    /// HITS convergence tolerance (default: 1e-8)
    pub hits_tolerance: f64,
    /// HITS maximum iterations (default: 100)
    pub hits_max_iterations: usize,
    /// Share of best/worst ranks selected as relevant (default: 0.05)
    pub relevance_quantile: f64,
    /// Numerator of the relevance weight (default: 10.0)
    pub weight_scale: f64,
    /// Exponent of the relevance weight (default: 0.8)
    pub weight_exponent: f64,
    /// Bonus for nodes with network and sociometric evidence (default: 10.0)
    pub cross_source_bonus: f64,
    /// Minimum evidence rows for an aggregated node (default: 2)
    pub min_appearances: usize,
    /// Smallest reported clique/component (default: 3)
    pub min_component_size: usize,
    /// Acceptance band of the adaptive quantile selection (default: 0.05)
    pub quantile_tolerance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pagerank_damping: 0.85,
            pagerank_tolerance: 1e-6,
            pagerank_max_iterations: 100,
            katz_alpha: 0.1,
            katz_beta: 1.0,
            katz_tolerance: 1e-6,
            katz_max_iterations: 1000,
            hits_tolerance: 1e-8,
            hits_max_iterations: 100,
            relevance_quantile: 0.05,
            weight_scale: 10.0,
            weight_exponent: 0.8,
            cross_source_bonus: 10.0,
            min_appearances: 2,
            min_component_size: 3,
            quantile_tolerance: 0.05,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a YAML file, then apply `SOCIOGRAM_*`
    /// environment overrides.
    ///
    /// A missing or unparsable file falls back to defaults. The result is
    /// validated.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_yaml(yaml_path);
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Read the YAML file, or defaults when it is absent or invalid.
    fn load_yaml(yaml_path: Option<&Path>) -> Self {
        let path = yaml_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let Ok(contents) = std::fs::read_to_string(path) else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Self::default();
        };
        serde_yaml::from_str(&contents)
            .inspect(|_| tracing::info!(path = %path.display(), "Analysis config loaded"))
            .unwrap_or_else(|e| {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Invalid config file, using defaults"
                );
                Self::default()
            })
    }

    fn apply_env(&mut self) {
        env_override("SOCIOGRAM_PAGERANK_DAMPING", &mut self.pagerank_damping);
        env_override("SOCIOGRAM_PAGERANK_TOLERANCE", &mut self.pagerank_tolerance);
        env_override("SOCIOGRAM_PAGERANK_MAX_ITERATIONS", &mut self.pagerank_max_iterations);
        env_override("SOCIOGRAM_KATZ_ALPHA", &mut self.katz_alpha);
        env_override("SOCIOGRAM_KATZ_BETA", &mut self.katz_beta);
        env_override("SOCIOGRAM_KATZ_TOLERANCE", &mut self.katz_tolerance);
        env_override("SOCIOGRAM_KATZ_MAX_ITERATIONS", &mut self.katz_max_iterations);
        env_override("SOCIOGRAM_HITS_TOLERANCE", &mut self.hits_tolerance);
        env_override("SOCIOGRAM_HITS_MAX_ITERATIONS", &mut self.hits_max_iterations);
        env_override("SOCIOGRAM_RELEVANCE_QUANTILE", &mut self.relevance_quantile);
        env_override("SOCIOGRAM_WEIGHT_SCALE", &mut self.weight_scale);
        env_override("SOCIOGRAM_WEIGHT_EXPONENT", &mut self.weight_exponent);
        env_override("SOCIOGRAM_CROSS_SOURCE_BONUS", &mut self.cross_source_bonus);
        env_override("SOCIOGRAM_MIN_APPEARANCES", &mut self.min_appearances);
        env_override("SOCIOGRAM_MIN_COMPONENT_SIZE", &mut self.min_component_size);
        env_override("SOCIOGRAM_QUANTILE_TOLERANCE", &mut self.quantile_tolerance);
    }

    /// Reject values the algorithms cannot work with.
    pub fn validate(&self) -> Result<()> {
        let open_unit = |name: &str, v: f64| {
            if v > 0.0 && v < 1.0 {
                Ok(())
            } else {
                Err(AnalysisError::InvalidConfig(format!(
                    "{} must be in (0, 1), got {}",
                    name, v
                )))
            }
        };
        let positive = |name: &str, v: f64| {
            if v > 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(AnalysisError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, v
                )))
            }
        };

        open_unit("pagerank_damping", self.pagerank_damping)?;
        open_unit("relevance_quantile", self.relevance_quantile)?;
        positive("pagerank_tolerance", self.pagerank_tolerance)?;
        positive("katz_alpha", self.katz_alpha)?;
        positive("katz_beta", self.katz_beta)?;
        positive("katz_tolerance", self.katz_tolerance)?;
        positive("hits_tolerance", self.hits_tolerance)?;
        positive("weight_scale", self.weight_scale)?;
        positive("weight_exponent", self.weight_exponent)?;
        if self.cross_source_bonus < 0.0 {
            return Err(AnalysisError::InvalidConfig(
                "cross_source_bonus must not be negative".into(),
            ));
        }
        if !(0.0..0.5).contains(&self.quantile_tolerance) {
            return Err(AnalysisError::InvalidConfig(format!(
                "quantile_tolerance must be in [0, 0.5), got {}",
                self.quantile_tolerance
            )));
        }
        if self.pagerank_max_iterations == 0
            || self.katz_max_iterations == 0
            || self.hits_max_iterations == 0
        {
            return Err(AnalysisError::InvalidConfig(
                "iteration limits must be at least 1".into(),
            ));
        }
        if self.min_component_size < 2 {
            return Err(AnalysisError::InvalidConfig(
                "min_component_size must be at least 2".into(),
            ));
        }
        Ok(())
    }
}

fn env_override<T: FromStr>(name: &str, slot: &mut T) {
    let Ok(raw) = std::env::var(name) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *slot = value,
        Err(_) => tracing::warn!("Ignoring {}={}: not a valid value", name, raw),
    }
}

// ============================================================================
// Tests
// ============================================================================
