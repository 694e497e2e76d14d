//! Nomination network analysis.
//!
//! Builds one petgraph `DiGraph` per valence from the nomination lists and
//! computes everything that depends on a single valence (plus its
//! reference valence for edge classification).
//!
//! ## Architecture
//!
//! ```text
//! AnalysisInput ──► extraction ──► Network (A, B)
//!                                     │
//!                       ┌─────────────┼──────────────┐
//!                   classify     components        stats
//!                       │                            │
//!              EdgeClassification           MacroStats / MicroStats
//! ```
//!
//! ## Modules
//!
//! - [`models`]: Data structures (Valence, SocioGraph, AdjacencyMatrix, Network, records)
//! - [`extraction`]: `NetworkBuilder`: nominations → petgraph
//! - [`classify`]: `EdgeClassifier`: five reciprocity/cross-network buckets
//! - [`components`]: `ComponentFinder`: cliques, strong and weak components
//! - [`algorithms`]: Centralities and network-level measures
//! - [`stats`]: `NetworkStatsEngine`: macro/micro tables and rankings

pub mod algorithms;
pub mod classify;
pub mod components;
pub mod extraction;
pub mod models;
pub mod stats;

pub use classify::EdgeClassifier;
pub use components::ComponentFinder;
pub use extraction::NetworkBuilder;
pub use models::{
    AdjacencyMatrix, AnalysisInput, CentralityMetric, Component, ComponentKind, ComponentSet,
    DegreeStatus, EdgeClassification, EdgePair, MacroStats, MicroRow, MicroStats, Network, NodeId,
    Nomination, NominationEntry, PerValence, SocioGraph, Valence,
};
pub use stats::{CrossRankEntry, CrossValenceRanking, NetworkStatsEngine};
