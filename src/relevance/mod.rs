//! Relevant-node selection and cross-layer aggregation.
//!
//! - [`selector`]: `RelevantNodeSelector`: extreme ranks per metric, weighted
//! - [`aggregate`]: `CrossAnalysisAggregator`: per-node evidence merge

pub mod aggregate;
pub mod selector;

pub use aggregate::{CrossAnalysisAggregator, Evidence, RelevantNode};
pub use selector::{EvidenceSource, Extreme, RelevantNodeSelector, RelevantRow};
