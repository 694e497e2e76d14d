//! Error types for the analysis engine.
//!
//! Every failure is fatal for the request: the engine never returns a
//! partially computed report. Callers recover by re-invoking with corrected
//! input or configuration.

use crate::network::models::Valence;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("malformed nomination in valence {valence} for '{source_id}': {detail}")]
    MalformedNomination {
        valence: Valence,
        source_id: String,
        detail: String,
    },

    #[error("valence {valence}: '{source_id}' nominates '{target}', which is not a group member")]
    UnknownMember {
        valence: Valence,
        source_id: String,
        target: String,
    },

    #[error("valence {valence}: member '{member}' is declared more than once")]
    DuplicateMember { valence: Valence, member: String },

    #[error("stage '{0}' was requested before it was computed")]
    MissingStage(&'static str),

    #[error("{algorithm} did not converge on valence {valence} after {iterations} iterations")]
    NoConvergence {
        algorithm: &'static str,
        valence: Valence,
        iterations: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
