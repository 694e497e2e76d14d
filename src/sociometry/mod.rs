//! Sociometric layer: indices, status classification, cohesion/conflict.
//!
//! - [`indices`]: rp, rr, gp, gr, mp, mr and the derived bl, or, im, ai, ii
//! - [`status`]: impact/balance bands and status rules
//! - [`engine`]: `SociometricEngine`: rows, rankings, macro indices, evidence

pub mod engine;
pub mod indices;
pub mod status;

pub use engine::{
    SociometricEngine, SociometricMacro, SociometricReport, SociometricRow, STATUS_METRIC,
};
pub use indices::{Indices, SociometricIndex};
pub use status::{Balance, Impact, SociometricStatus, StatusThresholds};
