//! Threat-feature NNUE input core.
//!
//! Translates board states into sparse feature indices — piece presence plus
//! piece-to-piece attacks — and maintains per-position accumulators equal to
//! `bias + sum of active weight columns`, updated incrementally along a
//! chain of positions with scratch recomputation behind refresh barriers.

pub mod feature;

mod accumulator;
mod cache;
mod chain;
mod diff;
mod error;
mod transformer;

pub use accumulator::{Accumulator, HIDDEN};
pub use cache::RefreshCache;
pub use chain::{Chain, DirtyEntry, DirtyPiece, MAX_DIRTY, StateInfo};
pub use diff::diff_sorted;
pub use error::ParamsError;
pub use feature::full::FullThreats;
pub use feature::simplified::SimplifiedThreats;
pub use feature::{FeatureSet, IndexList, MAX_ACTIVE, PRESENCE_DIMENSIONS};
pub use transformer::FeatureTransformer;
