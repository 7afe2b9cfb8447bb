//! Core layer - fundamental types shared by the stage and the bridge.
//!
//! This module provides:
//! - [`EvaluationTime`] / [`Granularity`] - time addressing and authoring policy
//! - [`Ownership`] / [`Interpolation`] - channel ownership classes
//! - [`PrimKind`] / [`KindId`] - the static prim kind registry
//! - [`PrimPath`] - absolute prim paths

mod time;
mod sample;
mod kind;
mod path;

pub use time::{EvaluationTime, Granularity};
pub use sample::{Ownership, Interpolation};
pub use kind::{PrimKind, KindId, KIND_REGISTRY};
pub use path::PrimPath;
