//! Translation between foreign point geometry and stage prims.
//!
//! This module provides:
//! - [`GeometryBridge`] - read (`refine`) and write (`update_from_prim`) passes
//! - [`AttributeFilter`] - pattern-based primvar selection
//! - [`names`] - the canonical channel table
//! - [`TransformCache`] - memoized transform composition
//! - [`batch`] - parallel translation of distinct prims

pub mod batch;
mod context;
mod filter;
pub mod names;
mod points;
mod primvars;
mod xform_cache;

pub use context::{LodPolicy, RefineParms, WriteContext};
pub use filter::{glob_match, AttributeFilter, PatternRule};
pub use names::{CanonicalChannel, ChannelMapping, Conversion};
pub use points::{GeometryBridge, ACTIVE_CHANNEL};
pub use primvars::{author_primvar, primvar_interpolation, PrimvarView};
pub use xform_cache::{CachePolicy, TransformCache, XformKey};
