//! Minimal in-memory scene document.
//!
//! This module provides:
//! - [`Stage`] - path-addressed prims with per-prim locks
//! - [`Prim`] / [`Attribute`] / [`Value`] - typed, time-sampled attributes
//! - [`PrimHolder`] and the scoped lock guards

mod prim;
#[allow(clippy::module_inception)]
mod stage;
mod lock;

pub use prim::{
    Attribute, Prim, Specifier, Value, ValueType,
    EXTENT_ATTR, PRIMVAR_PREFIX, XFORM_ATTR, XFORM_OP_ORDER_ATTR,
};
pub use stage::{PrimHandle, Stage};
pub use lock::{
    HandleDerived, ImageableSchema, LockedBroad, LockedNarrow, PointsSchema,
    PrimHolder, SchemaView, ScopedReadLock, ScopedWriteLock,
};
