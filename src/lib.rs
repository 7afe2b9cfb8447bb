//! # pointbridge
//!
//! Bridge between transient point geometry and a persistent, time-sampled
//! scene document.
//!
//! Foreign geometry is any [`AttributeView`](geom::AttributeView): named,
//! typed channels owned per point or per object. The document is a
//! [`Stage`](stage::Stage) of hierarchical prims with per-prim locks. A
//! [`GeometryBridge`](bridge::GeometryBridge) translates one prim in either
//! direction, remapping canonical channels, harvesting the rest as primvars and
//! caching composed transforms.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (DataType, errors, math)
//! - [`core`] - Time, ownership, prim kinds and paths
//! - [`geom`] - Foreign point geometry
//! - [`stage`] - In-memory scene document and scoped locks
//! - [`bridge`] - Read and write passes
//! - [`logging`] - Optional `tracing` subscriber setup
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pointbridge::prelude::*;
//!
//! let stage = Arc::new(Stage::new());
//! let cache = Arc::new(TransformCache::new());
//! let path = PrimPath::new("/World/pts")?;
//! let ctxt = WriteContext::default();
//!
//! let writer = GeometryBridge::for_write(stage.clone(), path.clone(), &ctxt, cache.clone())?;
//! writer.update_from_prim(&PointCloud::from_positions(&[Vec3::ZERO]), DMat4::IDENTITY, &ctxt);
//!
//! let reader = GeometryBridge::for_read(stage, path, cache);
//! let cloud = reader.refine(EvaluationTime::Default, &RefineParms::default());
//! ```

pub mod util;
pub mod core;
pub mod geom;
pub mod stage;
pub mod bridge;
pub mod logging;

// Re-export commonly used types
pub use util::{DataType, Error, Result};
pub use bridge::GeometryBridge;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{DataType, ElementType, Error, Result, DMat4, DVec3, Vec3};
    pub use crate::core::{
        EvaluationTime, Granularity, Interpolation, Ownership, PrimKind, PrimPath,
    };
    pub use crate::geom::{AttributeView, DataArray, PointCloud, Purpose, Refiner, Visibility};
    pub use crate::stage::{Stage, Value};
    pub use crate::bridge::{
        AttributeFilter, GeometryBridge, LodPolicy, RefineParms, TransformCache, WriteContext,
    };
}
