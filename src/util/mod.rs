//! Utility types shared by every layer.
//!
//! - [`ElementType`] / [`DataType`] - channel element typing
//! - [`Error`] / [`Result`] - error handling
//! - Math type re-exports from glam and [`BBox3f`]

mod data_type;
mod error;
mod math;

pub use data_type::*;
pub use error::*;
pub use math::*;
