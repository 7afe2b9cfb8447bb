//! Foreign geometry: the in-memory side of the bridge.
//!
//! This module provides:
//! - [`DataArray`] - typed flat channel data
//! - [`AttributeHandle`] / [`AttributeList`] / [`AttributeView`] - channel access
//! - [`PointCloud`] / [`Refiner`] - the point primitive and its sink
//! - [`Visibility`] / [`Purpose`] - imageable tokens

mod array;
mod attribute;
mod points;
mod visibility;

pub use array::{ArrayValues, DataArray};
pub use attribute::{AttributeHandle, AttributeList, AttributeView};
pub use points::{PointCloud, Refiner, POSITION_CHANNEL};
pub use visibility::{
    Purpose, Visibility, PURPOSE_ATTR, VISIBILITY_ATTR, VISIBLE_CHANNEL,
};
