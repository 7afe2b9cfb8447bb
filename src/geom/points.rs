//! In-memory point cloud primitive.
//!
//! A [`PointCloud`] holds a per-point attribute list and a per-object (detail)
//! attribute list. It is what the read pass produces and what the write pass
//! usually consumes.

use crate::core::Ownership;
use crate::util::Vec3;

use super::{AttributeHandle, AttributeList, AttributeView, DataArray};

/// Position channel name on the foreign side.
pub const POSITION_CHANNEL: &str = "P";

/// Point cloud with per-point and per-object attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointCloud {
    point_attrs: AttributeList,
    detail_attrs: AttributeList,
}

impl PointCloud {
    /// Create from the two attribute tables.
    pub fn new(point_attrs: AttributeList, detail_attrs: AttributeList) -> Self {
        Self { point_attrs, detail_attrs }
    }

    /// Point cloud with positions only.
    pub fn from_positions(positions: &[Vec3]) -> Self {
        Self::new(
            AttributeList::new().with(POSITION_CHANNEL, DataArray::from_vec3(positions)),
            AttributeList::new(),
        )
    }

    /// Builder: add or replace a per-point channel.
    pub fn with_point(mut self, name: &str, data: DataArray) -> Self {
        self.point_attrs.add_attribute(name, data, true);
        self
    }

    /// Builder: add or replace a per-object channel.
    pub fn with_detail(mut self, name: &str, data: DataArray) -> Self {
        self.detail_attrs.add_attribute(name, data, true);
        self
    }

    #[inline]
    pub fn point_attributes(&self) -> &AttributeList {
        &self.point_attrs
    }

    #[inline]
    pub fn detail_attributes(&self) -> &AttributeList {
        &self.detail_attrs
    }

    /// Attribute list for an ownership class.
    pub fn list(&self, ownership: Ownership) -> &AttributeList {
        match ownership {
            Ownership::PerPoint => &self.point_attrs,
            Ownership::PerObject => &self.detail_attrs,
        }
    }

    /// Point positions, if a numeric `P` channel with tuple size 3 exists.
    pub fn positions(&self) -> Option<Vec<Vec3>> {
        self.point_attrs.get(POSITION_CHANNEL)?.to_vec3()
    }
}

impl AttributeView for PointCloud {
    fn point_count(&self) -> usize {
        if let Some(p) = self.point_attrs.get(POSITION_CHANNEL) {
            return p.entries();
        }
        self.point_attrs.iter().next().map(|(_, d)| d.entries()).unwrap_or(0)
    }

    fn attributes(&self, ownership: Ownership) -> Vec<AttributeHandle> {
        self.list(ownership).handles(ownership)
    }

    fn data(&self, name: &str, ownership: Ownership) -> Option<&DataArray> {
        self.list(ownership).get(name)
    }
}

/// Sink receiving refined primitives.
pub trait Refiner {
    fn add_primitive(&mut self, prim: PointCloud);
}

impl Refiner for Vec<PointCloud> {
    fn add_primitive(&mut self, prim: PointCloud) {
        self.push(prim);
    }
}
