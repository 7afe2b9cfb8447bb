//! Attribute handles, attribute lists and the [`AttributeView`] capability.
//!
//! Both sides of the bridge are read through [`AttributeView`]: the foreign
//! point primitive and the primvars of a stage prim. The bridge never depends
//! on a concrete primitive type.

use crate::core::Ownership;
use crate::util::{BBox3f, DataType, ElementType};

use super::{DataArray, Visibility, POSITION_CHANNEL, VISIBLE_CHANNEL};

/// Identifies one named channel and describes its shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeHandle {
    pub name: String,
    pub ownership: Ownership,
    pub element_type: ElementType,
    pub tuple_size: usize,
    pub element_count: usize,
}

impl AttributeHandle {
    /// Describe `data` stored under `name`.
    pub fn describe(name: impl Into<String>, ownership: Ownership, data: &DataArray) -> Self {
        Self {
            name: name.into(),
            ownership,
            element_type: data.element_type(),
            tuple_size: data.tuple_size(),
            element_count: data.entries(),
        }
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        DataType::new(self.element_type, self.tuple_size)
    }
}

/// Read access to a named, typed, sized attribute collection.
pub trait AttributeView {
    /// Number of points of the owning primitive.
    fn point_count(&self) -> usize;

    /// Handles of every channel of one ownership class, in insertion order.
    fn attributes(&self, ownership: Ownership) -> Vec<AttributeHandle>;

    /// Data of the channel `name` within one ownership class.
    fn data(&self, name: &str, ownership: Ownership) -> Option<&DataArray>;

    /// Exact-name lookup across ownership classes, per-point first.
    fn find_attribute(&self, name: &str) -> Option<(Ownership, &DataArray)> {
        Ownership::ALL
            .iter()
            .find_map(|&own| self.data(name, own).map(|d| (own, d)))
    }

    /// Bounding box of the `P` channel. `None` without positions.
    fn bounds(&self) -> Option<BBox3f> {
        let pts = self.data(POSITION_CHANNEL, Ownership::PerPoint)?.to_vec3()?;
        let b = BBox3f::from_points(&pts);
        (!b.is_empty()).then_some(b)
    }

    /// Visibility from the per-object `visible` channel, inherited when absent.
    fn visibility(&self) -> Visibility {
        self.data(VISIBLE_CHANNEL, Ownership::PerObject)
            .and_then(DataArray::first_int)
            .map(Visibility::from_flag)
            .unwrap_or_default()
    }
}

/// Ordered name → data map for one ownership class.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeList {
    entries: Vec<(String, DataArray)>,
}

impl AttributeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel. An existing channel of the same name is replaced only
    /// when `replace` is set; returns whether the list changed.
    pub fn add_attribute(
        &mut self,
        name: impl Into<String>,
        data: DataArray,
        replace: bool,
    ) -> bool {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            if replace {
                slot.1 = data;
                return true;
            }
            return false;
        }
        self.entries.push((name, data));
        true
    }

    /// Builder form of [`add_attribute`](Self::add_attribute), always replacing.
    pub fn with(mut self, name: impl Into<String>, data: DataArray) -> Self {
        self.add_attribute(name, data, true);
        self
    }

    pub fn get(&self, name: &str) -> Option<&DataArray> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<DataArray> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataArray)> {
        self.entries.iter().map(|(n, d)| (n.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Handles for every entry under one ownership class.
    pub fn handles(&self, ownership: Ownership) -> Vec<AttributeHandle> {
        self.iter()
            .map(|(n, d)| AttributeHandle::describe(n, ownership, d))
            .collect()
    }
}
