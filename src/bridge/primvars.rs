//! Primvars of a stage prim as an [`AttributeView`].
//!
//! Interpolation maps to ownership: `vertex`/`varying` are per-point,
//! `constant` is per-object. Face-based interpolations have no counterpart on
//! a point primitive and are skipped.

use crate::core::{EvaluationTime, Interpolation, Ownership};
use crate::geom::{AttributeHandle, AttributeList, AttributeView, DataArray};
use crate::stage::{Prim, Value, PRIMVAR_PREFIX};
use crate::util::Result;

/// Snapshot of a prim's array primvars at one time.
#[derive(Clone, Debug, Default)]
pub struct PrimvarView {
    point: AttributeList,
    object: AttributeList,
    point_count: usize,
}

impl PrimvarView {
    /// Collect the primvars of `prim` resolved at `time`.
    pub fn from_prim(prim: &Prim, time: EvaluationTime, point_count: usize) -> Self {
        let mut view = Self { point_count, ..Default::default() };
        for name in prim.primvar_names() {
            let full = format!("{PRIMVAR_PREFIX}{name}");
            let Some(attr) = prim.attribute(&full) else {
                continue;
            };
            let Some(data) = attr.get(time).and_then(Value::as_array) else {
                continue;
            };
            let interp = attr.interpolation().unwrap_or_default();
            match interp.ownership() {
                Some(Ownership::PerPoint) => {
                    view.point.add_attribute(name, data.clone(), true);
                }
                Some(Ownership::PerObject) => {
                    view.object.add_attribute(name, data.clone(), true);
                }
                None => {
                    let token = interp.as_token();
                    tracing::debug!("skipping {} primvar {} on {}", token, name, prim.path());
                }
            }
        }
        view
    }

    fn list(&self, ownership: Ownership) -> &AttributeList {
        match ownership {
            Ownership::PerPoint => &self.point,
            Ownership::PerObject => &self.object,
        }
    }
}

impl AttributeView for PrimvarView {
    fn point_count(&self) -> usize {
        self.point_count
    }

    fn attributes(&self, ownership: Ownership) -> Vec<AttributeHandle> {
        self.list(ownership).handles(ownership)
    }

    fn data(&self, name: &str, ownership: Ownership) -> Option<&DataArray> {
        self.list(ownership).get(name)
    }
}

/// Author `data` as `primvars:<name>` with the interpolation of `ownership`.
pub fn author_primvar(
    prim: &mut Prim,
    name: &str,
    data: &DataArray,
    ownership: Ownership,
    time: EvaluationTime,
) -> Result<()> {
    let full = format!("{PRIMVAR_PREFIX}{name}");
    prim.set(&full, Value::Array(data.clone()), time)?;
    prim.set_interpolation(&full, ownership.interpolation())
}

/// Interpolation a harvested primvar was authored with, if any.
pub fn primvar_interpolation(prim: &Prim, name: &str) -> Option<Interpolation> {
    prim.attribute(&format!("{PRIMVAR_PREFIX}{name}"))?.interpolation()
}
