//! Prim kinds and their static type identifiers.
//!
//! The set of kinds is closed; each one gets a fixed [`KindId`] from
//! [`KIND_REGISTRY`], so runtime dispatch never needs to allocate ids.

use std::fmt;

/// Lightweight identifier for a prim kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KindId(pub u32);

/// Schema type of a prim.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PrimKind {
    /// No schema (plain `def` or `over`).
    #[default]
    Untyped,
    Scope,
    Xform,
    Points,
    Mesh,
    BasisCurves,
}

/// Kind, stage type name, identifier.
pub static KIND_REGISTRY: [(PrimKind, &str, KindId); 6] = [
    (PrimKind::Untyped, "", KindId(0)),
    (PrimKind::Scope, "Scope", KindId(1)),
    (PrimKind::Xform, "Xform", KindId(2)),
    (PrimKind::Points, "Points", KindId(3)),
    (PrimKind::Mesh, "Mesh", KindId(4)),
    (PrimKind::BasisCurves, "BasisCurves", KindId(5)),
];

impl PrimKind {
    fn entry(self) -> &'static (PrimKind, &'static str, KindId) {
        // Registry order matches declaration order.
        &KIND_REGISTRY[self as usize]
    }

    /// Stable identifier of this kind.
    #[inline]
    pub fn id(self) -> KindId {
        self.entry().2
    }

    /// Type name as written on the stage.
    #[inline]
    pub fn type_name(self) -> &'static str {
        self.entry().1
    }

    /// Look up a kind by its stage type name.
    pub fn from_type_name(name: &str) -> Option<Self> {
        KIND_REGISTRY
            .iter()
            .find(|(_, n, _)| *n == name)
            .map(|(k, _, _)| *k)
    }

    /// Kinds that carry transform, visibility and purpose.
    #[inline]
    pub fn is_imageable(self) -> bool {
        !matches!(self, Self::Untyped)
    }

    /// Kinds that carry an `extent`.
    #[inline]
    pub fn is_boundable(self) -> bool {
        matches!(self, Self::Points | Self::Mesh | Self::BasisCurves)
    }
}

impl fmt::Display for PrimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Untyped => f.write_str("Untyped"),
            other => f.write_str(other.type_name()),
        }
    }
}
