//! Ownership classes and interpolation.
//!
//! The foreign side describes who owns a channel ([`Ownership`]); the stage
//! describes how a primvar is interpolated ([`Interpolation`]).

use std::fmt;

/// Whether a channel varies per point or is constant over the primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Ownership {
    /// One element per point.
    PerPoint,
    /// One element for the whole primitive.
    PerObject,
}

impl Ownership {
    /// All ownership classes, in harvesting order.
    pub const ALL: [Self; 2] = [Self::PerPoint, Self::PerObject];

    /// Interpolation a primvar with this ownership is authored with.
    #[inline]
    pub fn interpolation(self) -> Interpolation {
        match self {
            Self::PerPoint => Interpolation::Vertex,
            Self::PerObject => Interpolation::Constant,
        }
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerPoint => f.write_str("point"),
            Self::PerObject => f.write_str("constant"),
        }
    }
}

/// Interpolation class of a primvar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Interpolation {
    /// Constant for entire prim.
    #[default]
    Constant,
    /// One value per face.
    Uniform,
    /// One value per point, linearly interpolated.
    Varying,
    /// One value per point.
    Vertex,
    /// One value per face-vertex.
    FaceVarying,
}

impl Interpolation {
    /// Parse from the stage token. Unknown tokens read as constant.
    pub fn from_token(s: &str) -> Self {
        match s {
            "uniform" => Self::Uniform,
            "varying" => Self::Varying,
            "vertex" => Self::Vertex,
            "faceVarying" => Self::FaceVarying,
            _ => Self::Constant,
        }
    }

    /// Stage token for this interpolation.
    pub fn as_token(&self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Uniform => "uniform",
            Self::Varying => "varying",
            Self::Vertex => "vertex",
            Self::FaceVarying => "faceVarying",
        }
    }

    /// Ownership class on a point primitive.
    ///
    /// Points have no faces, so `Uniform` and `FaceVarying` have no foreign
    /// counterpart.
    pub fn ownership(&self) -> Option<Ownership> {
        match self {
            Self::Vertex | Self::Varying => Some(Ownership::PerPoint),
            Self::Constant => Some(Ownership::PerObject),
            Self::Uniform | Self::FaceVarying => None,
        }
    }
}
