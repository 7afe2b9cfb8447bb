//! Element types and the (element, tuple size) pair describing a channel.

use std::fmt;

/// Scalar element type of an attribute channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ElementType {
    /// 16-bit floating point (IEEE 754 half precision)
    Float16 = 0,
    /// 32-bit floating point
    Float32 = 1,
    /// 64-bit floating point
    Float64 = 2,
    /// Signed 32-bit integer
    Int32 = 3,
    /// Signed 64-bit integer
    Int64 = 4,
    /// UTF-8 string
    String = 5,
    /// Unknown/invalid type
    #[default]
    Unknown = 127,
}

impl ElementType {
    /// Name used by the stage for this element type.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Float16 => "half",
            Self::Float32 => "float",
            Self::Float64 => "double",
            Self::Int32 => "int",
            Self::Int64 => "int64",
            Self::String => "string",
            Self::Unknown => "unknown",
        }
    }

    /// Returns true if this is a numeric type (int or float).
    #[inline]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Float16 | Self::Float32 | Self::Float64 | Self::Int32 | Self::Int64
        )
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Element type plus tuple size, e.g. `float3` for positions.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataType {
    pub element: ElementType,
    pub tuple_size: usize,
}

impl DataType {
    #[inline]
    pub const fn new(element: ElementType, tuple_size: usize) -> Self {
        Self { element, tuple_size }
    }

    /// Returns true if this is a valid (known) type.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        !matches!(self.element, ElementType::Unknown) && self.tuple_size > 0
    }

    pub const UNKNOWN: Self = Self::new(ElementType::Unknown, 0);

    pub const FLOAT: Self = Self::new(ElementType::Float32, 1);
    pub const INT: Self = Self::new(ElementType::Int32, 1);
    pub const FLOAT3: Self = Self::new(ElementType::Float32, 3);
}

impl Default for DataType {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tuple_size == 1 {
            write!(f, "{}", self.element.name())
        } else {
            write!(f, "{}{}", self.element.name(), self.tuple_size)
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
