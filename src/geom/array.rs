//! Typed flat data arrays.
//!
//! A [`DataArray`] is a flat buffer of scalars grouped into tuples, the same
//! shape on both sides of the bridge: `P` is `float` with tuple size 3,
//! `pscale` is `float` with tuple size 1.

use half::f16;
use serde_json::{json, Value as JsonValue};

use crate::util::{DataType, ElementType, Error, Result, Vec3};

/// Backing storage of a [`DataArray`].
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayValues {
    Float16(Vec<f16>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    String(Vec<String>),
}

impl ArrayValues {
    /// Number of scalars.
    pub fn len(&self) -> usize {
        match self {
            Self::Float16(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Float16(_) => ElementType::Float16,
            Self::Float32(_) => ElementType::Float32,
            Self::Float64(_) => ElementType::Float64,
            Self::Int32(_) => ElementType::Int32,
            Self::Int64(_) => ElementType::Int64,
            Self::String(_) => ElementType::String,
        }
    }
}

/// Flat scalar buffer with a tuple size.
#[derive(Clone, Debug, PartialEq)]
pub struct DataArray {
    values: ArrayValues,
    tuple_size: usize,
}

impl DataArray {
    /// Create an array. The scalar count must be a multiple of `tuple_size`.
    pub fn new(values: ArrayValues, tuple_size: usize) -> Result<Self> {
        if tuple_size == 0 || values.len() % tuple_size != 0 {
            return Err(Error::other(format!(
                "{} scalars do not form tuples of {}",
                values.len(),
                tuple_size
            )));
        }
        Ok(Self { values, tuple_size })
    }

    /// One float per element.
    pub fn from_f32(values: Vec<f32>) -> Self {
        Self { values: ArrayValues::Float32(values), tuple_size: 1 }
    }

    /// One int per element.
    pub fn from_i32(values: Vec<i32>) -> Self {
        Self { values: ArrayValues::Int32(values), tuple_size: 1 }
    }

    /// One string per element.
    pub fn from_strings(values: Vec<String>) -> Self {
        Self { values: ArrayValues::String(values), tuple_size: 1 }
    }

    /// Three floats per element.
    pub fn from_vec3(values: &[Vec3]) -> Self {
        let flat: &[f32] = bytemuck::cast_slice(values);
        Self { values: ArrayValues::Float32(flat.to_vec()), tuple_size: 3 }
    }

    #[inline]
    pub fn values(&self) -> &ArrayValues {
        &self.values
    }

    #[inline]
    pub fn tuple_size(&self) -> usize {
        self.tuple_size
    }

    /// Number of tuples.
    #[inline]
    pub fn entries(&self) -> usize {
        self.values.len() / self.tuple_size
    }

    #[inline]
    pub fn element_type(&self) -> ElementType {
        self.values.element_type()
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        DataType::new(self.element_type(), self.tuple_size)
    }

    /// Borrow as `f32` scalars when stored as such.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.values {
            ArrayValues::Float32(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric scalars widened or narrowed to `f32`. `None` for strings.
    pub fn to_f32_vec(&self) -> Option<Vec<f32>> {
        Some(match &self.values {
            ArrayValues::Float16(v) => v.iter().map(|x| x.to_f32()).collect(),
            ArrayValues::Float32(v) => v.clone(),
            ArrayValues::Float64(v) => v.iter().map(|&x| x as f32).collect(),
            ArrayValues::Int32(v) => v.iter().map(|&x| x as f32).collect(),
            ArrayValues::Int64(v) => v.iter().map(|&x| x as f32).collect(),
            ArrayValues::String(_) => return None,
        })
    }

    /// Elements as `Vec3`, only for numeric arrays with tuple size 3.
    pub fn to_vec3(&self) -> Option<Vec<Vec3>> {
        if self.tuple_size != 3 {
            return None;
        }
        let flat = self.to_f32_vec()?;
        bytemuck::try_cast_slice::<f32, Vec3>(&flat).ok().map(|s| s.to_vec())
    }

    /// Copy as `Float32` with every scalar multiplied by `factor`.
    pub fn scaled(&self, factor: f32) -> Option<Self> {
        let flat = self.to_f32_vec()?;
        Some(Self {
            values: ArrayValues::Float32(flat.into_iter().map(|x| x * factor).collect()),
            tuple_size: self.tuple_size,
        })
    }

    /// Copy converted to `Float32`, keeping the tuple size.
    pub fn to_float32(&self) -> Option<Self> {
        self.scaled(1.0)
    }

    /// First scalar as an integer, for control channels like `visible`.
    pub fn first_int(&self) -> Option<i64> {
        match &self.values {
            ArrayValues::Int32(v) => v.first().map(|&x| x as i64),
            ArrayValues::Int64(v) => v.first().copied(),
            ArrayValues::Float16(v) => v.first().map(|x| x.to_f32() as i64),
            ArrayValues::Float32(v) => v.first().map(|&x| x as i64),
            ArrayValues::Float64(v) => v.first().map(|&x| x as i64),
            ArrayValues::String(_) => None,
        }
    }

    /// JSON form used by stage dumps.
    pub fn to_json(&self) -> JsonValue {
        let values = match &self.values {
            ArrayValues::Float16(v) => json!(v.iter().map(|x| x.to_f32()).collect::<Vec<_>>()),
            ArrayValues::Float32(v) => json!(v),
            ArrayValues::Float64(v) => json!(v),
            ArrayValues::Int32(v) => json!(v),
            ArrayValues::Int64(v) => json!(v),
            ArrayValues::String(v) => json!(v),
        };
        json!({ "type": self.data_type().to_string(), "values": values })
    }
}
