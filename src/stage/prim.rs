//! Prims and their time-sampled attributes.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{json, Map, Value as JsonValue};

use crate::core::{EvaluationTime, Interpolation, PrimKind, PrimPath};
use crate::geom::{DataArray, PURPOSE_ATTR, VISIBILITY_ATTR};
use crate::util::{DataType, DMat4, Error, Result};

/// Prefix of primvar attribute names.
pub const PRIMVAR_PREFIX: &str = "primvars:";
/// Transform attribute name.
pub const XFORM_ATTR: &str = "xformOp:transform";
/// Transform op order attribute name.
pub const XFORM_OP_ORDER_ATTR: &str = "xformOpOrder";
/// Extent attribute name.
pub const EXTENT_ATTR: &str = "extent";

// ============================================================================
// Values
// ============================================================================

/// A single attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Array(DataArray),
    Token(String),
    Matrix(DMat4),
}

impl Value {
    pub fn token(s: impl Into<String>) -> Self {
        Self::Token(s.into())
    }

    pub fn as_array(&self) -> Option<&DataArray> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_token(&self) -> Option<&str> {
        match self {
            Self::Token(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&DMat4> {
        match self {
            Self::Matrix(m) => Some(m),
            _ => None,
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Array(a) => ValueType::Array(a.data_type()),
            Self::Token(_) => ValueType::Token,
            Self::Matrix(_) => ValueType::Matrix,
        }
    }

    fn to_json(&self) -> JsonValue {
        match self {
            Self::Array(a) => a.to_json(),
            Self::Token(t) => json!(t),
            Self::Matrix(m) => json!(m.to_cols_array()),
        }
    }
}

/// Declared type of an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    Array(DataType),
    Token,
    Matrix,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array(dt) => write!(f, "{dt}[]"),
            Self::Token => f.write_str("token"),
            Self::Matrix => f.write_str("matrix4d"),
        }
    }
}

// ============================================================================
// Attribute
// ============================================================================

/// A typed attribute with an optional default value and time samples.
#[derive(Clone, Debug)]
pub struct Attribute {
    value_type: ValueType,
    interpolation: Option<Interpolation>,
    default: Option<Value>,
    samples: BTreeMap<EvaluationTime, Value>,
    fallback: Option<Value>,
}

impl Attribute {
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            interpolation: None,
            default: None,
            samples: BTreeMap::new(),
            fallback: None,
        }
    }

    fn with_fallback(mut self, fallback: Option<Value>) -> Self {
        self.fallback = fallback;
        self
    }

    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    #[inline]
    pub fn interpolation(&self) -> Option<Interpolation> {
        self.interpolation
    }

    /// Author a value. The value must match the declared type.
    pub fn set(&mut self, name: &str, value: Value, time: EvaluationTime) -> Result<()> {
        let actual = value.value_type();
        if actual != self.value_type {
            return Err(Error::value_type(name, self.value_type, actual));
        }
        match time {
            EvaluationTime::Default => self.default = Some(value),
            EvaluationTime::Frame(_) => {
                self.samples.insert(time, value);
            }
        }
        Ok(())
    }

    /// Resolve the value at `time`.
    ///
    /// Frames read the sample at or before `time` (or the first sample when
    /// `time` precedes all of them), then the default value. The default time
    /// reads the default value, then the first sample. Unauthored attributes
    /// yield their schema fallback.
    pub fn get(&self, time: EvaluationTime) -> Option<&Value> {
        let authored = match time {
            EvaluationTime::Frame(_) => self
                .samples
                .range(..=time)
                .next_back()
                .or_else(|| self.samples.iter().next())
                .map(|(_, v)| v)
                .or(self.default.as_ref()),
            EvaluationTime::Default => self
                .default
                .as_ref()
                .or_else(|| self.samples.values().next()),
        };
        authored.or(self.fallback.as_ref())
    }

    /// True if a default value or any time sample has been authored.
    pub fn has_authored_value(&self) -> bool {
        self.default.is_some() || !self.samples.is_empty()
    }

    fn to_json(&self) -> JsonValue {
        let mut obj = Map::new();
        obj.insert("type".into(), json!(self.value_type.to_string()));
        if let Some(i) = self.interpolation {
            obj.insert("interpolation".into(), json!(i.as_token()));
        }
        if let Some(d) = &self.default {
            obj.insert("default".into(), d.to_json());
        }
        if !self.samples.is_empty() {
            let samples: Map<String, JsonValue> = self
                .samples
                .iter()
                .map(|(t, v)| (t.to_string(), v.to_json()))
                .collect();
            obj.insert("samples".into(), JsonValue::Object(samples));
        }
        JsonValue::Object(obj)
    }
}

// ============================================================================
// Prim
// ============================================================================

/// How a prim was introduced on the stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Specifier {
    /// Concrete definition.
    #[default]
    Def,
    /// Overlay opinion on a prim defined elsewhere.
    Over,
}

/// Attributes every prim of a kind carries, with their fallbacks.
fn builtin_attributes(kind: PrimKind) -> Vec<(&'static str, ValueType, Option<Value>)> {
    let float3 = ValueType::Array(DataType::FLOAT3);
    let mut out = Vec::new();
    if kind.is_imageable() {
        out.push((VISIBILITY_ATTR, ValueType::Token, Some(Value::token("inherited"))));
        out.push((PURPOSE_ATTR, ValueType::Token, Some(Value::token("default"))));
    }
    if kind.is_boundable() {
        out.push((EXTENT_ATTR, float3, None));
        out.push(("points", float3, None));
        out.push(("normals", float3, None));
    }
    match kind {
        PrimKind::Points => {
            out.push(("velocities", float3, None));
            out.push(("widths", ValueType::Array(DataType::FLOAT), None));
        }
        PrimKind::BasisCurves => {
            out.push(("widths", ValueType::Array(DataType::FLOAT), None));
            out.push(("curveVertexCounts", ValueType::Array(DataType::INT), None));
        }
        PrimKind::Mesh => {
            out.push(("faceVertexCounts", ValueType::Array(DataType::INT), None));
            out.push(("faceVertexIndices", ValueType::Array(DataType::INT), None));
        }
        _ => {}
    }
    out
}

/// A node of the stage.
#[derive(Clone, Debug)]
pub struct Prim {
    path: PrimPath,
    kind: PrimKind,
    specifier: Specifier,
    active: bool,
    attributes: BTreeMap<String, Attribute>,
}

impl Prim {
    pub fn new(path: PrimPath, kind: PrimKind, specifier: Specifier) -> Self {
        let mut prim = Self {
            path,
            kind: PrimKind::Untyped,
            specifier,
            active: true,
            attributes: BTreeMap::new(),
        };
        prim.set_kind(kind);
        prim
    }

    #[inline]
    pub fn path(&self) -> &PrimPath {
        &self.path
    }

    #[inline]
    pub fn kind(&self) -> PrimKind {
        self.kind
    }

    #[inline]
    pub fn specifier(&self) -> Specifier {
        self.specifier
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn set_specifier(&mut self, specifier: Specifier) {
        self.specifier = specifier;
    }

    /// Retype the prim, adding the builtin attributes of the new kind.
    /// Authored values survive.
    pub(crate) fn set_kind(&mut self, kind: PrimKind) {
        self.kind = kind;
        for (name, ty, fallback) in builtin_attributes(kind) {
            self.attributes
                .entry(name.to_string())
                .or_insert_with(|| Attribute::new(ty).with_fallback(fallback));
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Resolved value of `name` at `time`, including schema fallbacks.
    pub fn get(&self, name: &str, time: EvaluationTime) -> Option<&Value> {
        self.attributes.get(name)?.get(time)
    }

    pub fn has_authored_value(&self, name: &str) -> bool {
        self.attributes
            .get(name)
            .is_some_and(Attribute::has_authored_value)
    }

    /// Author `value` on `name`, creating the attribute with the value's type
    /// when it does not exist yet.
    pub fn set(&mut self, name: &str, value: Value, time: EvaluationTime) -> Result<()> {
        let attr = self
            .attributes
            .entry(name.to_string())
            .or_insert_with(|| Attribute::new(value.value_type()));
        attr.set(name, value, time)
    }

    /// Set interpolation metadata on an existing attribute.
    pub fn set_interpolation(&mut self, name: &str, interpolation: Interpolation) -> Result<()> {
        let attr = self
            .attributes
            .get_mut(name)
            .ok_or_else(|| Error::other(format!("No attribute {name} on {}", self.path)))?;
        attr.interpolation = Some(interpolation);
        Ok(())
    }

    /// Primvar names with the `primvars:` prefix stripped.
    pub fn primvar_names(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .keys()
            .filter_map(|k| k.strip_prefix(PRIMVAR_PREFIX))
            .filter(|n| !n.ends_with(":indices"))
    }

    pub(crate) fn to_json(&self) -> JsonValue {
        let attrs: Map<String, JsonValue> = self
            .attributes
            .iter()
            .filter(|(_, a)| a.has_authored_value())
            .map(|(n, a)| (n.clone(), a.to_json()))
            .collect();
        let specifier = match self.specifier {
            Specifier::Def => "def",
            Specifier::Over => "over",
        };
        json!({
            "kind": self.kind.to_string(),
            "specifier": specifier,
            "active": self.active,
            "attributes": attrs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points_prim() -> Prim {
        Prim::new(PrimPath::new("/pts").unwrap(), PrimKind::Points, Specifier::Def)
    }

    #[test]
    fn test_builtin_fallbacks() {
        let prim = points_prim();
        assert!(!prim.has_authored_value(PURPOSE_ATTR));
        assert_eq!(
            prim.get(PURPOSE_ATTR, EvaluationTime::Default).and_then(Value::as_token),
            Some("default")
        );
        assert!(prim.get("points", EvaluationTime::Default).is_none());
        assert!(prim.attribute("widths").is_some());
    }

    #[test]
    fn test_time_resolution() {
        let mut prim = points_prim();
        let w = |x: f32| Value::Array(DataArray::from_f32(vec![x]));
        prim.set("widths", w(1.0), EvaluationTime::frame(1.0)).unwrap();
        prim.set("widths", w(3.0), EvaluationTime::frame(3.0)).unwrap();

        let at = |t: EvaluationTime| {
            prim.get("widths", t)
                .and_then(Value::as_array)
                .and_then(DataArray::as_f32)
                .map(|s| s[0])
        };
        assert_eq!(at(EvaluationTime::frame(0.0)), Some(1.0));
        assert_eq!(at(EvaluationTime::frame(2.0)), Some(1.0));
        assert_eq!(at(EvaluationTime::frame(3.0)), Some(3.0));
        assert_eq!(at(EvaluationTime::frame(9.0)), Some(3.0));
        assert_eq!(at(EvaluationTime::Default), Some(1.0));
    }

    #[test]
    fn test_default_vs_samples() {
        let mut prim = points_prim();
        prim.set(PURPOSE_ATTR, Value::token("render"), EvaluationTime::Default).unwrap();
        assert!(prim.has_authored_value(PURPOSE_ATTR));
        assert_eq!(
            prim.get(PURPOSE_ATTR, EvaluationTime::frame(10.0)).and_then(Value::as_token),
            Some("render")
        );
    }

    #[test]
    fn test_type_validation() {
        let mut prim = points_prim();
        let err = prim
            .set("widths", Value::Array(DataArray::from_vec3(&[])), EvaluationTime::Default)
            .unwrap_err();
        assert!(matches!(err, Error::ValueType { .. }));
        assert!(!prim.has_authored_value("widths"));

        // Unknown attributes take the type of their first value.
        prim.set("primvars:id", Value::Array(DataArray::from_i32(vec![1])), EvaluationTime::Default)
            .unwrap();
        assert!(prim
            .set("primvars:id", Value::token("x"), EvaluationTime::Default)
            .is_err());
    }

    #[test]
    fn test_primvar_names() {
        let mut prim = points_prim();
        let v = Value::Array(DataArray::from_f32(vec![1.0]));
        prim.set("primvars:mass", v.clone(), EvaluationTime::Default).unwrap();
        prim.set("primvars:mass:indices", v.clone(), EvaluationTime::Default).unwrap();
        prim.set("custom", v, EvaluationTime::Default).unwrap();
        assert_eq!(prim.primvar_names().collect::<Vec<_>>(), vec!["mass"]);
    }

    #[test]
    fn test_retype_keeps_values() {
        let mut prim = Prim::new(PrimPath::new("/o").unwrap(), PrimKind::Untyped, Specifier::Over);
        prim.set("points", Value::Array(DataArray::from_vec3(&[])), EvaluationTime::Default)
            .unwrap();
        prim.set_kind(PrimKind::Points);
        assert!(prim.has_authored_value("points"));
        assert!(prim.attribute("velocities").is_some());
    }
}
