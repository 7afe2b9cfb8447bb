//! In-memory stage: a path-addressed table of individually locked prims.
//!
//! The path table has its own lock, held only while looking up, defining or
//! removing prims. Attribute access goes through the per-prim lock, so
//! unrelated prims can be read and written concurrently.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value as JsonValue};

use crate::core::{PrimKind, PrimPath};
use crate::util::{Error, Result};

use super::{Prim, Specifier};

/// Shared, lockable handle to one prim.
pub type PrimHandle = Arc<RwLock<Prim>>;

/// The persistent scene document.
#[derive(Default)]
pub struct Stage {
    prims: RwLock<BTreeMap<PrimPath, PrimHandle>>,
}

impl Stage {
    /// Create an empty stage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a prim of `kind` at `path`.
    ///
    /// Missing ancestors are defined as untyped prims. An existing prim is
    /// retyped and becomes a definition; its authored values are kept.
    pub fn define_prim(&self, path: &PrimPath, kind: PrimKind) -> Result<PrimHandle> {
        if path.is_root() {
            return Err(Error::InvalidPath(path.to_string()));
        }
        let mut prims = self.prims.write();
        for ancestor in path.ancestors() {
            prims.entry(ancestor.clone()).or_insert_with(|| {
                Arc::new(RwLock::new(Prim::new(ancestor, PrimKind::Untyped, Specifier::Def)))
            });
        }
        let existing = prims.get(path).cloned();
        if let Some(handle) = existing {
            drop(prims);
            {
                let mut prim = handle.write();
                prim.set_specifier(Specifier::Def);
                prim.set_kind(kind);
            }
            return Ok(handle);
        }
        let handle = Arc::new(RwLock::new(Prim::new(path.clone(), kind, Specifier::Def)));
        prims.insert(path.clone(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Get or create an overlay opinion at `path`.
    ///
    /// An existing prim is returned untouched; otherwise the prim and any
    /// missing ancestors are created as untyped overs.
    pub fn override_prim(&self, path: &PrimPath) -> Result<PrimHandle> {
        if path.is_root() {
            return Err(Error::InvalidPath(path.to_string()));
        }
        let mut prims = self.prims.write();
        if let Some(handle) = prims.get(path) {
            return Ok(Arc::clone(handle));
        }
        for ancestor in path.ancestors() {
            prims.entry(ancestor.clone()).or_insert_with(|| {
                Arc::new(RwLock::new(Prim::new(ancestor, PrimKind::Untyped, Specifier::Over)))
            });
        }
        let handle = Arc::new(RwLock::new(Prim::new(
            path.clone(),
            PrimKind::Untyped,
            Specifier::Over,
        )));
        prims.insert(path.clone(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Look up a prim.
    pub fn prim(&self, path: &PrimPath) -> Option<PrimHandle> {
        self.prims.read().get(path).cloned()
    }

    /// Remove a prim and all its descendants. Returns whether `path` existed.
    pub fn remove_prim(&self, path: &PrimPath) -> bool {
        let mut prims = self.prims.write();
        let existed = prims.contains_key(path);
        prims.retain(|p, _| !p.has_prefix(path));
        existed
    }

    /// All prim paths in sorted order.
    pub fn prim_paths(&self) -> Vec<PrimPath> {
        self.prims.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.prims.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.prims.read().is_empty()
    }

    /// Deterministic dump of every prim and its authored values.
    ///
    /// Takes each prim's read lock in turn, never more than one at a time.
    pub fn to_json(&self) -> JsonValue {
        let handles: Vec<(PrimPath, PrimHandle)> = self
            .prims
            .read()
            .iter()
            .map(|(p, h)| (p.clone(), Arc::clone(h)))
            .collect();
        let map: Map<String, JsonValue> = handles
            .into_iter()
            .map(|(p, h)| (p.to_string(), h.read().to_json()))
            .collect();
        JsonValue::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EvaluationTime;
    use crate::stage::Value;

    fn path(s: &str) -> PrimPath {
        PrimPath::new(s).unwrap()
    }

    #[test]
    fn test_define_creates_ancestors() {
        let stage = Stage::new();
        stage.define_prim(&path("/World/geo/pts"), PrimKind::Points).unwrap();
        assert_eq!(stage.len(), 3);
        let paths: Vec<String> = stage.prim_paths().iter().map(ToString::to_string).collect();
        assert_eq!(paths, vec!["/World", "/World/geo", "/World/geo/pts"]);
        let world = stage.prim(&path("/World")).unwrap();
        assert_eq!(world.read().kind(), PrimKind::Untyped);
        assert_eq!(world.read().specifier(), Specifier::Def);
        assert!(stage.define_prim(&PrimPath::root(), PrimKind::Xform).is_err());
    }

    #[test]
    fn test_redefine_retypes() {
        let stage = Stage::new();
        let h = stage.define_prim(&path("/a"), PrimKind::Xform).unwrap();
        h.write()
            .set("purpose", Value::token("guide"), EvaluationTime::Default)
            .unwrap();
        let h2 = stage.define_prim(&path("/a"), PrimKind::Points).unwrap();
        assert!(Arc::ptr_eq(&h, &h2));
        assert_eq!(h2.read().kind(), PrimKind::Points);
        assert!(h2.read().has_authored_value("purpose"));
    }

    #[test]
    fn test_override_prim() {
        let stage = Stage::new();
        let over = stage.override_prim(&path("/x/y")).unwrap();
        assert_eq!(over.read().specifier(), Specifier::Over);
        assert_eq!(over.read().kind(), PrimKind::Untyped);

        stage.define_prim(&path("/d"), PrimKind::Points).unwrap();
        let d = stage.override_prim(&path("/d")).unwrap();
        assert_eq!(d.read().kind(), PrimKind::Points);
        assert_eq!(d.read().specifier(), Specifier::Def);
    }

    #[test]
    fn test_remove_prim() {
        let stage = Stage::new();
        stage.define_prim(&path("/a/b/c"), PrimKind::Points).unwrap();
        stage.define_prim(&path("/ab"), PrimKind::Points).unwrap();
        assert!(stage.remove_prim(&path("/a/b")));
        assert!(stage.prim(&path("/a/b/c")).is_none());
        assert!(stage.prim(&path("/a")).is_some());
        assert!(stage.prim(&path("/ab")).is_some());
        assert!(!stage.remove_prim(&path("/a/b")));
    }

    #[test]
    fn test_to_json_authored_only() {
        let stage = Stage::new();
        let h = stage.define_prim(&path("/pts"), PrimKind::Points).unwrap();
        let dump = stage.to_json();
        assert!(dump["/pts"]["attributes"].as_object().unwrap().is_empty());

        h.write()
            .set("purpose", Value::token("proxy"), EvaluationTime::Default)
            .unwrap();
        let dump = stage.to_json();
        assert_eq!(dump["/pts"]["attributes"]["purpose"]["default"], "proxy");
        assert_eq!(dump["/pts"]["kind"], "Points");
    }
}
