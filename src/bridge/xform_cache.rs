//! Memoized transform composition.
//!
//! Keys are `(prim path, evaluation time)`. Two tables are kept: the composed
//! parent-relative transform of a bridged node, and the world transform of
//! each ancestor walked while composing it. [`TransformCache::invalidate`]
//! drops a node's subtree together with the world transforms above it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::core::{EvaluationTime, Granularity, PrimPath};
use crate::stage::{Stage, Value, XFORM_ATTR};
use crate::util::DMat4;

/// Cache key.
pub type XformKey = (PrimPath, EvaluationTime);

/// Whether a composition may use the cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CachePolicy {
    #[default]
    Memoize,
    /// Recompute everything, read and write nothing.
    Bypass,
}

impl From<Granularity> for CachePolicy {
    fn from(g: Granularity) -> Self {
        if g.is_per_frame() {
            Self::Bypass
        } else {
            Self::Memoize
        }
    }
}

/// Thread-safe cache of composed transforms.
///
/// Uses `parking_lot::RwLock` for the tables and `AtomicUsize` for the
/// hit/miss counters.
#[derive(Default)]
pub struct TransformCache {
    composed: RwLock<HashMap<XformKey, DMat4>>,
    world: RwLock<HashMap<XformKey, DMat4>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl TransformCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform to author on `node` so that it lands at `object_xform` in
    /// world space.
    ///
    /// The parent chain is read from `stage`, one ancestor read lock at a
    /// time. A repeat call for the same `(node, time)` under
    /// [`CachePolicy::Memoize`] returns the stored matrix without walking the
    /// chain again.
    pub fn compose(
        &self,
        stage: &Stage,
        node: &PrimPath,
        time: EvaluationTime,
        object_xform: DMat4,
        policy: CachePolicy,
    ) -> DMat4 {
        let key = (node.clone(), time);
        if policy == CachePolicy::Memoize {
            if let Some(m) = self.composed.read().get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("xform cache hit: {} @ {}", node, time);
                return *m;
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let parent_world = match node.parent() {
            Some(parent) if !parent.is_root() => self.world_transform(stage, &parent, time, policy),
            _ => DMat4::IDENTITY,
        };
        let local = parent_world.inverse() * object_xform;

        if policy == CachePolicy::Memoize {
            self.composed.write().insert(key, local);
        }
        local
    }

    /// World transform of an existing prim, composed top-down from the local
    /// `xformOp:transform` of every prim on its path. Missing prims and
    /// unauthored transforms count as identity.
    pub fn world_transform(
        &self,
        stage: &Stage,
        path: &PrimPath,
        time: EvaluationTime,
        policy: CachePolicy,
    ) -> DMat4 {
        let key = (path.clone(), time);
        if policy == CachePolicy::Memoize {
            if let Some(m) = self.world.read().get(&key) {
                return *m;
            }
        }

        let parent_world = match path.parent() {
            Some(parent) if !parent.is_root() => self.world_transform(stage, &parent, time, policy),
            _ => DMat4::IDENTITY,
        };
        let world = parent_world * local_transform(stage, path, time);

        if policy == CachePolicy::Memoize {
            self.world.write().insert(key, world);
        }
        world
    }

    /// Drop every entry keyed on `node` or one of its descendants, plus the
    /// ancestor world transforms on `node`'s chain, so the next composition
    /// for `node` reads the whole chain again.
    pub fn invalidate(&self, node: &PrimPath) {
        self.composed.write().retain(|(p, _), _| !p.has_prefix(node));
        self.world
            .write()
            .retain(|(p, _), _| !p.has_prefix(node) && !node.has_prefix(p));
        tracing::debug!("xform cache invalidated for {}", node);
    }

    /// Number of memoized world transforms.
    #[inline]
    pub fn world_len(&self) -> usize {
        self.world.read().len()
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.composed.write().clear();
        self.world.write().clear();
    }

    /// Whether a composed transform is stored for `(node, time)`.
    pub fn contains(&self, node: &PrimPath, time: EvaluationTime) -> bool {
        self.composed.read().contains_key(&(node.clone(), time))
    }

    /// Number of composed entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.composed.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }
}

fn local_transform(stage: &Stage, path: &PrimPath, time: EvaluationTime) -> DMat4 {
    let Some(handle) = stage.prim(path) else {
        return DMat4::IDENTITY;
    };
    let prim = handle.read();
    prim.get(XFORM_ATTR, time)
        .and_then(Value::as_matrix)
        .copied()
        .unwrap_or(DMat4::IDENTITY)
}
