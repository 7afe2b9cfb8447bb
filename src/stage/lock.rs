//! Scoped, typed locks on stage prims.
//!
//! A [`PrimHolder`] names a prim through a schema view (`S`) without holding
//! anything. Locks are taken per call through [`PrimHolder::read`] and
//! [`PrimHolder::write`] and released when the guard drops.
//!
//! Widening a read lock from a narrow view to a broader view of the same prim
//! goes through three states:
//!
//! ```text
//! LockedNarrow --derive--> HandleDerived --lock_broad--> LockedBroad
//! ```
//!
//! The broad holder can only be derived while the narrow lock pins the prim's
//! kind. The narrow guard is dropped before the broad guard is handed out.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::lock_api::{ArcRwLockReadGuard, ArcRwLockWriteGuard};
use parking_lot::RawRwLock;

use crate::core::{PrimKind, PrimPath};
use crate::util::{Error, Result};

use super::{Prim, PrimHandle, Specifier, Stage};

// ============================================================================
// Schema views
// ============================================================================

/// A typed view of a prim.
pub trait SchemaView: 'static {
    /// View name used in diagnostics.
    const NAME: &'static str;

    /// Whether a prim of `kind` can be seen through this view.
    fn accepts(kind: PrimKind) -> bool;
}

/// Point cloud view.
#[derive(Debug)]
pub struct PointsSchema;

impl SchemaView for PointsSchema {
    const NAME: &'static str = "Points";

    fn accepts(kind: PrimKind) -> bool {
        kind == PrimKind::Points
    }
}

/// Any prim carrying transform, visibility and purpose.
#[derive(Debug)]
pub struct ImageableSchema;

impl SchemaView for ImageableSchema {
    const NAME: &'static str = "Imageable";

    fn accepts(kind: PrimKind) -> bool {
        kind.is_imageable()
    }
}

// ============================================================================
// Holder
// ============================================================================

/// Stage + path + view. Holds no lock.
pub struct PrimHolder<S> {
    stage: Arc<Stage>,
    path: PrimPath,
    _schema: PhantomData<fn() -> S>,
}

impl<S> Clone for PrimHolder<S> {
    fn clone(&self) -> Self {
        Self {
            stage: Arc::clone(&self.stage),
            path: self.path.clone(),
            _schema: PhantomData,
        }
    }
}

impl<S: SchemaView> fmt::Debug for PrimHolder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrimHolder<{}>({})", S::NAME, self.path)
    }
}

impl<S: SchemaView> PrimHolder<S> {
    pub fn new(stage: Arc<Stage>, path: PrimPath) -> Self {
        Self { stage, path, _schema: PhantomData }
    }

    #[inline]
    pub fn path(&self) -> &PrimPath {
        &self.path
    }

    #[inline]
    pub fn stage(&self) -> &Arc<Stage> {
        &self.stage
    }

    fn resolve(&self) -> Result<PrimHandle> {
        self.stage
            .prim(&self.path)
            .ok_or_else(|| Error::NotFound(self.path.to_string()))
    }

    fn check_kind(&self, kind: PrimKind) -> Result<()> {
        if S::accepts(kind) {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                path: self.path.to_string(),
                expected: S::NAME.to_string(),
                actual: kind,
            })
        }
    }

    /// Whether the prim exists and the view accepts it. Overs carry no type
    /// of their own and are accepted, as in [`PrimHolder::write`].
    pub fn is_valid(&self) -> bool {
        self.stage.prim(&self.path).is_some_and(|handle| {
            let prim = handle.read();
            prim.specifier() == Specifier::Over || S::accepts(prim.kind())
        })
    }

    /// Block until a read lock is held on the prim.
    pub fn read(&self) -> Result<ScopedReadLock<S>> {
        let handle = self.resolve()?;
        let guard = handle.read_arc();
        self.check_kind(guard.kind())?;
        Ok(ScopedReadLock { guard, handle, _schema: PhantomData })
    }

    /// Block until a write lock is held on the prim.
    ///
    /// Overs are untyped opinions on prims defined elsewhere, so the view's
    /// kind check only applies to definitions.
    pub fn write(&self) -> Result<ScopedWriteLock<S>> {
        let handle = self.resolve()?;
        let guard = handle.write_arc();
        if guard.specifier() == Specifier::Def {
            self.check_kind(guard.kind())?;
        }
        Ok(ScopedWriteLock { guard, _schema: PhantomData })
    }

    /// First state of the read-lock upgrade.
    pub fn lock_narrow(&self) -> Result<LockedNarrow<S>> {
        Ok(LockedNarrow { inner: self.read()?, stage: Arc::clone(&self.stage) })
    }

    /// Read lock on a broader view `B` of the same prim.
    pub fn read_as<B: SchemaView>(&self) -> Result<ScopedReadLock<B>> {
        Ok(self.lock_narrow()?.derive::<B>()?.lock_broad())
    }
}

// ============================================================================
// Guards
// ============================================================================

/// Read guard on a prim seen through view `S`.
pub struct ScopedReadLock<S> {
    guard: ArcRwLockReadGuard<RawRwLock, Prim>,
    handle: PrimHandle,
    _schema: PhantomData<fn() -> S>,
}

impl<S> Deref for ScopedReadLock<S> {
    type Target = Prim;

    fn deref(&self) -> &Prim {
        &self.guard
    }
}

/// Write guard on a prim seen through view `S`.
pub struct ScopedWriteLock<S> {
    guard: ArcRwLockWriteGuard<RawRwLock, Prim>,
    _schema: PhantomData<fn() -> S>,
}

impl<S> Deref for ScopedWriteLock<S> {
    type Target = Prim;

    fn deref(&self) -> &Prim {
        &self.guard
    }
}

impl<S> DerefMut for ScopedWriteLock<S> {
    fn deref_mut(&mut self) -> &mut Prim {
        &mut self.guard
    }
}

// ============================================================================
// Two-phase upgrade
// ============================================================================

/// Read lock held on the narrow view.
pub struct LockedNarrow<S> {
    inner: ScopedReadLock<S>,
    stage: Arc<Stage>,
}

impl<S: SchemaView> LockedNarrow<S> {
    /// Build the broad holder while the prim kind is pinned.
    pub fn derive<B: SchemaView>(self) -> Result<HandleDerived<S, B>> {
        let broad = PrimHolder::<B>::new(Arc::clone(&self.stage), self.inner.path().clone());
        broad.check_kind(self.inner.kind())?;
        Ok(HandleDerived { narrow: self, broad })
    }
}

impl<S> Deref for LockedNarrow<S> {
    type Target = Prim;

    fn deref(&self) -> &Prim {
        &self.inner
    }
}

/// Narrow lock still held, broad holder built.
pub struct HandleDerived<S, B> {
    narrow: LockedNarrow<S>,
    broad: PrimHolder<B>,
}

/// Final state of the upgrade: a read lock on the broad view.
pub type LockedBroad<B> = ScopedReadLock<B>;

impl<S: SchemaView, B: SchemaView> HandleDerived<S, B> {
    pub fn broad_holder(&self) -> &PrimHolder<B> {
        &self.broad
    }

    /// Take the broad lock, then release the narrow one.
    ///
    /// The broad lock is a recursive read on the same prim, so it cannot
    /// queue behind a waiting writer while the narrow lock is still held.
    pub fn lock_broad(self) -> LockedBroad<B> {
        let handle = Arc::clone(&self.narrow.inner.handle);
        let guard = handle.read_arc_recursive();
        drop(self.narrow);
        ScopedReadLock { guard, handle, _schema: PhantomData }
    }
}
