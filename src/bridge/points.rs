//! Point cloud bridge.
//!
//! A [`GeometryBridge`] pairs one stage prim with foreign point geometry.
//! It is built either for reading ([`GeometryBridge::for_read`]) or for
//! writing ([`GeometryBridge::for_write`]) and never changes mode. Locks are
//! taken for the duration of one pass only.
//!
//! # Read pass
//!
//! [`GeometryBridge::refine`] turns the prim into a [`PointCloud`]:
//! `points` becomes `P`, `normals` becomes `N`, `velocities` becomes `v`,
//! `widths` becomes `widths` plus a half-width `pscale`, and primvars are
//! copied through a filter.
//!
//! # Write pass
//!
//! [`GeometryBridge::update_from_prim`] authors extent, transform, purpose,
//! visibility, the canonical channels, harvested primvars and display colour,
//! in that order. Channels missing from the source are left untouched.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::{EvaluationTime, KindId, Ownership, PrimKind, PrimPath};
use crate::geom::{
    AttributeList, AttributeView, DataArray, PointCloud, Purpose, Refiner, Visibility,
    POSITION_CHANNEL, PURPOSE_ATTR, VISIBILITY_ATTR,
};
use crate::stage::{
    ImageableSchema, LockedBroad, PointsSchema, Prim, PrimHolder, Stage, Value, EXTENT_ATTR,
    XFORM_ATTR, XFORM_OP_ORDER_ATTR,
};
use crate::util::{DMat4, Error, Result};

use super::names::{self, CanonicalChannel};
use super::primvars::{self, PrimvarView};
use super::{LodPolicy, RefineParms, TransformCache, WriteContext};

/// Per-object foreign channel driving the prim's active state.
pub const ACTIVE_CHANNEL: &str = "usdactive";

/// Channels never harvested as generic primvars.
const POINT_HARVEST_EXCLUDES: &str = "^P ^N ^v ^widths ^pscale ^visible ^usdactive";
const OBJECT_HARVEST_EXCLUDES: &str = "^visible ^usdactive";

/// Adapter between one point cloud prim and foreign point geometry.
#[derive(Clone)]
pub struct GeometryBridge {
    for_read: Option<PrimHolder<PointsSchema>>,
    for_write: Option<PrimHolder<PointsSchema>>,
    cache: Arc<TransformCache>,
}

impl std::fmt::Debug for GeometryBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryBridge")
            .field("for_read", &self.for_read)
            .field("for_write", &self.for_write)
            .finish()
    }
}

impl GeometryBridge {
    pub const CLASS_NAME: &'static str = "PointsBridge";

    /// Read-mode bridge on an existing prim.
    pub fn for_read(stage: Arc<Stage>, path: PrimPath, cache: Arc<TransformCache>) -> Self {
        Self {
            for_read: Some(PrimHolder::new(stage, path)),
            for_write: None,
            cache,
        }
    }

    /// Write-mode bridge. Defines a points prim at `path`, or only adds an
    /// overlay opinion when `ctxt.overlay` is set.
    pub fn for_write(
        stage: Arc<Stage>,
        path: PrimPath,
        ctxt: &WriteContext,
        cache: Arc<TransformCache>,
    ) -> Result<Self> {
        let holder = define_for_write(stage, path, ctxt)?;
        Ok(Self { for_read: None, for_write: Some(holder), cache })
    }

    /// Point a write-mode bridge at a new prim.
    ///
    /// Cached transforms of the old and the new path are dropped before the
    /// new prim is defined. Read-mode bridges cannot be redefined.
    pub fn redefine(&mut self, stage: Arc<Stage>, path: PrimPath, ctxt: &WriteContext) -> bool {
        if let Some(read) = &self.for_read {
            warn!("{}: cannot redefine read-only bridge on {}", Self::CLASS_NAME, read.path());
            return false;
        }
        if let Some(old) = &self.for_write {
            self.cache.invalidate(old.path());
        }
        self.cache.invalidate(&path);
        match define_for_write(stage, path, ctxt) {
            Ok(holder) => {
                self.for_write = Some(holder);
                true
            }
            Err(e) => {
                warn!("{}: redefine failed: {}", Self::CLASS_NAME, e);
                self.for_write = None;
                false
            }
        }
    }

    fn holder(&self) -> Option<&PrimHolder<PointsSchema>> {
        self.for_read.as_ref().or(self.for_write.as_ref())
    }

    /// Whether the bridge references a points prim present on the stage.
    pub fn is_valid(&self) -> bool {
        self.holder().is_some_and(PrimHolder::is_valid)
    }

    pub fn is_read_only(&self) -> bool {
        self.for_read.is_some()
    }

    pub fn path(&self) -> Option<&PrimPath> {
        self.holder().map(PrimHolder::path)
    }

    pub fn cache(&self) -> &Arc<TransformCache> {
        &self.cache
    }

    /// Registry id of the bridged prim kind.
    pub fn kind_id(&self) -> KindId {
        PrimKind::Points.id()
    }

    /// Independent bridge on the same prim. Only the transform cache is
    /// shared, and that is keyed by path.
    pub fn soft_copy(&self) -> Self {
        self.clone()
    }

    /// Read lock on the imageable view of the read prim.
    pub fn imageable_for_read(&self) -> Result<LockedBroad<ImageableSchema>> {
        let holder = self.for_read.as_ref().ok_or(Error::InvalidReference)?;
        let narrow = holder.lock_narrow()?;
        Ok(narrow.derive::<ImageableSchema>()?.lock_broad())
    }

    /// Authored purpose of the read prim, `Default` when unreadable.
    pub fn purpose(&self) -> Purpose {
        self.imageable_for_read()
            .ok()
            .and_then(|prim| {
                prim.get(PURPOSE_ATTR, EvaluationTime::Default)
                    .and_then(Value::as_token)
                    .map(Purpose::from_token)
            })
            .unwrap_or_default()
    }

    /// Visibility of the read prim at `time`, inherited when unreadable.
    pub fn visibility(&self, time: EvaluationTime) -> Visibility {
        self.imageable_for_read()
            .ok()
            .and_then(|prim| {
                prim.get(VISIBILITY_ATTR, time)
                    .and_then(Value::as_token)
                    .map(Visibility::from_token)
            })
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Read pass
    // ------------------------------------------------------------------

    /// Build a point cloud from the prim at `time`.
    pub fn try_refine(&self, time: EvaluationTime, parms: &RefineParms) -> Result<PointCloud> {
        let holder = self.for_read.as_ref().ok_or(Error::InvalidReference)?;
        let _span = tracing::debug_span!("refine", path = %holder.path()).entered();
        let prim = holder.read()?;

        let positions = fetch_positions(&prim, time)?;
        let n = positions.entries();
        let mut point_attrs = AttributeList::new().with(POSITION_CHANNEL, positions);
        let mut detail_attrs = AttributeList::new();

        if parms.lod == LodPolicy::Viewport {
            debug!("viewport lod: positions only for {}", prim.path());
            return Ok(PointCloud::new(point_attrs, detail_attrs));
        }

        for channel in [
            CanonicalChannel::Normal,
            CanonicalChannel::Velocity,
            CanonicalChannel::Width,
        ] {
            match fetch_point_channel(&prim, channel, time, n) {
                Ok(Some(data)) => {
                    for (name, foreign) in names::to_foreign(channel, data) {
                        point_attrs.add_attribute(name, foreign, true);
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("{}", e),
            }
        }

        let view = PrimvarView::from_prim(&prim, time, n);
        for handle in parms.primvar_filter.apply(&view) {
            let Some(data) = view.data(&handle.name, handle.ownership) else {
                continue;
            };
            if handle.ownership == Ownership::PerPoint && data.entries() != n {
                warn!(
                    "{}",
                    cardinality_error(&prim, &handle.name, n, data.entries())
                );
                continue;
            }
            let name = names::foreign_primvar_name(&handle.name);
            match handle.ownership {
                Ownership::PerPoint => point_attrs.add_attribute(name, data.clone(), true),
                Ownership::PerObject => detail_attrs.add_attribute(name, data.clone(), true),
            };
        }

        Ok(PointCloud::new(point_attrs, detail_attrs))
    }

    /// [`try_refine`](Self::try_refine), logging failures.
    pub fn refine(&self, time: EvaluationTime, parms: &RefineParms) -> Option<PointCloud> {
        match self.try_refine(time, parms) {
            Ok(pc) => Some(pc),
            Err(e) => {
                warn!("{}: refine failed: {}", Self::CLASS_NAME, e);
                None
            }
        }
    }

    /// Refine into a sink. Returns whether a primitive was added.
    pub fn refine_into(
        &self,
        refiner: &mut dyn Refiner,
        time: EvaluationTime,
        parms: &RefineParms,
    ) -> bool {
        match self.refine(time, parms) {
            Some(pc) => {
                refiner.add_primitive(pc);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Write pass
    // ------------------------------------------------------------------

    /// Author `source` on the prim. `object_xform` is the world transform of
    /// the foreign object.
    pub fn try_update_from_prim(
        &self,
        source: &dyn AttributeView,
        object_xform: DMat4,
        ctxt: &WriteContext,
    ) -> Result<()> {
        let holder = match (&self.for_write, &self.for_read) {
            (Some(h), _) => h,
            (None, Some(h)) => return Err(Error::ReadOnly(h.path().to_string())),
            (None, None) => return Err(Error::InvalidReference),
        };
        let _span = tracing::debug_span!("update_from_prim", path = %holder.path()).entered();
        let write_new_geo = !ctxt.overlay;

        // Ancestors are read-locked one at a time here, never under our write lock.
        let xform = self.cache.compose(
            holder.stage(),
            holder.path(),
            ctxt.time,
            object_xform,
            ctxt.cache_policy(),
        );

        let mut prim = holder.write()?;
        let n = source.point_count();

        if let Some(bounds) = source.bounds() {
            let extent = DataArray::from_vec3(&bounds.to_extent());
            prim.set(EXTENT_ATTR, Value::Array(extent), ctxt.time)?;
        }

        prim.set(XFORM_ATTR, Value::Matrix(xform), ctxt.varying_time())?;
        let op_order = DataArray::from_strings(vec![XFORM_ATTR.to_string()]);
        prim.set(XFORM_OP_ORDER_ATTR, Value::Array(op_order), EvaluationTime::Default)?;

        if write_new_geo && ctxt.purpose != Purpose::Default {
            prim.set(PURPOSE_ATTR, Value::token(ctxt.purpose.as_token()), EvaluationTime::Default)?;
        }

        if ctxt.is_per_frame() {
            let vis = source.visibility();
            prim.set(VISIBILITY_ATTR, Value::token(vis.as_token()), ctxt.time)?;
        }

        for channel in CanonicalChannel::WRITE_ORDER {
            author_channel(&mut prim, source, channel, n, ctxt.time)?;
        }

        let mut filter = ctxt.attribute_filter.clone();
        filter
            .append_pattern(Ownership::PerPoint, POINT_HARVEST_EXCLUDES)
            .append_pattern(Ownership::PerObject, OBJECT_HARVEST_EXCLUDES);
        for handle in filter.apply(source) {
            let Some(data) = source.data(&handle.name, handle.ownership) else {
                continue;
            };
            if handle.ownership == Ownership::PerPoint && data.entries() != n {
                warn!("{}", cardinality_error(&prim, &handle.name, n, data.entries()));
                continue;
            }
            if let Err(e) =
                primvars::author_primvar(&mut prim, &handle.name, data, handle.ownership, ctxt.time)
            {
                warn!("{}: primvar {} not authored: {}", prim.path(), handle.name, e);
            }
        }

        author_channel(&mut prim, source, CanonicalChannel::DisplayColor, n, ctxt.time)?;

        update_active(&mut prim, source);
        Ok(())
    }

    /// [`try_update_from_prim`](Self::try_update_from_prim), logging failures.
    pub fn update_from_prim(
        &self,
        source: &dyn AttributeView,
        object_xform: DMat4,
        ctxt: &WriteContext,
    ) -> bool {
        match self.try_update_from_prim(source, object_xform, ctxt) {
            Ok(()) => true,
            Err(e) => {
                warn!("{}: update failed: {}", Self::CLASS_NAME, e);
                false
            }
        }
    }
}

fn define_for_write(
    stage: Arc<Stage>,
    path: PrimPath,
    ctxt: &WriteContext,
) -> Result<PrimHolder<PointsSchema>> {
    if ctxt.overlay {
        stage.override_prim(&path)?;
    } else {
        stage.define_prim(&path, PrimKind::Points)?;
    }
    Ok(PrimHolder::new(stage, path))
}

fn cardinality_error(prim: &Prim, channel: &str, expected: usize, actual: usize) -> Error {
    Error::CardinalityMismatch {
        path: prim.path().to_string(),
        channel: channel.to_string(),
        expected,
        actual,
    }
}

fn fetch_positions(prim: &Prim, time: EvaluationTime) -> Result<DataArray> {
    let name = CanonicalChannel::Position.persisted_name();
    let missing = || Error::MissingMandatoryChannel {
        path: prim.path().to_string(),
        channel: name.to_string(),
    };
    if !prim.has_authored_value(name) {
        return Err(missing());
    }
    prim.get(name, time)
        .and_then(Value::as_array)
        .filter(|a| a.tuple_size() == 3 && a.element_type().is_numeric())
        .cloned()
        .ok_or_else(missing)
}

/// Authored per-point channel, `Ok(None)` when not authored.
fn fetch_point_channel(
    prim: &Prim,
    channel: CanonicalChannel,
    time: EvaluationTime,
    n: usize,
) -> Result<Option<DataArray>> {
    let name = channel.persisted_name();
    if !prim.has_authored_value(name) {
        return Ok(None);
    }
    let Some(data) = prim.get(name, time).and_then(Value::as_array) else {
        return Ok(None);
    };
    if data.entries() != n {
        return Err(cardinality_error(prim, name, n, data.entries()));
    }
    Ok(Some(data.clone()))
}

/// Author one canonical channel. Channel-local failures are logged and
/// swallowed; absent channels leave the prim untouched.
fn author_channel(
    prim: &mut Prim,
    source: &dyn AttributeView,
    channel: CanonicalChannel,
    n: usize,
    time: EvaluationTime,
) -> Result<()> {
    let Some((ownership, data)) = names::lookup_foreign(source, channel) else {
        return Ok(());
    };
    let result = names::persistable(channel, &data).and_then(|data| {
        if ownership == Ownership::PerPoint && data.entries() != n {
            return Err(cardinality_error(prim, channel.foreign_name(), n, data.entries()));
        }
        let name = channel.persisted_name();
        prim.set(name, Value::Array(data), time)?;
        if matches!(
            channel,
            CanonicalChannel::Normal | CanonicalChannel::Width | CanonicalChannel::DisplayColor
        ) {
            prim.set_interpolation(name, ownership.interpolation())?;
        }
        Ok(())
    });
    match result {
        Err(e) if e.is_channel_local() => {
            warn!("{}", e);
            Ok(())
        }
        other => other,
    }
}

/// Shared post-update step: the `usdactive` detail channel sets the prim's
/// active state.
fn update_active(prim: &mut Prim, source: &dyn AttributeView) {
    if let Some(flag) = source
        .data(ACTIVE_CHANNEL, Ownership::PerObject)
        .and_then(DataArray::first_int)
    {
        prim.set_active(flag != 0);
    }
}
