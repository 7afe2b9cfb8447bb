//! Per-call settings for the read and write passes.

use crate::core::{EvaluationTime, Granularity};
use crate::geom::Purpose;

use super::{AttributeFilter, CachePolicy};

/// Settings of one write pass.
#[derive(Clone, Debug, Default)]
pub struct WriteContext {
    /// Time the pass authors at.
    pub time: EvaluationTime,
    /// Author transform and visibility once, or per frame.
    pub granularity: Granularity,
    /// Purpose authored on new geometry.
    pub purpose: Purpose,
    /// Only override existing geometry instead of authoring new geometry.
    pub overlay: bool,
    /// Selects foreign channels harvested as primvars.
    pub attribute_filter: AttributeFilter,
}

impl WriteContext {
    pub fn new(time: EvaluationTime) -> Self {
        Self { time, ..Default::default() }
    }

    pub fn with_time(mut self, time: EvaluationTime) -> Self {
        self.time = time;
        self
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn with_purpose(mut self, purpose: Purpose) -> Self {
        self.purpose = purpose;
        self
    }

    pub fn with_overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn with_attribute_filter(mut self, filter: AttributeFilter) -> Self {
        self.attribute_filter = filter;
        self
    }

    #[inline]
    pub fn is_per_frame(&self) -> bool {
        self.granularity.is_per_frame()
    }

    /// Transform cache policy implied by the granularity.
    #[inline]
    pub fn cache_policy(&self) -> CachePolicy {
        self.granularity.into()
    }

    /// Time for values authored only when they vary per frame.
    pub(crate) fn varying_time(&self) -> EvaluationTime {
        if self.is_per_frame() {
            self.time
        } else {
            EvaluationTime::Default
        }
    }
}

/// Level of detail of a read pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LodPolicy {
    /// Every channel.
    #[default]
    Full,
    /// Positions only.
    Viewport,
}

/// Settings of one read pass.
#[derive(Clone, Debug, Default)]
pub struct RefineParms {
    pub lod: LodPolicy,
    /// Selects document primvars copied to the point cloud.
    pub primvar_filter: AttributeFilter,
}

impl RefineParms {
    pub fn with_lod(mut self, lod: LodPolicy) -> Self {
        self.lod = lod;
        self
    }

    pub fn with_primvar_filter(mut self, filter: AttributeFilter) -> Self {
        self.primvar_filter = filter;
        self
    }
}
