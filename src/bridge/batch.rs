//! Parallel translation of many distinct prims.
//!
//! Every item runs its own pass and fails on its own. Callers must not put
//! two writers for the same prim into one batch.

use rayon::prelude::*;

use crate::core::EvaluationTime;
use crate::geom::{AttributeView, PointCloud};
use crate::util::DMat4;

use super::{GeometryBridge, RefineParms, WriteContext};

/// One write of a batch.
pub struct UpdateJob<'a> {
    pub bridge: &'a GeometryBridge,
    pub source: &'a (dyn AttributeView + Sync),
    pub object_xform: DMat4,
}

/// Refine every bridge in parallel. Results keep input order.
pub fn refine_batch(
    bridges: &[GeometryBridge],
    time: EvaluationTime,
    parms: &RefineParms,
) -> Vec<Option<PointCloud>> {
    let _span = tracing::debug_span!("refine_batch", count = bridges.len()).entered();
    bridges.par_iter().map(|b| b.refine(time, parms)).collect()
}

/// Run every write in parallel. Results keep input order.
pub fn update_batch(jobs: &[UpdateJob<'_>], ctxt: &WriteContext) -> Vec<bool> {
    let _span = tracing::debug_span!("update_batch", count = jobs.len()).entered();
    jobs.par_iter()
        .map(|job| job.bridge.update_from_prim(job.source, job.object_xform, ctxt))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::bridge::TransformCache;
    use crate::core::PrimPath;
    use crate::stage::Stage;
    use crate::util::Vec3;

    #[test]
    fn test_batch_roundtrip() {
        let stage = Arc::new(Stage::new());
        let cache = Arc::new(TransformCache::new());
        let ctxt = WriteContext::default();

        let paths: Vec<PrimPath> = (0..8)
            .map(|i| PrimPath::new(format!("/World/pts{i}")).unwrap())
            .collect();
        let writers: Vec<GeometryBridge> = paths
            .iter()
            .map(|p| {
                GeometryBridge::for_write(Arc::clone(&stage), p.clone(), &ctxt, Arc::clone(&cache))
                    .unwrap()
            })
            .collect();
        let clouds: Vec<PointCloud> = (0..8)
            .map(|i| PointCloud::from_positions(&vec![Vec3::splat(i as f32); i + 1]))
            .collect();
        let jobs: Vec<UpdateJob> = writers
            .iter()
            .zip(&clouds)
            .map(|(bridge, pc)| UpdateJob { bridge, source: pc, object_xform: DMat4::IDENTITY })
            .collect();
        assert!(update_batch(&jobs, &ctxt).into_iter().all(|ok| ok));

        let mut readers: Vec<GeometryBridge> = paths
            .iter()
            .map(|p| GeometryBridge::for_read(Arc::clone(&stage), p.clone(), Arc::clone(&cache)))
            .collect();
        readers.push(GeometryBridge::for_read(
            Arc::clone(&stage),
            PrimPath::new("/World/missing").unwrap(),
            cache,
        ));
        let out = refine_batch(&readers, EvaluationTime::Default, &RefineParms::default());
        assert_eq!(out.len(), 9);
        for (i, pc) in out.iter().take(8).enumerate() {
            assert_eq!(pc.as_ref().unwrap().point_count(), i + 1);
        }
        assert!(out[8].is_none());
    }
}
