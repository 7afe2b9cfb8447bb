//! Integration tests for the read and write passes of the point bridge.

use std::sync::Arc;

use pointbridge::bridge::{
    AttributeFilter, GeometryBridge, RefineParms, TransformCache, WriteContext,
};
use pointbridge::core::{EvaluationTime, Granularity, PrimKind, PrimPath};
use pointbridge::geom::{AttributeView, DataArray, PointCloud};
use pointbridge::stage::{Stage, Value, XFORM_ATTR};
use pointbridge::util::{mat_approx_eq, DMat4, DVec3, Vec3};

struct Fixture {
    stage: Arc<Stage>,
    cache: Arc<TransformCache>,
    path: PrimPath,
}

impl Fixture {
    fn new() -> Self {
        Self {
            stage: Arc::new(Stage::new()),
            cache: Arc::new(TransformCache::new()),
            path: PrimPath::new("/World/geo/points").expect("valid path"),
        }
    }

    fn writer(&self, ctxt: &WriteContext) -> GeometryBridge {
        let stage = Arc::clone(&self.stage);
        GeometryBridge::for_write(stage, self.path.clone(), ctxt, Arc::clone(&self.cache))
            .expect("Failed to define prim")
    }

    fn reader(&self) -> GeometryBridge {
        let stage = Arc::clone(&self.stage);
        GeometryBridge::for_read(stage, self.path.clone(), Arc::clone(&self.cache))
    }

    /// Define the prim directly with four points plus `extra` channels.
    fn author_raw(&self, extra: &[(&str, DataArray)]) {
        let prim = self.stage.define_prim(&self.path, PrimKind::Points).expect("define");
        let mut prim = prim.write();
        let pts = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
        prim.set("points", Value::Array(DataArray::from_vec3(&pts)), EvaluationTime::Default)
            .expect("points");
        for (name, data) in extra {
            prim.set(name, Value::Array(data.clone()), EvaluationTime::Default)
                .expect("channel");
        }
    }

    fn write(&self, source: &PointCloud, ctxt: &WriteContext) {
        assert!(self.writer(ctxt).update_from_prim(source, DMat4::IDENTITY, ctxt));
    }

    fn refine(&self, time: EvaluationTime) -> PointCloud {
        self.reader()
            .refine(time, &RefineParms::default())
            .expect("refine failed")
    }
}

fn grid(n: usize) -> PointCloud {
    let pts: Vec<Vec3> = (0..n).map(|i| Vec3::new(i as f32, 0.0, (i * i) as f32)).collect();
    PointCloud::from_positions(&pts)
}

fn f32s(pc: &PointCloud, name: &str) -> Vec<f32> {
    pc.point_attributes()
        .get(name)
        .and_then(DataArray::to_f32_vec)
        .unwrap_or_default()
}

#[test]
fn test_refine_positions_only() {
    let fx = Fixture::new();
    fx.write(&grid(5), &WriteContext::default());

    let pc = fx.refine(EvaluationTime::Default);
    assert_eq!(pc.point_count(), 5);
    assert_eq!(pc.positions().expect("positions").len(), 5);
    for name in ["N", "v", "widths", "pscale"] {
        assert!(pc.point_attributes().get(name).is_none(), "unexpected {name}");
    }
}

#[test]
fn test_short_normals_dropped() {
    let fx = Fixture::new();
    fx.author_raw(&[("normals", DataArray::from_vec3(&[Vec3::Y; 2]))]);

    let pc = fx.refine(EvaluationTime::Default);
    assert_eq!(pc.point_count(), 4);
    assert!(pc.point_attributes().get("N").is_none());
    assert_eq!(pc.point_attributes().len(), 1);
}

#[test]
fn test_short_velocities_and_widths_dropped() {
    let fx = Fixture::new();
    fx.author_raw(&[
        ("velocities", DataArray::from_vec3(&[Vec3::X; 3])),
        ("widths", DataArray::from_f32(vec![1.0])),
    ]);

    let pc = fx.refine(EvaluationTime::Default);
    assert_eq!(pc.point_count(), 4);
    for name in ["v", "widths", "pscale"] {
        assert!(pc.point_attributes().get(name).is_none(), "unexpected {name}");
    }
}

#[test]
fn test_long_channels_dropped() {
    let fx = Fixture::new();
    fx.author_raw(&[
        ("normals", DataArray::from_vec3(&[Vec3::Y; 5])),
        ("widths", DataArray::from_f32(vec![1.0; 6])),
        ("velocities", DataArray::from_vec3(&[Vec3::Z; 4])),
    ]);

    let pc = fx.refine(EvaluationTime::Default);
    assert_eq!(pc.point_count(), 4);
    assert!(pc.point_attributes().get("N").is_none());
    assert!(pc.point_attributes().get("widths").is_none());
    assert!(pc.point_attributes().get("pscale").is_none());
    // The correctly sized channel still comes through.
    assert_eq!(pc.point_attributes().get("v").map(DataArray::entries), Some(4));
}

#[test]
fn test_widths_roundtrip() {
    let fx = Fixture::new();
    let src = grid(3).with_point("widths", DataArray::from_f32(vec![0.2, 0.4, 0.6]));
    fx.write(&src, &WriteContext::default());

    let pc = fx.refine(EvaluationTime::Default);
    assert_eq!(f32s(&pc, "widths"), vec![0.2, 0.4, 0.6]);
}

#[test]
fn test_pscale_doubles_and_halves() {
    let fx = Fixture::new();
    let src = grid(3).with_point("pscale", DataArray::from_f32(vec![0.5, 1.0, 1.5]));
    fx.write(&src, &WriteContext::default());

    {
        let handle = fx.stage.prim(&fx.path).expect("prim");
        let prim = handle.read();
        let widths = prim
            .get("widths", EvaluationTime::Default)
            .and_then(Value::as_array)
            .and_then(DataArray::as_f32)
            .expect("widths");
        assert_eq!(widths, &[1.0, 2.0, 3.0]);
    }

    let pc = fx.refine(EvaluationTime::Default);
    assert_eq!(f32s(&pc, "pscale"), vec![0.5, 1.0, 1.5]);
}

#[test]
fn test_update_idempotent() {
    let fx = Fixture::new();
    let ctxt =
        WriteContext::new(EvaluationTime::frame(1.0)).with_granularity(Granularity::PerFrame);
    let src = grid(4)
        .with_point("v", DataArray::from_vec3(&[Vec3::X; 4]))
        .with_point("id", DataArray::from_i32(vec![1, 2, 3, 4]))
        .with_detail("name", DataArray::from_strings(vec!["cloud".into()]));
    let writer = fx.writer(&ctxt);

    assert!(writer.update_from_prim(&src, DMat4::IDENTITY, &ctxt));
    let once = fx.stage.to_json();
    assert!(writer.update_from_prim(&src, DMat4::IDENTITY, &ctxt));
    let twice = fx.stage.to_json();
    assert_eq!(once, twice);

    let prim = fx.stage.prim(&fx.path).expect("prim");
    let names: Vec<String> = prim.read().primvar_names().map(str::to_string).collect();
    assert_eq!(names, vec!["id", "name"]);
}

#[test]
fn test_velocity_preserved_when_absent() {
    let fx = Fixture::new();
    let ctxt = WriteContext::default();
    let velocities = DataArray::from_vec3(&[Vec3::new(0.0, 1.0, 0.0); 3]);
    fx.write(&grid(3).with_point("v", velocities.clone()), &ctxt);
    fx.write(&grid(3), &ctxt);

    let pc = fx.refine(EvaluationTime::Default);
    assert_eq!(pc.point_attributes().get("v"), Some(&velocities));
}

#[test]
fn test_redefine_recomputes_transform() {
    let fx = Fixture::new();
    let ctxt = WriteContext::default();
    let parent = fx.path.parent().expect("parent");
    let parent_prim = fx.stage.define_prim(&parent, PrimKind::Xform).expect("parent");
    let set_parent = |x: f64| {
        parent_prim
            .write()
            .set(
                XFORM_ATTR,
                Value::Matrix(DMat4::from_translation(DVec3::new(x, 0.0, 0.0))),
                EvaluationTime::Default,
            )
            .expect("xform");
    };
    let local = || {
        let handle = fx.stage.prim(&fx.path).expect("prim");
        let m = *handle
            .read()
            .get(XFORM_ATTR, EvaluationTime::Default)
            .and_then(Value::as_matrix)
            .expect("xform");
        m
    };
    let obj = DMat4::from_translation(DVec3::new(10.0, 0.0, 0.0));

    set_parent(1.0);
    let mut writer = fx.writer(&ctxt);
    assert!(writer.update_from_prim(&grid(2), obj, &ctxt));
    assert!(mat_approx_eq(&local(), &DMat4::from_translation(DVec3::new(9.0, 0.0, 0.0)), 1e-9));

    // Same key: the cached composition is reused.
    set_parent(4.0);
    assert!(writer.update_from_prim(&grid(2), obj, &ctxt));
    assert!(mat_approx_eq(&local(), &DMat4::from_translation(DVec3::new(9.0, 0.0, 0.0)), 1e-9));

    assert!(writer.redefine(Arc::clone(&fx.stage), fx.path.clone(), &ctxt));
    assert!(writer.update_from_prim(&grid(2), obj, &ctxt));
    assert!(mat_approx_eq(&local(), &DMat4::from_translation(DVec3::new(6.0, 0.0, 0.0)), 1e-9));
}

#[test]
fn test_primvar_roundtrip() {
    let fx = Fixture::new();
    let ctxt = WriteContext::default();
    let src = grid(2)
        .with_point("Cd", DataArray::from_vec3(&[Vec3::X, Vec3::Y]))
        .with_point("mass", DataArray::from_f32(vec![1.0, 2.0]))
        .with_detail("tag", DataArray::from_i32(vec![9]));
    fx.write(&src, &ctxt);

    let pc = fx.refine(EvaluationTime::Default);
    assert_eq!(f32s(&pc, "Cd"), vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    assert_eq!(f32s(&pc, "mass"), vec![1.0, 2.0]);
    assert_eq!(pc.detail_attributes().get("tag"), Some(&DataArray::from_i32(vec![9])));

    // The read filter applies to document primvar names.
    let parms = RefineParms::default().with_primvar_filter(AttributeFilter::new("^mass"));
    let pc = fx.reader().refine(EvaluationTime::Default, &parms).expect("refine");
    assert!(pc.point_attributes().get("mass").is_none());
    assert!(pc.point_attributes().get("Cd").is_some());
}

#[test]
fn test_time_sampled_points() {
    let fx = Fixture::new();
    for frame in [1.0, 2.0] {
        let ctxt = WriteContext::new(EvaluationTime::frame(frame))
            .with_granularity(Granularity::PerFrame);
        let n = frame as usize * 2;
        fx.write(&grid(n), &ctxt);
    }
    assert_eq!(fx.refine(EvaluationTime::frame(1.0)).point_count(), 2);
    assert_eq!(fx.refine(EvaluationTime::frame(1.5)).point_count(), 2);
    assert_eq!(fx.refine(EvaluationTime::frame(2.0)).point_count(), 4);
}
