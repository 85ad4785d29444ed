use std::path::{Path, PathBuf};
use std::sync::Arc;

use bezier_engine::config::load_config;
use bezier_engine::geom::{
    SamplingResolution, TessellationCache, TessellationOptions, TriangleMesh,
    normalize_snapshot_text, snapshot_text, tessellate_surfaces, write_obj,
};
use bezier_engine::parse::{parse_control_net_file, parse_obj_file, parse_obj_str};
use bezier_engine::{MeshSink, ParseError, SurfaceRenderer};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

fn assert_or_update_fixture(name: &str, actual: &str) {
    let path = fixtures_dir().join("golden").join(name);
    let actual = normalize_snapshot_text(actual);

    if std::env::var_os("BEZIER_UPDATE_GOLDENS").is_some() {
        std::fs::write(&path, actual).expect("write golden fixture");
        return;
    }

    let expected = std::fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("missing fixture `{}`: {err}", path.display()));
    let expected = normalize_snapshot_text(&expected);

    assert_eq!(
        actual, expected,
        "golden mismatch for `{name}` (set BEZIER_UPDATE_GOLDENS=1 to update)"
    );
}

#[derive(Debug, Default)]
struct CountingSink {
    uploaded_vertices: Vec<usize>,
    draw_calls: usize,
}

impl MeshSink for CountingSink {
    fn upload(&mut self, positions: &[f32], normals: &[f32], vertex_count: usize) {
        assert_eq!(positions.len(), 3 * vertex_count);
        assert_eq!(normals.len(), 3 * vertex_count);
        self.uploaded_vertices.push(vertex_count);
    }

    fn draw_triangles(&mut self, first: usize, _vertex_count: usize) {
        assert_eq!(first, 0);
        self.draw_calls += 1;
    }
}

#[test]
fn unit_square_round_trip() {
    init_logger();
    let surfaces = parse_control_net_file(fixture_path("unit_square.bez")).expect("parse unit square");
    let options = TessellationOptions::new(SamplingResolution::new_clamped(2));
    let (mesh, diag) = tessellate_surfaces(&surfaces, &options);

    assert_eq!(diag.sample_count, 9);
    assert_eq!(mesh.triangle_count(), 8);
    assert_eq!(mesh.vertex_count(), 24);
    assert!(diag.is_clean(), "{diag}");
    mesh.validate().expect("valid mesh");

    for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
        assert_eq!(p[2], 0.0);
        assert!((0.0..=1.0).contains(&p[0]) && (0.0..=1.0).contains(&p[1]));
        assert_eq!(*n, [0.0, 0.0, 1.0]);
    }

    // Every grid point of the 3x3 lattice is used.
    for x in [0.0, 0.5, 1.0] {
        for y in [0.0, 0.5, 1.0] {
            assert!(mesh.positions.contains(&[x, y, 0.0]), "missing ({x}, {y})");
        }
    }
}

#[test]
fn golden_unit_square_r1() {
    init_logger();
    let surfaces = parse_control_net_file(fixture_path("unit_square.bez")).expect("parse unit square");
    let options = TessellationOptions::new(SamplingResolution::MIN);
    let (mesh, diag) = tessellate_surfaces(&surfaces, &options);
    let snap = snapshot_text(&format!("tessellate r={}", options.resolution), &mesh, &diag);
    assert_or_update_fixture("unit_square_r1.snap", &snap);
}

#[test]
fn two_patches_concatenate_in_file_order() {
    init_logger();
    let surfaces = parse_control_net_file(fixture_path("two_patches.bez")).expect("parse two patches");
    assert_eq!(surfaces.len(), 2);
    assert_eq!((surfaces[0].degree_u(), surfaces[0].degree_v()), (1, 1));
    assert_eq!((surfaces[1].degree_u(), surfaces[1].degree_v()), (3, 3));

    let options = TessellationOptions::new(SamplingResolution::new_clamped(3));
    let (mesh, diag) = tessellate_surfaces(&surfaces, &options);
    let first = 2 * 3 * 3;
    let second = 2 * 9 * 9;
    assert_eq!(mesh.triangle_count(), first + second);
    assert_eq!(diag.surface_count, 2);
    assert_eq!(diag.degenerate_normal_count, 0);

    // The saddle's vertices come first and stay within its unit footprint.
    assert!(mesh.positions[..3 * first].iter().all(|p| p[0] <= 1.0 && p[1] <= 1.0));
    // The bump starts on its last control row.
    assert_eq!(mesh.positions[3 * first], [0.0, 3.0, 0.0]);
}

#[test]
fn loader_errors_carry_location() {
    init_logger();
    match parse_control_net_file(fixture_path("bad_degree.bez")) {
        Err(ParseError::MalformedInput { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected MalformedInput, got {other:?}"),
    }
    assert!(matches!(
        parse_control_net_file(fixture_path("truncated.bez")),
        Err(ParseError::MalformedInput { .. })
    ));
    assert!(matches!(
        parse_control_net_file(fixture_path("does_not_exist.bez")),
        Err(ParseError::FileUnreadable { .. })
    ));
    match parse_obj_file(fixture_path("bad_index.obj")) {
        Err(err) => assert_eq!(err.line(), Some(4)),
        Ok(mesh) => panic!("expected an error, got {} triangles", mesh.triangle_count()),
    }
}

#[test]
fn obj_import_and_export() {
    init_logger();
    let mesh = parse_obj_file(fixture_path("tetra.obj")).expect("parse tetra");
    assert_eq!(mesh.triangle_count(), 4);
    assert_eq!(mesh.vertex_count(), 12);
    mesh.validate().expect("valid mesh");
    for n in &mesh.normals {
        let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert!((length - 1.0).abs() < 1e-12);
    }

    let mut buffer = Vec::new();
    write_obj(&mut buffer, &mesh, "tetra").expect("write obj");
    let text = String::from_utf8(buffer).expect("utf-8 obj");
    let reread = parse_obj_str(&text).expect("re-read exported obj");
    assert_eq!(reread.positions, mesh.positions);
    assert_eq!(reread.triangle_count(), 4);
}

#[test]
fn config_drives_cache_resolution() {
    init_logger();
    let config = load_config(fixture_path("config.json")).expect("load config");
    assert_eq!(config.tessellation.resolution.get(), 2);

    let mut cache = TessellationCache::new(config.tessellation);
    cache.set_surfaces(parse_control_net_file(fixture_path("unit_square.bez")).unwrap());
    assert_eq!(cache.current_mesh().triangle_count(), 8);

    cache.set_resolution(100);
    assert_eq!(cache.resolution(), SamplingResolution::MAX);
    assert_eq!(cache.current_mesh().triangle_count(), 2 * 10 * 10);
    cache.set_resolution(-3);
    assert_eq!(cache.current_mesh().triangle_count(), 2);
}

#[test]
fn imported_mesh_survives_resolution_changes() {
    init_logger();
    let mut cache = TessellationCache::default();
    cache.set_imported_mesh(parse_obj_file(fixture_path("tetra.obj")).unwrap());
    let first = cache.current_mesh();
    cache.increase_resolution();
    let second = cache.current_mesh();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.generation(), 1);
}

#[test]
fn renderer_reloads_and_recovers() {
    init_logger();
    let mut renderer = SurfaceRenderer::new(
        CountingSink::default(),
        TessellationOptions::new(SamplingResolution::new_clamped(2)),
    );

    assert_eq!(renderer.load_control_net(fixture_path("two_patches.bez")).unwrap(), 2);
    let report = renderer.render_frame();
    assert!(report.uploaded);
    assert_eq!(report.vertex_count, 3 * (2 * 2 * 2 + 2 * 6 * 6));
    assert!(!renderer.render_frame().uploaded);

    assert!(renderer.load_control_net(fixture_path("truncated.bez")).is_err());
    assert_eq!(renderer.render_frame().vertex_count, 0);

    assert_eq!(renderer.load_obj(fixture_path("tetra.obj")).unwrap(), 4);
    assert_eq!(renderer.render_frame().vertex_count, 12);

    let sink = renderer.into_sink();
    assert_eq!(sink.uploaded_vertices, vec![3 * (8 + 72), 0, 12]);
    assert_eq!(sink.draw_calls, 4);
}

#[test]
fn empty_cache_yields_empty_mesh() {
    let mut cache = TessellationCache::default();
    assert_eq!(*cache.current_mesh(), TriangleMesh::new());
}
