use std::sync::Arc;

use crate::geom::{
    BezierSurface, Point3, SamplingResolution, TessellationCache, TessellationOptions,
    tessellate_surfaces,
};

fn bilinear(offset: f64) -> BezierSurface {
    BezierSurface::new(
        1,
        1,
        vec![
            Point3::new(offset, 0.0, 0.0),
            Point3::new(offset + 1.0, 0.0, 0.0),
            Point3::new(offset, 1.0, 0.5),
            Point3::new(offset + 1.0, 1.0, 0.0),
        ],
    )
    .expect("bilinear net")
}

#[test]
fn cache_matches_direct_tessellation() {
    let surfaces = vec![bilinear(0.0), bilinear(2.0)];
    let options = TessellationOptions::new(SamplingResolution::new_clamped(3));
    let (direct, direct_diag) = tessellate_surfaces(&surfaces, &options);

    let mut cache = TessellationCache::new(options);
    cache.set_surfaces(surfaces);
    let cached = cache.current_mesh();

    assert_eq!(*cached, direct);
    assert_eq!(cache.diagnostics(), &direct_diag);
    assert_eq!(cache.surfaces().len(), 2);
}

#[test]
fn resolution_sweep_rebuilds_once_per_step() {
    let mut cache = TessellationCache::default();
    cache.set_resolution(1);
    cache.set_surfaces(vec![bilinear(0.0)]);

    let mut counts = Vec::new();
    loop {
        let mesh = cache.current_mesh();
        // Rendering the same frame twice must not rebuild.
        let again = cache.current_mesh();
        assert!(Arc::ptr_eq(&mesh, &again));
        counts.push(mesh.triangle_count());

        if cache.resolution() == SamplingResolution::MAX {
            break;
        }
        cache.increase_resolution();
    }

    let expected: Vec<usize> = (1..=10).map(|r| 2 * r * r).collect();
    assert_eq!(counts, expected);

    let stats = cache.stats();
    assert_eq!(stats.rebuild_count, 10);
    assert_eq!(stats.hit_count, 10);
    assert_eq!(stats.generation, 10);
    assert!((stats.hit_rate() - 0.5).abs() < 1e-12);

    // Already at the top: the request is clamped and nothing changes.
    assert_eq!(cache.increase_resolution(), SamplingResolution::MAX);
    assert!(!cache.is_dirty());
}

#[test]
fn going_down_and_back_up_rebuilds_identically() {
    let mut cache = TessellationCache::new(TessellationOptions::new(SamplingResolution::new_clamped(4)));
    cache.set_surfaces(vec![bilinear(0.0), bilinear(1.0)]);
    let before = cache.current_mesh();

    cache.decrease_resolution();
    let coarse = cache.current_mesh();
    assert!(coarse.triangle_count() < before.triangle_count());

    cache.increase_resolution();
    let after = cache.current_mesh();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(*before, *after);
}
