mod cache;
mod control_grid;
mod core;
mod de_casteljau;
mod diagnostics;
mod evaluate;
mod export;
mod mesh;
mod surface;
mod tessellation;

pub use cache::{TessellationCache, TessellationCacheStats};
pub use control_grid::{ControlGrid, GridLine, GridLineIter};
pub use core::{BBox, Point3, Tolerance, Vec3};
pub use de_casteljau::{CurveSample, EvalError, EvalResult, evaluate_curve, evaluate_curve_with};
pub use diagnostics::TessellationDiagnostics;
pub use evaluate::{SurfaceEvaluator, SurfaceSample, eval_sample};
pub use export::{
    SNAPSHOT_DECIMALS, SNAPSHOT_QUANTIZE, normalize_snapshot_text, quantize_f64, snapshot_text,
    write_obj,
};
pub use mesh::{MeshError, TriangleMesh};
pub use surface::{BezierSurface, SurfaceError};
pub use tessellation::{
    SampleGrid, SamplingResolution, TessellationOptions, expected_triangle_count, sample_count,
    sample_surface_grid, tessellate_surface, tessellate_surfaces,
};

#[cfg(test)]
mod tests;
