//! Uniform-grid tessellation of Bézier surfaces.
//!
//! Each surface is sampled on a regular `(u, v)` grid whose density scales
//! with its degrees and a [`SamplingResolution`]:
//!
//! - `u_count = r * degree_u + 1`, `v_count = r * degree_v + 1`
//! - sample `(i, j)` sits at `v = i / (v_count - 1)`, `u = j / (u_count - 1)`
//!
//! Samples are laid out v-outer / u-inner, the same order as the control
//! grid, and every grid cell becomes two triangles in a flat
//! [`TriangleMesh`]. Parameters are computed by division rather than by
//! accumulating a step, so `0` and `1` are hit exactly and the grid of
//! resolution `r` is a subset of the grid of any multiple of `r`.
//!
//! # Example
//!
//! ```ignore
//! use bezier_engine::geom::{tessellate_surfaces, SamplingResolution, TessellationOptions};
//!
//! let options = TessellationOptions::new(SamplingResolution::new_clamped(4));
//! let (mesh, diagnostics) = tessellate_surfaces(&surfaces, &options);
//! assert_eq!(mesh.vertex_count(), diagnostics.vertex_count);
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use super::core::{Point3, Vec3};
use super::diagnostics::TessellationDiagnostics;
use super::evaluate::{SurfaceEvaluator, SurfaceSample};
use super::mesh::TriangleMesh;
use super::surface::BezierSurface;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// ─────────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────────

/// Samples per degree, always within `[MIN, MAX]`.
///
/// Out-of-range requests are clamped, never rejected; this also applies when
/// the value is deserialized from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct SamplingResolution(u8);

impl SamplingResolution {
    pub const MIN: Self = Self(1);
    pub const MAX: Self = Self(10);
    pub const DEFAULT: Self = Self(4);

    #[must_use]
    pub fn new_clamped(requested: i64) -> Self {
        let clamped = requested.clamp(i64::from(Self::MIN.0), i64::from(Self::MAX.0));
        // Clamped to [1, 10], so the conversion cannot fail.
        Self(u8::try_from(clamped).unwrap_or(Self::MAX.0))
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0 as usize
    }

    /// One step finer; stays at [`Self::MAX`].
    #[must_use]
    pub const fn increment(self) -> Self {
        if self.0 < Self::MAX.0 { Self(self.0 + 1) } else { self }
    }

    /// One step coarser; stays at [`Self::MIN`].
    #[must_use]
    pub const fn decrement(self) -> Self {
        if self.0 > Self::MIN.0 { Self(self.0 - 1) } else { self }
    }

    /// Every valid resolution, coarsest first.
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::MIN.0..=Self::MAX.0).map(Self)
    }
}

impl Default for SamplingResolution {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<i64> for SamplingResolution {
    fn from(requested: i64) -> Self {
        Self::new_clamped(requested)
    }
}

impl From<SamplingResolution> for i64 {
    fn from(resolution: SamplingResolution) -> Self {
        i64::from(resolution.0)
    }
}

impl std::fmt::Display for SamplingResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Options for [`tessellate_surfaces`].
///
/// # Example
/// ```ignore
/// use bezier_engine::geom::{SamplingResolution, TessellationOptions};
///
/// let fine = TessellationOptions::new(SamplingResolution::MAX);
/// let strict = TessellationOptions {
///     position_tolerance: 1e-12,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TessellationOptions {
    pub resolution: SamplingResolution,
    /// Allowed disagreement between the two evaluation passes, relative to
    /// the control-net extent (scaled by `max(1, bbox diagonal)`).
    /// Negative or non-finite values fall back to the default.
    #[serde(deserialize_with = "deserialize_tolerance")]
    pub position_tolerance: f64,
}

const DEFAULT_POSITION_TOLERANCE: f64 = 1e-9;

impl Default for TessellationOptions {
    fn default() -> Self {
        Self {
            resolution: SamplingResolution::DEFAULT,
            position_tolerance: DEFAULT_POSITION_TOLERANCE,
        }
    }
}

impl TessellationOptions {
    #[must_use]
    pub fn new(resolution: SamplingResolution) -> Self {
        Self {
            resolution,
            ..Self::default()
        }
    }

    /// Copy with a usable `position_tolerance`.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            position_tolerance: sanitize_tolerance(self.position_tolerance),
            ..self
        }
    }
}

fn sanitize_tolerance(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        log::warn!("position_tolerance {value} is not a non-negative number, using {DEFAULT_POSITION_TOLERANCE}");
        DEFAULT_POSITION_TOLERANCE
    }
}

fn deserialize_tolerance<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(sanitize_tolerance)
}

// ─────────────────────────────────────────────────────────────────────────────
// Sampling
// ─────────────────────────────────────────────────────────────────────────────

/// Evaluated samples of one surface, v-outer / u-inner.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    u_count: usize,
    v_count: usize,
    samples: Vec<SurfaceSample>,
}

impl SampleGrid {
    #[must_use]
    pub const fn u_count(&self) -> usize {
        self.u_count
    }

    #[must_use]
    pub const fn v_count(&self) -> usize {
        self.v_count
    }

    #[must_use]
    pub fn samples(&self) -> &[SurfaceSample] {
        &self.samples
    }

    /// Sample at v-index `row`, u-index `column`.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<&SurfaceSample> {
        if row < self.v_count && column < self.u_count {
            self.samples.get(row * self.u_count + column)
        } else {
            None
        }
    }

    /// Number of cells in the grid; each cell becomes two triangles.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.u_count.saturating_sub(1) * self.v_count.saturating_sub(1)
    }
}

/// Samples per direction for a given degree: `r * degree + 1`.
#[must_use]
pub fn sample_count(degree: usize, resolution: SamplingResolution) -> usize {
    resolution.get() * degree + 1
}

/// Triangles [`tessellate_surface`] emits for `surface`: `2 * (r*du) * (r*dv)`.
#[must_use]
pub fn expected_triangle_count(surface: &BezierSurface, resolution: SamplingResolution) -> usize {
    let r = resolution.get();
    2 * (r * surface.degree_u()) * (r * surface.degree_v())
}

#[allow(clippy::cast_precision_loss)]
fn grid_parameter(index: usize, count: usize) -> f64 {
    if count <= 1 {
        0.0
    } else {
        index as f64 / (count - 1) as f64
    }
}

/// Evaluates `surface` at every grid coordinate for `resolution`.
#[must_use]
pub fn sample_surface_grid(surface: &BezierSurface, resolution: SamplingResolution) -> SampleGrid {
    let u_count = sample_count(surface.degree_u(), resolution);
    let v_count = sample_count(surface.degree_v(), resolution);

    let mut evaluator = SurfaceEvaluator::new(surface);
    let mut samples = Vec::with_capacity(u_count * v_count);
    for row in 0..v_count {
        let v = grid_parameter(row, v_count);
        for column in 0..u_count {
            let u = grid_parameter(column, u_count);
            samples.push(evaluator.sample(u, v));
        }
    }

    SampleGrid {
        u_count,
        v_count,
        samples,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Triangulation
// ─────────────────────────────────────────────────────────────────────────────

/// Tessellates a single surface.
#[must_use]
pub fn tessellate_surface(
    surface: &BezierSurface,
    options: &TessellationOptions,
) -> (TriangleMesh, TessellationDiagnostics) {
    let grid = sample_surface_grid(surface, options.resolution);
    let mut diagnostics = TessellationDiagnostics {
        surface_count: 1,
        sample_count: grid.samples.len(),
        ..Default::default()
    };

    let extent = surface
        .control_bounds()
        .map_or(1.0, |bounds| bounds.diagonal().max(1.0));
    let tolerance = options.position_tolerance * extent;
    for sample in &grid.samples {
        diagnostics.max_position_mismatch = diagnostics.max_position_mismatch.max(sample.position_mismatch);
        if sample.position_mismatch > tolerance {
            diagnostics.position_mismatch_count += 1;
        }
    }

    let normals = resolve_normals(&grid, &mut diagnostics);

    if grid.cell_count() == 0 {
        diagnostics.add_warning(format!(
            "surface of degree ({}, {}) has no area to tessellate",
            surface.degree_u(),
            surface.degree_v()
        ));
    }

    let mut mesh = TriangleMesh::with_capacity(grid.cell_count() * 6);
    let u_count = grid.u_count;
    let position = |row: usize, column: usize| grid.samples[row * u_count + column].point;
    let normal = |row: usize, column: usize| normals[row * u_count + column];

    for row in 0..grid.v_count.saturating_sub(1) {
        for column in 0..u_count.saturating_sub(1) {
            let corners = [(row, column), (row + 1, column), (row, column + 1), (row + 1, column + 1)];
            let p: [Point3; 4] = corners.map(|(r, c)| position(r, c));
            let n: [Vec3; 4] = corners.map(|(r, c)| normal(r, c));
            // Both triangles share the (row+1, column)-(row, column+1) diagonal.
            mesh.push_triangle([p[0], p[1], p[2]], [n[0], n[1], n[2]]);
            mesh.push_triangle([p[1], p[3], p[2]], [n[1], n[3], n[2]]);
        }
    }

    diagnostics.vertex_count = mesh.vertex_count();
    diagnostics.triangle_count = mesh.triangle_count();
    (mesh, diagnostics)
}

/// Tessellates every surface and concatenates the results in input order.
#[must_use]
pub fn tessellate_surfaces(
    surfaces: &[BezierSurface],
    options: &TessellationOptions,
) -> (TriangleMesh, TessellationDiagnostics) {
    let parts = tessellate_each(surfaces, options);

    let total_vertices = parts.iter().map(|(mesh, _)| mesh.vertex_count()).sum();
    let mut mesh = TriangleMesh::with_capacity(total_vertices);
    let mut diagnostics = TessellationDiagnostics::new();
    for (mut part, part_diagnostics) in parts {
        mesh.append(&mut part);
        diagnostics.merge(&part_diagnostics);
    }

    log::debug!(
        "tessellated at resolution {}: {}",
        options.resolution,
        diagnostics.summary()
    );
    (mesh, diagnostics)
}

#[cfg(feature = "parallel")]
fn tessellate_each(
    surfaces: &[BezierSurface],
    options: &TessellationOptions,
) -> Vec<(TriangleMesh, TessellationDiagnostics)> {
    surfaces
        .par_iter()
        .map(|surface| tessellate_surface(surface, options))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn tessellate_each(
    surfaces: &[BezierSurface],
    options: &TessellationOptions,
) -> Vec<(TriangleMesh, TessellationDiagnostics)> {
    surfaces
        .iter()
        .map(|surface| tessellate_surface(surface, options))
        .collect()
}

/// Per-sample normals with degenerate samples filled in from the nearest
/// valid neighbour, or `(0, 0, 0)` when the grid has none.
fn resolve_normals(grid: &SampleGrid, diagnostics: &mut TessellationDiagnostics) -> Vec<Vec3> {
    let mut normals = Vec::with_capacity(grid.samples.len());
    for (index, sample) in grid.samples.iter().enumerate() {
        if let Some(normal) = sample.normal {
            normals.push(normal);
            continue;
        }
        diagnostics.degenerate_normal_count += 1;
        let row = index / grid.u_count;
        let column = index % grid.u_count;
        match nearest_valid_normal(grid, row, column) {
            Some(normal) => {
                diagnostics.substituted_normal_count += 1;
                normals.push(normal);
            }
            None => normals.push(Vec3::ZERO),
        }
    }
    normals
}

/// Searches square rings of growing Chebyshev radius around `(row, column)`,
/// scanning each ring row by row.
fn nearest_valid_normal(grid: &SampleGrid, row: usize, column: usize) -> Option<Vec3> {
    let max_radius = grid.u_count.max(grid.v_count);
    for radius in 1..max_radius {
        let rows = row.saturating_sub(radius)..=(row + radius).min(grid.v_count - 1);
        for r in rows {
            let columns = column.saturating_sub(radius)..=(column + radius).min(grid.u_count - 1);
            for c in columns {
                if r.abs_diff(row).max(c.abs_diff(column)) != radius {
                    continue;
                }
                if let Some(normal) = grid.samples[r * grid.u_count + c].normal {
                    return Some(normal);
                }
            }
        }
    }
    None
}
