//! Lazily rebuilt mesh for the current surface set and sampling resolution.
//!
//! [`TessellationCache`] owns everything a render loop needs between frames:
//! the loaded surfaces (or an imported mesh), the sampling resolution, a dirty
//! flag and the last built mesh. Configuration changes only mark the cache
//! dirty; the rebuild happens at the next [`TessellationCache::current_mesh`]
//! call, so several changes between two frames cost one rebuild.
//!
//! The mesh is handed out as an `Arc<TriangleMesh>`. A rebuild constructs the
//! new mesh completely and then swaps the `Arc`, so a holder of the previous
//! mesh keeps a complete mesh and never observes a partial one.
//!
//! # Example
//! ```ignore
//! let mut cache = TessellationCache::default();
//! cache.set_surfaces(parse_control_net_file("teapot.bez")?);
//! let mesh = cache.current_mesh();           // rebuild
//! cache.increase_resolution();
//! cache.increase_resolution();
//! let finer = cache.current_mesh();          // one rebuild for both steps
//! println!("rebuilds: {}", cache.stats().rebuild_count);
//! ```

use std::sync::Arc;

use super::diagnostics::TessellationDiagnostics;
use super::mesh::TriangleMesh;
use super::surface::BezierSurface;
use super::tessellation::{SamplingResolution, TessellationOptions, tessellate_surfaces};

/// Geometry the cached mesh is built from.
#[derive(Debug, Clone, Default)]
enum MeshSource {
    #[default]
    Empty,
    Surfaces(Vec<BezierSurface>),
    /// Already triangulated; independent of the resolution.
    Imported(Arc<TriangleMesh>),
}

/// Counters for monitoring how often the cache had to rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TessellationCacheStats {
    /// Mesh reads served without rebuilding.
    pub hit_count: usize,
    /// Mesh reads that triggered a rebuild.
    pub rebuild_count: usize,
    pub generation: u64,
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// Estimated size of the position and normal buffers in bytes.
    pub estimated_memory_bytes: usize,
}

impl TessellationCacheStats {
    /// Fraction of reads served from the cache; 0.0 before the first read.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.rebuild_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

#[derive(Debug)]
pub struct TessellationCache {
    source: MeshSource,
    options: TessellationOptions,
    dirty: bool,
    mesh: Arc<TriangleMesh>,
    diagnostics: TessellationDiagnostics,
    generation: u64,
    hit_count: usize,
    rebuild_count: usize,
}

impl Default for TessellationCache {
    fn default() -> Self {
        Self::new(TessellationOptions::default())
    }
}

impl TessellationCache {
    #[must_use]
    pub fn new(options: TessellationOptions) -> Self {
        Self {
            source: MeshSource::Empty,
            options: options.sanitized(),
            dirty: false,
            mesh: Arc::new(TriangleMesh::new()),
            diagnostics: TessellationDiagnostics::new(),
            generation: 0,
            hit_count: 0,
            rebuild_count: 0,
        }
    }

    #[must_use]
    pub const fn options(&self) -> &TessellationOptions {
        &self.options
    }

    #[must_use]
    pub const fn resolution(&self) -> SamplingResolution {
        self.options.resolution
    }

    /// Replaces the options; marks the cache dirty if anything changed.
    /// A negative or non-finite `position_tolerance` is replaced by the default.
    pub fn set_options(&mut self, options: TessellationOptions) {
        let options = options.sanitized();
        if options != self.options {
            self.options = options;
            self.dirty = true;
        }
    }

    /// Clamps `requested` to `[1, 10]` and records it. Only a changed value
    /// marks the cache dirty. Returns the resolution now in effect.
    pub fn set_resolution(&mut self, requested: i64) -> SamplingResolution {
        self.apply_resolution(SamplingResolution::new_clamped(requested))
    }

    /// One step finer; a no-op at the upper bound.
    pub fn increase_resolution(&mut self) -> SamplingResolution {
        self.apply_resolution(self.options.resolution.increment())
    }

    /// One step coarser; a no-op at the lower bound.
    pub fn decrease_resolution(&mut self) -> SamplingResolution {
        self.apply_resolution(self.options.resolution.decrement())
    }

    fn apply_resolution(&mut self, resolution: SamplingResolution) -> SamplingResolution {
        if resolution != self.options.resolution {
            log::debug!("sampling resolution {} -> {}", self.options.resolution, resolution);
            self.options.resolution = resolution;
            self.dirty = true;
        }
        resolution
    }

    /// Replaces the whole surface set. Parsing happens elsewhere; the cache
    /// only re-tessellates.
    pub fn set_surfaces(&mut self, surfaces: Vec<BezierSurface>) {
        self.source = MeshSource::Surfaces(surfaces);
        self.dirty = true;
    }

    /// Replaces the geometry with an already triangulated mesh.
    pub fn set_imported_mesh(&mut self, mesh: TriangleMesh) {
        self.source = MeshSource::Imported(Arc::new(mesh));
        self.dirty = true;
    }

    /// Drops all geometry; the next read yields an empty mesh.
    pub fn clear(&mut self) {
        self.source = MeshSource::Empty;
        self.dirty = true;
    }

    /// Loaded surfaces; empty for an imported mesh.
    #[must_use]
    pub fn surfaces(&self) -> &[BezierSurface] {
        match &self.source {
            MeshSource::Surfaces(surfaces) => surfaces,
            MeshSource::Empty | MeshSource::Imported(_) => &[],
        }
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Bumped every time a rebuild produces a new mesh.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Diagnostics of the last rebuild.
    #[must_use]
    pub const fn diagnostics(&self) -> &TessellationDiagnostics {
        &self.diagnostics
    }

    /// The mesh for the current geometry and resolution, rebuilding first if
    /// anything changed since the last read.
    pub fn current_mesh(&mut self) -> Arc<TriangleMesh> {
        if self.dirty {
            self.rebuild();
        } else {
            self.hit_count += 1;
        }
        Arc::clone(&self.mesh)
    }

    fn rebuild(&mut self) {
        let (mesh, diagnostics) = match &self.source {
            MeshSource::Empty => (Arc::new(TriangleMesh::new()), TessellationDiagnostics::new()),
            MeshSource::Surfaces(surfaces) => {
                let (mesh, diagnostics) = tessellate_surfaces(surfaces, &self.options);
                (Arc::new(mesh), diagnostics)
            }
            MeshSource::Imported(mesh) => {
                let diagnostics = TessellationDiagnostics {
                    vertex_count: mesh.vertex_count(),
                    triangle_count: mesh.triangle_count(),
                    ..Default::default()
                };
                (Arc::clone(mesh), diagnostics)
            }
        };

        self.rebuild_count += 1;
        self.dirty = false;
        if Arc::ptr_eq(&mesh, &self.mesh) {
            return;
        }

        if !diagnostics.is_clean() {
            log::warn!("tessellation finished with issues: {}", diagnostics.summary());
        }
        log::info!(
            "rebuilt mesh at resolution {}: {}",
            self.options.resolution,
            diagnostics.summary()
        );
        self.mesh = mesh;
        self.diagnostics = diagnostics;
        self.generation += 1;
    }

    #[must_use]
    pub fn stats(&self) -> TessellationCacheStats {
        TessellationCacheStats {
            hit_count: self.hit_count,
            rebuild_count: self.rebuild_count,
            generation: self.generation,
            vertex_count: self.mesh.vertex_count(),
            triangle_count: self.mesh.triangle_count(),
            estimated_memory_bytes: self.estimate_memory_usage(),
        }
    }

    /// Resets hit/rebuild counters without touching the mesh.
    pub fn reset_counters(&mut self) {
        self.hit_count = 0;
        self.rebuild_count = 0;
    }

    /// Estimated size of the cached mesh buffers in bytes.
    #[must_use]
    pub fn estimate_memory_usage(&self) -> usize {
        // Two [f64; 3] per vertex.
        self.mesh.vertex_count() * 2 * std::mem::size_of::<[f64; 3]>()
    }
}
