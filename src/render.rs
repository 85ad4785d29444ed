//! Frame driver between the tessellation cache and a GPU-style mesh sink.

use std::path::Path;

use crate::config::EngineConfig;
use crate::geom::{BezierSurface, SamplingResolution, TessellationCache, TessellationOptions, TriangleMesh};
use crate::parse::{ParseResult, parse_control_net_file, parse_obj_file};

/// Consumer of flat triangle buffers, typically a vertex buffer plus a draw
/// call.
///
/// `positions` and `normals` hold `3 * vertex_count` floats each.
pub trait MeshSink {
    fn upload(&mut self, positions: &[f32], normals: &[f32], vertex_count: usize);
    fn draw_triangles(&mut self, first: usize, vertex_count: usize);
}

/// What happened during one [`SurfaceRenderer::render_frame`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub generation: u64,
    pub vertex_count: usize,
    /// `true` if the buffers were re-uploaded this frame.
    pub uploaded: bool,
}

/// Owns the render state and pushes the current mesh into a [`MeshSink`].
///
/// The mesh is re-uploaded only when the cache produced a new generation;
/// every frame issues one draw call.
#[derive(Debug)]
pub struct SurfaceRenderer<S: MeshSink> {
    cache: TessellationCache,
    sink: S,
    uploaded_generation: Option<u64>,
}

impl<S: MeshSink> SurfaceRenderer<S> {
    pub fn new(sink: S, options: TessellationOptions) -> Self {
        Self {
            cache: TessellationCache::new(options),
            sink,
            uploaded_generation: None,
        }
    }

    pub fn from_config(sink: S, config: &EngineConfig) -> Self {
        Self::new(sink, config.tessellation)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn cache(&self) -> &TessellationCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut TessellationCache {
        &mut self.cache
    }

    /// Replaces the geometry with the surfaces of a control-net file and
    /// returns how many were loaded. On failure the previous geometry is
    /// dropped so nothing is rendered.
    pub fn load_control_net(&mut self, path: impl AsRef<Path>) -> ParseResult<usize> {
        match parse_control_net_file(path) {
            Ok(surfaces) => {
                let count = surfaces.len();
                self.cache.set_surfaces(surfaces);
                Ok(count)
            }
            Err(err) => {
                log::error!("failed to load control net: {err}");
                self.cache.clear();
                Err(err)
            }
        }
    }

    /// Replaces the geometry with an OBJ mesh and returns its triangle count.
    /// On failure the previous geometry is dropped.
    pub fn load_obj(&mut self, path: impl AsRef<Path>) -> ParseResult<usize> {
        match parse_obj_file(path) {
            Ok(mesh) => {
                let count = mesh.triangle_count();
                self.cache.set_imported_mesh(mesh);
                Ok(count)
            }
            Err(err) => {
                log::error!("failed to load OBJ mesh: {err}");
                self.cache.clear();
                Err(err)
            }
        }
    }

    pub fn load_surfaces(&mut self, surfaces: Vec<BezierSurface>) {
        self.cache.set_surfaces(surfaces);
    }

    pub fn load_mesh(&mut self, mesh: TriangleMesh) {
        self.cache.set_imported_mesh(mesh);
    }

    pub fn set_resolution(&mut self, requested: i64) -> SamplingResolution {
        self.cache.set_resolution(requested)
    }

    pub fn increase_resolution(&mut self) -> SamplingResolution {
        self.cache.increase_resolution()
    }

    pub fn decrease_resolution(&mut self) -> SamplingResolution {
        self.cache.decrease_resolution()
    }

    /// Rebuilds the mesh if needed, uploads it if it changed and draws it.
    pub fn render_frame(&mut self) -> FrameReport {
        let mesh = self.cache.current_mesh();
        let generation = self.cache.generation();
        let vertex_count = mesh.vertex_count();

        let uploaded = self.uploaded_generation != Some(generation);
        if uploaded {
            log::debug!("uploading mesh generation {generation} ({vertex_count} vertices)");
            self.sink
                .upload(&mesh.positions_f32(), &mesh.normals_f32(), vertex_count);
            self.uploaded_generation = Some(generation);
        }
        self.sink.draw_triangles(0, vertex_count);

        FrameReport {
            generation,
            vertex_count,
            uploaded,
        }
    }
}
