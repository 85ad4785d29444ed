//! Bézier surface evaluation and tessellation.
//!
//! The crate turns a control-net description of tensor-product Bézier
//! surfaces into a flat triangle mesh (positions plus per-vertex normals)
//! at a runtime-adjustable sampling resolution.
//!
//! - [`parse`] reads control nets and OBJ meshes.
//! - [`geom`] holds the surface model, the de Casteljau evaluator, the
//!   tessellator and the lazily rebuilt [`geom::TessellationCache`].
//! - [`render`] drives a [`render::MeshSink`] once per frame.
//! - [`config`] loads [`config::EngineConfig`] from JSON.
//!
//! ```ignore
//! use bezier_engine::geom::{SamplingResolution, TessellationCache, TessellationOptions};
//! use bezier_engine::parse::parse_control_net_file;
//!
//! let mut cache = TessellationCache::new(TessellationOptions::new(SamplingResolution::new_clamped(4)));
//! cache.set_surfaces(parse_control_net_file("teapot.bez")?);
//! let mesh = cache.current_mesh();
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod geom;
pub mod parse;
pub mod render;

pub use config::{ConfigError, EngineConfig, load_config};
pub use geom::{
    BezierSurface, SamplingResolution, TessellationCache, TessellationDiagnostics,
    TessellationOptions, TriangleMesh,
};
pub use parse::{ParseError, ParseResult};
pub use render::{FrameReport, MeshSink, SurfaceRenderer};
