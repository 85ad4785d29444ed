//! Tessellation diagnostics.
//!
//! Every tessellation pass returns a [`TessellationDiagnostics`] next to the
//! mesh. Degenerate samples and position disagreements never abort a pass;
//! they are counted here instead.
//!
//! # Example
//!
//! ```ignore
//! use bezier_engine::geom::{tessellate_surfaces, TessellationOptions};
//!
//! let (mesh, diagnostics) = tessellate_surfaces(&surfaces, &TessellationOptions::default());
//! if !diagnostics.is_clean() {
//!     log::warn!("{}", diagnostics.summary());
//! }
//! ```

use std::fmt;

/// Counters collected while sampling and triangulating surfaces.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TessellationDiagnostics {
    /// Surfaces that went through the pass, including ones that produced no
    /// triangles.
    pub surface_count: usize,

    pub vertex_count: usize,

    pub triangle_count: usize,

    /// Grid samples evaluated.
    pub sample_count: usize,

    /// Samples whose tangents had a vanishing cross product.
    ///
    /// Happens at collapsed corners, on degree-0 directions and on patches
    /// whose control points coincide.
    pub degenerate_normal_count: usize,

    /// Degenerate samples that borrowed the normal of a valid neighbour.
    /// The remainder received the `(0, 0, 0)` sentinel.
    pub substituted_normal_count: usize,

    /// Samples where the two evaluation passes disagreed on the position by
    /// more than the configured tolerance.
    pub position_mismatch_count: usize,

    /// Largest disagreement seen between the two passes.
    pub max_position_mismatch: f64,

    pub warnings: Vec<String>,
}

impl TessellationDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples that ended up with the zero sentinel normal.
    #[must_use]
    pub fn sentinel_normal_count(&self) -> usize {
        self.degenerate_normal_count
            .saturating_sub(self.substituted_normal_count)
    }

    /// `true` when no degeneracy, disagreement or warning was recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.degenerate_normal_count == 0
            && self.position_mismatch_count == 0
            && self.warnings.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Folds `other` into `self`: counts add up, the mismatch maximum is kept
    /// and warnings are appended.
    pub fn merge(&mut self, other: &TessellationDiagnostics) {
        self.surface_count += other.surface_count;
        self.vertex_count += other.vertex_count;
        self.triangle_count += other.triangle_count;
        self.sample_count += other.sample_count;
        self.degenerate_normal_count += other.degenerate_normal_count;
        self.substituted_normal_count += other.substituted_normal_count;
        self.position_mismatch_count += other.position_mismatch_count;
        self.max_position_mismatch = self.max_position_mismatch.max(other.max_position_mismatch);
        self.warnings.extend(other.warnings.iter().cloned());
    }

    /// Short one-line form for logs: `"S:{surfaces} V:{vertices} T:{triangles} [issues...]"`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "S:{} V:{} T:{}",
            self.surface_count, self.vertex_count, self.triangle_count
        )];

        if self.degenerate_normal_count > 0 {
            parts.push(format!("degenerate:{}", self.degenerate_normal_count));
        }
        if self.substituted_normal_count > 0 {
            parts.push(format!("substituted:{}", self.substituted_normal_count));
        }
        if self.position_mismatch_count > 0 {
            parts.push(format!(
                "mismatch:{} (max {:e})",
                self.position_mismatch_count, self.max_position_mismatch
            ));
        }
        if !self.warnings.is_empty() {
            parts.push(format!("warnings:{}", self.warnings.len()));
        }

        parts.join(" ")
    }
}

impl fmt::Display for TessellationDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tessellation Diagnostics:")?;
        writeln!(f, "  Surfaces: {}", self.surface_count)?;
        writeln!(f, "  Samples: {}", self.sample_count)?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;

        if self.degenerate_normal_count > 0 {
            writeln!(f, "  Degenerate normals: {}", self.degenerate_normal_count)?;
            writeln!(f, "    - Substituted from neighbours: {}", self.substituted_normal_count)?;
            writeln!(f, "    - Zero sentinel: {}", self.sentinel_normal_count())?;
        }

        if self.position_mismatch_count > 0 {
            writeln!(
                f,
                "  Position mismatches: {} (max {:e})",
                self.position_mismatch_count, self.max_position_mismatch
            )?;
        }

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }

        let status = if self.is_clean() { "CLEAN" } else { "ISSUES DETECTED" };
        writeln!(f, "  Status: {status}")?;

        Ok(())
    }
}
