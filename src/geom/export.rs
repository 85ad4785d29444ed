//! Text output for tessellated meshes: golden-style snapshots and OBJ.
//!
//! Snapshots quantize every coordinate to [`SNAPSHOT_QUANTIZE`] and print
//! a fixed number of decimals, so that they diff cleanly across platforms.

use std::fmt::Write as _;
use std::io::{self, Write};

use super::diagnostics::TessellationDiagnostics;
use super::mesh::TriangleMesh;

pub const SNAPSHOT_QUANTIZE: f64 = 1e-6;
pub const SNAPSHOT_DECIMALS: usize = 6;

/// Unifies line endings and guarantees a trailing newline.
#[must_use]
pub fn normalize_snapshot_text(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    if normalized.ends_with('\n') {
        normalized
    } else {
        format!("{normalized}\n")
    }
}

/// Rounds to the snapshot grid; `-0.0` becomes `0.0`.
#[must_use]
pub fn quantize_f64(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let q = (value / SNAPSHOT_QUANTIZE).round() * SNAPSHOT_QUANTIZE;
    if q == 0.0 { 0.0 } else { q }
}

fn write_f64(out: &mut String, value: f64) {
    let value = quantize_f64(value);
    let _ = write!(out, "{value:.SNAPSHOT_DECIMALS$}");
}

fn write_vec3_line(out: &mut String, prefix: &str, v: [f64; 3]) {
    let _ = write!(out, "{prefix} ");
    write_f64(out, v[0]);
    out.push(' ');
    write_f64(out, v[1]);
    out.push(' ');
    write_f64(out, v[2]);
    out.push('\n');
}

fn write_diagnostics(out: &mut String, diag: &TessellationDiagnostics) {
    let _ = writeln!(out, "diag.surface_count {}", diag.surface_count);
    let _ = writeln!(out, "diag.sample_count {}", diag.sample_count);
    let _ = writeln!(out, "diag.degenerate_normal_count {}", diag.degenerate_normal_count);
    let _ = writeln!(out, "diag.substituted_normal_count {}", diag.substituted_normal_count);
    let _ = writeln!(out, "diag.position_mismatch_count {}", diag.position_mismatch_count);
    let _ = writeln!(out, "diag.warning_count {}", diag.warnings.len());
    for (idx, warning) in diag.warnings.iter().enumerate() {
        let _ = writeln!(out, "diag.warning.{idx} {warning}");
    }
}

fn write_mesh(out: &mut String, mesh: &TriangleMesh) {
    let _ = writeln!(out, "mesh.vertex_count {}", mesh.vertex_count());
    let _ = writeln!(out, "mesh.triangle_count {}", mesh.triangle_count());

    let _ = writeln!(out, "mesh.positions {}", mesh.positions.len());
    for p in mesh.positions.iter().copied() {
        write_vec3_line(out, "p", p);
    }

    let _ = writeln!(out, "mesh.normals {}", mesh.normals.len());
    for n in mesh.normals.iter().copied() {
        write_vec3_line(out, "n", n);
    }
}

/// Renders a tessellation result as snapshot text.
///
/// `op` names the operation (for example `tessellate r=2`); it is written
/// verbatim on the header line.
#[must_use]
pub fn snapshot_text(op: &str, mesh: &TriangleMesh, diagnostics: &TessellationDiagnostics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# bezier-engine golden v1");
    let _ = writeln!(out, "op {op}");
    let _ = writeln!(out, "quantize {SNAPSHOT_QUANTIZE:.1e}");
    write_diagnostics(&mut out, diagnostics);
    write_mesh(&mut out, mesh);
    normalize_snapshot_text(&out)
}

/// Writes `mesh` as a Wavefront OBJ object named `name`.
///
/// The mesh is non-indexed, so every vertex gets its own `v`/`vn` pair and
/// face `k` references vertices `3k+1 ..= 3k+3`.
pub fn write_obj<W: Write>(writer: &mut W, mesh: &TriangleMesh, name: &str) -> io::Result<()> {
    writeln!(writer, "# bezier-engine")?;
    writeln!(writer, "o {name}")?;

    for p in mesh.positions.iter().copied() {
        writeln!(writer, "v {} {} {}", p[0], p[1], p[2])?;
    }
    for n in mesh.normals.iter().copied() {
        writeln!(writer, "vn {} {} {}", n[0], n[1], n[2])?;
    }
    for tri in 0..mesh.triangle_count() {
        let a = 3 * tri + 1;
        let b = a + 1;
        let c = a + 2;
        writeln!(writer, "f {a}//{a} {b}//{b} {c}//{c}")?;
    }

    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::core::{Point3, Vec3};

    fn one_triangle() -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        mesh.push_triangle(
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, -1e-9),
            ],
            [Vec3::Z; 3],
        );
        mesh
    }

    #[test]
    fn quantize_drops_negative_zero() {
        assert_eq!(quantize_f64(-1e-9).to_bits(), 0.0_f64.to_bits());
        assert_eq!(quantize_f64(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(quantize_f64(0.25), 0.25);
        assert!(quantize_f64(f64::NAN).is_nan());
    }

    #[test]
    fn snapshot_lists_diagnostics_and_buffers() {
        let mesh = one_triangle();
        let diagnostics = TessellationDiagnostics {
            surface_count: 1,
            vertex_count: 3,
            triangle_count: 1,
            ..Default::default()
        };
        let text = snapshot_text("tessellate r=1", &mesh, &diagnostics);
        assert!(text.starts_with("# bezier-engine golden v1\nop tessellate r=1\n"));
        assert!(text.contains("quantize 1.0e-6\n"));
        assert!(text.contains("diag.surface_count 1\n"));
        assert!(text.contains("mesh.triangle_count 1\n"));
        assert!(text.contains("p 0.000000 1.000000 0.000000\n"));
        assert!(text.contains("n 0.000000 0.000000 1.000000\n"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn obj_faces_reference_consecutive_vertices() {
        let mut mesh = one_triangle();
        mesh.append(&mut one_triangle());
        let mut out = Vec::new();
        write_obj(&mut out, &mesh, "patch").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("o patch\n"));
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 6);
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 6);
        assert!(text.contains("f 1//1 2//2 3//3\n"));
        assert!(text.contains("f 4//4 5//5 6//6\n"));
    }

    #[test]
    fn normalize_adds_trailing_newline() {
        assert_eq!(normalize_snapshot_text("a\r\nb"), "a\nb\n");
        assert_eq!(normalize_snapshot_text("a\n"), "a\n");
    }
}
