//! Minimal Wavefront OBJ reader producing the same flat [`TriangleMesh`] the
//! tessellator emits.
//!
//! Only `v` and `f` are interpreted. Faces with more than three vertices are
//! fan-triangulated, `a/b/c` references keep the vertex index and negative
//! indices count back from the last vertex read. Vertex normals are the
//! normalized sum of the unit normals of the incident triangles.

use std::path::Path;

use super::{ParseError, ParseResult, read_source, strip_comment};
use crate::geom::{Point3, Tolerance, TriangleMesh, Vec3};

/// Reads an OBJ file into a flat triangle mesh.
pub fn parse_obj_file(path: impl AsRef<Path>) -> ParseResult<TriangleMesh> {
    let path = path.as_ref();
    let text = read_source(path)?;
    let mesh = parse_obj_str(&text)?;
    log::info!(
        "loaded {} triangle(s) from {}",
        mesh.triangle_count(),
        path.display()
    );
    Ok(mesh)
}

/// Parses OBJ text into a flat triangle mesh.
pub fn parse_obj_str(input: &str) -> ParseResult<TriangleMesh> {
    let mut vertices: Vec<Point3> = Vec::new();
    let mut triangles: Vec<[usize; 3]> = Vec::new();

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let mut words = strip_comment(raw).split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };

        match command {
            "v" => {
                let mut coords = [0.0; 3];
                for (slot, axis) in coords.iter_mut().zip(['x', 'y', 'z']) {
                    *slot = parse_coordinate(words.next(), axis, line)?;
                }
                vertices.push(Point3::from(coords));
            }
            "f" => {
                let corners = words
                    .map(|word| resolve_index(word, vertices.len(), line))
                    .collect::<ParseResult<Vec<usize>>>()?;
                if corners.len() < 3 {
                    return Err(ParseError::malformed(
                        line,
                        format!("face needs at least 3 vertices, found {}", corners.len()),
                    ));
                }
                for pair in corners[1..].windows(2) {
                    triangles.push([corners[0], pair[0], pair[1]]);
                }
            }
            other => log::warn!("line {line}: skipping unsupported OBJ command `{other}`"),
        }
    }

    log::debug!(
        "OBJ input: {} vertices, {} triangles",
        vertices.len(),
        triangles.len()
    );
    Ok(build_mesh(&vertices, &triangles))
}

fn parse_coordinate(token: Option<&str>, axis: char, line: usize) -> ParseResult<f64> {
    let token = token.ok_or_else(|| ParseError::malformed(line, format!("vertex is missing its {axis} coordinate")))?;
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::malformed(
            line,
            format!("expected a finite {axis} coordinate, found `{token}`"),
        )),
    }
}

/// Turns a face reference into a 0-based vertex index.
fn resolve_index(word: &str, vertex_count: usize, line: usize) -> ParseResult<usize> {
    let vertex = word.split('/').next().unwrap_or_default();
    let index: i64 = vertex
        .parse()
        .map_err(|_| ParseError::malformed(line, format!("expected a vertex index, found `{word}`")))?;

    let resolved = match index {
        0 => None,
        positive if positive > 0 => usize::try_from(positive - 1).ok(),
        negative => usize::try_from(negative.unsigned_abs())
            .ok()
            .and_then(|back| vertex_count.checked_sub(back)),
    };

    resolved.filter(|&i| i < vertex_count).ok_or_else(|| {
        ParseError::malformed(
            line,
            format!("vertex index {index} is out of range ({vertex_count} vertices defined)"),
        )
    })
}

/// Expands indexed triangles into the flat layout with averaged normals.
fn build_mesh(vertices: &[Point3], triangles: &[[usize; 3]]) -> TriangleMesh {
    let mut sums = vec![Vec3::ZERO; vertices.len()];
    for &[a, b, c] in triangles {
        let (pa, pb, pc) = (vertices[a], vertices[b], vertices[c]);
        let (ab, bc) = (pb - pa, pc - pb);
        let cross = ab.cross(bc);
        if Tolerance::ZERO_LENGTH
            .scaled(ab.length() * bc.length())
            .is_zero_vec3(cross)
        {
            continue;
        }
        if let Some(normal) = cross.normalized() {
            sums[a] = sums[a] + normal;
            sums[b] = sums[b] + normal;
            sums[c] = sums[c] + normal;
        }
    }

    let normals: Vec<Vec3> = sums
        .into_iter()
        .map(|sum| sum.normalized().unwrap_or(Vec3::ZERO))
        .collect();

    let mut mesh = TriangleMesh::with_capacity(triangles.len() * 3);
    for &[a, b, c] in triangles {
        mesh.push_triangle(
            [vertices[a], vertices[b], vertices[c]],
            [normals[a], normals[b], normals[c]],
        );
    }
    mesh
}
