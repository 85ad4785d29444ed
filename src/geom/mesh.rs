use super::core::{BBox, Point3, Vec3};

/// Reasons a [`TriangleMesh`] fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    #[error("mesh has {positions} positions but {normals} normals")]
    AttributeLengthMismatch { positions: usize, normals: usize },
    #[error("mesh vertex count {0} is not a multiple of 3")]
    NotATriangleList(usize),
    #[error("mesh has invalid vertex coordinates (NaN/Inf) at vertex {0}")]
    NonFinitePosition(usize),
    #[error("mesh has invalid normal (NaN/Inf) at vertex {0}")]
    NonFiniteNormal(usize),
}

/// Flat, non-indexed triangle soup with one normal per vertex.
///
/// Every consecutive run of three vertices is one triangle. Vertices shared
/// between neighbouring triangles are stored once per triangle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriangleMesh {
    pub positions: Vec<[f64; 3]>,
    pub normals: Vec<[f64; 3]>,
}

impl TriangleMesh {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(vertices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
        }
    }

    pub fn push_triangle(&mut self, positions: [Point3; 3], normals: [Vec3; 3]) {
        self.positions.extend(positions.map(Point3::to_array));
        self.normals.extend(normals.map(Vec3::to_array));
    }

    /// Appends all triangles of `other`; no vertices are shared.
    pub fn append(&mut self, other: &mut TriangleMesh) {
        self.positions.append(&mut other.positions);
        self.normals.append(&mut other.normals);
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        if self.positions.len() != self.normals.len() {
            return Err(MeshError::AttributeLengthMismatch {
                positions: self.positions.len(),
                normals: self.normals.len(),
            });
        }
        if self.positions.len() % 3 != 0 {
            return Err(MeshError::NotATriangleList(self.positions.len()));
        }
        if let Some(index) = self
            .positions
            .iter()
            .position(|p| !p.iter().all(|c| c.is_finite()))
        {
            return Err(MeshError::NonFinitePosition(index));
        }
        if let Some(index) = self
            .normals
            .iter()
            .position(|n| !n.iter().all(|c| c.is_finite()))
        {
            return Err(MeshError::NonFiniteNormal(index));
        }
        Ok(())
    }

    /// Triangles as `(positions, normals)` triples.
    pub fn triangles(&self) -> impl Iterator<Item = ([Point3; 3], [Vec3; 3])> + '_ {
        self.positions
            .chunks_exact(3)
            .zip(self.normals.chunks_exact(3))
            .map(|(p, n)| {
                (
                    [Point3::from(p[0]), Point3::from(p[1]), Point3::from(p[2])],
                    [Vec3::from(n[0]), Vec3::from(n[1]), Vec3::from(n[2])],
                )
            })
    }

    #[must_use]
    pub fn bounds(&self) -> Option<BBox> {
        let points: Vec<Point3> = self.positions.iter().copied().map(Point3::from).collect();
        BBox::from_points(&points)
    }

    /// Position buffer as a flat slice: `[x0, y0, z0, x1, y1, z1, ...]`.
    #[must_use]
    pub fn positions_flat(&self) -> &[f64] {
        self.positions.as_flattened()
    }

    /// Normal buffer as a flat slice: `[nx0, ny0, nz0, ...]`.
    #[must_use]
    pub fn normals_flat(&self) -> &[f64] {
        self.normals.as_flattened()
    }

    /// Single-precision copy of the positions, the layout GPU sinks expect.
    #[must_use]
    pub fn positions_f32(&self) -> Vec<f32> {
        to_f32(self.positions_flat())
    }

    /// Single-precision copy of the normals.
    #[must_use]
    pub fn normals_f32(&self) -> Vec<f32> {
        to_f32(self.normals_flat())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_f32(data: &[f64]) -> Vec<f32> {
    data.iter().map(|&value| value as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_triangle() -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        mesh.push_triangle(
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            [Vec3::Z; 3],
        );
        mesh
    }

    #[test]
    fn push_triangle_keeps_buffers_parallel() {
        let mesh = one_triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.positions_flat(), &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(mesh.normals_flat().len(), 9);
        assert_eq!(mesh.positions_f32()[3], 1.0_f32);
        assert_eq!(mesh.normals_f32()[2], 1.0_f32);
        mesh.validate().unwrap();
    }

    #[test]
    fn append_concatenates_without_sharing() {
        let mut a = one_triangle();
        let mut b = one_triangle();
        a.append(&mut b);
        assert_eq!(a.triangle_count(), 2);
        assert!(b.is_empty());
        assert_eq!(a.triangles().count(), 2);
    }

    #[test]
    fn validate_rejects_bad_buffers() {
        let mut mesh = one_triangle();
        mesh.normals.pop();
        assert_eq!(
            mesh.validate(),
            Err(MeshError::AttributeLengthMismatch {
                positions: 3,
                normals: 2
            })
        );

        let mut mesh = one_triangle();
        mesh.positions.pop();
        mesh.normals.pop();
        assert_eq!(mesh.validate(), Err(MeshError::NotATriangleList(2)));

        let mut mesh = one_triangle();
        mesh.positions[1][2] = f64::NAN;
        assert_eq!(mesh.validate(), Err(MeshError::NonFinitePosition(1)));

        let mut mesh = one_triangle();
        mesh.normals[2][0] = f64::INFINITY;
        assert_eq!(mesh.validate(), Err(MeshError::NonFiniteNormal(2)));
    }

    #[test]
    fn bounds_cover_all_vertices() {
        assert!(TriangleMesh::new().bounds().is_none());
        let bounds = one_triangle().bounds().unwrap();
        assert_eq!(bounds.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(1.0, 1.0, 0.0));
    }
}
