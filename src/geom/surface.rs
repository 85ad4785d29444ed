use super::control_grid::{ControlGrid, GridLine};
use super::core::{BBox, Point3};
use super::evaluate::eval_sample;

/// Errors raised while assembling a surface from control points.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("control grid must have at least one row and one column, got {rows}x{columns}")]
    EmptyGrid { rows: usize, columns: usize },
    #[error("control grid of {rows}x{columns} needs {expected} control points, got {found}")]
    ControlPointCount {
        rows: usize,
        columns: usize,
        expected: usize,
        found: usize,
    },
    #[error("control point at row {row}, column {column} is not finite")]
    NonFiniteControlPoint { row: usize, column: usize },
    #[error("degree ({degree_u}, {degree_v}) does not match a {rows}x{columns} control grid")]
    DegreeMismatch {
        degree_u: usize,
        degree_v: usize,
        rows: usize,
        columns: usize,
    },
}

/// Tensor-product Bézier surface.
///
/// The control grid has `degree_v + 1` rows and `degree_u + 1` columns and is
/// immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierSurface {
    grid: ControlGrid,
    degree_u: usize,
    degree_v: usize,
}

impl BezierSurface {
    /// Builds a surface from `(degree_v + 1) * (degree_u + 1)` points in
    /// row-major order (v outer, u inner).
    pub fn new(degree_u: usize, degree_v: usize, points: Vec<Point3>) -> Result<Self, SurfaceError> {
        let rows = degree_v.checked_add(1).ok_or(SurfaceError::EmptyGrid { rows: 0, columns: 0 })?;
        let columns = degree_u.checked_add(1).ok_or(SurfaceError::EmptyGrid { rows: 0, columns: 0 })?;
        let grid = ControlGrid::new(rows, columns, points)?;
        Ok(Self {
            grid,
            degree_u,
            degree_v,
        })
    }

    /// Wraps an existing grid, checking the degree/dimension invariant.
    pub fn from_grid(degree_u: usize, degree_v: usize, grid: ControlGrid) -> Result<Self, SurfaceError> {
        if grid.columns() != degree_u + 1 || grid.rows() != degree_v + 1 {
            return Err(SurfaceError::DegreeMismatch {
                degree_u,
                degree_v,
                rows: grid.rows(),
                columns: grid.columns(),
            });
        }
        Ok(Self {
            grid,
            degree_u,
            degree_v,
        })
    }

    #[must_use]
    pub const fn degree_u(&self) -> usize {
        self.degree_u
    }

    #[must_use]
    pub const fn degree_v(&self) -> usize {
        self.degree_v
    }

    #[must_use]
    pub const fn control_grid(&self) -> &ControlGrid {
        &self.grid
    }

    #[must_use]
    pub fn control_point(&self, row: usize, column: usize) -> Option<Point3> {
        self.grid.get(row, column)
    }

    #[must_use]
    pub fn control_point_count(&self) -> usize {
        self.grid.points().len()
    }

    /// Fixed-v control polygon (`degree_u + 1` points).
    #[must_use]
    pub fn row(&self, row: usize) -> Option<GridLine<'_>> {
        self.grid.row(row)
    }

    /// Fixed-u control polygon (`degree_v + 1` points).
    #[must_use]
    pub fn column(&self, column: usize) -> Option<GridLine<'_>> {
        self.grid.column(column)
    }

    /// Bounding box of the control net, which contains the whole surface.
    #[must_use]
    pub fn control_bounds(&self) -> Option<BBox> {
        BBox::from_points(self.grid.points())
    }

    /// Surface position at `(u, v)`. See [`eval_sample`] for the parameter
    /// convention.
    #[must_use]
    pub fn point_at(&self, u: f64, v: f64) -> Point3 {
        eval_sample(self, u, v).point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> BezierSurface {
        BezierSurface::new(
            1,
            1,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn degrees_match_grid_dimensions() {
        let points = (0..12).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
        let surface = BezierSurface::new(3, 2, points).unwrap();
        assert_eq!(surface.degree_u(), 3);
        assert_eq!(surface.degree_v(), 2);
        assert_eq!(surface.control_grid().columns(), 4);
        assert_eq!(surface.control_grid().rows(), 3);
        assert_eq!(surface.row(0).unwrap().len(), 4);
        assert_eq!(surface.column(0).unwrap().len(), 3);
        assert_eq!(surface.control_point(2, 3), Some(Point3::new(11.0, 0.0, 0.0)));
        assert_eq!(surface.control_point_count(), 12);
    }

    #[test]
    fn rejects_wrong_point_count() {
        let err = BezierSurface::new(1, 1, vec![Point3::ORIGIN; 3]).unwrap_err();
        assert_eq!(
            err,
            SurfaceError::ControlPointCount {
                rows: 2,
                columns: 2,
                expected: 4,
                found: 3
            }
        );
        assert!(err.to_string().contains("needs 4 control points"));
    }

    #[test]
    fn from_grid_checks_degrees() {
        let grid = ControlGrid::new(2, 3, vec![Point3::ORIGIN; 6]).unwrap();
        assert!(BezierSurface::from_grid(2, 1, grid.clone()).is_ok());
        assert!(matches!(
            BezierSurface::from_grid(1, 2, grid),
            Err(SurfaceError::DegreeMismatch { .. })
        ));
    }

    #[test]
    fn degree_zero_surface_is_a_single_point() {
        let surface = BezierSurface::new(0, 0, vec![Point3::new(1.0, 2.0, 3.0)]).unwrap();
        assert_eq!(surface.point_at(0.3, 0.9), Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn control_bounds_cover_the_net() {
        let bounds = unit_square().control_bounds().unwrap();
        assert_eq!(bounds.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(1.0, 1.0, 0.0));
        assert_eq!(unit_square().point_at(0.5, 0.5), Point3::new(0.5, 0.5, 0.0));
    }
}
