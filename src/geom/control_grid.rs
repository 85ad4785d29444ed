//! Contiguous storage for a rectangular net of control points.
//!
//! The grid is stored row-major with **v as the outer (slow) index** and
//! **u as the inner (fast) index**: element `(row, column)` lives at
//! `row * columns + column`. A row is a fixed-v slice that varies over u;
//! a column is a fixed-u slice that varies over v. This is the order the
//! control-net parser fills and the order the tessellator samples in.
//!
//! Rows and columns are handed out as [`GridLine`] views (offset + stride)
//! over the single buffer, so evaluating a surface never copies a column.

use std::iter::{Copied, StepBy, Take};
use std::slice;

use super::core::Point3;
use super::surface::SurfaceError;

#[derive(Debug, Clone, PartialEq)]
pub struct ControlGrid {
    points: Vec<Point3>,
    rows: usize,
    columns: usize,
}

impl ControlGrid {
    /// Builds a grid from row-major points (v outer, u inner).
    pub fn new(rows: usize, columns: usize, points: Vec<Point3>) -> Result<Self, SurfaceError> {
        if rows == 0 || columns == 0 {
            return Err(SurfaceError::EmptyGrid { rows, columns });
        }
        let expected = rows
            .checked_mul(columns)
            .ok_or(SurfaceError::EmptyGrid { rows, columns })?;
        if points.len() != expected {
            return Err(SurfaceError::ControlPointCount {
                rows,
                columns,
                expected,
                found: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(SurfaceError::NonFiniteControlPoint {
                row: index / columns,
                column: index % columns,
            });
        }
        Ok(Self {
            points,
            rows,
            columns,
        })
    }

    /// Number of rows (v direction).
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (u direction).
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// The raw row-major buffer.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<Point3> {
        if row < self.rows && column < self.columns {
            Some(self.points[row * self.columns + column])
        } else {
            None
        }
    }

    /// Fixed-v slice, varying over u.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<GridLine<'_>> {
        (row < self.rows).then(|| GridLine {
            points: &self.points,
            offset: row * self.columns,
            stride: 1,
            len: self.columns,
        })
    }

    /// Fixed-u slice, varying over v.
    #[must_use]
    pub fn column(&self, column: usize) -> Option<GridLine<'_>> {
        (column < self.columns).then(|| GridLine {
            points: &self.points,
            offset: column,
            stride: self.columns,
            len: self.rows,
        })
    }

    pub fn iter_rows(&self) -> impl ExactSizeIterator<Item = GridLine<'_>> + '_ {
        (0..self.rows).map(move |row| GridLine {
            points: &self.points,
            offset: row * self.columns,
            stride: 1,
            len: self.columns,
        })
    }

    pub fn iter_columns(&self) -> impl ExactSizeIterator<Item = GridLine<'_>> + '_ {
        (0..self.columns).map(move |column| GridLine {
            points: &self.points,
            offset: column,
            stride: self.columns,
            len: self.rows,
        })
    }
}

/// Read-only strided view over one row or column of a [`ControlGrid`].
#[derive(Debug, Clone, Copy)]
pub struct GridLine<'a> {
    points: &'a [Point3],
    offset: usize,
    stride: usize,
    len: usize,
}

impl<'a> GridLine<'a> {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Point3> {
        (index < self.len).then(|| self.points[self.offset + index * self.stride])
    }

    #[must_use]
    pub fn first(&self) -> Option<Point3> {
        self.get(0)
    }

    #[must_use]
    pub fn last(&self) -> Option<Point3> {
        self.len.checked_sub(1).and_then(|index| self.get(index))
    }

    #[must_use]
    pub fn iter(&self) -> GridLineIter<'a> {
        self.points[self.offset..]
            .iter()
            .copied()
            .step_by(self.stride)
            .take(self.len)
    }
}

pub type GridLineIter<'a> = Take<StepBy<Copied<slice::Iter<'a, Point3>>>>;

impl<'a> IntoIterator for GridLine<'a> {
    type Item = Point3;
    type IntoIter = GridLineIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
