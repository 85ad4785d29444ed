//! Surface point and normal evaluation by two cross sweeps of de Casteljau.
//!
//! Parameter convention: `u` runs along a row of the control grid as given,
//! while the collapse across rows runs at `1 - v`. With the grid stored
//! v-outer, `v = 0` therefore lands on the **last** control row and `v = 1`
//! on the first. For the unit square with corners `(0,0,0), (1,0,0),
//! (0,1,0), (1,1,0)` (row-major) the normal is `+Z`.

use super::core::{Point3, Tolerance, Vec3};
use super::de_casteljau::{CurveSample, EvalError, EvalResult, evaluate_curve_with};
use super::surface::BezierSurface;

/// Evaluated surface sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub u: f64,
    pub v: f64,
    /// Position from the u-sweep / v-collapse pass.
    pub point: Point3,
    /// Tangent of the v-sweep / u-collapse pass (towards increasing `u`).
    pub u_tangent: Vec3,
    /// Tangent of the u-sweep / v-collapse pass (towards decreasing `v`).
    pub v_tangent: Vec3,
    /// Unit `u_tangent x v_tangent`, or `None` where it vanishes.
    pub normal: Option<Vec3>,
    /// Distance between the positions produced by the two passes.
    pub position_mismatch: f64,
}

impl SurfaceSample {
    pub fn normal(&self) -> EvalResult<Vec3> {
        self.normal
            .ok_or(EvalError::DegenerateNormal { u: self.u, v: self.v })
    }

    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.normal.is_none()
    }
}

/// Reusable evaluator for one surface.
///
/// Holds scratch buffers so that sampling a grid does not allocate per
/// sample. Nothing is carried over between samples or between the two
/// passes of one sample.
#[derive(Debug)]
pub struct SurfaceEvaluator<'a> {
    surface: &'a BezierSurface,
    /// Tangents shorter than this are treated as vanished.
    tangent_floor: Tolerance,
    work: Vec<Point3>,
    collapsed: Vec<Point3>,
}

impl<'a> SurfaceEvaluator<'a> {
    #[must_use]
    pub fn new(surface: &'a BezierSurface) -> Self {
        let longest = surface.degree_u().max(surface.degree_v()) + 1;
        let extent = surface.control_bounds().map_or(0.0, |bounds| bounds.diagonal());
        Self {
            surface,
            tangent_floor: Tolerance::ZERO_LENGTH.scaled(extent),
            work: Vec::with_capacity(longest),
            collapsed: Vec::with_capacity(longest),
        }
    }

    #[must_use]
    pub const fn surface(&self) -> &'a BezierSurface {
        self.surface
    }

    pub fn sample(&mut self, u: f64, v: f64) -> SurfaceSample {
        let flipped_v = 1.0 - v;
        let surface = self.surface;
        let degree_u = surface.degree_u();
        let degree_v = surface.degree_v();
        let grid = surface.control_grid();

        // u-sweep over rows, then collapse across rows.
        self.collapsed.clear();
        for row in grid.iter_rows() {
            let swept = self.sweep(row, degree_u, u);
            self.collapsed.push(swept.point);
        }
        let v_pass = self.collapse(degree_v, flipped_v);

        // v-sweep over columns, then collapse across columns.
        self.collapsed.clear();
        for column in grid.iter_columns() {
            let swept = self.sweep(column, degree_v, flipped_v);
            self.collapsed.push(swept.point);
        }
        let u_pass = self.collapse(degree_u, u);

        let normal = self.normal_from(u_pass.tangent, v_pass.tangent);

        SurfaceSample {
            u,
            v,
            point: v_pass.point,
            u_tangent: u_pass.tangent,
            v_tangent: v_pass.tangent,
            normal,
            position_mismatch: v_pass.point.distance_to(u_pass.point),
        }
    }

    /// Unit `u_tangent x v_tangent`, or `None` if either tangent vanishes
    /// relative to the control-net extent or the two are parallel.
    fn normal_from(&self, u_tangent: Vec3, v_tangent: Vec3) -> Option<Vec3> {
        if self.tangent_floor.is_zero_vec3(u_tangent) || self.tangent_floor.is_zero_vec3(v_tangent) {
            return None;
        }
        let cross = u_tangent.cross(v_tangent);
        let parallel = Tolerance::ZERO_LENGTH.scaled(u_tangent.length() * v_tangent.length());
        if parallel.is_zero_vec3(cross) {
            return None;
        }
        cross.normalized()
    }

    fn sweep<I>(&mut self, polygon: I, degree: usize, t: f64) -> CurveSample
    where
        I: IntoIterator<Item = Point3>,
    {
        // Grid lines always hold `degree + 1` points by construction.
        match evaluate_curve_with(&mut self.work, polygon, degree, t) {
            Ok(sample) => sample,
            Err(err) => unreachable!("control grid line does not match surface degree: {err}"),
        }
    }

    fn collapse(&mut self, degree: usize, t: f64) -> CurveSample {
        let polygon = std::mem::take(&mut self.collapsed);
        let sample = self.sweep(polygon.iter().copied(), degree, t);
        self.collapsed = polygon;
        sample
    }
}

/// Evaluates position, tangents and normal of `surface` at `(u, v)`.
#[must_use]
pub fn eval_sample(surface: &BezierSurface, u: f64, v: f64) -> SurfaceSample {
    SurfaceEvaluator::new(surface).sample(u, v)
}
