//! One-dimensional de Casteljau evaluation of a Bézier control polygon.
//!
//! A degree-`d` polygon of `d + 1` points is collapsed in `d` rounds. In round
//! `r`, every element `i` in `r + 1 ..= d` is replaced by
//! `t * element[i] + (1 - t) * element[i - 1]`, where `element[i - 1]` is the
//! value *before* this round touched it. After the last round element `d`
//! holds the curve point.
//!
//! The tangent is the difference of the two points that survive into the last
//! round; it points towards increasing `t` and is `d` times shorter than the
//! derivative. Only its direction is used downstream.

use super::core::{Point3, Vec3};

/// Result type for curve and surface evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("control polygon of degree {degree} needs {expected} points, got {found}")]
    PolygonArity {
        degree: usize,
        expected: usize,
        found: usize,
    },
    #[error("surface normal is degenerate at (u={u}, v={v})")]
    DegenerateNormal { u: f64, v: f64 },
}

/// Point and tangent direction on a Bézier curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSample {
    pub point: Point3,
    /// Zero for degree-0 polygons and for coincident control points.
    pub tangent: Vec3,
}

/// Evaluates the polygon at `t`. The polygon must hold exactly `degree + 1`
/// points.
pub fn evaluate_curve<I>(polygon: I, degree: usize, t: f64) -> EvalResult<CurveSample>
where
    I: IntoIterator<Item = Point3>,
{
    let mut work = Vec::with_capacity(degree.saturating_add(1));
    evaluate_curve_with(&mut work, polygon, degree, t)
}

/// Same as [`evaluate_curve`], reusing `work` as the scratch buffer.
pub fn evaluate_curve_with<I>(
    work: &mut Vec<Point3>,
    polygon: I,
    degree: usize,
    t: f64,
) -> EvalResult<CurveSample>
where
    I: IntoIterator<Item = Point3>,
{
    work.clear();
    work.extend(polygon);
    let expected = degree.saturating_add(1);
    if work.len() != expected {
        return Err(EvalError::PolygonArity {
            degree,
            expected,
            found: work.len(),
        });
    }
    Ok(collapse(work, t))
}

/// Collapses `work` in place. `work.len()` is `degree + 1` and non-zero.
fn collapse(work: &mut [Point3], t: f64) -> CurveSample {
    let degree = work.len() - 1;
    if degree == 0 {
        return CurveSample {
            point: work[0],
            tangent: Vec3::ZERO,
        };
    }

    // Pre-update value of the last element in the final round.
    let mut last_before_final = work[degree];
    for round in 0..degree {
        let mut previous = work[round];
        for i in (round + 1)..=degree {
            let current = work[i];
            work[i] = current.blend(previous, t);
            previous = current;
        }
        if round + 1 == degree {
            last_before_final = previous;
        }
    }

    CurveSample {
        point: work[degree],
        tangent: last_before_final - work[degree - 1],
    }
}
