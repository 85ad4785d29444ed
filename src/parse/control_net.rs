//! Parser for the whitespace-separated Bézier control-net format.
//!
//! ```text
//! <surface count>
//! <degree_u> <degree_v>                   # once per surface
//! <x> <y> <z>                             # (degree_v + 1) * (degree_u + 1) times
//! ```
//!
//! Control points are listed row by row (v outer, u inner). Line breaks carry
//! no meaning beyond separating tokens; `#` starts a comment.

use std::path::Path;
use std::str::FromStr;

use super::{ParseError, ParseResult, read_source, strip_comment};
use crate::geom::{BezierSurface, Point3};

/// Upper bound on preallocated control points per surface; larger nets
/// still parse, they just grow the buffer as they go.
const MAX_PREALLOCATED_POINTS: usize = 1 << 16;

/// Reads a control-net file into a fresh surface set.
pub fn parse_control_net_file(path: impl AsRef<Path>) -> ParseResult<Vec<BezierSurface>> {
    let path = path.as_ref();
    let text = read_source(path)?;
    let surfaces = parse_control_net_str(&text)?;
    log::info!("loaded {} surface(s) from {}", surfaces.len(), path.display());
    Ok(surfaces)
}

/// Parses control-net text. On error no partial set is returned.
pub fn parse_control_net_str(input: &str) -> ParseResult<Vec<BezierSurface>> {
    let mut tokens = Tokens::new(input);

    let count: usize = tokens.expect("surface count (non-negative integer)")?;
    log::debug!("control net declares {count} surface(s)");

    let mut surfaces = Vec::with_capacity(count.min(MAX_PREALLOCATED_POINTS));
    for index in 0..count {
        surfaces.push(parse_surface(&mut tokens, index)?);
    }

    if let Some((line, token)) = tokens.next() {
        log::warn!("ignoring trailing input after {count} surface(s), starting at line {line}: `{token}`");
    }

    Ok(surfaces)
}

fn parse_surface(tokens: &mut Tokens<'_>, index: usize) -> ParseResult<BezierSurface> {
    let degree_u: usize = tokens.expect("degree_u (non-negative integer)")?;
    let degree_line = tokens.line();
    let degree_v: usize = tokens.expect("degree_v (non-negative integer)")?;

    let expected = degree_u
        .checked_add(1)
        .zip(degree_v.checked_add(1))
        .and_then(|(columns, rows)| columns.checked_mul(rows))
        .ok_or_else(|| {
            ParseError::malformed(
                degree_line,
                format!("degrees ({degree_u}, {degree_v}) are too large"),
            )
        })?;
    log::debug!("surface {index}: degree ({degree_u}, {degree_v}), {expected} control points");

    let mut points = Vec::with_capacity(expected.min(MAX_PREALLOCATED_POINTS));
    for point_index in 0..expected {
        let row = point_index / (degree_u + 1);
        let column = point_index % (degree_u + 1);
        let coords = tokens.expect_point(|axis| {
            format!("{axis} of control point ({row}, {column}) of surface {index}")
        })?;
        points.push(Point3::from(coords));
    }

    BezierSurface::new(degree_u, degree_v, points)
        .map_err(|err| ParseError::malformed(degree_line, format!("surface {index}: {err}")))
}

/// Whitespace tokens paired with their 1-based line numbers.
struct Tokens<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    current: Option<(usize, std::str::SplitWhitespace<'a>)>,
    last_line: usize,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().enumerate(),
            current: None,
            last_line: 1,
        }
    }

    /// Line of the most recently returned token (or the last line at EOF).
    fn line(&self) -> usize {
        self.last_line
    }

    fn expect<T: FromStr>(&mut self, what: &str) -> ParseResult<T> {
        let Some((line, token)) = self.next() else {
            return Err(ParseError::malformed(
                self.last_line,
                format!("unexpected end of input, expected {what}"),
            ));
        };
        token
            .parse()
            .map_err(|_| ParseError::malformed(line, format!("expected {what}, found `{token}`")))
    }

    fn expect_point(&mut self, what: impl Fn(char) -> String) -> ParseResult<[f64; 3]> {
        let mut coords = [0.0; 3];
        for (slot, axis) in coords.iter_mut().zip(['x', 'y', 'z']) {
            let description = what(axis);
            let value: f64 = self.expect(&description)?;
            if !value.is_finite() {
                return Err(ParseError::malformed(
                    self.last_line,
                    format!("expected a finite {description}, found `{value}`"),
                ));
            }
            *slot = value;
        }
        Ok(coords)
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((line, words)) = self.current.as_mut() {
                if let Some(word) = words.next() {
                    self.last_line = *line;
                    return Some((*line, word));
                }
            }
            let (index, text) = self.lines.next()?;
            self.last_line = index + 1;
            self.current = Some((index + 1, strip_comment(text).split_whitespace()));
        }
    }
}
