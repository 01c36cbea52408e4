//! Line-oriented contour format.
//!
//! A contour record is the line `key_contour`, the number of curves,
//! then one curve record per curve. A curve record is the line
//! `key_curve`, the number of point lines, then one `x y radius` line
//! per point:
//!
//! ```text
//! key_contour
//! 1
//! key_curve
//! 2
//! 10 20 1.5
//! 30 40 2
//! ```
//!
//! Numbers use Rust's shortest round-trip formatting, so writing and
//! reading back reproduces every coordinate exactly. A corner point is
//! written twice, and each pair of consecutive identical point lines is
//! read back as one corner point. Repeated points are dropped on
//! writing, so a written curve reads back with the same points.
//!
//! This is pure string handling with no I/O.

use std::fmt::Write;
use std::str::FromStr;

use vsketch_model::{Contour, Curve, CurveId, CurvePoint};

use crate::FormatError;

/// Key line opening a contour record.
pub const CONTOUR_KEY: &str = "key_contour";

/// Key line opening a curve record.
pub const CURVE_KEY: &str = "key_curve";

/// Append the curve record for `curve` to `out`.
///
/// A point identical to the one before it adds a zero-length segment
/// and is dropped, its corner flag merged into the kept point. This
/// keeps a doubled line meaning exactly one corner.
pub fn write_curve(curve: &Curve, out: &mut String) {
    let points = distinct_points(curve);
    let lines: usize = points.iter().map(|&(_, corner)| if corner { 2 } else { 1 }).sum();
    let _ = writeln!(out, "{CURVE_KEY}");
    let _ = writeln!(out, "{lines}");
    for (p, corner) in points {
        let repeat = if corner { 2 } else { 1 };
        for _ in 0..repeat {
            let _ = writeln!(out, "{} {} {}", p.position.x, p.position.y, p.radius);
        }
    }
}

fn distinct_points(curve: &Curve) -> Vec<(CurvePoint, bool)> {
    let mut points: Vec<(CurvePoint, bool)> = Vec::with_capacity(curve.len());
    for (point, corner) in curve.points().iter_with_corners() {
        match points.last_mut() {
            Some((previous, previous_corner)) if *previous == point => *previous_corner |= corner,
            _ => points.push((point, corner)),
        }
    }
    points
}

/// Append the contour record for `contour` to `out`, curves in id
/// order.
pub fn write_contour(contour: &Contour, out: &mut String) {
    let _ = writeln!(out, "{CONTOUR_KEY}");
    let _ = writeln!(out, "{}", contour.len());
    for curve in contour.curves() {
        write_curve(curve, out);
    }
}

/// Serialize `contour` into a new string.
///
/// # Examples
///
/// ```
/// use vsketch_model::{Contour, CurvePoint};
/// use vsketch_format::contour_to_string;
///
/// let mut contour = Contour::new();
/// let id = contour.add_curve();
/// contour
///     .curve_mut(id)
///     .unwrap()
///     .points_mut()
///     .extend([CurvePoint::at(10.0, 20.0, 1.5), CurvePoint::at(30.0, 40.0, 2.0)]);
///
/// assert_eq!(
///     contour_to_string(&contour),
///     "key_contour\n1\nkey_curve\n2\n10 20 1.5\n30 40 2\n",
/// );
/// ```
#[must_use]
pub fn contour_to_string(contour: &Contour) -> String {
    let mut out = String::new();
    write_contour(contour, &mut out);
    out
}

/// Parse a single curve record, giving the curve the id `id`.
///
/// Text after the record is ignored.
///
/// # Errors
///
/// Returns [`FormatError::UnexpectedKey`] if the record does not start
/// with `key_curve`, [`FormatError::UnexpectedEof`] if it is cut short,
/// and [`FormatError::InvalidNumber`] for a malformed count or point.
pub fn parse_curve(text: &str, id: CurveId) -> Result<Curve, FormatError> {
    Records::new(text).curve(id)
}

/// Parse a contour record into a new [`Contour`].
///
/// Curves receive fresh ids in file order and no curve is active. Text
/// after the record is ignored.
///
/// # Errors
///
/// Same as [`parse_curve`], with `key_contour` as the expected leading
/// key.
pub fn parse_contour(text: &str) -> Result<Contour, FormatError> {
    Records::new(text).contour()
}

/// Cursor over the lines of a text record, tracking 1-based line
/// numbers for error messages.
pub(crate) struct Records<'a> {
    lines: std::str::Lines<'a>,
    line: usize,
}

impl<'a> Records<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self::starting_at(text, 0)
    }

    /// Lines are numbered from `consumed + 1`.
    pub(crate) fn starting_at(text: &'a str, consumed: usize) -> Self {
        Self {
            lines: text.lines(),
            line: consumed,
        }
    }

    fn next_line(&mut self, expected: &'static str) -> Result<&'a str, FormatError> {
        let line = self
            .lines
            .next()
            .ok_or(FormatError::UnexpectedEof { expected })?;
        self.line += 1;
        Ok(line)
    }

    fn key(&mut self, key: &'static str) -> Result<(), FormatError> {
        let found = self.next_line(key)?;
        if found == key {
            Ok(())
        } else {
            Err(FormatError::UnexpectedKey {
                line: self.line,
                expected: key,
                found: found.to_owned(),
            })
        }
    }

    fn number<T: FromStr>(&self, text: &str) -> Result<T, FormatError> {
        text.trim().parse().map_err(|_| FormatError::InvalidNumber {
            line: self.line,
            text: text.to_owned(),
        })
    }

    fn count(&mut self, expected: &'static str) -> Result<usize, FormatError> {
        let text = self.next_line(expected)?;
        self.number(text)
    }

    fn point(&mut self) -> Result<CurvePoint, FormatError> {
        let text = self.next_line("a point line")?;
        let mut fields = text.split_whitespace();
        let mut field = || -> Result<f64, FormatError> {
            let value = fields.next().ok_or_else(|| FormatError::InvalidNumber {
                line: self.line,
                text: text.to_owned(),
            })?;
            self.number(value)
        };
        let x = field()?;
        let y = field()?;
        let radius = field()?;
        Ok(CurvePoint::at(x, y, radius))
    }

    pub(crate) fn curve(&mut self, id: CurveId) -> Result<Curve, FormatError> {
        self.key(CURVE_KEY)?;
        let count = self.count("a point count")?;
        let mut points: Vec<(CurvePoint, bool)> = Vec::new();
        for _ in 0..count {
            let point = self.point()?;
            match points.last_mut() {
                Some((previous, corner)) if !*corner && *previous == point => *corner = true,
                _ => points.push((point, false)),
            }
        }
        Ok(Curve::from_points_with_corners(id, points))
    }

    pub(crate) fn contour(&mut self) -> Result<Contour, FormatError> {
        self.key(CONTOUR_KEY)?;
        let count = self.count("a curve count")?;
        let mut contour = Contour::new();
        for _ in 0..count {
            // The contour re-keys each curve on insertion.
            let curve = self.curve(CurveId(0))?;
            contour.insert_curve(curve);
        }
        Ok(contour)
    }
}
