//! Vexel subdivision.
//!
//! A vexel is the curved, width-tapered segment between two consecutive
//! curve points. Its centerline is a cubic Bezier whose off-curve
//! control points lie on the tangents at either end, at a distance that
//! keeps the curvature bounded. Radius is interpolated linearly.
//!
//! Tangents come from the neighboring points: the tangent at a point is
//! the direction from its predecessor to its successor, with the first
//! and last point standing in for their missing neighbor. A point
//! flagged as a corner uses the incoming chord as its tangent on the
//! incoming side and the outgoing chord on the outgoing side, so the
//! curve bends sharply there.

use crate::geom::{CurvePoint, Vec2};
use crate::point_list::{PointHandle, PointList};

/// Below this tangent/chord cosine the control point collapses onto the
/// endpoint.
const COS_CORNER_ANGLE: f64 = 0.2;

/// One vexel: end points plus unit tangents at either end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vexel {
    /// Start point.
    pub start: CurvePoint,
    /// End point.
    pub end: CurvePoint,
    /// Unit tangent leaving `start`.
    pub start_tangent: Vec2,
    /// Unit tangent arriving at `end`.
    pub end_tangent: Vec2,
}

impl Vexel {
    /// Sample the vexel at spacing of at most `max_spacing`.
    ///
    /// Returns the intermediate samples followed by [`end`](Self::end);
    /// the start point is never included. A zero-length vexel yields
    /// nothing. A non-positive or non-finite spacing yields only the end
    /// point.
    #[must_use]
    pub fn sample(&self, max_spacing: f64) -> Vec<CurvePoint> {
        let mut samples = Vec::new();
        self.sample_into(max_spacing, &mut samples);
        samples
    }

    /// Like [`sample`](Self::sample) but appends to `out`.
    pub fn sample_into(&self, max_spacing: f64, out: &mut Vec<CurvePoint>) {
        let p1 = self.start.position;
        let p2 = self.end.position;
        let chord = p2 - p1;
        let len = chord.length();
        if len == 0.0 {
            return;
        }

        let count = sample_count(len, max_spacing);
        if count > 1 {
            let line = chord * (1.0 / len);
            let third = len / 3.0;
            let control_length = |tangent: Vec2| {
                let cos = tangent.dot(line);
                if cos >= COS_CORNER_ANGLE { third / cos } else { 0.0 }
            };
            let c1 = p1 + self.start_tangent * control_length(self.start_tangent);
            let c2 = p2 - self.end_tangent * control_length(self.end_tangent);

            out.reserve(count);
            #[allow(clippy::cast_precision_loss)]
            let n = count as f64;
            for k in 1..count {
                #[allow(clippy::cast_precision_loss)]
                let s = k as f64 / n;
                let t = 1.0 - s;
                let position =
                    p1 * (t * t * t) + c1 * (3.0 * t * t * s) + c2 * (3.0 * t * s * s) + p2 * (s * s * s);
                let radius = t.mul_add(self.start.radius, s * self.end.radius);
                out.push(CurvePoint::new(position, radius));
            }
        }
        out.push(self.end);
    }
}

/// `1 + floor(len / spacing)`, or 1 for an unusable spacing.
fn sample_count(len: f64, max_spacing: f64) -> usize {
    if max_spacing > 0.0 && max_spacing.is_finite() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let extra = (len / max_spacing).floor() as usize;
        extra.saturating_add(1)
    } else {
        1
    }
}

/// Iterate over the vexels of `points` in order, paired with the handle
/// of each vexel's end point.
pub fn vexels(points: &PointList) -> impl Iterator<Item = (PointHandle, Vexel)> + '_ {
    points.handles().filter_map(move |end| {
        let start = points.prev(end)?;
        let start_point = *points.get(start)?;
        let end_point = *points.get(end)?;
        let chord = end_point.position - start_point.position;

        let start_tangent = if points.is_corner(start) {
            chord.normalized()
        } else {
            let before = points.prev(start).and_then(|h| points.get(h)).unwrap_or(&start_point);
            (end_point.position - before.position).normalized()
        };
        let end_tangent = if points.is_corner(end) {
            chord.normalized()
        } else {
            let after = points.next(end).and_then(|h| points.get(h)).unwrap_or(&end_point);
            (after.position - start_point.position).normalized()
        };

        Some((
            end,
            Vexel {
                start: start_point,
                end: end_point,
                start_tangent,
                end_tangent,
            },
        ))
    })
}

/// Resample a point sequence into a smooth, densely sampled path.
///
/// Fewer than three points are returned unchanged. Otherwise the first
/// point is followed by the samples of each vexel. Deterministic; no
/// hidden state.
#[must_use]
pub fn sampled_points(points: &PointList, max_spacing: f64) -> Vec<CurvePoint> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len());
    out.extend(points.iter().next().copied());
    for (_, vexel) in vexels(points) {
        vexel.sample_into(max_spacing, &mut out);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(points: &[(f64, f64)]) -> PointList {
        points.iter().map(|&(x, y)| CurvePoint::at(x, y, 1.0)).collect()
    }

    #[test]
    fn fewer_than_three_points_unchanged() {
        let points = line(&[(0.0, 0.0), (10.0, 0.0)]);
        assert_eq!(sampled_points(&points, 0.5), points.to_vec());
    }

    #[test]
    fn endpoints_preserved_when_spacing_exceeds_length() {
        let points = line(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        let sampled = sampled_points(&points, 100.0);
        assert_eq!(sampled, points.to_vec());
    }

    #[test]
    fn straight_line_samples_stay_on_line_and_ordered() {
        let points = line(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)]);
        let sampled = sampled_points(&points, 1.0);
        // 1 + 5 + 5 samples
        assert_eq!(sampled.len(), 11);
        assert_eq!(sampled.first().unwrap().position, Vec2::new(0.0, 0.0));
        assert_eq!(sampled.last().unwrap().position, Vec2::new(10.0, 0.0));
        for pair in sampled.windows(2) {
            assert!(pair[1].position.x > pair[0].position.x);
            assert!(pair[1].position.y.abs() < 1e-12);
        }
    }

    #[test]
    fn radius_is_linear_along_vexel() {
        let vexel = Vexel {
            start: CurvePoint::at(0.0, 0.0, 1.0),
            end: CurvePoint::at(4.0, 0.0, 3.0),
            start_tangent: Vec2::new(1.0, 0.0),
            end_tangent: Vec2::new(1.0, 0.0),
        };
        let samples = vexel.sample(1.0);
        assert_eq!(samples.len(), 5);
        assert!((samples[1].radius - 2.0).abs() < 1e-12);
        assert!((samples[1].position.x - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zero_length_vexel_yields_nothing() {
        let p = CurvePoint::at(3.0, 3.0, 1.0);
        let vexel = Vexel {
            start: p,
            end: p,
            start_tangent: Vec2::ZERO,
            end_tangent: Vec2::ZERO,
        };
        assert!(vexel.sample(0.5).is_empty());
    }

    #[test]
    fn unusable_spacing_yields_end_point_only() {
        let vexel = Vexel {
            start: CurvePoint::at(0.0, 0.0, 1.0),
            end: CurvePoint::at(5.0, 0.0, 1.0),
            start_tangent: Vec2::new(1.0, 0.0),
            end_tangent: Vec2::new(1.0, 0.0),
        };
        assert_eq!(vexel.sample(0.0), vec![vexel.end]);
        assert_eq!(vexel.sample(-1.0), vec![vexel.end]);
        assert_eq!(vexel.sample(f64::NAN), vec![vexel.end]);
    }

    #[test]
    fn corner_uses_chords_as_tangents() {
        let mut points = line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        let corner = points.nth(1).unwrap();

        let smooth: Vec<Vexel> = vexels(&points).map(|(_, v)| v).collect();
        assert!(smooth[0].end_tangent.y > 0.0);

        points.set_corner(corner, true);
        let sharp: Vec<Vexel> = vexels(&points).map(|(_, v)| v).collect();
        assert_eq!(sharp[0].end_tangent, Vec2::new(1.0, 0.0));
        assert_eq!(sharp[1].start_tangent, Vec2::new(0.0, 1.0));

        // The first vexel is now a straight segment.
        for p in sharp[0].sample(1.0) {
            assert!(p.position.y.abs() < 1e-12);
        }
    }

    #[test]
    fn vexels_report_end_handles() {
        let points = line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let ends: Vec<PointHandle> = vexels(&points).map(|(h, _)| h).collect();
        assert_eq!(ends, vec![points.nth(1).unwrap(), points.nth(2).unwrap()]);
    }
}
