//! Draw / overdraw state machine.
//!
//! A gesture starts with [`Curve::start_drawing`], feeds pointer samples
//! through [`Curve::add_point`] and finishes with [`Curve::end_drawing`].
//!
//! Drawing an empty curve appends every accepted sample. Overdrawing
//! starts at a point picked by [`Curve::select`]; the first sample far
//! enough from it decides whether the gesture runs along or against the
//! stored point order. Backward gestures reverse the points so that
//! editing always proceeds forward, and the order is restored when the
//! gesture ends. Each accepted sample is appended after the edit point
//! and then absorbs the stored points it has overtaken.

use crate::curve::{Curve, EditDirection, EditMode, EditState};
use crate::geom::{CurvePoint, Vec2};
use crate::point_list::PointHandle;

/// Input closer than this to the overdraw start point cannot resolve the
/// edit direction.
const DIRECTION_DEAD_ZONE: f64 = 0.01;

/// Turns sharper than 90 degrees mark the edit point as a corner.
const COS_CORNER_ANGLE: f64 = 0.0;

impl Curve {
    /// Begin a draw or overdraw gesture at `point`.
    ///
    /// Ends any gesture already running. An empty curve starts a fresh
    /// draw. A non-empty curve starts an overdraw when `point` hits it
    /// within the current selection radius; otherwise nothing changes
    /// and `false` is returned.
    pub fn start_drawing(&mut self, point: CurvePoint, min_distance: f64) -> bool {
        if self.edit.mode != EditMode::Idle {
            self.end_drawing();
        }

        if self.points.is_empty() {
            let handle = self.points.push_back(point);
            self.input.clear();
            self.input.push(point);
            self.selection = Some(handle);
            self.edit = EditState {
                mode: EditMode::Draw,
                direction: EditDirection::Forward,
                start: point,
                before: 0,
                after: 0,
                min_distance,
                cursor: Some(handle),
                absorb_only: false,
            };
            return true;
        }

        if !self.select(point.position, self.selection_radius) {
            return false;
        }
        let Some(selected) = self.selection else {
            return false;
        };
        let (Some(&start), Some(before)) = (self.points.get(selected), self.points.position(selected))
        else {
            return false;
        };
        self.edit = EditState {
            mode: EditMode::Overdraw,
            direction: EditDirection::Unresolved,
            start,
            before,
            after: self.points.len() - before - 1,
            min_distance,
            cursor: Some(selected),
            absorb_only: false,
        };
        true
    }

    /// Feed one pointer sample into the running gesture.
    ///
    /// Ignored when no gesture is running or when `point` is closer than
    /// the minimum distance to the current edit point.
    pub fn add_point(&mut self, point: CurvePoint) {
        if self.edit.mode == EditMode::Idle {
            return;
        }
        let Some(edit_point) = self.edit_point() else {
            return;
        };
        if point.position.distance(edit_point.position) < self.edit.min_distance {
            return;
        }

        if self.edit.direction == EditDirection::Unresolved {
            let direction = self.resolve_direction(point.position);
            match direction {
                EditDirection::Unresolved => return,
                EditDirection::Backward => {
                    std::mem::swap(&mut self.edit.before, &mut self.edit.after);
                    self.points.reverse();
                }
                EditDirection::Forward => {}
            }
            self.edit.direction = direction;
            self.edit.absorb_only = self.edit.mode == EditMode::Overdraw && self.edit.before == 0;
        }

        self.append(point);
        self.absorb(point);
    }

    /// Finish the running gesture, restoring the stored point order if
    /// it was reversed.
    pub fn end_drawing(&mut self) {
        if self.edit.mode == EditMode::Idle {
            return;
        }
        if self.edit.direction == EditDirection::Backward {
            self.points.reverse();
        }
        self.input.clear();
        self.edit.direction = EditDirection::Unresolved;
        self.edit.mode = EditMode::Idle;
        self.edit.cursor = None;
        self.edit.absorb_only = false;
    }

    fn edit_point(&self) -> Option<CurvePoint> {
        self.edit.cursor.and_then(|h| self.points.get(h)).copied()
    }

    /// Pick the neighbor of the start point that `input` heads toward.
    fn resolve_direction(&self, input: Vec2) -> EditDirection {
        let start = self.edit.start.position;
        let heading = input - start;
        if heading.length() < DIRECTION_DEAD_ZONE {
            return EditDirection::Unresolved;
        }

        let toward = |neighbor: Option<PointHandle>| {
            neighbor
                .and_then(|h| self.points.get(h))
                .map_or(Vec2::ZERO, |p| (p.position - start).normalized())
        };
        let cursor = self.edit.cursor;
        let descending = toward(cursor.and_then(|h| self.points.prev(h)));
        let ascending = toward(cursor.and_then(|h| self.points.next(h)));

        if heading.dot(ascending) >= heading.dot(descending) {
            EditDirection::Forward
        } else {
            EditDirection::Backward
        }
    }

    /// Insert `point` after the edit point and make it the new edit
    /// point.
    fn append(&mut self, point: CurvePoint) {
        if self.edit.absorb_only {
            return;
        }
        let Some(cursor) = self.edit.cursor else {
            return;
        };
        let Some(edit_point) = self.points.get(cursor).copied() else {
            return;
        };

        if self.edit.before > 0
            && let Some(&previous) = self.points.prev(cursor).and_then(|h| self.points.get(h))
        {
            let outgoing = (point.position - edit_point.position).normalized();
            let incoming = (edit_point.position - previous.position).normalized();
            if outgoing.dot(incoming) < COS_CORNER_ANGLE {
                self.points.set_corner(cursor, true);
                self.input.clear();
                self.input.push(edit_point);
            }
        }

        let Some(inserted) = self.points.insert_after(cursor, point) else {
            return;
        };
        self.edit.cursor = Some(inserted);
        self.edit.before += 1;
        self.input.push(point);
        self.apply_input_filter(inserted);
    }

    /// Write the smoothed tail of the raw input back into the curve.
    fn apply_input_filter(&mut self, newest: PointHandle) {
        for (distance, value) in self.input.filtered_tail() {
            let target = (0..distance).try_fold(newest, |h, _| self.points.prev(h));
            if let Some(p) = target.and_then(|h| self.points.get_mut(h)) {
                *p = value;
            }
        }
    }

    /// Delete the stored points the input has overtaken.
    ///
    /// Candidates start after the edit point, or at the edit point
    /// itself when nothing precedes it. The walk stops at the first
    /// candidate ahead of the input; the closest candidate found before
    /// that ends the run that is deleted.
    fn absorb(&mut self, point: CurvePoint) {
        if self.edit.mode == EditMode::Draw || self.edit.after == 0 {
            return;
        }
        let Some(cursor) = self.edit.cursor else {
            return;
        };
        let Some(edit_point) = self.points.get(cursor).copied() else {
            return;
        };
        let first = if self.edit.before == 0 {
            Some(cursor)
        } else {
            self.points.next(cursor)
        };
        let Some(first) = first else {
            return;
        };

        let edit_to_input = point.position - edit_point.position;
        let mut nearest = self
            .points
            .get(first)
            .map_or(f64::INFINITY, |p| p.position.distance(point.position));
        let mut to_erase = 0;
        let mut walk = Some(first);
        let mut considered = 0;
        while let Some(h) = walk {
            let Some(candidate) = self.points.get(h) else {
                break;
            };
            let input_to_candidate = candidate.position - point.position;
            if edit_to_input.dot(input_to_candidate) > 0.0 {
                break;
            }
            considered += 1;
            let distance = input_to_candidate.length();
            if distance < nearest {
                nearest = distance;
                to_erase = considered;
            }
            walk = self.points.next(h);
        }

        let mut next = Some(first);
        for _ in 0..to_erase {
            let Some(h) = next else {
                break;
            };
            next = self.points.next(h);
            self.points.remove(h);
            self.edit.after = self.edit.after.saturating_sub(1);
            if self.edit.cursor == Some(h) {
                self.edit.cursor = self.points.front();
            }
        }

        if self.edit.after == 1 {
            if let Some(back) = self.points.back() {
                self.points.remove(back);
            }
            self.edit.after = 0;
        }

        if self.points.len() <= 1 {
            self.clear();
            self.end_drawing();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::curve::CurveId;

    fn p(x: f64, y: f64) -> CurvePoint {
        CurvePoint::at(x, y, 1.0)
    }

    fn xs(curve: &Curve) -> Vec<f64> {
        curve.points().iter().map(|q| q.position.x).collect()
    }

    fn line_curve(xs: &[f64]) -> Curve {
        Curve::from_points(CurveId(0), xs.iter().map(|&x| p(x, 0.0)))
    }

    #[test]
    fn drawing_a_straight_stroke() {
        let mut curve = Curve::new(CurveId(0));
        assert!(curve.start_drawing(p(0.0, 0.0), 0.1));
        assert_eq!(curve.edit_mode(), EditMode::Draw);
        for i in 1..=10 {
            curve.add_point(p(f64::from(i), 0.0));
        }
        curve.end_drawing();

        let out = xs(&curve);
        assert!(out.len() >= 2);
        assert_eq!(curve.points().iter().next().unwrap().position, Vec2::new(0.0, 0.0));
        assert_eq!(curve.points().iter().last().unwrap().position, Vec2::new(10.0, 0.0));
        for pair in out.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert_eq!(curve.edit_mode(), EditMode::Idle);
    }

    #[test]
    fn input_closer_than_min_distance_is_dropped() {
        let mut curve = Curve::new(CurveId(0));
        curve.start_drawing(p(0.0, 0.0), 1.0);
        curve.add_point(p(0.5, 0.0));
        assert_eq!(curve.len(), 1);
        curve.add_point(p(1.5, 0.0));
        assert_eq!(curve.len(), 2);
    }

    #[test]
    fn add_point_without_gesture_is_ignored() {
        let mut curve = line_curve(&[0.0, 1.0]);
        curve.add_point(p(5.0, 0.0));
        assert_eq!(curve.len(), 2);
    }

    #[test]
    fn sharp_turn_marks_a_corner() {
        let mut curve = Curve::new(CurveId(0));
        curve.start_drawing(p(0.0, 0.0), 0.1);
        curve.add_point(p(5.0, 0.0));
        curve.add_point(p(10.0, 0.0));
        curve.add_point(p(5.0, 1.0));
        curve.end_drawing();

        assert_eq!(curve.len(), 4);
        let corner = curve.points().nth(2).unwrap();
        assert!(curve.points().is_corner(corner));
        assert_eq!(curve.points().get(corner).unwrap().position, Vec2::new(10.0, 0.0));
        assert!(!curve.points().is_corner(curve.points().nth(1).unwrap()));
    }

    #[test]
    fn start_on_non_empty_curve_needs_a_hit() {
        let mut curve = line_curve(&[0.0, 10.0, 20.0]);
        curve.set_selection_radius(1.0);
        assert!(!curve.start_drawing(p(10.0, 5.0), 0.1));
        assert_eq!(curve.edit_mode(), EditMode::Idle);
        assert!(curve.start_drawing(p(10.0, 0.2), 0.1));
        assert_eq!(curve.edit_mode(), EditMode::Overdraw);
        assert_eq!(curve.edit_direction(), EditDirection::Unresolved);
    }

    #[test]
    fn direction_needs_input_outside_dead_zone() {
        let mut curve = line_curve(&[0.0, 10.0, 20.0]);
        curve.set_selection_radius(1.0);
        curve.start_drawing(p(10.0, 0.0), 0.0);
        curve.add_point(p(10.005, 0.0));
        assert_eq!(curve.edit_direction(), EditDirection::Unresolved);
        assert_eq!(curve.len(), 3);
    }

    #[test]
    fn backward_overdraw_trims_the_tail_and_restores_order() {
        let mut curve = line_curve(&[0.0, 10.0, 20.0]);
        curve.set_selection_radius(1.0);
        assert!(curve.start_drawing(p(10.0, 0.2), 0.1));
        curve.add_point(p(8.0, 0.0));
        assert_eq!(curve.edit_direction(), EditDirection::Backward);
        curve.end_drawing();

        assert_eq!(xs(&curve), vec![8.0, 10.0, 20.0]);
        assert_eq!(curve.edit_direction(), EditDirection::Unresolved);
    }

    #[test]
    fn forward_overdraw_absorbs_overtaken_points() {
        let mut curve = line_curve(&[0.0, 10.0, 20.0, 30.0, 40.0]);
        curve.set_selection_radius(1.0);
        assert!(curve.start_drawing(p(10.0, 0.0), 0.1));
        curve.add_point(p(12.0, 1.0));
        curve.add_point(p(19.0, 1.0));
        curve.add_point(p(26.0, 1.0));
        assert_eq!(curve.edit_direction(), EditDirection::Forward);
        curve.end_drawing();

        // The last sample overtook 20 and came nearest to 30, so both
        // went; the single stored point left after the edit went too.
        let out = xs(&curve);
        assert_eq!(out.len(), 5);
        assert_eq!(out.first(), Some(&0.0));
        assert_eq!(out.last(), Some(&26.0));
        assert!(out.iter().all(|&x| x < 27.0));
    }

    #[test]
    fn overdraw_absorbing_all_but_one_point_clears_the_curve() {
        let mut curve = line_curve(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        curve.set_selection_radius(0.5);
        assert!(curve.start_drawing(p(0.0, 0.0), 0.1));
        curve.add_point(p(3.4, 0.0));

        assert!(curve.is_empty());
        assert_eq!(curve.edit_mode(), EditMode::Idle);
    }

    #[test]
    fn front_overdraw_only_absorbs() {
        let mut curve = line_curve(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        curve.set_selection_radius(0.5);
        assert!(curve.start_drawing(p(0.0, 0.0), 0.1));
        curve.add_point(p(2.1, 0.0));
        curve.end_drawing();

        // Nothing was appended; the leading points were swallowed.
        assert_eq!(xs(&curve), vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn restarting_ends_the_previous_gesture() {
        let mut curve = line_curve(&[0.0, 10.0, 20.0]);
        curve.set_selection_radius(1.0);
        curve.start_drawing(p(10.0, 0.0), 0.1);
        curve.add_point(p(8.0, 0.0));
        // Reversed while running; a new start must restore the order first.
        assert!(curve.start_drawing(p(8.0, 0.0), 0.1));
        assert_eq!(curve.points().iter().next().unwrap().position.x, 8.0);
    }
}
