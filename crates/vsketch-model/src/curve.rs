//! Variable-width curves.
//!
//! A [`Curve`] owns an ordered [`PointList`] and the state of the edit
//! gesture currently applied to it. Drawing and overdrawing live in
//! [`crate::edit`]; this module covers construction, read access,
//! resampling and hit-testing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geom::{CurvePoint, Vec2};
use crate::point_list::{PointHandle, PointList};
use crate::smooth::{InputFilter, SmoothingMode, smooth_points};
use crate::vexel::{sampled_points, vexels};

/// Identifier of a curve within its [`Contour`](crate::Contour).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CurveId(pub u32);

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of edit gesture in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditMode {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Drawing a new curve from scratch.
    Draw,
    /// Redrawing over an existing curve.
    Overdraw,
}

/// Direction of an overdraw relative to the stored point order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditDirection {
    /// Not yet known; resolved by the first input far enough from the
    /// start point.
    #[default]
    Unresolved,
    /// Along the stored point order.
    Forward,
    /// Against the stored point order. The points are reversed for the
    /// duration of the gesture.
    Backward,
}

/// Per-gesture edit state.
///
/// While a gesture is running, `before + after + 1` equals the number of
/// points in the curve and `cursor` names the edit point.
#[derive(Debug, Clone, Default)]
pub(crate) struct EditState {
    pub(crate) mode: EditMode,
    pub(crate) direction: EditDirection,
    pub(crate) start: CurvePoint,
    pub(crate) before: usize,
    pub(crate) after: usize,
    pub(crate) min_distance: f64,
    pub(crate) cursor: Option<PointHandle>,
    /// Overdrawing forward from the front: input only absorbs points.
    pub(crate) absorb_only: bool,
}

/// An editable variable-width curve.
#[derive(Debug, Clone)]
pub struct Curve {
    id: CurveId,
    pub(crate) points: PointList,
    pub(crate) selection_radius: f64,
    pub(crate) selection: Option<PointHandle>,
    pub(crate) edit: EditState,
    pub(crate) input: InputFilter,
}

impl Curve {
    /// Default hit-test radius of a fresh curve.
    pub const DEFAULT_SELECTION_RADIUS: f64 = 1.0;

    /// Create an empty curve.
    #[must_use]
    pub fn new(id: CurveId) -> Self {
        Self {
            id,
            points: PointList::new(),
            selection_radius: Self::DEFAULT_SELECTION_RADIUS,
            selection: None,
            edit: EditState::default(),
            input: InputFilter::new(),
        }
    }

    /// Create a curve from existing points, none of them corners.
    #[must_use]
    pub fn from_points<I: IntoIterator<Item = CurvePoint>>(id: CurveId, points: I) -> Self {
        let mut curve = Self::new(id);
        curve.points = points.into_iter().collect();
        curve
    }

    /// Create a curve from `(point, is_corner)` pairs.
    #[must_use]
    pub fn from_points_with_corners<I: IntoIterator<Item = (CurvePoint, bool)>>(
        id: CurveId,
        points: I,
    ) -> Self {
        let mut curve = Self::new(id);
        for (point, corner) in points {
            curve.points.push_back_with_corner(point, corner);
        }
        curve
    }

    /// This curve's identifier.
    #[must_use]
    pub const fn id(&self) -> CurveId {
        self.id
    }

    /// The curve's points.
    #[must_use]
    pub const fn points(&self) -> &PointList {
        &self.points
    }

    /// Mutable access to the curve's points.
    ///
    /// Changing the points while a gesture is in progress invalidates
    /// the edit state; callers should [`end_drawing`](Self::end_drawing)
    /// first.
    pub const fn points_mut(&mut self) -> &mut PointList {
        &mut self.points
    }

    /// Number of points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the curve has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Remove every point and any in-progress input.
    pub fn clear(&mut self) {
        self.points.clear();
        self.input.clear();
        self.selection = None;
    }

    /// Hit-test radius stored by the last [`select`](Self::select).
    #[must_use]
    pub const fn selection_radius(&self) -> f64 {
        self.selection_radius
    }

    /// Set the hit-test radius used when an overdraw starts.
    pub const fn set_selection_radius(&mut self, radius: f64) {
        self.selection_radius = radius;
    }

    /// The point chosen by the last successful [`select`](Self::select).
    #[must_use]
    pub const fn selected(&self) -> Option<PointHandle> {
        self.selection
    }

    /// Kind of gesture in progress.
    #[must_use]
    pub const fn edit_mode(&self) -> EditMode {
        self.edit.mode
    }

    /// Resolved direction of the gesture in progress.
    #[must_use]
    pub const fn edit_direction(&self) -> EditDirection {
        self.edit.direction
    }

    /// Densely resampled points for rendering and hit-testing.
    ///
    /// See [`crate::vexel::sampled_points`].
    #[must_use]
    pub fn sampled_points(&self, max_spacing: f64) -> Vec<CurvePoint> {
        sampled_points(&self.points, max_spacing)
    }

    /// Smooth positions, radii, or both. See
    /// [`crate::smooth::smooth_points`].
    pub fn apply_smoothing(&mut self, mode: SmoothingMode) {
        smooth_points(&mut self.points, mode);
    }

    /// Hit-test the curve at `point` and remember the hit.
    ///
    /// Stores `radius` as the selection radius and resets any selection,
    /// edit direction and buffered input. An end point strictly closer
    /// than `radius` wins outright, the first point before the last.
    /// Otherwise the vexels are sampled at `radius` spacing and the
    /// closest sample strictly within `radius` is selected: the vexel's
    /// end point itself when that is the closest sample, or a new point
    /// inserted at the sample just before the vexel's end point.
    pub fn select(&mut self, point: Vec2, radius: f64) -> bool {
        self.selection_radius = radius;
        self.edit.direction = EditDirection::Unresolved;
        self.selection = None;
        self.input.clear();

        let (Some(front), Some(back)) = (self.points.front(), self.points.back()) else {
            return false;
        };

        for end in [front, back] {
            if self
                .points
                .get(end)
                .is_some_and(|p| p.position.distance(point) < radius)
            {
                self.selection = Some(end);
                return true;
            }
        }

        if self.points.len() < 2 {
            return false;
        }

        let mut best: Option<(f64, PointHandle, Option<CurvePoint>)> = None;
        let mut samples = Vec::new();
        for (end, vexel) in vexels(&self.points) {
            samples.clear();
            vexel.sample_into(radius, &mut samples);
            let last = samples.len().saturating_sub(1);
            for (k, sample) in samples.iter().enumerate() {
                let distance = sample.position.distance(point);
                let nearest = best.as_ref().map_or(radius, |(d, _, _)| *d);
                if distance < nearest {
                    let inserted = (k != last).then_some(*sample);
                    best = Some((distance, end, inserted));
                }
            }
        }

        let Some((_, end, inserted)) = best else {
            return false;
        };
        self.selection = match inserted {
            Some(sample) => self.points.insert_before(end, sample),
            None => Some(end),
        };
        self.selection.is_some()
    }
}
