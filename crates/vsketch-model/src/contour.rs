//! A collection of curves with at most one active curve.

use std::collections::BTreeMap;

use crate::curve::{Curve, CurveId};
use crate::geom::Vec2;

/// Id-keyed set of [`Curve`]s.
///
/// Ids increase monotonically and are never reused, not even after
/// [`clear`](Self::clear). The active id, when set, always names a
/// curve in the contour.
#[derive(Debug, Clone, Default)]
pub struct Contour {
    curves: BTreeMap<CurveId, Curve>,
    next_id: u32,
    active: Option<CurveId>,
}

impl Contour {
    /// Create an empty contour.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of curves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Returns `true` if the contour holds no curves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Add an empty curve, make it active and return its id.
    pub fn add_curve(&mut self) -> CurveId {
        let id = CurveId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.curves.insert(id, Curve::new(id));
        self.active = Some(id);
        id
    }

    /// Add a curve built elsewhere (e.g. by a parser), re-keyed with a
    /// fresh id. The active curve is left alone.
    pub fn insert_curve(&mut self, curve: Curve) -> CurveId {
        let id = CurveId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let mut rekeyed = Curve::from_points_with_corners(id, curve.points().iter_with_corners());
        rekeyed.set_selection_radius(curve.selection_radius());
        self.curves.insert(id, rekeyed);
        id
    }

    /// Remove a curve. Deselects first if it is the active one.
    pub fn remove_curve(&mut self, id: CurveId) -> Option<Curve> {
        if self.active == Some(id) {
            self.deselect();
        }
        self.curves.remove(&id)
    }

    /// Make the first curve hit by `point` active and return its id.
    ///
    /// Curves are tested in id order. A miss leaves the active curve
    /// unchanged.
    pub fn select_curve(&mut self, point: Vec2, radius: f64) -> Option<CurveId> {
        let hit = self
            .curves
            .values_mut()
            .find_map(|curve| curve.select(point, radius).then_some(curve.id()))?;
        self.active = Some(hit);
        Some(hit)
    }

    /// Make `id` the active curve. Returns `false` if it does not exist.
    pub fn activate(&mut self, id: CurveId) -> bool {
        let exists = self.curves.contains_key(&id);
        if exists {
            self.active = Some(id);
        }
        exists
    }

    /// Clear the active curve.
    pub const fn deselect(&mut self) {
        self.active = None;
    }

    /// Id of the active curve.
    #[must_use]
    pub const fn active_id(&self) -> Option<CurveId> {
        self.active
    }

    /// The active curve.
    #[must_use]
    pub fn active(&self) -> Option<&Curve> {
        self.active.and_then(|id| self.curves.get(&id))
    }

    /// Mutable access to the active curve.
    pub fn active_mut(&mut self) -> Option<&mut Curve> {
        self.active.and_then(|id| self.curves.get_mut(&id))
    }

    /// Look up a curve.
    #[must_use]
    pub fn curve(&self, id: CurveId) -> Option<&Curve> {
        self.curves.get(&id)
    }

    /// Look up a curve mutably.
    pub fn curve_mut(&mut self, id: CurveId) -> Option<&mut Curve> {
        self.curves.get_mut(&id)
    }

    /// Iterate over the curves in id order.
    pub fn curves(&self) -> impl Iterator<Item = &Curve> {
        self.curves.values()
    }

    /// Iterate mutably over the curves in id order.
    pub fn curves_mut(&mut self) -> impl Iterator<Item = &mut Curve> {
        self.curves.values_mut()
    }

    /// Remove every curve. Ids keep counting from where they were.
    pub fn clear(&mut self) {
        self.deselect();
        self.curves.clear();
    }
}
