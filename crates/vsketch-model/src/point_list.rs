//! Arena-backed doubly linked list of curve points.
//!
//! Curve editing inserts and removes points in the middle of the
//! sequence while holding on to an edit cursor, so positional indices
//! are a poor fit. Nodes live in a [`SlotMap`] and are addressed by
//! versioned [`PointHandle`] keys: inserting or removing one node never
//! invalidates a handle to another node, and a handle to a removed node
//! is detected as stale instead of silently aliasing a reused slot.
//!
//! Each node also carries a corner flag. A corner point breaks tangent
//! continuity when the curve is resampled (see [`crate::vexel`]).

use slotmap::SlotMap;

use crate::geom::CurvePoint;

slotmap::new_key_type! {
    /// Stable reference to a node in a [`PointList`].
    ///
    /// Stays valid until the node it names is removed (or the list is
    /// cleared). Every accessor taking a stale handle returns `None`.
    pub struct PointHandle;
}

#[derive(Debug, Clone)]
struct Node {
    point: CurvePoint,
    corner: bool,
    prev: Option<PointHandle>,
    next: Option<PointHandle>,
}

/// Ordered sequence of [`CurvePoint`]s with O(1) insertion and removal
/// at any handle.
#[derive(Debug, Clone, Default)]
pub struct PointList {
    nodes: SlotMap<PointHandle, Node>,
    head: Option<PointHandle>,
    tail: Option<PointHandle>,
    len: usize,
}

impl PointList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points in the list.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Handle to the first point.
    #[must_use]
    pub const fn front(&self) -> Option<PointHandle> {
        self.head
    }

    /// Handle to the last point.
    #[must_use]
    pub const fn back(&self) -> Option<PointHandle> {
        self.tail
    }

    /// The point named by `handle`.
    #[must_use]
    pub fn get(&self, handle: PointHandle) -> Option<&CurvePoint> {
        self.nodes.get(handle).map(|n| &n.point)
    }

    /// Mutable access to the point named by `handle`.
    pub fn get_mut(&mut self, handle: PointHandle) -> Option<&mut CurvePoint> {
        self.nodes.get_mut(handle).map(|n| &mut n.point)
    }

    /// Whether the point named by `handle` is a corner. Stale handles
    /// are never corners.
    #[must_use]
    pub fn is_corner(&self, handle: PointHandle) -> bool {
        self.nodes.get(handle).is_some_and(|n| n.corner)
    }

    /// Set or clear the corner flag. Returns `false` for a stale handle.
    pub fn set_corner(&mut self, handle: PointHandle, corner: bool) -> bool {
        self.nodes.get_mut(handle).map(|n| n.corner = corner).is_some()
    }

    /// Handle to the point after `handle`.
    #[must_use]
    pub fn next(&self, handle: PointHandle) -> Option<PointHandle> {
        self.nodes.get(handle)?.next
    }

    /// Handle to the point before `handle`.
    #[must_use]
    pub fn prev(&self, handle: PointHandle) -> Option<PointHandle> {
        self.nodes.get(handle)?.prev
    }

    /// Append a point and return its handle.
    pub fn push_back(&mut self, point: CurvePoint) -> PointHandle {
        self.push_back_with_corner(point, false)
    }

    /// Append a point with an explicit corner flag.
    pub fn push_back_with_corner(&mut self, point: CurvePoint, corner: bool) -> PointHandle {
        let tail = self.tail;
        let handle = self.alloc(Node {
            point,
            corner,
            prev: tail,
            next: None,
        });
        match tail {
            Some(t) => self.set_next(t, Some(handle)),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
        handle
    }

    /// Insert `point` directly after `handle`. Returns `None` (and
    /// inserts nothing) for a stale handle.
    pub fn insert_after(&mut self, handle: PointHandle, point: CurvePoint) -> Option<PointHandle> {
        let next = self.nodes.get(handle)?.next;
        let inserted = self.alloc(Node {
            point,
            corner: false,
            prev: Some(handle),
            next,
        });
        self.set_next(handle, Some(inserted));
        match next {
            Some(n) => self.set_prev(n, Some(inserted)),
            None => self.tail = Some(inserted),
        }
        Some(inserted)
    }

    /// Insert `point` directly before `handle`. Returns `None` (and
    /// inserts nothing) for a stale handle.
    pub fn insert_before(&mut self, handle: PointHandle, point: CurvePoint) -> Option<PointHandle> {
        let prev = self.nodes.get(handle)?.prev;
        let inserted = self.alloc(Node {
            point,
            corner: false,
            prev,
            next: Some(handle),
        });
        self.set_prev(handle, Some(inserted));
        match prev {
            Some(p) => self.set_next(p, Some(inserted)),
            None => self.head = Some(inserted),
        }
        Some(inserted)
    }

    /// Remove the node named by `handle` and return its point.
    pub fn remove(&mut self, handle: PointHandle) -> Option<CurvePoint> {
        let node = self.nodes.remove(handle)?;
        self.len -= 1;

        match node.prev {
            Some(p) => self.set_next(p, node.next),
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => self.set_prev(n, node.prev),
            None => self.tail = node.prev,
        }
        Some(node.point)
    }

    /// Remove every point. All outstanding handles become stale.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Reverse the order of the points in place. Handles stay valid and
    /// keep naming the same points.
    pub fn reverse(&mut self) {
        let mut cursor = self.head;
        while let Some(node) = cursor.and_then(|h| self.nodes.get_mut(h)) {
            std::mem::swap(&mut node.prev, &mut node.next);
            cursor = node.prev;
        }
        std::mem::swap(&mut self.head, &mut self.tail);
    }

    /// Zero-based position of `handle` counted from the front.
    #[must_use]
    pub fn position(&self, handle: PointHandle) -> Option<usize> {
        if !self.nodes.contains_key(handle) {
            return None;
        }
        self.handles().position(|h| h == handle)
    }

    /// Handle of the point at zero-based position `n`.
    #[must_use]
    pub fn nth(&self, n: usize) -> Option<PointHandle> {
        self.handles().nth(n)
    }

    /// Iterate over the points from front to back.
    pub fn iter(&self) -> impl Iterator<Item = &CurvePoint> + '_ {
        self.handles().filter_map(|h| self.nodes.get(h).map(|n| &n.point))
    }

    /// Iterate over the points with their corner flags.
    pub fn iter_with_corners(&self) -> impl Iterator<Item = (CurvePoint, bool)> + '_ {
        self.handles()
            .filter_map(|h| self.nodes.get(h).map(|n| (n.point, n.corner)))
    }

    /// Iterate over the node handles from front to back.
    pub fn handles(&self) -> impl Iterator<Item = PointHandle> + '_ {
        std::iter::successors(self.head, |&h| self.nodes.get(h).and_then(|n| n.next))
    }

    /// Copy the points into a `Vec`, front to back.
    #[must_use]
    pub fn to_vec(&self) -> Vec<CurvePoint> {
        self.iter().copied().collect()
    }

    /// Overwrite the points in order with `points`. Corner flags are
    /// kept. Extra input is ignored; missing input leaves the remaining
    /// points untouched.
    pub fn overwrite<I: IntoIterator<Item = CurvePoint>>(&mut self, points: I) {
        let mut cursor = self.head;
        for point in points {
            let Some(node) = cursor.and_then(|h| self.nodes.get_mut(h)) else {
                break;
            };
            node.point = point;
            cursor = node.next;
        }
    }

    fn set_next(&mut self, handle: PointHandle, next: Option<PointHandle>) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.next = next;
        }
    }

    fn set_prev(&mut self, handle: PointHandle, prev: Option<PointHandle>) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.prev = prev;
        }
    }

    fn alloc(&mut self, node: Node) -> PointHandle {
        self.len += 1;
        self.nodes.insert(node)
    }
}

impl FromIterator<CurvePoint> for PointList {
    fn from_iter<I: IntoIterator<Item = CurvePoint>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl Extend<CurvePoint> for PointList {
    fn extend<I: IntoIterator<Item = CurvePoint>>(&mut self, iter: I) {
        for point in iter {
            self.push_back(point);
        }
    }
}
