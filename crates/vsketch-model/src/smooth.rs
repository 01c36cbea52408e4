//! Curve smoothing filters.
//!
//! Two symmetric FIR filters share the same 7-tap kernel
//! `0.008, 0.072, 0.24, 0.36, 0.24, 0.072, 0.008`:
//!
//! - [`InputFilter`] smooths raw pointer input while a stroke is being
//!   drawn. It keeps the most recent raw samples and recomputes the
//!   trailing outputs whose taps still reach unseen input.
//! - [`smooth_points`] smooths a whole curve after fitting, on
//!   positions, radii, or both.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::geom::CurvePoint;
use crate::point_list::PointList;

/// Half-width of the smoothing kernel.
const HALF_WIDTH: usize = 3;

/// Input filter weights: the halved center weight, then the outer taps.
/// The center weight is applied twice.
const INPUT_WEIGHTS: [f64; HALF_WIDTH + 1] = [0.18, 0.24, 0.072, 0.008];

/// Curve smoothing weights.
const CURVE_WEIGHTS: [f64; 2 * HALF_WIDTH + 1] = [0.008, 0.072, 0.24, 0.36, 0.24, 0.072, 0.008];

/// Raw samples kept by [`InputFilter`]: enough for the taps of the
/// newest outputs that can still change.
const INPUT_CAPACITY: usize = 2 * HALF_WIDTH + 1;

/// Which components [`smooth_points`] filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmoothingMode {
    /// Filter positions; keep radii.
    Positions,
    /// Filter radii; keep positions.
    Radii,
    /// Filter both.
    All,
}

impl SmoothingMode {
    const fn positions(self) -> bool {
        matches!(self, Self::Positions | Self::All)
    }

    const fn radii(self) -> bool {
        matches!(self, Self::Radii | Self::All)
    }
}

/// Smooth the interior points of `points` in place.
///
/// Replicate padding at both ends. The first and last points are
/// untouched, and sequences of three points or fewer are left as they
/// are. Corner flags are preserved.
pub fn smooth_points(points: &mut PointList, mode: SmoothingMode) {
    let original = points.to_vec();
    let len = original.len();
    if len <= 3 {
        return;
    }

    let tap = |i: isize| -> CurvePoint {
        let clamped = i.clamp(0, len.cast_signed() - 1);
        original[clamped.cast_unsigned()]
    };

    let mut smoothed = Vec::with_capacity(len);
    smoothed.push(original[0]);
    for i in 1..len - 1 {
        let center = original[i];
        let filtered = CURVE_WEIGHTS
            .iter()
            .enumerate()
            .fold(CurvePoint::default(), |acc, (j, &w)| {
                let offset = j.cast_signed() - HALF_WIDTH.cast_signed();
                acc.add_weighted(tap(i.cast_signed() + offset), w)
            });
        smoothed.push(CurvePoint {
            position: if mode.positions() { filtered.position } else { center.position },
            radius: if mode.radii() { filtered.radius } else { center.radius },
        });
    }
    smoothed.push(original[len - 1]);

    points.overwrite(smoothed);
}

/// Sliding-window smoother for raw stroke input.
///
/// Samples are indexed logically from the start of the stroke (or the
/// last reset). Only the newest [`INPUT_CAPACITY`] samples are stored;
/// older outputs can no longer change, so their inputs are not needed.
#[derive(Debug, Clone, Default)]
pub struct InputFilter {
    samples: VecDeque<CurvePoint>,
    /// Logical index of `samples[0]`.
    dropped: usize,
    /// The sample at logical index 0, used for front clamping.
    first: Option<CurvePoint>,
}

impl InputFilter {
    /// Create an empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples pushed since the last reset.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dropped + self.samples.len()
    }

    /// Returns `true` if no sample has been pushed since the last reset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.dropped = 0;
        self.first = None;
    }

    /// Append a raw sample.
    pub fn push(&mut self, point: CurvePoint) {
        if self.first.is_none() {
            self.first = Some(point);
        }
        if self.samples.len() == INPUT_CAPACITY {
            self.samples.pop_front();
            self.dropped += 1;
        }
        self.samples.push_back(point);
    }

    /// Filtered values for the outputs that changed with the newest
    /// sample.
    ///
    /// Each entry is `(distance_from_newest, value)`: the value belongs
    /// to the curve point that many steps before the newest one. The
    /// newest sample itself is never filtered. Outputs before logical
    /// index 3 (or 1 while fewer than four samples are buffered) are
    /// left alone.
    #[must_use]
    pub fn filtered_tail(&self) -> Vec<(usize, CurvePoint)> {
        let len = self.len();
        if len < 2 {
            return Vec::new();
        }
        let last = len - 1;
        let first = if len > HALF_WIDTH { HALF_WIDTH } else { 1 };
        let from = first.max(last.saturating_sub(HALF_WIDTH));
        (from..last).map(|i| (last - i, self.filter_at(i))).collect()
    }

    fn filter_at(&self, i: usize) -> CurvePoint {
        INPUT_WEIGHTS
            .iter()
            .enumerate()
            .fold(CurvePoint::default(), |acc, (j, &w)| {
                let low = i.checked_sub(j).map_or_else(|| self.front(), |k| self.sample(k));
                let high = self.sample(i + j);
                acc.add_weighted(low, w).add_weighted(high, w)
            })
    }

    fn front(&self) -> CurvePoint {
        self.first.unwrap_or_default()
    }

    /// Sample at a logical index, clamped to the newest at the back.
    fn sample(&self, index: usize) -> CurvePoint {
        if index == 0 {
            return self.front();
        }
        let local = index.saturating_sub(self.dropped);
        self.samples
            .get(local)
            .or_else(|| self.samples.back())
            .copied()
            .unwrap_or_else(|| self.front())
    }
}
