//! Fitting orchestration: relax a curve onto the underlying vessel.
//!
//! Both entry points work on whole curves and finish with a smoothing
//! pass, which keeps single noisy measurements from kinking the result.
//! Preconditions that are not met (empty curve, too few points) make
//! the call a logged no-op that returns `None`.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::curve::Curve;
use crate::geom::Vec2;
use crate::point_list::PointHandle;
use crate::smooth::SmoothingMode;
use crate::types::FitConfig;
use crate::vessel::VesselFitter;

/// Summary of a centerline fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    /// Points in the fitted curve.
    pub points: usize,
    /// Relaxation passes run.
    pub passes: usize,
    /// Mean distance each point moved, smoothing included.
    pub mean_displacement: f64,
    /// Largest distance any point moved.
    pub max_displacement: f64,
}

/// Summary of a width fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidthReport {
    /// Points in the fitted curve.
    pub points: usize,
    /// Mean radius after smoothing.
    pub mean_radius: f64,
}

/// Move every point of `curve` toward the nearest vessel centerline.
///
/// Each of `config.passes` passes first measures all attraction vectors
/// from the current positions, then moves each point by
/// `config.move_factor` times its vector. Positions are smoothed
/// afterwards.
///
/// Returns `None` without touching the curve if it is empty or if the
/// move buffer cannot be allocated.
pub fn fit_to_nearest_vessel(
    curve: &mut Curve,
    fitter: &VesselFitter<'_>,
    expected_radius: f64,
    config: &FitConfig,
) -> Option<FitReport> {
    if curve.is_empty() {
        debug!("curve {} is empty, skipping centerline fit", curve.id());
        return None;
    }

    let handles: Vec<PointHandle> = curve.points().handles().collect();
    let mut moves: Vec<Vec2> = Vec::new();
    if let Err(e) = moves.try_reserve_exact(handles.len()) {
        warn!("no memory for fitting curve {}: {e}", curve.id());
        return None;
    }
    let original = positions(curve, &handles);

    for _ in 0..config.passes {
        moves.clear();
        moves.extend(handles.iter().map(|&h| {
            curve
                .points()
                .get(h)
                .map_or(Vec2::ZERO, |p| fitter.vec_to_closest_vessel(p.position, expected_radius))
        }));
        for (&h, &step) in handles.iter().zip(&moves) {
            if let Some(p) = curve.points_mut().get_mut(h) {
                p.position += step * config.move_factor;
            }
        }
    }

    curve.apply_smoothing(SmoothingMode::Positions);

    let moved: Vec<f64> = positions(curve, &handles)
        .iter()
        .zip(&original)
        .map(|(now, before)| now.distance(*before))
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let mean_displacement = moved.iter().sum::<f64>() / moved.len() as f64;
    let report = FitReport {
        points: handles.len(),
        passes: config.passes,
        mean_displacement,
        max_displacement: moved.iter().copied().fold(0.0, f64::max),
    };
    info!(
        "fitted curve {} to vessel: {} points, mean move {:.3}, max move {:.3}",
        curve.id(),
        report.points,
        report.mean_displacement,
        report.max_displacement
    );
    Some(report)
}

/// Set every point's radius to half the vessel width measured across
/// the curve.
///
/// Tangents are central differences (one-sided at the ends). End point
/// radii are copied from their neighbors since their tangents are the
/// least reliable. Radii are smoothed afterwards.
///
/// Returns `None` without touching the curve if it has fewer than two
/// points.
pub fn fit_vessel_width(
    curve: &mut Curve,
    fitter: &mut VesselFitter<'_>,
    expected_radius: f64,
) -> Option<WidthReport> {
    let n = curve.len();
    if n < 2 {
        debug!("curve {} has {n} points, skipping width fit", curve.id());
        return None;
    }

    let handles: Vec<PointHandle> = curve.points().handles().collect();
    let at = positions(curve, &handles);
    for (i, &h) in handles.iter().enumerate() {
        let tangent = (at[(i + 1).min(n - 1)] - at[i.saturating_sub(1)]).normalized();
        let width = fitter.width_at(at[i], tangent, expected_radius);
        if let Some(p) = curve.points_mut().get_mut(h) {
            p.radius = 0.5 * width;
        }
    }

    let points = curve.points_mut();
    copy_radius(points, handles[n - 2], handles[n - 1]);
    copy_radius(points, handles[1], handles[0]);

    curve.apply_smoothing(SmoothingMode::Radii);

    #[allow(clippy::cast_precision_loss)]
    let mean_radius = curve.points().iter().map(|p| p.radius).sum::<f64>() / n as f64;
    info!(
        "fitted width of curve {}: {n} points, mean radius {mean_radius:.3}",
        curve.id()
    );
    Some(WidthReport {
        points: n,
        mean_radius,
    })
}

fn positions(curve: &Curve, handles: &[PointHandle]) -> Vec<Vec2> {
    handles
        .iter()
        .map(|&h| curve.points().get(h).map_or(Vec2::ZERO, |p| p.position))
        .collect()
}

fn copy_radius(points: &mut crate::point_list::PointList, from: PointHandle, to: PointHandle) {
    if let Some(radius) = points.get(from).map(|p| p.radius)
        && let Some(p) = points.get_mut(to)
    {
        p.radius = radius;
    }
}
