//! Image measurements that snap curves onto vessels.
//!
//! [`VesselFitter`] answers two questions about a point on a curve:
//!
//! - **Where is the centerline?** [`VesselFitter::vec_to_closest_vessel`]
//!   takes intensity moments over a small window, finds the
//!   bias-corrected center of mass and projects it onto the local
//!   gradient direction (estimated with a derivative-of-Gaussian
//!   filter). Moving a point by that vector pulls it across the vessel
//!   toward its center without sliding it along the vessel.
//!
//! - **How wide is the vessel?** [`VesselFitter::width_at`] samples the
//!   image along the curve normal at sub-pixel spacing, convolves the
//!   profile with a 1D derivative-of-Gaussian and measures the distance
//!   between the strongest negative and positive edge responses.
//!
//! The filter scale follows the expected vessel radius in three
//! buckets (sigma 0.5, 1.0 or 1.5 pixels).

use std::f64::consts::PI;

use crate::geom::Vec2;
use crate::raster::Raster;
use crate::types::VesselContrast;

/// Profile samples per pixel along the normal.
const SAMPLES_PER_PIXEL: usize = 10;

/// Edge responses below this fraction of the largest profile sample
/// are rounding noise.
const RESPONSE_NOISE: f64 = 1e-9;

/// Sigma buckets, smallest first.
const SIGMAS: [f64; 3] = [0.5, 1.0, 1.5];

/// Pick the sigma bucket for an expected vessel radius.
fn sigma_bucket(expected_radius: f64) -> usize {
    if expected_radius <= 0.5 {
        0
    } else if expected_radius <= 1.5 {
        1
    } else {
        2
    }
}

/// Sampled first derivative of a Gaussian for edge detection along a
/// profile.
#[derive(Debug, Clone)]
pub struct EdgeKernel {
    sigma: f64,
    radius_px: usize,
    taps: Vec<f64>,
}

impl EdgeKernel {
    /// Build the kernel for `sigma`, covering `round(2 sigma)` pixels on
    /// each side at [`SAMPLES_PER_PIXEL`] taps per pixel.
    #[must_use]
    pub fn new(sigma: f64) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let radius_px = 2.0f64.mul_add(sigma, 0.5).max(0.0) as usize;
        let count = 2 * radius_px * SAMPLES_PER_PIXEL + 1;
        let center = count / 2;
        let scale = 1.0 / (sigma * sigma * sigma * (2.0 * PI).sqrt());
        #[allow(clippy::cast_precision_loss)]
        let spacing = 1.0 / SAMPLES_PER_PIXEL as f64;

        let taps = (0..count)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let x = (i as f64 - center as f64) * spacing;
                -x * scale * (-(x * x) / (2.0 * sigma * sigma)).exp()
            })
            .collect();

        Self {
            sigma,
            radius_px,
            taps,
        }
    }

    /// Gaussian standard deviation in pixels.
    #[must_use]
    pub const fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Support radius in whole pixels.
    #[must_use]
    pub const fn radius_px(&self) -> usize {
        self.radius_px
    }

    /// Kernel taps, centered.
    #[must_use]
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    /// Convolve `samples` with the kernel, extending the ends by
    /// clamping.
    #[must_use]
    pub fn convolve(&self, samples: &[f64]) -> Vec<f64> {
        let Some(last) = samples.len().checked_sub(1) else {
            return Vec::new();
        };
        let center = self.taps.len() / 2;
        (0..samples.len())
            .map(|i| {
                self.taps
                    .iter()
                    .enumerate()
                    .map(|(j, &k)| {
                        let idx = (i + j).saturating_sub(center).min(last);
                        k * samples[idx]
                    })
                    .sum()
            })
            .collect()
    }
}

/// Centerline and width measurements against one raster.
///
/// Width kernels are built on first use for each sigma bucket and kept
/// for the lifetime of the fitter.
#[derive(Debug, Clone)]
pub struct VesselFitter<'a> {
    raster: &'a Raster,
    contrast: VesselContrast,
    kernels: [Option<EdgeKernel>; 3],
}

impl<'a> VesselFitter<'a> {
    /// Create a fitter over `raster`.
    #[must_use]
    pub const fn new(raster: &'a Raster, contrast: VesselContrast) -> Self {
        Self {
            raster,
            contrast,
            kernels: [None, None, None],
        }
    }

    /// The raster being measured.
    #[must_use]
    pub const fn raster(&self) -> &'a Raster {
        self.raster
    }

    /// Vessel polarity.
    #[must_use]
    pub const fn contrast(&self) -> VesselContrast {
        self.contrast
    }

    /// Change the vessel polarity.
    pub const fn set_contrast(&mut self, contrast: VesselContrast) {
        self.contrast = contrast;
    }

    /// Vector from `pos` toward the nearest vessel centerline, measured
    /// across the vessel.
    ///
    /// Returns the zero vector for points whose pixel lies within the
    /// filter radius of the image border, and for featureless patches.
    #[must_use]
    pub fn vec_to_closest_vessel(&self, pos: Vec2, expected_radius: f64) -> Vec2 {
        let sigma = SIGMAS[sigma_bucket(expected_radius)];
        #[allow(clippy::cast_possible_truncation)]
        let r = (3.0 * sigma) as i64;

        let w = i64::from(self.raster.width());
        let h = i64::from(self.raster.height());
        #[allow(clippy::cast_possible_truncation)]
        let (i, j) = (pos.x as i64, pos.y as i64);
        if i < r || i > w - r || j < r || j > h - r {
            return Vec2::ZERO;
        }

        let two_sigma_sq = 2.0 * sigma * sigma;
        let norm = 1.0 / (PI * two_sigma_sq * sigma * sigma);
        let mut m00 = 0.0;
        let mut m10 = 0.0;
        let mut m01 = 0.0;
        let mut gradient = Vec2::ZERO;
        let mut min = self.raster.value_at(pos);
        for jj in -r..=r {
            for ii in -r..=r {
                #[allow(clippy::cast_precision_loss)]
                let offset = Vec2::new(ii as f64, jj as f64);
                let v = self.raster.value_at(pos + offset);
                min = min.min(v);
                m00 += v;
                m10 -= v * offset.x;
                m01 -= v * offset.y;
                let weight = norm * (-offset.length_squared() / two_sigma_sq).exp();
                gradient += offset * (v * weight);
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let count = ((2 * r + 1) * (2 * r + 1)) as f64;
        let corrected_mass = min.mul_add(-count, m00);
        let center_of_mass = if corrected_mass > 0.0 {
            Vec2::new(m10, m01) * (1.0 / corrected_mass)
        } else {
            Vec2::ZERO
        };

        let direction = gradient.normalized();
        let step = direction * center_of_mass.dot(direction);
        match self.contrast {
            VesselContrast::DarkOnLight => step,
            VesselContrast::LightOnDark => -step,
        }
    }

    /// Local vessel width at `point` for a curve running along
    /// `tangent` (unit length).
    ///
    /// The profile spans `expected_radius` plus the kernel support on
    /// each side of the point. Responses within rounding noise of zero
    /// are ignored; a profile without any edge response measures zero.
    #[allow(clippy::cast_precision_loss)]
    pub fn width_at(&mut self, point: Vec2, tangent: Vec2, expected_radius: f64) -> f64 {
        let raster = self.raster;
        let bucket = sigma_bucket(expected_radius);
        let kernel = self.kernels[bucket].get_or_insert_with(|| EdgeKernel::new(SIGMAS[bucket]));

        let reach = (expected_radius + kernel.radius_px() as f64) * SAMPLES_PER_PIXEL as f64;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let half = (reach + 0.5).max(0.0) as usize;
        let normal = tangent.perpendicular();

        let samples: Vec<f64> = (0..=2 * half)
            .map(|i| {
                let distance = (i as f64 - half as f64) / SAMPLES_PER_PIXEL as f64;
                raster.value_at(point + normal * distance)
            })
            .collect();
        let response = kernel.convolve(&samples);

        let noise = samples.iter().fold(0.0_f64, |m, v| m.max(v.abs())) * RESPONSE_NOISE;
        let mut min = (-noise, None);
        let mut max = (noise, None);
        for (i, &value) in response.iter().enumerate() {
            if value < min.0 {
                min = (value, Some(i));
            }
            if value > max.0 {
                max = (value, Some(i));
            }
        }

        match (min.1, max.1) {
            (Some(lo), Some(hi)) => lo.abs_diff(hi) as f64 / SAMPLES_PER_PIXEL as f64,
            _ => 0.0,
        }
    }

    #[cfg(test)]
    fn cached_kernels(&self) -> usize {
        self.kernels.iter().filter(|k| k.is_some()).count()
    }
}
