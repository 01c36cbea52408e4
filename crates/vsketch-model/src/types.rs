//! Shared types for the vsketch model: configuration, contrast
//! polarity, image dimensions and errors.

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can build rasters without
/// depending on `image` directly.
pub use image::GrayImage;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Intensity polarity of the vessels in the reference image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VesselContrast {
    /// Dark vessels on a light background (e.g. angiograms).
    #[default]
    DarkOnLight,
    /// Light vessels on a dark background.
    LightOnDark,
}

/// Parameters for the iterative centerline fit.
///
/// The defaults were tuned by hand. More passes with a smaller
/// `move_factor` give a tighter fit; fewer passes with a larger factor
/// run faster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Number of relaxation passes over the curve.
    pub passes: usize,

    /// Fraction of each point's attraction vector applied per pass.
    /// Between 0 and 1.
    pub move_factor: f64,
}

impl FitConfig {
    /// Default number of relaxation passes.
    pub const DEFAULT_PASSES: usize = 10;

    /// Default per-pass move fraction.
    pub const DEFAULT_MOVE_FACTOR: f64 = 0.5;
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            passes: Self::DEFAULT_PASSES,
            move_factor: Self::DEFAULT_MOVE_FACTOR,
        }
    }
}

/// Editing and fitting configuration for a [`Model`](crate::Model).
///
/// Distances given in window pixels are converted to contour units with
/// the window-to-contour scale supplied by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Hit-test radius for selecting curves, in window pixels.
    pub selection_radius_px: f64,

    /// Minimum distance between consecutive drawn points, in window
    /// pixels. Closer input is dropped.
    pub min_separation_px: f64,

    /// Centerline fit parameters.
    pub fit: FitConfig,
}

impl ModelConfig {
    /// Default selection radius in window pixels.
    pub const DEFAULT_SELECTION_RADIUS_PX: f64 = 3.0;

    /// Default minimum point separation in window pixels.
    pub const DEFAULT_MIN_SEPARATION_PX: f64 = 2.0;
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            selection_radius_px: Self::DEFAULT_SELECTION_RADIUS_PX,
            min_separation_px: Self::DEFAULT_MIN_SEPARATION_PX,
            fit: FitConfig::default(),
        }
    }
}

/// Errors that can occur while building or decoding a raster.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The sample buffer does not match the stated dimensions.
    #[error("buffer of {len} samples does not match a {width}x{height} image")]
    BufferSize {
        /// Samples supplied.
        len: usize,
        /// Stated width.
        width: u32,
        /// Stated height.
        height: u32,
    },

    /// Width or height is zero.
    #[error("image has zero area ({width}x{height})")]
    ZeroArea {
        /// Stated width.
        width: u32,
        /// Stated height.
        height: u32,
    },
}
