//! vsketch-model: Curve editing engine and vessel fitting (sans-IO).
//!
//! Holds variable-width curves drawn over a grayscale image and snaps
//! them to the vessels in that image:
//! pointer input -> draw/overdraw edits -> smoothing ->
//! centerline fit -> width fit.
//!
//! This crate has **no I/O dependencies** -- images arrive as in-memory
//! buffers or encoded bytes, and file formats live in `vsketch-format`.

pub mod contour;
pub mod curve;
mod edit;
pub mod fit;
pub mod geom;
pub mod model;
pub mod point_list;
pub mod raster;
pub mod smooth;
pub mod types;
pub mod vessel;
pub mod vexel;

pub use contour::Contour;
pub use curve::{Curve, CurveId, EditDirection, EditMode};
pub use fit::{FitReport, WidthReport, fit_to_nearest_vessel, fit_vessel_width};
pub use geom::{CurvePoint, Vec2};
pub use model::Model;
pub use point_list::{PointHandle, PointList};
pub use raster::{Gray16Image, PixelFormat, Raster};
pub use smooth::SmoothingMode;
pub use types::{Dimensions, FitConfig, GrayImage, ModelConfig, RasterError, VesselContrast};
pub use vessel::VesselFitter;
pub use vexel::Vexel;
