//! Editing session facade.
//!
//! [`Model`] ties the pieces together the way an interactive front end
//! uses them: pointer gestures become curve edits on the active curve,
//! clicks select curves, and fit commands run against the loaded
//! raster. Screen-space tolerances from [`ModelConfig`] are converted to
//! contour units with the window-to-contour scale the rendering layer
//! reports.

use log::debug;

use crate::contour::Contour;
use crate::fit::{FitReport, WidthReport, fit_to_nearest_vessel, fit_vessel_width};
use crate::geom::{CurvePoint, Vec2};
use crate::raster::Raster;
use crate::types::{ModelConfig, VesselContrast};
use crate::vessel::VesselFitter;

/// Raster, contour and settings of one editing session.
#[derive(Debug, Clone)]
pub struct Model {
    image: Option<Raster>,
    contour: Contour,
    contrast: VesselContrast,
    config: ModelConfig,
    window_to_contour_scale: f64,
    is_drawing: bool,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(ModelConfig::default())
    }
}

impl Model {
    /// Create an empty session.
    #[must_use]
    pub fn new(config: ModelConfig) -> Self {
        Self {
            image: None,
            contour: Contour::new(),
            contrast: VesselContrast::default(),
            config,
            window_to_contour_scale: 1.0,
            is_drawing: false,
        }
    }

    /// Drop the raster and every curve.
    pub fn clear(&mut self) {
        self.image = None;
        self.contour.clear();
        self.is_drawing = false;
    }

    /// Replace the reference raster.
    pub fn set_image(&mut self, image: Raster) {
        self.image = Some(image);
    }

    /// The reference raster, if one is loaded.
    #[must_use]
    pub const fn image(&self) -> Option<&Raster> {
        self.image.as_ref()
    }

    /// The curves.
    #[must_use]
    pub const fn contour(&self) -> &Contour {
        &self.contour
    }

    /// Mutable access to the curves.
    pub const fn contour_mut(&mut self) -> &mut Contour {
        &mut self.contour
    }

    /// Replace the curves, e.g. after loading a file.
    ///
    /// Every curve takes the session's selection radius, so overdrawing
    /// a loaded curve hits it like one drawn here.
    pub fn set_contour(&mut self, contour: Contour) {
        self.contour = contour;
        self.is_drawing = false;
        let radius = self.selection_radius();
        for curve in self.contour.curves_mut() {
            curve.set_selection_radius(radius);
        }
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Replace the session configuration.
    pub const fn set_config(&mut self, config: ModelConfig) {
        self.config = config;
    }

    /// Vessel polarity used by the fit commands.
    #[must_use]
    pub const fn vessel_contrast(&self) -> VesselContrast {
        self.contrast
    }

    /// Set the vessel polarity.
    pub const fn set_vessel_contrast(&mut self, contrast: VesselContrast) {
        self.contrast = contrast;
    }

    /// Contour units per window pixel.
    #[must_use]
    pub const fn window_to_contour_scale(&self) -> f64 {
        self.window_to_contour_scale
    }

    /// Set the contour units per window pixel.
    pub const fn set_window_to_contour_scale(&mut self, scale: f64) {
        self.window_to_contour_scale = scale;
    }

    /// Whether a draw gesture is in progress.
    #[must_use]
    pub const fn is_drawing(&self) -> bool {
        self.is_drawing
    }

    fn selection_radius(&self) -> f64 {
        self.config.selection_radius_px * self.window_to_contour_scale
    }

    fn min_separation(&self) -> f64 {
        self.config.min_separation_px * self.window_to_contour_scale
    }

    /// Begin a stroke at `point`.
    ///
    /// Overdraws the active curve when `point` hits it; otherwise starts
    /// a new curve, which becomes the active one.
    pub fn start_draw(&mut self, point: CurvePoint) {
        let min_separation = self.min_separation();
        self.is_drawing = self
            .contour
            .active_mut()
            .is_some_and(|curve| curve.start_drawing(point, min_separation));

        if !self.is_drawing {
            self.deselect();
            let radius = self.selection_radius();
            let id = self.contour.add_curve();
            if let Some(curve) = self.contour.curve_mut(id) {
                curve.set_selection_radius(radius);
                self.is_drawing = curve.start_drawing(point, min_separation);
            }
        }
    }

    /// Continue the stroke.
    pub fn update_draw(&mut self, point: CurvePoint) {
        if !self.is_drawing {
            return;
        }
        if let Some(curve) = self.contour.active_mut() {
            curve.add_point(point);
        }
    }

    /// Finish the stroke with a last sample.
    pub fn end_draw(&mut self, point: CurvePoint) {
        self.update_draw(point);
        if let Some(curve) = self.contour.active_mut() {
            curve.end_drawing();
        }
        self.is_drawing = false;
    }

    /// Select the first curve hit at `position`.
    ///
    /// Returns `true` on a hit. A miss keeps the current selection.
    pub fn select(&mut self, position: Vec2) -> bool {
        let radius = self.selection_radius();
        self.contour.select_curve(position, radius).is_some()
    }

    /// Clear the selection.
    pub const fn deselect(&mut self) {
        self.contour.deselect();
    }

    /// Delete the selected curve, if any.
    pub fn delete_selected(&mut self) {
        if let Some(id) = self.contour.active_id() {
            self.contour.remove_curve(id);
        }
    }

    /// Snap the selected curve onto the nearest vessel centerline.
    pub fn fit_selected_to_nearest_vessel(&mut self, expected_radius: f64) -> Option<FitReport> {
        let Some(raster) = self.image.as_ref() else {
            debug!("no image loaded, skipping centerline fit");
            return None;
        };
        let Some(curve) = self.contour.active_mut() else {
            debug!("no curve selected, skipping centerline fit");
            return None;
        };
        let fitter = VesselFitter::new(raster, self.contrast);
        fit_to_nearest_vessel(curve, &fitter, expected_radius, &self.config.fit)
    }

    /// Measure the vessel width along the selected curve.
    pub fn fit_selected_vessel_width(&mut self, expected_radius: f64) -> Option<WidthReport> {
        let Some(raster) = self.image.as_ref() else {
            debug!("no image loaded, skipping width fit");
            return None;
        };
        let Some(curve) = self.contour.active_mut() else {
            debug!("no curve selected, skipping width fit");
            return None;
        };
        let mut fitter = VesselFitter::new(raster, self.contrast);
        fit_vessel_width(curve, &mut fitter, expected_radius)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::curve::{CurveId, EditMode};
    use crate::types::GrayImage;
    use image::Luma;

    fn p(x: f64, y: f64) -> CurvePoint {
        CurvePoint::at(x, y, 1.0)
    }

    fn draw(model: &mut Model, from: (f64, f64), to: (f64, f64), steps: u32) {
        model.start_draw(p(from.0, from.1));
        for k in 1..steps {
            let s = f64::from(k) / f64::from(steps);
            model.update_draw(p(from.0 + (to.0 - from.0) * s, from.1 + (to.1 - from.1) * s));
        }
        model.end_draw(p(to.0, to.1));
    }

    #[test]
    fn stroke_creates_an_active_curve() {
        let mut model = Model::default();
        draw(&mut model, (0.0, 0.0), (20.0, 0.0), 10);
        assert!(!model.is_drawing());
        let curve = model.contour().active().unwrap();
        assert_eq!(curve.id(), CurveId(0));
        assert!(curve.len() >= 2);
        assert_eq!(curve.edit_mode(), EditMode::Idle);
        assert!((curve.selection_radius() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stroke_away_from_active_curve_starts_a_new_one() {
        let mut model = Model::default();
        draw(&mut model, (0.0, 0.0), (20.0, 0.0), 10);
        draw(&mut model, (0.0, 30.0), (20.0, 30.0), 10);
        assert_eq!(model.contour().len(), 2);
        assert_eq!(model.contour().active_id(), Some(CurveId(1)));
    }

    #[test]
    fn stroke_from_active_curve_overdraws_it() {
        let mut model = Model::default();
        draw(&mut model, (0.0, 0.0), (20.0, 0.0), 10);
        draw(&mut model, (20.0, 0.0), (30.0, 0.0), 5);
        assert_eq!(model.contour().len(), 1);
        let curve = model.contour().active().unwrap();
        let last = curve.points().iter().last().unwrap();
        assert!((last.position.x - 30.0).abs() < 1e-9);
    }

    #[test]
    fn select_hit_and_miss() {
        let mut model = Model::default();
        draw(&mut model, (0.0, 0.0), (20.0, 0.0), 10);
        draw(&mut model, (0.0, 30.0), (20.0, 30.0), 10);

        assert!(model.select(Vec2::new(10.0, 1.0)));
        assert_eq!(model.contour().active_id(), Some(CurveId(0)));
        assert!(!model.select(Vec2::new(10.0, 15.0)));
        assert_eq!(model.contour().active_id(), Some(CurveId(0)));
    }

    #[test]
    fn scale_widens_selection() {
        let mut model = Model::default();
        draw(&mut model, (0.0, 0.0), (20.0, 0.0), 10);
        model.deselect();
        assert!(!model.select(Vec2::new(10.0, 5.0)));
        model.set_window_to_contour_scale(2.0);
        assert!(model.select(Vec2::new(10.0, 5.0)));
    }

    #[test]
    fn loaded_curves_use_the_session_selection_radius() {
        let mut contour = Contour::new();
        let id = contour.insert_curve(crate::curve::Curve::from_points(
            CurveId(0),
            [p(0.0, 0.0), p(10.0, 0.0), p(20.0, 0.0)],
        ));

        let mut model = Model::default();
        model.set_contour(contour);
        let curve = model.contour().curve(id).unwrap();
        assert!((curve.selection_radius() - 3.0).abs() < f64::EPSILON);

        assert!(model.contour_mut().activate(id));
        model.start_draw(p(22.0, 0.0));
        assert!(model.is_drawing());
        assert_eq!(model.contour().len(), 1);
        assert_eq!(model.contour().active().unwrap().edit_mode(), EditMode::Overdraw);
    }

    #[test]
    fn delete_selected_removes_curve() {
        let mut model = Model::default();
        draw(&mut model, (0.0, 0.0), (20.0, 0.0), 10);
        model.delete_selected();
        assert!(model.contour().is_empty());
        assert!(model.contour().active_id().is_none());
        model.delete_selected();
    }

    #[test]
    fn fits_need_image_and_selection() {
        let mut model = Model::default();
        draw(&mut model, (10.0, 10.0), (40.0, 10.0), 10);
        assert!(model.fit_selected_to_nearest_vessel(1.0).is_none());
        assert!(model.fit_selected_vessel_width(1.0).is_none());

        let img = GrayImage::from_pixel(64, 64, Luma([128]));
        model.set_image(Raster::from_gray_image(img).unwrap());
        model.deselect();
        assert!(model.fit_selected_to_nearest_vessel(1.0).is_none());

        assert!(model.select(Vec2::new(10.0, 10.0)));
        assert!(model.fit_selected_to_nearest_vessel(1.0).is_some());
        assert!(model.fit_selected_vessel_width(1.0).is_some());
    }

    #[test]
    fn clear_drops_everything() {
        let mut model = Model::default();
        model.set_image(Raster::from_gray_image(GrayImage::from_pixel(4, 4, Luma([1]))).unwrap());
        draw(&mut model, (0.0, 0.0), (2.0, 0.0), 4);
        model.clear();
        assert!(model.image().is_none());
        assert!(model.contour().is_empty());
    }

    #[test]
    fn contrast_round_trip() {
        let mut model = Model::default();
        model.set_vessel_contrast(VesselContrast::LightOnDark);
        assert_eq!(model.vessel_contrast(), VesselContrast::LightOnDark);
    }
}
