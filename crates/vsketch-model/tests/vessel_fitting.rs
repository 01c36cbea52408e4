//! Integration test: draw a stroke beside a synthetic vessel and fit it.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use image::Luma;
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use vsketch_model::{CurvePoint, GrayImage, Model, Raster, Vec2, VesselContrast};

/// 80x80 light background with a dark vertical vessel over columns
/// 36..=43.
fn vessel_raster() -> Raster {
    let mut img = GrayImage::from_pixel(80, 80, Luma([220]));
    draw_filled_rect_mut(&mut img, Rect::at(36, 0).of_size(8, 80), Luma([40]));
    Raster::from_gray_image(img).unwrap()
}

fn draw_vertical(model: &mut Model, x: f64) {
    model.start_draw(CurvePoint::at(x, 20.0, 1.0));
    for k in 1..10 {
        model.update_draw(CurvePoint::at(x, 20.0 + 4.0 * f64::from(k), 1.0));
    }
    model.end_draw(CurvePoint::at(x, 60.0, 1.0));
}

#[test]
fn stroke_snaps_to_vessel_and_picks_up_its_width() {
    let mut model = Model::default();
    model.set_image(vessel_raster());
    draw_vertical(&mut model, 37.5);

    let fit = model
        .fit_selected_to_nearest_vessel(1.0)
        .expect("active curve and image are present");
    assert!(fit.max_displacement > 0.5);
    for p in model.contour().active().unwrap().points().iter() {
        assert!((p.position.x - 39.5).abs() < 1.0, "{p:?}");
    }

    let width = model
        .fit_selected_vessel_width(4.0)
        .expect("curve has enough points");
    assert!((width.mean_radius - 4.0).abs() < 0.1);
    for p in model.contour().active().unwrap().points().iter() {
        assert!((p.radius - 4.0).abs() < 0.1, "{p:?}");
    }
}

#[test]
fn wrong_polarity_pushes_away_from_the_vessel() {
    let mut model = Model::default();
    model.set_image(vessel_raster());
    model.set_vessel_contrast(VesselContrast::LightOnDark);
    draw_vertical(&mut model, 37.5);

    model.fit_selected_to_nearest_vessel(1.0).unwrap();
    for p in model.contour().active().unwrap().points().iter() {
        assert!(p.position.x < 37.5, "{p:?}");
    }
}

#[test]
fn fits_without_selection_do_nothing() {
    let mut model = Model::default();
    model.set_image(vessel_raster());
    draw_vertical(&mut model, 37.5);
    model.deselect();

    assert!(model.fit_selected_to_nearest_vessel(1.0).is_none());
    assert!(model.fit_selected_vessel_width(4.0).is_none());
    assert!(!model.select(Vec2::new(70.0, 70.0)));
    let curve = model.contour().curves().next().unwrap();
    assert!(curve.points().iter().all(|p| (p.position.x - 37.5).abs() < 1e-9));
}
