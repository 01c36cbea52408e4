//! SVG export serializer.
//!
//! Each curve becomes one closed `<path>` tracing its outline: the
//! resampled centerline offset by the local radius to one side, then
//! back along the other side. The document uses image pixel
//! coordinates, so the SVG can be laid over the reference image.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Path, Title};
use svg::node::{Text, Value};

use vsketch_model::{Contour, CurvePoint, Dimensions, Vec2};

/// Metadata to embed in the SVG document.
///
/// When present, `<title>` and `<desc>` elements are emitted right after
/// the opening `<svg>` tag. Text values are XML-escaped by the `svg`
/// crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, typically the source image name.
    pub title: Option<&'a str>,

    /// Free-form description, e.g. fit parameters.
    pub description: Option<&'a str>,
}

/// Outline polygon of a resampled curve.
///
/// Each sample is offset by its radius along the normal of the local
/// direction (central difference, one-sided at the ends). The left side
/// runs forward and the right side backward. Fewer than two samples give
/// an empty outline.
#[must_use]
pub fn outline(samples: &[CurvePoint]) -> Vec<Vec2> {
    let n = samples.len();
    if n < 2 {
        return Vec::new();
    }
    let normals: Vec<Vec2> = (0..n)
        .map(|i| {
            let ahead = samples[(i + 1).min(n - 1)].position;
            let behind = samples[i.saturating_sub(1)].position;
            (ahead - behind).normalized().perpendicular()
        })
        .collect();

    let left = samples
        .iter()
        .zip(&normals)
        .map(|(s, &normal)| s.position + normal * s.radius);
    let right = samples
        .iter()
        .zip(&normals)
        .rev()
        .map(|(s, &normal)| s.position - normal * s.radius);
    left.chain(right).collect()
}

/// Build the closed path `d` attribute for an outline.
///
/// Returns an empty string for fewer than 2 vertices.
#[must_use]
pub fn build_outline_data(outline: &[Vec2]) -> String {
    let Some((first, rest)) = outline.split_first() else {
        return String::new();
    };
    if rest.is_empty() {
        return String::new();
    }
    let mut data = Data::new().move_to((first.x, first.y));
    for p in rest {
        data = data.line_to((p.x, p.y));
    }
    String::from(Value::from(data.close()))
}

/// Serialize every curve of `contour` into an SVG string.
///
/// Curves are resampled at `spacing` contour units (see
/// [`Curve::sampled_points`](vsketch_model::Curve::sampled_points)).
/// Curves with fewer than two points produce no path.
#[must_use]
pub fn to_svg(
    contour: &Contour,
    dimensions: Dimensions,
    spacing: f64,
    metadata: &SvgMetadata<'_>,
) -> String {
    let w = dimensions.width;
    let h = dimensions.height;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    for curve in contour.curves() {
        let d = build_outline_data(&outline(&curve.sampled_points(spacing)));
        if d.is_empty() {
            continue;
        }
        let path = Path::new()
            .set("id", format!("curve-{}", curve.id()))
            .set("d", d)
            .set("fill", "none")
            .set("stroke", "black")
            .set("stroke-width", 1);
        doc = doc.add(path);
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vsketch_model::{Curve, CurveId};

    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    fn contour_with(points: &[(f64, f64, f64)]) -> Contour {
        let mut contour = Contour::new();
        contour.insert_curve(Curve::from_points(
            CurveId(0),
            points.iter().map(|&(x, y, r)| CurvePoint::at(x, y, r)),
        ));
        contour
    }

    #[test]
    fn outline_of_straight_segment() {
        let samples = [CurvePoint::at(0.0, 0.0, 1.0), CurvePoint::at(4.0, 0.0, 2.0)];
        let ring = outline(&samples);
        assert_eq!(
            ring,
            [
                Vec2::new(0.0, 1.0),
                Vec2::new(4.0, 2.0),
                Vec2::new(4.0, -2.0),
                Vec2::new(0.0, -1.0),
            ]
        );
    }

    #[test]
    fn outline_needs_two_samples() {
        assert!(outline(&[]).is_empty());
        assert!(outline(&[CurvePoint::at(1.0, 1.0, 1.0)]).is_empty());
    }

    #[test]
    fn outline_data_is_closed() {
        let d = build_outline_data(&[Vec2::new(0.0, 1.0), Vec2::new(4.0, 2.0), Vec2::new(4.0, -2.0)]);
        assert!(d.starts_with("M0,1 L4,2 L4,-2"));
        assert!(d.trim_end().ends_with(['z', 'Z']));
        assert_eq!(build_outline_data(&[Vec2::new(1.0, 1.0)]), "");
    }

    #[test]
    fn empty_contour_is_valid_svg_without_paths() {
        let svg = to_svg(&Contour::new(), dims(100, 50), 1.0, &SvgMetadata::default());
        assert!(svg.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(svg.contains(r#"width="100""#));
        assert!(svg.contains(r#"height="50""#));
        assert!(svg.contains(r#"viewBox="0 0 100 50""#));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn straight_curve_outline() {
        let contour = contour_with(&[(0.0, 10.0, 2.0), (10.0, 10.0, 2.0), (20.0, 10.0, 2.0)]);
        let svg = to_svg(&contour, dims(32, 32), 10.0, &SvgMetadata::default());
        assert!(svg.contains(r#"id="curve-0""#));
        assert!(svg.contains("M0,12 L5,12 L10,12 L15,12 L20,12 L20,8 L15,8 L10,8 L5,8 L0,8"));
        assert!(svg.contains(r#"fill="none""#));
    }

    #[test]
    fn single_point_curve_is_skipped() {
        let contour = contour_with(&[(3.0, 3.0, 1.0)]);
        let svg = to_svg(&contour, dims(10, 10), 1.0, &SvgMetadata::default());
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn metadata_is_escaped() {
        let meta = SvgMetadata {
            title: Some("retina <left>"),
            description: Some("passes=10 & factor=0.5"),
        };
        let svg = to_svg(&Contour::new(), dims(10, 10), 1.0, &meta);
        assert!(svg.contains("<title>"));
        assert!(svg.contains("retina &lt;left&gt;"));
        assert!(svg.contains("passes=10 &amp; factor=0.5"));
    }
}
