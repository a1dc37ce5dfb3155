//! Measurement overlay: paint guide lines onto an image for review.
//!
//! An overlay is a debugging aid, not a measurement value, so nothing
//! here can fail: endpoints computed against a differently-sized image
//! are clamped into bounds and drawn anyway.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use crate::types::{Category, MeasurementResult, Point};

/// Colors and stroke parameters for the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotateStyle {
    /// Guide line color.
    pub line_color: Rgb<u8>,
    /// Marker color for the two waistband endpoints.
    pub width_marker_color: Rgb<u8>,
    /// Marker color for the two length endpoints.
    pub length_marker_color: Rgb<u8>,
    /// Guide line stroke width in pixels.
    pub thickness: u32,
    /// Endpoint marker radius in pixels.
    pub marker_radius: i32,
}

impl Default for AnnotateStyle {
    fn default() -> Self {
        Self {
            line_color: Rgb([0, 255, 0]),
            width_marker_color: Rgb([255, 0, 0]),
            length_marker_color: Rgb([0, 0, 255]),
            thickness: 5,
            marker_radius: 8,
        }
    }
}

/// Draw the measurement guide lines and endpoint markers onto `img`.
///
/// The waistband line is always the straight `w1`-`w2` segment. The
/// length line is straight only for bottoms (shorts, trousers,
/// skirt); for every other category `l2` is first projected onto
/// `l1`'s column so the drawn guide is strictly vertical — the same
/// policy the landmark strategy applies to top lengths.
///
/// Endpoints are clamped to the image bounds before drawing; stale
/// coordinates from a differently-sized mask degrade to a shifted
/// overlay rather than an error.
pub fn draw_lines(
    img: &mut RgbImage,
    result: &MeasurementResult,
    category: Category,
    style: &AnnotateStyle,
) {
    if img.width() == 0 || img.height() == 0 {
        return;
    }

    let w1 = clamp_to(img, result.w1);
    let w2 = clamp_to(img, result.w2);
    let l1 = clamp_to(img, result.l1);
    let l2 = if category.is_bottom() {
        clamp_to(img, result.l2)
    } else {
        clamp_to(img, Point::new(result.l1.x, result.l2.y))
    };

    draw_thick_segment(img, w1, w2, style.thickness, style.line_color);
    draw_thick_segment(img, l1, l2, style.thickness, style.line_color);

    for p in [w1, w2] {
        draw_filled_circle_mut(img, (p.x, p.y), style.marker_radius, style.width_marker_color);
    }
    for p in [l1, l2] {
        draw_filled_circle_mut(img, (p.x, p.y), style.marker_radius, style.length_marker_color);
    }
}

/// Clamp a point into the image's pixel bounds.
#[allow(clippy::cast_possible_wrap)]
fn clamp_to(img: &RgbImage, p: Point) -> Point {
    Point::new(
        p.x.clamp(0, img.width() as i32 - 1),
        p.y.clamp(0, img.height() as i32 - 1),
    )
}

/// Stroke a segment with the given width.
///
/// `imageproc` draws 1 px segments; a stroke is a fan of parallel
/// segments offset along the segment's minor axis.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
fn draw_thick_segment(img: &mut RgbImage, a: Point, b: Point, thickness: u32, color: Rgb<u8>) {
    let dx = (b.x - a.x).abs();
    let dy = (b.y - a.y).abs();
    let half = (thickness.max(1) as i32 - 1) / 2;
    let spread = -half..=(thickness.max(1) as i32 - 1 - half);

    for offset in spread {
        // Offset along the minor axis so the fan widens the stroke
        // instead of lengthening it.
        let (ox, oy) = if dx >= dy { (0, offset) } else { (offset, 0) };
        draw_line_segment_mut(
            img,
            ((a.x + ox) as f32, (a.y + oy) as f32),
            ((b.x + ox) as f32, (b.y + oy) as f32),
            color,
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::types::MeasuringMode;

    use super::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn sample_result() -> MeasurementResult {
        MeasurementResult {
            width: 260.0,
            length: 223.6,
            w1: Point::new(20, 20),
            w2: Point::new(280, 20),
            l1: Point::new(100, 50),
            l2: Point::new(200, 250),
            measuring_mode: MeasuringMode::SkirtAndShorts,
        }
    }

    fn line_color() -> Rgb<u8> {
        AnnotateStyle::default().line_color
    }

    /// Whether any pixel in the inclusive x-range at `y` carries the
    /// guide line color.
    fn row_has_line(img: &RgbImage, xs: std::ops::RangeInclusive<u32>, y: u32) -> bool {
        xs.into_iter().any(|x| *img.get_pixel(x, y) == line_color())
    }

    #[test]
    fn bottoms_get_the_unprojected_length_segment() {
        let mut img = RgbImage::from_pixel(300, 300, WHITE);
        draw_lines(
            &mut img,
            &sample_result(),
            Category::Trousers,
            &AnnotateStyle::default(),
        );

        // Midpoint of the diagonal l1-l2 segment.
        assert!(row_has_line(&img, 146..=154, 150), "diagonal length line missing");
    }

    #[test]
    fn non_bottoms_get_a_strictly_vertical_length_segment() {
        let mut img = RgbImage::from_pixel(300, 300, WHITE);
        draw_lines(
            &mut img,
            &sample_result(),
            Category::LongSleeveTop,
            &AnnotateStyle::default(),
        );

        // The projected guide runs down l1's column.
        assert!(row_has_line(&img, 96..=104, 150), "vertical length line missing");
        // Nothing drawn along the original diagonal mid-section.
        assert!(
            !row_has_line(&img, 140..=160, 150),
            "diagonal must be projected away for tops",
        );
    }

    #[test]
    fn waistband_line_is_always_drawn() {
        for category in [Category::Trousers, Category::LongSleeveTop] {
            let mut img = RgbImage::from_pixel(300, 300, WHITE);
            draw_lines(&mut img, &sample_result(), category, &AnnotateStyle::default());
            assert!(row_has_line(&img, 140..=160, 20), "waistband line missing");
        }
    }

    #[test]
    fn endpoint_markers_use_distinct_colors() {
        let mut img = RgbImage::from_pixel(300, 300, WHITE);
        let style = AnnotateStyle::default();
        draw_lines(&mut img, &sample_result(), Category::Trousers, &style);

        assert_eq!(*img.get_pixel(20, 20), style.width_marker_color);
        assert_eq!(*img.get_pixel(280, 20), style.width_marker_color);
        assert_eq!(*img.get_pixel(100, 50), style.length_marker_color);
        assert_eq!(*img.get_pixel(200, 250), style.length_marker_color);
    }

    #[test]
    fn projected_marker_lands_on_the_projected_endpoint() {
        let mut img = RgbImage::from_pixel(300, 300, WHITE);
        let style = AnnotateStyle::default();
        draw_lines(&mut img, &sample_result(), Category::LongSleeveTop, &style);

        // l2 projected to (l1.x, l2.y) = (100, 250).
        assert_eq!(*img.get_pixel(100, 250), style.length_marker_color);
    }

    #[test]
    fn out_of_bounds_endpoints_are_clamped_not_fatal() {
        let mut img = RgbImage::from_pixel(100, 100, WHITE);
        let stale = MeasurementResult {
            width: 1.0,
            length: 1.0,
            w1: Point::new(-50, -50),
            w2: Point::new(500, -3),
            l1: Point::new(-20, 500),
            l2: Point::new(500, 500),
            measuring_mode: MeasuringMode::Recalculated,
        };
        let style = AnnotateStyle::default();
        draw_lines(&mut img, &stale, Category::Skirt, &style);

        // Clamped corners get their markers at the frame corners.
        assert_eq!(*img.get_pixel(0, 0), style.width_marker_color);
        assert_eq!(*img.get_pixel(99, 99), style.length_marker_color);
    }

    #[test]
    fn zero_sized_image_is_ignored() {
        let mut img = RgbImage::new(0, 0);
        draw_lines(
            &mut img,
            &sample_result(),
            Category::Skirt,
            &AnnotateStyle::default(),
        );
        assert_eq!(img.dimensions(), (0, 0));
    }

    #[test]
    fn annotation_never_mutates_the_result() {
        // Guard against drawing code "fixing up" endpoints in place.
        let result = sample_result();
        let copy = result;
        let mut img = RgbImage::from_pixel(300, 300, WHITE);
        draw_lines(&mut img, &result, Category::Skirt, &AnnotateStyle::default());
        assert_eq!(result, copy);
    }
}
