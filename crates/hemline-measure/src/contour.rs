//! Silhouette extraction: from a cleaned mask to the garment outline.
//!
//! Binarizes at a near-white cutoff (segmentation halos keep the
//! background from being exactly white), closes thin gaps with a
//! morphological dilate-then-erode, then border-follows the external
//! contours and keeps the one enclosing the greatest area.

use image::{GrayImage, RgbImage};
use imageproc::contours::{BorderType, Contour, find_contours_with_threshold};
use imageproc::contrast::{ThresholdType, threshold};
use imageproc::distance_transform::Norm;
use imageproc::morphology::close;

use crate::types::{MeasureConfig, MeasureError, Point};

/// Threshold a color mask into a binary foreground map and close it.
///
/// Pixels at or below `white_threshold` in grayscale are foreground
/// (255); everything brighter is background (0). The morphological
/// close merges gaps narrower than roughly twice `close_radius`,
/// which segmentation noise routinely cuts into thin straps and hems.
#[must_use = "returns the binary foreground map"]
pub fn binarize(img: &RgbImage, config: &MeasureConfig) -> GrayImage {
    let gray = image::imageops::grayscale(img);
    let binary = threshold(&gray, config.white_threshold, ThresholdType::BinaryInverted);
    if config.close_radius == 0 {
        return binary;
    }
    close(&binary, Norm::L1, config.close_radius)
}

/// Extract the garment outline from a cleaned mask.
///
/// Convenience composition of [`binarize`] and [`largest_outline`].
///
/// # Errors
///
/// Returns [`MeasureError::NoContourFound`] when thresholding leaves
/// no foreground region at all.
pub fn outline(img: &RgbImage, config: &MeasureConfig) -> Result<Vec<Point>, MeasureError> {
    largest_outline(&binarize(img, config))
}

/// Find the external contour enclosing the greatest area.
///
/// Only outer borders without a parent are considered, so holes and
/// nested artifacts never win. The returned point list is the border
/// in tracing order; it is closed but not guaranteed convex or simple
/// (garment folds produce concavities).
///
/// # Errors
///
/// Returns [`MeasureError::NoContourFound`] when the mask has no
/// foreground pixels.
pub fn largest_outline(mask: &GrayImage) -> Result<Vec<Point>, MeasureError> {
    let contours: Vec<Contour<u32>> = find_contours_with_threshold(mask, 0);

    let mut best: Option<(f64, &Contour<u32>)> = None;
    for contour in &contours {
        if contour.border_type != BorderType::Outer || contour.parent.is_some() {
            continue;
        }
        let area = enclosed_area(&contour.points);
        // Strictly-greater comparison keeps the first contour on ties,
        // so repeated runs agree.
        match best {
            Some((best_area, _)) if area <= best_area => {}
            _ => best = Some((area, contour)),
        }
    }

    let (_, contour) = best.ok_or(MeasureError::NoContourFound)?;
    Ok(contour
        .points
        .iter()
        .map(|p| {
            #[allow(clippy::cast_possible_wrap)]
            Point::new(p.x as i32, p.y as i32)
        })
        .collect())
}

/// Area enclosed by a closed point sequence, via the shoelace formula.
///
/// Hand-rolled rather than pulling in a geometry crate for one sum.
/// Degenerate contours (points, straight runs) get area zero, which
/// still lets them win when they are the only candidates.
fn enclosed_area(points: &[imageproc::point::Point<u32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut doubled: i64 = 0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        doubled += i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y);
    }
    #[allow(clippy::cast_precision_loss)]
    let area = doubled.unsigned_abs() as f64 / 2.0;
    area
}
