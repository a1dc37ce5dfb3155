//! Corner anchoring on the silhouette contour.
//!
//! Segmentation masks are noisy at the pixel level: ragged top edges,
//! fold shadows, stray specks. A single extremal pixel is an
//! outlier-prone statistic, so every anchor here is chosen as the
//! extremal point *within a tolerance band* near the true extremum.
//! Ties inside a band break deterministically, keeping repeated runs
//! byte-identical.

use std::cmp::Reverse;

use image::RgbImage;
use tracing::debug;

use crate::contour;
use crate::types::{MeasureConfig, MeasureError, MeasurementResult, MeasuringMode, Point};

/// Locate waistband and length anchors on the garment outline.
///
/// The first pass (`went_back = false`, mode `skirt_and_shorts`)
/// anchors the length line between the topmost point of the left edge
/// band and the hem tip in the bottom strip. The retry pass
/// (`went_back = true`, mode `recalculated`) is used after an
/// implausibly small first measurement: it reuses the left waistband
/// corner as the upper length anchor, trading precision for
/// robustness on degenerate masks.
///
/// # Errors
///
/// Returns [`MeasureError::NoContourFound`] when the mask has no
/// foreground region. Callers must treat that as a hard failure, not
/// a zero measurement.
pub fn find_corners(
    img: &RgbImage,
    went_back: bool,
    config: &MeasureConfig,
) -> Result<MeasurementResult, MeasureError> {
    let points = contour::outline(img, config)?;

    let y_top = min_of(&points, |p| p.y)?;
    let y_bot = min_of(&points, |p| Reverse(p.y)).map(|y| y.0)?;
    let x_left = min_of(&points, |p| p.x)?;

    // Waistband corners: extremes of the band hanging off the topmost
    // row, not of the single topmost pixel.
    let top_band = i64::from(y_top) + i64::from(config.top_band_px);
    let in_top_band = |p: &&Point| i64::from(p.y) <= top_band;
    let w1 = select(&points, in_top_band, |p| (p.x, p.y))?;
    let w2 = select(&points, in_top_band, |p| (Reverse(p.x), p.y))?;

    // Hem tip: leftmost point of the bottom strip of the contour's
    // vertical extent.
    let band_y = f64::from(y_top) + f64::from(y_bot - y_top) * (1.0 - config.bottom_fraction);
    let bl = select(&points, |p| f64::from(p.y) >= band_y, |p| {
        (p.x, Reverse(p.y))
    })?;

    let width = w1.distance(w2);

    let (l1, mode) = if went_back {
        (w1, MeasuringMode::Recalculated)
    } else {
        // Upper length anchor: topmost point of the vertical band along
        // the left edge.
        let left_band = i64::from(x_left) + i64::from(config.left_band_px);
        let tl_l = select(&points, |p| i64::from(p.x) <= left_band, |p| (p.y, p.x))?;
        (tl_l, MeasuringMode::SkirtAndShorts)
    };
    let length = l1.distance(bl);

    debug!(
        ?w1,
        ?w2,
        l1 = ?l1,
        bl = ?bl,
        width,
        length,
        went_back,
        "anchored silhouette corners",
    );

    Ok(MeasurementResult {
        width,
        length,
        w1,
        w2,
        l1,
        l2: bl,
        measuring_mode: mode,
    })
}

/// Minimum of a key over the contour points.
fn min_of<K: Ord>(points: &[Point], key: impl Fn(&Point) -> K) -> Result<K, MeasureError> {
    points
        .iter()
        .map(|p| key(p))
        .min()
        .ok_or(MeasureError::NoContourFound)
}

/// The point minimizing `key` among points passing `band`.
///
/// The band always contains the extremal point that defined it, so
/// this only fails on an empty contour.
fn select<K: Ord>(
    points: &[Point],
    band: impl Fn(&&Point) -> bool,
    key: impl Fn(&Point) -> K,
) -> Result<Point, MeasureError> {
    points
        .iter()
        .filter(band)
        .min_by_key(|p| key(p))
        .copied()
        .ok_or(MeasureError::NoContourFound)
}
