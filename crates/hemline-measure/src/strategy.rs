//! Measurement strategy selection and fallback escalation.
//!
//! Two paths exist: the contour-corner path (robust, needs only the
//! mask) and the landmark path (uses the external pose predictor's
//! guide points). Which path serves which category is a policy table,
//! not an if-chain buried in the measuring code, so the landmark path
//! stays testable and re-enableable even while production routes
//! everything through contours.
//!
//! Either path's result passes a plausibility gate: a width or length
//! under the configured floor almost always means a degenerate mask
//! (near-empty foreground, wrong crop) rather than a genuinely tiny
//! garment, and triggers exactly one recalculation pass.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clean::{self, Background};
use crate::corners;
use crate::landmarks::{self, Landmarks};
use crate::types::{
    Category, MeasureConfig, MeasureError, MeasurementResult, MeasuringMode, Point,
};

/// The two measurement paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementStrategy {
    /// Banded corner extraction on the silhouette contour.
    Contour,
    /// Guide point pairs from the external landmark predictor.
    Landmark,
}

/// Policy table mapping categories to strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyPolicy {
    /// Route every category through the contour path. This is the
    /// production default: landmark coordinates proved unreliable on
    /// real rack photos.
    #[default]
    ContourOnly,
    /// Use landmarks where a caller supplies trusted points. Shorts
    /// and skirts stay on the contour path, whose banded corners suit
    /// their rectangular silhouettes better than the sparse bottom
    /// skeletons.
    PreferLandmarks,
}

impl StrategyPolicy {
    /// Resolve the strategy for one category.
    #[must_use]
    pub const fn strategy_for(self, category: Category) -> MeasurementStrategy {
        match self {
            Self::ContourOnly => MeasurementStrategy::Contour,
            Self::PreferLandmarks => match category {
                Category::Shorts | Category::Skirt => MeasurementStrategy::Contour,
                _ => MeasurementStrategy::Landmark,
            },
        }
    }
}

/// Measure a garment mask.
///
/// Cleans the mask in place (keeping only the largest foreground
/// region — hangers and tags never count), resolves the strategy for
/// `category`, measures, and applies the plausibility gate. The
/// landmark path additionally requires `landmarks`; without them the
/// contour path serves every category.
///
/// # Errors
///
/// Returns [`MeasureError::NoContourFound`] when even the fallback
/// pass finds no foreground region. There is no third fallback.
pub fn calculate_measurements(
    img: &mut RgbImage,
    landmarks: Option<&Landmarks>,
    category: Category,
    config: &MeasureConfig,
) -> Result<MeasurementResult, MeasureError> {
    clean::filter_components(img, config.min_component_size, true, config.connectivity);

    let strategy = config.policy.strategy_for(category);
    let primary = match (strategy, landmarks) {
        (MeasurementStrategy::Landmark, Some(landmarks)) => {
            match measure_from_landmarks(img, landmarks, category, config) {
                Some(result) => result,
                None => corners::find_corners(img, false, config)?,
            }
        }
        _ => corners::find_corners(img, false, config)?,
    };

    if primary.width < config.min_plausible_px || primary.length < config.min_plausible_px {
        warn!(
            width = primary.width,
            length = primary.length,
            floor = config.min_plausible_px,
            mode = ?primary.measuring_mode,
            "implausibly small measurement, recalculating once",
        );
        return corners::find_corners(img, true, config);
    }

    debug!(
        width = primary.width,
        length = primary.length,
        mode = ?primary.measuring_mode,
        "measurement accepted",
    );
    Ok(primary)
}

/// Measure from the category's landmark guide points.
///
/// Returns `None` when a width endpoint sits within the configured
/// margin of the image edge — clamped landmarks indicate a failed
/// detector, and the caller falls back to the contour path.
fn measure_from_landmarks(
    img: &RgbImage,
    landmarks: &Landmarks,
    category: Category,
    config: &MeasureConfig,
) -> Option<MeasurementResult> {
    let subset = landmarks.filter_by_category(category);
    let guides = landmarks::guide_indices(category);

    let w1 = subset[guides.width.0];
    let w2 = subset[guides.width.1];
    let dims = img.dimensions();
    if landmarks::near_image_edge(w1, dims, config.landmark_edge_margin)
        || landmarks::near_image_edge(w2, dims, config.landmark_edge_margin)
    {
        warn!(?w1, ?w2, "edge-clamped width landmarks, falling back to contour path");
        return None;
    }
    let width = w1.distance(w2);

    let l1 = subset[guides.length.0];
    let l2 = subset[guides.length.1];

    let (length, l2, mode) = if category.is_bottom() {
        // Shorts, trousers, skirt: the skeleton's length points run
        // along the leg, so the straight distance is the length.
        (l1.distance(l2), l2, MeasuringMode::Landmark)
    } else if category.is_draped() {
        // Long outerwear and dresses drape diagonally; the straight
        // landmark distance underestimates true length. Scan the mask
        // straight down from the upper anchor instead.
        match deepest_foreground_below(img, l1, config.column_tolerance) {
            Some(hem) => (
                f64::from((hem.y - l1.y).abs()),
                hem,
                MeasuringMode::DressesLength,
            ),
            None => (0.0, l1, MeasuringMode::Fail),
        }
    } else {
        // Tops get a strictly vertical guide line: only the y
        // component of the landmark pair counts.
        (f64::from((l2.y - l1.y).abs()), l2, MeasuringMode::Landmark)
    };

    Some(MeasurementResult {
        width,
        length,
        w1,
        w2,
        l1,
        l2,
        measuring_mode: mode,
    })
}

/// Deepest foreground pixel below `from`, within a `tolerance`-wide
/// column around its x coordinate.
///
/// Scans bottom-up and returns the leftmost pixel of the deepest
/// occupied row, so the result is deterministic.
fn deepest_foreground_below(img: &RgbImage, from: Point, tolerance: u32) -> Option<Point> {
    let (width, height) = img.dimensions();
    let tolerance = i64::from(tolerance);

    let x_lo = (i64::from(from.x) - tolerance).clamp(0, i64::from(width) - 1);
    let x_hi = (i64::from(from.x) + tolerance).clamp(0, i64::from(width) - 1);
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let (x_lo, x_hi) = (x_lo as u32, x_hi as u32);

    let y_start = i64::from(from.y) + 1;
    if y_start >= i64::from(height) {
        return None;
    }
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let y_start = y_start.max(0) as u32;

    for y in (y_start..height).rev() {
        for x in x_lo..=x_hi {
            if img.get_pixel(x, y).is_foreground() {
                #[allow(clippy::cast_possible_wrap)]
                return Some(Point::new(x as i32, y as i32));
            }
        }
    }
    None
}
