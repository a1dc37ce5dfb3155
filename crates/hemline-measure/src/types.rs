//! Shared types for the garment measurement pipeline.

use serde::{Deserialize, Serialize};

use crate::strategy::StrategyPolicy;

/// Re-export `RgbImage` so downstream crates can reference garment
/// masks without depending on `image` directly.
pub use image::RgbImage;

/// Re-export `GrayImage` for single-channel (pre-binarized) masks.
pub use image::GrayImage;

/// A 2D point in integer pixel coordinates.
///
/// Origin is the top-left corner; `x` grows rightward, `y` grows
/// downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: i32,
    /// Vertical position (pixels from top edge).
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Accumulates in `i64` so coordinates anywhere in an image cannot
    /// overflow.
    #[must_use]
    pub const fn distance_squared(self, other: Self) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    /// Euclidean distance to another point.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn distance(self, other: Self) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }
}

/// The thirteen DeepFashion2 garment categories.
///
/// Category ids are externally supplied (classifier or caller) as
/// integers 1-13; [`Category::from_id`] is the only way in and rejects
/// anything outside that range. The discriminants match the external
/// contract so the enum serializes as the raw id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Category {
    ShortSleeveTop = 1,
    LongSleeveTop = 2,
    ShortSleeveOutwear = 3,
    LongSleeveOutwear = 4,
    Vest = 5,
    Sling = 6,
    Shorts = 7,
    Trousers = 8,
    Skirt = 9,
    ShortSleeveDress = 10,
    LongSleeveDress = 11,
    VestDress = 12,
    SlingDress = 13,
}

impl Category {
    /// Resolve an externally supplied category id.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::UnknownCategory`] for ids outside 1-13.
    /// Unknown ids must surface as a typed error here, never default to
    /// some category silently.
    pub const fn from_id(id: u8) -> Result<Self, MeasureError> {
        Ok(match id {
            1 => Self::ShortSleeveTop,
            2 => Self::LongSleeveTop,
            3 => Self::ShortSleeveOutwear,
            4 => Self::LongSleeveOutwear,
            5 => Self::Vest,
            6 => Self::Sling,
            7 => Self::Shorts,
            8 => Self::Trousers,
            9 => Self::Skirt,
            10 => Self::ShortSleeveDress,
            11 => Self::LongSleeveDress,
            12 => Self::VestDress,
            13 => Self::SlingDress,
            _ => return Err(MeasureError::UnknownCategory(id)),
        })
    }

    /// The external integer id (1-13).
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Bottoms (shorts, trousers, skirt).
    ///
    /// These get straight length guide lines; every other category gets
    /// a strictly vertical one.
    #[must_use]
    pub const fn is_bottom(self) -> bool {
        matches!(self, Self::Shorts | Self::Trousers | Self::Skirt)
    }

    /// Long outerwear and dresses, which drape diagonally on the rack.
    ///
    /// A straight landmark-to-landmark distance underestimates their
    /// true length, so the landmark path recomputes it by scanning the
    /// mask downward from the upper length anchor.
    #[must_use]
    pub const fn is_draped(self) -> bool {
        matches!(
            self,
            Self::LongSleeveOutwear
                | Self::ShortSleeveDress
                | Self::LongSleeveDress
                | Self::VestDress
                | Self::SlingDress
        )
    }
}

impl TryFrom<u8> for Category {
    type Error = MeasureError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::from_id(id)
    }
}

impl From<Category> for u8 {
    fn from(category: Category) -> Self {
        category.id()
    }
}

/// Which strategy or pass produced a measurement.
///
/// Recorded on every [`MeasurementResult`] for downstream auditing;
/// never inferred after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasuringMode {
    /// First-pass contour corner extraction.
    SkirtAndShorts,
    /// One-shot fallback after an implausibly small measurement.
    Recalculated,
    /// Landmark guide pair, straight or vertical length.
    Landmark,
    /// Landmark width plus mask-scan length for draped garments.
    DressesLength,
    /// The mask scan found no foreground below the length anchor.
    Fail,
}

/// A completed measurement: two pixel distances plus the endpoints
/// they were derived from.
///
/// Constructed fresh per request and immutable once returned.
/// Invariant: `width >= 0.0` and `length >= 0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    /// Waistband span in pixels.
    pub width: f64,
    /// Garment length in pixels.
    pub length: f64,
    /// Left waistband endpoint.
    pub w1: Point,
    /// Right waistband endpoint.
    pub w2: Point,
    /// Upper length endpoint.
    pub l1: Point,
    /// Lower length endpoint (hem tip).
    pub l2: Point,
    /// Which strategy produced this result.
    pub measuring_mode: MeasuringMode,
}

/// Pixel neighborhood used for connected component labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// Horizontal and vertical neighbors only.
    Four,
    /// Diagonal neighbors included.
    #[default]
    Eight,
}

impl From<Connectivity> for imageproc::region_labelling::Connectivity {
    fn from(connectivity: Connectivity) -> Self {
        match connectivity {
            Connectivity::Four => Self::Four,
            Connectivity::Eight => Self::Eight,
        }
    }
}

/// Configuration for the measurement pipeline.
///
/// Every threshold the source hard-coded becomes a named, overridable
/// value here. A config is plain data passed by shared reference into
/// each operation — the pipeline holds no other state, so one config
/// can serve any number of concurrent requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureConfig {
    /// Grayscale cutoff above which a pixel counts as background.
    /// Background removal leaves near-white halos, hence 250 rather
    /// than 255.
    pub white_threshold: u8,

    /// Minimum pixel area for a connected component to survive
    /// cleaning when not keeping only the largest.
    pub min_component_size: u32,

    /// Neighborhood for component labelling.
    pub connectivity: Connectivity,

    /// Radius of the morphological close applied before contour
    /// extraction, merging thin gaps left by segmentation noise.
    pub close_radius: u8,

    /// Vertical tolerance band below the topmost contour row used to
    /// aggregate waistband corner candidates.
    pub top_band_px: u32,

    /// Horizontal tolerance band right of the leftmost contour column
    /// used to anchor the length line's upper endpoint.
    pub left_band_px: u32,

    /// Fraction of the contour's vertical extent treated as the bottom
    /// strip when locating the hem tip (0 < f <= 0.5).
    pub bottom_fraction: f64,

    /// Minimum plausible measurement in pixels. Anything smaller
    /// triggers the single recalculation pass. Deployment-tuned for
    /// full-resolution rack photos; an open question is whether this
    /// should scale with image size instead.
    pub min_plausible_px: f64,

    /// Landmarks closer than this to any image edge are treated as
    /// clamped detector failures and reject the landmark path.
    pub landmark_edge_margin: u32,

    /// Horizontal tolerance of the downward mask scan used for draped
    /// garment lengths.
    pub column_tolerance: u32,

    /// Which measurement strategy serves each category.
    pub policy: StrategyPolicy,
}

impl MeasureConfig {
    /// Default grayscale background cutoff.
    pub const DEFAULT_WHITE_THRESHOLD: u8 = 250;
    /// Default minimum component area in pixels.
    pub const DEFAULT_MIN_COMPONENT_SIZE: u32 = 400;
    /// Default morphological close radius.
    pub const DEFAULT_CLOSE_RADIUS: u8 = 4;
    /// Default waistband tolerance band height.
    pub const DEFAULT_TOP_BAND_PX: u32 = 75;
    /// Default length anchor tolerance band width.
    pub const DEFAULT_LEFT_BAND_PX: u32 = 200;
    /// Default hem strip fraction.
    pub const DEFAULT_BOTTOM_FRACTION: f64 = 0.10;
    /// Default plausibility floor in pixels.
    pub const DEFAULT_MIN_PLAUSIBLE_PX: f64 = 300.0;
    /// Default landmark edge-clamp margin.
    pub const DEFAULT_LANDMARK_EDGE_MARGIN: u32 = 10;
    /// Default mask-scan column tolerance.
    pub const DEFAULT_COLUMN_TOLERANCE: u32 = 5;
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            white_threshold: Self::DEFAULT_WHITE_THRESHOLD,
            min_component_size: Self::DEFAULT_MIN_COMPONENT_SIZE,
            connectivity: Connectivity::default(),
            close_radius: Self::DEFAULT_CLOSE_RADIUS,
            top_band_px: Self::DEFAULT_TOP_BAND_PX,
            left_band_px: Self::DEFAULT_LEFT_BAND_PX,
            bottom_fraction: Self::DEFAULT_BOTTOM_FRACTION,
            min_plausible_px: Self::DEFAULT_MIN_PLAUSIBLE_PX,
            landmark_edge_margin: Self::DEFAULT_LANDMARK_EDGE_MARGIN,
            column_tolerance: Self::DEFAULT_COLUMN_TOLERANCE,
            policy: StrategyPolicy::default(),
        }
    }
}

/// Errors that can occur during measurement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum MeasureError {
    /// No foreground region survived thresholding. Fatal for the
    /// current attempt; never substituted with a zero-valued result,
    /// since zeros silently corrupt downstream statistics.
    #[error("no contour found in the garment mask")]
    NoContourFound,

    /// Category id outside the 1-13 contract.
    #[error("unknown garment category id {0}")]
    UnknownCategory(u8),

    /// A landmark set with the wrong point count.
    #[error("landmark set has {0} points, expected 294")]
    BadLandmarkCount(usize),
}
