//! Landmark point sets and the per-category lookup tables.
//!
//! An external pose predictor emits one 294-point skeleton covering
//! all thirteen garment categories; each category owns a contiguous
//! index range of it. The guide tables below pick which two points of
//! a category's subset bound the width and length lines. Both tables
//! are part of the predictor's output contract and never change at
//! runtime.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::types::{Category, MeasureError, Point};

/// Number of points in the full skeleton.
pub const LANDMARK_COUNT: usize = 294;

/// A full 294-point landmark set in pixel coordinates.
///
/// Construction validates the point count once so every later lookup
/// can index without checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Landmarks(Vec<Point>);

impl Landmarks {
    /// Wrap a predictor output.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::BadLandmarkCount`] unless exactly
    /// [`LANDMARK_COUNT`] points are supplied.
    pub fn try_new(points: Vec<Point>) -> Result<Self, MeasureError> {
        if points.len() == LANDMARK_COUNT {
            Ok(Self(points))
        } else {
            Err(MeasureError::BadLandmarkCount(points.len()))
        }
    }

    /// All 294 points.
    #[must_use]
    pub fn as_slice(&self) -> &[Point] {
        &self.0
    }

    /// The subset of the skeleton relevant to one category.
    ///
    /// Guide indices from [`guide_indices`] index into this slice,
    /// not into the full skeleton.
    #[must_use]
    pub fn filter_by_category(&self, category: Category) -> &[Point] {
        &self.0[category_nodes(category)]
    }
}

impl TryFrom<Vec<Point>> for Landmarks {
    type Error = MeasureError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::try_new(points)
    }
}

impl From<Landmarks> for Vec<Point> {
    fn from(landmarks: Landmarks) -> Self {
        landmarks.0
    }
}

/// Index range each category owns in the 294-point skeleton.
#[must_use]
pub const fn category_nodes(category: Category) -> Range<usize> {
    match category {
        Category::ShortSleeveTop => 0..25,
        Category::LongSleeveTop => 25..58,
        Category::ShortSleeveOutwear => 58..89,
        Category::LongSleeveOutwear => 89..128,
        Category::Vest => 128..143,
        Category::Sling => 143..158,
        Category::Shorts => 158..168,
        Category::Trousers => 168..182,
        Category::Skirt => 182..190,
        Category::ShortSleeveDress => 190..219,
        Category::LongSleeveDress => 219..256,
        Category::VestDress => 256..275,
        Category::SlingDress => 275..294,
    }
}

/// Which points of a category's landmark subset bound each guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideIndices {
    /// Left and right waistband points.
    pub width: (usize, usize),
    /// Upper and lower length points.
    pub length: (usize, usize),
}

/// Guide point pairs per category, indexing the category subset.
#[must_use]
pub const fn guide_indices(category: Category) -> GuideIndices {
    match category {
        Category::ShortSleeveTop => GuideIndices {
            width: (11, 19),
            length: (1, 14),
        },
        Category::LongSleeveTop => GuideIndices {
            width: (15, 23),
            length: (1, 18),
        },
        Category::ShortSleeveOutwear => GuideIndices {
            width: (11, 19),
            length: (3, 15),
        },
        Category::LongSleeveOutwear => GuideIndices {
            width: (15, 23),
            length: (1, 18),
        },
        Category::Vest => GuideIndices {
            width: (7, 13),
            length: (1, 9),
        },
        Category::Sling => GuideIndices {
            width: (7, 13),
            length: (1, 9),
        },
        Category::Shorts => GuideIndices {
            width: (0, 2),
            length: (5, 6),
        },
        Category::Trousers => GuideIndices {
            width: (0, 2),
            length: (6, 8),
        },
        Category::Skirt => GuideIndices {
            width: (0, 2),
            length: (0, 4),
        },
        Category::ShortSleeveDress => GuideIndices {
            width: (11, 23),
            length: (1, 16),
        },
        Category::LongSleeveDress => GuideIndices {
            width: (15, 27),
            length: (1, 20),
        },
        Category::VestDress => GuideIndices {
            width: (7, 17),
            length: (1, 11),
        },
        Category::SlingDress => GuideIndices {
            width: (7, 17),
            length: (6, 11),
        },
    }
}

/// Whether a landmark sits within `margin` pixels of any image edge.
///
/// Failed detectors clamp landmarks to the frame border; such points
/// disqualify the landmark path for the current request.
#[must_use]
pub fn near_image_edge(point: Point, dimensions: (u32, u32), margin: u32) -> bool {
    let (width, height) = dimensions;
    let margin = i64::from(margin);
    let x = i64::from(point.x);
    let y = i64::from(point.y);
    x < margin
        || y < margin
        || x >= i64::from(width) - margin
        || y >= i64::from(height) - margin
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn all_categories() -> impl Iterator<Item = Category> {
        (1..=13u8).map(|id| Category::from_id(id).unwrap())
    }

    #[test]
    fn node_ranges_tile_the_skeleton() {
        let mut next = 0usize;
        for category in all_categories() {
            let range = category_nodes(category);
            assert_eq!(range.start, next, "{category:?} range must be contiguous");
            next = range.end;
        }
        assert_eq!(next, LANDMARK_COUNT);
    }

    #[test]
    fn guide_indices_fit_their_category_subset() {
        for category in all_categories() {
            let len = category_nodes(category).len();
            let guides = guide_indices(category);
            for idx in [
                guides.width.0,
                guides.width.1,
                guides.length.0,
                guides.length.1,
            ] {
                assert!(
                    idx < len,
                    "{category:?} guide index {idx} outside subset of {len}",
                );
            }
        }
    }

    #[test]
    fn wrong_point_count_is_rejected() {
        let result = Landmarks::try_new(vec![Point::new(0, 0); 10]);
        assert_eq!(result, Err(MeasureError::BadLandmarkCount(10)));
    }

    #[test]
    fn filter_by_category_returns_the_owned_range() {
        // Stamp each point with its own index so slices are checkable.
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let points: Vec<Point> = (0..LANDMARK_COUNT)
            .map(|i| Point::new(i as i32, 0))
            .collect();
        let landmarks = Landmarks::try_new(points).unwrap();

        let skirt = landmarks.filter_by_category(Category::Skirt);
        assert_eq!(skirt.len(), 8);
        assert_eq!(skirt[0], Point::new(182, 0));
        assert_eq!(skirt[7], Point::new(189, 0));
    }

    #[test]
    fn edge_margin_detects_clamped_landmarks() {
        let dims = (640, 480);
        assert!(near_image_edge(Point::new(5, 100), dims, 10));
        assert!(near_image_edge(Point::new(100, 3), dims, 10));
        assert!(near_image_edge(Point::new(635, 100), dims, 10));
        assert!(near_image_edge(Point::new(100, 475), dims, 10));
        assert!(!near_image_edge(Point::new(320, 240), dims, 10));
        assert!(!near_image_edge(Point::new(10, 10), dims, 10));
    }

    #[test]
    fn landmarks_serde_round_trip() {
        let points: Vec<Point> = (0..LANDMARK_COUNT)
            .map(|i| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                Point::new(i as i32, (i * 2) as i32)
            })
            .collect();
        let landmarks = Landmarks::try_new(points).unwrap();
        let json = serde_json::to_string(&landmarks).unwrap();
        let back: Landmarks = serde_json::from_str(&json).unwrap();
        assert_eq!(landmarks, back);
    }
}
