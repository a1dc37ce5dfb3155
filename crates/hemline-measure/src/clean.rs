//! Mask cleaning: connected component filtering.
//!
//! Background removal leaves speckles, hanger fragments, and price tags
//! around the garment. This module drops every foreground region except
//! the largest one, or every region under a minimum pixel area,
//! resetting rejected pixels to white in place.
//!
//! Works on color masks (`Rgb<u8>`, white = `[255, 255, 255]`) and on
//! pre-binarized single-channel masks (`Luma<u8>`, white = `255`)
//! through the [`Background`] trait.

use image::{ImageBuffer, Luma, Pixel, Rgb};
use imageproc::region_labelling::connected_components;
use tracing::debug;

use crate::types::Connectivity;

/// Pixel formats with a well-known "background" color.
///
/// A pixel is foreground iff it is not exactly the white background
/// value. Near-white halo pixels therefore count as foreground here;
/// the contour stage applies its own near-white cutoff.
pub trait Background: Pixel<Subpixel = u8> {
    /// The pure-white background value for this format.
    const WHITE: Self;

    /// Whether this pixel belongs to the garment.
    fn is_foreground(&self) -> bool;
}

impl Background for Rgb<u8> {
    const WHITE: Self = Rgb([255, 255, 255]);

    fn is_foreground(&self) -> bool {
        self.0 != [255, 255, 255]
    }
}

impl Background for Luma<u8> {
    const WHITE: Self = Luma([255]);

    fn is_foreground(&self) -> bool {
        self.0[0] != 255
    }
}

/// Remove small connected components, or keep only the largest one.
///
/// Labels foreground regions with the given pixel `connectivity`
/// (label 0, the background, is never a candidate). With
/// `keep_largest` every pixel outside the biggest region is reset to
/// white; otherwise every region smaller than `min_size` pixels is.
/// `min_size` is ignored when `keep_largest` is set.
///
/// Mutates `img` in place — the caller owns the buffer and gets it
/// back cleaned. A mask with zero foreground pixels degenerates to an
/// all-white image without error; downstream contour extraction
/// reports that case explicitly.
pub fn filter_components<P: Background>(
    img: &mut ImageBuffer<P, Vec<u8>>,
    min_size: u32,
    keep_largest: bool,
    connectivity: Connectivity,
) {
    let (width, height) = img.dimensions();

    let binary = image::GrayImage::from_fn(width, height, |x, y| {
        if img.get_pixel(x, y).is_foreground() {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    });

    let labels = connected_components(&binary, connectivity.into(), Luma([0u8]));

    // Pixel count per label; index 0 (background) stays zero.
    let mut areas: Vec<u32> = Vec::new();
    for label in labels.pixels() {
        let label = label.0[0] as usize;
        if label == 0 {
            continue;
        }
        if label >= areas.len() {
            areas.resize(label + 1, 0);
        }
        areas[label] += 1;
    }

    if areas.iter().all(|&a| a == 0) {
        debug!("no foreground components in mask");
        return;
    }

    let keep: Vec<bool> = if keep_largest {
        // First label wins ties so repeated runs stay byte-identical.
        let mut largest = 0usize;
        for (label, &area) in areas.iter().enumerate() {
            if area > areas[largest] {
                largest = label;
            }
        }
        areas
            .iter()
            .enumerate()
            .map(|(label, _)| label == largest)
            .collect()
    } else {
        areas.iter().map(|&area| area >= min_size).collect()
    };

    debug!(
        components = areas.iter().filter(|&&a| a > 0).count(),
        kept = keep
            .iter()
            .zip(&areas)
            .filter(|&(&k, &a)| k && a > 0)
            .count(),
        keep_largest,
        "filtered mask components",
    );

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let label = labels.get_pixel(x, y).0[0] as usize;
        if label == 0 || !keep[label] {
            *pixel = P::WHITE;
        }
    }
}
