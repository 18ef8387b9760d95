//! # Colour classifier
//!
//! Per-pixel channel range tests which turn a top-down image into binary masks.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::{Rgb, RgbImage};
use nalgebra::Point2;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An RGB threshold test.
///
/// A pixel matches if every channel is at or above `low` (when given) and at or below `high`
/// (when given). A threshold with neither bound never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorThresh {
    /// Inclusive lower bound on the R, G and B channels
    pub low: Option<[u8; 3]>,

    /// Inclusive upper bound on the R, G and B channels
    pub high: Option<[u8; 3]>,
}

/// A binary mask the same size as the image it was classified from.
///
/// Indexed `[row, column]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask(pub Array2<bool>);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ColorThresh {
    /// Match pixels with all channels at or above `low`.
    pub fn above(low: [u8; 3]) -> Self {
        Self {
            low: Some(low),
            high: None,
        }
    }

    /// Match pixels with all channels at or below `high`.
    pub fn below(high: [u8; 3]) -> Self {
        Self {
            low: None,
            high: Some(high),
        }
    }

    /// Match pixels with all channels inside `[low, high]`.
    pub fn band(low: [u8; 3], high: [u8; 3]) -> Self {
        Self {
            low: Some(low),
            high: Some(high),
        }
    }

    /// Test a single pixel against the threshold.
    pub fn matches(&self, pixel: &Rgb<u8>) -> bool {
        let px = pixel.0;

        match (self.low, self.high) {
            (None, None) => false,
            (low, high) => (0..3).all(|c| {
                low.map_or(true, |l| px[c] >= l[c]) && high.map_or(true, |h| px[c] <= h[c])
            }),
        }
    }

    /// Classify every pixel of the image into a mask.
    pub fn classify(&self, image: &RgbImage) -> Mask {
        let (width, height) = image.dimensions();

        Mask(Array2::from_shape_fn(
            (height as usize, width as usize),
            |(row, col)| self.matches(image.get_pixel(col as u32, row as u32)),
        ))
    }
}

impl Mask {
    /// Number of set pixels in the mask.
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }

    /// Convert the set pixels of the mask into rover centric coordinates.
    ///
    /// The rover sits at the bottom of the image, in the column equal to the image height. For a
    /// pixel at `(row, col)` in an image of height `H` the rover centric point is
    /// `(|row - H|, -(col - H))`.
    pub fn rover_coords(&self) -> Vec<Point2<f64>> {
        let height = self.0.nrows() as f64;

        self.0
            .indexed_iter()
            .filter(|(_, &set)| set)
            .map(|((row, col), _)| Point2::new((row as f64 - height).abs(), -(col as f64 - height)))
            .collect()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_matches() {
        let nav = ColorThresh::above([118, 93, 89]);
        assert!(nav.matches(&Rgb([200, 200, 200])));
        assert!(nav.matches(&Rgb([118, 93, 89])));
        assert!(!nav.matches(&Rgb([117, 200, 200])));

        let obs = ColorThresh::below([118, 103, 120]);
        assert!(obs.matches(&Rgb([0, 0, 0])));
        assert!(obs.matches(&Rgb([118, 103, 120])));
        assert!(!obs.matches(&Rgb([10, 104, 10])));

        let rock = ColorThresh::band([125, 102, 0], [204, 185, 78]);
        assert!(rock.matches(&Rgb([160, 140, 20])));
        assert!(!rock.matches(&Rgb([160, 140, 79])));
        assert!(!rock.matches(&Rgb([124, 140, 20])));

        let none = ColorThresh {
            low: None,
            high: None,
        };
        assert!(!none.matches(&Rgb([0, 0, 0])));
    }

    #[test]
    fn test_masks_may_overlap() {
        // This pixel is both bright enough to be navigable and dark enough to be an obstacle
        let px = Rgb([118, 100, 100]);
        assert!(ColorThresh::above([118, 93, 89]).matches(&px));
        assert!(ColorThresh::below([118, 103, 120]).matches(&px));
    }

    #[test]
    fn test_classify() {
        let mut img = RgbImage::new(4, 2);
        img.put_pixel(3, 1, Rgb([255, 255, 255]));
        img.put_pixel(0, 0, Rgb([255, 255, 255]));

        let mask = ColorThresh::above([200, 200, 200]).classify(&img);
        assert_eq!(mask.0.dim(), (2, 4));
        assert_eq!(mask.count(), 2);
        assert!(mask.0[[1, 3]]);
        assert!(mask.0[[0, 0]]);
        assert!(!mask.0[[0, 3]]);
    }

    #[test]
    fn test_rover_coords() {
        // 8 wide, 4 high, rover at column 4 of the bottom row
        let mut data = Array2::from_elem((4, 8), false);
        data[[3, 4]] = true;
        data[[0, 4]] = true;
        data[[0, 6]] = true;
        data[[0, 0]] = true;

        let mut pts = Mask(data).rover_coords();
        pts.sort_by(|a, b| (a.x, a.y).partial_cmp(&(b.x, b.y)).unwrap());

        assert_eq!(
            pts,
            vec![
                Point2::new(1.0, 0.0),
                Point2::new(4.0, -2.0),
                Point2::new(4.0, 0.0),
                Point2::new(4.0, 4.0),
            ]
        );
    }
}
