//! # Perspective warp
//!
//! A 4-point homography mapping a trapezoid of the forward camera image onto a rectangle of a
//! top-down image. This is what turns the camera view into a bird's eye view of the ground.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::{Rgb, RgbImage};
use nalgebra::{DMatrix, DVector, Matrix3, Point2, Vector3};

use super::PerError;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A precomputed perspective transform between two quads.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveWarp {
    /// Homography taking source image points to destination image points
    forward: Matrix3<f64>,

    /// Homography taking destination image points back to the source image
    inverse: Matrix3<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PerspectiveWarp {
    /// Build the warp mapping each point in `src` onto the point at the same index in `dst`.
    pub fn new(src: &[Point2<f64>; 4], dst: &[Point2<f64>; 4]) -> Result<Self, PerError> {
        // Solve for the 8 unknowns of the homography, with the bottom right element fixed at 1
        let mut a = DMatrix::<f64>::zeros(8, 8);
        let mut b = DVector::<f64>::zeros(8);

        for i in 0..4 {
            let (x, y) = (src[i].x, src[i].y);
            let (u, v) = (dst[i].x, dst[i].y);

            let r = 2 * i;
            a[(r, 0)] = x;
            a[(r, 1)] = y;
            a[(r, 2)] = 1.0;
            a[(r, 6)] = -x * u;
            a[(r, 7)] = -y * u;
            b[r] = u;

            a[(r + 1, 3)] = x;
            a[(r + 1, 4)] = y;
            a[(r + 1, 5)] = 1.0;
            a[(r + 1, 6)] = -x * v;
            a[(r + 1, 7)] = -y * v;
            b[r + 1] = v;
        }

        let h = a.lu().solve(&b).ok_or(PerError::DegenerateWarp)?;

        if h.iter().any(|e| !e.is_finite()) {
            return Err(PerError::DegenerateWarp);
        }

        let forward = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0);
        let inverse = forward.try_inverse().ok_or(PerError::DegenerateWarp)?;

        Ok(Self { forward, inverse })
    }

    /// Map a source image point into the destination image.
    ///
    /// Returns `None` if the point maps to infinity.
    pub fn transform(&self, point: &Point2<f64>) -> Option<Point2<f64>> {
        project(&self.forward, point)
    }

    /// Warp the image into a new image of the same dimensions.
    ///
    /// Every destination pixel is mapped back into the source and bilinearly sampled. Source
    /// samples outside the image are black.
    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        let (width, height) = image.dimensions();

        RgbImage::from_fn(width, height, |x, y| {
            match project(&self.inverse, &Point2::new(x as f64, y as f64)) {
                Some(src) => sample_bilinear(image, &src),
                None => Rgb([0, 0, 0]),
            }
        })
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn project(h: &Matrix3<f64>, point: &Point2<f64>) -> Option<Point2<f64>> {
    let p = h * Vector3::new(point.x, point.y, 1.0);

    if p.z.abs() < std::f64::EPSILON {
        None
    } else {
        Some(Point2::new(p.x / p.z, p.y / p.z))
    }
}

fn sample_bilinear(image: &RgbImage, point: &Point2<f64>) -> Rgb<u8> {
    let (width, height) = image.dimensions();

    if !point.x.is_finite()
        || !point.y.is_finite()
        || point.x <= -1.0
        || point.y <= -1.0
        || point.x >= width as f64
        || point.y >= height as f64
    {
        return Rgb([0, 0, 0]);
    }

    let x0 = point.x.floor();
    let y0 = point.y.floor();
    let fx = point.x - x0;
    let fy = point.y - y0;

    let texel = |x: f64, y: f64| -> [f64; 3] {
        if x < 0.0 || y < 0.0 || x >= width as f64 || y >= height as f64 {
            [0.0; 3]
        } else {
            let p = image.get_pixel(x as u32, y as u32).0;
            [p[0] as f64, p[1] as f64, p[2] as f64]
        }
    };

    let tl = texel(x0, y0);
    let tr = texel(x0 + 1.0, y0);
    let bl = texel(x0, y0 + 1.0);
    let br = texel(x0 + 1.0, y0 + 1.0);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = tl[c] * (1.0 - fx) + tr[c] * fx;
        let bottom = bl[c] * (1.0 - fx) + br[c] * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().max(0.0).min(255.0) as u8;
    }

    Rgb(out)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn assert_close(a: &Point2<f64>, b: &Point2<f64>) {
        assert!((a - b).norm() < 1e-6, "{} != {}", a, b);
    }

    #[test]
    fn test_maps_corners() {
        let src = [
            Point2::new(14.0, 140.0),
            Point2::new(301.0, 140.0),
            Point2::new(200.0, 96.0),
            Point2::new(118.0, 96.0),
        ];
        let dst = [
            Point2::new(155.0, 160.0),
            Point2::new(165.0, 160.0),
            Point2::new(165.0, 150.0),
            Point2::new(155.0, 150.0),
        ];

        let warp = PerspectiveWarp::new(&src, &dst).unwrap();

        for (s, d) in src.iter().zip(dst.iter()) {
            assert_close(&warp.transform(s).unwrap(), d);
        }
    }

    #[test]
    fn test_identity() {
        let quad = [
            Point2::new(0.0, 0.0),
            Point2::new(9.0, 0.0),
            Point2::new(9.0, 9.0),
            Point2::new(0.0, 9.0),
        ];
        let warp = PerspectiveWarp::new(&quad, &quad).unwrap();

        let img = RgbImage::from_fn(10, 10, |x, y| Rgb([(x * 20) as u8, (y * 20) as u8, 7]));
        let out = warp.apply(&img);

        assert_eq!(out, img);
    }

    #[test]
    fn test_degenerate() {
        // Three collinear source points cannot define a homography
        let src = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(3.0, 0.0),
        ];
        let dst = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];

        assert!(matches!(
            PerspectiveWarp::new(&src, &dst),
            Err(PerError::DegenerateWarp)
        ));
    }

    #[test]
    fn test_outside_is_black() {
        // Shift the whole image 100 pixels to the right, so the left of the output has no source
        let src = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let dst = [
            Point2::new(100.0, 0.0),
            Point2::new(101.0, 0.0),
            Point2::new(101.0, 1.0),
            Point2::new(100.0, 1.0),
        ];
        let warp = PerspectiveWarp::new(&src, &dst).unwrap();

        let img = RgbImage::from_pixel(20, 20, Rgb([255, 255, 255]));
        let out = warp.apply(&img);

        assert_eq!(*out.get_pixel(5, 5), Rgb([0, 0, 0]));
    }
}
