//! # Geometry kernel
//!
//! Stateless coordinate transforms used to move perceived pixels between the rover frame and the
//! world map frame.
//!
//! Frames:
//! - Rover centric (RC): origin at the rover, `x` forwards, `y` to the left, units of warped
//!   image pixels.
//! - World (W): absolute position on the world map grid, units of map cells.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Point2, Rotation2, Vector2};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Distance used in comparisons when no obstacle lies inside a sector. Effectively unbounded.
pub const FAR_DIST: f64 = 9999.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A point in rover centric polar coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarPoint {
    /// Distance from the rover
    pub dist: f64,

    /// Angle from the rover's forward axis, positive to the left.
    ///
    /// Units: radians
    pub angle_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Rotate a point about the origin by the given yaw in degrees.
pub fn rotate(point: &Point2<f64>, yaw_deg: f64) -> Point2<f64> {
    Rotation2::new(yaw_deg.to_radians()) * point
}

/// Scale a point down by `scale` and then offset it by `origin`.
pub fn translate_and_scale(point: &Point2<f64>, origin: &Point2<f64>, scale: f64) -> Point2<f64> {
    Point2::from(point.coords / scale + origin.coords)
}

/// Convert a rover centric point into a world map cell `(x, y)`.
///
/// The point is rotated by the rover yaw, scaled and translated to the rover position, then
/// truncated to integer cells. Cells falling outside the map are clamped onto its border, so the
/// returned indices are always within `[0, map_size - 1]`.
pub fn pixel_to_world(
    point_rc: &Point2<f64>,
    rov_pos_w: &Point2<f64>,
    yaw_deg: f64,
    map_size: usize,
    scale: f64,
) -> (usize, usize) {
    let rotated = rotate(point_rc, yaw_deg);
    let point_w = translate_and_scale(&rotated, rov_pos_w, scale);

    (
        clamp_to_map(point_w.x, map_size),
        clamp_to_map(point_w.y, map_size),
    )
}

/// Convert a rover centric point into polar coordinates.
pub fn to_polar(point: &Point2<f64>) -> PolarPoint {
    let v: Vector2<f64> = point.coords;

    PolarPoint {
        dist: v.norm(),
        angle_rad: point.y.atan2(point.x),
    }
}

/// Distance to the closest point whose angle lies within `half_width_deg` of `centre_deg`.
///
/// Returns `None` if no point falls inside the sector.
pub fn object_distance(points: &[PolarPoint], centre_deg: f64, half_width_deg: f64) -> Option<f64> {
    let min_angle = (centre_deg - half_width_deg).to_radians();
    let max_angle = (centre_deg + half_width_deg).to_radians();

    points
        .iter()
        .filter(|p| p.angle_rad >= min_angle && p.angle_rad <= max_angle)
        .map(|p| p.dist)
        .fold(None, |min, d| match min {
            Some(m) if m <= d => Some(m),
            _ => Some(d),
        })
}

/// Truncate towards zero and clamp into the map.
fn clamp_to_map(value: f64, map_size: usize) -> usize {
    let max = map_size.saturating_sub(1) as i64;

    (value as i64).max(0).min(max) as usize
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const EPS: f64 = 1e-9;

    fn polar(dist: f64, angle_deg: f64) -> PolarPoint {
        PolarPoint {
            dist,
            angle_rad: angle_deg.to_radians(),
        }
    }

    #[test]
    fn test_rotate() {
        let p = rotate(&Point2::new(1.0, 0.0), 90.0);
        assert!((p.x - 0.0).abs() < EPS);
        assert!((p.y - 1.0).abs() < EPS);

        let p = rotate(&Point2::new(1.0, 1.0), 180.0);
        assert!((p.x + 1.0).abs() < EPS);
        assert!((p.y + 1.0).abs() < EPS);
    }

    #[test]
    fn test_translate_and_scale() {
        let p = translate_and_scale(&Point2::new(20.0, -10.0), &Point2::new(100.0, 50.0), 10.0);
        assert_eq!(p, Point2::new(102.0, 49.0));
    }

    #[test]
    fn test_pixel_to_world() {
        // Straight ahead, facing +x
        assert_eq!(
            pixel_to_world(&Point2::new(55.0, 0.0), &Point2::new(100.0, 100.0), 0.0, 200, 10.0),
            (105, 100)
        );

        // Straight ahead, facing +y
        assert_eq!(
            pixel_to_world(&Point2::new(55.0, 0.0), &Point2::new(100.0, 100.0), 90.0, 200, 10.0),
            (100, 105)
        );
    }

    #[test]
    fn test_pixel_to_world_clamps() {
        let origins = [(0.0, 0.0), (199.9, 199.9), (100.0, 0.5), (3.0, 196.0)];
        let points = [
            (5000.0, 5000.0),
            (-5000.0, 5000.0),
            (-5000.0, -5000.0),
            (160.0, -160.0),
            (0.0, 0.0),
        ];

        for &(ox, oy) in origins.iter() {
            for &(px, py) in points.iter() {
                for yaw in (0..360).step_by(15) {
                    let (x, y) = pixel_to_world(
                        &Point2::new(px, py),
                        &Point2::new(ox, oy),
                        yaw as f64,
                        200,
                        10.0,
                    );
                    assert!(x <= 199);
                    assert!(y <= 199);
                }
            }
        }

        assert_eq!(
            pixel_to_world(&Point2::new(-5000.0, -5000.0), &Point2::new(0.0, 0.0), 0.0, 200, 10.0),
            (0, 0)
        );
        assert_eq!(
            pixel_to_world(&Point2::new(5000.0, 5000.0), &Point2::new(0.0, 0.0), 0.0, 200, 10.0),
            (199, 199)
        );
    }

    #[test]
    fn test_to_polar() {
        let p = to_polar(&Point2::new(3.0, 4.0));
        assert!((p.dist - 5.0).abs() < EPS);
        assert!((p.angle_rad - 4f64.atan2(3.0)).abs() < EPS);

        let p = to_polar(&Point2::new(0.0, 2.0));
        assert!((p.angle_rad - std::f64::consts::FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn test_object_distance_empty_sector() {
        // Nothing at all
        assert_eq!(object_distance(&[], 0.0, 3.0), None);
        assert_eq!(object_distance(&[], 0.0, 3.0).unwrap_or(FAR_DIST), 9999.0);

        // Points only outside the sector
        let points = [polar(10.0, 10.0), polar(12.0, -4.0), polar(3.0, 35.0)];
        assert_eq!(object_distance(&points, 0.0, 3.0), None);
        assert_eq!(object_distance(&points, -35.0, 3.0), None);
    }

    #[test]
    fn test_object_distance_min() {
        let points = [
            polar(40.0, 0.0),
            polar(22.0, 2.5),
            polar(31.0, -2.9),
            polar(5.0, 20.0),
            polar(17.0, 36.0),
            polar(19.0, 33.0),
        ];

        assert_eq!(object_distance(&points, 0.0, 3.0), Some(22.0));
        assert_eq!(object_distance(&points, 35.0, 3.0), Some(17.0));
        assert_eq!(object_distance(&points, -35.0, 3.0), None);
    }
}
