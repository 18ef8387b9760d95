//! # Perception module
//!
//! Converts the raw camera frame into world map evidence and the scalar sensor summaries used by
//! navigation.
//!
//! Procedure for each frame:
//!  - Blur to suppress noise before thresholding
//!  - Warp the forward camera view into a top down view
//!  - Classify navigable ground, obstacles and samples by colour
//!  - Convert the classified pixels into rover centric and world coordinates
//!  - If the chassis is level, accumulate the world cells into the map
//!  - Recompute the wall distances and the sample sighting

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod color;
pub mod geom;
pub mod warp;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::{imageops, RgbImage};
use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use util::maths::mean;

use crate::{
    map::WorldMapLayer,
    rover_state::{RockSighting, RoverState, WallDistances},
};
use color::ColorThresh;
use geom::{object_distance, pixel_to_world, to_polar, PolarPoint};
use warp::PerspectiveWarp;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Manages the perception pipeline.
#[derive(Debug, Clone)]
pub struct PerMgr {
    pub params: PerParams,

    /// Camera to top down warp, calibrated for the frame size in the parameters
    warp: PerspectiveWarp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerParams {
    /// Standard deviation of the gaussian blur applied to the raw frame, no blur if zero.
    ///
    /// Units: pixels
    pub blur_sigma: f32,

    /// Expected frame width
    pub frame_width: u32,

    /// Expected frame height
    pub frame_height: u32,

    /// Corners of a one cell square on the ground as seen in the raw frame, in the order bottom
    /// left, bottom right, top right, top left.
    ///
    /// Units: pixels, `(x, y)` with `y` down
    pub source_quad: [Point2<f64>; 4],

    /// Half the side of the square `source_quad` maps onto in the top down view. A world map
    /// cell spans twice this many top down pixels.
    ///
    /// Units: pixels
    pub dst_size: f64,

    pub navigable_thresh: ColorThresh,
    pub obstacle_thresh: ColorThresh,
    pub rock_thresh: ColorThresh,

    /// Half width of each wall distance sector.
    ///
    /// Units: degrees
    pub wall_half_width_deg: f64,

    /// Units: degrees
    pub front_sector_deg: f64,

    /// Units: degrees
    pub left_sector_deg: f64,

    /// Units: degrees
    pub right_sector_deg: f64,

    /// Pitch and roll must be within this many degrees of zero for the map to be updated.
    pub stable_band_deg: f64,

    /// Amount added to the observed layer of a cell
    pub evidence_reward: i32,

    /// Amount subtracted from the competing layers of a cell
    pub evidence_penalty: i32,
}

/// Summary of one perception step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerReport {
    pub navigable_px: usize,
    pub obstacle_px: usize,
    pub rock_px: usize,

    /// False if the stability gate skipped the map update
    pub map_updated: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, thiserror::Error)]
pub enum PerError {
    #[error("The provided frame was empty")]
    EmptyFrame,

    #[error("Expected a {expected_w}x{expected_h} frame but got {found_w}x{found_h}")]
    FrameSizeMismatch {
        expected_w: u32,
        expected_h: u32,
        found_w: u32,
        found_h: u32,
    },

    #[error("The perspective warp calibration is degenerate")]
    DegenerateWarp,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PerMgr {
    pub fn new(params: PerParams) -> Result<Self, PerError> {
        let w = params.frame_width as f64;
        let h = params.frame_height as f64;
        let cx = w / 2.0;
        let d = params.dst_size;

        // The ground square sits just in front of the rover, at the bottom centre of the view
        let dst = [
            Point2::new(cx - d, h),
            Point2::new(cx + d, h),
            Point2::new(cx + d, h - 2.0 * d),
            Point2::new(cx - d, h - 2.0 * d),
        ];

        let warp = PerspectiveWarp::new(&params.source_quad, &dst)?;

        Ok(Self { params, warp })
    }

    /// Number of top down pixels per world map cell.
    pub fn world_scale(&self) -> f64 {
        2.0 * self.params.dst_size
    }

    /// Process one frame, updating the map and sensor summaries in `rover`.
    ///
    /// Only the pose fields of `rover` are read. The map is left untouched if the chassis is not
    /// level, but the summaries are always recomputed from this frame.
    pub fn step(&self, frame: &RgbImage, rover: &mut RoverState) -> Result<PerReport, PerError> {
        let (found_w, found_h) = frame.dimensions();

        if found_w == 0 || found_h == 0 {
            return Err(PerError::EmptyFrame);
        }

        if found_w != self.params.frame_width || found_h != self.params.frame_height {
            return Err(PerError::FrameSizeMismatch {
                expected_w: self.params.frame_width,
                expected_h: self.params.frame_height,
                found_w,
                found_h,
            });
        }

        // ---- IMAGE PROCESSING ----

        let warped = if self.params.blur_sigma > 0.0 {
            self.warp.apply(&imageops::blur(frame, self.params.blur_sigma))
        } else {
            self.warp.apply(frame)
        };

        let navigable_rc = self.params.navigable_thresh.classify(&warped).rover_coords();
        let obstacle_rc = self.params.obstacle_thresh.classify(&warped).rover_coords();
        let rock_rc = self.params.rock_thresh.classify(&warped).rover_coords();

        let navigable_w = self.to_world(&navigable_rc, rover);
        let obstacle_w = self.to_world(&obstacle_rc, rover);
        let rock_w = self.to_world(&rock_rc, rover);

        // ---- MAP UPDATE ----

        let map_updated = self.is_stable(rover);

        if map_updated {
            let reward = self.params.evidence_reward;
            let penalty = self.params.evidence_penalty;

            rover.map.add_evidence(
                WorldMapLayer::Obstacle,
                obstacle_w.iter().copied(),
                reward,
                penalty,
            );
            rover
                .map
                .add_evidence(WorldMapLayer::Sample, rock_w.iter().copied(), reward, penalty);
            rover.map.add_evidence(
                WorldMapLayer::Navigable,
                navigable_w.iter().copied(),
                reward,
                penalty,
            );
        } else {
            warn!(
                "Rover not level (pitch {:.1}, roll {:.1}), map update skipped",
                rover.pitch, rover.roll
            );
        }

        // ---- SENSOR SUMMARIES ----

        let obstacle_polar: Vec<PolarPoint> = obstacle_rc.iter().map(to_polar).collect();
        let half_width = self.params.wall_half_width_deg;

        rover.walls = WallDistances {
            front: object_distance(&obstacle_polar, self.params.front_sector_deg, half_width),
            left: object_distance(&obstacle_polar, self.params.left_sector_deg, half_width),
            right: object_distance(&obstacle_polar, self.params.right_sector_deg, half_width),
        };

        rover.rock = rock_sighting(&rock_rc, &rock_w);

        debug!(
            "Walls: front {:?}, left {:?}, right {:?}; rock: {:?}",
            rover.walls.front, rover.walls.left, rover.walls.right, rover.rock
        );

        Ok(PerReport {
            navigable_px: navigable_rc.len(),
            obstacle_px: obstacle_rc.len(),
            rock_px: rock_rc.len(),
            map_updated,
        })
    }

    /// Project rover centric points onto world map cells at the current pose.
    fn to_world(&self, points_rc: &[Point2<f64>], rover: &RoverState) -> Vec<(usize, usize)> {
        let map_size = rover.map.size();
        let scale = self.world_scale();

        points_rc
            .iter()
            .map(|p| pixel_to_world(p, &rover.pos, rover.yaw, map_size, scale))
            .collect()
    }

    /// True if both pitch and roll are within the stable band.
    fn is_stable(&self, rover: &RoverState) -> bool {
        let band = self.params.stable_band_deg;
        let in_band = |a: f64| (a >= 0.0 && a <= band) || (a >= 360.0 - band && a < 360.0);

        in_band(rover.pitch) && in_band(rover.roll)
    }
}

impl Default for PerParams {
    fn default() -> Self {
        Self {
            blur_sigma: 2.0,
            frame_width: 320,
            frame_height: 160,
            source_quad: [
                Point2::new(14.0, 140.0),
                Point2::new(301.0, 140.0),
                Point2::new(200.0, 96.0),
                Point2::new(118.0, 96.0),
            ],
            dst_size: 5.0,
            navigable_thresh: ColorThresh::above([118, 93, 89]),
            obstacle_thresh: ColorThresh::below([118, 103, 120]),
            rock_thresh: ColorThresh::band([125, 102, 0], [204, 185, 78]),
            wall_half_width_deg: 3.0,
            front_sector_deg: 0.0,
            left_sector_deg: 35.0,
            right_sector_deg: -35.0,
            stable_band_deg: 2.0,
            evidence_reward: 5,
            evidence_penalty: 2,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Summarise the visible sample pixels, `None` if there are none.
fn rock_sighting(rock_rc: &[Point2<f64>], rock_w: &[(usize, usize)]) -> Option<RockSighting> {
    let polar: Vec<PolarPoint> = rock_rc.iter().map(to_polar).collect();

    let dist = mean(polar.iter().map(|p| p.dist))?;
    let angle_deg = mean(polar.iter().map(|p| p.angle_rad))?.to_degrees();
    let x = mean(rock_w.iter().map(|c| c.0 as f64))?;
    let y = mean(rock_w.iter().map(|c| c.1 as f64))?;

    Some(RockSighting {
        count: rock_rc.len(),
        dist,
        angle_deg,
        pos_w: Point2::new(x, y),
    })
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
