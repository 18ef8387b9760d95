//! # Rover State
//!
//! The single record shared between perception and navigation. Perception writes the world map
//! and the sensor summaries, navigation reads those and writes the actuator demands, the mode
//! and its own bookkeeping. The control loop owns the one instance and lends it out by exclusive
//! reference, one module at a time.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{
    map::WorldMap,
    nav::{CirclingMonitor, NavMode, SpinBack, StuckMonitor},
    per::geom::FAR_DIST,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Data supplied by the simulator at the start of each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Position in the world frame.
    ///
    /// Units: map cells
    pub pos: Point2<f64>,

    /// Units: degrees, [0, 360)
    pub yaw: f64,

    /// Units: degrees, [0, 360)
    pub pitch: f64,

    /// Units: degrees, [0, 360)
    pub roll: f64,

    /// Forward velocity, negative when reversing.
    pub vel: f64,

    /// True while the simulator is executing a pickup
    pub picking_up: bool,

    /// True when a sample is within reach of the arm
    pub near_sample: bool,
}

/// Demands sent back to the simulator at the end of each tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActuatorDemands {
    /// Normalised throttle, negative for reverse.
    pub throttle: f64,

    /// Units: degrees, positive to the left
    pub steer: f64,

    /// Brake intensity, zero for no braking.
    pub brake: f64,

    /// Request the simulator pick up the nearby sample.
    pub send_pickup: bool,
}

/// Distance to the closest obstacle in each of the three sectors, `None` if the sector is clear.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WallDistances {
    pub front: Option<f64>,
    pub left: Option<f64>,
    pub right: Option<f64>,
}

/// Summary of the sample pixels visible in the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RockSighting {
    /// Number of sample pixels visible. Always greater than zero.
    pub count: usize,

    /// Mean rover centric distance of the sample pixels.
    pub dist: f64,

    /// Mean rover centric angle of the sample pixels, positive to the left.
    ///
    /// Units: degrees
    pub angle_deg: f64,

    /// Mean world position of the sample pixels.
    pub pos_w: Point2<f64>,
}

/// The rover state, see the module documentation.
#[derive(Debug, Clone)]
pub struct RoverState {
    // ---- POSE ----
    pub pos: Point2<f64>,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,

    // ---- KINEMATICS ----
    pub vel: f64,
    pub throttle: f64,
    pub steer: f64,
    pub brake: f64,

    // ---- SIMULATOR FLAGS ----
    pub picking_up: bool,
    pub near_sample: bool,
    pub send_pickup: bool,

    // ---- SENSOR SUMMARIES ----
    pub walls: WallDistances,

    /// `None` when no sample pixel is visible
    pub rock: Option<RockSighting>,

    /// Accumulated evidence of the explored terrain
    pub map: WorldMap,

    // ---- BEHAVIOUR ----
    pub mode: NavMode,

    pub stuck: StuckMonitor,
    pub circling: CirclingMonitor,
    pub spin_back: SpinBack,

    // ---- MISSION ----
    /// Captured on the first tick of [`NavMode::Start`]
    pub starting_pos: Option<Point2<f64>>,

    pub samples_collected: u32,

    /// Captured on entering [`NavMode::ApproachSample`]
    pub target_rock_pos: Option<Point2<f64>>,

    /// Set once the simulator has reported the current pickup in progress
    pub pickup_seen: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            pos: Point2::origin(),
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            vel: 0.0,
            picking_up: false,
            near_sample: false,
        }
    }
}

impl WallDistances {
    /// Front distance, or [`FAR_DIST`] if clear.
    pub fn front(&self) -> f64 {
        self.front.unwrap_or(FAR_DIST)
    }

    /// Left distance, or [`FAR_DIST`] if clear.
    pub fn left(&self) -> f64 {
        self.left.unwrap_or(FAR_DIST)
    }

    /// Right distance, or [`FAR_DIST`] if clear.
    pub fn right(&self) -> f64 {
        self.right.unwrap_or(FAR_DIST)
    }
}

impl RoverState {
    /// Create the state for a new mission with a world map of `map_size` cells per side.
    pub fn new(map_size: usize) -> Self {
        Self {
            pos: Point2::origin(),
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            vel: 0.0,
            throttle: 0.0,
            steer: 0.0,
            brake: 0.0,
            picking_up: false,
            near_sample: false,
            send_pickup: false,
            walls: WallDistances::default(),
            rock: None,
            map: WorldMap::new(map_size),
            mode: NavMode::Start,
            stuck: StuckMonitor::default(),
            circling: CirclingMonitor::default(),
            spin_back: SpinBack::default(),
            starting_pos: None,
            samples_collected: 0,
            target_rock_pos: None,
            pickup_seen: false,
        }
    }

    /// Copy the simulator's telemetry into the state.
    pub fn apply_telemetry(&mut self, telem: &Telemetry) {
        self.pos = telem.pos;
        self.yaw = telem.yaw;
        self.pitch = telem.pitch;
        self.roll = telem.roll;
        self.vel = telem.vel;
        self.picking_up = telem.picking_up;
        self.near_sample = telem.near_sample;
    }

    /// The actuator demands currently held in the state.
    pub fn demands(&self) -> ActuatorDemands {
        ActuatorDemands {
            throttle: self.throttle,
            steer: self.steer,
            brake: self.brake,
            send_pickup: self.send_pickup,
        }
    }

    /// Number of sample pixels in view, zero if none.
    pub fn rock_count(&self) -> usize {
        self.rock.map_or(0, |r| r.count)
    }

    /// Mean distance to the visible sample, zero if none.
    pub fn rock_dist(&self) -> f64 {
        self.rock.map_or(0.0, |r| r.dist)
    }

    /// Mean angle to the visible sample in degrees, zero if none.
    pub fn rock_angle_deg(&self) -> f64 {
        self.rock.map_or(0.0, |r| r.angle_deg)
    }

    /// World position of the visible sample, if any.
    pub fn rock_pos(&self) -> Option<Point2<f64>> {
        self.rock.map(|r| r.pos_w)
    }
}

impl Default for RoverState {
    fn default() -> Self {
        Self::new(crate::map::DEFAULT_MAP_SIZE)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
