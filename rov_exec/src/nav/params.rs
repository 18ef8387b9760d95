//! Navigation parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::monitor::StuckThreshold;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the navigation decision engine.
///
/// All distances are in rover centric warped image pixels, as produced by perception, except
/// `home_radius` which is in world map cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavParams {
    // ---- ACTUATION ----
    /// Full throttle setting
    pub throttle_set: f64,

    /// Brake setting used when stopping
    pub brake_set: f64,

    /// Maximum velocity. The speed profiles cut the throttle above fractions of this.
    pub max_vel: f64,

    /// Velocity magnitude at or below which the rover is considered stopped
    pub stopped_vel_tol: f64,

    /// Steering limit outside of avoidance manoeuvres.
    ///
    /// Units: degrees
    pub steer_limit_deg: f64,

    /// Steer used while following the wall inside the target band.
    ///
    /// Units: degrees
    pub crawl_steer_deg: f64,

    /// Steer used while turning away from a wall, may exceed `steer_limit_deg`.
    ///
    /// Units: degrees
    pub turn_away_steer_deg: f64,

    // ---- WALLS ----
    /// Front wall closer than this slows the rover and triggers avoidance steering
    pub front_near_dist: f64,

    /// Front or right wall closer than this forces a stop
    pub too_close_dist: f64,

    /// Front distance above which a turn away is complete
    pub front_clear_dist: f64,

    /// Side wall closer than this steers the rover away from it
    pub side_near_dist: f64,

    /// Left wall further than this steers the rover towards it
    pub left_far_dist: f64,

    // ---- SAMPLES ----
    /// Samples with a bearing above this angle are candidates for pickup.
    ///
    /// Units: degrees
    pub sample_min_angle_deg: f64,

    /// Samples closer than this are worth stopping for
    pub sample_nearby_dist: f64,

    /// Samples closer than this are approached at slow speed
    pub pickup_zone_dist: f64,

    /// Number of samples after which the rover returns home
    pub samples_target: u32,

    // ---- HOMING ----
    /// Distance from the starting position at which the rover is home.
    ///
    /// Units: map cells
    pub home_radius: f64,

    /// Heading error to home under which the rover drives straight.
    ///
    /// Units: degrees
    pub home_align_tol_deg: f64,

    // ---- FAILURE DETECTION ----
    /// Stuck detection used in all modes except a slow sample approach
    pub stuck: StuckThreshold,

    /// Stuck detection used during a slow sample approach
    pub stuck_fine: StuckThreshold,

    /// Number of consecutive identical nonzero steers above which the rover is circling
    pub circling_limit: u32,

    /// Recovery manoeuvre choices
    pub spin_back: SpinBackParams,

    /// Seed for the recovery random number generator. If `None` it is seeded from entropy.
    pub rng_seed: Option<u64>,
}

/// Choice tables for the spin back recovery manoeuvre, each entry equally likely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinBackParams {
    /// Candidate throttles, zero or negative
    pub throttles: Vec<f64>,

    /// Candidate steers.
    ///
    /// Units: degrees
    pub steers_deg: Vec<f64>,

    /// Candidate durations.
    ///
    /// Units: ticks
    pub durations: Vec<u32>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for NavParams {
    fn default() -> Self {
        Self {
            throttle_set: 0.2,
            brake_set: 10.0,
            max_vel: 2.0,
            stopped_vel_tol: 0.0,
            steer_limit_deg: 15.0,
            crawl_steer_deg: 5.0,
            turn_away_steer_deg: -30.0,
            front_near_dist: 25.0,
            too_close_dist: 10.0,
            front_clear_dist: 30.0,
            side_near_dist: 20.0,
            left_far_dist: 35.0,
            sample_min_angle_deg: -15.0,
            sample_nearby_dist: 40.0,
            pickup_zone_dist: 15.0,
            samples_target: 6,
            home_radius: 5.0,
            home_align_tol_deg: 5.0,
            stuck: StuckThreshold {
                tolerance: 0.05,
                dwell_ticks: 200,
            },
            stuck_fine: StuckThreshold {
                tolerance: 0.01,
                dwell_ticks: 50,
            },
            circling_limit: 500,
            spin_back: SpinBackParams::default(),
            rng_seed: None,
        }
    }
}

impl Default for SpinBackParams {
    fn default() -> Self {
        Self {
            // Mostly zero, so the rover is more likely to turn on the spot than to reverse
            throttles: vec![0.0, 0.0, 0.0, 0.0, -0.1, -0.2, -0.3, -0.4],
            steers_deg: vec![-15.0, -10.0, -5.0, 5.0, 10.0, 15.0],
            durations: vec![50, 100, 200, 300, 500],
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
