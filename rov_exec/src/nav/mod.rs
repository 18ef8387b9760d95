//! # Navigation module
//!
//! This module implements the [`NavMgr`] decision engine, a mode dispatch state machine which
//! reads the sensor summaries written by perception and writes the actuator demands and the next
//! mode back into the [`RoverState`]. The modes are:
//!
//! - `Start` - Capture the starting position and drive forward until a wall is found.
//! - `Travel` - Explore by following the left wall, watching for samples.
//! - `BreakLoop` - Drive straight to escape a circling loop.
//! - `TurnAwayOnTravel`, `TurnAwayOnReturn` - Stop and rotate away from a wall that is too close.
//! - `UnstuckOnTravel`, `UnstuckOnReturn`, `UnstuckOnPickup` - Randomised spin back recovery.
//! - `ApproachSample` - Drive onto a sighted sample.
//! - `PickupSample` - Request and wait for a sample pickup.
//! - `ReturnHome` - Drive back to the starting position once enough samples are collected.
//! - `Stop` - Brake to a standstill at home.
//! - `Idle` - Terminal, all actuators held at zero.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod avoid;
pub mod drive;
mod homing;
mod monitor;
mod params;
mod sample;
mod spin_back;
mod start;
mod travel;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

use log::{info, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::rover_state::RoverState;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use self::{
    monitor::{CirclingMonitor, StuckMonitor, StuckThreshold},
    params::{NavParams, SpinBackParams},
    spin_back::{SpinBack, SpinBackOutput},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Navigation manager.
///
/// Holds the parameters and the random number source used by the recovery manoeuvre. All
/// navigation state lives in the [`RoverState`] passed to [`NavMgr::step`].
pub struct NavMgr<R: Rng> {
    pub params: NavParams,

    rng: R,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Behavioural mode of the rover, see the module documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavMode {
    Start,
    Travel,
    BreakLoop,
    TurnAwayOnTravel,
    TurnAwayOnReturn,
    UnstuckOnTravel,
    UnstuckOnReturn,
    UnstuckOnPickup,
    ApproachSample,
    PickupSample,
    ReturnHome,
    Stop,
    Idle,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavMode {
    pub const ALL: [NavMode; 13] = [
        NavMode::Start,
        NavMode::Travel,
        NavMode::BreakLoop,
        NavMode::TurnAwayOnTravel,
        NavMode::TurnAwayOnReturn,
        NavMode::UnstuckOnTravel,
        NavMode::UnstuckOnReturn,
        NavMode::UnstuckOnPickup,
        NavMode::ApproachSample,
        NavMode::PickupSample,
        NavMode::ReturnHome,
        NavMode::Stop,
        NavMode::Idle,
    ];

    /// True for the terminal mode.
    pub fn is_terminal(&self) -> bool {
        matches!(self, NavMode::Idle)
    }
}

impl Display for NavMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NavMode::Start => "start",
            NavMode::Travel => "travel",
            NavMode::BreakLoop => "break_loop",
            NavMode::TurnAwayOnTravel => "turn_away_on_travel",
            NavMode::TurnAwayOnReturn => "turn_away_on_return",
            NavMode::UnstuckOnTravel => "unstuck_on_travel",
            NavMode::UnstuckOnReturn => "unstuck_on_return",
            NavMode::UnstuckOnPickup => "unstuck_on_pickup",
            NavMode::ApproachSample => "approach_sample",
            NavMode::PickupSample => "pickup_sample",
            NavMode::ReturnHome => "return_home",
            NavMode::Stop => "stop",
            NavMode::Idle => "idle",
        };

        write!(f, "{}", name)
    }
}

impl<R: Rng> NavMgr<R> {
    /// Create a new manager drawing recovery choices from `rng`.
    pub fn new(params: NavParams, rng: R) -> Self {
        Self { params, rng }
    }

    /// Run one decision tick on the rover state.
    ///
    /// Exactly one mode step is executed, which writes the actuator demands into `rover` and
    /// returns the mode for the next tick.
    pub fn step(&mut self, rover: &mut RoverState) -> NavMode {
        rover.send_pickup = false;

        let prev = rover.mode;

        let next = match prev {
            NavMode::Start => self.start(rover),
            NavMode::Travel => self.travel(rover),
            NavMode::BreakLoop => self.break_loop(rover),
            NavMode::TurnAwayOnTravel => self.turn_away(rover, NavMode::Travel),
            NavMode::TurnAwayOnReturn => self.turn_away(rover, NavMode::ReturnHome),
            NavMode::UnstuckOnTravel => self.unstuck(rover, NavMode::Travel),
            NavMode::UnstuckOnReturn => self.unstuck(rover, NavMode::ReturnHome),
            NavMode::UnstuckOnPickup => self.unstuck(rover, NavMode::ApproachSample),
            NavMode::ApproachSample => self.approach_sample(rover),
            NavMode::PickupSample => self.pickup_sample(rover),
            NavMode::ReturnHome => self.return_home(rover),
            NavMode::Stop => self.stop(rover),
            NavMode::Idle => self.idle(rover),
        };

        if next != prev {
            info!("NavMgr mode change: {} -> {}", prev, next);
        }

        rover.mode = next;

        trace!(
            "Demands: throttle {:.3}, steer {:.1}, brake {:.1}, pickup {}",
            rover.throttle,
            rover.steer,
            rover.brake,
            rover.send_pickup
        );

        next
    }
}

impl NavMgr<StdRng> {
    /// Create a new manager with a standard generator, seeded from `params.rng_seed` if set or
    /// from entropy otherwise.
    pub fn from_params(params: NavParams) -> Self {
        let rng = match params.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self::new(params, rng)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{per::geom::FAR_DIST, rover_state::RockSighting};
    use nalgebra::Point2;
    use rand::rngs::mock::StepRng;

    pub(super) fn mgr() -> NavMgr<StepRng> {
        NavMgr::new(NavParams::default(), StepRng::new(0, 0))
    }

    pub(super) fn rover_in(mode: NavMode) -> RoverState {
        let mut r = RoverState::new(200);
        r.mode = mode;
        r
    }

    #[test]
    fn test_dispatch_is_total() {
        for mode in NavMode::ALL.iter() {
            let mut m = mgr();
            let mut r = rover_in(*mode);

            let next = m.step(&mut r);

            assert_eq!(next, r.mode);
            assert!(!r.send_pickup || *mode == NavMode::PickupSample);
        }
    }

    #[test]
    fn test_display_names() {
        assert_eq!(NavMode::TurnAwayOnReturn.to_string(), "turn_away_on_return");
        assert_eq!(NavMode::Idle.to_string(), "idle");
        assert!(NavMode::Idle.is_terminal());
        assert!(!NavMode::Stop.is_terminal());
    }

    #[test]
    fn test_start_far_from_wall() {
        let mut m = mgr();
        let mut r = rover_in(NavMode::Start);
        r.walls.front = Some(30.0);

        m.step(&mut r);

        // 30 is outside the near band, keep driving at high speed
        assert_eq!(r.mode, NavMode::Start);
        assert_eq!(r.throttle, 0.2);
        assert_eq!(r.brake, 0.0);
        assert_eq!(r.starting_pos, Some(Point2::origin()));

        // The start is only captured once
        r.pos = Point2::new(5.0, 5.0);
        r.walls.front = Some(20.0);
        m.step(&mut r);
        assert_eq!(r.mode, NavMode::Travel);
        assert_eq!(r.starting_pos, Some(Point2::origin()));
    }

    #[test]
    fn test_travel_wall_ahead_turns_away() {
        let mut m = mgr();
        let mut r = rover_in(NavMode::Travel);
        r.walls.front = Some(5.0);
        r.walls.right = Some(5.0);
        r.vel = 1.0;

        m.step(&mut r);
        assert_eq!(r.mode, NavMode::Travel);
        assert_eq!(r.brake, 10.0);
        assert_eq!(r.throttle, 0.0);

        r.vel = 0.3;
        m.step(&mut r);
        assert_eq!(r.mode, NavMode::Travel);

        r.vel = 0.0;
        m.step(&mut r);
        assert_eq!(r.mode, NavMode::TurnAwayOnTravel);
    }

    #[test]
    fn test_travel_wall_ahead_with_room_on_right() {
        let mut m = mgr();
        let mut r = rover_in(NavMode::Travel);
        r.walls.front = Some(20.0);
        r.vel = 0.5;

        m.step(&mut r);

        assert_eq!(r.mode, NavMode::Travel);
        assert_eq!(r.throttle, 0.1);
        assert_eq!(r.steer, -15.0);
    }

    #[test]
    fn test_travel_returns_home_with_samples() {
        let mut m = mgr();
        let mut r = rover_in(NavMode::Travel);
        r.samples_collected = 6;
        r.walls.front = Some(5.0);
        r.walls.right = Some(5.0);

        m.step(&mut r);

        assert_eq!(r.mode, NavMode::ReturnHome);
    }

    #[test]
    fn test_travel_stops_for_nearby_sample() {
        let mut m = mgr();
        let mut r = rover_in(NavMode::Travel);
        r.walls.left = Some(25.0);
        r.rock = Some(RockSighting {
            count: 30,
            dist: 30.0,
            angle_deg: 10.0,
            pos_w: Point2::new(120.0, 80.0),
        });
        r.vel = 0.5;

        m.step(&mut r);
        assert_eq!(r.mode, NavMode::Travel);
        assert_eq!(r.brake, 10.0);
        assert_eq!(r.target_rock_pos, None);

        r.vel = 0.0;
        m.step(&mut r);
        assert_eq!(r.mode, NavMode::ApproachSample);
        assert_eq!(r.target_rock_pos, Some(Point2::new(120.0, 80.0)));
    }

    #[test]
    fn test_travel_crawls_past_distant_sample() {
        let mut m = mgr();
        let mut r = rover_in(NavMode::Travel);
        r.walls.left = Some(25.0);
        r.rock = Some(RockSighting {
            count: 30,
            dist: 60.0,
            angle_deg: 10.0,
            pos_w: Point2::new(120.0, 80.0),
        });

        m.step(&mut r);

        assert_eq!(r.mode, NavMode::Travel);
        assert_eq!(r.throttle, 0.1);
        assert_eq!(r.steer, 5.0);
    }

    #[test]
    fn test_travel_stuck_and_circling() {
        let mut m = mgr();
        let mut r = rover_in(NavMode::Travel);
        r.walls.left = Some(25.0);
        r.pos = Point2::new(50.0, 50.0);

        // Crawl steer is held at 5 and the rover never moves, stuck wins after the dwell window
        for _ in 0..200 {
            m.step(&mut r);
            assert_eq!(r.mode, NavMode::Travel);
        }
        m.step(&mut r);
        assert_eq!(r.mode, NavMode::UnstuckOnTravel);

        // Moving rover holding the same steer is circling
        let mut r = rover_in(NavMode::Travel);
        r.walls.left = Some(25.0);
        r.steer = 5.0;
        let mut ticks = 0;
        while r.mode == NavMode::Travel {
            ticks += 1;
            r.pos = Point2::new(ticks as f64, 0.0);
            m.step(&mut r);
        }
        assert_eq!(r.mode, NavMode::BreakLoop);
        assert_eq!(ticks, 501);
    }

    #[test]
    fn test_full_tick_sequence_to_idle() {
        let mut m = mgr();
        let mut r = rover_in(NavMode::ReturnHome);
        r.starting_pos = Some(Point2::new(10.0, 10.0));
        r.pos = Point2::new(12.0, 11.0);
        r.vel = 1.0;
        r.walls.front = None;
        assert_eq!(r.walls.front(), FAR_DIST);

        m.step(&mut r);
        assert_eq!(r.mode, NavMode::Stop);

        m.step(&mut r);
        assert_eq!(r.mode, NavMode::Stop);
        assert_eq!(r.brake, 10.0);

        r.vel = 0.0;
        m.step(&mut r);
        assert_eq!(r.mode, NavMode::Idle);

        m.step(&mut r);
        assert_eq!(r.mode, NavMode::Idle);
        assert_eq!((r.throttle, r.steer, r.brake), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_seeded_from_params() {
        let params = NavParams {
            rng_seed: Some(42),
            ..NavParams::default()
        };

        let run = |params: NavParams| {
            let mut m = NavMgr::from_params(params);
            let mut r = rover_in(NavMode::UnstuckOnTravel);
            m.step(&mut r);
            (r.throttle, r.steer, r.spin_back.remaining())
        };

        assert_eq!(run(params.clone()), run(params));
    }
}
