//! # Avoidance and recovery modes
//!
//! Turn away modes rotate the rover on the spot away from a wall that is too close. Unstuck modes
//! run the randomised [`SpinBack`](super::SpinBack) manoeuvre. Both return to the mode given by
//! the caller once complete.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use rand::Rng;

use super::{drive::*, NavMgr, NavMode};
use crate::rover_state::RoverState;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<R: Rng> NavMgr<R> {
    pub(super) fn turn_away(&mut self, rover: &mut RoverState, done: NavMode) -> NavMode {
        if turn_away_until_clear(rover, &self.params) {
            return done;
        }

        rover.mode
    }

    pub(super) fn unstuck(&mut self, rover: &mut RoverState, done: NavMode) -> NavMode {
        if rover
            .circling
            .check(rover.steer, self.params.circling_limit)
        {
            return NavMode::BreakLoop;
        }

        let out = rover.spin_back.step(&self.params.spin_back, &mut self.rng);

        rover.throttle = out.throttle;
        rover.steer = out.steer;
        rover.brake = 0.0;

        if out.complete {
            return done;
        }

        rover.mode
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
