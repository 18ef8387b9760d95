//! # Return home mode

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;
use rand::Rng;

use super::{drive::*, NavMgr, NavMode};
use crate::rover_state::RoverState;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<R: Rng> NavMgr<R> {
    /// Drive towards the starting position, avoiding side walls on the way.
    pub(super) fn return_home(&mut self, rover: &mut RoverState) -> NavMode {
        let params = &self.params;

        if rover.stuck.check(&rover.pos, &params.stuck) {
            return NavMode::UnstuckOnReturn;
        }

        if is_near_starting_position(rover, params) {
            info!("Arrived home at {}", rover.pos);
            return NavMode::Stop;
        }

        if is_near_front_wall(rover, params) {
            maintain_moderate_speed(rover, params);
        } else {
            maintain_high_speed(rover, params);
        }

        if let Some(home) = rover.starting_pos {
            steer_toward(rover, &home, params);
        }

        if is_near_left_wall(rover, params) {
            steer_right(rover, params);
        } else if is_near_right_wall(rover, params) {
            steer_left(rover, params);
        }

        if is_too_close_to_front_wall(rover, params) && brake_until_stop(rover, params) {
            return NavMode::TurnAwayOnReturn;
        }

        NavMode::ReturnHome
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
