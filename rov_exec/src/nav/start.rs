//! # Start, stop and idle modes

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
    /// Capture the starting position and drive forward until a wall is found or the rover is
    /// stuck.
    pub(super) fn start(&mut self, rover: &mut RoverState) -> NavMode {
        if rover.starting_pos.is_none() {
            info!("Starting position captured at {}", rover.pos);
            rover.starting_pos = Some(rover.pos);
        }

        if is_near_front_wall(rover, &self.params) || rover.stuck.check(&rover.pos, &self.params.stuck)
        {
            return NavMode::Travel;
        }

        maintain_high_speed(rover, &self.params);

        NavMode::Start
    }

    /// Brake to a standstill, then go idle.
    pub(super) fn stop(&mut self, rover: &mut RoverState) -> NavMode {
        if brake_until_stop(rover, &self.params) {
            stand_still(rover);
            info!(
                "Mission complete with {} samples collected",
                rover.samples_collected
            );
            return NavMode::Idle;
        }

        NavMode::Stop
    }

    pub(super) fn idle(&mut self, rover: &mut RoverState) -> NavMode {
        stand_still(rover);

        NavMode::Idle
    }
}
