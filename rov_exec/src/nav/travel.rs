//! # Travel and break loop modes
//!
//! Travel is the exploration behaviour. The rover follows the left wall, slowing and turning
//! right when a wall appears ahead, and stops for samples it passes close to. Stuck and circling
//! checks are made every tick before anything else.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info};
use rand::Rng;

use super::{drive::*, NavMgr, NavMode};
use crate::rover_state::RoverState;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<R: Rng> NavMgr<R> {
    pub(super) fn travel(&mut self, rover: &mut RoverState) -> NavMode {
        let params = &self.params;

        if rover.stuck.check(&rover.pos, &params.stuck) {
            return NavMode::UnstuckOnTravel;
        }

        if rover.circling.check(rover.steer, params.circling_limit) {
            return NavMode::BreakLoop;
        }

        if rover.samples_collected >= params.samples_target {
            info!(
                "{} samples collected, returning home",
                rover.samples_collected
            );
            return NavMode::ReturnHome;
        }

        if is_near_front_wall(rover, params) {
            maintain_moderate_speed(rover, params);

            if !is_too_close_to_right_wall(rover, params) {
                steer_right(rover, params);
            } else if brake_until_stop(rover, params) {
                return NavMode::TurnAwayOnTravel;
            }
        } else if rover.rock.is_some() {
            maintain_moderate_speed(rover, params);

            if is_sample_nearby(rover, params) {
                if brake_until_stop(rover, params) {
                    rover.target_rock_pos = rover.rock_pos();
                    debug!(
                        "Sample targeted at {:?}, {:.1} away",
                        rover.target_rock_pos,
                        rover.rock_dist()
                    );
                    return NavMode::ApproachSample;
                }
            } else {
                crawl_to_left_wall(rover, params);
            }
        } else {
            maintain_high_speed(rover, params);
            crawl_to_left_wall(rover, params);
        }

        NavMode::Travel
    }

    /// Drive straight until a wall is ahead or the rover is stuck.
    pub(super) fn break_loop(&mut self, rover: &mut RoverState) -> NavMode {
        rover.steer = 0.0;

        if rover.stuck.check(&rover.pos, &self.params.stuck) {
            return NavMode::Travel;
        }

        if is_near_front_wall(rover, &self.params) {
            return NavMode::Travel;
        }

        maintain_high_speed(rover, &self.params);

        NavMode::BreakLoop
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
