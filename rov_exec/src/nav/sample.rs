//! # Sample approach and pickup modes

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
    /// Drive onto the sighted sample, scanning left on the spot if it is lost from view.
    pub(super) fn approach_sample(&mut self, rover: &mut RoverState) -> NavMode {
        let params = &self.params;

        if rover.rock.is_none() {
            if brake_until_stop(rover, params) {
                steer_left(rover, params);
            }
            return NavMode::ApproachSample;
        }

        if rover.near_sample {
            if brake_until_stop(rover, params) {
                return NavMode::PickupSample;
            }
            return NavMode::ApproachSample;
        }

        if rover.stuck.check(&rover.pos, &params.stuck_fine) {
            return NavMode::UnstuckOnPickup;
        }

        if is_near_pickup_zone(rover, params) {
            maintain_slow_speed(rover, params);
        } else {
            maintain_moderate_speed(rover, params);
        }

        steer_toward_sample(rover, params);

        NavMode::ApproachSample
    }

    /// Request a pickup and wait for the simulator to resolve it.
    pub(super) fn pickup_sample(&mut self, rover: &mut RoverState) -> NavMode {
        if rover.picking_up {
            rover.pickup_seen = true;
            return NavMode::PickupSample;
        }

        if rover.near_sample {
            rover.send_pickup = true;
            return NavMode::PickupSample;
        }

        if rover.pickup_seen {
            rover.pickup_seen = false;
            rover.samples_collected += 1;
            info!("Sample collected, {} in total", rover.samples_collected);
        }

        NavMode::Travel
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
