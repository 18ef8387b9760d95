//! # Drive primitives
//!
//! Speed profiles, steering primitives and the perception cues they react to. The speed profiles
//! are fixed policies chosen by context, not computed from distances.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point2;
use util::maths::{clamp, get_ang_dist_deg, norm2};

use super::NavParams;
use crate::rover_state::RoverState;

// ------------------------------------------------------------------------------------------------
// SPEED PROFILES
// ------------------------------------------------------------------------------------------------

/// Full throttle, cut above the maximum velocity.
pub fn maintain_high_speed(rover: &mut RoverState, params: &NavParams) {
    rover.brake = 0.0;
    rover.throttle = params.throttle_set;
    if rover.vel > params.max_vel {
        rover.throttle = 0.0;
    }
}

/// Half throttle, cut above half the maximum velocity.
pub fn maintain_moderate_speed(rover: &mut RoverState, params: &NavParams) {
    rover.brake = 0.0;
    rover.throttle = params.throttle_set / 2.0;
    if rover.vel > params.max_vel / 2.0 {
        rover.throttle = 0.0;
    }
}

/// Quarter throttle, actively braking above a quarter of the maximum velocity.
pub fn maintain_slow_speed(rover: &mut RoverState, params: &NavParams) {
    rover.brake = 0.0;
    rover.throttle = params.throttle_set / 4.0;
    if rover.vel > params.max_vel / 4.0 {
        rover.throttle = 0.0;
        rover.brake = params.brake_set;
    }
}

/// Brake with the wheels straight. Returns true once the rover has stopped, at which point the
/// brake is released.
pub fn brake_until_stop(rover: &mut RoverState, params: &NavParams) -> bool {
    rover.brake = params.brake_set;
    rover.steer = 0.0;
    rover.throttle = 0.0;

    if is_stopped(rover, params) {
        rover.brake = 0.0;
        true
    } else {
        false
    }
}

/// Zero all actuators.
pub fn stand_still(rover: &mut RoverState) {
    rover.throttle = 0.0;
    rover.steer = 0.0;
    rover.brake = 0.0;
}

// ------------------------------------------------------------------------------------------------
// STEERING
// ------------------------------------------------------------------------------------------------

/// Turn further left by a full steering step.
pub fn steer_left(rover: &mut RoverState, params: &NavParams) {
    let lim = params.steer_limit_deg;
    rover.steer = clamp(rover.steer + lim, -lim, lim);
}

/// Turn further right by a full steering step.
pub fn steer_right(rover: &mut RoverState, params: &NavParams) {
    let lim = params.steer_limit_deg;
    rover.steer = clamp(rover.steer - lim, -lim, lim);
}

/// Keep the left wall inside the target band.
pub fn crawl_to_left_wall(rover: &mut RoverState, params: &NavParams) {
    if is_near_left_wall(rover, params) {
        steer_right(rover, params);
    } else if is_too_far_from_left_wall(rover, params) {
        steer_left(rover, params);
    } else {
        rover.steer = params.crawl_steer_deg;
    }
}

/// Steer onto the bearing of the visible sample. Returns true if no sample is visible, in which
/// case the wheels are straightened.
pub fn steer_toward_sample(rover: &mut RoverState, params: &NavParams) -> bool {
    let lim = params.steer_limit_deg;

    match rover.rock {
        Some(rock) => {
            rover.steer = clamp(rock.angle_deg, -lim, lim);
            false
        }
        None => {
            rover.steer = 0.0;
            true
        }
    }
}

/// Rotate on the spot until the front is clear. Returns true once clear, with steer and throttle
/// zeroed.
pub fn steer_until_clear(rover: &mut RoverState, params: &NavParams) -> bool {
    rover.brake = 0.0;
    rover.steer = params.turn_away_steer_deg;

    if rover.walls.front() > params.front_clear_dist {
        rover.steer = 0.0;
        rover.throttle = 0.0;
        true
    } else {
        false
    }
}

/// Stop, then rotate until the front is clear, then stand still. Returns true when complete.
pub fn turn_away_until_clear(rover: &mut RoverState, params: &NavParams) -> bool {
    if brake_until_stop(rover, params) && steer_until_clear(rover, params) {
        stand_still(rover);
        return true;
    }
    false
}

/// Steer onto the shortest rotation towards `target`. Returns true if already aligned within
/// tolerance, in which case the wheels are straightened.
pub fn steer_toward(rover: &mut RoverState, target: &Point2<f64>, params: &NavParams) -> bool {
    let bearing_deg = (target.y - rover.pos.y)
        .atan2(target.x - rover.pos.x)
        .to_degrees();
    let err_deg = get_ang_dist_deg(rover.yaw, bearing_deg);

    if err_deg.abs() < params.home_align_tol_deg {
        rover.steer = 0.0;
        true
    } else {
        let lim = params.steer_limit_deg;
        rover.steer = clamp(err_deg, -lim, lim);
        false
    }
}

// ------------------------------------------------------------------------------------------------
// CUES
// ------------------------------------------------------------------------------------------------

pub fn is_stopped(rover: &RoverState, params: &NavParams) -> bool {
    rover.vel.abs() <= params.stopped_vel_tol
}

pub fn is_near_front_wall(rover: &RoverState, params: &NavParams) -> bool {
    rover.walls.front() < params.front_near_dist
}

pub fn is_too_close_to_front_wall(rover: &RoverState, params: &NavParams) -> bool {
    rover.walls.front() < params.too_close_dist
}

pub fn is_near_left_wall(rover: &RoverState, params: &NavParams) -> bool {
    rover.walls.left() < params.side_near_dist
}

pub fn is_too_far_from_left_wall(rover: &RoverState, params: &NavParams) -> bool {
    rover.walls.left() > params.left_far_dist
}

pub fn is_near_right_wall(rover: &RoverState, params: &NavParams) -> bool {
    rover.walls.right() < params.side_near_dist
}

pub fn is_too_close_to_right_wall(rover: &RoverState, params: &NavParams) -> bool {
    rover.walls.right() < params.too_close_dist
}

/// A sample is visible, to the front or left, and close enough to stop for.
pub fn is_sample_nearby(rover: &RoverState, params: &NavParams) -> bool {
    match rover.rock {
        Some(rock) => {
            rock.angle_deg > params.sample_min_angle_deg && rock.dist < params.sample_nearby_dist
        }
        None => false,
    }
}

/// A sample is visible, to the front or left, and close enough to approach slowly.
pub fn is_near_pickup_zone(rover: &RoverState, params: &NavParams) -> bool {
    match rover.rock {
        Some(rock) => {
            rock.angle_deg > params.sample_min_angle_deg && rock.dist < params.pickup_zone_dist
        }
        None => false,
    }
}

/// The rover is within the home radius of its starting position. Always false if no starting
/// position has been captured.
pub fn is_near_starting_position(rover: &RoverState, params: &NavParams) -> bool {
    match rover.starting_pos {
        Some(start) => norm2((rover.pos.x, rover.pos.y), (start.x, start.y)) < params.home_radius,
        None => false,
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
