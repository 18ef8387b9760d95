//! # Rover library.
//!
//! This library allows the executable, tests and benchmarks to access the rover's perception and
//! navigation modules.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Control loop - owns the rover state and runs perception then navigation each tick
pub mod control;

/// World map - accumulated evidence of obstacles, samples and navigable ground
pub mod map;

/// Navigation - the mode dispatch decision engine
pub mod nav;

/// Perception - converts camera frames into map evidence and sensor summaries
pub mod per;

/// Replay - offline access to recorded drives
pub mod replay;

/// Rover state - the record shared between perception and navigation
pub mod rover_state;
