//! # Rover control loop
//!
//! [`RoverCtrl`] owns the [`RoverState`] for the whole mission and runs one tick at a time:
//! telemetry in, perception, navigation, actuator demands out. Perception always runs before
//! navigation so decisions are made on the summaries of the current frame.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::RgbImage;
use log::debug;
use rand::{rngs::StdRng, Rng};

use crate::{
    map::WorldMap,
    nav::{NavMgr, NavMode, NavParams},
    per::{PerError, PerMgr, PerParams, PerReport},
    rover_state::{ActuatorDemands, RoverState, Telemetry},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The rover control loop, generic over the random number source used by recovery manoeuvres.
pub struct RoverCtrl<R: Rng = StdRng> {
    per: PerMgr,
    nav: NavMgr<R>,
    state: RoverState,

    /// Number of ticks completed
    num_ticks: u64,

    /// Report from the most recent perception step
    last_per_report: Option<PerReport>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RoverCtrl<StdRng> {
    /// Create a new control loop, with the recovery generator seeded from the navigation
    /// parameters.
    pub fn new(
        per_params: PerParams,
        nav_params: NavParams,
        map_size: usize,
    ) -> Result<Self, PerError> {
        Ok(Self::from_parts(
            PerMgr::new(per_params)?,
            NavMgr::from_params(nav_params),
            map_size,
        ))
    }
}

impl<R: Rng> RoverCtrl<R> {
    /// Create a new control loop drawing recovery choices from `rng`.
    pub fn with_rng(
        per_params: PerParams,
        nav_params: NavParams,
        map_size: usize,
        rng: R,
    ) -> Result<Self, PerError> {
        Ok(Self::from_parts(
            PerMgr::new(per_params)?,
            NavMgr::new(nav_params, rng),
            map_size,
        ))
    }

    fn from_parts(per: PerMgr, nav: NavMgr<R>, map_size: usize) -> Self {
        Self {
            per,
            nav,
            state: RoverState::new(map_size),
            num_ticks: 0,
            last_per_report: None,
        }
    }

    /// Run one tick of the loop.
    ///
    /// If the frame cannot be processed the error is returned before navigation runs, so the
    /// state keeps the previous tick's summaries, demands and mode.
    pub fn tick(
        &mut self,
        telem: &Telemetry,
        frame: &RgbImage,
    ) -> Result<ActuatorDemands, PerError> {
        self.state.apply_telemetry(telem);

        let report = self.per.step(frame, &mut self.state)?;
        self.last_per_report = Some(report);

        self.nav.step(&mut self.state);

        self.num_ticks += 1;

        debug!(
            "Tick {}: mode {}, {} samples collected",
            self.num_ticks, self.state.mode, self.state.samples_collected
        );

        Ok(self.state.demands())
    }

    pub fn state(&self) -> &RoverState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RoverState {
        &mut self.state
    }

    pub fn map(&self) -> &WorldMap {
        &self.state.map
    }

    pub fn mode(&self) -> NavMode {
        self.state.mode
    }

    pub fn num_ticks(&self) -> u64 {
        self.num_ticks
    }

    pub fn last_per_report(&self) -> Option<&PerReport> {
        self.last_per_report.as_ref()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
