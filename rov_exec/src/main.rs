//! Main rover-side executable entry point.
//!
//! # Usage
//!
//! ```text
//! rov_exec <recording_dir>
//! ```
//!
//! Replays a recorded drive through the control loop:
//!
//!     - Initialise the session, logging and parameters
//!     - For each record in the recording:
//!         - Load the telemetry and camera frame
//!         - Run perception and navigation
//!         - Archive the resulting mode and demands
//!     - Save the world map into the session directory

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;

// Internal
use rov_lib::{
    control::RoverCtrl,
    map::{WorldMapLayer, DEFAULT_MAP_SIZE},
    nav::NavParams,
    per::PerParams,
    replay::{Replay, TickArchiver, TickRecord},
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("rov_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Rover Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- ARGUMENTS ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    if args.len() != 2 {
        return Err(eyre!(
            "Expected one argument, the recording directory, found {}",
            args.len() - 1
        ));
    }

    // ---- LOAD PARAMETERS ----

    let per_params: PerParams =
        util::params::load("per.toml").wrap_err("Could not load perception params")?;
    let nav_params: NavParams =
        util::params::load("nav.toml").wrap_err("Could not load navigation params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    let mut ctrl = RoverCtrl::new(per_params, nav_params, DEFAULT_MAP_SIZE)
        .wrap_err("Failed to initialise the control loop")?;

    let replay = Replay::open(&args[1])
        .wrap_err_with(|| format!("Failed to open the recording at {}", &args[1]))?;

    info!("Loaded recording of {} ticks from \"{}\"", replay.len(), &args[1]);

    let mut archiver = TickArchiver::create(session.path("ticks.csv"))
        .wrap_err("Failed to create the tick archive")?;

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    for record in replay.records() {
        let frame = match replay.load_frame(record) {
            Ok(f) => f,
            Err(e) => {
                warn!("Skipping tick: {}", e);
                continue;
            }
        };

        let telem = record.telemetry();

        let dems = match ctrl.tick(&telem, &frame) {
            Ok(d) => d,
            Err(e) => {
                warn!("Error during perception processing: {}", e);
                continue;
            }
        };

        archiver
            .write(&TickRecord::new(
                ctrl.num_ticks(),
                ctrl.mode(),
                &telem,
                &dems,
                ctrl.state().samples_collected,
            ))
            .wrap_err("Failed to archive the tick")?;

        if ctrl.mode().is_terminal() {
            info!("Terminal mode reached, stopping");
            break;
        }
    }

    archiver.flush().wrap_err("Failed to flush the tick archive")?;

    // ---- SHUTDOWN ----

    info!("Replay complete after {} ticks", ctrl.num_ticks());
    for layer in WorldMapLayer::ALL.iter() {
        info!(
            "    {:?}: {} cells",
            layer,
            ctrl.map().num_positive(*layer)
        );
    }

    ctrl.map()
        .save_png(session.path("world_map.png"))
        .wrap_err("Failed to save the world map image")?;
    ctrl.map()
        .save_json(session.path("world_map.json"))
        .wrap_err("Failed to save the world map")?;

    info!("World map saved to the session directory");

    Ok(())
}
