//! Main robot executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop (fixed 50 Hz):
//!         - Equipment sensing:
//!             - Drivetrain distance sensors
//!             - Gyroscope
//!             - Vision pipeline
//!             - Mechanism sensors
//!         - Localisation update
//!         - Autonomous routine processing
//!         - Equipment demand output
//!         - Telemetry
//!
//! The routine to run is selected by the first CLI argument. An optional
//! second argument gives a CSV path file overriding the eight ball
//! routine's built-in path.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use bot_lib::{
    auto_mgr::{AutoMgr, RoutineId, StepInputs},
    data_store::{DataStore, SafeModeCause},
    loc::{Odometry, Pose},
    point_mnvr::PointMnvr,
    sim::Sim,
    traj::path_file,
    traj_ctrl::TrajCtrl,
    vis_align::VisAlign,
    CYCLE_FREQUENCY_HZ, CYCLE_PERIOD_S,
};
use eqpt_if::eqpt::drive::DriveCmd;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use serde::Serialize;
use std::env;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Length of the autonomous period. The executable stops once the cycle
/// clock passes this, whether or not the routine has completed.
const AUTO_PERIOD_S: f64 = 15.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Telemetry frame saved into the session on the 1 Hz cycle.
#[derive(Serialize)]
struct TmFrame {
    time_s: f64,
    num_cycles: u128,
    safe: bool,
    pose: Pose,
    drive_cmd: DriveCmd,
    routine_done: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("bot_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Arcbot Executable\n");
    info!("Running on: {}", host::get_host_desc());
    info!("Session directory: {:?}\n", session.session_root);

    // ---- PARSE ARGUMENTS ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let routine_id: RoutineId = match args.get(1) {
        Some(name) => name
            .parse()
            .map_err(|e| eyre!("Invalid routine argument: {}", e))?,
        None => {
            return Err(eyre!(
                "Expected a routine name (basic_back, rendezvous_five or eight_ball) as the \
                first argument"
            ))
        }
    };

    if args.len() > 3 {
        return Err(eyre!(
            "Expected one or two arguments, found {}",
            args.len() - 1
        ));
    }

    info!("Selected routine: {}\n", routine_id);

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    let mut odometry = Odometry::init("loc.toml").wrap_err("Failed to initialise Odometry")?;
    info!("Odometry init complete");

    let point_mnvr = PointMnvr::init("point_mnvr.toml").wrap_err("Failed to initialise PointMnvr")?;
    info!("PointMnvr init complete");

    let vis_align = VisAlign::init("vis_align.toml").wrap_err("Failed to initialise VisAlign")?;
    info!("VisAlign init complete");

    let traj_ctrl = TrajCtrl::init("traj_ctrl.toml").wrap_err("Failed to initialise TrajCtrl")?;
    info!("TrajCtrl init complete");

    let mut auto_mgr = AutoMgr::init("auto_mgr.toml", point_mnvr, vis_align, traj_ctrl)
        .wrap_err("Failed to initialise AutoMgr")?;
    info!("AutoMgr init complete");

    let mut sim = Sim::init("sim.toml").wrap_err("Failed to initialise Sim")?;
    info!("Sim init complete");

    info!("Module initialisation complete\n");

    // ---- SELECT ROUTINE ----

    // An optional path file replaces the eight ball routine's built-in path.
    // The file only carries geometry, so the configured constraints are kept.
    if let Some(path_file_arg) = args.get(2) {
        let (max_vel_ms, max_acc_mss, max_volts) = auto_mgr.eight_ball_constraints();

        let spec = path_file::load(
            Path::new(path_file_arg),
            max_vel_ms,
            max_acc_mss,
            max_volts,
        )
        .wrap_err_with(|| format!("Failed to load path file \"{}\"", path_file_arg))?;

        auto_mgr.set_eight_ball_path(spec);

        info!("Eight ball path loaded from \"{}\"", path_file_arg);
    }

    auto_mgr
        .select(routine_id)
        .wrap_err("Failed to select the routine")?;

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- SENSING ----

        ds.drive_sens = sim.drive_sens();
        ds.nav_sens = sim.nav_sens();
        ds.vision_sens = sim.vision_sens();
        ds.mech_sens = sim.mech_sens();

        // Without a valid gyro the pose estimate cannot be advanced, so no
        // motion is commanded
        if ds.nav_sens.ok {
            ds.make_unsafe(SafeModeCause::NavSensorFault).ok();
        } else {
            ds.make_safe(SafeModeCause::NavSensorFault);
        }

        // ---- AUTONOMY PROCESSING ----

        if !ds.safe {
            odometry.update(&ds.nav_sens, &ds.drive_sens);

            ds.auto_output = auto_mgr.step(&StepInputs {
                time_s: ds.cycle_time_s,
                pose: odometry.pose(),
                wheel_speeds: Odometry::wheel_speeds(&ds.drive_sens),
                drive: &ds.drive_sens,
                vision: &ds.vision_sens,
                mech: &ds.mech_sens,
            });

            // Localisation resets are applied after the step so the routine
            // always sees a consistent pose within one cycle
            if let Some(pose) = ds.auto_output.odom_reset {
                odometry.reset(pose, &ds.nav_sens);
            } else if ds.auto_output.drive.reset_encoders {
                // The encoders restart from zero this cycle, so the distance
                // deltas must too or the pose would jump by the discarded
                // distance
                odometry.rebaseline();
            }
        }

        // ---- EQUIPMENT OUTPUT ----

        sim.step(&ds.auto_output.drive, &ds.auto_output.mech, CYCLE_PERIOD_S);

        // ---- TELEMETRY ----

        if ds.is_1_hz_cycle {
            util::session::save_with_timestamp(
                "tm/frame.json",
                TmFrame {
                    time_s: ds.cycle_time_s,
                    num_cycles: ds.num_cycles,
                    safe: ds.safe,
                    pose: odometry.pose(),
                    drive_cmd: ds.auto_output.drive.cmd,
                    routine_done: ds.auto_output.done,
                },
            );
        }

        // ---- END CONDITIONS ----

        if ds.auto_output.done {
            info!("Routine complete after {:.02} s", ds.cycle_time_s);
            break;
        }

        if ds.cycle_time_s > AUTO_PERIOD_S {
            warn!(
                "Autonomous period ({} s) expired before the routine completed, stopping",
                AUTO_PERIOD_S
            );
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    session.exit();

    Ok(())
}
