//! # LQR Planner Executable
//!
//! Runs the LQR planner from a fixed start point to a number of randomly
//! sampled goals, logging the outcome of each plan and archiving the
//! trajectories into the session directory.
//!
//! Usage: `lqr_exec [NUM_GOALS] [SEED]`

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{env, time::Instant};

use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use log::{debug, info, warn};
use nalgebra::{Matrix2, Point2};
use serde::Serialize;

use lqr_lib::{
    demo::GoalSampler,
    lqr_ctrl::{LqrPlanner, Params, PlanResult},
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Start point of every plan.
const START_M: [f64; 2] = [6.0, 6.0];

/// Half width of the goal sampling area.
const GOAL_AREA_M: f64 = 50.0;

const DEFAULT_NUM_GOALS: usize = 1;

const DEFAULT_SEED: u64 = 0;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A plan as written to the session archive.
#[derive(Serialize)]
struct ArchivedPlan<'a> {
    params: &'a Params,
    gain: &'a Matrix2<f64>,
    start: Point2<f64>,
    goal: Point2<f64>,
    runtime_s: f64,
    result: &'a PlanResult,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("lqr_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("LQR Planner\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- PARSE ARGUMENTS ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    if args.len() > 3 {
        return Err(eyre!("Expected at most two arguments: [NUM_GOALS] [SEED]"));
    }

    let num_goals = match args.get(1) {
        Some(a) => a
            .parse::<usize>()
            .wrap_err_with(|| format!("Invalid number of goals \"{}\"", a))?,
        None => DEFAULT_NUM_GOALS,
    };
    let seed = match args.get(2) {
        Some(a) => a
            .parse::<u64>()
            .wrap_err_with(|| format!("Invalid seed \"{}\"", a))?,
        None => DEFAULT_SEED,
    };
    info!("Planning to {} goal(s) with seed {}", num_goals, seed);

    // ---- MODULE INIT ----

    let planner = LqrPlanner::init("lqr_planner.toml").wrap_err("Failed to initialise LqrPlanner")?;
    info!("LqrPlanner init complete");
    info!("    Gain: {}", planner.gain());

    // ---- PLANNING ----

    let start = Point2::new(START_M[0], START_M[1]);
    let mut num_found = 0;

    for (i, goal) in GoalSampler::new(seed, GOAL_AREA_M).take(num_goals).enumerate() {
        let t0 = Instant::now();
        let result = planner.plan(&start, &goal);
        let runtime_s = t0.elapsed().as_secs_f64();

        if result.found_path() {
            num_found += 1;
            info!(
                "[{}] Found path to {} in {} ticks ({:.6} s)",
                i,
                goal,
                result.num_ticks(),
                runtime_s
            );
        } else {
            warn!(
                "[{}] Cannot find path to {}, final error {:?} m",
                i,
                goal,
                result.final_error()
            );
        }

        session
            .archive_json(
                format!("plans/plan_{:03}.json", i),
                &ArchivedPlan {
                    params: planner.params(),
                    gain: planner.gain(),
                    start,
                    goal,
                    runtime_s,
                    result: &result,
                },
            )
            .wrap_err("Failed to archive plan")?;
    }

    info!("Found {} of {} paths", num_found, num_goals);

    Ok(())
}
