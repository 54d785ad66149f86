//! # Closed loop simulation
//!
//! Rolls the controlled system out from a start point towards a goal. The
//! state is the position error to the goal, so each tick:
//!
//!  1. computes the optimal input `u = K x`,
//!  2. saturates each component of `u` into the input limits,
//!  3. advances the state with the system model,
//!  4. records the world position and its distance to the goal.
//!
//! The rollout stops as soon as the distance is within the goal tolerance, or
//! once the simulated time budget is spent. Both are normal outcomes, the
//! partial trajectory is returned either way.
//!
//! Elapsed time is `ticks * dt` rather than a running sum of `dt`, so the tick
//! count of a timed out rollout does not depend on rounding. A rollout keeps
//! going while the time before the tick is within the budget, which gives
//! `floor(max_time / dt) + 1` ticks. A loop that sums `dt` instead can stop one
//! tick earlier, for example 20 ticks rather than 21 for `dt = 0.05` and
//! `max_time = 1`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::ops::ControlFlow;
use log::trace;
use nalgebra::{Matrix2, Point2, Vector2};
use serde::Serialize;

// Internal
use super::{Params, SystemModel};
use util::maths::clamp_elements;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Termination and saturation parameters of a rollout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimParams {
    /// Tick length
    pub dt_s: f64,

    /// Simulated time budget
    pub max_time_s: f64,

    /// Goal tolerance
    pub goal_dist_m: f64,

    /// Lower limit of each input component
    pub u_min_ms: f64,

    /// Upper limit of each input component
    pub u_max_ms: f64,
}

/// A single executed tick, as seen by an observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Index of the tick, starting at 1 for the first executed tick
    pub index: usize,

    /// Simulated time at the end of the tick
    pub elapsed_s: f64,

    /// The saturated input applied during the tick
    pub input: Vector2<f64>,

    /// World position at the end of the tick
    pub position: Point2<f64>,

    /// Distance from `position` to the goal
    pub dist_m: f64,
}

/// The result of a single plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanResult {
    /// World positions, starting with the start point and with one entry per
    /// executed tick after it
    pub trajectory: Vec<Point2<f64>>,

    /// Distance to the goal after each tick
    pub error_series: Vec<f64>,

    /// How the rollout ended
    pub outcome: SimOutcome,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Terminal state of a rollout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimOutcome {
    /// The goal tolerance was reached
    Converged,

    /// The time budget was spent before reaching the goal
    TimedOut,

    /// The observer stopped the rollout
    Cancelled,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl From<&Params> for SimParams {
    fn from(params: &Params) -> Self {
        Self {
            dt_s: params.dt_s,
            max_time_s: params.max_time_s,
            goal_dist_m: params.goal_dist_m,
            u_min_ms: params.u_min_ms,
            u_max_ms: params.u_max_ms,
        }
    }
}

impl PlanResult {
    /// True if the goal was reached within the time budget.
    pub fn found_path(&self) -> bool {
        self.outcome == SimOutcome::Converged
    }

    /// Number of ticks that were executed.
    pub fn num_ticks(&self) -> usize {
        self.error_series.len()
    }

    /// The last simulated position (the start point if no tick ran).
    pub fn final_position(&self) -> Option<&Point2<f64>> {
        self.trajectory.last()
    }

    /// The last recorded distance to the goal.
    pub fn final_error(&self) -> Option<f64> {
        self.error_series.last().copied()
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Roll out the closed loop from `start` towards `goal`.
///
/// `gain` is applied as `u = K x` and must have been computed for `model`.
pub fn simulate(
    gain: &Matrix2<f64>,
    model: &SystemModel,
    start: &Point2<f64>,
    goal: &Point2<f64>,
    params: &SimParams,
) -> PlanResult {
    simulate_with_observer(gain, model, start, goal, params, |_| ControlFlow::Continue(()))
}

/// Roll out the closed loop, handing every tick to `observer`.
///
/// The observer is called after each tick has been recorded. Returning
/// `ControlFlow::Break` stops the rollout with [`SimOutcome::Cancelled`],
/// unless that tick reached the goal in which case the outcome is
/// [`SimOutcome::Converged`].
pub fn simulate_with_observer<F>(
    gain: &Matrix2<f64>,
    model: &SystemModel,
    start: &Point2<f64>,
    goal: &Point2<f64>,
    params: &SimParams,
    mut observer: F,
) -> PlanResult
where
    F: FnMut(&Tick) -> ControlFlow<()>,
{
    // State is the error to the goal
    let mut x: Vector2<f64> = start - goal;

    let mut trajectory = vec![*start];
    let mut error_series = Vec::new();
    let mut outcome = SimOutcome::TimedOut;

    // Elapsed time is derived from the tick count rather than accumulated,
    // so the number of ticks in the budget is floor(max_time / dt) + 1.
    let mut num_ticks: usize = 0;

    while (num_ticks as f64) * params.dt_s <= params.max_time_s {
        num_ticks += 1;
        let elapsed_s = (num_ticks as f64) * params.dt_s;

        let u = clamp_elements(&(gain * x), params.u_min_ms, params.u_max_ms);

        x = model.step(&x, &u);

        let position = goal + x;
        let dist_m = (goal - position).norm();

        trajectory.push(position);
        error_series.push(dist_m);

        let tick = Tick {
            index: num_ticks,
            elapsed_s,
            input: u,
            position,
            dist_m,
        };
        trace!("{:?}", tick);

        let flow = observer(&tick);

        if dist_m <= params.goal_dist_m {
            outcome = SimOutcome::Converged;
            break;
        }

        if let ControlFlow::Break(()) = flow {
            outcome = SimOutcome::Cancelled;
            break;
        }
    }

    PlanResult {
        trajectory,
        error_series,
        outcome,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn sim_params(dt_s: f64, max_time_s: f64) -> SimParams {
        SimParams {
            dt_s,
            max_time_s,
            goal_dist_m: 0.1,
            u_min_ms: -5.0,
            u_max_ms: 5.0,
        }
    }

    /// A hand tuned stabilizing gain for the point mass at `dt_s`, placing
    /// both closed loop poles at 0.5.
    fn half_gain(dt_s: f64) -> Matrix2<f64> {
        Matrix2::identity() * (-0.5 / dt_s)
    }

    #[test]
    fn test_start_at_goal() {
        let model = SystemModel::point_mass(0.05);
        let goal = Point2::new(3.0, -2.0);

        let result = simulate(
            &half_gain(0.05),
            &model,
            &goal,
            &goal,
            &sim_params(0.05, 100.0),
        );

        // One degenerate tick with zero input
        assert_eq!(result.outcome, SimOutcome::Converged);
        assert_eq!(result.trajectory, vec![goal, goal]);
        assert_eq!(result.error_series, vec![0.0]);
    }

    #[test]
    fn test_converges_with_trajectory_shape() {
        let model = SystemModel::point_mass(0.05);
        let start = Point2::new(1.0, 0.0);
        let goal = Point2::new(0.0, 0.0);

        // Limits wide enough to stay linear
        let params = SimParams {
            u_min_ms: -100.0,
            u_max_ms: 100.0,
            ..sim_params(0.05, 100.0)
        };

        let result = simulate(&half_gain(0.05), &model, &start, &goal, &params);

        // Error halves every tick: 0.5, 0.25, 0.125, 0.0625
        assert!(result.found_path());
        assert_eq!(result.num_ticks(), 4);
        assert_eq!(result.trajectory.len(), result.error_series.len() + 1);
        assert_eq!(result.trajectory[0], start);
        for (e, expected) in result.error_series.iter().zip([0.5, 0.25, 0.125, 0.0625].iter()) {
            assert_relative_eq!(*e, *expected, epsilon = 1e-12);
        }
        assert!(result.final_error().unwrap() <= 0.1);
    }

    #[test]
    fn test_saturation_asymmetric() {
        let model = SystemModel::point_mass(0.05);
        let params = SimParams {
            u_min_ms: -1.0,
            u_max_ms: 3.0,
            ..sim_params(0.05, 100.0)
        };

        let mut saturated_low = false;
        let mut saturated_high = false;

        let result = simulate_with_observer(
            &half_gain(0.05),
            &model,
            &Point2::new(4.0, -6.0),
            &Point2::new(-2.0, 5.0),
            &params,
            |tick| {
                for u in tick.input.iter() {
                    assert!(*u >= -1.0 && *u <= 3.0, "input {} out of limits", u);
                }
                saturated_low |= tick.input[0] == -1.0;
                saturated_high |= tick.input[1] == 3.0;
                ControlFlow::Continue(())
            },
        );

        assert!(result.found_path());
        assert!(saturated_low && saturated_high);
    }

    #[test]
    fn test_timeout() {
        let model = SystemModel::point_mass(0.25);
        let params = SimParams {
            u_min_ms: -1.0,
            u_max_ms: 1.0,
            ..sim_params(0.25, 10.0)
        };

        let result = simulate(
            &half_gain(0.25),
            &model,
            &Point2::new(0.0, 0.0),
            &Point2::new(1000.0, 0.0),
            &params,
        );

        // Ticks at elapsed 0.25, 0.5, ..., 10.25, i.e. floor(10 / 0.25) + 1
        assert_eq!(result.outcome, SimOutcome::TimedOut);
        assert!(!result.found_path());
        assert_eq!(result.num_ticks(), 41);
        assert_eq!(result.trajectory.len(), 42);

        // Saturated the whole way at 1 m/s
        let last = result.final_position().unwrap();
        assert_relative_eq!(last.x, 10.25, epsilon = 1e-9);
        assert_relative_eq!(last.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(result.final_error().unwrap(), 989.75, epsilon = 1e-9);
    }

    #[test]
    fn test_tick_count_not_subject_to_rounding() {
        // Summing 0.05 twenty times overshoots 1.0, counting ticks does not
        let model = SystemModel::point_mass(0.05);
        let params = SimParams {
            u_min_ms: -0.1,
            u_max_ms: 0.1,
            ..sim_params(0.05, 1.0)
        };

        let result = simulate(
            &half_gain(0.05),
            &model,
            &Point2::new(0.0, 0.0),
            &Point2::new(50.0, 0.0),
            &params,
        );

        assert_eq!(result.outcome, SimOutcome::TimedOut);
        assert_eq!(result.num_ticks(), 21);
    }

    #[test]
    fn test_zero_tolerance_times_out() {
        let model = SystemModel::point_mass(0.5);
        let params = SimParams {
            goal_dist_m: 0.0,
            ..sim_params(0.5, 5.0)
        };

        // A pole at 0.9 only ever shrinks the error geometrically
        let gain = Matrix2::identity() * (-0.1 / 0.5);

        let result = simulate(
            &gain,
            &model,
            &Point2::new(2.0, 2.0),
            &Point2::new(0.0, 0.0),
            &params,
        );

        assert_eq!(result.outcome, SimOutcome::TimedOut);
        assert_eq!(result.num_ticks(), 11);
        assert_eq!(result.error_series.len(), result.trajectory.len() - 1);
    }

    #[test]
    fn test_elapsed_time_starts_at_dt() {
        let model = SystemModel::point_mass(0.5);
        let mut elapsed = Vec::new();

        simulate_with_observer(
            &half_gain(0.5),
            &model,
            &Point2::new(10.0, 0.0),
            &Point2::new(0.0, 0.0),
            &SimParams {
                u_min_ms: -1.0,
                u_max_ms: 1.0,
                ..sim_params(0.5, 1.0)
            },
            |tick| {
                elapsed.push(tick.elapsed_s);
                ControlFlow::Continue(())
            },
        );

        assert_eq!(elapsed, vec![0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_observer_cancel() {
        let model = SystemModel::point_mass(0.05);

        let result = simulate_with_observer(
            &half_gain(0.05),
            &model,
            &Point2::new(50.0, 50.0),
            &Point2::new(0.0, 0.0),
            &sim_params(0.05, 100.0),
            |tick| {
                if tick.index == 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        );

        assert_eq!(result.outcome, SimOutcome::Cancelled);
        assert_eq!(result.num_ticks(), 3);
        assert_eq!(result.trajectory.len(), 4);
    }

    #[test]
    fn test_converged_tick_wins_over_cancel() {
        let model = SystemModel::point_mass(0.05);
        let goal = Point2::new(1.0, 1.0);

        let result = simulate_with_observer(
            &half_gain(0.05),
            &model,
            &goal,
            &goal,
            &sim_params(0.05, 100.0),
            |_| ControlFlow::Break(()),
        );

        assert_eq!(result.outcome, SimOutcome::Converged);
    }
}
