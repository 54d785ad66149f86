//! LQR control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::ops::ControlFlow;
use log::{debug, info, warn};
use nalgebra::{Matrix2, Point2};

// Internal
use super::*;
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// LQR point-to-point planner.
///
/// The feedback gain is solved once on construction and is immutable
/// afterwards, so a single planner can serve any number of `plan` calls,
/// including concurrent ones from several threads.
#[derive(Debug, Clone)]
pub struct LqrPlanner {
    params: Params,

    /// Linear model the gain was computed for
    model: SystemModel,

    weights: CostWeights,

    /// Feedback gain, applied as `u = K x`
    gain: Matrix2<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LqrPlanner {
    /// Initialise the planner from a parameter file.
    ///
    /// The path is relative to the parameters directory, see
    /// [`util::params::load`].
    pub fn init(params_path: &str) -> Result<Self, LqrCtrlError> {
        let params = params::load(params_path).map_err(LqrCtrlError::ParamLoadError)?;

        Self::new(params)
    }

    /// Build the planner from parameters, solving for the feedback gain.
    pub fn new(params: Params) -> Result<Self, LqrCtrlError> {
        params.validate().map_err(LqrCtrlError::InvalidParams)?;

        let model = SystemModel::from(&params);
        let weights = CostWeights::from(&params);

        let settings = RiccatiSettings {
            max_iters: params.riccati_max_iters,
            tolerance: params.riccati_tolerance,
        };

        let gain = solve_dare_gain(&model.a, &model.b, &weights.q, &weights.r, &settings)
            .map_err(LqrCtrlError::SolverFailure)?;

        info!("LQR planner initialised");
        debug!("    dt: {} s, gain: {:?}", model.dt_s, gain);

        Ok(Self {
            params,
            model,
            weights,
            gain,
        })
    }

    /// Plan a trajectory from `start` to `goal`.
    pub fn plan(&self, start: &Point2<f64>, goal: &Point2<f64>) -> PlanResult {
        self.plan_with_observer(start, goal, |_| ControlFlow::Continue(()))
    }

    /// Plan a trajectory from `start` to `goal`, handing each tick to
    /// `observer`, which may stop the plan early.
    pub fn plan_with_observer<F>(
        &self,
        start: &Point2<f64>,
        goal: &Point2<f64>,
        observer: F,
    ) -> PlanResult
    where
        F: FnMut(&Tick) -> ControlFlow<()>,
    {
        let result = simulate_with_observer(
            &self.gain,
            &self.model,
            start,
            goal,
            &SimParams::from(&self.params),
            observer,
        );

        match result.outcome {
            SimOutcome::Converged => debug!(
                "Found path from {} to {} in {} ticks",
                start,
                goal,
                result.num_ticks()
            ),
            SimOutcome::TimedOut => warn!(
                "Could not find a path from {} to {} within {} s",
                start, goal, self.params.max_time_s
            ),
            SimOutcome::Cancelled => debug!(
                "Plan from {} to {} cancelled after {} ticks",
                start,
                goal,
                result.num_ticks()
            ),
        }

        result
    }

    /// The feedback gain, applied as `u = K x`.
    pub fn gain(&self) -> &Matrix2<f64> {
        &self.gain
    }

    /// The system model the gain was computed for.
    pub fn model(&self) -> &SystemModel {
        &self.model
    }

    /// The cost weights the gain was computed for.
    pub fn weights(&self) -> &CostWeights {
        &self.weights
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}
