//! LQR control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for LQR control.
///
/// Any field missing from a parameter file takes its value from
/// [`Params::default`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Params {
    /// Discretisation step of the system model and simulation tick length
    pub dt_s: f64,

    /// Simulated time budget for a single plan
    pub max_time_s: f64,

    /// Distance to the goal under which the plan is considered complete
    pub goal_dist_m: f64,

    /// Configured iteration bound of the planner.
    ///
    /// Carried for callers that embed the planner in an iterative search, the
    /// simulation loop itself is bounded by `max_time_s`.
    pub max_iter: usize,

    /// Lower limit applied to each input component
    pub u_min_ms: f64,

    /// Upper limit applied to each input component
    pub u_max_ms: f64,

    /// Diagonal of the state cost matrix Q
    pub q_diag: [f64; 2],

    /// Diagonal of the input cost matrix R
    pub r_diag: [f64; 2],

    /// Maximum number of Riccati iterations before the solve is abandoned
    pub riccati_max_iters: usize,

    /// Relative convergence tolerance of the Riccati iteration
    pub riccati_tolerance: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reasons a parameter set can be rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamsError {
    #[error("Parameter {0} must be finite")]
    NotFinite(&'static str),

    #[error("Time step must be positive, found {0}")]
    InvalidTimeStep(f64),

    #[error("Maximum simulation time must be positive, found {0}")]
    InvalidMaxTime(f64),

    #[error("Goal distance must not be negative, found {0}")]
    InvalidGoalDist(f64),

    #[error("Input lower limit ({0}) is greater than the upper limit ({1})")]
    InvalidInputLimits(f64, f64),

    #[error("State cost diagonal must not be negative, found {0:?}")]
    InvalidStateCost([f64; 2]),

    #[error("Input cost diagonal must be positive, found {0:?}")]
    InvalidInputCost([f64; 2]),

    #[error("Riccati settings must allow at least one iteration with a positive tolerance")]
    InvalidRiccatiSettings,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            dt_s: 0.05,
            max_time_s: 100.0,
            goal_dist_m: 0.1,
            max_iter: 150,
            u_min_ms: -5.0,
            u_max_ms: 5.0,
            q_diag: [1.0, 1.0],
            r_diag: [0.01, 0.01],
            riccati_max_iters: 10_000,
            riccati_tolerance: 1e-12,
        }
    }
}

impl Params {
    /// Check that the parameters describe a valid planner.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let scalars = [
            ("dt_s", self.dt_s),
            ("max_time_s", self.max_time_s),
            ("goal_dist_m", self.goal_dist_m),
            ("u_min_ms", self.u_min_ms),
            ("u_max_ms", self.u_max_ms),
            ("q_diag", self.q_diag[0]),
            ("q_diag", self.q_diag[1]),
            ("r_diag", self.r_diag[0]),
            ("r_diag", self.r_diag[1]),
            ("riccati_tolerance", self.riccati_tolerance),
        ];
        for (name, value) in scalars.iter() {
            if !value.is_finite() {
                return Err(ParamsError::NotFinite(*name));
            }
        }

        if self.dt_s <= 0.0 {
            return Err(ParamsError::InvalidTimeStep(self.dt_s));
        }
        if self.max_time_s <= 0.0 {
            return Err(ParamsError::InvalidMaxTime(self.max_time_s));
        }
        if self.goal_dist_m < 0.0 {
            return Err(ParamsError::InvalidGoalDist(self.goal_dist_m));
        }
        if self.u_min_ms > self.u_max_ms {
            return Err(ParamsError::InvalidInputLimits(self.u_min_ms, self.u_max_ms));
        }
        if self.q_diag.iter().any(|&q| q < 0.0) {
            return Err(ParamsError::InvalidStateCost(self.q_diag));
        }

        // R must be invertible, and positive definite for the cost to be
        // bounded below.
        if self.r_diag.iter().any(|&r| r <= 0.0) {
            return Err(ParamsError::InvalidInputCost(self.r_diag));
        }
        if self.riccati_max_iters == 0 || self.riccati_tolerance <= 0.0 {
            return Err(ParamsError::InvalidRiccatiSettings);
        }

        Ok(())
    }
}
