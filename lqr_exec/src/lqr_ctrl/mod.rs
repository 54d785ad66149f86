//! # LQR control module
//!
//! LQR control steers a point mass from a start point to a goal point on the
//! plane. The agent is modelled as a discrete linear system whose input is its
//! velocity, and the optimal constant feedback gain for that system is found
//! once by solving the discrete algebraic Riccati equation.
//!
//! Planning then rolls the closed loop forward in fixed ticks, saturating the
//! input to the configured limits, until the agent is within the goal
//! tolerance or the simulated time budget runs out. The resulting trajectory
//! and error series are returned either way, so a timeout is an outcome rather
//! than an error.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod model;
pub mod params;
pub mod riccati;
pub mod sim;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use model::*;
pub use params::*;
pub use riccati::*;
pub use sim::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur while constructing the planner.
#[derive(Debug, thiserror::Error)]
pub enum LqrCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(ParamsError),

    #[error("Could not compute the LQR gain: {0}")]
    SolverFailure(RiccatiError),
}
