//! # Linear system model
//!
//! The agent is modelled as a point mass whose input directly sets its
//! velocity, discretised with a fixed time step:
//!
//! ```text
//! x[k+1] = A x[k] + B u[k],    A = I,    B = dt I
//! ```
//!
//! The state is the position error to the goal and the input is the commanded
//! velocity.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Matrix2, Vector2};

// Internal
use super::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Discrete linear system `x[k+1] = A x[k] + B u[k]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemModel {
    /// The time step the model was discretised with
    pub dt_s: f64,

    /// State transition matrix
    pub a: Matrix2<f64>,

    /// Input matrix
    pub b: Matrix2<f64>,
}

/// Quadratic cost weights of the regulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostWeights {
    /// State cost
    pub q: Matrix2<f64>,

    /// Input cost
    pub r: Matrix2<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SystemModel {
    /// Point mass with direct velocity input, discretised at `dt_s`.
    pub fn point_mass(dt_s: f64) -> Self {
        Self {
            dt_s,
            a: Matrix2::identity(),
            b: Matrix2::identity() * dt_s,
        }
    }

    /// Advance the state by one step.
    pub fn step(&self, x: &Vector2<f64>, u: &Vector2<f64>) -> Vector2<f64> {
        self.a * x + self.b * u
    }
}

impl CostWeights {
    /// Build diagonal weights.
    pub fn from_diag(q_diag: [f64; 2], r_diag: [f64; 2]) -> Self {
        Self {
            q: Matrix2::from_diagonal(&Vector2::new(q_diag[0], q_diag[1])),
            r: Matrix2::from_diagonal(&Vector2::new(r_diag[0], r_diag[1])),
        }
    }
}

impl From<&Params> for SystemModel {
    fn from(params: &Params) -> Self {
        Self::point_mass(params.dt_s)
    }
}

impl From<&Params> for CostWeights {
    fn from(params: &Params) -> Self {
        Self::from_diag(params.q_diag, params.r_diag)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_mass() {
        let model = SystemModel::point_mass(0.05);

        assert_eq!(model.a, Matrix2::identity());
        assert_eq!(model.b, Matrix2::new(0.05, 0.0, 0.0, 0.05));

        // One step at 2 m/s in x and -1 m/s in y
        let x = model.step(&Vector2::new(1.0, 1.0), &Vector2::new(2.0, -1.0));
        assert_relative_eq!(x[0], 1.1, epsilon = 1e-12);
        assert_relative_eq!(x[1], 0.95, epsilon = 1e-12);
    }

    #[test]
    fn test_from_params() {
        let params = Params {
            dt_s: 0.1,
            q_diag: [2.0, 3.0],
            r_diag: [0.5, 0.25],
            ..Params::default()
        };

        let model = SystemModel::from(&params);
        assert_eq!(model.dt_s, 0.1);
        assert_eq!(model.b, Matrix2::identity() * 0.1);

        let weights = CostWeights::from(&params);
        assert_eq!(weights.q, Matrix2::new(2.0, 0.0, 0.0, 3.0));
        assert_eq!(weights.r, Matrix2::new(0.5, 0.0, 0.0, 0.25));
    }
}
