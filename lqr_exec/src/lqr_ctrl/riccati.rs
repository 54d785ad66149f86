//! # Discrete algebraic Riccati equation solver
//!
//! Finds the stabilizing solution `P` of
//!
//! ```text
//! P = A'PA - (A'PB)(R + B'PB)^-1 (B'PA) + Q
//! ```
//!
//! with the structure-preserving doubling algorithm. Starting from
//! `A_0 = A`, `G_0 = B R^-1 B'` and `H_0 = Q`, each step
//!
//! ```text
//! W       = I + G_k H_k
//! A_{k+1} = A_k W^-1 A_k
//! G_{k+1} = G_k + A_k W^-1 G_k A_k'
//! H_{k+1} = H_k + A_k' H_k W^-1 A_k
//! ```
//!
//! makes `H_k` equal to the `2^k`-th value iterate of the equation from
//! `P = Q`, so `H_k` converges quadratically to `P` even when the closed loop
//! pole is close to the unit circle. The result is verified by checking the
//! closed loop eigenvalues once the iteration has settled.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use nalgebra::Matrix2;

// Internal
use util::maths::{max_abs_diff, spectral_radius};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Iteration limits for the Riccati solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiccatiSettings {
    /// Maximum number of iterations
    pub max_iters: usize,

    /// Convergence threshold on the largest element change, relative to the
    /// largest element of `P` (or absolute once `P` is smaller than one).
    pub tolerance: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Failures of the Riccati solve.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum RiccatiError {
    /// `R + B'PB` could not be inverted.
    #[error("R + B'PB is singular")]
    SingularMatrix,

    /// No stabilizing solution exists for the given system.
    #[error("No stabilizing Riccati solution exists for the given (A, B) pair")]
    NotStabilizable,

    /// The iteration had not settled when the iteration limit was reached.
    #[error("Riccati iteration did not converge within {0} iterations")]
    NoConvergence(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for RiccatiSettings {
    fn default() -> Self {
        Self {
            max_iters: 10_000,
            tolerance: 1e-12,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Solve the DARE for the stabilizing solution `P`.
///
/// `R` must be invertible.
pub fn solve_dare(
    a: &Matrix2<f64>,
    b: &Matrix2<f64>,
    q: &Matrix2<f64>,
    r: &Matrix2<f64>,
    settings: &RiccatiSettings,
) -> Result<Matrix2<f64>, RiccatiError> {
    let r_inv = r.try_inverse().ok_or(RiccatiError::SingularMatrix)?;

    let mut ak = *a;
    let mut gk = b * r_inv * b.transpose();
    let mut hk = *q;

    for i in 0..settings.max_iters {
        let w_inv = (Matrix2::identity() + gk * hk)
            .try_inverse()
            .ok_or(RiccatiError::SingularMatrix)?;

        let w_inv_a = w_inv * ak;
        let an = ak * w_inv_a;
        let mut gn = gk + ak * w_inv * gk * ak.transpose();
        let mut hn = hk + ak.transpose() * hk * w_inv_a;

        // Symmetrise to stop rounding error accumulating in the off diagonal
        gn = (gn + gn.transpose()) * 0.5;
        hn = (hn + hn.transpose()) * 0.5;

        let finite = |m: &Matrix2<f64>| m.iter().all(|v| v.is_finite());
        if !(finite(&an) && finite(&gn) && finite(&hn)) {
            warn!("Riccati iteration diverged after {} iterations", i + 1);
            return Err(RiccatiError::NotStabilizable);
        }

        let change = max_abs_diff(&hn, &hk);
        let scale = hn.amax().max(1.0);
        ak = an;
        gk = gn;
        hk = hn;

        trace!("Riccati iteration {}: change {:e}", i + 1, change);

        if change <= settings.tolerance * scale {
            debug!("Riccati iteration converged after {} iterations", i + 1);

            // The fixed point must also stabilize the closed loop
            let closed_loop = a - b * raw_gain(a, b, r, &hk)?;
            let rho = spectral_radius(&closed_loop);
            if rho < 1.0 {
                return Ok(hk);
            }

            warn!(
                "Riccati solution does not stabilize the system (spectral radius {})",
                rho
            );
            return Err(RiccatiError::NotStabilizable);
        }
    }

    warn!(
        "Riccati iteration did not converge within {} iterations",
        settings.max_iters
    );
    Err(RiccatiError::NoConvergence(settings.max_iters))
}

/// Solve the DARE and return the feedback gain to be applied as `u = K x`.
///
/// The gain is the negation of the classical LQR gain
/// `(R + B'PB)^-1 (B'PA)`, so the closed loop is `A + B K`.
pub fn solve_dare_gain(
    a: &Matrix2<f64>,
    b: &Matrix2<f64>,
    q: &Matrix2<f64>,
    r: &Matrix2<f64>,
    settings: &RiccatiSettings,
) -> Result<Matrix2<f64>, RiccatiError> {
    let p = solve_dare(a, b, q, r, settings)?;
    let gain = -raw_gain(a, b, r, &p)?;

    debug!("LQR gain: {:?}", gain);

    Ok(gain)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// `(R + B'PB)^-1 (B'PA)`
fn raw_gain(
    a: &Matrix2<f64>,
    b: &Matrix2<f64>,
    r: &Matrix2<f64>,
    p: &Matrix2<f64>,
) -> Result<Matrix2<f64>, RiccatiError> {
    let bt = b.transpose();

    let inv = (r + bt * p * b)
        .try_inverse()
        .ok_or(RiccatiError::SingularMatrix)?;

    Ok(inv * bt * p * a)
}
