//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Matrix2, Vector2};

/// Clamp each element of a vector independently into `[min, max]`.
pub fn clamp_elements(value: &Vector2<f64>, min: f64, max: f64) -> Vector2<f64> {
    value.map(|v| v.clamp(min, max))
}

/// Largest eigenvalue magnitude of the matrix.
///
/// Eigenvalues are taken from the real Schur decomposition so complex pairs
/// are handled. A discrete-time system `x[k+1] = M x[k]` is asymptotically
/// stable iff this is strictly less than one.
pub fn spectral_radius(matrix: &Matrix2<f64>) -> f64 {
    matrix
        .complex_eigenvalues()
        .iter()
        .map(|l| l.norm_sqr().sqrt())
        .fold(0f64, f64::max)
}

/// Largest absolute element-wise difference between two matrices.
pub fn max_abs_diff(a: &Matrix2<f64>, b: &Matrix2<f64>) -> f64 {
    (a - b).iter().fold(0f64, |m, v| m.max(v.abs()))
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clamp_elements() {
        let v = clamp_elements(&Vector2::new(-10.0, 0.5), -2.0, 1.0);
        assert_eq!(v, Vector2::new(-2.0, 0.5));

        let v = clamp_elements(&Vector2::new(3.0, -0.1), 0.0, 1.0);
        assert_eq!(v, Vector2::new(1.0, 0.0));
    }

    #[test]
    fn test_spectral_radius() {
        // Real eigenvalues 0.5 and -0.9
        let m = Matrix2::new(0.5, 0.0, 0.0, -0.9);
        assert_relative_eq!(spectral_radius(&m), 0.9, epsilon = 1e-12);

        // Rotation by 90 degrees scaled by 0.8, eigenvalues +/- 0.8i
        let m = Matrix2::new(0.0, -0.8, 0.8, 0.0);
        assert_relative_eq!(spectral_radius(&m), 0.8, epsilon = 1e-12);

        assert_relative_eq!(spectral_radius(&Matrix2::identity()), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_max_abs_diff() {
        let a = Matrix2::new(1.0, 2.0, 3.0, 4.0);
        let b = Matrix2::new(1.0, 2.5, 1.0, 4.0);
        assert_eq!(max_abs_diff(&a, &b), 2.0);
    }
}
