//! Weighted least-squares solve.
//!
//! The overdetermined system `min sum_r w_r (A x - b)_r^2` is reduced to the
//! normal equations `(A^T W A) x = A^T W b`, which are symmetric positive
//! definite whenever every unknown is constrained. They are solved with a
//! Jacobi-preconditioned conjugate gradient; the diagonal scaling matters
//! because row weights routinely span six orders of magnitude.

use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use super::assemble::LinearSystem;
use crate::error::{MeshError, Result};

/// Options for the conjugate gradient solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    /// Maximum number of conjugate gradient iterations.
    pub max_iterations: usize,

    /// Relative tolerance on the preconditioned residual.
    pub tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            tolerance: 1e-12,
        }
    }
}

impl SolverOptions {
    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the relative tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Normal equations `M x = rhs` of a weighted least-squares system.
#[derive(Debug, Clone)]
pub struct NormalEquations {
    /// `A^T W A`.
    pub matrix: CsrMatrix<f64>,
    /// `A^T W b`.
    pub rhs: DVector<f64>,
}

impl NormalEquations {
    /// Form the normal equations of `system`.
    ///
    /// Zero coefficients and rows with zero weight contribute nothing and
    /// are skipped.
    pub fn from_system(system: &LinearSystem) -> Result<Self> {
        let n = system.num_cols;
        let num_rows = system.num_rows();
        if system.weights.len() != num_rows {
            return Err(MeshError::InternalInvariant(format!(
                "{} weights for {} rows",
                system.weights.len(),
                num_rows
            )));
        }

        let mut a = CooMatrix::new(num_rows, n);
        for e in &system.entries {
            if e.row >= num_rows || e.col >= n {
                return Err(MeshError::InternalInvariant(format!(
                    "entry ({}, {}) outside a {}x{} system",
                    e.row, e.col, num_rows, n
                )));
            }
            if e.value != 0.0 {
                a.push(e.row, e.col, e.value);
            }
        }
        // Merges duplicates and sorts each row
        let a = CsrMatrix::from(&a);

        let mut m = CooMatrix::new(n, n);
        let mut rhs = DVector::zeros(n);
        for (r, row) in a.row_iter().enumerate() {
            let w = system.weights[r];
            if w == 0.0 {
                continue;
            }
            let cols = row.col_indices();
            let vals = row.values();
            for (&i, &ai) in cols.iter().zip(vals) {
                rhs[i] += w * ai * system.rhs[r];
                for (&j, &aj) in cols.iter().zip(vals) {
                    m.push(i, j, w * ai * aj);
                }
            }
        }

        Ok(Self {
            matrix: CsrMatrix::from(&m),
            rhs,
        })
    }

    /// Diagonal of the matrix.
    pub fn diagonal(&self) -> DVector<f64> {
        let mut d = DVector::zeros(self.matrix.nrows());
        for (i, row) in self.matrix.row_iter().enumerate() {
            if let Some(k) = row.col_indices().iter().position(|&c| c == i) {
                d[i] = row.values()[k];
            }
        }
        d
    }
}

/// Multiply `m * x`.
fn mul_vec(m: &CsrMatrix<f64>, x: &DVector<f64>) -> DVector<f64> {
    let mut y = DVector::zeros(m.nrows());
    for (i, row) in m.row_iter().enumerate() {
        y[i] = row
            .col_indices()
            .iter()
            .zip(row.values())
            .map(|(&j, &v)| v * x[j])
            .sum();
    }
    y
}

/// Solve the weighted least-squares problem of `system`.
///
/// `x0` is an optional starting point (typically the current geometry).
///
/// # Errors
///
/// [`MeshError::SolverFailed`] (tagged with `system.iteration`) if an unknown
/// appears in no weighted row, the conjugate gradient breaks down or does not
/// reach the tolerance, or the result is not finite.
pub fn solve_weighted_least_squares(
    system: &LinearSystem,
    x0: Option<&DVector<f64>>,
    options: &SolverOptions,
) -> Result<DVector<f64>> {
    let iteration = system.iteration;
    let normal = NormalEquations::from_system(system)?;
    let n = system.num_cols;

    let diag = normal.diagonal();
    if let Some(col) = diag.iter().position(|&d| !(d > 0.0) || !d.is_finite()) {
        return Err(MeshError::solver_failed(
            iteration,
            format!("unknown {} is not constrained by any weighted row", col),
        ));
    }

    let x = preconditioned_cg(&normal.matrix, &normal.rhs, &diag, x0, options)
        .map_err(|reason| MeshError::solver_failed(iteration, reason))?;

    if x.len() != n || x.iter().any(|v| !v.is_finite()) {
        return Err(MeshError::solver_failed(iteration, "solution is not finite"));
    }
    Ok(x)
}

/// Jacobi-preconditioned conjugate gradient on a symmetric positive
/// definite matrix.
///
/// Convergence is measured in the preconditioned norm,
/// `sqrt(r^T D^-1 r) <= tolerance * sqrt(b^T D^-1 b)`, which weighs every
/// unknown by its own diagonal instead of letting the heaviest rows dominate.
fn preconditioned_cg(
    a: &CsrMatrix<f64>,
    b: &DVector<f64>,
    diag: &DVector<f64>,
    x0: Option<&DVector<f64>>,
    options: &SolverOptions,
) -> std::result::Result<DVector<f64>, String> {
    let n = b.len();
    let inv_diag = diag.map(|d| 1.0 / d);

    let b_norm = b.dot(&b.component_mul(&inv_diag)).sqrt();
    if b_norm == 0.0 {
        return Ok(DVector::zeros(n));
    }
    let threshold = options.tolerance * b_norm;

    let mut x = match x0 {
        Some(x0) if x0.len() == n => x0.clone(),
        _ => DVector::zeros(n),
    };

    // r = b - A*x
    let mut r = b - mul_vec(a, &x);
    let mut z = r.component_mul(&inv_diag);
    let mut rz = r.dot(&z);
    if rz.sqrt() <= threshold {
        return Ok(x);
    }

    let mut p = z.clone();

    for iter in 0..options.max_iterations {
        let ap = mul_vec(a, &p);

        let p_ap = p.dot(&ap);
        if !(p_ap > 0.0) {
            return Err(format!(
                "conjugate gradient broke down at step {} (p^T A p = {:e})",
                iter, p_ap
            ));
        }
        let alpha = rz / p_ap;

        x.axpy(alpha, &p, 1.0);
        r.axpy(-alpha, &ap, 1.0);

        z = r.component_mul(&inv_diag);
        let rz_new = r.dot(&z);
        if rz_new.sqrt() <= threshold {
            log::trace!("conjugate gradient converged after {} steps", iter + 1);
            return Ok(x);
        }

        let beta = rz_new / rz;
        p = &z + beta * &p;
        rz = rz_new;
    }

    Err(format!(
        "conjugate gradient did not converge in {} steps (relative residual {:e})",
        options.max_iterations,
        rz.sqrt() / b_norm
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::smooth::assemble::SystemEntry;

    fn system(
        num_cols: usize,
        entries: &[(usize, usize, f64)],
        weights: &[f64],
        rhs: &[f64],
    ) -> LinearSystem {
        LinearSystem {
            iteration: 3,
            num_cols,
            entries: entries
                .iter()
                .map(|&(row, col, value)| SystemEntry { row, col, value })
                .collect(),
            weights: weights.to_vec(),
            rhs: rhs.to_vec(),
        }
    }

    #[test]
    fn test_square_system_is_solved_exactly() {
        // [ 4  1 ] [ x ]   [ 1 ]
        // [ 1  3 ] [ y ] = [ 2 ]   =>  x = 1/11, y = 7/11
        let s = system(
            2,
            &[(0, 0, 4.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 3.0)],
            &[1.0, 1.0],
            &[1.0, 2.0],
        );
        let x = solve_weighted_least_squares(&s, None, &SolverOptions::default()).unwrap();
        assert!((x[0] - 1.0 / 11.0).abs() < 1e-10);
        assert!((x[1] - 7.0 / 11.0).abs() < 1e-10);
    }

    #[test]
    fn test_weights_pick_the_compromise() {
        // x = 0 with weight 1 and x = 1 with weight 3: minimiser is 3/4.
        let s = system(1, &[(0, 0, 1.0), (1, 0, 1.0)], &[1.0, 3.0], &[0.0, 1.0]);
        let x = solve_weighted_least_squares(&s, None, &SolverOptions::default()).unwrap();
        assert!((x[0] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_duplicate_entries_are_summed() {
        let s = system(1, &[(0, 0, 1.0), (0, 0, 1.0)], &[1.0], &[4.0]);
        let x = solve_weighted_least_squares(&s, None, &SolverOptions::default()).unwrap();
        assert!((x[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_heavily_weighted_pin_dominates() {
        // x pinned to 1 with weight 1e6, pulled to 0 with weight 0.1.
        let s = system(1, &[(0, 0, 1.0), (1, 0, 1.0)], &[1e6, 0.1], &[1.0, 0.0]);
        let x0 = DVector::from_vec(vec![1.0]);
        let x = solve_weighted_least_squares(&s, Some(&x0), &SolverOptions::default()).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_unconstrained_column_fails() {
        let s = system(2, &[(0, 0, 1.0)], &[1.0], &[1.0]);
        let err = solve_weighted_least_squares(&s, None, &SolverOptions::default()).unwrap_err();
        assert!(matches!(err, MeshError::SolverFailed { iteration: 3, .. }));

        // A zero weight removes the only row touching column 0.
        let s = system(1, &[(0, 0, 1.0)], &[0.0], &[1.0]);
        assert!(solve_weighted_least_squares(&s, None, &SolverOptions::default()).is_err());
    }

    #[test]
    fn test_iteration_cap_is_reported() {
        // Three coupled unknowns cannot converge in a single step.
        let s = system(
            3,
            &[
                (0, 0, 2.0),
                (0, 1, 1.0),
                (1, 1, 3.0),
                (1, 2, -1.0),
                (2, 0, 1.0),
                (2, 2, 5.0),
                (3, 0, 1.0),
                (3, 1, 1.0),
                (3, 2, 1.0),
            ],
            &[1.0, 2.0, 1.0, 4.0],
            &[1.0, -2.0, 3.0, 0.5],
        );
        let options = SolverOptions::default().with_max_iterations(1);
        assert!(matches!(
            solve_weighted_least_squares(&s, None, &options),
            Err(MeshError::SolverFailed { .. })
        ));

        let x = solve_weighted_least_squares(&s, None, &SolverOptions::default()).unwrap();
        assert!(x.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_normal_equations_match_dense_product() {
        let s = system(
            2,
            &[(0, 0, 1.0), (0, 1, 2.0), (1, 1, -1.0), (2, 0, 3.0)],
            &[2.0, 1.0, 0.5],
            &[1.0, 1.0, 2.0],
        );
        let normal = NormalEquations::from_system(&s).unwrap();

        // A^T W A computed by hand.
        let expected = [[2.0 * 1.0 + 0.5 * 9.0, 2.0 * 2.0], [2.0 * 2.0, 2.0 * 4.0 + 1.0]];
        for (i, row) in normal.matrix.row_iter().enumerate() {
            for (&j, &v) in row.col_indices().iter().zip(row.values()) {
                assert!((v - expected[i][j]).abs() < 1e-12);
            }
        }
        assert!((normal.rhs[0] - (2.0 * 1.0 + 0.5 * 3.0 * 2.0)).abs() < 1e-12);
        assert!((normal.rhs[1] - (2.0 * 2.0 - 1.0)).abs() < 1e-12);
    }
}
