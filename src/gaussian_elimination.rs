use crate::error::{ReconstructionError, Result};
use crate::Real;
use na::{DMatrix, DVector};

/// Default relative pivot tolerance of [`solve_gaussian_elimination`].
pub const DEFAULT_PIVOT_EPSILON: Real = 1.0e-12;

/// Solves `a * x = b` with Gaussian elimination and partial pivoting.
///
/// Both `a` and `b` are taken by value and consumed: `a` is overwritten by the eliminated
/// upper-triangular factor and the storage of `b` is reused for the returned solution.
/// Clone them first if the original system is needed afterward.
///
/// A pivot whose magnitude is not above `epsilon * max|a_ij|` makes the solve fail with
/// [`ReconstructionError::NumericalFailure`] instead of dividing by it. This happens for
/// singular or severely ill-conditioned systems, e.g., when two sample points coincide.
/// Non-finite entries in `a` or `b` also end in a `NumericalFailure`: they either reach a
/// pivot or a solution component, and neither is ever returned as NaN or infinite.
pub fn solve_gaussian_elimination(
    mut a: DMatrix<Real>,
    mut b: DVector<Real>,
    epsilon: Real,
) -> Result<DVector<Real>> {
    let n = b.len();

    if !a.is_square() || a.nrows() != n {
        return Err(ReconstructionError::InvalidInput(format!(
            "cannot solve a {}x{} system with a right-hand side of length {n}",
            a.nrows(),
            a.ncols()
        )));
    }

    let tolerance = epsilon * a.amax();

    for i in 0..n {
        // Select the pivot. `iamax` is relative to row `i`, ties keep the first row.
        let pivot_row = i + a.view_range(i.., i).iamax();

        if pivot_row != i {
            a.swap_rows(i, pivot_row);
            b.swap_rows(i, pivot_row);
        }

        let pivot = a[(i, i)];

        if pivot.abs() <= tolerance || !pivot.is_finite() {
            log::warn!("gaussian elimination stopped at step {i}: pivot {pivot:e}");
            return Err(ReconstructionError::NumericalFailure {
                step: i,
                pivot,
                tolerance,
            });
        }

        // Forward elimination.
        for k in i + 1..n {
            let factor = a[(k, i)] / pivot;

            if factor != 0.0 {
                b[k] -= factor * b[i];
                for j in i..n {
                    let aij = a[(i, j)];
                    a[(k, j)] -= factor * aij;
                }
            }
        }
    }

    // Back substitution, written into `b`.
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in i + 1..n {
            sum += a[(i, j)] * b[j];
        }
        b[i] = (b[i] - sum) / a[(i, i)];
    }

    if let Some(step) = b.iter().position(|x| !x.is_finite()) {
        log::warn!("gaussian elimination produced a non-finite solution at row {step}");
        return Err(ReconstructionError::NumericalFailure {
            step,
            pivot: a[(step, step)],
            tolerance,
        });
    }

    log::debug!("solved a {n}x{n} dense system");
    Ok(b)
}

#[cfg(test)]
mod test {
    use super::{solve_gaussian_elimination, DEFAULT_PIVOT_EPSILON};
    use crate::ReconstructionError;
    use na::{DMatrix, DVector};

    #[test]
    fn solves_a_system_requiring_pivoting() {
        // The leading zero forces a row swap on the first step.
        let a = DMatrix::from_row_slice(3, 3, &[0.0, 2.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let expected = DVector::from_column_slice(&[1.0, -2.0, 3.0]);
        let b = &a * &expected;

        let x = solve_gaussian_elimination(a, b, DEFAULT_PIVOT_EPSILON).unwrap();
        assert!((x - expected).amax() < 1.0e-12);
    }

    #[test]
    fn solution_satisfies_the_original_system() {
        let n = 8;
        let a = DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                4.0 + i as f64
            } else {
                1.0 / (1.0 + i as f64 + 2.0 * j as f64)
            }
        });
        let b = DVector::from_fn(n, |i, _| (i as f64).sin());
        let x = solve_gaussian_elimination(a.clone(), b.clone(), DEFAULT_PIVOT_EPSILON).unwrap();

        assert!((&a * &x - b).amax() < 1.0e-12);
    }

    #[test]
    fn zero_rhs_gives_zero_weights() {
        let a = DMatrix::from_row_slice(2, 2, &[0.1, 1.0, 1.0, 0.1]);
        let x = solve_gaussian_elimination(a, DVector::zeros(2), DEFAULT_PIVOT_EPSILON).unwrap();
        assert_eq!(x.amax(), 0.0);
    }

    #[test]
    fn singular_system_is_a_numerical_failure() {
        let a = DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 0.0, 1.0, 1.0]);
        let b = DVector::from_column_slice(&[1.0, 1.0, 1.0]);
        let err = solve_gaussian_elimination(a, b, DEFAULT_PIVOT_EPSILON).unwrap_err();

        assert!(matches!(err, ReconstructionError::NumericalFailure { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn zero_matrix_is_a_numerical_failure_at_the_first_step() {
        let err = solve_gaussian_elimination(DMatrix::zeros(2, 2), DVector::zeros(2), 0.0)
            .unwrap_err();
        assert!(matches!(
            err,
            ReconstructionError::NumericalFailure { step: 0, .. }
        ));
    }

    #[test]
    fn tolerance_follows_the_matrix_scale() {
        let expected = DVector::from_column_slice(&[1.0, -2.0, 3.0]);

        for scale in [1.0e-20, 1.0e20] {
            let a = DMatrix::from_row_slice(3, 3, &[4.0, 1.0, 0.5, 1.0, 3.0, 1.0, 0.5, 1.0, 2.0])
                * scale;
            let b = &a * &expected;
            let x = solve_gaussian_elimination(a, b, DEFAULT_PIVOT_EPSILON).unwrap();
            assert!((x - &expected).amax() < 1.0e-12);

            // Rows differing by 1e-15 relative stay singular at any scale.
            let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 1.0, 2.0 + 1.0e-15]) * scale;
            let b = DVector::from_column_slice(&[1.0, 1.0]) * scale;
            let err = solve_gaussian_elimination(a, b, DEFAULT_PIVOT_EPSILON).unwrap_err();
            assert!(matches!(
                err,
                ReconstructionError::NumericalFailure { step: 1, .. }
            ));
        }
    }

    #[test]
    fn non_finite_entries_are_a_numerical_failure() {
        let systems = [
            // Never used as a pivot and skipped by elimination: reaches back substitution.
            (vec![2.0, f64::NAN, 0.0, 1.0], vec![1.0, 1.0]),
            (vec![f64::NAN, 1.0, 1.0, 2.0], vec![1.0, 1.0]),
            (vec![f64::INFINITY, 1.0, 1.0, 2.0], vec![1.0, 1.0]),
            (vec![1.0, f64::NEG_INFINITY, 0.0, 1.0], vec![1.0, 1.0]),
            (vec![2.0, 1.0, 1.0, 3.0], vec![f64::NAN, 1.0]),
        ];

        for (entries, rhs) in systems {
            let a = DMatrix::from_row_slice(2, 2, &entries);
            let b = DVector::from_vec(rhs);
            let err = solve_gaussian_elimination(a, b, DEFAULT_PIVOT_EPSILON).unwrap_err();
            assert!(matches!(err, ReconstructionError::NumericalFailure { .. }));
        }
    }

    #[test]
    fn pivot_ties_keep_the_first_row() {
        // With `epsilon = 1` no pivot passes, so the failure reports which row was selected.
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, -1.0, 0.5]);
        let err = solve_gaussian_elimination(a, DVector::zeros(2), 1.0).unwrap_err();
        assert_eq!(
            err,
            ReconstructionError::NumericalFailure {
                step: 0,
                pivot: 1.0,
                tolerance: 1.0,
            }
        );

        let a = DMatrix::from_row_slice(2, 2, &[-1.0, 0.5, 1.0, 0.0]);
        let err = solve_gaussian_elimination(a, DVector::zeros(2), 1.0).unwrap_err();
        assert!(matches!(
            err,
            ReconstructionError::NumericalFailure { step: 0, pivot, .. } if pivot == -1.0
        ));

        // A tie between equal candidates solves without swapping.
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, -2.0, 1.0]);
        let b = DVector::from_column_slice(&[3.0, -1.0]);
        let x = solve_gaussian_elimination(a, b, DEFAULT_PIVOT_EPSILON).unwrap();
        assert!((x - DVector::from_column_slice(&[1.0, 1.0])).amax() < 1.0e-15);
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let err = solve_gaussian_elimination(
            DMatrix::identity(3, 3),
            DVector::zeros(2),
            DEFAULT_PIVOT_EPSILON,
        )
        .unwrap_err();
        assert!(matches!(err, ReconstructionError::InvalidInput(_)));

        let err = solve_gaussian_elimination(
            DMatrix::zeros(2, 3),
            DVector::zeros(2),
            DEFAULT_PIVOT_EPSILON,
        )
        .unwrap_err();
        assert!(matches!(err, ReconstructionError::InvalidInput(_)));
    }
}
