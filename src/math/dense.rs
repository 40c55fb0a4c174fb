//! Dense direct solves on nalgebra's factorisations

use super::{Mat, Vec};

/// Factorisation stopped on a pivot below tolerance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotBreakdown {
    /// Column (in the system passed to the solver) where factorisation failed
    pub column: usize,
    /// Pivot found in that column
    pub pivot: f64,
}

/// Solve `a·x = b` by LU decomposition with partial pivoting
///
/// A pivot of `U` is rejected when its magnitude is not above
/// `pivot_tolerance · max|diag(a)|`. A non-finite solution component is
/// reported as a breakdown at that component.
pub fn solve_linear_system(a: Mat, b: &Vec, pivot_tolerance: f64) -> Result<Vec, PivotBreakdown> {
    if b.is_empty() {
        return Ok(Vec::zeros(0));
    }

    let scale = a.diagonal().amax();
    let threshold = pivot_tolerance * scale.max(f64::MIN_POSITIVE);

    let lu = a.lu();
    let pivots = lu.u().diagonal();
    // negated comparison also catches NaN
    if let Some(column) = pivots.iter().position(|p| !(p.abs() > threshold)) {
        return Err(PivotBreakdown {
            column,
            pivot: pivots[column],
        });
    }

    let x = lu.solve(b).ok_or(PivotBreakdown {
        column: 0,
        pivot: pivots[0],
    })?;
    match x.iter().position(|v| !v.is_finite()) {
        Some(column) => Err(PivotBreakdown {
            column,
            pivot: pivots[column],
        }),
        None => Ok(x),
    }
}

/// Solve a symmetric system by Cholesky decomposition
///
/// `None` when `a` is not positive definite.
pub fn solve_cholesky(a: Mat, b: &Vec) -> Option<Vec> {
    if b.is_empty() {
        return Some(Vec::zeros(0));
    }
    a.cholesky()
        .map(|chol| chol.solve(b))
        .filter(|x| x.iter().all(|v| v.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solves_with_row_swap() {
        // zero leading entry forces a pivot swap
        let a = Mat::from_row_slice(3, 3, &[0.0, 2.0, 1.0, 1.0, 1.0, 0.0, 2.0, 0.0, 3.0]);
        let b = Vec::from_vec(vec![5.0, 3.0, 11.0]);
        let x = solve_linear_system(a.clone(), &b, 1e-12).unwrap();
        let residual = &a * &x - &b;
        assert_relative_eq!(residual.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_reports_column() {
        let a = Mat::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = Vec::from_vec(vec![1.0, 2.0]);
        let err = solve_linear_system(a, &b, 1e-12).unwrap_err();
        assert_eq!(err.column, 1);
        assert!(err.pivot.abs() < 1e-12);
    }

    #[test]
    fn test_empty_system() {
        let x = solve_linear_system(Mat::zeros(0, 0), &Vec::zeros(0), 1e-12).unwrap();
        assert_eq!(x.len(), 0);
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        let spd = Mat::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let b = Vec::from_vec(vec![1.0, 2.0]);
        let x = solve_cholesky(spd.clone(), &b).unwrap();
        assert_relative_eq!((&spd * &x - &b).norm(), 0.0, epsilon = 1e-12);

        // eigenvalues 3 and -1
        let indefinite = Mat::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        assert!(solve_cholesky(indefinite.clone(), &b).is_none());
        // LU still solves it
        assert!(solve_linear_system(indefinite, &b, 1e-12).is_ok());
    }
}
