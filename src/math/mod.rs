//! Mathematical utilities for FEA calculations

pub mod beam;
pub mod constitutive;
pub mod cst;
pub mod dense;
pub mod quad4;

use nalgebra::{DMatrix, DVector, Matrix3, Matrix6, SMatrix, SVector, Vector3, Vector6};

pub use beam::{
    beam_geometric_stiffness, beam_local_stiffness, beam_matrices, beam_transformation_matrix,
    equivalent_nodal_loads, BeamGeometry, BeamMatrices, LocalLoad,
};
pub use constitutive::{constitutive_matrix, PlaneFormulation};
pub use cst::{cst_b_matrix, cst_stiffness, cst_stress, signed_area};
pub use dense::{solve_cholesky, solve_linear_system, PivotBreakdown};
pub use quad4::{quad4_b_matrix, quad4_stiffness, quad4_stress, GAUSS_POINTS};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;
pub type Mat3 = Matrix3<f64>;
pub type Vec3 = Vector3<f64>;

/// 6x6 matrix for beam and triangle stiffness
pub type Mat6 = Matrix6<f64>;
/// 6-element vector for beam and triangle end forces/displacements
pub type Vec6 = Vector6<f64>;
/// 8x8 matrix for quad stiffness
pub type Mat8 = SMatrix<f64, 8, 8>;
/// 8-element vector for quad displacements
pub type Vec8 = SVector<f64, 8>;
/// Strain-displacement matrix of a triangle
pub type Mat3x6 = SMatrix<f64, 3, 6>;
/// Strain-displacement matrix of a quad
pub type Mat3x8 = SMatrix<f64, 3, 8>;

/// Relative size under which a condensed diagonal counts as zero
const CONDENSE_TOLERANCE: f64 = 1e-14;

/// Accumulate an element matrix into the global matrix at the given DOFs
pub fn scatter_add<const N: usize>(global: &mut Mat, local: &SMatrix<f64, N, N>, dofs: &[usize; N]) {
    for (i, &gi) in dofs.iter().enumerate() {
        for (j, &gj) in dofs.iter().enumerate() {
            global[(gi, gj)] += local[(i, j)];
        }
    }
}

/// Accumulate an element vector into the global vector at the given DOFs
pub fn scatter_add_vec<const N: usize>(global: &mut Vec, local: &SVector<f64, N>, dofs: &[usize; N]) {
    for (i, &gi) in dofs.iter().enumerate() {
        global[gi] += local[i];
    }
}

/// Statically condense DOF `c` out of an element matrix
///
/// Every retained pair is updated as `K[i][j] -= K[i][c]·K[c][j]/K[c][c]`,
/// then row and column `c` are zeroed. When a load vector is given it is
/// condensed with the same pivot (`f[i] -= K[i][c]·f[c]/K[c][c]`, `f[c] = 0`).
///
/// Returns `false` and leaves both untouched if `K[c][c]` is numerically zero.
pub fn condense_dof<const N: usize>(
    k: &mut SMatrix<f64, N, N>,
    f: Option<&mut SVector<f64, N>>,
    c: usize,
) -> bool {
    let kcc = k[(c, c)];
    let scale = k.amax();
    if scale == 0.0 || kcc.abs() <= CONDENSE_TOLERANCE * scale {
        return false;
    }

    if let Some(f) = f {
        let fc = f[c];
        for i in (0..N).filter(|&i| i != c) {
            f[i] -= k[(i, c)] * fc / kcc;
        }
        f[c] = 0.0;
    }

    for i in (0..N).filter(|&i| i != c) {
        let kic = k[(i, c)];
        for j in (0..N).filter(|&j| j != c) {
            let update = kic * k[(c, j)] / kcc;
            k[(i, j)] -= update;
        }
    }
    for i in 0..N {
        k[(i, c)] = 0.0;
        k[(c, i)] = 0.0;
    }
    true
}
