//! Bilinear isoparametric quadrilateral
//!
//! Natural corners (-1,-1), (1,-1), (1,1), (-1,1) map to the element's nodes
//! in the order given. DOF order: u1, v1, u2, v2, u3, v3, u4, v4.

use super::{Mat3, Mat3x8, Mat8, Vec3, Vec8};
use crate::error::GeometryFault;

const XI_NODES: [f64; 4] = [-1.0, 1.0, 1.0, -1.0];
const ETA_NODES: [f64; 4] = [-1.0, -1.0, 1.0, 1.0];

/// Relative size under which detJ counts as non-positive
const JACOBIAN_TOLERANCE: f64 = 1e-12;

const G: f64 = 0.577_350_269_189_625_8; // 1/sqrt(3)

/// 2x2 Gauss points, weight 1 each
pub const GAUSS_POINTS: [(f64, f64); 4] = [(-G, -G), (G, -G), (G, G), (-G, G)];

/// Shape function derivatives with respect to ξ and η
fn shape_derivatives(xi: f64, eta: f64) -> ([f64; 4], [f64; 4]) {
    let mut dn_dxi = [0.0; 4];
    let mut dn_deta = [0.0; 4];
    for i in 0..4 {
        dn_dxi[i] = XI_NODES[i] * (1.0 + ETA_NODES[i] * eta) / 4.0;
        dn_deta[i] = ETA_NODES[i] * (1.0 + XI_NODES[i] * xi) / 4.0;
    }
    (dn_dxi, dn_deta)
}

fn size_squared(coords: &[[f64; 2]; 4]) -> f64 {
    (0..4)
        .map(|i| {
            let (a, b) = (coords[i], coords[(i + 1) % 4]);
            (b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)
        })
        .fold(0.0, f64::max)
}

/// Strain-displacement matrix and Jacobian determinant at (ξ, η)
pub fn quad4_b_matrix(
    coords: &[[f64; 2]; 4],
    xi: f64,
    eta: f64,
) -> Result<(Mat3x8, f64), GeometryFault> {
    let (dn_dxi, dn_deta) = shape_derivatives(xi, eta);

    // J = [[dx/dξ, dy/dξ], [dx/dη, dy/dη]]
    let mut j = [[0.0; 2]; 2];
    for i in 0..4 {
        j[0][0] += dn_dxi[i] * coords[i][0];
        j[0][1] += dn_dxi[i] * coords[i][1];
        j[1][0] += dn_deta[i] * coords[i][0];
        j[1][1] += dn_deta[i] * coords[i][1];
    }
    let det_j = j[0][0] * j[1][1] - j[0][1] * j[1][0];
    // detJ scales like a quarter of the element area
    if det_j <= JACOBIAN_TOLERANCE * size_squared(coords) {
        return Err(GeometryFault::NonPositiveJacobian { det_j, xi, eta });
    }

    let inv = [
        [j[1][1] / det_j, -j[0][1] / det_j],
        [-j[1][0] / det_j, j[0][0] / det_j],
    ];

    let mut b = Mat3x8::zeros();
    for i in 0..4 {
        let dn_dx = inv[0][0] * dn_dxi[i] + inv[0][1] * dn_deta[i];
        let dn_dy = inv[1][0] * dn_dxi[i] + inv[1][1] * dn_deta[i];
        b[(0, 2 * i)] = dn_dx;
        b[(1, 2 * i + 1)] = dn_dy;
        b[(2, 2 * i)] = dn_dy;
        b[(2, 2 * i + 1)] = dn_dx;
    }

    Ok((b, det_j))
}

/// Element stiffness by 2x2 Gauss quadrature
///
/// Fails at the first Gauss point where detJ is not positive.
pub fn quad4_stiffness(coords: &[[f64; 2]; 4], d: &Mat3, thickness: f64) -> Result<Mat8, GeometryFault> {
    let mut k = Mat8::zeros();
    for &(xi, eta) in &GAUSS_POINTS {
        let (b, det_j) = quad4_b_matrix(coords, xi, eta)?;
        k += b.transpose() * d * b * (thickness * det_j);
    }
    Ok(k)
}

/// Element stress (σx, σy, τxy) averaged over the Gauss points
pub fn quad4_stress(coords: &[[f64; 2]; 4], d: &Mat3, u: &Vec8) -> Result<Vec3, GeometryFault> {
    let mut sum = Vec3::zeros();
    for &(xi, eta) in &GAUSS_POINTS {
        let (b, _) = quad4_b_matrix(coords, xi, eta)?;
        sum += d * (b * u);
    }
    Ok(sum / GAUSS_POINTS.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{constitutive_matrix, PlaneFormulation};
    use approx::assert_relative_eq;

    const SQUARE: [[f64; 2]; 4] = [[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];

    #[test]
    fn test_jacobian_of_square() {
        let (_, det_j) = quad4_b_matrix(&SQUARE, 0.3, -0.2).unwrap();
        // area 4 over a reference area of 4
        assert_relative_eq!(det_j, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_stiffness_symmetric_and_translation_free() {
        let d = constitutive_matrix(70e9, 0.33, PlaneFormulation::Stress);
        let distorted = [[0.0, 0.0], [3.0, 0.2], [2.6, 2.1], [0.3, 1.7]];
        let k = quad4_stiffness(&distorted, &d, 0.005).unwrap();
        let scale = k.amax();
        assert!((k - k.transpose()).amax() / scale < 1e-12);

        let ux = Vec8::from_fn(|i, _| if i % 2 == 0 { 1.0 } else { 0.0 });
        assert!((k * ux).amax() / scale < 1e-12);
    }

    #[test]
    fn test_linear_field_gives_constant_stress() {
        let d = constitutive_matrix(1000.0, 0.25, PlaneFormulation::Strain);
        // u = 0.001·y (pure shear strain)
        let u = Vec8::from_fn(|i, _| if i % 2 == 0 { 0.001 * SQUARE[i / 2][1] } else { 0.0 });
        let s = quad4_stress(&SQUARE, &d, &u).unwrap();
        assert_relative_eq!(s[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(s[2], d[(2, 2)] * 0.001, epsilon = 1e-12);
    }

    #[test]
    fn test_inverted_quad_rejected() {
        let d = constitutive_matrix(1.0, 0.3, PlaneFormulation::Stress);
        let clockwise = [SQUARE[0], SQUARE[3], SQUARE[2], SQUARE[1]];
        assert!(matches!(
            quad4_stiffness(&clockwise, &d, 1.0),
            Err(GeometryFault::NonPositiveJacobian { .. })
        ));

        let bowtie = [SQUARE[0], SQUARE[2], SQUARE[1], SQUARE[3]];
        assert!(quad4_stiffness(&bowtie, &d, 1.0).is_err());
    }
}
