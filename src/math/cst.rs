//! Constant-strain triangle
//!
//! DOF order: u1, v1, u2, v2, u3, v3. Nodes may be given in either winding;
//! the signed area keeps B consistent and the stiffness uses |A|.

use super::{Mat3, Mat3x6, Mat6, Vec3, Vec6};
use crate::error::GeometryFault;

/// Relative size under which twice the area counts as zero
const DEGENERATE_TOLERANCE: f64 = 1e-12;

/// Signed area, positive for counter-clockwise node order
pub fn signed_area(coords: &[[f64; 2]; 3]) -> f64 {
    let [[x1, y1], [x2, y2], [x3, y3]] = *coords;
    0.5 * ((x2 - x1) * (y3 - y1) - (x3 - x1) * (y2 - y1))
}

fn max_edge_squared(coords: &[[f64; 2]; 3]) -> f64 {
    (0..3)
        .map(|i| {
            let (a, b) = (coords[i], coords[(i + 1) % 3]);
            (b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)
        })
        .fold(0.0, f64::max)
}

/// Strain-displacement matrix and signed area
///
/// Only a zero area is a [`GeometryFault::DegenerateArea`]. A clockwise
/// triangle has a negative area and gives the same B as its
/// counter-clockwise reordering; assembly accepts it and records
/// `AssemblyWarning::ClockwiseElement`.
pub fn cst_b_matrix(coords: &[[f64; 2]; 3]) -> Result<(Mat3x6, f64), GeometryFault> {
    let area = signed_area(coords);
    let two_a = 2.0 * area;
    let edge2 = max_edge_squared(coords);
    if edge2 == 0.0 || two_a.abs() <= DEGENERATE_TOLERANCE * edge2 {
        return Err(GeometryFault::DegenerateArea { area });
    }

    let [[x1, y1], [x2, y2], [x3, y3]] = *coords;
    let (b1, b2, b3) = (y2 - y3, y3 - y1, y1 - y2);
    let (c1, c2, c3) = (x3 - x2, x1 - x3, x2 - x1);

    #[rustfmt::skip]
    let b = Mat3x6::from_row_slice(&[
        b1,  0.0, b2,  0.0, b3,  0.0,
        0.0, c1,  0.0, c2,  0.0, c3,
        c1,  b1,  c2,  b2,  c3,  b3,
    ]) / two_a;

    Ok((b, area))
}

/// Element stiffness `t·|A|·BᵀDB`
pub fn cst_stiffness(coords: &[[f64; 2]; 3], d: &Mat3, thickness: f64) -> Result<Mat6, GeometryFault> {
    let (b, area) = cst_b_matrix(coords)?;
    Ok(b.transpose() * d * b * (thickness * area.abs()))
}

/// Element stress (σx, σy, τxy) from nodal displacements
pub fn cst_stress(coords: &[[f64; 2]; 3], d: &Mat3, u: &Vec6) -> Result<Vec3, GeometryFault> {
    let (b, _) = cst_b_matrix(coords)?;
    Ok(d * (b * u))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{constitutive_matrix, PlaneFormulation};
    use approx::assert_relative_eq;

    const TRI: [[f64; 2]; 3] = [[0.0, 0.0], [2.0, 0.0], [0.0, 1.0]];

    #[test]
    fn test_rigid_body_modes_are_stress_free() {
        let d = constitutive_matrix(200e9, 0.3, PlaneFormulation::Stress);
        let k = cst_stiffness(&TRI, &d, 0.01).unwrap();

        let translation = Vec6::new(1.0, 0.0, 1.0, 0.0, 1.0, 0.0);
        // small rotation about the origin: u = -θy, v = θx
        let rotation = Vec6::new(0.0, 0.0, 0.0, 2.0, -1.0, 0.0);
        let scale = k.amax();
        assert!((k * translation).amax() / scale < 1e-12);
        assert!((k * rotation).amax() / scale < 1e-12);
    }

    #[test]
    fn test_clockwise_order_gives_same_stiffness() {
        let d = constitutive_matrix(200e9, 0.3, PlaneFormulation::Stress);
        let ccw = cst_stiffness(&TRI, &d, 0.01).unwrap();
        let cw = cst_stiffness(&[TRI[0], TRI[2], TRI[1]], &d, 0.01).unwrap();
        let (_, area) = cst_b_matrix(&[TRI[0], TRI[2], TRI[1]]).unwrap();
        assert!(area < 0.0);
        // swapping nodes 2 and 3 permutes DOF pairs (2,3) <-> (4,5)
        assert_relative_eq!(ccw[(0, 0)], cw[(0, 0)], max_relative = 1e-12);
        assert_relative_eq!(ccw[(2, 2)], cw[(4, 4)], max_relative = 1e-12);
        assert_relative_eq!(ccw[(1, 3)], cw[(1, 5)], max_relative = 1e-12);
    }

    #[test]
    fn test_uniform_strain_recovered() {
        let d = constitutive_matrix(1000.0, 0.0, PlaneFormulation::Stress);
        // u = 0.001·x
        let u = Vec6::new(0.0, 0.0, 0.002, 0.0, 0.0, 0.0);
        let s = cst_stress(&TRI, &d, &u).unwrap();
        assert_relative_eq!(s[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(s[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(s[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_collinear_nodes_rejected() {
        let d = constitutive_matrix(1.0, 0.3, PlaneFormulation::Stress);
        let line = [[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]];
        assert!(matches!(
            cst_stiffness(&line, &d, 1.0),
            Err(GeometryFault::DegenerateArea { .. })
        ));
    }
}
