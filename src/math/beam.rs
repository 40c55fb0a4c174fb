//! 2D Euler-Bernoulli beam math
//!
//! Local DOF order: u1, v1, θ1, u2, v2, θ2 with local x from node 1 to
//! node 2 and local y rotated +90° from it.

use super::{condense_dof, Mat6, Vec6};
use crate::elements::{BeamSection, EndReleases};
use crate::error::GeometryFault;
use crate::loads::DistributedLoad;

/// Beams shorter than this are rejected
const MIN_LENGTH: f64 = 1e-10;

/// Length and direction cosines of a beam
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamGeometry {
    pub length: f64,
    pub cos: f64,
    pub sin: f64,
}

impl BeamGeometry {
    pub fn from_coords(start: [f64; 2], end: [f64; 2]) -> Result<Self, GeometryFault> {
        let dx = end[0] - start[0];
        let dy = end[1] - start[1];
        let length = dx.hypot(dy);
        if length < MIN_LENGTH {
            return Err(GeometryFault::ZeroLength { length });
        }
        Ok(Self {
            length,
            cos: dx / length,
            sin: dy / length,
        })
    }
}

/// Compute the local stiffness matrix for a 2D frame element
///
/// # Arguments
/// * `e` - Modulus of elasticity
/// * `a` - Cross-sectional area
/// * `i` - Second moment of area
/// * `length` - Member length
pub fn beam_local_stiffness(e: f64, a: f64, i: f64, length: f64) -> Mat6 {
    let l = length;
    let ea_l = e * a / l;
    let ei_l3 = e * i / (l * l * l);
    let ei_l2 = e * i / (l * l);
    let ei_l = e * i / l;

    #[rustfmt::skip]
    let data = [
        ea_l,   0.0,           0.0,          -ea_l,  0.0,           0.0,
        0.0,    12.0*ei_l3,    6.0*ei_l2,    0.0,    -12.0*ei_l3,   6.0*ei_l2,
        0.0,    6.0*ei_l2,     4.0*ei_l,     0.0,    -6.0*ei_l2,    2.0*ei_l,
        -ea_l,  0.0,           0.0,          ea_l,   0.0,           0.0,
        0.0,    -12.0*ei_l3,   -6.0*ei_l2,   0.0,    12.0*ei_l3,    -6.0*ei_l2,
        0.0,    6.0*ei_l2,     2.0*ei_l,     0.0,    -6.0*ei_l2,    4.0*ei_l,
    ];

    Mat6::from_row_slice(&data)
}

/// Compute the consistent geometric stiffness matrix for P-Delta analysis
///
/// `axial` is tension positive, so compression softens the element.
pub fn beam_geometric_stiffness(axial: f64, length: f64) -> Mat6 {
    if axial.abs() < 1e-10 {
        return Mat6::zeros();
    }

    let l = length;
    let l2 = l * l;

    #[rustfmt::skip]
    let data = [
        0.0,  0.0,      0.0,      0.0,  0.0,      0.0,
        0.0,  36.0,     3.0*l,    0.0,  -36.0,    3.0*l,
        0.0,  3.0*l,    4.0*l2,   0.0,  -3.0*l,   -l2,
        0.0,  0.0,      0.0,      0.0,  0.0,      0.0,
        0.0,  -36.0,    -3.0*l,   0.0,  36.0,     -3.0*l,
        0.0,  3.0*l,    -l2,      0.0,  -3.0*l,   4.0*l2,
    ];

    Mat6::from_row_slice(&data) * (axial / (30.0 * l))
}

/// Rotation from global to local DOFs: `u_local = T·u_global`
pub fn beam_transformation_matrix(cos: f64, sin: f64) -> Mat6 {
    let mut t = Mat6::zeros();
    for offset in [0, 3] {
        t[(offset, offset)] = cos;
        t[(offset, offset + 1)] = sin;
        t[(offset + 1, offset)] = -sin;
        t[(offset + 1, offset + 1)] = cos;
        t[(offset + 2, offset + 2)] = 1.0;
    }
    t
}

/// Uniform line load in local axes over the parametric span `[a, b]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalLoad {
    pub qx: f64,
    pub qy: f64,
    pub a: f64,
    pub b: f64,
}

impl LocalLoad {
    /// Resolve a beam's distributed load into local intensities
    pub fn resolve(load: &DistributedLoad, geometry: &BeamGeometry) -> Self {
        let (qx, qy) = load.local_intensity(geometry.cos, geometry.sin);
        let (a, b) = load.span();
        Self { qx, qy, a, b }
    }

    /// Loaded region `[start, end]` in metres from node 1
    pub fn region(&self, length: f64) -> (f64, f64) {
        (self.a * length, self.b * length)
    }
}

/// Statically equivalent nodal loads (local axes) of a partial uniform load
///
/// Integrates the Hermite and linear shape functions over the loaded region.
pub fn equivalent_nodal_loads(load: &LocalLoad, length: f64) -> Vec6 {
    let l = length;
    let (la, lb) = load.region(l);
    if lb <= la {
        return Vec6::zeros();
    }

    let n1 = |x: f64| x - x.powi(3) / (l * l) + x.powi(4) / (2.0 * l.powi(3));
    let n2 = |x: f64| x * x / 2.0 - 2.0 * x.powi(3) / (3.0 * l) + x.powi(4) / (4.0 * l * l);
    let n3 = |x: f64| x.powi(3) / (l * l) - x.powi(4) / (2.0 * l.powi(3));
    let n4 = |x: f64| -x.powi(3) / (3.0 * l) + x.powi(4) / (4.0 * l * l);

    let span = lb - la;
    let mid = (load.a + load.b) / 2.0;
    let int_l1 = span * (1.0 - mid);
    let int_l2 = span * mid;

    Vec6::new(
        load.qx * int_l1,
        load.qy * (n1(lb) - n1(la)),
        load.qy * (n2(lb) - n2(la)),
        load.qx * int_l2,
        load.qy * (n3(lb) - n3(la)),
        load.qy * (n4(lb) - n4(la)),
    )
}

/// Everything the assembler and post-processor need from one beam
#[derive(Debug, Clone)]
pub struct BeamMatrices {
    pub geometry: BeamGeometry,
    /// Global to local rotation
    pub transform: Mat6,
    /// Global stiffness with releases condensed out
    pub k_global: Mat6,
    /// Global equivalent nodal loads, condensed with the stiffness
    pub f_equivalent: Vec6,
    /// Local intensities, if the beam carries a distributed load
    pub load: Option<LocalLoad>,
}

impl BeamMatrices {
    /// Local end forces acting on the element: `T·(K·u − λ·f_eq)`
    pub fn end_forces(&self, u_global: &Vec6, load_factor: f64) -> Vec6 {
        self.transform * (self.k_global * u_global - self.f_equivalent * load_factor)
    }
}

/// Build the global matrices of a beam
///
/// With `axial` set, the geometric stiffness for that axial force is added
/// before transformation. Releases condense the global rotation DOFs 2 and 5
/// together with the equivalent loads.
pub fn beam_matrices(
    start: [f64; 2],
    end: [f64; 2],
    e: f64,
    section: &BeamSection,
    load: Option<&DistributedLoad>,
    releases: EndReleases,
    axial: Option<f64>,
) -> Result<BeamMatrices, GeometryFault> {
    let geometry = BeamGeometry::from_coords(start, end)?;
    let transform = beam_transformation_matrix(geometry.cos, geometry.sin);

    let mut k_local = beam_local_stiffness(e, section.a, section.i, geometry.length);
    if let Some(n) = axial {
        k_local += beam_geometric_stiffness(n, geometry.length);
    }
    let mut k_global = transform.transpose() * k_local * transform;

    let load = load
        .filter(|l| !l.is_zero())
        .map(|l| LocalLoad::resolve(l, &geometry));
    let mut f_equivalent = load.map_or_else(Vec6::zeros, |l| {
        transform.transpose() * equivalent_nodal_loads(&l, geometry.length)
    });

    for (released, dof) in releases.as_array().into_iter().zip([2, 5]) {
        if released {
            condense_dof(&mut k_global, Some(&mut f_equivalent), dof);
        }
    }

    Ok(BeamMatrices {
        geometry,
        transform,
        k_global,
        f_equivalent,
        load,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_full_span_load_matches_fixed_end_forces() {
        let l = 6.0;
        let q = -5000.0;
        let f = equivalent_nodal_loads(
            &LocalLoad {
                qx: 0.0,
                qy: q,
                a: 0.0,
                b: 1.0,
            },
            l,
        );
        assert_relative_eq!(f[1], q * l / 2.0, max_relative = 1e-12);
        assert_relative_eq!(f[2], q * l * l / 12.0, max_relative = 1e-12);
        assert_relative_eq!(f[4], q * l / 2.0, max_relative = 1e-12);
        assert_relative_eq!(f[5], -q * l * l / 12.0, max_relative = 1e-12);
    }

    #[test]
    fn test_partial_load_total_is_preserved() {
        let l = 5.0;
        let load = LocalLoad {
            qx: 300.0,
            qy: -1000.0,
            a: 0.2,
            b: 0.6,
        };
        let f = equivalent_nodal_loads(&load, l);
        assert_relative_eq!(f[1] + f[4], -1000.0 * 2.0, max_relative = 1e-12);
        assert_relative_eq!(f[0] + f[3], 300.0 * 2.0, max_relative = 1e-12);
        // load centroid is left of midspan, so node 1 takes more
        assert!(f[1] < f[4]);
    }

    #[test]
    fn test_vertical_beam_rotation() {
        let geom = BeamGeometry::from_coords([0.0, 0.0], [0.0, 3.0]).unwrap();
        let t = beam_transformation_matrix(geom.cos, geom.sin);
        // global Y displacement is local axial
        let u_local = t * Vec6::new(0.0, 1.0, 0.0, 0.0, 0.0, 0.0);
        assert_relative_eq!(u_local[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(u_local[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_length_rejected() {
        assert!(matches!(
            BeamGeometry::from_coords([1.0, 1.0], [1.0, 1.0]),
            Err(GeometryFault::ZeroLength { .. })
        ));
    }

    #[test]
    fn test_released_end_carries_no_moment() {
        let section = BeamSection::new(0.01, 1e-4, 0.3);
        let udl = DistributedLoad::uniform(-1000.0);
        let m = beam_matrices(
            [0.0, 0.0],
            [4.0, 0.0],
            200e9,
            &section,
            Some(&udl),
            EndReleases::pin_end(),
            None,
        )
        .unwrap();
        assert_eq!(m.f_equivalent[5], 0.0);
        assert_eq!(m.k_global[(5, 5)], 0.0);
        // propped-cantilever fixed-end moment: qL²/8
        assert_relative_eq!(m.f_equivalent[2], -1000.0 * 16.0 / 8.0, max_relative = 1e-10);
        // and shear 5qL/8 at the fixed end
        assert_relative_eq!(m.f_equivalent[1], -1000.0 * 4.0 * 5.0 / 8.0, max_relative = 1e-10);
    }

    #[test]
    fn test_compression_softens() {
        let k = beam_local_stiffness(200e9, 0.01, 1e-4, 5.0);
        let kg = beam_geometric_stiffness(-1e5, 5.0);
        assert!((k + kg)[(1, 1)] < k[(1, 1)]);
        assert_eq!(beam_geometric_stiffness(0.0, 5.0), Mat6::zeros());
    }
}
