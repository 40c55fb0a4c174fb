//! Isotropic constitutive matrices for 2D continua

use serde::{Deserialize, Serialize};

use super::Mat3;

/// In-plane idealisation used to build [D]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaneFormulation {
    /// Thin body, σz = 0
    Stress,
    /// Long body, εz = 0
    Strain,
}

/// Compute the 3x3 constitutive matrix [D] relating (εx, εy, γxy) to (σx, σy, τxy)
pub fn constitutive_matrix(e: f64, nu: f64, formulation: PlaneFormulation) -> Mat3 {
    match formulation {
        PlaneFormulation::Stress => {
            let c = e / (1.0 - nu * nu);
            #[rustfmt::skip]
            let d = Mat3::new(
                c,      c * nu, 0.0,
                c * nu, c,      0.0,
                0.0,    0.0,    c * (1.0 - nu) / 2.0,
            );
            d
        }
        PlaneFormulation::Strain => {
            let c = e / ((1.0 + nu) * (1.0 - 2.0 * nu));
            #[rustfmt::skip]
            let d = Mat3::new(
                c * (1.0 - nu), c * nu,         0.0,
                c * nu,         c * (1.0 - nu), 0.0,
                0.0,            0.0,            c * (1.0 - 2.0 * nu) / 2.0,
            );
            d
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shear_term_is_shear_modulus() {
        let (e, nu) = (210e9, 0.3);
        let g = e / (2.0 * (1.0 + nu));
        for formulation in [PlaneFormulation::Stress, PlaneFormulation::Strain] {
            let d = constitutive_matrix(e, nu, formulation);
            assert_relative_eq!(d[(2, 2)], g, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_plane_strain_is_stiffer() {
        let stress = constitutive_matrix(30e9, 0.2, PlaneFormulation::Stress);
        let strain = constitutive_matrix(30e9, 0.2, PlaneFormulation::Strain);
        assert!(strain[(0, 0)] > stress[(0, 0)]);
        assert!(strain[(0, 1)] > stress[(0, 1)]);
    }
}
