//! Material properties

use serde::{Deserialize, Serialize};

/// Identifier of a material, unique within a mesh
pub type MaterialId = u32;

/// Id of the material every mesh carries and falls back to
pub const DEFAULT_MATERIAL_ID: MaterialId = 1;

/// Isotropic linear-elastic material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: MaterialId,
    #[serde(default)]
    pub name: String,
    /// Modulus of elasticity (Young's modulus) in Pa
    #[serde(rename = "E")]
    pub e: f64,
    /// Poisson's ratio
    pub nu: f64,
    /// Density in kg/m³
    #[serde(default)]
    pub rho: f64,
    /// Thermal expansion coefficient in 1/K
    #[serde(default)]
    pub alpha: f64,
}

impl Material {
    /// Create a new material with given properties
    pub fn new(id: MaterialId, name: &str, e: f64, nu: f64) -> Self {
        Self {
            id,
            name: name.to_string(),
            e,
            nu,
            rho: 0.0,
            alpha: 0.0,
        }
    }

    /// Structural steel, the fallback material of every mesh
    pub fn steel(id: MaterialId) -> Self {
        Self {
            id,
            name: "Steel".to_string(),
            e: 210e9,
            nu: 0.3,
            rho: 7850.0,
            alpha: 12e-6,
        }
    }

    /// Concrete estimated from its compressive strength `fc` in Pa
    pub fn concrete(id: MaterialId, fc: f64) -> Self {
        // E = 4700 * sqrt(f'c in MPa) MPa
        let fc_mpa = fc / 1e6;
        Self {
            id,
            name: "Concrete".to_string(),
            e: 4700.0 * fc_mpa.sqrt() * 1e6,
            nu: 0.2,
            rho: 2400.0,
            alpha: 10e-6,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::steel(DEFAULT_MATERIAL_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_steel_with_id_one() {
        let mat = Material::default();
        assert_eq!(mat.id, DEFAULT_MATERIAL_ID);
        assert_eq!(mat.e, 210e9);
        assert_eq!(mat.nu, 0.3);
    }

    #[test]
    fn test_modulus_serialises_as_upper_e() {
        let json = serde_json::to_string(&Material::default()).unwrap();
        assert!(json.contains("\"E\":"));
    }
}
