//! Section properties for beam elements

use serde::{Deserialize, Serialize};

/// Cross-section properties of a 2D beam
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamSection {
    /// Cross-sectional area in m²
    #[serde(rename = "A")]
    pub a: f64,
    /// Moment of inertia about the bending axis in m⁴
    #[serde(rename = "I")]
    pub i: f64,
    /// Section depth in m
    #[serde(default)]
    pub h: f64,
}

impl BeamSection {
    /// Create a new section with basic properties
    pub fn new(a: f64, i: f64, h: f64) -> Self {
        Self { a, i, h }
    }

    /// Create a rectangular section
    pub fn rectangular(width: f64, depth: f64) -> Self {
        Self {
            a: width * depth,
            i: width * depth.powi(3) / 12.0,
            h: depth,
        }
    }

    /// Create a symmetric I-section from its plates, without root fillets
    ///
    /// # Arguments
    /// * `depth` - Total depth of section
    /// * `flange_width` - Width of flange
    /// * `flange_thickness` - Thickness of flange
    /// * `web_thickness` - Thickness of web
    pub fn i_section(
        depth: f64,
        flange_width: f64,
        flange_thickness: f64,
        web_thickness: f64,
    ) -> Self {
        let hw = depth - 2.0 * flange_thickness;
        let a = 2.0 * flange_width * flange_thickness + hw * web_thickness;
        let i = (flange_width * depth.powi(3) - (flange_width - web_thickness) * hw.powi(3)) / 12.0;
        Self { a, i, h: depth }
    }

    /// Elastic section modulus I / (h/2), zero when the depth is unknown
    pub fn elastic_modulus(&self) -> f64 {
        if self.h > 0.0 {
            2.0 * self.i / self.h
        } else {
            0.0
        }
    }
}

impl Default for BeamSection {
    fn default() -> Self {
        // IPE 200
        Self::new(28.5e-4, 1943e-8, 0.2)
    }
}

/// A section stored in the mesh under a profile name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSection {
    pub name: String,
    #[serde(flatten)]
    pub section: BeamSection,
}
