//! Distributed loads on beams

use serde::{Deserialize, Serialize};

/// Frame in which distributed load intensities are given
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoordSystem {
    /// Along (qx) and perpendicular to (qy) the beam axis
    #[default]
    Local,
    /// Global X and Y
    Global,
}

/// A uniform line load over the parametric span `[start_t, end_t]` of a beam
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributedLoad {
    /// Intensity along x (N/m)
    #[serde(default)]
    pub qx: f64,
    /// Intensity along y (N/m), negative is downward for a horizontal beam
    #[serde(default)]
    pub qy: f64,
    #[serde(default)]
    pub coord_system: CoordSystem,
    #[serde(default)]
    pub start_t: f64,
    #[serde(default = "full_span_end")]
    pub end_t: f64,
}

fn full_span_end() -> f64 {
    1.0
}

impl DistributedLoad {
    /// Create a new distributed load
    pub fn new(qx: f64, qy: f64, coord_system: CoordSystem, start_t: f64, end_t: f64) -> Self {
        Self {
            qx,
            qy,
            coord_system,
            start_t,
            end_t,
        }
    }

    /// Uniform transverse load over the full span, local frame
    pub fn uniform(qy: f64) -> Self {
        Self::new(0.0, qy, CoordSystem::Local, 0.0, 1.0)
    }

    /// Uniform load over the full span in global X/Y
    pub fn uniform_global(qx: f64, qy: f64) -> Self {
        Self::new(qx, qy, CoordSystem::Global, 0.0, 1.0)
    }

    /// Restrict the load to the parametric span `[start_t, end_t]`
    pub fn over(mut self, start_t: f64, end_t: f64) -> Self {
        self.start_t = start_t;
        self.end_t = end_t;
        self
    }

    pub fn is_zero(&self) -> bool {
        self.qx == 0.0 && self.qy == 0.0
    }

    /// Parametric span clamped to `[0, 1]` and ordered
    pub fn span(&self) -> (f64, f64) {
        let a = self.start_t.clamp(0.0, 1.0);
        let b = self.end_t.clamp(0.0, 1.0);
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// True when the load does not cover the whole beam
    pub fn is_partial(&self) -> bool {
        let (a, b) = self.span();
        a > 0.0 || b < 1.0
    }

    /// Intensities in the beam's local frame, given the beam direction cosines
    pub fn local_intensity(&self, cos: f64, sin: f64) -> (f64, f64) {
        match self.coord_system {
            CoordSystem::Local => (self.qx, self.qy),
            CoordSystem::Global => (
                self.qx * cos + self.qy * sin,
                -self.qx * sin + self.qy * cos,
            ),
        }
    }

    /// Total force resultant in the load's own frame, for a beam of `length`
    pub fn total_force(&self, length: f64) -> (f64, f64) {
        let (a, b) = self.span();
        let loaded = (b - a) * length;
        (self.qx * loaded, self.qy * loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_global_load_on_vertical_beam() {
        // Beam pointing up: local x = global Y, local y = -global X
        let load = DistributedLoad::uniform_global(1000.0, 0.0);
        let (qx, qy) = load.local_intensity(0.0, 1.0);
        assert_relative_eq!(qx, 0.0, epsilon = 1e-12);
        assert_relative_eq!(qy, -1000.0, epsilon = 1e-12);
    }

    #[test]
    fn test_span_is_clamped_and_ordered() {
        let load = DistributedLoad::uniform(-5.0).over(0.8, -0.2);
        assert_eq!(load.span(), (0.0, 0.8));
        assert!(load.is_partial());
        assert!(!DistributedLoad::uniform(-5.0).is_partial());
    }

    #[test]
    fn test_defaults_from_json() {
        let load: DistributedLoad = serde_json::from_str(r#"{"qy":-5000}"#).unwrap();
        assert_eq!(load.coord_system, CoordSystem::Local);
        assert_eq!(load.span(), (0.0, 1.0));
        assert_eq!(load.total_force(4.0), (0.0, -20000.0));
    }
}
