//! Support conditions

use serde::{Deserialize, Serialize};

/// Rigid restraints at a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    /// Restrained in X translation
    pub x: bool,
    /// Restrained in Y translation
    pub y: bool,
    /// Restrained in rotation (frame analysis only)
    pub rotation: bool,
}

impl Constraints {
    /// No restraints
    pub fn free() -> Self {
        Self::default()
    }

    /// Fully fixed support (all DOFs restrained)
    pub fn fixed() -> Self {
        Self {
            x: true,
            y: true,
            rotation: true,
        }
    }

    /// Pinned support (translations restrained, rotation free)
    pub fn pinned() -> Self {
        Self {
            x: true,
            y: true,
            rotation: false,
        }
    }

    /// Roller support (Y translation restrained only)
    pub fn roller() -> Self {
        Self {
            x: false,
            y: true,
            rotation: false,
        }
    }

    /// Roller support (X translation restrained only)
    pub fn roller_x() -> Self {
        Self {
            x: true,
            y: false,
            rotation: false,
        }
    }

    /// Restrained flags in DOF order [u, v, theta]
    pub fn as_array(&self) -> [bool; 3] {
        [self.x, self.y, self.rotation]
    }

    /// Count restrained DOFs among the first `dofs_per_node` entries
    pub fn num_restrained(&self, dofs_per_node: usize) -> usize {
        self.as_array()
            .iter()
            .take(dofs_per_node)
            .filter(|&&r| r)
            .count()
    }
}

/// Elastic supports at a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Springs {
    /// Translational stiffness in X (N/m)
    pub kx: f64,
    /// Translational stiffness in Y (N/m)
    pub ky: f64,
    /// Rotational stiffness (N·m/rad)
    pub kr: f64,
}

impl Springs {
    pub fn new(kx: f64, ky: f64, kr: f64) -> Self {
        Self { kx, ky, kr }
    }

    /// Stiffness values in DOF order [u, v, theta]
    pub fn as_array(&self) -> [f64; 3] {
        [self.kx, self.ky, self.kr]
    }
}
