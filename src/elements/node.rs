//! Node - a point in the 2D model plane

use serde::{Deserialize, Serialize};

use super::support::{Constraints, Springs};
use crate::loads::NodalLoads;

/// Identifier of a node, unique within a mesh
pub type NodeId = u32;

/// A node of the 2D finite element mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Mesh-assigned identifier
    pub id: NodeId,
    /// X coordinate (m)
    pub x: f64,
    /// Y coordinate (m)
    pub y: f64,
    /// Restrained degrees of freedom
    #[serde(default)]
    pub constraints: Constraints,
    /// Loads applied directly at the node
    #[serde(default)]
    pub loads: NodalLoads,
    /// Elastic supports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub springs: Option<Springs>,
}

impl Node {
    pub(crate) fn new(id: NodeId, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            constraints: Constraints::default(),
            loads: NodalLoads::default(),
            springs: None,
        }
    }

    /// Get the coordinates as an array
    pub fn coords(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Calculate distance to another node
    pub fn distance_to(&self, other: &Node) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Distance to an arbitrary point
    pub fn distance_to_point(&self, x: f64, y: f64) -> f64 {
        ((x - self.x).powi(2) + (y - self.y).powi(2)).sqrt()
    }

    /// Restrained flags in DOF order [u, v, theta]
    ///
    /// A node with springs is rigid in every direction without spring
    /// stiffness, on top of its constraints.
    pub fn restraints(&self) -> [bool; 3] {
        let mut restrained = self.constraints.as_array();
        if let Some(springs) = &self.springs {
            for (r, k) in restrained.iter_mut().zip(springs.as_array()) {
                *r |= k <= 0.0;
            }
        }
        restrained
    }
}

/// Partial update applied through [`Mesh::update_node`](crate::mesh::Mesh::update_node)
#[derive(Debug, Clone, Default)]
pub struct NodeUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub constraints: Option<Constraints>,
    pub loads: Option<NodalLoads>,
    pub springs: Option<Option<Springs>>,
}

impl NodeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    pub fn loads(mut self, loads: NodalLoads) -> Self {
        self.loads = Some(loads);
        self
    }

    pub fn springs(mut self, springs: Option<Springs>) -> Self {
        self.springs = Some(springs);
        self
    }

    pub(crate) fn apply(self, node: &mut Node) {
        if let Some(x) = self.x {
            node.x = x;
        }
        if let Some(y) = self.y {
            node.y = y;
        }
        if let Some(constraints) = self.constraints {
            node.constraints = constraints;
        }
        if let Some(loads) = self.loads {
            node.loads = loads;
        }
        if let Some(springs) = self.springs {
            node.springs = springs;
        }
    }
}
