//! Quad element - 4-node isoparametric membrane element

use serde::{Deserialize, Serialize};

use super::material::MaterialId;
use super::node::NodeId;
use super::ElementId;

/// A bilinear quadrilateral for plane stress / plane strain
///
/// Nodes are ordered counter-clockwise and map to the natural corners
/// (-1,-1), (1,-1), (1,1), (-1,1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuadElement {
    pub id: ElementId,
    pub node_ids: [NodeId; 4],
    pub material_id: MaterialId,
    /// Out-of-plane thickness (m)
    pub thickness: f64,
}

impl QuadElement {
    pub(crate) fn new(
        id: ElementId,
        node_ids: [NodeId; 4],
        material_id: MaterialId,
        thickness: f64,
    ) -> Self {
        Self {
            id,
            node_ids,
            material_id,
            thickness,
        }
    }
}
