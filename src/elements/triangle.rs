//! Triangle element - 3-node constant strain triangle

use serde::{Deserialize, Serialize};

use super::material::MaterialId;
use super::node::NodeId;
use super::ElementId;

/// A constant-strain triangle, nodes counter-clockwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriangleElement {
    pub id: ElementId,
    pub node_ids: [NodeId; 3],
    pub material_id: MaterialId,
    /// Out-of-plane thickness (m)
    pub thickness: f64,
}

impl TriangleElement {
    pub(crate) fn new(
        id: ElementId,
        node_ids: [NodeId; 3],
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
