//! Plate region - bookkeeping for a meshed planar area

use serde::{Deserialize, Serialize};

use super::material::MaterialId;
use super::node::NodeId;
use super::ElementId;

/// Identifier of a plate region
pub type PlateId = u32;

/// A group of nodes and planar elements produced by meshing one polygon
///
/// The region owns nothing by itself; it records which mesh entities belong
/// together so that deleting one of its nodes removes the whole plate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateRegion {
    pub id: PlateId,
    pub material_id: MaterialId,
    pub thickness: f64,
    pub node_ids: Vec<NodeId>,
    pub element_ids: Vec<ElementId>,
}

impl PlateRegion {
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.node_ids.contains(&node)
    }

    pub fn contains_element(&self, element: ElementId) -> bool {
        self.element_ids.contains(&element)
    }
}
