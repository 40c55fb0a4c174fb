//! Structural elements module

mod beam;
mod material;
mod node;
mod plate;
mod quad;
mod section;
mod support;
mod triangle;

pub use beam::{BeamElement, BeamUpdate, EndReleases};
pub use material::{Material, MaterialId, DEFAULT_MATERIAL_ID};
pub use node::{Node, NodeId, NodeUpdate};
pub use plate::{PlateId, PlateRegion};
pub use quad::QuadElement;
pub use section::{BeamSection, NamedSection};
pub use support::{Constraints, Springs};
pub use triangle::TriangleElement;

use serde::{Deserialize, Serialize};

/// Identifier of an element; triangles, quads and beams share one id space
pub type ElementId = u32;

/// Element kinds handled by the solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    Triangle,
    Quad,
    Beam,
}

/// Any element stored in a mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Element {
    Triangle(TriangleElement),
    Quad(QuadElement),
    Beam(BeamElement),
}

impl Element {
    pub fn id(&self) -> ElementId {
        match self {
            Element::Triangle(e) => e.id,
            Element::Quad(e) => e.id,
            Element::Beam(e) => e.id,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Triangle(_) => ElementKind::Triangle,
            Element::Quad(_) => ElementKind::Quad,
            Element::Beam(_) => ElementKind::Beam,
        }
    }

    pub fn node_ids(&self) -> &[NodeId] {
        match self {
            Element::Triangle(e) => &e.node_ids,
            Element::Quad(e) => &e.node_ids,
            Element::Beam(e) => &e.node_ids,
        }
    }

    pub fn material_id(&self) -> MaterialId {
        match self {
            Element::Triangle(e) => e.material_id,
            Element::Quad(e) => e.material_id,
            Element::Beam(e) => e.material_id,
        }
    }

    pub fn references_node(&self, node: NodeId) -> bool {
        self.node_ids().contains(&node)
    }

    /// True for triangles and quads
    pub fn is_planar(&self) -> bool {
        !matches!(self, Element::Beam(_))
    }

    pub fn as_beam(&self) -> Option<&BeamElement> {
        match self {
            Element::Beam(beam) => Some(beam),
            _ => None,
        }
    }
}
