//! Mesh - the aggregate that owns every node, element, material and plate region
//!
//! Entities are kept in insertion order. Node order matters: a node's position
//! in [`Mesh::nodes`] is its DOF block index in every assembled system.
//!
//! Editing operations never fail hard: an operation that references a missing
//! entity returns `None`/`false` and leaves the mesh untouched.

mod registry;

pub use registry::{Keyed, Registry};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisType;
use crate::elements::{
    BeamElement, BeamSection, BeamUpdate, Element, ElementId, EndReleases, Material, MaterialId,
    NamedSection, Node, NodeId, NodeUpdate, PlateId, PlateRegion, QuadElement, TriangleElement,
    DEFAULT_MATERIAL_ID,
};
use crate::error::FemResult;
use crate::loads::NodalLoads;

/// Distance (m) under which a split point reuses an existing node
pub const NODE_MERGE_TOLERANCE: f64 = 0.01;

/// Split positions are clamped to this parametric range
const SPLIT_RANGE: (f64, f64) = (0.01, 0.99);

/// Outcome of [`Mesh::split_beam_at`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeamSplit {
    /// Node at the split point
    pub node_id: NodeId,
    /// True when an existing node was reused
    pub reused_node: bool,
    /// Replacement beams, start segment first
    pub beam_ids: [ElementId; 2],
}

/// The 2D finite element mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "MeshSnapshot")]
pub struct Mesh {
    nodes: Registry<Node>,
    elements: Registry<Element>,
    materials: Registry<Material>,
    sections: Vec<NamedSection>,
    plates: Registry<PlateRegion>,

    #[serde(skip)]
    next_node_id: NodeId,
    #[serde(skip)]
    next_element_id: ElementId,
    #[serde(skip)]
    next_material_id: MaterialId,
    #[serde(skip)]
    next_plate_id: PlateId,
}

/// Serialised form of a mesh; counters are rebuilt from the ids it holds
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeshSnapshot {
    #[serde(default)]
    nodes: Registry<Node>,
    #[serde(default)]
    elements: Registry<Element>,
    #[serde(default)]
    materials: Registry<Material>,
    #[serde(default)]
    sections: Vec<NamedSection>,
    #[serde(default)]
    plates: Registry<PlateRegion>,
}

impl From<MeshSnapshot> for Mesh {
    fn from(snapshot: MeshSnapshot) -> Self {
        let mut mesh = Mesh {
            nodes: snapshot.nodes,
            elements: snapshot.elements,
            materials: snapshot.materials,
            sections: snapshot.sections,
            plates: snapshot.plates,
            next_node_id: 1,
            next_element_id: 1,
            next_material_id: 1,
            next_plate_id: 1,
        };
        if !mesh.materials.contains(DEFAULT_MATERIAL_ID) {
            mesh.materials.insert(Material::default());
        }
        mesh.rebuild_counters();
        mesh
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    /// Create an empty mesh holding only the default material
    pub fn new() -> Self {
        let mut materials = Registry::new();
        materials.insert(Material::default());
        Self {
            nodes: Registry::new(),
            elements: Registry::new(),
            materials,
            sections: Vec::new(),
            plates: Registry::new(),
            next_node_id: 1,
            next_element_id: 1,
            next_material_id: DEFAULT_MATERIAL_ID + 1,
            next_plate_id: 1,
        }
    }

    fn rebuild_counters(&mut self) {
        self.next_node_id = self.nodes.max_key().map_or(1, |id| id + 1);
        self.next_element_id = self.elements.max_key().map_or(1, |id| id + 1);
        self.next_material_id = self.materials.max_key().map_or(1, |id| id + 1);
        self.next_plate_id = self.plates.max_key().map_or(1, |id| id + 1);
    }

    /// Counters as (node, element, material, plate)
    pub fn id_counters(&self) -> (NodeId, ElementId, MaterialId, PlateId) {
        (
            self.next_node_id,
            self.next_element_id,
            self.next_material_id,
            self.next_plate_id,
        )
    }

    fn alloc_element_id(&mut self) -> ElementId {
        let id = self.next_element_id;
        self.next_element_id += 1;
        id
    }

    // ========================
    // Nodes
    // ========================

    /// Add a free, unloaded node and return its id
    pub fn add_node(&mut self, x: f64, y: f64) -> NodeId {
        let id = self.next_node_id;
        self.next_node_id += 1;
        self.nodes.insert(Node::new(id, x, y));
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Nodes in DOF order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// DOF block index of a node
    pub fn node_index(&self, id: NodeId) -> Option<usize> {
        self.nodes.position(id)
    }

    /// Closest node within `tolerance` of (x, y)
    pub fn node_at(&self, x: f64, y: f64, tolerance: f64) -> Option<NodeId> {
        self.closest_node(x, y, tolerance, &[])
    }

    fn closest_node(&self, x: f64, y: f64, tolerance: f64, exclude: &[NodeId]) -> Option<NodeId> {
        self.nodes
            .iter()
            .filter(|n| !exclude.contains(&n.id))
            .map(|n| (n.id, n.distance_to_point(x, y)))
            .filter(|&(_, d)| d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Apply a partial update to a node
    pub fn update_node(&mut self, id: NodeId, update: NodeUpdate) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                update.apply(node);
                true
            }
            None => false,
        }
    }

    /// Remove a node and everything that depends on it
    ///
    /// Elements referencing the node are deleted. A plate region containing
    /// the node is deleted in full, together with its elements and every
    /// plate node no longer used by another element or plate.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if !self.nodes.contains(id) {
            return false;
        }

        let dependent: Vec<ElementId> = self
            .elements
            .iter()
            .filter(|e| e.references_node(id))
            .map(Element::id)
            .collect();
        for element in dependent {
            self.remove_element(element);
        }

        let plates: Vec<PlateId> = self
            .plates
            .iter()
            .filter(|p| p.contains_node(id))
            .map(|p| p.id)
            .collect();
        for plate in plates {
            self.remove_plate_region(plate);
        }

        self.nodes.remove(id);
        debug!("removed node {id}");
        true
    }

    fn is_node_referenced(&self, id: NodeId) -> bool {
        self.elements.iter().any(|e| e.references_node(id))
            || self.plates.iter().any(|p| p.contains_node(id))
    }

    fn nodes_exist(&self, ids: &[NodeId]) -> bool {
        ids.iter().all(|&id| self.nodes.contains(id))
            && ids.iter().enumerate().all(|(i, a)| !ids[i + 1..].contains(a))
    }

    // ========================
    // Elements
    // ========================

    /// Add a constant-strain triangle; `None` if a node is missing or repeated
    pub fn add_triangle_element(
        &mut self,
        node_ids: [NodeId; 3],
        material_id: MaterialId,
        thickness: f64,
    ) -> Option<ElementId> {
        if !self.nodes_exist(&node_ids) {
            return None;
        }
        let id = self.alloc_element_id();
        self.elements.insert(Element::Triangle(TriangleElement::new(
            id,
            node_ids,
            material_id,
            thickness,
        )));
        Some(id)
    }

    /// Add a 4-node quad; `None` if a node is missing or repeated
    pub fn add_quad_element(
        &mut self,
        node_ids: [NodeId; 4],
        material_id: MaterialId,
        thickness: f64,
    ) -> Option<ElementId> {
        if !self.nodes_exist(&node_ids) {
            return None;
        }
        let id = self.alloc_element_id();
        self.elements.insert(Element::Quad(QuadElement::new(
            id,
            node_ids,
            material_id,
            thickness,
        )));
        Some(id)
    }

    /// Add a beam; `None` if a node is missing or both ends coincide
    pub fn add_beam_element(
        &mut self,
        node_ids: [NodeId; 2],
        material_id: MaterialId,
        section: BeamSection,
    ) -> Option<ElementId> {
        if !self.nodes_exist(&node_ids) {
            return None;
        }
        let (n1, n2) = (self.nodes.get(node_ids[0])?, self.nodes.get(node_ids[1])?);
        if n1.distance_to(n2) < 1e-9 {
            return None;
        }
        let id = self.alloc_element_id();
        self.elements
            .insert(Element::Beam(BeamElement::new(id, node_ids, material_id, section)));
        Some(id)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn beam(&self, id: ElementId) -> Option<&BeamElement> {
        self.elements.get(id).and_then(Element::as_beam)
    }

    pub fn beams(&self) -> impl Iterator<Item = &BeamElement> {
        self.elements.iter().filter_map(Element::as_beam)
    }

    /// Triangles and quads
    pub fn planar_elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.is_planar())
    }

    /// Apply a partial update to a beam
    pub fn update_beam_element(&mut self, id: ElementId, update: BeamUpdate) -> bool {
        match self.elements.get_mut(id) {
            Some(Element::Beam(beam)) => {
                update.apply(beam);
                true
            }
            _ => false,
        }
    }

    /// Start and end node of a beam
    pub fn get_beam_element_nodes(&self, id: ElementId) -> Option<(&Node, &Node)> {
        let beam = self.beam(id)?;
        Some((
            self.nodes.get(beam.node_ids[0])?,
            self.nodes.get(beam.node_ids[1])?,
        ))
    }

    /// Remove an element of any kind
    pub fn remove_element(&mut self, id: ElementId) -> bool {
        if self.elements.remove(id).is_none() {
            return false;
        }
        let plates: Vec<PlateId> = self
            .plates
            .iter()
            .filter(|p| p.contains_element(id))
            .map(|p| p.id)
            .collect();
        for plate in plates {
            if let Some(region) = self.plates.get_mut(plate) {
                region.element_ids.retain(|&e| e != id);
            }
        }
        true
    }

    /// Split a beam into two at the parametric `position`
    ///
    /// The position is clamped to [0.01, 0.99]. An existing node within
    /// [`NODE_MERGE_TOLERANCE`] of the split point is reused and any `load`
    /// is added to its loads; otherwise a new node carrying `load` is created.
    /// Both replacement beams copy material, section, profile name and
    /// distributed load; the original start/end hinges stay at the outer ends.
    pub fn split_beam_at(
        &mut self,
        beam_id: ElementId,
        position: f64,
        load: Option<NodalLoads>,
    ) -> Option<BeamSplit> {
        if !position.is_finite() {
            return None;
        }
        let beam = self.beam(beam_id)?.clone();
        let (start, end) = {
            let (n1, n2) = self.get_beam_element_nodes(beam_id)?;
            (n1.clone(), n2.clone())
        };

        let t = position.clamp(SPLIT_RANGE.0, SPLIT_RANGE.1);
        let x = start.x + t * (end.x - start.x);
        let y = start.y + t * (end.y - start.y);

        let existing = self.closest_node(x, y, NODE_MERGE_TOLERANCE, &[start.id, end.id]);
        let node_id = match existing {
            Some(id) => {
                if let (Some(load), Some(node)) = (load, self.nodes.get_mut(id)) {
                    node.loads += load;
                }
                id
            }
            None => {
                let id = self.add_node(x, y);
                if let (Some(load), Some(node)) = (load, self.nodes.get_mut(id)) {
                    node.loads = load;
                }
                id
            }
        };

        self.elements.remove(beam_id);

        let releases = beam.releases();
        let first_id = self.alloc_element_id();
        let second_id = self.alloc_element_id();
        let first = BeamElement {
            id: first_id,
            node_ids: [start.id, node_id],
            end_releases: releases.start_moment.then(EndReleases::pin_start),
            ..beam.clone()
        };
        let second = BeamElement {
            id: second_id,
            node_ids: [node_id, end.id],
            end_releases: releases.end_moment.then(EndReleases::pin_end),
            ..beam
        };
        self.elements.insert(Element::Beam(first));
        self.elements.insert(Element::Beam(second));

        debug!("split beam {beam_id} at t={t:.3} into {first_id} and {second_id} via node {node_id}");
        Some(BeamSplit {
            node_id,
            reused_node: existing.is_some(),
            beam_ids: [first_id, second_id],
        })
    }

    // ========================
    // Materials and sections
    // ========================

    /// Add a material; its `id` is replaced by a freshly assigned one
    pub fn add_material(&mut self, mut material: Material) -> MaterialId {
        let id = self.next_material_id;
        self.next_material_id += 1;
        material.id = id;
        self.materials.insert(material);
        id
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    /// Material `id`, or the default material if it does not exist
    pub fn material_or_default(&self, id: MaterialId) -> Option<&Material> {
        self.materials
            .get(id)
            .or_else(|| self.materials.get(DEFAULT_MATERIAL_ID))
    }

    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    /// Replace the properties of an existing material, keeping its id
    pub fn update_material(&mut self, id: MaterialId, mut material: Material) -> bool {
        if !self.materials.contains(id) {
            return false;
        }
        material.id = id;
        self.materials.insert(material);
        true
    }

    /// Remove a material; the default material cannot be removed
    pub fn remove_material(&mut self, id: MaterialId) -> bool {
        id != DEFAULT_MATERIAL_ID && self.materials.remove(id).is_some()
    }

    /// Store a named section, replacing one with the same name
    pub fn add_section(&mut self, name: &str, section: BeamSection) {
        match self.sections.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.section = section,
            None => self.sections.push(NamedSection {
                name: name.to_string(),
                section,
            }),
        }
    }

    pub fn section(&self, name: &str) -> Option<BeamSection> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.section)
    }

    pub fn sections(&self) -> &[NamedSection] {
        &self.sections
    }

    // ========================
    // Plate regions
    // ========================

    /// Record a plate region; every node and planar element must exist
    pub fn add_plate_region(
        &mut self,
        node_ids: Vec<NodeId>,
        element_ids: Vec<ElementId>,
        material_id: MaterialId,
        thickness: f64,
    ) -> Option<PlateId> {
        if !node_ids.iter().all(|&n| self.nodes.contains(n)) {
            return None;
        }
        let planar = |&e: &ElementId| self.elements.get(e).is_some_and(Element::is_planar);
        if !element_ids.iter().all(planar) {
            return None;
        }
        let id = self.next_plate_id;
        self.next_plate_id += 1;
        self.plates.insert(PlateRegion {
            id,
            material_id,
            thickness,
            node_ids,
            element_ids,
        });
        Some(id)
    }

    pub fn plate(&self, id: PlateId) -> Option<&PlateRegion> {
        self.plates.get(id)
    }

    pub fn plates(&self) -> impl Iterator<Item = &PlateRegion> {
        self.plates.iter()
    }

    /// Remove a plate region, its elements, and its nodes no longer in use
    pub fn remove_plate_region(&mut self, id: PlateId) -> bool {
        let Some(plate) = self.plates.remove(id) else {
            return false;
        };
        for element in &plate.element_ids {
            self.elements.remove(*element);
        }
        for node in &plate.node_ids {
            if !self.is_node_referenced(*node) {
                self.nodes.remove(*node);
            }
        }
        debug!(
            "removed plate {id} ({} elements, {} nodes)",
            plate.element_ids.len(),
            plate.node_ids.len()
        );
        true
    }

    // ========================
    // Boundary conditions
    // ========================

    /// Global indices of restrained DOFs, numbered by node order
    ///
    /// Includes the directions of a spring-bearing node that have no spring.
    pub fn get_constrained_dofs(&self, analysis_type: AnalysisType) -> Vec<usize> {
        let per_node = analysis_type.dofs_per_node();
        self.nodes
            .iter()
            .enumerate()
            .flat_map(|(i, node)| {
                node.restraints()
                    .into_iter()
                    .take(per_node)
                    .enumerate()
                    .filter(|&(_, restrained)| restrained)
                    .map(move |(local, _)| i * per_node + local)
            })
            .collect()
    }

    // ========================
    // Serialization
    // ========================

    pub fn to_json(&self) -> FemResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> FemResult<Mesh> {
        Ok(serde_json::from_str(json)?)
    }
}
