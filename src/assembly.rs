//! Global stiffness and load assembly
//!
//! An [`Assembler`] resolves every element of the active analysis once:
//! node coordinates, global DOFs and material data are looked up and
//! elements that cannot be resolved are skipped with an [`AssemblyWarning`].
//! Stiffness failures of resolved elements (degenerate triangles, inverted
//! quads, zero-length beams) are fatal.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::analysis::AnalysisType;
use crate::elements::{BeamElement, Element, ElementId, Material, MaterialId, NodeId};
use crate::error::{FemError, FemResult};
use crate::math::{
    self, beam_matrices, constitutive_matrix, cst_stiffness, quad4_stiffness, signed_area,
    BeamMatrices, Mat, Mat3, Vec as FEVec,
};
use crate::mesh::Mesh;

/// Axial force per beam, tension positive
pub type AxialForces = HashMap<ElementId, f64>;

/// Non-fatal problem found while resolving elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AssemblyWarning {
    /// Element references a node that is not in the mesh; element skipped
    #[serde(rename_all = "camelCase")]
    MissingNode { element: ElementId, node: NodeId },
    /// Material not found; the default material was used instead
    #[serde(rename_all = "camelCase")]
    MaterialSubstituted {
        element: ElementId,
        material: MaterialId,
    },
    /// Neither the material nor the default exists; element skipped
    #[serde(rename_all = "camelCase")]
    MissingMaterial {
        element: ElementId,
        material: MaterialId,
    },
    /// Triangle given clockwise; accepted as is
    #[serde(rename_all = "camelCase")]
    ClockwiseElement { element: ElementId },
}

impl fmt::Display for AssemblyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyWarning::MissingNode { element, node } => {
                write!(f, "element {element} skipped: node {node} does not exist")
            }
            AssemblyWarning::MaterialSubstituted { element, material } => write!(
                f,
                "element {element}: material {material} not found, using the default material"
            ),
            AssemblyWarning::MissingMaterial { element, material } => write!(
                f,
                "element {element} skipped: material {material} not found and no default material"
            ),
            AssemblyWarning::ClockwiseElement { element } => {
                write!(f, "element {element} has clockwise node order")
            }
        }
    }
}

/// Maps nodes to their first global DOF
///
/// The block index of a node is its position in mesh iteration order.
#[derive(Debug, Clone)]
pub struct DofMap {
    base: HashMap<NodeId, usize>,
    order: Vec<NodeId>,
    dofs_per_node: usize,
}

impl DofMap {
    pub fn new(mesh: &Mesh, analysis_type: AnalysisType) -> Self {
        let dofs_per_node = analysis_type.dofs_per_node();
        let order: Vec<NodeId> = mesh.nodes().map(|n| n.id).collect();
        let base = order
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i * dofs_per_node))
            .collect();
        Self {
            base,
            order,
            dofs_per_node,
        }
    }

    /// First global DOF of a node
    pub fn base(&self, node: NodeId) -> Option<usize> {
        self.base.get(&node).copied()
    }

    pub fn total(&self) -> usize {
        self.order.len() * self.dofs_per_node
    }

    pub fn dofs_per_node(&self) -> usize {
        self.dofs_per_node
    }

    /// Node ids in DOF order
    pub fn node_order(&self) -> &[NodeId] {
        &self.order
    }
}

/// An element with everything needed to build its matrices
#[derive(Debug, Clone)]
pub enum ResolvedElement<'a> {
    Beam {
        beam: &'a BeamElement,
        coords: [[f64; 2]; 2],
        dofs: [usize; 6],
        e: f64,
    },
    Triangle {
        id: ElementId,
        coords: [[f64; 2]; 3],
        dofs: [usize; 6],
        d: Mat3,
        thickness: f64,
    },
    Quad {
        id: ElementId,
        coords: [[f64; 2]; 4],
        dofs: [usize; 8],
        d: Mat3,
        thickness: f64,
    },
}

impl ResolvedElement<'_> {
    pub fn id(&self) -> ElementId {
        match self {
            ResolvedElement::Beam { beam, .. } => beam.id,
            ResolvedElement::Triangle { id, .. } | ResolvedElement::Quad { id, .. } => *id,
        }
    }

    /// Global beam matrices, optionally with geometric stiffness for `axial`
    pub fn beam_matrices(&self, axial: Option<f64>) -> FemResult<Option<BeamMatrices>> {
        let ResolvedElement::Beam {
            beam, coords, e, ..
        } = self
        else {
            return Ok(None);
        };
        beam_matrices(
            coords[0],
            coords[1],
            *e,
            &beam.section,
            beam.distributed_load.as_ref(),
            beam.releases(),
            axial,
        )
        .map(Some)
        .map_err(|fault| FemError::Geometry {
            element: beam.id,
            fault,
        })
    }
}

/// Builds global matrices for one analysis of one mesh
pub struct Assembler<'a> {
    mesh: &'a Mesh,
    analysis_type: AnalysisType,
    dofs: DofMap,
    elements: Vec<ResolvedElement<'a>>,
    warnings: Vec<AssemblyWarning>,
}

impl<'a> Assembler<'a> {
    /// Resolve the elements that take part in `analysis_type`
    ///
    /// Frames use beams only; plane analyses use triangles and quads only.
    pub fn new(mesh: &'a Mesh, analysis_type: AnalysisType) -> Self {
        let mut assembler = Self {
            mesh,
            analysis_type,
            dofs: DofMap::new(mesh, analysis_type),
            elements: Vec::new(),
            warnings: Vec::new(),
        };

        for element in mesh.elements() {
            if element.is_planar() == analysis_type.is_frame() {
                continue;
            }
            if let Some(resolved) = assembler.resolve(element) {
                assembler.elements.push(resolved);
            }
        }

        debug!(
            "assembler: {:?}, {} nodes, {} DOFs, {} of {} elements active",
            analysis_type,
            mesh.node_count(),
            assembler.dofs.total(),
            assembler.elements.len(),
            mesh.element_count()
        );
        assembler
    }

    fn record(&mut self, warning: AssemblyWarning) {
        if !self.warnings.contains(&warning) {
            warn!("{warning}");
            self.warnings.push(warning);
        }
    }

    fn resolve_material(&mut self, element: ElementId, id: MaterialId) -> Option<Material> {
        let mesh = self.mesh;
        if let Some(material) = mesh.material(id) {
            return Some(material.clone());
        }
        match mesh.material_or_default(id) {
            Some(fallback) => {
                self.record(AssemblyWarning::MaterialSubstituted {
                    element,
                    material: id,
                });
                Some(fallback.clone())
            }
            None => {
                self.record(AssemblyWarning::MissingMaterial {
                    element,
                    material: id,
                });
                None
            }
        }
    }

    /// Coordinates and first DOFs of the element's nodes
    fn resolve_nodes<const N: usize>(
        &mut self,
        element: ElementId,
        node_ids: &[NodeId; N],
    ) -> Option<([[f64; 2]; N], [usize; N])> {
        let mut coords = [[0.0; 2]; N];
        let mut bases = [0; N];
        let mesh = self.mesh;
        for (k, &node_id) in node_ids.iter().enumerate() {
            match (mesh.node(node_id), self.dofs.base(node_id)) {
                (Some(node), Some(base)) => {
                    coords[k] = node.coords();
                    bases[k] = base;
                }
                _ => {
                    self.record(AssemblyWarning::MissingNode {
                        element,
                        node: node_id,
                    });
                    return None;
                }
            }
        }
        Some((coords, bases))
    }

    fn plane_d(&self, material: &Material) -> Option<Mat3> {
        self.analysis_type
            .plane_formulation()
            .map(|f| constitutive_matrix(material.e, material.nu, f))
    }

    fn resolve(&mut self, element: &'a Element) -> Option<ResolvedElement<'a>> {
        let id = element.id();
        match element {
            Element::Beam(beam) => {
                let (coords, bases) = self.resolve_nodes(id, &beam.node_ids)?;
                let material = self.resolve_material(id, beam.material_id)?;
                let [b1, b2] = bases;
                Some(ResolvedElement::Beam {
                    beam,
                    coords,
                    dofs: [b1, b1 + 1, b1 + 2, b2, b2 + 1, b2 + 2],
                    e: material.e,
                })
            }
            Element::Triangle(tri) => {
                let (coords, bases) = self.resolve_nodes(id, &tri.node_ids)?;
                let material = self.resolve_material(id, tri.material_id)?;
                let d = self.plane_d(&material)?;
                if signed_area(&coords) < 0.0 {
                    self.record(AssemblyWarning::ClockwiseElement { element: id });
                }
                let [b1, b2, b3] = bases;
                Some(ResolvedElement::Triangle {
                    id,
                    coords,
                    dofs: [b1, b1 + 1, b2, b2 + 1, b3, b3 + 1],
                    d,
                    thickness: tri.thickness,
                })
            }
            Element::Quad(quad) => {
                let (coords, bases) = self.resolve_nodes(id, &quad.node_ids)?;
                let material = self.resolve_material(id, quad.material_id)?;
                let d = self.plane_d(&material)?;
                let [b1, b2, b3, b4] = bases;
                Some(ResolvedElement::Quad {
                    id,
                    coords,
                    dofs: [b1, b1 + 1, b2, b2 + 1, b3, b3 + 1, b4, b4 + 1],
                    d,
                    thickness: quad.thickness,
                })
            }
        }
    }

    pub fn analysis_type(&self) -> AnalysisType {
        self.analysis_type
    }

    pub fn dof_map(&self) -> &DofMap {
        &self.dofs
    }

    pub fn total_dofs(&self) -> usize {
        self.dofs.total()
    }

    /// Elements taking part in this analysis, in mesh order
    pub fn elements(&self) -> &[ResolvedElement<'a>] {
        &self.elements
    }

    /// Warnings recorded while resolving elements
    pub fn diagnostics(&self) -> &[AssemblyWarning] {
        &self.warnings
    }

    pub fn constrained_dofs(&self) -> Vec<usize> {
        self.mesh.get_constrained_dofs(self.analysis_type)
    }

    /// Structural stiffness of every active element
    pub fn assemble_global_stiffness_matrix(&self) -> FemResult<Mat> {
        self.assemble_stiffness(None)
    }

    /// Structural stiffness, with beam geometric stiffness when axial forces are given
    pub fn assemble_stiffness(&self, axial: Option<&AxialForces>) -> FemResult<Mat> {
        let n = self.dofs.total();
        let mut k = Mat::zeros(n, n);

        for element in &self.elements {
            match element {
                ResolvedElement::Beam { beam, dofs, .. } => {
                    let n_axial = axial.and_then(|forces| forces.get(&beam.id).copied());
                    if let Some(m) = element.beam_matrices(n_axial)? {
                        math::scatter_add(&mut k, &m.k_global, dofs);
                    }
                }
                ResolvedElement::Triangle {
                    id,
                    coords,
                    dofs,
                    d,
                    thickness,
                } => {
                    let ke = cst_stiffness(coords, d, *thickness)
                        .map_err(|fault| FemError::Geometry { element: *id, fault })?;
                    math::scatter_add(&mut k, &ke, dofs);
                }
                ResolvedElement::Quad {
                    id,
                    coords,
                    dofs,
                    d,
                    thickness,
                } => {
                    let ke = quad4_stiffness(coords, d, *thickness)
                        .map_err(|fault| FemError::Geometry { element: *id, fault })?;
                    math::scatter_add(&mut k, &ke, dofs);
                }
            }
        }

        Ok(k)
    }

    /// Nodal loads plus statically equivalent beam loads
    pub fn assemble_force_vector(&self) -> FemResult<FEVec> {
        let per_node = self.dofs.dofs_per_node();
        let mut f = FEVec::zeros(self.dofs.total());

        for (i, node) in self.mesh.nodes().enumerate() {
            for (k, value) in node.loads.as_array().into_iter().take(per_node).enumerate() {
                f[i * per_node + k] += value;
            }
        }

        for element in &self.elements {
            if let ResolvedElement::Beam { dofs, .. } = element {
                if let Some(m) = element.beam_matrices(None)? {
                    math::scatter_add_vec(&mut f, &m.f_equivalent, dofs);
                }
            }
        }

        Ok(f)
    }

    /// Spring stiffness on the diagonal, zero where a node has no spring
    pub fn spring_diagonal(&self) -> FEVec {
        let per_node = self.dofs.dofs_per_node();
        let mut diag = FEVec::zeros(self.dofs.total());
        for (i, node) in self.mesh.nodes().enumerate() {
            if let Some(springs) = &node.springs {
                for (k, stiffness) in springs.as_array().into_iter().take(per_node).enumerate() {
                    if stiffness > 0.0 {
                        diag[i * per_node + k] += stiffness;
                    }
                }
            }
        }
        diag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{BeamSection, Constraints, NodeUpdate};
    use crate::loads::{DistributedLoad, NodalLoads};
    use approx::assert_relative_eq;

    #[test]
    fn test_frame_ignores_planar_elements() {
        let mut mesh = Mesh::new();
        let a = mesh.add_node(0.0, 0.0);
        let b = mesh.add_node(4.0, 0.0);
        let c = mesh.add_node(0.0, 3.0);
        mesh.add_beam_element([a, b], 1, BeamSection::default()).unwrap();
        mesh.add_triangle_element([a, b, c], 1, 0.01).unwrap();

        let frame = Assembler::new(&mesh, AnalysisType::Frame);
        assert_eq!(frame.elements().len(), 1);
        assert_eq!(frame.total_dofs(), 9);

        let plane = Assembler::new(&mesh, AnalysisType::PlaneStress);
        assert_eq!(plane.elements().len(), 1);
        assert_eq!(plane.total_dofs(), 6);
    }

    #[test]
    fn test_quads_are_assembled() {
        let mut mesh = Mesh::new();
        let n: Vec<NodeId> = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
            .iter()
            .map(|&(x, y)| mesh.add_node(x, y))
            .collect();
        mesh.add_quad_element([n[0], n[1], n[2], n[3]], 1, 0.1).unwrap();

        let assembler = Assembler::new(&mesh, AnalysisType::PlaneStress);
        let k = assembler.assemble_global_stiffness_matrix().unwrap();
        assert!(k[(0, 0)] > 0.0);
        assert!(k[(6, 6)] > 0.0);
    }

    #[test]
    fn test_dangling_node_is_skipped_with_warning() {
        let json = r#"{"nodes":[{"id":1,"x":0,"y":0},{"id":2,"x":2,"y":0}],
            "elements":[
              {"type":"beam","id":1,"nodeIds":[1,2],"materialId":9,"section":{"A":0.01,"I":1e-5}},
              {"type":"beam","id":2,"nodeIds":[2,3],"materialId":1,"section":{"A":0.01,"I":1e-5}}]}"#;
        let mesh = Mesh::from_json(json).unwrap();
        let assembler = Assembler::new(&mesh, AnalysisType::Frame);

        assert_eq!(assembler.elements().len(), 1);
        assert_eq!(
            assembler.diagnostics(),
            &[
                AssemblyWarning::MaterialSubstituted {
                    element: 1,
                    material: 9
                },
                AssemblyWarning::MissingNode {
                    element: 2,
                    node: 3
                },
            ]
        );
    }

    #[test]
    fn test_force_vector_combines_nodal_and_distributed() {
        let mut mesh = Mesh::new();
        let a = mesh.add_node(0.0, 0.0);
        let b = mesh.add_node(6.0, 0.0);
        let beam = mesh.add_beam_element([a, b], 1, BeamSection::default()).unwrap();
        mesh.update_beam_element(
            beam,
            crate::elements::BeamUpdate::new()
                .distributed_load(Some(DistributedLoad::uniform(-1000.0))),
        );
        mesh.update_node(b, NodeUpdate::new().loads(NodalLoads::fy(-500.0)));

        let f = Assembler::new(&mesh, AnalysisType::Frame)
            .assemble_force_vector()
            .unwrap();
        assert_relative_eq!(f[1], -3000.0, max_relative = 1e-12);
        assert_relative_eq!(f[4], -3500.0, max_relative = 1e-12);
        assert_relative_eq!(f[2], -3000.0, max_relative = 1e-12);
        assert_relative_eq!(f[5], 3000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_springs_only_in_matching_dofs() {
        let mut mesh = Mesh::new();
        let a = mesh.add_node(0.0, 0.0);
        mesh.add_node(1.0, 0.0);
        mesh.update_node(
            a,
            NodeUpdate::new()
                .constraints(Constraints::free())
                .springs(Some(crate::elements::Springs::new(10.0, 20.0, 30.0))),
        );

        let frame = Assembler::new(&mesh, AnalysisType::Frame).spring_diagonal();
        assert_eq!(frame.as_slice(), &[10.0, 20.0, 30.0, 0.0, 0.0, 0.0]);
        let plane = Assembler::new(&mesh, AnalysisType::PlaneStrain).spring_diagonal();
        assert_eq!(plane.as_slice(), &[10.0, 20.0, 0.0, 0.0]);
    }
}
