//! Result types for 2D analysis

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analysis::AnalysisType;
use crate::assembly::AssemblyWarning;
use crate::elements::{ElementId, NodeId};

/// Displacement results at a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDisplacement {
    /// Displacement in X direction
    pub dx: f64,
    /// Displacement in Y direction
    pub dy: f64,
    /// Rotation about Z (zero in plane analyses)
    pub rz: f64,
}

impl NodeDisplacement {
    /// Create from a node's DOF block (2 or 3 entries)
    pub fn from_slice(block: &[f64]) -> Self {
        Self {
            dx: block.first().copied().unwrap_or(0.0),
            dy: block.get(1).copied().unwrap_or(0.0),
            rz: block.get(2).copied().unwrap_or(0.0),
        }
    }

    /// Get translation magnitude
    pub fn translation_magnitude(&self) -> f64 {
        self.dx.hypot(self.dy)
    }
}

/// Reaction forces at a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeReaction {
    /// Reaction force in X direction
    pub fx: f64,
    /// Reaction force in Y direction
    pub fy: f64,
    /// Reaction moment about Z
    pub mz: f64,
}

impl NodeReaction {
    pub fn from_slice(block: &[f64]) -> Self {
        Self {
            fx: block.first().copied().unwrap_or(0.0),
            fy: block.get(1).copied().unwrap_or(0.0),
            mz: block.get(2).copied().unwrap_or(0.0),
        }
    }
}

/// Principal stresses and the angle of the major axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrincipalStress {
    /// Maximum principal stress
    pub s1: f64,
    /// Minimum principal stress
    pub s2: f64,
    /// Angle of s1 from the x axis (radians)
    pub angle: f64,
}

/// Stress results in a triangle or quad
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStress {
    /// Normal stress in X direction
    pub sx: f64,
    /// Normal stress in Y direction
    pub sy: f64,
    /// Shear stress XY
    pub txy: f64,
    /// Von Mises equivalent stress
    pub von_mises: f64,
    pub principal: PrincipalStress,
}

impl ElementStress {
    /// Create from stress components
    pub fn from_components(sx: f64, sy: f64, txy: f64) -> Self {
        let von_mises = (sx.powi(2) - sx * sy + sy.powi(2) + 3.0 * txy.powi(2)).sqrt();

        // Principal stresses
        let s_avg = (sx + sy) / 2.0;
        let r = ((sx - sy).powi(2) / 4.0 + txy.powi(2)).sqrt();

        Self {
            sx,
            sy,
            txy,
            von_mises,
            principal: PrincipalStress {
                s1: s_avg + r,
                s2: s_avg - r,
                angle: 0.5 * (2.0 * txy).atan2(sx - sy),
            },
        }
    }
}

/// Internal forces of a beam
///
/// End values follow the beam convention: tension, and sagging moment,
/// positive. Diagrams are sampled at `stations` (metres from node 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeamForces {
    #[serde(rename = "N1")]
    pub n1: f64,
    #[serde(rename = "V1")]
    pub v1: f64,
    #[serde(rename = "M1")]
    pub m1: f64,
    #[serde(rename = "N2")]
    pub n2: f64,
    #[serde(rename = "V2")]
    pub v2: f64,
    #[serde(rename = "M2")]
    pub m2: f64,
    pub length: f64,
    pub stations: Vec<f64>,
    pub normal_force: Vec<f64>,
    pub shear_force: Vec<f64>,
    pub bending_moment: Vec<f64>,
    /// Largest |N| over the stations, floored at 1e-10
    pub max_n: f64,
    /// Largest |V| over the stations, floored at 1e-10
    pub max_v: f64,
    /// Largest |M| over the stations, floored at 1e-10
    pub max_m: f64,
}

impl BeamForces {
    /// Station index of the largest |M|
    pub fn max_moment_station(&self) -> Option<usize> {
        self.bending_moment
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(i, _)| i)
    }
}

/// Outcome of the solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SolveStatus {
    /// Equilibrium found; a linear solve reports a single iteration
    Converged { iterations: usize },
    /// The iteration cap was reached in load step `step` (1-based)
    NotConverged { step: usize, iterations: usize },
    /// The tangent stiffness lost positive definiteness in load step `step`
    Unstable { step: usize },
    /// Stopped by the caller between iterations
    Cancelled,
}

impl SolveStatus {
    pub fn is_converged(&self) -> bool {
        matches!(self, SolveStatus::Converged { .. })
    }

    /// Message for a caller, `None` when converged
    pub fn failure_message(&self) -> Option<String> {
        match *self {
            SolveStatus::Converged { .. } => None,
            SolveStatus::NotConverged { step, iterations } => Some(format!(
                "Analysis did not converge in load step {step} after {iterations} iterations"
            )),
            SolveStatus::Unstable { step } => Some(format!(
                "Analysis did not converge: the structure is unstable in load step {step} \
                 (load exceeds a buckling load)"
            )),
            SolveStatus::Cancelled => Some("Analysis was cancelled".to_string()),
        }
    }
}

/// Everything produced by one solve
///
/// Vectors are indexed by global DOF: a node's block starts at its position
/// in `node_id_order` times `dofs_per_node`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverResult {
    pub analysis_type: AnalysisType,
    pub dofs_per_node: usize,
    pub node_id_order: Vec<NodeId>,
    pub displacements: Vec<f64>,
    pub reactions: Vec<f64>,
    /// Applied load vector at the final load factor
    pub applied_loads: Vec<f64>,
    pub element_stresses: BTreeMap<ElementId, ElementStress>,
    pub beam_forces: BTreeMap<ElementId, BeamForces>,
    pub max_von_mises: f64,
    pub min_von_mises: f64,
    pub status: SolveStatus,
    /// Load factor reached (1.0 unless the solve stopped early)
    pub load_factor: f64,
    pub diagnostics: Vec<AssemblyWarning>,
}

impl SolverResult {
    fn block(&self, values: &[f64], node: NodeId) -> Option<std::ops::Range<usize>> {
        let index = self.node_id_order.iter().position(|&id| id == node)?;
        let start = index * self.dofs_per_node;
        let end = start + self.dofs_per_node;
        (end <= values.len()).then_some(start..end)
    }

    pub fn node_displacement(&self, node: NodeId) -> Option<NodeDisplacement> {
        let range = self.block(&self.displacements, node)?;
        Some(NodeDisplacement::from_slice(&self.displacements[range]))
    }

    pub fn node_reaction(&self, node: NodeId) -> Option<NodeReaction> {
        let range = self.block(&self.reactions, node)?;
        Some(NodeReaction::from_slice(&self.reactions[range]))
    }

    fn axis_sum(&self, values: &[f64]) -> [f64; 3] {
        let mut sum = [0.0; 3];
        for (i, v) in values.iter().enumerate() {
            sum[i % self.dofs_per_node] += v;
        }
        sum
    }

    /// Reactions summed per DOF kind: [ΣFx, ΣFy, ΣM]
    pub fn reaction_sum(&self) -> [f64; 3] {
        self.axis_sum(&self.reactions)
    }

    /// Applied loads summed per DOF kind: [ΣFx, ΣFy, ΣM]
    pub fn applied_sum(&self) -> [f64; 3] {
        self.axis_sum(&self.applied_loads)
    }

    /// Largest translation over all nodes
    pub fn max_displacement(&self) -> f64 {
        self.node_id_order
            .iter()
            .filter_map(|&id| self.node_displacement(id))
            .map(|d| d.translation_magnitude())
            .fold(0.0, f64::max)
    }

    pub fn is_converged(&self) -> bool {
        self.status.is_converged()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniaxial_stress() {
        let s = ElementStress::from_components(100.0, 0.0, 0.0);
        assert_relative_eq!(s.von_mises, 100.0, epsilon = 1e-12);
        assert_relative_eq!(s.principal.s1, 100.0, epsilon = 1e-12);
        assert_relative_eq!(s.principal.s2, 0.0, epsilon = 1e-12);
        assert_relative_eq!(s.principal.angle, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pure_shear_principal_axes() {
        let s = ElementStress::from_components(0.0, 0.0, 50.0);
        assert_relative_eq!(s.principal.s1, 50.0, epsilon = 1e-12);
        assert_relative_eq!(s.principal.s2, -50.0, epsilon = 1e-12);
        assert_relative_eq!(s.principal.angle, std::f64::consts::FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(s.von_mises, 50.0 * 3f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_beam_forces_json_names() {
        let forces = BeamForces {
            n1: 1.0,
            v1: 2.0,
            m1: 3.0,
            n2: 4.0,
            v2: 5.0,
            m2: 6.0,
            length: 1.0,
            stations: vec![0.0, 1.0],
            normal_force: vec![1.0, 1.0],
            shear_force: vec![2.0, 2.0],
            bending_moment: vec![3.0, -7.0],
            max_n: 1.0,
            max_v: 2.0,
            max_m: 7.0,
        };
        let json = serde_json::to_value(&forces).unwrap();
        assert_eq!(json["N1"], 1.0);
        assert_eq!(json["maxM"], 7.0);
        assert_eq!(json["bendingMoment"][1], -7.0);
        assert_eq!(forces.max_moment_station(), Some(1));
    }

    #[test]
    fn test_only_converged_status_has_no_failure() {
        assert_eq!(SolveStatus::Converged { iterations: 3 }.failure_message(), None);
        let unconverged = SolveStatus::NotConverged { step: 2, iterations: 50 };
        assert!(unconverged
            .failure_message()
            .is_some_and(|m| m.starts_with("Analysis did not converge")));
        assert!(SolveStatus::Unstable { step: 1 }.failure_message().is_some());
        assert!(SolveStatus::Cancelled.failure_message().is_some());

        let json = serde_json::to_value(SolveStatus::Unstable { step: 4 }).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "unstable", "step": 4 }));
    }
}
