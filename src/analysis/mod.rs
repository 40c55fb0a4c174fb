//! Analysis types, options and pre-solve validation

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::math::PlaneFormulation;
use crate::mesh::Mesh;

/// Type of 2D analysis to perform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    /// Beam frame, 3 DOF per node (u, v, θ)
    #[default]
    Frame,
    /// Planar continuum with σz = 0, 2 DOF per node (u, v)
    PlaneStress,
    /// Planar continuum with εz = 0, 2 DOF per node (u, v)
    PlaneStrain,
}

impl AnalysisType {
    pub fn dofs_per_node(self) -> usize {
        match self {
            AnalysisType::Frame => 3,
            AnalysisType::PlaneStress | AnalysisType::PlaneStrain => 2,
        }
    }

    /// Constitutive idealisation, `None` for frames
    pub fn plane_formulation(self) -> Option<PlaneFormulation> {
        match self {
            AnalysisType::Frame => None,
            AnalysisType::PlaneStress => Some(PlaneFormulation::Stress),
            AnalysisType::PlaneStrain => Some(PlaneFormulation::Strain),
        }
    }

    pub fn is_frame(self) -> bool {
        self == AnalysisType::Frame
    }

    fn label(self) -> &'static str {
        match self {
            AnalysisType::Frame => "frame",
            AnalysisType::PlaneStress => "plane stress",
            AnalysisType::PlaneStrain => "plane strain",
        }
    }
}

/// Options for a solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisOptions {
    /// Type of analysis
    pub analysis_type: AnalysisType,
    /// Enable P-Delta iteration on beam axial forces
    pub geometric_nonlinear: bool,
    /// Maximum iterations per load step
    pub max_iterations: usize,
    /// Relative displacement-increment tolerance
    pub tolerance: f64,
    /// Number of equal load increments
    pub load_steps: usize,
    /// Stations sampled along each beam
    pub num_stations: usize,
    /// Pivot tolerance relative to the largest diagonal entry
    pub pivot_tolerance: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            analysis_type: AnalysisType::Frame,
            geometric_nonlinear: false,
            max_iterations: 50,
            tolerance: 1e-8,
            load_steps: 10,
            num_stations: 21,
            pivot_tolerance: 1e-12,
        }
    }
}

impl AnalysisOptions {
    /// Create options for a linear frame analysis
    pub fn frame() -> Self {
        Self::default()
    }

    /// Create options for a plane stress analysis
    pub fn plane_stress() -> Self {
        Self::new(AnalysisType::PlaneStress)
    }

    /// Create options for a plane strain analysis
    pub fn plane_strain() -> Self {
        Self::new(AnalysisType::PlaneStrain)
    }

    pub fn new(analysis_type: AnalysisType) -> Self {
        Self {
            analysis_type,
            ..Self::default()
        }
    }

    /// Enable or disable geometric nonlinearity
    pub fn with_geometric_nonlinear(mut self, enabled: bool) -> Self {
        self.geometric_nonlinear = enabled;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    /// Set convergence tolerance
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_load_steps(mut self, steps: usize) -> Self {
        self.load_steps = steps;
        self
    }

    pub fn with_num_stations(mut self, stations: usize) -> Self {
        self.num_stations = stations;
        self
    }

    pub fn with_pivot_tolerance(mut self, tol: f64) -> Self {
        self.pivot_tolerance = tol;
        self
    }
}

/// Check the preconditions for solving `mesh` with `analysis_type`
///
/// Frames need at least 2 nodes and one beam; plane analyses need at least
/// 3 nodes and one triangle or quad. Every analysis needs a restrained DOF
/// and a non-zero load that the analysis can see.
pub fn validate(mesh: &Mesh, analysis_type: AnalysisType) -> Result<(), ValidationError> {
    let (required, has_elements) = if analysis_type.is_frame() {
        (2, mesh.beams().next().is_some())
    } else {
        (3, mesh.planar_elements().next().is_some())
    };

    if mesh.node_count() < required {
        return Err(ValidationError::TooFewNodes {
            analysis: analysis_type.label(),
            required,
            found: mesh.node_count(),
        });
    }
    if !has_elements {
        return Err(if analysis_type.is_frame() {
            ValidationError::NoBeams
        } else {
            ValidationError::NoPlaneElements(analysis_type.label())
        });
    }
    if mesh.get_constrained_dofs(analysis_type).is_empty() {
        return Err(ValidationError::NoSupports);
    }

    let per_node = analysis_type.dofs_per_node();
    let nodal = mesh
        .nodes()
        .any(|n| n.loads.as_array().iter().take(per_node).any(|&v| v != 0.0));
    let distributed = analysis_type.is_frame()
        && mesh
            .beams()
            .any(|b| b.distributed_load.is_some_and(|l| !l.is_zero()));
    if !nodal && !distributed {
        return Err(ValidationError::NoLoads);
    }

    Ok(())
}
