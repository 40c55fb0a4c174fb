//! FEM2D Solver - A native Rust 2D finite element engine
//!
//! This library provides a 2D structural analysis core supporting:
//! - Frame analysis with Euler-Bernoulli beams (end releases, partial and
//!   global-frame distributed loads)
//! - Plane stress and plane strain with constant-strain triangles and
//!   bilinear quads
//! - Linear static analysis
//! - P-Delta (second order) analysis with load stepping
//!
//! ## Example
//! ```rust
//! use fem2d_solver::prelude::*;
//!
//! let mut mesh = Mesh::new();
//!
//! // Add nodes
//! let a = mesh.add_node(0.0, 0.0);
//! let b = mesh.add_node(4.0, 0.0);
//!
//! // Add a beam using the default steel material
//! let section = BeamSection::new(28.5e-4, 1943e-8, 0.2);
//! mesh.add_beam_element([a, b], DEFAULT_MATERIAL_ID, section).unwrap();
//!
//! // Supports and loads
//! mesh.update_node(a, NodeUpdate::new().constraints(Constraints::fixed()));
//! mesh.update_node(b, NodeUpdate::new().loads(NodalLoads::fy(-8000.0)));
//!
//! // Analyze
//! let result = solve_linear(&mesh, &AnalysisOptions::frame()).unwrap();
//!
//! // Get results
//! let tip = result.node_displacement(b).unwrap();
//! assert!(tip.dy < 0.0);
//! ```

pub mod analysis;
pub mod assembly;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod mesh;
pub mod post_processor;
pub mod results;
pub mod solver;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{validate, AnalysisOptions, AnalysisType};
    pub use crate::assembly::{Assembler, AssemblyWarning};
    pub use crate::elements::{
        BeamElement, BeamSection, BeamUpdate, Constraints, Element, ElementId, EndReleases,
        Material, MaterialId, Node, NodeId, NodeUpdate, Springs, DEFAULT_MATERIAL_ID,
    };
    pub use crate::error::{FemError, FemResult, GeometryFault, ValidationError};
    pub use crate::loads::{CoordSystem, DistributedLoad, NodalLoads};
    pub use crate::mesh::{BeamSplit, Mesh};
    pub use crate::results::{
        BeamForces, ElementStress, NodeDisplacement, NodeReaction, SolveStatus, SolverResult,
    };
    pub use crate::solver::{analyze, solve_linear, solve_nonlinear, CancelFlag};
}
