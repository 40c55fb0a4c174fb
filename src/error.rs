//! Error types for the 2D solver

use thiserror::Error;

use crate::elements::{ElementId, NodeId};

/// Precondition failures detected before any numeric work starts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{analysis} analysis needs at least {required} nodes, found {found}")]
    TooFewNodes {
        analysis: &'static str,
        required: usize,
        found: usize,
    },

    #[error("frame analysis needs at least one beam element")]
    NoBeams,

    #[error("{0} analysis needs at least one triangle or quad element")]
    NoPlaneElements(&'static str),

    #[error("no constrained degrees of freedom - add at least one support")]
    NoSupports,

    #[error("no loads applied - add a nodal or distributed load")]
    NoLoads,
}

/// Geometric faults raised by the element library
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GeometryFault {
    #[error("degenerate triangle (signed area {area:e})")]
    DegenerateArea { area: f64 },

    #[error("non-positive Jacobian determinant {det_j:e} at (xi={xi:.4}, eta={eta:.4})")]
    NonPositiveJacobian { det_j: f64, xi: f64, eta: f64 },

    #[error("zero-length beam (length {length:e})")]
    ZeroLength { length: f64 },
}

/// Main error type for mesh and solver operations
#[derive(Error, Debug)]
pub enum FemError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("element {element} is geometrically invalid: {fault}")]
    Geometry {
        element: ElementId,
        #[source]
        fault: GeometryFault,
    },

    #[error(
        "singular stiffness matrix at DOF {dof} (pivot {pivot:e}) - the model is unstable, \
         add supports or check for mechanisms"
    )]
    SingularSystem { dof: usize, pivot: f64 },

    #[error("Node {0} not found in mesh")]
    NodeNotFound(NodeId),

    #[error("Element {0} not found in mesh")]
    ElementNotFound(ElementId),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for mesh and solver operations
pub type FemResult<T> = Result<T, FemError>;
