use thiserror::Error;

use super::{Arc, VertexId};

/// Which per-vertex weight a validation failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum WeightField {
    Cost,
    Utility,
}

/// Structural problems with a graph instance, detected before any model is built
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedGraphError {
    #[error("Graph has no vertices")]
    NoVertices,

    #[error("Arc {arc} has an endpoint outside [0, {n}]")]
    ArcOutOfRange { arc: Arc, n: usize },

    #[error("Arc {arc} points into the virtual source")]
    ArcIntoSource { arc: Arc },

    #[error("Vertex {vertex} has no {field}")]
    MissingWeight { vertex: VertexId, field: WeightField },

    #[error("Vertex {vertex} has invalid {field} {value} (must be finite and non-negative)")]
    InvalidWeight {
        vertex: VertexId,
        field: WeightField,
        value: f64,
    },

    #[error("{field} given for vertex {vertex} outside [1, {n}]")]
    UnknownWeightVertex {
        vertex: VertexId,
        field: WeightField,
        n: usize,
    },

    #[error("Terminal set is empty")]
    EmptyTerminalSet,

    #[error("Terminal {terminal} is outside [1, {n}]")]
    TerminalOutOfRange { terminal: VertexId, n: usize },

    #[error("No arc leaves the virtual source towards terminal {t0}")]
    MissingSourceArc { t0: VertexId },

    #[error("Virtual source has {count} outgoing arcs, expected exactly one")]
    MultipleSourceArcs { count: usize },

    #[error("Source arc points at vertex {head}, expected the first terminal {t0}")]
    SourceArcMismatch { head: VertexId, t0: VertexId },

    #[error("Budget {0} is not a finite number")]
    InvalidBudget(f64),
}
