use thiserror::Error;

use crate::topology::VertexId;

/// Top-level error type for the Prismesh extrusion kernel.
#[derive(Debug, Error)]
pub enum PrismeshError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Extrusion(#[from] ExtrusionError),

    #[error(transparent)]
    Expr(#[from] ExprError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to the topology store.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors raised while building extruded cell layers.
#[derive(Debug, Error)]
pub enum ExtrusionError {
    #[error("initialization failed: {0}")]
    Initialization(String),

    #[error("selection is empty after discarding unselected geometry")]
    EmptySelection,

    #[error("no qualifying incident face to derive an extrusion direction for vertex {0:?}")]
    DegenerateDirection(VertexId),

    #[error("internal side face not found for edge ({0:?}, {1:?})")]
    TopologyConsistency(VertexId, VertexId),

    #[error("layer {layer} produced no new cells")]
    ZeroCellsProduced { layer: usize },
}

/// Errors from parsing or evaluating a thickness-scaling expression.
#[derive(Debug, Error)]
pub enum ExprError {
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    #[error("unexpected token at offset {offset}")]
    UnexpectedToken { offset: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("trailing input after expression at offset {offset}")]
    TrailingInput { offset: usize },

    #[error("expression evaluated to a non-finite value")]
    NonFinite,
}

/// Convenience type alias for results using [`PrismeshError`].
pub type Result<T> = std::result::Result<T, PrismeshError>;
