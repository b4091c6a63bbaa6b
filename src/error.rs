//! Error types for the graph model and simplification engine.

use thiserror::Error;

/// Errors raised by the graph model (§4.A) and simplifier (§4.D).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node '{name}' not found in graph '{graph}'")]
    NodeMissing { graph: String, name: String },

    #[error("node '{name}' already exists in graph '{graph}'")]
    DuplicateNode { graph: String, name: String },

    #[error("path '{accession}' already exists at zoom {zoom} in graph '{graph}'")]
    DuplicatePath {
        graph: String,
        accession: String,
        zoom: u32,
    },

    #[error("path overlap error: {detail}")]
    PathOverlap { detail: String },

    #[error("no overlap found: {detail}")]
    NoOverlap { detail: String },

    #[error("no anchor found: {detail}")]
    NoAnchor { detail: String },

    #[error("invariant violated at node '{node}': {detail}")]
    InvariantViolation { node: String, detail: String },
}

pub type Result<T> = std::result::Result<T, GraphError>;
