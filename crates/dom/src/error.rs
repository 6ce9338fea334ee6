//! Error types for DOM operations
//!
//! Simple, flat error hierarchy. Mirrors the exceptions a browser DOM raises
//! for the same misuse.

use crate::types::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Invalid node type: expected {expected}, got {actual}")]
    InvalidNodeType { expected: String, actual: String },

    #[error("Invalid selector: {0:?}")]
    InvalidSelector(String),

    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    #[error("Invalid character in {0:?}")]
    InvalidCharacter(String),

    #[error("Tree description error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
