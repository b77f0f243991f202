//! Error types for mesh construction.

use seam_core::{BoundaryId, ElemId, ElemType, NodeId};
use std::fmt;

/// Errors arising while building a [`Mesh`](crate::Mesh).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// An element was given the wrong number of nodes for its type.
    WrongNodeCount {
        /// The element type.
        kind: ElemType,
        /// Nodes the type requires.
        expected: usize,
        /// Nodes supplied.
        got: usize,
    },
    /// An element references a node that was never added.
    UnknownNode {
        /// The missing node.
        node: NodeId,
    },
    /// A side or interface references an element that was never added.
    UnknownElement {
        /// The missing element.
        elem: ElemId,
    },
    /// A side index is out of range for its element.
    InvalidSide {
        /// The element.
        elem: ElemId,
        /// The offending side index.
        side: u16,
    },
    /// A side or interface names a boundary that was never declared.
    UnknownBoundary {
        /// The undeclared name.
        name: String,
    },
    /// The boundary name is already declared with a different id.
    DuplicateBoundary {
        /// The name.
        name: String,
    },
    /// The boundary id is already taken by another name.
    BoundaryIdInUse {
        /// The id.
        id: BoundaryId,
        /// The name already holding it.
        name: String,
    },
    /// The boundary id lies in the synthetic range.
    BoundaryIdOutOfRange {
        /// The id.
        id: BoundaryId,
    },
    /// A mortar coupling element is not a line segment.
    MortarElementNotEdge {
        /// The offending element.
        elem: ElemId,
        /// Its type.
        kind: ElemType,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongNodeCount {
                kind,
                expected,
                got,
            } => write!(f, "{kind} needs {expected} nodes, got {got}"),
            Self::UnknownNode { node } => write!(f, "node {node} was never added"),
            Self::UnknownElement { elem } => write!(f, "element {elem} was never added"),
            Self::InvalidSide { elem, side } => {
                write!(f, "side {side} out of range for element {elem}")
            }
            Self::UnknownBoundary { name } => write!(f, "boundary '{name}' was never declared"),
            Self::DuplicateBoundary { name } => {
                write!(f, "boundary '{name}' already declared with another id")
            }
            Self::BoundaryIdInUse { id, name } => {
                write!(f, "boundary id {id} already used by '{name}'")
            }
            Self::BoundaryIdOutOfRange { id } => {
                write!(f, "boundary id {id} lies in the synthetic range")
            }
            Self::MortarElementNotEdge { elem, kind } => {
                write!(f, "mortar element {elem} is {kind}, expected EDGE2")
            }
        }
    }
}

impl std::error::Error for MeshError {}
