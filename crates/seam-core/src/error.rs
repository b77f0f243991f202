//! Error types for geometric search.
//!
//! Every failure is terminal to the current step: there are no retries.
//! Configuration errors come from bad input (an unknown boundary name,
//! an unrecognized side tag); the remaining variants flag mesh state that
//! contradicts what the engine generated or was told.

use std::error::Error;
use std::fmt;

use crate::id::{BoundaryId, BoundaryPairKey, ElemId, InterfaceId, NodeId, QuadratureNodeKey};

/// Errors surfaced by the search engine and the services it drives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchError {
    /// A boundary name could not be resolved by the mesh.
    UnknownBoundary {
        /// The name that failed to resolve.
        name: String,
    },
    /// A mortar side tag was neither master nor slave.
    UnknownSideType {
        /// The tag as supplied.
        tag: String,
    },
    /// A quadrature order tag could not be parsed.
    UnknownOrder {
        /// The tag as supplied.
        tag: String,
    },
    /// A synthetic id was requested for an id outside the real range.
    BoundaryIdOutOfRange {
        /// The offending id.
        id: BoundaryId,
        /// Largest id accepted.
        limit: u32,
    },
    /// A node id is not present in the mesh.
    UnknownNode {
        /// The missing node.
        node: NodeId,
    },
    /// An element id is not present in the mesh.
    UnknownElement {
        /// The missing element.
        elem: ElemId,
    },
    /// A side index is out of range for its element.
    InvalidSide {
        /// The element.
        elem: ElemId,
        /// The offending local side index.
        side: u16,
    },
    /// A side shape the penetration projection does not handle.
    UnsupportedSide {
        /// The element owning the side.
        elem: ElemId,
        /// The local side index.
        side: u16,
        /// Number of nodes on the side.
        nodes: usize,
    },
    /// An update touched a quadrature node that was never generated.
    MissingQuadratureNode {
        /// Identity of the missing node.
        key: QuadratureNodeKey,
    },
    /// No mortar interface is defined between two boundaries.
    MissingMortarInterface {
        /// Master side of the requested interface.
        master: BoundaryId,
        /// Slave side of the requested interface.
        slave: BoundaryId,
    },
    /// Two mortar views resolve to the same locator key.
    ///
    /// Happens when a mesh declares an interface in both directions and
    /// the master view of one meets the slave view of the other.
    MortarViewConflict {
        /// The shared nearest-node key.
        key: BoundaryPairKey,
        /// Interface already registered under `key`.
        existing: BoundaryPairKey,
        /// Interface whose view was rejected.
        requested: BoundaryPairKey,
    },
    /// A shared element-pair locator was still borrowed when the engine
    /// needed to drive it.
    LocatorBusy {
        /// Interface the locator is registered under.
        interface: InterfaceId,
    },
    /// Search configuration failed validation.
    InvalidConfig {
        /// Which invariant was violated.
        reason: String,
    },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownBoundary { name } => write!(f, "unknown boundary '{name}'"),
            Self::UnknownSideType { tag } => write!(f, "unknown side type '{tag}'"),
            Self::UnknownOrder { tag } => write!(f, "unknown quadrature order '{tag}'"),
            Self::BoundaryIdOutOfRange { id, limit } => {
                write!(f, "boundary id {id} exceeds real id limit {limit}")
            }
            Self::UnknownNode { node } => write!(f, "node {node} not in mesh"),
            Self::UnknownElement { elem } => write!(f, "element {elem} not in mesh"),
            Self::InvalidSide { elem, side } => {
                write!(f, "side {side} out of range for element {elem}")
            }
            Self::UnsupportedSide { elem, side, nodes } => {
                write!(f, "side {side} of element {elem} has {nodes} nodes; expected 1 or 2")
            }
            Self::MissingQuadratureNode { key } => write!(f, "{key} was never generated"),
            Self::MissingMortarInterface { master, slave } => {
                write!(f, "no mortar interface between boundaries {master} and {slave}")
            }
            Self::MortarViewConflict {
                key,
                existing,
                requested,
            } => write!(
                f,
                "mortar view {key} of interface {requested} collides with interface {existing}"
            ),
            Self::LocatorBusy { interface } => {
                write!(f, "element-pair locator {interface} is borrowed elsewhere")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid search config: {reason}"),
        }
    }
}

impl Error for SearchError {}
