//! Strongly-typed identifiers and composite keys.

use std::fmt;

/// Identifies a named region of the mesh boundary.
///
/// User-declared boundaries occupy `0..=MAX_REAL_BOUNDARY_ID`; ids above
/// that range are manufactured by the search engine to tag quadrature and
/// mortar geometry (see [`crate::synthetic`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoundaryId(pub u32);

impl fmt::Display for BoundaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for BoundaryId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a mesh node, including synthetic quadrature nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a mesh element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElemId(pub u32);

impl fmt::Display for ElemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ElemId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Rank of the worker process owning a mesh partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessorId(pub u32);

impl fmt::Display for ProcessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ProcessorId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies an externally defined interface carrying an element-pair
/// locator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterfaceId(pub u32);

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for InterfaceId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Ordered `(master, slave)` boundary pair.
///
/// Identity of a locator cache entry. Directionality matters:
/// `(A, B)` and `(B, A)` are distinct keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoundaryPairKey {
    /// Boundary searched for candidates.
    pub master: BoundaryId,
    /// Boundary whose nodes issue the queries.
    pub slave: BoundaryId,
}

impl BoundaryPairKey {
    /// Build a key from its two sides.
    pub fn new(master: BoundaryId, slave: BoundaryId) -> Self {
        Self { master, slave }
    }

    /// The same pair viewed from the other side.
    pub fn reversed(self) -> Self {
        Self {
            master: self.slave,
            slave: self.master,
        }
    }
}

impl fmt::Display for BoundaryPairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.master, self.slave)
    }
}

/// Identity of one synthetic quadrature node.
///
/// Exactly one node exists per key. Regenerating a key overwrites the
/// stored position instead of creating a second node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuadratureNodeKey {
    /// Element the quadrature rule was evaluated on.
    pub elem: ElemId,
    /// Local side index; `0` for volumetric (mortar) rules.
    pub side: u16,
    /// Quadrature point index within the rule.
    pub qp: u16,
    /// Synthetic boundary id the node is tagged with.
    pub boundary: BoundaryId,
}

impl fmt::Display for QuadratureNodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "qnode(elem={}, side={}, qp={}, bnd={})",
            self.elem, self.side, self.qp, self.boundary
        )
    }
}
