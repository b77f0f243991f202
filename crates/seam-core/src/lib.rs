//! Core types and traits for the Seam geometric search engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the mesh backend and the search engine:
//! typed ids, the synthetic boundary id scheme, error types, and the
//! service traits ([`SearchMesh`], [`Assembly`]) through which the
//! engine talks to the mesh and assembly collaborators it does not own.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod elem;
pub mod error;
pub mod id;
pub mod synthetic;
pub mod tag;
pub mod traits;

pub use elem::ElemType;
pub use error::SearchError;
pub use id::{
    BoundaryId, BoundaryPairKey, ElemId, InterfaceId, NodeId, ProcessorId, QuadratureNodeKey,
};
pub use synthetic::{BoundaryKind, MAX_REAL_BOUNDARY_ID, MORTAR_OFFSET, QUADRATURE_OFFSET};
pub use tag::{ConstraintSide, Order};
pub use traits::{Assembly, BoundaryElement, MortarInterface, SearchMesh, SideNodes};

/// Spatial position of a node or quadrature point.
pub type Point = nalgebra::Point3<f64>;

/// Spatial direction (normals, offsets).
pub type Vector = nalgebra::Vector3<f64>;
