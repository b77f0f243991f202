//! Seam: geometric search and interface coupling for finite-element meshes.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Seam sub-crates. For most users, adding `seam` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use seam::prelude::*;
//!
//! // A 3-element slave block resting on a 4-element master block.
//! let mut b = MeshBuilder::new();
//! let master = b.add_quad_grid(Point::origin(), 4, 1, 1.0, 1.0, |_, _| ProcessorId(0));
//! let slave = b.add_quad_grid(Point::new(0.0, 1.0, 0.0), 3, 1, 1.0, 1.0, |_, _| ProcessorId(0));
//! b.add_boundary("master", BoundaryId(1)).unwrap();
//! b.add_boundary("slave", BoundaryId(2)).unwrap();
//! for (e, s) in master.top_sides() {
//!     b.add_side("master", e, s).unwrap();
//! }
//! for (e, s) in slave.bottom_sides() {
//!     b.add_side("slave", e, s).unwrap();
//! }
//! let mut mesh = b.build();
//! let mut fe = FeAssembly::new(ProcessorId(0), Order::Second);
//!
//! let mut search = GeometricSearch::new(SearchConfig::default()).unwrap();
//! let mut ctx = SearchContext::new(&mut mesh, &mut fe);
//! let h = search
//!     .get_quadrature_penetration_locator(&mut ctx, "master", "slave", Order::Second)
//!     .unwrap();
//! search.update(&mut ctx, SearchKind::All).unwrap();
//!
//! // Two face quadrature points on each of the three slave sides.
//! assert_eq!(search.penetration(&h).unwrap().len(), 6);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `seam-core` | IDs, synthetic boundary ids, errors, service traits |
//! | [`mesh`] | `seam-mesh` | In-memory mesh, quadrature rules, assembly |
//! | [`search`] | `seam-search` | Locators and the search engine |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`seam-core`).
///
/// Contains the id newtypes, the synthetic boundary id scheme, the
/// [`types::SearchError`] taxonomy, and the service traits
/// ([`types::SearchMesh`], [`types::Assembly`]).
pub use seam_core as types;

/// In-memory mesh backend (`seam-mesh`).
///
/// [`mesh::MeshBuilder`] builds a [`mesh::Mesh`]; [`mesh::FeAssembly`]
/// evaluates Gauss rules on its elements.
pub use seam_mesh as mesh;

/// Geometric search engine (`seam-search`).
///
/// [`search::GeometricSearch`] owns the nearest-node and penetration
/// locators and the synthetic-node registries.
pub use seam_search as search;

/// Common imports for typical Seam usage.
///
/// ```rust
/// use seam::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use seam_core::{
        Assembly, BoundaryId, ConstraintSide, ElemId, ElemType, InterfaceId, NodeId, Order,
        Point, ProcessorId, SearchMesh, Vector,
    };

    // Errors
    pub use seam_core::SearchError;
    pub use seam_mesh::MeshError;

    // Mesh
    pub use seam_mesh::{FeAssembly, Mesh, MeshBuilder};

    // Search
    pub use seam_search::{
        ElementPairLocator, GeometricSearch, NearestNodeHandle, OverlapPairLocator,
        PenetrationHandle, SearchConfig, SearchContext, SearchKind, SharedElementPairLocator,
    };
}
