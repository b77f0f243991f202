//! Geometric search and interface coupling for deforming meshes.
//!
//! [`GeometricSearch`] discovers and maintains proximity between boundary
//! regions of a (possibly partitioned) mesh:
//!
//! - [`NearestNodeLocator`]: nearest master node per slave node, searched
//!   within bounded patches.
//! - [`PenetrationLocator`]: closest point, normal and signed distance per
//!   slave node, built on a nearest-node locator.
//! - [`ElementPairLocator`]: caller-supplied element pairing across an
//!   interface, driven at the penetration cadence.
//! - [`QuadratureNodeManager`]: synthetic nodes at face and mortar
//!   quadrature points, tagged with ids from [`seam_core::synthetic`].
//!
//! The engine drives the mesh and assembly through a [`SearchContext`]
//! borrowed for each call; it never stores them.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod config;
pub mod context;
pub mod element_pair;
pub mod nearest_node;
pub mod penetration;
pub mod quadrature_nodes;
pub mod search;

pub use cache::LocatorCache;
pub use config::SearchConfig;
pub use context::SearchContext;
pub use element_pair::{ElementPairLocator, OverlapPairLocator, SharedElementPairLocator};
pub use nearest_node::{NearestNodeInfo, NearestNodeLocator};
pub use penetration::{PenetrationInfo, PenetrationLocator};
pub use quadrature_nodes::{MortarView, QuadratureNodeManager};
pub use search::{
    GeometricSearch, NearestNodeHandle, PenetrationHandle, SearchKind, SearchState,
};
