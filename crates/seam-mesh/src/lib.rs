//! In-memory mesh and assembly backends for the Seam search engine.
//!
//! [`Mesh`] is a replicated 2D mesh of [`Edge2`](seam_core::ElemType::Edge2),
//! [`Tri3`](seam_core::ElemType::Tri3) and [`Quad4`](seam_core::ElemType::Quad4)
//! elements with named side sets and mortar interfaces. It implements
//! [`SearchMesh`](seam_core::SearchMesh), storing synthetic quadrature nodes
//! alongside the real ones. [`FeAssembly`] implements
//! [`Assembly`](seam_core::Assembly) with Gauss rules from [`quadrature`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod assembly;
pub mod builder;
pub mod element;
pub mod error;
pub mod mesh;
pub mod quadrature;

pub use assembly::FeAssembly;
pub use builder::{MeshBuilder, QuadGrid};
pub use element::Element;
pub use error::MeshError;
pub use mesh::Mesh;
pub use quadrature::QuadratureRule;
