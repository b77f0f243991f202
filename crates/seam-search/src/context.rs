//! Borrowed services handed to the engine for one call.
//!
//! [`SearchContext`] bundles the mesh and assembly the engine drives. The
//! engine never stores either; every operation that touches geometry takes
//! a context for its duration.

use seam_core::{Assembly, ProcessorId, SearchMesh};

/// Mutable access to the mesh and assembly services for one engine call.
///
/// Uses dynamic dispatch so any [`SearchMesh`] / [`Assembly`] pair can be
/// plugged in, including the instrumented stand-ins in `seam-test-utils`.
pub struct SearchContext<'a> {
    pub(crate) mesh: &'a mut dyn SearchMesh,
    pub(crate) assembly: &'a mut dyn Assembly,
}

impl<'a> SearchContext<'a> {
    /// Bundle a mesh and an assembly.
    pub fn new(mesh: &'a mut dyn SearchMesh, assembly: &'a mut dyn Assembly) -> Self {
        Self { mesh, assembly }
    }

    /// The mesh service.
    pub fn mesh(&self) -> &dyn SearchMesh {
        self.mesh
    }

    /// Mutable mesh service.
    pub fn mesh_mut(&mut self) -> &mut dyn SearchMesh {
        self.mesh
    }

    /// Rank of this process, as reported by the assembly.
    pub fn processor_id(&self) -> ProcessorId {
        self.assembly.processor_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seam_core::{BoundaryId, Order, Point};
    use seam_mesh::{FeAssembly, Mesh, MeshBuilder};

    fn mesh() -> Mesh {
        let mut b = MeshBuilder::new();
        let grid = b.add_quad_grid(Point::origin(), 1, 1, 1.0, 1.0, |_, _| ProcessorId(3));
        b.add_boundary("base", BoundaryId(4)).unwrap();
        for (elem, side) in grid.bottom_sides() {
            b.add_side("base", elem, side).unwrap();
        }
        b.build()
    }

    #[test]
    fn exposes_both_services() {
        let mut mesh = mesh();
        let mut fe = FeAssembly::new(ProcessorId(3), Order::First);
        let mut ctx = SearchContext::new(&mut mesh, &mut fe);
        assert_eq!(ctx.processor_id(), ProcessorId(3));
        assert_eq!(ctx.mesh().boundary_id("base").unwrap(), BoundaryId(4));
        ctx.mesh_mut().add_ghosted_boundary(BoundaryId(4));
        assert!(mesh.ghosted_boundaries().contains(&BoundaryId(4)));
    }
}
