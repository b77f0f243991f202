//! Reusable mesh fixtures.
//!
//! - [`contact_strip`]: a three-element slave block resting on a
//!   four-element master block, all on processor 0.
//! - [`split_contact_strip`]: the same strip with the last slave element
//!   owned by processor 1.
//! - [`mortar_pair`]: two blocks joined by a two-segment mortar interface.

use seam_core::{BoundaryId, ElemType, Point, ProcessorId};
use seam_mesh::{Mesh, MeshBuilder};

/// Name of the master boundary in every fixture.
pub const MASTER: &str = "master";
/// Name of the slave boundary in every fixture.
pub const SLAVE: &str = "slave";
/// Id of [`MASTER`].
pub const MASTER_ID: BoundaryId = BoundaryId(1);
/// Id of [`SLAVE`].
pub const SLAVE_ID: BoundaryId = BoundaryId(2);

/// Slave block `[0, 3] x [1 + gap, 2 + gap]` (3 quads) over master block
/// `[0, 4] x [0, 1]` (4 quads).
///
/// The slave's bottom sides form [`SLAVE`] (3 sides, 4 nodes); the
/// master's top sides form [`MASTER`] (4 sides, 5 nodes).
pub fn contact_strip_with(gap: f64, slave_owner: impl Fn(usize) -> ProcessorId) -> Mesh {
    let mut b = MeshBuilder::new();
    let master = b.add_quad_grid(Point::origin(), 4, 1, 1.0, 1.0, |_, _| ProcessorId(0));
    let slave = b.add_quad_grid(Point::new(0.0, 1.0 + gap, 0.0), 3, 1, 1.0, 1.0, |i, _| {
        slave_owner(i)
    });
    b.add_boundary(MASTER, MASTER_ID).expect("fresh boundary");
    b.add_boundary(SLAVE, SLAVE_ID).expect("fresh boundary");
    for (e, s) in master.top_sides() {
        b.add_side(MASTER, e, s).expect("valid side");
    }
    for (e, s) in slave.bottom_sides() {
        b.add_side(SLAVE, e, s).expect("valid side");
    }
    b.build()
}

/// [`contact_strip_with`] touching, everything on processor 0.
pub fn contact_strip() -> Mesh {
    contact_strip_with(0.0, |_| ProcessorId(0))
}

/// [`contact_strip_with`] touching, slave element 2 on processor 1.
pub fn split_contact_strip() -> Mesh {
    contact_strip_with(0.0, |i| ProcessorId(u32::from(i == 2)))
}

/// Master block `[0, 2] x [0, 1]` and slave block `[0, 2] x [1, 2]` with a
/// mortar interface of two `Edge2` segments along `y = 1`.
pub fn mortar_pair() -> Mesh {
    let mut b = MeshBuilder::new();
    let master = b.add_quad_grid(Point::origin(), 2, 1, 1.0, 1.0, |_, _| ProcessorId(0));
    let slave = b.add_quad_grid(Point::new(0.0, 1.0, 0.0), 2, 1, 1.0, 1.0, |_, _| ProcessorId(0));
    b.add_boundary(MASTER, MASTER_ID).expect("fresh boundary");
    b.add_boundary(SLAVE, SLAVE_ID).expect("fresh boundary");
    for (e, s) in master.top_sides() {
        b.add_side(MASTER, e, s).expect("valid side");
    }
    for (e, s) in slave.bottom_sides() {
        b.add_side(SLAVE, e, s).expect("valid side");
    }
    let segments: Vec<_> = (0..2)
        .map(|i| {
            b.add_elem(
                ElemType::Edge2,
                &[master.node(i, 1), master.node(i + 1, 1)],
                ProcessorId(0),
            )
            .expect("valid segment")
        })
        .collect();
    b.add_mortar_interface(MASTER, SLAVE, &segments)
        .expect("declared boundaries");
    b.build()
}
