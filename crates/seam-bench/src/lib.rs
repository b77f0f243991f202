//! Benchmark profiles for the Seam geometric search engine.
//!
//! - [`reference_strip`]: 1 000 slave faces over 1 200 master faces.
//! - [`stress_strip`]: 10 000 slave faces over 12 000 master faces.
//! - [`wave`]: a smooth displacement field for update benchmarks.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use seam_core::{BoundaryId, NodeId, Point, ProcessorId, Vector};
use seam_mesh::{Mesh, MeshBuilder};

/// Master boundary name in every profile.
pub const MASTER: &str = "master";
/// Slave boundary name in every profile.
pub const SLAVE: &str = "slave";

/// A slave strip of `n_slave` quads resting on a master strip of
/// `n_master` quads spanning the same width, both one element thick.
///
/// Element widths differ so slave and master nodes never line up.
pub fn strip(n_master: usize, n_slave: usize, gap: f64) -> Mesh {
    let width = n_slave as f64;
    let mut b = MeshBuilder::new();
    let master = b.add_quad_grid(
        Point::origin(),
        n_master,
        1,
        width / n_master as f64,
        1.0,
        |_, _| ProcessorId(0),
    );
    let slave = b.add_quad_grid(Point::new(0.0, 1.0 + gap, 0.0), n_slave, 1, 1.0, 1.0, |_, _| {
        ProcessorId(0)
    });
    b.add_boundary(MASTER, BoundaryId(1)).unwrap();
    b.add_boundary(SLAVE, BoundaryId(2)).unwrap();
    for (e, s) in master.top_sides() {
        b.add_side(MASTER, e, s).unwrap();
    }
    for (e, s) in slave.bottom_sides() {
        b.add_side(SLAVE, e, s).unwrap();
    }
    b.build()
}

/// Reference profile: 1 000 slave faces, 1 200 master faces.
pub fn reference_strip() -> Mesh {
    strip(1_200, 1_000, 0.01)
}

/// Stress profile: 10 000 slave faces, 12 000 master faces.
pub fn stress_strip() -> Mesh {
    strip(12_000, 10_000, 0.01)
}

/// Small vertical wave of amplitude `amp`, phase-shifted by `phase`.
pub fn wave(amp: f64, phase: f64) -> impl FnMut(NodeId, &Point) -> Vector {
    move |_: NodeId, x: &Point| Vector::new(0.0, amp * (0.5 * x.x + phase).sin(), 0.0)
}
