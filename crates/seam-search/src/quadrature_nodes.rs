//! Synthetic quadrature and mortar nodes.
//!
//! Face quadrature points of a slave boundary become real mesh nodes tagged
//! with the slave's quadrature id, so a nearest-node search can run against
//! them like any other boundary. Mortar interfaces get the same treatment
//! with the volumetric rule on their coupling elements, tagged with the
//! mortar id of the opposite side.
//!
//! Node identity is `(element, side, qp, tag)`. Generation is idempotent per
//! slave boundary (or per mortar view) through the registries kept here;
//! updates only move existing nodes.

use indexmap::{IndexMap, IndexSet};
use seam_core::{
    Assembly, BoundaryElement, BoundaryId, BoundaryPairKey, ConstraintSide, ElemId,
    QuadratureNodeKey, SearchError, SearchMesh,
};
use tracing::debug;

/// One requested mortar view of an interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MortarView {
    /// The interface's (master, slave) boundary pair.
    pub interface: BoundaryPairKey,
    /// Which side of the interface is searched.
    pub side: ConstraintSide,
    /// Tag carried by the view's mortar nodes.
    pub synthetic: BoundaryId,
}

/// Registries and generation logic for synthetic nodes.
#[derive(Debug, Default)]
pub struct QuadratureNodeManager {
    quadrature_boundaries_generated: IndexSet<BoundaryId>,
    mortar_boundary_pairs_generated: IndexSet<BoundaryPairKey>,
    slave_to_synthetic: IndexMap<BoundaryId, BoundaryId>,
    boundary_to_mortar: IndexMap<BoundaryId, BoundaryId>,
    mortar_views: IndexMap<BoundaryPairKey, MortarView>,
}

fn owned(mesh: &dyn SearchMesh, elem: ElemId, assembly: &dyn Assembly) -> bool {
    mesh.elem_processor(elem) == Some(assembly.processor_id())
}

fn owned_sides(
    mesh: &dyn SearchMesh,
    assembly: &dyn Assembly,
    boundary: BoundaryId,
) -> Vec<BoundaryElement> {
    mesh.boundary_elements()
        .iter()
        .filter(|b| b.boundary == boundary && owned(mesh, b.elem, assembly))
        .copied()
        .collect()
}

impl QuadratureNodeManager {
    /// Empty registries.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Registries ─────────────────────────────────────────────────

    /// Slave boundaries whose quadrature nodes have been generated.
    pub fn quadrature_boundaries_generated(&self) -> &IndexSet<BoundaryId> {
        &self.quadrature_boundaries_generated
    }

    /// Mortar views (keyed by their locator pair) whose nodes have been generated.
    pub fn mortar_boundary_pairs_generated(&self) -> &IndexSet<BoundaryPairKey> {
        &self.mortar_boundary_pairs_generated
    }

    /// Slave boundary to quadrature id.
    pub fn slave_to_synthetic(&self) -> &IndexMap<BoundaryId, BoundaryId> {
        &self.slave_to_synthetic
    }

    /// Opposite-side boundary to mortar id.
    pub fn boundary_to_mortar(&self) -> &IndexMap<BoundaryId, BoundaryId> {
        &self.boundary_to_mortar
    }

    /// Every mortar view requested so far.
    pub fn mortar_views(&self) -> &IndexMap<BoundaryPairKey, MortarView> {
        &self.mortar_views
    }

    /// Remember that `slave` is searched through `synthetic` quadrature nodes.
    pub fn record_quadrature(&mut self, slave: BoundaryId, synthetic: BoundaryId) {
        self.slave_to_synthetic.insert(slave, synthetic);
    }

    /// Remember a mortar view under its locator key; `other` is the
    /// boundary opposite the searched side.
    ///
    /// Re-recording the same view is a no-op. A view of a different
    /// interface under an occupied key is rejected and nothing changes.
    pub fn record_mortar_view(
        &mut self,
        key: BoundaryPairKey,
        other: BoundaryId,
        view: MortarView,
    ) -> Result<(), SearchError> {
        if let Some(existing) = self.mortar_views.get(&key) {
            if existing.interface != view.interface {
                return Err(SearchError::MortarViewConflict {
                    key,
                    existing: existing.interface,
                    requested: view.interface,
                });
            }
        }
        self.boundary_to_mortar.insert(other, view.synthetic);
        self.mortar_views.insert(key, view);
        Ok(())
    }

    /// Forget which slave boundaries have quadrature nodes.
    ///
    /// Pair with clearing the mesh's quadrature nodes, or generation will
    /// overwrite the existing ones in place.
    pub fn clear_quadrature_registry(&mut self) {
        self.quadrature_boundaries_generated.clear();
    }

    // ── Face quadrature nodes ──────────────────────────────────────

    /// Create one node per face quadrature point on every owned side of
    /// `slave`, tagged `synthetic`. A no-op once `slave` is generated.
    pub fn generate_quadrature_nodes(
        &mut self,
        mesh: &mut dyn SearchMesh,
        assembly: &mut dyn Assembly,
        slave: BoundaryId,
        synthetic: BoundaryId,
    ) -> Result<(), SearchError> {
        if !self.quadrature_boundaries_generated.insert(slave) {
            return Ok(());
        }
        let sides = owned_sides(mesh, assembly, slave);
        let mut count = 0usize;
        for side in &sides {
            assembly.reinit_elem_face(mesh, side.elem, side.side)?;
            for (qp, &p) in assembly.q_points_face().iter().enumerate() {
                let key = QuadratureNodeKey {
                    elem: side.elem,
                    side: side.side,
                    qp: qp as u16,
                    boundary: synthetic,
                };
                mesh.add_quadrature_node(key, p);
                count += 1;
            }
        }
        debug!(%slave, %synthetic, sides = sides.len(), count, "quadrature nodes generated");
        Ok(())
    }

    /// Move the existing quadrature nodes of `slave` to the current face
    /// quadrature points. Never creates nodes.
    pub fn update_quadrature_nodes(
        &self,
        mesh: &mut dyn SearchMesh,
        assembly: &mut dyn Assembly,
        slave: BoundaryId,
    ) -> Result<(), SearchError> {
        let Some(&synthetic) = self.slave_to_synthetic.get(&slave) else {
            return Ok(());
        };
        for side in owned_sides(mesh, assembly, slave) {
            assembly.reinit_elem_face(mesh, side.elem, side.side)?;
            for (qp, &p) in assembly.q_points_face().iter().enumerate() {
                let key = QuadratureNodeKey {
                    elem: side.elem,
                    side: side.side,
                    qp: qp as u16,
                    boundary: synthetic,
                };
                let node = mesh
                    .quadrature_node(&key)
                    .ok_or(SearchError::MissingQuadratureNode { key })?;
                mesh.set_node_position(node, p)?;
            }
        }
        Ok(())
    }

    /// Generate quadrature nodes for every recorded slave boundary.
    pub fn generate_all_quadrature_nodes(
        &mut self,
        mesh: &mut dyn SearchMesh,
        assembly: &mut dyn Assembly,
    ) -> Result<(), SearchError> {
        let pairs: Vec<(BoundaryId, BoundaryId)> =
            self.slave_to_synthetic.iter().map(|(s, q)| (*s, *q)).collect();
        for (slave, synthetic) in pairs {
            self.generate_quadrature_nodes(mesh, assembly, slave, synthetic)?;
        }
        Ok(())
    }

    /// Move the quadrature nodes of every recorded slave boundary.
    pub fn update_all_quadrature_nodes(
        &self,
        mesh: &mut dyn SearchMesh,
        assembly: &mut dyn Assembly,
    ) -> Result<(), SearchError> {
        for &slave in self.slave_to_synthetic.keys() {
            self.update_quadrature_nodes(mesh, assembly, slave)?;
        }
        Ok(())
    }

    /// Re-run generation for every recorded mapping. Clears nothing; slaves
    /// still in the generated registry are skipped.
    pub fn reinit_quadrature_nodes(
        &mut self,
        mesh: &mut dyn SearchMesh,
        assembly: &mut dyn Assembly,
    ) -> Result<(), SearchError> {
        self.generate_all_quadrature_nodes(mesh, assembly)
    }

    // ── Mortar nodes ───────────────────────────────────────────────

    fn mortar_elems(
        mesh: &dyn SearchMesh,
        assembly: &dyn Assembly,
        view: &MortarView,
    ) -> Result<Vec<ElemId>, SearchError> {
        let iface = mesh
            .mortar_interface(view.interface.master, view.interface.slave)
            .ok_or(SearchError::MissingMortarInterface {
                master: view.interface.master,
                slave: view.interface.slave,
            })?;
        Ok(iface
            .elems
            .iter()
            .copied()
            .filter(|&e| owned(mesh, e, assembly))
            .collect())
    }

    /// Create the mortar nodes of the view recorded under `key`. A no-op
    /// once the view is generated.
    pub fn generate_mortar_nodes(
        &mut self,
        mesh: &mut dyn SearchMesh,
        assembly: &mut dyn Assembly,
        key: BoundaryPairKey,
    ) -> Result<(), SearchError> {
        let Some(view) = self.mortar_views.get(&key).copied() else {
            return Ok(());
        };
        if self.mortar_boundary_pairs_generated.contains(&key) {
            return Ok(());
        }
        let elems = Self::mortar_elems(mesh, assembly, &view)?;
        self.mortar_boundary_pairs_generated.insert(key);
        let mut count = 0usize;
        for &elem in &elems {
            assembly.reinit_elem(mesh, elem)?;
            for (qp, &p) in assembly.q_points().iter().enumerate() {
                let node_key = QuadratureNodeKey {
                    elem,
                    side: 0,
                    qp: qp as u16,
                    boundary: view.synthetic,
                };
                mesh.add_quadrature_node(node_key, p);
                count += 1;
            }
        }
        debug!(
            interface = %view.interface,
            side = %view.side,
            synthetic = %view.synthetic,
            count,
            "mortar nodes generated"
        );
        Ok(())
    }

    /// Move the nodes of every generated mortar view.
    pub fn update_mortar_nodes(
        &self,
        mesh: &mut dyn SearchMesh,
        assembly: &mut dyn Assembly,
    ) -> Result<(), SearchError> {
        for key in &self.mortar_boundary_pairs_generated {
            let Some(view) = self.mortar_views.get(key) else {
                continue;
            };
            for elem in Self::mortar_elems(mesh, assembly, view)? {
                assembly.reinit_elem(mesh, elem)?;
                for (qp, &p) in assembly.q_points().iter().enumerate() {
                    let node_key = QuadratureNodeKey {
                        elem,
                        side: 0,
                        qp: qp as u16,
                        boundary: view.synthetic,
                    };
                    let node = mesh
                        .quadrature_node(&node_key)
                        .ok_or(SearchError::MissingQuadratureNode { key: node_key })?;
                    mesh.set_node_position(node, p)?;
                }
            }
        }
        Ok(())
    }

    /// Clear the mortar registry and regenerate every recorded view.
    pub fn reinit_mortar_nodes(
        &mut self,
        mesh: &mut dyn SearchMesh,
        assembly: &mut dyn Assembly,
    ) -> Result<(), SearchError> {
        self.mortar_boundary_pairs_generated.clear();
        let keys: Vec<BoundaryPairKey> = self.mortar_views.keys().copied().collect();
        for key in keys {
            self.generate_mortar_nodes(mesh, assembly, key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seam_core::{ElemType, Order, Point, ProcessorId};
    use seam_mesh::{FeAssembly, Mesh, MeshBuilder};

    const SLAVE: BoundaryId = BoundaryId(2);
    const SYNTH: BoundaryId = BoundaryId(1_000_002);

    /// Three quads whose bottom sides form "slave"; the last one is remote.
    fn strip() -> Mesh {
        let mut b = MeshBuilder::new();
        let g = b.add_quad_grid(Point::origin(), 3, 1, 1.0, 1.0, |i, _| {
            ProcessorId(u32::from(i == 2))
        });
        b.add_boundary("slave", SLAVE).unwrap();
        for (e, s) in g.bottom_sides() {
            b.add_side("slave", e, s).unwrap();
        }
        b.build()
    }

    #[test]
    fn generation_covers_owned_sides_once() {
        let mut mesh = strip();
        let mut fe = FeAssembly::new(ProcessorId(0), Order::Second);
        let mut mgr = QuadratureNodeManager::new();
        mgr.record_quadrature(SLAVE, SYNTH);

        mgr.generate_quadrature_nodes(&mut mesh, &mut fe, SLAVE, SYNTH).unwrap();
        assert_eq!(mesh.quadrature_nodes_on(SYNTH).len(), 4);
        assert!(mgr.quadrature_boundaries_generated().contains(&SLAVE));

        // Registered: second call is a no-op even after the nodes vanish.
        mesh.clear_quadrature_nodes();
        mgr.generate_quadrature_nodes(&mut mesh, &mut fe, SLAVE, SYNTH).unwrap();
        assert_eq!(mesh.quadrature_node_count(), 0);

        mgr.clear_quadrature_registry();
        mgr.reinit_quadrature_nodes(&mut mesh, &mut fe).unwrap();
        assert_eq!(mesh.quadrature_nodes_on(SYNTH).len(), 4);
    }

    #[test]
    fn remote_process_generates_its_own_share() {
        let mut mesh = strip();
        let mut fe = FeAssembly::new(ProcessorId(1), Order::Second);
        let mut mgr = QuadratureNodeManager::new();
        mgr.generate_quadrature_nodes(&mut mesh, &mut fe, SLAVE, SYNTH).unwrap();
        let nodes = mesh.quadrature_nodes_on(SYNTH);
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|(k, _)| k.elem == ElemId(2)));
    }

    #[test]
    fn update_moves_without_creating() {
        let mut mesh = strip();
        let mut fe = FeAssembly::new(ProcessorId(0), Order::First);
        let mut mgr = QuadratureNodeManager::new();
        mgr.record_quadrature(SLAVE, SYNTH);
        mgr.generate_all_quadrature_nodes(&mut mesh, &mut fe).unwrap();
        let before = mesh.quadrature_nodes_on(SYNTH);

        mesh.displace(|_, _| seam_core::Vector::new(0.0, 0.5, 0.0));
        mgr.update_all_quadrature_nodes(&mut mesh, &mut fe).unwrap();
        let after = mesh.quadrature_nodes_on(SYNTH);
        assert_eq!(before, after);
        for (_, node) in after {
            assert!((mesh.node_position(node).unwrap().y - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn update_without_generation_is_an_error() {
        let mut mesh = strip();
        let mut fe = FeAssembly::new(ProcessorId(0), Order::First);
        let mut mgr = QuadratureNodeManager::new();
        mgr.record_quadrature(SLAVE, SYNTH);
        assert!(matches!(
            mgr.update_quadrature_nodes(&mut mesh, &mut fe, SLAVE),
            Err(SearchError::MissingQuadratureNode { .. })
        ));
    }

    #[test]
    fn mortar_view_generation_and_reinit() {
        let mut b = MeshBuilder::new();
        let g = b.add_quad_grid(Point::origin(), 2, 1, 1.0, 1.0, |_, _| ProcessorId(0));
        b.add_boundary("m", BoundaryId(1)).unwrap();
        b.add_boundary("s", BoundaryId(2)).unwrap();
        let e = b
            .add_elem(ElemType::Edge2, &[g.node(0, 1), g.node(2, 1)], ProcessorId(0))
            .unwrap();
        b.add_mortar_interface("m", "s", &[e]).unwrap();
        let mut mesh = b.build();
        let mut fe = FeAssembly::new(ProcessorId(0), Order::Third);

        let mut mgr = QuadratureNodeManager::new();
        let view = MortarView {
            interface: BoundaryPairKey::new(BoundaryId(1), BoundaryId(2)),
            side: ConstraintSide::Master,
            synthetic: BoundaryId(2_000_002),
        };
        let key = BoundaryPairKey::new(BoundaryId(1), BoundaryId(2_000_002));
        mgr.record_mortar_view(key, BoundaryId(2), view).unwrap();
        mgr.generate_mortar_nodes(&mut mesh, &mut fe, key).unwrap();
        assert_eq!(mesh.quadrature_nodes_on(BoundaryId(2_000_002)).len(), 2);
        assert_eq!(mgr.boundary_to_mortar().get(&BoundaryId(2)), Some(&BoundaryId(2_000_002)));

        mesh.clear_quadrature_nodes();
        mgr.reinit_mortar_nodes(&mut mesh, &mut fe).unwrap();
        assert_eq!(mesh.quadrature_nodes_on(BoundaryId(2_000_002)).len(), 2);
        mgr.update_mortar_nodes(&mut mesh, &mut fe).unwrap();
    }

    #[test]
    fn missing_interface_is_reported() {
        let mut mesh = strip();
        let mut fe = FeAssembly::new(ProcessorId(0), Order::First);
        let mut mgr = QuadratureNodeManager::new();
        let view = MortarView {
            interface: BoundaryPairKey::new(BoundaryId(1), BoundaryId(2)),
            side: ConstraintSide::Slave,
            synthetic: BoundaryId(2_000_001),
        };
        let key = BoundaryPairKey::new(BoundaryId(2), BoundaryId(2_000_001));
        mgr.record_mortar_view(key, BoundaryId(1), view).unwrap();
        assert_eq!(
            mgr.generate_mortar_nodes(&mut mesh, &mut fe, key),
            Err(SearchError::MissingMortarInterface {
                master: BoundaryId(1),
                slave: BoundaryId(2)
            })
        );
    }

    #[test]
    fn colliding_views_are_rejected() {
        let mut mgr = QuadratureNodeManager::new();
        let key = BoundaryPairKey::new(BoundaryId(1), BoundaryId(2_000_002));
        let forward = MortarView {
            interface: BoundaryPairKey::new(BoundaryId(1), BoundaryId(2)),
            side: ConstraintSide::Master,
            synthetic: BoundaryId(2_000_002),
        };
        let backward = MortarView {
            interface: BoundaryPairKey::new(BoundaryId(2), BoundaryId(1)),
            side: ConstraintSide::Slave,
            synthetic: BoundaryId(2_000_002),
        };
        mgr.record_mortar_view(key, BoundaryId(2), forward).unwrap();
        mgr.record_mortar_view(key, BoundaryId(2), forward).unwrap();
        assert_eq!(
            mgr.record_mortar_view(key, BoundaryId(2), backward),
            Err(SearchError::MortarViewConflict {
                key,
                existing: forward.interface,
                requested: backward.interface,
            })
        );
        assert_eq!(mgr.mortar_views().get(&key), Some(&forward));
    }
}
