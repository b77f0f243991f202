//! Penetration and gap measurement against a master surface.
//!
//! A [`PenetrationLocator`] turns the nearest-node results of its
//! [`NearestNodeLocator`] into a closest point, outward normal and signed
//! distance per slave node by projecting onto the master sides that touch
//! the nearest master node.

use indexmap::IndexMap;
use seam_core::{
    BoundaryPairKey, ElemId, NodeId, Order, Point, SearchError, SearchMesh, Vector,
};
use smallvec::SmallVec;
use tracing::debug;

use crate::nearest_node::NearestNodeLocator;

/// Geometric relation between one slave node and the master surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PenetrationInfo {
    /// Master element owning the closest side.
    pub master_elem: ElemId,
    /// Local index of the closest side.
    pub side: u16,
    /// Nearest master node the projection started from.
    pub nearest_node: NodeId,
    /// Closest point on the master side.
    pub closest_point: Point,
    /// Unit normal of the master side, pointing out of the master body.
    pub normal: Vector,
    /// Signed normal distance. Positive when the slave node lies inside
    /// the master body.
    pub distance: f64,
    /// Whether the projection landed on the side, within the tangential
    /// tolerance.
    pub on_face: bool,
}

impl PenetrationInfo {
    /// Whether the slave node has crossed the master surface.
    pub fn is_penetrating(&self) -> bool {
        self.distance > 0.0
    }

    /// Normal gap; the negated signed distance.
    pub fn gap(&self) -> f64 {
        -self.distance
    }
}

type SideRef = (ElemId, u16);

/// Per-slave-node penetration results for one (master, slave) pair.
#[derive(Debug)]
pub struct PenetrationLocator {
    key: BoundaryPairKey,
    order: Order,
    tangential_tolerance: f64,
    node_sides: Option<IndexMap<NodeId, SmallVec<[SideRef; 4]>>>,
    results: IndexMap<NodeId, PenetrationInfo>,
}

impl PenetrationLocator {
    /// A locator reading the nearest-node locator with the same `key`.
    pub fn new(key: BoundaryPairKey, order: Order, tangential_tolerance: f64) -> Self {
        Self {
            key,
            order,
            tangential_tolerance,
            node_sides: None,
            results: IndexMap::new(),
        }
    }

    /// The (master, slave) pair measured.
    pub fn key(&self) -> BoundaryPairKey {
        self.key
    }

    /// Key of the nearest-node locator this one reads.
    pub fn nearest_node_key(&self) -> BoundaryPairKey {
        self.key
    }

    /// Quadrature order requested when the locator was created.
    pub fn order(&self) -> Order {
        self.order
    }

    /// Recompute every slave node's result from `nearest`.
    ///
    /// `nearest` must have run [`find_nodes`](NearestNodeLocator::find_nodes)
    /// for the current step.
    pub fn detect_penetration(
        &mut self,
        mesh: &dyn SearchMesh,
        nearest: &NearestNodeLocator,
    ) -> Result<(), SearchError> {
        if self.node_sides.is_none() {
            self.node_sides = Some(self.collect_master_sides(mesh)?);
        }
        let Some(node_sides) = self.node_sides.as_ref() else {
            return Ok(());
        };

        self.results.clear();
        for (slave, info) in nearest.nearest_nodes() {
            let Some(sides) = node_sides.get(&info.nearest) else {
                continue;
            };
            let p = mesh
                .node_position(slave)
                .ok_or(SearchError::UnknownNode { node: slave })?;

            let mut best: Option<(PenetrationInfo, f64)> = None;
            for &(elem, side) in sides {
                let candidate = project(mesh, p, elem, side, self.tangential_tolerance)?;
                let reach = (candidate.closest_point - p).norm();
                let better = match &best {
                    None => true,
                    Some((b, d)) => {
                        (candidate.on_face && !b.on_face)
                            || (candidate.on_face == b.on_face && reach < *d)
                    }
                };
                if better {
                    best = Some((candidate, reach));
                }
            }
            if let Some((mut result, _)) = best {
                result.nearest_node = info.nearest;
                self.results.insert(slave, result);
            }
        }
        debug!(key = %self.key, contacts = self.results.len(), "penetration detected");
        Ok(())
    }

    fn collect_master_sides(
        &self,
        mesh: &dyn SearchMesh,
    ) -> Result<IndexMap<NodeId, SmallVec<[SideRef; 4]>>, SearchError> {
        let mut map: IndexMap<NodeId, SmallVec<[SideRef; 4]>> = IndexMap::new();
        for belem in mesh
            .boundary_elements()
            .iter()
            .filter(|b| b.boundary == self.key.master)
        {
            for node in mesh.side_nodes(belem.elem, belem.side)? {
                map.entry(node).or_default().push((belem.elem, belem.side));
            }
        }
        Ok(map)
    }

    /// Drop results and the cached master-side map.
    pub fn reinit(&mut self) {
        self.node_sides = None;
        self.results.clear();
    }

    /// Result for `slave`, if it has a nearest node with a master side.
    pub fn penetration(&self, slave: NodeId) -> Option<&PenetrationInfo> {
        self.results.get(&slave)
    }

    /// All results in slave-node order.
    pub fn results(&self) -> impl Iterator<Item = (NodeId, &PenetrationInfo)> {
        self.results.iter().map(|(n, info)| (*n, info))
    }

    /// Number of slave nodes with a result.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether no slave node has a result.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Project `p` onto side `side` of `elem`.
fn project(
    mesh: &dyn SearchMesh,
    p: Point,
    elem: ElemId,
    side: u16,
    tolerance: f64,
) -> Result<PenetrationInfo, SearchError> {
    let nodes = mesh.side_nodes(elem, side)?;
    let pos = |node: NodeId| {
        mesh.node_position(node)
            .ok_or(SearchError::UnknownNode { node })
    };
    let centroid = mesh.elem_centroid(elem)?;

    let (closest, normal, on_face) = match nodes.as_slice() {
        [a] => {
            let a = pos(*a)?;
            let normal = (a - centroid).try_normalize(f64::EPSILON).unwrap_or_else(Vector::zeros);
            (a, normal, true)
        }
        [a, b] => {
            let (a, b) = (pos(*a)?, pos(*b)?);
            let t = b - a;
            let len2 = t.norm_squared();
            let s = if len2 > 0.0 { (p - a).dot(&t) / len2 } else { 0.0 };
            let closest = a + t * s.clamp(0.0, 1.0);
            let out = Point::from((a.coords + b.coords) * 0.5) - centroid;
            let n = if len2 > 0.0 { out - t * (out.dot(&t) / len2) } else { out };
            let normal = n.try_normalize(f64::EPSILON).unwrap_or_else(Vector::zeros);
            (closest, normal, s >= -tolerance && s <= 1.0 + tolerance)
        }
        _ => {
            return Err(SearchError::UnsupportedSide {
                elem,
                side,
                nodes: nodes.len(),
            })
        }
    };

    Ok(PenetrationInfo {
        master_elem: elem,
        side,
        nearest_node: nodes[0],
        closest_point: closest,
        normal,
        distance: (closest - p).dot(&normal),
        on_face,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use seam_core::{BoundaryId, ProcessorId};
    use seam_mesh::{Mesh, MeshBuilder};

    /// Master: 2x1 unit quads with the top at y = 1. Slave: 1x1 quad whose
    /// bottom sits at `y = 1 + lift`, centered over the middle master node.
    fn pair(lift: f64) -> Mesh {
        let mut b = MeshBuilder::new();
        let m = b.add_quad_grid(Point::origin(), 2, 1, 1.0, 1.0, |_, _| ProcessorId(0));
        let s = b.add_quad_grid(Point::new(0.3, 1.0 + lift, 0.0), 1, 1, 1.4, 1.0, |_, _| {
            ProcessorId(0)
        });
        b.add_boundary("master", BoundaryId(1)).unwrap();
        b.add_boundary("slave", BoundaryId(2)).unwrap();
        for (e, side) in m.top_sides() {
            b.add_side("master", e, side).unwrap();
        }
        for (e, side) in s.bottom_sides() {
            b.add_side("slave", e, side).unwrap();
        }
        b.build()
    }

    fn run(mesh: &Mesh, tol: f64) -> PenetrationLocator {
        let key = BoundaryPairKey::new(BoundaryId(1), BoundaryId(2));
        let mut nnl = NearestNodeLocator::new(key, 4);
        nnl.find_nodes(mesh).unwrap();
        let mut pl = PenetrationLocator::new(key, Order::First, tol);
        pl.detect_penetration(mesh, &nnl).unwrap();
        pl
    }

    #[test]
    fn gap_is_negative_distance() {
        let mesh = pair(0.2);
        let pl = run(&mesh, 0.0);
        assert_eq!(pl.len(), 2);
        for (_, info) in pl.results() {
            assert_relative_eq!(info.normal, Vector::new(0.0, 1.0, 0.0), epsilon = 1e-12);
            assert_relative_eq!(info.distance, -0.2, epsilon = 1e-12);
            assert_relative_eq!(info.gap(), 0.2, epsilon = 1e-12);
            assert!(!info.is_penetrating());
            assert!(info.on_face);
        }
    }

    #[test]
    fn overlap_is_positive_distance() {
        let mesh = pair(-0.1);
        let pl = run(&mesh, 0.0);
        for (slave, info) in pl.results() {
            assert!(info.is_penetrating());
            assert_relative_eq!(info.distance, 0.1, epsilon = 1e-12);
            let p = mesh.node_position(slave).unwrap();
            assert_relative_eq!(info.closest_point.x, p.x, epsilon = 1e-12);
            assert_relative_eq!(info.closest_point.y, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn results_name_the_master_side() {
        let mesh = pair(0.0);
        let pl = run(&mesh, 0.0);
        let left = pl.results().next().unwrap().1;
        // Slave node at x = 0.3 lies over master element 0.
        assert_eq!(left.master_elem, ElemId(0));
        assert_eq!(left.side, 2);
        assert_relative_eq!(left.distance, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn off_face_projection_honors_tolerance() {
        // Slave strip wider than the master: its outer nodes overhang.
        let mut b = MeshBuilder::new();
        let m = b.add_quad_grid(Point::origin(), 1, 1, 1.0, 1.0, |_, _| ProcessorId(0));
        let s = b.add_quad_grid(Point::new(-0.1, 1.5, 0.0), 1, 1, 1.2, 1.0, |_, _| {
            ProcessorId(0)
        });
        b.add_boundary("master", BoundaryId(1)).unwrap();
        b.add_boundary("slave", BoundaryId(2)).unwrap();
        b.add_side("master", m.elem(0, 0), 2).unwrap();
        b.add_side("slave", s.elem(0, 0), 0).unwrap();
        let mesh = b.build();

        let strict = run(&mesh, 0.0);
        assert!(strict.results().all(|(_, i)| !i.on_face));
        let loose = run(&mesh, 0.2);
        assert!(loose.results().all(|(_, i)| i.on_face));
    }

    #[test]
    fn reinit_clears_results() {
        let mesh = pair(0.1);
        let mut pl = run(&mesh, 0.0);
        assert!(!pl.is_empty());
        pl.reinit();
        assert!(pl.is_empty());
        assert_eq!(pl.order(), Order::First);
    }
}
