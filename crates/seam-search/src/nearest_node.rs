//! Nearest-node search between a master and a slave boundary.
//!
//! Each slave node gets a *patch*: the `patch_size` master nodes closest to
//! it when the patch was built. Steady-state searches scan only the patch,
//! so they stay cheap as the mesh deforms. Patches are built with a k-d
//! tree after construction and after every
//! [`reinit`](NearestNodeLocator::reinit).
//!
//! The patch bounds the work, not the answer. Every master node outside a
//! patch was at least the patch radius away from the slave node when the
//! patch was built. A patch answer is accepted only while it stays within
//! that radius, less how far the slave node and any master node have moved
//! since. Otherwise all patches are rebuilt from current positions and the
//! search is repeated.

use indexmap::{IndexMap, IndexSet};
use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Rotation3;
use seam_core::{BoundaryId, BoundaryPairKey, ElemId, NodeId, Point, ProcessorId, SearchError, SearchMesh};
use tracing::{debug, warn};

/// Nearest master node found for one slave node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearestNodeInfo {
    /// The closest master node.
    pub nearest: NodeId,
    /// Euclidean distance between the slave node and `nearest`.
    pub distance: f64,
}

#[derive(Debug)]
struct Patch {
    /// Candidates, closest first at build time.
    nodes: Vec<NodeId>,
    /// Slave position at build time.
    origin: Point,
    /// Distance from `origin` to the farthest candidate at build time.
    radius: f64,
}

/// Per-slave-node nearest master node, searched within a bounded patch.
#[derive(Debug)]
pub struct NearestNodeLocator {
    key: BoundaryPairKey,
    patch_size: usize,
    slave_nodes: Vec<NodeId>,
    masters: Vec<NodeId>,
    /// Master positions when the patches were built, parallel to `masters`.
    master_snapshot: Vec<Point>,
    patches: IndexMap<NodeId, Patch>,
    nearest: IndexMap<NodeId, NearestNodeInfo>,
    max_patch_percentage: f64,
    needs_rebuild: bool,
}

/// The k-d tree is built in this frame. Axis-aligned planar boundaries put
/// every node on the same coordinate, which overflows kiddo's buckets.
fn search_frame() -> Rotation3<f64> {
    Rotation3::from_euler_angles(0.3, 0.7, 1.1)
}

fn position(mesh: &dyn SearchMesh, node: NodeId) -> Result<Point, SearchError> {
    mesh.node_position(node)
        .ok_or(SearchError::UnknownNode { node })
}

/// `(rank, node, distance)` of the candidate closest to `p`. Ties keep the
/// earlier rank.
fn closest_in(
    mesh: &dyn SearchMesh,
    candidates: &[NodeId],
    p: &Point,
) -> Result<Option<(usize, NodeId, f64)>, SearchError> {
    let mut best: Option<(usize, NodeId, f64)> = None;
    for (rank, &master) in candidates.iter().enumerate() {
        let d = (position(mesh, master)? - p).norm();
        if best.map_or(true, |(_, _, bd)| d < bd) {
            best = Some((rank, master, d));
        }
    }
    Ok(best)
}

impl NearestNodeLocator {
    /// A locator for `key` that keeps `patch_size` candidates per slave node.
    ///
    /// Nothing is searched until [`find_nodes`](Self::find_nodes).
    pub fn new(key: BoundaryPairKey, patch_size: usize) -> Self {
        Self {
            key,
            patch_size,
            slave_nodes: Vec::new(),
            masters: Vec::new(),
            master_snapshot: Vec::new(),
            patches: IndexMap::new(),
            nearest: IndexMap::new(),
            max_patch_percentage: 0.0,
            needs_rebuild: true,
        }
    }

    /// The (master, slave) pair searched.
    pub fn key(&self) -> BoundaryPairKey {
        self.key
    }

    /// Master boundary.
    pub fn master(&self) -> BoundaryId {
        self.key.master
    }

    /// Slave boundary.
    pub fn slave(&self) -> BoundaryId {
        self.key.slave
    }

    /// Whether the next [`find_nodes`](Self::find_nodes) rebuilds patches.
    pub fn needs_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    /// Recompute the nearest master node of every slave node from current
    /// positions, rebuilding patches first if they were invalidated.
    ///
    /// Motion too large for the patches triggers a rebuild, so the answer
    /// never depends on `patch_size`.
    /// [`max_patch_percentage`](Self::max_patch_percentage) reports the
    /// drift seen before any such rebuild.
    pub fn find_nodes(&mut self, mesh: &dyn SearchMesh) -> Result<(), SearchError> {
        if self.needs_rebuild {
            self.rebuild_patches(mesh)?;
        }
        let (drift, stale) = self.search_patches(mesh)?;
        if stale {
            debug!(key = %self.key, "slave nodes outran their patches");
            self.rebuild_patches(mesh)?;
            self.search_patches(mesh)?;
        }
        self.max_patch_percentage = drift;
        debug!(key = %self.key, found = self.nearest.len(), "nearest nodes updated");
        Ok(())
    }

    /// Fill `nearest` from the current patches. Returns the worst patch
    /// percentage and whether any answer could not be trusted.
    fn search_patches(&mut self, mesh: &dyn SearchMesh) -> Result<(f64, bool), SearchError> {
        let mut master_motion = 0.0f64;
        for (&node, snap) in self.masters.iter().zip(&self.master_snapshot) {
            master_motion = master_motion.max((position(mesh, node)? - snap).norm());
        }

        self.nearest.clear();
        let mut worst = 0.0f64;
        let mut stale = false;
        for &slave in &self.slave_nodes {
            let Some(patch) = self.patches.get(&slave).filter(|p| !p.nodes.is_empty()) else {
                warn!(node = %slave, key = %self.key, "slave node has no master candidates");
                continue;
            };
            let p = position(mesh, slave)?;
            let Some((rank, nearest, distance)) = closest_in(mesh, &patch.nodes, &p)? else {
                continue;
            };
            worst = worst.max(100.0 * (rank + 1) as f64 / patch.nodes.len() as f64);

            let complete = patch.nodes.len() == self.masters.len();
            let slack = patch.radius - master_motion - (p - patch.origin).norm();
            if !complete && distance > slack {
                stale = true;
            }
            self.nearest.insert(slave, NearestNodeInfo { nearest, distance });
        }
        Ok((worst, stale))
    }

    fn rebuild_patches(&mut self, mesh: &dyn SearchMesh) -> Result<(), SearchError> {
        self.slave_nodes = mesh.boundary_nodes(self.key.slave);
        self.masters = mesh.boundary_nodes(self.key.master);
        self.master_snapshot = self
            .masters
            .iter()
            .map(|&n| position(mesh, n))
            .collect::<Result<_, _>>()?;
        self.patches.clear();
        self.needs_rebuild = false;

        if self.masters.is_empty() {
            warn!(master = %self.key.master, "master boundary has no nodes on this process");
            return Ok(());
        }

        let frame = search_frame();
        let mut tree: KdTree<f64, 3> = KdTree::new();
        for (i, p) in self.master_snapshot.iter().enumerate() {
            let q = frame * p;
            tree.add(&[q.x, q.y, q.z], i as u64);
        }

        let n = self.patch_size.min(self.masters.len());
        for &slave in &self.slave_nodes {
            let origin = position(mesh, slave)?;
            let q = frame * origin;
            let hits = tree.nearest_n::<SquaredEuclidean>(&[q.x, q.y, q.z], n);
            let radius = hits.iter().map(|h| h.distance).fold(0.0, f64::max).sqrt();
            let nodes = hits.iter().map(|h| self.masters[h.item as usize]).collect();
            self.patches.insert(slave, Patch { nodes, origin, radius });
        }
        debug!(
            key = %self.key,
            slaves = self.slave_nodes.len(),
            masters = self.masters.len(),
            patch = n,
            "patches rebuilt"
        );
        Ok(())
    }

    /// Drop all results and force a patch rebuild on the next search.
    pub fn reinit(&mut self) {
        self.needs_rebuild = true;
        self.slave_nodes.clear();
        self.masters.clear();
        self.master_snapshot.clear();
        self.patches.clear();
        self.nearest.clear();
        self.max_patch_percentage = 0.0;
    }

    /// Nearest master node of `slave`, if one was found.
    pub fn nearest_node(&self, slave: NodeId) -> Option<&NearestNodeInfo> {
        self.nearest.get(&slave)
    }

    /// All results in slave-node order.
    pub fn nearest_nodes(&self) -> impl Iterator<Item = (NodeId, &NearestNodeInfo)> {
        self.nearest.iter().map(|(n, info)| (*n, info))
    }

    /// Slave nodes covered by the current patches.
    pub fn slave_nodes(&self) -> &[NodeId] {
        &self.slave_nodes
    }

    /// Candidate master nodes of `slave`, closest first at build time.
    pub fn patch(&self, slave: NodeId) -> Option<&[NodeId]> {
        self.patches.get(&slave).map(|p| p.nodes.as_slice())
    }

    /// Worst relative rank of a nearest node within its patch, in percent.
    ///
    /// Values near 100 mean nearest nodes are drifting to the patch edge
    /// and a larger patch (or a reinit) is due.
    pub fn max_patch_percentage(&self) -> f64 {
        self.max_patch_percentage
    }

    /// Request ghosting of every off-process element touching a patch node.
    pub fn update_ghosted_elems(&self, mesh: &mut dyn SearchMesh, processor: ProcessorId) {
        let mut wanted: IndexSet<ElemId> = IndexSet::new();
        let patch_nodes: IndexSet<NodeId> = self.patches.values().flat_map(|p| p.nodes.iter().copied()).collect();
        for node in patch_nodes {
            for &elem in mesh.node_elements(node) {
                if mesh.elem_processor(elem) != Some(processor) {
                    wanted.insert(elem);
                }
            }
        }
        for elem in wanted {
            mesh.add_ghosted_elem(elem);
        }
    }
}
