//! The in-memory [`Mesh`] and its [`SearchMesh`] implementation.

use indexmap::{IndexMap, IndexSet};
use seam_core::{
    BoundaryElement, BoundaryId, ElemId, ElemType, MortarInterface, NodeId, Point,
    ProcessorId, QuadratureNodeKey, SearchError, SearchMesh, Vector,
};
use smallvec::SmallVec;

use crate::element::Element;

#[derive(Clone, Debug)]
struct Node {
    reference: Point,
    position: Point,
}

/// A replicated 2D finite-element mesh with named side sets.
///
/// Every process holds the whole mesh; ownership lives on the elements
/// and drives which parts of a search a process computes. Ghost requests
/// are recorded (see [`ghosted_boundaries`](Self::ghosted_boundaries))
/// but need no action because nothing is ever missing locally.
///
/// Real nodes keep their reference position so a displacement field can
/// be applied with [`displace`](Self::displace). Quadrature nodes are
/// appended after the real nodes and get ids in generation order;
/// [`clear_quadrature_nodes`](SearchMesh::clear_quadrature_nodes) rewinds
/// the id counter so regenerating in the same order reproduces the same ids.
#[derive(Clone, Debug)]
pub struct Mesh {
    nodes: Vec<Node>,
    real_node_count: usize,
    elems: Vec<Element>,
    node_elems: Vec<SmallVec<[ElemId; 4]>>,
    boundary_names: IndexMap<String, BoundaryId>,
    boundary_elements: Vec<BoundaryElement>,
    boundary_nodes: IndexMap<BoundaryId, IndexSet<NodeId>>,
    mortar_interfaces: Vec<MortarInterface>,
    quadrature_nodes: IndexMap<QuadratureNodeKey, NodeId>,
    ghosted_boundaries: IndexSet<BoundaryId>,
    ghosted_elems: IndexSet<ElemId>,
}

impl Mesh {
    pub(crate) fn from_parts(
        positions: Vec<Point>,
        elems: Vec<Element>,
        boundary_names: IndexMap<String, BoundaryId>,
        boundary_elements: Vec<BoundaryElement>,
        mortar_interfaces: Vec<MortarInterface>,
    ) -> Self {
        let mut node_elems: Vec<SmallVec<[ElemId; 4]>> = vec![SmallVec::new(); positions.len()];
        for (i, elem) in elems.iter().enumerate() {
            let id = ElemId(i as u32);
            for node in &elem.nodes {
                node_elems[node.0 as usize].push(id);
            }
        }

        let mut boundary_nodes: IndexMap<BoundaryId, IndexSet<NodeId>> = IndexMap::new();
        for id in boundary_names.values() {
            boundary_nodes.entry(*id).or_default();
        }
        for belem in &boundary_elements {
            let elem = &elems[belem.elem.0 as usize];
            let set = boundary_nodes.entry(belem.boundary).or_default();
            if let Some(local) = elem.kind.side_local_nodes(belem.side) {
                set.extend(local.iter().map(|&i| elem.nodes[i]));
            }
        }

        let nodes: Vec<Node> = positions
            .into_iter()
            .map(|p| Node {
                reference: p,
                position: p,
            })
            .collect();

        Self {
            real_node_count: nodes.len(),
            nodes,
            elems,
            node_elems,
            boundary_names,
            boundary_elements,
            boundary_nodes,
            mortar_interfaces,
            quadrature_nodes: IndexMap::new(),
            ghosted_boundaries: IndexSet::new(),
            ghosted_elems: IndexSet::new(),
        }
    }

    /// Total node count, quadrature nodes included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes that came from the mesh definition.
    pub fn real_node_count(&self) -> usize {
        self.real_node_count
    }

    /// Number of elements.
    pub fn elem_count(&self) -> usize {
        self.elems.len()
    }

    /// Element by id.
    pub fn elem(&self, elem: ElemId) -> Option<&Element> {
        self.elems.get(elem.0 as usize)
    }

    /// Declared boundaries in declaration order.
    pub fn boundaries(&self) -> impl Iterator<Item = (&str, BoundaryId)> + '_ {
        self.boundary_names.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Number of quadrature nodes currently stored.
    pub fn quadrature_node_count(&self) -> usize {
        self.quadrature_nodes.len()
    }

    /// Quadrature nodes tagged with `boundary`, in generation order.
    pub fn quadrature_nodes_on(&self, boundary: BoundaryId) -> Vec<(QuadratureNodeKey, NodeId)> {
        self.quadrature_nodes
            .iter()
            .filter(|(key, _)| key.boundary == boundary)
            .map(|(key, node)| (*key, *node))
            .collect()
    }

    /// Boundaries whose ghosting was requested.
    pub fn ghosted_boundaries(&self) -> &IndexSet<BoundaryId> {
        &self.ghosted_boundaries
    }

    /// Elements whose ghosting was requested.
    pub fn ghosted_elems(&self) -> &IndexSet<ElemId> {
        &self.ghosted_elems
    }

    /// Reference (undeformed) position of a real node.
    pub fn reference_position(&self, node: NodeId) -> Option<Point> {
        if (node.0 as usize) < self.real_node_count {
            Some(self.nodes[node.0 as usize].reference)
        } else {
            None
        }
    }

    /// Move every real node to `reference + displacement(node, reference)`.
    ///
    /// Quadrature nodes are left where they are; the search engine moves
    /// them on its next update.
    pub fn displace(&mut self, mut displacement: impl FnMut(NodeId, &Point) -> Vector) {
        for (i, node) in self.nodes[..self.real_node_count].iter_mut().enumerate() {
            node.position = node.reference + displacement(NodeId(i as u32), &node.reference);
        }
    }
}

impl SearchMesh for Mesh {
    fn boundary_id(&self, name: &str) -> Result<BoundaryId, SearchError> {
        self.boundary_names
            .get(name)
            .copied()
            .ok_or_else(|| SearchError::UnknownBoundary {
                name: name.to_string(),
            })
    }

    fn boundary_elements(&self) -> &[BoundaryElement] {
        &self.boundary_elements
    }

    fn boundary_nodes(&self, boundary: BoundaryId) -> Vec<NodeId> {
        if boundary.is_real() {
            return self
                .boundary_nodes
                .get(&boundary)
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default();
        }
        self.quadrature_nodes
            .iter()
            .filter(|(key, _)| key.boundary == boundary)
            .map(|(_, node)| *node)
            .collect()
    }

    fn node_position(&self, node: NodeId) -> Option<Point> {
        self.nodes.get(node.0 as usize).map(|n| n.position)
    }

    fn node_elements(&self, node: NodeId) -> &[ElemId] {
        self.node_elems
            .get(node.0 as usize)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    fn elem_type(&self, elem: ElemId) -> Option<ElemType> {
        self.elem(elem).map(|e| e.kind)
    }

    fn elem_nodes(&self, elem: ElemId) -> Option<&[NodeId]> {
        self.elem(elem).map(|e| e.nodes.as_slice())
    }

    fn elem_processor(&self, elem: ElemId) -> Option<ProcessorId> {
        self.elem(elem).map(|e| e.processor)
    }

    fn mortar_interfaces(&self) -> &[MortarInterface] {
        &self.mortar_interfaces
    }

    fn add_ghosted_boundary(&mut self, boundary: BoundaryId) {
        self.ghosted_boundaries.insert(boundary);
    }

    fn add_ghosted_elem(&mut self, elem: ElemId) {
        self.ghosted_elems.insert(elem);
    }

    fn add_quadrature_node(&mut self, key: QuadratureNodeKey, position: Point) -> NodeId {
        if let Some(&node) = self.quadrature_nodes.get(&key) {
            self.nodes[node.0 as usize].position = position;
            return node;
        }
        let node = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            reference: position,
            position,
        });
        self.quadrature_nodes.insert(key, node);
        node
    }

    fn quadrature_node(&self, key: &QuadratureNodeKey) -> Option<NodeId> {
        self.quadrature_nodes.get(key).copied()
    }

    fn set_node_position(&mut self, node: NodeId, position: Point) -> Result<(), SearchError> {
        let slot = self
            .nodes
            .get_mut(node.0 as usize)
            .ok_or(SearchError::UnknownNode { node })?;
        slot.position = position;
        Ok(())
    }

    fn clear_quadrature_nodes(&mut self) {
        self.nodes.truncate(self.real_node_count);
        self.quadrature_nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MeshBuilder;
    use approx::assert_relative_eq;

    /// Two unit quads side by side; bottom sides on "bottom" (id 1).
    fn two_quads() -> Mesh {
        let mut b = MeshBuilder::new();
        let grid = b.add_quad_grid(Point::origin(), 2, 1, 1.0, 1.0, |_, _| ProcessorId(0));
        b.add_boundary("bottom", BoundaryId(1)).unwrap();
        for (elem, side) in grid.bottom_sides() {
            b.add_side("bottom", elem, side).unwrap();
        }
        b.build()
    }

    fn key(elem: u32, qp: u16) -> QuadratureNodeKey {
        QuadratureNodeKey {
            elem: ElemId(elem),
            side: 0,
            qp,
            boundary: BoundaryId(1_000_001),
        }
    }

    #[test]
    fn boundary_nodes_follow_sides() {
        let mesh = two_quads();
        assert_eq!(mesh.elem_count(), 2);
        let nodes = mesh.boundary_nodes(BoundaryId(1));
        assert_eq!(nodes.len(), 3);
        for node in nodes {
            assert_relative_eq!(mesh.node_position(node).unwrap().y, 0.0);
        }
        assert!(mesh.boundary_nodes(BoundaryId(9)).is_empty());
    }

    #[test]
    fn unknown_boundary_name_is_an_error() {
        let mesh = two_quads();
        assert_eq!(mesh.boundary_id("bottom").unwrap(), BoundaryId(1));
        assert!(matches!(
            mesh.boundary_id("top"),
            Err(SearchError::UnknownBoundary { .. })
        ));
    }

    #[test]
    fn quadrature_node_is_unique_per_key() {
        let mut mesh = two_quads();
        let a = mesh.add_quadrature_node(key(0, 0), Point::new(0.2, 0.0, 0.0));
        let b = mesh.add_quadrature_node(key(0, 0), Point::new(0.3, 0.0, 0.0));
        assert_eq!(a, b);
        assert_eq!(mesh.quadrature_node_count(), 1);
        assert_relative_eq!(mesh.node_position(a).unwrap().x, 0.3);
        assert_eq!(mesh.boundary_nodes(BoundaryId(1_000_001)), vec![a]);
    }

    #[test]
    fn clear_rewinds_quadrature_ids() {
        let mut mesh = two_quads();
        let real = mesh.node_count();
        let first = mesh.add_quadrature_node(key(0, 0), Point::origin());
        mesh.add_quadrature_node(key(0, 1), Point::origin());
        assert_eq!(first, NodeId(real as u32));

        mesh.clear_quadrature_nodes();
        assert_eq!(mesh.node_count(), real);
        assert!(mesh.quadrature_node(&key(0, 1)).is_none());

        let again = mesh.add_quadrature_node(key(0, 0), Point::origin());
        assert_eq!(again, first);
    }

    #[test]
    fn displace_moves_real_nodes_only() {
        let mut mesh = two_quads();
        let q = mesh.add_quadrature_node(key(0, 0), Point::new(0.5, 0.0, 0.0));
        mesh.displace(|_, _| Vector::new(0.0, -0.1, 0.0));
        assert_relative_eq!(mesh.node_position(NodeId(0)).unwrap().y, -0.1);
        assert_relative_eq!(mesh.reference_position(NodeId(0)).unwrap().y, 0.0);
        assert_relative_eq!(mesh.node_position(q).unwrap().y, 0.0);

        // Displacement is relative to the reference, not cumulative.
        mesh.displace(|_, _| Vector::new(0.0, -0.1, 0.0));
        assert_relative_eq!(mesh.node_position(NodeId(0)).unwrap().y, -0.1);
    }

    #[test]
    fn ghost_requests_are_idempotent() {
        let mut mesh = two_quads();
        mesh.add_ghosted_boundary(BoundaryId(1));
        mesh.add_ghosted_boundary(BoundaryId(1));
        mesh.add_ghosted_elem(ElemId(1));
        assert_eq!(mesh.ghosted_boundaries().len(), 1);
        assert_eq!(mesh.ghosted_elems().len(), 1);
    }

    #[test]
    fn side_nodes_and_centroid_use_defaults() {
        let mesh = two_quads();
        let side = mesh.side_nodes(ElemId(1), 0).unwrap();
        assert_eq!(side.len(), 2);
        assert!(matches!(
            mesh.side_nodes(ElemId(1), 7),
            Err(SearchError::InvalidSide { .. })
        ));
        let c = mesh.elem_centroid(ElemId(1)).unwrap();
        assert_relative_eq!(c.x, 1.5);
        assert_relative_eq!(c.y, 0.5);
        // Node (1, 0) is shared by both quads.
        assert_eq!(mesh.node_elements(NodeId(1)), &[ElemId(0), ElemId(1)]);
    }
}
