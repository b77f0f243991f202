//! Service traits for the collaborators the search engine drives but does
//! not own: the mesh (topology, positions, ghosting, quadrature-node
//! storage) and the assembly (quadrature point evaluation).

use smallvec::SmallVec;

use crate::elem::ElemType;
use crate::error::SearchError;
use crate::id::{BoundaryId, ElemId, NodeId, ProcessorId, QuadratureNodeKey};
use crate::Point;

/// Node list of one element side. Sides of first-order 2D elements have at
/// most two nodes, so this never spills.
pub type SideNodes = SmallVec<[NodeId; 4]>;

/// One element side tagged with a boundary id.
///
/// An element side on several boundaries appears once per boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundaryElement {
    /// The element owning the side.
    pub elem: ElemId,
    /// Local side index.
    pub side: u16,
    /// Boundary the side belongs to.
    pub boundary: BoundaryId,
}

/// A mortar interface: a master/slave boundary pair plus the lower
/// dimensional coupling elements spanning it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MortarInterface {
    /// Master boundary name.
    pub master: String,
    /// Slave boundary name.
    pub slave: String,
    /// Resolved master boundary id.
    pub master_id: BoundaryId,
    /// Resolved slave boundary id.
    pub slave_id: BoundaryId,
    /// Coupling elements integrated with the volumetric rule.
    pub elems: Vec<ElemId>,
}

/// Mesh service consumed by the search engine.
///
/// Implementations hold the local partition plus whatever ghost copies
/// were requested through [`add_ghosted_boundary`](Self::add_ghosted_boundary)
/// and [`add_ghosted_elem`](Self::add_ghosted_elem). Honoring those
/// requests before the next search is the implementation's job; the engine
/// cannot verify it.
///
/// Synthetic quadrature nodes are real mesh nodes: they get a [`NodeId`],
/// a position, and are reported by [`boundary_nodes`](Self::boundary_nodes)
/// under the synthetic boundary id they were tagged with.
pub trait SearchMesh {
    /// Resolve a boundary name to its id.
    fn boundary_id(&self, name: &str) -> Result<BoundaryId, SearchError>;

    /// Every boundary-tagged element side known on this process, in a
    /// deterministic order.
    fn boundary_elements(&self) -> &[BoundaryElement];

    /// Nodes on `boundary` present on this process, in a deterministic order.
    fn boundary_nodes(&self, boundary: BoundaryId) -> Vec<NodeId>;

    /// Current position of a node.
    fn node_position(&self, node: NodeId) -> Option<Point>;

    /// Elements attached to a node.
    fn node_elements(&self, node: NodeId) -> &[ElemId];

    /// Shape of an element.
    fn elem_type(&self, elem: ElemId) -> Option<ElemType>;

    /// Nodes of an element in local order.
    fn elem_nodes(&self, elem: ElemId) -> Option<&[NodeId]>;

    /// Processor owning an element.
    fn elem_processor(&self, elem: ElemId) -> Option<ProcessorId>;

    /// Mortar interfaces defined on the mesh.
    fn mortar_interfaces(&self) -> &[MortarInterface];

    /// Ask the partitioner to ghost every element touching `boundary`.
    ///
    /// Idempotent at the service.
    fn add_ghosted_boundary(&mut self, boundary: BoundaryId);

    /// Ask the partitioner to ghost a single element.
    fn add_ghosted_elem(&mut self, elem: ElemId);

    /// Create the quadrature node `key` at `position`, or move it there if
    /// it already exists. Returns its node id.
    fn add_quadrature_node(&mut self, key: QuadratureNodeKey, position: Point) -> NodeId;

    /// Node id of an existing quadrature node.
    fn quadrature_node(&self, key: &QuadratureNodeKey) -> Option<NodeId>;

    /// Move a node.
    fn set_node_position(&mut self, node: NodeId, position: Point) -> Result<(), SearchError>;

    /// Drop every quadrature node.
    fn clear_quadrature_nodes(&mut self);

    /// Nodes of side `side` of `elem`.
    fn side_nodes(&self, elem: ElemId, side: u16) -> Result<SideNodes, SearchError> {
        let ty = self
            .elem_type(elem)
            .ok_or(SearchError::UnknownElement { elem })?;
        let nodes = self
            .elem_nodes(elem)
            .ok_or(SearchError::UnknownElement { elem })?;
        let local = ty
            .side_local_nodes(side)
            .ok_or(SearchError::InvalidSide { elem, side })?;
        Ok(local.iter().map(|&i| nodes[i]).collect())
    }

    /// Arithmetic mean of an element's node positions.
    fn elem_centroid(&self, elem: ElemId) -> Result<Point, SearchError> {
        let nodes = self
            .elem_nodes(elem)
            .ok_or(SearchError::UnknownElement { elem })?;
        let mut sum = crate::Vector::zeros();
        for &node in nodes {
            let p = self
                .node_position(node)
                .ok_or(SearchError::UnknownNode { node })?;
            sum += p.coords;
        }
        Ok(Point::from(sum / nodes.len().max(1) as f64))
    }

    /// The mortar interface between two boundaries, if defined.
    fn mortar_interface(&self, master: BoundaryId, slave: BoundaryId) -> Option<&MortarInterface> {
        self.mortar_interfaces()
            .iter()
            .find(|iface| iface.master_id == master && iface.slave_id == slave)
    }
}

/// Assembly service consumed by the search engine.
///
/// Mirrors the element-by-element preparation of a finite-element
/// assembly: `reinit_*` evaluates the active quadrature rule on one
/// element (side) and the matching accessor exposes the physical
/// quadrature points until the next `reinit_*`.
pub trait Assembly {
    /// Rank of this process.
    fn processor_id(&self) -> ProcessorId;

    /// Evaluate the face quadrature rule on side `side` of `elem`.
    fn reinit_elem_face(
        &mut self,
        mesh: &dyn SearchMesh,
        elem: ElemId,
        side: u16,
    ) -> Result<(), SearchError>;

    /// Physical face quadrature points from the last
    /// [`reinit_elem_face`](Self::reinit_elem_face).
    fn q_points_face(&self) -> &[Point];

    /// Evaluate the volumetric quadrature rule on `elem`.
    fn reinit_elem(&mut self, mesh: &dyn SearchMesh, elem: ElemId) -> Result<(), SearchError>;

    /// Physical quadrature points from the last [`reinit_elem`](Self::reinit_elem).
    fn q_points(&self) -> &[Point];
}
