//! Incremental mesh construction.

use indexmap::IndexMap;
use seam_core::{
    BoundaryElement, BoundaryId, ElemId, ElemType, MortarInterface, NodeId, Point, ProcessorId,
    MAX_REAL_BOUNDARY_ID,
};
use smallvec::SmallVec;

use crate::element::Element;
use crate::error::MeshError;
use crate::mesh::Mesh;

/// Builds a [`Mesh`] node by node and element by element.
///
/// # Examples
///
/// ```
/// use seam_core::{BoundaryId, ElemType, Point, ProcessorId, SearchMesh};
/// use seam_mesh::MeshBuilder;
///
/// let mut b = MeshBuilder::new();
/// let n0 = b.add_node(Point::new(0.0, 0.0, 0.0));
/// let n1 = b.add_node(Point::new(1.0, 0.0, 0.0));
/// let n2 = b.add_node(Point::new(0.0, 1.0, 0.0));
/// let tri = b.add_elem(ElemType::Tri3, &[n0, n1, n2], ProcessorId(0)).unwrap();
/// b.add_boundary("base", BoundaryId(3)).unwrap();
/// b.add_side("base", tri, 0).unwrap();
///
/// let mesh = b.build();
/// assert_eq!(mesh.boundary_nodes(BoundaryId(3)), vec![n0, n1]);
/// ```
#[derive(Debug, Default)]
pub struct MeshBuilder {
    positions: Vec<Point>,
    elems: Vec<Element>,
    boundary_names: IndexMap<String, BoundaryId>,
    boundary_elements: Vec<BoundaryElement>,
    mortar_interfaces: Vec<MortarInterface>,
}

/// Ids produced by [`MeshBuilder::add_quad_grid`].
///
/// Elements are numbered row by row from the bottom-left corner. Quad
/// sides follow the local convention: 0 bottom, 1 right, 2 top, 3 left.
#[derive(Clone, Debug)]
pub struct QuadGrid {
    nx: usize,
    ny: usize,
    nodes: Vec<NodeId>,
    elems: Vec<ElemId>,
}

impl QuadGrid {
    /// Node at grid column `i`, row `j`.
    pub fn node(&self, i: usize, j: usize) -> NodeId {
        self.nodes[j * (self.nx + 1) + i]
    }

    /// Element at grid column `i`, row `j`.
    pub fn elem(&self, i: usize, j: usize) -> ElemId {
        self.elems[j * self.nx + i]
    }

    /// All elements, row by row.
    pub fn elems(&self) -> &[ElemId] {
        &self.elems
    }

    /// `(elem, side)` pairs along the bottom edge, left to right.
    pub fn bottom_sides(&self) -> Vec<(ElemId, u16)> {
        (0..self.nx).map(|i| (self.elem(i, 0), 0)).collect()
    }

    /// `(elem, side)` pairs along the right edge, bottom to top.
    pub fn right_sides(&self) -> Vec<(ElemId, u16)> {
        (0..self.ny).map(|j| (self.elem(self.nx - 1, j), 1)).collect()
    }

    /// `(elem, side)` pairs along the top edge, left to right.
    pub fn top_sides(&self) -> Vec<(ElemId, u16)> {
        (0..self.nx).map(|i| (self.elem(i, self.ny - 1), 2)).collect()
    }

    /// `(elem, side)` pairs along the left edge, bottom to top.
    pub fn left_sides(&self) -> Vec<(ElemId, u16)> {
        (0..self.ny).map(|j| (self.elem(0, j), 3)).collect()
    }
}

impl MeshBuilder {
    /// Start an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node at `position`.
    pub fn add_node(&mut self, position: Point) -> NodeId {
        self.positions.push(position);
        NodeId((self.positions.len() - 1) as u32)
    }

    /// Add an element owned by `processor`.
    pub fn add_elem(
        &mut self,
        kind: ElemType,
        nodes: &[NodeId],
        processor: ProcessorId,
    ) -> Result<ElemId, MeshError> {
        if nodes.len() != kind.n_nodes() {
            return Err(MeshError::WrongNodeCount {
                kind,
                expected: kind.n_nodes(),
                got: nodes.len(),
            });
        }
        if let Some(&node) = nodes
            .iter()
            .find(|n| n.0 as usize >= self.positions.len())
        {
            return Err(MeshError::UnknownNode { node });
        }
        Ok(self.push_elem(kind, nodes, processor))
    }

    fn push_elem(&mut self, kind: ElemType, nodes: &[NodeId], processor: ProcessorId) -> ElemId {
        self.elems.push(Element {
            kind,
            nodes: SmallVec::from_slice(nodes),
            processor,
        });
        ElemId((self.elems.len() - 1) as u32)
    }

    /// Declare a named boundary. Re-declaring a name with the same id is a no-op.
    pub fn add_boundary(&mut self, name: &str, id: BoundaryId) -> Result<(), MeshError> {
        if id.0 > MAX_REAL_BOUNDARY_ID {
            return Err(MeshError::BoundaryIdOutOfRange { id });
        }
        if let Some(&existing) = self.boundary_names.get(name) {
            if existing == id {
                return Ok(());
            }
            return Err(MeshError::DuplicateBoundary {
                name: name.to_string(),
            });
        }
        if let Some((other, _)) = self.boundary_names.iter().find(|(_, v)| **v == id) {
            return Err(MeshError::BoundaryIdInUse {
                id,
                name: other.clone(),
            });
        }
        self.boundary_names.insert(name.to_string(), id);
        Ok(())
    }

    /// Tag side `side` of `elem` with the boundary `name`.
    pub fn add_side(&mut self, name: &str, elem: ElemId, side: u16) -> Result<(), MeshError> {
        let boundary = self.resolve(name)?;
        let kind = self
            .elems
            .get(elem.0 as usize)
            .map(|e| e.kind)
            .ok_or(MeshError::UnknownElement { elem })?;
        if usize::from(side) >= kind.n_sides() {
            return Err(MeshError::InvalidSide { elem, side });
        }
        let belem = BoundaryElement {
            elem,
            side,
            boundary,
        };
        if !self.boundary_elements.contains(&belem) {
            self.boundary_elements.push(belem);
        }
        Ok(())
    }

    /// Define a mortar interface between two declared boundaries, spanned
    /// by the given line elements.
    pub fn add_mortar_interface(
        &mut self,
        master: &str,
        slave: &str,
        elems: &[ElemId],
    ) -> Result<(), MeshError> {
        let master_id = self.resolve(master)?;
        let slave_id = self.resolve(slave)?;
        for &elem in elems {
            let kind = self
                .elems
                .get(elem.0 as usize)
                .map(|e| e.kind)
                .ok_or(MeshError::UnknownElement { elem })?;
            if kind != ElemType::Edge2 {
                return Err(MeshError::MortarElementNotEdge { elem, kind });
            }
        }
        self.mortar_interfaces.push(MortarInterface {
            master: master.to_string(),
            slave: slave.to_string(),
            master_id,
            slave_id,
            elems: elems.to_vec(),
        });
        Ok(())
    }

    /// Add an `nx` by `ny` grid of `dx` by `dy` quads with its lower-left
    /// corner at `origin`, in the `z = origin.z` plane. `owner(i, j)`
    /// picks the processor of each element.
    pub fn add_quad_grid(
        &mut self,
        origin: Point,
        nx: usize,
        ny: usize,
        dx: f64,
        dy: f64,
        owner: impl Fn(usize, usize) -> ProcessorId,
    ) -> QuadGrid {
        let mut nodes = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                let p = Point::new(
                    origin.x + dx * i as f64,
                    origin.y + dy * j as f64,
                    origin.z,
                );
                nodes.push(self.add_node(p));
            }
        }
        let at = |i: usize, j: usize| nodes[j * (nx + 1) + i];
        let mut elems = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let conn = [at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)];
                elems.push(self.push_elem(ElemType::Quad4, &conn, owner(i, j)));
            }
        }
        QuadGrid {
            nx,
            ny,
            nodes,
            elems,
        }
    }

    /// Finish the mesh.
    pub fn build(self) -> Mesh {
        Mesh::from_parts(
            self.positions,
            self.elems,
            self.boundary_names,
            self.boundary_elements,
            self.mortar_interfaces,
        )
    }

    fn resolve(&self, name: &str) -> Result<BoundaryId, MeshError> {
        self.boundary_names
            .get(name)
            .copied()
            .ok_or_else(|| MeshError::UnknownBoundary {
                name: name.to_string(),
            })
    }
}
