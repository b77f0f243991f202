//! Lagrange-element implementation of the [`Assembly`] service.

use seam_core::{Assembly, ElemId, ElemType, NodeId, Order, Point, ProcessorId, SearchError, SearchMesh};

use crate::quadrature::QuadratureRule;

/// Maps Gauss rules onto first-order elements and their sides.
///
/// Holds the physical points of the last `reinit_*` call, like a
/// finite-element assembly object prepared one element at a time.
#[derive(Clone, Debug)]
pub struct FeAssembly {
    processor: ProcessorId,
    face_order: Order,
    volume_order: Order,
    q_points_face: Vec<Point>,
    q_points: Vec<Point>,
}

impl FeAssembly {
    /// Assembly for `processor` using `order` for both face and volume rules.
    pub fn new(processor: ProcessorId, order: Order) -> Self {
        Self {
            processor,
            face_order: order,
            volume_order: order,
            q_points_face: Vec::new(),
            q_points: Vec::new(),
        }
    }

    /// Use a different order for volumetric (mortar element) rules.
    pub fn with_volume_order(mut self, order: Order) -> Self {
        self.volume_order = order;
        self
    }

    /// Order of the face rule.
    pub fn face_order(&self) -> Order {
        self.face_order
    }

    /// Order of the volumetric rule.
    pub fn volume_order(&self) -> Order {
        self.volume_order
    }
}

fn positions(mesh: &dyn SearchMesh, nodes: &[NodeId]) -> Result<Vec<Point>, SearchError> {
    nodes
        .iter()
        .map(|&node| {
            mesh.node_position(node)
                .ok_or(SearchError::UnknownNode { node })
        })
        .collect()
}

/// Linear interpolation along a segment parametrized on `[-1, 1]`.
fn on_segment(a: &Point, b: &Point, xi: f64) -> Point {
    Point::from(a.coords * (0.5 * (1.0 - xi)) + b.coords * (0.5 * (1.0 + xi)))
}

impl Assembly for FeAssembly {
    fn processor_id(&self) -> ProcessorId {
        self.processor
    }

    fn reinit_elem_face(
        &mut self,
        mesh: &dyn SearchMesh,
        elem: ElemId,
        side: u16,
    ) -> Result<(), SearchError> {
        let kind = mesh
            .elem_type(elem)
            .ok_or(SearchError::UnknownElement { elem })?;
        let xs = positions(mesh, &mesh.side_nodes(elem, side)?)?;
        let rule = QuadratureRule::for_side(kind, self.face_order);

        self.q_points_face.clear();
        match xs.as_slice() {
            [p] => self.q_points_face.push(*p),
            [a, b] => self
                .q_points_face
                .extend(rule.points().iter().map(|r| on_segment(a, b, r[0]))),
            _ => {
                return Err(SearchError::UnsupportedSide {
                    elem,
                    side,
                    nodes: xs.len(),
                })
            }
        }
        Ok(())
    }

    fn q_points_face(&self) -> &[Point] {
        &self.q_points_face
    }

    fn reinit_elem(&mut self, mesh: &dyn SearchMesh, elem: ElemId) -> Result<(), SearchError> {
        let kind = mesh
            .elem_type(elem)
            .ok_or(SearchError::UnknownElement { elem })?;
        let nodes = mesh
            .elem_nodes(elem)
            .ok_or(SearchError::UnknownElement { elem })?;
        let xs = positions(mesh, nodes)?;
        let rule = QuadratureRule::for_elem(kind, self.volume_order);

        self.q_points.clear();
        for &[xi, eta] in rule.points() {
            let p = match kind {
                ElemType::Edge2 => on_segment(&xs[0], &xs[1], xi),
                ElemType::Tri3 => Point::from(
                    xs[0].coords * (1.0 - xi - eta) + xs[1].coords * xi + xs[2].coords * eta,
                ),
                ElemType::Quad4 => {
                    let n = [
                        0.25 * (1.0 - xi) * (1.0 - eta),
                        0.25 * (1.0 + xi) * (1.0 - eta),
                        0.25 * (1.0 + xi) * (1.0 + eta),
                        0.25 * (1.0 - xi) * (1.0 + eta),
                    ];
                    Point::from(
                        xs.iter()
                            .zip(n)
                            .fold(seam_core::Vector::zeros(), |acc, (x, w)| acc + x.coords * w),
                    )
                }
            };
            self.q_points.push(p);
        }
        Ok(())
    }

    fn q_points(&self) -> &[Point] {
        &self.q_points
    }
}
