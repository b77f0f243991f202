//! Element-pair locators: overlap pairing of elements across an interface.
//!
//! These are supplied by the caller and registered on the engine under an
//! [`InterfaceId`](seam_core::InterfaceId). The engine drives them with
//! [`reinit`](ElementPairLocator::reinit) on topology changes and
//! [`update`](ElementPairLocator::update) at the penetration cadence.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexSet;
use seam_core::{BoundaryId, ElemId, Point, SearchError, SearchMesh};

/// A locator pairing elements across an interface.
pub trait ElementPairLocator {
    /// Rebuild after a topology change.
    fn reinit(&mut self, mesh: &dyn SearchMesh) -> Result<(), SearchError>;

    /// Refresh pairings from current positions.
    fn update(&mut self, mesh: &dyn SearchMesh) -> Result<(), SearchError>;
}

/// Shared handle to a registered element-pair locator.
///
/// The engine and the caller both hold it; the locator lives as long as
/// either does.
pub type SharedElementPairLocator = Rc<RefCell<dyn ElementPairLocator>>;

// ── Aabb ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
struct Aabb {
    min: Point,
    max: Point,
}

impl Aabb {
    fn of(mesh: &dyn SearchMesh, elem: ElemId, margin: f64) -> Result<Self, SearchError> {
        let nodes = mesh
            .elem_nodes(elem)
            .ok_or(SearchError::UnknownElement { elem })?;
        let mut min = Point::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &node in nodes {
            let p = mesh
                .node_position(node)
                .ok_or(SearchError::UnknownNode { node })?;
            min = min.inf(&p);
            max = max.sup(&p);
        }
        let grow = seam_core::Vector::repeat(margin);
        Ok(Self {
            min: min - grow,
            max: max + grow,
        })
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

// ── OverlapPairLocator ─────────────────────────────────────────────

/// Pairs elements of two sets whose bounding boxes, grown by a margin,
/// overlap. Uses a sweep-and-prune pass along x.
#[derive(Clone, Debug)]
pub struct OverlapPairLocator {
    first: Vec<ElemId>,
    second: Vec<ElemId>,
    margin: f64,
    pairs: Vec<(ElemId, ElemId)>,
}

impl OverlapPairLocator {
    /// Pair elements of `first` with elements of `second`.
    pub fn new(first: Vec<ElemId>, second: Vec<ElemId>, margin: f64) -> Self {
        Self {
            first,
            second,
            margin,
            pairs: Vec::new(),
        }
    }

    /// Pair the elements carrying sides of `master` with those of `slave`.
    pub fn from_boundaries(
        mesh: &dyn SearchMesh,
        master: BoundaryId,
        slave: BoundaryId,
        margin: f64,
    ) -> Self {
        let on = |boundary: BoundaryId| -> Vec<ElemId> {
            mesh.boundary_elements()
                .iter()
                .filter(|b| b.boundary == boundary)
                .map(|b| b.elem)
                .collect::<IndexSet<_>>()
                .into_iter()
                .collect()
        };
        Self::new(on(master), on(slave), margin)
    }

    /// Current `(first, second)` pairs, sorted.
    pub fn pairs(&self) -> &[(ElemId, ElemId)] {
        &self.pairs
    }

    fn compute(&mut self, mesh: &dyn SearchMesh) -> Result<(), SearchError> {
        // (box, is_second, elem) sorted by min x.
        let mut entries: Vec<(Aabb, bool, ElemId)> =
            Vec::with_capacity(self.first.len() + self.second.len());
        for &elem in &self.first {
            entries.push((Aabb::of(mesh, elem, self.margin)?, false, elem));
        }
        for &elem in &self.second {
            entries.push((Aabb::of(mesh, elem, self.margin)?, true, elem));
        }
        entries.sort_by(|a, b| a.0.min.x.total_cmp(&b.0.min.x));

        self.pairs.clear();
        let mut active: Vec<usize> = Vec::new();
        for i in 0..entries.len() {
            let (bbox, is_second, elem) = entries[i];
            active.retain(|&j| entries[j].0.max.x >= bbox.min.x);
            for &j in &active {
                let (other, other_second, other_elem) = entries[j];
                if other_second != is_second && bbox.overlaps(&other) {
                    let pair = if is_second {
                        (other_elem, elem)
                    } else {
                        (elem, other_elem)
                    };
                    self.pairs.push(pair);
                }
            }
            active.push(i);
        }
        self.pairs.sort_unstable();
        self.pairs.dedup();
        Ok(())
    }
}

impl ElementPairLocator for OverlapPairLocator {
    fn reinit(&mut self, mesh: &dyn SearchMesh) -> Result<(), SearchError> {
        self.pairs.clear();
        self.compute(mesh)
    }

    fn update(&mut self, mesh: &dyn SearchMesh) -> Result<(), SearchError> {
        self.compute(mesh)
    }
}
