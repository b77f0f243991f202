//! Element storage.

use seam_core::{ElemType, NodeId, ProcessorId};
use smallvec::SmallVec;

/// One mesh element: its shape, connectivity and owning processor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Shape of the element.
    pub kind: ElemType,
    /// Nodes in local (counter-clockwise) order.
    pub nodes: SmallVec<[NodeId; 4]>,
    /// Processor owning the element.
    pub processor: ProcessorId,
}
