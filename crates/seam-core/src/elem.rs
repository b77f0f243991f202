//! Element shapes and their side tables.

use std::fmt;

/// Geometric shape of a first-order element.
///
/// Node numbering is counter-clockwise. Side `i` of a 2D element joins
/// node `i` and node `(i + 1) % n`; side `i` of an [`ElemType::Edge2`] is
/// its node `i`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElemType {
    /// Two-node line segment. Used for mortar interface elements.
    Edge2,
    /// Three-node triangle.
    Tri3,
    /// Four-node quadrilateral.
    Quad4,
}

impl ElemType {
    /// Number of nodes the element carries.
    pub fn n_nodes(self) -> usize {
        match self {
            Self::Edge2 => 2,
            Self::Tri3 => 3,
            Self::Quad4 => 4,
        }
    }

    /// Number of sides.
    pub fn n_sides(self) -> usize {
        self.n_nodes()
    }

    /// Topological dimension.
    pub fn dim(self) -> u8 {
        match self {
            Self::Edge2 => 1,
            Self::Tri3 | Self::Quad4 => 2,
        }
    }

    /// Local node indices making up side `side`, or `None` if out of range.
    pub fn side_local_nodes(self, side: u16) -> Option<&'static [usize]> {
        const EDGE2: [&[usize]; 2] = [&[0], &[1]];
        const TRI3: [&[usize]; 3] = [&[0, 1], &[1, 2], &[2, 0]];
        const QUAD4: [&[usize]; 4] = [&[0, 1], &[1, 2], &[2, 3], &[3, 0]];
        let table: &[&'static [usize]] = match self {
            Self::Edge2 => &EDGE2,
            Self::Tri3 => &TRI3,
            Self::Quad4 => &QUAD4,
        };
        table.get(usize::from(side)).copied()
    }
}

impl fmt::Display for ElemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Edge2 => "EDGE2",
            Self::Tri3 => "TRI3",
            Self::Quad4 => "QUAD4",
        };
        f.write_str(name)
    }
}
