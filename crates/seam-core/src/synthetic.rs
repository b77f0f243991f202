//! Synthetic boundary id scheme.
//!
//! The engine tags auxiliary geometry with ids drawn from two ranges that
//! sit above every user-declared boundary:
//!
//! | range                     | meaning                              |
//! |---------------------------|--------------------------------------|
//! | `0 ..= 999_999`           | real, user-declared boundaries       |
//! | `1_000_000 ..= 1_999_999` | face quadrature nodes of a boundary  |
//! | `2_000_000 ..= 2_999_999` | mortar quadrature nodes of a view    |
//!
//! `quadrature = slave + QUADRATURE_OFFSET`, `mortar = MORTAR_OFFSET + other`.
//! The three ranges are pairwise disjoint as long as the source id is real,
//! which the constructors below check.

use crate::error::SearchError;
use crate::id::BoundaryId;

/// Offset added to a slave boundary id to tag its face quadrature nodes.
pub const QUADRATURE_OFFSET: u32 = 1_000_000;

/// Base of the mortar synthetic range.
pub const MORTAR_OFFSET: u32 = 2_000_000;

/// Largest boundary id a user may declare.
pub const MAX_REAL_BOUNDARY_ID: u32 = QUADRATURE_OFFSET - 1;

const MORTAR_END: u32 = MORTAR_OFFSET + QUADRATURE_OFFSET;

/// Which id space a [`BoundaryId`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
    /// User-declared boundary.
    Real,
    /// Face quadrature nodes of the real boundary `id - QUADRATURE_OFFSET`.
    Quadrature,
    /// Mortar quadrature nodes keyed on the real boundary `id - MORTAR_OFFSET`.
    Mortar,
}

impl BoundaryId {
    /// Classify this id, or `None` if it lies above every known range.
    pub fn kind(self) -> Option<BoundaryKind> {
        match self.0 {
            0..=MAX_REAL_BOUNDARY_ID => Some(BoundaryKind::Real),
            QUADRATURE_OFFSET..MORTAR_OFFSET => Some(BoundaryKind::Quadrature),
            MORTAR_OFFSET..MORTAR_END => Some(BoundaryKind::Mortar),
            _ => None,
        }
    }

    /// Whether this is a user-declared boundary id.
    pub fn is_real(self) -> bool {
        self.kind() == Some(BoundaryKind::Real)
    }

    /// Synthetic id tagging the face quadrature nodes of this boundary.
    pub fn quadrature(self) -> Result<BoundaryId, SearchError> {
        self.check_real()?;
        Ok(BoundaryId(self.0 + QUADRATURE_OFFSET))
    }

    /// Synthetic id tagging mortar nodes that face this boundary.
    pub fn mortar(self) -> Result<BoundaryId, SearchError> {
        self.check_real()?;
        Ok(BoundaryId(MORTAR_OFFSET + self.0))
    }

    /// The real boundary a synthetic id was derived from.
    ///
    /// Real ids map to themselves; ids outside every range yield `None`.
    pub fn source(self) -> Option<BoundaryId> {
        match self.kind()? {
            BoundaryKind::Real => Some(self),
            BoundaryKind::Quadrature => Some(BoundaryId(self.0 - QUADRATURE_OFFSET)),
            BoundaryKind::Mortar => Some(BoundaryId(self.0 - MORTAR_OFFSET)),
        }
    }

    fn check_real(self) -> Result<(), SearchError> {
        if self.is_real() {
            Ok(())
        } else {
            Err(SearchError::BoundaryIdOutOfRange {
                id: self,
                limit: MAX_REAL_BOUNDARY_ID,
            })
        }
    }
}
