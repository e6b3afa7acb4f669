//! # Index Association Tables
//!
//! A frozen index carries two derived tables wiring its entries to the
//! group they index:
//!
//! - [`IndexRowComposition`] answers "where does index-row position `i`
//!   come from?" with exactly one source per position: a flattened
//!   base-row field on the index's branch, or a position in the leaf
//!   table's hkey.
//! - [`IndexToHKey`] answers the reverse: an ordered recipe that rebuilds
//!   the leaf table's hkey from one index entry, segment ordinals
//!   interleaved with value positions.
//!
//! Both are computed once at freeze time and never change afterwards; the
//! query path only reads them.

use eyre::Result;

use crate::error::AssociationError;
use crate::hkey::HKey;
use crate::types::Value;

/// Source of one index-row position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    /// Field position in the flattened base row of the index's branch.
    Field(usize),
    /// Position in the leaf table's hkey, ordinal slots counted.
    HKey(usize),
}

/// Per-position sources of one index row, key columns first, appended
/// covering columns after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRowComposition {
    sources: Vec<IndexSource>,
}

impl IndexRowComposition {
    pub(crate) fn new(sources: Vec<IndexSource>) -> Self {
        Self { sources }
    }

    /// Number of positions in one index row.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn source(&self, position: usize) -> Option<IndexSource> {
        self.sources.get(position).copied()
    }

    pub fn sources(&self) -> &[IndexSource] {
        &self.sources
    }
}

/// One step of the hkey reconstruction recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HKeyBuildStep {
    /// Open the next segment under this ordinal.
    Ordinal(u8),
    /// Append the value at `index_position` in the index row.
    /// `field_position` names the same value in the flattened base row
    /// when a table on the index's branch serves it directly; the index
    /// row is preferred either way.
    Column {
        index_position: usize,
        field_position: Option<usize>,
    },
}

/// Ordered recipe rebuilding the leaf table's hkey from one index entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexToHKey {
    steps: Vec<HKeyBuildStep>,
}

impl IndexToHKey {
    pub(crate) fn new(steps: Vec<HKeyBuildStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[HKeyBuildStep] {
        &self.steps
    }

    /// Rebuilds the hkey from the values of one index row, key columns
    /// first and covering value columns after, as stored in the index
    /// entry.
    pub fn reconstruct_hkey<'a>(&self, index_row: &[Value<'a>]) -> Result<HKey<'a>> {
        let mut hkey = HKey::new();
        for step in &self.steps {
            match *step {
                HKeyBuildStep::Ordinal(ordinal) => hkey.begin_segment(ordinal),
                HKeyBuildStep::Column { index_position, .. } => {
                    let value = index_row
                        .get(index_position)
                        .ok_or(AssociationError::UnsourcedPosition(index_position))?;
                    hkey.push_value(value.clone())?;
                }
            }
        }
        Ok(hkey)
    }
}
