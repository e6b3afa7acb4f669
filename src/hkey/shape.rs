//! # HKey Shape
//!
//! The static, per-table description of a hierarchical key: which group
//! tables contribute segments, in root-to-leaf order, and which concrete
//! column each segment value is sourced from when composing the key for a
//! row of the leaf table.
//!
//! ## Positions
//!
//! Slots in a shape are numbered left to right with every segment's ordinal
//! occupying one slot before that segment's columns:
//!
//! ```text
//! customer (ordinal 1, pk [cid]) <- order (ordinal 2, pk [oid])
//!
//! shape of order:  [ 1, cid, 2, oid ]
//! position:          0    1  2    3
//! ```
//!
//! Index association tables address hkey columns through these positions.
//!
//! ## Source Columns
//!
//! A segment for ancestor table A names, per key column, the column nearest
//! the leaf that carries the same value. The group join equates a child's
//! join columns with its parent's primary key, so an ancestor's key value is
//! often readable straight out of a descendant row; the source stops at the
//! deepest table the value propagates to.

use crate::records::SchemaId;

/// One hkey value slot: the concrete column supplying the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HKeyColumnShape {
    source_table: SchemaId,
    source_column: usize,
}

impl HKeyColumnShape {
    pub fn new(source_table: SchemaId, source_column: usize) -> Self {
        Self {
            source_table,
            source_column,
        }
    }

    pub fn source_table(&self) -> SchemaId {
        self.source_table
    }

    pub fn source_column(&self) -> usize {
        self.source_column
    }

    pub(crate) fn reroot(&mut self, table: SchemaId, column: usize) {
        self.source_table = table;
        self.source_column = column;
    }
}

/// One table's contribution to the hkey: its ordinal, then its key columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HKeySegmentShape {
    table: SchemaId,
    ordinal: u8,
    columns: Vec<HKeyColumnShape>,
}

impl HKeySegmentShape {
    pub fn new(table: SchemaId, ordinal: u8, columns: Vec<HKeyColumnShape>) -> Self {
        Self {
            table,
            ordinal,
            columns,
        }
    }

    pub fn table(&self) -> SchemaId {
        self.table
    }

    pub fn ordinal(&self) -> u8 {
        self.ordinal
    }

    pub fn columns(&self) -> &[HKeyColumnShape] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [HKeyColumnShape] {
        &mut self.columns
    }
}

/// Addressed content of one shape position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HKeySlot {
    /// The segment's ordinal marker.
    Ordinal { segment: usize },
    /// A key value slot.
    Column { segment: usize, column: usize },
}

/// Full ancestor-path key shape for one table, root segment first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HKeyShape {
    segments: Vec<HKeySegmentShape>,
}

impl HKeyShape {
    pub fn new(segments: Vec<HKeySegmentShape>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[HKeySegmentShape] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Table the shape keys rows of; the deepest segment's table.
    pub fn leaf_table(&self) -> Option<SchemaId> {
        self.segments.last().map(|s| s.table())
    }

    /// Number of value slots across all segments.
    pub fn column_count(&self) -> usize {
        self.segments.iter().map(|s| s.column_count()).sum()
    }

    /// Number of addressable slots, ordinals included.
    pub fn position_count(&self) -> usize {
        self.segment_count() + self.column_count()
    }

    /// Position of a segment's ordinal slot.
    pub fn ordinal_position(&self, segment: usize) -> Option<usize> {
        if segment >= self.segments.len() {
            return None;
        }
        let before: usize = self.segments[..segment]
            .iter()
            .map(|s| 1 + s.column_count())
            .sum();
        Some(before)
    }

    /// Position of a value slot within a segment.
    pub fn column_position(&self, segment: usize, column: usize) -> Option<usize> {
        let seg = self.segments.get(segment)?;
        if column >= seg.column_count() {
            return None;
        }
        Some(self.ordinal_position(segment)? + 1 + column)
    }

    /// Resolves a flat position back to its slot.
    pub fn slot_at(&self, position: usize) -> Option<HKeySlot> {
        let mut cursor = 0;
        for (seg_idx, seg) in self.segments.iter().enumerate() {
            if position == cursor {
                return Some(HKeySlot::Ordinal { segment: seg_idx });
            }
            cursor += 1;
            if position < cursor + seg.column_count() {
                return Some(HKeySlot::Column {
                    segment: seg_idx,
                    column: position - cursor,
                });
            }
            cursor += seg.column_count();
        }
        None
    }

    pub(crate) fn segments_mut(&mut self) -> &mut [HKeySegmentShape] {
        &mut self.segments
    }
}
