//! # Per-Group Field Coordinate Tables
//!
//! This module holds the precomputed tables that make field location cost
//! O(columns/8) instead of O(columns). Columns are partitioned into groups of
//! eight, one group per null-bitmap byte. For every group a 256-entry table,
//! indexed by that byte's liveness pattern (bit set = column present), stores
//! the byte contribution of the whole group plus where the last live column
//! of the pattern starts.
//!
//! ## Table Contents
//!
//! For a liveness pattern `p` within one group:
//!
//! | Table | Meaning |
//! |-------|---------|
//! | `offset_before_last[p]` | Sum of live column widths in `p`, excluding the highest live bit |
//! | `last_width[p]` | Width of the highest live column in `p` |
//! | `group_width[p]` | Sum of all live column widths in `p` |
//! | `last_var_incl[p]` | Pattern truncated at the highest live variable column, 0 = none |
//! | `last_var_excl[p]` | Same, but strictly below the highest bit of `p` |
//!
//! "Width" here is a column's footprint in the packed fixed area: the value
//! width for fixed columns, the delimiter cell width for variable columns.
//! The two `last_var` tables drive delimiter-predecessor resolution for
//! variable columns: a truncated pattern is itself a valid table index, so
//! finding the previous delimiter cell is another O(1) lookup rather than a
//! scan.
//!
//! ## Construction
//!
//! Tables are built incrementally: the entry for pattern `p | bit` derives
//! from the entry for `p` by adding the newly-live column's width. Folding
//! each column once touches every reachable pattern exactly once, so build
//! cost is O(columns * 128) table writes.
//!
//! Patterns containing bits beyond the group's real columns are never
//! consulted: lookups mask the inverted bitmap byte with the group's live
//! mask first.

use crate::config::BITS_PER_GROUP;

/// Coordinate tables for one 8-column group.
#[derive(Clone)]
pub(crate) struct GroupCoords {
    offset_before_last: [u16; 256],
    last_width: [u8; 256],
    group_width: [u16; 256],
    last_var_incl: [u8; 256],
    last_var_excl: [u8; 256],
    /// Bits corresponding to real columns of this group. 0xFF for full
    /// groups, fewer bits for a ragged trailing group.
    live_mask: u8,
}

impl std::fmt::Debug for GroupCoords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let full = self.live_mask as usize;
        f.debug_struct("GroupCoords")
            .field("live_mask", &format_args!("{:#04x}", self.live_mask))
            .field("full_width", &self.group_width[full])
            .field("last_var", &self.last_var_incl[full])
            .finish()
    }
}

/// Where a fixed-width field lives, relative to the fixed-area start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FixedSlot {
    pub offset: usize,
    pub width: usize,
}

/// Delimiter cell positions bounding a variable-width field, relative to the
/// fixed-area start, plus the total live fixed-area size (the variable
/// segment begins right after it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VarSlot {
    pub current_cell: usize,
    pub previous_cell: Option<usize>,
    pub fixed_area_size: usize,
}

/// Precomputed coordinate tables for one schema.
#[derive(Debug, Clone)]
pub(crate) struct FieldCoords {
    groups: Vec<GroupCoords>,
    column_count: usize,
}

impl FieldCoords {
    /// Builds the tables from each column's packed width and variability.
    ///
    /// `widths[i]` is column i's footprint in the fixed area; `is_var[i]`
    /// marks delimiter cells. Both slices run in schema column order.
    pub(crate) fn build(widths: &[usize], is_var: &[bool]) -> Self {
        debug_assert_eq!(widths.len(), is_var.len());
        let column_count = widths.len();
        let group_count = column_count.div_ceil(BITS_PER_GROUP);
        let mut groups = Vec::with_capacity(group_count);

        for g in 0..group_count {
            let base = g * BITS_PER_GROUP;
            let cols_here = (column_count - base).min(BITS_PER_GROUP);

            let mut coords = GroupCoords {
                offset_before_last: [0; 256],
                last_width: [0; 256],
                group_width: [0; 256],
                last_var_incl: [0; 256],
                last_var_excl: [0; 256],
                live_mask: if cols_here == BITS_PER_GROUP {
                    0xFF
                } else {
                    (1u8 << cols_here) - 1
                },
            };

            for b in 0..cols_here {
                let bit = 1usize << b;
                let width = widths[base + b];
                let var = is_var[base + b];
                for p in 0..bit {
                    let k = p | bit;
                    coords.offset_before_last[k] = coords.group_width[p];
                    coords.last_width[k] = width as u8;
                    coords.group_width[k] = coords.group_width[p] + width as u16;
                    if var {
                        coords.last_var_incl[k] = k as u8;
                        coords.last_var_excl[k] = coords.last_var_incl[p];
                    } else {
                        coords.last_var_incl[k] = coords.last_var_incl[p];
                        coords.last_var_excl[k] = coords.last_var_excl[p];
                    }
                }
            }

            groups.push(coords);
        }

        Self {
            groups,
            column_count,
        }
    }

    pub(crate) fn column_count(&self) -> usize {
        self.column_count
    }

    /// Total live bytes in the fixed area for this row's bitmap.
    pub(crate) fn fixed_area_size(&self, bitmap: &[u8]) -> usize {
        let mut acc = 0usize;
        for (g, coords) in self.groups.iter().enumerate() {
            let live = (!bitmap[g]) & coords.live_mask;
            acc += coords.group_width[live as usize] as usize;
        }
        acc
    }

    /// Locates a fixed-width column. None when the column's null bit is set.
    pub(crate) fn locate_fixed(&self, bitmap: &[u8], field: usize) -> Option<FixedSlot> {
        self.locate_fixed_counting(bitmap, field).0
    }

    /// Resolves the delimiter cells bounding a variable-width column.
    /// None when the column's null bit is set.
    pub(crate) fn locate_var(&self, bitmap: &[u8], field: usize) -> Option<VarSlot> {
        self.locate_var_counting(bitmap, field).0
    }

    /// Fixed-column lookup that also reports how many group tables it
    /// probed. Exposed separately so the cost contract is testable.
    pub(crate) fn locate_fixed_counting(
        &self,
        bitmap: &[u8],
        field: usize,
    ) -> (Option<FixedSlot>, usize) {
        debug_assert!(field < self.column_count);
        let g = field / BITS_PER_GROUP;
        let b = field % BITS_PER_GROUP;

        if bitmap[g] & (1 << b) != 0 {
            return (None, 0);
        }

        let mut acc = 0usize;
        for (gg, coords) in self.groups[..g].iter().enumerate() {
            let live = (!bitmap[gg]) & coords.live_mask;
            acc += coords.group_width[live as usize] as usize;
        }

        let coords = &self.groups[g];
        let live = (!bitmap[g]) & coords.live_mask;
        let masked = live & mask_at_or_below(b);

        let slot = FixedSlot {
            offset: acc + coords.offset_before_last[masked as usize] as usize,
            width: coords.last_width[masked as usize] as usize,
        };
        (Some(slot), g + 1)
    }

    /// Variable-column lookup with probe reporting. Walks every group: the
    /// groups after the target still contribute to the fixed-area size that
    /// anchors the variable segment.
    pub(crate) fn locate_var_counting(
        &self,
        bitmap: &[u8],
        field: usize,
    ) -> (Option<VarSlot>, usize) {
        debug_assert!(field < self.column_count);
        let g = field / BITS_PER_GROUP;
        let b = field % BITS_PER_GROUP;

        if bitmap[g] & (1 << b) != 0 {
            return (None, 0);
        }

        let mut acc = 0usize;
        let mut previous_cell: Option<usize> = None;
        let mut current_cell = 0usize;

        for (gg, coords) in self.groups.iter().enumerate() {
            let live = (!bitmap[gg]) & coords.live_mask;

            if gg < g {
                let tp = coords.last_var_incl[live as usize];
                if tp != 0 {
                    previous_cell = Some(acc + coords.offset_before_last[tp as usize] as usize);
                }
            } else if gg == g {
                let masked = live & mask_at_or_below(b);
                let tp = coords.last_var_excl[masked as usize];
                if tp != 0 {
                    previous_cell = Some(acc + coords.offset_before_last[tp as usize] as usize);
                }
                current_cell = acc + coords.offset_before_last[masked as usize] as usize;
            }

            acc += coords.group_width[live as usize] as usize;
        }

        let slot = VarSlot {
            current_cell,
            previous_cell,
            fixed_area_size: acc,
        };
        (Some(slot), self.groups.len())
    }
}

/// Mask keeping bits 0..=b.
fn mask_at_or_below(b: usize) -> u8 {
    debug_assert!(b < BITS_PER_GROUP);
    0xFFu8 >> (BITS_PER_GROUP - 1 - b)
}
