//! # Grouptree Layout Constants
//!
//! This module centralizes the constants that the row format, the
//! field-location tables, and the hierarchical-key encoder must agree on.
//! Constants that depend on each other are co-located to prevent mismatch
//! bugs.
//!
//! ## Dependency Graph
//!
//! The following diagram shows how constants relate to each other. When
//! changing any constant, check if dependent constants need adjustment.
//!
//! ```text
//! ROW_HEADER_SIZE (2 bytes, u16 LE)
//!       │
//!       └─> MAX_ROW_SIZE (u16::MAX)
//!             The header stores the full image length including itself,
//!             so no encoded row may exceed what a u16 can describe.
//!
//! BITS_PER_GROUP (8)
//!       │
//!       ├─> GROUP_PATTERNS (derived: 1 << BITS_PER_GROUP)
//!       │     One precomputed coordinate entry per liveness pattern of a
//!       │     bitmap byte. 8 bits per group keeps the table at 256 entries.
//!       │
//!       └─> MAX_COLUMNS (must be a multiple of BITS_PER_GROUP)
//!
//! DEFAULT_VAR_WIDTH (65 535)
//!       │
//!       └─> Delimiter cell sizing for unbounded variable columns.
//!           A single unbounded column yields 2-byte delimiter cells; the
//!           cumulative cap across columns still must fit MAX_ROW_SIZE.
//!
//! MAX_DELIMITER_WIDTH (4)
//!       │
//!       └─> Delimiter cells are read as little-endian integers of at most
//!           this many bytes, so cumulative variable payload is capped at
//!           what a u32 can address.
//! ```
//!
//! ## Critical Invariants
//!
//! These invariants are enforced by compile-time assertions:
//!
//! 1. `GROUP_PATTERNS == 1 << BITS_PER_GROUP` (table indexed by bitmap byte)
//! 2. `MAX_COLUMNS % BITS_PER_GROUP == 0` (last group is never ragged)
//! 3. `ROW_HEADER_SIZE == 2` (header is a u16, read with from_le_bytes)
//! 4. `FIRST_ORDINAL > 0` (ordinal zero is reserved and never assigned)
//!
//! ## Usage
//!
//! Import constants from this module rather than defining them locally:
//!
//! ```ignore
//! use crate::config::{ROW_HEADER_SIZE, BITS_PER_GROUP};
//! ```

// ============================================================================
// ROW IMAGE LAYOUT
// These define the fundamental encoded-row structure used throughout the crate
// ============================================================================

/// Size of the row header in bytes.
/// Every encoded row begins with a little-endian u16 holding the total image
/// length, header included.
pub const ROW_HEADER_SIZE: usize = 2;

/// Largest encodable row image in bytes.
/// Bounded by what the u16 header can describe.
pub const MAX_ROW_SIZE: usize = u16::MAX as usize;

/// Upper bound on columns per table.
/// Policy limit rather than a format limit: it keeps the null bitmap and the
/// per-schema coordinate tables small, and an all-fixed row at this width
/// still fits MAX_ROW_SIZE with room to spare.
pub const MAX_COLUMNS: usize = 1024;

const _: () = assert!(
    ROW_HEADER_SIZE == core::mem::size_of::<u16>(),
    "row header is read as a little-endian u16"
);

// ============================================================================
// FIELD-LOCATION TABLES
// Precomputed coordinate tables are indexed by one null-bitmap byte
// ============================================================================

/// Columns covered by one null-bitmap byte and one coordinate group.
pub const BITS_PER_GROUP: usize = 8;

/// Number of liveness patterns per group, one coordinate entry each.
pub const GROUP_PATTERNS: usize = 1 << BITS_PER_GROUP;

const _: () = assert!(
    GROUP_PATTERNS == 1 << BITS_PER_GROUP,
    "coordinate tables are indexed directly by a bitmap byte"
);

const _: () = assert!(
    MAX_COLUMNS % BITS_PER_GROUP == 0,
    "MAX_COLUMNS must be a whole number of bitmap bytes"
);

// ============================================================================
// VARIABLE-WIDTH COLUMNS
// Delimiter cells record cumulative variable payload sizes
// ============================================================================

/// Assumed maximum payload for a variable column declared without a cap.
/// Feeds delimiter cell sizing: one unbounded column alone needs 2-byte
/// cells, and several together grow the cells further.
pub const DEFAULT_VAR_WIDTH: usize = 65_535;

/// Widest delimiter cell the format emits.
/// Cells are little-endian integers of 0 to this many bytes, chosen per
/// schema from the worst-case cumulative variable payload.
pub const MAX_DELIMITER_WIDTH: usize = 4;

const _: () = assert!(
    MAX_DELIMITER_WIDTH == core::mem::size_of::<u32>(),
    "cumulative variable payload is tracked as a u32"
);

// ============================================================================
// GROUP ORDINALS
// Each table in a group carries a small integer tag used in hierarchical keys
// ============================================================================

/// Lowest ordinal handed out within a group.
/// Zero is reserved so a zeroed key byte can never alias a real table.
pub const FIRST_ORDINAL: usize = 1;

/// Highest ordinal a group may assign.
/// Ordinals are encoded as a single byte inside hierarchical keys; 0xFF is
/// excluded so the key encoder can use it as a range-scan sentinel that
/// sorts after every real segment.
pub const MAX_ORDINAL: usize = 254;

const _: () = assert!(FIRST_ORDINAL > 0, "ordinal zero is reserved");

const _: () = assert!(MAX_ORDINAL < 0xFF, "0xFF is the range-scan sentinel");

const _: () = assert!(
    FIRST_ORDINAL <= MAX_ORDINAL,
    "ordinal range must be non-empty"
);
