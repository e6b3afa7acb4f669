//! # Row Serialization with Lookup-Table Field Location
//!
//! This module provides the packed binary row format and zero-copy access to
//! it. Locating column N never parses the row sequentially: each schema
//! carries 256-entry lookup tables indexed by null-bitmap bytes, so any
//! field's offset resolves in O(columns/8) byte probes no matter which
//! earlier columns are null.
//!
//! ## Row Binary Layout
//!
//! ```text
//! +------------------+------------------+------------------+------------------+
//! | Total Length     | Null Bitmap      | Packed Fixed     | Variable Segment |
//! | (u16 LE)         | [u8; (N+7)/8]    | Area             | [u8; ...]        |
//! +------------------+------------------+------------------+------------------+
//! ```
//!
//! | Component | Type | Description |
//! |-----------|------|-------------|
//! | **Total Length** | `u16` | Length of the whole image, header included |
//! | **Null Bitmap** | `[u8; (N+7)/8]` | 1 bit per column. `1` = NULL, `0` = has data |
//! | **Packed Fixed Area** | `[u8; ...]` | Non-null fixed values and delimiter cells, in column order |
//! | **Variable Segment** | `[u8; ...]` | Concatenated non-null variable payloads |
//!
//! A null column occupies zero bytes everywhere: no slot in the fixed area,
//! no delimiter cell, no payload. A variable column's slot in the fixed area
//! is a little-endian delimiter cell holding the cumulative end offset of its
//! payload within the variable segment; the cell width (1 to 4 bytes) is
//! chosen per schema from the worst-case cumulative payload. A field's
//! payload range is `[previous cell, own cell)`, where the previous cell is
//! the nearest earlier non-null variable column's (or zero).
//!
//! ## Design Goals
//!
//! 1. **Bounded lookup**: offsets come from per-bitmap-byte tables, never a scan
//! 2. **Zero-copy reads**: all getters return references into the buffer
//! 3. **Schema-dependent**: types and widths come from the schema, not the row
//! 4. **Dense nulls**: a null costs one bitmap bit and nothing else
//!
//! ## Module Structure
//!
//! - `coords`: per-schema 256-entry coordinate tables
//! - `schema`: [`RowSchema`] construction and validation
//! - `builder`: [`RowBuilder`] for staging and encoding rows
//! - `view`: [`RowView`] for zero-copy reading

pub mod builder;
pub mod coords;
pub mod schema;
pub mod view;


pub use builder::RowBuilder;
pub use schema::{ParentLink, RowSchema, SchemaId};
pub use view::RowView;
