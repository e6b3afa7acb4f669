//! # GroupTree - Group-Clustered Storage Layout
//!
//! grouptree is the storage-layout core of a relational engine that clusters
//! a parent table and its child tables into one storage tree. Rows of every
//! table in a group interleave in hierarchical-key order, so a customer and
//! all of its orders and items are physically adjacent:
//!
//! ```text
//! tree "customer"                       encoded hkey
//! ├── customer 1                        [1, 1]
//! │   ├── order 10                      [1, 1, 2, 10]
//! │   │   ├── item 100                  [1, 1, 2, 10, 3, 100]
//! │   │   └── item 101                  [1, 1, 2, 10, 3, 101]
//! │   └── order 11                      [1, 1, 2, 11]
//! └── customer 2                        [1, 2]
//! ```
//!
//! This crate owns the layout math, not the tree: the row image format, the
//! hierarchical keys, and the association tables that wire secondary
//! indexes back to both. Storage engines, transactions, and query execution
//! sit above it.
//!
//! ## What it provides
//!
//! - **Compact rows**: a binary row format with a one-bit-per-column null
//!   bitmap where a null occupies zero bytes, plus per-schema lookup tables
//!   that locate any field in O(columns/8) regardless of which columns are
//!   null ([`records`])
//! - **Hierarchical keys**: per-table key shapes derived from the group's
//!   joins, runtime keys, and an order-preserving byte encoding whose
//!   prefix property makes a parent's key a prefix of every descendant's
//!   ([`hkey`], [`encoding`])
//! - **Group assembly**: a versioned registry resolving table definitions
//!   into immutable schemas, group ordinals, and flattened row positions
//!   ([`schema`])
//! - **Index associations**: frozen index descriptors that say, per index
//!   row position, where the value comes from, and how an index entry
//!   rebuilds the hkey it points at without touching the base row
//!   ([`index`])
//!
//! ## Quick Start
//!
//! ```ignore
//! use grouptree::{ColumnDef, DataType, Registry, RowBuilder, RowView, TableDef, Value};
//!
//! let mut registry = Registry::new();
//! let customer = registry.register(
//!     TableDef::new("customer", vec![
//!         ColumnDef::new("cid", DataType::Int8).not_null(),
//!         ColumnDef::varchar("name", Some(64)),
//!     ])
//!     .with_primary_key(vec!["cid"]),
//! )?;
//!
//! let schema = registry.schema(customer)?;
//! let mut row = RowBuilder::new(&schema);
//! row.set_int8(0, 1)?;
//! row.set_text(1, "Alice")?;
//! let image = row.build()?;
//!
//! let view = RowView::new(&image, &schema)?;
//! assert_eq!(view.get_text(1)?, "Alice");
//! ```
//!
//! ## Module Overview
//!
//! - [`records`]: row image format, schemas, field-coordinate tables
//! - [`hkey`]: hierarchical key shapes, values, and encoding
//! - [`index`]: index descriptors and their association tables
//! - [`schema`]: table definitions, group assembly, the registry
//! - [`encoding`]: order-preserving key byte encoding
//! - [`types`]: column types and runtime values
//! - [`config`]: layout constants
//! - [`error`]: typed failure taxonomy

pub mod config;
pub mod encoding;
pub mod error;
pub mod hkey;
pub mod index;
pub mod records;
pub mod schema;
pub mod types;

pub use error::{AssociationError, IndexError, RowError, SchemaError};
pub use hkey::{HKey, HKeySegment, HKeyShape};
pub use index::{
    HKeyBuildStep, IndexColumn, IndexDef, IndexDefBuilder, IndexRowComposition, IndexSource,
    IndexToHKey,
};
pub use records::{RowBuilder, RowSchema, RowView, SchemaId};
pub use schema::{Registry, SharedRegistry, TableDef};
pub use types::{ColumnDef, DataType, Value};
