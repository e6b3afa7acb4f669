//! # Schema Assembly
//!
//! This module turns declarative [`TableDef`]s into the published, immutable
//! schema state the rest of the crate runs on. A table either roots a new
//! group or joins its parent's, and every member of a group shares one
//! storage tree:
//!
//! ```text
//! customer (ordinal 1)            group root, tree "customer"
//! └── order (ordinal 2)           joined on customer's primary key
//!     └── item (ordinal 3)        joined on order's primary key
//! ```
//!
//! The [`Registry`] owns the arena of published [`RowSchema`] versions and
//! the per-table derived state: ordinals, hkey shapes, flattened row
//! positions, and width estimates. [`SharedRegistry`] wraps it for
//! concurrent use.
//!
//! [`RowSchema`]: crate::records::RowSchema

pub mod registry;
pub mod table;


pub use registry::{Registry, SharedRegistry};
pub use table::{JoinDef, TableDef};
