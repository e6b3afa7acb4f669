//! # Hierarchical Keys
//!
//! A group clusters parent and child tables into one storage tree, and each
//! row's position in that tree is its hierarchical key: the ordered path from
//! the group's root table down to the row, one segment per ancestor level.
//! A segment names its table by group ordinal and carries the key values
//! that identify the row at that level.
//!
//! Two halves live here:
//!
//! - [`HKeyShape`]: the static, per-table description of the key. Derived by
//!   the schema registry from the group's parent/child joins; consumed by
//!   the index association builder.
//! - [`HKey`]: a materialized key for one row, encodable into the
//!   byte-comparable tree key via [`encoding::key`](crate::encoding::key).
//!
//! ```text
//! customer(cid) <- order(oid, cid) <- item(iid, oid)
//!
//! hkey of an item row:   [ 1, cid ][ 2, oid ][ 3, iid ]
//! encoded:               01 <cid> 02 <oid> 03 <iid>
//! ```
//!
//! The encoded form of a parent row's hkey is a strict prefix of every
//! descendant's, which is what makes a single range scan walk a whole
//! subtree.

pub mod key;
pub mod shape;

#[cfg(test)]
mod tests;

pub use key::{HKey, HKeySegment};
pub use shape::{HKeyColumnShape, HKeySegmentShape, HKeyShape, HKeySlot};
