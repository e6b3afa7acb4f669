//! # Index Model
//!
//! An index maps an ordered tuple of column values to the rows holding
//! them. Because rows cluster by hkey, an index entry does not point at a
//! page; it carries enough values to rebuild the target row's hkey and
//! seek it in the group's tree. At freeze time the builder therefore
//! derives, per index, how each position of the stored entry is sourced
//! and how the positions reassemble into an hkey:
//!
//! ```text
//! index by_qty on item(qty), group customer <- order <- item
//!
//! index row    [ qty | cid | oid | iid ]
//!                 |      \     \     \
//! composition  Field(7) HKey(1) Field(6) Field(5)
//! to_hkey      Ordinal(1) Col(1) Ordinal(2) Col(2) Ordinal(3) Col(3)
//! ```
//!
//! Key columns come first, in declared order; covering value columns are
//! appended for every hkey source the key does not already carry, never
//! duplicating one it does. A single entry then answers both "which
//! fields does this row have" and "where does the row live".

pub mod associations;
pub mod def;


pub use associations::{HKeyBuildStep, IndexRowComposition, IndexSource, IndexToHKey};
pub use def::{IndexColumn, IndexDef, IndexDefBuilder};
