//! # Key Encoding
//!
//! The byte-comparable encoding behind hierarchical keys and index keys:
//! values and group ordinals encode to byte strings whose memcmp order is
//! the logical order, so tree traversal never decodes a key to compare it.

pub mod key;

pub use key::{max_encoded_width, type_prefix, KeyEncoder};
