//! # Layout Configuration
//!
//! One home for the numbers the row format and the hierarchical-key
//! machinery must agree on: header width, bitmap granularity, delimiter
//! sizing, ordinal bounds. The row codec, the field-location tables, and
//! the key encoder each read their share from here, and `const` assertions
//! in [`constants`] keep interdependent values from drifting apart when one
//! of them changes.

pub mod constants;
pub use constants::*;
