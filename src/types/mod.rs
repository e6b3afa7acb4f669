//! # Type System
//!
//! The type vocabulary shared by the row codec, the schema registry, and
//! the hierarchical-key encoder: [`DataType`] names what a column stores,
//! [`ColumnDef`] adds the per-column metadata (length cap, nullability),
//! and [`Value`] is the runtime shape a field takes between them. All three
//! are layout-facing; anything SQL-facing sits above this crate.
//!
//! ```ignore
//! use grouptree::types::{ColumnDef, DataType, Value};
//!
//! let col = ColumnDef::varchar("name", Some(255)).not_null();
//! assert!(col.data_type().is_variable());
//! assert_eq!(Value::from(42i64), Value::Int(42));
//! ```

mod column;
mod data_type;
mod value;

pub use column::ColumnDef;
pub use data_type::DataType;
pub use value::Value;
