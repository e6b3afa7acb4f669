//! # Table Definitions
//!
//! `TableDef` is the declarative input to [`Registry::register`]: a table
//! name, its columns, the primary key, and optionally the join placing the
//! table under a parent. Everything is declared by name; the registry
//! resolves names into column indices and schema ids and publishes the
//! result as an immutable [`RowSchema`](crate::records::RowSchema).
//!
//! ```ignore
//! let order = TableDef::new("order", vec![
//!     ColumnDef::new("oid", DataType::Int8).not_null(),
//!     ColumnDef::new("cid", DataType::Int8).not_null(),
//!     ColumnDef::varchar("memo", Some(255)),
//! ])
//! .with_primary_key(vec!["oid"])
//! .with_parent("customer", vec!["cid"]);
//! ```
//!
//! [`Registry::register`]: crate::schema::Registry::register

use crate::types::ColumnDef;

/// Child-to-parent join declaration.
///
/// `join_columns` name the child's columns matching the parent's primary
/// key column-for-column, in primary-key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinDef {
    parent: String,
    join_columns: Vec<String>,
}

impl JoinDef {
    pub fn new(parent: impl Into<String>, join_columns: Vec<impl Into<String>>) -> Self {
        Self {
            parent: parent.into(),
            join_columns: join_columns.into_iter().map(|c| c.into()).collect(),
        }
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    pub fn join_columns(&self) -> &[String] {
        &self.join_columns
    }
}

/// Declarative description of one table, consumed by the registry.
#[derive(Debug, Clone)]
pub struct TableDef {
    name: String,
    columns: Vec<ColumnDef>,
    primary_key: Vec<String>,
    parent: Option<JoinDef>,
}

impl TableDef {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            columns,
            primary_key: Vec::new(),
            parent: None,
        }
    }

    pub fn with_primary_key(mut self, columns: Vec<impl Into<String>>) -> Self {
        self.primary_key = columns.into_iter().map(|c| c.into()).collect();
        self
    }

    /// Places this table under `parent`, joining the named child columns to
    /// the parent's primary key.
    pub fn with_parent(
        mut self,
        parent: impl Into<String>,
        join_columns: Vec<impl Into<String>>,
    ) -> Self {
        self.parent = Some(JoinDef::new(parent, join_columns));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    pub fn parent(&self) -> Option<&JoinDef> {
        self.parent.as_ref()
    }

    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub(crate) fn into_parts(self) -> (String, Vec<ColumnDef>, Vec<String>, Option<JoinDef>) {
        (self.name, self.columns, self.primary_key, self.parent)
    }
}
