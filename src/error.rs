//! Typed failure cases for schema construction, row decoding, and index
//! association building.
//!
//! Errors are raised through [`eyre::Report`] at the public API boundary so
//! callers get backtraces and context chains for free, but every failure that
//! a caller might reasonably match on is a typed variant here and can be
//! recovered with `Report::downcast_ref`.

use thiserror::Error;

/// Rejections produced while building a [`RowSchema`](crate::records::RowSchema)
/// or registering tables and joins in a [`Registry`](crate::schema::Registry).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("table has no columns")]
    NoColumns,

    #[error("table has {0} columns, maximum is {1}")]
    TooManyColumns(usize, usize),

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{0}' has zero declared width")]
    ZeroWidth(String),

    #[error("duplicate table name '{0}'")]
    DuplicateTable(String),

    #[error("unknown table '{0}'")]
    UnknownTable(String),

    #[error("table '{0}' has no primary key")]
    MissingPrimaryKey(String),

    #[error("primary key names column {index} but table has {count} columns")]
    PrimaryKeyOutOfRange { index: usize, count: usize },

    #[error("primary key names column '{0}' twice")]
    PrimaryKeyDuplicate(String),

    #[error("join names column {index} but table has {count} columns")]
    JoinColumnOutOfRange { index: usize, count: usize },

    #[error("worst-case variable payload of {cumulative} bytes exceeds what a delimiter cell can address")]
    VarWidthOverflow { cumulative: u64 },

    #[error("join from '{child}' to '{parent}' has {child_cols} child columns but parent key has {parent_cols}")]
    JoinArityMismatch {
        child: String,
        parent: String,
        child_cols: usize,
        parent_cols: usize,
    },

    #[error("join column '{child_col}' has type {child_type} but parent key column '{parent_col}' has type {parent_type}")]
    JoinTypeMismatch {
        child_col: String,
        child_type: String,
        parent_col: String,
        parent_type: String,
    },
}

/// Structural defects detected while decoding a stored row image.
///
/// A row that trips one of these was either truncated in storage or written
/// against a different schema generation than the one used to read it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("row image is {actual} bytes, need at least {expected}")]
    Truncated { expected: usize, actual: usize },

    #[error("row header declares {declared} bytes but image holds {actual}")]
    HeaderMismatch { declared: usize, actual: usize },

    #[error("variable field {field} has inverted bounds {start}..{end}")]
    InvertedRange {
        field: usize,
        start: usize,
        end: usize,
    },

    #[error("variable payload of {got} bytes exceeds declared maximum {max}")]
    VarOverflow { got: usize, max: usize },

    #[error("encoded row of {size} bytes exceeds the {max}-byte format limit")]
    TooLarge { size: usize, max: usize },

    #[error("field {field} is out of range for schema with {count} columns")]
    FieldOutOfRange { field: usize, count: usize },

    #[error("field {field} is null")]
    NullField { field: usize },

    #[error("field {field} is NOT NULL and was given no value")]
    NotNullable { field: usize },

    #[error("field {field} holds {actual}, expected {expected}")]
    TypeMismatch {
        field: usize,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("value does not fit field {field} of type {ty}")]
    ValueOutOfRange { field: usize, ty: &'static str },
}

/// Violations of the index column protocol.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("index '{0}' is frozen, no further key columns may be added")]
    Frozen(String),

    #[error("index '{0}' has no key columns")]
    EmptyKey(String),

    #[error("index '{index}' names column '{column}' twice")]
    DuplicateColumn { index: String, column: String },

    #[error("index '{index}' names column {column} which table '{table}' does not have")]
    UnknownColumn {
        index: String,
        table: String,
        column: usize,
    },

    #[error("index '{index}' spans table '{table}' which is off the branch of its deepest table")]
    TableOffBranch { index: String, table: String },
}

/// Internal-consistency failures surfaced while wiring an index to the
/// hierarchical key of its group.
///
/// These indicate a malformed group graph rather than bad caller input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssociationError {
    #[error("table '{0}' has no ordinal assigned in its group")]
    MissingOrdinal(String),

    #[error("group of '{0}' has more than {1} tables, ordinal space exhausted")]
    OrdinalOverflow(String, usize),

    #[error(
        "hkey draws '{table}.{column}' from outside the index's tables, but '{table}' is a group root"
    )]
    RootHKeySource { table: String, column: String },

    #[error("no value at index row position {0} to rebuild the hkey from")]
    UnsourcedPosition(usize),
}
