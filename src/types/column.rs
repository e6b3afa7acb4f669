//! # Column Definitions
//!
//! `ColumnDef` pairs a [`DataType`](super::DataType) with the per-column
//! metadata the layout math needs: the declared length cap of a variable
//! column and whether NULL is storable. The cap feeds two decisions made at
//! schema build time: how wide the shared delimiter cells must be, and the
//! worst-case row size callers use to size buffers. An uncapped variable
//! column budgets `DEFAULT_VAR_WIDTH` for both.
//!
//! Columns are nullable unless [`not_null`](ColumnDef::not_null) says
//! otherwise; a NOT NULL column still owns a bit in the row's null bitmap,
//! the builder just refuses to leave it unset.

use super::DataType;
use crate::config::DEFAULT_VAR_WIDTH;

/// One column of a table definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    name: String,
    data_type: DataType,
    char_length: Option<u32>,
    nullable: bool,
}

impl ColumnDef {
    /// A nullable column of the given type, with no length cap.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            char_length: None,
            nullable: true,
        }
    }

    /// A CHAR(n) column; stored values are space-padded to exactly `length`.
    pub fn char(name: impl Into<String>, length: u32) -> Self {
        Self {
            char_length: Some(length),
            ..Self::new(name, DataType::Char)
        }
    }

    /// A VARCHAR column, capped at `length` when given.
    pub fn varchar(name: impl Into<String>, length: Option<u32>) -> Self {
        Self {
            char_length: length,
            ..Self::new(name, DataType::Varchar)
        }
    }

    /// Marks this column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Declared length cap for variable columns.
    pub fn char_length(&self) -> Option<u32> {
        self.char_length
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Maximum bytes one value of this column can occupy in a row image:
    /// the exact slot width for fixed types, the declared cap (or
    /// `DEFAULT_VAR_WIDTH`) for variable ones, delimiter cell excluded.
    pub fn max_width(&self) -> usize {
        match self.data_type.fixed_size() {
            Some(width) => width,
            None => self
                .char_length
                .map_or(DEFAULT_VAR_WIDTH, |cap| cap as usize),
        }
    }
}
