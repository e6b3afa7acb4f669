//! # Row Schema
//!
//! This module provides `RowSchema`, the per-table-version object that owns
//! everything needed to encode and decode that table's rows: the ordered
//! column list, the primary key, the parent linkage placing the table inside
//! its group, and the derived field-coordinate tables described in
//! [`coords`](crate::records::coords).
//!
//! ## Derived State
//!
//! - `delimiter_width`: byte width of every delimiter cell in this schema's
//!   rows, fixed at build time from the worst-case cumulative variable
//!   payload (1 byte up to 255, 2 up to 65535, 3 up to 2^24-1, else 4)
//! - `coords`: one 256-entry coordinate table per null-bitmap byte
//! - `max_row_size`: worst-case encoded size, for buffer sizing and
//!   optimizer cost estimates
//!
//! A schema is built once, validated completely, and immutable afterwards.
//! DDL produces a new `RowSchema` under a fresh id; rows written under the
//! old version keep decoding against the old instance.

use eyre::Result;

use crate::config::{MAX_COLUMNS, ROW_HEADER_SIZE};
use crate::error::SchemaError;
use crate::records::coords::FieldCoords;
use crate::types::{ColumnDef, Value};

/// Identifier of one table version inside a [`Registry`](crate::schema::Registry).
///
/// Ids are registry-scoped and never reused; superseding a table on DDL
/// allocates a fresh id while the old one stays resolvable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub u32);

impl std::fmt::Display for SchemaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Linkage of a child table to its parent within a group.
///
/// `join_columns` are the child's column indices, ordered to match the
/// parent's primary key column-for-column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    pub parent: SchemaId,
    pub join_columns: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct RowSchema {
    schema_id: SchemaId,
    name: String,
    columns: Vec<ColumnDef>,
    primary_key: Vec<usize>,
    parent: Option<ParentLink>,
    storage_tree: String,
    delimiter_width: usize,
    var_column_count: usize,
    coords: FieldCoords,
    min_row_size: usize,
    max_row_size: usize,
}

impl RowSchema {
    /// Builds and validates a schema.
    ///
    /// The schema id defaults to 0 and the storage tree to the table's own
    /// name; registering the schema in a [`Registry`](crate::schema::Registry)
    /// assigns the real id and, for child tables, the group root's tree.
    pub fn build(
        name: impl Into<String>,
        columns: Vec<ColumnDef>,
        primary_key: Vec<usize>,
        parent: Option<ParentLink>,
    ) -> Result<Self> {
        let name = name.into();

        if columns.is_empty() {
            return Err(SchemaError::NoColumns.into());
        }
        if columns.len() > MAX_COLUMNS {
            return Err(SchemaError::TooManyColumns(columns.len(), MAX_COLUMNS).into());
        }
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name() == col.name()) {
                return Err(SchemaError::DuplicateColumn(col.name().to_string()).into());
            }
            if col.data_type().is_variable() && col.char_length() == Some(0) {
                return Err(SchemaError::ZeroWidth(col.name().to_string()).into());
            }
        }

        if primary_key.is_empty() {
            return Err(SchemaError::MissingPrimaryKey(name).into());
        }
        for (i, &pk) in primary_key.iter().enumerate() {
            if pk >= columns.len() {
                return Err(SchemaError::PrimaryKeyOutOfRange {
                    index: pk,
                    count: columns.len(),
                }
                .into());
            }
            if primary_key[..i].contains(&pk) {
                return Err(SchemaError::PrimaryKeyDuplicate(columns[pk].name().to_string()).into());
            }
        }

        if let Some(link) = &parent {
            for &jc in &link.join_columns {
                if jc >= columns.len() {
                    return Err(SchemaError::JoinColumnOutOfRange {
                        index: jc,
                        count: columns.len(),
                    }
                    .into());
                }
            }
        }

        let var_column_count = columns
            .iter()
            .filter(|c| c.data_type().is_variable())
            .count();

        let max_var_payload: u64 = columns
            .iter()
            .filter(|c| c.data_type().is_variable())
            .map(|c| c.max_width() as u64)
            .sum();
        if max_var_payload > u32::MAX as u64 {
            return Err(SchemaError::VarWidthOverflow {
                cumulative: max_var_payload,
            }
            .into());
        }

        let delimiter_width = if var_column_count == 0 {
            0
        } else {
            delimiter_width_for(max_var_payload)
        };

        let mut widths = Vec::with_capacity(columns.len());
        let mut is_var = Vec::with_capacity(columns.len());
        for col in &columns {
            match col.data_type().fixed_size() {
                Some(w) => {
                    widths.push(w);
                    is_var.push(false);
                }
                None => {
                    widths.push(delimiter_width);
                    is_var.push(true);
                }
            }
        }
        let coords = FieldCoords::build(&widths, &is_var);

        let max_fixed_area: usize = widths.iter().sum();
        let max_row_size = ROW_HEADER_SIZE
            .saturating_add(Self::null_bitmap_size(columns.len()))
            .saturating_add(max_fixed_area)
            .saturating_add(max_var_payload as usize);

        // Smallest legal row: every nullable column null, every NOT NULL
        // variable column present but empty (its delimiter cell remains).
        let min_fixed_area: usize = columns
            .iter()
            .zip(&widths)
            .filter(|(c, _)| !c.is_nullable())
            .map(|(_, &w)| w)
            .sum();
        let min_row_size = ROW_HEADER_SIZE
            .saturating_add(Self::null_bitmap_size(columns.len()))
            .saturating_add(min_fixed_area);

        let storage_tree = name.clone();
        Ok(Self {
            schema_id: SchemaId(0),
            name,
            columns,
            primary_key,
            parent,
            storage_tree,
            delimiter_width,
            var_column_count,
            coords,
            min_row_size,
            max_row_size,
        })
    }

    pub fn schema_id(&self) -> SchemaId {
        self.schema_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, idx: usize) -> Option<&ColumnDef> {
        self.columns.get(idx)
    }

    /// Index of the named column, if any.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn var_column_count(&self) -> usize {
        self.var_column_count
    }

    pub fn primary_key(&self) -> &[usize] {
        &self.primary_key
    }

    pub fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    /// True for tables that root their group.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Name of the storage tree holding this table's group.
    pub fn storage_tree(&self) -> &str {
        &self.storage_tree
    }

    /// Byte width of every delimiter cell in this schema's rows.
    /// Zero when the schema has no variable columns.
    pub fn delimiter_width(&self) -> usize {
        self.delimiter_width
    }

    /// Smallest legal encoded row size, header and bitmap included.
    pub fn min_row_size(&self) -> usize {
        self.min_row_size
    }

    /// Worst-case encoded row size, header and bitmap included.
    pub fn max_row_size(&self) -> usize {
        self.max_row_size
    }

    /// Declared maximum width of one field's payload.
    pub fn field_max_width(&self, idx: usize) -> Option<usize> {
        self.columns.get(idx).map(|c| c.max_width())
    }

    pub fn null_bitmap_size(column_count: usize) -> usize {
        column_count.div_ceil(8)
    }

    /// Bitmap bytes in this schema's rows.
    pub fn bitmap_len(&self) -> usize {
        Self::null_bitmap_size(self.columns.len())
    }

    /// Encodes one row from a value per column, in schema order.
    ///
    /// Convenience over [`RowBuilder`](crate::records::RowBuilder) for
    /// callers that already hold a full value slice.
    pub fn encode(&self, values: &[Value<'_>]) -> Result<Vec<u8>> {
        let mut builder = crate::records::RowBuilder::new(self);
        for (idx, value) in values.iter().enumerate() {
            builder.set_value(idx, value)?;
        }
        builder.build()
    }

    pub(crate) fn coords(&self) -> &FieldCoords {
        &self.coords
    }

    pub(crate) fn set_schema_id(&mut self, id: SchemaId) {
        self.schema_id = id;
    }

    pub(crate) fn set_storage_tree(&mut self, tree: String) {
        self.storage_tree = tree;
    }
}

/// Delimiter cell width for a worst-case cumulative variable payload.
fn delimiter_width_for(max_cumulative: u64) -> usize {
    if max_cumulative <= 0xFF {
        1
    } else if max_cumulative <= 0xFFFF {
        2
    } else if max_cumulative <= 0xFF_FFFF {
        3
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    fn int4(name: &str) -> ColumnDef {
        ColumnDef::new(name, DataType::Int4)
    }

    #[test]
    fn empty_column_list_is_rejected() {
        let err = RowSchema::build("t", vec![], vec![0], None).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SchemaError>(),
            Some(&SchemaError::NoColumns)
        );
    }

    #[test]
    fn primary_key_out_of_range_is_rejected() {
        let err = RowSchema::build("t", vec![int4("a")], vec![3], None).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SchemaError>(),
            Some(&SchemaError::PrimaryKeyOutOfRange { index: 3, count: 1 })
        );
    }

    #[test]
    fn missing_primary_key_is_rejected() {
        let err = RowSchema::build("t", vec![int4("a")], vec![], None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchemaError>(),
            Some(SchemaError::MissingPrimaryKey(_))
        ));
    }

    #[test]
    fn duplicate_column_name_is_rejected() {
        let err = RowSchema::build("t", vec![int4("a"), int4("a")], vec![0], None).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SchemaError>(),
            Some(&SchemaError::DuplicateColumn("a".into()))
        );
    }

    #[test]
    fn zero_width_varchar_is_rejected() {
        let err = RowSchema::build(
            "t",
            vec![int4("id"), ColumnDef::varchar("v", Some(0))],
            vec![0],
            None,
        )
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<SchemaError>(),
            Some(&SchemaError::ZeroWidth("v".into()))
        );
    }

    #[test]
    fn delimiter_width_scales_with_declared_var_caps() {
        let cases: [(Option<u32>, usize); 4] = [
            (Some(200), 1),
            (Some(60_000), 2),
            (Some(2_000_000), 3),
            (None, 2), // uncapped falls back to DEFAULT_VAR_WIDTH = 65535
        ];
        for (cap, want) in cases {
            let schema = RowSchema::build(
                "t",
                vec![int4("id"), ColumnDef::varchar("v", cap)],
                vec![0],
                None,
            )
            .unwrap();
            assert_eq!(schema.delimiter_width(), want, "cap {:?}", cap);
        }
    }

    #[test]
    fn delimiter_width_counts_cumulative_payload() {
        // Two varchar(200) columns: cumulative 400 needs 2-byte cells even
        // though each column alone would fit 1 byte.
        let schema = RowSchema::build(
            "t",
            vec![
                int4("id"),
                ColumnDef::varchar("a", Some(200)),
                ColumnDef::varchar("b", Some(200)),
            ],
            vec![0],
            None,
        )
        .unwrap();
        assert_eq!(schema.delimiter_width(), 2);
    }

    #[test]
    fn fixed_only_schema_has_no_delimiter_cells() {
        let schema = RowSchema::build("t", vec![int4("a"), int4("b")], vec![0], None).unwrap();
        assert_eq!(schema.delimiter_width(), 0);
        assert_eq!(schema.var_column_count(), 0);
    }

    #[test]
    fn max_row_size_covers_worst_case() {
        let schema = RowSchema::build(
            "t",
            vec![int4("id"), ColumnDef::varchar("v", Some(10))],
            vec![0],
            None,
        )
        .unwrap();
        // header 2 + bitmap 1 + int4 4 + cell 1 + payload 10
        assert_eq!(schema.max_row_size(), 18);
    }

    #[test]
    fn min_row_size_counts_only_required_columns() {
        let schema = RowSchema::build(
            "t",
            vec![
                int4("id").not_null(),
                ColumnDef::varchar("v", Some(10)),
                ColumnDef::varchar("w", Some(10)).not_null(),
            ],
            vec![0],
            None,
        )
        .unwrap();
        // header 2 + bitmap 1 + int4 4 + one delimiter cell for the
        // required varchar; the nullable varchar costs nothing when null
        assert_eq!(schema.min_row_size(), 8);
    }
}
