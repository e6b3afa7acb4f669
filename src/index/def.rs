//! # Index Definitions
//!
//! [`IndexDefBuilder`] accumulates key columns, each naming a table, a
//! column, and a declared position; [`IndexDefBuilder::finish`] freezes the
//! set against a registry and derives everything the frozen [`IndexDef`]
//! carries: the spanned branch, the storage tree id, the
//! [`IndexRowComposition`], and the [`IndexToHKey`] recipe.
//!
//! ## Column protocol
//!
//! Columns may be added in any order; `freeze_columns` stable-sorts them by
//! declared position, once, permanently. `finish` freezes implicitly. After
//! either, `add_column` fails with [`IndexError::Frozen`]. A builder and a
//! frozen descriptor are distinct types, so a frozen index cannot be
//! mutated by construction.
//!
//! ## Table span
//!
//! Key columns may come from several tables of one group as long as all of
//! them sit on one root-to-leaf branch. The deepest key table is the
//! index's `table` (leafmost), the shallowest is the rootmost, and the
//! branch slice between them is the spanned range; `is_table_index()` is
//! exactly `rootmost == leafmost`. The index row appends, after the key,
//! whatever hkey source columns the key does not already carry, so one
//! index entry always rebuilds the leaf's full hkey without another
//! lookup.

use eyre::{eyre, Result};
use hashbrown::HashMap;
use tracing::debug;

use crate::encoding::max_encoded_width;
use crate::error::{AssociationError, IndexError};
use crate::index::associations::{HKeyBuildStep, IndexRowComposition, IndexSource, IndexToHKey};
use crate::records::SchemaId;
use crate::schema::Registry;

/// One column of an index row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexColumn {
    table: SchemaId,
    column: usize,
    position: usize,
}

impl IndexColumn {
    pub fn table(&self) -> SchemaId {
        self.table
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Position of this column within the index row. Key columns take
    /// 0..key_count at freeze; covering value columns continue the
    /// numbering.
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Accumulates an index declaration until [`finish`](Self::finish)
/// produces the frozen [`IndexDef`].
#[derive(Debug, Clone)]
pub struct IndexDefBuilder {
    name: String,
    index_id: u32,
    unique: bool,
    primary_key: bool,
    key_columns: Vec<IndexColumn>,
    frozen: bool,
}

impl IndexDefBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index_id: 0,
            unique: false,
            primary_key: false,
            key_columns: Vec::new(),
            frozen: false,
        }
    }

    pub fn with_id(mut self, index_id: u32) -> Self {
        self.index_id = index_id;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks this as the table's primary-key index. Implies unique.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.unique = true;
        self
    }

    /// Declares a key column: `column` of `table` at the declared
    /// `position` within the key. Order of calls does not matter; the key
    /// is sorted at freeze.
    pub fn add_column(&mut self, table: SchemaId, column: usize, position: usize) -> Result<()> {
        if self.frozen {
            return Err(IndexError::Frozen(self.name.clone()).into());
        }
        self.key_columns.push(IndexColumn {
            table,
            column,
            position,
        });
        Ok(())
    }

    /// Freezes the key column set: stable sort by declared position.
    /// Idempotent and permanent.
    pub fn freeze_columns(&mut self) {
        if !self.frozen {
            self.frozen = true;
            self.key_columns.sort_by_key(|c| c.position);
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freezes the key and derives the frozen descriptor: resolves the
    /// spanned branch, maps every key column to its flattened field,
    /// then walks the leaf table's hkey shape emitting one ordinal per
    /// segment and sourcing every hkey column from the index row,
    /// appending covering value columns for anything the key does not
    /// already carry.
    pub fn finish(mut self, registry: &Registry) -> Result<IndexDef> {
        self.freeze_columns();

        if self.key_columns.is_empty() {
            return Err(IndexError::EmptyKey(self.name).into());
        }

        // The deepest key table is the leafmost; every other key table
        // must be one of its ancestors.
        let mut leafmost = self.key_columns[0].table;
        let mut leaf_path = registry.ancestor_path(leafmost)?;
        for col in &self.key_columns[1..] {
            let path = registry.ancestor_path(col.table)?;
            if path.len() > leaf_path.len() {
                leafmost = col.table;
                leaf_path = path;
            }
        }

        let mut rootmost_depth = leaf_path.len() - 1;
        for (i, col) in self.key_columns.iter().enumerate() {
            let schema = registry.schema(col.table)?;
            if schema.column(col.column).is_none() {
                return Err(IndexError::UnknownColumn {
                    index: self.name,
                    table: schema.name().to_string(),
                    column: col.column,
                }
                .into());
            }
            match leaf_path.iter().position(|&t| t == col.table) {
                Some(depth) => rootmost_depth = rootmost_depth.min(depth),
                None => {
                    return Err(IndexError::TableOffBranch {
                        index: self.name,
                        table: schema.name().to_string(),
                    }
                    .into());
                }
            }
            if self.key_columns[..i]
                .iter()
                .any(|c| c.table == col.table && c.column == col.column)
            {
                let column = schema
                    .column(col.column)
                    .map(|c| c.name().to_string())
                    .unwrap_or_else(|| col.column.to_string());
                return Err(IndexError::DuplicateColumn {
                    index: self.name,
                    column,
                }
                .into());
            }
        }
        let rootmost = leaf_path[rootmost_depth];
        let spanned = &leaf_path[rootmost_depth..];

        // Key positions become final index-row positions.
        for (i, col) in self.key_columns.iter_mut().enumerate() {
            col.position = i;
        }

        let mut sources = Vec::with_capacity(self.key_columns.len());
        let mut by_source: HashMap<(SchemaId, usize), usize> = HashMap::new();
        let mut key_width_estimate = 0;
        for col in &self.key_columns {
            let flat = registry
                .flattened_position(&leaf_path, col.table, col.column)?
                .ok_or_else(|| eyre!("key column table {} fell off the branch", col.table))?;
            sources.push(IndexSource::Field(flat));
            by_source.insert((col.table, col.column), col.position);
            let schema = registry.schema(col.table)?;
            if let Some(def) = schema.column(col.column) {
                key_width_estimate += max_encoded_width(def);
            }
        }

        let shape = registry.hkey_shape(leafmost)?;
        let mut steps = Vec::with_capacity(shape.segment_count() + shape.column_count());
        let mut value_columns: Vec<IndexColumn> = Vec::new();
        for (seg_idx, seg) in shape.segments().iter().enumerate() {
            let ordinal = registry.ordinal(seg.table())?;
            steps.push(HKeyBuildStep::Ordinal(ordinal));

            for (col_idx, col) in seg.columns().iter().enumerate() {
                let source = (col.source_table(), col.source_column());
                let field_position = if spanned.contains(&col.source_table()) {
                    registry.flattened_position(
                        &leaf_path,
                        col.source_table(),
                        col.source_column(),
                    )?
                } else {
                    None
                };

                let index_position = match by_source.get(&source).copied() {
                    Some(pos) => pos,
                    None => {
                        let row_source = match field_position {
                            Some(flat) => IndexSource::Field(flat),
                            None => {
                                // The value rides in the hkey. A group
                                // root serving it would mean the shape
                                // never re-rooted its key through the
                                // mandatory group join.
                                let source_schema = registry.schema(col.source_table())?;
                                if source_schema.is_root() {
                                    return Err(AssociationError::RootHKeySource {
                                        table: source_schema.name().to_string(),
                                        column: source_schema
                                            .column(col.source_column())
                                            .map(|c| c.name().to_string())
                                            .unwrap_or_else(|| col.source_column().to_string()),
                                    }
                                    .into());
                                }
                                let hkey_pos =
                                    shape.column_position(seg_idx, col_idx).ok_or_else(|| {
                                        eyre!(
                                            "hkey shape of {leafmost} has no column {col_idx} in segment {seg_idx}"
                                        )
                                    })?;
                                IndexSource::HKey(hkey_pos)
                            }
                        };
                        let pos = self.key_columns.len() + value_columns.len();
                        value_columns.push(IndexColumn {
                            table: col.source_table(),
                            column: col.source_column(),
                            position: pos,
                        });
                        sources.push(row_source);
                        by_source.insert(source, pos);
                        pos
                    }
                };
                steps.push(HKeyBuildStep::Column {
                    index_position,
                    field_position,
                });
            }
        }

        let leaf_schema = registry.schema(leafmost)?;
        let tree_id = format!("{}${}", leaf_schema.name(), self.name);
        debug!(
            index = %self.name,
            tree = %tree_id,
            key_columns = self.key_columns.len(),
            value_columns = value_columns.len(),
            "froze index"
        );

        Ok(IndexDef {
            name: self.name,
            index_id: self.index_id,
            table: leafmost,
            rootmost,
            key_columns: self.key_columns,
            value_columns,
            row_composition: IndexRowComposition::new(sources),
            to_hkey: IndexToHKey::new(steps),
            is_unique: self.unique,
            is_primary_key: self.primary_key,
            tree_id,
            key_width_estimate,
        })
    }
}

/// A frozen index descriptor.
///
/// Everything here is derived at [`IndexDefBuilder::finish`] and immutable
/// afterwards; share it as an `Arc` across readers.
#[derive(Debug, Clone)]
pub struct IndexDef {
    name: String,
    index_id: u32,
    table: SchemaId,
    rootmost: SchemaId,
    key_columns: Vec<IndexColumn>,
    value_columns: Vec<IndexColumn>,
    row_composition: IndexRowComposition,
    to_hkey: IndexToHKey,
    is_unique: bool,
    is_primary_key: bool,
    tree_id: String,
    key_width_estimate: usize,
}

impl IndexDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index_id(&self) -> u32 {
        self.index_id
    }

    /// The leafmost spanned table; the index's hkey recipe rebuilds this
    /// table's hkey.
    pub fn table(&self) -> SchemaId {
        self.table
    }

    /// The shallowest spanned table.
    pub fn rootmost_table(&self) -> SchemaId {
        self.rootmost
    }

    /// True when the index spans a single table.
    pub fn is_table_index(&self) -> bool {
        self.rootmost == self.table
    }

    pub fn key_columns(&self) -> &[IndexColumn] {
        &self.key_columns
    }

    /// Covering columns appended after the key to complete the hkey.
    pub fn value_columns(&self) -> &[IndexColumn] {
        &self.value_columns
    }

    /// Total positions in one index row: key then value columns.
    pub fn row_width(&self) -> usize {
        self.key_columns.len() + self.value_columns.len()
    }

    pub fn row_composition(&self) -> &IndexRowComposition {
        &self.row_composition
    }

    pub fn to_hkey(&self) -> &IndexToHKey {
        &self.to_hkey
    }

    pub fn is_unique(&self) -> bool {
        self.is_unique
    }

    pub fn is_primary_key(&self) -> bool {
        self.is_primary_key
    }

    /// Name of the tree this index stores under, `<table>$<index>`.
    pub fn tree_id(&self) -> &str {
        &self.tree_id
    }

    /// Worst-case encoded width of one key, for the external cost model.
    pub fn key_width_estimate(&self) -> usize {
        self.key_width_estimate
    }
}
