//! # Schema Registry
//!
//! The registry assembles tables into groups and publishes immutable
//! [`RowSchema`] versions. Registration resolves a [`TableDef`]'s names
//! (primary key, parent join) into column indices and schema ids, validates
//! the join against the parent's primary key, and derives the state every
//! later stage consumes:
//!
//! | Derived      | Meaning                                                |
//! |--------------|--------------------------------------------------------|
//! | storage tree | every group member stores under the root table's tree  |
//! | ordinal      | 1-byte segment tag in encoded hkeys, unique per tree   |
//! | hkey shape   | per-table segment layout with re-rooted source columns |
//!
//! Schemas live in an arena indexed by [`SchemaId`]; tables reference each
//! other only through ids, so a published schema never holds a pointer that
//! DDL could invalidate. Superseding a table allocates a fresh id and
//! repoints the name while the predecessor stays resolvable by id for rows
//! already written under it; the new version keeps the predecessor's
//! ordinal so those rows keep their place in the tree.

use std::sync::Arc;

use eyre::{eyre, Result};
use hashbrown::HashMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::config::{FIRST_ORDINAL, MAX_ORDINAL};
use crate::encoding::key::max_encoded_width;
use crate::error::{AssociationError, SchemaError};
use crate::hkey::{HKeyColumnShape, HKeySegmentShape, HKeyShape};
use crate::index::{IndexDef, IndexDefBuilder};
use crate::records::{ParentLink, RowSchema, SchemaId};
use crate::schema::table::TableDef;

#[derive(Debug, Default)]
pub struct Registry {
    /// Arena of published schema versions; `SchemaId` is the index.
    schemas: Vec<Arc<RowSchema>>,
    /// Hkey shape per published version, same index as `schemas`.
    shapes: Vec<Arc<HKeyShape>>,
    /// Ordinal per published version, same index as `schemas`.
    ordinals: Vec<u8>,
    /// Current version per table name.
    by_name: HashMap<String, SchemaId>,
    /// Next unassigned ordinal, keyed by the group root's current id.
    next_ordinal: HashMap<SchemaId, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of published schema versions, superseded ones included.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Publishes a new table. The name must not already be registered.
    pub fn register(&mut self, def: TableDef) -> Result<SchemaId> {
        if self.by_name.contains_key(def.name()) {
            return Err(SchemaError::DuplicateTable(def.name().to_string()).into());
        }
        self.publish(def, None)
    }

    /// Publishes a new version of an existing table under a fresh id.
    ///
    /// The predecessor stays resolvable by id and keeps its ordinal; the
    /// new version inherits that ordinal so rows written under either
    /// version land in the same place in the storage tree.
    pub fn supersede(&mut self, def: TableDef) -> Result<SchemaId> {
        let old = *self
            .by_name
            .get(def.name())
            .ok_or_else(|| SchemaError::UnknownTable(def.name().to_string()))?;
        self.publish(def, Some(old))
    }

    fn publish(&mut self, def: TableDef, supersedes: Option<SchemaId>) -> Result<SchemaId> {
        let (name, columns, primary_key, parent) = def.into_parts();

        let mut pk_indices = Vec::with_capacity(primary_key.len());
        for col_name in &primary_key {
            let idx = columns
                .iter()
                .position(|c| c.name() == col_name)
                .ok_or_else(|| SchemaError::UnknownColumn(col_name.clone()))?;
            pk_indices.push(idx);
        }

        let parent_link = match parent {
            None => None,
            Some(join) => {
                let parent_id = *self
                    .by_name
                    .get(join.parent())
                    .ok_or_else(|| SchemaError::UnknownTable(join.parent().to_string()))?;
                let parent_schema = self.require(parent_id)?.clone();
                if join.join_columns().len() != parent_schema.primary_key().len() {
                    return Err(SchemaError::JoinArityMismatch {
                        child: name,
                        parent: parent_schema.name().to_string(),
                        child_cols: join.join_columns().len(),
                        parent_cols: parent_schema.primary_key().len(),
                    }
                    .into());
                }
                let mut join_indices = Vec::with_capacity(join.join_columns().len());
                for (j, col_name) in join.join_columns().iter().enumerate() {
                    let idx = columns
                        .iter()
                        .position(|c| c.name() == col_name)
                        .ok_or_else(|| SchemaError::UnknownColumn(col_name.clone()))?;
                    let child_col = &columns[idx];
                    let parent_col = &parent_schema.columns()[parent_schema.primary_key()[j]];
                    if child_col.data_type() != parent_col.data_type() {
                        return Err(SchemaError::JoinTypeMismatch {
                            child_col: child_col.name().to_string(),
                            child_type: child_col.data_type().to_string(),
                            parent_col: parent_col.name().to_string(),
                            parent_type: parent_col.data_type().to_string(),
                        }
                        .into());
                    }
                    join_indices.push(idx);
                }
                Some(ParentLink {
                    parent: parent_id,
                    join_columns: join_indices,
                })
            }
        };

        let mut schema = RowSchema::build(name, columns, pk_indices, parent_link)?;
        let id = SchemaId(self.schemas.len() as u32);
        schema.set_schema_id(id);

        // Group members store under the root table's tree.
        let root = match schema.parent() {
            None => id,
            Some(link) => self.group_root(link.parent)?,
        };
        if root != id {
            let tree = self.require(root)?.storage_tree().to_string();
            schema.set_storage_tree(tree);
        }

        let ordinal = match supersedes {
            Some(old) => self.ordinal(old)?,
            None => {
                let raw = self.next_ordinal.get(&root).copied().unwrap_or(FIRST_ORDINAL);
                if raw > MAX_ORDINAL {
                    let group = self.require(root).map_or_else(
                        |_| schema.name().to_string(),
                        |s| s.name().to_string(),
                    );
                    return Err(AssociationError::OrdinalOverflow(group, MAX_ORDINAL).into());
                }
                raw as u8
            }
        };

        // Last fallible step. Nothing is mutated until the shape is in
        // hand, so an error leaves the parallel arenas aligned.
        let shape = self.derive_shape(&schema, id, ordinal)?;

        match supersedes {
            None => {
                self.next_ordinal.insert(root, ordinal as usize + 1);
            }
            // A superseded group root hands its ordinal counter to the
            // new version; future children attach through the current
            // name.
            Some(old) => {
                if let Some(counter) = self.next_ordinal.remove(&old) {
                    self.next_ordinal.insert(id, counter);
                }
            }
        }

        let name = schema.name().to_string();
        self.by_name.insert(name.clone(), id);
        self.ordinals.push(ordinal);
        self.schemas.push(Arc::new(schema));
        self.shapes.push(Arc::new(shape));

        debug!(table = %name, id = %id, ordinal, "published table version");
        Ok(id)
    }

    /// Resolves a published version by id, superseded ones included.
    pub fn schema(&self, id: SchemaId) -> Result<Arc<RowSchema>> {
        Ok(Arc::clone(self.require(id)?))
    }

    /// Resolves the current version of a table by name.
    pub fn schema_by_name(&self, name: &str) -> Option<Arc<RowSchema>> {
        let id = *self.by_name.get(name)?;
        self.schemas.get(id.0 as usize).cloned()
    }

    /// Current id of a table name.
    pub fn id_of(&self, name: &str) -> Option<SchemaId> {
        self.by_name.get(name).copied()
    }

    /// Ordinal of one table version within its storage tree.
    pub fn ordinal(&self, id: SchemaId) -> Result<u8> {
        let schema = self.require(id)?;
        self.ordinals
            .get(id.0 as usize)
            .copied()
            .ok_or_else(|| AssociationError::MissingOrdinal(schema.name().to_string()).into())
    }

    /// Root of the group containing `id`, as its current version.
    pub fn group_root(&self, id: SchemaId) -> Result<SchemaId> {
        // Parents are always published before children, so ids strictly
        // decrease along the walk and it terminates.
        let mut cur = id;
        loop {
            let schema = self.require(cur)?;
            match schema.parent() {
                None => {
                    // Stored parent links can reach a superseded root
                    // version; the group is headed by the current one.
                    return Ok(self.by_name.get(schema.name()).copied().unwrap_or(cur));
                }
                Some(link) => cur = link.parent,
            }
        }
    }

    /// Tables from the group root down to `id`, inclusive.
    pub fn ancestor_path(&self, id: SchemaId) -> Result<Vec<SchemaId>> {
        let mut path = vec![id];
        let mut cur = id;
        while let Some(link) = self.require(cur)?.parent() {
            cur = link.parent;
            path.push(cur);
        }
        path.reverse();
        Ok(path)
    }

    /// Current members of the group rooted at `root`, in ordinal order.
    pub fn group_tables(&self, root: SchemaId) -> Result<Vec<SchemaId>> {
        let mut members = Vec::new();
        for &id in self.by_name.values() {
            if self.group_root(id)? == root {
                members.push(id);
            }
        }
        members.sort_by_key(|&id| self.ordinals.get(id.0 as usize).copied());
        Ok(members)
    }

    /// Hkey shape of one table version.
    pub fn hkey_shape(&self, id: SchemaId) -> Result<Arc<HKeyShape>> {
        self.require(id)?;
        self.shapes
            .get(id.0 as usize)
            .cloned()
            .ok_or_else(|| eyre!("no hkey shape derived for schema id {id}"))
    }

    /// Position of `(table, column)` in the flattened row formed by
    /// concatenating the columns of the tables along `path`, root first.
    /// `None` when the table is not on the path.
    pub fn flattened_position(
        &self,
        path: &[SchemaId],
        table: SchemaId,
        column: usize,
    ) -> Result<Option<usize>> {
        let mut base = 0;
        for &tid in path {
            if tid == table {
                return Ok(Some(base + column));
            }
            base += self.require(tid)?.column_count();
        }
        Ok(None)
    }

    /// Total column count of the flattened row of `leaf`'s ancestor path.
    pub fn flattened_column_count(&self, leaf: SchemaId) -> Result<usize> {
        let mut total = 0;
        for tid in self.ancestor_path(leaf)? {
            total += self.require(tid)?.column_count();
        }
        Ok(total)
    }

    /// Upper bound on the encoded hkey width of one `table` row: one
    /// ordinal byte per segment plus each source column's worst-case key
    /// encoding.
    pub fn max_hkey_width(&self, table: SchemaId) -> Result<usize> {
        let shape = self.hkey_shape(table)?;
        let mut width = 0;
        for seg in shape.segments() {
            width += 1;
            for col in seg.columns() {
                let schema = self.require(col.source_table())?;
                let def = schema.column(col.source_column()).ok_or_else(|| {
                    eyre!(
                        "hkey source column {} is out of range for '{}'",
                        col.source_column(),
                        schema.name()
                    )
                })?;
                width += max_encoded_width(def);
            }
        }
        Ok(width)
    }

    /// Synthesizes the primary-key index descriptor for `table`: unique,
    /// one key column per primary-key column in declared order, stored
    /// under the conventional `<table>$pk` tree.
    pub fn primary_key_index(&self, table: SchemaId) -> Result<IndexDef> {
        let schema = self.require(table)?.clone();
        let mut builder = IndexDefBuilder::new("pk").primary_key();
        for (pos, &col) in schema.primary_key().iter().enumerate() {
            builder.add_column(table, col, pos)?;
        }
        builder.finish(self)
    }

    fn require(&self, id: SchemaId) -> Result<&Arc<RowSchema>> {
        self.schemas
            .get(id.0 as usize)
            .ok_or_else(|| eyre!("schema id {id} is not in this registry"))
    }

    /// Builds the hkey shape of a table about to be published as `id`.
    ///
    /// Each segment starts with the segment table's own primary key as its
    /// sources, then parent/child pairs are walked root-to-leaf: wherever a
    /// segment still draws a column from the pair's parent primary key, the
    /// source is redirected to the child's matching join column. Cascading
    /// down the path leaves every source at the deepest table the value
    /// propagates to, which is the table a stored row of `id` can actually
    /// serve it from.
    ///
    /// `schema` is not in the arena yet; only its ancestors are resolved
    /// through the registry.
    fn derive_shape(&self, schema: &RowSchema, id: SchemaId, ordinal: u8) -> Result<HKeyShape> {
        let mut path = match schema.parent() {
            None => Vec::new(),
            Some(link) => self.ancestor_path(link.parent)?,
        };
        path.push(id);

        let mut segments = Vec::with_capacity(path.len());
        for &tid in &path {
            let (table, seg_ordinal) = if tid == id {
                (schema, ordinal)
            } else {
                (self.require(tid)?.as_ref(), self.ordinal(tid)?)
            };
            let columns = table
                .primary_key()
                .iter()
                .map(|&c| HKeyColumnShape::new(tid, c))
                .collect();
            segments.push(HKeySegmentShape::new(tid, seg_ordinal, columns));
        }
        let mut shape = HKeyShape::new(segments);

        for pair in 1..path.len() {
            let child_id = path[pair];
            let link = if child_id == id {
                schema.parent().cloned()
            } else {
                self.require(child_id)?.parent().cloned()
            };
            if let Some(link) = link {
                let parent_schema = self.require(link.parent)?;
                for (j, &join_col) in link.join_columns.iter().enumerate() {
                    let parent_pk_col = parent_schema.primary_key()[j];
                    for seg in shape.segments_mut() {
                        for col in seg.columns_mut() {
                            if col.source_table() == link.parent
                                && col.source_column() == parent_pk_col
                            {
                                col.reroot(child_id, join_col);
                            }
                        }
                    }
                }
            }
        }
        Ok(shape)
    }
}

/// Clonable handle sharing one registry behind a read-write lock.
///
/// Lookups take the read side; DDL takes the write side. Schemas and
/// shapes come out as `Arc`s, so a caller may drop the guard and keep
/// using them while later DDL publishes new versions.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<Registry>>,
}

impl SharedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.inner.write()
    }
}
