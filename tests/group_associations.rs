//! # Group Association Integration
//!
//! Drives a three-level group end to end through the public API:
//!
//! - hkeys built from stored row images via the registry's derived shapes
//! - the clustering order and prefix property of encoded hkeys
//! - index entries assembled per the row composition and hkeys rebuilt
//!   from those entries alone

use grouptree::{
    ColumnDef, DataType, HKey, HKeySegment, IndexDef, IndexSource, Registry, RowView, SchemaId,
    TableDef, Value,
};

/// customer(cid, name) <- order(oid, cid, total) <- item(iid, oid, qty)
fn shop_registry() -> (Registry, SchemaId, SchemaId, SchemaId) {
    let mut reg = Registry::new();
    let c = reg
        .register(
            TableDef::new(
                "customer",
                vec![
                    ColumnDef::new("cid", DataType::Int8).not_null(),
                    ColumnDef::varchar("name", Some(64)),
                ],
            )
            .with_primary_key(vec!["cid"]),
        )
        .unwrap();
    let o = reg
        .register(
            TableDef::new(
                "order",
                vec![
                    ColumnDef::new("oid", DataType::Int8).not_null(),
                    ColumnDef::new("cid", DataType::Int8).not_null(),
                    ColumnDef::new("total", DataType::Int4),
                ],
            )
            .with_primary_key(vec!["oid"])
            .with_parent("customer", vec!["cid"]),
        )
        .unwrap();
    let i = reg
        .register(
            TableDef::new(
                "item",
                vec![
                    ColumnDef::new("iid", DataType::Int8).not_null(),
                    ColumnDef::new("oid", DataType::Int8).not_null(),
                    ColumnDef::new("qty", DataType::Int4),
                ],
            )
            .with_primary_key(vec!["iid"])
            .with_parent("order", vec!["oid"]),
        )
        .unwrap();
    (reg, c, o, i)
}

fn hkey_of<'a>(ordinals: &[(u8, i64)]) -> HKey<'a> {
    HKey::from_segments(
        ordinals
            .iter()
            .map(|&(ordinal, v)| HKeySegment::with_values(ordinal, [Value::Int(v)])),
    )
}

/// Rebuilds `leaf`'s hkey from the flattened branch values, the way a
/// write path would before storing a row.
fn hkey_from_flattened<'a>(
    reg: &Registry,
    leaf: SchemaId,
    flattened: &[Value<'a>],
) -> HKey<'a> {
    let shape = reg.hkey_shape(leaf).unwrap();
    let path = reg.ancestor_path(leaf).unwrap();
    let mut hkey = HKey::new();
    for seg in shape.segments() {
        hkey.begin_segment(seg.ordinal());
        for col in seg.columns() {
            let pos = reg
                .flattened_position(&path, col.source_table(), col.source_column())
                .unwrap()
                .unwrap();
            hkey.push_value(flattened[pos].clone()).unwrap();
        }
    }
    hkey
}

/// Builds one index entry from the flattened branch row and the stored
/// hkey, per the index's row composition.
fn assemble_entry<'a>(idx: &IndexDef, flattened: &[Value<'a>], hkey: &HKey<'a>) -> Vec<Value<'a>> {
    idx.row_composition()
        .sources()
        .iter()
        .map(|source| match *source {
            IndexSource::Field(pos) => flattened[pos].clone(),
            IndexSource::HKey(pos) => hkey.value_at_position(pos).unwrap().clone(),
        })
        .collect()
}

mod clustering_tests {
    use super::*;

    #[test]
    fn encoded_hkeys_interleave_children_under_parents() {
        let (reg, c, o, i) = shop_registry();
        let (c_ord, o_ord, i_ord) = (
            reg.ordinal(c).unwrap(),
            reg.ordinal(o).unwrap(),
            reg.ordinal(i).unwrap(),
        );

        let keys = [
            hkey_of(&[(c_ord, 1)]),
            hkey_of(&[(c_ord, 1), (o_ord, 10)]),
            hkey_of(&[(c_ord, 1), (o_ord, 10), (i_ord, 100)]),
            hkey_of(&[(c_ord, 1), (o_ord, 10), (i_ord, 101)]),
            hkey_of(&[(c_ord, 1), (o_ord, 11)]),
            hkey_of(&[(c_ord, 2)]),
        ];
        let encoded: Vec<Vec<u8>> = keys.iter().map(HKey::encode).collect();

        // Already in clustering order: sorting must not move anything.
        let mut sorted = encoded.clone();
        sorted.sort();
        assert_eq!(sorted, encoded);

        // A parent's key is a strict prefix of each descendant's.
        assert!(encoded[1].starts_with(&encoded[0]));
        assert!(encoded[2].starts_with(&encoded[1]));
        assert!(!encoded[5].starts_with(&encoded[0]));
    }

    #[test]
    fn subtree_bound_brackets_descendants_only() {
        let (reg, c, o, _) = shop_registry();
        let (c_ord, o_ord) = (reg.ordinal(c).unwrap(), reg.ordinal(o).unwrap());

        let customer1 = hkey_of(&[(c_ord, 1)]);
        let bound = customer1.subtree_upper_bound();

        let inside = hkey_of(&[(c_ord, 1), (o_ord, 11)]).encode();
        let after = hkey_of(&[(c_ord, 2)]).encode();
        assert!(customer1.encode() < inside);
        assert!(inside < bound);
        assert!(bound <= after);
    }

    #[test]
    fn encoded_width_stays_inside_the_registry_estimate() {
        let (reg, c, o, i) = shop_registry();
        let key = hkey_of(&[
            (reg.ordinal(c).unwrap(), i64::MIN),
            (reg.ordinal(o).unwrap(), i64::MAX),
            (reg.ordinal(i).unwrap(), -1),
        ]);
        assert!(key.encode().len() <= reg.max_hkey_width(i).unwrap());
    }
}

mod hkey_from_rows_tests {
    use super::*;

    #[test]
    fn leaf_hkey_reads_only_its_own_branch_rows() {
        let (reg, c, o, i) = shop_registry();

        let customer_img = reg
            .schema(c)
            .unwrap()
            .encode(&[Value::Int(1), Value::Text("Ada".into())])
            .unwrap();
        let order_img = reg
            .schema(o)
            .unwrap()
            .encode(&[Value::Int(10), Value::Int(1), Value::Int(250)])
            .unwrap();
        let item_img = reg
            .schema(i)
            .unwrap()
            .encode(&[Value::Int(100), Value::Int(10), Value::Int(3)])
            .unwrap();

        let c_schema = reg.schema(c).unwrap();
        let o_schema = reg.schema(o).unwrap();
        let i_schema = reg.schema(i).unwrap();
        let mut flattened = RowView::new(&customer_img, &c_schema)
            .unwrap()
            .values()
            .unwrap();
        flattened.extend(RowView::new(&order_img, &o_schema).unwrap().values().unwrap());
        flattened.extend(RowView::new(&item_img, &i_schema).unwrap().values().unwrap());

        let hkey = hkey_from_flattened(&reg, i, &flattened);
        assert_eq!(
            hkey,
            hkey_of(&[
                (reg.ordinal(c).unwrap(), 1),
                (reg.ordinal(o).unwrap(), 10),
                (reg.ordinal(i).unwrap(), 100),
            ])
        );

        // Every source sits at or below the order table: the item's hkey
        // never needs the customer row itself.
        let shape = reg.hkey_shape(i).unwrap();
        for seg in shape.segments() {
            for col in seg.columns() {
                assert_ne!(col.source_table(), c);
            }
        }
    }
}

mod index_entry_tests {
    use super::*;
    use grouptree::IndexDefBuilder;

    #[test]
    fn table_index_entry_rebuilds_the_leaf_hkey() {
        let (reg, c, o, i) = shop_registry();
        let mut b = IndexDefBuilder::new("by_qty");
        b.add_column(i, 2, 0).unwrap();
        let idx = b.finish(&reg).unwrap();

        let flattened = vec![
            Value::Int(1),
            Value::Text("Ada".into()),
            Value::Int(10),
            Value::Int(1),
            Value::Int(250),
            Value::Int(100),
            Value::Int(10),
            Value::Int(3),
        ];
        let stored = hkey_of(&[
            (reg.ordinal(c).unwrap(), 1),
            (reg.ordinal(o).unwrap(), 10),
            (reg.ordinal(i).unwrap(), 100),
        ]);

        let entry = assemble_entry(&idx, &flattened, &stored);
        assert_eq!(entry[0], Value::Int(3));

        let rebuilt = idx.to_hkey().reconstruct_hkey(&entry).unwrap();
        assert_eq!(rebuilt, stored);
        assert_eq!(rebuilt.encode(), stored.encode());
    }

    #[test]
    fn group_index_entry_rebuilds_the_order_hkey() {
        let (reg, c, o, _) = shop_registry();
        let mut b = IndexDefBuilder::new("name_total");
        b.add_column(c, 1, 0).unwrap();
        b.add_column(o, 2, 1).unwrap();
        let idx = b.finish(&reg).unwrap();
        assert!(!idx.is_table_index());

        let flattened = vec![
            Value::Int(1),
            Value::Text("Ada".into()),
            Value::Int(10),
            Value::Int(1),
            Value::Int(250),
        ];
        let stored = hkey_of(&[(reg.ordinal(c).unwrap(), 1), (reg.ordinal(o).unwrap(), 10)]);

        let entry = assemble_entry(&idx, &flattened, &stored);
        assert_eq!(entry[0], Value::Text("Ada".into()));

        let rebuilt = idx.to_hkey().reconstruct_hkey(&entry).unwrap();
        assert_eq!(rebuilt, stored);
    }

    #[test]
    fn primary_key_entries_cover_every_table_of_the_group() {
        let (reg, c, o, i) = shop_registry();
        for (id, depth) in [(c, 1), (o, 2), (i, 3)] {
            let idx = reg.primary_key_index(id).unwrap();
            let ordinals = idx
                .to_hkey()
                .steps()
                .iter()
                .filter(|s| matches!(s, grouptree::HKeyBuildStep::Ordinal(_)))
                .count();
            assert_eq!(ordinals, depth, "{} pk should emit {depth} ordinals", idx.tree_id());
        }
    }
}
