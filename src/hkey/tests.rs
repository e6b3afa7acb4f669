//! Tests for the hkey module

use super::*;
use crate::encoding::key::type_prefix;
use crate::records::SchemaId;
use crate::types::Value;

fn order_shape() -> HKeyShape {
    HKeyShape::new(vec![
        HKeySegmentShape::new(
            SchemaId(0),
            1,
            vec![HKeyColumnShape::new(SchemaId(1), 1)],
        ),
        HKeySegmentShape::new(
            SchemaId(1),
            2,
            vec![HKeyColumnShape::new(SchemaId(1), 0)],
        ),
    ])
}

#[test]
fn shape_positions_count_ordinal_slots() {
    let shape = order_shape();

    assert_eq!(shape.segment_count(), 2);
    assert_eq!(shape.column_count(), 2);
    assert_eq!(shape.position_count(), 4);

    assert_eq!(shape.ordinal_position(0), Some(0));
    assert_eq!(shape.column_position(0, 0), Some(1));
    assert_eq!(shape.ordinal_position(1), Some(2));
    assert_eq!(shape.column_position(1, 0), Some(3));

    assert_eq!(shape.ordinal_position(2), None);
    assert_eq!(shape.column_position(0, 1), None);
}

#[test]
fn shape_slot_at_inverts_position_math() {
    let shape = order_shape();

    assert_eq!(shape.slot_at(0), Some(HKeySlot::Ordinal { segment: 0 }));
    assert_eq!(
        shape.slot_at(1),
        Some(HKeySlot::Column {
            segment: 0,
            column: 0
        })
    );
    assert_eq!(shape.slot_at(2), Some(HKeySlot::Ordinal { segment: 1 }));
    assert_eq!(
        shape.slot_at(3),
        Some(HKeySlot::Column {
            segment: 1,
            column: 0
        })
    );
    assert_eq!(shape.slot_at(4), None);
}

#[test]
fn shape_with_multi_column_segment() {
    let shape = HKeyShape::new(vec![HKeySegmentShape::new(
        SchemaId(0),
        1,
        vec![
            HKeyColumnShape::new(SchemaId(0), 0),
            HKeyColumnShape::new(SchemaId(0), 1),
            HKeyColumnShape::new(SchemaId(0), 2),
        ],
    )]);

    assert_eq!(shape.position_count(), 4);
    assert_eq!(shape.column_position(0, 2), Some(3));
    assert_eq!(
        shape.slot_at(2),
        Some(HKeySlot::Column {
            segment: 0,
            column: 1
        })
    );
    assert_eq!(shape.leaf_table(), Some(SchemaId(0)));
}

#[test]
fn hkey_single_segment_encodes_ordinal_then_value() {
    let hkey = HKey::from_segments([HKeySegment::with_values(1, [Value::Int(5)])]);
    let encoded = hkey.encode();

    assert_eq!(
        encoded,
        vec![0x01, type_prefix::POS_INT, 0, 0, 0, 0, 0, 0, 0, 5]
    );
}

#[test]
fn parent_encoding_is_prefix_of_child_encoding() {
    let parent = HKey::from_segments([HKeySegment::with_values(1, [Value::Int(5)])]);
    let child = HKey::from_segments([
        HKeySegment::with_values(1, [Value::Int(5)]),
        HKeySegment::with_values(2, [Value::Int(10)]),
    ]);

    let parent_key = parent.encode();
    let child_key = child.encode();
    assert!(child_key.starts_with(&parent_key));
    assert!(child_key.len() > parent_key.len());
}

#[test]
fn encoded_hkeys_order_by_tree_position() {
    let c1 = HKey::from_segments([HKeySegment::with_values(1, [Value::Int(1)])]);
    let c1_o10 = HKey::from_segments([
        HKeySegment::with_values(1, [Value::Int(1)]),
        HKeySegment::with_values(2, [Value::Int(10)]),
    ]);
    let c1_o11 = HKey::from_segments([
        HKeySegment::with_values(1, [Value::Int(1)]),
        HKeySegment::with_values(2, [Value::Int(11)]),
    ]);
    let c2 = HKey::from_segments([HKeySegment::with_values(1, [Value::Int(2)])]);

    let keys = [c1.encode(), c1_o10.encode(), c1_o11.encode(), c2.encode()];
    for window in keys.windows(2) {
        assert!(window[0] < window[1], "{:?} !< {:?}", window[0], window[1]);
    }
}

#[test]
fn subtree_upper_bound_covers_descendants_only() {
    let c1 = HKey::from_segments([HKeySegment::with_values(1, [Value::Int(1)])]);
    let child = HKey::from_segments([
        HKeySegment::with_values(1, [Value::Int(1)]),
        HKeySegment::with_values(2, [Value::Int(9999)]),
    ]);
    let grandchild = HKey::from_segments([
        HKeySegment::with_values(1, [Value::Int(1)]),
        HKeySegment::with_values(2, [Value::Int(9999)]),
        HKeySegment::with_values(3, [Value::from("zz")]),
    ]);
    let sibling = HKey::from_segments([HKeySegment::with_values(1, [Value::Int(2)])]);

    let start = c1.encode();
    let end = c1.subtree_upper_bound();

    assert!(start < end);
    assert!(child.encode() > start && child.encode() < end);
    assert!(grandchild.encode() > start && grandchild.encode() < end);
    assert!(sibling.encode() >= end);
}

#[test]
fn multi_column_segment_orders_column_by_column() {
    let a = HKey::from_segments([HKeySegment::with_values(
        1,
        [Value::Int(1), Value::from("apple")],
    )]);
    let b = HKey::from_segments([HKeySegment::with_values(
        1,
        [Value::Int(1), Value::from("banana")],
    )]);
    let c = HKey::from_segments([HKeySegment::with_values(
        1,
        [Value::Int(2), Value::from("apple")],
    )]);

    assert!(a.encode() < b.encode());
    assert!(b.encode() < c.encode());
}

#[test]
fn incremental_construction_matches_from_segments() {
    let mut built = HKey::new();
    built.begin_segment(1);
    built.push_value(Value::Int(7)).unwrap();
    built.begin_segment(2);
    built.push_value(Value::from("x")).unwrap();

    let direct = HKey::from_segments([
        HKeySegment::with_values(1, [Value::Int(7)]),
        HKeySegment::with_values(2, [Value::from("x")]),
    ]);

    assert_eq!(built, direct);
    assert_eq!(built.encode(), direct.encode());
}

#[test]
fn push_value_without_segment_fails() {
    let mut hkey = HKey::new();
    let err = hkey.push_value(Value::Int(1)).unwrap_err();
    assert!(err.to_string().contains("before any segment"));
}

#[test]
fn value_at_position_skips_ordinal_slots() {
    let hkey = HKey::from_segments([
        HKeySegment::with_values(1, [Value::Int(5)]),
        HKeySegment::with_values(2, [Value::Int(10), Value::from("t")]),
    ]);

    assert_eq!(hkey.value_at_position(0), None);
    assert_eq!(hkey.value_at_position(1), Some(&Value::Int(5)));
    assert_eq!(hkey.value_at_position(2), None);
    assert_eq!(hkey.value_at_position(3), Some(&Value::Int(10)));
    assert_eq!(hkey.value_at_position(4), Some(&Value::from("t")));
    assert_eq!(hkey.value_at_position(5), None);

    assert_eq!(hkey.ordinal_at(0), Some(1));
    assert_eq!(hkey.ordinal_at(1), Some(2));
    assert_eq!(hkey.value_at(1, 1), Some(&Value::from("t")));
}

#[test]
fn null_key_value_sorts_before_any_real_value() {
    let null_key = HKey::from_segments([HKeySegment::with_values(1, [Value::Null])]);
    let zero_key = HKey::from_segments([HKeySegment::with_values(1, [Value::Int(0)])]);
    let neg_key = HKey::from_segments([HKeySegment::with_values(1, [Value::Int(i64::MIN)])]);

    assert!(null_key.encode() < neg_key.encode());
    assert!(neg_key.encode() < zero_key.encode());
}
