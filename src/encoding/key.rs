//! # Big-Endian Key Encoding for Hierarchical Keys
//!
//! This module provides byte-comparable key encoding for hierarchical keys
//! and index keys. All encoded keys can be compared using a single `memcmp`
//! call, enabling efficient key comparison without type-specific logic at
//! comparison time.
//!
//! ## Design Goals
//!
//! 1. **Byte-comparable**: Encoded keys preserve sort order when compared lexicographically
//! 2. **Type-aware ordering**: NULL < numbers < strings < UUIDs
//! 3. **Multi-column support**: Composite keys encode correctly for compound keys
//! 4. **Deterministic**: Same value always produces same encoding
//!
//! ## Type Prefix Scheme
//!
//! Each encoded value starts with a type prefix byte that determines sort order
//! between different types:
//!
//! ```text
//! 0x01       NULL
//! 0x10-0x19  Numbers (NEG_INFINITY < negatives < ZERO < positives < POS_INFINITY < NAN)
//! 0x20-0x21  Strings (TEXT < BLOB)
//! 0x40       UUID
//! 0xFF       MAX_KEY (sentinel for range queries)
//! ```
//!
//! Group ordinals are not values and carry no prefix: a segment of a
//! hierarchical key opens with a raw ordinal byte (1..=254), so sibling
//! tables under one parent interleave by ordinal before any field value is
//! compared. 0xFF never collides with an ordinal, which is what makes the
//! MAX_KEY sentinel a valid upper bound for whole-subtree scans.
//!
//! ## Number Encoding Strategy
//!
//! Numbers use a sign-split encoding for correct ordering:
//!
//! - Negative integers: NEG_INT prefix (0x12) + 8-byte two's complement big-endian
//! - Zero: ZERO prefix (0x14) only
//! - Positive integers: POS_INT prefix (0x16) + 8-byte big-endian magnitude
//!
//! This ensures: -∞ < -100 < -1 < 0 < 1 < 100 < +∞
//!
//! For floats, IEEE 754 bit manipulation preserves ordering:
//! - Negative floats: invert all bits (!bits)
//! - Positive floats: flip sign bit (bits ^ (1 << 63))
//!
//! Float zero (either sign) encodes as ZERO, the infinities and NaN as bare
//! prefixes, so the full float line orders correctly.
//!
//! ## Text Encoding Strategy
//!
//! Text values use escape encoding to handle embedded null bytes:
//!
//! ```text
//! 0x00 -> 0x00 0xFF  (escape null byte)
//! 0xFF -> 0xFF 0x00  (escape 0xFF byte)
//! Terminator: 0x00 0x00
//! ```
//!
//! This ensures:
//! - Embedded nulls don't terminate the string early
//! - Lexicographic order is preserved
//! - Empty strings sort before non-empty strings
//!
//! Blobs use the same escape scheme under their own prefix.
//!
//! ## Usage Example
//!
//! ```ignore
//! use grouptree::encoding::key::KeyEncoder;
//!
//! let mut encoder = KeyEncoder::new();
//!
//! // Encode a composite key (INT, TEXT)
//! encoder.encode_int(42);
//! encoder.encode_text("hello");
//!
//! let key1 = encoder.finish();
//! encoder.reset();
//!
//! encoder.encode_int(42);
//! encoder.encode_text("world");
//!
//! let key2 = encoder.finish();
//!
//! // key1 < key2 because "hello" < "world"
//! assert!(key1 < key2);
//! ```
//!
//! ## Performance Characteristics
//!
//! - Encoding: O(n) where n is the total size of values
//! - Comparison: Single memcmp, O(min(len1, len2))
//! - Memory: Encoded keys are typically 1-2 bytes larger than raw values
//!
//! ## Zero-Allocation Mode
//!
//! For hot paths, use the free `encode_*` functions with pre-allocated buffers:
//!
//! ```ignore
//! let mut buf = Vec::with_capacity(256);
//! encode_int(42, &mut buf);
//! encode_text("hello", &mut buf);
//! // buf now contains the encoded key, no allocation during encode
//! ```

use crate::types::{ColumnDef, DataType, Value};

pub mod type_prefix {
    pub const NULL: u8 = 0x01;

    pub const NEG_INFINITY: u8 = 0x10;
    pub const NEG_INT: u8 = 0x12;
    pub const NEG_FLOAT: u8 = 0x13;
    pub const ZERO: u8 = 0x14;
    pub const POS_FLOAT: u8 = 0x15;
    pub const POS_INT: u8 = 0x16;
    pub const POS_INFINITY: u8 = 0x18;
    pub const NAN: u8 = 0x19;

    pub const TEXT: u8 = 0x20;
    pub const BLOB: u8 = 0x21;

    pub const UUID: u8 = 0x40;

    pub const MAX_KEY: u8 = 0xFF;
}

const SIGN_BIT: u64 = 1 << 63;

pub fn encode_null(buf: &mut Vec<u8>) {
    buf.push(type_prefix::NULL);
}

pub fn encode_int(value: i64, buf: &mut Vec<u8>) {
    match value {
        0 => buf.push(type_prefix::ZERO),
        v if v > 0 => {
            buf.push(type_prefix::POS_INT);
            buf.extend((v as u64).to_be_bytes());
        }
        v => {
            // Big-endian two's complement orders negatives correctly
            // among themselves: -2 (…FE) < -1 (…FF).
            buf.push(type_prefix::NEG_INT);
            buf.extend((v as u64).to_be_bytes());
        }
    }
}

pub fn encode_float(value: f64, buf: &mut Vec<u8>) {
    if value == 0.0 {
        buf.push(type_prefix::ZERO);
    } else if value.is_nan() {
        buf.push(type_prefix::NAN);
    } else if value == f64::INFINITY {
        buf.push(type_prefix::POS_INFINITY);
    } else if value == f64::NEG_INFINITY {
        buf.push(type_prefix::NEG_INFINITY);
    } else if value > 0.0 {
        buf.push(type_prefix::POS_FLOAT);
        buf.extend((value.to_bits() ^ SIGN_BIT).to_be_bytes());
    } else {
        buf.push(type_prefix::NEG_FLOAT);
        buf.extend((!value.to_bits()).to_be_bytes());
    }
}

pub fn encode_text(value: &str, buf: &mut Vec<u8>) {
    buf.push(type_prefix::TEXT);
    escape_bytes(value.as_bytes(), buf);
}

pub fn encode_blob(value: &[u8], buf: &mut Vec<u8>) {
    buf.push(type_prefix::BLOB);
    escape_bytes(value, buf);
}

pub fn encode_uuid(value: &[u8; 16], buf: &mut Vec<u8>) {
    buf.push(type_prefix::UUID);
    buf.extend(value);
}

/// Appends a raw group ordinal byte.
///
/// The caller guarantees `1 <= ordinal <= MAX_ORDINAL`; the registry never
/// hands out anything else.
pub fn encode_ordinal(ordinal: u8, buf: &mut Vec<u8>) {
    buf.push(ordinal);
}

/// Appends the sentinel that sorts after every real key with this prefix.
pub fn encode_max_sentinel(buf: &mut Vec<u8>) {
    buf.push(type_prefix::MAX_KEY);
}

/// Worst-case encoded width of one column's key value.
///
/// Integer-backed and float columns cost a prefix plus eight bytes; uuids a
/// prefix plus sixteen. Text and blob payloads can double under escaping and
/// carry a two-byte terminator. Used by the optimizer-facing width
/// estimates, never for buffer safety.
pub fn max_encoded_width(col: &ColumnDef) -> usize {
    match col.data_type() {
        DataType::Uuid => 1 + 16,
        dt if dt.is_variable() => 1 + 2 * col.max_width() + 2,
        _ => 1 + 8,
    }
}

fn escape_bytes(bytes: &[u8], buf: &mut Vec<u8>) {
    for &b in bytes {
        match b {
            0x00 => buf.extend([0x00, 0xFF]),
            0xFF => buf.extend([0xFF, 0x00]),
            _ => buf.push(b),
        }
    }
    buf.extend([0x00, 0x00]);
}

/// Reusable buffer for building composite keys.
///
/// Wraps the free encoding functions with a held buffer so multi-column key
/// construction allocates once per key, not once per column.
#[derive(Debug, Default)]
pub struct KeyEncoder {
    buf: Vec<u8>,
}

impl KeyEncoder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn encode_null(&mut self) -> &mut Self {
        encode_null(&mut self.buf);
        self
    }

    pub fn encode_int(&mut self, value: i64) -> &mut Self {
        encode_int(value, &mut self.buf);
        self
    }

    pub fn encode_float(&mut self, value: f64) -> &mut Self {
        encode_float(value, &mut self.buf);
        self
    }

    pub fn encode_text(&mut self, value: &str) -> &mut Self {
        encode_text(value, &mut self.buf);
        self
    }

    pub fn encode_blob(&mut self, value: &[u8]) -> &mut Self {
        encode_blob(value, &mut self.buf);
        self
    }

    pub fn encode_uuid(&mut self, value: &[u8; 16]) -> &mut Self {
        encode_uuid(value, &mut self.buf);
        self
    }

    pub fn encode_ordinal(&mut self, ordinal: u8) -> &mut Self {
        encode_ordinal(ordinal, &mut self.buf);
        self
    }

    pub fn encode_value(&mut self, value: &Value<'_>) -> &mut Self {
        value.encode_to_key(&mut self.buf);
        self
    }

    pub fn encode_max_sentinel(&mut self) -> &mut Self {
        encode_max_sentinel(&mut self.buf);
        self
    }

    /// Returns the encoded bytes accumulated so far without consuming them.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Takes the finished key, leaving the encoder empty and reusable.
    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }

    pub fn reset(&mut self) {
        self.buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_null_produces_single_byte_0x01() {
        let mut buf = Vec::new();
        encode_null(&mut buf);
        assert_eq!(buf, vec![type_prefix::NULL]);
    }

    #[test]
    fn encode_int_zero_is_bare_prefix() {
        let mut buf = Vec::new();
        encode_int(0, &mut buf);
        assert_eq!(buf, vec![type_prefix::ZERO]);
    }

    #[test]
    fn encode_int_positive_layout() {
        let mut buf = Vec::new();
        encode_int(42, &mut buf);
        assert_eq!(buf[0], type_prefix::POS_INT);
        assert_eq!(&buf[1..], &42u64.to_be_bytes());
    }

    #[test]
    fn int_encoding_orders_across_sign() {
        let values = [i64::MIN, -100_000, -2, -1, 0, 1, 2, 100_000, i64::MAX];
        let mut encoded: Vec<Vec<u8>> = Vec::new();
        for v in values {
            let mut buf = Vec::new();
            encode_int(v, &mut buf);
            encoded.push(buf);
        }
        for pair in encoded.windows(2) {
            assert!(pair[0] < pair[1], "{:?} !< {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn float_encoding_orders_full_line() {
        let values = [
            f64::NEG_INFINITY,
            -1.0e10,
            -2.0,
            -1.0,
            -0.5,
            0.0,
            0.5,
            1.0,
            2.0,
            1.0e10,
            f64::INFINITY,
            f64::NAN,
        ];
        let mut encoded: Vec<Vec<u8>> = Vec::new();
        for v in values {
            let mut buf = Vec::new();
            encode_float(v, &mut buf);
            encoded.push(buf);
        }
        for pair in encoded.windows(2) {
            assert!(pair[0] < pair[1], "{:?} !< {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn float_negative_zero_encodes_as_zero() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        encode_float(0.0, &mut a);
        encode_float(-0.0, &mut b);
        assert_eq!(a, b);
        assert_eq!(a, vec![type_prefix::ZERO]);
    }

    #[test]
    fn text_escapes_embedded_null() {
        let mut buf = Vec::new();
        encode_text("a\0b", &mut buf);
        assert_eq!(
            buf,
            vec![type_prefix::TEXT, b'a', 0x00, 0xFF, b'b', 0x00, 0x00]
        );
    }

    #[test]
    fn blob_escapes_0xff() {
        let mut buf = Vec::new();
        encode_blob(&[0xFF], &mut buf);
        assert_eq!(buf, vec![type_prefix::BLOB, 0xFF, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn empty_text_sorts_before_nonempty() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        encode_text("", &mut a);
        encode_text("a", &mut b);
        assert!(a < b);
    }

    #[test]
    fn text_with_embedded_null_sorts_after_its_prefix() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        encode_text("a", &mut a);
        encode_text("a\0", &mut b);
        assert!(a < b);
    }

    #[test]
    fn type_prefixes_separate_kinds() {
        let mut null_key = Vec::new();
        let mut int_key = Vec::new();
        let mut text_key = Vec::new();
        let mut blob_key = Vec::new();
        let mut uuid_key = Vec::new();
        encode_null(&mut null_key);
        encode_int(i64::MAX, &mut int_key);
        encode_text("", &mut text_key);
        encode_blob(&[], &mut blob_key);
        encode_uuid(&[0u8; 16], &mut uuid_key);
        assert!(null_key < int_key);
        assert!(int_key < text_key);
        assert!(text_key < blob_key);
        assert!(blob_key < uuid_key);
    }

    #[test]
    fn max_sentinel_sorts_after_ordinals_and_values() {
        let mut sentinel = Vec::new();
        encode_max_sentinel(&mut sentinel);
        for ordinal in [1u8, 127, 254] {
            let mut seg = Vec::new();
            encode_ordinal(ordinal, &mut seg);
            assert!(seg < sentinel);
        }
        let mut uuid_key = Vec::new();
        encode_uuid(&[0xFFu8; 16], &mut uuid_key);
        assert!(uuid_key < sentinel);
    }

    #[test]
    fn encoder_reuse_produces_independent_keys() {
        let mut encoder = KeyEncoder::new();
        encoder.encode_int(42).encode_text("hello");
        let key1 = encoder.finish();

        encoder.encode_int(42).encode_text("world");
        let key2 = encoder.finish();

        assert!(key1 < key2);
        assert!(encoder.is_empty());
    }

    #[test]
    fn encoding_agrees_with_value_compare_within_each_type() {
        use std::borrow::Cow;
        let groups: [&[Value<'_>]; 4] = [
            &[Value::Int(-5), Value::Int(0), Value::Int(7)],
            &[Value::Float(-2.5), Value::Float(0.0), Value::Float(3.25)],
            &[
                Value::Text(Cow::Borrowed("abc")),
                Value::Text(Cow::Borrowed("abd")),
                Value::Text(Cow::Borrowed("abda")),
            ],
            &[
                Value::Blob(Cow::Borrowed(&[1u8, 2][..])),
                Value::Blob(Cow::Borrowed(&[1u8, 2, 0][..])),
            ],
        ];
        for group in groups {
            for a in group {
                for b in group {
                    let Some(expected) = a.compare(b) else {
                        continue;
                    };
                    let mut ka = Vec::new();
                    let mut kb = Vec::new();
                    a.encode_to_key(&mut ka);
                    b.encode_to_key(&mut kb);
                    assert_eq!(ka.cmp(&kb), expected, "{:?} vs {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn max_encoded_width_bounds_actual_encodings() {
        use crate::types::{ColumnDef, DataType};

        let int_col = ColumnDef::new("n", DataType::Int8);
        assert_eq!(max_encoded_width(&int_col), 9);
        let mut buf = Vec::new();
        encode_int(i64::MIN, &mut buf);
        assert!(buf.len() <= max_encoded_width(&int_col));

        let uuid_col = ColumnDef::new("u", DataType::Uuid);
        assert_eq!(max_encoded_width(&uuid_col), 17);

        let text_col = ColumnDef::varchar("s", Some(4));
        assert_eq!(max_encoded_width(&text_col), 11);
        buf.clear();
        // Worst case: every byte needs escaping.
        encode_text("\u{0}\u{0}\u{0}\u{0}", &mut buf);
        assert!(buf.len() <= max_encoded_width(&text_col));
    }
}
