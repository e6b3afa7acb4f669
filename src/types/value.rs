//! # Runtime Values
//!
//! `Value<'a>` is the runtime shape of one field: what a row builder
//! accepts, what a row view hands back, and what an hkey segment carries.
//! Text and blob payloads are `Cow` so reads borrow straight from the row
//! image and writers can pass owned data through the same type.
//!
//! | Variant | Carries | Backing column types |
//! |---------|---------|----------------------|
//! | Null | - | any nullable column |
//! | Int | i64 | Bool, Int2..Int8, Date, Time, Timestamp |
//! | Float | f64 | Float4, Float8 |
//! | Uuid | [u8; 16] | Uuid |
//! | Text | Cow<str> | Text, Varchar, Char |
//! | Blob | Cow<[u8]> | Blob |
//!
//! One `Int` variant serves every integer-backed column; the column's
//! `DataType` decides how many bytes it occupies on disk and whether a
//! given i64 fits.
//!
//! Comparison follows SQL: NULL against anything is UNKNOWN (`None`), as
//! is any comparison touching NaN. Across variants the order is
//! numeric < text < blob < uuid, matching the type prefixes of the key
//! encoding so that [`compare`](Value::compare) and encoded-byte order
//! never disagree.

use std::borrow::Cow;
use std::cmp::Ordering;

/// Runtime value of one row field or hkey segment entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Null,
    Int(i64),
    Float(f64),
    Uuid([u8; 16]),
    Text(Cow<'a, str>),
    Blob(Cow<'a, [u8]>),
}

fn cmp_floats(a: f64, b: f64) -> Option<Ordering> {
    if a.is_nan() || b.is_nan() {
        return None;
    }
    a.partial_cmp(&b)
}

impl<'a> Value<'a> {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Variant name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Uuid(_) => "uuid",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
        }
    }

    // Cross-variant rank, aligned with the key-encoding type prefixes.
    fn order_class(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Int(_) | Value::Float(_) => 1,
            Value::Text(_) => 2,
            Value::Blob(_) => 3,
            Value::Uuid(_) => 4,
        }
    }

    /// Compares two values with SQL NULL semantics: `None` when either
    /// side is NULL or a float comparison touches NaN.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => cmp_floats(*a, *b),
            (Value::Int(a), Value::Float(b)) => cmp_floats(*a as f64, *b),
            (Value::Float(a), Value::Int(b)) => cmp_floats(*a, *b as f64),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Blob(a), Value::Blob(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            _ => Some(self.order_class().cmp(&other.order_class())),
        }
    }

    /// Detaches this value from whatever buffer it borrows.
    pub fn to_owned_static(&self) -> Value<'static> {
        match self {
            Value::Null => Value::Null,
            Value::Int(i) => Value::Int(*i),
            Value::Float(f) => Value::Float(*f),
            Value::Uuid(u) => Value::Uuid(*u),
            Value::Text(s) => Value::Text(Cow::Owned(s.clone().into_owned())),
            Value::Blob(b) => Value::Blob(Cow::Owned(b.clone().into_owned())),
        }
    }

    /// Appends this value's byte-comparable key encoding to `buf`.
    ///
    /// Within one variant the encoded bytes compare (memcmp) in the same
    /// order as [`Value::compare`]; across variants the type prefix decides,
    /// with NULL sorting before everything. Key columns are single-typed, so
    /// the per-variant guarantee is the one keys rely on.
    pub fn encode_to_key(&self, buf: &mut Vec<u8>) {
        use crate::encoding::key::{
            encode_blob, encode_float, encode_int, encode_text, encode_uuid, type_prefix,
        };

        match self {
            Value::Null => buf.push(type_prefix::NULL),
            Value::Int(i) => encode_int(*i, buf),
            Value::Float(f) => encode_float(*f, buf),
            Value::Uuid(u) => encode_uuid(u, buf),
            Value::Text(s) => encode_text(s, buf),
            Value::Blob(b) => encode_blob(b, buf),
        }
    }
}

impl From<i64> for Value<'static> {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value<'static> {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Value::Text(Cow::Borrowed(v))
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(v: &'a [u8]) -> Self {
        Value::Blob(Cow::Borrowed(v))
    }
}
