//! # Storage Data Types
//!
//! The `DataType` discriminant drives every layout decision downstream: a
//! fixed-width type owns a slot of exactly `fixed_size()` bytes in a row's
//! packed area, while a variable-width type owns a delimiter cell there and
//! puts its payload in the variable segment.
//!
//! | Width | Types |
//! |-------|-------|
//! | 1 | Bool |
//! | 2 | Int2 |
//! | 4 | Int4, Float4, Date |
//! | 8 | Int8, Float8, Time, Timestamp |
//! | 16 | Uuid |
//! | variable | Text, Blob, Varchar, Char |
//!
//! Length caps for the variable types live in `ColumnDef`, not here, so the
//! enum stays `Copy` and one byte wide. Discriminants below 20 are the
//! fixed-width types; 20 and up are variable. `#[repr(u8)]` pins the
//! discriminant for catalog persistence, and `TryFrom<u8>` is the decoding
//! side of that contract.

/// Storage-level type discriminant shared by schemas, rows, and index keys.
///
/// Length metadata (the VARCHAR cap) rides in `ColumnDef`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool = 0,
    Int2 = 1,
    Int4 = 2,
    Int8 = 3,
    Float4 = 4,
    Float8 = 5,
    Date = 6,
    Time = 7,
    Timestamp = 8,
    Uuid = 10,

    Text = 20,
    Blob = 21,
    Varchar = 24,
    Char = 25,
}

impl DataType {
    /// Byte width of this type's slot in the packed fixed area, or None
    /// for variable-width types.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            DataType::Bool => Some(1),
            DataType::Int2 => Some(2),
            DataType::Int4 | DataType::Float4 | DataType::Date => Some(4),
            DataType::Int8 | DataType::Float8 | DataType::Time | DataType::Timestamp => Some(8),
            DataType::Uuid => Some(16),
            DataType::Text | DataType::Blob | DataType::Varchar | DataType::Char => None,
        }
    }

    /// True when values store a delimiter cell plus a variable payload.
    pub fn is_variable(&self) -> bool {
        self.fixed_size().is_none()
    }

    /// True when values of this type are stored as little-endian
    /// two's-complement integers in the fixed area.
    pub fn is_integer_backed(&self) -> bool {
        !self.is_variable() && !matches!(self, DataType::Float4 | DataType::Float8 | DataType::Uuid)
    }

    /// True for types whose payload is UTF-8.
    pub fn is_text(&self) -> bool {
        matches!(self, DataType::Text | DataType::Varchar | DataType::Char)
    }

    /// Lowercase name used in error messages and catalog dumps.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Bool => "bool",
            DataType::Int2 => "int2",
            DataType::Int4 => "int4",
            DataType::Int8 => "int8",
            DataType::Float4 => "float4",
            DataType::Float8 => "float8",
            DataType::Date => "date",
            DataType::Time => "time",
            DataType::Timestamp => "timestamp",
            DataType::Uuid => "uuid",
            DataType::Text => "text",
            DataType::Blob => "blob",
            DataType::Varchar => "varchar",
            DataType::Char => "char",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for DataType {
    type Error = eyre::Report;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => DataType::Bool,
            1 => DataType::Int2,
            2 => DataType::Int4,
            3 => DataType::Int8,
            4 => DataType::Float4,
            5 => DataType::Float8,
            6 => DataType::Date,
            7 => DataType::Time,
            8 => DataType::Timestamp,
            10 => DataType::Uuid,
            20 => DataType::Text,
            21 => DataType::Blob,
            24 => DataType::Varchar,
            25 => DataType::Char,
            other => eyre::bail!("invalid DataType discriminant: {other}"),
        })
    }
}
