//! # RowView - Zero-Copy Row Access
//!
//! This module provides `RowView` for reading encoded rows. All getters
//! return references or copies straight out of the underlying buffer; the
//! per-schema coordinate tables keep every field lookup at O(columns/8)
//! bitmap-byte probes regardless of which earlier columns are null.
//!
//! ## Usage
//!
//! ```ignore
//! let row = RowView::new(data, &schema)?;
//! let name: &str = row.get_text(1)?;  // Zero-copy reference
//! let age: i32 = row.get_int4(2)?;    // Direct read from buffer
//! ```
//!
//! ## Corruption Handling
//!
//! A buffer that disagrees with its own header, or whose delimiter cells
//! describe an impossible range, fails with a typed error. A null column is
//! a distinct, explicit outcome and never conflated with corruption.
//!
//! ## Thread Safety
//!
//! `RowView` borrows immutably from a byte slice. Multiple `RowView`
//! instances can read the same data concurrently.

use eyre::Result;

use crate::config::ROW_HEADER_SIZE;
use crate::error::RowError;
use crate::records::schema::RowSchema;
use crate::types::{ColumnDef, DataType, Value};

#[derive(Debug)]
pub struct RowView<'a> {
    data: &'a [u8],
    schema: &'a RowSchema,
}

impl<'a> RowView<'a> {
    pub fn new(data: &'a [u8], schema: &'a RowSchema) -> Result<Self> {
        let min = ROW_HEADER_SIZE + schema.bitmap_len();
        if data.len() < min {
            return Err(RowError::Truncated {
                expected: min,
                actual: data.len(),
            }
            .into());
        }
        let declared = u16::from_le_bytes([data[0], data[1]]) as usize;
        if declared != data.len() {
            return Err(RowError::HeaderMismatch {
                declared,
                actual: data.len(),
            }
            .into());
        }
        Ok(Self { data, schema })
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn schema(&self) -> &'a RowSchema {
        self.schema
    }

    /// Total image length declared by the header.
    pub fn header_len(&self) -> u16 {
        u16::from_le_bytes([self.data[0], self.data[1]])
    }

    pub fn null_bitmap(&self) -> &'a [u8] {
        &self.data[ROW_HEADER_SIZE..ROW_HEADER_SIZE + self.schema.bitmap_len()]
    }

    /// Start of the packed fixed area.
    pub fn data_offset(&self) -> usize {
        ROW_HEADER_SIZE + self.schema.bitmap_len()
    }

    pub fn is_null(&self, col_idx: usize) -> Result<bool> {
        self.check_field(col_idx)?;
        let bitmap = self.null_bitmap();
        Ok(bitmap[col_idx / 8] & (1 << (col_idx % 8)) != 0)
    }

    /// Locates a field's value bytes within the image.
    ///
    /// Returns `Ok(None)` for a null field. The returned offset is absolute
    /// within the image; the length is the value's byte length.
    pub fn field_location(&self, col_idx: usize) -> Result<Option<(usize, usize)>> {
        let col = self.column_at(col_idx)?;
        let bitmap = self.null_bitmap();
        let data_start = self.data_offset();

        if col.data_type().is_variable() {
            let slot = match self.schema.coords().locate_var(bitmap, col_idx) {
                Some(s) => s,
                None => return Ok(None),
            };
            let previous = match slot.previous_cell {
                Some(cell) => self.read_cell(data_start + cell)?,
                None => 0,
            };
            let current = self.read_cell(data_start + slot.current_cell)?;
            if current < previous {
                return Err(RowError::InvertedRange {
                    field: col_idx,
                    start: previous as usize,
                    end: current as usize,
                }
                .into());
            }
            let segment_start = data_start + slot.fixed_area_size;
            let offset = segment_start + previous as usize;
            let len = (current - previous) as usize;
            self.check_span(offset, len)?;
            Ok(Some((offset, len)))
        } else {
            let slot = match self.schema.coords().locate_fixed(bitmap, col_idx) {
                Some(s) => s,
                None => return Ok(None),
            };
            let offset = data_start + slot.offset;
            self.check_span(offset, slot.width)?;
            Ok(Some((offset, slot.width)))
        }
    }

    /// Raw value bytes of a field, `None` when null.
    pub fn field_bytes(&self, col_idx: usize) -> Result<Option<&'a [u8]>> {
        Ok(self
            .field_location(col_idx)?
            .map(|(offset, len)| &self.data[offset..offset + len]))
    }

    pub fn get_bool(&self, col_idx: usize) -> Result<bool> {
        let bytes = self.require(col_idx)?;
        Ok(bytes[0] != 0)
    }

    pub fn get_int2(&self, col_idx: usize) -> Result<i16> {
        let bytes = self.require(col_idx)?;
        let arr: [u8; 2] = bytes
            .try_into()
            .map_err(|_| eyre::eyre!("insufficient data for int2 at col {}", col_idx))?;
        Ok(i16::from_le_bytes(arr))
    }

    pub fn get_int4(&self, col_idx: usize) -> Result<i32> {
        let bytes = self.require(col_idx)?;
        let arr: [u8; 4] = bytes
            .try_into()
            .map_err(|_| eyre::eyre!("insufficient data for int4 at col {}", col_idx))?;
        Ok(i32::from_le_bytes(arr))
    }

    pub fn get_int8(&self, col_idx: usize) -> Result<i64> {
        let bytes = self.require(col_idx)?;
        let arr: [u8; 8] = bytes
            .try_into()
            .map_err(|_| eyre::eyre!("insufficient data for int8 at col {}", col_idx))?;
        Ok(i64::from_le_bytes(arr))
    }

    pub fn get_float4(&self, col_idx: usize) -> Result<f32> {
        let bytes = self.require(col_idx)?;
        let arr: [u8; 4] = bytes
            .try_into()
            .map_err(|_| eyre::eyre!("insufficient data for float4 at col {}", col_idx))?;
        Ok(f32::from_le_bytes(arr))
    }

    pub fn get_float8(&self, col_idx: usize) -> Result<f64> {
        let bytes = self.require(col_idx)?;
        let arr: [u8; 8] = bytes
            .try_into()
            .map_err(|_| eyre::eyre!("insufficient data for float8 at col {}", col_idx))?;
        Ok(f64::from_le_bytes(arr))
    }

    pub fn get_date(&self, col_idx: usize) -> Result<i32> {
        self.get_int4(col_idx)
    }

    pub fn get_time(&self, col_idx: usize) -> Result<i64> {
        self.get_int8(col_idx)
    }

    pub fn get_timestamp(&self, col_idx: usize) -> Result<i64> {
        self.get_int8(col_idx)
    }

    pub fn get_uuid(&self, col_idx: usize) -> Result<&'a [u8; 16]> {
        let bytes = self.require(col_idx)?;
        bytes
            .try_into()
            .map_err(|_| eyre::eyre!("insufficient data for uuid at col {}", col_idx))
    }

    pub fn get_text(&self, col_idx: usize) -> Result<&'a str> {
        let bytes = self.require(col_idx)?;
        std::str::from_utf8(bytes)
            .map_err(|e| eyre::eyre!("invalid UTF-8 in text column {}: {}", col_idx, e))
    }

    pub fn get_char(&self, col_idx: usize) -> Result<&'a str> {
        self.get_text(col_idx)
    }

    pub fn get_varchar(&self, col_idx: usize) -> Result<&'a str> {
        self.get_text(col_idx)
    }

    pub fn get_blob(&self, col_idx: usize) -> Result<&'a [u8]> {
        self.require(col_idx)
    }

    pub fn get_bool_opt(&self, col_idx: usize) -> Result<Option<bool>> {
        if self.is_null(col_idx)? {
            return Ok(None);
        }
        self.get_bool(col_idx).map(Some)
    }

    pub fn get_int2_opt(&self, col_idx: usize) -> Result<Option<i16>> {
        if self.is_null(col_idx)? {
            return Ok(None);
        }
        self.get_int2(col_idx).map(Some)
    }

    pub fn get_int4_opt(&self, col_idx: usize) -> Result<Option<i32>> {
        if self.is_null(col_idx)? {
            return Ok(None);
        }
        self.get_int4(col_idx).map(Some)
    }

    pub fn get_int8_opt(&self, col_idx: usize) -> Result<Option<i64>> {
        if self.is_null(col_idx)? {
            return Ok(None);
        }
        self.get_int8(col_idx).map(Some)
    }

    pub fn get_float4_opt(&self, col_idx: usize) -> Result<Option<f32>> {
        if self.is_null(col_idx)? {
            return Ok(None);
        }
        self.get_float4(col_idx).map(Some)
    }

    pub fn get_float8_opt(&self, col_idx: usize) -> Result<Option<f64>> {
        if self.is_null(col_idx)? {
            return Ok(None);
        }
        self.get_float8(col_idx).map(Some)
    }

    pub fn get_uuid_opt(&self, col_idx: usize) -> Result<Option<&'a [u8; 16]>> {
        if self.is_null(col_idx)? {
            return Ok(None);
        }
        self.get_uuid(col_idx).map(Some)
    }

    pub fn get_text_opt(&self, col_idx: usize) -> Result<Option<&'a str>> {
        if self.is_null(col_idx)? {
            return Ok(None);
        }
        self.get_text(col_idx).map(Some)
    }

    pub fn get_blob_opt(&self, col_idx: usize) -> Result<Option<&'a [u8]>> {
        if self.is_null(col_idx)? {
            return Ok(None);
        }
        self.get_blob(col_idx).map(Some)
    }

    /// Decodes one field into a runtime [`Value`].
    pub fn get_value(&self, col_idx: usize) -> Result<Value<'a>> {
        let col = self.column_at(col_idx)?;
        let bytes = match self.field_bytes(col_idx)? {
            Some(b) => b,
            None => return Ok(Value::Null),
        };
        let value = match col.data_type() {
            DataType::Bool => Value::Int(i64::from(bytes[0] != 0)),
            DataType::Int2 => Value::Int(i16::from_le_bytes(fixed_bytes(col_idx, bytes)?) as i64),
            DataType::Int4 | DataType::Date => {
                Value::Int(i32::from_le_bytes(fixed_bytes(col_idx, bytes)?) as i64)
            }
            DataType::Int8 | DataType::Time | DataType::Timestamp => {
                Value::Int(i64::from_le_bytes(fixed_bytes(col_idx, bytes)?))
            }
            DataType::Float4 => Value::Float(f32::from_le_bytes(fixed_bytes(col_idx, bytes)?) as f64),
            DataType::Float8 => Value::Float(f64::from_le_bytes(fixed_bytes(col_idx, bytes)?)),
            DataType::Uuid => Value::Uuid(fixed_bytes(col_idx, bytes)?),
            DataType::Text | DataType::Varchar | DataType::Char => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| eyre::eyre!("invalid UTF-8 in text column {}: {}", col_idx, e))?;
                Value::Text(std::borrow::Cow::Borrowed(text))
            }
            DataType::Blob => Value::Blob(std::borrow::Cow::Borrowed(bytes)),
        };
        Ok(value)
    }

    /// Decodes every field of the row in schema order.
    pub fn values(&self) -> Result<Vec<Value<'a>>> {
        (0..self.schema.column_count())
            .map(|i| self.get_value(i))
            .collect()
    }

    fn check_field(&self, col_idx: usize) -> Result<()> {
        if col_idx >= self.schema.column_count() {
            return Err(RowError::FieldOutOfRange {
                field: col_idx,
                count: self.schema.column_count(),
            }
            .into());
        }
        Ok(())
    }

    fn column_at(&self, col_idx: usize) -> Result<&'a ColumnDef> {
        self.check_field(col_idx)?;
        self.schema.column(col_idx).ok_or_else(|| {
            RowError::FieldOutOfRange {
                field: col_idx,
                count: self.schema.column_count(),
            }
            .into()
        })
    }

    fn check_span(&self, offset: usize, len: usize) -> Result<()> {
        if offset + len > self.data.len() {
            return Err(RowError::Truncated {
                expected: offset + len,
                actual: self.data.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Little-endian delimiter cell at an absolute offset.
    fn read_cell(&self, offset: usize) -> Result<u64> {
        let width = self.schema.delimiter_width();
        self.check_span(offset, width)?;
        let mut value = 0u64;
        for (i, &b) in self.data[offset..offset + width].iter().enumerate() {
            value |= (b as u64) << (8 * i);
        }
        Ok(value)
    }

    fn require(&self, col_idx: usize) -> Result<&'a [u8]> {
        self.field_bytes(col_idx)?
            .ok_or_else(|| RowError::NullField { field: col_idx }.into())
    }
}

fn fixed_bytes<const N: usize>(col_idx: usize, bytes: &[u8]) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| {
        eyre::eyre!(
            "field {} holds {} bytes, expected {}",
            col_idx,
            bytes.len(),
            N
        )
    })
}
