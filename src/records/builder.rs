//! # RowBuilder - Row Construction
//!
//! This module provides `RowBuilder` for constructing encoded rows with
//! type-safe setters. Unlike formats that reserve space for every column,
//! the packed layout gives null columns zero bytes, so the builder holds
//! per-column staging cells and lays the image out only at `build()`.
//!
//! ## Usage
//!
//! ```ignore
//! let mut builder = RowBuilder::new(&schema);
//! builder.set_int4(0, 42)?;
//! builder.set_text(1, "hello")?;
//! let data = builder.build()?;
//!
//! // Reuse builder for next row
//! builder.reset();
//! builder.set_int4(0, 100)?;
//! ```

use eyre::Result;
use smallvec::SmallVec;

use crate::config::MAX_ROW_SIZE;
use crate::error::RowError;
use crate::records::schema::RowSchema;
use crate::types::{DataType, Value};

/// Staged contents of one column before layout.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldCell {
    Null,
    Fixed(SmallVec<[u8; 16]>),
    Var(Vec<u8>),
}

pub struct RowBuilder<'a> {
    schema: &'a RowSchema,
    null_bitmap: Vec<u8>,
    cells: Vec<FieldCell>,
}

impl<'a> RowBuilder<'a> {
    pub fn new(schema: &'a RowSchema) -> Self {
        let mut null_bitmap = vec![0u8; schema.bitmap_len()];
        for i in 0..schema.column_count() {
            null_bitmap[i / 8] |= 1 << (i % 8);
        }
        let cells = vec![FieldCell::Null; schema.column_count()];
        Self {
            schema,
            null_bitmap,
            cells,
        }
    }

    pub fn reset(&mut self) {
        for i in 0..self.schema.column_count() {
            self.null_bitmap[i / 8] |= 1 << (i % 8);
        }
        for cell in &mut self.cells {
            *cell = FieldCell::Null;
        }
    }

    /// Marks a column null. Fails for NOT NULL columns.
    pub fn set_null(&mut self, col_idx: usize) -> Result<()> {
        let col = self.column(col_idx)?;
        if !col.is_nullable() {
            return Err(RowError::NotNullable { field: col_idx }.into());
        }
        self.null_bitmap[col_idx / 8] |= 1 << (col_idx % 8);
        self.cells[col_idx] = FieldCell::Null;
        Ok(())
    }

    pub fn set_bool(&mut self, col_idx: usize, value: bool) -> Result<()> {
        self.check_type(col_idx, |dt| dt == DataType::Bool, "bool")?;
        self.stage_fixed(col_idx, &[u8::from(value)]);
        Ok(())
    }

    pub fn set_int2(&mut self, col_idx: usize, value: i16) -> Result<()> {
        self.check_type(
            col_idx,
            |dt| dt.is_integer_backed() && dt.fixed_size() == Some(2),
            "int2",
        )?;
        self.stage_fixed(col_idx, &value.to_le_bytes());
        Ok(())
    }

    pub fn set_int4(&mut self, col_idx: usize, value: i32) -> Result<()> {
        self.check_type(
            col_idx,
            |dt| dt.is_integer_backed() && dt.fixed_size() == Some(4),
            "int4",
        )?;
        self.stage_fixed(col_idx, &value.to_le_bytes());
        Ok(())
    }

    pub fn set_int8(&mut self, col_idx: usize, value: i64) -> Result<()> {
        self.check_type(
            col_idx,
            |dt| dt.is_integer_backed() && dt.fixed_size() == Some(8),
            "int8",
        )?;
        self.stage_fixed(col_idx, &value.to_le_bytes());
        Ok(())
    }

    pub fn set_float4(&mut self, col_idx: usize, value: f32) -> Result<()> {
        self.check_type(col_idx, |dt| dt == DataType::Float4, "float4")?;
        self.stage_fixed(col_idx, &value.to_le_bytes());
        Ok(())
    }

    pub fn set_float8(&mut self, col_idx: usize, value: f64) -> Result<()> {
        self.check_type(col_idx, |dt| dt == DataType::Float8, "float8")?;
        self.stage_fixed(col_idx, &value.to_le_bytes());
        Ok(())
    }

    pub fn set_date(&mut self, col_idx: usize, days: i32) -> Result<()> {
        self.check_type(col_idx, |dt| dt == DataType::Date, "date")?;
        self.stage_fixed(col_idx, &days.to_le_bytes());
        Ok(())
    }

    pub fn set_time(&mut self, col_idx: usize, micros: i64) -> Result<()> {
        self.check_type(col_idx, |dt| dt == DataType::Time, "time")?;
        self.stage_fixed(col_idx, &micros.to_le_bytes());
        Ok(())
    }

    pub fn set_timestamp(&mut self, col_idx: usize, micros: i64) -> Result<()> {
        self.check_type(col_idx, |dt| dt == DataType::Timestamp, "timestamp")?;
        self.stage_fixed(col_idx, &micros.to_le_bytes());
        Ok(())
    }

    pub fn set_uuid(&mut self, col_idx: usize, uuid: &[u8; 16]) -> Result<()> {
        self.check_type(col_idx, |dt| dt == DataType::Uuid, "uuid")?;
        self.stage_fixed(col_idx, uuid);
        Ok(())
    }

    pub fn set_text(&mut self, col_idx: usize, text: &str) -> Result<()> {
        self.check_type(col_idx, |dt| dt.is_text(), "text")?;
        if self.column(col_idx)?.data_type() == DataType::Char {
            return self.set_char(col_idx, text);
        }
        self.stage_var(col_idx, text.as_bytes().to_vec())
    }

    pub fn set_varchar(&mut self, col_idx: usize, text: &str) -> Result<()> {
        self.check_type(col_idx, |dt| dt == DataType::Varchar, "varchar")?;
        self.stage_var(col_idx, text.as_bytes().to_vec())
    }

    /// CHAR(n) is space-padded to exactly n bytes.
    pub fn set_char(&mut self, col_idx: usize, text: &str) -> Result<()> {
        self.check_type(col_idx, |dt| dt == DataType::Char, "char")?;
        let cap = self.column(col_idx)?.max_width();
        let mut bytes = text.as_bytes().to_vec();
        if bytes.len() < cap {
            bytes.resize(cap, b' ');
        }
        self.stage_var(col_idx, bytes)
    }

    pub fn set_blob(&mut self, col_idx: usize, data: &[u8]) -> Result<()> {
        self.check_type(col_idx, |dt| dt == DataType::Blob, "blob")?;
        self.stage_var(col_idx, data.to_vec())
    }

    /// Stores a runtime [`Value`], dispatching on the column's declared type.
    pub fn set_value(&mut self, col_idx: usize, value: &Value<'_>) -> Result<()> {
        match value {
            Value::Null => self.set_null(col_idx),
            Value::Int(v) => self.set_int_value(col_idx, *v),
            Value::Float(v) => match self.column(col_idx)?.data_type() {
                DataType::Float4 => self.set_float4(col_idx, *v as f32),
                DataType::Float8 => self.set_float8(col_idx, *v),
                dt => Err(self.mismatch(col_idx, dt.name(), "float")),
            },
            Value::Uuid(u) => self.set_uuid(col_idx, u),
            Value::Text(s) => self.set_text(col_idx, s),
            Value::Blob(b) => self.set_blob(col_idx, b),
        }
    }

    fn set_int_value(&mut self, col_idx: usize, v: i64) -> Result<()> {
        let dt = self.column(col_idx)?.data_type();
        match dt {
            DataType::Bool => self.set_bool(col_idx, v != 0),
            DataType::Int2 => {
                let narrow = i16::try_from(v).map_err(|_| RowError::ValueOutOfRange {
                    field: col_idx,
                    ty: "int2",
                })?;
                self.set_int2(col_idx, narrow)
            }
            DataType::Int4 | DataType::Date => {
                let narrow = i32::try_from(v).map_err(|_| RowError::ValueOutOfRange {
                    field: col_idx,
                    ty: dt.name(),
                })?;
                self.stage_fixed(col_idx, &narrow.to_le_bytes());
                Ok(())
            }
            DataType::Int8 | DataType::Time | DataType::Timestamp => {
                self.stage_fixed(col_idx, &v.to_le_bytes());
                Ok(())
            }
            other => Err(self.mismatch(col_idx, other.name(), "int")),
        }
    }

    /// Lays out the final image: header, bitmap, packed fixed area with
    /// delimiter cells, then the variable segment.
    pub fn build(&self) -> Result<Vec<u8>> {
        for (idx, col) in self.schema.columns().iter().enumerate() {
            if matches!(self.cells[idx], FieldCell::Null) && !col.is_nullable() {
                return Err(RowError::NotNullable { field: idx }.into());
            }
        }

        let delim = self.schema.delimiter_width();
        let mut fixed_area = Vec::new();
        let mut var_segment = Vec::new();
        let mut cumulative: u64 = 0;

        for cell in &self.cells {
            match cell {
                FieldCell::Null => {}
                FieldCell::Fixed(bytes) => fixed_area.extend_from_slice(bytes),
                FieldCell::Var(payload) => {
                    cumulative += payload.len() as u64;
                    fixed_area.extend_from_slice(&cumulative.to_le_bytes()[..delim]);
                    var_segment.extend_from_slice(payload);
                }
            }
        }

        let total = crate::config::ROW_HEADER_SIZE
            + self.null_bitmap.len()
            + fixed_area.len()
            + var_segment.len();
        if total > MAX_ROW_SIZE {
            return Err(RowError::TooLarge {
                size: total,
                max: MAX_ROW_SIZE,
            }
            .into());
        }

        let mut image = Vec::with_capacity(total);
        image.extend((total as u16).to_le_bytes());
        image.extend(&self.null_bitmap);
        image.extend(&fixed_area);
        image.extend(&var_segment);
        Ok(image)
    }

    fn column(&self, col_idx: usize) -> Result<&crate::types::ColumnDef> {
        self.schema.column(col_idx).ok_or_else(|| {
            RowError::FieldOutOfRange {
                field: col_idx,
                count: self.schema.column_count(),
            }
            .into()
        })
    }

    fn check_type(
        &self,
        col_idx: usize,
        accepts: impl Fn(DataType) -> bool,
        expected: &'static str,
    ) -> Result<()> {
        let dt = self.column(col_idx)?.data_type();
        if !accepts(dt) {
            return Err(self.mismatch(col_idx, dt.name(), expected));
        }
        Ok(())
    }

    fn mismatch(&self, col_idx: usize, actual: &'static str, expected: &'static str) -> eyre::Report {
        RowError::TypeMismatch {
            field: col_idx,
            expected,
            actual,
        }
        .into()
    }

    fn clear_null(&mut self, col_idx: usize) {
        self.null_bitmap[col_idx / 8] &= !(1 << (col_idx % 8));
    }

    fn stage_fixed(&mut self, col_idx: usize, bytes: &[u8]) {
        self.clear_null(col_idx);
        self.cells[col_idx] = FieldCell::Fixed(SmallVec::from_slice(bytes));
    }

    fn stage_var(&mut self, col_idx: usize, payload: Vec<u8>) -> Result<()> {
        let cap = self.column(col_idx)?.max_width();
        if payload.len() > cap {
            return Err(RowError::VarOverflow {
                got: payload.len(),
                max: cap,
            }
            .into());
        }
        self.clear_null(col_idx);
        self.cells[col_idx] = FieldCell::Var(payload);
        Ok(())
    }
}
