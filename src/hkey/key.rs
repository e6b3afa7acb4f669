//! # Runtime HKey
//!
//! A materialized hierarchical key: the ordered ancestor-path segments that
//! place one row inside its group's storage tree. Each segment carries the
//! table's ordinal and that level's key values.
//!
//! ## Encoding
//!
//! `encode` produces the physical tree key: per segment, the raw ordinal
//! byte followed by each value in order-preserving encoding (see
//! [`encoding::key`](crate::encoding::key)). Two properties follow from the
//! byte scheme:
//!
//! - A parent row's encoded hkey is a strict prefix of every descendant's.
//! - Unsigned byte comparison of encoded hkeys orders rows exactly as the
//!   tree clusters them: by root key, then ordinal, then child key, and so
//!   on down the path.
//!
//! `subtree_upper_bound` appends the `0xFF` sentinel, which sorts after
//! every real ordinal and value prefix; the half-open range
//! `[encode(), subtree_upper_bound())` therefore covers the row itself and
//! its whole descendant subtree and nothing else.

use eyre::{bail, Result};
use smallvec::SmallVec;

use crate::encoding::KeyEncoder;
use crate::types::Value;

/// One level of a materialized hkey.
#[derive(Debug, Clone, PartialEq)]
pub struct HKeySegment<'a> {
    ordinal: u8,
    values: SmallVec<[Value<'a>; 2]>,
}

impl<'a> HKeySegment<'a> {
    pub fn new(ordinal: u8) -> Self {
        Self {
            ordinal,
            values: SmallVec::new(),
        }
    }

    pub fn with_values(ordinal: u8, values: impl IntoIterator<Item = Value<'a>>) -> Self {
        Self {
            ordinal,
            values: values.into_iter().collect(),
        }
    }

    pub fn ordinal(&self) -> u8 {
        self.ordinal
    }

    pub fn values(&self) -> &[Value<'a>] {
        &self.values
    }

    pub fn value(&self, idx: usize) -> Option<&Value<'a>> {
        self.values.get(idx)
    }

    pub fn push_value(&mut self, value: Value<'a>) {
        self.values.push(value);
    }
}

/// Materialized ancestor-path key, root segment first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HKey<'a> {
    segments: SmallVec<[HKeySegment<'a>; 4]>,
}

impl<'a> HKey<'a> {
    pub fn new() -> Self {
        Self {
            segments: SmallVec::new(),
        }
    }

    pub fn from_segments(segments: impl IntoIterator<Item = HKeySegment<'a>>) -> Self {
        Self {
            segments: segments.into_iter().collect(),
        }
    }

    /// Opens a new deepest segment.
    pub fn begin_segment(&mut self, ordinal: u8) {
        self.segments.push(HKeySegment::new(ordinal));
    }

    /// Appends a value to the deepest segment.
    pub fn push_value(&mut self, value: Value<'a>) -> Result<()> {
        match self.segments.last_mut() {
            Some(seg) => {
                seg.push_value(value);
                Ok(())
            }
            None => bail!("hkey value pushed before any segment was opened"),
        }
    }

    pub fn segments(&self) -> &[HKeySegment<'a>] {
        &self.segments
    }

    pub fn segment(&self, idx: usize) -> Option<&HKeySegment<'a>> {
        self.segments.get(idx)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn ordinal_at(&self, segment: usize) -> Option<u8> {
        self.segments.get(segment).map(|s| s.ordinal())
    }

    pub fn value_at(&self, segment: usize, column: usize) -> Option<&Value<'a>> {
        self.segments.get(segment)?.value(column)
    }

    /// Value at a flat shape position; `None` for ordinal slots.
    ///
    /// Positions count ordinals, matching
    /// [`HKeyShape`](crate::hkey::HKeyShape) numbering.
    pub fn value_at_position(&self, position: usize) -> Option<&Value<'a>> {
        let mut cursor = 0;
        for seg in &self.segments {
            if position == cursor {
                return None;
            }
            cursor += 1;
            if position < cursor + seg.values().len() {
                return seg.value(position - cursor);
            }
            cursor += seg.values().len();
        }
        None
    }

    pub fn encode_into(&self, encoder: &mut KeyEncoder) {
        for seg in &self.segments {
            encoder.encode_ordinal(seg.ordinal());
            for value in seg.values() {
                encoder.encode_value(value);
            }
        }
    }

    /// Byte-comparable tree key for this row.
    pub fn encode(&self) -> Vec<u8> {
        let mut encoder = KeyEncoder::new();
        self.encode_into(&mut encoder);
        encoder.finish()
    }

    /// Exclusive end key of the row's descendant subtree.
    pub fn subtree_upper_bound(&self) -> Vec<u8> {
        let mut encoder = KeyEncoder::new();
        self.encode_into(&mut encoder);
        encoder.encode_max_sentinel();
        encoder.finish()
    }
}
