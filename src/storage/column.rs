//! Nullable column chunks
//!
//! Compression schemes only see non-null values. Nulls are recorded
//! separately as row positions in front of the encoded block:
//!
//! ```text
//! [u32 null count][u32 null row position]...[encoded block]
//! ```
//!
//! Positions are strictly increasing row indices. The accessor merges the
//! null positions back with the decoded values while walking rows.

use crate::common::constants::HEADER_FIELD_SIZE;
use crate::common::error::{ColumnarError, ColumnarResult};
use crate::config::CompressionConfig;
use crate::corrupted_err;
use crate::storage::compression::types::{header_u32, read_u32};
use crate::storage::compression::{
    registry, ColumnDecoder, CompressionScheme, CompressionSelector, Decoder, EncodedBlock,
};
use crate::types::{ColumnType, MutableRow, ScalarValue};
use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

/// Builds one nullable column chunk
#[derive(Debug)]
pub struct NullableColumnBuilder {
    column_type: ColumnType,
    selector: CompressionSelector,
    values: Vec<ScalarValue>,
    null_positions: Vec<u32>,
    row_count: usize,
}

impl NullableColumnBuilder {
    /// Creates a builder with default compression settings
    pub fn new(column_type: ColumnType) -> Self {
        Self::with_selector(column_type, CompressionSelector::new())
    }

    /// Creates a builder that selects schemes with `config`
    ///
    /// Fails when `config` does not validate.
    pub fn with_config(column_type: ColumnType, config: CompressionConfig) -> ColumnarResult<Self> {
        Ok(Self::with_selector(
            column_type,
            CompressionSelector::with_config(config)?,
        ))
    }

    fn with_selector(column_type: ColumnType, selector: CompressionSelector) -> Self {
        Self {
            column_type,
            selector,
            values: Vec::new(),
            null_positions: Vec::new(),
            row_count: 0,
        }
    }

    /// Appends one row; `None` is a null
    pub fn append(&mut self, value: Option<ScalarValue>) -> ColumnarResult<()> {
        match value {
            Some(value) => {
                self.column_type.adapter().check(&value)?;
                self.values.push(value);
            }
            None => {
                let position = header_u32(self.row_count, "null position")?;
                self.null_positions.push(position);
            }
        }
        self.row_count += 1;
        Ok(())
    }

    /// Number of rows appended, nulls included
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of null rows appended so far
    pub fn null_count(&self) -> usize {
        self.null_positions.len()
    }

    /// Encodes the chunk, choosing a scheme for the non-null values
    pub fn build(&self) -> ColumnarResult<Bytes> {
        let block = self.selector.compress(self.column_type, &self.values)?;
        self.assemble(block)
    }

    /// Encodes the chunk with a fixed scheme for the non-null values
    pub fn build_with(&self, scheme: CompressionScheme) -> ColumnarResult<Bytes> {
        let block = self
            .selector
            .encode_with(scheme, self.column_type, &self.values)?;
        self.assemble(block)
    }

    fn assemble(&self, block: EncodedBlock) -> ColumnarResult<Bytes> {
        let header = HEADER_FIELD_SIZE * (1 + self.null_positions.len());
        let mut out = BytesMut::with_capacity(header + block.len());
        out.put_u32_le(header_u32(self.null_positions.len(), "null count")?);
        for position in &self.null_positions {
            out.put_u32_le(*position);
        }
        out.put_slice(block.as_ref());

        trace!(
            column_type = %self.column_type,
            rows = self.row_count,
            nulls = self.null_positions.len(),
            bytes = out.len(),
            "nullable column built"
        );
        Ok(out.freeze())
    }
}

/// Reads rows back out of a nullable column chunk
#[derive(Debug)]
pub struct NullableColumnAccessor {
    null_positions: Vec<u32>,
    next_null: usize,
    row: usize,
    decoder: Decoder,
}

impl NullableColumnAccessor {
    /// Opens a chunk produced by `NullableColumnBuilder`
    pub fn new(bytes: Bytes, column_type: ColumnType) -> ColumnarResult<Self> {
        let null_count = read_u32(&bytes, 0, "null count")?;
        let mut offset = HEADER_FIELD_SIZE;

        let mut null_positions: Vec<u32> = Vec::new();
        for _ in 0..null_count {
            let position = read_u32(&bytes, offset, "null position")?;
            if let Some(last) = null_positions.last() {
                if position <= *last {
                    return Err(corrupted_err!(
                        "null positions not increasing: {} after {}",
                        position,
                        last
                    ));
                }
            }
            null_positions.push(position);
            offset += HEADER_FIELD_SIZE;
        }

        let block = EncodedBlock::new(bytes.slice(offset..))?;
        let decoder = registry().decoder(block, column_type)?;
        Ok(Self {
            null_positions,
            next_null: 0,
            row: 0,
            decoder,
        })
    }

    /// Scheme of the non-null values
    pub fn scheme(&self) -> CompressionScheme {
        self.decoder.scheme()
    }

    /// Number of null rows in the chunk
    pub fn null_count(&self) -> usize {
        self.null_positions.len()
    }

    /// Returns whether another row can be read
    pub fn has_next(&self) -> bool {
        self.next_null < self.null_positions.len() || self.decoder.has_next()
    }

    fn at_null(&self) -> bool {
        self.null_positions
            .get(self.next_null)
            .is_some_and(|position| *position as usize == self.row)
    }

    /// Writes the next row into `row` at `ordinal`
    pub fn extract_to(&mut self, row: &mut dyn MutableRow, ordinal: usize) -> ColumnarResult<()> {
        if self.at_null() {
            row.set_null_at(ordinal);
            self.next_null += 1;
        } else {
            self.decoder.next(row, ordinal)?;
        }
        self.row += 1;
        Ok(())
    }

    /// Reads the next row, `None` for a null
    pub fn next_value(&mut self) -> ColumnarResult<Option<ScalarValue>> {
        if !self.has_next() {
            return Err(ColumnarError::DecoderExhausted);
        }
        let value = if self.at_null() {
            self.next_null += 1;
            None
        } else {
            Some(self.decoder.next_value()?)
        };
        self.row += 1;
        Ok(value)
    }

    /// Reads every remaining row
    pub fn read_all(&mut self) -> ColumnarResult<Vec<Option<ScalarValue>>> {
        let mut rows = Vec::new();
        while self.has_next() {
            rows.push(self.next_value()?);
        }
        Ok(rows)
    }
}
