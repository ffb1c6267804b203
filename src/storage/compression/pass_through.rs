/// Pass-through storage - the no-op "compression"
///
/// This is the baseline every other scheme is measured against and the
/// fallback used when compression doesn't provide any benefit, e.g. for random
/// or high-cardinality data, or for types no other scheme supports.
///
/// Layout after the tag: the raw values, serialized back to back by the
/// column's type adapter. The encoded size is always the raw size plus the
/// 4-byte tag, and encoding never fails for a value of the bound type.
use crate::common::constants::TYPE_ID_SIZE;
use crate::common::error::{ColumnarError, ColumnarResult};
use crate::storage::compression::traits::{ColumnDecoder, ColumnEncoder, CompressionStats};
use crate::storage::compression::types::{CompressionScheme, EncodedBlock};
use crate::types::{ColumnType, ScalarValue, TypeAdapter};
use bytes::{BufMut, Bytes, BytesMut};

/// Pass-through encoder
#[derive(Debug)]
pub struct PassThroughEncoder {
    adapter: &'static dyn TypeAdapter,
    buffer: BytesMut,
    finished: bool,
}

impl PassThroughEncoder {
    /// Creates a new pass-through encoder
    pub fn new(column_type: ColumnType) -> ColumnarResult<Self> {
        CompressionScheme::PassThrough.ensure_supports(column_type)?;
        Ok(Self {
            adapter: column_type.adapter(),
            buffer: BytesMut::new(),
            finished: false,
        })
    }
}

impl CompressionStats for PassThroughEncoder {
    fn uncompressed_size(&self) -> usize {
        self.buffer.len()
    }

    fn compressed_size(&self) -> usize {
        TYPE_ID_SIZE + self.buffer.len()
    }
}

impl ColumnEncoder for PassThroughEncoder {
    fn scheme(&self) -> CompressionScheme {
        CompressionScheme::PassThrough
    }

    fn column_type(&self) -> ColumnType {
        self.adapter.column_type()
    }

    fn append(&mut self, value: &ScalarValue) -> ColumnarResult<()> {
        if self.finished {
            return Err(ColumnarError::EncoderFinished);
        }
        self.adapter.append(&mut self.buffer, value)?;
        Ok(())
    }

    fn finish(&mut self) -> ColumnarResult<EncodedBlock> {
        self.finished = true;
        let mut out = EncodedBlock::writer(CompressionScheme::PassThrough, self.compressed_size());
        out.put_slice(&self.buffer);
        Ok(EncodedBlock::from_writer(out))
    }
}

/// Pass-through decoder
#[derive(Debug)]
pub struct PassThroughDecoder {
    adapter: &'static dyn TypeAdapter,
    buffer: Bytes,
    cursor: usize,
}

impl PassThroughDecoder {
    /// Opens a pass-through block
    pub fn new(block: EncodedBlock, column_type: ColumnType) -> ColumnarResult<Self> {
        block.expect_scheme(CompressionScheme::PassThrough, column_type)?;
        Ok(Self {
            adapter: column_type.adapter(),
            buffer: block.into_bytes(),
            cursor: TYPE_ID_SIZE,
        })
    }
}

impl ColumnDecoder for PassThroughDecoder {
    fn scheme(&self) -> CompressionScheme {
        CompressionScheme::PassThrough
    }

    fn has_next(&self) -> bool {
        let remaining = self.buffer.len() - self.cursor;
        if self.adapter.column_type().is_fixed_width() {
            remaining >= self.adapter.default_size()
        } else {
            remaining > 0
        }
    }

    fn next_value(&mut self) -> ColumnarResult<ScalarValue> {
        if !self.has_next() {
            return Err(ColumnarError::DecoderExhausted);
        }
        let value = self.adapter.read(&self.buffer, self.cursor)?;
        self.cursor += self.adapter.actual_size(&value)?;
        Ok(value)
    }
}
