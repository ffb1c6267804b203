/// Delta compression implementation
///
/// Each value is stored as its difference from the previous value, in one
/// signed byte, whenever that difference fits in `-127..=127`. Otherwise the
/// escape byte `0x80` is written followed by the full value. The first value
/// is always escaped.
///
/// Best for:
/// - Monotonic ids and timestamps
/// - Slowly changing counters
///
/// Differences are computed in the column's native width with wrapping
/// arithmetic, so an Int column that steps across `i32::MAX` still decodes to
/// the original values.
use crate::common::constants::{DELTA_ESCAPE, TYPE_ID_SIZE};
use crate::common::error::{ColumnarError, ColumnarResult};
use crate::corrupted_err;
use crate::storage::compression::traits::{ColumnDecoder, ColumnEncoder, CompressionStats};
use crate::storage::compression::types::{CompressionScheme, EncodedBlock};
use crate::types::{ColumnType, ScalarValue, TypeAdapter};
use bytes::{BufMut, Bytes, BytesMut};

/// Largest magnitude stored inline as a single delta byte
const MAX_INLINE_DELTA: i64 = i8::MAX as i64;

/// Difference `current - previous` in the native width of `column_type`
fn wrapping_delta(column_type: ColumnType, current: i64, previous: i64) -> i64 {
    match column_type {
        ColumnType::Int => (current as i32).wrapping_sub(previous as i32) as i64,
        _ => current.wrapping_sub(previous),
    }
}

/// Inverse of `wrapping_delta`
fn wrapping_apply(column_type: ColumnType, previous: i64, delta: i64) -> i64 {
    match column_type {
        ColumnType::Int => (previous as i32).wrapping_add(delta as i32) as i64,
        _ => previous.wrapping_add(delta),
    }
}

/// Delta encoder
#[derive(Debug)]
pub struct DeltaEncoder {
    adapter: &'static dyn TypeAdapter,
    buffer: BytesMut,
    previous: Option<i64>,
    uncompressed_size: usize,
    finished: bool,
}

impl DeltaEncoder {
    /// Creates a new delta encoder
    pub fn new(column_type: ColumnType) -> ColumnarResult<Self> {
        CompressionScheme::Delta.ensure_supports(column_type)?;
        Ok(Self {
            adapter: column_type.adapter(),
            buffer: BytesMut::new(),
            previous: None,
            uncompressed_size: 0,
            finished: false,
        })
    }
}

impl CompressionStats for DeltaEncoder {
    fn uncompressed_size(&self) -> usize {
        self.uncompressed_size
    }

    fn compressed_size(&self) -> usize {
        TYPE_ID_SIZE + self.buffer.len()
    }
}

impl ColumnEncoder for DeltaEncoder {
    fn scheme(&self) -> CompressionScheme {
        CompressionScheme::Delta
    }

    fn column_type(&self) -> ColumnType {
        self.adapter.column_type()
    }

    fn append(&mut self, value: &ScalarValue) -> ColumnarResult<()> {
        if self.finished {
            return Err(ColumnarError::EncoderFinished);
        }
        self.adapter.check(value)?;
        let column_type = self.adapter.column_type();
        let current = value.as_i64().ok_or_else(|| ColumnarError::TypeMismatch {
            expected: column_type,
            found: value.column_type().name().to_string(),
        })?;
        self.uncompressed_size += self.adapter.default_size();

        match self.previous {
            Some(previous) => {
                let delta = wrapping_delta(column_type, current, previous);
                if (-MAX_INLINE_DELTA..=MAX_INLINE_DELTA).contains(&delta) {
                    self.buffer.put_i8(delta as i8);
                } else {
                    self.buffer.put_i8(DELTA_ESCAPE);
                    self.adapter.append(&mut self.buffer, value)?;
                }
            }
            None => {
                self.buffer.put_i8(DELTA_ESCAPE);
                self.adapter.append(&mut self.buffer, value)?;
            }
        }
        self.previous = Some(current);
        Ok(())
    }

    fn finish(&mut self) -> ColumnarResult<EncodedBlock> {
        self.finished = true;
        let mut out = EncodedBlock::writer(CompressionScheme::Delta, self.compressed_size());
        out.put_slice(&self.buffer);
        Ok(EncodedBlock::from_writer(out))
    }
}

/// Delta decoder
#[derive(Debug)]
pub struct DeltaDecoder {
    adapter: &'static dyn TypeAdapter,
    buffer: Bytes,
    cursor: usize,
    previous: Option<i64>,
}

impl DeltaDecoder {
    /// Opens a delta block
    pub fn new(block: EncodedBlock, column_type: ColumnType) -> ColumnarResult<Self> {
        block.expect_scheme(CompressionScheme::Delta, column_type)?;
        Ok(Self {
            adapter: column_type.adapter(),
            buffer: block.into_bytes(),
            cursor: TYPE_ID_SIZE,
            previous: None,
        })
    }
}

impl ColumnDecoder for DeltaDecoder {
    fn scheme(&self) -> CompressionScheme {
        CompressionScheme::Delta
    }

    fn has_next(&self) -> bool {
        self.cursor < self.buffer.len()
    }

    fn next_value(&mut self) -> ColumnarResult<ScalarValue> {
        if !self.has_next() {
            return Err(ColumnarError::DecoderExhausted);
        }
        let column_type = self.adapter.column_type();
        let delta = self.buffer[self.cursor] as i8;
        self.cursor += 1;

        let current = if delta == DELTA_ESCAPE {
            let value = self.adapter.read(&self.buffer, self.cursor)?;
            self.cursor += self.adapter.default_size();
            value
                .as_i64()
                .ok_or_else(|| corrupted_err!("non-integral value in delta block"))?
        } else {
            let previous = self.previous.ok_or_else(|| {
                corrupted_err!("delta block does not start with an escaped value")
            })?;
            wrapping_apply(column_type, previous, delta as i64)
        };

        self.previous = Some(current);
        ScalarValue::from_i64(column_type, current)
    }
}
