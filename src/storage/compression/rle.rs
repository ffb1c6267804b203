/// RLE (Run-Length Encoding) compression implementation
///
/// RLE encodes consecutive runs of identical values as (value, count) pairs.
/// This is highly effective for sorted or repeated data.
///
/// Best for:
/// - Sorted columns (e.g., partition keys, sequential flags)
/// - Columns with many repeated values (e.g., status flags, categories)
///
/// Layout after the tag, with no header:
///
/// ```text
/// [value][u32 run length] [value][u32 run length] ...
/// ```
///
/// Runs are maximal: two adjacent pairs only hold the same value when the
/// first one reached the maximum run length.
use crate::common::constants::{HEADER_FIELD_SIZE, TYPE_ID_SIZE};
use crate::common::error::{ColumnarError, ColumnarResult};
use crate::corrupted_err;
use crate::storage::compression::traits::{ColumnDecoder, ColumnEncoder, CompressionStats};
use crate::storage::compression::types::{read_u32, CompressionScheme, EncodedBlock};
use crate::types::{ColumnType, ScalarValue, TypeAdapter};
use bytes::{BufMut, Bytes, BytesMut};

/// The run being accumulated
#[derive(Debug, Clone)]
struct Run {
    value: ScalarValue,
    count: u32,
    /// Serialized size of the pair once flushed
    size: usize,
}

/// RLE encoder
#[derive(Debug)]
pub struct RunLengthEncoder {
    adapter: &'static dyn TypeAdapter,
    buffer: BytesMut,
    pending: Option<Run>,
    max_run_length: u32,
    uncompressed_size: usize,
    finished: bool,
}

impl RunLengthEncoder {
    /// Creates a new RLE encoder
    pub fn new(column_type: ColumnType) -> ColumnarResult<Self> {
        Self::with_max_run_length(column_type, u32::MAX)
    }

    /// Creates an RLE encoder that splits runs longer than `max_run_length`
    pub fn with_max_run_length(column_type: ColumnType, max_run_length: u32) -> ColumnarResult<Self> {
        CompressionScheme::RunLength.ensure_supports(column_type)?;
        if max_run_length == 0 {
            return Err(ColumnarError::Config(
                "max_run_length must be positive".to_string(),
            ));
        }
        Ok(Self {
            adapter: column_type.adapter(),
            buffer: BytesMut::new(),
            pending: None,
            max_run_length,
            uncompressed_size: 0,
            finished: false,
        })
    }

    /// Writes the pending run to the output buffer
    fn flush_pending(&mut self) -> ColumnarResult<()> {
        if let Some(run) = self.pending.take() {
            self.adapter.append(&mut self.buffer, &run.value)?;
            self.buffer.put_u32_le(run.count);
        }
        Ok(())
    }
}

impl CompressionStats for RunLengthEncoder {
    fn uncompressed_size(&self) -> usize {
        self.uncompressed_size
    }

    fn compressed_size(&self) -> usize {
        TYPE_ID_SIZE + self.buffer.len() + self.pending.as_ref().map_or(0, |run| run.size)
    }
}

impl ColumnEncoder for RunLengthEncoder {
    fn scheme(&self) -> CompressionScheme {
        CompressionScheme::RunLength
    }

    fn column_type(&self) -> ColumnType {
        self.adapter.column_type()
    }

    fn append(&mut self, value: &ScalarValue) -> ColumnarResult<()> {
        if self.finished {
            return Err(ColumnarError::EncoderFinished);
        }
        let size = self.adapter.actual_size(value)?;
        self.uncompressed_size += size;

        if let Some(run) = self.pending.as_mut() {
            if run.value == *value && run.count < self.max_run_length {
                run.count += 1;
                return Ok(());
            }
        }

        self.flush_pending()?;
        self.pending = Some(Run {
            value: value.clone(),
            count: 1,
            size: size + HEADER_FIELD_SIZE,
        });
        Ok(())
    }

    fn finish(&mut self) -> ColumnarResult<EncodedBlock> {
        self.flush_pending()?;
        self.finished = true;
        let mut out = EncodedBlock::writer(CompressionScheme::RunLength, self.compressed_size());
        out.put_slice(&self.buffer);
        Ok(EncodedBlock::from_writer(out))
    }
}

/// RLE decoder
#[derive(Debug)]
pub struct RunLengthDecoder {
    adapter: &'static dyn TypeAdapter,
    buffer: Bytes,
    cursor: usize,
    current: Option<ScalarValue>,
    remaining: u32,
}

impl RunLengthDecoder {
    /// Opens an RLE block
    pub fn new(block: EncodedBlock, column_type: ColumnType) -> ColumnarResult<Self> {
        block.expect_scheme(CompressionScheme::RunLength, column_type)?;
        Ok(Self {
            adapter: column_type.adapter(),
            buffer: block.into_bytes(),
            cursor: TYPE_ID_SIZE,
            current: None,
            remaining: 0,
        })
    }

    /// Reads the next (value, run length) pair
    fn read_run(&mut self) -> ColumnarResult<()> {
        let value = self.adapter.read(&self.buffer, self.cursor)?;
        self.cursor += self.adapter.actual_size(&value)?;

        let count = read_u32(&self.buffer, self.cursor, "run length")?;
        if count == 0 {
            return Err(corrupted_err!("zero run length at offset {}", self.cursor));
        }
        self.cursor += HEADER_FIELD_SIZE;

        self.current = Some(value);
        self.remaining = count;
        Ok(())
    }
}

impl ColumnDecoder for RunLengthDecoder {
    fn scheme(&self) -> CompressionScheme {
        CompressionScheme::RunLength
    }

    fn has_next(&self) -> bool {
        self.remaining > 0 || self.cursor < self.buffer.len()
    }

    fn next_value(&mut self) -> ColumnarResult<ScalarValue> {
        if !self.has_next() {
            return Err(ColumnarError::DecoderExhausted);
        }
        if self.remaining == 0 {
            self.read_run()?;
        }
        self.remaining -= 1;
        self.current.clone().ok_or(ColumnarError::DecoderExhausted)
    }
}
