/// Boolean bit-set compression
///
/// Packs boolean values one bit each into little-endian 64-bit words.
/// Value `i` lives in bit `i % 64` of word `i / 64`; unused high bits of the
/// last word are zero.
///
/// Layout after the tag:
///
/// ```text
/// [u32 value count][u64 word]...
/// ```
use crate::common::constants::{BITS_PER_WORD, HEADER_FIELD_SIZE, TYPE_ID_SIZE, WORD_SIZE};
use crate::common::error::{ColumnarError, ColumnarResult};
use crate::corrupted_err;
use crate::storage::compression::traits::{ColumnDecoder, ColumnEncoder, CompressionStats};
use crate::storage::compression::types::{
    header_u32, read_u32, read_u64, CompressionScheme, EncodedBlock,
};
use crate::types::{ColumnType, ScalarValue, TypeAdapter};
use bytes::{BufMut, Bytes};

/// Number of words needed for `count` bits
fn words_for(count: usize) -> usize {
    count.div_ceil(BITS_PER_WORD)
}

/// Boolean bit-set encoder
#[derive(Debug)]
pub struct BooleanBitSetEncoder {
    adapter: &'static dyn TypeAdapter,
    words: Vec<u64>,
    count: usize,
    finished: bool,
}

impl BooleanBitSetEncoder {
    /// Creates a new bit-set encoder
    pub fn new(column_type: ColumnType) -> ColumnarResult<Self> {
        CompressionScheme::BooleanBitSet.ensure_supports(column_type)?;
        Ok(Self {
            adapter: column_type.adapter(),
            words: Vec::new(),
            count: 0,
            finished: false,
        })
    }
}

impl CompressionStats for BooleanBitSetEncoder {
    fn uncompressed_size(&self) -> usize {
        self.count * self.adapter.default_size()
    }

    fn compressed_size(&self) -> usize {
        TYPE_ID_SIZE + HEADER_FIELD_SIZE + words_for(self.count) * WORD_SIZE
    }
}

impl ColumnEncoder for BooleanBitSetEncoder {
    fn scheme(&self) -> CompressionScheme {
        CompressionScheme::BooleanBitSet
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::Boolean
    }

    fn append(&mut self, value: &ScalarValue) -> ColumnarResult<()> {
        if self.finished {
            return Err(ColumnarError::EncoderFinished);
        }
        self.adapter.check(value)?;
        let bit = value.as_bool().unwrap_or(false);

        let offset = self.count % BITS_PER_WORD;
        if offset == 0 {
            self.words.push(0);
        }
        if bit {
            if let Some(word) = self.words.last_mut() {
                *word |= 1u64 << offset;
            }
        }
        self.count += 1;
        Ok(())
    }

    fn finish(&mut self) -> ColumnarResult<EncodedBlock> {
        self.finished = true;
        let mut out = EncodedBlock::writer(CompressionScheme::BooleanBitSet, self.compressed_size());
        out.put_u32_le(header_u32(self.count, "value count")?);
        for word in &self.words {
            out.put_u64_le(*word);
        }
        Ok(EncodedBlock::from_writer(out))
    }
}

/// Boolean bit-set decoder
#[derive(Debug)]
pub struct BooleanBitSetDecoder {
    buffer: Bytes,
    count: usize,
    visited: usize,
    current_word: u64,
}

impl BooleanBitSetDecoder {
    /// Opens a bit-set block, checking that every word is present
    pub fn new(block: EncodedBlock, column_type: ColumnType) -> ColumnarResult<Self> {
        block.expect_scheme(CompressionScheme::BooleanBitSet, column_type)?;
        let buffer = block.into_bytes();
        let count = read_u32(&buffer, TYPE_ID_SIZE, "value count")? as usize;

        let expected = TYPE_ID_SIZE + HEADER_FIELD_SIZE + words_for(count) * WORD_SIZE;
        if buffer.len() < expected {
            return Err(corrupted_err!(
                "bit-set of {} values needs {} bytes, found {}",
                count,
                expected,
                buffer.len()
            ));
        }

        Ok(Self {
            buffer,
            count,
            visited: 0,
            current_word: 0,
        })
    }
}

impl ColumnDecoder for BooleanBitSetDecoder {
    fn scheme(&self) -> CompressionScheme {
        CompressionScheme::BooleanBitSet
    }

    fn has_next(&self) -> bool {
        self.visited < self.count
    }

    fn next_value(&mut self) -> ColumnarResult<ScalarValue> {
        if !self.has_next() {
            return Err(ColumnarError::DecoderExhausted);
        }
        let bit = self.visited % BITS_PER_WORD;
        if bit == 0 {
            let offset = TYPE_ID_SIZE + HEADER_FIELD_SIZE + (self.visited / BITS_PER_WORD) * WORD_SIZE;
            self.current_word = read_u64(&self.buffer, offset, "bit-set word")?;
        }
        self.visited += 1;
        Ok(ScalarValue::Boolean((self.current_word >> bit) & 1 == 1))
    }
}
