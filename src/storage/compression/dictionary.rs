/// Dictionary compression implementation
///
/// Dictionary encoding maps values to integer codes, storing the unique values
/// in a dictionary and replacing each occurrence with its code. Codes are
/// assigned in first-seen order.
///
/// Best for:
/// - Low-cardinality strings (e.g., country codes, status values)
/// - Categorical integer columns
///
/// Layout after the tag:
///
/// ```text
/// [u32 value count][u32 dictionary size][u8 code width]
/// [dictionary entries...][codes...]
/// ```
///
/// Codes are 1 byte wide for dictionaries of up to 256 entries and 2 bytes
/// wide otherwise. A column with more distinct values than the configured
/// maximum overflows the dictionary; the encoder then reports itself as
/// inapplicable instead of producing a block.
use crate::common::constants::{
    DEFAULT_MAX_DICTIONARY_SIZE, HEADER_FIELD_SIZE, MAX_DICTIONARY_CODES, TYPE_ID_SIZE,
};
use crate::common::error::{ColumnarError, ColumnarResult};
use crate::corrupted_err;
use crate::storage::compression::traits::{ColumnDecoder, ColumnEncoder, CompressionStats};
use crate::storage::compression::types::{
    header_u32, read_u32, read_u8, CompressionScheme, EncodedBlock,
};
use crate::types::{ColumnType, ScalarValue, TypeAdapter};
use ahash::AHashMap;
use byteorder::{ByteOrder, LittleEndian};
use bytes::{BufMut, Bytes, BytesMut};

/// Fixed header: value count, dictionary size, code width
const DICTIONARY_HEADER_SIZE: usize = HEADER_FIELD_SIZE * 2 + 1;

/// Determines the code width for a dictionary of `dict_size` entries
fn select_code_width(dict_size: usize) -> usize {
    if dict_size <= 256 {
        1
    } else {
        2
    }
}

/// Dictionary encoder
#[derive(Debug)]
pub struct DictionaryEncoder {
    adapter: &'static dyn TypeAdapter,
    max_dictionary_size: usize,
    /// Serialized value -> code
    dictionary: AHashMap<Bytes, u16>,
    /// Serialized dictionary entries in code order
    entries: BytesMut,
    codes: Vec<u16>,
    scratch: BytesMut,
    value_count: usize,
    uncompressed_size: usize,
    overflow: bool,
    finished: bool,
}

impl DictionaryEncoder {
    /// Creates a new dictionary encoder with the default capacity
    pub fn new(column_type: ColumnType) -> ColumnarResult<Self> {
        Self::with_max_dictionary_size(column_type, DEFAULT_MAX_DICTIONARY_SIZE)
    }

    /// Creates a dictionary encoder holding at most `max_dictionary_size` entries
    pub fn with_max_dictionary_size(
        column_type: ColumnType,
        max_dictionary_size: usize,
    ) -> ColumnarResult<Self> {
        CompressionScheme::Dictionary.ensure_supports(column_type)?;
        if max_dictionary_size == 0 || max_dictionary_size > MAX_DICTIONARY_CODES {
            return Err(ColumnarError::Config(format!(
                "max_dictionary_size must be in 1..={}, got {}",
                MAX_DICTIONARY_CODES, max_dictionary_size
            )));
        }
        Ok(Self {
            adapter: column_type.adapter(),
            max_dictionary_size,
            dictionary: AHashMap::new(),
            entries: BytesMut::new(),
            codes: Vec::new(),
            scratch: BytesMut::new(),
            value_count: 0,
            uncompressed_size: 0,
            overflow: false,
            finished: false,
        })
    }

    /// Number of distinct values collected so far
    pub fn dictionary_size(&self) -> usize {
        self.dictionary.len()
    }

    fn code_width(&self) -> usize {
        select_code_width(self.dictionary.len())
    }

    fn overflow_error(&self) -> ColumnarError {
        ColumnarError::SchemeInapplicable {
            scheme: CompressionScheme::Dictionary,
            reason: format!(
                "more than {} distinct values",
                self.max_dictionary_size
            ),
        }
    }
}

impl CompressionStats for DictionaryEncoder {
    fn uncompressed_size(&self) -> usize {
        self.uncompressed_size
    }

    /// Returns `usize::MAX` once the dictionary has overflowed
    fn compressed_size(&self) -> usize {
        if self.overflow {
            return usize::MAX;
        }
        TYPE_ID_SIZE
            + DICTIONARY_HEADER_SIZE
            + self.entries.len()
            + self.value_count * self.code_width()
    }
}

impl ColumnEncoder for DictionaryEncoder {
    fn scheme(&self) -> CompressionScheme {
        CompressionScheme::Dictionary
    }

    fn column_type(&self) -> ColumnType {
        self.adapter.column_type()
    }

    fn append(&mut self, value: &ScalarValue) -> ColumnarResult<()> {
        if self.finished {
            return Err(ColumnarError::EncoderFinished);
        }
        self.scratch.clear();
        let size = self.adapter.append(&mut self.scratch, value)?;
        self.uncompressed_size += size;
        self.value_count += 1;
        if self.overflow {
            return Ok(());
        }

        if let Some(code) = self.dictionary.get(&self.scratch[..]) {
            self.codes.push(*code);
            return Ok(());
        }

        if self.dictionary.len() >= self.max_dictionary_size {
            self.overflow = true;
            self.codes = Vec::new();
            return Ok(());
        }

        let code = self.dictionary.len() as u16;
        self.entries.put_slice(&self.scratch);
        self.dictionary
            .insert(Bytes::copy_from_slice(&self.scratch), code);
        self.codes.push(code);
        Ok(())
    }

    fn check_applicable(&self) -> ColumnarResult<()> {
        if self.overflow {
            Err(self.overflow_error())
        } else {
            Ok(())
        }
    }

    fn finish(&mut self) -> ColumnarResult<EncodedBlock> {
        self.check_applicable()?;
        self.finished = true;

        let code_width = self.code_width();
        let mut out = EncodedBlock::writer(CompressionScheme::Dictionary, self.compressed_size());
        out.put_u32_le(header_u32(self.value_count, "value count")?);
        out.put_u32_le(header_u32(self.dictionary.len(), "dictionary size")?);
        out.put_u8(code_width as u8);
        out.put_slice(&self.entries);
        for code in &self.codes {
            if code_width == 1 {
                out.put_u8(*code as u8);
            } else {
                out.put_u16_le(*code);
            }
        }
        Ok(EncodedBlock::from_writer(out))
    }
}

/// Dictionary decoder
#[derive(Debug)]
pub struct DictionaryDecoder {
    buffer: Bytes,
    cursor: usize,
    dictionary: Vec<ScalarValue>,
    code_width: usize,
    value_count: usize,
    consumed: usize,
}

impl DictionaryDecoder {
    /// Opens a dictionary block, reading the header and the dictionary
    pub fn new(block: EncodedBlock, column_type: ColumnType) -> ColumnarResult<Self> {
        block.expect_scheme(CompressionScheme::Dictionary, column_type)?;
        let adapter = column_type.adapter();
        let buffer = block.into_bytes();

        let mut cursor = TYPE_ID_SIZE;
        let value_count = read_u32(&buffer, cursor, "value count")? as usize;
        cursor += HEADER_FIELD_SIZE;
        let dict_size = read_u32(&buffer, cursor, "dictionary size")? as usize;
        cursor += HEADER_FIELD_SIZE;
        let code_width = read_u8(&buffer, cursor, "code width")? as usize;
        cursor += 1;
        if code_width != select_code_width(dict_size) {
            return Err(corrupted_err!(
                "code width {} does not match a dictionary of {} entries",
                code_width,
                dict_size
            ));
        }

        let mut dictionary = Vec::with_capacity(dict_size.min(MAX_DICTIONARY_CODES));
        for _ in 0..dict_size {
            let value = adapter.read(&buffer, cursor)?;
            cursor += adapter.actual_size(&value)?;
            dictionary.push(value);
        }

        let codes_len = value_count
            .checked_mul(code_width)
            .ok_or_else(|| corrupted_err!("value count {} overflows", value_count))?;
        if buffer.len() - cursor < codes_len {
            return Err(corrupted_err!(
                "expected {} bytes of codes, found {}",
                codes_len,
                buffer.len() - cursor
            ));
        }

        Ok(Self {
            buffer,
            cursor,
            dictionary,
            code_width,
            value_count,
            consumed: 0,
        })
    }
}

impl ColumnDecoder for DictionaryDecoder {
    fn scheme(&self) -> CompressionScheme {
        CompressionScheme::Dictionary
    }

    fn has_next(&self) -> bool {
        self.consumed < self.value_count
    }

    fn next_value(&mut self) -> ColumnarResult<ScalarValue> {
        if !self.has_next() {
            return Err(ColumnarError::DecoderExhausted);
        }
        let code = if self.code_width == 1 {
            self.buffer[self.cursor] as usize
        } else {
            LittleEndian::read_u16(&self.buffer[self.cursor..self.cursor + 2]) as usize
        };
        self.cursor += self.code_width;
        self.consumed += 1;

        self.dictionary
            .get(code)
            .cloned()
            .ok_or_else(|| corrupted_err!("dictionary code {} out of range", code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<ScalarValue> {
        values.iter().map(|s| ScalarValue::from(*s)).collect()
    }

    #[test]
    fn test_select_code_width() {
        assert_eq!(select_code_width(0), 1);
        assert_eq!(select_code_width(256), 1);
        assert_eq!(select_code_width(257), 2);
        assert_eq!(select_code_width(65536), 2);
    }

    #[test]
    fn test_dictionary_compression_strings() {
        let data = strings(&["apple", "banana", "apple", "cherry", "banana"]);
        let mut encoder = DictionaryEncoder::new(ColumnType::String).unwrap();
        encoder.append_all(&data).unwrap();
        assert_eq!(encoder.dictionary_size(), 3);

        let block = encoder.finish().unwrap();
        let entries = (4 + 5) + (4 + 6) + (4 + 6);
        assert_eq!(block.len(), 4 + 9 + entries + 5);
        assert_eq!(block.len(), encoder.compressed_size());

        // codes in first-seen order
        assert_eq!(&block.payload()[9 + entries..], &[0, 1, 0, 2, 1]);

        let decoded = DictionaryDecoder::new(block, ColumnType::String)
            .unwrap()
            .decode_all()
            .unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_dictionary_two_byte_codes() {
        let data: Vec<ScalarValue> = (0..300).map(|i| ScalarValue::Long(i % 290)).collect();
        let mut encoder = DictionaryEncoder::new(ColumnType::Long).unwrap();
        encoder.append_all(&data).unwrap();
        assert_eq!(encoder.compressed_size(), 4 + 9 + 290 * 8 + 300 * 2);

        let block = encoder.finish().unwrap();
        let decoded = DictionaryDecoder::new(block, ColumnType::Long)
            .unwrap()
            .decode_all()
            .unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_dictionary_overflow_is_inapplicable() {
        let mut encoder = DictionaryEncoder::with_max_dictionary_size(ColumnType::Int, 4).unwrap();
        for i in 0..5 {
            encoder.append(&ScalarValue::Int(i)).unwrap();
        }

        assert_eq!(encoder.compressed_size(), usize::MAX);
        assert_eq!(encoder.uncompressed_size(), 20);
        assert!(encoder.check_applicable().unwrap_err().is_inapplicable());
        assert!(encoder.finish().unwrap_err().is_inapplicable());
    }

    #[test]
    fn test_dictionary_empty() {
        let mut encoder = DictionaryEncoder::new(ColumnType::Int).unwrap();
        let block = encoder.finish().unwrap();
        assert_eq!(block.len(), 4 + 9);

        let decoder = DictionaryDecoder::new(block, ColumnType::Int).unwrap();
        assert!(!decoder.has_next());
    }

    #[test]
    fn test_dictionary_truncated_codes() {
        let data = strings(&["a", "b", "a"]);
        let mut encoder = DictionaryEncoder::new(ColumnType::String).unwrap();
        encoder.append_all(&data).unwrap();
        let block = encoder.finish().unwrap();

        let truncated = block.as_bytes().slice(..block.len() - 1);
        let err = DictionaryDecoder::new(EncodedBlock::new(truncated).unwrap(), ColumnType::String)
            .unwrap_err();
        assert!(matches!(err, ColumnarError::Corrupted(_)));
    }

    #[test]
    fn test_dictionary_invalid_capacity() {
        assert!(DictionaryEncoder::with_max_dictionary_size(ColumnType::Int, 0).is_err());
        assert!(DictionaryEncoder::with_max_dictionary_size(ColumnType::Int, 70_000).is_err());
        assert!(DictionaryEncoder::new(ColumnType::Boolean).is_err());
    }
}
