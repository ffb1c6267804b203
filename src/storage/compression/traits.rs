/// Encoder and decoder traits
///
/// Every scheme implements `ColumnEncoder` and `ColumnDecoder` over its own
/// state struct. The closed `Encoder` / `Decoder` enums in `codec` delegate to
/// them, so a column chunk is processed by one concrete state machine with no
/// per-value virtual dispatch.
use crate::common::error::{ColumnarError, ColumnarResult};
use crate::storage::compression::types::{CompressionScheme, EncodedBlock};
use crate::types::{ColumnType, MutableRow, ScalarValue};

/// Helper trait for compression statistics
pub trait CompressionStats {
    /// Returns the raw size of every value seen so far
    fn uncompressed_size(&self) -> usize;

    /// Returns the size of the encoded block, tag included
    fn compressed_size(&self) -> usize;

    /// Returns the compression ratio
    fn compression_ratio(&self) -> f64 {
        if self.compressed_size() > 0 {
            self.uncompressed_size() as f64 / self.compressed_size() as f64
        } else {
            1.0
        }
    }

    /// Returns the space savings as a percentage
    fn space_savings(&self) -> f64 {
        if self.uncompressed_size() > 0 {
            (1.0 - (self.compressed_size() as f64 / self.uncompressed_size() as f64)) * 100.0
        } else {
            0.0
        }
    }
}

/// Streaming encoder for one column chunk
///
/// Values are fed one at a time with `append`. Both sizes can be queried at any
/// point, before or after `finish`.
pub trait ColumnEncoder: CompressionStats {
    /// Scheme implemented by this encoder
    fn scheme(&self) -> CompressionScheme;

    /// Column type bound at construction
    fn column_type(&self) -> ColumnType;

    /// Consumes one value
    ///
    /// Fails with `TypeMismatch` for a value of another type and with
    /// `EncoderFinished` once `finish` has been called.
    fn append(&mut self, value: &ScalarValue) -> ColumnarResult<()>;

    /// Reports `SchemeInapplicable` when this encoder cannot represent the
    /// values seen so far
    fn check_applicable(&self) -> ColumnarResult<()> {
        Ok(())
    }

    /// Flushes pending state and returns the encoded block
    ///
    /// Calling `finish` again returns the same bytes.
    fn finish(&mut self) -> ColumnarResult<EncodedBlock>;

    /// Appends every value of `values` in order
    fn append_all<'a, I>(&mut self, values: I) -> ColumnarResult<()>
    where
        I: IntoIterator<Item = &'a ScalarValue>,
        Self: Sized,
    {
        for value in values {
            self.append(value)?;
        }
        Ok(())
    }

    /// Finishes and copies the block into `to`, returning the bytes written
    ///
    /// `to` must be pre-sized; an undersized buffer fails with
    /// `BufferTooSmall` and can be retried with a larger one.
    fn write_to(&mut self, to: &mut [u8]) -> ColumnarResult<usize> {
        let block = self.finish()?;
        if to.len() < block.len() {
            return Err(ColumnarError::BufferTooSmall {
                required: block.len(),
                available: to.len(),
            });
        }
        to[..block.len()].copy_from_slice(block.as_ref());
        Ok(block.len())
    }

    /// Encodes the raw values in `from` into `to`
    ///
    /// `from` holds values serialized back to back by the column's type
    /// adapter. On `BufferTooSmall` the values stay appended; retry with
    /// `write_to`.
    fn compress(&mut self, from: &[u8], to: &mut [u8]) -> ColumnarResult<usize> {
        let adapter = self.column_type().adapter();
        let mut offset = 0;
        while offset < from.len() {
            let value = adapter.read(from, offset)?;
            offset += adapter.actual_size(&value)?;
            self.append(&value)?;
        }
        self.write_to(to)
    }
}

/// Streaming decoder over one encoded block
pub trait ColumnDecoder {
    /// Scheme implemented by this decoder
    fn scheme(&self) -> CompressionScheme;

    /// Returns whether another value can be decoded
    fn has_next(&self) -> bool;

    /// Decodes the next value, failing with `DecoderExhausted` past the end
    fn next_value(&mut self) -> ColumnarResult<ScalarValue>;

    /// Decodes the next value into `row` at `ordinal`
    fn next(&mut self, row: &mut dyn MutableRow, ordinal: usize) -> ColumnarResult<()> {
        let value = self.next_value()?;
        row.update(ordinal, value);
        Ok(())
    }

    /// Turns the decoder into an iterator over decoded values
    fn into_values(self) -> DecodedValues<Self>
    where
        Self: Sized,
    {
        DecodedValues { decoder: self }
    }

    /// Decodes every remaining value
    fn decode_all(self) -> ColumnarResult<Vec<ScalarValue>>
    where
        Self: Sized,
    {
        self.into_values().collect()
    }
}

/// Iterator over the values of a decoder
#[derive(Debug)]
pub struct DecodedValues<D> {
    decoder: D,
}

impl<D: ColumnDecoder> Iterator for DecodedValues<D> {
    type Item = ColumnarResult<ScalarValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.decoder.has_next() {
            Some(self.decoder.next_value())
        } else {
            None
        }
    }
}
