/// Scheme dispatch
///
/// `Encoder` and `Decoder` are closed enums over the per-scheme state
/// machines, built from a `CompressionScheme`. Every trait call is forwarded
/// to the wrapped state with a single match.
use crate::common::error::ColumnarResult;
use crate::config::CompressionConfig;
use crate::storage::compression::bitset::{BooleanBitSetDecoder, BooleanBitSetEncoder};
use crate::storage::compression::delta::{DeltaDecoder, DeltaEncoder};
use crate::storage::compression::dictionary::{DictionaryDecoder, DictionaryEncoder};
use crate::storage::compression::pass_through::{PassThroughDecoder, PassThroughEncoder};
use crate::storage::compression::rle::{RunLengthDecoder, RunLengthEncoder};
use crate::storage::compression::traits::{ColumnDecoder, ColumnEncoder, CompressionStats};
use crate::storage::compression::types::{CompressionScheme, EncodedBlock};
use crate::types::{ColumnType, ScalarValue};

macro_rules! dispatch {
    ($enum:ident, $value:expr, $inner:ident => $body:expr) => {
        match $value {
            $enum::PassThrough($inner) => $body,
            $enum::RunLength($inner) => $body,
            $enum::Dictionary($inner) => $body,
            $enum::BooleanBitSet($inner) => $body,
            $enum::Delta($inner) => $body,
        }
    };
}

/// Encoder for any scheme
#[derive(Debug)]
pub enum Encoder {
    PassThrough(PassThroughEncoder),
    RunLength(RunLengthEncoder),
    Dictionary(DictionaryEncoder),
    BooleanBitSet(BooleanBitSetEncoder),
    Delta(DeltaEncoder),
}

impl CompressionStats for Encoder {
    fn uncompressed_size(&self) -> usize {
        dispatch!(Encoder, self, e => e.uncompressed_size())
    }

    fn compressed_size(&self) -> usize {
        dispatch!(Encoder, self, e => e.compressed_size())
    }
}

impl ColumnEncoder for Encoder {
    fn scheme(&self) -> CompressionScheme {
        dispatch!(Encoder, self, e => e.scheme())
    }

    fn column_type(&self) -> ColumnType {
        dispatch!(Encoder, self, e => e.column_type())
    }

    fn append(&mut self, value: &ScalarValue) -> ColumnarResult<()> {
        dispatch!(Encoder, self, e => e.append(value))
    }

    fn check_applicable(&self) -> ColumnarResult<()> {
        dispatch!(Encoder, self, e => e.check_applicable())
    }

    fn finish(&mut self) -> ColumnarResult<EncodedBlock> {
        dispatch!(Encoder, self, e => e.finish())
    }
}

/// Decoder for any scheme
#[derive(Debug)]
pub enum Decoder {
    PassThrough(PassThroughDecoder),
    RunLength(RunLengthDecoder),
    Dictionary(DictionaryDecoder),
    BooleanBitSet(BooleanBitSetDecoder),
    Delta(DeltaDecoder),
}

impl ColumnDecoder for Decoder {
    fn scheme(&self) -> CompressionScheme {
        dispatch!(Decoder, self, d => d.scheme())
    }

    fn has_next(&self) -> bool {
        dispatch!(Decoder, self, d => d.has_next())
    }

    fn next_value(&mut self) -> ColumnarResult<ScalarValue> {
        dispatch!(Decoder, self, d => d.next_value())
    }
}

impl CompressionScheme {
    /// Creates an encoder with default settings
    pub fn encoder(&self, column_type: ColumnType) -> ColumnarResult<Encoder> {
        self.encoder_with_config(column_type, &CompressionConfig::default())
    }

    /// Creates an encoder using the limits in `config`
    ///
    /// Fails with `UnsupportedType` when this scheme cannot encode
    /// `column_type`.
    pub fn encoder_with_config(
        &self,
        column_type: ColumnType,
        config: &CompressionConfig,
    ) -> ColumnarResult<Encoder> {
        let encoder = match self {
            CompressionScheme::PassThrough => {
                Encoder::PassThrough(PassThroughEncoder::new(column_type)?)
            }
            CompressionScheme::RunLength => Encoder::RunLength(
                RunLengthEncoder::with_max_run_length(column_type, config.max_run_length)?,
            ),
            CompressionScheme::Dictionary => Encoder::Dictionary(
                DictionaryEncoder::with_max_dictionary_size(
                    column_type,
                    config.max_dictionary_size,
                )?,
            ),
            CompressionScheme::BooleanBitSet => {
                Encoder::BooleanBitSet(BooleanBitSetEncoder::new(column_type)?)
            }
            CompressionScheme::Delta => Encoder::Delta(DeltaEncoder::new(column_type)?),
        };
        Ok(encoder)
    }

    /// Opens `block` with this scheme's decoder
    ///
    /// The block's tag must match this scheme.
    pub fn decoder(&self, block: EncodedBlock, column_type: ColumnType) -> ColumnarResult<Decoder> {
        let decoder = match self {
            CompressionScheme::PassThrough => {
                Decoder::PassThrough(PassThroughDecoder::new(block, column_type)?)
            }
            CompressionScheme::RunLength => {
                Decoder::RunLength(RunLengthDecoder::new(block, column_type)?)
            }
            CompressionScheme::Dictionary => {
                Decoder::Dictionary(DictionaryDecoder::new(block, column_type)?)
            }
            CompressionScheme::BooleanBitSet => {
                Decoder::BooleanBitSet(BooleanBitSetDecoder::new(block, column_type)?)
            }
            CompressionScheme::Delta => Decoder::Delta(DeltaDecoder::new(block, column_type)?),
        };
        Ok(decoder)
    }
}
