/// Compression schemes and the encoded block format
///
/// Every encoded block starts with the 4-byte little-endian type id of the
/// scheme that produced it, followed by a scheme-specific payload. The type id
/// is the only part of the layout shared by all schemes.
use crate::common::constants::TYPE_ID_SIZE;
use crate::common::error::{ColumnarError, ColumnarResult};
use crate::corrupted_err;
use crate::types::{ColumnType, ScalarValue};
use byteorder::{ByteOrder, LittleEndian};
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compression scheme identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompressionScheme {
    /// No compression - raw values behind the tag
    /// Best for: incompressible data, and the fallback for everything else
    PassThrough,

    /// Run-Length Encoding - stores (value, run length) pairs
    /// Best for: sorted data, long runs of repeated values
    RunLength,

    /// Dictionary encoding - maps values to 1 or 2 byte codes
    /// Best for: low-cardinality integers and strings
    Dictionary,

    /// Boolean bit-set - one bit per value packed into 64-bit words
    BooleanBitSet,

    /// Delta encoding - one signed byte per value when neighbours are close
    /// Best for: monotonic ids, timestamps, slowly changing counters
    Delta,
}

impl CompressionScheme {
    /// Tie-break order used by scheme selection: specialized schemes by
    /// ascending type id, pass-through last
    pub const PRIORITY: [CompressionScheme; 5] = [
        CompressionScheme::RunLength,
        CompressionScheme::Dictionary,
        CompressionScheme::BooleanBitSet,
        CompressionScheme::Delta,
        CompressionScheme::PassThrough,
    ];

    /// Stable on-wire tag of this scheme
    pub fn type_id(&self) -> u32 {
        match self {
            CompressionScheme::PassThrough => 1,
            CompressionScheme::RunLength => 2,
            CompressionScheme::Dictionary => 3,
            CompressionScheme::BooleanBitSet => 4,
            CompressionScheme::Delta => 5,
        }
    }

    /// Returns human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            CompressionScheme::PassThrough => "PassThrough",
            CompressionScheme::RunLength => "RunLength",
            CompressionScheme::Dictionary => "Dictionary",
            CompressionScheme::BooleanBitSet => "BooleanBitSet",
            CompressionScheme::Delta => "Delta",
        }
    }

    /// Returns whether this scheme can encode columns of `column_type`
    pub fn supports(&self, column_type: ColumnType) -> bool {
        match self {
            CompressionScheme::PassThrough => true,
            CompressionScheme::RunLength => matches!(
                column_type,
                ColumnType::Boolean
                    | ColumnType::Byte
                    | ColumnType::Short
                    | ColumnType::Int
                    | ColumnType::Long
                    | ColumnType::String
            ),
            CompressionScheme::Dictionary => matches!(
                column_type,
                ColumnType::Int | ColumnType::Long | ColumnType::String
            ),
            CompressionScheme::BooleanBitSet => column_type == ColumnType::Boolean,
            CompressionScheme::Delta => matches!(column_type, ColumnType::Int | ColumnType::Long),
        }
    }

    /// Fails with `UnsupportedType` unless this scheme supports `column_type`
    pub(crate) fn ensure_supports(&self, column_type: ColumnType) -> ColumnarResult<()> {
        if self.supports(column_type) {
            Ok(())
        } else {
            Err(ColumnarError::UnsupportedType {
                scheme: *self,
                column_type,
            })
        }
    }
}

impl fmt::Display for CompressionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CompressionScheme {
    type Err = ColumnarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "passthrough" | "uncompressed" => Ok(CompressionScheme::PassThrough),
            "runlength" | "rle" => Ok(CompressionScheme::RunLength),
            "dictionary" | "dict" => Ok(CompressionScheme::Dictionary),
            "booleanbitset" | "bitset" => Ok(CompressionScheme::BooleanBitSet),
            "delta" => Ok(CompressionScheme::Delta),
            _ => Err(ColumnarError::Config(format!(
                "Unknown compression scheme '{}'",
                s
            ))),
        }
    }
}

/// Tag-prefixed byte sequence produced by an encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBlock {
    bytes: Bytes,
}

impl EncodedBlock {
    /// Wraps persisted bytes, checking that the type id tag is present
    pub fn new(bytes: impl Into<Bytes>) -> ColumnarResult<Self> {
        let bytes = bytes.into();
        if bytes.len() < TYPE_ID_SIZE {
            return Err(corrupted_err!(
                "encoded block of {} bytes is shorter than its type id",
                bytes.len()
            ));
        }
        Ok(Self { bytes })
    }

    /// Type id of the scheme that produced this block
    pub fn type_id(&self) -> u32 {
        LittleEndian::read_u32(&self.bytes[..TYPE_ID_SIZE])
    }

    /// Scheme-specific payload following the tag
    pub fn payload(&self) -> &[u8] {
        &self.bytes[TYPE_ID_SIZE..]
    }

    /// Returns the whole block, tag included
    pub fn as_bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Consumes the block, returning its bytes
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Total size in bytes, tag included
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns whether the block holds nothing but its tag
    pub fn is_empty(&self) -> bool {
        self.bytes.len() == TYPE_ID_SIZE
    }

    /// Starts a block for `scheme` with room for `capacity` bytes
    pub(crate) fn writer(scheme: CompressionScheme, capacity: usize) -> BytesMut {
        let mut out = BytesMut::with_capacity(capacity.max(TYPE_ID_SIZE));
        out.put_u32_le(scheme.type_id());
        out
    }

    pub(crate) fn from_writer(out: BytesMut) -> Self {
        Self {
            bytes: out.freeze(),
        }
    }

    /// Checks that this block was produced by `scheme` for a supported type
    pub(crate) fn expect_scheme(
        &self,
        scheme: CompressionScheme,
        column_type: ColumnType,
    ) -> ColumnarResult<()> {
        scheme.ensure_supports(column_type)?;
        if self.type_id() != scheme.type_id() {
            return Err(corrupted_err!(
                "block tagged with type id {}, expected {} ({})",
                self.type_id(),
                scheme.type_id(),
                scheme
            ));
        }
        Ok(())
    }
}

impl AsRef<[u8]> for EncodedBlock {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Values of one column, handed to multi-column compression
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnChunk {
    /// Scalar type of every value
    pub column_type: ColumnType,

    /// Values in column order
    pub values: Vec<ScalarValue>,
}

impl ColumnChunk {
    /// Creates a new column chunk
    pub fn new(column_type: ColumnType, values: Vec<ScalarValue>) -> Self {
        Self {
            column_type,
            values,
        }
    }
}

/// Result of running one candidate scheme over a column sample
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeResult {
    /// Candidate scheme
    pub scheme: CompressionScheme,

    /// Raw size of the sampled values in bytes
    pub uncompressed_size: usize,

    /// Encoded size in bytes, tag included
    pub compressed_size: usize,

    /// Estimated compression ratio (uncompressed_size / compressed_size)
    pub compression_ratio: f64,
}

impl AnalyzeResult {
    /// Creates a new analyze result
    pub fn new(scheme: CompressionScheme, uncompressed_size: usize, compressed_size: usize) -> Self {
        let compression_ratio = if compressed_size > 0 {
            uncompressed_size as f64 / compressed_size as f64
        } else {
            1.0
        };

        Self {
            scheme,
            uncompressed_size,
            compressed_size,
            compression_ratio,
        }
    }

    /// Returns whether compression is beneficial (ratio > 1.0)
    pub fn is_beneficial(&self) -> bool {
        self.compression_ratio > 1.0
    }
}

pub(crate) fn read_u8(buffer: &[u8], offset: usize, field: &str) -> ColumnarResult<u8> {
    buffer
        .get(offset)
        .copied()
        .ok_or_else(|| corrupted_err!("truncated {} at offset {}", field, offset))
}

pub(crate) fn read_u32(buffer: &[u8], offset: usize, field: &str) -> ColumnarResult<u32> {
    offset
        .checked_add(4)
        .and_then(|end| buffer.get(offset..end))
        .map(LittleEndian::read_u32)
        .ok_or_else(|| corrupted_err!("truncated {} at offset {}", field, offset))
}

pub(crate) fn read_u64(buffer: &[u8], offset: usize, field: &str) -> ColumnarResult<u64> {
    offset
        .checked_add(8)
        .and_then(|end| buffer.get(offset..end))
        .map(LittleEndian::read_u64)
        .ok_or_else(|| corrupted_err!("truncated {} at offset {}", field, offset))
}

/// Narrows a count to a `u32` header field
pub(crate) fn header_u32(count: usize, field: &str) -> ColumnarResult<u32> {
    u32::try_from(count)
        .map_err(|_| corrupted_err!("{} of {} does not fit a u32 header field", field, count))
}
