//! Column types and their type adapters
//!
//! A `ColumnType` is the closed set of scalar types a column chunk can hold.
//! Each type has exactly one `TypeAdapter`, a stateless object that knows how
//! to read, write and measure a single value of that type inside a byte
//! buffer. Adapters are process-wide constants: encoders and decoders bind one
//! with `ColumnType::adapter()` when they are created and use it for every
//! value afterwards.
//!
//! All fixed-width values are little-endian. Strings are stored as a 4-byte
//! little-endian length followed by UTF-8 bytes.
use crate::common::constants::DEFAULT_STRING_SIZE;
use crate::common::error::{ColumnarError, ColumnarResult};
use crate::corrupted_err;
use crate::types::value::ScalarValue;
use byteorder::{ByteOrder, LittleEndian};
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scalar type of a column chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Boolean, one byte per value
    Boolean,
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit floating point
    Float,
    /// 64-bit double precision
    Double,
    /// Length-prefixed UTF-8 string
    String,
}

impl ColumnType {
    /// Every supported column type
    pub const ALL: [ColumnType; 8] = [
        ColumnType::Boolean,
        ColumnType::Byte,
        ColumnType::Short,
        ColumnType::Int,
        ColumnType::Long,
        ColumnType::Float,
        ColumnType::Double,
        ColumnType::String,
    ];

    /// Returns the adapter bound to this type
    pub fn adapter(&self) -> &'static dyn TypeAdapter {
        match self {
            ColumnType::Boolean => &BooleanAdapter,
            ColumnType::Byte => &ByteAdapter,
            ColumnType::Short => &ShortAdapter,
            ColumnType::Int => &IntAdapter,
            ColumnType::Long => &LongAdapter,
            ColumnType::Float => &FloatAdapter,
            ColumnType::Double => &DoubleAdapter,
            ColumnType::String => &StringAdapter,
        }
    }

    /// Default serialized size in bytes (an estimate for strings)
    pub fn default_size(&self) -> usize {
        self.adapter().default_size()
    }

    /// Check if every value of this type has the same serialized size
    pub fn is_fixed_width(&self) -> bool {
        !matches!(self, ColumnType::String)
    }

    /// Check if this type is a signed integer type
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            ColumnType::Byte | ColumnType::Short | ColumnType::Int | ColumnType::Long
        )
    }

    /// Returns human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Byte => "BYTE",
            ColumnType::Short => "SHORT",
            ColumnType::Int => "INT",
            ColumnType::Long => "LONG",
            ColumnType::Float => "FLOAT",
            ColumnType::Double => "DOUBLE",
            ColumnType::String => "STRING",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ColumnType {
    type Err = ColumnarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Ok(ColumnType::Boolean),
            "byte" | "tinyint" => Ok(ColumnType::Byte),
            "short" | "smallint" => Ok(ColumnType::Short),
            "int" | "integer" => Ok(ColumnType::Int),
            "long" | "bigint" => Ok(ColumnType::Long),
            "float" => Ok(ColumnType::Float),
            "double" => Ok(ColumnType::Double),
            "string" | "varchar" => Ok(ColumnType::String),
            other => Err(ColumnarError::Config(format!(
                "Unknown column type '{}'",
                other
            ))),
        }
    }
}

/// Reads, writes and measures single values of one column type
pub trait TypeAdapter: fmt::Debug + Send + Sync {
    /// Column type served by this adapter
    fn column_type(&self) -> ColumnType;

    /// Default serialized size in bytes
    fn default_size(&self) -> usize;

    /// Serialized size of `value`
    fn actual_size(&self, value: &ScalarValue) -> ColumnarResult<usize> {
        self.check(value)?;
        Ok(self.default_size())
    }

    /// Reads one value starting at `offset`
    fn read(&self, buffer: &[u8], offset: usize) -> ColumnarResult<ScalarValue>;

    /// Writes `value` at `offset`, returning the number of bytes written
    fn write(&self, buffer: &mut [u8], offset: usize, value: &ScalarValue)
        -> ColumnarResult<usize>;

    /// Appends `value` to a growable arena, returning the number of bytes written
    fn append(&self, arena: &mut BytesMut, value: &ScalarValue) -> ColumnarResult<usize>;

    /// Fails with `TypeMismatch` unless `value` belongs to this adapter's type
    fn check(&self, value: &ScalarValue) -> ColumnarResult<()> {
        if value.column_type() == self.column_type() {
            Ok(())
        } else {
            Err(mismatch(self.column_type(), value))
        }
    }
}

fn mismatch(expected: ColumnType, value: &ScalarValue) -> ColumnarError {
    ColumnarError::TypeMismatch {
        expected,
        found: value.column_type().to_string(),
    }
}

fn readable(buffer: &[u8], offset: usize, len: usize, column_type: ColumnType) -> ColumnarResult<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| buffer.get(offset..end))
        .ok_or_else(|| {
            corrupted_err!(
                "truncated {} at offset {}: need {} bytes, {} available",
                column_type,
                offset,
                len,
                buffer.len().saturating_sub(offset)
            )
        })
}

fn writable(buffer: &mut [u8], offset: usize, len: usize) -> ColumnarResult<&mut [u8]> {
    let available = buffer.len().saturating_sub(offset);
    if available < len {
        return Err(ColumnarError::BufferTooSmall {
            required: len,
            available,
        });
    }
    Ok(&mut buffer[offset..offset + len])
}

macro_rules! fixed_width_adapter {
    ($adapter:ident, $variant:ident, $size:expr, $read:path, $write:path, $put:ident) => {
        #[doc = concat!("Type adapter for `", stringify!($variant), "` columns")]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $adapter;

        impl TypeAdapter for $adapter {
            fn column_type(&self) -> ColumnType {
                ColumnType::$variant
            }

            fn default_size(&self) -> usize {
                $size
            }

            fn read(&self, buffer: &[u8], offset: usize) -> ColumnarResult<ScalarValue> {
                let bytes = readable(buffer, offset, $size, ColumnType::$variant)?;
                Ok(ScalarValue::$variant($read(bytes)))
            }

            fn write(
                &self,
                buffer: &mut [u8],
                offset: usize,
                value: &ScalarValue,
            ) -> ColumnarResult<usize> {
                match value {
                    ScalarValue::$variant(v) => {
                        $write(writable(buffer, offset, $size)?, *v);
                        Ok($size)
                    }
                    other => Err(mismatch(ColumnType::$variant, other)),
                }
            }

            fn append(&self, arena: &mut BytesMut, value: &ScalarValue) -> ColumnarResult<usize> {
                match value {
                    ScalarValue::$variant(v) => {
                        arena.$put(*v);
                        Ok($size)
                    }
                    other => Err(mismatch(ColumnType::$variant, other)),
                }
            }
        }
    };
}

fixed_width_adapter!(ShortAdapter, Short, 2, LittleEndian::read_i16, LittleEndian::write_i16, put_i16_le);
fixed_width_adapter!(IntAdapter, Int, 4, LittleEndian::read_i32, LittleEndian::write_i32, put_i32_le);
fixed_width_adapter!(LongAdapter, Long, 8, LittleEndian::read_i64, LittleEndian::write_i64, put_i64_le);
fixed_width_adapter!(FloatAdapter, Float, 4, LittleEndian::read_f32, LittleEndian::write_f32, put_f32_le);
fixed_width_adapter!(DoubleAdapter, Double, 8, LittleEndian::read_f64, LittleEndian::write_f64, put_f64_le);

/// Type adapter for `Boolean` columns (one byte, 0 or 1)
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanAdapter;

impl TypeAdapter for BooleanAdapter {
    fn column_type(&self) -> ColumnType {
        ColumnType::Boolean
    }

    fn default_size(&self) -> usize {
        1
    }

    fn read(&self, buffer: &[u8], offset: usize) -> ColumnarResult<ScalarValue> {
        let bytes = readable(buffer, offset, 1, ColumnType::Boolean)?;
        Ok(ScalarValue::Boolean(bytes[0] != 0))
    }

    fn write(&self, buffer: &mut [u8], offset: usize, value: &ScalarValue) -> ColumnarResult<usize> {
        match value {
            ScalarValue::Boolean(b) => {
                writable(buffer, offset, 1)?[0] = u8::from(*b);
                Ok(1)
            }
            other => Err(mismatch(ColumnType::Boolean, other)),
        }
    }

    fn append(&self, arena: &mut BytesMut, value: &ScalarValue) -> ColumnarResult<usize> {
        match value {
            ScalarValue::Boolean(b) => {
                arena.put_u8(u8::from(*b));
                Ok(1)
            }
            other => Err(mismatch(ColumnType::Boolean, other)),
        }
    }
}

/// Type adapter for `Byte` columns
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteAdapter;

impl TypeAdapter for ByteAdapter {
    fn column_type(&self) -> ColumnType {
        ColumnType::Byte
    }

    fn default_size(&self) -> usize {
        1
    }

    fn read(&self, buffer: &[u8], offset: usize) -> ColumnarResult<ScalarValue> {
        let bytes = readable(buffer, offset, 1, ColumnType::Byte)?;
        Ok(ScalarValue::Byte(bytes[0] as i8))
    }

    fn write(&self, buffer: &mut [u8], offset: usize, value: &ScalarValue) -> ColumnarResult<usize> {
        match value {
            ScalarValue::Byte(b) => {
                writable(buffer, offset, 1)?[0] = *b as u8;
                Ok(1)
            }
            other => Err(mismatch(ColumnType::Byte, other)),
        }
    }

    fn append(&self, arena: &mut BytesMut, value: &ScalarValue) -> ColumnarResult<usize> {
        match value {
            ScalarValue::Byte(b) => {
                arena.put_i8(*b);
                Ok(1)
            }
            other => Err(mismatch(ColumnType::Byte, other)),
        }
    }
}

/// Type adapter for `String` columns
#[derive(Debug, Clone, Copy, Default)]
pub struct StringAdapter;

impl StringAdapter {
    fn length_prefix(s: &str) -> ColumnarResult<u32> {
        u32::try_from(s.len())
            .map_err(|_| corrupted_err!("string of {} bytes exceeds the length prefix", s.len()))
    }
}

impl TypeAdapter for StringAdapter {
    fn column_type(&self) -> ColumnType {
        ColumnType::String
    }

    fn default_size(&self) -> usize {
        DEFAULT_STRING_SIZE
    }

    fn actual_size(&self, value: &ScalarValue) -> ColumnarResult<usize> {
        match value {
            ScalarValue::String(s) => Ok(4 + s.len()),
            other => Err(mismatch(ColumnType::String, other)),
        }
    }

    fn read(&self, buffer: &[u8], offset: usize) -> ColumnarResult<ScalarValue> {
        let len = LittleEndian::read_u32(readable(buffer, offset, 4, ColumnType::String)?) as usize;
        let bytes = readable(buffer, offset + 4, len, ColumnType::String)?;
        let s = std::str::from_utf8(bytes)
            .map_err(|e| corrupted_err!("invalid UTF-8 at offset {}: {}", offset + 4, e))?;
        Ok(ScalarValue::String(s.to_string()))
    }

    fn write(&self, buffer: &mut [u8], offset: usize, value: &ScalarValue) -> ColumnarResult<usize> {
        match value {
            ScalarValue::String(s) => {
                let len = Self::length_prefix(s)?;
                let target = writable(buffer, offset, 4 + s.len())?;
                LittleEndian::write_u32(&mut target[..4], len);
                target[4..].copy_from_slice(s.as_bytes());
                Ok(4 + s.len())
            }
            other => Err(mismatch(ColumnType::String, other)),
        }
    }

    fn append(&self, arena: &mut BytesMut, value: &ScalarValue) -> ColumnarResult<usize> {
        match value {
            ScalarValue::String(s) => {
                arena.put_u32_le(Self::length_prefix(s)?);
                arena.put_slice(s.as_bytes());
                Ok(4 + s.len())
            }
            other => Err(mismatch(ColumnType::String, other)),
        }
    }
}
