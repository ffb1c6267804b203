//! Error handling for the columnar compression layer

use crate::storage::compression::types::CompressionScheme;
use crate::types::ColumnType;
use thiserror::Error;

/// Main error type for encoding, decoding and scheme selection
#[derive(Error, Debug)]
pub enum ColumnarError {
    #[error("Buffer too small: {required} bytes required, {available} available")]
    BufferTooSmall { required: usize, available: usize },

    #[error("Unsupported compression scheme: type id {0}")]
    UnsupportedScheme(u32),

    #[error("Scheme {scheme} is inapplicable to this column: {reason}")]
    SchemeInapplicable {
        scheme: CompressionScheme,
        reason: String,
    },

    #[error("Decoder exhausted: next() called with no remaining values")]
    DecoderExhausted,

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: ColumnType, found: String },

    #[error("Scheme {scheme} does not support column type {column_type}")]
    UnsupportedType {
        scheme: CompressionScheme,
        column_type: ColumnType,
    },

    #[error("Encoder already finished")]
    EncoderFinished,

    #[error("Corrupted data: {0}")]
    Corrupted(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ColumnarError {
    /// Returns whether this error only disqualifies a candidate scheme
    pub fn is_inapplicable(&self) -> bool {
        matches!(self, ColumnarError::SchemeInapplicable { .. })
    }
}

/// Result type alias for columnar operations
pub type ColumnarResult<T> = std::result::Result<T, ColumnarError>;

/// Macro for creating corruption errors
#[macro_export]
macro_rules! corrupted_err {
    ($msg:expr) => {
        $crate::common::error::ColumnarError::Corrupted($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::common::error::ColumnarError::Corrupted(format!($fmt, $($arg)*))
    };
}
