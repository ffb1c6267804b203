//! PrismColumnar - compression schemes for in-memory columnar storage
//!
//! Column chunks are packed into self-describing byte blocks by a small set
//! of interchangeable schemes (pass-through, run-length, dictionary, delta
//! and boolean bit-set). A selector estimates every candidate on a sample of
//! the column and keeps the smallest, falling back to pass-through when
//! nothing helps. Decoding dispatches on the 4-byte scheme tag that starts
//! every block.
//!
pub mod common;
pub mod config;
pub mod storage;
pub mod types;

// Re-export common types for convenience
pub use common::{ColumnarError, ColumnarResult};

// Re-export configuration for convenience
pub use config::CompressionConfig;

// Re-export type system for convenience
pub use types::{ColumnType, GenericMutableRow, MutableRow, ScalarValue, TypeAdapter};

// Re-export storage system for convenience
pub use storage::{
    auto_compress, decompress, registry, select_compression_scheme, AnalyzeResult, ColumnChunk,
    ColumnDecoder, ColumnEncoder, CompressionScheme, CompressionSelector, CompressionStats,
    Decoder, EncodedBlock, Encoder, NullableColumnAccessor, NullableColumnBuilder,
};
