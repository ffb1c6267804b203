/// Compression module for columnar storage
///
/// This module provides the encoding schemes used to pack typed column values
/// into compact byte blocks, and the selection policy that picks one per
/// column.
///
/// ## Supported Schemes:
///
/// - **PassThrough**: Raw values, the universal fallback
/// - **RunLength**: (value, run length) pairs for sorted/repeated data
/// - **Dictionary**: 1 or 2 byte codes for low cardinality columns
/// - **BooleanBitSet**: One bit per boolean, packed into 64-bit words
/// - **Delta**: One signed byte per value for slowly changing integers
///
/// Every block starts with the 4-byte little-endian type id of its scheme,
/// so any block can be decoded with `registry().decoder(block, column_type)`.
///
/// ## Automatic Compression Selection:
///
/// Use `CompressionSelector` or `auto_compress()` to automatically choose the best scheme.
///
/// ## Usage Example:
///
/// ```
/// use prism_columnar::storage::compression::*;
/// use prism_columnar::types::{ColumnType, ScalarValue};
///
/// let data = vec![ScalarValue::from("apple"), ScalarValue::from("banana"), ScalarValue::from("apple")];
///
/// // Manual compression with a specific scheme
/// let mut encoder = CompressionScheme::Dictionary.encoder(ColumnType::String)?;
/// encoder.append_all(&data)?;
/// let block = encoder.finish()?;
/// assert_eq!(block.type_id(), CompressionScheme::Dictionary.type_id());
///
/// // Automatic compression (recommended)
/// let block = auto_compress(ColumnType::String, &data)?;
/// assert_eq!(decompress(block, ColumnType::String)?, data);
/// # Ok::<(), prism_columnar::ColumnarError>(())
/// ```

pub mod analyze;
pub mod bitset;
pub mod codec;
pub mod delta;
pub mod dictionary;
pub mod pass_through;
pub mod registry;
pub mod rle;
pub mod traits;
pub mod types;

pub use analyze::{auto_compress, decompress, select_compression_scheme, CompressionSelector};
pub use bitset::{BooleanBitSetDecoder, BooleanBitSetEncoder};
pub use codec::{Decoder, Encoder};
pub use delta::{DeltaDecoder, DeltaEncoder};
pub use dictionary::{DictionaryDecoder, DictionaryEncoder};
pub use pass_through::{PassThroughDecoder, PassThroughEncoder};
pub use registry::{registry, SchemeRegistry};
pub use rle::{RunLengthDecoder, RunLengthEncoder};
pub use traits::{ColumnDecoder, ColumnEncoder, CompressionStats, DecodedValues};
pub use types::{AnalyzeResult, ColumnChunk, CompressionScheme, EncodedBlock};
