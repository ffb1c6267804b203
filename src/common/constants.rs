//! Constants used throughout the compression layer

/// Size of the scheme tag that prefixes every encoded block
pub const TYPE_ID_SIZE: usize = 4;

/// Size of a `u32` header field (value counts, run lengths, dictionary sizes)
pub const HEADER_FIELD_SIZE: usize = 4;

/// Bits packed into one word by the boolean bit-set scheme
pub const BITS_PER_WORD: usize = 64;

/// Bytes per packed boolean word
pub const WORD_SIZE: usize = 8;

/// Default number of leading values examined during scheme selection
pub const DEFAULT_MAX_SAMPLE_SIZE: usize = 10_000;

/// Default dictionary capacity
pub const DEFAULT_MAX_DICTIONARY_SIZE: usize = i16::MAX as usize;

/// Largest dictionary addressable with two-byte codes
pub const MAX_DICTIONARY_CODES: usize = 1 << 16;

/// Escape byte preceding a verbatim value in the delta scheme
pub const DELTA_ESCAPE: i8 = i8::MIN;

/// Estimated size of a variable-length string when no value is at hand
pub const DEFAULT_STRING_SIZE: usize = 8;

/// Environment variable toggling compression
pub const ENV_ENABLED: &str = "PRISM_COLUMNAR_ENABLED";

/// Environment variable overriding the selection sample size
pub const ENV_SAMPLE_SIZE: &str = "PRISM_COLUMNAR_SAMPLE_SIZE";

/// Environment variable overriding the dictionary capacity
pub const ENV_MAX_DICTIONARY_SIZE: &str = "PRISM_COLUMNAR_MAX_DICTIONARY_SIZE";
