//! Type system module
//!
//! This module contains the scalar type components shared by every scheme:
//! - ColumnType: the closed set of column scalar types
//! - TypeAdapter: per-type read/write/size contract, one adapter per type
//! - ScalarValue: single value container tagged with its type
//! - MutableRow: ordinal-addressable row sink written by decoders

pub mod column_type;
pub mod row;
pub mod value;

// Re-export main types for convenience
pub use column_type::{
    BooleanAdapter, ByteAdapter, ColumnType, DoubleAdapter, FloatAdapter, IntAdapter,
    LongAdapter, ShortAdapter, StringAdapter, TypeAdapter,
};
pub use row::{GenericMutableRow, MutableRow};
pub use value::ScalarValue;
