//! Storage module for columnar data
//!
//! This module provides:
//! - Compression schemes and scheme selection for column chunks
//! - Nullable column chunks layered over the compression schemes

pub mod column;
pub mod compression;

pub use column::*;
pub use compression::*;
