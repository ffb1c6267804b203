/// Process-wide scheme registry
///
/// Maps on-wire type ids to schemes and fixes the candidate order used by
/// scheme selection. Built once on first use and read-only afterwards.
use crate::common::error::{ColumnarError, ColumnarResult};
use crate::storage::compression::codec::Decoder;
use crate::storage::compression::types::{CompressionScheme, EncodedBlock};
use crate::types::ColumnType;
use ahash::AHashMap;
use std::sync::OnceLock;
use tracing::trace;

static REGISTRY: OnceLock<SchemeRegistry> = OnceLock::new();

/// Returns the global scheme registry
pub fn registry() -> &'static SchemeRegistry {
    REGISTRY.get_or_init(SchemeRegistry::new)
}

/// Lookup table from type id to scheme
#[derive(Debug)]
pub struct SchemeRegistry {
    by_id: AHashMap<u32, CompressionScheme>,
    /// Registration order, which is the selection tie-break order
    priority: Vec<CompressionScheme>,
}

impl SchemeRegistry {
    /// Creates a registry holding every built-in scheme
    fn new() -> Self {
        let mut registry = Self {
            by_id: AHashMap::new(),
            priority: Vec::new(),
        };
        for scheme in CompressionScheme::PRIORITY {
            registry.register(scheme);
        }
        registry
    }

    fn register(&mut self, scheme: CompressionScheme) {
        let previous = self.by_id.insert(scheme.type_id(), scheme);
        debug_assert!(previous.is_none(), "duplicate type id {}", scheme.type_id());
        self.priority.push(scheme);
    }

    /// Resolves a type id, failing with `UnsupportedScheme` for unknown ids
    pub fn lookup(&self, type_id: u32) -> ColumnarResult<CompressionScheme> {
        self.by_id
            .get(&type_id)
            .copied()
            .ok_or(ColumnarError::UnsupportedScheme(type_id))
    }

    /// Every registered scheme in priority order
    pub fn schemes(&self) -> &[CompressionScheme] {
        &self.priority
    }

    /// Schemes able to encode `column_type`, in priority order
    ///
    /// Pass-through is always included and always last.
    pub fn candidates(&self, column_type: ColumnType) -> impl Iterator<Item = CompressionScheme> + '_ {
        self.priority
            .iter()
            .copied()
            .filter(move |scheme| scheme.supports(column_type))
    }

    /// Opens `block` with the decoder named by its tag
    pub fn decoder(&self, block: EncodedBlock, column_type: ColumnType) -> ColumnarResult<Decoder> {
        let scheme = self.lookup(block.type_id())?;
        trace!(%scheme, %column_type, bytes = block.len(), "opening block");
        scheme.decoder(block, column_type)
    }
}
