//! Row sinks written by column decoders

use crate::types::value::ScalarValue;

/// A caller-owned, ordinal-addressable row that decoders write into
pub trait MutableRow {
    /// Number of fields in the row
    fn num_fields(&self) -> usize;

    /// Stores `value` at `ordinal`
    fn update(&mut self, ordinal: usize, value: ScalarValue);

    /// Marks the field at `ordinal` as null
    fn set_null_at(&mut self, ordinal: usize);
}

/// Row backed by a vector of optional values
///
/// # Panics
/// Writing to an ordinal outside `0..num_fields()` panics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericMutableRow {
    values: Vec<Option<ScalarValue>>,
}

impl GenericMutableRow {
    /// Creates a row with `num_fields` null fields
    pub fn new(num_fields: usize) -> Self {
        Self {
            values: vec![None; num_fields],
        }
    }

    /// Get the value at `ordinal` (None if null)
    pub fn get(&self, ordinal: usize) -> Option<&ScalarValue> {
        self.values.get(ordinal).and_then(|v| v.as_ref())
    }

    /// Check if the field at `ordinal` is null
    pub fn is_null_at(&self, ordinal: usize) -> bool {
        self.get(ordinal).is_none()
    }

    /// Consumes the row, returning its fields
    pub fn into_values(self) -> Vec<Option<ScalarValue>> {
        self.values
    }
}

impl MutableRow for GenericMutableRow {
    fn num_fields(&self) -> usize {
        self.values.len()
    }

    fn update(&mut self, ordinal: usize, value: ScalarValue) {
        self.values[ordinal] = Some(value);
    }

    fn set_null_at(&mut self, ordinal: usize) {
        self.values[ordinal] = None;
    }
}
