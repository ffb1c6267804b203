/// Compression scheme selection
///
/// This module analyzes column data and selects the scheme with the smallest
/// encoded size by running every supported candidate over a sample of the
/// column. Pass-through is always a candidate, and `compress` checks the
/// full-column block against it, so a column never grows by more than the
/// 4-byte tag.
use crate::common::constants::TYPE_ID_SIZE;
use crate::common::error::ColumnarResult;
use crate::config::CompressionConfig;
use crate::storage::compression::registry::registry;
use crate::storage::compression::traits::{ColumnDecoder, ColumnEncoder, CompressionStats};
use crate::storage::compression::types::{
    AnalyzeResult, ColumnChunk, CompressionScheme, EncodedBlock,
};
use crate::types::{ColumnType, ScalarValue};
use rayon::prelude::*;
use tracing::{debug, trace, warn};

/// Compression selector that tests every candidate scheme
#[derive(Debug, Clone, Default)]
pub struct CompressionSelector {
    config: CompressionConfig,
}

impl CompressionSelector {
    /// Creates a new compression selector with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a compression selector with custom settings
    ///
    /// The config is validated first, so a zero sample size or an
    /// out-of-range dictionary bound is rejected here.
    pub fn with_config(config: CompressionConfig) -> ColumnarResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Settings used by this selector
    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Estimates every applicable candidate on the sampled prefix of `data`
    ///
    /// Results follow the registry's priority order. Candidates that cannot
    /// represent the sample, such as an overflowing dictionary, are left out.
    pub fn analyze(
        &self,
        column_type: ColumnType,
        data: &[ScalarValue],
    ) -> ColumnarResult<Vec<AnalyzeResult>> {
        self.estimate(column_type, self.sample_data(data))
    }

    fn estimate(
        &self,
        column_type: ColumnType,
        values: &[ScalarValue],
    ) -> ColumnarResult<Vec<AnalyzeResult>> {
        let mut results = Vec::new();

        for scheme in registry().candidates(column_type) {
            let mut encoder = scheme.encoder_with_config(column_type, &self.config)?;
            encoder.append_all(values)?;

            if let Err(err) = encoder.check_applicable() {
                if err.is_inapplicable() {
                    debug!(%scheme, %column_type, reason = %err, "candidate skipped");
                    continue;
                }
                return Err(err);
            }

            let result = AnalyzeResult::new(
                scheme,
                encoder.uncompressed_size(),
                encoder.compressed_size(),
            );
            debug!(
                %scheme,
                %column_type,
                values = values.len(),
                compressed = result.compressed_size,
                ratio = result.compression_ratio,
                "candidate estimated"
            );
            results.push(result);
        }

        Ok(results)
    }

    /// Picks the scheme to use for `data`
    ///
    /// Returns pass-through for empty columns and when selection is disabled.
    /// A winner picked on the sample that cannot represent the whole column
    /// is discarded and the choice is made again over every value.
    pub fn select_scheme(
        &self,
        column_type: ColumnType,
        data: &[ScalarValue],
    ) -> ColumnarResult<CompressionScheme> {
        if !self.config.enabled || data.is_empty() {
            return Ok(CompressionScheme::PassThrough);
        }

        let results = self.analyze(column_type, data)?;
        let mut scheme = self.select_best(&results);

        if data.len() > self.config.max_sample_size
            && !self.applies_to(scheme, column_type, data)?
        {
            debug!(
                %scheme,
                %column_type,
                values = data.len(),
                "sampled winner inapplicable to full column, reselecting"
            );
            scheme = self.select_best(&self.estimate(column_type, data)?);
        }

        debug!(%scheme, %column_type, values = data.len(), "scheme selected");
        Ok(scheme)
    }

    /// Selects the smallest result, keeping the earliest on ties
    ///
    /// A winner that fails `max_compression_ratio` against pass-through is
    /// replaced by pass-through.
    pub fn select_best(&self, results: &[AnalyzeResult]) -> CompressionScheme {
        let mut best: Option<&AnalyzeResult> = None;
        for result in results {
            let smaller = match best {
                Some(b) => result.compressed_size < b.compressed_size,
                None => true,
            };
            if smaller {
                best = Some(result);
            }
        }

        let Some(best) = best else {
            return CompressionScheme::PassThrough;
        };

        if let Some(max_ratio) = self.config.max_compression_ratio {
            let baseline = results
                .iter()
                .find(|r| r.scheme == CompressionScheme::PassThrough);
            if let Some(baseline) = baseline {
                if best.compressed_size as f64 >= max_ratio * baseline.compressed_size as f64 {
                    debug!(
                        scheme = %best.scheme,
                        max_ratio,
                        "winner does not meet the ratio threshold"
                    );
                    return CompressionScheme::PassThrough;
                }
            }
        }

        best.scheme
    }

    /// Compresses a whole column with the selected scheme
    ///
    /// The block is never larger than pass-through. When the scheme chosen on
    /// the sample grows the full column past that floor, every candidate is
    /// estimated on the full column and the smallest is used instead.
    pub fn compress(
        &self,
        column_type: ColumnType,
        data: &[ScalarValue],
    ) -> ColumnarResult<EncodedBlock> {
        let scheme = self.select_scheme(column_type, data)?;
        let (block, uncompressed) = self.encode_sized(scheme, column_type, data)?;

        let floor = uncompressed + TYPE_ID_SIZE;
        if block.len() <= floor {
            return Ok(block);
        }

        warn!(
            %scheme,
            %column_type,
            compressed = block.len(),
            floor,
            "selected scheme exceeds pass-through on full column, reselecting"
        );
        let scheme = self.select_best(&self.estimate(column_type, data)?);
        self.encode_with(scheme, column_type, data)
    }

    /// Encodes every value of `data` with `scheme`
    pub fn encode_with(
        &self,
        scheme: CompressionScheme,
        column_type: ColumnType,
        data: &[ScalarValue],
    ) -> ColumnarResult<EncodedBlock> {
        self.encode_sized(scheme, column_type, data)
            .map(|(block, _)| block)
    }

    /// Encodes `data`, also returning its raw size
    fn encode_sized(
        &self,
        scheme: CompressionScheme,
        column_type: ColumnType,
        data: &[ScalarValue],
    ) -> ColumnarResult<(EncodedBlock, usize)> {
        let mut encoder = scheme.encoder_with_config(column_type, &self.config)?;
        encoder.append_all(data)?;
        let block = encoder.finish()?;
        trace!(
            %scheme,
            %column_type,
            values = data.len(),
            uncompressed = encoder.uncompressed_size(),
            compressed = block.len(),
            "column encoded"
        );
        Ok((block, encoder.uncompressed_size()))
    }

    /// Returns whether `scheme` can represent every value of `data`
    fn applies_to(
        &self,
        scheme: CompressionScheme,
        column_type: ColumnType,
        data: &[ScalarValue],
    ) -> ColumnarResult<bool> {
        if scheme == CompressionScheme::PassThrough {
            return Ok(true);
        }
        let mut encoder = scheme.encoder_with_config(column_type, &self.config)?;
        encoder.append_all(data)?;
        match encoder.check_applicable() {
            Ok(()) => Ok(true),
            Err(err) if err.is_inapplicable() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Compresses independent columns in parallel
    ///
    /// Results are returned in input order; one failing column does not
    /// affect the others.
    pub fn compress_columns(&self, columns: &[ColumnChunk]) -> Vec<ColumnarResult<EncodedBlock>> {
        columns
            .par_iter()
            .map(|chunk| self.compress(chunk.column_type, &chunk.values))
            .collect()
    }

    /// Samples data if it's too large
    fn sample_data<'a>(&self, data: &'a [ScalarValue]) -> &'a [ScalarValue] {
        if data.len() <= self.config.max_sample_size {
            data
        } else {
            &data[..self.config.max_sample_size]
        }
    }
}

/// Convenience function to compress a column with default settings
pub fn auto_compress(column_type: ColumnType, data: &[ScalarValue]) -> ColumnarResult<EncodedBlock> {
    CompressionSelector::new().compress(column_type, data)
}

/// Convenience function to select the scheme for a column with default settings
pub fn select_compression_scheme(
    column_type: ColumnType,
    data: &[ScalarValue],
) -> ColumnarResult<CompressionScheme> {
    CompressionSelector::new().select_scheme(column_type, data)
}

/// Decodes every value of a block produced by any scheme
pub fn decompress(block: EncodedBlock, column_type: ColumnType) -> ColumnarResult<Vec<ScalarValue>> {
    registry().decoder(block, column_type)?.decode_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i32]) -> Vec<ScalarValue> {
        values.iter().map(|v| ScalarValue::Int(*v)).collect()
    }

    #[test]
    fn test_selector_low_cardinality_strings() {
        let data: Vec<ScalarValue> = ["apple", "banana", "apple", "cherry", "banana", "apple"]
            .iter()
            .map(|s| ScalarValue::from(*s))
            .collect();

        let scheme = select_compression_scheme(ColumnType::String, &data).unwrap();
        assert_eq!(scheme, CompressionScheme::Dictionary);
    }

    #[test]
    fn test_selector_highly_repeated() {
        let data = vec![ScalarValue::Int(42); 1000];
        let scheme = select_compression_scheme(ColumnType::Int, &data).unwrap();
        assert_eq!(scheme, CompressionScheme::RunLength);
    }

    #[test]
    fn test_selector_sorted_small_steps() {
        let data = ints(&[1, 1, 1, 1, 2, 2, 2, 3, 3, 3]);
        let scheme = select_compression_scheme(ColumnType::Int, &data).unwrap();
        assert_eq!(scheme, CompressionScheme::Delta);
    }

    #[test]
    fn test_selector_booleans() {
        let data: Vec<ScalarValue> = (0..200).map(|i| ScalarValue::Boolean(i % 2 == 0)).collect();
        let scheme = select_compression_scheme(ColumnType::Boolean, &data).unwrap();
        assert_eq!(scheme, CompressionScheme::BooleanBitSet);
    }

    #[test]
    fn test_selector_doubles_pass_through() {
        let data = vec![ScalarValue::Double(1.5); 100];
        let scheme = select_compression_scheme(ColumnType::Double, &data).unwrap();
        assert_eq!(scheme, CompressionScheme::PassThrough);
    }

    #[test]
    fn test_selector_empty_column() {
        assert_eq!(
            select_compression_scheme(ColumnType::Int, &[]).unwrap(),
            CompressionScheme::PassThrough
        );
        let block = auto_compress(ColumnType::Int, &[]).unwrap();
        assert!(block.is_empty());
    }

    #[test]
    fn test_selector_disabled() {
        let selector = CompressionSelector::with_config(CompressionConfig::disabled()).unwrap();
        let data = vec![ScalarValue::Int(42); 1000];
        assert_eq!(
            selector.select_scheme(ColumnType::Int, &data).unwrap(),
            CompressionScheme::PassThrough
        );
    }

    #[test]
    fn test_selector_ratio_threshold() {
        // delta: 12 bytes against 20 for pass-through
        let data = ints(&[1, 1, 2, 3]);

        let strict = CompressionSelector::with_config(CompressionConfig {
            max_compression_ratio: Some(0.5),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            strict.select_scheme(ColumnType::Int, &data).unwrap(),
            CompressionScheme::PassThrough
        );

        let relaxed = CompressionSelector::with_config(CompressionConfig {
            max_compression_ratio: Some(0.8),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            relaxed.select_scheme(ColumnType::Int, &data).unwrap(),
            CompressionScheme::Delta
        );
    }

    #[test]
    fn test_select_best_tie_keeps_priority() {
        let selector = CompressionSelector::new();
        let results = vec![
            AnalyzeResult::new(CompressionScheme::RunLength, 40, 20),
            AnalyzeResult::new(CompressionScheme::Dictionary, 40, 20),
            AnalyzeResult::new(CompressionScheme::PassThrough, 40, 44),
        ];
        assert_eq!(selector.select_best(&results), CompressionScheme::RunLength);
        assert_eq!(selector.select_best(&[]), CompressionScheme::PassThrough);
    }

    #[test]
    fn test_analyze_skips_overflowing_dictionary() {
        let selector = CompressionSelector::with_config(CompressionConfig {
            max_dictionary_size: 10,
            ..Default::default()
        })
        .unwrap();
        let data: Vec<ScalarValue> = (0..100).map(|i| ScalarValue::Long(i * 1000)).collect();

        let results = selector.analyze(ColumnType::Long, &data).unwrap();
        assert!(results
            .iter()
            .all(|r| r.scheme != CompressionScheme::Dictionary));
        assert_eq!(
            results.last().map(|r| r.scheme),
            Some(CompressionScheme::PassThrough)
        );
    }

    #[test]
    fn test_sampled_dictionary_overflow_reselects_on_full_column() {
        let selector = CompressionSelector::with_config(CompressionConfig {
            max_sample_size: 10,
            max_dictionary_size: 4,
            ..Default::default()
        })
        .unwrap();

        let mut data: Vec<ScalarValue> = (0..10)
            .map(|i| ScalarValue::from(if i % 2 == 0 { "a" } else { "b" }))
            .collect();
        for run in 0..6 {
            data.extend(std::iter::repeat(ScalarValue::String(format!("run-{}", run))).take(1000));
        }

        // the sample alone favors the dictionary
        let sampled = selector.analyze(ColumnType::String, &data).unwrap();
        assert_eq!(selector.select_best(&sampled), CompressionScheme::Dictionary);

        let scheme = selector.select_scheme(ColumnType::String, &data).unwrap();
        assert_ne!(scheme, CompressionScheme::Dictionary);
        assert_eq!(scheme, CompressionScheme::RunLength);

        let block = selector.compress(ColumnType::String, &data).unwrap();
        let run_length = selector
            .encode_with(CompressionScheme::RunLength, ColumnType::String, &data)
            .unwrap();
        assert_eq!(block.type_id(), CompressionScheme::RunLength.type_id());
        assert!(block.len() <= run_length.len());
        assert_eq!(decompress(block, ColumnType::String).unwrap(), data);
    }

    #[test]
    fn test_compress_never_exceeds_pass_through_floor() {
        let selector = CompressionSelector::with_config(CompressionConfig {
            max_sample_size: 100,
            ..Default::default()
        })
        .unwrap();

        let mut data = vec![ScalarValue::Int(7); 100];
        let mut state: u32 = 0x2545_f491;
        for _ in 0..5000 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            data.push(ScalarValue::Int(state as i32));
        }

        // a constant prefix makes run-length look ideal
        assert_eq!(
            selector.select_scheme(ColumnType::Int, &data).unwrap(),
            CompressionScheme::RunLength
        );

        let block = selector.compress(ColumnType::Int, &data).unwrap();
        let baseline = selector
            .encode_with(CompressionScheme::PassThrough, ColumnType::Int, &data)
            .unwrap();
        assert!(block.len() <= baseline.len());
        assert_eq!(block.type_id(), CompressionScheme::PassThrough.type_id());
        assert_eq!(decompress(block, ColumnType::Int).unwrap(), data);
    }

    #[test]
    fn test_with_config_rejects_invalid_settings() {
        let zero_sample = CompressionConfig {
            max_sample_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            CompressionSelector::with_config(zero_sample),
            Err(crate::common::error::ColumnarError::Config(_))
        ));

        let oversized_dictionary = CompressionConfig {
            max_dictionary_size: usize::MAX,
            ..Default::default()
        };
        assert!(CompressionSelector::with_config(oversized_dictionary).is_err());
    }

    #[test]
    fn test_compress_columns_in_parallel() {
        let columns = vec![
            ColumnChunk::new(ColumnType::Int, vec![ScalarValue::Int(7); 100]),
            ColumnChunk::new(
                ColumnType::Boolean,
                (0..100).map(|i| ScalarValue::Boolean(i % 3 == 0)).collect(),
            ),
            ColumnChunk::new(ColumnType::Int, vec![ScalarValue::from("wrong")]),
        ];

        let selector = CompressionSelector::new();
        let blocks = selector.compress_columns(&columns);
        assert_eq!(blocks.len(), 3);

        for (chunk, block) in columns.iter().zip(&blocks).take(2) {
            let block = block.as_ref().unwrap().clone();
            assert_eq!(decompress(block, chunk.column_type).unwrap(), chunk.values);
        }
        assert!(blocks[2].is_err());
    }

    #[test]
    fn test_type_mismatch_propagates() {
        let data = vec![ScalarValue::Int(1), ScalarValue::Long(2)];
        assert!(auto_compress(ColumnType::Int, &data).is_err());
    }
}
