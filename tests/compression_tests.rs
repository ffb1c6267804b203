//! Integration tests for the compression schemes
//!
//! These tests drive every scheme through the public API: encoding, decoding
//! by tag through the registry, scheme selection and nullable chunks.

use pretty_assertions::assert_eq;
use prism_columnar::storage::*;
use prism_columnar::types::*;
use prism_columnar::{ColumnarError, ColumnarResult, CompressionConfig};

fn ints(values: &[i32]) -> Vec<ScalarValue> {
    values.iter().map(|v| ScalarValue::Int(*v)).collect()
}

fn encode(
    scheme: CompressionScheme,
    column_type: ColumnType,
    values: &[ScalarValue],
) -> ColumnarResult<EncodedBlock> {
    let mut encoder = scheme.encoder(column_type)?;
    encoder.append_all(values)?;
    encoder.finish()
}

/// Sample column for each type, with repeats so every scheme has work to do
fn sample_column(column_type: ColumnType) -> Vec<ScalarValue> {
    match column_type {
        ColumnType::Boolean => [true, true, false, true, false, false, false]
            .iter()
            .map(|b| ScalarValue::Boolean(*b))
            .collect(),
        ColumnType::Byte => [1i8, 1, -5, 127, -128, 0]
            .iter()
            .map(|v| ScalarValue::Byte(*v))
            .collect(),
        ColumnType::Short => [300i16, 300, 301, -32768, 32767]
            .iter()
            .map(|v| ScalarValue::Short(*v))
            .collect(),
        ColumnType::Int => ints(&[10, 10, 11, 200, -7, i32::MAX, i32::MIN]),
        ColumnType::Long => [0i64, 5, 5, 5, 1 << 40, -(1 << 40), i64::MAX]
            .iter()
            .map(|v| ScalarValue::Long(*v))
            .collect(),
        ColumnType::Float => [1.5f32, -0.25, 1.5]
            .iter()
            .map(|v| ScalarValue::Float(*v))
            .collect(),
        ColumnType::Double => [1e-9f64, 1e9, -1.0]
            .iter()
            .map(|v| ScalarValue::Double(*v))
            .collect(),
        ColumnType::String => ["us", "us", "", "de", "日本", "us"]
            .iter()
            .map(|s| ScalarValue::from(*s))
            .collect(),
    }
}

/// Round trip for every scheme and every type it supports
#[test]
fn test_round_trip_every_scheme_and_type() -> ColumnarResult<()> {
    for scheme in CompressionScheme::PRIORITY {
        for column_type in ColumnType::ALL {
            if !scheme.supports(column_type) {
                continue;
            }
            let values = sample_column(column_type);
            let block = encode(scheme, column_type, &values)?;
            assert_eq!(block.type_id(), scheme.type_id());

            let decoded = decompress(block, column_type)?;
            assert_eq!(decoded, values, "{} over {}", scheme, column_type);
        }
    }
    Ok(())
}

/// compressed_size reported before finish equals the block length
#[test]
fn test_compressed_size_matches_block() -> ColumnarResult<()> {
    for scheme in CompressionScheme::PRIORITY {
        for column_type in ColumnType::ALL {
            if !scheme.supports(column_type) {
                continue;
            }
            let mut encoder = scheme.encoder(column_type)?;
            encoder.append_all(&sample_column(column_type))?;
            let estimate = encoder.compressed_size();
            let block = encoder.finish()?;
            assert_eq!(block.len(), estimate, "{} over {}", scheme, column_type);
        }
    }
    Ok(())
}

#[test]
fn test_pass_through_size_law() -> ColumnarResult<()> {
    for column_type in ColumnType::ALL {
        let values = sample_column(column_type);
        let mut encoder = CompressionScheme::PassThrough.encoder(column_type)?;
        encoder.append_all(&values)?;

        let raw: usize = values
            .iter()
            .map(|v| column_type.adapter().actual_size(v))
            .sum::<ColumnarResult<usize>>()?;
        assert_eq!(encoder.uncompressed_size(), raw);
        assert_eq!(encoder.compressed_size(), raw + 4);
    }
    Ok(())
}

#[test]
fn test_scenario_run_length_pairs() -> ColumnarResult<()> {
    let values = ints(&[7, 7, 7, 3, 3, 9]);
    let block = encode(CompressionScheme::RunLength, ColumnType::Int, &values)?;

    let mut expected = 2u32.to_le_bytes().to_vec();
    for (value, count) in [(7i32, 3u32), (3, 2), (9, 1)] {
        expected.extend_from_slice(&value.to_le_bytes());
        expected.extend_from_slice(&count.to_le_bytes());
    }
    assert_eq!(block.as_ref(), &expected[..]);
    assert_eq!(decompress(block, ColumnType::Int)?, values);
    Ok(())
}

#[test]
fn test_scenario_bit_set_word() -> ColumnarResult<()> {
    let values: Vec<ScalarValue> = [true, false, false, true]
        .iter()
        .map(|b| ScalarValue::Boolean(*b))
        .collect();
    let block = encode(CompressionScheme::BooleanBitSet, ColumnType::Boolean, &values)?;

    let mut expected = 4u32.to_le_bytes().to_vec();
    expected.extend_from_slice(&4u32.to_le_bytes());
    expected.extend_from_slice(&0b1001u64.to_le_bytes());
    assert_eq!(block.as_ref(), &expected[..]);
    assert_eq!(decompress(block, ColumnType::Boolean)?, values);
    Ok(())
}

#[test]
fn test_scenario_delta_base_and_steps() -> ColumnarResult<()> {
    let values = ints(&[100, 102, 101, 101]);
    let block = encode(CompressionScheme::Delta, ColumnType::Int, &values)?;

    let mut expected = 5u32.to_le_bytes().to_vec();
    expected.push(0x80);
    expected.extend_from_slice(&100i32.to_le_bytes());
    expected.extend_from_slice(&[2, 0xFF, 0]);
    assert_eq!(block.as_ref(), &expected[..]);
    assert_eq!(decompress(block, ColumnType::Int)?, values);
    Ok(())
}

#[test]
fn test_scenario_empty_input() -> ColumnarResult<()> {
    let expected_len = |scheme: CompressionScheme| match scheme {
        CompressionScheme::PassThrough | CompressionScheme::RunLength | CompressionScheme::Delta => 4,
        CompressionScheme::Dictionary => 4 + 9,
        CompressionScheme::BooleanBitSet => 4 + 4,
    };

    for scheme in CompressionScheme::PRIORITY {
        let column_type = if scheme == CompressionScheme::BooleanBitSet {
            ColumnType::Boolean
        } else {
            ColumnType::Int
        };
        let block = encode(scheme, column_type, &[])?;
        assert_eq!(block.len(), expected_len(scheme), "{}", scheme);

        let mut decoder = registry().decoder(block, column_type)?;
        assert!(!decoder.has_next());

        let mut row = GenericMutableRow::new(1);
        assert!(matches!(
            decoder.next(&mut row, 0),
            Err(ColumnarError::DecoderExhausted)
        ));
    }
    Ok(())
}

#[test]
fn test_decode_into_row_slots() -> ColumnarResult<()> {
    let values = ints(&[4, 4, 9]);
    let block = auto_compress(ColumnType::Int, &values)?;
    let mut decoder = registry().decoder(block, ColumnType::Int)?;

    let mut row = GenericMutableRow::new(3);
    let mut ordinal = 0;
    while decoder.has_next() {
        decoder.next(&mut row, ordinal)?;
        ordinal += 1;
    }
    assert_eq!(ordinal, 3);
    assert_eq!(
        row.into_values(),
        vec![Some(ScalarValue::Int(4)), Some(ScalarValue::Int(4)), Some(ScalarValue::Int(9))]
    );
    Ok(())
}

#[test]
fn test_unknown_type_id() {
    let mut bytes = 42u32.to_le_bytes().to_vec();
    bytes.extend_from_slice(&[1, 2, 3]);
    let block = EncodedBlock::new(bytes).unwrap();

    assert!(matches!(
        registry().decoder(block, ColumnType::Int),
        Err(ColumnarError::UnsupportedScheme(42))
    ));
}

#[test]
fn test_dictionary_never_selected_when_overflowing() -> ColumnarResult<()> {
    let selector = CompressionSelector::with_config(CompressionConfig {
        max_dictionary_size: 16,
        ..Default::default()
    })?;
    let values: Vec<ScalarValue> = (0..64)
        .map(|i| ScalarValue::String(format!("key-{}", i % 32)))
        .collect();

    let scheme = selector.select_scheme(ColumnType::String, &values)?;
    assert_ne!(scheme, CompressionScheme::Dictionary);

    let block = selector.compress(ColumnType::String, &values)?;
    assert_eq!(decompress(block, ColumnType::String)?, values);
    Ok(())
}

#[test]
fn test_dictionary_bound_holds_past_the_sample() -> ColumnarResult<()> {
    let selector = CompressionSelector::with_config(CompressionConfig {
        max_sample_size: 32,
        max_dictionary_size: 8,
        ..Default::default()
    })?;
    // the sampled prefix has two keys, the full column has forty
    let values: Vec<ScalarValue> = (0..2000)
        .map(|i| {
            let key = if i < 32 { i % 2 } else { i / 50 };
            ScalarValue::String(format!("key-{}", key))
        })
        .collect();

    let scheme = selector.select_scheme(ColumnType::String, &values)?;
    assert_ne!(scheme, CompressionScheme::Dictionary);

    let block = selector.compress(ColumnType::String, &values)?;
    assert_ne!(block.type_id(), CompressionScheme::Dictionary.type_id());
    let run_length = encode(CompressionScheme::RunLength, ColumnType::String, &values)?;
    assert!(block.len() <= run_length.len());
    assert_eq!(decompress(block, ColumnType::String)?, values);
    Ok(())
}

#[test]
fn test_sampled_selection_keeps_pass_through_floor() -> ColumnarResult<()> {
    let selector = CompressionSelector::with_config(CompressionConfig {
        max_sample_size: 64,
        ..Default::default()
    })?;
    let mut values = vec![ScalarValue::Long(0); 64];
    values.extend(
        (0..1000u64).map(|i| ScalarValue::Long(i.wrapping_mul(0x9E37_79B9_7F4A_7C15) as i64)),
    );

    let block = selector.compress(ColumnType::Long, &values)?;
    let baseline = encode(CompressionScheme::PassThrough, ColumnType::Long, &values)?;
    assert!(block.len() <= baseline.len());
    assert_eq!(decompress(block, ColumnType::Long)?, values);
    Ok(())
}

#[test]
fn test_selected_block_is_never_larger_than_pass_through() -> ColumnarResult<()> {
    for column_type in ColumnType::ALL {
        let values = sample_column(column_type);
        let block = auto_compress(column_type, &values)?;
        let baseline = encode(CompressionScheme::PassThrough, column_type, &values)?;
        assert!(block.len() <= baseline.len(), "{}", column_type);
    }
    Ok(())
}

#[test]
fn test_block_survives_persistence() -> ColumnarResult<()> {
    let values = sample_column(ColumnType::String);
    let block = auto_compress(ColumnType::String, &values)?;

    let persisted: Vec<u8> = block.as_ref().to_vec();
    let restored = EncodedBlock::new(persisted)?;
    assert_eq!(decompress(restored, ColumnType::String)?, values);
    Ok(())
}

#[test]
fn test_compress_columns_keeps_order() -> ColumnarResult<()> {
    let columns: Vec<ColumnChunk> = ColumnType::ALL
        .iter()
        .map(|t| ColumnChunk::new(*t, sample_column(*t)))
        .collect();

    let blocks = CompressionSelector::new().compress_columns(&columns);
    for (chunk, block) in columns.iter().zip(blocks) {
        assert_eq!(decompress(block?, chunk.column_type)?, chunk.values);
    }
    Ok(())
}

#[test]
fn test_nullable_chunk_round_trip() -> ColumnarResult<()> {
    let rows = vec![
        Some(ScalarValue::from("a")),
        None,
        None,
        Some(ScalarValue::from("a")),
        Some(ScalarValue::from("b")),
        None,
    ];
    let mut builder = NullableColumnBuilder::new(ColumnType::String);
    for row in &rows {
        builder.append(row.clone())?;
    }
    let bytes = builder.build()?;

    let mut accessor = NullableColumnAccessor::new(bytes, ColumnType::String)?;
    let mut row = GenericMutableRow::new(1);
    for expected in &rows {
        accessor.extract_to(&mut row, 0)?;
        assert_eq!(row.get(0), expected.as_ref());
    }
    assert!(!accessor.has_next());
    Ok(())
}
