use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use prism_columnar::storage::*;
use prism_columnar::types::{ColumnType, ScalarValue};
use std::hint::black_box;

fn create_sorted_ints(count: usize) -> Vec<ScalarValue> {
    (0..count).map(|i| ScalarValue::Int((i / 100) as i32)).collect()
}

fn create_timestamps(count: usize) -> Vec<ScalarValue> {
    (0..count)
        .map(|i| ScalarValue::Long(1_700_000_000_000 + (i as i64 * 10) + (i as i64 % 7)))
        .collect()
}

fn create_categories(count: usize) -> Vec<ScalarValue> {
    let names = ["pending", "active", "suspended", "closed"];
    (0..count)
        .map(|i| ScalarValue::from(names[(i * 7) % names.len()]))
        .collect()
}

fn bench_schemes(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for size in [1000, 10000, 100000].iter() {
        let cases = [
            (CompressionScheme::RunLength, ColumnType::Int, create_sorted_ints(*size)),
            (CompressionScheme::Delta, ColumnType::Long, create_timestamps(*size)),
            (CompressionScheme::Dictionary, ColumnType::String, create_categories(*size)),
        ];

        for (scheme, column_type, values) in &cases {
            group.bench_with_input(
                BenchmarkId::new(scheme.name(), size),
                values,
                |b, values| {
                    b.iter(|| {
                        let mut encoder = scheme.encoder(*column_type).unwrap();
                        encoder.append_all(values).unwrap();
                        black_box(encoder.finish().unwrap())
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for size in [1000, 10000, 100000].iter() {
        let values = create_timestamps(*size);
        let block = auto_compress(ColumnType::Long, &values).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &block, |b, block| {
            b.iter(|| black_box(decompress(block.clone(), ColumnType::Long).unwrap()))
        });
    }

    group.finish();
}

fn bench_selection(c: &mut Criterion) {
    let selector = CompressionSelector::new();
    let values = create_categories(100000);

    c.bench_function("select_scheme", |b| {
        b.iter(|| black_box(selector.select_scheme(ColumnType::String, &values).unwrap()))
    });
}

criterion_group!(benches, bench_schemes, bench_decode, bench_selection);
criterion_main!(benches);
