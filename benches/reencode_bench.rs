use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mysql2pg::data::{reencode_tuple, split_values};
use mysql2pg::schema::ColumnKind;
use std::hint::black_box;

fn generate_tuple(text_len: usize) -> String {
    let text = "ab,c".repeat(text_len / 4);
    format!("42,1,'{}','O\\'Brien',NULL,3.14", text)
}

const KINDS: &[ColumnKind] = &[
    ColumnKind::Other,
    ColumnKind::Boolean,
    ColumnKind::Text,
    ColumnKind::Text,
    ColumnKind::Text,
    ColumnKind::Other,
];

fn bench_split_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_values");

    for text_len in [16, 256, 4096] {
        let tuple = generate_tuple(text_len);
        group.throughput(Throughput::Bytes(tuple.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(text_len), &tuple, |b, tuple| {
            b.iter(|| split_values(black_box(tuple)))
        });
    }

    group.finish();
}

fn bench_reencode_tuple(c: &mut Criterion) {
    let mut group = c.benchmark_group("reencode_tuple");

    for text_len in [16, 256, 4096] {
        let values = split_values(&generate_tuple(text_len));
        group.bench_with_input(BenchmarkId::from_parameter(text_len), &values, |b, values| {
            b.iter(|| reencode_tuple(black_box(values), KINDS))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_split_values, bench_reencode_tuple);
criterion_main!(benches);
