//! Benchmarks for diagarch-core extraction.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use diagarch_core::Compression;
use diagarch_core::IngestConfig;
use diagarch_core::extract_bundle;
use diagarch_core::test_utils::TarTestBuilder;
use diagarch_core::test_utils::write_archive;
use diagarch_core::validate_archive;
use tempfile::TempDir;

/// Creates a sosreport-shaped tar with many small command outputs.
fn create_bundle(file_count: usize) -> Vec<u8> {
    (0..file_count)
        .fold(
            TarTestBuilder::new().add_directory("sosreport-bench/"),
            |builder, i| {
                builder.add_file(
                    &format!("sosreport-bench/sos_commands/plugin{:02}/cmd_{i:05}", i % 50),
                    format!("output of command {i}\n").repeat(8).as_bytes(),
                )
            },
        )
        .build()
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_bundle");
    let config = IngestConfig::default();

    for compression in [Compression::None, Compression::Gzip, Compression::Xz] {
        for file_count in [100, 1000] {
            let temp = TempDir::new().unwrap();
            let data = create_bundle(file_count);
            let archive = write_archive(temp.path(), "bench.tar", &data, compression);
            let handle = validate_archive(&archive).unwrap();

            group.throughput(Throughput::Elements(file_count as u64));
            group.bench_with_input(
                BenchmarkId::new(compression.name(), file_count),
                &handle,
                |b, handle| {
                    b.iter(|| {
                        let work = TempDir::new().unwrap();
                        extract_bundle(handle, work.path(), &config).unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let archive = write_archive(temp.path(), "bench.tar.gz", &create_bundle(1000), Compression::Gzip);

    c.bench_function("validate_archive/gzip/1000", |b| {
        b.iter(|| validate_archive(&archive).unwrap());
    });
}

criterion_group!(benches, bench_extract, bench_validate);
criterion_main!(benches);
