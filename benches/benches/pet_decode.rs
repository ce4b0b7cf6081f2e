//! Benchmark suite for `.pet` archive loading
//!
//! Measures the stages a pet goes through before its first tick: JSON and
//! base64 decoding, PNG decoding with slicing, and mirroring.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use deskpet_benches::{generate_sheet, generate_test_archive};
use deskpet_runtime::config::SimulationConfig;
use deskpet_runtime::source::{ArchiveSource, EntityFactory};
use deskpet_types::file::PetFile;
use deskpet_types::sprite::{FrameSet, slice};
use std::hint::black_box;
use std::sync::Arc;

/// Benchmark container decoding alone
fn bench_container_decode(c: &mut Criterion) {
	let mut group = c.benchmark_group("pet_container");

	for (name, frame, columns) in [("small", 32, 4), ("large", 64, 16)] {
		let data = generate_test_archive(frame, columns, 2, 1.0);
		group.throughput(Throughput::Bytes(data.len() as u64));
		group.bench_with_input(BenchmarkId::new("from_bytes", name), &data, |b, data| {
			b.iter(|| black_box(PetFile::from_bytes(black_box(data))));
		});
	}

	group.finish();
}

/// Benchmark slicing a decoded sheet, with and without resampling
fn bench_slice(c: &mut Criterion) {
	let mut group = c.benchmark_group("pet_slice");
	let sheet = generate_sheet(64, 8, 4).to_rgba8();

	for scale in [1.0, 2.0, 0.5] {
		group.bench_with_input(BenchmarkId::new("slice", scale), &scale, |b, &scale| {
			b.iter(|| black_box(slice(black_box(&sheet), 64, 64, scale)));
		});
	}

	group.finish();
}

/// Benchmark the full path from bytes to frame sets and to a ready pet
fn bench_frame_set(c: &mut Criterion) {
	let mut group = c.benchmark_group("pet_frame_set");
	let data = generate_test_archive(48, 6, 2, 2.0);

	group.bench_function("from_bytes", |b| {
		b.iter(|| black_box(FrameSet::from_bytes(black_box(&data))));
	});

	let factory = EntityFactory::new(Arc::new(SimulationConfig {
		seed: Some(0),
		..SimulationConfig::default()
	}));
	let source = ArchiveSource::Bytes(data.clone());
	group.bench_function("entity", |b| {
		b.iter(|| black_box(factory.load(black_box(&source), 0)));
	});

	group.finish();
}

criterion_group!(benches, bench_container_decode, bench_slice, bench_frame_set);
criterion_main!(benches);
