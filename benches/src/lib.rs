//! Benchmark helper utilities for deskpet
//!
//! Generates synthetic archives so the benchmarks need no asset files.

use deskpet_types::file::PetFileBuilder;
use image::{DynamicImage, Rgba, RgbaImage};

/// Generates a spritesheet of `columns` x `rows` cells of `frame` pixels.
///
/// Every pixel differs from its neighbours so PNG compression has real work
/// to do.
pub fn generate_sheet(frame: u32, columns: u32, rows: u32) -> DynamicImage {
	DynamicImage::ImageRgba8(RgbaImage::from_fn(frame * columns, frame * rows, |x, y| {
		let v = x.wrapping_mul(31) ^ y.wrapping_mul(17);
		Rgba([v as u8, (v >> 3) as u8, (x + y) as u8, if v % 7 == 0 { 0 } else { 0xFF }])
	}))
}

/// Generates a serialized archive with `idle` and `run` animations.
pub fn generate_test_archive(frame: u32, columns: u32, rows: u32, scale: f64) -> Vec<u8> {
	let mut builder = PetFileBuilder::new();
	builder
		.description("benchmark pet")
		.add_image("idle", generate_sheet(frame, columns, rows), frame, frame, scale)
		.add_image("run", generate_sheet(frame, columns * 2, rows), frame, frame, scale);
	match builder.build_bytes() {
		Ok(bytes) => bytes,
		Err(e) => panic!("cannot build benchmark archive: {e}"),
	}
}
