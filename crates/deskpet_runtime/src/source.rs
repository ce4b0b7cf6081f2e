//! Where pets come from: archive sources, the built-in pet and fallback
//! loading.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use deskpet_types::file::{PetFile, PetFileBuilder, PetFileError};
use deskpet_types::sprite::FrameSet;
use image::{DynamicImage, Rgba, RgbaImage, imageops};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::PetError;
use crate::config::SimulationConfig;
use crate::entity::PetEntity;

/// Name reported for pets loaded from the built-in archive
pub const DEFAULT_ARCHIVE_NAME: &str = "default";

/// Name reported for pets loaded from in-memory bytes
pub const MEMORY_ARCHIVE_NAME: &str = "memory";

const DEFAULT_FRAME_SIZE: u32 = 32;
const DEFAULT_SCALE: f64 = 2.0;

/// Archive a pet is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveSource {
	/// `.pet` file on disk
	Path(PathBuf),
	/// Archive bytes already in memory
	Bytes(Vec<u8>),
	/// The built-in pet
	Default,
}

impl ArchiveSource {
	/// Name shown in entity summaries: the file name, or a fixed label.
	pub fn display_name(&self) -> String {
		match self {
			Self::Path(path) => path
				.file_name()
				.map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
			Self::Bytes(_) => MEMORY_ARCHIVE_NAME.to_string(),
			Self::Default => DEFAULT_ARCHIVE_NAME.to_string(),
		}
	}

	/// Decodes the archive and builds its frame sets.
	///
	/// # Errors
	///
	/// Any decode, slice or frame set error of the archive.
	pub fn load(&self) -> Result<FrameSet, PetFileError> {
		match self {
			Self::Path(path) => FrameSet::from_file(&PetFile::open(path)?),
			Self::Bytes(data) => FrameSet::from_bytes(data),
			Self::Default => FrameSet::from_bytes(&default_archive_bytes()?),
		}
	}
}

impl fmt::Display for ArchiveSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Path(path) => write!(f, "{}", path.display()),
			Self::Bytes(data) => write!(f, "<{} bytes>", data.len()),
			Self::Default => write!(f, "<built-in>"),
		}
	}
}

impl From<PathBuf> for ArchiveSource {
	fn from(path: PathBuf) -> Self {
		Self::Path(path)
	}
}

impl From<&Path> for ArchiveSource {
	fn from(path: &Path) -> Self {
		Self::Path(path.to_path_buf())
	}
}

impl From<Vec<u8>> for ArchiveSource {
	fn from(data: Vec<u8>) -> Self {
		Self::Bytes(data)
	}
}

/// A freshly built pet, plus the error that made loading fall back to the
/// default archive, if any.
#[derive(Debug)]
pub struct CreatedEntity {
	/// The fully built pet
	pub entity: PetEntity,
	/// Why the requested archive was replaced by the default one
	pub fallback: Option<PetError>,
}

/// Builds pets from archive sources.
///
/// Safe to share between the simulation thread and UI threads; building runs
/// entirely on the calling thread and touches no scene state.
#[derive(Debug)]
pub struct EntityFactory {
	config: Arc<SimulationConfig>,
	spawned: AtomicU64,
}

impl EntityFactory {
	/// Creates a factory for pets using `config`.
	pub fn new(config: Arc<SimulationConfig>) -> Self {
		Self {
			config,
			spawned: AtomicU64::new(0),
		}
	}

	/// Returns the configuration pets are created with.
	pub fn config(&self) -> &SimulationConfig {
		&self.config
	}

	/// Builds a pet from `source`, without fallback.
	///
	/// # Errors
	///
	/// Any load error of the archive, or `MissingRequiredAnimation`.
	pub fn load(&self, source: &ArchiveSource, now_ms: u64) -> Result<PetEntity, PetError> {
		let frames = source.load()?;
		PetEntity::new(frames, source.display_name(), &self.config, now_ms, self.next_rng())
	}

	/// Builds a pet from `source`, falling back to the default archive when
	/// the requested one cannot be used.
	///
	/// The default archive is the configured `default_archive`, or the
	/// built-in pet when none is configured.
	///
	/// # Errors
	///
	/// The fallback's error if the default archive fails as well, or the
	/// original error when `source` already was the default.
	pub fn create(&self, source: &ArchiveSource, now_ms: u64) -> Result<CreatedEntity, PetError> {
		let error = match self.load(source, now_ms) {
			Ok(entity) => {
				info!("Loaded pet from {source}");
				return Ok(CreatedEntity {
					entity,
					fallback: None,
				});
			}
			Err(e) => e,
		};

		let fallback = self.fallback_source();
		if &fallback == source {
			return Err(error);
		}

		warn!("Cannot load pet from {source}: {error}; using {fallback}");
		let entity = self.load(&fallback, now_ms)?;
		Ok(CreatedEntity {
			entity,
			fallback: Some(error),
		})
	}

	fn fallback_source(&self) -> ArchiveSource {
		self.config.default_archive.clone().map_or(ArchiveSource::Default, ArchiveSource::Path)
	}

	fn next_rng(&self) -> SmallRng {
		match self.config.seed {
			Some(seed) => {
				let spawned = self.spawned.fetch_add(1, Ordering::Relaxed);
				SmallRng::seed_from_u64(seed.wrapping_add(spawned))
			}
			None => SmallRng::from_os_rng(),
		}
	}
}

/// Builds the built-in pet archive.
///
/// It has an `idle` animation of two frames and a `run` animation of four,
/// painted procedurally so the runtime never depends on an asset file.
///
/// # Errors
///
/// Only if embedding the generated sheets fails.
pub fn default_archive() -> Result<PetFile, PetFileError> {
	let mut builder = PetFileBuilder::new();
	builder
		.description("Built-in default pet")
		.add_image(
			"idle",
			paint_sheet(&[(0, 0), (1, 0)]),
			DEFAULT_FRAME_SIZE,
			DEFAULT_FRAME_SIZE,
			DEFAULT_SCALE,
		)
		.add_image(
			"run",
			paint_sheet(&[(2, 1), (0, 2), (2, 3), (0, 0)]),
			DEFAULT_FRAME_SIZE,
			DEFAULT_FRAME_SIZE,
			DEFAULT_SCALE,
		);
	builder.build()
}

/// Serialized form of [`default_archive`].
///
/// # Errors
///
/// See [`default_archive`].
pub fn default_archive_bytes() -> Result<Vec<u8>, PetFileError> {
	default_archive()?.to_bytes()
}

/// Lays out `(lift, stride)` poses left to right in one row.
fn paint_sheet(poses: &[(u32, u32)]) -> DynamicImage {
	let mut sheet = RgbaImage::new(DEFAULT_FRAME_SIZE * poses.len() as u32, DEFAULT_FRAME_SIZE);
	for (index, &(lift, stride)) in poses.iter().enumerate() {
		let frame = paint_pose(lift, stride);
		imageops::overlay(&mut sheet, &frame, i64::from(DEFAULT_FRAME_SIZE) * index as i64, 0);
	}
	DynamicImage::ImageRgba8(sheet)
}

/// A round creature looking right, raised by `lift` pixels, legs spread by
/// `stride`.
fn paint_pose(lift: u32, stride: u32) -> RgbaImage {
	const FUR: Rgba<u8> = Rgba([0xF0, 0x9A, 0x3E, 0xFF]);
	const BELLY: Rgba<u8> = Rgba([0xFA, 0xD9, 0xA6, 0xFF]);
	const EYE: Rgba<u8> = Rgba([0x20, 0x18, 0x10, 0xFF]);
	const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

	let cy = 18.0 - f64::from(lift);
	let legs = [9 - stride, 13 + stride, 19 - stride, 23 + stride];

	RgbaImage::from_fn(DEFAULT_FRAME_SIZE, DEFAULT_FRAME_SIZE, |x, y| {
		let (fx, fy) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
		let eye = |ex: f64| (fx - ex).hypot(fy - (cy - 3.0)) < 1.5;

		if eye(19.0) || eye(24.0) {
			EYE
		} else if in_ellipse(fx, fy, (17.0, cy + 3.0), (6.0, 3.5)) {
			BELLY
		} else if in_ellipse(fx, fy, (16.0, cy), (12.0, 9.0))
			|| (y >= 26 && legs.iter().any(|&l| x == l || x == l + 1) && f64::from(y) > cy)
		{
			FUR
		} else {
			CLEAR
		}
	})
}

fn in_ellipse(x: f64, y: f64, center: (f64, f64), radii: (f64, f64)) -> bool {
	let dx = (x - center.0) / radii.0;
	let dy = (y - center.1) / radii.1;
	dx * dx + dy * dy <= 1.0
}
