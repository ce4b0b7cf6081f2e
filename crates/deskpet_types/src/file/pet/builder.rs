//! Building `.pet` archives from source spritesheets.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use log::{debug, warn};

use crate::file::PetFileError;

use super::animation::AnimationDescriptor;
use super::constants;
use super::file::File;
use super::metadata::Metadata;

/// Where a spritesheet comes from.
#[derive(Debug, Clone)]
pub enum SheetSource {
	/// Image file on disk, read at build time
	Path(PathBuf),
	/// Raster already in memory
	Image(DynamicImage),
}

/// One animation to be packed: name, sheet and slicing parameters.
#[derive(Debug, Clone)]
pub struct AnimationSource {
	/// Animation name (archive key)
	pub name: String,
	/// Spritesheet
	pub sheet: SheetSource,
	/// Frame cell width in pixels
	pub frame_width: u32,
	/// Frame cell height in pixels
	pub frame_height: u32,
	/// Slice-time scale factor
	pub scale: f64,
}

/// Collects animation sources and encodes them into a [`File`].
///
/// `id` and `created` are assigned once per build, not per animation.
///
/// # Examples
///
/// ```no_run
/// use deskpet_types::file::pet::FileBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut builder = FileBuilder::new();
/// builder
/// 	.description("My cat")
/// 	.add_animation("idle", "idle.png", 32, 32, 2.0)
/// 	.add_animation("run", "run.png", 32, 32, 2.0);
///
/// builder.build()?.save("cat.pet")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileBuilder {
	description: String,
	sources: Vec<AnimationSource>,
}

impl FileBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the archive description.
	pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
		self.description = description.into();
		self
	}

	/// Adds an animation whose spritesheet is read from `path` at build time.
	pub fn add_animation(
		&mut self,
		name: impl Into<String>,
		path: impl AsRef<Path>,
		frame_width: u32,
		frame_height: u32,
		scale: f64,
	) -> &mut Self {
		self.push(AnimationSource {
			name: name.into(),
			sheet: SheetSource::Path(path.as_ref().to_path_buf()),
			frame_width,
			frame_height,
			scale,
		})
	}

	/// Adds an animation from an in-memory raster.
	pub fn add_image(
		&mut self,
		name: impl Into<String>,
		image: DynamicImage,
		frame_width: u32,
		frame_height: u32,
		scale: f64,
	) -> &mut Self {
		self.push(AnimationSource {
			name: name.into(),
			sheet: SheetSource::Image(image),
			frame_width,
			frame_height,
			scale,
		})
	}

	/// Adds a prepared source. A later source with the same name replaces
	/// the earlier one.
	pub fn push(&mut self, source: AnimationSource) -> &mut Self {
		if let Some(existing) = self.sources.iter_mut().find(|s| s.name == source.name) {
			warn!("Animation `{}` added twice, keeping the latest", source.name);
			*existing = source;
		} else {
			self.sources.push(source);
		}
		self
	}

	/// Returns the number of distinct animations queued.
	pub fn len(&self) -> usize {
		self.sources.len()
	}

	/// Returns `true` when no animation has been added.
	pub fn is_empty(&self) -> bool {
		self.sources.is_empty()
	}

	/// Encodes every source and assembles the archive.
	///
	/// # Errors
	///
	/// - `EmptyContainer` if no animation was added
	/// - `MissingSource` if a source path does not exist
	/// - `ImageDecode` / `ImageEncode` if a sheet cannot be read or embedded
	/// - `InvalidDimensions` / `InvalidScale` for unusable slicing parameters
	pub fn build(&self) -> Result<File, PetFileError> {
		if self.sources.is_empty() {
			return Err(PetFileError::EmptyContainer);
		}

		let mut animations = BTreeMap::new();
		for source in &self.sources {
			let descriptor = encode_source(source)?;
			debug!("Packed animation `{}`: {descriptor}", source.name);
			animations.insert(source.name.clone(), descriptor);
		}

		File::new(Metadata::generate(self.description.clone()), animations)
	}

	/// Builds the archive and serializes it.
	///
	/// # Errors
	///
	/// See [`FileBuilder::build`].
	pub fn build_bytes(&self) -> Result<Vec<u8>, PetFileError> {
		self.build()?.to_bytes()
	}
}

fn encode_source(source: &AnimationSource) -> Result<AnimationDescriptor, PetFileError> {
	let loaded;
	let image = match &source.sheet {
		SheetSource::Path(path) => {
			if !path.exists() {
				return Err(PetFileError::MissingSource(path.clone()));
			}
			loaded = image::open(path).map_err(|e| PetFileError::ImageDecode {
				animation: source.name.clone(),
				source: e,
			})?;
			&loaded
		}
		SheetSource::Image(image) => image,
	};

	let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
	let mut encoded = Cursor::new(Vec::new());
	rgba.write_to(&mut encoded, constants::EMBEDDED_IMAGE_FORMAT).map_err(|e| {
		PetFileError::ImageEncode {
			animation: source.name.clone(),
			source: e,
		}
	})?;

	AnimationDescriptor::new(
		source.frame_width,
		source.frame_height,
		source.scale,
		encoded.into_inner(),
		(rgba.width(), rgba.height()),
	)
}
