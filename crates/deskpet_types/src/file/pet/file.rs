//! `.pet` archive structure and I/O operations.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::file::{PetFileError, Stage};

use super::animation::AnimationDescriptor;
use super::constants;
use super::metadata::{Metadata, parse_created};

/// A complete `.pet` archive: version, provenance and named animations.
///
/// Archives are immutable once built. Decoding is pure: it only reads the
/// given bytes, so an archive can be moved between machines as one file.
///
/// # Examples
///
/// ```no_run
/// use deskpet_types::file::pet::File;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pet = File::open("cat.pet")?;
///
/// for (name, animation) in pet.animations() {
///     println!("{name}: {} frames", animation.frame_count());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct File {
	/// Format version the archive was read or written with
	format_version: String,

	/// Provenance
	metadata: Metadata,

	/// Animations keyed by case-sensitive name
	animations: BTreeMap<String, AnimationDescriptor>,
}

impl File {
	/// Assembles an archive from already validated parts.
	///
	/// # Errors
	///
	/// Returns `EmptyContainer` if `animations` is empty.
	pub fn new(
		metadata: Metadata,
		animations: BTreeMap<String, AnimationDescriptor>,
	) -> Result<Self, PetFileError> {
		if animations.is_empty() {
			return Err(PetFileError::EmptyContainer);
		}

		Ok(Self {
			format_version: constants::FORMAT_VERSION.to_string(),
			metadata,
			animations,
		})
	}

	/// Opens an archive from the specified path.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be read or is not a valid archive.
	pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, PetFileError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Loads an archive from any reader.
	///
	/// # Errors
	///
	/// Returns an error if reading fails or the archive is invalid.
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, PetFileError> {
		let mut raw = Vec::new();
		reader.read_to_end(&mut raw)?;
		Self::from_bytes(&raw)
	}

	/// Parses an archive from its serialized bytes.
	///
	/// # Errors
	///
	/// - `Malformed` for invalid UTF-8, JSON, base64, or cached fields that
	///   contradict `original_size`
	/// - `UnsupportedVersion` if the format version is absent or unknown
	/// - `MissingField` if a required field is absent
	/// - `InvalidDimensions` / `InvalidScale` for unusable slicing parameters
	/// - `EmptyContainer` if the archive holds no animation
	pub fn from_bytes(data: &[u8]) -> Result<Self, PetFileError> {
		let text = std::str::from_utf8(data)
			.map_err(|e| PetFileError::malformed(format!("archive is not UTF-8: {e}")))?;
		let raw: RawArchive = serde_json::from_str(text)?;

		// Older tools put the version inside `metadata`.
		let version = raw
			.format_version
			.clone()
			.or_else(|| raw.metadata.as_ref().and_then(|m| m.format_version.clone()));
		if version.as_deref() != Some(constants::FORMAT_VERSION) {
			return Err(PetFileError::UnsupportedVersion {
				found: version,
				supported: constants::FORMAT_VERSION,
			});
		}

		let metadata = raw
			.metadata
			.ok_or_else(|| PetFileError::missing_field("archive", "metadata"))?
			.into_metadata()?;

		let raw_animations =
			raw.animations.ok_or_else(|| PetFileError::missing_field("archive", "animations"))?;

		let mut animations = BTreeMap::new();
		for (name, entry) in raw_animations {
			let descriptor = entry.into_descriptor(&name)?;
			debug!("Decoded animation `{name}`: {descriptor}");
			animations.insert(name, descriptor);
		}

		let mut file = Self::new(metadata, animations)?;
		if let Some(version) = version {
			file.format_version = version;
		}
		Ok(file)
	}

	/// Serializes the archive to its textual form.
	///
	/// # Errors
	///
	/// Returns an error if serialization fails.
	pub fn to_bytes(&self) -> Result<Vec<u8>, PetFileError> {
		let wire = WireArchive {
			format_version: &self.format_version,
			metadata: WireMetadata {
				id: self.metadata.id(),
				created: self.metadata.created().to_rfc3339(),
				description: self.metadata.description(),
			},
			animations: self
				.animations
				.iter()
				.map(|(name, animation)| (name.as_str(), WireAnimation::from(animation)))
				.collect(),
		};

		Ok(serde_json::to_vec_pretty(&wire)?)
	}

	/// Writes the serialized archive to a writer.
	///
	/// # Errors
	///
	/// Returns an error if serialization or writing fails.
	pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), PetFileError> {
		writer.write_all(&self.to_bytes()?)?;
		Ok(())
	}

	/// Saves the archive to disk, replacing any existing file.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be written.
	pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), PetFileError> {
		std::fs::write(path, self.to_bytes()?)?;
		Ok(())
	}

	/// Returns the format version.
	pub fn format_version(&self) -> &str {
		&self.format_version
	}

	/// Returns the provenance metadata.
	pub fn metadata(&self) -> &Metadata {
		&self.metadata
	}

	/// Returns all animations, ordered by name.
	pub fn animations(&self) -> &BTreeMap<String, AnimationDescriptor> {
		&self.animations
	}

	/// Returns a single animation by name.
	pub fn get_animation(&self, name: &str) -> Option<&AnimationDescriptor> {
		self.animations.get(name)
	}

	/// Returns `true` if the archive holds an animation with this name.
	pub fn contains_animation(&self, name: &str) -> bool {
		self.animations.contains_key(name)
	}

	/// Returns the animation names, ordered.
	pub fn animation_names(&self) -> impl Iterator<Item = &str> {
		self.animations.keys().map(String::as_str)
	}

	/// Returns the number of animations.
	pub fn animation_count(&self) -> usize {
		self.animations.len()
	}
}

impl std::fmt::Display for File {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"PET File v{}: {} animations, {}",
			self.format_version,
			self.animations.len(),
			self.metadata
		)
	}
}

#[derive(Serialize)]
struct WireArchive<'a> {
	format_version: &'a str,
	metadata: WireMetadata<'a>,
	animations: BTreeMap<&'a str, WireAnimation>,
}

#[derive(Serialize)]
struct WireMetadata<'a> {
	id: &'a str,
	created: String,
	description: &'a str,
}

#[derive(Serialize)]
struct WireAnimation {
	frame_width: u32,
	frame_height: u32,
	frame_count: u32,
	scale: f64,
	image_data: String,
	original_size: [u32; 2],
	frames_layout: [u32; 2],
}

impl From<&AnimationDescriptor> for WireAnimation {
	fn from(animation: &AnimationDescriptor) -> Self {
		let (width, height) = animation.original_size();
		let (columns, rows) = animation.layout();
		Self {
			frame_width: animation.frame_width(),
			frame_height: animation.frame_height(),
			frame_count: animation.frame_count(),
			scale: animation.scale(),
			image_data: BASE64.encode(animation.image_bytes()),
			original_size: [width, height],
			frames_layout: [columns, rows],
		}
	}
}

/// Permissive mirror of the archive; presence is checked field by field so
/// that absent fields surface as `MissingField` rather than a JSON error.
#[derive(Deserialize)]
struct RawArchive {
	format_version: Option<String>,
	metadata: Option<RawMetadata>,
	animations: Option<BTreeMap<String, RawAnimation>>,
}

#[derive(Deserialize)]
struct RawMetadata {
	format_version: Option<String>,
	id: Option<String>,
	created: Option<String>,
	description: Option<String>,
}

impl RawMetadata {
	/// Older tools leave `id` out and write `created` as an empty string, so
	/// both are optional: the id becomes empty and the time the Unix epoch.
	fn into_metadata(self) -> Result<Metadata, PetFileError> {
		let created = match self.created.as_deref() {
			None | Some("") => DateTime::<Utc>::UNIX_EPOCH,
			Some(raw) => parse_created(raw)?,
		};

		Ok(Metadata::new(self.id.unwrap_or_default(), created, self.description.unwrap_or_default()))
	}
}

#[derive(Deserialize)]
struct RawAnimation {
	frame_width: Option<i64>,
	frame_height: Option<i64>,
	frame_count: Option<u64>,
	scale: Option<f64>,
	image_data: Option<String>,
	original_size: Option<[u32; 2]>,
	frames_layout: Option<[u32; 2]>,
}

impl RawAnimation {
	fn into_descriptor(self, name: &str) -> Result<AnimationDescriptor, PetFileError> {
		let scope = || format!("animations.{name}");

		let frame_width =
			self.frame_width.ok_or_else(|| PetFileError::missing_field(scope(), "frame_width"))?;
		let frame_height =
			self.frame_height.ok_or_else(|| PetFileError::missing_field(scope(), "frame_height"))?;
		let image_data =
			self.image_data.ok_or_else(|| PetFileError::missing_field(scope(), "image_data"))?;
		let [width, height] =
			self.original_size.ok_or_else(|| PetFileError::missing_field(scope(), "original_size"))?;

		let image_bytes = BASE64.decode(image_data.as_bytes()).map_err(|e| {
			PetFileError::malformed(format!("animation `{name}` has invalid image_data: {e}"))
		})?;

		let descriptor = AnimationDescriptor::checked(
			Stage::Decode,
			frame_width,
			frame_height,
			self.scale.unwrap_or(constants::DEFAULT_SCALE),
			image_bytes,
			(width, height),
		)?;

		let (columns, rows) = descriptor.layout();
		if let Some([cached_columns, cached_rows]) = self.frames_layout
			&& (cached_columns, cached_rows) != (columns, rows)
		{
			return Err(PetFileError::malformed(format!(
				"animation `{name}` declares layout {cached_columns}x{cached_rows}, sheet gives {columns}x{rows}"
			)));
		}
		if let Some(cached) = self.frame_count
			&& cached != u64::from(descriptor.frame_count())
		{
			return Err(PetFileError::malformed(format!(
				"animation `{name}` declares {cached} frames, sheet gives {}",
				descriptor.frame_count()
			)));
		}

		Ok(descriptor)
	}
}
