//! Error types for archive parsing, building and spritesheet slicing.

use std::path::PathBuf;

use thiserror::Error;

/// Pipeline stage that raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	/// Parsing a `.pet` archive
	Decode,
	/// Building a `.pet` archive from source images
	Encode,
	/// Cutting a spritesheet into frames
	Slice,
}

impl std::fmt::Display for Stage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Decode => write!(f, "decode"),
			Self::Encode => write!(f, "encode"),
			Self::Slice => write!(f, "slice"),
		}
	}
}

/// Unified error type for everything that touches `.pet` archives.
#[derive(Debug, Error)]
pub enum PetFileError {
	/// IO error
	#[error(transparent)]
	Io(#[from] std::io::Error),

	/// Structurally invalid archive (bad JSON, bad base64, inconsistent cached fields)
	#[error("Malformed archive: {message}")]
	Malformed {
		/// What was wrong with the archive
		message: String,
	},

	/// The archive declares a format version this decoder does not understand
	#[error("Unsupported archive format version {found:?} (supported: {supported})")]
	UnsupportedVersion {
		/// Version string found in the archive, if any
		found: Option<String>,
		/// Version understood by this decoder
		supported: &'static str,
	},

	/// A required field is absent
	#[error("Missing field `{field}` in {scope}")]
	MissingField {
		/// Where the field was expected (`metadata` or `animations.<name>`)
		scope: String,
		/// Name of the field
		field: &'static str,
	},

	/// A source image referenced while building an archive does not exist
	#[error("Source image not found: {}", .0.display())]
	MissingSource(PathBuf),

	/// Attempted to build an archive without any animation
	#[error("Archive has no animations")]
	EmptyContainer,

	/// Frame cell dimensions are non-positive or larger than the spritesheet
	#[error(
		"Invalid frame dimensions during {stage}: cell {frame_width}x{frame_height}, sheet {sheet_width}x{sheet_height}"
	)]
	InvalidDimensions {
		/// Stage that rejected the dimensions
		stage: Stage,
		/// Requested cell width
		frame_width: i64,
		/// Requested cell height
		frame_height: i64,
		/// Spritesheet width (0 when unknown)
		sheet_width: u32,
		/// Spritesheet height (0 when unknown)
		sheet_height: u32,
	},

	/// Scale factor is not a finite positive number
	#[error("Invalid scale {0}: must be a finite positive number")]
	InvalidScale(f64),

	/// Embedded or source image bytes could not be decoded
	#[error("Cannot decode image for animation `{animation}`: {source}")]
	ImageDecode {
		/// Animation the image belongs to
		animation: String,
		/// Underlying codec error
		#[source]
		source: image::ImageError,
	},

	/// A raster could not be encoded for embedding
	#[error("Cannot encode image for animation `{animation}`: {source}")]
	ImageEncode {
		/// Animation the image belongs to
		animation: String,
		/// Underlying codec error
		#[source]
		source: image::ImageError,
	},

	/// Slicing produced a frame with zero width or height
	#[error("Animation `{animation}` frame {index} has zero area")]
	DegenerateFrame {
		/// Animation the frame belongs to
		animation: String,
		/// Frame index in row-major order
		index: usize,
	},
}

impl PetFileError {
	/// Creates a `Malformed` error.
	pub fn malformed(message: impl Into<String>) -> Self {
		Self::Malformed {
			message: message.into(),
		}
	}

	/// Creates a `MissingField` error.
	pub fn missing_field(scope: impl Into<String>, field: &'static str) -> Self {
		Self::MissingField {
			scope: scope.into(),
			field,
		}
	}

	/// Creates an `InvalidDimensions` error.
	pub fn invalid_dimensions(
		stage: Stage,
		frame_width: i64,
		frame_height: i64,
		sheet: (u32, u32),
	) -> Self {
		Self::InvalidDimensions {
			stage,
			frame_width,
			frame_height,
			sheet_width: sheet.0,
			sheet_height: sheet.1,
		}
	}

	/// Returns `true` for errors caused by a damaged or incompatible archive
	/// (as opposed to IO problems or caller mistakes).
	pub fn is_malformed_archive(&self) -> bool {
		matches!(
			self,
			Self::Malformed { .. } | Self::UnsupportedVersion { .. } | Self::MissingField { .. }
		)
	}

	/// Returns `true` for errors caused by unusable image content.
	pub fn is_degenerate_asset(&self) -> bool {
		matches!(self, Self::ImageDecode { .. } | Self::DegenerateFrame { .. })
	}
}

impl From<serde_json::Error> for PetFileError {
	fn from(err: serde_json::Error) -> Self {
		Self::malformed(err.to_string())
	}
}
