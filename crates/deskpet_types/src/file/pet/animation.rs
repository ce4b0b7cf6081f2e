//! Animation descriptors stored inside a `.pet` archive.

use std::fmt;

use crate::file::{PetFileError, Stage};

use super::constants;

/// One named clip: slicing parameters plus the embedded spritesheet.
///
/// `layout` and `frame_count` are derived from `original_size`: trailing
/// partial cells are ignored, never padded.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationDescriptor {
	/// Width of one frame cell in pixels
	frame_width: u32,

	/// Height of one frame cell in pixels
	frame_height: u32,

	/// Uniform output scale applied at slice time
	scale: f64,

	/// Encoded spritesheet (PNG byte stream)
	image_bytes: Vec<u8>,

	/// Dimensions of the decoded spritesheet
	original_size: (u32, u32),

	/// Size of one frame after scaling
	output_size: (u32, u32),
}

impl AnimationDescriptor {
	/// Creates a descriptor, validating the cell against the sheet size.
	///
	/// # Errors
	///
	/// Returns `InvalidDimensions` if a cell dimension is zero or exceeds the
	/// sheet, and `InvalidScale` if `scale` is not finite and positive.
	/// Either is returned when the sliced frames would exceed
	/// [`MAX_FRAME_SIDE`](constants::MAX_FRAME_SIDE) or
	/// [`MAX_SLICED_BYTES`](constants::MAX_SLICED_BYTES).
	pub fn new(
		frame_width: u32,
		frame_height: u32,
		scale: f64,
		image_bytes: Vec<u8>,
		original_size: (u32, u32),
	) -> Result<Self, PetFileError> {
		Self::checked(
			Stage::Encode,
			i64::from(frame_width),
			i64::from(frame_height),
			scale,
			image_bytes,
			original_size,
		)
	}

	pub(crate) fn checked(
		stage: Stage,
		frame_width: i64,
		frame_height: i64,
		scale: f64,
		image_bytes: Vec<u8>,
		original_size: (u32, u32),
	) -> Result<Self, PetFileError> {
		let (sheet_width, sheet_height) = original_size;
		let fits = frame_width > 0
			&& frame_height > 0
			&& frame_width <= i64::from(sheet_width)
			&& frame_height <= i64::from(sheet_height);
		if !fits {
			return Err(PetFileError::invalid_dimensions(
				stage,
				frame_width,
				frame_height,
				original_size,
			));
		}

		// Both values are in 1..=u32::MAX after the check above.
		let (frame_width, frame_height) = (frame_width as u32, frame_height as u32);
		let output_size = checked_output_size(stage, frame_width, frame_height, scale, original_size)?;

		Ok(Self {
			frame_width,
			frame_height,
			scale,
			image_bytes,
			original_size,
			output_size,
		})
	}

	/// Returns the frame cell width.
	#[inline]
	pub fn frame_width(&self) -> u32 {
		self.frame_width
	}

	/// Returns the frame cell height.
	#[inline]
	pub fn frame_height(&self) -> u32 {
		self.frame_height
	}

	/// Returns the slice-time scale factor.
	#[inline]
	pub fn scale(&self) -> f64 {
		self.scale
	}

	/// Returns the encoded spritesheet bytes.
	#[inline]
	pub fn image_bytes(&self) -> &[u8] {
		&self.image_bytes
	}

	/// Returns the decoded spritesheet size as `(width, height)`.
	#[inline]
	pub fn original_size(&self) -> (u32, u32) {
		self.original_size
	}

	/// Returns the grid layout as `(columns, rows)`.
	pub fn layout(&self) -> (u32, u32) {
		(self.original_size.0 / self.frame_width, self.original_size.1 / self.frame_height)
	}

	/// Returns the number of whole frames in the sheet.
	pub fn frame_count(&self) -> u32 {
		let (columns, rows) = self.layout();
		columns * rows
	}

	/// Returns the size of one frame after scaling.
	pub fn output_frame_size(&self) -> (u32, u32) {
		self.output_size
	}
}

impl fmt::Display for AnimationDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let (columns, rows) = self.layout();
		write!(
			f,
			"{}x{} cells, {} frames ({}x{}), scale {}, sheet {}x{}, {} bytes",
			self.frame_width,
			self.frame_height,
			self.frame_count(),
			columns,
			rows,
			self.scale,
			self.original_size.0,
			self.original_size.1,
			self.image_bytes.len()
		)
	}
}

/// Checks that a scale factor is usable.
fn validate_scale(scale: f64) -> Result<(), PetFileError> {
	if scale.is_finite() && scale > 0.0 {
		Ok(())
	} else {
		Err(PetFileError::InvalidScale(scale))
	}
}

/// Scales a cell size, truncating toward zero.
///
/// Returns `None` if a scaled side exceeds `MAX_FRAME_SIDE` or `frames` such
/// frames exceed `MAX_SLICED_BYTES`.
fn scaled_size(width: u32, height: u32, scale: f64, frames: u64) -> Option<(u32, u32)> {
	let max_side = f64::from(constants::MAX_FRAME_SIDE);
	let (scaled_width, scaled_height) = (f64::from(width) * scale, f64::from(height) * scale);
	if scaled_width > max_side || scaled_height > max_side {
		return None;
	}

	let size = (scaled_width as u32, scaled_height as u32);
	let bytes = u64::from(size.0)
		.checked_mul(u64::from(size.1))
		.and_then(|pixels| pixels.checked_mul(4))
		.and_then(|frame| frame.checked_mul(frames))?;
	(bytes <= constants::MAX_SLICED_BYTES).then_some(size)
}

/// Validates `scale` and returns the output frame size for slicing a
/// `sheet` into cells of `frame_width` x `frame_height` (both non-zero).
///
/// # Errors
///
/// `InvalidScale` for an unusable scale or one that blows the frames past the
/// size bounds; `InvalidDimensions` when the sheet is too large at scale 1 or
/// below.
pub(crate) fn checked_output_size(
	stage: Stage,
	frame_width: u32,
	frame_height: u32,
	scale: f64,
	sheet: (u32, u32),
) -> Result<(u32, u32), PetFileError> {
	validate_scale(scale)?;

	let frames = u64::from(sheet.0 / frame_width) * u64::from(sheet.1 / frame_height);
	scaled_size(frame_width, frame_height, scale, frames).ok_or_else(|| {
		if scale > 1.0 {
			PetFileError::InvalidScale(scale)
		} else {
			PetFileError::invalid_dimensions(stage, i64::from(frame_width), i64::from(frame_height), sheet)
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_layout_ignores_partial_cells() {
		let desc = AnimationDescriptor::new(32, 32, 1.0, Vec::new(), (100, 70)).unwrap();
		assert_eq!(desc.layout(), (3, 2));
		assert_eq!(desc.frame_count(), 6);
	}

	#[test]
	fn test_rejects_oversized_cells() {
		let err = AnimationDescriptor::new(65, 32, 1.0, Vec::new(), (64, 32)).unwrap_err();
		assert!(matches!(err, PetFileError::InvalidDimensions { .. }));

		let err = AnimationDescriptor::new(0, 32, 1.0, Vec::new(), (64, 32)).unwrap_err();
		assert!(matches!(err, PetFileError::InvalidDimensions { .. }));
	}

	#[test]
	fn test_rejects_bad_scale() {
		for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
			let err = AnimationDescriptor::new(8, 8, scale, Vec::new(), (8, 8)).unwrap_err();
			assert!(matches!(err, PetFileError::InvalidScale(_)));
		}
	}

	#[test]
	fn test_rejects_oversized_output() {
		let err = AnimationDescriptor::new(32, 32, 1e9, Vec::new(), (64, 32)).unwrap_err();
		assert!(matches!(err, PetFileError::InvalidScale(s) if s == 1e9));

		// Each side fits, the whole animation does not.
		let err = AnimationDescriptor::new(32, 32, 2000.0, Vec::new(), (64, 32)).unwrap_err();
		assert!(matches!(err, PetFileError::InvalidScale(_)));

		let err = AnimationDescriptor::new(1, 1, 1.0, Vec::new(), (u32::MAX, u32::MAX)).unwrap_err();
		assert!(matches!(
			err,
			PetFileError::InvalidDimensions {
				stage: Stage::Encode,
				..
			}
		));
	}

	#[test]
	fn test_largest_accepted_frame() {
		let side = constants::MAX_FRAME_SIDE;
		let desc = AnimationDescriptor::new(side, 1, 1.0, Vec::new(), (side, 1)).unwrap();
		assert_eq!(desc.output_frame_size(), (side, 1));

		let err = AnimationDescriptor::new(side, 1, 1.01, Vec::new(), (side, 1)).unwrap_err();
		assert!(matches!(err, PetFileError::InvalidScale(_)));
	}

	#[test]
	fn test_output_frame_size() {
		let desc = AnimationDescriptor::new(32, 10, 1.5, Vec::new(), (64, 10)).unwrap();
		assert_eq!(desc.output_frame_size(), (48, 15));
	}
}
