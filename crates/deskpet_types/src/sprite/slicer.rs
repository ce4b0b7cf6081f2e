//! Spritesheet slicing.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::warn;

use crate::file::pet::AnimationDescriptor;
use crate::file::{PetFileError, Stage};

/// Resampling filter used when a scale is applied. Nearest keeps pixel art crisp.
pub const SCALE_FILTER: FilterType = FilterType::Nearest;

/// Cuts a spritesheet into an ordered sequence of frames.
///
/// Cells are visited row-major starting at `(0, 0)`. A remainder narrower or
/// shorter than a full cell at the right or bottom edge is dropped. When
/// `scale != 1`, each cropped cell is resampled on its own to
/// `(frame_width * scale, frame_height * scale)`, truncated.
///
/// # Errors
///
/// - `InvalidDimensions` if a cell dimension is zero or exceeds the sheet
/// - `InvalidScale` if `scale` is not finite and positive, or scales the
///   frames past [`MAX_FRAME_SIDE`](crate::file::pet::constants::MAX_FRAME_SIDE)
///   or [`MAX_SLICED_BYTES`](crate::file::pet::constants::MAX_SLICED_BYTES)
///
/// # Examples
///
/// ```
/// use deskpet_types::sprite::slice;
/// use image::RgbaImage;
///
/// let sheet = RgbaImage::new(100, 32);
/// let frames = slice(&sheet, 32, 32, 1.0).unwrap();
/// assert_eq!(frames.len(), 3); // the 4px remainder is dropped
/// ```
pub fn slice(
	image: &RgbaImage,
	frame_width: u32,
	frame_height: u32,
	scale: f64,
) -> Result<Vec<RgbaImage>, PetFileError> {
	let (sheet_width, sheet_height) = image.dimensions();
	if frame_width == 0 || frame_height == 0 || frame_width > sheet_width || frame_height > sheet_height
	{
		return Err(PetFileError::invalid_dimensions(
			Stage::Slice,
			i64::from(frame_width),
			i64::from(frame_height),
			(sheet_width, sheet_height),
		));
	}
	let (scaled_width, scaled_height) = crate::file::pet::checked_output_size(
		Stage::Slice,
		frame_width,
		frame_height,
		scale,
		(sheet_width, sheet_height),
	)?;

	let columns = sheet_width / frame_width;
	let rows = sheet_height / frame_height;
	if sheet_width % frame_width != 0 || sheet_height % frame_height != 0 {
		warn!(
			"Sheet {sheet_width}x{sheet_height} does not divide into {frame_width}x{frame_height} cells, dropping the remainder"
		);
	}

	let resample = scale != 1.0;

	let mut frames = Vec::with_capacity((columns * rows) as usize);
	for row in 0..rows {
		for column in 0..columns {
			let cell = imageops::crop_imm(
				image,
				column * frame_width,
				row * frame_height,
				frame_width,
				frame_height,
			)
			.to_image();

			let frame = if !resample {
				cell
			} else if scaled_width == 0 || scaled_height == 0 {
				RgbaImage::new(scaled_width, scaled_height)
			} else {
				imageops::resize(&cell, scaled_width, scaled_height, SCALE_FILTER)
			};
			frames.push(frame);
		}
	}

	Ok(frames)
}

/// Decodes the embedded spritesheet of `descriptor` and slices it.
///
/// # Errors
///
/// - `ImageDecode` if the embedded bytes are not a readable image
/// - `Malformed` if the decoded sheet size contradicts `original_size`
/// - any error from [`slice`]
pub fn slice_descriptor(
	name: &str,
	descriptor: &AnimationDescriptor,
) -> Result<Vec<RgbaImage>, PetFileError> {
	let sheet = image::load_from_memory(descriptor.image_bytes())
		.map_err(|e| PetFileError::ImageDecode {
			animation: name.to_string(),
			source: e,
		})?
		.to_rgba8();

	if sheet.dimensions() != descriptor.original_size() {
		let (width, height) = descriptor.original_size();
		return Err(PetFileError::malformed(format!(
			"animation `{name}` declares a {width}x{height} sheet but embeds {}x{}",
			sheet.width(),
			sheet.height()
		)));
	}

	slice(&sheet, descriptor.frame_width(), descriptor.frame_height(), descriptor.scale())
}
