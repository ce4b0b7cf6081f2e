//! Per-animation frame sequences in both orientations.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

use image::RgbaImage;
use image::imageops;
use log::debug;

use crate::file::PetFileError;
use crate::file::pet::{AnimationDescriptor, File};

use super::slicer::slice_descriptor;

/// Which way a sprite faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facing {
	/// As authored in the spritesheet
	#[default]
	Right,
	/// Horizontal mirror of the authored frames
	Left,
}

impl Facing {
	/// Maps a `facing_right` flag to an orientation.
	pub fn from_right(facing_right: bool) -> Self {
		if facing_right { Self::Right } else { Self::Left }
	}

	/// Returns `true` for [`Facing::Right`].
	pub fn is_right(self) -> bool {
		self == Self::Right
	}
}

impl fmt::Display for Facing {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Right => write!(f, "right"),
			Self::Left => write!(f, "left"),
		}
	}
}

/// Ordered frames of one animation in one orientation.
///
/// Order is the row-major scan of the spritesheet. A sequence produced by
/// [`FrameSet`] is never empty and holds no zero-area frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameSequence {
	frames: Vec<RgbaImage>,
}

impl FrameSequence {
	/// Wraps already sliced frames.
	pub fn new(frames: Vec<RgbaImage>) -> Self {
		Self {
			frames,
		}
	}

	/// Returns the frames.
	pub fn frames(&self) -> &[RgbaImage] {
		&self.frames
	}

	/// Returns a frame by index.
	pub fn get(&self, index: usize) -> Option<&RgbaImage> {
		self.frames.get(index)
	}

	/// Returns the number of frames.
	pub fn len(&self) -> usize {
		self.frames.len()
	}

	/// Returns `true` if the sequence has no frame.
	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}

	/// Returns the size of the first frame, or `(0, 0)` when empty.
	pub fn frame_size(&self) -> (u32, u32) {
		self.frames.first().map_or((0, 0), RgbaImage::dimensions)
	}

	/// Returns an iterator over the frames.
	pub fn iter(&self) -> std::slice::Iter<'_, RgbaImage> {
		self.frames.iter()
	}

	/// Mirrors every frame horizontally, keeping the frame order.
	///
	/// Flipping the whole sheet before slicing would also reverse the order
	/// of frames within a row, so each frame is flipped on its own.
	pub fn mirrored(&self) -> Self {
		Self::new(self.frames.iter().map(imageops::flip_horizontal).collect())
	}
}

impl Index<usize> for FrameSequence {
	type Output = RgbaImage;

	fn index(&self, index: usize) -> &Self::Output {
		&self.frames[index]
	}
}

impl<'a> IntoIterator for &'a FrameSequence {
	type Item = &'a RgbaImage;
	type IntoIter = std::slice::Iter<'a, RgbaImage>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

/// Frame sequences for every animation of an archive, in both orientations.
///
/// For every name, `right` and `left` have the same length and
/// `left[i]` is `right[i]` flipped horizontally.
///
/// Each instance owns its frames; loading the same archive twice decodes it
/// twice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameSet {
	right: BTreeMap<String, FrameSequence>,
	left: BTreeMap<String, FrameSequence>,
}

impl FrameSet {
	/// Decodes, slices and mirrors every animation of `file`.
	///
	/// # Errors
	///
	/// - `ImageDecode` if an embedded spritesheet is corrupt
	/// - `DegenerateFrame` if slicing yields a zero-area frame
	/// - any slicing error
	pub fn from_file(file: &File) -> Result<Self, PetFileError> {
		let mut set = Self::default();
		for (name, descriptor) in file.animations() {
			let (right, left) = build_orientations(name, descriptor)?;
			debug!("Built `{name}`: {} frames of {:?}", right.len(), right.frame_size());
			set.right.insert(name.clone(), right);
			set.left.insert(name.clone(), left);
		}
		Ok(set)
	}

	/// Parses archive bytes and builds the frame set in one step.
	///
	/// # Errors
	///
	/// Any decode error from [`File::from_bytes`] or build error from
	/// [`FrameSet::from_file`].
	pub fn from_bytes(data: &[u8]) -> Result<Self, PetFileError> {
		Self::from_file(&File::from_bytes(data)?)
	}

	/// Returns the sequence of `name` in the given orientation.
	pub fn get(&self, name: &str, facing: Facing) -> Option<&FrameSequence> {
		match facing {
			Facing::Right => self.right.get(name),
			Facing::Left => self.left.get(name),
		}
	}

	/// Returns all as-authored sequences.
	pub fn right(&self) -> &BTreeMap<String, FrameSequence> {
		&self.right
	}

	/// Returns all mirrored sequences.
	pub fn left(&self) -> &BTreeMap<String, FrameSequence> {
		&self.left
	}

	/// Returns `true` if an animation with this name exists.
	pub fn contains(&self, name: &str) -> bool {
		self.right.contains_key(name)
	}

	/// Returns the animation names, ordered.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.right.keys().map(String::as_str)
	}

	/// Returns the number of animations.
	pub fn len(&self) -> usize {
		self.right.len()
	}

	/// Returns `true` if the set holds no animation.
	pub fn is_empty(&self) -> bool {
		self.right.is_empty()
	}

	/// Removes an animation and returns its `(right, left)` sequences.
	pub fn take(&mut self, name: &str) -> Option<(FrameSequence, FrameSequence)> {
		let right = self.right.remove(name)?;
		let left = self.left.remove(name)?;
		Some((right, left))
	}
}

fn build_orientations(
	name: &str,
	descriptor: &AnimationDescriptor,
) -> Result<(FrameSequence, FrameSequence), PetFileError> {
	let right = FrameSequence::new(slice_descriptor(name, descriptor)?);

	if let Some(index) = right.iter().position(|f| f.width() == 0 || f.height() == 0) {
		return Err(PetFileError::DegenerateFrame {
			animation: name.to_string(),
			index,
		});
	}

	let left = right.mirrored();
	Ok((right, left))
}
