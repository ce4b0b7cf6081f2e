//! Animation roles and the per-pet clip table.
//!
//! The state machine only knows two roles. Archive names are resolved to
//! roles once, when a pet is created, so a tick never looks anything up by
//! name.

use std::fmt;

use deskpet_types::file::PetFileError;
use deskpet_types::sprite::{Facing, FrameSequence, FrameSet};
use image::RgbaImage;
use log::warn;

use crate::PetError;

/// Role of an animation in the motion state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationRole {
	/// Standing still
	Idle,
	/// Moving toward a wander target
	Run,
}

impl fmt::Display for AnimationRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Idle => write!(f, "idle"),
			Self::Run => write!(f, "run"),
		}
	}
}

/// Frames of one animation in both orientations.
#[derive(Debug, Clone)]
pub struct Clip {
	name: String,
	right: FrameSequence,
	left: FrameSequence,
}

impl Clip {
	fn new(name: &str, right: FrameSequence, left: FrameSequence) -> Result<Self, PetError> {
		if right.is_empty() || right.len() != left.len() {
			return Err(PetFileError::DegenerateFrame {
				animation: name.to_string(),
				index: 0,
			}
			.into());
		}

		Ok(Self {
			name: name.to_string(),
			right,
			left,
		})
	}

	/// Archive name of the animation.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Frames for the given orientation.
	pub fn frames(&self, facing: Facing) -> &FrameSequence {
		match facing {
			Facing::Right => &self.right,
			Facing::Left => &self.left,
		}
	}

	/// Number of frames; identical for both orientations and never zero.
	pub fn len(&self) -> usize {
		self.right.len()
	}

	/// Always `false`: clips are validated non-empty.
	pub fn is_empty(&self) -> bool {
		self.right.is_empty()
	}

	/// Returns a frame, wrapping `index` into range.
	pub fn frame(&self, facing: Facing, index: usize) -> &RgbaImage {
		let frames = self.frames(facing);
		&frames[index % frames.len()]
	}
}

/// Validated mapping from roles to clips.
#[derive(Debug, Clone)]
pub struct ClipTable {
	idle: Clip,
	run: Clip,
}

impl ClipTable {
	/// Resolves the role animations from a frame set.
	///
	/// When the run animation is missing the pet runs with its idle frames.
	///
	/// # Errors
	///
	/// Returns `MissingRequiredAnimation` if `idle_name` is absent.
	pub fn from_frame_set(
		mut frames: FrameSet,
		idle_name: &str,
		run_name: &str,
	) -> Result<Self, PetError> {
		let available: Vec<String> = frames.names().map(str::to_string).collect();
		let (idle_right, idle_left) =
			frames.take(idle_name).ok_or_else(|| PetError::MissingRequiredAnimation {
				name: idle_name.to_string(),
				available,
			})?;
		let idle = Clip::new(idle_name, idle_right, idle_left)?;

		let run = match frames.take(run_name) {
			Some((right, left)) => Clip::new(run_name, right, left)?,
			None => {
				warn!("Archive has no `{run_name}` animation, wandering with `{idle_name}` frames");
				idle.clone()
			}
		};

		Ok(Self {
			idle,
			run,
		})
	}

	/// Returns the clip for a role.
	pub fn clip(&self, role: AnimationRole) -> &Clip {
		match role {
			AnimationRole::Idle => &self.idle,
			AnimationRole::Run => &self.run,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use deskpet_types::file::PetFileBuilder;
	use image::DynamicImage;

	fn frame_set(names: &[(&str, u32)]) -> FrameSet {
		let mut builder = PetFileBuilder::new();
		for &(name, frames) in names {
			builder.add_image(name, DynamicImage::new_rgba8(8 * frames, 8), 8, 8, 1.0);
		}
		FrameSet::from_file(&builder.build().unwrap()).unwrap()
	}

	#[test]
	fn test_roles_resolve_to_archive_names() {
		let table = ClipTable::from_frame_set(frame_set(&[("idle", 2), ("run", 4)]), "idle", "run")
			.unwrap();

		assert_eq!(table.clip(AnimationRole::Idle).name(), "idle");
		assert_eq!(table.clip(AnimationRole::Idle).len(), 2);
		assert_eq!(table.clip(AnimationRole::Run).len(), 4);
	}

	#[test]
	fn test_custom_names() {
		let table =
			ClipTable::from_frame_set(frame_set(&[("sit", 1), ("walk", 3)]), "sit", "walk").unwrap();
		assert_eq!(table.clip(AnimationRole::Run).name(), "walk");
	}

	#[test]
	fn test_missing_idle() {
		let err = ClipTable::from_frame_set(frame_set(&[("run", 2)]), "idle", "run").unwrap_err();
		match err {
			PetError::MissingRequiredAnimation {
				name,
				available,
			} => {
				assert_eq!(name, "idle");
				assert_eq!(available, vec!["run".to_string()]);
			}
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn test_missing_run_falls_back_to_idle() {
		let table = ClipTable::from_frame_set(frame_set(&[("idle", 3)]), "idle", "run").unwrap();
		assert_eq!(table.clip(AnimationRole::Run).name(), "idle");
		assert_eq!(table.clip(AnimationRole::Run).len(), 3);
	}

	#[test]
	fn test_frame_wraps() {
		let table = ClipTable::from_frame_set(frame_set(&[("idle", 2)]), "idle", "run").unwrap();
		let clip = table.clip(AnimationRole::Idle);
		assert_eq!(clip.frame(Facing::Left, 3), &clip.frames(Facing::Left)[1]);
	}
}
