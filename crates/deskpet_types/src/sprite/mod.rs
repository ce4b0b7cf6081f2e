//! Spritesheet pipeline: slicing and orientation sets.
//!
//! A decoded archive goes through two steps before it can be drawn:
//!
//! 1. [`slice`] cuts each embedded spritesheet into row-major frames,
//!    dropping partial cells at the right and bottom edges and resampling
//!    each cell when the animation has a scale.
//! 2. [`FrameSet`] stores those frames as the `right` sequence and derives
//!    the `left` sequence by mirroring every frame individually.

mod frame_set;
mod slicer;

pub use frame_set::{Facing, FrameSequence, FrameSet};
pub use slicer::{SCALE_FILTER, slice, slice_descriptor};
