//! This crate provides the asset layer of the `deskpet` project: the `.pet`
//! archive format and the spritesheet pipeline that turns an archive into
//! ready-to-draw frame sequences.
//!
//! # Pipeline
//!
//! - [`file::pet`]: decode and build `.pet` archives (versioned JSON with
//!   embedded PNG spritesheets)
//! - [`sprite::slice`]: cut a spritesheet into row-major frames, with
//!   optional resampling
//! - [`sprite::FrameSet`]: per-animation frame sequences for both
//!   orientations, the left one mirrored frame by frame
//!
//! # Examples
//!
//! ```no_run
//! use deskpet_types::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archive = PetFile::open("cat.pet")?;
//! let frames = FrameSet::from_file(&archive)?;
//!
//! let idle = frames.get("idle", Facing::Left).expect("idle animation");
//! println!("idle has {} frames of {:?}", idle.len(), idle.frame_size());
//! # Ok(())
//! # }
//! ```

pub mod file;
pub mod sprite;

/// `use deskpet_types::prelude::*;` to import commonly used items.
pub mod prelude;
