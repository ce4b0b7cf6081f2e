//! Prelude module for `deskpet_types`.
//!
//! This module provides a convenient way to import commonly used types.
//!
//! # Examples
//!
//! ```no_run
//! use deskpet_types::prelude::*;
//!
//! let mut builder = PetFileBuilder::new();
//! builder.add_animation("idle", "idle.png", 32, 32, 1.0);
//! ```

#[doc(inline)]
pub use crate::file::{
	AnimationDescriptor, PetFile, PetFileBuilder, PetFileError, PetMetadata, SheetSource, Stage,
};

#[doc(inline)]
pub use crate::sprite::{Facing, FrameSequence, FrameSet, slice};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
