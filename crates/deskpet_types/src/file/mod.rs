//! File type support for `deskpet` project.

mod error;

pub mod pet;

// Re-export unified error type
pub use error::{PetFileError, Stage};

// Re-export main file types
pub use pet::{
	AnimationDescriptor, AnimationSource, File as PetFile, FileBuilder as PetFileBuilder,
	Metadata as PetMetadata, SheetSource,
};
