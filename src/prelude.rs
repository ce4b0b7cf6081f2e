//! Prelude module for `deskpet`.
//!
//! # Examples
//!
//! ```rust
//! use deskpet::prelude::*;
//!
//! let archive = PetFile::from_bytes(&default_archive_bytes().unwrap()).unwrap();
//! let frames = FrameSet::from_file(&archive).unwrap();
//! assert_eq!(frames.get("idle", Facing::Right).unwrap().len(), 2);
//! ```

#[doc(inline)]
pub use deskpet_types::prelude::*;

#[doc(inline)]
pub use deskpet_runtime::prelude::*;

#[doc(inline)]
pub use deskpet_runtime::source::{default_archive, default_archive_bytes};
