#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `deskpet` puts small animated pets on the desktop. Each pet wanders on
//! its own, driven by a tiny state machine, and ships as a single portable
//! `.pet` archive bundling all of its spritesheets.
//!
//! The project is split into two crates, re-exported here:
//!
//! - [`deskpet_types`]: the `.pet` archive format and the spritesheet
//!   pipeline
//! - [`deskpet_runtime`]: pets, the scene and the simulation loop
//!
pub use deskpet_runtime;
pub use deskpet_types;

// Re-export commonly used types at crate root
pub use deskpet_runtime::{PetError, entity::PetEntity, scene::Scene};
pub use deskpet_types::file::{PetFile, PetFileBuilder, PetFileError};

/// `use deskpet::prelude::*;` to import commonly used items.
pub mod prelude;
