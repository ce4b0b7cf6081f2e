//! This crate provides the simulation layer of the `deskpet` project: pets
//! that wander the screen, the scene holding them and the loop driving it.
//!
//! # Overview
//!
//! - [`entity::PetEntity`]: position, facing and the motion/animation state
//!   machine of one pet
//! - [`source::EntityFactory`]: builds pets from archives, with fallback to
//!   the default pet
//! - [`scene::Scene`]: every active pet, selection and the command queue
//!   used by other threads
//! - [`driver`]: the fixed-rate loop and its thread
//!
//! # Examples
//!
//! ```no_run
//! use deskpet_runtime::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut scene = Scene::new(SimulationConfig::load(None)?)?;
//! scene.add_entity(&ArchiveSource::Path("cat.pet".into()))?;
//!
//! let mut surface = image::RgbaImage::new(1920, 1080);
//! driver::run(&mut scene, &SystemClock::new(), Some(&mut surface), Some(600));
//! # Ok(())
//! # }
//! ```

mod error;

pub mod clip;
pub mod clock;
pub mod config;
pub mod driver;
pub mod entity;
pub mod library;
pub mod scene;
pub mod source;
pub mod surface;

/// `use deskpet_runtime::prelude::*;` to import commonly used items.
pub mod prelude;

pub use error::PetError;
