//! Prelude module for `deskpet_runtime`.

#[doc(inline)]
pub use crate::PetError;

#[doc(inline)]
pub use crate::clock::{Clock, ManualClock, SystemClock};

#[doc(inline)]
pub use crate::config::SimulationConfig;

#[doc(inline)]
pub use crate::entity::{MotionState, PetEntity, Point};

#[doc(inline)]
pub use crate::library::PetLibrary;

#[doc(inline)]
pub use crate::scene::{EntitySummary, Scene, SceneHandle, ShutdownReport};

#[doc(inline)]
pub use crate::source::{ArchiveSource, CreatedEntity, EntityFactory};

#[doc(inline)]
pub use crate::surface::DrawTarget;

pub use crate::driver;
