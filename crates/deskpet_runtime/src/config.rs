//! Simulation tunables.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables prefixed with `DESKPET_` (for example
//! `DESKPET_WANDER_SPEED=3.5`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::PetError;

/// Prefix of environment variables that override configuration values
pub const ENV_PREFIX: &str = "DESKPET";

/// Tunables shared by the scene and every pet it creates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Time between two animation frames
	pub animation_period_ms: u64,

	/// Minimum time between two spontaneous wander decisions
	pub wander_cooldown_ms: u64,

	/// Chance that a wander decision starts a wander
	pub wander_probability: f64,

	/// Distance covered per tick while wandering, in pixels
	pub wander_speed: f64,

	/// Simulation ticks per second
	pub tick_rate_hz: u32,

	/// Width of the visible screen in pixels
	pub screen_width: u32,

	/// Height of the visible screen in pixels
	pub screen_height: u32,

	/// Archive animation used while idle; every archive must provide it
	pub idle_animation: String,

	/// Archive animation used while wandering
	pub run_animation: String,

	/// Archive used when a requested one cannot be loaded.
	/// `None` selects the built-in default pet.
	pub default_archive: Option<PathBuf>,

	/// Folder holding recently imported archives
	pub library_dir: PathBuf,

	/// Seed for deterministic runs; `None` seeds from the OS
	pub seed: Option<u64>,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			animation_period_ms: 400,
			wander_cooldown_ms: 10_000,
			wander_probability: 0.60,
			wander_speed: 2.0,
			tick_rate_hz: 60,
			screen_width: 1920,
			screen_height: 1080,
			idle_animation: "idle".to_string(),
			run_animation: "run".to_string(),
			default_archive: None,
			library_dir: PathBuf::from("MyPets"),
			seed: None,
		}
	}
}

impl SimulationConfig {
	/// Loads the configuration from defaults, an optional file and the
	/// environment, then validates it.
	///
	/// A missing file is not an error.
	///
	/// # Errors
	///
	/// Returns `Config` if a source cannot be parsed and `InvalidConfig` if a
	/// value is out of range.
	pub fn load(path: Option<&Path>) -> Result<Self, PetError> {
		let mut builder = config::Config::builder();
		if let Some(path) = path {
			builder = builder.add_source(config::File::from(path).required(false));
		}
		builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

		let config: Self = builder.build()?.try_deserialize()?;
		config.validate()?;
		Ok(config)
	}

	/// Checks that every value is usable by the state machine.
	///
	/// # Errors
	///
	/// Returns `InvalidConfig` naming the first offending value.
	pub fn validate(&self) -> Result<(), PetError> {
		let invalid = |message: String| Err(PetError::InvalidConfig(message));

		if self.animation_period_ms == 0 {
			return invalid("animation_period_ms must be positive".into());
		}
		if self.wander_cooldown_ms == 0 {
			return invalid("wander_cooldown_ms must be positive".into());
		}
		if !(0.0..=1.0).contains(&self.wander_probability) {
			return invalid(format!(
				"wander_probability must be within [0, 1], got {}",
				self.wander_probability
			));
		}
		if !(self.wander_speed.is_finite() && self.wander_speed > 0.0) {
			return invalid(format!("wander_speed must be positive, got {}", self.wander_speed));
		}
		if self.tick_rate_hz == 0 {
			return invalid("tick_rate_hz must be positive".into());
		}
		if self.screen_width == 0 || self.screen_height == 0 {
			return invalid(format!(
				"screen size must be positive, got {}x{}",
				self.screen_width, self.screen_height
			));
		}
		if self.idle_animation.is_empty() || self.run_animation.is_empty() {
			return invalid("animation names must not be empty".into());
		}
		Ok(())
	}

	/// Returns the screen size as `(width, height)`.
	pub fn screen_size(&self) -> (u32, u32) {
		(self.screen_width, self.screen_height)
	}

	/// Returns the wall time of one tick.
	pub fn tick_interval(&self) -> Duration {
		Duration::from_secs(1) / self.tick_rate_hz.max(1)
	}
}
