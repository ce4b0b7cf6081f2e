//! Error type for the simulation layer.

use std::path::PathBuf;

use deskpet_types::file::PetFileError;
use thiserror::Error;

/// Errors raised while creating pets, loading configuration or managing
/// the pet library.
#[derive(Debug, Error)]
pub enum PetError {
	/// Archive decode, slice or build failure
	#[error(transparent)]
	File(#[from] PetFileError),

	/// The archive lacks the animation every pet starts in
	#[error("Archive has no `{name}` animation (available: {})", available.join(", "))]
	MissingRequiredAnimation {
		/// Name of the required animation
		name: String,
		/// Animations the archive does provide
		available: Vec<String>,
	},

	/// Configuration sources could not be read or deserialized
	#[error(transparent)]
	Config(#[from] config::ConfigError),

	/// Configuration values are out of range
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	/// File operation on the pet library folder failed
	#[error("Pet library operation on {} failed: {source}", path.display())]
	Library {
		/// Path involved in the failed operation
		path: PathBuf,
		/// Underlying IO error
		#[source]
		source: std::io::Error,
	},

	/// The scene this handle talks to is gone
	#[error("Scene is no longer running")]
	Disconnected,

	/// The simulation thread could not be started
	#[error("Cannot start simulation thread: {0}")]
	Spawn(#[source] std::io::Error),

	/// The simulation thread panicked before it could report
	#[error("Simulation thread panicked")]
	ThreadPanicked,
}

impl PetError {
	/// Wraps an IO error raised on a library path.
	pub fn library(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Library {
			path: path.into(),
			source,
		}
	}
}
