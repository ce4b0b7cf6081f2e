//! Folder of recently imported `.pet` archives.

use std::fs;
use std::path::{Path, PathBuf};

use deskpet_types::file::pet::constants::FILE_EXTENSION;
use log::info;

use crate::PetError;
use crate::config::SimulationConfig;

/// Recently used pets, kept as copies in one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetLibrary {
	root: PathBuf,
}

impl PetLibrary {
	/// Creates a library rooted at `root`. Nothing is touched on disk.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self {
			root: root.into(),
		}
	}

	/// Creates a library at the configured `library_dir`.
	pub fn from_config(config: &SimulationConfig) -> Self {
		Self::new(&config.library_dir)
	}

	/// Returns the library folder.
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Creates the library folder if it does not exist yet.
	///
	/// # Errors
	///
	/// Returns `Library` if the folder cannot be created.
	pub fn ensure(&self) -> Result<(), PetError> {
		fs::create_dir_all(&self.root).map_err(|e| PetError::library(&self.root, e))
	}

	/// Lists the archives in the library, sorted by path.
	///
	/// The extension is matched case-insensitively. A missing folder is an
	/// empty library.
	///
	/// # Errors
	///
	/// Returns `Library` if the folder exists but cannot be read.
	pub fn available(&self) -> Result<Vec<PathBuf>, PetError> {
		if !self.root.exists() {
			return Ok(Vec::new());
		}

		let entries = fs::read_dir(&self.root).map_err(|e| PetError::library(&self.root, e))?;
		let mut pets = Vec::new();
		for entry in entries {
			let path = entry.map_err(|e| PetError::library(&self.root, e))?.path();
			if path.is_file() && is_pet_archive(&path) {
				pets.push(path);
			}
		}
		pets.sort();
		Ok(pets)
	}

	/// Copies `source` into the library and returns the new path.
	///
	/// An existing archive is never overwritten: `cat.pet` becomes
	/// `cat_1.pet`, `cat_2.pet` and so on.
	///
	/// # Errors
	///
	/// Returns `Library` if the folder cannot be created or the copy fails.
	pub fn import(&self, source: &Path) -> Result<PathBuf, PetError> {
		self.ensure()?;

		let stem = source.file_stem().map_or_else(|| "pet".into(), |s| s.to_string_lossy());
		let mut destination = self.root.join(format!("{stem}.{FILE_EXTENSION}"));
		let mut suffix = 1;
		while destination.exists() {
			destination = self.root.join(format!("{stem}_{suffix}.{FILE_EXTENSION}"));
			suffix += 1;
		}

		fs::copy(source, &destination).map_err(|e| PetError::library(source, e))?;
		info!("Imported {} as {}", source.display(), destination.display());
		Ok(destination)
	}
}

fn is_pet_archive(path: &Path) -> bool {
	path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case(FILE_EXTENSION))
}
