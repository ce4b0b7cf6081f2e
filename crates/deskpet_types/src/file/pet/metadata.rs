//! Archive provenance metadata.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::file::PetFileError;

use super::constants;

/// Provenance of an archive, fixed when the archive is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
	id: String,
	created: DateTime<Utc>,
	description: String,
}

impl Metadata {
	/// Creates metadata with a freshly generated id and the current time.
	pub fn generate(description: impl Into<String>) -> Self {
		Self {
			id: generate_id(),
			created: Utc::now(),
			description: description.into(),
		}
	}

	/// Creates metadata from known values.
	pub fn new(id: impl Into<String>, created: DateTime<Utc>, description: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			created,
			description: description.into(),
		}
	}

	/// Unique identifier of the archive.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Build time of the archive.
	pub fn created(&self) -> DateTime<Utc> {
		self.created
	}

	/// Free-form description.
	pub fn description(&self) -> &str {
		&self.description
	}
}

impl fmt::Display for Metadata {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} (created {})", self.id, self.created.to_rfc3339())?;
		if !self.description.is_empty() {
			write!(f, ": {}", self.description)?;
		}
		Ok(())
	}
}

/// Generates a random RFC 4122 version 4 identifier.
fn generate_id() -> String {
	let mut bytes: [u8; 16] = rand::random();
	bytes[6] = (bytes[6] & 0x0F) | 0x40;
	bytes[8] = (bytes[8] & 0x3F) | 0x80;

	let hex = hex::encode(bytes);
	format!("{}-{}-{}-{}-{}", &hex[0..8], &hex[8..12], &hex[12..16], &hex[16..20], &hex[20..32])
}

/// Parses a `created` timestamp.
///
/// RFC 3339 is what this crate writes; naive ISO-8601 timestamps from older
/// tools are accepted and taken as UTC.
pub(crate) fn parse_created(raw: &str) -> Result<DateTime<Utc>, PetFileError> {
	if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
		return Ok(parsed.with_timezone(&Utc));
	}

	NaiveDateTime::parse_from_str(raw, constants::LEGACY_TIMESTAMP_FORMAT)
		.map(|naive| naive.and_utc())
		.map_err(|e| PetFileError::malformed(format!("invalid `created` timestamp {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_generated_ids_are_uuid_shaped() {
		let a = Metadata::generate("a");
		let b = Metadata::generate("b");

		assert_ne!(a.id(), b.id());
		assert_eq!(a.id().len(), 36);
		assert_eq!(a.id().as_bytes()[14], b'4');
		assert_eq!(a.id().matches('-').count(), 4);
	}

	#[test]
	fn test_parse_created() {
		let rfc = parse_created("2024-03-01T10:20:30+02:00").unwrap();
		assert_eq!(rfc.to_rfc3339(), "2024-03-01T08:20:30+00:00");

		let legacy = parse_created("2024-03-01T10:20:30.123456").unwrap();
		assert_eq!(legacy.timestamp(), 1_709_288_430);

		assert!(parse_created("yesterday").is_err());
	}
}
