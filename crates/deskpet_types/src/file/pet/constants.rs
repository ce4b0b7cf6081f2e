//! `.pet` archive constants.

/// The only archive format version this crate reads and writes
pub const FORMAT_VERSION: &str = "1.0";

/// File extension used for archives (without the dot)
pub const FILE_EXTENSION: &str = "pet";

/// Scale applied when an animation entry omits `scale`
pub const DEFAULT_SCALE: f64 = 1.0;

/// Image format used for embedded spritesheets
pub const EMBEDDED_IMAGE_FORMAT: image::ImageFormat = image::ImageFormat::Png;

/// Timestamp layout written by older tools (ISO-8601 without offset)
pub const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Largest width or height of a sliced frame after scaling
pub const MAX_FRAME_SIDE: u32 = u16::MAX as u32;

/// Upper bound on the RGBA bytes one animation may slice into.
///
/// Same budget as `image::Limits::default().max_alloc`.
pub const MAX_SLICED_BYTES: u64 = 512 * 1024 * 1024;
