//! `.pet` archive format support for `deskpet`.
//!
//! A `.pet` archive bundles every animation of one pet into a single portable
//! file. Each animation embeds its whole spritesheet, so decoding never touches
//! the filesystem beyond the archive itself.
//!
//! # File Structure
//!
//! The archive is UTF-8 JSON:
//!
//! ```text
//! {
//!   "format_version": "1.0",
//!   "metadata": {
//!     "id": "5b0c4c3e-...",          unique identifier
//!     "created": "2024-03-01T...",   RFC 3339 build time
//!     "description": "..."
//!   },
//!   "animations": {
//!     "<name>": {
//!       "frame_width": 32,           cell width in pixels
//!       "frame_height": 32,          cell height in pixels
//!       "frame_count": 2,            cached: columns * rows
//!       "scale": 2.0,                slice-time scale, default 1
//!       "image_data": "iVBORw0...",  base64 PNG spritesheet
//!       "original_size": [64, 32],   decoded spritesheet size
//!       "frames_layout": [2, 1]      cached: [columns, rows]
//!     }
//!   }
//! }
//! ```
//!
//! `frame_count` and `frames_layout` are derived from `original_size` by
//! integer division; cells that do not fit completely are ignored.
//!
//! Unknown `format_version` values are rejected. Archives written by older
//! tools carry the version inside `metadata`; that placement is accepted too.
//! Those archives may also lack `id` and leave `created` empty.
//!
//! Scaled frames are limited to [`constants::MAX_FRAME_SIDE`] per side and
//! [`constants::MAX_SLICED_BYTES`] per animation.
//!
//! # Usage Examples
//!
//! ## Building an archive
//!
//! ```no_run
//! use deskpet_types::file::pet::FileBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = FileBuilder::new();
//! builder.description("Orange cat").add_animation("idle", "idle.png", 32, 32, 2.0);
//! std::fs::write("cat.pet", builder.build_bytes()?)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Reading an archive
//!
//! ```no_run
//! use deskpet_types::file::pet::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pet = File::open("cat.pet")?;
//! println!("{pet}");
//!
//! if let Some(idle) = pet.get_animation("idle") {
//!     let (columns, rows) = idle.layout();
//!     println!("idle: {} frames in a {columns}x{rows} grid", idle.frame_count());
//! }
//! # Ok(())
//! # }
//! ```

mod animation;
mod builder;
mod file;
mod metadata;

pub mod constants;


pub use animation::AnimationDescriptor;
pub(crate) use animation::checked_output_size;
pub use builder::{AnimationSource, FileBuilder, SheetSource};
pub use file::File;
pub use metadata::Metadata;
