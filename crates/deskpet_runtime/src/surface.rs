//! Blit target the scene draws into.

use image::{Rgba, RgbaImage, imageops};

/// Surface provided by the host window, or an off-screen image.
pub trait DrawTarget {
	/// Size of the surface as `(width, height)`.
	fn size(&self) -> (u32, u32);

	/// Resets every pixel to fully transparent.
	fn clear(&mut self);

	/// Alpha-blends `image` with its top-left corner at `(x, y)`.
	///
	/// Parts outside the surface are clipped.
	fn blit(&mut self, image: &RgbaImage, x: i64, y: i64);
}

impl DrawTarget for RgbaImage {
	fn size(&self) -> (u32, u32) {
		self.dimensions()
	}

	fn clear(&mut self) {
		for pixel in self.pixels_mut() {
			*pixel = Rgba([0, 0, 0, 0]);
		}
	}

	fn blit(&mut self, image: &RgbaImage, x: i64, y: i64) {
		imageops::overlay(self, image, x, y);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_blit_clips_at_edges() {
		let mut surface = RgbaImage::new(4, 4);
		let sprite = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));

		surface.blit(&sprite, 3, -1);
		assert_eq!(surface.get_pixel(3, 0), &Rgba([255, 0, 0, 255]));
		assert_eq!(surface.get_pixel(3, 1), &Rgba([0, 0, 0, 0]));
		assert_eq!(surface.get_pixel(2, 0), &Rgba([0, 0, 0, 0]));

		surface.clear();
		assert!(surface.pixels().all(|p| p[3] == 0));
	}
}
