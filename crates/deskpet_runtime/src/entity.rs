//! The on-screen pet and its motion/animation state machine.
//!
//! Each tick runs three steps in a fixed order:
//!
//! 1. frame advance, on the animation cadence, whatever the motion state
//! 2. motion toward the wander target, with arrival detection
//! 3. the spontaneous wander decision, rate limited by the wander cooldown
//!
//! Animation and motion are independent axes. Arrival and wander start both
//! reset the frame index to zero after the frame advance of that tick.

use std::fmt;

use deskpet_types::sprite::{Facing, FrameSet};
use image::RgbaImage;
use log::debug;
use rand::Rng;
use rand::rngs::SmallRng;

use crate::PetError;
use crate::clip::{AnimationRole, ClipTable};
use crate::config::SimulationConfig;
use crate::surface::DrawTarget;

/// Screen-space position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
	/// Horizontal coordinate, growing to the right
	pub x: f64,
	/// Vertical coordinate, growing downward
	pub y: f64,
}

impl Point {
	/// Creates a point.
	pub const fn new(x: f64, y: f64) -> Self {
		Self {
			x,
			y,
		}
	}

	/// Euclidean distance to `other`.
	pub fn distance(self, other: Self) -> f64 {
		(other.x - self.x).hypot(other.y - self.y)
	}
}

impl fmt::Display for Point {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({:.1}, {:.1})", self.x, self.y)
	}
}

/// Motion state of a pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionState {
	/// No wander target, playing the idle animation
	Idle,
	/// Moving toward a wander target, playing the run animation
	Wandering,
}

impl fmt::Display for MotionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Idle => write!(f, "idle"),
			Self::Wandering => write!(f, "wandering"),
		}
	}
}

/// One pet on screen.
///
/// The frame index always addresses a frame of the current clip: both
/// orientations of a clip have the same length, and every role change resets
/// the index to zero.
#[derive(Debug)]
pub struct PetEntity {
	clips: ClipTable,
	archive_name: String,
	position: Point,
	facing: Facing,
	selected: bool,
	role: AnimationRole,
	frame_index: usize,
	wander_target: Option<Point>,
	wander_speed: f64,
	wander_probability: f64,
	animation_period_ms: u64,
	wander_cooldown_ms: u64,
	screen: (u32, u32),
	last_frame_ms: u64,
	last_wander_ms: u64,
	wander_attempts: u64,
	rng: SmallRng,
}

impl PetEntity {
	/// Creates a pet from its frames.
	///
	/// The pet starts idle, facing right and unselected, at a uniformly random
	/// position that keeps its whole idle frame on screen. Both cadence timers
	/// start at `now_ms`.
	///
	/// # Errors
	///
	/// Returns `MissingRequiredAnimation` if the frames lack the configured
	/// idle animation.
	pub fn new(
		frames: FrameSet,
		archive_name: impl Into<String>,
		config: &SimulationConfig,
		now_ms: u64,
		mut rng: SmallRng,
	) -> Result<Self, PetError> {
		let clips =
			ClipTable::from_frame_set(frames, &config.idle_animation, &config.run_animation)?;
		let screen = config.screen_size();
		let frame_size = clips.clip(AnimationRole::Idle).frames(Facing::Right).frame_size();
		let position = random_point(&mut rng, screen, frame_size);

		let entity = Self {
			clips,
			archive_name: archive_name.into(),
			position,
			facing: Facing::Right,
			selected: false,
			role: AnimationRole::Idle,
			frame_index: 0,
			wander_target: None,
			wander_speed: config.wander_speed,
			wander_probability: config.wander_probability,
			animation_period_ms: config.animation_period_ms,
			wander_cooldown_ms: config.wander_cooldown_ms,
			screen,
			last_frame_ms: now_ms,
			last_wander_ms: now_ms,
			wander_attempts: 0,
			rng,
		};
		debug!("Created pet `{}` at {}", entity.archive_name, entity.position);
		Ok(entity)
	}

	/// Advances the state machine to `now_ms`.
	pub fn tick(&mut self, now_ms: u64) {
		self.advance_frame(now_ms);
		self.advance_motion();
		self.consider_wander(now_ms);
	}

	fn advance_frame(&mut self, now_ms: u64) {
		if now_ms.saturating_sub(self.last_frame_ms) >= self.animation_period_ms {
			self.frame_index = (self.frame_index + 1) % self.clips.clip(self.role).len();
			self.last_frame_ms = now_ms;
		}
	}

	fn advance_motion(&mut self) {
		let Some(target) = self.wander_target else {
			return;
		};

		let dx = target.x - self.position.x;
		let dy = target.y - self.position.y;
		let distance = dx.hypot(dy);

		if distance < self.wander_speed {
			self.position = target;
			self.wander_target = None;
			self.switch_role(AnimationRole::Idle);
			debug!("Pet `{}` arrived at {target}", self.archive_name);
		} else {
			self.position.x += self.wander_speed * dx / distance;
			self.position.y += self.wander_speed * dy / distance;
			self.facing = Facing::from_right(dx > 0.0);
		}
	}

	fn consider_wander(&mut self, now_ms: u64) {
		if self.wander_target.is_some()
			|| now_ms.saturating_sub(self.last_wander_ms) < self.wander_cooldown_ms
		{
			return;
		}

		// The cooldown re-arms on every attempt, successful or not.
		self.last_wander_ms = now_ms;
		self.wander_attempts += 1;

		if self.rng.random::<f64>() < self.wander_probability {
			let frame_size = self.clips.clip(AnimationRole::Run).frames(self.facing).frame_size();
			let target = random_point(&mut self.rng, self.screen, frame_size);
			self.set_wander_target(target);
		}
	}

	fn switch_role(&mut self, role: AnimationRole) {
		self.role = role;
		self.frame_index = 0;
	}

	/// Starts wandering toward `target`.
	pub fn set_wander_target(&mut self, target: Point) {
		debug!("Pet `{}` wanders from {} to {target}", self.archive_name, self.position);
		self.wander_target = Some(target);
		self.switch_role(AnimationRole::Run);
	}

	/// Restarts both cadence timers at `now_ms`.
	///
	/// Used when a pet built elsewhere joins a scene whose clock differs from
	/// the one it was created with.
	pub fn restart_timers(&mut self, now_ms: u64) {
		self.last_frame_ms = now_ms;
		self.last_wander_ms = now_ms;
	}

	/// Returns the frame that would be drawn now.
	pub fn current_frame(&self) -> &RgbaImage {
		self.clips.clip(self.role).frame(self.facing, self.frame_index)
	}

	/// Returns `true` if `point` lies inside the current frame's box.
	///
	/// The box is half-open: the left and top edges are inside, the right and
	/// bottom edges are not.
	pub fn hit_test(&self, point: Point) -> bool {
		let (width, height) = self.current_frame().dimensions();
		let x = point.x - self.position.x;
		let y = point.y - self.position.y;
		x >= 0.0 && y >= 0.0 && x < f64::from(width) && y < f64::from(height)
	}

	/// Blits the current frame at the pet's position.
	pub fn draw(&self, target: &mut dyn DrawTarget) {
		let (x, y) = self.screen_position();
		target.blit(self.current_frame(), x, y);
	}

	/// Returns the position rounded to whole pixels.
	pub fn screen_position(&self) -> (i64, i64) {
		(self.position.x.round() as i64, self.position.y.round() as i64)
	}

	/// Marks the pet as selected or not.
	pub fn set_selected(&mut self, selected: bool) {
		self.selected = selected;
	}

	/// Returns `true` if the pet is selected.
	pub fn is_selected(&self) -> bool {
		self.selected
	}

	/// Moves the pet without changing its motion state.
	pub fn set_position(&mut self, position: Point) {
		self.position = position;
	}

	/// Returns the position of the frame's top-left corner.
	pub fn position(&self) -> Point {
		self.position
	}

	/// Returns the orientation frames are drawn in.
	pub fn facing(&self) -> Facing {
		self.facing
	}

	/// Returns `true` if the pet faces right.
	pub fn facing_right(&self) -> bool {
		self.facing.is_right()
	}

	/// Returns the motion state.
	pub fn state(&self) -> MotionState {
		if self.wander_target.is_some() { MotionState::Wandering } else { MotionState::Idle }
	}

	/// Returns the current animation role.
	pub fn role(&self) -> AnimationRole {
		self.role
	}

	/// Returns the archive name of the current animation.
	pub fn animation_name(&self) -> &str {
		self.clips.clip(self.role).name()
	}

	/// Returns the index of the current frame.
	pub fn frame_index(&self) -> usize {
		self.frame_index
	}

	/// Returns the number of frames of the current animation.
	pub fn frame_count(&self) -> usize {
		self.clips.clip(self.role).len()
	}

	/// Returns the active wander target.
	pub fn wander_target(&self) -> Option<Point> {
		self.wander_target
	}

	/// Returns the distance covered per tick while wandering.
	pub fn wander_speed(&self) -> f64 {
		self.wander_speed
	}

	/// Returns how many spontaneous wander decisions were made so far.
	pub fn wander_attempts(&self) -> u64 {
		self.wander_attempts
	}

	/// Returns the name of the archive the pet was loaded from.
	pub fn archive_name(&self) -> &str {
		&self.archive_name
	}
}

/// Picks a uniformly random point keeping a `frame`-sized box on `screen`.
fn random_point(rng: &mut SmallRng, screen: (u32, u32), frame: (u32, u32)) -> Point {
	let max_x = f64::from(screen.0.saturating_sub(frame.0));
	let max_y = f64::from(screen.1.saturating_sub(frame.1));
	Point::new(rng.random_range(0.0..=max_x), rng.random_range(0.0..=max_y))
}

#[cfg(test)]
mod tests {
	use super::*;
	use deskpet_types::file::PetFileBuilder;
	use image::{DynamicImage, Rgba};
	use rand::SeedableRng;

	fn frames(animations: &[(&str, u32)]) -> FrameSet {
		let mut builder = PetFileBuilder::new();
		for &(name, count) in animations {
			let sheet = RgbaImage::from_fn(16 * count, 16, |x, _| Rgba([(x / 16) as u8, 0, 0, 255]));
			builder.add_image(name, DynamicImage::ImageRgba8(sheet), 16, 16, 1.0);
		}
		FrameSet::from_file(&builder.build().unwrap()).unwrap()
	}

	fn config() -> SimulationConfig {
		SimulationConfig {
			screen_width: 640,
			screen_height: 480,
			..SimulationConfig::default()
		}
	}

	fn pet(config: &SimulationConfig) -> PetEntity {
		PetEntity::new(
			frames(&[("idle", 2), ("run", 4)]),
			"test.pet",
			config,
			0,
			SmallRng::seed_from_u64(7),
		)
		.unwrap()
	}

	#[test_log::test]
	fn test_initial_state() {
		let config = config();
		let pet = pet(&config);

		assert_eq!(pet.state(), MotionState::Idle);
		assert_eq!(pet.animation_name(), "idle");
		assert_eq!(pet.frame_index(), 0);
		assert!(pet.facing_right());
		assert!(!pet.is_selected());
		assert!(pet.wander_target().is_none());

		let position = pet.position();
		assert!((0.0..=624.0).contains(&position.x));
		assert!((0.0..=464.0).contains(&position.y));
	}

	#[test_log::test]
	fn test_spawn_stays_on_screen() {
		let config = config();
		for seed in 0..64 {
			let pet = PetEntity::new(
				frames(&[("idle", 1)]),
				"test.pet",
				&config,
				0,
				SmallRng::seed_from_u64(seed),
			)
			.unwrap();
			let Point {
				x,
				y,
			} = pet.position();
			assert!(x >= 0.0 && x + 16.0 <= 640.0);
			assert!(y >= 0.0 && y + 16.0 <= 480.0);
		}
	}

	#[test_log::test]
	fn test_missing_idle_animation() {
		let err = PetEntity::new(
			frames(&[("run", 2)]),
			"test.pet",
			&config(),
			0,
			SmallRng::seed_from_u64(1),
		)
		.unwrap_err();
		assert!(matches!(err, PetError::MissingRequiredAnimation { ref name, .. } if name == "idle"));
	}

	#[test_log::test]
	fn test_short_wander_arrives_on_second_tick() {
		let config = config();
		let mut pet = pet(&config);
		pet.set_position(Point::new(100.0, 100.0));
		pet.set_wander_target(Point::new(103.0, 100.0));

		pet.tick(16);
		assert_eq!(pet.position(), Point::new(102.0, 100.0));
		assert_eq!(pet.state(), MotionState::Wandering);
		assert_eq!(pet.animation_name(), "run");

		pet.tick(32);
		assert_eq!(pet.position(), Point::new(103.0, 100.0));
		assert_eq!(pet.state(), MotionState::Idle);
		assert_eq!(pet.animation_name(), "idle");
		assert_eq!(pet.frame_index(), 0);
	}

	#[test_log::test]
	fn test_arrival_convergence() {
		let config = SimulationConfig {
			wander_speed: 3.0,
			..config()
		};
		let mut pet = pet(&config);
		let start = Point::new(10.0, 400.0);
		let target = Point::new(500.0, 20.0);
		pet.set_position(start);
		pet.set_wander_target(target);

		let bound = (start.distance(target) / config.wander_speed).ceil() as u64 + 1;
		let mut ticks = 0;
		while pet.state() == MotionState::Wandering {
			ticks += 1;
			assert!(ticks <= bound, "no arrival after {bound} ticks");
			pet.tick(ticks * 16);
		}

		assert_eq!(pet.position(), target);
		assert_eq!(pet.frame_index(), 0);
	}

	#[test_log::test]
	fn test_facing_follows_motion() {
		let config = config();
		let mut pet = pet(&config);
		pet.set_position(Point::new(200.0, 100.0));

		pet.set_wander_target(Point::new(100.0, 100.0));
		pet.tick(1);
		assert!(!pet.facing_right());

		// Vertical motion has dx == 0 and turns the pet left as well.
		pet.set_wander_target(Point::new(pet.position().x, 300.0));
		pet.tick(2);
		assert!(!pet.facing_right());

		pet.set_wander_target(Point::new(300.0, pet.position().y));
		pet.tick(3);
		assert!(pet.facing_right());

		// Facing is kept on arrival.
		pet.set_position(Point::new(150.0, 100.0));
		pet.set_wander_target(Point::new(149.0, 100.0));
		pet.tick(4);
		assert_eq!(pet.state(), MotionState::Idle);
		assert!(pet.facing_right());
	}

	#[test_log::test]
	fn test_frame_cadence() {
		let config = config();
		let mut pet = pet(&config);

		pet.tick(399);
		assert_eq!(pet.frame_index(), 0);
		pet.tick(400);
		assert_eq!(pet.frame_index(), 1);
		pet.tick(700);
		assert_eq!(pet.frame_index(), 1);
		pet.tick(800);
		assert_eq!(pet.frame_index(), 0);
	}

	#[test_log::test]
	fn test_frame_advances_while_wandering() {
		let config = config();
		let mut pet = pet(&config);
		pet.set_position(Point::new(0.0, 0.0));
		pet.set_wander_target(Point::new(600.0, 0.0));

		for (step, now) in (400..=2000).step_by(400).enumerate() {
			pet.tick(now);
			assert_eq!(pet.frame_index(), (step + 1) % 4);
		}
		assert_eq!(pet.frame_count(), 4);
	}

	#[test_log::test]
	fn test_current_frame_follows_facing() {
		let config = config();
		let mut pet = pet(&config);
		pet.set_position(Point::new(300.0, 0.0));
		pet.set_wander_target(Point::new(0.0, 0.0));
		pet.tick(1);

		let frame = pet.current_frame();
		assert_eq!(frame.dimensions(), (16, 16));
		assert!(!pet.facing_right());
	}

	#[test_log::test]
	fn test_wander_attempts_bounded_by_cooldown() {
		let config = SimulationConfig {
			wander_probability: 0.0,
			wander_cooldown_ms: 1_000,
			..config()
		};
		let mut pet = pet(&config);

		let duration = 10_500;
		for now in (0..=duration).step_by(16) {
			pet.tick(now);
		}

		assert!(pet.wander_attempts() <= duration.div_ceil(1_000));
		assert_eq!(pet.wander_attempts(), 10);
		assert_eq!(pet.state(), MotionState::Idle);
	}

	#[test_log::test]
	fn test_certain_wander_starts_after_cooldown() {
		let config = SimulationConfig {
			wander_probability: 1.0,
			..config()
		};
		let mut pet = pet(&config);

		pet.tick(9_999);
		assert_eq!(pet.state(), MotionState::Idle);

		pet.tick(10_000);
		assert_eq!(pet.state(), MotionState::Wandering);
		assert_eq!(pet.animation_name(), "run");
		assert_eq!(pet.frame_index(), 0);
		assert_eq!(pet.wander_attempts(), 1);

		let target = pet.wander_target().unwrap();
		assert!((0.0..=624.0).contains(&target.x));
		assert!((0.0..=464.0).contains(&target.y));
	}

	#[test_log::test]
	fn test_no_decision_while_wandering() {
		let config = SimulationConfig {
			wander_probability: 1.0,
			wander_cooldown_ms: 100,
			..config()
		};
		let mut pet = pet(&config);
		pet.set_position(Point::new(0.0, 0.0));
		pet.set_wander_target(Point::new(600.0, 0.0));

		pet.tick(1_000);
		assert_eq!(pet.wander_attempts(), 0);
		assert_eq!(pet.wander_target(), Some(Point::new(600.0, 0.0)));
	}

	#[test_log::test]
	fn test_hit_test_is_half_open() {
		let config = config();
		let mut pet = pet(&config);
		pet.set_position(Point::new(10.0, 20.0));

		assert!(pet.hit_test(Point::new(10.0, 20.0)));
		assert!(pet.hit_test(Point::new(25.9, 35.9)));
		assert!(!pet.hit_test(Point::new(26.0, 20.0)));
		assert!(!pet.hit_test(Point::new(10.0, 36.0)));
		assert!(!pet.hit_test(Point::new(9.9, 25.0)));
	}

	#[test_log::test]
	fn test_draw_blits_current_frame() {
		let config = config();
		let mut pet = pet(&config);
		pet.set_position(Point::new(4.0, 4.0));

		let mut surface = RgbaImage::new(32, 32);
		pet.draw(&mut surface);
		assert_eq!(surface.get_pixel(4, 4)[3], 255);
		assert_eq!(surface.get_pixel(19, 19)[3], 255);
		assert_eq!(surface.get_pixel(20, 20)[3], 0);
		assert_eq!(surface.get_pixel(3, 3)[3], 0);
	}

	#[test_log::test]
	fn test_selection_flag() {
		let config = config();
		let mut pet = pet(&config);
		pet.set_selected(true);
		assert!(pet.is_selected());
		assert_eq!(pet.state(), MotionState::Idle);
	}
}
