//! The scene: every active pet, the simulation context and the command
//! queue other threads use to change them.
//!
//! A [`Scene`] lives on the simulation thread. UI and tray code talk to it
//! through a [`SceneHandle`], which builds pets on its own thread and queues
//! them, finished, for the scene. Queued commands are applied only between
//! ticks by [`Scene::apply_pending`], so a tick always sees a stable set of
//! fully built pets.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crossbeam_channel::{Receiver, Sender};
use image::{Rgba, RgbaImage};
use log::{debug, error, info};

use crate::PetError;
use crate::config::SimulationConfig;
use crate::entity::{MotionState, PetEntity, Point};
use crate::source::{ArchiveSource, EntityFactory};
use crate::surface::DrawTarget;

/// Process-wide switches and scene time, owned by the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationContext {
	/// Cleared once shutdown was requested
	pub running: bool,
	/// Whether the host should render [`Scene::debug_lines`]
	pub debug_overlay: bool,
	/// Whether the management window was asked to be open
	pub management_open: bool,
	/// Last point forwarded for selection
	pub last_click: Option<Point>,
	/// Time of the latest tick
	pub now_ms: u64,
	/// Ticks run so far
	pub ticks: u64,
}

impl Default for SimulationContext {
	fn default() -> Self {
		Self {
			running: true,
			debug_overlay: false,
			management_open: false,
			last_click: None,
			now_ms: 0,
			ticks: 0,
		}
	}
}

/// Change requested from outside the simulation thread.
#[derive(Debug)]
pub enum SceneCommand {
	/// Adds a fully built pet on top of the others
	Add(Box<PetEntity>),
	/// Removes the pet at an index
	Remove(usize),
	/// Removes every pet
	Clear,
	/// Changes the selection flag of one pet
	SetSelected {
		/// Index of the pet
		index: usize,
		/// New flag
		selected: bool,
	},
	/// Selects the topmost pet under a point
	SelectAt(Point),
	/// Flips the debug overlay switch
	ToggleDebugOverlay,
	/// Asks for the management window
	OpenManagementUi,
	/// Reports the management window as closed
	CloseManagementUi,
	/// Stops the simulation loop
	RequestShutdown,
}

/// What the management window shows for one pet.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySummary {
	/// Position in the scene, bottom-most first
	pub index: usize,
	/// File name of the archive the pet came from
	pub archive_name: String,
	/// Top-left corner of the pet
	pub position: Point,
	/// Archive name of the current animation
	pub animation: String,
	/// Motion state
	pub state: MotionState,
	/// Selection flag
	pub selected: bool,
}

impl EntitySummary {
	fn of(index: usize, entity: &PetEntity) -> Self {
		Self {
			index,
			archive_name: entity.archive_name().to_string(),
			position: entity.position(),
			animation: entity.animation_name().to_string(),
			state: entity.state(),
			selected: entity.is_selected(),
		}
	}
}

impl fmt::Display for EntitySummary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"#{} {} at {} ({}, {})",
			self.index, self.archive_name, self.position, self.state, self.animation
		)?;
		if self.selected {
			write!(f, " [selected]")?;
		}
		Ok(())
	}
}

/// Outcome of [`Scene::shutdown`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
	/// Pets that were still active
	pub entities_released: usize,
	/// Commands still queued when the scene stopped
	pub commands_discarded: usize,
	/// Every command that could not be applied during the run
	pub failures: Vec<String>,
}

impl ShutdownReport {
	/// Returns `true` if nothing failed during the run.
	pub fn is_clean(&self) -> bool {
		self.failures.is_empty()
	}
}

type Summaries = Arc<RwLock<Vec<EntitySummary>>>;

/// Active pets and the state shared by all of them.
#[derive(Debug)]
pub struct Scene {
	factory: Arc<EntityFactory>,
	entities: Vec<PetEntity>,
	context: SimulationContext,
	sender: Sender<SceneCommand>,
	commands: Receiver<SceneCommand>,
	summaries: Summaries,
	marker: RgbaImage,
	failures: Vec<String>,
}

impl Scene {
	/// Creates an empty scene.
	///
	/// # Errors
	///
	/// Returns `InvalidConfig` if `config` does not validate.
	pub fn new(config: SimulationConfig) -> Result<Self, PetError> {
		config.validate()?;
		let (sender, commands) = crossbeam_channel::unbounded();

		Ok(Self {
			factory: Arc::new(EntityFactory::new(Arc::new(config))),
			entities: Vec::new(),
			context: SimulationContext::default(),
			sender,
			commands,
			summaries: Arc::default(),
			marker: selection_marker(48, 12),
			failures: Vec::new(),
		})
	}

	/// Returns a handle for other threads.
	pub fn handle(&self) -> SceneHandle {
		SceneHandle {
			factory: Arc::clone(&self.factory),
			sender: self.sender.clone(),
			summaries: Arc::clone(&self.summaries),
		}
	}

	/// Returns the scene configuration.
	pub fn config(&self) -> &SimulationConfig {
		self.factory.config()
	}

	/// Returns the simulation context.
	pub fn context(&self) -> &SimulationContext {
		&self.context
	}

	/// Returns `false` once shutdown was requested.
	pub fn is_running(&self) -> bool {
		self.context.running
	}

	/// Builds a pet on this thread and adds it on top, falling back to the
	/// default archive if needed.
	///
	/// Returns the index of the new pet.
	///
	/// # Errors
	///
	/// Returns the error of the default archive when the fallback fails too.
	pub fn add_entity(&mut self, source: &ArchiveSource) -> Result<usize, PetError> {
		let created = self.factory.create(source, self.context.now_ms)?;
		Ok(self.push_entity(created.entity))
	}

	/// Adds an already built pet on top and returns its index.
	pub fn push_entity(&mut self, mut entity: PetEntity) -> usize {
		entity.restart_timers(self.context.now_ms);
		info!("Added pet `{}` at {}", entity.archive_name(), entity.position());
		self.entities.push(entity);
		self.publish();
		self.entities.len() - 1
	}

	/// Removes the pet at `index`; later pets move down by one.
	pub fn remove_entity(&mut self, index: usize) -> Option<PetEntity> {
		if index >= self.entities.len() {
			return None;
		}
		let entity = self.entities.remove(index);
		info!("Removed pet `{}` (#{index})", entity.archive_name());
		self.publish();
		Some(entity)
	}

	/// Removes every pet.
	pub fn clear_all(&mut self) {
		info!("Removing all {} pets", self.entities.len());
		self.entities.clear();
		self.publish();
	}

	/// Returns a summary of every pet, bottom-most first.
	pub fn list_entities(&self) -> Vec<EntitySummary> {
		self.entities.iter().enumerate().map(|(i, e)| EntitySummary::of(i, e)).collect()
	}

	/// Returns the active pets, bottom-most first.
	pub fn entities(&self) -> &[PetEntity] {
		&self.entities
	}

	/// Returns a pet for direct manipulation.
	pub fn entity_mut(&mut self, index: usize) -> Option<&mut PetEntity> {
		self.entities.get_mut(index)
	}

	/// Returns the number of pets.
	pub fn len(&self) -> usize {
		self.entities.len()
	}

	/// Returns `true` when no pet is active.
	pub fn is_empty(&self) -> bool {
		self.entities.is_empty()
	}

	/// Sets the selection flag of one pet; `false` if there is no such pet.
	pub fn set_selected(&mut self, index: usize, selected: bool) -> bool {
		let Some(entity) = self.entities.get_mut(index) else {
			return false;
		};
		entity.set_selected(selected);
		self.publish();
		true
	}

	/// Selects the topmost pet under `point` and deselects all others.
	///
	/// Returns the index of the selected pet, if any.
	pub fn select_at(&mut self, point: Point) -> Option<usize> {
		self.context.last_click = Some(point);
		let hit = self.entities.iter().rposition(|e| e.hit_test(point));
		for (index, entity) in self.entities.iter_mut().enumerate() {
			entity.set_selected(Some(index) == hit);
		}
		if let Some(index) = hit {
			debug!("Selected pet #{index} at {point}");
		}
		self.publish();
		hit
	}

	/// Flips the debug overlay switch and returns the new value.
	pub fn toggle_debug_overlay(&mut self) -> bool {
		self.context.debug_overlay = !self.context.debug_overlay;
		self.context.debug_overlay
	}

	/// Marks the management window as requested.
	pub fn open_management_ui(&mut self) {
		self.context.management_open = true;
	}

	/// Marks the management window as closed.
	pub fn close_management_ui(&mut self) {
		self.context.management_open = false;
	}

	/// Stops the loop after the current tick.
	pub fn request_shutdown(&mut self) {
		if self.context.running {
			info!("Shutdown requested");
		}
		self.context.running = false;
	}

	/// Replaces the image drawn beneath selected pets.
	pub fn set_selection_marker(&mut self, marker: RgbaImage) {
		self.marker = marker;
	}

	/// Text of the debug overlay, empty while the overlay is off.
	pub fn debug_lines(&self) -> Vec<String> {
		if !self.context.debug_overlay {
			return Vec::new();
		}

		let last_click = self.context.last_click.map_or_else(|| "none".to_string(), |p| p.to_string());
		let mut lines = vec![
			format!("Running: {}", self.context.running),
			format!("Pets: {}", self.entities.len()),
			"Debug: on".to_string(),
			format!("Last click: {last_click}"),
			format!("Management UI: {}", if self.context.management_open { "open" } else { "closed" }),
			format!("Time: {} ms ({} ticks)", self.context.now_ms, self.context.ticks),
		];
		lines.extend(self.list_entities().iter().map(ToString::to_string));
		lines
	}

	/// Applies every queued command and returns how many were applied.
	pub fn apply_pending(&mut self) -> usize {
		let mut applied = 0;
		while let Ok(command) = self.commands.try_recv() {
			self.apply(command);
			applied += 1;
		}
		applied
	}

	fn apply(&mut self, command: SceneCommand) {
		match command {
			SceneCommand::Add(entity) => {
				self.push_entity(*entity);
			}
			SceneCommand::Remove(index) => {
				if self.remove_entity(index).is_none() {
					self.record_failure(format!("cannot remove pet #{index}: no such pet"));
				}
			}
			SceneCommand::Clear => self.clear_all(),
			SceneCommand::SetSelected {
				index,
				selected,
			} => {
				if !self.set_selected(index, selected) {
					self.record_failure(format!("cannot select pet #{index}: no such pet"));
				}
			}
			SceneCommand::SelectAt(point) => {
				self.select_at(point);
			}
			SceneCommand::ToggleDebugOverlay => {
				self.toggle_debug_overlay();
			}
			SceneCommand::OpenManagementUi => self.open_management_ui(),
			SceneCommand::CloseManagementUi => self.close_management_ui(),
			SceneCommand::RequestShutdown => self.request_shutdown(),
		}
	}

	fn record_failure(&mut self, message: String) {
		error!("{message}");
		self.failures.push(message);
	}

	/// Runs one tick of every pet, in order.
	pub fn tick(&mut self, now_ms: u64) {
		self.context.now_ms = now_ms;
		self.context.ticks += 1;
		for entity in &mut self.entities {
			entity.tick(now_ms);
		}
		self.publish();
	}

	/// Clears `target` and draws every pet, bottom-most first, with the
	/// selection marker beneath selected ones.
	pub fn draw(&self, target: &mut dyn DrawTarget) {
		target.clear();
		for entity in &self.entities {
			if entity.is_selected() {
				let (x, y) = entity.screen_position();
				let (width, height) = entity.current_frame().dimensions();
				let (marker_width, marker_height) = self.marker.dimensions();
				target.blit(
					&self.marker,
					x + (i64::from(width) - i64::from(marker_width)) / 2,
					y + i64::from(height) - i64::from(marker_height) / 2,
				);
			}
			entity.draw(target);
		}
	}

	/// Stops the scene and releases every pet.
	///
	/// Commands still queued are discarded and counted. Failures collected
	/// during the run are returned, each of them already logged.
	pub fn shutdown(mut self) -> ShutdownReport {
		self.context.running = false;
		let commands_discarded = self.commands.try_iter().count();
		let entities_released = self.entities.len();
		self.entities.clear();
		self.publish();

		let report = ShutdownReport {
			entities_released,
			commands_discarded,
			failures: std::mem::take(&mut self.failures),
		};
		info!(
			"Scene stopped after {} ticks: {} pets released, {} commands discarded, {} failures",
			self.context.ticks,
			report.entities_released,
			report.commands_discarded,
			report.failures.len()
		);
		report
	}

	fn publish(&self) {
		let summaries = self.list_entities();
		let mut guard = self.summaries.write().unwrap_or_else(PoisonError::into_inner);
		*guard = summaries;
	}
}

/// Cloneable access to a scene from other threads.
///
/// Every method only queues a command; the scene applies it between two
/// ticks.
#[derive(Debug, Clone)]
pub struct SceneHandle {
	factory: Arc<EntityFactory>,
	sender: Sender<SceneCommand>,
	summaries: Summaries,
}

impl SceneHandle {
	/// Builds a pet on the calling thread, then queues it for the scene.
	///
	/// Returns why the default archive was used instead of `source`, if it
	/// was.
	///
	/// # Errors
	///
	/// - the default archive's error when the fallback fails too
	/// - `Disconnected` if the scene is gone
	pub fn add_entity(&self, source: &ArchiveSource) -> Result<Option<PetError>, PetError> {
		let created = self.factory.create(source, 0)?;
		self.send(SceneCommand::Add(Box::new(created.entity)))?;
		Ok(created.fallback)
	}

	/// Queues the removal of the pet at `index`.
	///
	/// # Errors
	///
	/// Returns `Disconnected` if the scene is gone.
	pub fn remove_entity(&self, index: usize) -> Result<(), PetError> {
		self.send(SceneCommand::Remove(index))
	}

	/// Queues the removal of every pet.
	///
	/// # Errors
	///
	/// Returns `Disconnected` if the scene is gone.
	pub fn clear_all(&self) -> Result<(), PetError> {
		self.send(SceneCommand::Clear)
	}

	/// Queues a selection change.
	///
	/// # Errors
	///
	/// Returns `Disconnected` if the scene is gone.
	pub fn set_selected(&self, index: usize, selected: bool) -> Result<(), PetError> {
		self.send(SceneCommand::SetSelected {
			index,
			selected,
		})
	}

	/// Forwards a click for selection.
	///
	/// # Errors
	///
	/// Returns `Disconnected` if the scene is gone.
	pub fn select_at(&self, point: Point) -> Result<(), PetError> {
		self.send(SceneCommand::SelectAt(point))
	}

	/// Tray signal: flip the debug overlay.
	///
	/// # Errors
	///
	/// Returns `Disconnected` if the scene is gone.
	pub fn toggle_debug_overlay(&self) -> Result<(), PetError> {
		self.send(SceneCommand::ToggleDebugOverlay)
	}

	/// Tray signal: open the management window.
	///
	/// # Errors
	///
	/// Returns `Disconnected` if the scene is gone.
	pub fn open_management_ui(&self) -> Result<(), PetError> {
		self.send(SceneCommand::OpenManagementUi)
	}

	/// Reports the management window as closed.
	///
	/// # Errors
	///
	/// Returns `Disconnected` if the scene is gone.
	pub fn close_management_ui(&self) -> Result<(), PetError> {
		self.send(SceneCommand::CloseManagementUi)
	}

	/// Tray signal: stop the simulation.
	///
	/// # Errors
	///
	/// Returns `Disconnected` if the scene is gone.
	pub fn request_shutdown(&self) -> Result<(), PetError> {
		self.send(SceneCommand::RequestShutdown)
	}

	/// Returns the summaries published after the latest drain or tick.
	pub fn list_entities(&self) -> Vec<EntitySummary> {
		self.summaries.read().unwrap_or_else(PoisonError::into_inner).clone()
	}

	fn send(&self, command: SceneCommand) -> Result<(), PetError> {
		self.sender.send(command).map_err(|_| PetError::Disconnected)
	}
}

/// Translucent ellipse ring used as the default selection marker.
pub fn selection_marker(width: u32, height: u32) -> RgbaImage {
	let (rx, ry) = (f64::from(width) / 2.0, f64::from(height) / 2.0);
	RgbaImage::from_fn(width, height, |x, y| {
		let dx = (f64::from(x) + 0.5 - rx) / rx;
		let dy = (f64::from(y) + 0.5 - ry) / ry;
		let d = dx * dx + dy * dy;
		if (0.55..=1.0).contains(&d) {
			Rgba([0x4A, 0x9E, 0xFF, 0xC0])
		} else if d < 0.55 {
			Rgba([0x4A, 0x9E, 0xFF, 0x40])
		} else {
			Rgba([0, 0, 0, 0])
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::source::default_archive_bytes;

	fn scene() -> Scene {
		Scene::new(SimulationConfig {
			screen_width: 400,
			screen_height: 300,
			seed: Some(3),
			..SimulationConfig::default()
		})
		.unwrap()
	}

	fn place(scene: &mut Scene, index: usize, x: f64, y: f64) {
		scene.entity_mut(index).unwrap().set_position(Point::new(x, y));
	}

	#[test_log::test]
	fn test_add_remove_list() {
		let mut scene = scene();
		assert_eq!(scene.add_entity(&ArchiveSource::Default).unwrap(), 0);
		assert_eq!(scene.add_entity(&ArchiveSource::Bytes(default_archive_bytes().unwrap())).unwrap(), 1);

		let summaries = scene.list_entities();
		assert_eq!(summaries.len(), 2);
		assert_eq!(summaries[0].archive_name, "default");
		assert_eq!(summaries[1].archive_name, "memory");
		assert_eq!(summaries[1].index, 1);

		assert!(scene.remove_entity(0).is_some());
		assert_eq!(scene.list_entities()[0].archive_name, "memory");
		assert!(scene.remove_entity(5).is_none());

		scene.clear_all();
		assert!(scene.is_empty());
	}

	#[test_log::test]
	fn test_handle_commands_apply_between_ticks() {
		let mut scene = scene();
		let handle = scene.handle();

		std::thread::spawn(move || {
			handle.add_entity(&ArchiveSource::Default).unwrap();
			handle.add_entity(&ArchiveSource::Bytes(b"{}".to_vec())).unwrap();
		})
		.join()
		.unwrap();

		assert!(scene.is_empty());
		assert_eq!(scene.apply_pending(), 2);
		assert_eq!(scene.len(), 2);
		assert_eq!(scene.handle().list_entities().len(), 2);
	}

	#[test_log::test]
	fn test_handle_reports_fallback() {
		let scene = scene();
		let fallback = scene.handle().add_entity(&ArchiveSource::Bytes(b"[]".to_vec())).unwrap();
		assert!(matches!(fallback, Some(PetError::File(_))));
	}

	#[test_log::test]
	fn test_handle_after_scene_dropped() {
		let handle = scene().handle();
		assert!(matches!(handle.request_shutdown(), Err(PetError::Disconnected)));
	}

	#[test_log::test]
	fn test_select_at_prefers_topmost() {
		let mut scene = scene();
		scene.add_entity(&ArchiveSource::Default).unwrap();
		scene.add_entity(&ArchiveSource::Default).unwrap();
		place(&mut scene, 0, 10.0, 10.0);
		place(&mut scene, 1, 40.0, 10.0);

		assert_eq!(scene.select_at(Point::new(50.0, 20.0)), Some(1));
		assert!(!scene.entities()[0].is_selected());
		assert!(scene.entities()[1].is_selected());

		assert_eq!(scene.select_at(Point::new(15.0, 20.0)), Some(0));
		assert!(scene.entities()[0].is_selected());
		assert!(!scene.entities()[1].is_selected());

		assert_eq!(scene.select_at(Point::new(390.0, 290.0)), None);
		assert!(scene.entities().iter().all(|e| !e.is_selected()));
		assert_eq!(scene.context().last_click, Some(Point::new(390.0, 290.0)));
	}

	#[test_log::test]
	fn test_debug_lines() {
		let mut scene = scene();
		assert!(scene.debug_lines().is_empty());

		scene.add_entity(&ArchiveSource::Default).unwrap();
		assert!(scene.toggle_debug_overlay());
		scene.tick(32);

		let lines = scene.debug_lines();
		assert_eq!(lines[0], "Running: true");
		assert_eq!(lines[1], "Pets: 1");
		assert_eq!(lines[3], "Last click: none");
		assert_eq!(lines[5], "Time: 32 ms (1 ticks)");
		assert!(lines[6].starts_with("#0 default at "));
	}

	#[test_log::test]
	fn test_draw_marks_selection() {
		let mut scene = scene();
		scene.add_entity(&ArchiveSource::Default).unwrap();
		place(&mut scene, 0, 100.0, 100.0);

		let mut plain = RgbaImage::new(400, 300);
		scene.draw(&mut plain);

		scene.set_selected(0, true);
		let mut selected = RgbaImage::new(400, 300);
		scene.draw(&mut selected);

		assert_ne!(plain, selected);
		assert!(plain.pixels().any(|p| p[3] != 0));
	}

	#[test_log::test]
	fn test_shutdown_report() {
		let mut scene = scene();
		let handle = scene.handle();
		scene.add_entity(&ArchiveSource::Default).unwrap();

		handle.remove_entity(7).unwrap();
		handle.request_shutdown().unwrap();
		scene.apply_pending();
		assert!(!scene.is_running());

		handle.clear_all().unwrap();
		let report = scene.shutdown();

		assert_eq!(report.entities_released, 1);
		assert_eq!(report.commands_discarded, 1);
		assert_eq!(report.failures.len(), 1);
		assert!(!report.is_clean());
		assert!(handle.list_entities().is_empty());
	}
}
