//! Fixed-rate simulation loop.

use std::thread::JoinHandle;
use std::time::Duration;

use log::{info, warn};

use crate::PetError;
use crate::clock::Clock;
use crate::scene::{Scene, SceneHandle, ShutdownReport};
use crate::surface::DrawTarget;

/// Runs the scene until shutdown is requested or `max_ticks` ticks ran.
///
/// Each iteration applies queued commands, ticks every pet at the clock's
/// current time, draws into `target` when one is given, then waits for the
/// rest of the tick interval. Returns the number of ticks run.
pub fn run<C: Clock + ?Sized>(
	scene: &mut Scene,
	clock: &C,
	mut target: Option<&mut dyn DrawTarget>,
	max_ticks: Option<u64>,
) -> u64 {
	let interval = scene.config().tick_interval();
	let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
	let mut ticks = 0;

	loop {
		scene.apply_pending();
		if !scene.is_running() || max_ticks.is_some_and(|max| ticks >= max) {
			break;
		}

		let started = clock.now_ms();
		scene.tick(started);
		if let Some(target) = target.as_deref_mut() {
			scene.draw(target);
		}
		ticks += 1;

		let elapsed = clock.now_ms().saturating_sub(started);
		clock.wait(Duration::from_millis(interval_ms.saturating_sub(elapsed)));
	}

	ticks
}

/// Simulation running on its own thread.
#[derive(Debug)]
pub struct SimulationThread<T> {
	handle: SceneHandle,
	join: JoinHandle<(ShutdownReport, T)>,
}

/// Moves `scene` to a new thread and runs it there, drawing into `target`.
///
/// # Errors
///
/// Returns `Spawn` if the thread cannot be created.
pub fn spawn<C, T>(scene: Scene, clock: C, target: T) -> Result<SimulationThread<T>, PetError>
where
	C: Clock + Send + 'static,
	T: DrawTarget + Send + 'static,
{
	let handle = scene.handle();
	let join = std::thread::Builder::new()
		.name("deskpet-simulation".to_string())
		.spawn(move || {
			let mut scene = scene;
			let mut target = target;
			let ticks = run(&mut scene, &clock, Some(&mut target), None);
			info!("Simulation loop finished after {ticks} ticks");
			(scene.shutdown(), target)
		})
		.map_err(PetError::Spawn)?;

	Ok(SimulationThread {
		handle,
		join,
	})
}

impl<T> SimulationThread<T> {
	/// Returns a handle to the running scene.
	pub fn handle(&self) -> &SceneHandle {
		&self.handle
	}

	/// Returns `true` once the loop has exited.
	pub fn is_finished(&self) -> bool {
		self.join.is_finished()
	}

	/// Signals shutdown, then waits for the thread.
	///
	/// Returns the scene's report along with the draw target.
	///
	/// # Errors
	///
	/// Returns `ThreadPanicked` if the simulation thread panicked.
	pub fn shutdown(self) -> Result<(ShutdownReport, T), PetError> {
		if let Err(e) = self.handle.request_shutdown() {
			warn!("Simulation already stopped: {e}");
		}
		self.join.join().map_err(|_| PetError::ThreadPanicked)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::clock::ManualClock;
	use crate::config::SimulationConfig;
	use crate::source::ArchiveSource;
	use image::RgbaImage;

	fn scene() -> Scene {
		Scene::new(SimulationConfig {
			screen_width: 320,
			screen_height: 240,
			tick_rate_hz: 50,
			seed: Some(11),
			..SimulationConfig::default()
		})
		.unwrap()
	}

	#[test_log::test]
	fn test_run_advances_clock_per_tick() {
		let mut scene = scene();
		scene.add_entity(&ArchiveSource::Default).unwrap();
		let clock = ManualClock::new(0);
		let mut surface = RgbaImage::new(320, 240);

		let ticks = run(&mut scene, &clock, Some(&mut surface), Some(25));

		assert_eq!(ticks, 25);
		assert_eq!(clock.now_ms(), 500);
		assert_eq!(scene.context().now_ms, 480);
		assert!(surface.pixels().any(|p| p[3] != 0));
		// 480 ms at a 400 ms period is exactly one frame advance.
		assert_eq!(scene.entities()[0].frame_index(), 1);
	}

	#[test_log::test]
	fn test_run_stops_on_shutdown_command() {
		let mut scene = scene();
		scene.handle().request_shutdown().unwrap();

		let ticks = run(&mut scene, &ManualClock::new(0), None, None);
		assert_eq!(ticks, 0);
	}

	#[test_log::test]
	fn test_spawned_thread_signal_then_join() {
		let clock = ManualClock::new(0);
		let thread = spawn(scene(), clock.clone(), RgbaImage::new(320, 240)).unwrap();

		thread.handle().add_entity(&ArchiveSource::Default).unwrap();
		while thread.handle().list_entities().is_empty() {
			std::thread::yield_now();
		}

		let (report, surface) = thread.shutdown().unwrap();
		assert_eq!(report.entities_released, 1);
		assert!(report.is_clean());
		assert_eq!(surface.dimensions(), (320, 240));
		assert!(clock.now_ms() > 0);
	}
}
