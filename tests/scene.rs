//! Scene tests: loading with fallback, motion scenarios and threading.

use deskpet::prelude::*;
use image::{DynamicImage, RgbaImage};

fn config() -> SimulationConfig {
	SimulationConfig {
		screen_width: 800,
		screen_height: 600,
		seed: Some(2024),
		..SimulationConfig::default()
	}
}

fn archive_without_idle() -> Vec<u8> {
	let mut builder = PetFileBuilder::new();
	builder.add_image("run", DynamicImage::new_rgba8(64, 32), 32, 32, 1.0);
	builder.build_bytes().unwrap()
}

#[test_log::test]
fn test_missing_idle_falls_back_to_default() {
	let factory = EntityFactory::new(config().into());
	let source = ArchiveSource::Bytes(archive_without_idle());

	let err = factory.load(&source, 0).unwrap_err();
	assert!(matches!(err, PetError::MissingRequiredAnimation { ref name, .. } if name == "idle"));

	let created = factory.create(&source, 0).unwrap();
	assert!(matches!(created.fallback, Some(PetError::MissingRequiredAnimation { .. })));
	assert_eq!(created.entity.archive_name(), "default");
	assert_eq!(created.entity.animation_name(), "idle");
}

#[test_log::test]
fn test_configured_default_archive_is_used() {
	let dir = tempfile::tempdir().unwrap();
	let default_path = dir.path().join("fallback.pet");
	default_archive().unwrap().save(&default_path).unwrap();

	let mut scene = Scene::new(SimulationConfig {
		default_archive: Some(default_path),
		..config()
	})
	.unwrap();
	scene.add_entity(&ArchiveSource::Path(dir.path().join("missing.pet"))).unwrap();

	assert_eq!(scene.list_entities()[0].archive_name, "fallback.pet");
}

#[test_log::test]
fn test_short_wander_scenario() {
	let mut scene = Scene::new(config()).unwrap();
	scene.add_entity(&ArchiveSource::Default).unwrap();

	let pet = scene.entity_mut(0).unwrap();
	pet.set_position(Point::new(100.0, 100.0));
	pet.set_wander_target(Point::new(103.0, 100.0));

	scene.tick(16);
	let summary = &scene.list_entities()[0];
	assert_eq!(summary.position, Point::new(102.0, 100.0));
	assert_eq!(summary.state, MotionState::Wandering);

	scene.tick(32);
	let pet = &scene.entities()[0];
	assert_eq!(pet.position(), Point::new(103.0, 100.0));
	assert_eq!(pet.state(), MotionState::Idle);
	assert_eq!(pet.frame_index(), 0);
}

#[test_log::test]
fn test_wander_attempts_over_long_run() {
	let config = SimulationConfig {
		wander_cooldown_ms: 2_000,
		tick_rate_hz: 50,
		..config()
	};
	let cooldown = config.wander_cooldown_ms;
	let mut scene = Scene::new(config).unwrap();
	for _ in 0..3 {
		scene.add_entity(&ArchiveSource::Default).unwrap();
	}

	let clock = ManualClock::new(0);
	driver::run(&mut scene, &clock, None, Some(3_000));
	let duration = scene.context().now_ms;

	for pet in scene.entities() {
		assert!(pet.wander_attempts() >= 1);
		assert!(pet.wander_attempts() <= duration.div_ceil(cooldown));
		assert!(pet.frame_index() < pet.frame_count());
	}
}

#[test_log::test]
fn test_pets_stay_on_screen() {
	let mut scene = Scene::new(SimulationConfig {
		wander_probability: 1.0,
		wander_cooldown_ms: 500,
		wander_speed: 8.0,
		..config()
	})
	.unwrap();
	scene.add_entity(&ArchiveSource::Default).unwrap();

	let mut surface = RgbaImage::new(800, 600);
	driver::run(&mut scene, &ManualClock::new(0), Some(&mut surface), Some(2_000));

	let pet = &scene.entities()[0];
	let (width, height) = pet.current_frame().dimensions();
	let position = pet.position();
	assert!(position.x >= 0.0 && position.x + f64::from(width) <= 800.0);
	assert!(position.y >= 0.0 && position.y + f64::from(height) <= 600.0);
}

#[test_log::test]
fn test_library_import_then_load() {
	let dir = tempfile::tempdir().unwrap();
	let archive = dir.path().join("cat.pet");
	default_archive().unwrap().save(&archive).unwrap();

	let library = PetLibrary::new(dir.path().join("MyPets"));
	let imported = library.import(&archive).unwrap();
	assert_eq!(library.available().unwrap(), vec![imported.clone()]);

	let mut scene = Scene::new(config()).unwrap();
	scene.add_entity(&ArchiveSource::Path(imported)).unwrap();
	assert_eq!(scene.list_entities()[0].archive_name, "cat.pet");
}

#[test_log::test]
fn test_threaded_scene() {
	let scene = Scene::new(config()).unwrap();
	let simulation = driver::spawn(scene, ManualClock::new(0), RgbaImage::new(800, 600)).unwrap();
	let handle = simulation.handle().clone();

	let loader = std::thread::spawn(move || {
		let fallback = handle.add_entity(&ArchiveSource::Bytes(archive_without_idle())).unwrap();
		assert!(fallback.is_some());
		handle.add_entity(&ArchiveSource::Default).unwrap();
		handle.toggle_debug_overlay().unwrap();
	});
	loader.join().unwrap();

	while simulation.handle().list_entities().len() < 2 {
		std::thread::yield_now();
	}
	simulation.handle().remove_entity(0).unwrap();
	simulation.handle().remove_entity(9).unwrap();

	let (report, _surface) = simulation.shutdown().unwrap();
	assert_eq!(report.entities_released, 1);
	assert_eq!(report.failures.len(), 1);
}
