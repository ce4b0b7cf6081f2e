//! `.pet` archive utility.
//!
//! Subcommands:
//! - `pack`: build an archive from spritesheets
//! - `info`: show metadata and the slicing layout of every animation
//! - `unpack`: write every sliced frame, in both orientations, as PNG
//! - `verify`: decode an archive and check slicing and mirroring
//! - `simulate`: run a headless scene and save the final frame
//! - `import`: copy a verified archive into the pet library
//!
//! # Usage
//!
//! ```bash
//! # Pack two spritesheets, upscaled twice
//! cargo run --example pet_utils -- pack cat.pet idle=sheets/idle.png:32x32@2 run=sheets/run.png:32x32@2
//!
//! # Inspect and verify the result
//! cargo run --example pet_utils -- info cat.pet --json
//! cargo run --example pet_utils -- verify cat.pet
//!
//! # Let two cats wander for ten simulated seconds
//! cargo run --example pet_utils -- simulate cat.pet cat.pet --ticks 600 -o scene.png
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail, ensure};
use clap::{Args, Parser, Subcommand};
use deskpet::prelude::*;
use image::{RgbaImage, imageops};
use log::{info, warn};

fn main() -> Result<()> {
	// Initialize logger with default level set to info if RUST_LOG is not set
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	match cli.command {
		Command::Pack(args) => run_pack(args),
		Command::Info(args) => run_info(args),
		Command::Unpack(args) => run_unpack(args),
		Command::Verify(args) => run_verify(args),
		Command::Simulate(args) => run_simulate(args),
		Command::Import(args) => run_import(args),
	}
}

#[derive(Parser)]
#[command(name = "pet_utils")]
#[command(author = "deskpet project")]
#[command(version)]
#[command(about = "Build, inspect and run .pet archives", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Build an archive from spritesheets
	Pack(PackArgs),
	/// Show metadata and animation layouts
	Info(InfoArgs),
	/// Write every frame as PNG
	Unpack(UnpackArgs),
	/// Decode an archive and check its frames
	Verify(VerifyArgs),
	/// Run a headless scene
	Simulate(SimulateArgs),
	/// Copy an archive into the pet library
	Import(ImportArgs),
}

#[derive(Args)]
struct PackArgs {
	/// Output archive path
	#[arg(value_name = "OUTPUT")]
	output: PathBuf,

	/// Animations as `name=path:WxH[@scale]`
	#[arg(value_name = "ANIMATION", required = true)]
	animations: Vec<AnimationSpec>,

	/// Free-form description stored in the metadata
	#[arg(short, long, default_value = "")]
	description: String,
}

#[derive(Args)]
struct InfoArgs {
	/// Archive to inspect
	#[arg(value_name = "ARCHIVE")]
	input: PathBuf,

	/// Print JSON instead of text
	#[arg(long, default_value_t = false)]
	json: bool,
}

#[derive(Args)]
struct UnpackArgs {
	/// Archive to unpack
	#[arg(value_name = "ARCHIVE")]
	input: PathBuf,

	/// Output directory (defaults to `<archive>_frames/`)
	#[arg(short, long, value_name = "DIR")]
	output: Option<PathBuf>,
}

#[derive(Args)]
struct VerifyArgs {
	/// Archives to verify
	#[arg(value_name = "ARCHIVE", required = true)]
	inputs: Vec<PathBuf>,
}

#[derive(Args)]
struct SimulateArgs {
	/// Archives to load; the built-in pet when none is given
	#[arg(value_name = "ARCHIVE")]
	archives: Vec<PathBuf>,

	/// TOML configuration file
	#[arg(short, long, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Number of ticks to run
	#[arg(short, long, default_value_t = 600)]
	ticks: u64,

	/// Screen width override
	#[arg(long)]
	width: Option<u32>,

	/// Screen height override
	#[arg(long)]
	height: Option<u32>,

	/// RNG seed override
	#[arg(long)]
	seed: Option<u64>,

	/// Save the last frame as PNG
	#[arg(short, long, value_name = "PNG")]
	output: Option<PathBuf>,

	/// Print the debug overlay after the run
	#[arg(long, default_value_t = false)]
	debug: bool,
}

#[derive(Args)]
struct ImportArgs {
	/// Archive to import
	#[arg(value_name = "ARCHIVE")]
	input: PathBuf,

	/// Library folder (defaults to the configured `library_dir`)
	#[arg(short, long, value_name = "DIR")]
	library: Option<PathBuf>,
}

/// One `name=path:WxH[@scale]` animation argument.
#[derive(Debug, Clone)]
struct AnimationSpec {
	name: String,
	path: PathBuf,
	frame_width: u32,
	frame_height: u32,
	scale: f64,
}

impl FromStr for AnimationSpec {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self> {
		let (name, rest) = s.split_once('=').context("expected `name=path:WxH[@scale]`")?;
		// Split on the last colon so Windows drive letters survive.
		let (path, geometry) = rest.rsplit_once(':').context("missing `:WxH` after the path")?;
		let (size, scale) = match geometry.split_once('@') {
			Some((size, scale)) => (size, scale.parse::<f64>().context("invalid scale")?),
			None => (geometry, 1.0),
		};
		let (width, height) = size.split_once('x').context("frame size must look like `32x32`")?;

		ensure!(!name.is_empty(), "animation name is empty");
		Ok(Self {
			name: name.to_string(),
			path: PathBuf::from(path),
			frame_width: width.parse().context("invalid frame width")?,
			frame_height: height.parse().context("invalid frame height")?,
			scale,
		})
	}
}

fn run_pack(args: PackArgs) -> Result<()> {
	let mut builder = PetFileBuilder::new();
	builder.description(args.description);
	for animation in &args.animations {
		builder.add_animation(&animation.name, &animation.path, animation.frame_width, animation.frame_height, animation.scale);
	}

	let archive = builder.build().context("cannot build archive")?;
	archive.save(&args.output).with_context(|| format!("cannot write {}", args.output.display()))?;

	println!("✓ Packed {} animations into {}", archive.animation_count(), args.output.display());
	print_animations(&archive);
	Ok(())
}

fn run_info(args: InfoArgs) -> Result<()> {
	let archive = open_archive(&args.input)?;

	if args.json {
		let animations: serde_json::Map<String, serde_json::Value> = archive
			.animations()
			.iter()
			.map(|(name, a)| {
				let value = serde_json::json!({
					"frame_size": [a.frame_width(), a.frame_height()],
					"scale": a.scale(),
					"output_frame_size": a.output_frame_size(),
					"original_size": a.original_size(),
					"frames_layout": a.layout(),
					"frame_count": a.frame_count(),
					"encoded_bytes": a.image_bytes().len(),
				});
				(name.clone(), value)
			})
			.collect();
		let report = serde_json::json!({
			"format_version": archive.format_version(),
			"id": archive.metadata().id(),
			"created": archive.metadata().created().to_rfc3339(),
			"description": archive.metadata().description(),
			"animations": animations,
		});
		println!("{}", serde_json::to_string_pretty(&report)?);
		return Ok(());
	}

	println!("📦 {}", args.input.display());
	println!("{archive}");
	print_animations(&archive);
	Ok(())
}

fn run_unpack(args: UnpackArgs) -> Result<()> {
	let archive = open_archive(&args.input)?;
	let frames = FrameSet::from_file(&archive).context("cannot build frames")?;

	let output = args.output.unwrap_or_else(|| {
		let stem = args.input.file_stem().map_or_else(|| "pet".into(), |s| s.to_string_lossy());
		args.input.with_file_name(format!("{stem}_frames"))
	});
	fs::create_dir_all(&output).with_context(|| format!("cannot create {}", output.display()))?;

	let mut written = 0;
	for name in frames.names() {
		for facing in [Facing::Right, Facing::Left] {
			let Some(sequence) = frames.get(name, facing) else {
				continue;
			};
			for (index, frame) in sequence.iter().enumerate() {
				let path = output.join(format!("{name}_{facing}_{index:03}.png"));
				frame.save(&path).with_context(|| format!("cannot write {}", path.display()))?;
				written += 1;
			}
		}
	}

	println!("✓ Wrote {written} frames to {}", output.display());
	Ok(())
}

fn run_verify(args: VerifyArgs) -> Result<()> {
	let mut failed = 0;
	for input in &args.inputs {
		match verify_archive(input) {
			Ok(frames) => println!("✓ {} ({frames} frames)", input.display()),
			Err(err) => {
				failed += 1;
				println!("✗ {} - {err:#}", input.display());
			}
		}
	}

	if failed > 0 {
		bail!("{failed} of {} archives failed verification", args.inputs.len());
	}
	Ok(())
}

/// Checks layout arithmetic, frame sizes and the mirror invariant; returns
/// the number of frames per orientation.
fn verify_archive(path: &Path) -> Result<usize> {
	let archive = open_archive(path)?;
	let frames = FrameSet::from_file(&archive).context("cannot build frames")?;

	let reparsed = PetFile::from_bytes(&archive.to_bytes()?).context("re-encoded archive")?;
	ensure!(reparsed == archive, "re-encoding changes the archive");

	let mut total = 0;
	for (name, descriptor) in archive.animations() {
		let right = frames.get(name, Facing::Right).context("missing right frames")?;
		let left = frames.get(name, Facing::Left).context("missing left frames")?;

		let (columns, rows) = descriptor.layout();
		let (width, height) = descriptor.original_size();
		ensure!(columns == width / descriptor.frame_width(), "`{name}`: wrong column count");
		ensure!(rows == height / descriptor.frame_height(), "`{name}`: wrong row count");
		ensure!(
			right.len() == descriptor.frame_count() as usize,
			"`{name}`: {} frames sliced, {} expected",
			right.len(),
			descriptor.frame_count()
		);
		ensure!(right.len() == left.len(), "`{name}`: orientations differ in length");

		for (index, (r, l)) in right.iter().zip(left).enumerate() {
			ensure!(
				r.dimensions() == descriptor.output_frame_size(),
				"`{name}` frame {index}: size {:?}, expected {:?}",
				r.dimensions(),
				descriptor.output_frame_size()
			);
			ensure!(&imageops::flip_horizontal(r) == l, "`{name}` frame {index}: not mirrored");
		}

		if width % descriptor.frame_width() != 0 || height % descriptor.frame_height() != 0 {
			warn!("`{name}`: {width}x{height} sheet leaves partial cells, they are ignored");
		}
		total += right.len();
	}

	Ok(total)
}

fn run_simulate(args: SimulateArgs) -> Result<()> {
	let mut config = SimulationConfig::load(args.config.as_deref())?;
	if let Some(width) = args.width {
		config.screen_width = width;
	}
	if let Some(height) = args.height {
		config.screen_height = height;
	}
	if args.seed.is_some() {
		config.seed = args.seed;
	}

	let mut scene = Scene::new(config)?;
	if args.archives.is_empty() {
		scene.add_entity(&ArchiveSource::Default)?;
	}
	for archive in &args.archives {
		scene.add_entity(&ArchiveSource::Path(archive.clone()))?;
	}
	if args.debug {
		scene.toggle_debug_overlay();
	}

	let (width, height) = scene.config().screen_size();
	let mut surface = RgbaImage::new(width, height);
	let clock = ManualClock::new(0);
	let ticks = driver::run(&mut scene, &clock, Some(&mut surface), Some(args.ticks));
	info!("Simulated {ticks} ticks ({} ms)", clock.now_ms());

	for summary in scene.list_entities() {
		println!("{summary}");
	}
	for line in scene.debug_lines() {
		println!("  {line}");
	}

	if let Some(output) = &args.output {
		surface.save(output).with_context(|| format!("cannot write {}", output.display()))?;
		println!("✓ Saved scene to {}", output.display());
	}

	let report = scene.shutdown();
	if !report.is_clean() {
		bail!("{} failures during the run", report.failures.len());
	}
	Ok(())
}

fn run_import(args: ImportArgs) -> Result<()> {
	verify_archive(&args.input).context("refusing to import an invalid archive")?;

	let library = match args.library {
		Some(dir) => PetLibrary::new(dir),
		None => PetLibrary::from_config(&SimulationConfig::load(None)?),
	};
	let imported = library.import(&args.input)?;
	println!("✓ Imported as {}", imported.display());

	for path in library.available()? {
		println!("  {}", path.display());
	}
	Ok(())
}

fn open_archive(path: &Path) -> Result<PetFile> {
	PetFile::open(path).with_context(|| format!("cannot open {}", path.display()))
}

fn print_animations(archive: &PetFile) {
	for (name, animation) in archive.animations() {
		println!("  {name}: {animation}");
	}
}
