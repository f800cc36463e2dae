//! Polyhedron preset builder.
//!
//! Loads a preset file, runs the generation pipeline and prints a build
//! report. Optionally appends random operators and writes the result back
//! out as a new preset.

mod report;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use polyhydra::{GeneratorSettings, Polyhydra, Preset, RebuildStatus};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

/// Build polyhedra from preset files.
#[derive(Parser, Debug)]
#[command(name = "polyhydra")]
#[command(about = "Builds a polyhedron preset and reports the resulting mesh")]
struct Args {
	/// Path to a preset JSON file.
	preset: PathBuf,

	/// Generator settings TOML (default: non-interactive settings).
	#[arg(short, long)]
	settings: Option<PathBuf>,

	/// Run the build on a background worker and wait for it.
	#[arg(long)]
	background: bool,

	/// Append this many random operators before building.
	#[arg(long, default_value_t = 0)]
	random_ops: usize,

	/// Seed for random operators.
	#[arg(long, default_value_t = 0)]
	seed: u64,

	/// Save the (possibly extended) preset into this directory.
	#[arg(short, long)]
	out_dir: Option<PathBuf>,

	/// Build every intermediate chain prefix and report cache reuse.
	#[arg(long)]
	prefixes: bool,
}

fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.init();

	let args = Args::parse();

	let preset = Preset::load(&args.preset)
		.with_context(|| format!("Failed to load preset: {}", args.preset.display()))?;

	let mut settings = match &args.settings {
		Some(path) => GeneratorSettings::load(path)
			.with_context(|| format!("Failed to load settings: {}", path.display()))?,
		None => GeneratorSettings::non_interactive(),
	};
	settings.enable_threading = args.background;

	let mut poly = Polyhydra::with_settings(preset.shape, settings);
	preset
		.apply_to(&mut poly)
		.with_context(|| format!("Preset '{}' is invalid", preset.name))?;

	println!("Loaded preset '{}' ({} operators)", preset.name, poly.operators().len());

	if args.random_ops > 0 {
		let mut rng = StdRng::seed_from_u64(args.seed);
		for _ in 0..args.random_ops {
			// Each pick looks at the mesh built so far
			build(&mut poly)?;
			let op = poly.push_random_operator(&mut rng);
			println!("  + {} (amount {:.3}, faces {:?})", op.kind, op.amount, op.face_selection);
		}
	}

	if args.prefixes {
		let full = poly.operators().to_vec();
		for len in 0..full.len() {
			poly.set_operators(full[..len].to_vec());
			build(&mut poly)?;
			report::print_build(&poly, &format!("prefix {len}"));
		}
		poly.set_operators(full);
	}

	build(&mut poly)?;
	report::print_build(&poly, "final");
	report::print_cache(poly.context());

	if let Some(dir) = &args.out_dir {
		std::fs::create_dir_all(dir)
			.with_context(|| format!("Failed to create output dir: {}", dir.display()))?;
		let path = Preset::from_generator(&preset.name, &poly)
			.save(dir)
			.context("Failed to save preset")?;
		println!("\nPreset written to: {}", path.display());
	}

	Ok(())
}

/// Rebuild and wait for the result, failing on a build error.
fn build(poly: &mut Polyhydra) -> Result<()> {
	let status = match poly.rebuild() {
		RebuildStatus::Started => poly.wait().unwrap_or(RebuildStatus::Failed),
		status => status,
	};

	match (status, poly.last_error()) {
		(RebuildStatus::Completed, _) => Ok(()),
		(_, Some(err)) => Err(err.clone()).context("Generation failed"),
		(status, None) => bail!("Generation did not complete: {status:?}"),
	}
}
