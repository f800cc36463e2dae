//! Build report formatting.

use polyhydra::{PipelineContext, Polyhydra};

pub fn print_build(poly: &Polyhydra, label: &str) {
	let Some(generated) = poly.mesh() else {
		println!("[{label}] no mesh");
		return;
	};
	let stats = &generated.stats;

	println!("\n[{label}]");
	for line in poly.info_text().lines() {
		println!("  {line}");
	}
	println!("  Triangles: {}", stats.triangle_count);
	println!(
		"  Steps: {} computed, {} cached (base {}, mesh {})",
		stats.steps_applied,
		stats.steps_cached,
		hit(stats.base_cached),
		hit(stats.mesh_cached)
	);
	println!(
		"  Timing: evaluate {} us, tessellate {} us, total {} us",
		stats.evaluate_us, stats.tessellate_us, stats.total_us
	);
	if let Some(scale) = poly.rescale_factor() {
		println!("  Rescale: {scale:.4}");
	}
}

pub fn print_cache(ctx: &PipelineContext) {
	if !ctx.caching {
		println!("\nCache: disabled");
		return;
	}
	let stats = ctx.cache.stats();
	println!("\nCache:");
	for (name, table) in [("base", stats.base), ("step", stats.step), ("mesh", stats.mesh)] {
		println!(
			"  {name:<5} {:>4} entries, {:>4} hits, {:>4} misses",
			table.entries, table.hits, table.misses
		);
	}
}

fn hit(cached: bool) -> &'static str {
	if cached {
		"hit"
	} else {
		"miss"
	}
}
