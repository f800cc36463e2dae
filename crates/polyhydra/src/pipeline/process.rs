//! Pipeline Orchestrator
//!
//! Runs base → evaluate → tessellate for one request on the calling thread.
//! The background controller runs this same function on a worker.
//!
//! # Usage
//!
//! ```ignore
//! let ctx = PipelineContext::new();
//! let request = GenerationRequest::new(ShapeDescriptor::default())
//!     .with_operators(vec![OperatorInstance::new(OperatorKind::Kis)]);
//!
//! let generated = run_generation(&ctx, &request)?;
//! println!("{} triangles", generated.mesh.triangle_count());
//! ```

use std::sync::Arc;

use tracing::info;
use web_time::Instant;

use super::cache::CacheKey;
use super::evaluate::{base_key, build_base, evaluate_chain};
use super::tessellate::tessellate;
use super::types::{GenerationRequest, GeneratedMesh, PipelineContext};
use crate::error::PipelineError;

/// Statistics from one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingStats {
  /// Operator steps computed by the library.
  pub steps_applied: usize,
  /// Operator steps served from the step table.
  pub steps_cached: usize,
  pub base_cached: bool,
  pub mesh_cached: bool,
  /// Base construction plus chain evaluation, in microseconds.
  pub evaluate_us: u64,
  /// Tessellation (or mesh-table lookup), in microseconds.
  pub tessellate_us: u64,
  /// Total processing time in microseconds.
  pub total_us: u64,
  pub triangle_count: usize,
}

/// Key of the mesh table entry for a finished chain.
pub fn mesh_key(chain_key: &CacheKey, request: &GenerationRequest) -> CacheKey {
  chain_key.extend(&request.tessellate.cache_fragment())
}

/// Run every stage for `request` and return the finished mesh.
#[tracing::instrument(skip_all, name = "pipeline::run_generation")]
pub fn run_generation(ctx: &PipelineContext, request: &GenerationRequest) -> Result<GeneratedMesh, PipelineError> {
  let start = Instant::now();
  let cache = ctx.active_cache();

  let (base, base_cached) = build_base(ctx.supplier.as_ref(), &request.shape, cache)?;
  let chain = evaluate_chain(
    base,
    &base_key(&request.shape),
    request.chain(),
    ctx.library.as_ref(),
    cache,
  )?;
  let evaluate_us = start.elapsed().as_micros() as u64;

  let tessellate_start = Instant::now();
  let key = mesh_key(&chain.key, request);
  let (mesh, mesh_cached) = match cache.and_then(|c| c.get_mesh(&key)) {
    Some(mesh) => (mesh, true),
    None => {
      let mesh = Arc::new(tessellate(&chain.mesh, &request.tessellate)?);
      let mesh = match cache {
        Some(cache) => cache.set_mesh(key, mesh),
        None => mesh,
      };
      (mesh, false)
    }
  };
  let tessellate_us = tessellate_start.elapsed().as_micros() as u64;

  let stats = ProcessingStats {
    steps_applied: chain.applied,
    steps_cached: chain.cached,
    base_cached,
    mesh_cached,
    evaluate_us,
    tessellate_us,
    total_us: start.elapsed().as_micros() as u64,
    triangle_count: mesh.triangle_count(),
  };

  info!(
    faces = chain.mesh.face_count(),
    vertices = chain.mesh.vertex_count(),
    triangles = stats.triangle_count,
    steps_applied = stats.steps_applied,
    steps_cached = stats.steps_cached,
    total_us = stats.total_us,
    "Generation complete"
  );

  Ok(GeneratedMesh {
    face_count: chain.mesh.face_count(),
    vertex_count: chain.mesh.vertex_count(),
    poly: chain.mesh,
    mesh,
    stats,
  })
}
