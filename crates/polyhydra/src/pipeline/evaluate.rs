//! Stage 1-2: base construction and operator chain evaluation.
//!
//! The running key starts at the base descriptor and grows by one canonical
//! fragment per enabled step, so chains sharing a leading run of steps share
//! cache entries up to the point where they diverge:
//!
//! ```text
//! [Kis, Dual]        base/kis ─► base/kis/dual
//! [Kis, Dual, Ambo]  base/kis ─► base/kis/dual ─► base/kis/dual/ambo
//!                    └──── hits ────┘             └── computed ──┘
//! ```
//!
//! Disabled steps contribute nothing to the key or the mesh. Steps with
//! `randomize` set are cached by configuration: the first realisation is
//! reused for as long as the entry lives.

use std::sync::Arc;

use tracing::debug;

use super::cache::{CacheKey, GenerationCache};
use crate::error::PipelineError;
use crate::mesh::PolyMesh;
use crate::operators::{OperatorInstance, OperatorLibrary};
use crate::shapes::{BaseMeshSupplier, ShapeDescriptor};

/// Result of evaluating a chain.
#[derive(Clone, Debug)]
pub struct ChainOutput {
  pub mesh: Arc<PolyMesh>,
  /// Key of the final step (the base key for an empty chain).
  pub key: CacheKey,
  /// Steps computed by the library.
  pub applied: usize,
  /// Steps served from the step table.
  pub cached: usize,
}

/// Key of the base table entry for `shape`.
pub fn base_key(shape: &ShapeDescriptor) -> CacheKey {
  CacheKey::new(shape.cache_key())
}

/// Running key after every enabled step of `operators`.
pub fn chain_key(base: &CacheKey, operators: &[OperatorInstance]) -> Result<CacheKey, PipelineError> {
  let mut key = base.clone();
  for op in operators.iter().filter(|op| op.is_enabled()) {
    key = key.extend(&op.cache_fragment()?);
  }
  Ok(key)
}

/// Build (or fetch) the base mesh. The flag reports a cache hit.
#[tracing::instrument(skip_all, name = "pipeline::build_base")]
pub fn build_base(
  supplier: &dyn BaseMeshSupplier,
  shape: &ShapeDescriptor,
  cache: Option<&GenerationCache>,
) -> Result<(Arc<PolyMesh>, bool), PipelineError> {
  let key = base_key(shape);
  if let Some(mesh) = cache.and_then(|c| c.get_base(&key)) {
    return Ok((mesh, true));
  }

  let mesh = Arc::new(supplier.build_base(shape)?);
  let mesh = match cache {
    Some(cache) => cache.set_base(key, mesh),
    None => mesh,
  };
  Ok((mesh, false))
}

/// Apply every enabled operator to `base` in order.
///
/// Errors from the library abort the chain; steps already stored stay valid.
#[tracing::instrument(skip_all, name = "pipeline::evaluate_chain", fields(steps = operators.len()))]
pub fn evaluate_chain(
  base: Arc<PolyMesh>,
  base_key: &CacheKey,
  operators: &[OperatorInstance],
  library: &dyn OperatorLibrary,
  cache: Option<&GenerationCache>,
) -> Result<ChainOutput, PipelineError> {
  let mut current = base;
  let mut key = base_key.clone();
  let mut applied = 0;
  let mut cached = 0;

  for (index, op) in operators.iter().enumerate() {
    if !op.is_enabled() {
      continue;
    }

    let args = op.args()?;
    key = key.extend(&op.cache_fragment()?);

    if let Some(hit) = cache.and_then(|c| c.get_step(&key)) {
      debug!(index, kind = %op.kind, "Step served from cache");
      current = hit;
      cached += 1;
      continue;
    }

    debug!(index, kind = %op.kind, amount = args.amount, "Applying step");
    let next = Arc::new(library.apply(op.kind, &current, &args)?);
    current = match cache {
      Some(cache) => cache.set_step(key.clone(), next),
      None => next,
    };
    applied += 1;
  }

  Ok(ChainOutput {
    mesh: current,
    key,
    applied,
    cached,
  })
}

#[cfg(test)]
#[path = "evaluate_test.rs"]
mod evaluate_test;
