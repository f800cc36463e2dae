//! Tests for Stages 1-2: base construction and chain evaluation

use std::sync::Arc;

use super::*;
use crate::error::ConfigError;
use crate::operators::{ConwayLibrary, OperatorKind};
use crate::pipeline::cache::CacheTable;
use crate::pipeline::test_utils::*;
use crate::shapes::{PlatonicKind, ShapeLibrary};

fn cube_shape() -> ShapeDescriptor {
  ShapeDescriptor::Platonic(PlatonicKind::Cube)
}

fn run(ops: &[OperatorInstance], library: &dyn OperatorLibrary, cache: Option<&GenerationCache>) -> ChainOutput {
  let (base, _) = build_base(&ShapeLibrary, &cube_shape(), cache).unwrap();
  evaluate_chain(base, &base_key(&cube_shape()), ops, library, cache).unwrap()
}

// =============================================================================
// Batch 1: Base Construction
// =============================================================================

#[test]
fn test_base_is_cached_by_descriptor() {
  let cache = GenerationCache::new();
  let (first, hit) = build_base(&ShapeLibrary, &cube_shape(), Some(&cache)).unwrap();
  assert!(!hit);
  let (second, hit) = build_base(&ShapeLibrary, &cube_shape(), Some(&cache)).unwrap();
  assert!(hit);
  assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_base_without_cache_builds_fresh() {
  let (mesh, hit) = build_base(&ShapeLibrary, &cube_shape(), None).unwrap();
  assert!(!hit);
  assert_eq!(mesh.face_count(), 6);
}

// =============================================================================
// Batch 2: Chain Evaluation
// =============================================================================

#[test]
fn test_empty_chain_returns_base() {
  let out = run(&[], &ConwayLibrary, None);
  assert_eq!(out.key, base_key(&cube_shape()));
  assert_eq!(out.mesh.face_count(), 6);
  assert_eq!(out.applied, 0);
}

#[test]
fn test_steps_apply_in_order() {
  let out = run(&[op(OperatorKind::Kis), op(OperatorKind::Dual)], &ConwayLibrary, None);
  // kis(cube) has 24 triangles; its dual has 24 vertices and 14 faces
  assert_eq!(out.mesh.vertex_count(), 24);
  assert_eq!(out.mesh.face_count(), 14);
  assert_eq!(out.applied, 2);
}

#[test]
fn test_prefix_is_reused() {
  let cache = GenerationCache::new();
  let library = CountingLibrary::new();
  let a = kis_dual_ambo()[..2].to_vec();
  let b = kis_dual_ambo();

  let first = run(&a, &library, Some(&cache));
  assert_eq!(first.applied, 2);

  let second = run(&b, &library, Some(&cache));
  assert_eq!(second.cached, 2);
  assert_eq!(second.applied, 1);
  assert_eq!(library.count(OperatorKind::Kis), 1);
  assert_eq!(library.count(OperatorKind::Dual), 1);
  assert_eq!(library.count(OperatorKind::Ambo), 1);
  assert_eq!(cache.len(CacheTable::Step), 3);
}

#[test]
fn test_diverging_chains_share_only_the_prefix() {
  let cache = GenerationCache::new();
  let library = CountingLibrary::new();

  run(&[op(OperatorKind::Kis), op(OperatorKind::Dual)], &library, Some(&cache));
  run(&[op(OperatorKind::Kis), op(OperatorKind::Ambo)], &library, Some(&cache));

  assert_eq!(library.count(OperatorKind::Kis), 1);
  assert_eq!(library.total(), 3);
}

#[test]
fn test_disabled_steps_leave_key_and_mesh_untouched() {
  let plain = kis_dual_ambo();
  let mut padded = plain.clone();
  padded.insert(1, op(OperatorKind::Truncate).with_disabled(true));
  padded.push(op(OperatorKind::Expand).with_disabled(true));

  let library = CountingLibrary::new();
  let a = run(&plain, &library, None);
  let b = run(&padded, &library, None);

  assert_eq!(a.key, b.key);
  assert_eq!(*a.mesh, *b.mesh);
  assert_eq!(library.count(OperatorKind::Truncate), 0);
  assert_eq!(
    chain_key(&base_key(&cube_shape()), &padded).unwrap(),
    chain_key(&base_key(&cube_shape()), &plain).unwrap()
  );
}

#[test]
fn test_amount_changes_key() {
  let base = base_key(&cube_shape());
  let a = chain_key(&base, &[op(OperatorKind::Kis).with_amount(0.1)]).unwrap();
  let b = chain_key(&base, &[op(OperatorKind::Kis).with_amount(0.2)]).unwrap();
  assert_ne!(a, b);
}

#[test]
fn test_animated_amount_feeds_key() {
  let base = base_key(&cube_shape());
  let mut animated = op(OperatorKind::Kis).with_amount(0.1).with_animation(1.0, 0.5);
  animated.animated_amount = 0.3;

  let plain = chain_key(&base, &[op(OperatorKind::Kis).with_amount(0.3)]).unwrap();
  assert_eq!(chain_key(&base, &[animated]).unwrap(), plain);
}

#[test]
fn test_library_error_aborts_but_keeps_prefix() {
  let cache = GenerationCache::new();
  let failing = FailingLibrary {
    fails_on: OperatorKind::Ambo,
  };
  let (base, _) = build_base(&ShapeLibrary, &cube_shape(), Some(&cache)).unwrap();

  let err = evaluate_chain(base, &base_key(&cube_shape()), &kis_dual_ambo(), &failing, Some(&cache)).unwrap_err();
  assert!(matches!(err, PipelineError::Geometry(_)));
  assert_eq!(cache.len(CacheTable::Step), 2);
}

#[test]
fn test_nan_amount_is_a_config_error() {
  let nan = op(OperatorKind::Kis).with_amount(f32::NAN);
  let (base, _) = build_base(&ShapeLibrary, &cube_shape(), None).unwrap();
  let err = evaluate_chain(base, &base_key(&cube_shape()), &[nan], &ConwayLibrary, None).unwrap_err();
  assert!(matches!(
    err,
    PipelineError::Config(ConfigError::AmountOutOfRange { .. })
  ));
}
