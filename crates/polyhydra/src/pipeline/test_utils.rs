//! Test utilities for pipeline tests.
//!
//! Provides instrumented operator libraries and fixture builders for testing
//! each pipeline stage in isolation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::Receiver;
use glam::Vec3;

use super::types::{GenerationRequest, PipelineContext};
use crate::error::MeshError;
use crate::mesh::{PolyMesh, Role};
use crate::operators::{ConwayLibrary, OpArgs, OperatorInstance, OperatorKind, OperatorLibrary};
use crate::shapes::{BaseMeshSupplier, PlatonicKind, ShapeDescriptor, ShapeLibrary};

// =============================================================================
// Mesh Fixtures
// =============================================================================

/// Unit cube from the shape library.
pub fn cube() -> PolyMesh {
  ShapeLibrary
    .build_base(&ShapeDescriptor::Platonic(PlatonicKind::Cube))
    .unwrap()
}

/// A single open quad in the XZ plane, facing +Y.
pub fn open_quad() -> PolyMesh {
  let positions = vec![
    Vec3::new(-1.0, 0.0, -1.0),
    Vec3::new(-1.0, 0.0, 1.0),
    Vec3::new(1.0, 0.0, 1.0),
    Vec3::new(1.0, 0.0, -1.0),
  ];
  PolyMesh::from_faces(positions, &[[0, 1, 2, 3]], &[Role::Existing]).unwrap()
}

/// Mixed-arity mesh: one triangle and one pentagon sharing nothing.
pub fn triangle_and_pentagon() -> PolyMesh {
  let mut positions = vec![
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(0.0, 1.0, 0.0),
  ];
  for i in 0..5 {
    let angle = i as f32 * std::f32::consts::TAU / 5.0;
    positions.push(Vec3::new(3.0 + angle.cos(), angle.sin(), 0.0));
  }
  let faces: [&[usize]; 2] = [&[0, 1, 2], &[3, 4, 5, 6, 7]];
  PolyMesh::from_faces(positions, &faces, &[Role::Existing, Role::New]).unwrap()
}

// =============================================================================
// Chain Fixtures
// =============================================================================

pub fn op(kind: OperatorKind) -> OperatorInstance {
  OperatorInstance::new(kind)
}

/// `[Kis(0.1), Dual, Ambo]`
pub fn kis_dual_ambo() -> Vec<OperatorInstance> {
  vec![
    op(OperatorKind::Kis).with_amount(0.1),
    op(OperatorKind::Dual),
    op(OperatorKind::Ambo),
  ]
}

pub fn cube_request(operators: Vec<OperatorInstance>) -> GenerationRequest {
  GenerationRequest::new(ShapeDescriptor::Platonic(PlatonicKind::Cube)).with_operators(operators)
}

/// Context with a fresh cache and the given library.
pub fn context_with(library: Arc<dyn OperatorLibrary>) -> PipelineContext {
  PipelineContext::new()
    .with_cache(super::cache::GenerationCache::shared())
    .with_library(library)
}

// =============================================================================
// Instrumented Libraries
// =============================================================================

/// Wraps [`ConwayLibrary`] and counts applications per kind.
pub struct CountingLibrary {
  counts: Vec<AtomicUsize>,
}

impl CountingLibrary {
  pub fn new() -> Self {
    Self {
      counts: OperatorKind::ALL.iter().map(|_| AtomicUsize::new(0)).collect(),
    }
  }

  pub fn count(&self, kind: OperatorKind) -> usize {
    self.counts[kind as usize].load(Ordering::SeqCst)
  }

  pub fn total(&self) -> usize {
    self.counts.iter().map(|c| c.load(Ordering::SeqCst)).sum()
  }
}

impl OperatorLibrary for CountingLibrary {
  fn apply(&self, kind: OperatorKind, mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
    self.counts[kind as usize].fetch_add(1, Ordering::SeqCst);
    ConwayLibrary.apply(kind, mesh, args)
  }
}

/// Fails every application of one kind.
pub struct FailingLibrary {
  pub fails_on: OperatorKind,
}

impl OperatorLibrary for FailingLibrary {
  fn apply(&self, kind: OperatorKind, mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
    if kind == self.fails_on {
      return Err(MeshError::Degenerate {
        operation: "failing_library",
        reason: format!("{kind} always fails"),
      });
    }
    ConwayLibrary.apply(kind, mesh, args)
  }
}

/// Panics on every application of one kind.
pub struct PanickingLibrary {
  pub panics_on: OperatorKind,
}

impl OperatorLibrary for PanickingLibrary {
  fn apply(&self, kind: OperatorKind, mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
    if kind == self.panics_on {
      panic!("{kind} panicked");
    }
    ConwayLibrary.apply(kind, mesh, args)
  }
}

/// Blocks each application until a token arrives on `gate`.
pub struct GatedLibrary {
  pub gate: Receiver<()>,
  pub started: AtomicUsize,
}

impl GatedLibrary {
  pub fn new(gate: Receiver<()>) -> Self {
    Self {
      gate,
      started: AtomicUsize::new(0),
    }
  }
}

impl OperatorLibrary for GatedLibrary {
  fn apply(&self, kind: OperatorKind, mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
    self.started.fetch_add(1, Ordering::SeqCst);
    let _ = self.gate.recv();
    ConwayLibrary.apply(kind, mesh, args)
  }
}
