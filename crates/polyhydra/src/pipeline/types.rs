//! Pipeline data types.
//!
//! ```text
//! GenerationRequest ──► base ──► evaluate_chain ──► tessellate ──► GeneratedMesh
//!  (snapshot of the      │             │                │
//!   owner's settings)  base table   step table      mesh table
//! ```

use std::fmt;
use std::sync::Arc;

use super::cache::GenerationCache;
use super::process::ProcessingStats;
use crate::mesh::PolyMesh;
use crate::operators::{ConwayLibrary, OperatorInstance, OperatorLibrary};
use crate::shapes::{BaseMeshSupplier, ShapeDescriptor, ShapeLibrary};
use crate::types::{TessellateConfig, TriangleMesh};

/// Everything a rebuild needs, captured by value so it can move to a worker.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationRequest {
  pub shape: ShapeDescriptor,
  pub operators: Vec<OperatorInstance>,
  /// Skip the operator chain and tessellate the base mesh.
  pub bypass_ops: bool,
  pub tessellate: TessellateConfig,
}

impl GenerationRequest {
  pub fn new(shape: ShapeDescriptor) -> Self {
    Self {
      shape,
      ..Self::default()
    }
  }

  pub fn with_operators(mut self, operators: Vec<OperatorInstance>) -> Self {
    self.operators = operators;
    self
  }

  pub fn with_tessellate(mut self, config: TessellateConfig) -> Self {
    self.tessellate = config;
    self
  }

  pub fn with_bypass_ops(mut self, bypass: bool) -> Self {
    self.bypass_ops = bypass;
    self
  }

  /// Operators the evaluator will see.
  pub fn chain(&self) -> &[OperatorInstance] {
    if self.bypass_ops {
      &[]
    } else {
      &self.operators
    }
  }
}

/// Collaborators shared by every run: supplier, library and cache.
#[derive(Clone)]
pub struct PipelineContext {
  pub supplier: Arc<dyn BaseMeshSupplier>,
  pub library: Arc<dyn OperatorLibrary>,
  pub cache: Arc<GenerationCache>,
  /// When false the cache is neither read nor written.
  pub caching: bool,
}

impl Default for PipelineContext {
  fn default() -> Self {
    Self {
      supplier: Arc::new(ShapeLibrary),
      library: Arc::new(ConwayLibrary),
      cache: GenerationCache::shared(),
      caching: true,
    }
  }
}

impl PipelineContext {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_supplier(mut self, supplier: Arc<dyn BaseMeshSupplier>) -> Self {
    self.supplier = supplier;
    self
  }

  pub fn with_library(mut self, library: Arc<dyn OperatorLibrary>) -> Self {
    self.library = library;
    self
  }

  pub fn with_cache(mut self, cache: Arc<GenerationCache>) -> Self {
    self.cache = cache;
    self
  }

  pub fn with_caching(mut self, caching: bool) -> Self {
    self.caching = caching;
    self
  }

  /// The cache if caching is enabled.
  pub fn active_cache(&self) -> Option<&GenerationCache> {
    self.caching.then_some(self.cache.as_ref())
  }
}

impl fmt::Debug for PipelineContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PipelineContext")
      .field("cache", &self.cache)
      .field("caching", &self.caching)
      .finish_non_exhaustive()
  }
}

/// Finished build handed to the host.
#[derive(Clone, Debug)]
pub struct GeneratedMesh {
  pub mesh: Arc<TriangleMesh>,
  /// Polygon mesh the triangles were built from.
  pub poly: Arc<PolyMesh>,
  pub face_count: usize,
  pub vertex_count: usize,
  pub stats: ProcessingStats,
}
