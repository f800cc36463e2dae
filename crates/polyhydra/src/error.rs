//! Error types for the generation pipeline.
//!
//! ```text
//! PipelineError
//!   ├── Config        (ConfigError)      unknown operator, bad descriptor, bad amount
//!   ├── Geometry      (MeshError)        operator or supplier produced no valid mesh
//!   ├── Tessellation  (TessellateError)  face with fewer than 3 vertices
//!   └── WorkerLost                       background job vanished mid-build
//! ```
//!
//! Resource contention (a rebuild requested while one is in flight) is not an
//! error; the controller reports it as `RequestOutcome::Rejected`.

use thiserror::Error;

use crate::operators::OperatorKind;

/// Structural or geometric failure inside a mesh transform.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
  /// A face references a vertex index outside the vertex list.
  #[error("face {face} references vertex {vertex} but the mesh has {vertex_count} vertices")]
  InvalidVertexIndex {
    face: usize,
    vertex: usize,
    vertex_count: usize,
  },

  /// Per-face role list length does not match the face list.
  #[error("expected {expected} face roles, got {actual}")]
  RoleCountMismatch { expected: usize, actual: usize },

  /// A transform could not produce a usable mesh from its input.
  #[error("{operation} produced degenerate geometry: {reason}")]
  Degenerate {
    operation: &'static str,
    reason: String,
  },
}

/// Invalid pipeline configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
  /// Operator name not present in the catalog.
  #[error("unknown operator kind '{0}'")]
  UnknownOperator(String),

  /// Shape descriptor cannot be turned into a base mesh.
  #[error("malformed shape descriptor: {0}")]
  MalformedShape(String),

  /// Amount is not a finite number, so clamping cannot place it in range.
  #[error("amount {amount} for {kind:?} is not representable in [{min}, {max}]")]
  AmountOutOfRange {
    kind: OperatorKind,
    amount: f32,
    min: f32,
    max: f32,
  },
}

/// Tessellation invariant violation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TessellateError {
  #[error("face {face} has {sides} vertices; at least 3 are required")]
  DegenerateFace { face: usize, sides: usize },
}

/// Umbrella error delivered to the host when a rebuild fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
  #[error("configuration error: {0}")]
  Config(#[from] ConfigError),

  #[error("geometry error: {0}")]
  Geometry(#[from] MeshError),

  #[error("tessellation error: {0}")]
  Tessellation(#[from] TessellateError),

  /// Background worker went away without reporting a result.
  #[error("generation worker exited without a result")]
  WorkerLost,
}

/// Preset (de)serialisation failures.
#[derive(Error, Debug)]
pub enum PresetError {
  #[error("preset json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("preset io: {0}")]
  Io(#[from] std::io::Error),
}

/// Settings file failures.
#[derive(Error, Debug)]
pub enum SettingsError {
  #[error("settings toml: {0}")]
  Toml(#[from] toml::de::Error),

  #[error("settings io: {0}")]
  Io(#[from] std::io::Error),
}
