//! polyhydra - Conway-operator polyhedron generation
//!
//! Builds polyhedron meshes by applying an ordered chain of named operators
//! (Kis, Dual, Ambo, Truncate, ...) to a base shape, then tessellating the
//! result into a flat-shaded, UV-mapped triangle buffer.
//!
//! # Features
//!
//! - **Half-edge meshes**: value-type [`PolyMesh`] with role tags per face and
//!   vertex
//! - **Prefix caching**: every intermediate mesh is memoised under the chain
//!   prefix that produced it, so edits near the end of a chain are cheap
//! - **Single-flight background builds**: one worker at a time on rayon,
//!   results delivered on the owning thread
//! - **Presets**: lossless JSON round-trip of shape and chain
//!
//! # Example
//!
//! ```ignore
//! use polyhydra::{OperatorInstance, OperatorKind, Polyhydra, ShapeDescriptor};
//!
//! let mut poly = Polyhydra::new(ShapeDescriptor::default());
//! poly.disable_interactive_flags();
//! poly.push_operator(OperatorInstance::new(OperatorKind::Kis).with_amount(0.1));
//! poly.push_operator(OperatorInstance::new(OperatorKind::Dual));
//! poly.rebuild();
//!
//! println!("{}", poly.info_text());
//! ```

pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use error::{ConfigError, MeshError, PipelineError, PresetError, SettingsError, TessellateError};
pub use types::{Bounds, ColorMethod, TessellateConfig, TriangleMesh, Vertex};

// Half-edge mesh representation
pub mod mesh;
pub use mesh::{FaceSelection, MeshBuilder, PolyMesh, Role};

// Operator catalog and transform library
pub mod operators;
pub use operators::{ConwayLibrary, OpArgs, OperatorInstance, OperatorKind, OperatorLibrary};

// Base shapes
pub mod shapes;
pub use shapes::{BaseMeshSupplier, ShapeDescriptor, ShapeLibrary};

// Cache, evaluator, tessellator and background controller
pub mod pipeline;
pub use pipeline::{GeneratedMesh, GenerationCache, GenerationController, GenerationRequest, PipelineContext};

// Pipeline owner
pub mod generator;
pub use generator::{Polyhydra, RebuildStatus};

pub mod preset;
pub use preset::{Preset, PresetOperator};

pub mod settings;
pub use settings::GeneratorSettings;

// Engine-agnostic metrics
pub mod metrics;
pub use metrics::GenerationMetrics;
