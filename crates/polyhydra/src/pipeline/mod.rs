//! Polyhedron Generation Pipeline
//!
//! Evaluates an operator chain over a base mesh and tessellates the result,
//! memoising every intermediate in a shared [`GenerationCache`].
//!
//! ```text
//! ┌──────────┐     ┌────────────────┐     ┌────────────┐     ┌───────────────┐
//! │   Base   ├────►│ Evaluate chain ├────►│ Tessellate ├────►│ GeneratedMesh │
//! └──────────┘     └────────────────┘     └────────────┘     └───────────────┘
//!      │                   │                     │
//!  base table         step table            mesh table
//!  (descriptor)    (descriptor + steps)   (chain + tessellation)
//!
//!                 ┌───────────────────────┐
//!  request() ────►│ GenerationController  │──► rayon worker ──► poll() ──► callback
//!                 │ Idle/Running/Completing│
//!                 └───────────────────────┘
//! ```
//!
//! # Pipeline Stages
//!
//! 1. **Base**: Builds the shape descriptor's mesh through a
//!    [`BaseMeshSupplier`](crate::shapes::BaseMeshSupplier)
//! 2. **Evaluate**: Applies every enabled operator in order, one cache probe
//!    per step under the running prefix key
//! 3. **Tessellate**: Fan-triangulates faces into a flat-shaded, UV-mapped
//!    triangle buffer
//!
//! # Execution
//!
//! - `run_generation`: everything inline on the calling thread
//! - `GenerationController`: single-flight background job, result delivered
//!   on the polling thread

pub mod cache;
pub mod types;

// Stage implementations
pub mod async_process;
pub mod evaluate;
pub mod process;
pub mod tessellate;

// Test utilities
#[cfg(test)]
pub mod test_utils;

// Consistency tests
#[cfg(test)]
#[path = "consistency_test.rs"]
mod consistency_test;

// Re-exports
pub use cache::{CacheKey, CacheStats, CacheTable, GenerationCache, TableStats};
pub use types::{GeneratedMesh, GenerationRequest, PipelineContext};

// Stage entry points
pub use evaluate::{base_key, build_base, chain_key, evaluate_chain, ChainOutput};
pub use tessellate::{tessellate, triangle_count};

// Synchronous entry point
pub use process::{mesh_key, run_generation, ProcessingStats};

// Background controller
pub use async_process::{
  CompletionCallback, ControllerState, GenerationController, GenerationResult, RequestOutcome,
};
