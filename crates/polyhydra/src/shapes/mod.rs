//! Base-mesh supplier.
//!
//! A [`ShapeDescriptor`] names a shape family and its parameters; the
//! [`BaseMeshSupplier`] turns it into a [`PolyMesh`]. Suppliers must be pure
//! in the descriptor, since the base cache keys on the descriptor alone.

mod grid;
mod solids;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::{MAX_GRID_CELLS, MAX_PRISM_SIDES, MIN_PRISM_SIDES};
use crate::error::{ConfigError, PipelineError};
use crate::mesh::PolyMesh;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatonicKind {
  Tetrahedron,
  Cube,
  Octahedron,
  Dodecahedron,
  Icosahedron,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JohnsonKind {
  Prism,
  Antiprism,
  Pyramid,
  Dipyramid,
  ElongatedPyramid,
  ElongatedDipyramid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridKind {
  Square,
  Isometric,
}

/// Symbolic base shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeDescriptor {
  Platonic(PlatonicKind),
  Johnson { kind: JohnsonKind, sides: u32 },
  Grid { kind: GridKind, columns: u32, rows: u32 },
  /// A single polygon; fewer than three sides gives a degenerate face.
  Polygon { sides: u32 },
}

impl Default for ShapeDescriptor {
  fn default() -> Self {
    ShapeDescriptor::Platonic(PlatonicKind::Cube)
  }
}

impl ShapeDescriptor {
  /// Canonical key for the base cache.
  pub fn cache_key(&self) -> String {
    serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
  }
}

/// Builds the initial mesh for a descriptor.
pub trait BaseMeshSupplier: Send + Sync {
  fn build_base(&self, shape: &ShapeDescriptor) -> Result<PolyMesh, PipelineError>;
}

/// Built-in shape families.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShapeLibrary;

impl BaseMeshSupplier for ShapeLibrary {
  fn build_base(&self, shape: &ShapeDescriptor) -> Result<PolyMesh, PipelineError> {
    let mesh = match *shape {
      ShapeDescriptor::Platonic(kind) => solids::platonic(kind)?,
      ShapeDescriptor::Johnson { kind, sides } => {
        if sides > MAX_PRISM_SIDES {
          return Err(
            ConfigError::MalformedShape(format!("{kind:?} with {sides} sides exceeds {MAX_PRISM_SIDES}")).into(),
          );
        }
        if sides < MIN_PRISM_SIDES {
          warn!(?kind, sides, "Johnson arity raised to {MIN_PRISM_SIDES}");
        }
        solids::johnson(kind, sides.max(MIN_PRISM_SIDES) as usize)?
      }
      ShapeDescriptor::Grid { kind, columns, rows } => {
        if columns == 0 || rows == 0 || columns > MAX_GRID_CELLS || rows > MAX_GRID_CELLS {
          return Err(
            ConfigError::MalformedShape(format!(
              "{kind:?} grid must be 1..={MAX_GRID_CELLS} cells per side, got {columns}x{rows}"
            ))
            .into(),
          );
        }
        grid::grid(kind, columns as usize, rows as usize)?
      }
      ShapeDescriptor::Polygon { sides } => {
        if sides == 0 || sides > MAX_PRISM_SIDES {
          return Err(
            ConfigError::MalformedShape(format!("polygon needs 1..={MAX_PRISM_SIDES} sides, got {sides}")).into(),
          );
        }
        solids::polygon(sides as usize)?
      }
    };
    Ok(mesh)
  }
}
