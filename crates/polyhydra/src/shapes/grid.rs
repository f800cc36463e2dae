use glam::Vec3;

use super::GridKind;
use crate::error::MeshError;
use crate::mesh::{PolyMesh, Role};

/// Flat grid in the XZ plane, faces up, centred on the origin.
///
/// Both kinds are open surfaces. `Isometric` offsets odd rows by half a cell
/// and splits each cell into two near-equilateral triangles.
pub(super) fn grid(kind: GridKind, columns: usize, rows: usize) -> Result<PolyMesh, MeshError> {
  let row_pitch = match kind {
    GridKind::Square => 1.0,
    GridKind::Isometric => 3.0f32.sqrt() / 2.0,
  };

  let mut positions = Vec::with_capacity((columns + 1) * (rows + 1));
  for i in 0..=columns {
    for j in 0..=rows {
      let shift = match kind {
        GridKind::Isometric if j % 2 == 1 => 0.5,
        _ => 0.0,
      };
      positions.push(Vec3::new(i as f32 + shift, 0.0, j as f32 * row_pitch));
    }
  }
  let centre = positions.iter().copied().sum::<Vec3>() / positions.len() as f32;
  for p in &mut positions {
    *p -= centre;
  }

  let at = |i: usize, j: usize| i * (rows + 1) + j;
  let mut faces: Vec<Vec<usize>> = Vec::new();
  for i in 0..columns {
    for j in 0..rows {
      let (a, b, c, d) = (at(i, j), at(i, j + 1), at(i + 1, j + 1), at(i + 1, j));
      match kind {
        GridKind::Square => faces.push(vec![a, b, c, d]),
        GridKind::Isometric if j % 2 == 0 => {
          faces.push(vec![a, b, d]);
          faces.push(vec![b, c, d]);
        }
        GridKind::Isometric => {
          faces.push(vec![a, b, c]);
          faces.push(vec![a, c, d]);
        }
      }
    }
  }

  let roles = vec![Role::Existing; faces.len()];
  PolyMesh::from_faces(positions, &faces, &roles)
}
