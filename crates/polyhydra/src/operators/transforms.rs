//! Non-topological transforms: scaling, face filtering, hole filling,
//! mirroring, welding and placement.

use std::collections::HashMap;

use glam::Vec3;
use rand::Rng;

use super::{conway, OpArgs};
use crate::error::MeshError;
use crate::mesh::{FaceSelection, MeshBuilder, PolyMesh, Role};

/// Vertices touching at least one selected face.
fn selected_vertices(mesh: &PolyMesh, selection: FaceSelection) -> Vec<bool> {
  let mut selected = vec![false; mesh.vertex_count()];
  for face in 0..mesh.face_count() {
    if mesh.include_face(face, selection) {
      for v in mesh.face_vertices(face) {
        selected[v] = true;
      }
    }
  }
  selected
}

/// Rebuild from the faces `keep` accepts, dropping vertices no face uses.
fn retain_faces(mesh: &PolyMesh, keep: impl Fn(usize) -> bool) -> Result<PolyMesh, MeshError> {
  let mut builder = MeshBuilder::new();
  let mut remap: Vec<Option<usize>> = vec![None; mesh.vertex_count()];
  for face in (0..mesh.face_count()).filter(|&f| keep(f)) {
    let indices: Vec<usize> = mesh
      .face_vertices(face)
      .iter()
      .map(|&v| {
        *remap[v].get_or_insert_with(|| {
          let vertex = mesh.vertices()[v];
          builder.add_vertex(vertex.position, vertex.role)
        })
      })
      .collect();
    builder.add_face(indices, mesh.face_role(face));
  }
  builder.build()
}

/// Append `other`'s vertices and faces to a builder seeded with `mesh`.
fn append(mesh: &PolyMesh, other: &PolyMesh, reverse: bool) -> Result<PolyMesh, MeshError> {
  let mut builder = MeshBuilder::from_vertices(mesh);
  for face in 0..mesh.face_count() {
    builder.add_face(mesh.face_vertices(face), mesh.face_role(face));
  }
  let base = builder.vertex_count();
  for vertex in other.vertices() {
    builder.add_vertex(vertex.position, vertex.role);
  }
  for face in 0..other.face_count() {
    let mut indices: Vec<usize> = other.face_vertices(face).iter().map(|&v| v + base).collect();
    if reverse {
      indices.reverse();
    }
    builder.add_face(indices, other.face_role(face));
  }
  builder.build()
}

pub fn identity(mesh: &PolyMesh, _args: &OpArgs) -> Result<PolyMesh, MeshError> {
  Ok(mesh.clone())
}

// =============================================================================
// Scaling
// =============================================================================

/// Scale selected vertices away from the origin by `1 + amount`.
pub fn vertex_scale(mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
  let mut rng = rand::rng();
  let selected = selected_vertices(mesh, args.faces);
  let positions: Vec<Vec3> = mesh
    .vertices()
    .iter()
    .enumerate()
    .map(|(i, v)| {
      if !selected[i] {
        return v.position;
      }
      let amount = if args.randomize {
        args.amount * rng.random::<f32>()
      } else {
        args.amount
      };
      v.position * (1.0 + amount)
    })
    .collect();
  Ok(mesh.with_positions(&positions))
}

/// Detach every face and scale selected ones about their centroid by
/// `1 + amount`.
pub fn face_scale(mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
  let mut rng = rand::rng();
  let mut builder = MeshBuilder::new();
  for face in 0..mesh.face_count() {
    let scale = if !mesh.include_face(face, args.faces) {
      1.0
    } else if args.randomize {
      1.0 + args.amount * rng.random::<f32>()
    } else {
      1.0 + args.amount
    };
    let centroid = mesh.centroid(face);
    let indices: Vec<usize> = mesh
      .face_vertices(face)
      .iter()
      .map(|&v| {
        let vertex = mesh.vertices()[v];
        builder.add_vertex(centroid + (vertex.position - centroid) * scale, vertex.role)
      })
      .collect();
    builder.add_face(indices, mesh.face_role(face));
  }
  builder.build()
}

/// Pull selected vertices toward the unit sphere by `amount`.
pub fn spherize(mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
  let selected = selected_vertices(mesh, args.faces);
  let positions: Vec<Vec3> = mesh
    .vertices()
    .iter()
    .enumerate()
    .map(|(i, v)| {
      if selected[i] {
        v.position.lerp(v.position.normalize_or_zero(), args.amount)
      } else {
        v.position
      }
    })
    .collect();
  Ok(mesh.with_positions(&positions))
}

pub fn stretch(mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
  Ok(mesh.map_positions(|p| Vec3::new(p.x, p.y * args.amount, p.z)))
}

// =============================================================================
// Placement
// =============================================================================

/// Move the vertex mean to the origin.
pub fn recenter(mesh: &PolyMesh, _args: &OpArgs) -> Result<PolyMesh, MeshError> {
  if mesh.vertex_count() == 0 {
    return Ok(mesh.clone());
  }
  let mean = mesh.vertices().iter().map(|v| v.position).sum::<Vec3>() / mesh.vertex_count() as f32;
  Ok(mesh.map_positions(|p| p - mean))
}

/// Rest the lowest vertex on `y = 0`.
pub fn sit_level(mesh: &PolyMesh, _args: &OpArgs) -> Result<PolyMesh, MeshError> {
  if mesh.vertex_count() == 0 {
    return Ok(mesh.clone());
  }
  let (min, _) = mesh.bounds();
  Ok(mesh.map_positions(|p| p - Vec3::Y * min.y))
}

// =============================================================================
// Face filtering
// =============================================================================

/// Drop selected faces.
pub fn face_remove(mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
  retain_faces(mesh, |f| !mesh.include_face(f, args.faces))
}

/// Keep only selected faces.
pub fn face_keep(mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
  retain_faces(mesh, |f| mesh.include_face(f, args.faces))
}

/// Close every boundary loop with a single face.
pub fn fill_holes(mesh: &PolyMesh, _args: &OpArgs) -> Result<PolyMesh, MeshError> {
  let loops = mesh.boundary_loops();
  if loops.is_empty() {
    return Ok(mesh.clone());
  }
  let mut builder = MeshBuilder::from_vertices(mesh);
  for face in 0..mesh.face_count() {
    builder.add_face(mesh.face_vertices(face), mesh.face_role(face));
  }
  for lp in loops {
    builder.add_face(lp, Role::New);
  }
  builder.build()
}

// =============================================================================
// Additive
// =============================================================================

/// Append the dual, scaled about the origin by `amount`.
pub fn add_dual(mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
  let dual = conway::dual(mesh, args)?.map_positions(|p| p * args.amount);
  append(mesh, &dual, false)
}

fn add_mirror(mesh: &PolyMesh, axis: Vec3, offset: f32) -> Result<PolyMesh, MeshError> {
  let mirrored = mesh.map_positions(|p| p - 2.0 * p.dot(axis) * axis + axis * offset);
  // Reflection flips handedness, so winding is reversed to keep normals out
  append(mesh, &mirrored, true)
}

pub fn add_mirror_x(mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
  add_mirror(mesh, Vec3::X, args.amount)
}

pub fn add_mirror_y(mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
  add_mirror(mesh, Vec3::Y, args.amount)
}

pub fn add_mirror_z(mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
  add_mirror(mesh, Vec3::Z, args.amount)
}

// =============================================================================
// Weld
// =============================================================================

/// Merge vertices closer than `amount`.
///
/// Faces left with fewer than three distinct vertices are dropped.
pub fn weld(mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
  let distance = args.amount.max(0.0);
  let cell = distance.max(1e-6);
  let cell_of = |p: Vec3| {
    let c = (p / cell).floor();
    (c.x as i64, c.y as i64, c.z as i64)
  };

  let mut grid: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
  let mut representative = Vec::with_capacity(mesh.vertex_count());
  for (index, vertex) in mesh.vertices().iter().enumerate() {
    let p = vertex.position;
    let (cx, cy, cz) = cell_of(p);
    let mut found = None;
    'search: for dx in -1..=1 {
      for dy in -1..=1 {
        for dz in -1..=1 {
          if let Some(bucket) = grid.get(&(cx + dx, cy + dy, cz + dz)) {
            if let Some(&other) = bucket.iter().find(|&&o| mesh.position(o).distance(p) <= distance) {
              found = Some(other);
              break 'search;
            }
          }
        }
      }
    }
    match found {
      Some(other) => representative.push(representative[other]),
      None => {
        grid.entry((cx, cy, cz)).or_default().push(index);
        representative.push(index);
      }
    }
  }

  let mut builder = MeshBuilder::new();
  let mut remap: Vec<Option<usize>> = vec![None; mesh.vertex_count()];
  for face in 0..mesh.face_count() {
    let mut indices: Vec<usize> = Vec::new();
    for v in mesh.face_vertices(face) {
      let r = representative[v];
      if indices.last() != Some(&r) {
        indices.push(r);
      }
    }
    while indices.len() > 1 && indices.first() == indices.last() {
      indices.pop();
    }
    let mut unique = indices.clone();
    unique.sort_unstable();
    unique.dedup();
    if unique.len() < 3 {
      continue;
    }
    let mapped: Vec<usize> = indices
      .iter()
      .map(|&r| {
        *remap[r].get_or_insert_with(|| {
          let vertex = mesh.vertices()[r];
          builder.add_vertex(vertex.position, vertex.role)
        })
      })
      .collect();
    builder.add_face(mapped, mesh.face_role(face));
  }
  builder.build()
}
