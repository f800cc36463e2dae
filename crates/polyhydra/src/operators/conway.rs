//! Conway topology operators.
//!
//! Each transform reads the half-edge mesh and emits a face-vertex
//! description through [`MeshBuilder`]; twins are rebuilt from scratch.
//! Faces keep counter-clockwise winding, so every generated polygon lists
//! its vertices in the same rotational sense as the face or vertex ring it
//! was derived from.

use std::collections::HashMap;

use glam::Vec3;
use rand::Rng;

use super::OpArgs;
use crate::error::MeshError;
use crate::mesh::{MeshBuilder, PolyMesh, Role};

/// Undirected edge key.
#[inline]
fn edge_key(a: usize, b: usize) -> (usize, usize) {
  if a < b {
    (a, b)
  } else {
    (b, a)
  }
}

/// Amount scaled by a uniform draw when randomising.
#[inline]
fn jittered<R: Rng>(rng: &mut R, args: &OpArgs) -> f32 {
  if args.randomize {
    args.amount * rng.random::<f32>()
  } else {
    args.amount
  }
}

/// Alternating role for fan and strip faces.
#[inline]
fn alternate(i: usize) -> Role {
  if i % 2 == 0 {
    Role::New
  } else {
    Role::NewAlt
  }
}

fn centroids(mesh: &PolyMesh) -> Vec<Vec3> {
  (0..mesh.face_count()).map(|f| mesh.centroid(f)).collect()
}

/// Lazily-created vertex per key.
struct PointCache<K> {
  indices: HashMap<K, usize>,
}

impl<K: std::hash::Hash + Eq> PointCache<K> {
  fn new() -> Self {
    Self {
      indices: HashMap::new(),
    }
  }

  fn get_or_add(&mut self, builder: &mut MeshBuilder, key: K, role: Role, position: impl FnOnce() -> Vec3) -> usize {
    *self
      .indices
      .entry(key)
      .or_insert_with(|| builder.add_vertex(position(), role))
  }
}

// =============================================================================
// Dual / Kis / Ambo
// =============================================================================

/// Face centroids become vertices; each closed vertex ring becomes a face.
///
/// Boundary vertices have no closed ring and contribute no face.
pub fn dual(mesh: &PolyMesh, _args: &OpArgs) -> Result<PolyMesh, MeshError> {
  let mut builder = MeshBuilder::new();
  for c in centroids(mesh) {
    builder.add_vertex(c, Role::New);
  }
  for (vertex, v) in mesh.vertices().iter().enumerate() {
    let Some(ring) = mesh.vertex_ring(vertex) else {
      continue;
    };
    let role = if v.role == Role::New {
      Role::New
    } else {
      Role::Existing
    };
    builder.add_face(ring.iter().map(|&he| mesh.halfedges()[he].face), role);
  }
  builder.build()
}

/// Raise a pyramid on each selected face.
pub fn kis(mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
  let mut rng = rand::rng();
  let mut builder = MeshBuilder::from_vertices(mesh);

  for face in 0..mesh.face_count() {
    let verts = mesh.face_vertices(face);
    if !mesh.include_face(face, args.faces) {
      builder.add_face(verts.iter().copied(), Role::Ignored);
      continue;
    }

    let offset = jittered(&mut rng, args);
    let apex = builder.add_vertex(mesh.centroid(face) + mesh.normal(face) * offset, Role::New);
    let n = verts.len();
    for i in 0..n {
      builder.add_face([verts[i], verts[(i + 1) % n], apex], alternate(i));
    }
  }
  builder.build()
}

/// Edge midpoints become vertices: one face per face, one per vertex ring.
pub fn ambo(mesh: &PolyMesh, _args: &OpArgs) -> Result<PolyMesh, MeshError> {
  let mut builder = MeshBuilder::new();
  let mut mids = PointCache::new();
  let mut mid = |builder: &mut MeshBuilder, a: usize, b: usize| {
    mids.get_or_add(builder, edge_key(a, b), Role::New, || {
      (mesh.position(a) + mesh.position(b)) * 0.5
    })
  };

  for face in 0..mesh.face_count() {
    let hes = mesh.face_halfedges(face);
    let indices: Vec<usize> = hes
      .iter()
      .map(|&he| mid(&mut builder, mesh.halfedges()[he].origin, mesh.target(he)))
      .collect();
    builder.add_face(indices, Role::Existing);
  }

  for vertex in 0..mesh.vertex_count() {
    let Some(ring) = mesh.vertex_ring(vertex) else {
      continue;
    };
    let indices: Vec<usize> = ring
      .iter()
      .map(|&he| mid(&mut builder, vertex, mesh.target(he)))
      .collect();
    builder.add_face(indices, Role::New);
  }
  builder.build()
}

// =============================================================================
// Join / Ortho
// =============================================================================

/// One quad per edge spanning the two adjacent face centres.
///
/// Centres are pushed out along the face normal by `amount`. Boundary edges
/// get a triangle to their only face centre.
pub fn join(mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
  let mut builder = MeshBuilder::from_vertices(mesh);
  let centres: Vec<usize> = (0..mesh.face_count())
    .map(|f| builder.add_vertex(mesh.centroid(f) + mesh.normal(f) * args.amount, Role::New))
    .collect();

  for (index, he) in mesh.halfedges().iter().enumerate() {
    let v0 = he.origin;
    let v1 = mesh.target(index);
    match he.twin {
      Some(twin) if index < twin => {
        let other = mesh.halfedges()[twin].face;
        builder.add_face([v0, centres[other], v1, centres[he.face]], Role::New);
      }
      Some(_) => {}
      None => builder.add_face([v0, v1, centres[he.face]], Role::Ignored),
    }
  }
  builder.build()
}

/// Split each n-gon into n quads around its centroid.
pub fn ortho(mesh: &PolyMesh, _args: &OpArgs) -> Result<PolyMesh, MeshError> {
  let mut builder = MeshBuilder::from_vertices(mesh);
  let mut mids = PointCache::new();

  for face in 0..mesh.face_count() {
    let verts = mesh.face_vertices(face);
    let n = verts.len();
    let centre = builder.add_vertex(mesh.centroid(face), Role::New);
    let edge_mids: Vec<usize> = (0..n)
      .map(|i| {
        let (a, b) = (verts[i], verts[(i + 1) % n]);
        mids.get_or_add(&mut builder, edge_key(a, b), Role::NewAlt, || {
          (mesh.position(a) + mesh.position(b)) * 0.5
        })
      })
      .collect();
    for i in 0..n {
      let before = edge_mids[(i + n - 1) % n];
      builder.add_face([verts[i], edge_mids[i], centre, before], alternate(i));
    }
  }
  builder.build()
}

// =============================================================================
// Truncate / Gyro / Expand
// =============================================================================

/// Cut the corners off vertices touching selected faces.
///
/// Cut points sit at `amount` along each outgoing edge. Boundary vertices are
/// left whole.
pub fn truncate(mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
  let mut rng = rand::rng();

  let mut truncated = vec![false; mesh.vertex_count()];
  for face in 0..mesh.face_count() {
    if mesh.include_face(face, args.faces) {
      for v in mesh.face_vertices(face) {
        truncated[v] = true;
      }
    }
  }
  let ratios: Vec<f32> = (0..mesh.vertex_count())
    .map(|v| {
      if truncated[v] && mesh.vertex_ring(v).is_none() {
        truncated[v] = false;
      }
      jittered(&mut rng, args)
    })
    .collect();

  let mut builder = MeshBuilder::new();
  let mut originals = PointCache::new();
  let mut cuts = PointCache::new();
  let mut cut = |builder: &mut MeshBuilder, from: usize, to: usize| {
    cuts.get_or_add(builder, (from, to), Role::New, || {
      let a = mesh.position(from);
      a + (mesh.position(to) - a) * ratios[from]
    })
  };

  for face in 0..mesh.face_count() {
    let verts = mesh.face_vertices(face);
    let n = verts.len();
    let mut indices = Vec::with_capacity(n * 2);
    for i in 0..n {
      let v = verts[i];
      if truncated[v] {
        indices.push(cut(&mut builder, v, verts[(i + n - 1) % n]));
        indices.push(cut(&mut builder, v, verts[(i + 1) % n]));
      } else {
        indices.push(originals.get_or_add(&mut builder, v, Role::Existing, || mesh.position(v)));
      }
    }
    builder.add_face(indices, mesh.face_role(face));
  }

  for vertex in (0..mesh.vertex_count()).filter(|&v| truncated[v]) {
    let Some(ring) = mesh.vertex_ring(vertex) else {
      continue;
    };
    let indices: Vec<usize> = ring
      .iter()
      .map(|&he| cut(&mut builder, vertex, mesh.target(he)))
      .collect();
    builder.add_face(indices, Role::New);
  }
  builder.build()
}

/// Pentagonal gyro: each face becomes a ring of pentagons about its centre.
pub fn gyro(mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
  let mut builder = MeshBuilder::from_vertices(mesh);
  let centres: Vec<usize> = centroids(mesh)
    .into_iter()
    .map(|c| builder.add_vertex(c, Role::New))
    .collect();

  let mut points = PointCache::new();
  let mut along = |builder: &mut MeshBuilder, a: usize, b: usize| {
    points.get_or_add(builder, (a, b), Role::NewAlt, || {
      let p = mesh.position(a);
      p + (mesh.position(b) - p) * args.amount
    })
  };

  for face in 0..mesh.face_count() {
    let verts = mesh.face_vertices(face);
    let n = verts.len();
    for i in 0..n {
      let v1 = verts[i];
      let v2 = verts[(i + 1) % n];
      let v3 = verts[(i + 2) % n];
      let e12 = along(&mut builder, v1, v2);
      let e21 = along(&mut builder, v2, v1);
      let e23 = along(&mut builder, v2, v3);
      builder.add_face([centres[face], e12, e21, v2, e23], alternate(i));
    }
  }
  builder.build()
}

/// Pull faces apart, filling edges with quads and vertices with polygons.
pub fn expand(mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
  let mut builder = MeshBuilder::new();
  let mut corners = PointCache::new();
  let centre = centroids(mesh);
  let mut corner = |builder: &mut MeshBuilder, face: usize, vertex: usize| {
    corners.get_or_add(builder, (face, vertex), Role::Existing, || {
      let p = mesh.position(vertex);
      p + (centre[face] - p) * args.amount
    })
  };

  for face in 0..mesh.face_count() {
    let indices: Vec<usize> = mesh
      .face_vertices(face)
      .iter()
      .map(|&v| corner(&mut builder, face, v))
      .collect();
    builder.add_face(indices, Role::Existing);
  }

  for (index, he) in mesh.halfedges().iter().enumerate() {
    let Some(twin) = he.twin else {
      continue;
    };
    if index > twin {
      continue;
    }
    let (a, b) = (he.origin, mesh.target(index));
    let (f, g) = (he.face, mesh.halfedges()[twin].face);
    let quad = [
      corner(&mut builder, f, a),
      corner(&mut builder, g, a),
      corner(&mut builder, g, b),
      corner(&mut builder, f, b),
    ];
    builder.add_face(quad, Role::New);
  }

  for vertex in 0..mesh.vertex_count() {
    let Some(ring) = mesh.vertex_ring(vertex) else {
      continue;
    };
    let indices: Vec<usize> = ring
      .iter()
      .map(|&he| corner(&mut builder, mesh.halfedges()[he].face, vertex))
      .collect();
    builder.add_face(indices, Role::NewAlt);
  }
  builder.build()
}

// =============================================================================
// Extrude
// =============================================================================

/// Detach selected faces and push them out along their normal with side walls.
pub fn extrude(mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
  let mut rng = rand::rng();
  let mut builder = MeshBuilder::from_vertices(mesh);

  for face in 0..mesh.face_count() {
    let verts = mesh.face_vertices(face);
    if !mesh.include_face(face, args.faces) {
      builder.add_face(verts.iter().copied(), mesh.face_role(face));
      continue;
    }

    let offset = mesh.normal(face) * jittered(&mut rng, args);
    let bottom: Vec<usize> = verts
      .iter()
      .map(|&v| builder.add_vertex(mesh.position(v), Role::Existing))
      .collect();
    let top: Vec<usize> = verts
      .iter()
      .map(|&v| builder.add_vertex(mesh.position(v) + offset, Role::New))
      .collect();

    let n = verts.len();
    for i in 0..n {
      let j = (i + 1) % n;
      builder.add_face([bottom[i], bottom[j], top[j], top[i]], alternate(i));
    }
    builder.add_face(top, Role::Existing);
  }
  builder.build()
}
