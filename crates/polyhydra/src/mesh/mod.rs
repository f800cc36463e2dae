//! Half-edge polygon mesh.
//!
//! # Layout
//!
//! ```text
//!            next
//!      v2 ◄─────── v1
//!       │   face    ▲
//!  prev │   (CCW)   │ he ── origin = v0, twin = opposite half-edge or None
//!       ▼           │
//!      v3 ───────► v0
//! ```
//!
//! Faces are stored counter-clockwise when viewed from outside, so the
//! Newell normal points outward. A half-edge without a twin is a naked
//! (boundary) edge.
//!
//! Meshes are value types: transforms read one mesh and build a new one
//! through [`MeshBuilder`] rather than editing links in place.

mod selection;

pub use selection::FaceSelection;

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::EPSILON_SQ;
use crate::error::MeshError;

/// Index list for one face. Most faces have at most eight sides.
pub type FaceIndices = SmallVec<[usize; 8]>;

/// Tag carried by faces and vertices, used for selection and colouring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
  Ignored = 0,
  #[default]
  Existing = 1,
  New = 2,
  NewAlt = 3,
  ExistingAlt = 4,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshVertex {
  pub position: Vec3,
  pub role: Role,
  /// One outgoing half-edge, `None` for isolated vertices.
  pub halfedge: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Face {
  pub halfedge: usize,
  pub role: Role,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HalfEdge {
  pub origin: usize,
  pub next: usize,
  pub prev: usize,
  pub twin: Option<usize>,
  pub face: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolyMesh {
  vertices: Vec<MeshVertex>,
  faces: Vec<Face>,
  halfedges: Vec<HalfEdge>,
}

impl PolyMesh {
  /// Build a mesh from positions and per-face vertex index lists.
  ///
  /// Vertex roles default to [`Role::Existing`]. Faces with one or two
  /// vertices are accepted so that later stages can reject them; empty faces
  /// and out-of-range indices are errors.
  pub fn from_faces<F>(positions: Vec<Vec3>, faces: &[F], roles: &[Role]) -> Result<Self, MeshError>
  where
    F: AsRef<[usize]>,
  {
    let vertex_roles = vec![Role::Existing; positions.len()];
    Self::from_parts(positions, vertex_roles, faces, roles)
  }

  /// Build a mesh with explicit vertex roles.
  pub fn from_parts<F>(
    positions: Vec<Vec3>,
    vertex_roles: Vec<Role>,
    faces: &[F],
    roles: &[Role],
  ) -> Result<Self, MeshError>
  where
    F: AsRef<[usize]>,
  {
    if faces.len() != roles.len() {
      return Err(MeshError::RoleCountMismatch {
        expected: faces.len(),
        actual: roles.len(),
      });
    }

    let vertex_count = positions.len();
    let mut vertices: Vec<MeshVertex> = positions
      .into_iter()
      .zip(vertex_roles.into_iter().chain(std::iter::repeat(Role::Existing)))
      .map(|(position, role)| MeshVertex {
        position,
        role,
        halfedge: None,
      })
      .collect();

    let total: usize = faces.iter().map(|f| f.as_ref().len()).sum();
    let mut mesh_faces = Vec::with_capacity(faces.len());
    let mut halfedges = Vec::with_capacity(total);
    let mut directed: HashMap<(usize, usize), usize> = HashMap::with_capacity(total);

    for (face_index, (indices, &role)) in faces.iter().zip(roles).enumerate() {
      let indices = indices.as_ref();
      if indices.is_empty() {
        return Err(MeshError::Degenerate {
          operation: "from_faces",
          reason: format!("face {face_index} has no vertices"),
        });
      }

      let start = halfedges.len();
      let n = indices.len();
      for (i, &vertex) in indices.iter().enumerate() {
        if vertex >= vertex_count {
          return Err(MeshError::InvalidVertexIndex {
            face: face_index,
            vertex,
            vertex_count,
          });
        }
        let he = start + i;
        halfedges.push(HalfEdge {
          origin: vertex,
          next: start + (i + 1) % n,
          prev: start + (i + n - 1) % n,
          twin: None,
          face: face_index,
        });
        vertices[vertex].halfedge.get_or_insert(he);
        // Non-manifold duplicates keep the first directed edge
        directed.entry((vertex, indices[(i + 1) % n])).or_insert(he);
      }

      mesh_faces.push(Face {
        halfedge: start,
        role,
      });
    }

    for he in 0..halfedges.len() {
      let origin = halfedges[he].origin;
      let target = halfedges[halfedges[he].next].origin;
      if origin == target {
        continue;
      }
      if let Some(&opposite) = directed.get(&(target, origin)) {
        halfedges[he].twin = Some(opposite);
      }
    }

    Ok(Self {
      vertices,
      faces: mesh_faces,
      halfedges,
    })
  }

  // =========================================================================
  // Counts and raw access
  // =========================================================================

  pub fn vertex_count(&self) -> usize {
    self.vertices.len()
  }

  pub fn face_count(&self) -> usize {
    self.faces.len()
  }

  pub fn halfedge_count(&self) -> usize {
    self.halfedges.len()
  }

  pub fn vertices(&self) -> &[MeshVertex] {
    &self.vertices
  }

  pub fn faces(&self) -> &[Face] {
    &self.faces
  }

  pub fn halfedges(&self) -> &[HalfEdge] {
    &self.halfedges
  }

  #[inline]
  pub fn position(&self, vertex: usize) -> Vec3 {
    self.vertices[vertex].position
  }

  pub fn positions(&self) -> Vec<Vec3> {
    self.vertices.iter().map(|v| v.position).collect()
  }

  pub fn face_role(&self, face: usize) -> Role {
    self.faces[face].role
  }

  pub fn face_roles(&self) -> Vec<Role> {
    self.faces.iter().map(|f| f.role).collect()
  }

  /// Target vertex of a half-edge.
  #[inline]
  pub fn target(&self, he: usize) -> usize {
    self.halfedges[self.halfedges[he].next].origin
  }

  // =========================================================================
  // Face queries
  // =========================================================================

  /// Half-edges of a face in winding order.
  pub fn face_halfedges(&self, face: usize) -> SmallVec<[usize; 8]> {
    let start = self.faces[face].halfedge;
    let mut out = SmallVec::new();
    let mut he = start;
    loop {
      out.push(he);
      he = self.halfedges[he].next;
      if he == start || out.len() > self.halfedges.len() {
        break;
      }
    }
    out
  }

  pub fn face_vertices(&self, face: usize) -> FaceIndices {
    self
      .face_halfedges(face)
      .iter()
      .map(|&he| self.halfedges[he].origin)
      .collect()
  }

  pub fn face_positions(&self, face: usize) -> SmallVec<[Vec3; 8]> {
    self
      .face_halfedges(face)
      .iter()
      .map(|&he| self.position(self.halfedges[he].origin))
      .collect()
  }

  pub fn sides(&self, face: usize) -> usize {
    self.face_halfedges(face).len()
  }

  pub fn centroid(&self, face: usize) -> Vec3 {
    let points = self.face_positions(face);
    points.iter().copied().sum::<Vec3>() / points.len() as f32
  }

  /// Outward unit normal by Newell's method; zero for degenerate faces.
  pub fn normal(&self, face: usize) -> Vec3 {
    let points = self.face_positions(face);
    let n = points.len();
    let mut normal = Vec3::ZERO;
    for i in 0..n {
      let a = points[i];
      let b = points[(i + 1) % n];
      normal.x += (a.y - b.y) * (a.z + b.z);
      normal.y += (a.z - b.z) * (a.x + b.x);
      normal.z += (a.x - b.x) * (a.y + b.y);
    }
    if normal.length_squared() < EPSILON_SQ {
      Vec3::ZERO
    } else {
      normal.normalize()
    }
  }

  /// Vector along the face's first edge.
  pub fn first_edge(&self, face: usize) -> Vec3 {
    let he = self.faces[face].halfedge;
    self.position(self.target(he)) - self.position(self.halfedges[he].origin)
  }

  /// Mean distance from the centroid to the face's vertices.
  pub fn face_scale(&self, face: usize) -> f32 {
    let centroid = self.centroid(face);
    let points = self.face_positions(face);
    points.iter().map(|p| p.distance(centroid)).sum::<f32>() / points.len() as f32
  }

  // =========================================================================
  // Topology queries
  // =========================================================================

  pub fn has_naked_edges(&self) -> bool {
    self.halfedges.iter().any(|he| he.twin.is_none())
  }

  /// Outgoing half-edges of `vertex`, counter-clockwise seen from outside.
  ///
  /// Returns `None` for isolated vertices and vertices on a boundary.
  pub fn vertex_ring(&self, vertex: usize) -> Option<SmallVec<[usize; 8]>> {
    let start = self.vertices[vertex].halfedge?;
    let mut ring = SmallVec::new();
    let mut he = start;
    loop {
      ring.push(he);
      he = self.halfedges[self.halfedges[he].prev].twin?;
      if he == start {
        return Some(ring);
      }
      if ring.len() > self.halfedges.len() {
        return None;
      }
    }
  }

  /// Boundary loops as vertex lists, wound so that a face built from them
  /// closes the hole with outward orientation.
  pub fn boundary_loops(&self) -> Vec<Vec<usize>> {
    let mut naked_from: HashMap<usize, usize> = HashMap::new();
    for (index, he) in self.halfedges.iter().enumerate() {
      if he.twin.is_none() {
        // Hole faces run opposite to the naked half-edges
        naked_from.insert(self.target(index), he.origin);
      }
    }

    let mut loops = Vec::new();
    let mut starts: Vec<usize> = naked_from.keys().copied().collect();
    starts.sort_unstable();
    for start in starts {
      if !naked_from.contains_key(&start) {
        continue;
      }
      let mut lp = vec![start];
      let mut current = start;
      while let Some(next) = naked_from.remove(&current) {
        if next == start {
          break;
        }
        lp.push(next);
        current = next;
      }
      if lp.len() >= 3 {
        loops.push(lp);
      }
    }
    loops
  }

  /// Axis-aligned bounds of all vertex positions.
  pub fn bounds(&self) -> (Vec3, Vec3) {
    self.vertices.iter().fold(
      (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
      |(min, max), v| (min.min(v.position), max.max(v.position)),
    )
  }

  /// Check that every face has at least three vertices.
  pub fn validate(&self) -> Result<(), MeshError> {
    for face in 0..self.faces.len() {
      let sides = self.sides(face);
      if sides < 3 {
        return Err(MeshError::Degenerate {
          operation: "validate",
          reason: format!("face {face} has {sides} vertices"),
        });
      }
    }
    Ok(())
  }

  /// Copy of this mesh with every position passed through `f`.
  pub fn map_positions(&self, f: impl Fn(Vec3) -> Vec3) -> Self {
    let mut out = self.clone();
    for v in &mut out.vertices {
      v.position = f(v.position);
    }
    out
  }

  /// Copy with positions replaced, topology kept.
  pub fn with_positions(&self, positions: &[Vec3]) -> Self {
    let mut out = self.clone();
    for (v, &p) in out.vertices.iter_mut().zip(positions) {
      v.position = p;
    }
    out
  }
}

// =============================================================================
// Builder
// =============================================================================

/// Accumulates vertices and faces for a new mesh.
#[derive(Default)]
pub struct MeshBuilder {
  positions: Vec<Vec3>,
  vertex_roles: Vec<Role>,
  faces: Vec<FaceIndices>,
  face_roles: Vec<Role>,
}

impl MeshBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start from a copy of an existing mesh's vertices (faces are not copied).
  pub fn from_vertices(mesh: &PolyMesh) -> Self {
    Self {
      positions: mesh.vertices.iter().map(|v| v.position).collect(),
      vertex_roles: mesh.vertices.iter().map(|v| v.role).collect(),
      faces: Vec::new(),
      face_roles: Vec::new(),
    }
  }

  pub fn add_vertex(&mut self, position: Vec3, role: Role) -> usize {
    self.positions.push(position);
    self.vertex_roles.push(role);
    self.positions.len() - 1
  }

  pub fn add_face<I>(&mut self, indices: I, role: Role)
  where
    I: IntoIterator<Item = usize>,
  {
    self.faces.push(indices.into_iter().collect());
    self.face_roles.push(role);
  }

  pub fn vertex_count(&self) -> usize {
    self.positions.len()
  }

  pub fn face_count(&self) -> usize {
    self.faces.len()
  }

  pub fn build(self) -> Result<PolyMesh, MeshError> {
    PolyMesh::from_parts(self.positions, self.vertex_roles, &self.faces, &self.face_roles)
  }
}
