//! Stage 3: Tessellation
//!
//! Converts a polygon mesh into an unshared-vertex triangle buffer.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │ Tessellate                                                              │
//! │                                                                         │
//! │  triangle face   ──► (v0, v1, v2)                     edge_uv all (1,1) │
//! │  n-gon, n > 3    ──► (c, v_i, v_i+1) for every edge   c gets (0,0)      │
//! │                                                                         │
//! │  naked edges or two_sided:                                              │
//! │    mirrored set per face, reversed winding, normals from geometry       │
//! │                                                                         │
//! │  then: jitter positions ──► mirrored normals ──► tangents ──► bounds    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every triangle owns its three vertices, so per-face attributes (colour,
//! face data, flat normal) never bleed between neighbours.

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::FACE_PALETTE;
use crate::error::TessellateError;
use crate::mesh::PolyMesh;
use crate::types::{ColorMethod, TessellateConfig, TriangleMesh, Vertex};

const BARYCENTRIC: [[f32; 3]; 3] = [[0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]];
const CENTROID_EDGE_UV: [f32; 2] = [0.0, 0.0];
const POLYGON_EDGE_UV: [f32; 2] = [1.0, 1.0];

/// Attributes shared by every triangle of one face.
struct FaceFrame {
  normal: Vec3,
  axis_u: Vec3,
  axis_v: Vec3,
  color: [u8; 4],
  face_data: [f32; 4],
}

impl FaceFrame {
  fn new(mesh: &PolyMesh, face: usize, config: &TessellateConfig) -> Self {
    let normal = mesh.normal(face);
    let axis_u = mesh.first_edge(face).normalize_or_zero();
    // First edge and normal are not perpendicular on a non-planar face
    let axis_v = axis_u.cross(normal).normalize_or_zero();
    let sides = mesh.sides(face);

    let palette_index = match config.color_method {
      ColorMethod::ByRole => mesh.face_role(face) as usize,
      ColorMethod::BySides => sides,
    };

    Self {
      normal,
      axis_u,
      axis_v,
      color: FACE_PALETTE[palette_index % FACE_PALETTE.len()],
      face_data: [
        mesh.face_scale(face),
        sides as f32,
        mesh.centroid(face).length(),
        face as f32 / mesh.face_count() as f32,
      ],
    }
  }

  #[inline]
  fn uv(&self, position: Vec3) -> [f32; 2] {
    [position.dot(self.axis_u), position.dot(self.axis_v)]
  }

  fn push_triangle(&self, out: &mut TriangleMesh, corners: [(Vec3, [f32; 2]); 3], normal: Vec3) {
    let base = out.vertices.len() as u32;
    for (corner, (position, edge_uv)) in corners.into_iter().enumerate() {
      out.vertices.push(Vertex {
        position: position.to_array(),
        normal: normal.to_array(),
        color: self.color,
        uv: self.uv(position),
        edge_uv,
        barycentric: BARYCENTRIC[corner],
        face_data: self.face_data,
        ..Vertex::default()
      });
    }
    out.indices.extend_from_slice(&[base, base + 1, base + 2]);
  }
}

/// Number of triangles one side of `mesh` produces.
pub fn triangle_count(mesh: &PolyMesh) -> usize {
  (0..mesh.face_count())
    .map(|face| match mesh.sides(face) {
      3 => 1,
      n => n,
    })
    .sum()
}

/// Tessellate a polygon mesh.
///
/// Fails on the first face with fewer than three vertices. A mesh with no
/// faces gives an empty buffer.
#[tracing::instrument(skip_all, name = "pipeline::tessellate", fields(faces = mesh.face_count()))]
pub fn tessellate(mesh: &PolyMesh, config: &TessellateConfig) -> Result<TriangleMesh, TessellateError> {
  let mut out = TriangleMesh::new();
  if mesh.face_count() == 0 {
    return Ok(out);
  }

  for face in 0..mesh.face_count() {
    let sides = mesh.sides(face);
    if sides < 3 {
      return Err(TessellateError::DegenerateFace { face, sides });
    }
  }

  let mirrored = config.two_sided || mesh.has_naked_edges();
  let triangles = triangle_count(mesh) * if mirrored { 2 } else { 1 };
  out.vertices.reserve(triangles * 3);
  out.indices.reserve(triangles * 3);

  {
    let _span = tracing::info_span!("pipeline::tessellate::faces", mirrored).entered();
    for face in 0..mesh.face_count() {
      emit_face(&mut out, mesh, face, config, mirrored);
    }
  }

  apply_jitter(&mut out, config);
  if mirrored {
    recalculate_normals(&mut out);
  }
  compute_tangents(&mut out);

  for vertex in &out.vertices {
    out.bounds.include(vertex.position);
  }
  debug_assert!(out.bounds.is_valid() || out.is_empty());

  Ok(out)
}

fn emit_face(out: &mut TriangleMesh, mesh: &PolyMesh, face: usize, config: &TessellateConfig, mirrored: bool) {
  let frame = FaceFrame::new(mesh, face, config);
  let points = mesh.face_positions(face);
  let edge = POLYGON_EDGE_UV;

  if points.len() == 3 {
    let [a, b, c] = [points[0], points[1], points[2]];
    frame.push_triangle(out, [(a, edge), (b, edge), (c, edge)], frame.normal);
    if mirrored {
      frame.push_triangle(out, [(a, edge), (c, edge), (b, edge)], -frame.normal);
    }
    return;
  }

  let centroid = mesh.centroid(face);
  let centre = (centroid, CENTROID_EDGE_UV);
  let n = points.len();
  for i in 0..n {
    let start = (points[i], edge);
    let end = (points[(i + 1) % n], edge);
    frame.push_triangle(out, [centre, start, end], frame.normal);
  }
  if mirrored {
    for i in 0..n {
      let start = (points[i], edge);
      let end = (points[(i + 1) % n], edge);
      frame.push_triangle(out, [centre, end, start], -frame.normal);
    }
  }
}

/// Replace each triangle's normals with its geometric normal.
fn recalculate_normals(out: &mut TriangleMesh) {
  for tri in out.vertices.chunks_exact_mut(3) {
    let [a, b, c] = [0, 1, 2].map(|i| Vec3::from_array(tri[i].position));
    let normal = (b - a).cross(c - a);
    if normal.length_squared() <= f32::EPSILON {
      continue;
    }
    let normal = normal.normalize().to_array();
    for vertex in tri {
      vertex.normal = normal;
    }
  }
}

/// Offset every position by an independent draw in `[0, magnitude)` per axis.
fn apply_jitter(out: &mut TriangleMesh, config: &TessellateConfig) {
  let magnitude = config.jitter_magnitude;
  if !(magnitude.is_finite() && magnitude > 0.0) {
    return;
  }
  let mut rng = StdRng::seed_from_u64(config.jitter_seed);
  for vertex in &mut out.vertices {
    for axis in &mut vertex.position {
      *axis += rng.random_range(0.0..magnitude);
    }
  }
}

/// Per-triangle tangents from the UV gradient, orthogonalised against the
/// vertex normal. Handedness goes in `w`.
fn compute_tangents(out: &mut TriangleMesh) {
  for tri in out.vertices.chunks_exact_mut(3) {
    let p = [0, 1, 2].map(|i| Vec3::from_array(tri[i].position));
    let uv = [0, 1, 2].map(|i| Vec2::from_array(tri[i].uv));

    let (e1, e2) = (p[1] - p[0], p[2] - p[0]);
    let (d1, d2) = (uv[1] - uv[0], uv[2] - uv[0]);
    let det = d1.x * d2.y - d2.x * d1.y;

    let (sdir, tdir) = if det.abs() > f32::EPSILON {
      let r = 1.0 / det;
      ((e1 * d2.y - e2 * d1.y) * r, (e2 * d1.x - e1 * d2.x) * r)
    } else {
      (Vec3::ZERO, Vec3::ZERO)
    };

    for vertex in tri {
      let normal = Vec3::from_array(vertex.normal);
      let mut tangent = (sdir - normal * normal.dot(sdir)).normalize_or_zero();
      if tangent == Vec3::ZERO {
        tangent = if normal.is_normalized() {
          normal.any_orthonormal_vector()
        } else {
          Vec3::X
        };
      }
      let w = if normal.cross(tangent).dot(tdir) < 0.0 { -1.0 } else { 1.0 };
      vertex.tangent = [tangent.x, tangent.y, tangent.z, w];
    }
  }
}

#[cfg(test)]
#[path = "tessellate_test.rs"]
mod tessellate_test;
