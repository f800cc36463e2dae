use std::f32::consts::PI;

use glam::Vec3;

use super::{JohnsonKind, PlatonicKind};
use crate::error::MeshError;
use crate::mesh::{FaceIndices, PolyMesh, Role};
use crate::operators::{conway, OpArgs};

/// `n` points on a circle in the plane `y`, counter-clockwise seen from +Y.
fn ring(n: usize, radius: f32, y: f32, phase: f32) -> Vec<Vec3> {
  (0..n)
    .map(|i| {
      let theta = phase + 2.0 * PI * i as f32 / n as f32;
      Vec3::new(radius * theta.cos(), y, -radius * theta.sin())
    })
    .collect()
}

/// Reverse faces whose normal points toward the vertex mean.
///
/// Only valid for convex solids.
fn orient_outward(positions: &[Vec3], faces: &mut [Vec<usize>]) {
  let centre = positions.iter().copied().sum::<Vec3>() / positions.len() as f32;
  for face in faces.iter_mut() {
    let points: Vec<Vec3> = face.iter().map(|&i| positions[i]).collect();
    let centroid = points.iter().copied().sum::<Vec3>() / points.len() as f32;
    let mut normal = Vec3::ZERO;
    for i in 0..points.len() {
      let j = (i + 1) % points.len();
      normal += points[i].cross(points[j]);
    }
    if normal.dot(centroid - centre) < 0.0 {
      face.reverse();
    }
  }
}

fn solid(positions: Vec<Vec3>, mut faces: Vec<Vec<usize>>) -> Result<PolyMesh, MeshError> {
  orient_outward(&positions, &mut faces);
  let roles = vec![Role::Existing; faces.len()];
  PolyMesh::from_faces(positions, &faces, &roles)
}

// =============================================================================
// Platonic
// =============================================================================

pub(super) fn platonic(kind: PlatonicKind) -> Result<PolyMesh, MeshError> {
  match kind {
    PlatonicKind::Tetrahedron => solid(
      vec![
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
      ],
      vec![vec![0, 1, 2], vec![0, 3, 1], vec![0, 2, 3], vec![1, 3, 2]],
    ),
    PlatonicKind::Cube => solid(
      vec![
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(1.0, 1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, 1.0, 1.0),
      ],
      vec![
        vec![0, 3, 2, 1],
        vec![4, 5, 6, 7],
        vec![0, 1, 5, 4],
        vec![3, 7, 6, 2],
        vec![0, 4, 7, 3],
        vec![1, 2, 6, 5],
      ],
    ),
    PlatonicKind::Octahedron => solid(
      vec![Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z],
      vec![
        vec![0, 2, 4],
        vec![2, 1, 4],
        vec![1, 3, 4],
        vec![3, 0, 4],
        vec![2, 0, 5],
        vec![1, 2, 5],
        vec![3, 1, 5],
        vec![0, 3, 5],
      ],
    ),
    PlatonicKind::Icosahedron => icosahedron(),
    PlatonicKind::Dodecahedron => {
      let dual = conway::dual(&icosahedron()?, &OpArgs::default())?;
      let faces: Vec<FaceIndices> = (0..dual.face_count()).map(|f| dual.face_vertices(f)).collect();
      PolyMesh::from_faces(dual.positions(), &faces, &vec![Role::Existing; faces.len()])
    }
  }
}

fn icosahedron() -> Result<PolyMesh, MeshError> {
  let phi = (1.0 + 5.0f32.sqrt()) / 2.0;
  solid(
    vec![
      Vec3::new(-1.0, phi, 0.0),
      Vec3::new(1.0, phi, 0.0),
      Vec3::new(-1.0, -phi, 0.0),
      Vec3::new(1.0, -phi, 0.0),
      Vec3::new(0.0, -1.0, phi),
      Vec3::new(0.0, 1.0, phi),
      Vec3::new(0.0, -1.0, -phi),
      Vec3::new(0.0, 1.0, -phi),
      Vec3::new(phi, 0.0, -1.0),
      Vec3::new(phi, 0.0, 1.0),
      Vec3::new(-phi, 0.0, -1.0),
      Vec3::new(-phi, 0.0, 1.0),
    ],
    vec![
      vec![0, 11, 5],
      vec![0, 5, 1],
      vec![0, 1, 7],
      vec![0, 7, 10],
      vec![0, 10, 11],
      vec![1, 5, 9],
      vec![5, 11, 4],
      vec![11, 10, 2],
      vec![10, 7, 6],
      vec![7, 1, 8],
      vec![3, 9, 4],
      vec![3, 4, 2],
      vec![3, 2, 6],
      vec![3, 6, 8],
      vec![3, 8, 9],
      vec![4, 9, 5],
      vec![2, 4, 11],
      vec![6, 2, 10],
      vec![8, 6, 7],
      vec![9, 8, 1],
    ],
  )
}

// =============================================================================
// Johnson families
// =============================================================================

/// Builder state for stacked rings capped by polygons or apexes.
struct Stack {
  positions: Vec<Vec3>,
  faces: Vec<Vec<usize>>,
}

impl Stack {
  fn new() -> Self {
    Self {
      positions: Vec::new(),
      faces: Vec::new(),
    }
  }

  fn add_ring(&mut self, points: Vec<Vec3>) -> Vec<usize> {
    let start = self.positions.len();
    self.positions.extend(points);
    (start..self.positions.len()).collect()
  }

  fn add_point(&mut self, point: Vec3) -> usize {
    self.positions.push(point);
    self.positions.len() - 1
  }

  fn cap(&mut self, ring: &[usize]) {
    self.faces.push(ring.to_vec());
  }

  fn quads(&mut self, lower: &[usize], upper: &[usize]) {
    let n = lower.len();
    for i in 0..n {
      let j = (i + 1) % n;
      self.faces.push(vec![lower[i], lower[j], upper[j], upper[i]]);
    }
  }

  fn antiprism_band(&mut self, lower: &[usize], upper: &[usize]) {
    let n = lower.len();
    for i in 0..n {
      let j = (i + 1) % n;
      self.faces.push(vec![lower[i], lower[j], upper[i]]);
      self.faces.push(vec![upper[i], lower[j], upper[j]]);
    }
  }

  fn fan(&mut self, ring: &[usize], apex: usize) {
    let n = ring.len();
    for i in 0..n {
      self.faces.push(vec![ring[i], ring[(i + 1) % n], apex]);
    }
  }

  fn build(self) -> Result<PolyMesh, MeshError> {
    solid(self.positions, self.faces)
  }
}

pub(super) fn johnson(kind: JohnsonKind, sides: usize) -> Result<PolyMesh, MeshError> {
  let edge = 2.0 * (PI / sides as f32).sin();
  // Apex height for equilateral sides, kept positive for wide bases
  let apex = (edge * edge - 1.0).max(0.25).sqrt();
  let half = edge / 2.0;
  let mut stack = Stack::new();

  match kind {
    JohnsonKind::Prism => {
      let bottom = stack.add_ring(ring(sides, 1.0, -half, 0.0));
      let top = stack.add_ring(ring(sides, 1.0, half, 0.0));
      stack.cap(&bottom);
      stack.cap(&top);
      stack.quads(&bottom, &top);
    }
    JohnsonKind::Antiprism => {
      let offset = 2.0 * (PI / (2.0 * sides as f32)).sin();
      let height = (edge * edge - offset * offset).max(0.01).sqrt();
      let bottom = stack.add_ring(ring(sides, 1.0, -height / 2.0, 0.0));
      let top = stack.add_ring(ring(sides, 1.0, height / 2.0, PI / sides as f32));
      stack.cap(&bottom);
      stack.cap(&top);
      stack.antiprism_band(&bottom, &top);
    }
    JohnsonKind::Pyramid => {
      let base = stack.add_ring(ring(sides, 1.0, 0.0, 0.0));
      let tip = stack.add_point(Vec3::Y * apex);
      stack.cap(&base);
      stack.fan(&base, tip);
    }
    JohnsonKind::Dipyramid => {
      let base = stack.add_ring(ring(sides, 1.0, 0.0, 0.0));
      let top = stack.add_point(Vec3::Y * apex);
      let bottom = stack.add_point(-Vec3::Y * apex);
      stack.fan(&base, top);
      stack.fan(&base, bottom);
    }
    JohnsonKind::ElongatedPyramid => {
      let bottom = stack.add_ring(ring(sides, 1.0, -half, 0.0));
      let top = stack.add_ring(ring(sides, 1.0, half, 0.0));
      let tip = stack.add_point(Vec3::Y * (half + apex));
      stack.cap(&bottom);
      stack.quads(&bottom, &top);
      stack.fan(&top, tip);
    }
    JohnsonKind::ElongatedDipyramid => {
      let bottom = stack.add_ring(ring(sides, 1.0, -half, 0.0));
      let top = stack.add_ring(ring(sides, 1.0, half, 0.0));
      let upper = stack.add_point(Vec3::Y * (half + apex));
      let lower = stack.add_point(-Vec3::Y * (half + apex));
      stack.quads(&bottom, &top);
      stack.fan(&top, upper);
      stack.fan(&bottom, lower);
    }
  }
  stack.build()
}

// =============================================================================
// Polygon
// =============================================================================

/// Single face facing +Y. One or two sides give a degenerate face.
pub(super) fn polygon(sides: usize) -> Result<PolyMesh, MeshError> {
  let positions = ring(sides, 1.0, 0.0, 0.0);
  let face: Vec<usize> = (0..sides).collect();
  PolyMesh::from_faces(positions, &[face], &[Role::Existing])
}
