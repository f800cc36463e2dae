//! Core data types for tessellated output.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_JITTER_SEED, JITTER_MAGNITUDE};

/// Face colouring policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorMethod {
  /// Palette indexed by the face role.
  #[default]
  ByRole,

  /// Palette indexed by `sides % palette length`.
  BySides,
}

/// Output vertex with all mesh attributes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
  pub position: [f32; 3],

  /// Surface normal (unit vector).
  pub normal: [f32; 3],

  /// Tangent with handedness in `w`.
  pub tangent: [f32; 4],

  /// RGBA8 face colour.
  pub color: [u8; 4],

  /// UV0: position projected on the face's first-edge and bitangent axes.
  pub uv: [f32; 2],

  /// UV1: (0,0) at a fan centroid, (1,1) on polygon edges.
  pub edge_uv: [f32; 2],

  /// UV2: per-corner barycentric weights.
  pub barycentric: [f32; 3],

  /// UV3: face scale, side count, centroid distance, fractional face index.
  pub face_data: [f32; 4],
}

impl Default for Vertex {
  fn default() -> Self {
    Self {
      position: [0.0; 3],
      normal: [0.0, 1.0, 0.0],
      tangent: [1.0, 0.0, 0.0, 1.0],
      color: [255; 4],
      uv: [0.0; 2],
      edge_uv: [1.0; 2],
      barycentric: [0.0, 0.0, 1.0],
      face_data: [0.0; 4],
    }
  }
}

/// Axis-aligned extent of a triangle buffer. Starts inverted so the first
/// point sets both corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
  pub min: Vec3,
  pub max: Vec3,
}

impl Bounds {
  pub const EMPTY: Self = Self {
    min: Vec3::INFINITY,
    max: Vec3::NEG_INFINITY,
  };

  #[inline]
  pub fn include(&mut self, point: [f32; 3]) {
    let point = Vec3::from_array(point);
    self.min = self.min.min(point);
    self.max = self.max.max(point);
  }

  /// False until at least one point is included.
  pub fn is_valid(&self) -> bool {
    self.min.cmple(self.max).all()
  }

  /// Largest extent, zero for an empty box.
  pub fn max_dimension(&self) -> f32 {
    if self.is_valid() {
      (self.max - self.min).max_element()
    } else {
      0.0
    }
  }
}

impl Default for Bounds {
  fn default() -> Self {
    Self::EMPTY
  }
}

/// Renderable triangle buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleMesh {
  /// One vertex per triangle corner; nothing is shared between faces.
  pub vertices: Vec<Vertex>,

  /// Triangle indices (3 indices per triangle).
  pub indices: Vec<u32>,

  /// Extent of every vertex position.
  pub bounds: Bounds,
}

impl TriangleMesh {
  pub fn new() -> Self {
    Self::default()
  }

  /// Clear all buffers, preserving capacity.
  pub fn clear(&mut self) {
    self.vertices.clear();
    self.indices.clear();
    self.bounds = Bounds::EMPTY;
  }

  /// Returns true if no geometry was generated.
  pub fn is_empty(&self) -> bool {
    self.vertices.is_empty()
  }

  pub fn vertex_count(&self) -> usize {
    self.vertices.len()
  }

  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }
}

/// Configuration for tessellation.
#[derive(Clone, Debug, PartialEq)]
pub struct TessellateConfig {
  pub color_method: ColorMethod,

  /// Emit back faces even when the mesh is closed.
  pub two_sided: bool,

  /// Per-axis upper bound of the position jitter.
  pub jitter_magnitude: f32,

  /// Seed for the jitter stream.
  pub jitter_seed: u64,
}

impl Default for TessellateConfig {
  fn default() -> Self {
    Self {
      color_method: ColorMethod::default(),
      two_sided: false,
      jitter_magnitude: JITTER_MAGNITUDE,
      jitter_seed: DEFAULT_JITTER_SEED,
    }
  }
}

impl TessellateConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_color_method(mut self, method: ColorMethod) -> Self {
    self.color_method = method;
    self
  }

  pub fn with_two_sided(mut self, two_sided: bool) -> Self {
    self.two_sided = two_sided;
    self
  }

  pub fn with_jitter(mut self, magnitude: f32, seed: u64) -> Self {
    self.jitter_magnitude = magnitude;
    self.jitter_seed = seed;
    self
  }

  /// Key fragment covering every field that changes tessellated output.
  pub fn cache_fragment(&self) -> String {
    format!(
      "|{:?}|two_sided={}|jitter={:08x}@{}",
      self.color_method,
      self.two_sided,
      self.jitter_magnitude.to_bits(),
      self.jitter_seed
    )
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
