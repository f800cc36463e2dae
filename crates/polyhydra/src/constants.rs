//! Fixed values shared by the generation pipeline.
//!
//! # Face Palette
//!
//! ```text
//! index  colour            used by
//! ─────  ────────────────  ─────────────────────────────────────
//!   0    salmon            role Ignored / sides mod 12 == 0
//!   1    light grey        role Existing
//!   2    slate             role New
//!   3    cream             role NewAlt
//!   4    brick             role ExistingAlt
//!   5..  remaining tints   sides-based colouring only
//! ```
//!
//! ColorMethod::ByRole indexes the palette by role ordinal, ColorMethod::BySides
//! by `sides % FACE_PALETTE.len()`.

/// Twelve-entry RGBA8 face palette.
pub const FACE_PALETTE: [[u8; 4]; 12] = [
  [255, 128, 128, 255],
  [204, 204, 204, 255],
  [128, 153, 153, 255],
  [255, 240, 230, 255],
  [168, 51, 51, 255],
  [153, 0, 0, 255],
  [255, 255, 255, 255],
  [153, 153, 153, 255],
  [128, 255, 128, 255],
  [128, 128, 255, 255],
  [128, 255, 255, 255],
  [255, 128, 255, 255],
];

/// Upper bound of the per-axis position jitter in world units.
///
/// Positions are offset by `[0, JITTER_MAGNITUDE)` on each axis so that
/// exactly coincident faces do not z-fight. Well below visible size for unit
/// scale meshes.
pub const JITTER_MAGNITUDE: f32 = 0.0002;

/// Default seed for the tessellation jitter stream.
pub const DEFAULT_JITTER_SEED: u64 = 0x5EED_F00D;

/// Smallest arity accepted by Johnson solids (smaller values clamp up).
pub const MIN_PRISM_SIDES: u32 = 3;

/// Largest arity accepted by Johnson solids and polygons.
pub const MAX_PRISM_SIDES: u32 = 64;

/// Largest grid dimension (columns or rows).
pub const MAX_GRID_CELLS: u32 = 256;

/// Filename prefix for saved presets.
pub const PRESET_FILE_PREFIX: &str = "PolyPreset-";

/// Squared length below which a vector is treated as zero.
pub const EPSILON_SQ: f32 = 1e-12;

/// Animation phase scale applied to `frame * rate`.
pub const ANIMATION_PHASE_SCALE: f32 = 0.05;

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
