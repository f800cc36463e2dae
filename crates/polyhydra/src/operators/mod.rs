//! Operator kinds, instances and the transform library.
//!
//! ```text
//! OperatorInstance ──effective amount──► OpArgs ──► OperatorLibrary::apply
//!                                                     │
//!                         ConwayLibrary: kind ──► [Transform; n] applied in order
//! ```
//!
//! Composite kinds are ordered lists of primitive transforms, e.g. `Zip`
//! applies `kis` then `dual`.

pub mod catalog;
pub mod conway;
pub mod transforms;

pub use catalog::{config_for, random_operator, sanitize, OperatorConfig};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, MeshError};
use crate::mesh::{FaceSelection, PolyMesh};

macro_rules! operator_kinds {
  ($($kind:ident),+ $(,)?) => {
    /// Closed set of operators a chain can contain.
    ///
    /// Names outside this set (subdivide, chamfer, lace, ...) parse as
    /// [`ConfigError::UnknownOperator`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub enum OperatorKind {
      #[default]
      $($kind),+
    }

    impl OperatorKind {
      /// Every kind, in catalog order.
      pub const ALL: &'static [OperatorKind] = &[$(OperatorKind::$kind),+];

      pub fn name(self) -> &'static str {
        match self {
          $(OperatorKind::$kind => stringify!($kind)),+
        }
      }
    }
  };
}

operator_kinds!(
  Identity,
  Dual,
  Kis,
  Ambo,
  Zip,
  Expand,
  Bevel,
  Join,
  Needle,
  Ortho,
  Meta,
  Truncate,
  Gyro,
  Snub,
  Exalt,
  Yank,
  Extrude,
  VertexScale,
  FaceScale,
  FaceRemove,
  FaceKeep,
  FillHoles,
  AddDual,
  AddMirrorX,
  AddMirrorY,
  AddMirrorZ,
  Spherize,
  Recenter,
  SitLevel,
  Stretch,
  Weld,
);

impl fmt::Display for OperatorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for OperatorKind {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    OperatorKind::ALL
      .iter()
      .copied()
      .find(|kind| kind.name().eq_ignore_ascii_case(s))
      .ok_or_else(|| ConfigError::UnknownOperator(s.to_string()))
  }
}

// =============================================================================
// Instances
// =============================================================================

/// One configured step of an operator chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorInstance {
  pub kind: OperatorKind,
  pub face_selection: FaceSelection,
  pub amount: f32,
  pub randomize: bool,
  pub disabled: bool,
  pub animate: bool,
  /// Amount used instead of `amount` while `animate` is set.
  pub animated_amount: f32,
  pub animation_rate: f32,
  pub animation_amplitude: f32,
}

impl Default for OperatorInstance {
  fn default() -> Self {
    Self::new(OperatorKind::Identity)
  }
}

impl OperatorInstance {
  /// Instance with the catalog default amount, all faces, enabled.
  pub fn new(kind: OperatorKind) -> Self {
    let config = config_for(kind);
    let amount = if config.uses_amount {
      config.amount_default
    } else {
      0.0
    };
    Self {
      kind,
      face_selection: FaceSelection::All,
      amount,
      randomize: false,
      disabled: false,
      animate: false,
      animated_amount: amount,
      animation_rate: 1.0,
      animation_amplitude: 0.0,
    }
  }

  pub fn with_amount(mut self, amount: f32) -> Self {
    self.amount = amount;
    self.animated_amount = amount;
    self
  }

  pub fn with_faces(mut self, selection: FaceSelection) -> Self {
    self.face_selection = selection;
    self
  }

  pub fn randomized(mut self) -> Self {
    self.randomize = true;
    self
  }

  pub fn with_disabled(mut self, disabled: bool) -> Self {
    self.disabled = disabled;
    self
  }

  pub fn with_animation(mut self, rate: f32, amplitude: f32) -> Self {
    self.animate = true;
    self.animation_rate = rate;
    self.animation_amplitude = amplitude;
    self
  }

  pub fn is_enabled(&self) -> bool {
    !self.disabled
  }

  /// Amount actually applied: the animated override while animating.
  pub fn effective_amount(&self) -> f32 {
    if self.animate {
      self.animated_amount
    } else {
      self.amount
    }
  }

  /// Arguments for the transform, with the amount checked and clamped.
  pub fn args(&self) -> Result<OpArgs, ConfigError> {
    let amount = catalog::checked_clamp(self.kind, self.effective_amount())?;
    let config = config_for(self.kind);
    Ok(OpArgs {
      amount,
      faces: if config.uses_faces {
        self.face_selection
      } else {
        FaceSelection::All
      },
      randomize: config.uses_randomize && self.randomize,
    })
  }

  /// Canonical serialisation of everything that changes the step's output.
  ///
  /// Fields the kind ignores are normalised so that e.g. a `Dual` with a
  /// stray amount keys the same as a plain `Dual`. Animation rate and
  /// amplitude are excluded; only the amount they produced matters.
  pub fn cache_fragment(&self) -> Result<String, ConfigError> {
    #[derive(Serialize)]
    struct StepKey {
      kind: OperatorKind,
      faces: FaceSelection,
      amount: f32,
      randomize: bool,
    }

    let args = self.args()?;
    let key = StepKey {
      kind: self.kind,
      faces: args.faces,
      amount: if config_for(self.kind).uses_amount {
        args.amount
      } else {
        0.0
      },
      randomize: args.randomize,
    };
    Ok(serde_json::to_string(&key).unwrap_or_else(|_| format!("{:?}", self.kind)))
  }
}

/// Arguments handed to a transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpArgs {
  pub amount: f32,
  pub faces: FaceSelection,
  pub randomize: bool,
}

impl Default for OpArgs {
  fn default() -> Self {
    Self {
      amount: 0.0,
      faces: FaceSelection::All,
      randomize: false,
    }
  }
}

// =============================================================================
// Library
// =============================================================================

/// Primitive transform: reads one mesh, returns a new one.
pub type Transform = fn(&PolyMesh, &OpArgs) -> Result<PolyMesh, MeshError>;

/// Source of operator implementations consumed by the chain evaluator.
pub trait OperatorLibrary: Send + Sync {
  fn apply(&self, kind: OperatorKind, mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError>;
}

/// Built-in Conway operator library.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConwayLibrary;

impl ConwayLibrary {
  /// Primitive transforms making up `kind`, in application order.
  pub fn steps(kind: OperatorKind) -> &'static [Transform] {
    use OperatorKind as K;
    match kind {
      K::Identity => &[transforms::identity],
      K::Dual => &[conway::dual],
      K::Kis => &[conway::kis],
      K::Ambo => &[conway::ambo],
      K::Zip => &[conway::kis, conway::dual],
      K::Expand => &[conway::expand],
      K::Bevel => &[conway::join, conway::kis, conway::dual],
      K::Join => &[conway::join],
      K::Needle => &[conway::dual, conway::kis],
      K::Ortho => &[conway::ortho],
      K::Meta => &[conway::join, conway::dual, conway::kis],
      K::Truncate => &[conway::truncate],
      K::Gyro => &[conway::gyro],
      K::Snub => &[conway::gyro, conway::dual],
      K::Exalt => &[conway::dual, conway::kis, conway::dual, conway::kis],
      K::Yank => &[conway::kis, conway::dual, conway::kis, conway::dual],
      K::Extrude => &[conway::extrude],
      K::VertexScale => &[transforms::vertex_scale],
      K::FaceScale => &[transforms::face_scale],
      K::FaceRemove => &[transforms::face_remove],
      K::FaceKeep => &[transforms::face_keep],
      K::FillHoles => &[transforms::fill_holes],
      K::AddDual => &[transforms::add_dual],
      K::AddMirrorX => &[transforms::add_mirror_x],
      K::AddMirrorY => &[transforms::add_mirror_y],
      K::AddMirrorZ => &[transforms::add_mirror_z],
      K::Spherize => &[transforms::spherize],
      K::Recenter => &[transforms::recenter],
      K::SitLevel => &[transforms::sit_level],
      K::Stretch => &[transforms::stretch],
      K::Weld => &[transforms::weld],
    }
  }
}

impl OperatorLibrary for ConwayLibrary {
  fn apply(&self, kind: OperatorKind, mesh: &PolyMesh, args: &OpArgs) -> Result<PolyMesh, MeshError> {
    let (first, rest) = match Self::steps(kind).split_first() {
      Some(split) => split,
      None => return Ok(mesh.clone()),
    };
    let mut current = first(mesh, args)?;
    for step in rest {
      current = step(&current, args)?;
    }
    Ok(current)
  }
}

#[cfg(test)]
#[path = "operators_test.rs"]
mod operators_test;
