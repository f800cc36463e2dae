//! Per-kind numeric configuration.
//!
//! `amount_min..=amount_max` is the enforced domain; the safe range is a UI
//! hint only and amounts outside it stay legal.

use rand::Rng;
use tracing::warn;

use super::{OperatorInstance, OperatorKind};
use crate::error::ConfigError;
use crate::mesh::{FaceSelection, PolyMesh};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OperatorConfig {
  pub uses_amount: bool,
  pub amount_default: f32,
  pub amount_min: f32,
  pub amount_max: f32,
  pub amount_safe_min: f32,
  pub amount_safe_max: f32,
  pub uses_faces: bool,
  pub uses_randomize: bool,
}

const BASE: OperatorConfig = OperatorConfig {
  uses_amount: true,
  amount_default: 0.0,
  amount_min: -20.0,
  amount_max: 20.0,
  amount_safe_min: -10.0,
  amount_safe_max: 10.0,
  uses_faces: false,
  uses_randomize: false,
};

const NO_AMOUNT: OperatorConfig = OperatorConfig {
  uses_amount: false,
  ..BASE
};

const fn amount(default: f32, min: f32, max: f32, safe_min: f32, safe_max: f32) -> OperatorConfig {
  OperatorConfig {
    amount_default: default,
    amount_min: min,
    amount_max: max,
    amount_safe_min: safe_min,
    amount_safe_max: safe_max,
    ..BASE
  }
}

/// Amount-driven kind that also takes a face selection and randomize flag.
const fn faces(default: f32, min: f32, max: f32, safe_min: f32, safe_max: f32) -> OperatorConfig {
  OperatorConfig {
    uses_faces: true,
    uses_randomize: true,
    ..amount(default, min, max, safe_min, safe_max)
  }
}

/// Catalog entry for `kind`. Exhaustive over the closed kind set.
pub const fn config_for(kind: OperatorKind) -> OperatorConfig {
  use OperatorKind as K;
  match kind {
    K::Identity => NO_AMOUNT,
    K::Kis => faces(0.1, -6.0, 6.0, -1.0, 1.0),
    K::Dual => NO_AMOUNT,
    K::Ambo => NO_AMOUNT,
    K::Zip => faces(0.0, -6.0, 6.0, -1.0, 1.0),
    K::Expand => amount(0.5, -4.0, 4.0, 0.0, 1.0),
    K::Bevel => faces(0.0, -6.0, 6.0, 0.0, 1.0),
    K::Join => amount(0.5, -1.0, 2.0, -1.0, 1.0),
    K::Needle => faces(0.1, -6.0, 6.0, -0.5, 0.5),
    K::Ortho => NO_AMOUNT,
    K::Meta => faces(0.15, -6.0, 6.0, -0.333, 0.666),
    K::Truncate => faces(0.1, -6.0, 6.0, 0.0, 0.5),
    K::Gyro => amount(0.33, -0.5, 0.5, 0.0, 0.5),
    K::Snub => amount(0.5, -1.0, 1.0, 0.0, 1.0),
    K::Exalt => faces(0.1, -6.0, 6.0, 0.0, 1.0),
    K::Yank => faces(0.33, -6.0, 6.0, 0.0, 1.0),
    K::Extrude => faces(0.1, -6.0, 6.0, 0.0, 1.0),
    K::VertexScale => faces(0.5, -6.0, 6.0, -1.0, 1.0),
    K::FaceScale => faces(-0.5, -6.0, 6.0, -1.0, 0.0),
    K::FaceRemove => OperatorConfig {
      uses_faces: true,
      ..NO_AMOUNT
    },
    K::FaceKeep => OperatorConfig {
      uses_faces: true,
      ..NO_AMOUNT
    },
    K::FillHoles => NO_AMOUNT,
    K::AddDual => amount(1.0, -6.0, 6.0, 1.0, 2.0),
    K::AddMirrorX | K::AddMirrorY | K::AddMirrorZ => amount(0.0, -6.0, 6.0, -2.0, 2.0),
    K::Spherize => OperatorConfig {
      uses_faces: true,
      ..amount(1.0, -2.0, 2.0, -1.0, 1.5)
    },
    K::Recenter => NO_AMOUNT,
    K::SitLevel => NO_AMOUNT,
    K::Stretch => amount(1.0, 0.0, 3.0, 0.5, 1.5),
    K::Weld => amount(0.001, 0.0, 0.25, 0.001, 0.1),
  }
}

/// Clamp into `amount_min..=amount_max`.
pub fn clamp(kind: OperatorKind, amount: f32) -> f32 {
  let config = config_for(kind);
  amount.clamp(config.amount_min, config.amount_max)
}

/// Clamp, failing when the amount has no place in the range (NaN or infinite).
pub fn checked_clamp(kind: OperatorKind, amount: f32) -> Result<f32, ConfigError> {
  let config = config_for(kind);
  if !config.uses_amount {
    return Ok(0.0);
  }
  if !amount.is_finite() {
    return Err(ConfigError::AmountOutOfRange {
      kind,
      amount,
      min: config.amount_min,
      max: config.amount_max,
    });
  }
  Ok(clamp(kind, amount))
}

/// Normalise an edited instance: three decimals, clamped, zero when unused.
pub fn sanitize(op: &mut OperatorInstance) {
  let config = config_for(op.kind);
  if !config.uses_amount {
    op.amount = 0.0;
    return;
  }
  if !op.amount.is_finite() {
    warn!(kind = %op.kind, "Non-finite amount reset to default");
    op.amount = config.amount_default;
    return;
  }
  let rounded = (op.amount * 1000.0).round() / 1000.0;
  let clamped = clamp(op.kind, rounded);
  if clamped != rounded {
    warn!(kind = %op.kind, amount = rounded, clamped, "Operator amount clamped");
  }
  op.amount = clamped;
}

/// Upper bound on face-selection draws before falling back to `All`.
const SELECTION_ATTEMPTS: usize = 32;

/// Random operator suited to `mesh`.
///
/// Never picks `Identity` or the last two catalog entries. The face selection
/// is `All` three times in four; otherwise one that matches some but not all
/// faces of `mesh`.
pub fn random_operator<R: Rng + ?Sized>(rng: &mut R, mesh: &PolyMesh) -> OperatorInstance {
  let kinds = &OperatorKind::ALL[1..OperatorKind::ALL.len() - 2];
  let kind = kinds[rng.random_range(0..kinds.len())];
  let config = config_for(kind);

  let candidates = &FaceSelection::ALL[2..];
  let face_count = mesh.face_count();
  let mut selection = FaceSelection::All;
  for _ in 0..SELECTION_ATTEMPTS {
    let pick = candidates[rng.random_range(0..candidates.len())];
    let selected = mesh.count_selected(pick);
    if selected > 0 && selected < face_count {
      selection = pick;
      break;
    }
  }

  let face_selection = if rng.random::<f32>() > 0.25 {
    FaceSelection::All
  } else {
    selection
  };
  let randomize = rng.random::<f32>() > 0.8;
  let amount = if rng.random::<f32>() > 0.25 {
    config.amount_default
  } else {
    rng.random_range(config.amount_min..config.amount_max)
  };

  let mut op = OperatorInstance::new(kind)
    .with_faces(face_selection)
    .with_amount(amount);
  op.randomize = randomize;
  op
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;
