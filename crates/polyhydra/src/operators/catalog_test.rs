use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;
use crate::shapes::{BaseMeshSupplier, PlatonicKind, ShapeDescriptor, ShapeLibrary};

#[test]
fn test_every_kind_has_ordered_ranges() {
  for &kind in OperatorKind::ALL {
    let config = config_for(kind);
    assert!(config.amount_min < config.amount_max, "{kind}");
    assert!(config.amount_safe_min <= config.amount_safe_max, "{kind}");
    if config.uses_amount {
      assert!(
        (config.amount_min..=config.amount_max).contains(&config.amount_default),
        "{kind} default outside range"
      );
    }
    if config.uses_randomize {
      assert!(config.uses_faces, "{kind}");
    }
  }
}

#[test]
fn test_known_entries() {
  let kis = config_for(OperatorKind::Kis);
  assert_eq!(kis.amount_default, 0.1);
  assert_eq!((kis.amount_min, kis.amount_max), (-6.0, 6.0));
  assert!(kis.uses_faces && kis.uses_randomize);

  let gyro = config_for(OperatorKind::Gyro);
  assert_eq!(gyro.amount_default, 0.33);
  assert!(!gyro.uses_faces);

  assert!(!config_for(OperatorKind::Dual).uses_amount);
  assert!(config_for(OperatorKind::FaceKeep).uses_faces);
}

#[test]
fn test_clamp_enforces_min_max_not_safe_range() {
  // Outside the safe range but inside min/max stays as given
  assert_eq!(clamp(OperatorKind::Kis, 3.0), 3.0);
  assert_eq!(clamp(OperatorKind::Kis, 30.0), 6.0);
  assert_eq!(clamp(OperatorKind::Join, -5.0), -1.0);
}

#[test]
fn test_checked_clamp_rejects_nan() {
  let result = checked_clamp(OperatorKind::Kis, f32::NAN);
  assert!(matches!(result, Err(ConfigError::AmountOutOfRange { .. })));
}

#[test]
fn test_checked_clamp_ignores_unused_amount() {
  assert_eq!(checked_clamp(OperatorKind::Dual, f32::NAN), Ok(0.0));
}

#[test]
fn test_sanitize_rounds_and_clamps() {
  let mut op = OperatorInstance::new(OperatorKind::Kis).with_amount(0.123456);
  sanitize(&mut op);
  assert_eq!(op.amount, 0.123);

  let mut op = OperatorInstance::new(OperatorKind::Kis).with_amount(99.0);
  sanitize(&mut op);
  assert_eq!(op.amount, 6.0);
}

#[test]
fn test_sanitize_zeroes_unused_amount() {
  let mut op = OperatorInstance::new(OperatorKind::Ambo).with_amount(0.7);
  sanitize(&mut op);
  assert_eq!(op.amount, 0.0);
}

#[test]
fn test_random_operator_respects_catalog() {
  let mesh = ShapeLibrary
    .build_base(&ShapeDescriptor::Platonic(PlatonicKind::Cube))
    .unwrap();
  let mut rng = StdRng::seed_from_u64(7);
  let excluded = &OperatorKind::ALL[OperatorKind::ALL.len() - 2..];
  for _ in 0..200 {
    let op = random_operator(&mut rng, &mesh);
    assert_ne!(op.kind, OperatorKind::Identity);
    assert!(!excluded.contains(&op.kind));
    let config = config_for(op.kind);
    assert!(op.amount >= config.amount_min && op.amount <= config.amount_max);
    assert!(!op.disabled);
    if op.face_selection != FaceSelection::All {
      let selected = mesh.count_selected(op.face_selection);
      assert!(selected > 0 && selected < mesh.face_count());
    }
  }
}

#[test]
fn test_random_operator_is_reproducible_with_seed() {
  let mesh = ShapeLibrary
    .build_base(&ShapeDescriptor::Platonic(PlatonicKind::Octahedron))
    .unwrap();
  let a = random_operator(&mut StdRng::seed_from_u64(42), &mesh);
  let b = random_operator(&mut StdRng::seed_from_u64(42), &mesh);
  assert_eq!(a, b);
}
