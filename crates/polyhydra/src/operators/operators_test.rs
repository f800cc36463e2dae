use glam::Vec3;

use super::*;
use crate::mesh::Role;
use crate::shapes::{BaseMeshSupplier, PlatonicKind, ShapeDescriptor, ShapeLibrary};

fn cube() -> PolyMesh {
  ShapeLibrary
    .build_base(&ShapeDescriptor::Platonic(PlatonicKind::Cube))
    .unwrap()
}

fn apply(kind: OperatorKind, mesh: &PolyMesh) -> PolyMesh {
  let args = OperatorInstance::new(kind).args().unwrap();
  ConwayLibrary.apply(kind, mesh, &args).unwrap()
}

fn euler(mesh: &PolyMesh) -> i64 {
  mesh.vertex_count() as i64 - (mesh.halfedge_count() / 2) as i64 + mesh.face_count() as i64
}

fn assert_closed_outward(mesh: &PolyMesh, label: &str) {
  assert!(!mesh.has_naked_edges(), "{label} has naked edges");
  assert_eq!(euler(mesh), 2, "{label} euler characteristic");
  assert!(mesh.validate().is_ok(), "{label} has degenerate faces");
  for face in 0..mesh.face_count() {
    assert!(
      mesh.normal(face).dot(mesh.centroid(face)) > 0.0,
      "{label} face {face} faces inward"
    );
  }
}

// =============================================================================
// Batch 1: Kind registry
// =============================================================================

#[test]
fn test_kind_names_round_trip() {
  for &kind in OperatorKind::ALL {
    assert_eq!(kind.name().parse::<OperatorKind>(), Ok(kind));
  }
  assert_eq!("kis".parse::<OperatorKind>(), Ok(OperatorKind::Kis));
}

#[test]
fn test_unknown_kind_is_config_error() {
  assert_eq!(
    "Snorkel".parse::<OperatorKind>(),
    Err(ConfigError::UnknownOperator("Snorkel".into()))
  );
}

#[test]
fn test_unsupported_conway_names_are_rejected() {
  for name in ["Subdivide", "Chamfer", "Lace", "Propeller", "Canonicalize"] {
    assert_eq!(name.parse::<OperatorKind>(), Err(ConfigError::UnknownOperator(name.into())));
  }
}

#[test]
fn test_every_kind_has_steps() {
  for &kind in OperatorKind::ALL {
    assert!(!ConwayLibrary::steps(kind).is_empty(), "{kind}");
  }
}

// =============================================================================
// Batch 2: Conway operators on a cube
// =============================================================================

#[test]
fn test_operator_counts_on_cube() {
  let cube = cube();
  let cases = [
    (OperatorKind::Dual, 6, 8),
    (OperatorKind::Kis, 14, 24),
    (OperatorKind::Ambo, 12, 14),
    (OperatorKind::Join, 14, 12),
    (OperatorKind::Ortho, 26, 24),
    (OperatorKind::Truncate, 24, 14),
    (OperatorKind::Gyro, 38, 24),
    (OperatorKind::Expand, 24, 26),
    (OperatorKind::Zip, 24, 14),
  ];
  for (kind, vertices, faces) in cases {
    let result = apply(kind, &cube);
    assert_eq!(result.vertex_count(), vertices, "{kind} vertices");
    assert_eq!(result.face_count(), faces, "{kind} faces");
  }
}

#[test]
fn test_conway_operators_keep_closed_outward_surface() {
  let cube = cube();
  for kind in [
    OperatorKind::Dual,
    OperatorKind::Kis,
    OperatorKind::Ambo,
    OperatorKind::Ortho,
    OperatorKind::Truncate,
    OperatorKind::Gyro,
    OperatorKind::Expand,
    OperatorKind::Zip,
  ] {
    assert_closed_outward(&apply(kind, &cube), kind.name());
  }
}

#[test]
fn test_join_and_composites_stay_closed() {
  let cube = cube();
  for kind in [
    OperatorKind::Join,
    OperatorKind::Bevel,
    OperatorKind::Needle,
    OperatorKind::Meta,
    OperatorKind::Snub,
    OperatorKind::Exalt,
    OperatorKind::Yank,
  ] {
    let mesh = apply(kind, &cube);
    assert!(!mesh.has_naked_edges(), "{kind}");
    assert_eq!(euler(&mesh), 2, "{kind}");
  }
}

#[test]
fn test_composite_equals_sequence_of_primitives() {
  let cube = cube();
  let args = OperatorInstance::new(OperatorKind::Zip).args().unwrap();
  let step_by_step = conway::dual(&conway::kis(&cube, &args).unwrap(), &args).unwrap();
  assert_eq!(ConwayLibrary.apply(OperatorKind::Zip, &cube, &args).unwrap(), step_by_step);
}

#[test]
fn test_dual_of_dual_restores_face_count() {
  let cube = cube();
  let twice = apply(OperatorKind::Dual, &apply(OperatorKind::Dual, &cube));
  assert_eq!(twice.face_count(), cube.face_count());
  assert_eq!(twice.vertex_count(), cube.vertex_count());
}

#[test]
fn test_kis_respects_face_selection() {
  let cube = cube();
  let args = OperatorInstance::new(OperatorKind::Kis)
    .with_faces(FaceSelection::FacingUp)
    .args()
    .unwrap();
  let mesh = ConwayLibrary.apply(OperatorKind::Kis, &cube, &args).unwrap();
  // One quad raised into four triangles, five left alone
  assert_eq!(mesh.face_count(), 9);
  assert_eq!(mesh.count_selected(FaceSelection::Ignored), 5);
  assert_eq!(mesh.count_selected(FaceSelection::AllNew), 4);
}

#[test]
fn test_kis_apex_follows_amount() {
  let cube = cube();
  let args = OpArgs {
    amount: 0.5,
    ..OpArgs::default()
  };
  let mesh = conway::kis(&cube, &args).unwrap();
  let (min, max) = mesh.bounds();
  assert!((max - Vec3::splat(1.5)).length() < 1e-5);
  assert!((min + Vec3::splat(1.5)).length() < 1e-5);
}

#[test]
fn test_extrude_detaches_selected_faces() {
  let mesh = apply(OperatorKind::Extrude, &cube());
  assert_eq!(mesh.face_count(), 6 + 24);
  assert!(mesh.has_naked_edges());
}

// =============================================================================
// Batch 3: Transforms
// =============================================================================

#[test]
fn test_face_remove_and_keep_are_complements() {
  let cube = cube();
  let args = OperatorInstance::new(OperatorKind::FaceRemove)
    .with_faces(FaceSelection::FacingUp)
    .args()
    .unwrap();
  let removed = ConwayLibrary.apply(OperatorKind::FaceRemove, &cube, &args).unwrap();
  let kept = ConwayLibrary.apply(OperatorKind::FaceKeep, &cube, &args).unwrap();
  assert_eq!(removed.face_count(), 5);
  assert_eq!(kept.face_count(), 1);
  assert_eq!(kept.vertex_count(), 4);
}

#[test]
fn test_fill_holes_closes_removed_face() {
  let cube = cube();
  let args = OpArgs {
    faces: FaceSelection::FacingUp,
    ..OpArgs::default()
  };
  let open = transforms::face_remove(&cube, &args).unwrap();
  assert!(open.has_naked_edges());
  let filled = transforms::fill_holes(&open, &args).unwrap();
  assert_eq!(filled.face_count(), 6);
  assert_closed_outward(&filled, "fill_holes");
  assert_eq!(filled.face_role(5), Role::New);
}

#[test]
fn test_face_scale_then_weld_restores_cube() {
  let cube = cube();
  let split = transforms::face_scale(&cube, &OpArgs::default()).unwrap();
  assert_eq!(split.vertex_count(), 24);
  assert!(split.has_naked_edges());

  let welded = transforms::weld(
    &split,
    &OpArgs {
      amount: 0.001,
      ..OpArgs::default()
    },
  )
  .unwrap();
  assert_eq!(welded.vertex_count(), 8);
  assert_closed_outward(&welded, "weld");
}

#[test]
fn test_weld_drops_collapsed_faces() {
  let positions = vec![Vec3::ZERO, Vec3::new(0.0001, 0.0, 0.0), Vec3::Z, Vec3::X];
  let mesh = PolyMesh::from_faces(positions, &[[0, 1, 2], [0, 2, 3]], &[Role::Existing; 2]).unwrap();
  let welded = transforms::weld(
    &mesh,
    &OpArgs {
      amount: 0.01,
      ..OpArgs::default()
    },
  )
  .unwrap();
  assert_eq!(welded.face_count(), 1);
  assert_eq!(welded.vertex_count(), 3);
}

#[test]
fn test_add_mirror_doubles_faces_and_keeps_orientation() {
  let cube = cube();
  let mesh = transforms::add_mirror_x(
    &cube,
    &OpArgs {
      amount: 4.0,
      ..OpArgs::default()
    },
  )
  .unwrap();
  assert_eq!(mesh.face_count(), 12);
  let (min, max) = mesh.bounds();
  assert!((max.x - 5.0).abs() < 1e-5);
  assert!((min.x + 1.0).abs() < 1e-5);
  // Mirrored copy still faces away from its own centre
  let centre = Vec3::new(4.0, 0.0, 0.0);
  for face in 6..12 {
    assert!(mesh.normal(face).dot(mesh.centroid(face) - centre) > 0.0);
  }
}

#[test]
fn test_add_dual_appends_scaled_dual() {
  let mesh = apply(OperatorKind::AddDual, &cube());
  assert_eq!(mesh.face_count(), 6 + 8);
  assert_eq!(mesh.vertex_count(), 8 + 6);
}

#[test]
fn test_placement_transforms() {
  let cube = cube();
  let raised = cube.map_positions(|p| p + Vec3::new(2.0, 3.0, 4.0));

  let centred = transforms::recenter(&raised, &OpArgs::default()).unwrap();
  let (min, max) = centred.bounds();
  assert!((min + max).length() < 1e-5);

  let level = transforms::sit_level(&raised, &OpArgs::default()).unwrap();
  assert!(level.bounds().0.y.abs() < 1e-6);

  let tall = transforms::stretch(
    &cube,
    &OpArgs {
      amount: 2.0,
      ..OpArgs::default()
    },
  )
  .unwrap();
  assert_eq!(tall.bounds().1.y, 2.0);
}

#[test]
fn test_spherize_moves_vertices_onto_unit_sphere() {
  let mesh = apply(OperatorKind::Spherize, &cube());
  for v in mesh.vertices() {
    assert!((v.position.length() - 1.0).abs() < 1e-5);
  }
}

#[test]
fn test_vertex_scale_only_touches_selected_vertices() {
  let cube = cube();
  let args = OpArgs {
    amount: 1.0,
    faces: FaceSelection::FacingUp,
    randomize: false,
  };
  let mesh = transforms::vertex_scale(&cube, &args).unwrap();
  let (min, max) = mesh.bounds();
  assert_eq!(max.y, 2.0);
  assert_eq!(min.y, -1.0);
}

// =============================================================================
// Batch 4: Instances and keys
// =============================================================================

#[test]
fn test_effective_amount_uses_animation_override() {
  let mut op = OperatorInstance::new(OperatorKind::Kis).with_amount(0.2);
  op.animated_amount = 0.4;
  assert_eq!(op.effective_amount(), 0.2);
  op.animate = true;
  assert_eq!(op.effective_amount(), 0.4);
}

#[test]
fn test_args_clamp_amount() {
  let op = OperatorInstance::new(OperatorKind::Join).with_amount(9.0);
  assert_eq!(op.args().unwrap().amount, 2.0);
}

#[test]
fn test_args_ignore_unused_selector_and_randomize() {
  let op = OperatorInstance::new(OperatorKind::Gyro)
    .with_faces(FaceSelection::FacingUp)
    .randomized();
  let args = op.args().unwrap();
  assert_eq!(args.faces, FaceSelection::All);
  assert!(!args.randomize);
}

#[test]
fn test_cache_fragment_normalises_unused_fields() {
  let plain = OperatorInstance::new(OperatorKind::Dual);
  let noisy = OperatorInstance::new(OperatorKind::Dual)
    .with_amount(3.0)
    .with_faces(FaceSelection::FacingUp);
  assert_eq!(plain.cache_fragment(), noisy.cache_fragment());
}

#[test]
fn test_cache_fragment_tracks_output_fields() {
  let base = OperatorInstance::new(OperatorKind::Kis);
  let amount = base.clone().with_amount(0.3);
  let faces = base.clone().with_faces(FaceSelection::ThreeSided);
  let random = base.clone().randomized();
  let key = base.cache_fragment().unwrap();
  for other in [amount, faces, random] {
    assert_ne!(key, other.cache_fragment().unwrap());
  }
}

#[test]
fn test_cache_fragment_ignores_animation_rate() {
  let a = OperatorInstance::new(OperatorKind::Kis).with_animation(1.0, 0.5);
  let b = OperatorInstance::new(OperatorKind::Kis).with_animation(3.0, 0.9);
  assert_eq!(a.cache_fragment(), b.cache_fragment());
}
