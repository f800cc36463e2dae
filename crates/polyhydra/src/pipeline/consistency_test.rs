//! Consistency tests for the full generation pipeline.
//!
//! Runs a spread of shapes and operator chains through every stage and checks
//! the properties that must hold regardless of caching, threading or the
//! order in which chains were built.

use std::sync::Arc;

use crate::error::{PipelineError, TessellateError};
use crate::mesh::FaceSelection;
use crate::operators::{OperatorInstance, OperatorKind};
use crate::pipeline::async_process::{GenerationController, RequestOutcome};
use crate::pipeline::cache::GenerationCache;
use crate::pipeline::process::run_generation;
use crate::pipeline::test_utils::*;
use crate::pipeline::types::{GenerationRequest, PipelineContext};
use crate::preset::Preset;
use crate::shapes::{GridKind, JohnsonKind, PlatonicKind, ShapeDescriptor};

// =============================================================================
// Fixtures
// =============================================================================

fn shapes() -> Vec<ShapeDescriptor> {
    vec![
        ShapeDescriptor::Platonic(PlatonicKind::Cube),
        ShapeDescriptor::Platonic(PlatonicKind::Dodecahedron),
        ShapeDescriptor::Johnson {
            kind: JohnsonKind::Prism,
            sides: 5,
        },
        ShapeDescriptor::Grid {
            kind: GridKind::Square,
            columns: 3,
            rows: 2,
        },
    ]
}

fn chains() -> Vec<Vec<OperatorInstance>> {
    vec![
        Vec::new(),
        kis_dual_ambo(),
        vec![op(OperatorKind::Truncate).with_amount(0.3), op(OperatorKind::Gyro)],
        vec![op(OperatorKind::Zip), op(OperatorKind::Expand)],
        vec![
            op(OperatorKind::Kis).with_faces(FaceSelection::FourSided),
            op(OperatorKind::Extrude).with_amount(0.2),
        ],
        vec![op(OperatorKind::Snub), op(OperatorKind::Spherize)],
    ]
}

fn requests() -> Vec<GenerationRequest> {
    let mut out = Vec::new();
    for shape in shapes() {
        for chain in chains() {
            out.push(GenerationRequest::new(shape).with_operators(chain));
        }
    }
    out
}

fn fresh_context() -> PipelineContext {
    PipelineContext::new().with_cache(GenerationCache::shared())
}

// =============================================================================
// Determinism and cache transparency
// =============================================================================

#[test]
fn test_cold_and_warm_runs_are_bit_identical() {
    let warm_ctx = fresh_context();
    for request in requests() {
        let cold = run_generation(&fresh_context(), &request).unwrap();
        let first = run_generation(&warm_ctx, &request).unwrap();
        let warm = run_generation(&warm_ctx, &request).unwrap();

        assert_eq!(*cold.mesh, *first.mesh, "{:?}", request.shape);
        assert_eq!(*cold.mesh, *warm.mesh, "{:?}", request.shape);
        assert!(warm.stats.mesh_cached);
    }
}

#[test]
fn test_disabling_the_cache_never_changes_output() {
    let cached = fresh_context();
    let uncached = PipelineContext::new().with_caching(false);

    for request in requests() {
        let a = run_generation(&cached, &request).unwrap();
        let b = run_generation(&uncached, &request).unwrap();
        assert_eq!(*a.mesh, *b.mesh, "{:?} {:?}", request.shape, request.operators);
        assert_eq!(a.face_count, b.face_count);
    }
    assert!(uncached.cache.is_empty());
}

#[test]
fn test_warm_cache_from_other_chains_is_transparent() {
    // Populate prefixes in one order, read them back through longer chains
    let ctx = fresh_context();
    let mut all = requests();
    for request in &all {
        run_generation(&ctx, request).unwrap();
    }
    all.reverse();
    let uncached = PipelineContext::new().with_caching(false);
    for request in &all {
        let a = run_generation(&ctx, request).unwrap();
        let b = run_generation(&uncached, request).unwrap();
        assert_eq!(*a.mesh, *b.mesh);
    }
}

// =============================================================================
// Prefix reuse
// =============================================================================

#[test]
fn test_longer_chain_reuses_shorter_prefix() {
    let library = Arc::new(CountingLibrary::new());
    let ctx = context_with(library.clone());

    let a = cube_request(kis_dual_ambo()[..2].to_vec());
    let b = cube_request(kis_dual_ambo());

    run_generation(&ctx, &a).unwrap();
    let result = run_generation(&ctx, &b).unwrap();

    assert_eq!(result.stats.steps_cached, 2);
    assert_eq!(result.stats.steps_applied, 1);
    assert_eq!(library.count(OperatorKind::Kis), 1);
    assert_eq!(library.count(OperatorKind::Dual), 1);
    assert_eq!(library.total(), 3);
}

#[test]
fn test_randomized_step_is_memoized_by_configuration() {
    let ctx = fresh_context();
    let request = cube_request(vec![op(OperatorKind::Kis).randomized(), op(OperatorKind::Dual)]);

    let first = run_generation(&ctx, &request).unwrap();
    let second = run_generation(&ctx, &request).unwrap();

    assert!(second.stats.mesh_cached);
    assert!(Arc::ptr_eq(&first.poly, &second.poly));
}

// =============================================================================
// Disabled instances
// =============================================================================

#[test]
fn test_disabled_instance_is_invisible() {
    let ctx = PipelineContext::new().with_caching(false);
    let plain = kis_dual_ambo();

    for position in 0..=plain.len() {
        let mut padded = plain.clone();
        padded.insert(position, op(OperatorKind::Bevel).with_disabled(true));

        let a = run_generation(&ctx, &cube_request(plain.clone())).unwrap();
        let b = run_generation(&ctx, &cube_request(padded)).unwrap();
        assert_eq!(*a.mesh, *b.mesh, "disabled at {position}");
    }
}

#[test]
fn test_disabled_instance_shares_cache_entries() {
    let library = Arc::new(CountingLibrary::new());
    let ctx = context_with(library.clone());

    let mut padded = kis_dual_ambo();
    padded.insert(0, op(OperatorKind::Ortho).with_disabled(true));

    run_generation(&ctx, &cube_request(kis_dual_ambo())).unwrap();
    let result = run_generation(&ctx, &cube_request(padded)).unwrap();

    assert!(result.stats.mesh_cached);
    assert_eq!(library.total(), 3);
}

// =============================================================================
// Triangle count law
// =============================================================================

#[test]
fn test_triangle_count_law() {
    let ctx = fresh_context();
    for request in requests() {
        for two_sided in [false, true] {
            let request = request
                .clone()
                .with_tessellate(request.tessellate.clone().with_two_sided(two_sided));
            let result = run_generation(&ctx, &request).unwrap();

            let poly = &result.poly;
            let per_side: usize = (0..poly.face_count())
                .map(|f| match poly.sides(f) {
                    3 => 1,
                    n => n,
                })
                .sum();
            let factor = if two_sided || poly.has_naked_edges() { 2 } else { 1 };

            assert_eq!(result.mesh.triangle_count(), per_side * factor, "{:?}", request.shape);
        }
    }
}

// =============================================================================
// Single flight
// =============================================================================

#[test]
fn test_in_flight_result_unaffected_by_rejected_request() {
    let (release, gate) = crossbeam_channel::unbounded();
    let ctx = context_with(Arc::new(GatedLibrary::new(gate)));
    let mut controller = GenerationController::new();

    let delivered = std::rc::Rc::new(std::cell::RefCell::new(None));
    let sink = delivered.clone();
    let request = cube_request(kis_dual_ambo());
    let outcome = controller.request(&ctx, request.clone(), true, move |result| {
        *sink.borrow_mut() = Some(result);
    });
    assert_eq!(outcome, RequestOutcome::Started);

    for _ in 0..3 {
        let outcome = controller.request(&ctx, cube_request(vec![op(OperatorKind::Meta)]), true, |_| {
            panic!("rejected request must not call back");
        });
        assert_eq!(outcome, RequestOutcome::Rejected);
    }

    for _ in 0..3 {
        release.send(()).unwrap();
    }
    assert!(controller.wait());

    let expected = run_generation(&PipelineContext::new().with_caching(false), &request).unwrap();
    let got = delivered.borrow_mut().take().unwrap().unwrap();
    assert_eq!(*got.mesh, *expected.mesh);
}

// =============================================================================
// Preset round-trip
// =============================================================================

#[test]
fn test_preset_round_trip_preserves_chain() {
    let chain = vec![
        op(OperatorKind::Kis).with_amount(0.1).with_faces(FaceSelection::All),
        op(OperatorKind::Dual),
        op(OperatorKind::Ambo).with_disabled(true),
        op(OperatorKind::Extrude)
            .with_amount(0.123)
            .with_faces(FaceSelection::FacingUp)
            .randomized()
            .with_animation(2.0, 0.25),
    ];
    let preset = Preset::new("roundtrip", ShapeDescriptor::Platonic(PlatonicKind::Octahedron), &chain);

    let restored = Preset::from_json(&preset.to_json().unwrap()).unwrap();

    assert_eq!(restored, preset);
    assert_eq!(restored.operators().unwrap(), chain);
    assert_eq!(restored.shape, preset.shape);
}

// =============================================================================
// Boundary shapes
// =============================================================================

#[test]
fn test_single_face_boundary() {
    let ctx = PipelineContext::new().with_caching(false);

    for sides in [1, 2] {
        let request = GenerationRequest::new(ShapeDescriptor::Polygon { sides });
        assert_eq!(
            run_generation(&ctx, &request).unwrap_err(),
            PipelineError::Tessellation(TessellateError::DegenerateFace {
                face: 0,
                sides: sides as usize
            })
        );
    }

    let triangle = run_generation(&ctx, &GenerationRequest::new(ShapeDescriptor::Polygon { sides: 3 })).unwrap();
    // One face, open, so both sides are emitted
    assert_eq!(triangle.mesh.triangle_count(), 2);

    let hexagon = run_generation(&ctx, &GenerationRequest::new(ShapeDescriptor::Polygon { sides: 6 })).unwrap();
    assert_eq!(hexagon.mesh.triangle_count(), 12);
}
