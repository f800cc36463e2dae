//! Polyhydra - pipeline owner.
//!
//! Holds the editable description of one polyhedron (shape, operator chain,
//! appearance flags), hands snapshots of it to the generation controller and
//! keeps the last mesh that built successfully. A failed rebuild never
//! replaces the displayed mesh.

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;
use tracing::error;

use crate::constants::ANIMATION_PHASE_SCALE;
use crate::error::PipelineError;
use crate::metrics::GenerationMetrics;
use crate::operators::{config_for, random_operator, sanitize, OperatorInstance};
use crate::pipeline::{
    GeneratedMesh, GenerationController, GenerationRequest, GenerationResult, PipelineContext,
    RequestOutcome,
};
use crate::settings::GeneratorSettings;
use crate::shapes::ShapeDescriptor;
use crate::types::ColorMethod;

/// Result of a rebuild or of delivering a background result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebuildStatus {
    /// A new mesh is current.
    Completed,
    /// Running in the background; `tick` delivers it.
    Started,
    /// A rebuild was already running.
    Rejected,
    /// The build failed; the previous mesh stays current.
    Failed,
}

/// Generator state for one polyhedron.
pub struct Polyhydra {
    pub shape: ShapeDescriptor,
    operators: Vec<OperatorInstance>,
    pub color_method: ColorMethod,
    pub two_sided: bool,
    /// Tessellate the base shape, ignoring the operator chain.
    pub bypass_ops: bool,
    /// Host-side material preset, carried through presets untouched.
    pub appearance_preset_name: String,

    settings: GeneratorSettings,
    context: PipelineContext,
    controller: GenerationController,
    /// Filled by the controller callback on this thread.
    delivered: Rc<RefCell<Option<GenerationResult>>>,

    last_good: Option<GeneratedMesh>,
    last_error: Option<PipelineError>,
    pub metrics: GenerationMetrics,
}

impl Default for Polyhydra {
    fn default() -> Self {
        Self::new(ShapeDescriptor::default())
    }
}

impl Polyhydra {
    pub fn new(shape: ShapeDescriptor) -> Self {
        Self::with_settings(shape, GeneratorSettings::default())
    }

    pub fn with_settings(shape: ShapeDescriptor, settings: GeneratorSettings) -> Self {
        let context = PipelineContext::new().with_caching(settings.enable_caching);
        Self {
            shape,
            operators: Vec::new(),
            color_method: ColorMethod::default(),
            two_sided: false,
            bypass_ops: false,
            appearance_preset_name: String::new(),
            settings,
            context,
            controller: GenerationController::new(),
            delivered: Rc::new(RefCell::new(None)),
            last_good: None,
            last_error: None,
            metrics: GenerationMetrics::new(),
        }
    }

    /// Replace the pipeline collaborators, e.g. to share a cache.
    pub fn with_context(mut self, context: PipelineContext) -> Self {
        self.context = context.with_caching(self.settings.enable_caching);
        self
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: GeneratorSettings) {
        self.context.caching = settings.enable_caching;
        self.settings = settings;
    }

    /// Switch to synchronous, uncached rebuilds.
    pub fn disable_interactive_flags(&mut self) {
        self.settings.enable_threading = false;
        self.settings.enable_caching = false;
        self.context.caching = false;
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    // =========================================================================
    // Operator chain
    // =========================================================================

    pub fn operators(&self) -> &[OperatorInstance] {
        &self.operators
    }

    /// Replace the whole chain. Every instance is sanitised.
    pub fn set_operators(&mut self, operators: Vec<OperatorInstance>) {
        self.operators = operators;
        self.operators.iter_mut().for_each(sanitize);
    }

    /// Replace the instance at `index`, returning the old one.
    pub fn set_operator(&mut self, index: usize, mut op: OperatorInstance) -> Option<OperatorInstance> {
        let slot = self.operators.get_mut(index)?;
        sanitize(&mut op);
        Some(std::mem::replace(slot, op))
    }

    pub fn push_operator(&mut self, mut op: OperatorInstance) {
        sanitize(&mut op);
        self.operators.push(op);
    }

    pub fn remove_operator(&mut self, index: usize) -> Option<OperatorInstance> {
        (index < self.operators.len()).then(|| self.operators.remove(index))
    }

    /// Append a random operator suited to the current mesh.
    pub fn push_random_operator<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &OperatorInstance {
        let op = match &self.last_good {
            Some(generated) => random_operator(rng, &generated.poly),
            None => random_operator(rng, &crate::mesh::PolyMesh::default()),
        };
        self.push_operator(op);
        &self.operators[self.operators.len() - 1]
    }

    // =========================================================================
    // Rebuild
    // =========================================================================

    /// Snapshot of everything a rebuild needs.
    pub fn request(&self) -> GenerationRequest {
        let tessellate = self
            .settings
            .tessellate_config()
            .with_color_method(self.color_method)
            .with_two_sided(self.two_sided);
        GenerationRequest::new(self.shape)
            .with_operators(self.operators.clone())
            .with_bypass_ops(self.bypass_ops)
            .with_tessellate(tessellate)
    }

    /// Rebuild the mesh, in the background when threading is enabled.
    pub fn rebuild(&mut self) -> RebuildStatus {
        let delivered = Rc::clone(&self.delivered);
        let outcome = self.controller.request(
            &self.context,
            self.request(),
            self.settings.enable_threading,
            move |result| {
                *delivered.borrow_mut() = Some(result);
            },
        );

        match outcome {
            RequestOutcome::Started => RebuildStatus::Started,
            RequestOutcome::Rejected => {
                self.metrics.record_rejection();
                RebuildStatus::Rejected
            }
            RequestOutcome::Completed => self.take_delivered().unwrap_or(RebuildStatus::Failed),
        }
    }

    /// Deliver a finished background build, if any.
    pub fn tick(&mut self) -> Option<RebuildStatus> {
        if !self.controller.poll() {
            return None;
        }
        self.take_delivered()
    }

    /// Block until the in-flight build finishes.
    pub fn wait(&mut self) -> Option<RebuildStatus> {
        if !self.controller.wait() {
            return None;
        }
        self.take_delivered()
    }

    pub fn is_building(&self) -> bool {
        self.controller.is_busy()
    }

    fn take_delivered(&mut self) -> Option<RebuildStatus> {
        let result = self.delivered.borrow_mut().take()?;
        Some(match result {
            Ok(generated) => {
                self.metrics.record_build(&generated.stats);
                self.last_good = Some(generated);
                self.last_error = None;
                RebuildStatus::Completed
            }
            Err(err) => {
                error!(error = %err, "Rebuild failed; keeping previous mesh");
                self.metrics.record_failure();
                self.last_error = Some(err);
                RebuildStatus::Failed
            }
        })
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Last successfully built mesh.
    pub fn mesh(&self) -> Option<&GeneratedMesh> {
        self.last_good.as_ref()
    }

    /// Error from the most recent build, cleared by the next success.
    pub fn last_error(&self) -> Option<&PipelineError> {
        self.last_error.as_ref()
    }

    pub fn face_count(&self) -> usize {
        self.last_good.as_ref().map_or(0, |g| g.face_count)
    }

    pub fn vertex_count(&self) -> usize {
        self.last_good.as_ref().map_or(0, |g| g.vertex_count)
    }

    pub fn info_text(&self) -> String {
        format!("Faces: {}\nVertices: {}", self.face_count(), self.vertex_count())
    }

    /// Uniform scale fitting the mesh into a 2-unit box.
    ///
    /// `None` when rescaling is off, nothing is built, or the bounds are empty.
    pub fn rescale_factor(&self) -> Option<f32> {
        if !self.settings.rescale {
            return None;
        }
        let max_dimension = self.last_good.as_ref()?.mesh.bounds.max_dimension();
        let scale = 2.0 / max_dimension;
        (scale.is_finite() && scale > 0.0).then_some(scale)
    }

    // =========================================================================
    // Animation
    // =========================================================================

    /// Advance animated amounts to `frame`. Returns whether any changed
    /// instance is animating; the caller decides whether to rebuild.
    pub fn animate(&mut self, frame: u64) -> bool {
        let mut animated = false;
        for op in &mut self.operators {
            if !op.is_enabled() || !op.animate || !config_for(op.kind).uses_amount {
                continue;
            }
            let phase = (frame as f32 * op.animation_rate * ANIMATION_PHASE_SCALE).sin();
            let offset = (phase * op.animation_amplitude * 100.0).round() / 100.0;
            op.animated_amount = op.amount + offset;
            animated = true;
        }
        animated
    }
}
