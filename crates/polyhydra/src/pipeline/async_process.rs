//! Background Generation Controller
//!
//! Single-flight wrapper around [`run_generation`]. At most one worker runs
//! at a time; its result is handed to the request's callback on the thread
//! that calls [`GenerationController::poll`].
//!
//! # Flow
//!
//! ```text
//! Owner thread                        Worker (rayon)
//! ┌─────────────────┐
//! │ request()       │  Idle ──► Running
//! │ snapshot inputs │
//! └───────┬─────────┘
//!         │ spawn
//!         ▼
//!                                     ┌──────────────────┐
//!                                     │ run_generation() │
//!                                     │ base, chain,     │
//!                                     │ tessellate       │
//!                                     └────────┬─────────┘
//!                                              │ bounded(1)
//! ┌─────────────────┐                          │
//! │ poll()          │◄─────────────────────────┘
//! │ Running ──► Completing ──► callback ──► Idle
//! └─────────────────┘
//! ```
//!
//! A request made while a job is in flight is rejected, never queued. The
//! synchronous mode runs inline and calls back before `request` returns.
//!
//! # Usage
//!
//! ```ignore
//! let mut controller = GenerationController::new();
//! controller.request(&ctx, request, true, |result| match result {
//!     Ok(generated) => upload(generated.mesh),
//!     Err(err) => report(err),
//! });
//!
//! // Each frame
//! controller.poll();
//! ```

use std::panic::{self, AssertUnwindSafe};

use crossbeam_channel::{self as channel, Receiver, TryRecvError};
use tracing::warn;

use super::process::run_generation;
use super::types::{GenerationRequest, GeneratedMesh, PipelineContext};
use crate::error::PipelineError;

pub type GenerationResult = Result<GeneratedMesh, PipelineError>;

/// Invoked exactly once per accepted request, on the polling thread.
pub type CompletionCallback = Box<dyn FnOnce(GenerationResult)>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControllerState {
    #[default]
    Idle,
    Running,
    /// Result received, callback executing.
    Completing,
}

/// What happened to a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Worker spawned; the callback fires from a later `poll`.
    Started,
    /// A job was already in flight; nothing was spawned.
    Rejected,
    /// Ran synchronously; the callback has already fired.
    Completed,
}

/// Non-blocking, single-flight generation controller.
#[derive(Default)]
pub struct GenerationController {
    /// Receiver for the pending result.
    receiver: Option<Receiver<GenerationResult>>,
    callback: Option<CompletionCallback>,
    state: ControllerState,
    rejected: u64,
}

impl GenerationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Check if a job is in flight.
    pub fn is_busy(&self) -> bool {
        self.state != ControllerState::Idle
    }

    /// Requests turned away because a job was in flight.
    pub fn rejected_count(&self) -> u64 {
        self.rejected
    }

    /// Start a rebuild.
    ///
    /// With `background` unset the pipeline runs inline. Either way a busy
    /// controller rejects the request and drops `callback` uncalled.
    pub fn request<F>(
        &mut self,
        ctx: &PipelineContext,
        request: GenerationRequest,
        background: bool,
        callback: F,
    ) -> RequestOutcome
    where
        F: FnOnce(GenerationResult) + 'static,
    {
        if self.is_busy() {
            self.rejected += 1;
            warn!(state = ?self.state, "Rebuild requested while a job is in flight; ignoring");
            return RequestOutcome::Rejected;
        }

        if !background {
            self.state = ControllerState::Completing;
            let _idle = IdleOnDrop(&mut self.state);
            callback(run_guarded(ctx, &request));
            return RequestOutcome::Completed;
        }

        let (sender, receiver) = channel::bounded(1);
        self.receiver = Some(receiver);
        self.callback = Some(Box::new(callback));
        self.state = ControllerState::Running;

        let ctx = ctx.clone();
        rayon::spawn(move || {
            let result = run_guarded(&ctx, &request);
            // Receiver dropped = controller gone
            let _ = sender.send(result);
        });

        RequestOutcome::Started
    }

    /// Deliver a finished result, if any (non-blocking).
    ///
    /// Returns `true` when a callback ran.
    pub fn poll(&mut self) -> bool {
        let Some(receiver) = self.receiver.as_ref() else {
            return false;
        };

        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(PipelineError::WorkerLost),
        };
        self.complete(result);
        true
    }

    /// Block until the in-flight job finishes and deliver it.
    ///
    /// Returns `false` when nothing was running.
    pub fn wait(&mut self) -> bool {
        let Some(receiver) = self.receiver.as_ref() else {
            return false;
        };

        let result = receiver.recv().unwrap_or(Err(PipelineError::WorkerLost));
        self.complete(result);
        true
    }

    fn complete(&mut self, result: GenerationResult) {
        self.receiver = None;
        self.state = ControllerState::Completing;
        let callback = self.callback.take();
        let _idle = IdleOnDrop(&mut self.state);
        if let Some(callback) = callback {
            callback(result);
        }
    }
}

/// Run the pipeline, turning a panic into [`PipelineError::WorkerLost`].
fn run_guarded(ctx: &PipelineContext, request: &GenerationRequest) -> GenerationResult {
    panic::catch_unwind(AssertUnwindSafe(|| run_generation(ctx, request))).unwrap_or(Err(PipelineError::WorkerLost))
}

/// Returns the controller to idle even if the callback unwinds.
struct IdleOnDrop<'a>(&'a mut ControllerState);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        *self.0 = ControllerState::Idle;
    }
}
