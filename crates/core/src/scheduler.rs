//! Per-instance tick loop tied to the host's display-refresh primitive.
//!
//! The host owns the refresh callback. [`FrameScheduler::start`] asks the
//! host for a frame; each time the host fires that frame it calls
//! [`FrameScheduler::on_frame`], which updates and renders the effect and asks
//! for the next one. [`FrameScheduler::dispose`] cancels the pending request
//! and disposes the effect. A frame fired after that, or any frame other than
//! the one currently pending, is ignored.

use crate::effect::Effect;
use crate::surface::Surface;

/// Handle for one requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// The host's display-refresh primitive (`requestAnimationFrame` and
/// `cancelAnimationFrame` in a browser).
pub trait DisplayRefresh {
    fn request_frame(&mut self) -> FrameRequest;
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// A refresh source that fires only when told to. Used headlessly and in tests.
///
/// Holds at most one pending request; a new request replaces the old one.
#[derive(Debug, Clone, Default)]
pub struct ManualRefresh {
    next_id: u64,
    pending: Option<FrameRequest>,
    cancelled: usize,
}

impl ManualRefresh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Takes the pending request so it can be fired.
    pub fn fire(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }

    /// Number of successful cancellations.
    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl DisplayRefresh for ManualRefresh {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Disposed,
}

/// What a fired frame did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The effect was updated and drawn.
    Rendered,
    /// The surface had zero area; nothing ran but the loop continues.
    Skipped,
    /// Not the pending frame, or the scheduler is not running.
    Ignored,
}

/// Drives one effect instance.
#[derive(Debug)]
pub struct FrameScheduler<E: Effect> {
    effect: E,
    state: SchedulerState,
    pending: Option<FrameRequest>,
    ticks: u64,
}

impl<E: Effect> FrameScheduler<E> {
    pub fn new(effect: E) -> Self {
        Self {
            effect,
            state: SchedulerState::Idle,
            pending: None,
            ticks: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Number of rendered ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    pub fn effect_mut(&mut self) -> &mut E {
        &mut self.effect
    }

    /// Requests the first frame. Only has an effect when idle.
    pub fn start(&mut self, refresh: &mut dyn DisplayRefresh) {
        if self.state != SchedulerState::Idle {
            return;
        }
        self.state = SchedulerState::Running;
        self.pending = Some(refresh.request_frame());
        tracing::debug!(effect = self.effect.name(), "frame loop started");
    }

    /// Handles a fired frame.
    pub fn on_frame(
        &mut self,
        request: FrameRequest,
        refresh: &mut dyn DisplayRefresh,
        surface: &mut dyn Surface,
    ) -> TickOutcome {
        if self.state != SchedulerState::Running || self.pending != Some(request) {
            tracing::trace!(?request, state = ?self.state, "ignoring stale frame");
            return TickOutcome::Ignored;
        }
        let bounds = surface.bounds();
        let outcome = if bounds.is_empty() {
            tracing::trace!(width = bounds.width, height = bounds.height, "skipping zero-area tick");
            TickOutcome::Skipped
        } else {
            self.effect.update(bounds);
            self.effect.render(surface);
            self.ticks += 1;
            TickOutcome::Rendered
        };
        self.pending = Some(refresh.request_frame());
        outcome
    }

    /// Cancels the pending frame and disposes the effect. Terminal.
    pub fn dispose(&mut self, refresh: &mut dyn DisplayRefresh) {
        if self.state == SchedulerState::Disposed {
            return;
        }
        if let Some(request) = self.pending.take() {
            refresh.cancel_frame(request);
        }
        self.effect.dispose();
        self.state = SchedulerState::Disposed;
        tracing::debug!(effect = self.effect.name(), ticks = self.ticks, "frame loop disposed");
    }

    /// Starts if needed and fires `frames` frames from `refresh`.
    ///
    /// Returns how many of them rendered.
    pub fn run(&mut self, refresh: &mut ManualRefresh, surface: &mut dyn Surface, frames: usize) -> usize {
        self.start(refresh);
        let mut rendered = 0;
        for _ in 0..frames {
            let Some(request) = refresh.fire() else {
                break;
            };
            if self.on_frame(request, refresh, surface) == TickOutcome::Rendered {
                rendered += 1;
            }
        }
        rendered
    }
}
