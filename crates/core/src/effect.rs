//! The core `Effect` trait that every background animation implements.
//!
//! The trait is object-safe so effects can be used as `Box<dyn Effect>` and
//! driven by one [`FrameScheduler`](crate::scheduler::FrameScheduler)
//! regardless of which effect is mounted.

use serde_json::Value;

use crate::pointer::PointerSource;
use crate::surface::{Rect, Surface};

/// A procedural animation advanced one tick at a time.
///
/// `update` and `render` never fail. An empty `bounds` rectangle makes
/// `update` a no-op, and after [`Effect::dispose`] both are no-ops.
pub trait Effect {
    /// Registry name of the effect, e.g. `"particle-network"`.
    fn name(&self) -> &'static str;

    /// Advances the simulation by one fixed step.
    ///
    /// `bounds` is the surface rectangle read for this tick; pointer input is
    /// converted against it.
    fn update(&mut self, bounds: Rect);

    /// Draws the current state.
    fn render(&self, surface: &mut dyn Surface);

    /// Hands the effect a pointer source.
    ///
    /// An effect whose interactivity is switched off drops the source at
    /// once, which detaches the listener. Returns whether it was kept.
    fn attach_pointer(&mut self, source: Box<dyn PointerSource>) -> bool;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;

    /// Releases the pointer listener and stops all further mutation.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

impl<E: Effect + ?Sized> Effect for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn update(&mut self, bounds: Rect) {
        (**self).update(bounds)
    }

    fn render(&self, surface: &mut dyn Surface) {
        (**self).render(surface)
    }

    fn attach_pointer(&mut self, source: Box<dyn PointerSource>) -> bool {
        (**self).attach_pointer(source)
    }

    fn params(&self) -> Value {
        (**self).params()
    }

    fn param_schema(&self) -> Value {
        (**self).param_schema()
    }

    fn dispose(&mut self) {
        (**self).dispose()
    }

    fn is_disposed(&self) -> bool {
        (**self).is_disposed()
    }
}
