//! Pointer input.
//!
//! Effects never listen for pointer events themselves. They hold an optional
//! [`PointerSource`] and read the last-known position once per tick. Client
//! coordinates are converted against the surface rectangle at read time, so a
//! scroll or resize between ticks is always honored.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use glam::DVec2;

use crate::surface::Rect;

/// An immutable pointer reading in client (viewport) pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSnapshot {
    pub client: DVec2,
}

impl PointerSnapshot {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            client: DVec2::new(x, y),
        }
    }

    /// Position in pixels relative to the top-left corner of `rect`.
    pub fn local(&self, rect: &Rect) -> DVec2 {
        rect.to_local(self.client)
    }

    /// Position as [0, 1] fractions of `rect`; `None` when `rect` is empty.
    pub fn unit(&self, rect: &Rect) -> Option<DVec2> {
        rect.to_unit(self.client)
    }

    /// Position in 0–100 percentage space of `rect`.
    pub fn percent(&self, rect: &Rect) -> Option<DVec2> {
        rect.to_percent(self.client)
    }
}

/// Anything that can report the last-known pointer position.
///
/// `read` returns `None` until the pointer has moved at least once.
pub trait PointerSource {
    fn read(&mut self) -> Option<PointerSnapshot>;
}

type Slot = Cell<Option<PointerSnapshot>>;

/// The host window's pointer-move event target.
///
/// Each [`PointerBinding`] handed out by [`PointerHub::subscribe`] is one
/// attached listener. `dispatch` overwrites every live listener's cell; the
/// last write wins and nothing is queued. Clones share the same listener set.
#[derive(Debug, Clone, Default)]
pub struct PointerHub {
    listeners: Rc<RefCell<Vec<Weak<Slot>>>>,
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a new listener.
    pub fn subscribe(&self) -> PointerBinding {
        let slot = Rc::new(Cell::new(None));
        let mut listeners = self.listeners.borrow_mut();
        listeners.retain(|w| w.strong_count() > 0);
        listeners.push(Rc::downgrade(&slot));
        tracing::debug!(listeners = listeners.len(), "pointer listener attached");
        PointerBinding { slot }
    }

    /// Delivers a pointer-move event to every attached listener.
    pub fn dispatch(&self, x: f64, y: f64) {
        let snapshot = PointerSnapshot::new(x, y);
        let mut listeners = self.listeners.borrow_mut();
        listeners.retain(|w| match w.upgrade() {
            Some(slot) => {
                slot.set(Some(snapshot));
                true
            }
            None => false,
        });
    }

    /// Number of listeners currently attached.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

/// One attached pointer listener. Dropping it detaches it from its hub.
#[derive(Debug)]
pub struct PointerBinding {
    slot: Rc<Slot>,
}

impl PointerBinding {
    /// Detaches the listener. Equivalent to dropping the binding.
    pub fn detach(self) {}
}

impl PointerSource for PointerBinding {
    fn read(&mut self) -> Option<PointerSnapshot> {
        self.slot.get()
    }
}

/// Replays a fixed sequence of readings, one per `read`.
///
/// Once the sequence is exhausted the last entry is repeated. An empty
/// script always reads `None`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPointer {
    script: Vec<Option<PointerSnapshot>>,
    cursor: usize,
}

impl ScriptedPointer {
    pub fn new(script: Vec<Option<PointerSnapshot>>) -> Self {
        Self { script, cursor: 0 }
    }

    /// A pointer parked at one client position.
    pub fn fixed(x: f64, y: f64) -> Self {
        Self::new(vec![Some(PointerSnapshot::new(x, y))])
    }

    /// A path of client positions.
    pub fn path(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self::new(
            points
                .into_iter()
                .map(|(x, y)| Some(PointerSnapshot::new(x, y)))
                .collect(),
        )
    }

    /// Number of readings taken so far.
    pub fn reads(&self) -> usize {
        self.cursor
    }
}

impl PointerSource for ScriptedPointer {
    fn read(&mut self) -> Option<PointerSnapshot> {
        let last = self.script.len().checked_sub(1)?;
        let entry = self.script[self.cursor.min(last)];
        self.cursor += 1;
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_reads_none_before_any_move() {
        let hub = PointerHub::new();
        let mut binding = hub.subscribe();
        assert_eq!(binding.read(), None);
    }

    #[test]
    fn last_write_wins() {
        let hub = PointerHub::new();
        let mut binding = hub.subscribe();
        hub.dispatch(1.0, 2.0);
        hub.dispatch(30.0, 40.0);
        assert_eq!(binding.read(), Some(PointerSnapshot::new(30.0, 40.0)));
        // Reading does not consume.
        assert_eq!(binding.read(), Some(PointerSnapshot::new(30.0, 40.0)));
    }

    #[test]
    fn every_binding_receives_dispatch() {
        let hub = PointerHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.clone().subscribe();
        hub.dispatch(5.0, 5.0);
        assert_eq!(a.read(), b.read());
        assert_eq!(hub.listener_count(), 2);
    }

    #[test]
    fn detach_and_drop_remove_listeners() {
        let hub = PointerHub::new();
        let a = hub.subscribe();
        let b = hub.subscribe();
        assert_eq!(hub.listener_count(), 2);
        a.detach();
        assert_eq!(hub.listener_count(), 1);
        drop(b);
        assert_eq!(hub.listener_count(), 0);
        hub.dispatch(1.0, 1.0);
    }

    #[test]
    fn snapshot_conversions_use_given_rect() {
        let p = PointerSnapshot::new(150.0, 60.0);
        let rect = Rect::new(50.0, 10.0, 200.0, 100.0);
        assert_eq!(p.local(&rect), DVec2::new(100.0, 50.0));
        assert_eq!(p.unit(&rect), Some(DVec2::new(0.5, 0.5)));
        assert_eq!(p.percent(&rect), Some(DVec2::new(50.0, 50.0)));
        assert_eq!(p.unit(&Rect::sized(0.0, 10.0)), None);
    }

    #[test]
    fn scripted_pointer_replays_then_holds_last() {
        let mut p = ScriptedPointer::new(vec![None, Some(PointerSnapshot::new(1.0, 2.0))]);
        assert_eq!(p.read(), None);
        assert_eq!(p.read(), Some(PointerSnapshot::new(1.0, 2.0)));
        assert_eq!(p.read(), Some(PointerSnapshot::new(1.0, 2.0)));
        assert_eq!(p.reads(), 3);
    }

    #[test]
    fn empty_script_reads_none() {
        let mut p = ScriptedPointer::default();
        assert_eq!(p.read(), None);
        assert_eq!(p.read(), None);
    }

    #[test]
    fn path_builds_one_reading_per_point() {
        let mut p = ScriptedPointer::path([(0.0, 0.0), (10.0, 0.0)]);
        assert_eq!(p.read().map(|s| s.client.x), Some(0.0));
        assert_eq!(p.read().map(|s| s.client.x), Some(10.0));
    }
}
