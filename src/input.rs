//! Host pointer surface.
//!
//! The host feeds raw pointer events in with [`PointerSurface::dispatch`]; every
//! attached listener gets its own queue and drains it on its own schedule. Wheel
//! input is never routed here so page scrolling is left to the host.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

/// Pointer events in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug)]
pub struct PointerSurface {
    available: Cell<bool>,
    next_id: Cell<u64>,
    listeners: RefCell<HashMap<ListenerId, VecDeque<PointerEvent>>>,
}

impl Default for PointerSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerSurface {
    pub fn new() -> Self {
        Self {
            available: Cell::new(true),
            next_id: Cell::new(0),
            listeners: RefCell::new(HashMap::new()),
        }
    }

    /// A surface that refuses listeners, e.g. before the host has mounted it.
    pub fn unavailable() -> Self {
        let surface = Self::new();
        surface.available.set(false);
        surface
    }

    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    pub fn is_available(&self) -> bool {
        self.available.get()
    }

    /// Register a listener. Returns `None` while the surface is unavailable.
    pub fn attach(&self) -> Option<ListenerId> {
        if !self.is_available() {
            return None;
        }
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().insert(id, VecDeque::new());
        Some(id)
    }

    /// Remove a listener. Detaching twice is harmless.
    pub fn detach(&self, id: ListenerId) -> bool {
        self.listeners.borrow_mut().remove(&id).is_some()
    }

    pub fn dispatch(&self, event: PointerEvent) {
        for queue in self.listeners.borrow_mut().values_mut() {
            queue.push_back(event);
        }
    }

    pub fn drain(&self, id: ListenerId) -> Vec<PointerEvent> {
        self.listeners
            .borrow_mut()
            .get_mut(&id)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_fan_out_to_each_listener() {
        let surface = PointerSurface::new();
        let a = surface.attach().unwrap();
        let b = surface.attach().unwrap();
        surface.dispatch(PointerEvent::Down { x: 1.0, y: 2.0 });
        surface.dispatch(PointerEvent::Up);

        assert_eq!(surface.drain(a).len(), 2);
        assert_eq!(surface.drain(a).len(), 0);
        assert_eq!(surface.drain(b), vec![PointerEvent::Down { x: 1.0, y: 2.0 }, PointerEvent::Up]);
    }

    #[test]
    fn test_detach_stops_delivery() {
        let surface = PointerSurface::new();
        let id = surface.attach().unwrap();
        assert!(surface.detach(id));
        assert!(!surface.detach(id));
        surface.dispatch(PointerEvent::Up);
        assert!(surface.drain(id).is_empty());
        assert_eq!(surface.listener_count(), 0);
    }

    #[test]
    fn test_unavailable_surface_refuses_listeners() {
        let surface = PointerSurface::unavailable();
        assert!(surface.attach().is_none());
        surface.set_available(true);
        assert!(surface.attach().is_some());
    }
}
