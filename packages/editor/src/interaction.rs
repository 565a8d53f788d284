//! # Pointer Interaction
//!
//! A drag or a resize is an explicit state. At most one is active at a time,
//! and the captured pointer is the only one whose events count.
//!
//! ```text
//!            begin_drag               pointer_up / pointer_cancel
//!   Idle ─────────────────► Dragging ────────────────────────────► Idle
//!     │      begin_resize
//!     └───────────────────► Resizing ────────────────────────────► Idle
//! ```
//!
//! Moves are turned into [`Mutation`]s that the session applies; this module
//! never touches the document.

use folio_document::{FloatingItem, Rect};

use crate::geometry::Handle;
use crate::mutations::Mutation;

/// Pointer capture provided by the host surface
pub trait PointerSurface {
    fn capture_pointer(&mut self, pointer_id: i64);
    fn release_pointer(&mut self, pointer_id: i64);
}

/// Surface without pointer capture (headless sessions, tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSurface;

impl PointerSurface for NoopSurface {
    fn capture_pointer(&mut self, _pointer_id: i64) {}
    fn release_pointer(&mut self, _pointer_id: i64) {}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Modifiers {
    /// Disables grid snapping while dragging
    pub alt: bool,
    /// Frees the aspect ratio while resizing, large step while nudging
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    /// Ctrl on most platforms, Cmd on macOS
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: i64,
    pub x: f64,
    pub y: f64,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(pointer_id: i64, x: f64, y: f64) -> Self {
        Self {
            pointer_id,
            x,
            y,
            modifiers: Modifiers::none(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub item_id: String,
    pub pointer_id: i64,
    pub pointer_start: (f64, f64),
    pub start: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeState {
    pub item_id: String,
    pub pointer_id: i64,
    pub handle: Handle,
    pub pointer_start: (f64, f64),
    pub start: Rect,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging(DragState),
    Resizing(ResizeState),
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// Item being dragged or resized
    pub fn active_item(&self) -> Option<&str> {
        match self {
            InteractionState::Idle => None,
            InteractionState::Dragging(drag) => Some(&drag.item_id),
            InteractionState::Resizing(resize) => Some(&resize.item_id),
        }
    }

    pub fn pointer_id(&self) -> Option<i64> {
        match self {
            InteractionState::Idle => None,
            InteractionState::Dragging(drag) => Some(drag.pointer_id),
            InteractionState::Resizing(resize) => Some(resize.pointer_id),
        }
    }

    /// Start dragging `item`; ignored unless idle
    pub fn begin_drag(
        &mut self,
        item: &FloatingItem,
        event: &PointerEvent,
        surface: &mut dyn PointerSurface,
    ) -> bool {
        if !self.is_idle() {
            return false;
        }

        surface.capture_pointer(event.pointer_id);
        *self = InteractionState::Dragging(DragState {
            item_id: item.id.clone(),
            pointer_id: event.pointer_id,
            pointer_start: (event.x, event.y),
            start: item.rect(),
        });
        true
    }

    /// Start resizing `item` from `handle`; ignored unless idle
    pub fn begin_resize(
        &mut self,
        item: &FloatingItem,
        handle: Handle,
        event: &PointerEvent,
        surface: &mut dyn PointerSurface,
    ) -> bool {
        if !self.is_idle() {
            return false;
        }

        surface.capture_pointer(event.pointer_id);
        *self = InteractionState::Resizing(ResizeState {
            item_id: item.id.clone(),
            pointer_id: event.pointer_id,
            handle,
            pointer_start: (event.x, event.y),
            start: item.rect(),
        });
        true
    }

    /// Mutation for the current pointer position
    pub fn pointer_move(&self, event: &PointerEvent) -> Option<Mutation> {
        if self.pointer_id() != Some(event.pointer_id) {
            return None;
        }

        match self {
            InteractionState::Idle => None,
            InteractionState::Dragging(drag) => {
                let (dx, dy) = delta(drag.pointer_start, event);
                Some(Mutation::Move {
                    id: drag.item_id.clone(),
                    x: drag.start.x + dx,
                    y: drag.start.y + dy,
                    snap: !event.modifiers.alt,
                })
            }
            InteractionState::Resizing(resize) => {
                let (dx, dy) = delta(resize.pointer_start, event);
                Some(Mutation::Resize {
                    id: resize.item_id.clone(),
                    handle: resize.handle,
                    delta_x: dx,
                    delta_y: dy,
                    lock_aspect: !event.modifiers.shift,
                    origin: Some(resize.start),
                })
            }
        }
    }

    /// End the interaction for the captured pointer
    ///
    /// Returns whether an interaction ended.
    pub fn pointer_up(&mut self, event: &PointerEvent, surface: &mut dyn PointerSurface) -> bool {
        if self.pointer_id() != Some(event.pointer_id) {
            return false;
        }
        self.reset(surface)
    }

    /// Abort any interaction regardless of pointer
    pub fn pointer_cancel(&mut self, surface: &mut dyn PointerSurface) -> bool {
        self.reset(surface)
    }

    /// Abort the interaction if it targets `item_id`
    pub fn cancel_for_item(&mut self, item_id: &str, surface: &mut dyn PointerSurface) -> bool {
        if self.active_item() != Some(item_id) {
            return false;
        }
        self.reset(surface)
    }

    fn reset(&mut self, surface: &mut dyn PointerSurface) -> bool {
        match self.pointer_id() {
            Some(pointer_id) => {
                surface.release_pointer(pointer_id);
                *self = InteractionState::Idle;
                true
            }
            None => false,
        }
    }
}

fn delta(start: (f64, f64), event: &PointerEvent) -> (f64, f64) {
    (event.x - start.0, event.y - start.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSurface {
        captured: Vec<i64>,
        released: Vec<i64>,
    }

    impl PointerSurface for RecordingSurface {
        fn capture_pointer(&mut self, pointer_id: i64) {
            self.captured.push(pointer_id);
        }

        fn release_pointer(&mut self, pointer_id: i64) {
            self.released.push(pointer_id);
        }
    }

    fn item() -> FloatingItem {
        FloatingItem::image("img-1", "https://x/a.png", Rect::new(100.0, 50.0, 200.0, 100.0), 1)
    }

    #[test]
    fn test_drag_produces_moves_from_start() {
        let mut state = InteractionState::default();
        let mut surface = RecordingSurface::default();

        assert!(state.begin_drag(&item(), &PointerEvent::new(7, 10.0, 10.0), &mut surface));
        assert_eq!(surface.captured, vec![7]);

        let mutation = state.pointer_move(&PointerEvent::new(7, 25.0, 40.0));
        assert_eq!(
            mutation,
            Some(Mutation::Move {
                id: "img-1".to_string(),
                x: 115.0,
                y: 80.0,
                snap: true,
            })
        );
    }

    #[test]
    fn test_alt_disables_snap() {
        let mut state = InteractionState::default();
        state.begin_drag(&item(), &PointerEvent::new(1, 0.0, 0.0), &mut NoopSurface);

        let alt = Modifiers { alt: true, ..Modifiers::none() };
        let event = PointerEvent::new(1, 3.0, 3.0).with_modifiers(alt);
        match state.pointer_move(&event) {
            Some(Mutation::Move { snap, .. }) => assert!(!snap),
            other => panic!("unexpected mutation {:?}", other),
        }
    }

    #[test]
    fn test_resize_carries_origin_and_aspect_lock() {
        let mut state = InteractionState::default();
        state.begin_resize(&item(), Handle::SE, &PointerEvent::new(1, 300.0, 150.0), &mut NoopSurface);

        let shift = Modifiers { shift: true, ..Modifiers::none() };
        let mutation = state.pointer_move(&PointerEvent::new(1, 350.0, 160.0).with_modifiers(shift));
        assert_eq!(
            mutation,
            Some(Mutation::Resize {
                id: "img-1".to_string(),
                handle: Handle::SE,
                delta_x: 50.0,
                delta_y: 10.0,
                lock_aspect: false,
                origin: Some(Rect::new(100.0, 50.0, 200.0, 100.0)),
            })
        );
    }

    #[test]
    fn test_second_interaction_is_ignored() {
        let mut state = InteractionState::default();
        let mut surface = RecordingSurface::default();

        assert!(state.begin_drag(&item(), &PointerEvent::new(1, 0.0, 0.0), &mut surface));
        assert!(!state.begin_resize(&item(), Handle::E, &PointerEvent::new(2, 0.0, 0.0), &mut surface));
        assert!(matches!(state, InteractionState::Dragging(_)));
        assert_eq!(surface.captured, vec![1]);
    }

    #[test]
    fn test_other_pointers_are_ignored() {
        let mut state = InteractionState::default();
        let mut surface = RecordingSurface::default();
        state.begin_drag(&item(), &PointerEvent::new(1, 0.0, 0.0), &mut surface);

        assert_eq!(state.pointer_move(&PointerEvent::new(2, 50.0, 50.0)), None);
        assert!(!state.pointer_up(&PointerEvent::new(2, 50.0, 50.0), &mut surface));
        assert!(!state.is_idle());

        assert!(state.pointer_up(&PointerEvent::new(1, 50.0, 50.0), &mut surface));
        assert!(state.is_idle());
        assert_eq!(surface.released, vec![1]);
    }

    #[test]
    fn test_cancel_always_returns_to_idle() {
        let mut state = InteractionState::default();
        let mut surface = RecordingSurface::default();
        state.begin_resize(&item(), Handle::W, &PointerEvent::new(4, 0.0, 0.0), &mut surface);

        assert!(state.pointer_cancel(&mut surface));
        assert!(state.is_idle());
        assert_eq!(surface.released, vec![4]);
        assert!(!state.pointer_cancel(&mut surface));
        assert_eq!(state.pointer_move(&PointerEvent::new(4, 1.0, 1.0)), None);
    }

    #[test]
    fn test_cancel_for_item() {
        let mut state = InteractionState::default();
        state.begin_drag(&item(), &PointerEvent::new(1, 0.0, 0.0), &mut NoopSurface);

        assert!(!state.cancel_for_item("other", &mut NoopSurface));
        assert!(state.cancel_for_item("img-1", &mut NoopSurface));
        assert!(state.is_idle());
    }
}
