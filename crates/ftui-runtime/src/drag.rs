#![forbid(unsafe_code)]

//! Drag/resize gesture state machine.
//!
//! The engine claims a mouse press on a draggable/resizable component's
//! handle band *before* the component ever sees the event (engine-first
//! precedence — see the engine's Open Question on drag vs. component
//! dispatch). Only fullscreen mode honors `draggable`/`resizable`; inline
//! mode ignores both capability flags entirely, since there is no floating
//! window concept to drag within a single scrolling column of output.

use ftui_core::event::{MouseButton, MouseEvent, MouseEventKind};
use ftui_core::geometry::Rect;

use crate::component::{Capabilities, ComponentId, ComponentTree};
use crate::layer::LayerManager;

const HANDLE_BAND: u16 = 1;
const MIN_SIZE: u16 = 1;

/// Which edge/corner band a resize grab landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl ResizeHandle {
    /// Classify `(x, y)` against `bounds`'s edge band, or `None` if the
    /// point isn't within `HANDLE_BAND` cells of any edge.
    #[must_use]
    fn classify(bounds: Rect, x: u16, y: u16) -> Option<Self> {
        if !bounds.contains(x, y) {
            return None;
        }
        let near_left = x < bounds.x.saturating_add(HANDLE_BAND);
        let near_right = x >= bounds.right().saturating_sub(HANDLE_BAND);
        let near_top = y < bounds.y.saturating_add(HANDLE_BAND);
        let near_bottom = y >= bounds.bottom().saturating_sub(HANDLE_BAND);

        match (near_top, near_bottom, near_left, near_right) {
            (true, _, true, _) => Some(Self::NW),
            (true, _, _, true) => Some(Self::NE),
            (_, true, true, _) => Some(Self::SW),
            (_, true, _, true) => Some(Self::SE),
            (true, false, false, false) => Some(Self::N),
            (false, true, false, false) => Some(Self::S),
            (false, false, true, false) => Some(Self::W),
            (false, false, false, true) => Some(Self::E),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Gesture {
    Dragging {
        id: ComponentId,
        grab: (u16, u16),
        origin: Rect,
    },
    Resizing {
        id: ComponentId,
        handle: ResizeHandle,
        grab: (u16, u16),
        origin: Rect,
    },
}

/// Tracks at most one in-progress drag or resize gesture.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragController {
    gesture: Option<Gesture>,
}

impl DragController {
    /// A fresh controller with no gesture in progress.
    #[must_use]
    pub const fn new() -> Self {
        Self { gesture: None }
    }

    /// Whether a gesture is currently in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Try to claim a mouse-down event as the start of a drag or resize.
    ///
    /// Returns `true` if the engine claimed the press (the component must
    /// not also see it as a regular click). Ignored entirely in inline
    /// mode, and for components lacking the relevant capability.
    pub fn on_press(
        &mut self,
        tree: &ComponentTree,
        layers: &LayerManager,
        event: MouseEvent,
        inline: bool,
    ) -> bool {
        if inline || !matches!(event.kind, MouseEventKind::Down(MouseButton::Left)) {
            return false;
        }
        let Some(id) = layers.hit_test(event.x, event.y) else {
            return false;
        };
        let caps = tree.capabilities(id).unwrap_or(Capabilities::default());
        let Some(bounds) = tree.bounds(id) else {
            return false;
        };

        if caps.resizable {
            if let Some(handle) = ResizeHandle::classify(bounds, event.x, event.y) {
                self.gesture = Some(Gesture::Resizing {
                    id,
                    handle,
                    grab: (event.x, event.y),
                    origin: bounds,
                });
                return true;
            }
        }
        if caps.draggable {
            self.gesture = Some(Gesture::Dragging {
                id,
                grab: (event.x, event.y),
                origin: bounds,
            });
            return true;
        }
        false
    }

    /// Update bounds for the in-progress gesture, if any, clamped to stay
    /// inside `parent_bounds` with at least `MIN_SIZE` cells visible.
    /// Returns the component whose bounds changed, if the gesture is active.
    pub fn on_move(
        &mut self,
        tree: &mut ComponentTree,
        parent_bounds: Rect,
        x: u16,
        y: u16,
    ) -> Option<ComponentId> {
        match self.gesture? {
            Gesture::Dragging { id, grab, origin } => {
                let dx = x as i32 - grab.0 as i32;
                let dy = y as i32 - grab.1 as i32;
                let new_x = clamp_origin(origin.x as i32 + dx, parent_bounds.x, parent_bounds.right(), origin.width);
                let new_y = clamp_origin(origin.y as i32 + dy, parent_bounds.y, parent_bounds.bottom(), origin.height);
                let bounds = Rect::new(new_x, new_y, origin.width, origin.height);
                tree.set_bounds(id, bounds);
                tree.mark_dirty(id);
                Some(id)
            }
            Gesture::Resizing {
                id,
                handle,
                grab,
                origin,
            } => {
                let bounds = resize_bounds(origin, handle, grab, (x, y), parent_bounds);
                tree.set_bounds(id, bounds);
                tree.mark_dirty(id);
                Some(id)
            }
        }
    }

    /// End the in-progress gesture, if any.
    pub fn on_release(&mut self) {
        self.gesture = None;
    }
}

fn clamp_origin(pos: i32, min: u16, max: u16, size: u16) -> u16 {
    let max_pos = max.saturating_sub(size.max(MIN_SIZE)) as i32;
    pos.clamp(min as i32, max_pos.max(min as i32)) as u16
}

fn resize_bounds(
    origin: Rect,
    handle: ResizeHandle,
    grab: (u16, u16),
    now: (u16, u16),
    parent: Rect,
) -> Rect {
    let dx = now.0 as i32 - grab.0 as i32;
    let dy = now.1 as i32 - grab.1 as i32;

    let mut x = origin.x as i32;
    let mut y = origin.y as i32;
    let mut w = origin.width as i32;
    let mut h = origin.height as i32;

    let has_west = matches!(handle, ResizeHandle::W | ResizeHandle::NW | ResizeHandle::SW);
    let has_east = matches!(handle, ResizeHandle::E | ResizeHandle::NE | ResizeHandle::SE);
    let has_north = matches!(handle, ResizeHandle::N | ResizeHandle::NW | ResizeHandle::NE);
    let has_south = matches!(handle, ResizeHandle::S | ResizeHandle::SW | ResizeHandle::SE);

    if has_west {
        x += dx;
        w -= dx;
    }
    if has_east {
        w += dx;
    }
    if has_north {
        y += dy;
        h -= dy;
    }
    if has_south {
        h += dy;
    }

    w = w.max(MIN_SIZE as i32);
    h = h.max(MIN_SIZE as i32);
    x = x.clamp(parent.x as i32, parent.right() as i32 - 1);
    y = y.clamp(parent.y as i32, parent.bottom() as i32 - 1);
    w = w.min(parent.right() as i32 - x);
    h = h.min(parent.bottom() as i32 - y);

    Rect::new(x as u16, y as u16, w as u16, h as u16)
}
