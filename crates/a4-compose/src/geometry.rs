//! Interactive geometry of the content region
//!
//! The content region of the first page can be dragged and resized with the
//! pointer. Every page is rendered with the same region size, so a resize
//! means the document must be paginated again; a move only changes where the
//! region is drawn.

use crate::types::{GeometryBox, MinSize, Point};

/// Global pointer tracking for the duration of a gesture.
///
/// Acquired when a drag or resize begins so that movement and release are
/// seen anywhere, not only over the region. Released when the gesture ends,
/// when export mode starts, on reset and when the model is dropped.
pub trait PointerCapture {
    fn acquire(&mut self);
    fn release(&mut self);
}

/// Capture for front ends whose toolkit already routes pointer events
/// to the element that started a drag
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn acquire(&mut self) {}
    fn release(&mut self) {}
}

/// Active pointer gesture
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging { origin: Point, start: GeometryBox },
    Resizing { origin: Point, start: GeometryBox },
}

/// What a pointer update changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryChange {
    /// Position only; pagination is unaffected
    Moved,
    /// Width or height; pages must be laid out again
    Resized,
}

impl GeometryChange {
    pub fn needs_layout(self) -> bool {
        self == GeometryChange::Resized
    }
}

/// Which interactive decorations a page's content region shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordances {
    pub border: bool,
    pub resize_handle: bool,
    pub interactive: bool,
}

impl Affordances {
    pub const NONE: Affordances = Affordances {
        border: false,
        resize_handle: false,
        interactive: false,
    };

    pub const FULL: Affordances = Affordances {
        border: true,
        resize_handle: true,
        interactive: true,
    };
}

pub struct GeometryModel<C: PointerCapture = NoCapture> {
    bounds: GeometryBox,
    default_bounds: GeometryBox,
    min_size: MinSize,
    gesture: Gesture,
    export_mode: bool,
    capture: C,
}

impl GeometryModel<NoCapture> {
    pub fn new(default_bounds: GeometryBox, min_size: MinSize) -> Self {
        Self::with_capture(default_bounds, min_size, NoCapture)
    }
}

impl<C: PointerCapture> GeometryModel<C> {
    pub fn with_capture(default_bounds: GeometryBox, min_size: MinSize, capture: C) -> Self {
        let bounds = GeometryBox {
            width: default_bounds.width.max(min_size.width),
            height: default_bounds.height.max(min_size.height),
            ..default_bounds
        };
        Self {
            bounds,
            default_bounds: bounds,
            min_size,
            gesture: Gesture::Idle,
            export_mode: false,
            capture,
        }
    }

    pub fn bounds(&self) -> GeometryBox {
        self.bounds
    }

    pub fn min_size(&self) -> MinSize {
        self.min_size
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_idle(&self) -> bool {
        self.gesture == Gesture::Idle
    }

    pub fn export_mode(&self) -> bool {
        self.export_mode
    }

    pub fn capture(&self) -> &C {
        &self.capture
    }

    /// Start moving the region. Ignored while another gesture is active or
    /// during export.
    pub fn begin_drag(&mut self, pointer: Point) -> bool {
        if !self.can_begin() {
            return false;
        }
        self.start_gesture(Gesture::Dragging {
            origin: pointer,
            start: self.bounds,
        });
        true
    }

    /// Start resizing the region from its bottom-right handle. Ignored while
    /// another gesture is active or during export.
    pub fn begin_resize(&mut self, pointer: Point) -> bool {
        if !self.can_begin() {
            return false;
        }
        self.start_gesture(Gesture::Resizing {
            origin: pointer,
            start: self.bounds,
        });
        true
    }

    /// Apply pointer movement while dragging. Not clamped to the canvas.
    pub fn update_drag(&mut self, pointer: Point) -> Option<GeometryChange> {
        let Gesture::Dragging { origin, start } = self.gesture else {
            return None;
        };
        if self.export_mode {
            return None;
        }
        let delta = pointer - origin;
        self.bounds = GeometryBox {
            x: start.x + delta.x,
            y: start.y + delta.y,
            ..start
        };
        Some(GeometryChange::Moved)
    }

    /// Apply pointer movement while resizing, never going below the minimum
    /// size. Reports `Resized` only when the size actually changed.
    pub fn update_resize(&mut self, pointer: Point) -> Option<GeometryChange> {
        let Gesture::Resizing { origin, start } = self.gesture else {
            return None;
        };
        if self.export_mode {
            return None;
        }
        let delta = pointer - origin;
        let resized = GeometryBox {
            width: (start.width + delta.x).max(self.min_size.width),
            height: (start.height + delta.y).max(self.min_size.height),
            ..start
        };
        let changed = resized.size_differs(&self.bounds);
        self.bounds = resized;
        changed.then_some(GeometryChange::Resized)
    }

    /// Global pointer-move handler
    pub fn pointer_moved(&mut self, pointer: Point) -> Option<GeometryChange> {
        match self.gesture {
            Gesture::Idle => None,
            Gesture::Dragging { .. } => self.update_drag(pointer),
            Gesture::Resizing { .. } => self.update_resize(pointer),
        }
    }

    /// Global pointer-release handler
    pub fn end(&mut self) {
        if self.gesture != Gesture::Idle {
            log::debug!("Gesture ended with region {:?}", self.bounds);
            self.gesture = Gesture::Idle;
            self.capture.release();
        }
    }

    /// Hide affordances and freeze the region while pages are captured
    pub fn set_export_mode(&mut self, active: bool) {
        if active {
            self.end();
        }
        self.export_mode = active;
    }

    /// Restore the default region
    pub fn reset(&mut self) {
        self.end();
        self.bounds = self.default_bounds;
    }

    /// Decorations for the content region of `page_index`.
    ///
    /// Only the first page is editable, and nothing is shown in export mode.
    pub fn affordances(&self, page_index: usize) -> Affordances {
        if page_index == 0 && !self.export_mode {
            Affordances::FULL
        } else {
            Affordances::NONE
        }
    }

    fn can_begin(&self) -> bool {
        self.gesture == Gesture::Idle && !self.export_mode
    }

    fn start_gesture(&mut self, gesture: Gesture) {
        self.capture.acquire();
        self.gesture = gesture;
    }
}

impl<C: PointerCapture> Drop for GeometryModel<C> {
    fn drop(&mut self) {
        self.end();
    }
}

impl<C: PointerCapture> std::fmt::Debug for GeometryModel<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryModel")
            .field("bounds", &self.bounds)
            .field("min_size", &self.min_size)
            .field("gesture", &self.gesture)
            .field("export_mode", &self.export_mode)
            .finish()
    }
}
