//! Horizontal scroll model for a thumbnail strip.
//!
//! Wheel input, click-drag and the paired range control all write the same
//! `offset`, which is always kept inside `[0, max_offset]`. The range
//! control reads back [`StripScroll::range_value`] after any change so the
//! two can never diverge.

/// Drag interaction state for the strip.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ScrollDragState {
    #[default]
    Idle,
    Dragging {
        /// Pointer x at drag start.
        start_pointer_x: f64,
        /// Scroll offset at drag start.
        start_offset: f64,
        /// Whether the pointer moved far enough to count as a drag.
        moved: bool,
    },
}

impl ScrollDragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, ScrollDragState::Dragging { .. })
    }
}

/// Pointer travel (px) below which a press-release is still a click.
pub const DRAG_CLICK_SLOP: f64 = 4.0;

/// Scroll state of one horizontal strip.
#[derive(Debug, Clone, Default)]
pub struct StripScroll {
    offset: f64,
    content_width: f64,
    viewport_width: f64,
    drag: ScrollDragState,
}

impl StripScroll {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the strip extents (content and visible width), re-clamping
    /// the offset.
    pub fn set_extent(&mut self, content_width: f64, viewport_width: f64) {
        self.content_width = content_width.max(0.0);
        self.viewport_width = viewport_width.max(0.0);
        self.offset = self.clamp(self.offset);
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    pub fn max_offset(&self) -> f64 {
        (self.content_width - self.viewport_width).max(0.0)
    }

    fn clamp(&self, offset: f64) -> f64 {
        if offset.is_finite() {
            offset.clamp(0.0, self.max_offset())
        } else {
            self.offset
        }
    }

    /// Set the absolute offset.
    pub fn scroll_to(&mut self, offset: f64) {
        self.offset = self.clamp(offset);
    }

    /// Apply a wheel event. Horizontal delta wins; a purely vertical wheel
    /// scrolls the strip sideways.
    pub fn on_wheel(&mut self, delta_x: f64, delta_y: f64) {
        let delta = if delta_x.abs() >= delta_y.abs() {
            delta_x
        } else {
            delta_y
        };
        self.scroll_to(self.offset + delta);
    }

    pub fn begin_drag(&mut self, pointer_x: f64) {
        self.drag = ScrollDragState::Dragging {
            start_pointer_x: pointer_x,
            start_offset: self.offset,
            moved: false,
        };
    }

    /// Follow the pointer while dragging. Returns `true` if the offset
    /// changed.
    pub fn drag_to(&mut self, pointer_x: f64) -> bool {
        let ScrollDragState::Dragging {
            start_pointer_x,
            start_offset,
            moved,
        } = self.drag
        else {
            return false;
        };
        let travel = pointer_x - start_pointer_x;
        let moved = moved || travel.abs() > DRAG_CLICK_SLOP;
        self.drag = ScrollDragState::Dragging {
            start_pointer_x,
            start_offset,
            moved,
        };
        let before = self.offset;
        // Content follows the pointer
        self.scroll_to(start_offset - travel);
        self.offset != before
    }

    /// End the drag. Returns `true` if it was a real drag (so the release
    /// must not be treated as a thumbnail click).
    pub fn end_drag(&mut self) -> bool {
        let was_drag = matches!(self.drag, ScrollDragState::Dragging { moved: true, .. });
        self.drag = ScrollDragState::Idle;
        was_drag
    }

    pub fn drag_state(&self) -> ScrollDragState {
        self.drag
    }

    /// Value for the paired range control (same units as the offset).
    pub fn range_value(&self) -> f64 {
        self.offset
    }

    /// Maximum for the paired range control.
    pub fn range_max(&self) -> f64 {
        self.max_offset()
    }

    /// The range control was moved by the user.
    pub fn on_range_input(&mut self, value: f64) {
        self.scroll_to(value);
    }

    /// Scroll so that the item spanning `[item_left, item_left + item_width)`
    /// sits in the middle of the visible strip (clamped at both ends).
    pub fn center_on(&mut self, item_left: f64, item_width: f64) {
        let target = item_left + item_width / 2.0 - self.viewport_width / 2.0;
        self.scroll_to(target);
    }

    /// Whether an item is at least partly visible.
    pub fn is_visible(&self, item_left: f64, item_width: f64) -> bool {
        item_left + item_width > self.offset && item_left < self.offset + self.viewport_width
    }
}
