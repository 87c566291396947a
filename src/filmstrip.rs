//! Thumbnail filmstrip for dataset navigation.
//!
//! Navigation clamps at both ends; it never wraps (the lightbox does).
//! Wheel, drag and the paired range control all move one shared
//! [`StripScroll`], so they cannot disagree about the scroll position.

use yolocam_view::{Bounds, ScrollDragState, StripScroll};

use crate::constants::{THUMB_GAP, THUMB_WIDTH};

/// Ordered image names plus the current selection.
#[derive(Debug, Clone)]
pub struct Filmstrip {
    names: Vec<String>,
    current: Option<usize>,
    scroll: StripScroll,
    thumb_width: f64,
    gap: f64,
}

impl Default for Filmstrip {
    fn default() -> Self {
        Self::new(THUMB_WIDTH, THUMB_GAP)
    }
}

impl Filmstrip {
    pub fn new(thumb_width: f64, gap: f64) -> Self {
        Self {
            names: Vec::new(),
            current: None,
            scroll: StripScroll::new(),
            thumb_width: thumb_width.max(1.0),
            gap: gap.max(0.0),
        }
    }

    /// Replace the sequence. A previous selection is clamped into range; with
    /// no previous selection the first image becomes current.
    pub fn load(&mut self, names: Vec<String>) -> Option<usize> {
        self.names = names;
        self.current = match (self.current, self.names.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
        let viewport = self.scroll.viewport_width();
        self.scroll.set_extent(self.content_width(), viewport);
        if let Some(i) = self.current {
            self.center(i);
        }
        self.current
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.and_then(|i| self.names.get(i)).map(String::as_str)
    }

    /// Move by `step`, clamped to the ends. Returns the new index when it
    /// changed.
    pub fn go_relative(&mut self, step: isize) -> Option<usize> {
        let last = self.names.len().checked_sub(1)?;
        let from = self.current.unwrap_or(0);
        let target = from.saturating_add_signed(step).min(last);
        if self.current == Some(target) {
            return None;
        }
        self.set_active(target).then_some(target)
    }

    /// Mark `index` active and scroll it to the middle of the strip.
    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.names.len() {
            return false;
        }
        self.current = Some(index);
        self.center(index);
        true
    }

    fn center(&mut self, index: usize) {
        let rect = self.thumb_rect(index);
        self.scroll.center_on(rect.x, rect.width);
    }

    /// Thumbnail rectangle in strip content coordinates (height is 0; the
    /// strip only lays out horizontally).
    pub fn thumb_rect(&self, index: usize) -> Bounds {
        Bounds::new(index as f64 * (self.thumb_width + self.gap), 0.0, self.thumb_width, 0.0)
    }

    pub fn content_width(&self) -> f64 {
        let n = self.names.len() as f64;
        if n == 0.0 {
            return 0.0;
        }
        n * self.thumb_width + (n - 1.0) * self.gap
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.scroll.set_extent(self.content_width(), width);
    }

    /// Thumbnail under a pointer at `x` (relative to the strip's left edge).
    pub fn thumb_at(&self, x: f64) -> Option<usize> {
        let content_x = x + self.scroll.offset();
        if content_x < 0.0 {
            return None;
        }
        let pitch = self.thumb_width + self.gap;
        let index = (content_x / pitch).floor() as usize;
        let within = content_x - index as f64 * pitch;
        (index < self.names.len() && within <= self.thumb_width).then_some(index)
    }

    pub fn on_wheel(&mut self, delta_x: f64, delta_y: f64) {
        self.scroll.on_wheel(delta_x, delta_y);
    }

    pub fn pointer_down(&mut self, x: f64) {
        self.scroll.begin_drag(x);
    }

    pub fn pointer_move(&mut self, x: f64) -> bool {
        self.scroll.drag_to(x)
    }

    /// Finish a press on the strip. A press that did not move far enough to
    /// count as a drag is a click: the thumbnail under it becomes active.
    pub fn pointer_up(&mut self, x: f64) -> Option<usize> {
        if self.scroll.end_drag() {
            return None;
        }
        let index = self.thumb_at(x)?;
        self.set_active(index).then_some(index)
    }

    pub fn drag_state(&self) -> ScrollDragState {
        self.scroll.drag_state()
    }

    pub fn on_range_input(&mut self, value: f64) {
        self.scroll.on_range_input(value);
    }

    pub fn scroll(&self) -> &StripScroll {
        &self.scroll
    }
}
