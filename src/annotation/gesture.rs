//! Pointer gesture state machine for the annotation canvas.
//!
//! A pointer-down starts exactly one gesture: a pan when a non-primary
//! button or any modifier key is involved, otherwise a box draw. The
//! gesture lasts until pointer-up, which the host must deliver even when the
//! release happens outside the canvas.

use yolocam_view::{Bounds, Point, ViewportController};

use crate::constants::MIN_BOX_SIZE;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// From a DOM `MouseEvent.button` code.
    pub fn from_dom(code: i16) -> Self {
        match code {
            0 => PointerButton::Primary,
            1 => PointerButton::Middle,
            _ => PointerButton::Secondary,
        }
    }
}

/// Modifier keys held during a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// The gesture in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    /// Dragging the view.
    Panning {
        /// Screen position of the previous pointer event.
        last_screen: Point,
    },
    /// Dragging out a new box. Both corners are in image pixels, already
    /// clamped to the image.
    Drawing { anchor: Point, current: Point },
}

/// What a pointer event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// Nothing that changes the picture.
    None,
    /// The view moved.
    Panned,
    /// The provisional box changed.
    Resized,
    /// A box large enough to keep, in image pixels.
    Committed(Bounds),
    /// A draw too small to keep (an accidental click).
    Discarded,
    /// A pan ended.
    Released,
}

/// Tracks one gesture at a time.
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    state: GestureState,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, GestureState::Idle)
    }

    /// Start a gesture. Ignored while another one is active. Box drawing
    /// needs a loaded image (`can_draw`); panning does not.
    pub fn pointer_down(
        &mut self,
        screen: Point,
        button: PointerButton,
        modifiers: Modifiers,
        viewport: &ViewportController,
        can_draw: bool,
    ) {
        if self.is_active() {
            return;
        }
        if button != PointerButton::Primary || modifiers.any() {
            self.state = GestureState::Panning { last_screen: screen };
        } else if can_draw {
            let anchor = viewport.clamp_to_image(viewport.screen_to_image(screen));
            self.state = GestureState::Drawing {
                anchor,
                current: anchor,
            };
        }
    }

    pub fn pointer_move(&mut self, screen: Point, viewport: &mut ViewportController) -> GestureOutcome {
        match self.state {
            GestureState::Idle => GestureOutcome::None,
            GestureState::Panning { last_screen } => {
                viewport.pan_by(screen.x - last_screen.x, screen.y - last_screen.y);
                self.state = GestureState::Panning { last_screen: screen };
                GestureOutcome::Panned
            }
            GestureState::Drawing { anchor, .. } => {
                let current = viewport.clamp_to_image(viewport.screen_to_image(screen));
                self.state = GestureState::Drawing { anchor, current };
                GestureOutcome::Resized
            }
        }
    }

    /// End the active gesture. `screen` is the release position when known
    /// (a release outside the canvas may not carry a usable one).
    pub fn pointer_up(&mut self, screen: Option<Point>, viewport: &mut ViewportController) -> GestureOutcome {
        if let Some(screen) = screen {
            self.pointer_move(screen, viewport);
        }
        let outcome = match self.state {
            GestureState::Idle => GestureOutcome::None,
            GestureState::Panning { .. } => GestureOutcome::Released,
            GestureState::Drawing { anchor, current } => match committed_rect(anchor, current) {
                Some(rect) => GestureOutcome::Committed(rect),
                None => GestureOutcome::Discarded,
            },
        };
        self.state = GestureState::Idle;
        outcome
    }

    /// Drop the active gesture without committing anything.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Box being drawn, in image pixels.
    pub fn provisional(&self) -> Option<Bounds> {
        match self.state {
            GestureState::Drawing { anchor, current } => Some(Bounds::from_corners(anchor, current)),
            _ => None,
        }
    }
}

/// Rectangle spanned by two image-space corners, if it is at least
/// `MIN_BOX_SIZE` on both sides.
pub fn committed_rect(a: Point, b: Point) -> Option<Bounds> {
    let rect = Bounds::from_corners(a, b);
    (rect.width >= MIN_BOX_SIZE && rect.height >= MIN_BOX_SIZE).then_some(rect)
}
