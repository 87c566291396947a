//! Redraw coalescing.
//!
//! Any number of state changes between two display refreshes produce one
//! draw: the first request schedules a frame, later ones are absorbed until
//! the frame runs.

use std::sync::atomic::{AtomicBool, Ordering};

/// Single pending-redraw flag.
#[derive(Debug, Default)]
pub struct RedrawScheduler {
    pending: AtomicBool,
}

impl RedrawScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a redraw. Returns `true` only for the request that must
    /// actually schedule the next frame callback.
    pub fn request(&self) -> bool {
        !self.pending.swap(true, Ordering::AcqRel)
    }

    /// Called from the frame callback: returns whether a draw is due and
    /// clears the flag.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

impl Clone for RedrawScheduler {
    fn clone(&self) -> Self {
        Self {
            pending: AtomicBool::new(self.is_pending()),
        }
    }
}
