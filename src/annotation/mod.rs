//! Box annotation on the dataset canvas.

mod box_store;
mod gesture;
mod session;

pub use box_store::BoxStore;
pub use gesture::{
    committed_rect, GestureOutcome, GestureState, GestureTracker, Modifiers, PointerButton,
};
pub use session::{save_status_text, AnnotationSession, SessionError};
