//! Touch gesture recognition.
//!
//! [`DragGesture`] recognizes single finger drags in cooperation with a [`TouchArbiter`] that
//! decides which of the recognizers of a window owns a touch.

mod arbiter;
mod change;
mod config;
mod damped;
mod direction;
mod drag_gesture;
mod timer;

pub use arbiter::*;
pub use change::{DragGestureChange, Observer, Observers, RecognizerState, RecognizerStatus};
pub use config::*;
pub use damped::*;
pub use direction::*;
pub use drag_gesture::*;
pub use timer::*;
