//! Touch input primitives: samples, batches, clocks, and active touch bookkeeping.
mod active_touches;
mod time_source;
mod touch;

pub use active_touches::*;
pub use time_source::*;
pub use touch::*;
