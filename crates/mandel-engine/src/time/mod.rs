//! Time subsystem.
//!
//! One `FrameClock` per window; the runtime ticks it once per redraw and hands
//! the resulting `FrameTime` to the application.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
