//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and
//! the application: the `App` callbacks, the contexts they receive, and the
//! `FrameScheduler` used to ask for the next frame.

mod app;
mod ctx;

pub use app::{App, AppControl, FrameScheduler};
pub use ctx::{FrameCtx, StartCtx, WindowCtx};
