//! Frame render targets.
//!
//! A `RenderTarget` is handed to drawing code between frame acquisition and
//! presentation. It borrows the frame's encoder and color view.

mod ctx;

pub use ctx::RenderTarget;
