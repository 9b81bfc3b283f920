//! Interactive Mandelbrot viewer.
//!
//! - [`viewport`]: pan/zoom state and the input handlers that change it
//! - [`render_loop`]: per-frame tick, uniform upload, two-pass draw, rescheduling
//! - [`program`]: compile/link + full-screen quad setup over a `GraphicsContext`
//! - [`app`]: the runtime `App` tying input, frames and the GPU together

pub mod app;
pub mod config;
pub mod program;
pub mod render_loop;
pub mod shaders;
pub mod uniforms;
pub mod viewport;

#[cfg(test)]
mod testing;

pub use app::FractalApp;
pub use config::{TimeStep, ViewerConfig};
pub use render_loop::{LoopState, RenderLoop, StopHandle};
pub use viewport::{PointerDragState, ViewState, ViewportController};
