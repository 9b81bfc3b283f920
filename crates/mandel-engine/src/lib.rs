//! Mandel engine crate.
//!
//! Platform + GPU runtime used by the viewer: window and event loop, wgpu
//! device and surface, input translation, frame timing, and the `gfx`
//! graphics-context abstraction the renderer is written against.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod gfx;
