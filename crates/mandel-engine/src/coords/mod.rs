//! Coordinate and geometry types shared by the runtime and the viewer.
//!
//! Two spaces are in play:
//! - pointer space: logical pixels, origin top-left, +X right, +Y down
//! - drawable space: physical pixels of the surface, used for viewports

mod color;
mod vec2;
mod viewport;

pub use color::ColorRgba;
pub use vec2::DVec2;
pub use viewport::ViewportRect;
