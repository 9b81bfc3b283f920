//! WGSL sources for the fractal program.
//!
//! The vertex stage passes `a_position` through as clip space. The fragment
//! stage owns the escape-time loop and coloring; it reads the four uniforms
//! named in [`crate::uniforms`] from one block at `@group(0) @binding(0)`.

use crate::program::ShaderSources;

pub const MANDELBROT_VERTEX: &str = include_str!("mandelbrot.vert.wgsl");
pub const MANDELBROT_FRAGMENT: &str = include_str!("mandelbrot.frag.wgsl");

/// The built-in Mandelbrot program.
pub const MANDELBROT: ShaderSources<'static> = ShaderSources {
    vertex: MANDELBROT_VERTEX,
    fragment: MANDELBROT_FRAGMENT,
};
