//! Immediate-style graphics contract over wgpu.
//!
//! Higher layers drive a small program-oriented API (compile, link, set named
//! uniforms, draw a vertex range, toggle blending). `WgpuGraphics` records those
//! calls and replays them into a render pass when the frame is flushed.
//!
//! Shader sources are WGSL. They are parsed and validated with naga before being
//! handed to wgpu, so compile and link failures surface as `GfxError` values
//! instead of device-level panics.

mod context;
mod error;
pub mod reflect;
mod wgpu_backend;

pub use context::{
    BlendFactor, BlendFunc, BufferId, GraphicsContext, ProgramId, ShaderId, ShaderStage, Topology,
};
pub use error::GfxError;
pub use wgpu_backend::{WgpuGraphics, MAX_QUEUED_DRAWS};
