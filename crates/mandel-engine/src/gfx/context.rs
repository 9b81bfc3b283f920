use std::fmt;

use crate::coords::{ColorRgba, ViewportRect};

use super::GfxError;

/// Pipeline stage a shader unit is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Handle to a compiled shader unit.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderId(u32);

/// Handle to a linked program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramId(u32);

/// Handle to a vertex attribute buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferId(u32);

macro_rules! handle_impl {
    ($($ty:ident),*) => {$(
        impl $ty {
            #[inline]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }
    )*};
}

handle_impl!(ShaderId, ProgramId, BufferId);

/// Primitive topology for a draw call.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    Triangles,
    Points,
}

/// Blend factor applied to the source or destination color.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Source/destination factor pair. The same pair is used for color and alpha.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BlendFunc {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl BlendFunc {
    /// Straight (non-premultiplied) alpha compositing.
    pub const ALPHA: Self = Self {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::OneMinusSrcAlpha,
    };
}

/// Program-oriented graphics contract.
///
/// State set through this trait (current program, bound buffer, blend function,
/// viewport, uniform values) persists until changed, and every draw call
/// captures the state current at the time of the call.
pub trait GraphicsContext {
    /// Compiles one shader unit.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, GfxError>;

    /// Links a vertex and a fragment unit into a program.
    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId)
        -> Result<ProgramId, GfxError>;

    /// Makes `program` the target of uniform writes and draws.
    fn use_program(&mut self, program: ProgramId);

    /// Uploads tightly packed float vertex data for the named attribute of `program`.
    fn create_vertex_buffer(
        &mut self,
        program: ProgramId,
        attribute: &str,
        data: &[f32],
    ) -> Result<BufferId, GfxError>;

    /// Binds `buffer` as the vertex source for subsequent draws.
    fn enable_vertex_buffer(&mut self, buffer: BufferId);

    fn set_uniform_1f(&mut self, name: &str, value: f32);

    fn set_uniform_2f(&mut self, name: &str, x: f32, y: f32);

    /// Draws `count` vertices starting at `first` from the bound buffer.
    fn draw_arrays(&mut self, topology: Topology, first: u32, count: u32);

    fn enable_blend(&mut self, func: BlendFunc);

    fn disable_blend(&mut self);

    /// Clears the drawable before the next recorded draw.
    fn clear(&mut self, color: ColorRgba);

    fn set_viewport(&mut self, rect: ViewportRect);
}
