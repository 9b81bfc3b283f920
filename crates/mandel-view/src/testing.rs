//! Test doubles for the graphics context and the frame scheduler.

use mandel_engine::coords::{ColorRgba, ViewportRect};
use mandel_engine::core::FrameScheduler;
use mandel_engine::gfx::reflect::{link_interface, ShaderReflection};
use mandel_engine::gfx::{
    BlendFunc, BufferId, GfxError, GraphicsContext, ProgramId, ShaderId, ShaderStage, Topology,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Compile(ShaderStage),
    Link,
    UseProgram(ProgramId),
    CreateVertexBuffer { attribute: String, floats: usize },
    EnableVertexBuffer(BufferId),
    Uniform1f(String, f32),
    Uniform2f(String, f32, f32),
    Draw {
        topology: Topology,
        first: u32,
        count: u32,
        blend: Option<BlendFunc>,
    },
    EnableBlend(BlendFunc),
    DisableBlend,
    Clear(ColorRgba),
    Viewport(ViewportRect),
}

/// Records every call. Shader sources go through the real WGSL reflection, so
/// compile and attribute errors match the wgpu backend.
#[derive(Default)]
pub struct RecordingGraphics {
    pub calls: Vec<Call>,
    pub fail_link: bool,
    blend: Option<BlendFunc>,
    shaders: Vec<ShaderReflection>,
    programs: Vec<usize>,
    buffers: u32,
}

impl RecordingGraphics {
    pub fn draws(&self) -> Vec<(Topology, u32, u32, Option<BlendFunc>)> {
        self.calls
            .iter()
            .filter_map(|c| match *c {
                Call::Draw {
                    topology,
                    first,
                    count,
                    blend,
                } => Some((topology, first, count, blend)),
                _ => None,
            })
            .collect()
    }

    pub fn blend_enabled(&self) -> bool {
        self.blend.is_some()
    }

    /// Last value written to a vec2 uniform.
    pub fn uniform_2f(&self, name: &str) -> Option<(f32, f32)> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Uniform2f(n, x, y) if n == name => Some((*x, *y)),
            _ => None,
        })
    }

    /// Last value written to a scalar uniform.
    pub fn uniform_1f(&self, name: &str) -> Option<f32> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Uniform1f(n, v) if n == name => Some(*v),
            _ => None,
        })
    }

    pub fn count_uniform_writes(&self, name: &str) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Uniform1f(n, ..) | Call::Uniform2f(n, ..) if n == name))
            .count()
    }
}

impl GraphicsContext for RecordingGraphics {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, GfxError> {
        self.calls.push(Call::Compile(stage));
        let reflection = ShaderReflection::parse(stage, source)?;
        self.shaders.push(reflection);
        Ok(ShaderId::new(self.shaders.len() as u32 - 1))
    }

    fn link_program(
        &mut self,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<ProgramId, GfxError> {
        self.calls.push(Call::Link);
        if self.fail_link {
            return Err(GfxError::Link("forced link failure".into()));
        }
        link_interface(&self.shaders[vertex.index()], &self.shaders[fragment.index()])?;
        self.programs.push(vertex.index());
        Ok(ProgramId::new(self.programs.len() as u32 - 1))
    }

    fn use_program(&mut self, program: ProgramId) {
        self.calls.push(Call::UseProgram(program));
    }

    fn create_vertex_buffer(
        &mut self,
        program: ProgramId,
        attribute: &str,
        data: &[f32],
    ) -> Result<BufferId, GfxError> {
        let vertex = *self
            .programs
            .get(program.index())
            .ok_or(GfxError::InvalidHandle("program"))?;
        if self.shaders[vertex].input(attribute).is_none() {
            return Err(GfxError::UnknownAttribute(attribute.to_owned()));
        }

        self.calls.push(Call::CreateVertexBuffer {
            attribute: attribute.to_owned(),
            floats: data.len(),
        });
        self.buffers += 1;
        Ok(BufferId::new(self.buffers - 1))
    }

    fn enable_vertex_buffer(&mut self, buffer: BufferId) {
        self.calls.push(Call::EnableVertexBuffer(buffer));
    }

    fn set_uniform_1f(&mut self, name: &str, value: f32) {
        self.calls.push(Call::Uniform1f(name.to_owned(), value));
    }

    fn set_uniform_2f(&mut self, name: &str, x: f32, y: f32) {
        self.calls.push(Call::Uniform2f(name.to_owned(), x, y));
    }

    fn draw_arrays(&mut self, topology: Topology, first: u32, count: u32) {
        self.calls.push(Call::Draw {
            topology,
            first,
            count,
            blend: self.blend,
        });
    }

    fn enable_blend(&mut self, func: BlendFunc) {
        self.blend = Some(func);
        self.calls.push(Call::EnableBlend(func));
    }

    fn disable_blend(&mut self) {
        self.blend = None;
        self.calls.push(Call::DisableBlend);
    }

    fn clear(&mut self, color: ColorRgba) {
        self.calls.push(Call::Clear(color));
    }

    fn set_viewport(&mut self, rect: ViewportRect) {
        self.calls.push(Call::Viewport(rect));
    }
}

#[derive(Debug, Default)]
pub struct CountingScheduler {
    pub requests: usize,
}

impl FrameScheduler for CountingScheduler {
    fn request_frame(&mut self) {
        self.requests += 1;
    }
}
