use std::collections::{HashMap, VecDeque};
use std::num::NonZeroU64;

use wgpu::util::DeviceExt;

use crate::coords::{ColorRgba, ViewportRect};
use crate::render::RenderTarget;

use super::reflect::{self, ShaderReflection, UniformBlock};
use super::{
    BlendFactor, BlendFunc, BufferId, GfxError, GraphicsContext, ProgramId, ShaderId,
    ShaderStage, Topology,
};

/// wgpu implementation of [`GraphicsContext`].
///
/// Calls are recorded, not executed. [`WgpuGraphics::flush`] replays the recorded
/// clear and draws into one render pass on the frame's target.
///
/// Uniform values are per program and persist between frames. Each draw captures
/// a copy of its program's uniform block; at flush time the copies are packed
/// into a dynamic-offset ring buffer so draws in the same pass can see different
/// values.
///
/// Recorded work only leaves the queue through `flush` or
/// [`WgpuGraphics::discard_pending`]; the queue holds at most
/// [`MAX_QUEUED_DRAWS`] draws and drops the oldest beyond that.
///
/// Pipelines are created lazily, one per (topology, blend, vertex layout)
/// combination, and cached on the program.
pub struct WgpuGraphics {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    uniform_alignment: u32,

    shaders: Vec<CompiledShader>,
    programs: Vec<LinkedProgram>,
    buffers: Vec<VertexBuffer>,

    current_program: Option<usize>,
    bound_buffer: Option<usize>,
    blend: Option<BlendFunc>,
    viewport: Option<ViewportRect>,

    pending: DrawQueue,
}

/// Upper bound on draws recorded between two flushes.
pub const MAX_QUEUED_DRAWS: usize = 256;

struct CompiledShader {
    module: wgpu::ShaderModule,
    reflection: ShaderReflection,
}

struct LinkedProgram {
    vertex: usize,
    fragment: usize,

    uniforms: Option<UniformBlock>,
    staging: Vec<u8>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    ring: Option<UniformRing>,
}

struct UniformRing {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
}

struct VertexBuffer {
    buffer: wgpu::Buffer,
    location: u32,
    components: u8,
    vertex_count: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct PipelineKey {
    topology: Topology,
    blend: Option<BlendFunc>,
    location: u32,
    components: u8,
}

#[derive(Debug, Clone)]
struct PendingDraw {
    program: usize,
    buffer: usize,
    key: PipelineKey,
    first: u32,
    count: u32,
    viewport: Option<ViewportRect>,
    uniforms: Vec<u8>,
}

impl WgpuGraphics {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let uniform_alignment = device.limits().min_uniform_buffer_offset_alignment;
        Self {
            device,
            queue,
            surface_format,
            uniform_alignment,
            shaders: Vec::new(),
            programs: Vec::new(),
            buffers: Vec::new(),
            current_program: None,
            bound_buffer: None,
            blend: None,
            viewport: None,
            pending: DrawQueue::default(),
        }
    }

    /// Returns `true` when a clear or draw is waiting for [`flush`](Self::flush).
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drops recorded draws that will never be presented, e.g. while the
    /// window is minimized. A recorded clear is kept for the next flush.
    pub fn discard_pending(&mut self) {
        let dropped = self.pending.discard_draws();
        if dropped > 0 {
            log::trace!("discarded {dropped} unpresented draw(s)");
        }
    }

    /// Encodes all recorded work into one render pass on `target`.
    ///
    /// Without a recorded clear the pass loads the existing contents.
    pub fn flush(&mut self, target: &mut RenderTarget<'_>) {
        if !self.has_pending() {
            return;
        }

        let (clear, draws) = self.pending.take();
        let offsets = self.upload_uniforms(&draws);

        let load = match clear {
            Some(c) => wgpu::LoadOp::Clear(wgpu::Color::from(c)),
            None => wgpu::LoadOp::Load,
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("mandel draw pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for (draw, offset) in draws.iter().zip(offsets) {
            let program = &self.programs[draw.program];
            let Some(pipeline) = program.pipelines.get(&draw.key) else { continue };

            // A viewport left over from a larger surface is clipped to the current one.
            let rect = draw
                .viewport
                .unwrap_or(ViewportRect::from_size(target.width, target.height))
                .clamped_to(target.width, target.height);
            let Some(rect) = rect else { continue };

            rpass.set_pipeline(pipeline);
            if let Some(ring) = program.ring.as_ref() {
                rpass.set_bind_group(0, &ring.bind_group, &[offset]);
            }
            rpass.set_vertex_buffer(0, self.buffers[draw.buffer].buffer.slice(..));
            rpass.set_viewport(
                rect.x as f32,
                rect.y as f32,
                rect.width as f32,
                rect.height as f32,
                0.0,
                1.0,
            );
            rpass.draw(draw.first..draw.first + draw.count, 0..1);
        }

        log::trace!("flushed {} draw(s)", draws.len());
    }

    fn shader(&self, id: ShaderId) -> Result<&CompiledShader, GfxError> {
        self.shaders
            .get(id.index())
            .ok_or(GfxError::InvalidHandle("shader"))
    }

    /// Packs every draw's uniform snapshot into its program's ring buffer.
    ///
    /// Returns the dynamic offset for each draw, in draw order.
    fn upload_uniforms(&mut self, draws: &[PendingDraw]) -> Vec<u32> {
        let mut offsets = vec![0u32; draws.len()];

        for (index, program) in self.programs.iter_mut().enumerate() {
            let Some(block) = program.uniforms.as_ref() else { continue };
            let stride = uniform_stride(block.span, self.uniform_alignment);

            let slots: Vec<usize> = draws
                .iter()
                .enumerate()
                .filter(|(_, d)| d.program == index)
                .map(|(i, _)| i)
                .collect();
            if slots.is_empty() {
                continue;
            }

            ensure_ring(&self.device, program, slots.len(), stride);
            let Some(ring) = program.ring.as_ref() else { continue };

            let mut bytes = vec![0u8; slots.len() * stride as usize];
            for (slot, &draw_index) in slots.iter().enumerate() {
                let at = slot * stride as usize;
                let snapshot = &draws[draw_index].uniforms;
                bytes[at..at + snapshot.len()].copy_from_slice(snapshot);
                offsets[draw_index] = (slot as u32) * stride;
            }
            self.queue.write_buffer(&ring.buffer, 0, &bytes);
        }

        offsets
    }

    fn write_uniform(&mut self, name: &str, values: &[f32]) {
        let Some(index) = self.current_program else {
            log::warn!("uniform `{name}` set with no program in use");
            return;
        };
        let program = &mut self.programs[index];

        let Some(field) = program.uniforms.as_ref().and_then(|b| b.field(name)) else {
            log::trace!("uniform `{name}` is not used by the current program");
            return;
        };

        if usize::from(field.components) != values.len() {
            log::warn!(
                "uniform `{name}` has {} component(s), got {}",
                field.components,
                values.len()
            );
            return;
        }

        let start = field.offset as usize;
        let bytes: &[u8] = bytemuck::cast_slice(values);
        program.staging[start..start + bytes.len()].copy_from_slice(bytes);
    }

    fn ensure_pipeline(&mut self, program_index: usize, key: PipelineKey) {
        let shaders = &self.shaders;
        let program = &mut self.programs[program_index];
        if program.pipelines.contains_key(&key) {
            return;
        }

        let vs = &shaders[program.vertex];
        let fs = &shaders[program.fragment];

        let attributes = [wgpu::VertexAttribute {
            format: vertex_format(key.components),
            offset: 0,
            shader_location: key.location,
        }];
        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: u64::from(key.components) * std::mem::size_of::<f32>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        };

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("mandel program pipeline"),
                layout: Some(&program.pipeline_layout),

                vertex: wgpu::VertexState {
                    module: &vs.module,
                    entry_point: Some(vs.reflection.entry_point.as_str()),
                    compilation_options: Default::default(),
                    buffers: &[vertex_layout],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &fs.module,
                    entry_point: Some(fs.reflection.entry_point.as_str()),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format,
                        blend: key.blend.map(blend_state),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: match key.topology {
                        Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
                        Topology::Points => wgpu::PrimitiveTopology::PointList,
                    },
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        log::debug!("created pipeline {key:?} for program {program_index}");
        program.pipelines.insert(key, pipeline);
    }
}

impl GraphicsContext for WgpuGraphics {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, GfxError> {
        let reflection = ShaderReflection::parse(stage, source)?;

        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(match stage {
                    ShaderStage::Vertex => "mandel vertex shader",
                    ShaderStage::Fragment => "mandel fragment shader",
                }),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

        let id = ShaderId::new(self.shaders.len() as u32);
        self.shaders.push(CompiledShader { module, reflection });
        log::debug!("compiled {stage} shader {id:?}");
        Ok(id)
    }

    fn link_program(
        &mut self,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<ProgramId, GfxError> {
        let vs = self.shader(vertex)?;
        let fs = self.shader(fragment)?;
        let uniforms = reflect::link_interface(&vs.reflection, &fs.reflection)?;

        let bind_group_layout = uniforms.as_ref().map(|block| {
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("mandel uniform bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: true,
                            min_binding_size: NonZeroU64::new(u64::from(block.span)),
                        },
                        count: None,
                    }],
                })
        });

        let layouts: Vec<&wgpu::BindGroupLayout> = bind_group_layout.iter().collect();
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("mandel program pipeline layout"),
                bind_group_layouts: &layouts,
                immediate_size: 0,
            });

        let staging = vec![0u8; uniforms.as_ref().map_or(0, |b| b.span as usize)];

        let id = ProgramId::new(self.programs.len() as u32);
        self.programs.push(LinkedProgram {
            vertex: vertex.index(),
            fragment: fragment.index(),
            uniforms,
            staging,
            bind_group_layout,
            pipeline_layout,
            pipelines: HashMap::new(),
            ring: None,
        });
        log::debug!("linked program {id:?}");
        Ok(id)
    }

    fn use_program(&mut self, program: ProgramId) {
        if program.index() < self.programs.len() {
            self.current_program = Some(program.index());
        } else {
            log::warn!("use_program: unknown program {program:?}");
        }
    }

    fn create_vertex_buffer(
        &mut self,
        program: ProgramId,
        attribute: &str,
        data: &[f32],
    ) -> Result<BufferId, GfxError> {
        let linked = self
            .programs
            .get(program.index())
            .ok_or(GfxError::InvalidHandle("program"))?;
        let slot = self.shaders[linked.vertex]
            .reflection
            .input(attribute)
            .ok_or_else(|| GfxError::UnknownAttribute(attribute.to_owned()))?;

        if !(1..=4).contains(&slot.components) {
            return Err(GfxError::Link(format!(
                "attribute `{attribute}` is not a float scalar or vector"
            )));
        }

        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mandel vertex buffer"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let id = BufferId::new(self.buffers.len() as u32);
        self.buffers.push(VertexBuffer {
            buffer,
            location: slot.location,
            components: slot.components,
            vertex_count: (data.len() / usize::from(slot.components)) as u32,
        });
        Ok(id)
    }

    fn enable_vertex_buffer(&mut self, buffer: BufferId) {
        if buffer.index() < self.buffers.len() {
            self.bound_buffer = Some(buffer.index());
        } else {
            log::warn!("enable_vertex_buffer: unknown buffer {buffer:?}");
        }
    }

    fn set_uniform_1f(&mut self, name: &str, value: f32) {
        self.write_uniform(name, &[value]);
    }

    fn set_uniform_2f(&mut self, name: &str, x: f32, y: f32) {
        self.write_uniform(name, &[x, y]);
    }

    fn draw_arrays(&mut self, topology: Topology, first: u32, count: u32) {
        let (Some(program), Some(buffer)) = (self.current_program, self.bound_buffer) else {
            log::warn!("draw_arrays without a program and vertex buffer bound");
            return;
        };

        let vb = &self.buffers[buffer];
        if first.saturating_add(count) > vb.vertex_count {
            log::warn!(
                "draw_arrays range {first}..{} exceeds {} vertices",
                first.saturating_add(count),
                vb.vertex_count
            );
            return;
        }
        if count == 0 {
            return;
        }

        let key = PipelineKey {
            topology,
            blend: self.blend,
            location: vb.location,
            components: vb.components,
        };
        self.ensure_pipeline(program, key);

        self.pending.push_draw(PendingDraw {
            program,
            buffer,
            key,
            first,
            count,
            viewport: self.viewport,
            uniforms: self.programs[program].staging.clone(),
        });
    }

    fn enable_blend(&mut self, func: BlendFunc) {
        self.blend = Some(func);
    }

    fn disable_blend(&mut self) {
        self.blend = None;
    }

    fn clear(&mut self, color: ColorRgba) {
        self.pending.set_clear(color);
    }

    fn set_viewport(&mut self, rect: ViewportRect) {
        self.viewport = Some(rect);
    }
}

/// Clear and draws recorded since the last flush.
#[derive(Debug, Default)]
struct DrawQueue {
    clear: Option<ColorRgba>,
    draws: VecDeque<PendingDraw>,
}

impl DrawQueue {
    fn is_empty(&self) -> bool {
        self.clear.is_none() && self.draws.is_empty()
    }

    fn push_draw(&mut self, draw: PendingDraw) {
        if self.draws.len() == MAX_QUEUED_DRAWS {
            self.draws.pop_front();
            log::warn!("more than {MAX_QUEUED_DRAWS} draws without a flush; dropping the oldest");
        }
        self.draws.push_back(draw);
    }

    fn set_clear(&mut self, color: ColorRgba) {
        // Earlier draws would be wiped by the clear anyway.
        self.draws.clear();
        self.clear = Some(color);
    }

    fn discard_draws(&mut self) -> usize {
        let dropped = self.draws.len();
        self.draws.clear();
        dropped
    }

    fn take(&mut self) -> (Option<ColorRgba>, Vec<PendingDraw>) {
        (self.clear.take(), std::mem::take(&mut self.draws).into())
    }
}

fn ensure_ring(device: &wgpu::Device, program: &mut LinkedProgram, slots: usize, stride: u32) {
    if program.ring.as_ref().is_some_and(|r| r.capacity >= slots) {
        return;
    }
    let (Some(block), Some(bgl)) = (program.uniforms.as_ref(), program.bind_group_layout.as_ref())
    else {
        return;
    };

    let capacity = slots.next_power_of_two().max(4);
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("mandel uniform ring"),
        size: capacity as u64 * u64::from(stride),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("mandel uniform bind group"),
        layout: bgl,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(u64::from(block.span)),
            }),
        }],
    });

    program.ring = Some(UniformRing {
        buffer,
        bind_group,
        capacity,
    });
}

fn uniform_stride(span: u32, alignment: u32) -> u32 {
    let alignment = alignment.max(1);
    span.max(1).div_ceil(alignment) * alignment
}

fn vertex_format(components: u8) -> wgpu::VertexFormat {
    match components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32x4,
    }
}

fn blend_state(func: BlendFunc) -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: blend_factor(func.src),
        dst_factor: blend_factor(func.dst),
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

fn blend_factor(f: BlendFactor) -> wgpu::BlendFactor {
    match f {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
    }
}
