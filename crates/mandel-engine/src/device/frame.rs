/// One acquired surface texture plus the encoder recording into it.
///
/// Hand it back to `Gpu::submit` before acquiring the next frame; the surface
/// texture blocks further acquisition while alive.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
