//! A linked program plus the full-screen quad it draws with.

use mandel_engine::coords::{ColorRgba, ViewportRect};
use mandel_engine::gfx::{
    BufferId, GfxError, GraphicsContext, ProgramId, ShaderStage, Topology,
};

/// Vertex attribute the quad is bound to.
pub const QUAD_ATTRIBUTE: &str = "a_position";

/// Two clip-space triangles covering the whole surface.
#[rustfmt::skip]
pub const FULL_SCREEN_QUAD: [f32; 12] = [
    -1.0, -1.0,
    1.0, -1.0,
    -1.0, 1.0,
    -1.0, 1.0,
    1.0, -1.0,
    1.0, 1.0,
];

/// Vertex and fragment WGSL for one program.
#[derive(Debug, Copy, Clone)]
pub struct ShaderSources<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}

/// Handles for a ready-to-draw program. Owns no GPU objects itself.
#[derive(Debug, Copy, Clone)]
pub struct ShaderProgram {
    program: ProgramId,
    quad: BufferId,
    vertex_count: u32,
}

impl ShaderProgram {
    /// Compiles and links `sources`, uploads the quad, and leaves the context
    /// ready to draw: viewport set, surface cleared, program in use, quad bound.
    pub fn build<G>(
        gfx: &mut G,
        sources: ShaderSources<'_>,
        viewport: ViewportRect,
        clear: ColorRgba,
    ) -> Result<Self, GfxError>
    where
        G: GraphicsContext + ?Sized,
    {
        let vs = gfx.compile_shader(ShaderStage::Vertex, sources.vertex)?;
        let fs = gfx.compile_shader(ShaderStage::Fragment, sources.fragment)?;
        let program = gfx.link_program(vs, fs)?;

        let quad = gfx.create_vertex_buffer(program, QUAD_ATTRIBUTE, &FULL_SCREEN_QUAD)?;

        gfx.set_viewport(viewport);
        gfx.clear(clear);
        gfx.use_program(program);
        gfx.enable_vertex_buffer(quad);

        Ok(Self {
            program,
            quad,
            vertex_count: (FULL_SCREEN_QUAD.len() / 2) as u32,
        })
    }

    pub fn id(&self) -> ProgramId {
        self.program
    }

    pub fn quad(&self) -> BufferId {
        self.quad
    }

    /// Draws the quad with whatever blend state is current.
    pub fn draw_quad<G>(&self, gfx: &mut G)
    where
        G: GraphicsContext + ?Sized,
    {
        gfx.draw_arrays(Topology::Triangles, 0, self.vertex_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaders::MANDELBROT;
    use crate::testing::{Call, RecordingGraphics};

    fn viewport() -> ViewportRect {
        ViewportRect::from_size(640, 480)
    }

    #[test]
    fn build_runs_the_setup_sequence_in_order() {
        let mut gfx = RecordingGraphics::default();
        let program = ShaderProgram::build(&mut gfx, MANDELBROT, viewport(), ColorRgba::black())
            .unwrap();

        assert_eq!(
            gfx.calls,
            vec![
                Call::Compile(ShaderStage::Vertex),
                Call::Compile(ShaderStage::Fragment),
                Call::Link,
                Call::CreateVertexBuffer {
                    attribute: QUAD_ATTRIBUTE.to_owned(),
                    floats: 12,
                },
                Call::Viewport(viewport()),
                Call::Clear(ColorRgba::black()),
                Call::UseProgram(program.id()),
                Call::EnableVertexBuffer(program.quad()),
            ]
        );
    }

    #[test]
    fn quad_is_two_triangles() {
        let mut gfx = RecordingGraphics::default();
        let program = ShaderProgram::build(&mut gfx, MANDELBROT, viewport(), ColorRgba::black())
            .unwrap();
        gfx.calls.clear();

        program.draw_quad(&mut gfx);
        assert_eq!(gfx.draws(), vec![(Topology::Triangles, 0, 6, None)]);
    }

    #[test]
    fn fragment_compile_error_stops_the_build() {
        let mut gfx = RecordingGraphics::default();
        let sources = ShaderSources {
            fragment: "@fragment fn fs_main( {",
            ..MANDELBROT
        };

        let err = ShaderProgram::build(&mut gfx, sources, viewport(), ColorRgba::black())
            .unwrap_err();
        assert!(matches!(err, GfxError::Compile { stage: ShaderStage::Fragment, .. }));
        assert!(!gfx.calls.contains(&Call::Link));
    }

    #[test]
    fn link_error_stops_the_build() {
        let mut gfx = RecordingGraphics::default();
        let sources = ShaderSources {
            vertex: MANDELBROT.fragment,
            ..MANDELBROT
        };

        // Vertex unit without a vertex entry point fails at compile time.
        assert!(ShaderProgram::build(&mut gfx, sources, viewport(), ColorRgba::black()).is_err());

        let mut gfx = RecordingGraphics::default();
        gfx.fail_link = true;
        let err = ShaderProgram::build(&mut gfx, MANDELBROT, viewport(), ColorRgba::black())
            .unwrap_err();
        assert!(matches!(err, GfxError::Link(_)));
    }

    #[test]
    fn missing_attribute_is_reported() {
        let mut gfx = RecordingGraphics::default();
        let sources = ShaderSources {
            vertex: "@vertex fn vs_main(@location(0) pos: vec2<f32>) -> @builtin(position) vec4<f32> { return vec4<f32>(pos, 0.0, 1.0); }",
            ..MANDELBROT
        };

        let err = ShaderProgram::build(&mut gfx, sources, viewport(), ColorRgba::black())
            .unwrap_err();
        assert!(matches!(err, GfxError::UnknownAttribute(ref a) if a == QUAD_ATTRIBUTE));
    }
}
