//! `App` implementation wiring the runtime to the viewport and render loop.

use anyhow::Context;
use mandel_engine::core::{App, AppControl, FrameCtx, FrameScheduler, StartCtx};
use mandel_engine::gfx::{GraphicsContext, WgpuGraphics};
use mandel_engine::input::{InputEvent, MouseButtonState, PointerButtonEvent, PointerMoveEvent};
use mandel_engine::time::FrameTime;

use crate::config::ViewerConfig;
use crate::program::ShaderSources;
use crate::render_loop::{LoopState, RenderLoop, StopHandle};
use crate::shaders::MANDELBROT;
use crate::viewport::ViewportController;

/// The Mandelbrot viewer as a runtime application.
pub struct FractalApp {
    config: ViewerConfig,
    sources: ShaderSources<'static>,
    viewport: ViewportController,
    render_loop: Option<RenderLoop<WgpuGraphics>>,
    stop: StopHandle,
}

impl FractalApp {
    pub fn new(config: ViewerConfig) -> Self {
        Self::with_sources(config, MANDELBROT)
    }

    pub fn with_sources(config: ViewerConfig, sources: ShaderSources<'static>) -> Self {
        Self {
            viewport: ViewportController::new(&config),
            config,
            sources,
            render_loop: None,
            stop: StopHandle::new(),
        }
    }

    /// Handle that ends the animation at the next frame.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }
}

impl App for FractalApp {
    fn on_start(&mut self, ctx: &mut StartCtx<'_, '_>) -> anyhow::Result<()> {
        let gpu = ctx.gpu;
        let gfx =
            WgpuGraphics::new(gpu.device().clone(), gpu.queue().clone(), gpu.surface_format());
        let size = gpu.size();

        let mut render_loop = RenderLoop::new(gfx, &self.config, self.stop.clone());
        render_loop
            .start(self.sources, (size.width, size.height), &self.viewport.state())
            .context("failed to build the fractal program")?;

        self.render_loop = Some(render_loop);
        Ok(())
    }

    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        apply_input(&mut self.viewport, event)
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        if let Some(render_loop) = self.render_loop.as_mut() {
            render_loop.on_resize(width, height);
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(render_loop) = self.render_loop.as_mut() else {
            return AppControl::Continue;
        };

        let time = ctx.time;
        advance(render_loop, &mut self.viewport, &time, ctx);

        if !render_loop.gfx().has_pending() {
            return AppControl::Continue;
        }

        let mut presented = false;
        let control = ctx.render(|target| {
            render_loop.gfx_mut().flush(target);
            presented = true;
        });
        // A minimized window or a lost surface texture skips the flush.
        if !presented {
            render_loop.gfx_mut().discard_pending();
        }
        control
    }
}

/// Routes one input event to the controller.
///
/// Returns [`AppControl::Redraw`] when the view changed, so the change is shown
/// even when no animation frame is pending.
fn apply_input(viewport: &mut ViewportController, event: &InputEvent) -> AppControl {
    match *event {
        InputEvent::MouseWheel { delta } => viewport.on_wheel(delta.dom_delta_y()),

        InputEvent::PointerButton(PointerButtonEvent { state, x, y, .. }) => match state {
            MouseButtonState::Pressed => viewport.on_pointer_down(f64::from(x), f64::from(y)),
            MouseButtonState::Released => viewport.on_pointer_up(),
        },

        InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
            viewport.on_pointer_move(f64::from(x), f64::from(y))
        }

        // Button releases are not delivered while unfocused.
        InputEvent::Focused(false) => viewport.on_pointer_up(),

        InputEvent::Focused(true) | InputEvent::PointerLeft => {}
    }

    if viewport.is_dirty() {
        AppControl::Redraw
    } else {
        AppControl::Continue
    }
}

/// One frame callback: animate while running, otherwise show pending input.
fn advance<G, S>(
    render_loop: &mut RenderLoop<G>,
    viewport: &mut ViewportController,
    time: &FrameTime,
    scheduler: &mut S,
) -> LoopState
where
    G: GraphicsContext,
    S: FrameScheduler + ?Sized,
{
    // A running loop redraws from the current view anyway.
    let dirty = viewport.take_dirty();

    match render_loop.state() {
        LoopState::Running => render_loop.render_frame(viewport, time, scheduler),
        state => {
            if dirty {
                render_loop.redraw_view(&viewport.state());
            }
            state
        }
    }
}
