//! Frame driver: advance the clock, upload uniforms, draw, schedule the next frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mandel_engine::coords::{ColorRgba, ViewportRect};
use mandel_engine::core::FrameScheduler;
use mandel_engine::gfx::{BlendFunc, GfxError, GraphicsContext};
use mandel_engine::time::FrameTime;

use crate::config::{TimeStep, ViewerConfig};
use crate::program::{ShaderProgram, ShaderSources};
use crate::uniforms::{self, UniformSet};
use crate::viewport::{ViewState, ViewportController};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    /// No program yet, or startup failed.
    Uninitialized,
    Running,
    /// The stop signal was observed. Terminal.
    Stopped,
}

/// Shared stop signal, checked at the top of every frame.
///
/// Clones share the flag, so a handle can be given to another thread.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Drives the fractal program on a [`GraphicsContext`].
pub struct RenderLoop<G: GraphicsContext> {
    gfx: G,
    program: Option<ShaderProgram>,
    state: LoopState,
    stop: StopHandle,

    time_step: TimeStep,
    clear_color: ColorRgba,
    refresh_resolution_on_resize: bool,

    /// Size `u_resolution` was last uploaded with.
    resolution: (u32, u32),
    frames: u64,
}

impl<G: GraphicsContext> RenderLoop<G> {
    pub fn new(gfx: G, config: &ViewerConfig, stop: StopHandle) -> Self {
        Self {
            gfx,
            program: None,
            state: LoopState::Uninitialized,
            stop,
            time_step: config.time_step,
            clear_color: config.clear_color,
            refresh_resolution_on_resize: config.refresh_resolution_on_resize,
            resolution: (0, 0),
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Number of frames rendered by [`render_frame`](Self::render_frame).
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn gfx(&self) -> &G {
        &self.gfx
    }

    pub fn gfx_mut(&mut self) -> &mut G {
        &mut self.gfx
    }

    /// Builds the program for a drawable of `size` and uploads the initial uniforms.
    ///
    /// `u_resolution` is uploaded here once. On error the loop stays
    /// [`LoopState::Uninitialized`].
    pub fn start(
        &mut self,
        sources: ShaderSources<'_>,
        size: (u32, u32),
        view: &ViewState,
    ) -> Result<(), GfxError> {
        if self.state != LoopState::Uninitialized {
            log::warn!("render loop already started ({:?})", self.state);
            return Ok(());
        }

        let viewport = ViewportRect::from_size(size.0, size.1);
        let program = match ShaderProgram::build(&mut self.gfx, sources, viewport, self.clear_color)
        {
            Ok(p) => p,
            Err(e) => {
                log::error!("fractal program setup failed: {e}");
                return Err(e);
            }
        };

        let u = UniformSet::new(view, size);
        self.gfx
            .set_uniform_2f(uniforms::U_RESOLUTION, u.resolution[0], u.resolution[1]);
        self.gfx.set_uniform_2f(uniforms::U_CENTER, u.center[0], u.center[1]);
        self.gfx.set_uniform_1f(uniforms::U_SCALE, u.scale);

        self.program = Some(program);
        self.resolution = size;
        self.state = LoopState::Running;
        log::info!("render loop running at {}x{}", size.0, size.1);
        Ok(())
    }

    /// Runs one frame callback.
    ///
    /// Returns the state after the frame. When the stop signal is seen the loop
    /// moves to [`LoopState::Stopped`] without drawing or scheduling.
    pub fn render_frame(
        &mut self,
        viewport: &mut ViewportController,
        frame: &FrameTime,
        scheduler: &mut (impl FrameScheduler + ?Sized),
    ) -> LoopState {
        let program = match (self.program, self.state) {
            (Some(p), LoopState::Running) => p,
            _ => return self.state,
        };

        if self.stop.is_stopped() {
            self.state = LoopState::Stopped;
            log::info!("render loop stopped after {} frame(s)", self.frames);
            return self.state;
        }

        viewport.tick(self.time_step.step(frame));
        let u = UniformSet::new(&viewport.state(), self.resolution);

        self.gfx.set_uniform_2f(uniforms::U_CENTER, u.center[0], u.center[1]);
        self.gfx.set_uniform_1f(uniforms::U_TIME, u.time);
        self.gfx.set_uniform_1f(uniforms::U_SCALE, u.scale);

        // Second pass composites over the first.
        program.draw_quad(&mut self.gfx);
        self.gfx.enable_blend(BlendFunc::ALPHA);
        program.draw_quad(&mut self.gfx);
        self.gfx.disable_blend();

        scheduler.request_frame();
        self.frames += 1;
        log::trace!("frame {} at t={}", self.frames, u.time);

        self.state
    }

    /// Single unblended redraw of `view` without advancing the clock.
    ///
    /// Used after input when no animation frame is coming. Returns `false`
    /// when there is no program to draw with.
    pub fn redraw_view(&mut self, view: &ViewState) -> bool {
        let Some(program) = self.program else {
            return false;
        };

        let u = UniformSet::new(view, self.resolution);
        self.gfx.set_uniform_2f(uniforms::U_CENTER, u.center[0], u.center[1]);
        self.gfx.set_uniform_1f(uniforms::U_SCALE, u.scale);
        program.draw_quad(&mut self.gfx);
        true
    }

    /// Follows a drawable resize.
    ///
    /// The viewport always tracks the new size; `u_resolution` only when
    /// configured to.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if self.program.is_none() {
            return;
        }

        self.gfx.set_viewport(ViewportRect::from_size(width, height));

        if self.refresh_resolution_on_resize {
            self.resolution = (width, height);
            self.gfx
                .set_uniform_2f(uniforms::U_RESOLUTION, width as f32, height as f32);
        }
    }
}
