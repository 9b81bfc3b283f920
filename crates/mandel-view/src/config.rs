use anyhow::{ensure, Result};
use mandel_engine::coords::ColorRgba;
use mandel_engine::time::FrameTime;

use crate::viewport::ViewState;

/// How far the animation clock advances per rendered frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TimeStep {
    /// Constant step per frame; animation speed follows the display refresh rate.
    Fixed(f64),
    /// Step = measured frame delta (seconds) * `rate`.
    WallClock { rate: f64 },
}

impl TimeStep {
    pub fn step(&self, frame: &FrameTime) -> f64 {
        match *self {
            TimeStep::Fixed(step) => step,
            TimeStep::WallClock { rate } => f64::from(frame.dt) * rate,
        }
    }
}

impl Default for TimeStep {
    fn default() -> Self {
        TimeStep::Fixed(0.02)
    }
}

/// Viewer tuning.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Relative scale change per wheel event.
    pub zoom_factor: f64,

    /// Complex-plane units per pointer pixel at scale 1.
    pub panning_speed: f64,

    pub time_step: TimeStep,

    pub initial_view: ViewState,

    /// Re-upload `u_resolution` when the surface is resized.
    ///
    /// Off by default: the resolution uniform keeps the size captured at startup
    /// and the image stretches with the window.
    pub refresh_resolution_on_resize: bool,

    /// Color the surface is cleared to at startup.
    pub clear_color: ColorRgba,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            zoom_factor: 0.08,
            panning_speed: 0.005,
            time_step: TimeStep::default(),
            initial_view: ViewState::INITIAL,
            refresh_resolution_on_resize: false,
            clear_color: ColorRgba::black(),
        }
    }
}

impl ViewerConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.zoom_factor > 0.0 && self.zoom_factor < 1.0,
            "zoom_factor must be in (0, 1), got {}",
            self.zoom_factor
        );
        ensure!(
            self.panning_speed.is_finite(),
            "panning_speed must be finite, got {}",
            self.panning_speed
        );

        let step_ok = match self.time_step {
            TimeStep::Fixed(step) => step.is_finite() && step >= 0.0,
            TimeStep::WallClock { rate } => rate.is_finite() && rate >= 0.0,
        };
        ensure!(step_ok, "time step must be finite and non-negative: {:?}", self.time_step);

        let view = &self.initial_view;
        ensure!(
            view.scale.is_finite() && view.scale > 0.0,
            "initial scale must be positive and finite, got {}",
            view.scale
        );
        ensure!(view.center.is_finite(), "initial center must be finite");
        ensure!(
            view.time.is_finite() && view.time >= 0.0,
            "initial time must be finite and non-negative"
        );
        ensure!(self.clear_color.is_finite(), "clear color must be finite");

        Ok(())
    }
}
