//! Pan/zoom state of the fractal view and the input handlers that mutate it.

use mandel_engine::coords::DVec2;

use crate::config::ViewerConfig;

/// Point of the complex plane at the middle of the surface, the zoom level,
/// and the animation clock.
///
/// `scale` is complex-plane units per half surface height; it is always
/// positive. `time` never decreases.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewState {
    pub center: DVec2,
    pub scale: f64,
    pub time: f64,
}

impl ViewState {
    pub const INITIAL: Self = Self {
        center: DVec2::new(-0.3, 0.0),
        scale: 1.0,
        time: 0.0,
    };
}

impl Default for ViewState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Drag-to-pan tracking. `last_*` are pointer coordinates in logical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PointerDragState {
    pub active: bool,
    pub last_x: f64,
    pub last_y: f64,
}

/// Maps wheel and pointer input to view changes and owns the animation clock.
///
/// Every handler is total. Input that changes the view sets a dirty flag the
/// caller can use to redraw without waiting for the next animation frame.
#[derive(Debug, Clone)]
pub struct ViewportController {
    view: ViewState,
    drag: PointerDragState,
    zoom_factor: f64,
    panning_speed: f64,
    dirty: bool,
}

impl ViewportController {
    pub fn new(config: &ViewerConfig) -> Self {
        Self::with_params(config.initial_view, config.zoom_factor, config.panning_speed)
    }

    pub fn with_params(initial: ViewState, zoom_factor: f64, panning_speed: f64) -> Self {
        Self {
            view: initial,
            drag: PointerDragState::default(),
            zoom_factor,
            panning_speed,
            dirty: false,
        }
    }

    /// Copy of the current view.
    pub fn state(&self) -> ViewState {
        self.view
    }

    pub fn drag(&self) -> PointerDragState {
        self.drag
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether input changed the view since the last call, and resets the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Zooms out for `delta_y > 0` (wheel rolled toward the user), in otherwise.
    ///
    /// `delta_y` follows the DOM wheel convention; only its sign is used.
    pub fn on_wheel(&mut self, delta_y: f64) {
        let factor = if delta_y > 0.0 {
            1.0 + self.zoom_factor
        } else {
            1.0 - self.zoom_factor
        };

        // Only representational limits are enforced.
        self.view.scale = (self.view.scale * factor).clamp(f64::MIN_POSITIVE, f64::MAX);
        self.dirty = true;

        log::trace!("wheel {delta_y}: scale {}", self.view.scale);
    }

    pub fn on_pointer_down(&mut self, x: f64, y: f64) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        self.drag = PointerDragState {
            active: true,
            last_x: x,
            last_y: y,
        };
    }

    pub fn on_pointer_up(&mut self) {
        self.drag.active = false;
    }

    /// Pans while a drag is active. Pointer y grows downward, plane y grows upward.
    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        if !self.drag.active || !(x.is_finite() && y.is_finite()) {
            return;
        }

        let dx = x - self.drag.last_x;
        let dy = y - self.drag.last_y;
        let step = self.panning_speed * self.view.scale;

        self.view.center.x -= dx * step;
        self.view.center.y += dy * step;

        self.drag.last_x = x;
        self.drag.last_y = y;
        self.dirty = true;
    }

    /// Advances the animation clock. Negative or non-finite steps are ignored.
    pub fn tick(&mut self, delta_time: f64) {
        if delta_time.is_finite() && delta_time > 0.0 {
            self.view.time += delta_time;
        }
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(&ViewerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn controller() -> ViewportController {
        ViewportController::default()
    }

    #[test]
    fn initial_state_is_exact() {
        let v = controller().state();
        assert_eq!(v.center, DVec2::new(-0.3, 0.0));
        assert_eq!(v.scale, 1.0);
        assert_eq!(v.time, 0.0);
        assert!(!controller().drag().active);
    }

    #[test]
    fn wheel_toward_user_zooms_out() {
        let mut c = controller();
        c.on_wheel(100.0);
        assert!((c.state().scale - 1.08).abs() < EPS);
        assert!(c.is_dirty());
    }

    #[test]
    fn wheel_away_or_zero_zooms_in() {
        let mut c = controller();
        c.on_wheel(-3.0);
        assert!((c.state().scale - 0.92).abs() < EPS);

        let before = c.state().scale;
        c.on_wheel(0.0);
        assert!(c.state().scale < before);
    }

    #[test]
    fn wheel_is_strictly_monotonic_in_direction() {
        let mut c = controller();
        for _ in 0..50 {
            let before = c.state().scale;
            c.on_wheel(1.0);
            assert!(c.state().scale > before);
        }
        for _ in 0..100 {
            let before = c.state().scale;
            c.on_wheel(-1.0);
            assert!(c.state().scale < before);
        }
    }

    #[test]
    fn scale_stays_positive_under_extreme_zoom_in() {
        let mut c = controller();
        for _ in 0..20_000 {
            c.on_wheel(-1.0);
            assert!(c.state().scale > 0.0);
        }
        assert_eq!(c.state().scale, f64::MIN_POSITIVE);
    }

    #[test]
    fn scale_stays_finite_under_extreme_zoom_out() {
        let mut c = controller();
        for _ in 0..20_000 {
            c.on_wheel(1.0);
        }
        assert_eq!(c.state().scale, f64::MAX);
    }

    #[test]
    fn nan_wheel_delta_zooms_in() {
        let mut c = controller();
        c.on_wheel(f64::NAN);
        assert!(c.state().scale < 1.0);
    }

    #[test]
    fn move_without_drag_does_nothing() {
        let mut c = controller();
        c.on_pointer_move(50.0, 70.0);
        assert_eq!(c.state().center, ViewState::INITIAL.center);
        assert!(!c.is_dirty());
    }

    #[test]
    fn drag_moves_center_against_pointer_x() {
        let mut c = controller();
        c.on_pointer_down(100.0, 100.0);
        c.on_pointer_move(110.0, 90.0);

        let v = c.state();
        assert!((v.center.x - (-0.3 - 0.05)).abs() < EPS);
        // dy = -10: the pointer moved up the screen.
        assert!((v.center.y - (-0.05)).abs() < EPS);
        assert_eq!(c.drag().last_x, 110.0);
        assert_eq!(c.drag().last_y, 90.0);
        assert!(c.is_dirty());
    }

    #[test]
    fn dragging_down_the_screen_raises_center_y() {
        let mut c = controller();
        c.on_pointer_down(100.0, 100.0);
        c.on_pointer_move(100.0, 110.0);
        assert!((c.state().center.y - 0.05).abs() < EPS);
        assert_eq!(c.state().center.x, -0.3);
    }

    #[test]
    fn pan_delta_scales_linearly_with_scale() {
        let pan_at = |scale: f64| {
            let initial = ViewState {
                scale,
                ..ViewState::INITIAL
            };
            let mut c = ViewportController::with_params(initial, 0.08, 0.005);
            c.on_pointer_down(0.0, 0.0);
            c.on_pointer_move(20.0, -40.0);
            c.state().center - initial.center
        };

        let base = pan_at(1.0);
        let quad = pan_at(4.0);
        assert!((quad.x - 4.0 * base.x).abs() < EPS);
        assert!((quad.y - 4.0 * base.y).abs() < EPS);
    }

    #[test]
    fn successive_moves_are_relative_to_last_position() {
        let mut c = controller();
        c.on_pointer_down(0.0, 0.0);
        c.on_pointer_move(10.0, 0.0);
        c.on_pointer_move(20.0, 0.0);
        assert!((c.state().center.x - (-0.3 - 0.1)).abs() < EPS);
    }

    #[test]
    fn pointer_up_ends_drag() {
        let mut c = controller();
        c.on_pointer_down(0.0, 0.0);
        c.on_pointer_up();
        c.on_pointer_move(30.0, 30.0);
        assert_eq!(c.state().center, ViewState::INITIAL.center);
        assert!(!c.drag().active);
    }

    #[test]
    fn non_finite_pointer_coordinates_are_ignored() {
        let mut c = controller();
        c.on_pointer_down(0.0, 0.0);
        c.on_pointer_move(f64::INFINITY, 5.0);
        assert_eq!(c.state().center, ViewState::INITIAL.center);
        assert_eq!(c.drag().last_x, 0.0);
    }

    #[test]
    fn tick_accumulates_fixed_steps() {
        let mut c = controller();
        for _ in 0..500 {
            c.tick(0.02);
        }
        assert!((c.state().time - 10.0).abs() < 1e-9);
    }

    #[test]
    fn tick_never_goes_backwards() {
        let mut c = controller();
        c.tick(0.5);
        c.tick(-1.0);
        c.tick(f64::NAN);
        c.tick(f64::INFINITY);
        assert_eq!(c.state().time, 0.5);
    }

    #[test]
    fn tick_does_not_mark_dirty() {
        let mut c = controller();
        c.tick(0.02);
        assert!(!c.take_dirty());
    }

    #[test]
    fn take_dirty_resets_flag() {
        let mut c = controller();
        c.on_wheel(1.0);
        assert!(c.take_dirty());
        assert!(!c.take_dirty());
    }
}
