/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

/// Nominal height of one wheel "line" in logical pixels.
///
/// Used only to give line-based deltas a pixel magnitude.
pub const WHEEL_LINE_HEIGHT: f32 = 16.0;

/// Mouse wheel delta as reported by the window system.
///
/// Positive `y` means the content should move down, i.e. the wheel was rolled
/// away from the user. `Line` is notched wheel input; `Pixel` is high precision
/// (touchpads), in logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

impl MouseWheelDelta {
    /// Vertical scroll amount in the DOM `WheelEvent.deltaY` convention.
    ///
    /// Positive when the wheel rolls toward the user (page scrolls down),
    /// negative when it rolls away. Line deltas are converted to pixels.
    pub fn dom_delta_y(&self) -> f64 {
        let y = match *self {
            MouseWheelDelta::Line { y, .. } => y * WHEEL_LINE_HEIGHT,
            MouseWheelDelta::Pixel { y, .. } => y,
        };
        -f64::from(y)
    }
}

/// Pointer move event in logical pixels, origin top-left, y growing downward.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerMoveEvent {
    pub x: f32,
    pub y: f32,
}

/// Pointer button event.
///
/// Coordinates are the last known pointer position when the button changed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerButtonEvent {
    pub button: MouseButton,
    pub state: MouseButtonState,
    pub x: f32,
    pub y: f32,
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerMoved(PointerMoveEvent),
    PointerButton(PointerButtonEvent),

    MouseWheel { delta: MouseWheelDelta },

    /// Pointer left the window surface.
    PointerLeft,

    /// Window focus change.
    Focused(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_away_from_user_is_negative_dom_delta() {
        let d = MouseWheelDelta::Line { x: 0.0, y: 1.0 };
        assert!(d.dom_delta_y() < 0.0);
    }

    #[test]
    fn wheel_toward_user_is_positive_dom_delta() {
        let d = MouseWheelDelta::Pixel { x: 0.0, y: -3.5 };
        assert_eq!(d.dom_delta_y(), 3.5);
    }

    #[test]
    fn line_delta_is_scaled_to_pixels() {
        let d = MouseWheelDelta::Line { x: 0.0, y: -2.0 };
        assert_eq!(d.dom_delta_y(), f64::from(2.0 * WHEEL_LINE_HEIGHT));
    }

    #[test]
    fn horizontal_only_scroll_has_zero_vertical_delta() {
        let d = MouseWheelDelta::Pixel { x: 12.0, y: 0.0 };
        assert_eq!(d.dom_delta_y(), 0.0);
    }
}
