use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::window::Window;

use crate::input::{
    InputEvent, InputState, MouseButton, MouseButtonState, MouseWheelDelta, PointerButtonEvent,
    PointerMoveEvent,
};

/// Translates a winit `WindowEvent` into an engine `InputEvent`.
///
/// Returns `None` for events not represented by the input subsystem.
pub(crate) fn translate_window_event(
    window: &Window,
    state: &InputState,
    event: &WindowEvent,
) -> Option<InputEvent> {
    match event {
        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::CursorLeft { .. } => Some(InputEvent::PointerLeft),

        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = to_logical_f32(window.scale_factor(), *position);
            Some(InputEvent::PointerMoved(PointerMoveEvent { x, y }))
        }

        WindowEvent::MouseInput { state: st, button, .. } => {
            let st = match st {
                ElementState::Pressed => MouseButtonState::Pressed,
                ElementState::Released => MouseButtonState::Released,
            };
            pointer_button(state, map_mouse_button(*button), st)
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let delta = map_wheel_delta(window.scale_factor(), *delta);
            Some(InputEvent::MouseWheel { delta })
        }

        _ => None,
    }
}

/// Builds a button event at the last tracked pointer position.
///
/// winit 0.30 has no cursor query. A press with no known position is dropped so
/// a drag never starts from a made-up point; a release is still delivered.
fn pointer_button(
    state: &InputState,
    button: MouseButton,
    st: MouseButtonState,
) -> Option<InputEvent> {
    let (x, y) = match (state.pointer_pos, st) {
        (Some(pos), _) => pos,
        (None, MouseButtonState::Pressed) => {
            log::trace!("dropping {button:?} press with no pointer position");
            return None;
        }
        (None, MouseButtonState::Released) => (0.0, 0.0),
    };

    Some(InputEvent::PointerButton(PointerButtonEvent {
        button,
        state: st,
        x,
        y,
    }))
}

fn to_logical_f32(scale: f64, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let logical = pos.to_logical::<f64>(scale);
    (logical.x as f32, logical.y as f32)
}

fn map_wheel_delta(scale: f64, delta: MouseScrollDelta) -> MouseWheelDelta {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => MouseWheelDelta::Line { x, y },
        MouseScrollDelta::PixelDelta(p) => {
            let (x, y) = to_logical_f32(scale, p);
            MouseWheelDelta::Pixel { x, y }
        }
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_wheel_delta_is_converted_to_logical_pixels() {
        let raw = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -20.0));
        let d = map_wheel_delta(2.0, raw);
        assert_eq!(d, MouseWheelDelta::Pixel { x: 0.0, y: -10.0 });
    }

    #[test]
    fn line_wheel_delta_passes_through() {
        let d = map_wheel_delta(2.0, MouseScrollDelta::LineDelta(0.0, 1.0));
        assert_eq!(d, MouseWheelDelta::Line { x: 0.0, y: 1.0 });
    }

    #[test]
    fn position_is_divided_by_scale_factor() {
        let (x, y) = to_logical_f32(1.5, PhysicalPosition::new(300.0, 150.0));
        assert_eq!((x, y), (200.0, 100.0));
    }

    #[test]
    fn press_uses_tracked_pointer_position() {
        let mut state = InputState::default();
        state.apply_event(&InputEvent::PointerMoved(PointerMoveEvent { x: 40.0, y: 30.0 }));

        let ev = pointer_button(&state, MouseButton::Left, MouseButtonState::Pressed);
        assert_eq!(
            ev,
            Some(InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Left,
                state: MouseButtonState::Pressed,
                x: 40.0,
                y: 30.0,
            }))
        );
    }

    #[test]
    fn press_without_pointer_position_is_dropped() {
        let mut state = InputState::default();
        assert_eq!(pointer_button(&state, MouseButton::Left, MouseButtonState::Pressed), None);

        state.apply_event(&InputEvent::PointerMoved(PointerMoveEvent { x: 5.0, y: 5.0 }));
        state.apply_event(&InputEvent::PointerLeft);
        assert_eq!(pointer_button(&state, MouseButton::Right, MouseButtonState::Pressed), None);
    }

    #[test]
    fn release_without_pointer_position_still_ends_a_drag() {
        let state = InputState::default();
        let ev = pointer_button(&state, MouseButton::Left, MouseButtonState::Released);
        assert!(matches!(
            ev,
            Some(InputEvent::PointerButton(PointerButtonEvent {
                state: MouseButtonState::Released,
                ..
            }))
        ));
    }

    #[test]
    fn buttons_map_one_to_one() {
        assert_eq!(map_mouse_button(WinitMouseButton::Left), MouseButton::Left);
        assert_eq!(map_mouse_button(WinitMouseButton::Other(7)), MouseButton::Other(7));
    }
}
