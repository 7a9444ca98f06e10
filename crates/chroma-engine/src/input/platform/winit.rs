use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use winit::window::Window;

use crate::input::{MouseButton, PointerEvent};

/// Translates a winit `WindowEvent` into a [`PointerEvent`].
///
/// Returns `None` for events the input subsystem does not represent.
pub fn translate_window_event(window: &Window, event: &WindowEvent) -> Option<PointerEvent> {
    match event {
        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = to_logical_f32(window, *position);
            Some(PointerEvent::Moved { x, y })
        }

        WindowEvent::CursorLeft { .. } => Some(PointerEvent::Left),

        WindowEvent::MouseInput { state, button, .. } => {
            let button = map_mouse_button(*button);
            Some(match state {
                ElementState::Pressed => PointerEvent::Pressed { button },
                ElementState::Released => PointerEvent::Released { button },
            })
        }

        _ => None,
    }
}

/// Window width in logical pixels.
pub fn logical_width(window: &Window) -> f32 {
    let logical = window.inner_size().to_logical::<f64>(window.scale_factor());
    logical.width as f32
}

fn to_logical_f32(window: &Window, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let logical = pos.to_logical::<f64>(window.scale_factor());
    (logical.x as f32, logical.y as f32)
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
