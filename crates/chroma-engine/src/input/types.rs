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

/// Pointer events the drag tracker consumes.
///
/// Coordinates are logical pixels relative to the window's top-left corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerEvent {
    Pressed { button: MouseButton },
    Released { button: MouseButton },
    Moved { x: f32, y: f32 },
    /// Pointer left the window surface.
    Left,
}
