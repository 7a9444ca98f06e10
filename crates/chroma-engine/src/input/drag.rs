use super::types::{MouseButton, PointerEvent};

/// Drag state of a horizontal range control.
///
/// Tracks whether the primary button is held and the last value seen while
/// dragging. Nothing reads the value back; it only changes this struct.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RangeDrag {
    min: f32,
    max: f32,
    dragging: bool,
    value: f32,
}

impl RangeDrag {
    pub fn new(min: f32, max: f32) -> Self {
        debug_assert!(min <= max);
        Self {
            min,
            max,
            dragging: false,
            value: min,
        }
    }

    pub fn dragging(&self) -> bool {
        self.dragging
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn press(&mut self) {
        self.dragging = true;
    }

    pub fn release(&mut self) {
        self.dragging = false;
    }

    /// Records `value` if a drag is in progress.
    ///
    /// Pinned at either end with an identical incoming value, nothing changes.
    /// Returns `true` if the stored value was written.
    pub fn drag_to(&mut self, value: f32) -> bool {
        if !self.dragging {
            return false;
        }
        let value = value.clamp(self.min, self.max);
        let pinned = self.value == self.min || self.value == self.max;
        if pinned && self.value == value {
            return false;
        }
        self.value = value;
        true
    }

    /// Maps `x` across `width` logical pixels onto `[min, max]`.
    pub fn value_at(&self, x: f32, width: f32) -> f32 {
        if width <= 0.0 {
            return self.min;
        }
        let t = (x / width).clamp(0.0, 1.0);
        self.min + t * (self.max - self.min)
    }

    /// Feeds one pointer event. `width` is the track width in logical pixels.
    ///
    /// Returns `true` if the stored value changed.
    pub fn handle(&mut self, event: PointerEvent, width: f32) -> bool {
        match event {
            PointerEvent::Pressed { button: MouseButton::Left } => {
                self.press();
                false
            }
            PointerEvent::Released { button: MouseButton::Left } => {
                self.release();
                false
            }
            PointerEvent::Moved { x, .. } => {
                let value = self.value_at(x, width);
                self.drag_to(value)
            }
            _ => false,
        }
    }
}

impl Default for RangeDrag {
    fn default() -> Self {
        Self::new(0.0, 100.0)
    }
}
