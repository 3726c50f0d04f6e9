use lamina_engine::coords::Vec2;
use lamina_engine::input::{InputFrame, InputState, MouseButton};

/// Pointer snapshot the GUI consumes for one frame.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Logical pixels; `None` when the pointer is outside the window.
    pub pointer: Option<Vec2>,
    /// Primary button is held.
    pub primary_down: bool,
    /// Primary button went down this frame.
    pub primary_pressed: bool,
    /// Primary button went up this frame.
    pub primary_released: bool,
}

impl FrameInput {
    pub fn from_engine(state: &InputState, frame: &InputFrame) -> Self {
        Self {
            pointer: state.pointer_pos,
            primary_down: state.button_down(MouseButton::Left),
            primary_pressed: frame.button_pressed(MouseButton::Left),
            primary_released: frame.button_released(MouseButton::Left),
        }
    }

    #[inline]
    pub(crate) fn hovers(&self, rect: lamina_engine::coords::Rect) -> bool {
        self.pointer.is_some_and(|p| rect.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_engine::input::{InputEvent, MouseButtonState};

    #[test]
    fn converts_engine_state() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, InputEvent::PointerMoved(Vec2::new(5.0, 6.0)));
        state.apply_event(&mut frame, InputEvent::PointerButton {
            button: MouseButton::Left,
            state: MouseButtonState::Pressed,
        });

        let input = FrameInput::from_engine(&state, &frame);
        assert_eq!(input.pointer, Some(Vec2::new(5.0, 6.0)));
        assert!(input.primary_down);
        assert!(input.primary_pressed);
        assert!(!input.primary_released);
    }
}
