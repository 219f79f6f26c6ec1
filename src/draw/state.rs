use crate::draw::model::{Color, Tool};
use std::cell::RefCell;
use std::rc::Rc;

pub const MIN_STROKE_WIDTH: f32 = 1.0;
pub const MAX_STROKE_WIDTH: f32 = 30.0;

/// Tool, color and width applied to the next gesture. One value is shared by
/// the drawing surface and the toolbar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditingState {
    pub tool: Tool,
    pub color: Color,
    width: f32,
}

impl Default for EditingState {
    fn default() -> Self {
        Self {
            tool: Tool::Arrow,
            color: Color::RED,
            width: 3.0,
        }
    }
}

impl EditingState {
    pub fn with_width(width: f32) -> Self {
        let mut state = Self::default();
        state.set_width(width);
        state
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = if width.is_finite() {
            width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH)
        } else {
            MIN_STROKE_WIDTH
        };
    }

    pub fn adjust_width(&mut self, delta: f32) -> f32 {
        self.set_width(self.width + delta);
        self.width
    }
}

pub type SharedEditingState = Rc<RefCell<EditingState>>;

pub fn shared(state: EditingState) -> SharedEditingState {
    Rc::new(RefCell::new(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_is_clamped() {
        let mut state = EditingState::default();
        assert_eq!(state.adjust_width(100.0), MAX_STROKE_WIDTH);
        assert_eq!(state.adjust_width(-100.0), MIN_STROKE_WIDTH);
        state.set_width(f32::NAN);
        assert_eq!(state.width(), MIN_STROKE_WIDTH);
    }

    #[test]
    fn defaults_match_first_launch() {
        let state = EditingState::default();
        assert_eq!(state.tool, Tool::Arrow);
        assert_eq!(state.color, Color::RED);
        assert_eq!(state.width(), 3.0);
    }
}
