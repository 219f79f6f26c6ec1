use crate::draw::canvas::Canvas;
use crate::draw::model::{Color, DrawnElement, Point, Tool};
use crate::draw::state::SharedEditingState;
use crate::hotkey::{Key, KeyEvent, KeyModifiers};

const SCROLL_WIDTH_FACTOR: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputCommand {
    Undo,
    Clear,
    ToolChanged(Tool),
    ColorChanged(Color),
    WidthChanged(f32),
    RequestExit,
}

/// Turns pointer gestures and overlay key presses into canvas edits.
#[derive(Debug)]
pub struct DrawInputState {
    editing: SharedEditingState,
    canvas: Canvas,
    active: Option<DrawnElement>,
    gesture_start: Option<Point>,
}

impl DrawInputState {
    pub fn new(editing: SharedEditingState) -> Self {
        Self {
            editing,
            canvas: Canvas::default(),
            active: None,
            gesture_start: None,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// The element being drawn by the current gesture, if any.
    pub fn active(&self) -> Option<&DrawnElement> {
        self.active.as_ref()
    }

    pub fn editing(&self) -> &SharedEditingState {
        &self.editing
    }

    pub fn pointer_down(&mut self, point: Point) {
        let state = *self.editing.borrow();
        self.gesture_start = Some(point);
        self.active = match state.tool {
            // Text needs a string; it is placed with `place_text`.
            Tool::Text => None,
            tool if tool.is_freehand() => Some(DrawnElement::new(
                tool,
                state.color,
                state.width(),
                vec![point],
            )),
            tool => Some(DrawnElement::new(
                tool,
                state.color,
                state.width(),
                vec![point, point],
            )),
        };
    }

    pub fn pointer_drag(&mut self, point: Point) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.tool.is_freehand() {
            active.points.push(point);
        } else if let Some(start) = self.gesture_start {
            active.points = vec![start, point];
        }
    }

    /// Ends the gesture, committing the in-progress element if there is one.
    pub fn pointer_up(&mut self) -> bool {
        self.gesture_start = None;
        match self.active.take() {
            Some(element) => self.canvas.commit(element),
            None => false,
        }
    }

    pub fn place_text(&mut self, anchor: Point, text: &str) -> bool {
        let state = *self.editing.borrow();
        self.canvas
            .commit(DrawnElement::text(anchor, text, state.color, state.width()))
    }

    pub fn undo(&mut self) -> Option<DrawnElement> {
        self.canvas.undo()
    }

    pub fn clear(&mut self) -> usize {
        self.canvas.clear()
    }

    pub fn right_click(&self) -> InputCommand {
        InputCommand::RequestExit
    }

    /// Ctrl + scroll changes the stroke width.
    pub fn scroll(&mut self, delta_y: f32, modifiers: KeyModifiers) -> Option<InputCommand> {
        if !modifiers.ctrl {
            return None;
        }
        let width = self
            .editing
            .borrow_mut()
            .adjust_width(delta_y * SCROLL_WIDTH_FACTOR);
        Some(InputCommand::WidthChanged(width))
    }

    pub fn handle_key_event(&mut self, event: KeyEvent) -> Option<InputCommand> {
        if event.key == Key::Escape {
            return Some(InputCommand::RequestExit);
        }

        let KeyModifiers { ctrl, cmd, .. } = event.modifiers;
        if ctrl || cmd {
            return match event.key {
                Key::Char('z') if ctrl => {
                    let _ = self.undo();
                    Some(InputCommand::Undo)
                }
                _ => None,
            };
        }

        match event.key {
            Key::Digit(d) => {
                let tool = tool_for_digit(d)?;
                self.editing.borrow_mut().tool = tool;
                Some(InputCommand::ToolChanged(tool))
            }
            Key::Char('e') => {
                self.clear();
                Some(InputCommand::Clear)
            }
            Key::Char(c) => {
                let color = color_for_key(c)?;
                self.editing.borrow_mut().color = color;
                Some(InputCommand::ColorChanged(color))
            }
            Key::Plus => Some(InputCommand::WidthChanged(
                self.editing.borrow_mut().adjust_width(1.0),
            )),
            Key::Minus => Some(InputCommand::WidthChanged(
                self.editing.borrow_mut().adjust_width(-1.0),
            )),
            _ => None,
        }
    }
}

pub fn tool_for_digit(d: u8) -> Option<Tool> {
    match d {
        1 => Some(Tool::Arrow),
        2 => Some(Tool::Rectangle),
        3 => Some(Tool::Pen),
        4 => Some(Tool::Ellipse),
        5 => Some(Tool::Line),
        6 => Some(Tool::Highlighter),
        7 => Some(Tool::Blur),
        8 => Some(Tool::Text),
        _ => None,
    }
}

pub fn color_for_key(c: char) -> Option<Color> {
    match c.to_ascii_lowercase() {
        'r' => Some(Color::RED),
        'b' => Some(Color::BLUE),
        'g' => Some(Color::GREEN),
        'p' => Some(Color::PURPLE),
        _ => None,
    }
}
