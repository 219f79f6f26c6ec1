use crate::draw::model::{Color, Tool};
use crate::draw::state::SharedEditingState;

pub const TOOLBAR_TOOLS: [Tool; 3] = [Tool::Arrow, Tool::Rectangle, Tool::Pen];
pub const TOOLBAR_COLORS: [Color; 4] = [Color::RED, Color::BLUE, Color::GREEN, Color::PURPLE];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarCommand {
    SelectTool(Tool),
    SetColor(Color),
    WidthDown,
    WidthUp,
    Undo,
    Clear,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl ToolbarRect {
    pub fn contains(self, point: (i32, i32)) -> bool {
        point.0 >= self.x
            && point.0 < self.x + self.w
            && point.1 >= self.y
            && point.1 < self.y + self.h
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarHitTarget {
    Panel,
    Tool(Tool),
    Color(Color),
    WidthDown,
    WidthUp,
    Undo,
    Clear,
    Exit,
}

/// Button geometry for a panel anchored at `origin`.
#[derive(Debug, Clone)]
pub struct ToolbarLayout {
    pub panel: ToolbarRect,
    pub tool_rects: Vec<(Tool, ToolbarRect)>,
    pub color_rects: Vec<(Color, ToolbarRect)>,
    pub width_down_rect: ToolbarRect,
    pub width_up_rect: ToolbarRect,
    pub undo_rect: ToolbarRect,
    pub clear_rect: ToolbarRect,
    pub exit_rect: ToolbarRect,
}

impl ToolbarLayout {
    pub fn at(origin: (i32, i32)) -> Self {
        let panel = ToolbarRect {
            x: origin.0.max(0),
            y: origin.1.max(0),
            w: 380,
            h: 36,
        };
        let button = |slot: i32, w: i32| ToolbarRect {
            x: panel.x + 8 + slot,
            y: panel.y + 7,
            w,
            h: 22,
        };

        let tool_rects = TOOLBAR_TOOLS
            .into_iter()
            .enumerate()
            .map(|(idx, tool)| (tool, button(idx as i32 * 28, 24)))
            .collect();
        let color_rects = TOOLBAR_COLORS
            .into_iter()
            .enumerate()
            .map(|(idx, color)| (color, button(92 + idx as i32 * 24, 20)))
            .collect();

        Self {
            panel,
            tool_rects,
            color_rects,
            width_down_rect: button(196, 20),
            width_up_rect: button(218, 20),
            undo_rect: button(246, 36),
            clear_rect: button(286, 36),
            exit_rect: button(326, 36),
        }
    }

    pub fn hit_test(&self, point: (i32, i32)) -> Option<ToolbarHitTarget> {
        if !self.panel.contains(point) {
            return None;
        }
        if let Some((tool, _)) = self.tool_rects.iter().find(|(_, r)| r.contains(point)) {
            return Some(ToolbarHitTarget::Tool(*tool));
        }
        if let Some((color, _)) = self.color_rects.iter().find(|(_, r)| r.contains(point)) {
            return Some(ToolbarHitTarget::Color(*color));
        }
        let buttons = [
            (self.width_down_rect, ToolbarHitTarget::WidthDown),
            (self.width_up_rect, ToolbarHitTarget::WidthUp),
            (self.undo_rect, ToolbarHitTarget::Undo),
            (self.clear_rect, ToolbarHitTarget::Clear),
            (self.exit_rect, ToolbarHitTarget::Exit),
        ];
        buttons
            .into_iter()
            .find(|(rect, _)| rect.contains(point))
            .map(|(_, target)| target)
            .or(Some(ToolbarHitTarget::Panel))
    }
}

pub fn map_hit_to_command(target: ToolbarHitTarget) -> Option<ToolbarCommand> {
    match target {
        ToolbarHitTarget::Panel => None,
        ToolbarHitTarget::Tool(tool) => Some(ToolbarCommand::SelectTool(tool)),
        ToolbarHitTarget::Color(color) => Some(ToolbarCommand::SetColor(color)),
        ToolbarHitTarget::WidthDown => Some(ToolbarCommand::WidthDown),
        ToolbarHitTarget::WidthUp => Some(ToolbarCommand::WidthUp),
        ToolbarHitTarget::Undo => Some(ToolbarCommand::Undo),
        ToolbarHitTarget::Clear => Some(ToolbarCommand::Clear),
        ToolbarHitTarget::Exit => Some(ToolbarCommand::Exit),
    }
}

/// Floating tool palette. It reads and writes the same editing state as the
/// drawing surface, so a selection made on either side shows up on both.
#[derive(Debug)]
pub struct Toolbar {
    editing: SharedEditingState,
    layout: ToolbarLayout,
}

impl Toolbar {
    pub fn new(editing: SharedEditingState, origin: (i32, i32)) -> Self {
        Self {
            editing,
            layout: ToolbarLayout::at(origin),
        }
    }

    pub fn layout(&self) -> &ToolbarLayout {
        &self.layout
    }

    pub fn is_selected_tool(&self, tool: Tool) -> bool {
        self.editing.borrow().tool == tool
    }

    pub fn is_selected_color(&self, color: Color) -> bool {
        self.editing.borrow().color == color
    }

    /// Handles a click at `point`. Style changes are applied to the shared
    /// state here; canvas edits and exit are returned for the overlay.
    pub fn click(&mut self, point: (i32, i32)) -> Option<ToolbarCommand> {
        let command = map_hit_to_command(self.layout.hit_test(point)?)?;
        let mut editing = self.editing.borrow_mut();
        match command {
            ToolbarCommand::SelectTool(tool) => editing.tool = tool,
            ToolbarCommand::SetColor(color) => editing.color = color,
            ToolbarCommand::WidthDown => {
                editing.adjust_width(-1.0);
            }
            ToolbarCommand::WidthUp => {
                editing.adjust_width(1.0);
            }
            ToolbarCommand::Undo | ToolbarCommand::Clear | ToolbarCommand::Exit => {}
        }
        tracing::debug!(?command, "toolbar click");
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::state::{shared, EditingState};

    fn center(rect: ToolbarRect) -> (i32, i32) {
        (rect.x + rect.w / 2, rect.y + rect.h / 2)
    }

    #[test]
    fn hit_targets_map_to_commands() {
        let layout = ToolbarLayout::at((16, 16));
        let (_, rect_button) = layout.tool_rects[1];
        assert_eq!(
            layout.hit_test(center(rect_button)).and_then(map_hit_to_command),
            Some(ToolbarCommand::SelectTool(Tool::Rectangle))
        );
        assert_eq!(
            layout.hit_test(center(layout.undo_rect)).and_then(map_hit_to_command),
            Some(ToolbarCommand::Undo)
        );
        assert_eq!(layout.hit_test((0, 0)), None);
        assert_eq!(layout.hit_test((17, 17)), Some(ToolbarHitTarget::Panel));
    }

    #[test]
    fn buttons_do_not_overlap() {
        let layout = ToolbarLayout::at((0, 0));
        let mut rects: Vec<ToolbarRect> = layout.tool_rects.iter().map(|(_, r)| *r).collect();
        rects.extend(layout.color_rects.iter().map(|(_, r)| *r));
        rects.extend([
            layout.width_down_rect,
            layout.width_up_rect,
            layout.undo_rect,
            layout.clear_rect,
            layout.exit_rect,
        ]);
        for (i, a) in rects.iter().enumerate() {
            assert!(a.x + a.w <= layout.panel.x + layout.panel.w);
            for b in &rects[i + 1..] {
                assert!(a.x + a.w <= b.x || b.x + b.w <= a.x, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn clicks_write_through_to_shared_state() {
        let editing = shared(EditingState::default());
        let mut toolbar = Toolbar::new(editing.clone(), (0, 0));
        let (_, pen) = toolbar.layout().tool_rects[2];
        let (_, green) = toolbar.layout().color_rects[2];
        let up = toolbar.layout().width_up_rect;

        toolbar.click(center(pen));
        toolbar.click(center(green));
        toolbar.click(center(up));

        let state = *editing.borrow();
        assert_eq!(state.tool, Tool::Pen);
        assert_eq!(state.color, Color::GREEN);
        assert_eq!(state.width(), 4.0);

        editing.borrow_mut().tool = Tool::Arrow;
        assert!(toolbar.is_selected_tool(Tool::Arrow));
        assert!(toolbar.is_selected_color(Color::GREEN));
    }
}
