use crate::draw::input::{DrawInputState, InputCommand};
use crate::draw::model::{DrawnElement, Point};
use crate::draw::raster::RgbaSurface;
use crate::draw::render::{render_elements, DrawOp, RenderContext};
use crate::draw::state::SharedEditingState;
use crate::draw::toolbar::{Toolbar, ToolbarCommand};
use crate::hotkey::{KeyEvent, KeyModifiers};

pub const TOOLBAR_ORIGIN: (i32, i32) = (16, 16);

/// A full-screen annotation session: drawing surface, toolbar and HUD over
/// one shared editing state.
#[derive(Debug)]
pub struct DrawOverlay {
    input: DrawInputState,
    toolbar: Toolbar,
    exit_requested: bool,
}

impl DrawOverlay {
    pub fn new(editing: SharedEditingState) -> Self {
        Self {
            toolbar: Toolbar::new(editing.clone(), TOOLBAR_ORIGIN),
            input: DrawInputState::new(editing),
            exit_requested: false,
        }
    }

    pub fn input(&self) -> &DrawInputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut DrawInputState {
        &mut self.input
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn elements(&self) -> &[DrawnElement] {
        self.input.canvas().elements()
    }

    /// Set once Esc, right-click or the toolbar's exit button was used.
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn hud_text(&self) -> String {
        let state = *self.input.editing().borrow();
        format!(
            "{} | {} | 1: Arrow 2: Rect 3: Pen | R/B/G/P: color | ^Z: undo | Esc: exit",
            state.tool.label(),
            state.color.name()
        )
    }

    pub fn handle_key(&mut self, event: KeyEvent) -> Option<InputCommand> {
        let command = self.input.handle_key_event(event);
        self.observe(command)
    }

    /// Presses on the toolbar go to the toolbar; everything else starts a
    /// gesture on the canvas.
    pub fn pointer_down(&mut self, point: Point) -> Option<InputCommand> {
        let hit = (point.x.round() as i32, point.y.round() as i32);
        if self.toolbar.layout().panel.contains(hit) {
            let command = match self.toolbar.click(hit)? {
                ToolbarCommand::SelectTool(tool) => InputCommand::ToolChanged(tool),
                ToolbarCommand::SetColor(color) => InputCommand::ColorChanged(color),
                ToolbarCommand::WidthDown | ToolbarCommand::WidthUp => {
                    InputCommand::WidthChanged(self.input.editing().borrow().width())
                }
                ToolbarCommand::Undo => {
                    self.input.undo();
                    InputCommand::Undo
                }
                ToolbarCommand::Clear => {
                    self.input.clear();
                    InputCommand::Clear
                }
                ToolbarCommand::Exit => InputCommand::RequestExit,
            };
            return self.observe(Some(command));
        }
        self.input.pointer_down(point);
        None
    }

    pub fn pointer_drag(&mut self, point: Point) {
        self.input.pointer_drag(point);
    }

    pub fn pointer_up(&mut self) -> bool {
        self.input.pointer_up()
    }

    pub fn right_click(&mut self) -> InputCommand {
        let command = self.input.right_click();
        self.exit_requested = true;
        command
    }

    pub fn scroll(&mut self, delta_y: f32, modifiers: KeyModifiers) -> Option<InputCommand> {
        self.input.scroll(delta_y, modifiers)
    }

    /// Committed elements followed by the in-progress one.
    pub fn render(&self, ctx: RenderContext) -> Vec<DrawOp> {
        render_elements(self.elements().iter().chain(self.input.active()), ctx)
    }

    pub fn rasterize(&self, width: u32, height: u32, ctx: RenderContext) -> RgbaSurface {
        let mut surface = RgbaSurface::new(width, height);
        let ops = self.render(ctx);
        let touched = surface.execute_all(&ops);
        tracing::trace!(ops = ops.len(), touched, "rasterized overlay");
        surface
    }

    fn observe(&mut self, command: Option<InputCommand>) -> Option<InputCommand> {
        if command == Some(InputCommand::RequestExit) {
            self.exit_requested = true;
        }
        command
    }
}
