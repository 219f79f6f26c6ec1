pub mod canvas;
pub mod input;
pub mod model;
pub mod overlay;
pub mod raster;
pub mod render;
pub mod state;
pub mod toolbar;

pub use canvas::Canvas;
pub use input::{DrawInputState, InputCommand};
pub use model::{Color, DrawnElement, Point, Rect, Tool};
pub use overlay::DrawOverlay;
pub use render::{render_element, DrawOp, RenderContext, SurfaceOrientation};
pub use state::{EditingState, SharedEditingState};
