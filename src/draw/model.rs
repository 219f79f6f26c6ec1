#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Pen,
    Arrow,
    Rectangle,
    Ellipse,
    Line,
    Highlighter,
    Text,
    Blur,
}

impl Tool {
    /// Fewest points a committed element of this tool may carry.
    pub fn min_points(self) -> usize {
        match self {
            Tool::Arrow | Tool::Rectangle | Tool::Ellipse | Tool::Line => 2,
            Tool::Pen | Tool::Highlighter | Tool::Text | Tool::Blur => 1,
        }
    }

    /// Freehand tools collect every pointer position; the others keep only
    /// the gesture's start and current point.
    pub fn is_freehand(self) -> bool {
        matches!(self, Tool::Pen | Tool::Highlighter | Tool::Blur)
    }

    pub fn label(self) -> &'static str {
        match self {
            Tool::Pen => "Freeform",
            Tool::Arrow => "Arrow",
            Tool::Rectangle => "Rectangle",
            Tool::Ellipse => "Ellipse",
            Tool::Line => "Line",
            Tool::Highlighter => "Highlighter",
            Tool::Text => "Text",
            Tool::Blur => "Blur",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const RED: Color = Color::rgba(255, 0, 0, 255);
    pub const BLUE: Color = Color::rgba(0, 122, 255, 255);
    pub const GREEN: Color = Color::rgba(52, 199, 89, 255);
    pub const PURPLE: Color = Color::rgba(175, 82, 222, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn gray(level: f32, alpha: f32) -> Self {
        let v = unit_to_u8(level);
        Self::rgba(v, v, v, unit_to_u8(alpha))
    }

    /// Same color with alpha limited to `max_alpha` (0.0..=1.0).
    pub fn with_alpha_at_most(self, max_alpha: f32) -> Self {
        Self {
            a: self.a.min(unit_to_u8(max_alpha)),
            ..self
        }
    }

    pub fn alpha(self) -> f32 {
        self.a as f32 / 255.0
    }

    pub fn name(self) -> &'static str {
        match self {
            c if c == Color::BLUE => "Blue",
            c if c == Color::GREEN => "Green",
            c if c == Color::PURPLE => "Purple",
            _ => "Red",
        }
    }
}

fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Box spanned by two opposite corners, in either drag direction.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

/// One annotation: a tool, its stroke, the points of the gesture and, for
/// text, the string to draw at the first point.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnElement {
    pub tool: Tool,
    pub color: Color,
    pub width: f32,
    pub points: Vec<Point>,
    pub text: Option<String>,
}

impl DrawnElement {
    pub fn new(tool: Tool, color: Color, width: f32, points: Vec<Point>) -> Self {
        Self {
            tool,
            color,
            width,
            points,
            text: None,
        }
    }

    pub fn text(anchor: Point, text: impl Into<String>, color: Color, width: f32) -> Self {
        Self {
            tool: Tool::Text,
            color,
            width,
            points: vec![anchor],
            text: Some(text.into()),
        }
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Whether this element may join the canvas: enough points for its tool,
    /// and non-empty text for text elements.
    pub fn is_committable(&self) -> bool {
        if self.points.len() < self.tool.min_points() {
            return false;
        }
        match self.tool {
            Tool::Text => self.text.as_deref().is_some_and(|t| !t.is_empty()),
            _ => true,
        }
    }
}
