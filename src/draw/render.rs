//! Pure mapping from annotations to primitive draw operations.
//!
//! Nothing here touches a surface; a host replays the returned [`DrawOp`]s
//! on whatever it draws with (see [`crate::draw::raster`] for the software
//! path).

use crate::draw::model::{Color, DrawnElement, Point, Rect, Tool};
use std::f32::consts::PI;

pub const HIGHLIGHTER_ALPHA: f32 = 0.35;
pub const HIGHLIGHTER_WIDTH_FACTOR: f32 = 5.0;
pub const BLUR_WIDTH_FACTOR: f32 = 3.0;
pub const ARROW_HEAD_MIN_LENGTH: f32 = 12.0;
pub const ARROW_HEAD_WIDTH_FACTOR: f32 = 4.0;
pub const ARROW_HEAD_HALF_ANGLE: f32 = PI / 6.0;
pub const TEXT_MIN_FONT_SIZE: f32 = 18.0;
pub const TEXT_WIDTH_FACTOR: f32 = 6.0;

/// Which way the surface's y axis grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceOrientation {
    #[default]
    TopDown,
    BottomUp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    /// Multiplies stroke widths, e.g. while zoomed.
    pub scale: f32,
    pub orientation: SurfaceOrientation,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            scale: 1.0,
            orientation: SurfaceOrientation::TopDown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
}

impl StrokeStyle {
    fn round(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            cap: LineCap::Round,
            join: LineJoin::Round,
        }
    }

    fn plain(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    StrokePolyline {
        points: Vec<Point>,
        style: StrokeStyle,
    },
    FillPolygon {
        points: Vec<Point>,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        style: StrokeStyle,
    },
    StrokeEllipse {
        rect: Rect,
        style: StrokeStyle,
    },
    /// Bold text whose top-left corner sits at `anchor`. With `flip_y` the
    /// host must mirror the glyphs vertically around the text box so they
    /// read upright on a bottom-up surface.
    Text {
        anchor: Point,
        text: String,
        font_size: f32,
        color: Color,
        bold: bool,
        flip_y: bool,
    },
}

/// Draw operations for one element. Elements with fewer points than their
/// shape needs produce nothing.
pub fn render_element(element: &DrawnElement, ctx: RenderContext) -> Vec<DrawOp> {
    let highlighter = element.tool == Tool::Highlighter;
    let color = if highlighter {
        element.color.with_alpha_at_most(HIGHLIGHTER_ALPHA)
    } else {
        element.color
    };
    let base_width = if highlighter {
        element.width * HIGHLIGHTER_WIDTH_FACTOR
    } else {
        element.width
    };
    let width = base_width * ctx.scale;

    match element.tool {
        Tool::Pen | Tool::Highlighter => {
            if element.points.len() < 2 {
                return Vec::new();
            }
            vec![DrawOp::StrokePolyline {
                points: element.points.clone(),
                style: StrokeStyle::round(color, width),
            }]
        }
        Tool::Line => endpoints(element)
            .map(|(start, end)| {
                vec![DrawOp::StrokePolyline {
                    points: vec![start, end],
                    style: StrokeStyle {
                        cap: LineCap::Round,
                        ..StrokeStyle::plain(color, width)
                    },
                }]
            })
            .unwrap_or_default(),
        Tool::Arrow => endpoints(element)
            .map(|(start, end)| {
                vec![
                    DrawOp::StrokePolyline {
                        points: vec![start, end],
                        style: StrokeStyle {
                            cap: LineCap::Round,
                            ..StrokeStyle::plain(color, width)
                        },
                    },
                    DrawOp::FillPolygon {
                        points: arrow_head(start, end, width).to_vec(),
                        color,
                    },
                ]
            })
            .unwrap_or_default(),
        Tool::Rectangle => endpoints(element)
            .map(|(start, end)| {
                vec![DrawOp::StrokeRect {
                    rect: Rect::from_corners(start, end),
                    style: StrokeStyle::plain(color, width),
                }]
            })
            .unwrap_or_default(),
        Tool::Ellipse => endpoints(element)
            .map(|(start, end)| {
                vec![DrawOp::StrokeEllipse {
                    rect: Rect::from_corners(start, end),
                    style: StrokeStyle::plain(color, width),
                }]
            })
            .unwrap_or_default(),
        Tool::Text => match (element.first(), element.text.as_deref()) {
            (Some(anchor), Some(text)) if !text.is_empty() => vec![DrawOp::Text {
                anchor,
                text: text.to_string(),
                font_size: text_font_size(element.width),
                color: element.color,
                bold: true,
                flip_y: ctx.orientation == SurfaceOrientation::BottomUp,
            }],
            _ => Vec::new(),
        },
        // A cheap stand-in for a real blur: a wide translucent gray smear.
        Tool::Blur => {
            if element.points.len() < 2 {
                return Vec::new();
            }
            vec![DrawOp::StrokePolyline {
                points: element.points.clone(),
                style: StrokeStyle::round(Color::gray(0.5, 0.6), width * BLUR_WIDTH_FACTOR),
            }]
        }
    }
}

/// Draw operations for a sequence of elements, in order.
pub fn render_elements<'a>(
    elements: impl IntoIterator<Item = &'a DrawnElement>,
    ctx: RenderContext,
) -> Vec<DrawOp> {
    elements
        .into_iter()
        .flat_map(|element| render_element(element, ctx))
        .collect()
}

pub fn text_font_size(stroke_width: f32) -> f32 {
    (stroke_width * TEXT_WIDTH_FACTOR).max(TEXT_MIN_FONT_SIZE)
}

/// Tip followed by the two back corners of an arrow head at `end`.
pub fn arrow_head(start: Point, end: Point, stroke_width: f32) -> [Point; 3] {
    let angle = (end.y - start.y).atan2(end.x - start.x);
    let length = (stroke_width * ARROW_HEAD_WIDTH_FACTOR).max(ARROW_HEAD_MIN_LENGTH);
    let corner = |a: f32| Point::new(end.x - length * a.cos(), end.y - length * a.sin());
    [
        end,
        corner(angle - ARROW_HEAD_HALF_ANGLE),
        corner(angle + ARROW_HEAD_HALF_ANGLE),
    ]
}

fn endpoints(element: &DrawnElement) -> Option<(Point, Point)> {
    if element.points.len() < 2 {
        return None;
    }
    Some((element.first()?, element.last()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tool: Tool, points: &[(f32, f32)]) -> DrawnElement {
        DrawnElement::new(
            tool,
            Color::RED,
            3.0,
            points.iter().copied().map(Point::from).collect(),
        )
    }

    fn only_op(ops: Vec<DrawOp>) -> DrawOp {
        assert_eq!(ops.len(), 1, "{ops:?}");
        ops.into_iter().next().unwrap()
    }

    #[test]
    fn pen_is_a_round_polyline_through_all_points() {
        let op = only_op(render_element(
            &element(Tool::Pen, &[(0.0, 0.0), (5.0, 5.0), (10.0, 0.0)]),
            RenderContext::default(),
        ));
        match op {
            DrawOp::StrokePolyline { points, style } => {
                assert_eq!(points.len(), 3);
                assert_eq!(style.cap, LineCap::Round);
                assert_eq!(style.join, LineJoin::Round);
                assert_eq!(style.width, 3.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn highlighter_is_wide_and_translucent() {
        let op = only_op(render_element(
            &element(Tool::Highlighter, &[(0.0, 0.0), (5.0, 5.0)]),
            RenderContext::default(),
        ));
        let DrawOp::StrokePolyline { style, .. } = op else {
            panic!("expected polyline");
        };
        assert_eq!(style.width, 15.0);
        assert_eq!(style.color.a, 89);

        let mut faint = element(Tool::Highlighter, &[(0.0, 0.0), (5.0, 5.0)]);
        faint.color = Color::rgba(255, 0, 0, 30);
        let DrawOp::StrokePolyline { style, .. } =
            only_op(render_element(&faint, RenderContext::default()))
        else {
            panic!("expected polyline");
        };
        assert_eq!(style.color.a, 30);
    }

    #[test]
    fn line_ignores_intermediate_points() {
        let op = only_op(render_element(
            &element(Tool::Line, &[(0.0, 0.0), (50.0, 80.0), (10.0, 0.0)]),
            RenderContext::default(),
        ));
        let DrawOp::StrokePolyline { points, .. } = op else {
            panic!("expected polyline");
        };
        assert_eq!(points, vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
    }

    #[test]
    fn arrow_head_has_a_minimum_size() {
        let head = arrow_head(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 1.0);
        assert_eq!(head[0], Point::new(100.0, 0.0));
        let back = 100.0 - ARROW_HEAD_MIN_LENGTH * ARROW_HEAD_HALF_ANGLE.cos();
        assert!((head[1].x - back).abs() < 1e-3);
        assert!((head[1].y + head[2].y).abs() < 1e-3);

        let wide = arrow_head(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 10.0);
        assert!((100.0 - wide[1].x) > (100.0 - head[1].x));
    }

    #[test]
    fn arrow_is_shaft_plus_filled_head() {
        let ops = render_element(
            &element(Tool::Arrow, &[(0.0, 0.0), (0.0, 40.0)]),
            RenderContext::default(),
        );
        assert!(matches!(ops[0], DrawOp::StrokePolyline { .. }));
        assert!(matches!(&ops[1], DrawOp::FillPolygon { points, .. } if points.len() == 3));
    }

    #[test]
    fn rectangle_box_is_independent_of_drag_direction() {
        let forward = render_element(
            &element(Tool::Rectangle, &[(10.0, 10.0), (50.0, 50.0)]),
            RenderContext::default(),
        );
        let backward = render_element(
            &element(Tool::Rectangle, &[(50.0, 50.0), (10.0, 10.0)]),
            RenderContext::default(),
        );
        assert_eq!(forward, backward);
        assert!(matches!(
            forward[0],
            DrawOp::StrokeRect { rect: Rect { x, y, width, height }, .. }
                if (x, y, width, height) == (10.0, 10.0, 40.0, 40.0)
        ));
    }

    #[test]
    fn ellipse_uses_the_normalised_box() {
        let op = only_op(render_element(
            &element(Tool::Ellipse, &[(30.0, 5.0), (10.0, 25.0)]),
            RenderContext::default(),
        ));
        assert!(matches!(
            op,
            DrawOp::StrokeEllipse { rect, .. } if rect == Rect::from_corners(Point::new(10.0, 5.0), Point::new(30.0, 25.0))
        ));
    }

    #[test]
    fn text_size_and_orientation() {
        let note = DrawnElement::text(Point::new(4.0, 4.0), "Hi", Color::BLUE, 2.0);
        let op = only_op(render_element(
            &note,
            RenderContext {
                scale: 1.0,
                orientation: SurfaceOrientation::BottomUp,
            },
        ));
        let DrawOp::Text {
            font_size,
            bold,
            flip_y,
            ..
        } = op
        else {
            panic!("expected text");
        };
        assert_eq!(font_size, TEXT_MIN_FONT_SIZE);
        assert!(bold);
        assert!(flip_y);
        assert_eq!(text_font_size(5.0), 30.0);

        let DrawOp::Text { flip_y, .. } = only_op(render_element(&note, RenderContext::default()))
        else {
            panic!("expected text");
        };
        assert!(!flip_y);
    }

    #[test]
    fn blur_is_a_wide_gray_smear() {
        let op = only_op(render_element(
            &element(Tool::Blur, &[(0.0, 0.0), (5.0, 0.0)]),
            RenderContext::default(),
        ));
        let DrawOp::StrokePolyline { style, .. } = op else {
            panic!("expected polyline");
        };
        assert_eq!(style.width, 9.0);
        assert_eq!(style.color, Color::gray(0.5, 0.6));
    }

    #[test]
    fn scale_multiplies_stroke_width() {
        let op = only_op(render_element(
            &element(Tool::Line, &[(0.0, 0.0), (5.0, 0.0)]),
            RenderContext {
                scale: 2.0,
                ..RenderContext::default()
            },
        ));
        let DrawOp::StrokePolyline { style, .. } = op else {
            panic!("expected polyline");
        };
        assert_eq!(style.width, 6.0);
    }

    #[test]
    fn under_populated_elements_render_nothing() {
        let ctx = RenderContext::default();
        assert!(render_element(&element(Tool::Pen, &[(1.0, 1.0)]), ctx).is_empty());
        assert!(render_element(&element(Tool::Arrow, &[(1.0, 1.0)]), ctx).is_empty());
        assert!(render_element(&element(Tool::Text, &[(1.0, 1.0)]), ctx).is_empty());
    }
}
