//! Software rasterizer for [`DrawOp`] lists.
//!
//! Used for headless snapshots and in tests. Each op is first turned into a
//! coverage mask over its bounding box and then blended source-over once per
//! covered pixel, so translucent strokes do not darken where their own
//! segments overlap. Text is left to the host's font stack.

use crate::draw::model::{Color, Point, Rect};
use crate::draw::render::{DrawOp, StrokeStyle};

/// Pixel coordinates are clamped to this magnitude so box widths and
/// `x + width` always fit in an `i32`.
const COORD_LIMIT: f32 = (1 << 29) as f32;
const MAX_ELLIPSE_STEPS: f32 = 4096.0;

fn to_pixel(v: f32) -> i32 {
    if v.is_nan() {
        return 0;
    }
    v.clamp(-COORD_LIMIT, COORD_LIMIT) as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DirtyRect {
    /// Pixel box covering `points`, grown by `pad` on every side.
    pub fn around(points: &[Point], pad: f32) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let x0 = to_pixel((min_x - pad).floor());
        let y0 = to_pixel((min_y - pad).floor());
        let x1 = to_pixel((max_x + pad).ceil());
        let y1 = to_pixel((max_y + pad).ceil());
        Some(Self {
            x: x0,
            y: y0,
            width: (x1 - x0 + 1).max(1),
            height: (y1 - y0 + 1).max(1),
        })
    }

    pub fn clamp(self, width: u32, height: u32) -> Option<DirtyRect> {
        let max_w = i32::try_from(width).unwrap_or(i32::MAX);
        let max_h = i32::try_from(height).unwrap_or(i32::MAX);
        let x0 = self.x.clamp(0, max_w);
        let y0 = self.y.clamp(0, max_h);
        let x1 = self.x.saturating_add(self.width).clamp(0, max_w);
        let y1 = self.y.saturating_add(self.height).clamp(0, max_h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(DirtyRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x
            && y >= self.y
            && x < self.x.saturating_add(self.width)
            && y < self.y.saturating_add(self.height)
    }
}

/// Coverage of one op, local to `bounds`.
struct Mask {
    bounds: DirtyRect,
    covered: Vec<bool>,
}

impl Mask {
    fn new(bounds: DirtyRect) -> Self {
        Self {
            bounds,
            covered: vec![false; (bounds.width * bounds.height) as usize],
        }
    }

    fn mark(&mut self, x: i32, y: i32) {
        if self.bounds.contains(x, y) {
            let idx = ((y - self.bounds.y) * self.bounds.width + (x - self.bounds.x)) as usize;
            self.covered[idx] = true;
        }
    }

    fn covered_pixels(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let b = self.bounds;
        self.covered
            .iter()
            .enumerate()
            .filter(|(_, hit)| **hit)
            .map(move |(idx, _)| {
                let idx = idx as i32;
                (b.x + idx % b.width, b.y + idx / b.width)
            })
    }

    fn stroke_segment(&mut self, start: Point, end: Point, radius: f32) {
        let pad = radius.ceil() + 1.0;
        let Some(clip) = DirtyRect::around(&[start, end], pad)
            .and_then(|seg| intersect_dirty_rect(seg, self.bounds))
        else {
            return;
        };
        let radius_sq = radius * radius;
        for y in clip.y..(clip.y + clip.height) {
            for x in clip.x..(clip.x + clip.width) {
                if point_segment_distance_sq(pixel_center(x, y), start, end) <= radius_sq {
                    self.mark(x, y);
                }
            }
        }
    }

    fn stroke_polyline(&mut self, points: &[Point], radius: f32) {
        if let [only] = points {
            self.stroke_segment(*only, *only, radius);
        }
        for pair in points.windows(2) {
            self.stroke_segment(pair[0], pair[1], radius);
        }
    }

    fn fill_polygon(&mut self, points: &[Point]) {
        let b = self.bounds;
        for y in b.y..(b.y + b.height) {
            for x in b.x..(b.x + b.width) {
                if point_in_polygon(pixel_center(x, y), points) {
                    self.mark(x, y);
                }
            }
        }
    }
}

/// A top-down RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RgbaSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        let px = &self.pixels[idx..idx + 4];
        Some(Color::rgba(px[0], px[1], px[2], px[3]))
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Number of pixels with any coverage at all.
    pub fn painted_pixels(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] != 0).count()
    }

    /// Rasterizes one op and returns how many pixels it touched.
    pub fn execute(&mut self, op: &DrawOp) -> u64 {
        let (mask, color) = match op {
            DrawOp::StrokePolyline { points, style } => {
                (self.stroke_mask(points, style), style.color)
            }
            DrawOp::StrokeRect { rect, style } => {
                (self.stroke_mask(&rect_outline(rect), style), style.color)
            }
            DrawOp::StrokeEllipse { rect, style } => {
                (self.stroke_mask(&ellipse_outline(rect), style), style.color)
            }
            DrawOp::FillPolygon { points, color } => {
                let mask = self.bounds(points, 0.0).map(|bounds| {
                    let mut mask = Mask::new(bounds);
                    mask.fill_polygon(points);
                    mask
                });
                (mask, *color)
            }
            DrawOp::Text { text, .. } => {
                tracing::trace!(len = text.len(), "skipping text op in software raster");
                (None, Color::default())
            }
        };
        let Some(mask) = mask else {
            return 0;
        };
        let mut touched = 0u64;
        for (x, y) in mask.covered_pixels() {
            self.blend(x, y, color);
            touched = touched.saturating_add(1);
        }
        touched
    }

    pub fn execute_all<'a>(&mut self, ops: impl IntoIterator<Item = &'a DrawOp>) -> u64 {
        ops.into_iter().map(|op| self.execute(op)).sum()
    }

    fn bounds(&self, points: &[Point], pad: f32) -> Option<DirtyRect> {
        DirtyRect::around(points, pad)?.clamp(self.width, self.height)
    }

    fn stroke_mask(&self, points: &[Point], style: &StrokeStyle) -> Option<Mask> {
        let radius = (style.width * 0.5).max(0.5);
        let bounds = self.bounds(points, radius.ceil() + 1.0)?;
        let mut mask = Mask::new(bounds);
        mask.stroke_polyline(points, radius);
        Some(mask)
    }

    /// Source-over blend of `color` onto the pixel at (`x`, `y`).
    fn blend(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        let dst = &mut self.pixels[idx..idx + 4];

        let sa = color.alpha();
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= f32::EPSILON {
            return;
        }
        let mix = |s: u8, d: u8| {
            let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        dst[0] = mix(color.r, dst[0]);
        dst[1] = mix(color.g, dst[1]);
        dst[2] = mix(color.b, dst[2]);
        dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

fn pixel_center(x: i32, y: i32) -> Point {
    Point::new(x as f32 + 0.5, y as f32 + 0.5)
}

fn rect_outline(rect: &Rect) -> Vec<Point> {
    vec![
        Point::new(rect.x, rect.y),
        Point::new(rect.max_x(), rect.y),
        Point::new(rect.max_x(), rect.max_y()),
        Point::new(rect.x, rect.max_y()),
        Point::new(rect.x, rect.y),
    ]
}

fn ellipse_outline(rect: &Rect) -> Vec<Point> {
    let center = rect.center();
    let rx = rect.width * 0.5;
    let ry = rect.height * 0.5;
    let circumference = std::f32::consts::TAU * rx.max(ry);
    let steps = circumference.clamp(12.0, MAX_ELLIPSE_STEPS) as usize;
    (0..=steps)
        .map(|step| {
            let t = (step as f32 / steps as f32) * std::f32::consts::TAU;
            Point::new(center.x + rx * t.cos(), center.y + ry * t.sin())
        })
        .collect()
}

fn intersect_dirty_rect(a: DirtyRect, b: DirtyRect) -> Option<DirtyRect> {
    let x0 = a.x.max(b.x);
    let y0 = a.y.max(b.y);
    let x1 = a.x.saturating_add(a.width).min(b.x.saturating_add(b.width));
    let y1 = a.y.saturating_add(a.height).min(b.y.saturating_add(b.height));
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(DirtyRect {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    })
}

fn point_segment_distance_sq(point: Point, start: Point, end: Point) -> f32 {
    let vx = end.x - start.x;
    let vy = end.y - start.y;
    let wx = point.x - start.x;
    let wy = point.y - start.y;
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f32::EPSILON {
        return wx * wx + wy * wy;
    }
    let t = ((wx * vx + wy * vy) / len_sq).clamp(0.0, 1.0);
    let dx = point.x - (start.x + vx * t);
    let dy = point.y - (start.y + vy * t);
    dx * dx + dy * dy
}

/// Even-odd rule.
fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
