//! Drawing surfaces.
//!
//! Coordinates are surface pixels with the origin at the top left. Styles
//! arrive already scaled by the render ratio.

use super::font_manager;
use crate::feature::TextAlignment;
use crate::geometry::{Extent, Point};
use crate::style::icons::rgba_from_pixmap;
use crate::style::{StrokeStyle, Style, SymbolImage, TextStyle};
use cartokit_core::RenderError;
use image::RgbaImage;
use rusttype::{point as rt_point, Scale};
use std::path::Path;
use tiny_skia::{
    Color, ColorU8, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Transform,
};
use tracing::trace;

/// 2D target for feature, symbol and legend drawing.
pub trait DrawSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Draws the style's point visual centred on `at`.
    fn draw_point(&mut self, at: Point, style: &Style);

    /// Strokes an open polyline with the style's stroke.
    fn draw_line(&mut self, points: &[Point], style: &Style);

    /// Fills then strokes a polygon, exterior ring first, holes after.
    fn draw_polygon(&mut self, rings: &[Vec<Point>], style: &Style);

    /// Draws a label anchored on `at`, shifted by the text offsets.
    fn draw_text(&mut self, at: Point, text: &TextStyle);

    /// Draws a rectangle with rounded corners.
    fn draw_frame(
        &mut self,
        frame: Extent,
        radius: f32,
        fill: Option<Color>,
        stroke: Option<&StrokeStyle>,
    );

    /// Width and line height of a label.
    fn measure_text(&self, text: &TextStyle) -> (f32, f32) {
        font_manager::measure_text(&text.font, text.size, &text.value)
    }
}

/// Raster surface backed by a `tiny_skia::Pixmap`.
pub struct PixmapSurface {
    pixmap: Pixmap,
}

impl std::fmt::Debug for PixmapSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixmapSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .finish()
    }
}

impl PixmapSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        Pixmap::new(width, height)
            .map(|pixmap| Self { pixmap })
            .ok_or(RenderError::SurfaceAllocation { width, height })
    }

    pub fn fill(&mut self, color: Color) {
        self.pixmap.fill(color);
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight-alpha RGBA pixel at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> Option<ColorU8> {
        self.pixmap.pixel(x, y).map(|p| p.demultiply())
    }

    /// Number of pixels with any coverage.
    pub fn painted_pixels(&self) -> usize {
        self.pixmap.pixels().iter().filter(|p| p.alpha() > 0).count()
    }

    pub fn to_image(&self) -> RgbaImage {
        rgba_from_pixmap(&self.pixmap)
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(self.to_image())
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| RenderError::Encoding {
                reason: e.to_string(),
            })?;
        Ok(bytes)
    }

    pub fn save_png(&self, path: &Path) -> cartokit_core::Result<()> {
        let bytes = self.encode_png()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn stroke_path(&mut self, path: &tiny_skia::Path, stroke: &StrokeStyle) {
        let mut paint = Paint::default();
        paint.set_color(stroke.color);
        paint.anti_alias = true;
        self.pixmap
            .stroke_path(path, &paint, &stroke.to_skia(), Transform::identity(), None);
    }
}

fn open_path(points: &[Point]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for p in rest {
        pb.line_to(p.x as f32, p.y as f32);
    }
    pb.finish()
}

fn rings_path(rings: &[Vec<Point>]) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for ring in rings {
        let Some((first, rest)) = ring.split_first() else {
            continue;
        };
        pb.move_to(first.x as f32, first.y as f32);
        for p in rest {
            pb.line_to(p.x as f32, p.y as f32);
        }
        pb.close();
    }
    pb.finish()
}

fn rounded_rect(frame: Extent, radius: f32) -> Option<tiny_skia::Path> {
    let (x, y) = (frame.min_x as f32, frame.min_y as f32);
    let (w, h) = (frame.width() as f32, frame.height() as f32);
    let r = radius.min(w / 2.0).min(h / 2.0);
    if r <= 0.0 {
        return Rect::from_xywh(x, y, w, h).map(PathBuilder::from_rect);
    }

    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

impl DrawSurface for PixmapSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn draw_point(&mut self, at: Point, style: &Style) {
        match &style.image {
            Some(SymbolImage::Icon(icon)) => {
                let Some(bitmap) = icon.pixmap() else {
                    trace!("Icon '{}' not loaded, point skipped", icon.name());
                    return;
                };
                let x = at.x as f32 - bitmap.width() as f32 / 2.0;
                let y = at.y as f32 - bitmap.height() as f32 / 2.0;
                self.pixmap.draw_pixmap(
                    x.round() as i32,
                    y.round() as i32,
                    (*bitmap).as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                );
            }
            Some(SymbolImage::Marker {
                radius,
                fill,
                stroke,
            }) => {
                let Some(path) = PathBuilder::from_circle(at.x as f32, at.y as f32, *radius)
                else {
                    return;
                };
                if let Some(color) = fill {
                    let mut paint = Paint::default();
                    paint.set_color(*color);
                    paint.anti_alias = true;
                    self.pixmap
                        .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                }
                if let Some(stroke) = stroke {
                    self.stroke_path(&path, stroke);
                }
            }
            None => {}
        }
    }

    fn draw_line(&mut self, points: &[Point], style: &Style) {
        let (Some(stroke), Some(path)) = (&style.stroke, open_path(points)) else {
            return;
        };
        self.stroke_path(&path, stroke);
    }

    fn draw_polygon(&mut self, rings: &[Vec<Point>], style: &Style) {
        let Some(path) = rings_path(rings) else {
            return;
        };
        if let Some(fill) = &style.fill {
            self.pixmap.fill_path(
                &path,
                &fill.paint(),
                FillRule::EvenOdd,
                Transform::identity(),
                None,
            );
        }
        if let Some(stroke) = &style.stroke {
            self.stroke_path(&path, stroke);
        }
    }

    fn draw_text(&mut self, at: Point, text: &TextStyle) {
        if text.value.is_empty() {
            return;
        }
        let Some(font) = font_manager::font_for(&text.font) else {
            return;
        };

        let scale = Scale::uniform(text.size);
        let metrics = font.v_metrics(scale);
        let glyphs: Vec<_> = font
            .layout(&text.value, scale, rt_point(0.0, metrics.ascent))
            .collect();
        let width = glyphs
            .iter()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .fold(0.0_f32, f32::max);
        let height = metrics.ascent - metrics.descent;

        let Some(mut layer) = Pixmap::new(width.ceil() as u32 + 1, height.ceil() as u32 + 1)
        else {
            return;
        };
        let (layer_w, layer_h) = (layer.width() as i32, layer.height() as i32);
        let color = text.color.to_color_u8();
        let pixels = layer.pixels_mut();
        for glyph in &glyphs {
            let Some(bounds) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bounds.min.x;
                let py = gy as i32 + bounds.min.y;
                if px < 0 || py < 0 || px >= layer_w || py >= layer_h {
                    return;
                }
                let alpha = (coverage.clamp(0.0, 1.0) * color.alpha() as f32).round() as u8;
                pixels[(py * layer_w + px) as usize] =
                    ColorU8::from_rgba(color.red(), color.green(), color.blue(), alpha)
                        .premultiply();
            });
        }

        let left = match text.alignment {
            TextAlignment::Left => at.x as f32,
            TextAlignment::Center => at.x as f32 - width / 2.0,
            TextAlignment::Right => at.x as f32 - width,
        };
        let top = at.y as f32 - height / 2.0;
        self.pixmap.draw_pixmap(
            (left + text.offset_x).round() as i32,
            (top + text.offset_y).round() as i32,
            layer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn draw_frame(
        &mut self,
        frame: Extent,
        radius: f32,
        fill: Option<Color>,
        stroke: Option<&StrokeStyle>,
    ) {
        let Some(path) = rounded_rect(frame, radius) else {
            return;
        };
        if let Some(color) = fill {
            let mut paint = Paint::default();
            paint.set_color(color);
            paint.anti_alias = true;
            self.pixmap
                .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
        if let Some(stroke) = stroke {
            self.stroke_path(&path, stroke);
        }
    }
}

/// One primitive recorded by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Point { at: Point },
    Line { points: Vec<Point> },
    Polygon { rings: Vec<Vec<Point>> },
    Text { at: Point, value: String },
    Frame { frame: Extent },
}

/// Surface that records draw calls instead of rasterizing.
///
/// Text is measured with a fixed advance so layouts are deterministic.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn is_untouched(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn count_points(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Point { .. }))
            .count()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { value, .. } => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DrawSurface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn draw_point(&mut self, at: Point, _style: &Style) {
        self.calls.push(DrawCall::Point { at });
    }

    fn draw_line(&mut self, points: &[Point], _style: &Style) {
        self.calls.push(DrawCall::Line {
            points: points.to_vec(),
        });
    }

    fn draw_polygon(&mut self, rings: &[Vec<Point>], _style: &Style) {
        self.calls.push(DrawCall::Polygon {
            rings: rings.to_vec(),
        });
    }

    fn draw_text(&mut self, at: Point, text: &TextStyle) {
        self.calls.push(DrawCall::Text {
            at,
            value: text.value.clone(),
        });
    }

    fn draw_frame(
        &mut self,
        frame: Extent,
        _radius: f32,
        _fill: Option<Color>,
        _stroke: Option<&StrokeStyle>,
    ) {
        self.calls.push(DrawCall::Frame { frame });
    }

    fn measure_text(&self, text: &TextStyle) -> (f32, f32) {
        (
            text.value.chars().count() as f32 * text.size * 0.5,
            text.size * font_manager::LINE_HEIGHT,
        )
    }
}
