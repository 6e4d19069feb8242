//! Ready-to-draw style objects.
//!
//! A [`Style`] is built once per distinct appearance by the style factory and
//! shared through `Rc`. It holds resolved colours, pixel widths already scaled
//! by the render ratio, pattern tiles and icon handles.

use super::icons::IconImage;
use crate::feature::{FillPattern, TextAlignment};
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;
use tiny_skia::{Color, Paint, Pixmap, Transform};

/// Styles drawn for one feature, bottom to top.
pub type StyleList = SmallVec<[Rc<Style>; 4]>;

/// Edge length of generated pattern tiles, before ratio scaling.
pub const PATTERN_TILE_SIZE: f64 = 8.0;

#[derive(Clone)]
pub enum FillStyle {
    Solid(Color),
    Pattern {
        pattern: FillPattern,
        background: Color,
        foreground: Color,
        tile: Rc<Pixmap>,
    },
}

impl fmt::Debug for FillStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillStyle::Solid(color) => f.debug_tuple("Solid").field(color).finish(),
            FillStyle::Pattern {
                pattern,
                background,
                foreground,
                tile,
            } => f
                .debug_struct("Pattern")
                .field("pattern", pattern)
                .field("background", background)
                .field("foreground", foreground)
                .field("tile", &(tile.width(), tile.height()))
                .finish(),
        }
    }
}

impl FillStyle {
    /// Dominant colour, used for swatches and catalog sorting.
    pub fn color(&self) -> Color {
        match self {
            FillStyle::Solid(color) => *color,
            FillStyle::Pattern { background, .. } => *background,
        }
    }

    /// Paint configured for this fill. Pattern paints borrow the tile.
    pub fn paint(&self) -> Paint<'_> {
        let mut paint = Paint {
            anti_alias: true,
            ..Paint::default()
        };
        match self {
            FillStyle::Solid(color) => paint.set_color(*color),
            FillStyle::Pattern { tile, .. } => {
                paint.shader = tiny_skia::Pattern::new(
                    (**tile).as_ref(),
                    tiny_skia::SpreadMode::Repeat,
                    tiny_skia::FilterQuality::Nearest,
                    1.0,
                    Transform::identity(),
                );
            }
        }
        paint
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    /// Width in surface pixels.
    pub width: f32,
    pub line_dash: Option<Vec<f32>>,
}

impl StrokeStyle {
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            line_dash: None,
        }
    }

    pub fn dashed(color: Color, width: f32, dash: Vec<f32>) -> Self {
        Self {
            color,
            width,
            line_dash: Some(dash),
        }
    }

    pub fn to_skia(&self) -> tiny_skia::Stroke {
        tiny_skia::Stroke {
            width: self.width.max(0.0),
            line_cap: tiny_skia::LineCap::Round,
            line_join: tiny_skia::LineJoin::Round,
            dash: self
                .line_dash
                .as_ref()
                .and_then(|dash| tiny_skia::StrokeDash::new(dash.clone(), 0.0)),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub value: String,
    pub font: String,
    /// Size in surface pixels.
    pub size: f32,
    pub color: Color,
    pub offset_x: f32,
    pub offset_y: f32,
    pub alignment: TextAlignment,
}

/// Point visual.
#[derive(Debug, Clone)]
pub enum SymbolImage {
    /// Bitmap icon that may still be loading.
    Icon(IconImage),
    /// Vector circle, drawn immediately.
    Marker {
        radius: f32,
        fill: Option<Color>,
        stroke: Option<StrokeStyle>,
    },
}

impl SymbolImage {
    pub fn icon(&self) -> Option<&IconImage> {
        match self {
            SymbolImage::Icon(icon) => Some(icon),
            SymbolImage::Marker { .. } => None,
        }
    }

    /// Pixel size of the visual. Icons report their natural size.
    pub fn size(&self) -> (f32, f32) {
        match self {
            SymbolImage::Icon(icon) => {
                let (w, h) = icon.size();
                (w as f32, h as f32)
            }
            SymbolImage::Marker { radius, stroke, .. } => {
                let edge = 2.0 * radius + stroke.as_ref().map_or(0.0, |s| s.width);
                (edge, edge)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Style {
    pub fill: Option<FillStyle>,
    pub stroke: Option<StrokeStyle>,
    pub image: Option<SymbolImage>,
    pub text: Option<TextStyle>,
    pub z_index: Option<f64>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fill(mut self, fill: FillStyle) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_stroke(mut self, stroke: StrokeStyle) -> Self {
        self.stroke = Some(stroke);
        self
    }

    pub fn with_image(mut self, image: SymbolImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_z_index(mut self, z_index: f64) -> Self {
        self.z_index = Some(z_index);
        self
    }

    /// Stacking order, 0 when unset.
    pub fn z(&self) -> f64 {
        self.z_index.unwrap_or(0.0)
    }

    pub fn icon(&self) -> Option<&IconImage> {
        self.image.as_ref().and_then(SymbolImage::icon)
    }

    /// True when the style has an icon that has not settled yet.
    pub fn awaits_icon(&self) -> bool {
        self.icon().is_some_and(|icon| !icon.is_settled())
    }

    pub fn is_empty(&self) -> bool {
        self.fill.is_none() && self.stroke.is_none() && self.image.is_none() && self.text.is_none()
    }
}

/// Builds the repeating tile for a fill pattern, or `None` for a flat fill.
pub fn pattern_tile(
    pattern: FillPattern,
    background: Color,
    foreground: Color,
    ratio: f64,
) -> Option<Pixmap> {
    if pattern == FillPattern::Flat {
        return None;
    }

    let size = (PATTERN_TILE_SIZE * ratio).round().max(2.0) as u32;
    let mut tile = Pixmap::new(size, size)?;
    tile.fill(background);

    let s = size as f32;
    let mut paint = Paint::default();
    paint.set_color(foreground);
    paint.anti_alias = true;
    let stroke = tiny_skia::Stroke {
        width: (ratio as f32).max(1.0),
        ..Default::default()
    };

    let mut pb = tiny_skia::PathBuilder::new();
    match pattern {
        FillPattern::Flat => return None,
        FillPattern::HatchingObliqueRight => {
            // Extra segments keep the stripes continuous across tile edges.
            pb.move_to(0.0, s);
            pb.line_to(s, 0.0);
            pb.move_to(-s / 2.0, s / 2.0);
            pb.line_to(s / 2.0, -s / 2.0);
            pb.move_to(s / 2.0, 3.0 * s / 2.0);
            pb.line_to(3.0 * s / 2.0, s / 2.0);
        }
        FillPattern::HatchingObliqueLeft => {
            pb.move_to(0.0, 0.0);
            pb.line_to(s, s);
            pb.move_to(s / 2.0, -s / 2.0);
            pb.line_to(3.0 * s / 2.0, s / 2.0);
            pb.move_to(-s / 2.0, s / 2.0);
            pb.line_to(s / 2.0, 3.0 * s / 2.0);
        }
        FillPattern::HatchingVertical => {
            pb.move_to(s / 2.0, 0.0);
            pb.line_to(s / 2.0, s);
        }
        FillPattern::HatchingHorizontal => {
            pb.move_to(0.0, s / 2.0);
            pb.line_to(s, s / 2.0);
        }
        FillPattern::Dots => {
            pb.push_circle(s / 2.0, s / 2.0, (s / 6.0).max(0.75));
        }
    }
    let path = pb.finish()?;

    if pattern == FillPattern::Dots {
        tile.fill_path(
            &path,
            &paint,
            tiny_skia::FillRule::Winding,
            Transform::identity(),
            None,
        );
    } else {
        tile.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
    Some(tile)
}
