//! Draws a whole layer onto a surface.

use super::surface::DrawSurface;
use crate::geometry::{Extent, Geometry, Point};
use crate::layer::VectorLayer;
use crate::style::{Style, StyleFactory};
use std::f64::consts::TAU;
use std::rc::Rc;
use tracing::trace;

/// Segments used to draw circles.
const CIRCLE_SEGMENTS: usize = 48;

/// Maps map coordinates to surface pixels, y axis pointing up on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    height: f64,
}

impl ViewTransform {
    pub fn new(scale: f64, offset_x: f64, offset_y: f64, height: f64) -> Self {
        Self {
            scale,
            offset_x,
            offset_y,
            height,
        }
    }

    /// Fits `extent` inside a `width` x `height` surface with `padding`
    /// pixels on each side, keeping the aspect ratio.
    pub fn fit(extent: Extent, width: u32, height: u32, padding: f64) -> Self {
        let avail_w = (width as f64 - 2.0 * padding).max(1.0);
        let avail_h = (height as f64 - 2.0 * padding).max(1.0);
        let scale = match (extent.width() > 0.0, extent.height() > 0.0) {
            (true, true) => (avail_w / extent.width()).min(avail_h / extent.height()),
            (true, false) => avail_w / extent.width(),
            (false, true) => avail_h / extent.height(),
            (false, false) => 1.0,
        };
        let center = extent.center();
        Self {
            scale,
            offset_x: width as f64 / 2.0 - center.x * scale,
            offset_y: height as f64 / 2.0 - center.y * scale,
            height: height as f64,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn to_pixel(&self, p: &Point) -> Point {
        Point::new(
            p.x * self.scale + self.offset_x,
            self.height - (p.y * self.scale + self.offset_y),
        )
    }

    fn ring(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.to_pixel(p)).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub features: usize,
    pub styles_drawn: usize,
    /// Styles skipped because their icon was still loading.
    pub styles_deferred: usize,
}

/// Draws every feature of `layer`, lowest z-index first.
///
/// Styles whose icon has not loaded yet are requested and skipped for this
/// frame; drawing again once they are ready completes the picture.
pub fn render_features(
    surface: &mut dyn DrawSurface,
    layer: &VectorLayer,
    factory: &StyleFactory,
    view: &ViewTransform,
    ratio: f64,
) -> RenderStats {
    let mut stats = RenderStats::default();
    let mut queue: Vec<(Rc<Style>, Geometry)> = Vec::new();

    for handle in layer.features() {
        let feature = handle.borrow();
        let Some(geometry) = feature.geometry() else {
            continue;
        };
        stats.features += 1;
        for style in factory.get_for_feature(&feature, ratio) {
            queue.push((style, geometry.clone()));
        }
    }
    queue.sort_by(|a, b| a.0.z().total_cmp(&b.0.z()));

    for (style, geometry) in &queue {
        if let Some(icon) = style.icon().filter(|_| style.awaits_icon()) {
            icon.load();
            if !icon.is_settled() {
                trace!("Icon '{}' still loading, style skipped", icon.name());
                stats.styles_deferred += 1;
                continue;
            }
        }
        draw_geometry(surface, geometry, style, view);
        if let Some(text) = &style.text {
            if let Some(anchor) = label_anchor(geometry) {
                surface.draw_text(view.to_pixel(&anchor), text);
            }
        }
        stats.styles_drawn += 1;
    }
    stats
}

fn draw_geometry(surface: &mut dyn DrawSurface, geometry: &Geometry, style: &Style, view: &ViewTransform) {
    match geometry {
        Geometry::Point(p) => surface.draw_point(view.to_pixel(p), style),
        Geometry::MultiPoint(points) => {
            for p in points {
                surface.draw_point(view.to_pixel(p), style);
            }
        }
        Geometry::LineString(points) => surface.draw_line(&view.ring(points), style),
        Geometry::LinearRing(points) => {
            let mut ring = view.ring(points);
            if let Some(first) = ring.first().copied() {
                ring.push(first);
            }
            surface.draw_line(&ring, style);
        }
        Geometry::MultiLineString(lines) => {
            for line in lines {
                surface.draw_line(&view.ring(line), style);
            }
        }
        Geometry::Polygon(rings) => {
            let rings: Vec<Vec<Point>> = rings.iter().map(|r| view.ring(r)).collect();
            surface.draw_polygon(&rings, style);
        }
        Geometry::MultiPolygon(polygons) => {
            for polygon in polygons {
                let rings: Vec<Vec<Point>> = polygon.iter().map(|r| view.ring(r)).collect();
                surface.draw_polygon(&rings, style);
            }
        }
        Geometry::Circle { center, radius } => {
            let ring: Vec<Point> = (0..=CIRCLE_SEGMENTS)
                .map(|i| {
                    let angle = TAU * i as f64 / CIRCLE_SEGMENTS as f64;
                    view.to_pixel(&Point::new(
                        center.x + radius * angle.cos(),
                        center.y + radius * angle.sin(),
                    ))
                })
                .collect();
            surface.draw_polygon(&[ring], style);
        }
        Geometry::GeometryCollection(children) => {
            for child in children {
                draw_geometry(surface, child, style, view);
            }
        }
    }
}

/// Where a label goes: the point itself, the middle vertex of a line, or the
/// centre of the extent.
fn label_anchor(geometry: &Geometry) -> Option<Point> {
    match geometry {
        Geometry::Point(p) => Some(*p),
        Geometry::Circle { center, .. } => Some(*center),
        Geometry::LineString(points) => points.get(points.len() / 2).copied(),
        _ => geometry.extent().map(|e| e.center()),
    }
}
