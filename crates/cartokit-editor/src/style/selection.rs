//! Decorations drawn on top of selected and highlighted features.

use super::color::{resolve_color, with_opacity};
use super::types::{FillStyle, StrokeStyle, Style, StyleList, SymbolImage};
use crate::feature::FeatureEntity;
use crate::geometry::GeometryKind;
use cartokit_settings::StyleSettings;
use smallvec::smallvec;
use std::rc::Rc;
use tiny_skia::Color;
use tracing::error;

/// Stacking order of every overlay style; above any feature content.
pub const OVERLAY_Z_INDEX: f64 = f64::INFINITY;

#[derive(Debug, Clone)]
pub struct SelectionOverlayFactory {
    selection: Color,
    highlight: Color,
}

impl Default for SelectionOverlayFactory {
    fn default() -> Self {
        Self::from_settings(&StyleSettings::default())
    }
}

impl SelectionOverlayFactory {
    pub fn new(selection: Color, highlight: Color) -> Self {
        Self {
            selection,
            highlight,
        }
    }

    pub fn from_settings(settings: &StyleSettings) -> Self {
        let defaults = StyleSettings::default();
        Self::new(
            resolve_color(Some(&settings.selection_color), &defaults.selection_color),
            resolve_color(Some(&settings.highlight_color), &defaults.highlight_color),
        )
    }

    /// Selection decoration for the feature's geometry kind. Empty without geometry.
    pub fn get_for_feature(&self, feature: &FeatureEntity, ratio: f64) -> StyleList {
        match feature.geometry_kind() {
            Some(kind) => self.for_kind(kind, ratio),
            None => StyleList::new(),
        }
    }

    pub fn for_kind(&self, kind: GeometryKind, ratio: f64) -> StyleList {
        let r = ratio as f32;
        match kind {
            GeometryKind::Polygon | GeometryKind::MultiPolygon | GeometryKind::Circle => {
                smallvec![self.area(r)]
            }
            GeometryKind::LineString | GeometryKind::MultiLineString => smallvec![self.line(r)],
            GeometryKind::Point | GeometryKind::MultiPoint => smallvec![self.point(r)],
            GeometryKind::GeometryCollection => {
                smallvec![self.area(r), self.line(r), self.point(r)]
            }
            GeometryKind::LinearRing => {
                error!("No selection overlay for geometry kind {}", kind);
                StyleList::new()
            }
        }
    }

    /// Highlight ring for the feature's geometry kind. Empty without geometry.
    pub fn highlight_for_feature(&self, feature: &FeatureEntity, ratio: f64) -> StyleList {
        match feature.geometry_kind() {
            Some(kind) => self.highlight_for_kind(kind, ratio),
            None => StyleList::new(),
        }
    }

    pub fn highlight_for_kind(&self, kind: GeometryKind, ratio: f64) -> StyleList {
        let r = ratio as f32;
        let ring = || StrokeStyle::solid(with_opacity(self.highlight, 0.8), 6.0 * r);
        let outline = || Rc::new(Style::new().with_stroke(ring()).with_z_index(OVERLAY_Z_INDEX));
        let marker = || {
            Rc::new(
                Style::new()
                    .with_image(SymbolImage::Marker {
                        radius: 14.0 * r,
                        fill: None,
                        stroke: Some(ring()),
                    })
                    .with_z_index(OVERLAY_Z_INDEX),
            )
        };

        if kind.is_area() || kind.is_line() {
            smallvec![outline()]
        } else if kind.is_point() {
            smallvec![marker()]
        } else if kind == GeometryKind::GeometryCollection {
            smallvec![outline(), marker()]
        } else {
            error!("No highlight overlay for geometry kind {}", kind);
            StyleList::new()
        }
    }

    fn dashed(&self, r: f32) -> StrokeStyle {
        StrokeStyle::dashed(self.selection, 3.0 * r, vec![6.0 * r, 4.0 * r])
    }

    fn area(&self, r: f32) -> Rc<Style> {
        Rc::new(
            Style::new()
                .with_fill(FillStyle::Solid(with_opacity(self.selection, 0.25)))
                .with_stroke(self.dashed(r))
                .with_z_index(OVERLAY_Z_INDEX),
        )
    }

    fn line(&self, r: f32) -> Rc<Style> {
        Rc::new(
            Style::new()
                .with_stroke(self.dashed(r))
                .with_z_index(OVERLAY_Z_INDEX),
        )
    }

    fn point(&self, r: f32) -> Rc<Style> {
        Rc::new(
            Style::new()
                .with_image(SymbolImage::Marker {
                    radius: 10.0 * r,
                    fill: Some(with_opacity(self.selection, 0.35)),
                    stroke: Some(StrokeStyle::solid(self.selection, 2.0 * r)),
                })
                .with_z_index(OVERLAY_Z_INDEX),
        )
    }
}
