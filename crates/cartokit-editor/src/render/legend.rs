//! Legend rendering.
//!
//! Layout runs in two passes. The first measures every symbol to size the
//! shared symbol column; the second draws the border, then each row top to
//! bottom: symbol left-aligned in the column, label to its right.

use super::font_manager;
use super::surface::DrawSurface;
use super::symbol::{render_symbol_in, symbol_size_for_style, SymbolOutcome, SymbolRender, SymbolSize};
use crate::feature::TextAlignment;
use crate::geometry::{Extent, GeometryKind, Point};
use crate::legend::Legend;
use crate::style::{resolve_color, StrokeStyle, Style, StyleFactory, TextStyle};
use cartokit_core::Shared;
use cartokit_settings::LegendSettings;
use std::rc::Rc;
use tracing::debug;

struct LegendRow {
    symbol: Option<(Rc<Style>, GeometryKind, SymbolSize)>,
    label: TextStyle,
    height: f64,
}

struct LegendLayout {
    rows: Vec<LegendRow>,
    symbol_column: f64,
    width: f64,
    height: f64,
}

/// Completion signal of a legend draw: one entry per drawn symbol.
#[derive(Debug)]
pub struct LegendRender {
    symbols: Vec<SymbolRender>,
}

impl LegendRender {
    /// Number of symbols still waiting for their icon.
    pub fn pending(&mut self) -> usize {
        let mut waiting = 0;
        for symbol in &mut self.symbols {
            if !symbol.is_finished() {
                waiting += 1;
            }
        }
        waiting
    }

    /// Waits until every symbol has been drawn or abandoned.
    pub async fn wait(self) -> Vec<SymbolOutcome> {
        let mut outcomes = Vec::with_capacity(self.symbols.len());
        for symbol in self.symbols {
            outcomes.push(symbol.await);
        }
        outcomes
    }
}

#[derive(Debug, Clone)]
pub struct LegendRenderer {
    factory: StyleFactory,
    settings: LegendSettings,
}

impl LegendRenderer {
    pub fn new(factory: StyleFactory, settings: LegendSettings) -> Self {
        Self { factory, settings }
    }

    pub fn settings(&self) -> &LegendSettings {
        &self.settings
    }

    /// Pixel size a legend needs at `ratio`, measured with system fonts.
    pub fn legend_size(&self, legend: &Legend, ratio: f64) -> (u32, u32) {
        let layout = self.layout(legend, ratio, &|text: &TextStyle| {
            font_manager::measure_text(&text.font, text.size, &text.value)
        });
        (layout.width.ceil() as u32, layout.height.ceil() as u32)
    }

    /// Draws `legend` onto `target`.
    pub fn render_legend<S>(&self, legend: &Legend, target: &Shared<S>, ratio: f64) -> LegendRender
    where
        S: DrawSurface + 'static,
    {
        let (layout, surface_w, surface_h) = {
            let surface = target.borrow();
            let layout = self.layout(legend, ratio, &|text: &TextStyle| surface.measure_text(text));
            (layout, surface.width() as f64, surface.height() as f64)
        };
        debug!(
            "Legend: {} row(s), {:.0}x{:.0} px",
            layout.rows.len(),
            layout.width,
            layout.height
        );

        let s = &self.settings;
        let border = s.border_width * ratio;
        let defaults = LegendSettings::default();
        target.borrow_mut().draw_frame(
            Extent::new(
                border / 2.0,
                border / 2.0,
                surface_w - border / 2.0,
                surface_h - border / 2.0,
            ),
            (s.border_radius * ratio) as f32,
            Some(resolve_color(
                Some(&s.background_color),
                &defaults.background_color,
            )),
            Some(&StrokeStyle::solid(
                resolve_color(Some(&s.border_color), &defaults.border_color),
                border as f32,
            )),
        );

        let padding = s.padding * ratio;
        let margin = s.item_margin * ratio;
        let label_x = padding + layout.symbol_column + self.gap(&layout, ratio);

        let mut symbols = Vec::new();
        let mut cursor = padding;
        for row in &layout.rows {
            if let Some((style, kind, size)) = &row.symbol {
                let frame = Extent::from_xywh(padding, cursor, size.width, row.height);
                symbols.push(render_symbol_in(style, *kind, target, frame, ratio));
            }
            target
                .borrow_mut()
                .draw_text(Point::new(label_x, cursor + row.height / 2.0), &row.label);
            cursor += row.height + margin;
        }

        LegendRender { symbols }
    }

    fn gap(&self, layout: &LegendLayout, ratio: f64) -> f64 {
        if layout.symbol_column > 0.0 {
            self.settings.symbol_text_gap * ratio
        } else {
            0.0
        }
    }

    fn label(&self, text: &str, ratio: f64) -> TextStyle {
        let s = &self.settings;
        TextStyle {
            value: text.to_string(),
            font: s.font.clone(),
            size: (s.font_size * ratio) as f32,
            color: resolve_color(Some(&s.text_color), &LegendSettings::default().text_color),
            offset_x: 0.0,
            offset_y: 0.0,
            alignment: TextAlignment::Left,
        }
    }

    fn layout(
        &self,
        legend: &Legend,
        ratio: f64,
        measure: &dyn Fn(&TextStyle) -> (f32, f32),
    ) -> LegendLayout {
        let padding = self.settings.padding * ratio;
        let margin = self.settings.item_margin * ratio;

        // Pass one: symbols and labels, widest symbol.
        let mut rows = Vec::with_capacity(legend.len());
        let mut symbol_column: f64 = 0.0;
        let mut label_column: f64 = 0.0;
        for item in legend.items() {
            let symbol = item.symbol.as_ref().map(|symbol| {
                let style =
                    self.factory
                        .get_for_properties(&symbol.properties, symbol.geometry, ratio);
                let size = symbol_size_for_style(&style, symbol.geometry, ratio);
                (style, symbol.geometry, size)
            });
            let label = self.label(&item.text, ratio);
            let (text_w, text_h) = measure(&label);

            let symbol_h = symbol.as_ref().map_or(0.0, |(_, _, size)| size.height);
            if let Some((_, _, size)) = &symbol {
                symbol_column = symbol_column.max(size.width);
            }
            label_column = label_column.max(f64::from(text_w));
            rows.push(LegendRow {
                symbol,
                label,
                height: symbol_h.max(f64::from(text_h)),
            });
        }

        let mut layout = LegendLayout {
            rows,
            symbol_column,
            width: 0.0,
            height: 0.0,
        };
        let content_h: f64 = layout.rows.iter().map(|row| row.height + margin).sum();
        let content_h = if layout.rows.is_empty() {
            0.0
        } else {
            content_h - margin
        };
        layout.width = 2.0 * padding + symbol_column + self.gap(&layout, ratio) + label_column;
        layout.height = 2.0 * padding + content_h;
        layout
    }
}
