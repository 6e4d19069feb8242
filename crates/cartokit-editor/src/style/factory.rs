//! Builds, caches and catalogs drawable styles.

use super::cache::{CacheStats, CachedStyle, StyleCache};
use super::color::resolve_color;
use super::icons::{BuiltinIcons, IconImage, IconLoader, IconRequest};
use super::selection::SelectionOverlayFactory;
use super::types::{pattern_tile, FillStyle, StrokeStyle, Style, StyleList, SymbolImage, TextStyle};
use crate::feature::{
    FeatureEntity, FillPattern, FillProperties, PointProperties, StrokeProperties, StyleProperties,
};
use crate::geometry::GeometryKind;
use cartokit_core::StyleError;
use cartokit_settings::StyleSettings;
use smallvec::smallvec;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, error};

struct FactoryInner {
    settings: StyleSettings,
    cache: RefCell<StyleCache>,
    icons: RefCell<Rc<dyn IconLoader>>,
    selection: SelectionOverlayFactory,
}

/// Shared handle to a style cache and the rules that fill it.
///
/// Cloning the handle shares the cache. Each editing session constructs its
/// own factory, so clearing one session's cache never affects another.
#[derive(Clone)]
pub struct StyleFactory {
    inner: Rc<FactoryInner>,
}

impl fmt::Debug for StyleFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleFactory")
            .field("icon_theme", &self.inner.settings.icon_theme)
            .field("cache", &self.cache_stats())
            .finish()
    }
}

impl Default for StyleFactory {
    fn default() -> Self {
        Self::from_settings(&StyleSettings::default())
    }
}

impl StyleFactory {
    pub fn new(settings: StyleSettings, icons: Rc<dyn IconLoader>) -> Self {
        let selection = SelectionOverlayFactory::from_settings(&settings);
        Self {
            inner: Rc::new(FactoryInner {
                settings,
                cache: RefCell::new(StyleCache::new()),
                icons: RefCell::new(icons),
                selection,
            }),
        }
    }

    /// Factory drawing built-in glyphs in the configured icon theme.
    pub fn from_settings(settings: &StyleSettings) -> Self {
        Self::new(
            settings.clone(),
            Rc::new(BuiltinIcons::new(settings.icon_theme)),
        )
    }

    pub fn settings(&self) -> &StyleSettings {
        &self.inner.settings
    }

    pub fn selection(&self) -> &SelectionOverlayFactory {
        &self.inner.selection
    }

    pub fn same_factory(&self, other: &StyleFactory) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn icon_loader(&self) -> Rc<dyn IconLoader> {
        Rc::clone(&self.inner.icons.borrow())
    }

    /// Swaps the icon source. Every cached style is dropped since point
    /// styles hold icons from the previous source.
    pub fn set_icon_loader(&self, loader: Rc<dyn IconLoader>) {
        *self.inner.icons.borrow_mut() = loader;
        self.clear_cache();
    }

    pub fn clear_cache(&self) {
        debug!("Clearing style cache");
        self.inner.cache.borrow_mut().clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.borrow().stats()
    }

    /// Style for one appearance, built on the first request and cached after.
    pub fn get_for_properties(
        &self,
        properties: &StyleProperties,
        kind: GeometryKind,
        ratio: f64,
    ) -> Rc<Style> {
        let cached = self.inner.cache.borrow().get(kind, properties, ratio);
        if let Some(style) = cached {
            return style;
        }

        let style = Rc::new(self.build(properties, kind, ratio));
        self.inner
            .cache
            .borrow_mut()
            .put(kind, properties, ratio, Rc::clone(&style));
        style
    }

    /// Base style of the feature, followed by its selection overlay when
    /// selected and its highlight ring when highlighted. Empty without geometry.
    pub fn get_for_feature(&self, feature: &FeatureEntity, ratio: f64) -> StyleList {
        let Some(kind) = feature.geometry_kind() else {
            return StyleList::new();
        };

        let mut styles: StyleList =
            smallvec![self.get_for_properties(feature.style_properties(), kind, ratio)];
        if feature.is_selected() {
            styles.extend(self.inner.selection.for_kind(kind, ratio));
        }
        if feature.is_highlighted() {
            styles.extend(self.inner.selection.highlight_for_kind(kind, ratio));
        }
        styles
    }

    /// Cached styles at `ratio`, sorted for presentation.
    ///
    /// Order: geometry kind name, then point size (point kinds), icon, point
    /// colour, stroke colour and fill colour.
    pub fn get_available_styles(&self, ratio: f64) -> Vec<CachedStyle> {
        let mut styles: Vec<CachedStyle> = self
            .inner
            .cache
            .borrow()
            .get_all()
            .into_iter()
            .filter(|entry| entry.ratio == ratio)
            .cloned()
            .collect();
        styles.sort_by(compare_catalog_entries);
        styles
    }

    /// Kind-appropriate defaults from the configured settings.
    pub fn default_properties(&self, kind: GeometryKind) -> StyleProperties {
        default_style_properties(kind, &self.inner.settings)
    }

    fn build(&self, props: &StyleProperties, kind: GeometryKind, ratio: f64) -> Style {
        let mut style = Style::new();
        match kind {
            GeometryKind::Point | GeometryKind::MultiPoint => {
                style.image = Some(SymbolImage::Icon(self.icon(props, ratio)));
            }
            GeometryKind::LineString | GeometryKind::MultiLineString => {
                style.stroke = Some(self.stroke(props, ratio));
            }
            GeometryKind::Polygon
            | GeometryKind::MultiPolygon
            | GeometryKind::Circle
            | GeometryKind::GeometryCollection => {
                style.fill = Some(self.fill(props, ratio));
                style.stroke = Some(self.stroke(props, ratio));
            }
            GeometryKind::LinearRing => {
                error!(
                    "{}, building a fill and stroke style",
                    StyleError::UnsupportedGeometry {
                        kind: kind.to_string()
                    }
                );
                style.fill = Some(self.fill(props, ratio));
                style.stroke = Some(self.stroke(props, ratio));
            }
        }

        if let Some(value) = props.text_value() {
            style.text = Some(self.text(props, value, ratio));
        }
        style.z_index = props.z_index.map(f64::from);
        style
    }

    fn icon(&self, props: &StyleProperties, ratio: f64) -> IconImage {
        let s = &self.inner.settings;
        let size = props.point.size.unwrap_or(s.point_size) * ratio;
        let request = IconRequest {
            name: props
                .point
                .icon
                .clone()
                .unwrap_or_else(|| s.point_icon.clone()),
            size_px: size.round().max(1.0) as u32,
            tint: resolve_color(props.point.color.as_deref(), &s.point_color),
        };
        let icon = IconImage::new(request, self.icon_loader());
        icon.load();
        icon
    }

    fn stroke(&self, props: &StyleProperties, ratio: f64) -> StrokeStyle {
        let s = &self.inner.settings;
        StrokeStyle::solid(
            resolve_color(props.stroke.color.as_deref(), &s.stroke_color),
            (props.stroke.width.unwrap_or(s.stroke_width) * ratio) as f32,
        )
    }

    fn fill(&self, props: &StyleProperties, ratio: f64) -> FillStyle {
        let s = &self.inner.settings;
        let background = resolve_color(props.fill.color1.as_deref(), &s.fill_color1);
        let foreground = resolve_color(props.fill.color2.as_deref(), &s.fill_color2);
        let pattern = props.fill.pattern.unwrap_or_default();

        match pattern_tile(pattern, background, foreground, ratio) {
            Some(tile) => FillStyle::Pattern {
                pattern,
                background,
                foreground,
                tile: Rc::new(tile),
            },
            None => FillStyle::Solid(background),
        }
    }

    fn text(&self, props: &StyleProperties, value: &str, ratio: f64) -> TextStyle {
        let s = &self.inner.settings;
        let t = &props.text;
        TextStyle {
            value: value.to_string(),
            font: t.font.clone().unwrap_or_else(|| s.text_font.clone()),
            size: (t.size.unwrap_or(s.text_size) * ratio) as f32,
            color: resolve_color(t.color.as_deref(), &s.text_color),
            offset_x: (t.offset_x.unwrap_or(0.0) * ratio) as f32,
            offset_y: (t.offset_y.unwrap_or(0.0) * ratio) as f32,
            alignment: t.alignment.unwrap_or_default(),
        }
    }
}

/// Defaults written by `set_default_style`: point fields for point kinds,
/// stroke for line kinds, fill and stroke for everything else.
pub fn default_style_properties(kind: GeometryKind, settings: &StyleSettings) -> StyleProperties {
    let stroke = StrokeProperties {
        color: Some(settings.stroke_color.clone()),
        width: Some(settings.stroke_width),
    };

    match kind {
        GeometryKind::Point | GeometryKind::MultiPoint => StyleProperties {
            point: PointProperties {
                icon: Some(settings.point_icon.clone()),
                size: Some(settings.point_size),
                color: Some(settings.point_color.clone()),
            },
            ..Default::default()
        },
        GeometryKind::LineString | GeometryKind::MultiLineString | GeometryKind::LinearRing => {
            StyleProperties {
                stroke,
                ..Default::default()
            }
        }
        GeometryKind::Polygon
        | GeometryKind::MultiPolygon
        | GeometryKind::Circle
        | GeometryKind::GeometryCollection => StyleProperties {
            stroke,
            fill: FillProperties {
                color1: Some(settings.fill_color1.clone()),
                color2: Some(settings.fill_color2.clone()),
                pattern: Some(FillPattern::Flat),
            },
            ..Default::default()
        },
    }
}

fn compare_point_size(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        _ => a.is_some().cmp(&b.is_some()),
    }
}

fn compare_catalog_entries(a: &CachedStyle, b: &CachedStyle) -> Ordering {
    let (pa, pb) = (&a.properties, &b.properties);
    a.geometry
        .name()
        .cmp(b.geometry.name())
        .then_with(|| {
            if a.geometry.is_point() && b.geometry.is_point() {
                compare_point_size(pa.point.size, pb.point.size)
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| pa.point.icon.cmp(&pb.point.icon))
        .then_with(|| pa.point.color.cmp(&pb.point.color))
        .then_with(|| pa.stroke.color.cmp(&pb.stroke.color))
        .then_with(|| pa.fill.color1.cmp(&pb.fill.color1))
}
