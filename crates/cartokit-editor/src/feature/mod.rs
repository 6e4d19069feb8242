//! Feature entities: one geometry plus its style and attribute data.

pub mod properties;

pub use properties::{
    is_reserved_key, DataProperties, FillPattern, FillProperties, PointProperties,
    PropertyValue, StrokeProperties, StyleProperties, TextAlignment, TextProperties,
    RESERVED_PREFIX,
};

use crate::geometry::{Geometry, GeometryKind};
use crate::style::{default_style_properties, StyleFactory, StyleList};
use cartokit_settings::StyleSettings;
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Highlight {
    Indefinite,
    Until(Instant),
}

/// A drawable shape with its styling and attribute data.
///
/// The entity owns its geometry outright. Cloning deep-copies it and keeps
/// the id, so a clone can stand in for the original in undo records; callers
/// duplicating a feature should use [`duplicate`](Self::duplicate) instead.
///
/// When bound to a [`StyleFactory`] the entity keeps its rendered style list
/// in step with every style, geometry, selection or highlight change.
#[derive(Debug, Clone)]
pub struct FeatureEntity {
    id: String,
    geometry: Option<Geometry>,
    style: StyleProperties,
    data: DataProperties,
    selected: bool,
    highlight: Option<Highlight>,
    styles: Option<StyleFactory>,
    rendered: StyleList,
}

impl FeatureEntity {
    pub fn new(geometry: Option<Geometry>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            geometry,
            style: StyleProperties::default(),
            data: DataProperties::new(),
            selected: false,
            highlight: None,
            styles: None,
            rendered: StyleList::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_style(mut self, partial: &StyleProperties) -> Self {
        self.set_style_properties(partial);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Copy with a fresh id, not selected and not highlighted.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = uuid::Uuid::new_v4().to_string();
        copy.selected = false;
        copy.highlight = None;
        copy.restyle();
        copy
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn geometry_kind(&self) -> Option<GeometryKind> {
        self.geometry.as_ref().map(Geometry::kind)
    }

    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }

    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = Some(geometry);
        self.restyle();
    }

    pub fn clear_geometry(&mut self) -> Option<Geometry> {
        let previous = self.geometry.take();
        self.restyle();
        previous
    }

    /// Moves the geometry; no-op without one.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        if let Some(geometry) = self.geometry.as_mut() {
            geometry.translate(dx, dy);
            self.restyle();
        }
    }

    // ------------------------------------------------------------------
    // Style
    // ------------------------------------------------------------------

    pub fn style_properties(&self) -> &StyleProperties {
        &self.style
    }

    /// Overwrites the fields present in `partial`, keeping the others.
    pub fn set_style_properties(&mut self, partial: &StyleProperties) {
        self.style.merge(partial);
        self.restyle();
    }

    /// Replaces the whole record, clearing fields absent from `properties`.
    pub fn replace_style_properties(&mut self, properties: StyleProperties) {
        self.style = properties;
        self.restyle();
    }

    /// Writes kind-appropriate defaults from the bound factory's settings.
    /// No-op without geometry.
    pub fn set_default_style(&mut self) -> &mut Self {
        let Some(kind) = self.geometry_kind() else {
            trace!("Feature {} has no geometry, default style skipped", self.id);
            return self;
        };
        let defaults = match &self.styles {
            Some(factory) => factory.default_properties(kind),
            None => default_style_properties(kind, &StyleSettings::default()),
        };
        self.set_style_properties(&defaults);
        self
    }

    // ------------------------------------------------------------------
    // Data
    // ------------------------------------------------------------------

    /// User-visible attributes; reserved keys are left out.
    pub fn data_properties(&self) -> DataProperties {
        self.data
            .iter()
            .filter(|(key, _)| !is_reserved_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Every stored attribute, reserved keys included.
    pub fn all_properties(&self) -> &DataProperties {
        &self.data
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.data.get(key)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn unset_property(&mut self, key: &str) -> Option<PropertyValue> {
        self.data.remove(key)
    }

    /// Adds or updates every entry of `properties`; other keys are kept.
    pub fn set_properties(&mut self, properties: DataProperties) {
        self.data.extend(properties);
    }

    /// Makes the visible attributes equal to `properties`.
    ///
    /// Visible keys missing from `properties` are removed. Reserved keys stay.
    pub fn overwrite_data_properties(&mut self, properties: DataProperties) {
        let stale: Vec<String> = self
            .data
            .keys()
            .filter(|key| !is_reserved_key(key) && !properties.contains_key(*key))
            .cloned()
            .collect();
        for key in stale {
            self.data.remove(&key);
        }
        self.set_properties(properties);
    }

    // ------------------------------------------------------------------
    // Selection and highlight
    // ------------------------------------------------------------------

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        if self.selected != selected {
            self.selected = selected;
            self.restyle();
        }
    }

    pub fn is_highlighted(&self) -> bool {
        match self.highlight {
            None => false,
            Some(Highlight::Indefinite) => true,
            Some(Highlight::Until(deadline)) => Instant::now() < deadline,
        }
    }

    /// Turns the highlight on, optionally for `timeout` only, or off.
    pub fn set_highlighted(&mut self, highlighted: bool, timeout: Option<Duration>) {
        self.highlight = match (highlighted, timeout) {
            (false, _) => None,
            (true, None) => Some(Highlight::Indefinite),
            (true, Some(timeout)) => Some(Highlight::Until(Instant::now() + timeout)),
        };
        self.restyle();
    }

    /// Highlights for the configured highlight duration.
    pub fn highlight_briefly(&mut self) {
        let millis = match &self.styles {
            Some(factory) => factory.settings().highlight_timeout_ms,
            None => StyleSettings::default().highlight_timeout_ms,
        };
        self.set_highlighted(true, Some(Duration::from_millis(millis)));
    }

    /// Drops a lapsed timed highlight. Returns true when one was dropped.
    pub fn clear_expired_highlight(&mut self) -> bool {
        if matches!(self.highlight, Some(Highlight::Until(_))) && !self.is_highlighted() {
            self.highlight = None;
            self.restyle();
            return true;
        }
        false
    }

    // ------------------------------------------------------------------
    // Rendered styles
    // ------------------------------------------------------------------

    /// Binds the entity to `factory` and resolves its styles.
    pub fn bind_styles(&mut self, factory: StyleFactory) {
        self.styles = Some(factory);
        self.restyle();
    }

    pub fn unbind_styles(&mut self) {
        self.styles = None;
        self.rendered.clear();
    }

    pub fn style_factory(&self) -> Option<&StyleFactory> {
        self.styles.as_ref()
    }

    /// Styles resolved at ratio 1 after the latest change. Empty when unbound
    /// or without geometry.
    pub fn rendered_styles(&self) -> &StyleList {
        &self.rendered
    }

    fn restyle(&mut self) {
        let rendered = match &self.styles {
            Some(factory) => factory.get_for_feature(self, 1.0),
            None => StyleList::new(),
        };
        self.rendered = rendered;
    }
}
