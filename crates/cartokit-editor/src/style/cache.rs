//! Value-keyed memo of built styles.

use super::types::Style;
use crate::feature::StyleProperties;
use crate::geometry::GeometryKind;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{trace, warn};

/// One cached style and the key components it was built from.
#[derive(Debug, Clone)]
pub struct CachedStyle {
    pub id: String,
    pub geometry: GeometryKind,
    pub properties: StyleProperties,
    pub ratio: f64,
    pub style: Rc<Style>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Cache of ready-to-draw styles keyed by geometry kind, style properties and
/// render ratio.
///
/// Keys are derived from the property values, so two equal records built
/// independently hit the same entry. The cache is unbounded; call
/// [`clear`](StyleCache::clear) when a style-affecting setting changes.
#[derive(Debug, Default)]
pub struct StyleCache {
    entries: HashMap<String, CachedStyle>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

/// Structural key of one cache entry.
///
/// JSON writes NaN and infinities as `null`, so records holding them are keyed
/// by their debug form instead, which keeps those values distinct.
pub fn cache_key(geometry: GeometryKind, properties: &StyleProperties, ratio: f64) -> String {
    let props = if has_non_finite(properties) {
        format!("debug:{:?}", properties)
    } else {
        serde_json::to_string(properties).unwrap_or_else(|err| {
            warn!("Style properties not serializable ({}), keying by debug form", err);
            format!("debug:{:?}", properties)
        })
    };
    format!("{}-{}-{}", geometry.name(), props, ratio)
}

fn has_non_finite(properties: &StyleProperties) -> bool {
    [
        properties.stroke.width,
        properties.point.size,
        properties.text.size,
        properties.text.offset_x,
        properties.text.offset_y,
    ]
    .into_iter()
    .flatten()
    .any(|value| !value.is_finite())
}

impl StyleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `style`. A later put with an equal key replaces the entry.
    pub fn put(
        &mut self,
        geometry: GeometryKind,
        properties: &StyleProperties,
        ratio: f64,
        style: Rc<Style>,
    ) {
        let key = cache_key(geometry, properties, ratio);
        trace!("Caching style {}", key);
        self.entries.insert(
            key,
            CachedStyle {
                id: uuid::Uuid::new_v4().to_string(),
                geometry,
                properties: properties.clone(),
                ratio,
                style,
            },
        );
    }

    pub fn get(
        &self,
        geometry: GeometryKind,
        properties: &StyleProperties,
        ratio: f64,
    ) -> Option<Rc<Style>> {
        let found = self
            .entries
            .get(&cache_key(geometry, properties, ratio))
            .map(|entry| Rc::clone(&entry.style));
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.set(counter.get() + 1);
        found
    }

    pub fn contains(&self, geometry: GeometryKind, properties: &StyleProperties, ratio: f64) -> bool {
        self.entries
            .contains_key(&cache_key(geometry, properties, ratio))
    }

    /// Every entry, in no particular order.
    pub fn get_all(&self) -> Vec<&CachedStyle> {
        self.entries.values().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry. Hit/miss counters are kept.
    pub fn clear(&mut self) {
        trace!("Clearing {} cached style(s)", self.entries.len());
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
            entries: self.entries.len(),
        }
    }

    pub fn reset_stats(&self) {
        self.hits.set(0);
        self.misses.set(0);
    }
}
