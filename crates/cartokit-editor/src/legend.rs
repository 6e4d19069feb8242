//! Legend model: labelled symbols shown next to the map.

use crate::feature::StyleProperties;
use crate::geometry::GeometryKind;
use serde::{Deserialize, Serialize};

/// The symbol drawn for one legend entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendSymbol {
    pub geometry: GeometryKind,
    pub properties: StyleProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendItem {
    pub id: String,
    pub text: String,
    /// Text-only entries have no symbol.
    pub symbol: Option<LegendSymbol>,
}

impl LegendItem {
    pub fn new(text: impl Into<String>, symbol: Option<LegendSymbol>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            symbol,
        }
    }

    pub fn with_symbol(
        text: impl Into<String>,
        geometry: GeometryKind,
        properties: StyleProperties,
    ) -> Self {
        Self::new(
            text,
            Some(LegendSymbol {
                geometry,
                properties,
            }),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    items: Vec<LegendItem>,
}

impl Legend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LegendItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add_item(&mut self, item: LegendItem) {
        self.items.push(item);
    }

    /// Inserts at `index`, clamped to the end.
    pub fn insert_item(&mut self, index: usize, item: LegendItem) {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
    }

    /// Removes the item with `id`, returning its former index and value.
    pub fn remove_item(&mut self, id: &str) -> Option<(usize, LegendItem)> {
        let index = self.index_of(id)?;
        Some((index, self.items.remove(index)))
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn item(&self, id: &str) -> Option<&LegendItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Moves the item with `id` to `index`. Returns false for an unknown id.
    pub fn move_item(&mut self, id: &str, index: usize) -> bool {
        match self.remove_item(id) {
            Some((_, item)) => {
                self.insert_item(index, item);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
