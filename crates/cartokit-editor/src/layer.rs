//! Ordered collection of features drawn together.

use crate::feature::FeatureEntity;
use crate::geometry::Extent;
use crate::style::StyleFactory;
use cartokit_core::{shared, Shared};
use tracing::debug;

#[derive(Debug)]
pub struct VectorLayer {
    name: String,
    features: Vec<Shared<FeatureEntity>>,
    styles: Option<StyleFactory>,
}

impl VectorLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: Vec::new(),
            styles: None,
        }
    }

    /// Layer whose features are bound to `factory` as they are added.
    pub fn with_styles(name: impl Into<String>, factory: StyleFactory) -> Self {
        Self {
            styles: Some(factory),
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style_factory(&self) -> Option<&StyleFactory> {
        self.styles.as_ref()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[Shared<FeatureEntity>] {
        &self.features
    }

    /// Wraps and appends a feature, returning its shared handle.
    pub fn add_feature(&mut self, feature: FeatureEntity) -> Shared<FeatureEntity> {
        let handle = shared(feature);
        self.add(handle.clone());
        handle
    }

    pub fn add(&mut self, feature: Shared<FeatureEntity>) {
        let index = self.features.len();
        self.insert_at(index, feature);
    }

    /// Inserts at `index`, clamped to the end of the layer.
    pub fn insert_at(&mut self, index: usize, feature: Shared<FeatureEntity>) {
        if let Some(factory) = &self.styles {
            feature.borrow_mut().bind_styles(factory.clone());
        }
        let index = index.min(self.features.len());
        debug!(
            "Layer '{}': adding feature {} at {}",
            self.name,
            feature.borrow().id(),
            index
        );
        self.features.insert(index, feature);
    }

    /// Removes the feature with `id`, returning its former index and handle.
    pub fn remove(&mut self, id: &str) -> Option<(usize, Shared<FeatureEntity>)> {
        let index = self.index_of(id)?;
        debug!("Layer '{}': removing feature {}", self.name, id);
        Some((index, self.features.remove(index)))
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.features.iter().position(|f| f.borrow().id() == id)
    }

    pub fn feature(&self, id: &str) -> Option<Shared<FeatureEntity>> {
        self.features
            .iter()
            .find(|f| f.borrow().id() == id)
            .cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn ids(&self) -> Vec<String> {
        self.features
            .iter()
            .map(|f| f.borrow().id().to_string())
            .collect()
    }

    pub fn selected_features(&self) -> Vec<Shared<FeatureEntity>> {
        self.features
            .iter()
            .filter(|f| f.borrow().is_selected())
            .cloned()
            .collect()
    }

    pub fn select_only(&self, ids: &[&str]) {
        for feature in &self.features {
            let selected = ids.contains(&feature.borrow().id());
            feature.borrow_mut().set_selected(selected);
        }
    }

    pub fn clear_selection(&self) {
        for feature in &self.features {
            feature.borrow_mut().set_selected(false);
        }
    }

    /// Union of every feature extent.
    pub fn extent(&self) -> Option<Extent> {
        self.features
            .iter()
            .filter_map(|f| f.borrow().geometry().and_then(|g| g.extent()))
            .reduce(|a, b| a.union(&b))
    }

    pub fn clear(&mut self) {
        self.features.clear();
    }
}
