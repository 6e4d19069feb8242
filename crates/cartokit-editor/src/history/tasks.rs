//! Concrete reversible operations over features, layers and legends.
//!
//! Geometry snapshots are plain values. Each apply or undo hands the feature
//! a fresh clone, so later in-place edits of the live geometry can never reach
//! a stored snapshot.

use super::task::Task;
use crate::feature::{DataProperties, FeatureEntity, StyleProperties};
use crate::geometry::Geometry;
use crate::layer::VectorLayer;
use crate::legend::{Legend, LegendItem};
use cartokit_core::{HistoryError, Shared};

fn empty(operation: &str) -> HistoryError {
    HistoryError::EmptyOperation {
        operation: operation.to_string(),
    }
}

fn missing_geometry(feature: &FeatureEntity) -> HistoryError {
    HistoryError::MissingGeometry {
        feature_id: feature.id().to_string(),
    }
}

// =============================================================================
// GEOMETRY
// =============================================================================

pub struct GeometryChange {
    feature: Shared<FeatureEntity>,
    before: Geometry,
    after: Geometry,
}

impl GeometryChange {
    pub fn new(feature: Shared<FeatureEntity>, before: Geometry, after: Geometry) -> Self {
        Self {
            feature,
            before,
            after,
        }
    }

    /// Records the feature's current geometry as the after-state.
    pub fn capture(feature: &Shared<FeatureEntity>, before: Geometry) -> Result<Self, HistoryError> {
        let after = {
            let current = feature.borrow();
            current
                .geometry()
                .cloned()
                .ok_or_else(|| missing_geometry(&current))?
        };
        Ok(Self::new(feature.clone(), before, after))
    }

    pub fn before(&self) -> &Geometry {
        &self.before
    }

    pub fn after(&self) -> &Geometry {
        &self.after
    }
}

pub struct UpdateGeometriesTask {
    changes: Vec<GeometryChange>,
}

impl UpdateGeometriesTask {
    pub const DESCRIPTION: &'static str = "Update geometries";

    pub fn new(changes: Vec<GeometryChange>) -> Result<Self, HistoryError> {
        if changes.is_empty() {
            return Err(empty(Self::DESCRIPTION));
        }
        Ok(Self { changes })
    }
}

impl Task for UpdateGeometriesTask {
    fn apply(&mut self) {
        for change in &self.changes {
            change
                .feature
                .borrow_mut()
                .set_geometry(change.after.clone());
        }
    }

    fn undo(&mut self) {
        // Reverse order, so repeated changes to one feature unwind fully.
        for change in self.changes.iter().rev() {
            change
                .feature
                .borrow_mut()
                .set_geometry(change.before.clone());
        }
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }
}

// =============================================================================
// STYLE
// =============================================================================

pub struct StyleChange {
    feature: Shared<FeatureEntity>,
    before: StyleProperties,
    after: StyleProperties,
}

impl StyleChange {
    pub fn new(feature: Shared<FeatureEntity>, before: StyleProperties, after: StyleProperties) -> Self {
        Self {
            feature,
            before,
            after,
        }
    }

    /// Records the feature's current style as the after-state. Features
    /// without geometry cannot be restyled and are rejected.
    pub fn capture(
        feature: &Shared<FeatureEntity>,
        before: StyleProperties,
    ) -> Result<Self, HistoryError> {
        let after = {
            let current = feature.borrow();
            if !current.has_geometry() {
                return Err(missing_geometry(&current));
            }
            current.style_properties().clone()
        };
        Ok(Self::new(feature.clone(), before, after))
    }
}

pub struct UpdateStyleTask {
    changes: Vec<StyleChange>,
}

impl UpdateStyleTask {
    pub const DESCRIPTION: &'static str = "Update style";

    pub fn new(changes: Vec<StyleChange>) -> Result<Self, HistoryError> {
        if changes.is_empty() {
            return Err(empty(Self::DESCRIPTION));
        }
        Ok(Self { changes })
    }
}

impl Task for UpdateStyleTask {
    fn apply(&mut self) {
        for change in &self.changes {
            change
                .feature
                .borrow_mut()
                .replace_style_properties(change.after.clone());
        }
    }

    fn undo(&mut self) {
        // Reverse order, so repeated changes to one feature unwind fully.
        for change in self.changes.iter().rev() {
            change
                .feature
                .borrow_mut()
                .replace_style_properties(change.before.clone());
        }
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }
}

// =============================================================================
// DATA
// =============================================================================

pub struct DataChange {
    feature: Shared<FeatureEntity>,
    before: DataProperties,
    after: DataProperties,
}

impl DataChange {
    pub fn new(feature: Shared<FeatureEntity>, before: DataProperties, after: DataProperties) -> Self {
        Self {
            feature,
            before,
            after,
        }
    }

    /// Records the feature's visible attributes as the after-state.
    pub fn capture(feature: &Shared<FeatureEntity>, before: DataProperties) -> Result<Self, HistoryError> {
        let after = feature.borrow().data_properties();
        if after == before {
            return Err(empty(UpdateDataTask::DESCRIPTION));
        }
        Ok(Self::new(feature.clone(), before, after))
    }
}

pub struct UpdateDataTask {
    changes: Vec<DataChange>,
}

impl UpdateDataTask {
    pub const DESCRIPTION: &'static str = "Update data";

    pub fn new(changes: Vec<DataChange>) -> Result<Self, HistoryError> {
        if changes.is_empty() {
            return Err(empty(Self::DESCRIPTION));
        }
        Ok(Self { changes })
    }
}

impl Task for UpdateDataTask {
    fn apply(&mut self) {
        for change in &self.changes {
            change
                .feature
                .borrow_mut()
                .overwrite_data_properties(change.after.clone());
        }
    }

    fn undo(&mut self) {
        // Reverse order, so repeated changes to one feature unwind fully.
        for change in self.changes.iter().rev() {
            change
                .feature
                .borrow_mut()
                .overwrite_data_properties(change.before.clone());
        }
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }
}

// =============================================================================
// LAYER MEMBERSHIP
// =============================================================================

pub struct AddFeaturesTask {
    layer: Shared<VectorLayer>,
    features: Vec<Shared<FeatureEntity>>,
}

impl AddFeaturesTask {
    pub const DESCRIPTION: &'static str = "Add features";

    pub fn new(
        layer: Shared<VectorLayer>,
        features: Vec<Shared<FeatureEntity>>,
    ) -> Result<Self, HistoryError> {
        if features.is_empty() {
            return Err(empty(Self::DESCRIPTION));
        }
        Ok(Self { layer, features })
    }
}

impl Task for AddFeaturesTask {
    fn apply(&mut self) {
        let mut layer = self.layer.borrow_mut();
        for feature in &self.features {
            layer.add(feature.clone());
        }
    }

    fn undo(&mut self) {
        let mut layer = self.layer.borrow_mut();
        for feature in &self.features {
            layer.remove(feature.borrow().id());
        }
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }
}

pub struct RemoveFeaturesTask {
    layer: Shared<VectorLayer>,
    /// Former positions, ascending.
    removed: Vec<(usize, Shared<FeatureEntity>)>,
}

impl RemoveFeaturesTask {
    pub const DESCRIPTION: &'static str = "Remove features";

    /// Records where each feature sits before removal.
    pub fn capture(layer: &Shared<VectorLayer>, ids: &[&str]) -> Result<Self, HistoryError> {
        if ids.is_empty() {
            return Err(empty(Self::DESCRIPTION));
        }
        let current = layer.borrow();
        let mut removed = Vec::with_capacity(ids.len());
        for id in ids {
            let index = current
                .index_of(id)
                .ok_or_else(|| HistoryError::UnknownFeature {
                    feature_id: id.to_string(),
                })?;
            removed.push((index, current.features()[index].clone()));
        }
        drop(current);
        removed.sort_by_key(|(index, _)| *index);
        removed.dedup_by_key(|(index, _)| *index);
        Ok(Self {
            layer: layer.clone(),
            removed,
        })
    }
}

impl Task for RemoveFeaturesTask {
    fn apply(&mut self) {
        let mut layer = self.layer.borrow_mut();
        for (_, feature) in &self.removed {
            layer.remove(feature.borrow().id());
        }
    }

    fn undo(&mut self) {
        let mut layer = self.layer.borrow_mut();
        for (index, feature) in &self.removed {
            layer.insert_at(*index, feature.clone());
        }
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }
}

// =============================================================================
// LEGEND
// =============================================================================

pub struct AddLegendItemTask {
    legend: Shared<Legend>,
    index: usize,
    item: LegendItem,
}

impl AddLegendItemTask {
    pub const DESCRIPTION: &'static str = "Add legend item";

    pub fn new(legend: Shared<Legend>, index: usize, item: LegendItem) -> Self {
        Self {
            legend,
            index,
            item,
        }
    }
}

impl Task for AddLegendItemTask {
    fn apply(&mut self) {
        self.legend
            .borrow_mut()
            .insert_item(self.index, self.item.clone());
    }

    fn undo(&mut self) {
        self.legend.borrow_mut().remove_item(&self.item.id);
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }
}

pub struct RemoveLegendItemTask {
    legend: Shared<Legend>,
    index: usize,
    item: LegendItem,
}

impl RemoveLegendItemTask {
    pub const DESCRIPTION: &'static str = "Remove legend item";

    pub fn capture(legend: &Shared<Legend>, id: &str) -> Result<Self, HistoryError> {
        let (index, item) = {
            let current = legend.borrow();
            let index = current
                .index_of(id)
                .ok_or_else(|| HistoryError::UnknownLegendItem {
                    item_id: id.to_string(),
                })?;
            (index, current.items()[index].clone())
        };
        Ok(Self {
            legend: legend.clone(),
            index,
            item,
        })
    }
}

impl Task for RemoveLegendItemTask {
    fn apply(&mut self) {
        self.legend.borrow_mut().remove_item(&self.item.id);
    }

    fn undo(&mut self) {
        self.legend
            .borrow_mut()
            .insert_item(self.index, self.item.clone());
    }

    fn description(&self) -> &str {
        Self::DESCRIPTION
    }
}
