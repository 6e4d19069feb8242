//! Editing session: the map layer, the layout legend, their shared style
//! factory and the undo/redo history.
//!
//! Every edit method applies its change, wraps the before/after state in a
//! task and registers it in one step, so UI code never touches the history
//! directly for the common operations.

use crate::feature::{DataProperties, FeatureEntity, StyleProperties};
use crate::history::{
    AddFeaturesTask, AddLegendItemTask, DataChange, GeometryChange, History, HistoryKey,
    RemoveFeaturesTask, RemoveLegendItemTask, StyleChange, Task, UpdateDataTask,
    UpdateGeometriesTask, UpdateStyleTask,
};
use crate::layer::VectorLayer;
use crate::legend::{Legend, LegendItem};
use crate::render::LegendRenderer;
use crate::style::{IconLoader, StyleFactory};
use cartokit_core::{shared, HistoryError, Shared};
use cartokit_settings::Config;
use std::collections::HashSet;
use std::rc::Rc;
use tracing::{debug, info};

/// Name of the layer holding the edited features.
pub const MAP_LAYER: &str = "map";

#[derive(Debug)]
pub struct EditorSession {
    styles: StyleFactory,
    history: History,
    layer: Shared<VectorLayer>,
    legend: Shared<Legend>,
    legend_renderer: LegendRenderer,
    is_modified: bool,
}

impl EditorSession {
    pub fn new(config: &Config) -> Self {
        Self::with_styles(config, StyleFactory::from_settings(&config.style))
    }

    /// Session whose point icons come from `loader`.
    pub fn with_icon_loader(config: &Config, loader: Rc<dyn IconLoader>) -> Self {
        Self::with_styles(config, StyleFactory::new(config.style.clone(), loader))
    }

    fn with_styles(config: &Config, styles: StyleFactory) -> Self {
        info!(
            "Editor session started (history depth {})",
            config.history.max_depth
        );
        Self {
            history: History::from_settings(&config.history),
            layer: shared(VectorLayer::with_styles(MAP_LAYER, styles.clone())),
            legend: shared(Legend::new()),
            legend_renderer: LegendRenderer::new(styles.clone(), config.legend.clone()),
            styles,
            is_modified: false,
        }
    }

    pub fn style_factory(&self) -> &StyleFactory {
        &self.styles
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn layer(&self) -> &Shared<VectorLayer> {
        &self.layer
    }

    pub fn legend(&self) -> &Shared<Legend> {
        &self.legend
    }

    pub fn legend_renderer(&self) -> &LegendRenderer {
        &self.legend_renderer
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    pub fn mark_saved(&mut self) {
        self.is_modified = false;
    }

    /// Registers an operation the caller has already applied.
    pub fn register(&mut self, key: impl Into<HistoryKey>, task: impl Task + 'static) {
        self.history.register(key, task);
        self.is_modified = true;
    }

    pub fn undo(&mut self, key: impl Into<HistoryKey>) -> bool {
        let changed = self.history.undo(key);
        self.is_modified |= changed;
        changed
    }

    pub fn redo(&mut self, key: impl Into<HistoryKey>) -> bool {
        let changed = self.history.redo(key);
        self.is_modified |= changed;
        changed
    }

    // ------------------------------------------------------------------
    // Map edits
    // ------------------------------------------------------------------

    /// Adds features to the map layer. Features created without any style
    /// get the defaults for their geometry kind.
    pub fn add_features(
        &mut self,
        features: Vec<FeatureEntity>,
    ) -> Result<Vec<Shared<FeatureEntity>>, HistoryError> {
        let handles: Vec<Shared<FeatureEntity>> = features
            .into_iter()
            .map(|mut feature| {
                feature.bind_styles(self.styles.clone());
                if feature.style_properties().is_empty() {
                    feature.set_default_style();
                }
                shared(feature)
            })
            .collect();
        let mut task = AddFeaturesTask::new(self.layer.clone(), handles.clone())?;
        task.apply();
        self.register(HistoryKey::Map, task);
        Ok(handles)
    }

    pub fn remove_features(&mut self, ids: &[&str]) -> Result<(), HistoryError> {
        let mut task = RemoveFeaturesTask::capture(&self.layer, ids)?;
        task.apply();
        self.register(HistoryKey::Map, task);
        Ok(())
    }

    /// Moves features by `(dx, dy)` as one undoable step.
    pub fn translate_features(&mut self, ids: &[&str], dx: f64, dy: f64) -> Result<(), HistoryError> {
        let targets = self.resolve(ids)?;
        let befores = targets
            .iter()
            .map(|feature| {
                let current = feature.borrow();
                current
                    .geometry()
                    .cloned()
                    .ok_or_else(|| HistoryError::MissingGeometry {
                        feature_id: current.id().to_string(),
                    })
            })
            .collect::<Result<Vec<_>, HistoryError>>()?;

        let mut changes = Vec::with_capacity(targets.len());
        for (feature, before) in targets.iter().zip(befores) {
            feature.borrow_mut().translate(dx, dy);
            changes.push(GeometryChange::capture(feature, before)?);
        }
        debug!("Translated {} feature(s) by ({}, {})", changes.len(), dx, dy);
        self.register(HistoryKey::Map, UpdateGeometriesTask::new(changes)?);
        Ok(())
    }

    pub fn translate_selected(&mut self, dx: f64, dy: f64) -> Result<(), HistoryError> {
        let ids = self.selected_ids();
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
        self.translate_features(&ids, dx, dy)
    }

    /// Merges `partial` into the style of every listed feature.
    pub fn update_style(&mut self, ids: &[&str], partial: &StyleProperties) -> Result<(), HistoryError> {
        let targets = self.resolve(ids)?;
        if let Some(bare) = targets.iter().find(|f| !f.borrow().has_geometry()) {
            return Err(HistoryError::MissingGeometry {
                feature_id: bare.borrow().id().to_string(),
            });
        }

        let mut changes = Vec::with_capacity(targets.len());
        for feature in &targets {
            let before = feature.borrow().style_properties().clone();
            feature.borrow_mut().set_style_properties(partial);
            changes.push(StyleChange::capture(feature, before)?);
        }
        self.register(HistoryKey::Map, UpdateStyleTask::new(changes)?);
        Ok(())
    }

    /// Replaces the visible attributes of one feature.
    pub fn overwrite_data(&mut self, id: &str, properties: DataProperties) -> Result<(), HistoryError> {
        let feature = self.resolve(&[id])?.remove(0);
        let before = feature.borrow().data_properties();
        if before == properties {
            return Err(HistoryError::EmptyOperation {
                operation: UpdateDataTask::DESCRIPTION.to_string(),
            });
        }
        feature.borrow_mut().overwrite_data_properties(properties);
        let change = DataChange::capture(&feature, before)?;
        self.register(HistoryKey::Map, UpdateDataTask::new(vec![change])?);
        Ok(())
    }

    fn resolve(&self, ids: &[&str]) -> Result<Vec<Shared<FeatureEntity>>, HistoryError> {
        if ids.is_empty() {
            return Err(HistoryError::EmptyOperation {
                operation: "Edit features".to_string(),
            });
        }
        let layer = self.layer.borrow();
        let mut seen = HashSet::with_capacity(ids.len());
        let mut targets = Vec::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(*id) {
                continue;
            }
            let feature = layer.feature(id).ok_or_else(|| HistoryError::UnknownFeature {
                feature_id: id.to_string(),
            })?;
            targets.push(feature);
        }
        Ok(targets)
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn select_only(&self, ids: &[&str]) {
        self.layer.borrow().select_only(ids);
    }

    pub fn clear_selection(&self) {
        self.layer.borrow().clear_selection();
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.layer
            .borrow()
            .selected_features()
            .iter()
            .map(|f| f.borrow().id().to_string())
            .collect()
    }

    // ------------------------------------------------------------------
    // Layout edits
    // ------------------------------------------------------------------

    /// Appends a legend entry and returns its id.
    pub fn add_legend_item(&mut self, item: LegendItem) -> String {
        let id = item.id.clone();
        let index = self.legend.borrow().len();
        let mut task = AddLegendItemTask::new(self.legend.clone(), index, item);
        task.apply();
        self.register(HistoryKey::Layout, task);
        id
    }

    pub fn remove_legend_item(&mut self, id: &str) -> Result<(), HistoryError> {
        let mut task = RemoveLegendItemTask::capture(&self.legend, id)?;
        task.apply();
        self.register(HistoryKey::Layout, task);
        Ok(())
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, GeometryKind};

    fn session_with(ids: &[&str]) -> EditorSession {
        let mut session = EditorSession::default();
        let features = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                FeatureEntity::new(Some(Geometry::point(i as f64, 0.0))).with_id(*id)
            })
            .collect();
        session.add_features(features).unwrap();
        session
    }

    #[test]
    fn test_added_features_get_default_style() {
        let session = session_with(&["a"]);
        let feature = session.layer().borrow().feature("a").unwrap();
        assert!(feature.borrow().style_properties().point.icon.is_some());
        assert_eq!(feature.borrow().rendered_styles().len(), 1);
        assert!(session.is_modified());
    }

    #[test]
    fn test_translate_is_one_step() {
        let mut session = session_with(&["a", "b"]);
        session.translate_features(&["a", "b"], 1.0, 2.0).unwrap();
        assert_eq!(session.history().undo_count(HistoryKey::Map), 2);

        session.undo(HistoryKey::Map);
        let layer = session.layer().borrow();
        let b = layer.feature("b").unwrap();
        assert_eq!(b.borrow().geometry(), Some(&Geometry::point(1.0, 0.0)));
    }

    #[test]
    fn test_translate_unknown_leaves_everything_untouched() {
        let mut session = session_with(&["a"]);
        let result = session.translate_features(&["a", "ghost"], 5.0, 5.0);
        assert!(matches!(result, Err(HistoryError::UnknownFeature { .. })));
        let a = session.layer().borrow().feature("a").unwrap();
        assert_eq!(a.borrow().geometry(), Some(&Geometry::point(0.0, 0.0)));
        assert_eq!(session.history().undo_count(HistoryKey::Map), 1);
    }

    #[test]
    fn test_update_style_round_trip() {
        let mut session = session_with(&["a"]);
        let partial = StyleProperties::default().with_stroke("#FF0000", 4.0);
        session.update_style(&["a"], &partial).unwrap();
        let a = session.layer().borrow().feature("a").unwrap();
        assert_eq!(a.borrow().style_properties().stroke.width, Some(4.0));

        session.undo(HistoryKey::Map);
        assert_eq!(a.borrow().style_properties().stroke.width, None);
        session.redo(HistoryKey::Map);
        assert_eq!(a.borrow().style_properties().stroke, partial.stroke);
    }

    #[test]
    fn test_repeated_ids_undo_to_original_style() {
        let mut session = session_with(&["a"]);
        let original = session
            .layer()
            .borrow()
            .feature("a")
            .unwrap()
            .borrow()
            .style_properties()
            .clone();

        let partial = StyleProperties::default().with_z_index(7);
        session.update_style(&["a", "a"], &partial).unwrap();
        session.translate_features(&["a", "a"], 1.0, 0.0).unwrap();

        let a = session.layer().borrow().feature("a").unwrap();
        assert_eq!(a.borrow().geometry(), Some(&Geometry::point(1.0, 0.0)));

        session.undo(HistoryKey::Map);
        session.undo(HistoryKey::Map);
        assert_eq!(a.borrow().style_properties(), &original);
        assert_eq!(a.borrow().geometry(), Some(&Geometry::point(0.0, 0.0)));
    }

    #[test]
    fn test_legend_edits_use_layout_history() {
        let mut session = EditorSession::default();
        let id = session.add_legend_item(LegendItem::with_symbol(
            "Wells",
            GeometryKind::Point,
            StyleProperties::default(),
        ));
        assert!(session.history().can_undo(HistoryKey::Layout));
        assert!(!session.history().can_undo(HistoryKey::Map));

        session.remove_legend_item(&id).unwrap();
        assert!(session.legend().borrow().is_empty());
        session.undo(HistoryKey::Layout);
        assert_eq!(session.legend().borrow().index_of(&id), Some(0));
    }

    #[test]
    fn test_overwrite_data_rejects_noop() {
        let mut session = session_with(&["a"]);
        let mut data = DataProperties::new();
        data.insert("name".to_string(), "well".into());
        session.overwrite_data("a", data.clone()).unwrap();
        assert!(session.overwrite_data("a", data).is_err());
    }
}
