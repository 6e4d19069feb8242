use cartokit_editor::feature::{FeatureEntity, StyleProperties};
use cartokit_editor::{EditorSession, Geometry, GeometryKind, HistoryKey, LegendItem};
use cartokit_settings::Config;

fn polygon(offset: f64) -> Geometry {
    Geometry::polygon(&[
        (offset, 0.0),
        (offset + 2.0, 0.0),
        (offset + 2.0, 2.0),
        (offset, 2.0),
    ])
}

#[test]
fn test_session_edit_cycle() {
    let mut session = EditorSession::default();
    session
        .add_features(vec![
            FeatureEntity::new(Some(polygon(0.0))).with_id("a"),
            FeatureEntity::new(Some(polygon(5.0))).with_id("b"),
        ])
        .unwrap();

    session.select_only(&["b"]);
    session.translate_selected(0.0, 3.0).unwrap();
    session
        .update_style(&["a", "b"], &StyleProperties::default().with_z_index(5))
        .unwrap();
    session.remove_features(&["a"]).unwrap();
    assert_eq!(session.layer().borrow().ids(), vec!["b"]);
    assert_eq!(session.history().undo_count(HistoryKey::Map), 4);

    while session.undo(HistoryKey::Map) {}
    assert!(session.layer().borrow().is_empty());

    while session.redo(HistoryKey::Map) {}
    let layer = session.layer().borrow();
    assert_eq!(layer.ids(), vec!["b"]);
    let b = layer.feature("b").unwrap();
    assert_eq!(b.borrow().geometry(), Some(&polygon(5.0).translated(0.0, 3.0)));
    assert_eq!(b.borrow().style_properties().z_index, Some(5));
}

#[test]
fn test_removed_feature_returns_to_its_slot() {
    let mut session = EditorSession::default();
    session
        .add_features(
            ["a", "b", "c"]
                .iter()
                .map(|id| FeatureEntity::new(Some(Geometry::point(0.0, 0.0))).with_id(*id))
                .collect(),
        )
        .unwrap();
    session.remove_features(&["b"]).unwrap();
    session.undo(HistoryKey::Map);
    assert_eq!(session.layer().borrow().ids(), vec!["a", "b", "c"]);
}

#[test]
fn test_layout_and_map_histories_are_separate() {
    let mut session = EditorSession::new(&Config::default());
    session
        .add_features(vec![FeatureEntity::new(Some(polygon(0.0)))])
        .unwrap();
    session.add_legend_item(LegendItem::with_symbol(
        "Parcels",
        GeometryKind::Polygon,
        StyleProperties::default(),
    ));

    assert!(session.undo(HistoryKey::Layout));
    assert!(session.legend().borrow().is_empty());
    assert_eq!(session.layer().borrow().len(), 1);
    assert!(!session.undo(HistoryKey::Layout));
}

#[test]
fn test_history_depth_comes_from_config() {
    let mut config = Config::default();
    config.history.max_depth = 2;
    let mut session = EditorSession::new(&config);
    for i in 0..4 {
        session
            .add_features(vec![FeatureEntity::new(Some(Geometry::point(i as f64, 0.0)))])
            .unwrap();
    }
    assert_eq!(session.history().undo_count(HistoryKey::Map), 2);
    while session.undo(HistoryKey::Map) {}
    assert_eq!(session.layer().borrow().len(), 2);
}

#[test]
fn test_failed_edit_is_not_registered() {
    let mut session = EditorSession::default();
    session
        .add_features(vec![FeatureEntity::new(None).with_id("bare")])
        .unwrap();
    assert!(session.translate_features(&["bare"], 1.0, 1.0).is_err());
    assert!(session
        .update_style(&["bare"], &StyleProperties::default().with_z_index(1))
        .is_err());
    assert!(session.remove_features(&[]).is_err());
    assert_eq!(session.history().undo_count(HistoryKey::Map), 1);
}
