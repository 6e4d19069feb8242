use cartokit_core::{shared, Shared};
use cartokit_editor::feature::{DataProperties, FeatureEntity, StyleProperties};
use cartokit_editor::history::{
    AddFeaturesTask, BatchTask, DataChange, GeometryChange, History, HistoryKey, StyleChange,
    Task, UpdateDataTask, UpdateGeometriesTask, UpdateStyleTask,
};
use cartokit_editor::{Geometry, VectorLayer};
use proptest::prelude::*;

fn layer_with(count: usize) -> Shared<VectorLayer> {
    let layer = shared(VectorLayer::new("map"));
    for i in 0..count {
        let x = i as f64;
        layer.borrow_mut().add_feature(
            FeatureEntity::new(Some(Geometry::line(&[(x, 0.0), (x + 1.0, 1.0)])))
                .with_id(format!("f{}", i)),
        );
    }
    layer
}

type Snapshot = Vec<(Option<Geometry>, StyleProperties, DataProperties)>;

fn snapshot(layer: &Shared<VectorLayer>) -> Snapshot {
    layer
        .borrow()
        .features()
        .iter()
        .map(|f| {
            let f = f.borrow();
            (
                f.geometry().cloned(),
                f.style_properties().clone(),
                f.data_properties(),
            )
        })
        .collect()
}

#[test]
fn test_add_then_undo_scenario() {
    let layer = shared(VectorLayer::new("main"));
    let mut history = History::new();
    let geometry = Geometry::point(3.0, 4.0);
    let feature = shared(FeatureEntity::new(Some(geometry.clone())).with_id("a"));

    let mut task = AddFeaturesTask::new(layer.clone(), vec![feature]).unwrap();
    task.apply();
    history.register("map", task);
    assert!(layer.borrow().contains("a"));

    assert!(history.undo("map"));
    assert!(!layer.borrow().contains("a"));

    assert!(history.redo("map"));
    let restored = layer.borrow().feature("a").unwrap();
    assert_eq!(restored.borrow().geometry(), Some(&geometry));
}

#[test]
fn test_undo_in_one_context_leaves_the_other() {
    let layer = layer_with(1);
    let mut history = History::new();
    let feature = layer.borrow().feature("f0").unwrap();

    let before = feature.borrow().geometry().cloned().unwrap();
    feature.borrow_mut().translate(1.0, 1.0);
    let change = GeometryChange::capture(&feature, before).unwrap();
    history.register(HistoryKey::Map, UpdateGeometriesTask::new(vec![change]).unwrap());

    assert!(!history.undo(HistoryKey::Layout));
    assert_eq!(
        feature.borrow().geometry().cloned(),
        Some(Geometry::line(&[(1.0, 1.0), (2.0, 2.0)]))
    );
}

#[test]
fn test_batch_entry_undoes_as_one() {
    let layer = layer_with(1);
    let feature = layer.borrow().feature("f0").unwrap();
    let mut history = History::new();

    let geometry_before = feature.borrow().geometry().cloned().unwrap();
    let style_before = feature.borrow().style_properties().clone();
    feature.borrow_mut().translate(5.0, 0.0);
    feature
        .borrow_mut()
        .set_style_properties(&StyleProperties::default().with_stroke("#00FF00", 2.0));

    let batch = BatchTask::new(
        "Move and restyle",
        vec![
            Box::new(
                UpdateGeometriesTask::new(vec![
                    GeometryChange::capture(&feature, geometry_before.clone()).unwrap(),
                ])
                .unwrap(),
            ),
            Box::new(
                UpdateStyleTask::new(vec![StyleChange::capture(&feature, style_before).unwrap()])
                    .unwrap(),
            ),
        ],
    )
    .unwrap();
    history.register(HistoryKey::Map, batch);
    assert_eq!(history.undo_description(HistoryKey::Map), Some("Move and restyle"));

    history.undo(HistoryKey::Map);
    assert_eq!(feature.borrow().geometry(), Some(&geometry_before));
    assert!(feature.borrow().style_properties().is_empty());
}

#[test]
fn test_repeated_cycles_are_lossless() {
    let layer = layer_with(1);
    let feature = layer.borrow().feature("f0").unwrap();
    let mut history = History::new();

    let before = feature.borrow().geometry().cloned().unwrap();
    feature.borrow_mut().translate(0.1, 0.2);
    let after = feature.borrow().geometry().cloned().unwrap();
    history.register(
        HistoryKey::Map,
        UpdateGeometriesTask::new(vec![GeometryChange::capture(&feature, before.clone()).unwrap()])
            .unwrap(),
    );

    for _ in 0..50 {
        history.undo(HistoryKey::Map);
        // In-place edits of the live geometry must not leak into the records.
        feature.borrow_mut().translate(100.0, 100.0);
        history.redo(HistoryKey::Map);
        assert_eq!(feature.borrow().geometry(), Some(&after));
    }
    history.undo(HistoryKey::Map);
    assert_eq!(feature.borrow().geometry(), Some(&before));
}

#[derive(Debug, Clone)]
enum Edit {
    Move(usize, f64, f64),
    Stroke(usize, f64),
    Label(usize, u8),
}

fn any_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0usize..3, -5.0f64..5.0, -5.0f64..5.0).prop_map(|(i, dx, dy)| Edit::Move(i, dx, dy)),
        (0usize..3, 0.5f64..8.0).prop_map(|(i, w)| Edit::Stroke(i, w)),
        (0usize..3, any::<u8>()).prop_map(|(i, n)| Edit::Label(i, n)),
    ]
}

/// Applies `edit` and registers it. Returns false when the edit was a no-op.
fn perform(layer: &Shared<VectorLayer>, history: &mut History, edit: &Edit) -> bool {
    match *edit {
        Edit::Move(i, dx, dy) => {
            let feature = layer.borrow().features()[i].clone();
            let before = feature.borrow().geometry().cloned().unwrap();
            feature.borrow_mut().translate(dx, dy);
            let change = GeometryChange::capture(&feature, before).unwrap();
            history.register("map", UpdateGeometriesTask::new(vec![change]).unwrap());
        }
        Edit::Stroke(i, width) => {
            let feature = layer.borrow().features()[i].clone();
            let before = feature.borrow().style_properties().clone();
            feature
                .borrow_mut()
                .set_style_properties(&StyleProperties::default().with_stroke("#123456", width));
            let change = StyleChange::capture(&feature, before).unwrap();
            history.register("map", UpdateStyleTask::new(vec![change]).unwrap());
        }
        Edit::Label(i, n) => {
            let feature = layer.borrow().features()[i].clone();
            let before = feature.borrow().data_properties();
            let mut next = DataProperties::new();
            next.insert("label".to_string(), format!("#{}", n).into());
            feature.borrow_mut().overwrite_data_properties(next);
            match DataChange::capture(&feature, before) {
                Ok(change) => {
                    history.register("map", UpdateDataTask::new(vec![change]).unwrap());
                }
                Err(_) => return false,
            }
        }
    }
    true
}

proptest! {
    #[test]
    fn prop_undo_redo_round_trip(edits in prop::collection::vec(any_edit(), 1..24)) {
        let layer = layer_with(3);
        let mut history = History::new();
        let initial = snapshot(&layer);

        let mut registered = 0;
        for edit in &edits {
            if perform(&layer, &mut history, edit) {
                registered += 1;
            }
        }
        let applied = snapshot(&layer);
        prop_assert_eq!(history.undo_count("map"), registered);

        for _ in 0..registered {
            prop_assert!(history.undo("map"));
        }
        prop_assert!(!history.undo("map"));
        prop_assert_eq!(snapshot(&layer), initial);

        for _ in 0..registered {
            prop_assert!(history.redo("map"));
        }
        prop_assert!(!history.redo("map"));
        prop_assert_eq!(snapshot(&layer), applied);
    }

    #[test]
    fn prop_new_edit_prunes_redo(
        (count, undone) in (1usize..12).prop_flat_map(|n| (Just(n), 1..=n)),
    ) {
        let layer = layer_with(3);
        let mut history = History::new();
        for i in 0..count {
            perform(&layer, &mut history, &Edit::Move(i % 3, 1.0, 0.0));
        }
        for _ in 0..undone {
            history.undo("map");
        }
        prop_assert_eq!(history.redo_count("map"), undone);

        perform(&layer, &mut history, &Edit::Move(0, 0.0, 1.0));
        prop_assert!(!history.can_redo("map"));
        prop_assert!(!history.redo("map"));
        prop_assert_eq!(history.undo_count("map"), count - undone + 1);
    }
}
