use cartokit_editor::feature::{DataProperties, FeatureEntity, FillPattern, StyleProperties};
use cartokit_editor::style::StyleFactory;
use cartokit_editor::{Geometry, GeometryKind};
use std::time::Duration;

fn line() -> Geometry {
    Geometry::line(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)])
}

#[test]
fn test_clone_isolation() {
    let mut source = FeatureEntity::new(Some(line())).with_id("a");
    let mut copy = source.clone();
    assert_eq!(copy.id(), "a");

    copy.translate(10.0, 0.0);
    assert_eq!(source.geometry(), Some(&line()));

    source.translate(0.0, -5.0);
    assert_eq!(copy.geometry(), Some(&line().translated(10.0, 0.0)));
}

#[test]
fn test_duplicate_gets_new_identity() {
    let mut source = FeatureEntity::new(Some(line()));
    source.set_selected(true);
    let copy = source.duplicate();
    assert_ne!(copy.id(), source.id());
    assert!(!copy.is_selected());
    assert_eq!(copy.geometry(), source.geometry());
}

#[test]
fn test_partial_style_never_clears() {
    let mut feature = FeatureEntity::new(Some(line()));
    feature.set_style_properties(&StyleProperties::default().with_stroke("#FF0000", 3.0));
    feature.set_style_properties(&StyleProperties::default().with_z_index(2));

    let props = feature.style_properties();
    assert_eq!(props.stroke.color.as_deref(), Some("#FF0000"));
    assert_eq!(props.stroke.width, Some(3.0));
    assert_eq!(props.z_index, Some(2));
}

#[test]
fn test_default_style_by_kind() {
    let mut area = FeatureEntity::new(Some(Geometry::polygon(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)])));
    area.set_default_style();
    let props = area.style_properties();
    assert!(props.stroke.color.is_some());
    assert_eq!(props.fill.pattern, Some(FillPattern::Flat));
    assert!(props.point.icon.is_none());

    let mut road = FeatureEntity::new(Some(line()));
    road.set_default_style();
    assert!(road.style_properties().fill.color1.is_none());
    assert!(road.style_properties().stroke.width.is_some());

    let mut well = FeatureEntity::new(Some(Geometry::point(0.0, 0.0)));
    well.set_default_style();
    assert!(well.style_properties().point.icon.is_some());
    assert!(well.style_properties().stroke.color.is_none());
}

#[test]
fn test_default_style_without_geometry_is_noop() {
    let mut feature = FeatureEntity::new(None);
    feature.set_default_style().set_selected(true);
    assert!(feature.style_properties().is_empty());
    assert!(feature.is_selected());
}

#[test]
fn test_overwrite_drops_stale_keys_and_keeps_reserved() {
    let mut feature = FeatureEntity::new(None);
    feature.set_property("name", "Old well");
    feature.set_property("depth", 12);
    feature.set_property("carto:source", "import");

    let mut next = DataProperties::new();
    next.insert("name".to_string(), "New well".into());
    feature.overwrite_data_properties(next.clone());

    assert_eq!(feature.data_properties(), next);
    assert!(feature.property("depth").is_none());
    assert!(feature.property("carto:source").is_some());
}

#[test]
fn test_bound_entity_tracks_flags() {
    let factory = StyleFactory::default();
    let mut feature = FeatureEntity::new(Some(line()));
    feature.bind_styles(factory.clone());
    assert_eq!(feature.rendered_styles().len(), 1);

    feature.set_selected(true);
    assert_eq!(feature.rendered_styles().len(), 2);
    feature.set_highlighted(true, None);
    assert_eq!(feature.rendered_styles().len(), 3);
    feature.set_selected(false);
    feature.set_highlighted(false, None);
    assert_eq!(feature.rendered_styles().len(), 1);

    // Flags never reach the cache: one base appearance, one entry.
    assert_eq!(factory.cache_stats().entries, 1);
}

#[test]
fn test_highlight_timeout_lapses() {
    let mut feature = FeatureEntity::new(Some(Geometry::point(0.0, 0.0)));
    feature.set_highlighted(true, Some(Duration::ZERO));
    assert!(!feature.is_highlighted());
    assert!(feature.clear_expired_highlight());
    assert!(!feature.clear_expired_highlight());

    feature.set_highlighted(true, Some(Duration::from_secs(3600)));
    assert!(feature.is_highlighted());
    assert!(!feature.clear_expired_highlight());
}

#[test]
fn test_geometry_kind_follows_geometry() {
    let mut feature = FeatureEntity::new(None);
    assert_eq!(feature.geometry_kind(), None);
    feature.set_geometry(Geometry::point(1.0, 1.0));
    assert_eq!(feature.geometry_kind(), Some(GeometryKind::Point));
    assert_eq!(feature.clear_geometry(), Some(Geometry::point(1.0, 1.0)));
    assert!(!feature.has_geometry());
}
