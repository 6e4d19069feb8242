use cartokit_editor::feature::{FeatureEntity, FillPattern, StyleProperties};
use cartokit_editor::style::{FillStyle, StyleFactory, SymbolImage, OVERLAY_Z_INDEX};
use cartokit_editor::{Geometry, GeometryKind};
use std::rc::Rc;

fn square() -> Geometry {
    Geometry::polygon(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)])
}

#[test]
fn test_selection_is_orthogonal_to_cache() {
    let factory = StyleFactory::default();
    let mut feature = FeatureEntity::new(Some(square()));

    let plain = factory.get_for_feature(&feature, 1.0);
    let after_first = factory.cache_stats();
    assert_eq!((after_first.hits, after_first.misses), (0, 1));

    feature.set_selected(true);
    let selected = factory.get_for_feature(&feature, 1.0);
    let after_second = factory.cache_stats();
    assert_eq!((after_second.hits, after_second.misses), (1, 1));
    assert_eq!(after_second.entries, 1);

    assert_eq!(plain.len(), 1);
    assert!(selected.len() > plain.len());
    assert!(Rc::ptr_eq(&plain[0], &selected[0]));
    assert!(selected[1..].iter().all(|s| s.z() == OVERLAY_Z_INDEX));
}

#[test]
fn test_highlight_adds_a_separate_ring() {
    let factory = StyleFactory::default();
    let mut feature = FeatureEntity::new(Some(Geometry::point(0.0, 0.0)));
    feature.set_highlighted(true, None);
    let styles = factory.get_for_feature(&feature, 1.0);
    assert_eq!(styles.len(), 2);

    feature.set_selected(true);
    assert_eq!(factory.get_for_feature(&feature, 1.0).len(), 3);
}

#[test]
fn test_geometry_less_feature_has_no_styles() {
    let factory = StyleFactory::default();
    assert!(factory.get_for_feature(&FeatureEntity::new(None), 1.0).is_empty());
    assert_eq!(factory.cache_stats().misses, 0);
}

#[test]
fn test_branches_by_kind() {
    let factory = StyleFactory::default();
    let props = StyleProperties::default()
        .with_stroke("#112233", 2.0)
        .with_fill("#FFFFFF", "#000000", FillPattern::Dots)
        .with_text("Label");

    let point = factory.get_for_properties(&props, GeometryKind::Point, 1.0);
    assert!(matches!(point.image, Some(SymbolImage::Icon(_))));
    assert!(point.stroke.is_none() && point.fill.is_none());

    let line = factory.get_for_properties(&props, GeometryKind::LineString, 1.0);
    assert!(line.stroke.is_some() && line.fill.is_none());

    let area = factory.get_for_properties(&props, GeometryKind::Circle, 1.0);
    assert!(matches!(area.fill, Some(FillStyle::Pattern { .. })));
    assert!(area.stroke.is_some());

    for style in [&point, &line, &area] {
        assert_eq!(style.text.as_ref().map(|t| t.value.as_str()), Some("Label"));
    }
}

#[test]
fn test_ratio_scales_stroke() {
    let factory = StyleFactory::default();
    let props = StyleProperties::default().with_stroke("#000000", 2.0);
    let one = factory.get_for_properties(&props, GeometryKind::LineString, 1.0);
    let two = factory.get_for_properties(&props, GeometryKind::LineString, 2.0);
    assert_eq!(one.stroke.as_ref().map(|s| s.width), Some(2.0));
    assert_eq!(two.stroke.as_ref().map(|s| s.width), Some(4.0));
    assert!(!Rc::ptr_eq(&one, &two));
}

#[test]
fn test_unsupported_kind_still_yields_a_style() {
    let factory = StyleFactory::default();
    let style = factory.get_for_properties(&StyleProperties::default(), GeometryKind::LinearRing, 1.0);
    assert!(style.stroke.is_some());
}

#[test]
fn test_catalog_is_filtered_and_sorted() {
    let factory = StyleFactory::default();
    let big = StyleProperties::default().with_point("circle", 12.0, "#000000");
    let small = StyleProperties::default().with_point("circle", 8.0, "#000000");
    let line = StyleProperties::default().with_stroke("#0000FF", 1.0);

    factory.get_for_properties(&big, GeometryKind::Point, 1.0);
    factory.get_for_properties(&line, GeometryKind::LineString, 1.0);
    factory.get_for_properties(&small, GeometryKind::Point, 1.0);
    factory.get_for_properties(&square_props(), GeometryKind::Polygon, 1.0);
    factory.get_for_properties(&small, GeometryKind::Point, 2.0);

    let catalog = factory.get_available_styles(1.0);
    let summary: Vec<(GeometryKind, Option<f64>)> = catalog
        .iter()
        .map(|entry| (entry.geometry, entry.properties.point.size))
        .collect();
    assert_eq!(
        summary,
        vec![
            (GeometryKind::LineString, None),
            (GeometryKind::Point, Some(8.0)),
            (GeometryKind::Point, Some(12.0)),
            (GeometryKind::Polygon, None),
        ]
    );
    assert_eq!(factory.get_available_styles(2.0).len(), 1);
}

fn square_props() -> StyleProperties {
    StyleProperties::default().with_fill("#FF0000", "#000000", FillPattern::Flat)
}

#[test]
fn test_clear_cache_forces_rebuild() {
    let factory = StyleFactory::default();
    let props = StyleProperties::default();
    let first = factory.get_for_properties(&props, GeometryKind::Polygon, 1.0);
    factory.clear_cache();
    let second = factory.get_for_properties(&props, GeometryKind::Polygon, 1.0);
    assert!(!Rc::ptr_eq(&first, &second));
    assert_eq!(factory.cache_stats().entries, 1);
}

#[test]
fn test_factories_do_not_share_caches() {
    let a = StyleFactory::default();
    let b = StyleFactory::default();
    a.get_for_properties(&StyleProperties::default(), GeometryKind::Point, 1.0);
    assert_eq!(b.cache_stats().entries, 0);
    assert!(a.same_factory(&a.clone()));
    assert!(!a.same_factory(&b));
}
