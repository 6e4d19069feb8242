use cartokit_editor::feature::StyleProperties;
use cartokit_editor::style::{Style, StyleCache};
use cartokit_editor::GeometryKind;
use proptest::prelude::*;
use std::rc::Rc;

fn point_props(size: f64, color: &str) -> StyleProperties {
    let mut props = StyleProperties::default();
    props.point.size = Some(size);
    props.point.color = Some(color.to_string());
    props
}

#[test]
fn test_style_cache_hit_scenario() {
    let mut cache = StyleCache::new();
    let style = Rc::new(Style::new());
    cache.put(GeometryKind::Point, &point_props(10.0, "#000"), 1.0, style.clone());

    let hit = cache
        .get(GeometryKind::Point, &point_props(10.0, "#000"), 1.0)
        .unwrap();
    assert!(Rc::ptr_eq(&hit, &style));
    assert!(cache
        .get(GeometryKind::Point, &point_props(11.0, "#000"), 1.0)
        .is_none());

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
}

#[test]
fn test_equal_puts_share_one_entry() {
    let mut cache = StyleCache::new();
    cache.put(GeometryKind::Polygon, &StyleProperties::default(), 1.0, Rc::new(Style::new()));
    let latest = Rc::new(Style::new());
    cache.put(GeometryKind::Polygon, &StyleProperties::default(), 1.0, latest.clone());

    assert_eq!(cache.len(), 1);
    let found = cache
        .get(GeometryKind::Polygon, &StyleProperties::default(), 1.0)
        .unwrap();
    assert!(Rc::ptr_eq(&found, &latest));
}

#[test]
fn test_get_all_and_clear() {
    let mut cache = StyleCache::new();
    for kind in [GeometryKind::Point, GeometryKind::LineString] {
        cache.put(kind, &StyleProperties::default(), 2.0, Rc::new(Style::new()));
    }
    let mut kinds: Vec<GeometryKind> = cache.get_all().iter().map(|e| e.geometry).collect();
    kinds.sort();
    assert_eq!(kinds, vec![GeometryKind::Point, GeometryKind::LineString]);

    cache.clear();
    assert!(cache.is_empty());
    assert!(!cache.contains(GeometryKind::Point, &StyleProperties::default(), 2.0));
}

fn any_kind() -> impl Strategy<Value = GeometryKind> {
    (0..GeometryKind::ALL.len()).prop_map(|i| GeometryKind::ALL[i])
}

proptest! {
    #[test]
    fn prop_value_equal_keys_hit(
        kind in any_kind(),
        size in 1.0f64..64.0,
        width in 0.5f64..10.0,
        ratio in 0.5f64..4.0,
        color in "#[0-9a-f]{6}",
    ) {
        let mut cache = StyleCache::new();
        let props = point_props(size, &color).with_stroke(&color, width);
        let style = Rc::new(Style::new());
        cache.put(kind, &props, ratio, style.clone());

        // A separately built, value-equal record.
        let again = point_props(size, &color).with_stroke(&color, width);
        let hit = cache.get(kind, &again, ratio);
        prop_assert!(hit.is_some_and(|found| Rc::ptr_eq(&found, &style)));
    }

    #[test]
    fn prop_any_changed_component_misses(
        kind in any_kind(),
        size in 1.0f64..64.0,
        ratio in 0.5f64..4.0,
    ) {
        let mut cache = StyleCache::new();
        let props = point_props(size, "#000000");
        cache.put(kind, &props, ratio, Rc::new(Style::new()));

        prop_assert!(cache.get(kind, &point_props(size + 1.0, "#000000"), ratio).is_none());
        prop_assert!(cache.get(kind, &point_props(size, "#000001"), ratio).is_none());
        prop_assert!(cache.get(kind, &props.clone().with_z_index(1), ratio).is_none());
        prop_assert!(cache.get(kind, &props, ratio + 0.25).is_none());

        let other = GeometryKind::ALL
            .into_iter()
            .find(|k| *k != kind)
            .unwrap();
        prop_assert!(cache.get(other, &props, ratio).is_none());
    }
}
