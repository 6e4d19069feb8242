use cartokit_core::shared;
use cartokit_editor::feature::StyleProperties;
use cartokit_editor::render::{render_symbol, symbol_size_for_style, RecordingSurface, SymbolOutcome};
use cartokit_editor::style::{BuiltinIcons, DeferredIcons, StyleFactory};
use cartokit_editor::{GeometryKind, PixmapSurface};
use cartokit_settings::StyleSettings;
use std::rc::Rc;

fn deferred_factory() -> (Rc<DeferredIcons>, StyleFactory) {
    let deferred = Rc::new(DeferredIcons::new(Rc::new(BuiltinIcons::default())));
    let factory = StyleFactory::new(StyleSettings::default(), deferred.clone());
    (deferred, factory)
}

#[tokio::test]
async fn test_symbol_waits_for_icon() {
    let (deferred, factory) = deferred_factory();
    let props = StyleProperties::default().with_point("star", 16.0, "#AA0000");
    let style = factory.get_for_properties(&props, GeometryKind::Point, 1.0);
    assert!(style.awaits_icon());

    let target = shared(RecordingSurface::new(40, 40));
    let mut render = render_symbol(&style, GeometryKind::Point, &target, 1.0);
    assert!(target.borrow().is_untouched());
    assert!(!render.is_finished());

    assert_eq!(deferred.flush(), 1);
    assert_eq!(target.borrow().count_points(), 1);
    assert_eq!(render.await, SymbolOutcome::Drawn);
}

#[tokio::test]
async fn test_loaded_icon_draws_synchronously() {
    let factory = StyleFactory::default();
    let style = factory.get_for_properties(&StyleProperties::default(), GeometryKind::Point, 1.0);
    let target = shared(RecordingSurface::new(40, 40));

    let mut render = render_symbol(&style, GeometryKind::Point, &target, 1.0);
    assert_eq!(render.try_outcome(), Some(SymbolOutcome::Drawn));
    assert_eq!(target.borrow().count_points(), 1);
    assert_eq!(render.await, SymbolOutcome::Drawn);
}

#[tokio::test]
async fn test_dropped_surface_is_reported() {
    let (deferred, factory) = deferred_factory();
    let style = factory.get_for_properties(&StyleProperties::default(), GeometryKind::Point, 1.0);
    let target = shared(RecordingSurface::new(40, 40));
    let render = render_symbol(&style, GeometryKind::Point, &target, 1.0);

    drop(target);
    deferred.flush();
    assert_eq!(render.await, SymbolOutcome::Disposed);
}

#[tokio::test]
async fn test_unknown_icon_fails_without_drawing() {
    let (deferred, factory) = deferred_factory();
    let props = StyleProperties::default().with_point("no-such-icon", 10.0, "#000000");
    let style = factory.get_for_properties(&props, GeometryKind::Point, 1.0);
    let target = shared(RecordingSurface::new(40, 40));
    let render = render_symbol(&style, GeometryKind::Point, &target, 1.0);

    deferred.flush();
    assert_eq!(render.await, SymbolOutcome::IconFailed);
    assert!(target.borrow().is_untouched());
}

#[test]
fn test_symbol_sizes() {
    let factory = StyleFactory::default();
    let point = factory.get_for_properties(
        &StyleProperties::default().with_point("circle", 12.0, "#000000"),
        GeometryKind::Point,
        2.0,
    );
    let size = symbol_size_for_style(&point, GeometryKind::Point, 2.0);
    assert_eq!((size.width, size.height), (32.0, 32.0));

    let area = factory.get_for_properties(&StyleProperties::default(), GeometryKind::Polygon, 2.0);
    let size = symbol_size_for_style(&area, GeometryKind::Polygon, 2.0);
    assert_eq!((size.width, size.height), (60.0, 60.0));
}

#[test]
fn test_symbol_paints_pixels() {
    let factory = StyleFactory::default();
    let style = factory.get_for_properties(
        &StyleProperties::default().with_stroke("#0000FF", 3.0),
        GeometryKind::LineString,
        1.0,
    );
    let target = shared(PixmapSurface::new(40, 40).unwrap());
    let mut render = render_symbol(&style, GeometryKind::LineString, &target, 1.0);
    assert_eq!(render.try_outcome(), Some(SymbolOutcome::Drawn));
    assert!(target.borrow().painted_pixels() > 0);
}
