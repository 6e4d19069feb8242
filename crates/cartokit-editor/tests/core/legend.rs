use cartokit_core::shared;
use cartokit_editor::feature::StyleProperties;
use cartokit_editor::render::{DrawCall, LegendRenderer, RecordingSurface, SymbolOutcome};
use cartokit_editor::style::{BuiltinIcons, DeferredIcons, StyleFactory};
use cartokit_editor::{GeometryKind, Legend, LegendItem};
use cartokit_settings::{LegendSettings, StyleSettings};
use std::rc::Rc;

fn legend() -> Legend {
    let mut legend = Legend::new();
    legend.add_item(LegendItem::with_symbol(
        "Wells",
        GeometryKind::Point,
        StyleProperties::default().with_point("pin", 12.0, "#000000"),
    ));
    legend.add_item(LegendItem::with_symbol(
        "Parcels",
        GeometryKind::Polygon,
        StyleProperties::default(),
    ));
    legend
}

#[tokio::test]
async fn test_legend_completes_after_icons_load() {
    let deferred = Rc::new(DeferredIcons::new(Rc::new(BuiltinIcons::default())));
    let factory = StyleFactory::new(StyleSettings::default(), deferred.clone());
    let renderer = LegendRenderer::new(factory, LegendSettings::default());
    let target = shared(RecordingSurface::new(200, 120));

    let mut render = renderer.render_legend(&legend(), &target, 1.0);
    assert_eq!(render.pending(), 1);
    // Frame, area swatch and both labels are drawn right away.
    assert_eq!(target.borrow().count_points(), 0);
    assert_eq!(target.borrow().texts(), vec!["Wells", "Parcels"]);

    deferred.flush();
    assert_eq!(render.pending(), 0);
    assert_eq!(
        render.wait().await,
        vec![SymbolOutcome::Drawn, SymbolOutcome::Drawn]
    );
    assert_eq!(target.borrow().count_points(), 1);
}

#[test]
fn test_legend_draws_frame_first() {
    let renderer = LegendRenderer::new(StyleFactory::default(), LegendSettings::default());
    let target = shared(RecordingSurface::new(200, 120));
    renderer.render_legend(&legend(), &target, 1.0);
    let surface = target.borrow();
    assert!(matches!(surface.calls().first(), Some(DrawCall::Frame { .. })));
    assert!(surface
        .calls()
        .iter()
        .any(|call| matches!(call, DrawCall::Polygon { .. })));
}

#[test]
fn test_legend_size_grows_with_items() {
    let renderer = LegendRenderer::new(StyleFactory::default(), LegendSettings::default());
    let mut legend = legend();
    let (w1, h1) = renderer.legend_size(&legend, 1.0);
    legend.add_item(LegendItem::new("A much longer label than the others", None));
    let (w2, h2) = renderer.legend_size(&legend, 1.0);
    assert!(h2 > h1);
    assert!(w2 >= w1);
}

#[test]
fn test_move_item() {
    let mut legend = legend();
    let id = legend.items()[1].id.clone();
    assert!(legend.move_item(&id, 0));
    assert_eq!(legend.items()[0].text, "Parcels");
    assert!(!legend.move_item("missing", 0));
}
