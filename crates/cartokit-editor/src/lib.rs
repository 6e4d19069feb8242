//! # Cartokit Editor
//!
//! The editing core of a map feature editor. It owns the feature model, turns
//! style properties into drawable styles through a value-keyed cache, draws
//! symbols and legends onto pixel surfaces and records every edit as a
//! reversible operation.
//!
//! ## Core Components
//!
//! - **Features**: [`FeatureEntity`] holds one [`Geometry`], its style and
//!   data properties, and the transient selected/highlighted flags
//! - **Styles**: [`StyleFactory`] builds [`Style`]s per geometry kind, memoised
//!   in a [`StyleCache`]; selection and highlight decorations come from the
//!   [`SelectionOverlayFactory`] as a separate layer
//! - **Rendering**: [`render_symbol`], [`LegendRenderer`] and
//!   [`render_features`] draw onto any [`DrawSurface`]
//! - **History**: [`Task`]s registered on a [`History`] per [`HistoryKey`]
//! - **Session**: [`EditorSession`] ties the pieces together
//!
//! ## Architecture
//!
//! ```text
//! EditorSession
//!   ├── VectorLayer ── FeatureEntity (geometry, style, data, flags)
//!   ├── Legend ─────── LegendItem (text, symbol)
//!   ├── StyleFactory
//!   │     ├── StyleCache (kind, properties, ratio) -> Style
//!   │     ├── SelectionOverlayFactory
//!   │     └── IconLoader -> IconImage
//!   └── History
//!         └── HistoryKey -> [Task] + cursor
//! ```
//!
//! Everything runs on one thread. The only asynchronous boundary is the wait
//! for an icon image inside [`render_symbol`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cartokit_editor::{EditorSession, FeatureEntity, Geometry, HistoryKey};
//!
//! let mut session = EditorSession::default();
//! session.add_features(vec![FeatureEntity::new(Some(Geometry::point(1.0, 2.0)))])?;
//! session.undo(HistoryKey::Map);
//! ```

pub mod feature;
pub mod geometry;
pub mod history;
pub mod layer;
pub mod legend;
pub mod render;
pub mod session;
pub mod style;

pub use feature::{
    DataProperties, FeatureEntity, FillPattern, PropertyValue, StyleProperties, TextAlignment,
};
pub use geometry::{Extent, Geometry, GeometryKind, Point};
pub use history::{BatchTask, History, HistoryKey, Task};
pub use layer::VectorLayer;
pub use legend::{Legend, LegendItem, LegendSymbol};
pub use render::{
    render_features, render_symbol, DrawSurface, LegendRenderer, PixmapSurface,
    RecordingSurface, SymbolOutcome, SymbolRender, ViewTransform,
};
pub use session::EditorSession;
pub use style::{
    BuiltinIcons, CachedStyle, DeferredIcons, IconImage, IconLoader, RasterIcons,
    SelectionOverlayFactory, Style, StyleCache, StyleFactory, StyleList,
};
