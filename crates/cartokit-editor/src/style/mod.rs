//! Drawable styles and the machinery that builds them.
//!
//! - [`StyleCache`]: value-keyed memo of built styles
//! - [`StyleFactory`]: builds styles per geometry kind, fills the cache and
//!   lists the catalog
//! - [`SelectionOverlayFactory`]: selection and highlight decorations
//! - [`IconImage`] and [`IconLoader`]: point icons with deferred loading

pub mod cache;
pub mod color;
pub mod factory;
pub mod icons;
pub mod selection;
pub mod types;

pub use cache::{cache_key, CacheStats, CachedStyle, StyleCache};
pub use color::{parse_color, resolve_color, with_opacity};
pub use factory::{default_style_properties, StyleFactory};
pub use icons::{
    BuiltinIcons, DeferredIcons, IconImage, IconLoader, IconRequest, LoadState, RasterIcons,
    BUILTIN_ICONS,
};
pub use selection::{SelectionOverlayFactory, OVERLAY_Z_INDEX};
pub use types::{FillStyle, StrokeStyle, Style, StyleList, SymbolImage, TextStyle};
