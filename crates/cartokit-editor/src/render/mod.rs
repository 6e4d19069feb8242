//! Rendering of features, symbols and legends onto draw surfaces.

pub mod font_manager;
pub mod legend;
pub mod preview;
pub mod surface;
pub mod symbol;

pub use legend::{LegendRender, LegendRenderer};
pub use preview::{render_features, RenderStats, ViewTransform};
pub use surface::{DrawCall, DrawSurface, PixmapSurface, RecordingSurface};
pub use symbol::{
    draw_symbol, render_symbol, render_symbol_in, symbol_size_for_style, SymbolOutcome,
    SymbolRender, SymbolSize, DEFAULT_SYMBOL_SIZE, SYMBOL_MARGIN,
};
