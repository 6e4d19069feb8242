//! System font lookup for labels.
//!
//! Fonts are discovered once through `fontdb` and each family is loaded at
//! most once. Lookups never fail hard: an unknown family falls back to the
//! generic sans-serif face, and a machine without fonts yields `None`.

use fontdb::{Database, Family, Query, Source, Stretch, Style, Weight};
use parking_lot::Mutex;
use rusttype::{point, Font, Scale};
use std::collections::HashMap;
use std::fs;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f32 = 1.2;

/// Average advance as a multiple of the font size, used without a font.
const ESTIMATED_ADVANCE: f32 = 0.6;

fn db() -> &'static Database {
    static DB: OnceLock<Database> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = Database::new();
        db.load_system_fonts();
        debug!("Discovered {} font face(s)", db.len());
        db
    })
}

/// Font for `family`, or the sans-serif fallback, or `None` without fonts.
pub fn font_for(family: &str) -> Option<&'static Font<'static>> {
    static CACHE: OnceLock<Mutex<HashMap<String, Option<&'static Font<'static>>>>> =
        OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    let key = family.trim().to_ascii_lowercase();
    if let Some(found) = cache.lock().get(&key) {
        return *found;
    }

    let loaded = load_font(&key).or_else(|| {
        debug!("Font family '{}' not found, using sans-serif", family);
        load_font("sans-serif")
    });
    let font: Option<&'static Font<'static>> = match loaded {
        Some(font) => Some(Box::leak(Box::new(font))),
        None => {
            warn!("No usable font for '{}', labels will be skipped", family);
            None
        }
    };

    cache.lock().insert(key, font);
    font
}

fn load_font(family: &str) -> Option<Font<'static>> {
    let families: Vec<Family<'_>> = match family {
        "" | "sans" | "sans-serif" => vec![Family::SansSerif],
        "serif" => vec![Family::Serif],
        "monospace" => vec![Family::Monospace],
        other => vec![Family::Name(other)],
    };

    let query = Query {
        families: &families,
        weight: Weight::NORMAL,
        stretch: Stretch::Normal,
        style: Style::Normal,
    };

    let id = db().query(&query)?;
    let face = db().face(id)?;

    match &face.source {
        Source::File(path) | Source::SharedFile(path, _) => {
            Font::try_from_vec_and_index(fs::read(path).ok()?, face.index)
        }
        Source::Binary(bytes) => {
            Font::try_from_vec_and_index(bytes.as_ref().as_ref().to_vec(), face.index)
        }
    }
}

/// Width and line height of `text` at `size` pixels.
pub fn measure_text(family: &str, size: f32, text: &str) -> (f32, f32) {
    let line_height = size * LINE_HEIGHT;
    let Some(font) = font_for(family) else {
        return (
            text.chars().count() as f32 * size * ESTIMATED_ADVANCE,
            line_height,
        );
    };

    let scale = Scale::uniform(size);
    let width = font
        .layout(text, scale, point(0.0, 0.0))
        .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
        .fold(0.0_f32, f32::max);
    (width, line_height)
}
