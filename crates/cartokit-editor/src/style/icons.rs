//! Image-backed point icons.
//!
//! An [`IconImage`] starts `Idle`, moves to `Loading` the first time someone
//! asks for it, and settles exactly once as `Loaded` or `Failed`. Code that
//! needs the bitmap registers a one-shot listener with [`IconImage::on_ready`];
//! listeners run once, in registration order, when the icon settles (or
//! immediately if it already has).
//!
//! Loading is delegated to an [`IconLoader`]. Loaders may settle the icon
//! before `load` returns ([`BuiltinIcons`], [`RasterIcons`]) or later
//! ([`DeferredIcons`]).

use cartokit_core::{OnceCallbackList, StyleError};
use cartokit_settings::IconTheme;
use image::imageops::FilterType;
use image::RgbaImage;
use std::cell::RefCell;
use std::collections::HashMap;
use std::f32::consts::PI;
use std::fmt;
use std::rc::Rc;
use tiny_skia::{
    Color, ColorU8, FillRule, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform,
};
use tracing::{debug, trace, warn};

/// Names understood by [`BuiltinIcons`].
pub const BUILTIN_ICONS: [&str; 7] = [
    "circle", "square", "triangle", "diamond", "star", "cross", "pin",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// What to load: icon name, edge length in pixels and tint colour.
#[derive(Debug, Clone, PartialEq)]
pub struct IconRequest {
    pub name: String,
    pub size_px: u32,
    pub tint: Color,
}

/// Source of icon bitmaps.
pub trait IconLoader {
    /// Starts loading `icon`. Implementations must eventually call
    /// [`IconImage::resolve`] or [`IconImage::fail`], possibly before returning.
    fn load(&self, icon: &IconImage);
}

struct IconInner {
    request: IconRequest,
    state: LoadState,
    pixmap: Option<Rc<Pixmap>>,
    listeners: OnceCallbackList<IconImage>,
    loader: Rc<dyn IconLoader>,
}

/// Shared handle to one icon bitmap and its load state.
#[derive(Clone)]
pub struct IconImage {
    inner: Rc<RefCell<IconInner>>,
}

impl fmt::Debug for IconImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("IconImage")
            .field("name", &inner.request.name)
            .field("size_px", &inner.request.size_px)
            .field("state", &inner.state)
            .finish()
    }
}

impl IconImage {
    pub fn new(request: IconRequest, loader: Rc<dyn IconLoader>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(IconInner {
                request,
                state: LoadState::Idle,
                pixmap: None,
                listeners: Vec::new(),
                loader,
            })),
        }
    }

    pub fn request(&self) -> IconRequest {
        self.inner.borrow().request.clone()
    }

    pub fn name(&self) -> String {
        self.inner.borrow().request.name.clone()
    }

    pub fn state(&self) -> LoadState {
        self.inner.borrow().state
    }

    pub fn is_loaded(&self) -> bool {
        self.state() == LoadState::Loaded
    }

    /// Loaded or failed; no further transition will happen.
    pub fn is_settled(&self) -> bool {
        matches!(self.state(), LoadState::Loaded | LoadState::Failed)
    }

    pub fn same_image(&self, other: &IconImage) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Natural pixel size: the bitmap size once loaded, the requested size before.
    pub fn size(&self) -> (u32, u32) {
        let inner = self.inner.borrow();
        match &inner.pixmap {
            Some(pixmap) => (pixmap.width(), pixmap.height()),
            None => (inner.request.size_px, inner.request.size_px),
        }
    }

    pub fn pixmap(&self) -> Option<Rc<Pixmap>> {
        self.inner.borrow().pixmap.clone()
    }

    /// Starts loading if nobody has yet. Later calls are no-ops.
    pub fn load(&self) {
        let loader = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != LoadState::Idle {
                return;
            }
            inner.state = LoadState::Loading;
            Rc::clone(&inner.loader)
        };
        trace!("Loading icon {:?}", self);
        loader.load(self);
    }

    /// Runs `callback` once the icon has settled.
    pub fn on_ready(&self, callback: impl FnOnce(IconImage) + 'static) {
        {
            let mut inner = self.inner.borrow_mut();
            if !matches!(inner.state, LoadState::Loaded | LoadState::Failed) {
                inner.listeners.push(Box::new(callback));
                return;
            }
        }
        callback(self.clone());
    }

    /// Settles the icon with its bitmap and notifies listeners.
    pub fn resolve(&self, pixmap: Pixmap) {
        let listeners = {
            let mut inner = self.inner.borrow_mut();
            if matches!(inner.state, LoadState::Loaded | LoadState::Failed) {
                warn!("Icon '{}' settled twice, ignoring", inner.request.name);
                return;
            }
            inner.pixmap = Some(Rc::new(pixmap));
            inner.state = LoadState::Loaded;
            std::mem::take(&mut inner.listeners)
        };
        debug!("Icon {:?} ready, {} listener(s)", self, listeners.len());
        for listener in listeners {
            listener(self.clone());
        }
    }

    /// Settles the icon as failed and notifies listeners.
    pub fn fail(&self, error: StyleError) {
        let listeners = {
            let mut inner = self.inner.borrow_mut();
            if matches!(inner.state, LoadState::Loaded | LoadState::Failed) {
                return;
            }
            inner.state = LoadState::Failed;
            std::mem::take(&mut inner.listeners)
        };
        warn!("{}", error);
        for listener in listeners {
            listener(self.clone());
        }
    }
}

// =============================================================================
// BUILT-IN GLYPHS
// =============================================================================

/// Draws the named glyphs in [`BUILTIN_ICONS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinIcons {
    theme: IconTheme,
}

impl BuiltinIcons {
    pub fn new(theme: IconTheme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> IconTheme {
        self.theme
    }

    pub fn contains(name: &str) -> bool {
        BUILTIN_ICONS.contains(&name)
    }

    /// Rasterizes one glyph, or `None` for an unknown name.
    pub fn rasterize(&self, request: &IconRequest) -> Option<Pixmap> {
        let size = request.size_px.max(1);
        let mut pixmap = Pixmap::new(size, size)?;
        let s = size as f32;

        let stroke_width = (s / 8.0).max(1.0);
        let inset = match self.theme {
            IconTheme::Filled => 0.5,
            IconTheme::Outlined => stroke_width / 2.0 + 0.5,
        };
        let path = glyph_path(&request.name, s, inset)?;

        let mut paint = Paint::default();
        paint.set_color(request.tint);
        paint.anti_alias = true;

        match self.theme {
            IconTheme::Filled => {
                pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            }
            IconTheme::Outlined => {
                let stroke = Stroke {
                    width: stroke_width,
                    ..Default::default()
                };
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }
        Some(pixmap)
    }
}

impl IconLoader for BuiltinIcons {
    fn load(&self, icon: &IconImage) {
        let request = icon.request();
        match self.rasterize(&request) {
            Some(pixmap) => icon.resolve(pixmap),
            None => icon.fail(StyleError::IconUnavailable {
                icon: request.name,
                reason: "unknown built-in icon".to_string(),
            }),
        }
    }
}

fn polygon_path(points: &[(f32, f32)]) -> Option<Path> {
    let mut pb = PathBuilder::new();
    let (first, rest) = points.split_first()?;
    pb.move_to(first.0, first.1);
    for (x, y) in rest {
        pb.line_to(*x, *y);
    }
    pb.close();
    pb.finish()
}

fn glyph_path(name: &str, s: f32, inset: f32) -> Option<Path> {
    let lo = inset;
    let hi = s - inset;
    let mid = s / 2.0;

    match name {
        "circle" => PathBuilder::from_circle(mid, mid, (mid - inset).max(0.5)),
        "square" => Rect::from_ltrb(lo, lo, hi, hi).map(PathBuilder::from_rect),
        "triangle" => polygon_path(&[(mid, lo), (hi, hi), (lo, hi)]),
        "diamond" => polygon_path(&[(mid, lo), (hi, mid), (mid, hi), (lo, mid)]),
        "star" => {
            let outer = mid - inset;
            let inner = outer * 0.45;
            let points: Vec<(f32, f32)> = (0..10)
                .map(|i| {
                    let r = if i % 2 == 0 { outer } else { inner };
                    let angle = -PI / 2.0 + i as f32 * PI / 5.0;
                    (mid + r * angle.cos(), mid + r * angle.sin())
                })
                .collect();
            polygon_path(&points)
        }
        "cross" => {
            let arm = (hi - lo) / 6.0;
            polygon_path(&[
                (mid - arm, lo),
                (mid + arm, lo),
                (mid + arm, mid - arm),
                (hi, mid - arm),
                (hi, mid + arm),
                (mid + arm, mid + arm),
                (mid + arm, hi),
                (mid - arm, hi),
                (mid - arm, mid + arm),
                (lo, mid + arm),
                (lo, mid - arm),
                (mid - arm, mid - arm),
            ])
        }
        "pin" => {
            let r = (s - 2.0 * inset) * 0.32;
            let cy = lo + r;
            let mut pb = PathBuilder::new();
            pb.move_to(mid, hi);
            pb.line_to(mid - r * 0.9, cy + r * 0.45);
            pb.quad_to(mid - r * 1.1, lo, mid, lo);
            pb.quad_to(mid + r * 1.1, lo, mid + r * 0.9, cy + r * 0.45);
            pb.close();
            pb.finish()
        }
        _ => None,
    }
}

// =============================================================================
// RASTER ICONS
// =============================================================================

/// Decodes registered raster images (PNG, JPEG, ...) and tints them.
///
/// Pixels keep their alpha and take the tint colour. Unknown names fall back
/// to the built-in glyphs.
#[derive(Debug, Default)]
pub struct RasterIcons {
    sources: HashMap<String, Vec<u8>>,
    fallback: BuiltinIcons,
}

impl RasterIcons {
    pub fn new(fallback: BuiltinIcons) -> Self {
        Self {
            sources: HashMap::new(),
            fallback,
        }
    }

    pub fn register(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.sources.insert(name.into(), bytes);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn decode(&self, bytes: &[u8], request: &IconRequest) -> Result<Pixmap, String> {
        let decoded = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
        let rgba = decoded.to_rgba8();
        let (w, h) = fit_within(rgba.width(), rgba.height(), request.size_px.max(1));
        let resized = image::imageops::resize(&rgba, w, h, FilterType::Triangle);
        let tinted = tint_image(&resized, request.tint);
        pixmap_from_rgba(&tinted).ok_or_else(|| "empty image".to_string())
    }
}

impl IconLoader for RasterIcons {
    fn load(&self, icon: &IconImage) {
        let request = icon.request();
        let Some(bytes) = self.sources.get(&request.name) else {
            trace!("No raster source for '{}', using built-in", request.name);
            self.fallback.load(icon);
            return;
        };
        match self.decode(bytes, &request) {
            Ok(pixmap) => icon.resolve(pixmap),
            Err(reason) => icon.fail(StyleError::IconUnavailable {
                icon: request.name,
                reason,
            }),
        }
    }
}

fn fit_within(width: u32, height: u32, edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (edge, edge);
    }
    let scale = edge as f64 / width.max(height) as f64;
    (
        ((width as f64 * scale).round() as u32).max(1),
        ((height as f64 * scale).round() as u32).max(1),
    )
}

fn tint_image(src: &RgbaImage, tint: Color) -> RgbaImage {
    let t = tint.to_color_u8();
    let mut out = src.clone();
    for pixel in out.pixels_mut() {
        let alpha = (pixel[3] as u16 * t.alpha() as u16 / 255) as u8;
        *pixel = image::Rgba([t.red(), t.green(), t.blue(), alpha]);
    }
    out
}

/// Converts straight-alpha RGBA into a premultiplied pixmap.
pub fn pixmap_from_rgba(img: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Some(pixmap)
}

/// Converts a premultiplied pixmap back into straight-alpha RGBA.
pub fn rgba_from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

// =============================================================================
// DEFERRED LOADING
// =============================================================================

/// Queues load requests until [`flush`](DeferredIcons::flush) is called.
///
/// Models an event loop where image loads complete on a later tick.
pub struct DeferredIcons {
    inner: Rc<dyn IconLoader>,
    pending: RefCell<Vec<IconImage>>,
}

impl DeferredIcons {
    pub fn new(inner: Rc<dyn IconLoader>) -> Self {
        Self {
            inner,
            pending: RefCell::new(Vec::new()),
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Completes every queued load. Returns how many were processed.
    pub fn flush(&self) -> usize {
        let batch = std::mem::take(&mut *self.pending.borrow_mut());
        let count = batch.len();
        for icon in batch {
            self.inner.load(&icon);
        }
        count
    }
}

impl IconLoader for DeferredIcons {
    fn load(&self, icon: &IconImage) {
        self.pending.borrow_mut().push(icon.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn request(name: &str, size: u32) -> IconRequest {
        IconRequest {
            name: name.to_string(),
            size_px: size,
            tint: Color::from_rgba8(255, 0, 0, 255),
        }
    }

    #[test]
    fn test_builtin_icons_resolve_synchronously() {
        let loader: Rc<dyn IconLoader> = Rc::new(BuiltinIcons::default());
        for name in BUILTIN_ICONS {
            let icon = IconImage::new(request(name, 16), Rc::clone(&loader));
            icon.load();
            assert_eq!(icon.state(), LoadState::Loaded, "{}", name);
            assert_eq!(icon.size(), (16, 16));
        }
    }

    #[test]
    fn test_unknown_builtin_fails() {
        let icon = IconImage::new(request("unicorn", 16), Rc::new(BuiltinIcons::default()));
        icon.load();
        assert_eq!(icon.state(), LoadState::Failed);
        assert!(icon.pixmap().is_none());
    }

    #[test]
    fn test_listener_fires_once_after_deferred_load() {
        let deferred = Rc::new(DeferredIcons::new(Rc::new(BuiltinIcons::default())));
        let icon = IconImage::new(request("star", 12), deferred.clone());
        let fired = Rc::new(Cell::new(0));

        let counter = Rc::clone(&fired);
        icon.on_ready(move |_| counter.set(counter.get() + 1));
        icon.load();
        icon.load();
        assert_eq!(icon.state(), LoadState::Loading);
        assert_eq!(deferred.pending_count(), 1);
        assert_eq!(fired.get(), 0);

        assert_eq!(deferred.flush(), 1);
        assert_eq!(fired.get(), 1);
        assert!(icon.is_loaded());

        // Already settled: runs immediately.
        let counter = Rc::clone(&fired);
        icon.on_ready(move |_| counter.set(counter.get() + 10));
        assert_eq!(fired.get(), 11);
    }

    #[test]
    fn test_filled_glyph_is_tinted() {
        let pixmap = BuiltinIcons::new(IconTheme::Filled)
            .rasterize(&request("square", 10))
            .unwrap();
        let center = pixmap.pixel(5, 5).unwrap().demultiply();
        assert_eq!((center.red(), center.green(), center.blue()), (255, 0, 0));
        assert_eq!(center.alpha(), 255);
    }

    #[test]
    fn test_outlined_glyph_has_hollow_center() {
        let pixmap = BuiltinIcons::new(IconTheme::Outlined)
            .rasterize(&request("square", 32))
            .unwrap();
        assert_eq!(pixmap.pixel(16, 16).unwrap().alpha(), 0);
    }

    #[test]
    fn test_raster_icon_decoding_and_fallback() {
        let mut png = Vec::new();
        let source = RgbaImage::from_pixel(8, 4, image::Rgba([0, 0, 0, 255]));
        image::DynamicImage::ImageRgba8(source)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let mut raster = RasterIcons::new(BuiltinIcons::default());
        raster.register("flag", png);
        let loader: Rc<dyn IconLoader> = Rc::new(raster);

        let flag = IconImage::new(request("flag", 16), Rc::clone(&loader));
        flag.load();
        assert!(flag.is_loaded());
        assert_eq!(flag.size(), (16, 8));

        let circle = IconImage::new(request("circle", 16), loader);
        circle.load();
        assert!(circle.is_loaded());
    }

    #[test]
    fn test_rgba_pixmap_conversion() {
        let img = RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 255]));
        let pixmap = pixmap_from_rgba(&img).unwrap();
        let back = rgba_from_pixmap(&pixmap);
        assert_eq!(back.get_pixel(1, 1), &image::Rgba([10, 20, 30, 255]));
    }
}
