//! Symbol swatches for legends and style pickers.
//!
//! Drawing is synchronous unless the style's icon is still loading. In that
//! case the draw is attached to the icon's ready signal and the caller gets a
//! pending [`SymbolRender`] that resolves once the draw has happened.

use super::surface::DrawSurface;
use crate::geometry::{Extent, GeometryKind, Point};
use crate::style::{LoadState, Style};
use cartokit_core::Shared;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{ready, Context, Poll};
use tokio::sync::oneshot;
use tracing::{debug, error, trace};

/// Swatch edge for non-point kinds, before ratio scaling.
pub const DEFAULT_SYMBOL_SIZE: f64 = 30.0;

/// Space added around point icons, before ratio scaling.
pub const SYMBOL_MARGIN: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolSize {
    pub width: f64,
    pub height: f64,
}

/// How a symbol draw ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolOutcome {
    Drawn,
    /// The icon could not be loaded; nothing was drawn.
    IconFailed,
    /// The target surface or the style went away before the icon was ready.
    Disposed,
}

enum RenderState {
    Ready(SymbolOutcome),
    Pending(oneshot::Receiver<SymbolOutcome>),
}

/// Completion signal of one symbol draw.
///
/// Resolves immediately when the draw was synchronous. Dropping it does not
/// cancel the draw.
pub struct SymbolRender {
    state: RenderState,
}

impl std::fmt::Debug for SymbolRender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.state {
            RenderState::Ready(outcome) => f.debug_tuple("SymbolRender").field(outcome).finish(),
            RenderState::Pending(_) => f.write_str("SymbolRender(pending)"),
        }
    }
}

impl SymbolRender {
    fn ready(outcome: SymbolOutcome) -> Self {
        Self {
            state: RenderState::Ready(outcome),
        }
    }

    fn pending(receiver: oneshot::Receiver<SymbolOutcome>) -> Self {
        Self {
            state: RenderState::Pending(receiver),
        }
    }

    /// The outcome if the draw has finished, without waiting.
    pub fn try_outcome(&mut self) -> Option<SymbolOutcome> {
        let outcome = match &mut self.state {
            RenderState::Ready(outcome) => return Some(*outcome),
            RenderState::Pending(receiver) => match receiver.try_recv() {
                Ok(outcome) => outcome,
                Err(oneshot::error::TryRecvError::Empty) => return None,
                Err(oneshot::error::TryRecvError::Closed) => SymbolOutcome::Disposed,
            },
        };
        self.state = RenderState::Ready(outcome);
        Some(outcome)
    }

    pub fn is_finished(&mut self) -> bool {
        self.try_outcome().is_some()
    }
}

impl Future for SymbolRender {
    type Output = SymbolOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<SymbolOutcome> {
        let outcome = match &mut self.state {
            RenderState::Ready(outcome) => return Poll::Ready(*outcome),
            RenderState::Pending(receiver) => {
                ready!(Pin::new(receiver).poll(cx)).unwrap_or(SymbolOutcome::Disposed)
            }
        };
        self.state = RenderState::Ready(outcome);
        Poll::Ready(outcome)
    }
}

/// Swatch size: the icon's natural size plus a margin for point kinds, a
/// fixed square otherwise.
pub fn symbol_size_for_style(style: &Style, kind: GeometryKind, ratio: f64) -> SymbolSize {
    if kind.is_point() {
        if let Some(image) = &style.image {
            let (w, h) = image.size();
            let margin = SYMBOL_MARGIN * ratio;
            return SymbolSize {
                width: f64::from(w) + margin,
                height: f64::from(h) + margin,
            };
        }
    }
    let edge = DEFAULT_SYMBOL_SIZE * ratio;
    SymbolSize {
        width: edge,
        height: edge,
    }
}

/// Draws a swatch centred on the whole surface.
pub fn render_symbol<S>(
    style: &Rc<Style>,
    kind: GeometryKind,
    target: &Shared<S>,
    ratio: f64,
) -> SymbolRender
where
    S: DrawSurface + 'static,
{
    let frame = {
        let surface = target.borrow();
        Extent::from_xywh(0.0, 0.0, surface.width() as f64, surface.height() as f64)
    };
    render_symbol_in(style, kind, target, frame, ratio)
}

/// Draws a swatch centred in `frame`.
///
/// With an icon that has not settled, nothing is drawn now: the draw runs
/// when the icon's ready signal fires, and only if the surface still exists.
pub fn render_symbol_in<S>(
    style: &Rc<Style>,
    kind: GeometryKind,
    target: &Shared<S>,
    frame: Extent,
    ratio: f64,
) -> SymbolRender
where
    S: DrawSurface + 'static,
{
    if let Some(icon) = style.icon().filter(|icon| !icon.is_settled()) {
        let (sender, receiver) = oneshot::channel();
        let surface = Rc::downgrade(target);
        let deferred = Rc::downgrade(style);

        trace!("Deferring {} symbol until icon '{}' is ready", kind, icon.name());
        icon.on_ready(move |_| {
            let outcome = match (surface.upgrade(), deferred.upgrade()) {
                (Some(surface), Some(style)) => match surface.try_borrow_mut() {
                    Ok(mut surface) => draw_symbol(&mut *surface, &style, kind, frame, ratio),
                    Err(_) => {
                        error!("Symbol surface is busy, deferred draw dropped");
                        SymbolOutcome::Disposed
                    }
                },
                _ => {
                    debug!("Symbol target disposed before its icon was ready");
                    SymbolOutcome::Disposed
                }
            };
            // The caller may have dropped the completion signal.
            let _ = sender.send(outcome);
        });
        icon.load();
        return SymbolRender::pending(receiver);
    }

    let outcome = draw_symbol(&mut *target.borrow_mut(), style, kind, frame, ratio);
    SymbolRender::ready(outcome)
}

/// Synchronous draw of a swatch into `frame`.
pub fn draw_symbol(
    surface: &mut dyn DrawSurface,
    style: &Style,
    kind: GeometryKind,
    frame: Extent,
    ratio: f64,
) -> SymbolOutcome {
    if style
        .icon()
        .is_some_and(|icon| icon.state() == LoadState::Failed)
    {
        return SymbolOutcome::IconFailed;
    }

    if kind.is_point() {
        surface.draw_point(frame.center(), style);
    } else if kind.is_line() {
        surface.draw_line(&zigzag(frame, ratio), style);
    } else {
        surface.draw_polygon(&[centered_square(frame, ratio)], style);
    }
    SymbolOutcome::Drawn
}

fn swatch_edge(frame: Extent, ratio: f64) -> f64 {
    (DEFAULT_SYMBOL_SIZE * ratio)
        .min(frame.width())
        .min(frame.height())
        * 0.7
}

fn centered_square(frame: Extent, ratio: f64) -> Vec<Point> {
    let c = frame.center();
    let half = swatch_edge(frame, ratio) / 2.0;
    vec![
        Point::new(c.x - half, c.y - half),
        Point::new(c.x + half, c.y - half),
        Point::new(c.x + half, c.y + half),
        Point::new(c.x - half, c.y + half),
        Point::new(c.x - half, c.y - half),
    ]
}

fn zigzag(frame: Extent, ratio: f64) -> Vec<Point> {
    let c = frame.center();
    let half = swatch_edge(frame, ratio) / 2.0;
    let amplitude = half * 0.6;
    (0..5)
        .map(|i| {
            let x = c.x - half + half / 2.0 * i as f64;
            let y = if i % 2 == 0 {
                c.y + amplitude
            } else {
                c.y - amplitude
            };
            Point::new(x, y)
        })
        .collect()
}
