//! CSS-like colour strings to `tiny_skia::Color`.

use cartokit_core::StyleError;
use tiny_skia::Color;
use tracing::warn;

/// Parses `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` and `rgba(r, g, b, a)`.
pub fn parse_color(value: &str) -> Result<Color, StyleError> {
    let trimmed = value.trim();
    let invalid = || StyleError::InvalidColor {
        value: value.to_string(),
    };

    if let Some(hex) = trimmed.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(invalid);
    }

    let lower = trimmed.to_ascii_lowercase();
    let body = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(invalid)?;

    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(invalid());
    }

    let mut channels = [0u8; 3];
    for (slot, part) in channels.iter_mut().zip(&parts) {
        *slot = part.parse::<u8>().map_err(|_| invalid())?;
    }
    let alpha = match parts.get(3) {
        Some(a) => a.parse::<f32>().map_err(|_| invalid())?.clamp(0.0, 1.0),
        None => 1.0,
    };

    let mut color = Color::from_rgba8(channels[0], channels[1], channels[2], 255);
    color.set_alpha(alpha);
    Ok(color)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|d| d * 17);
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(Color::from_rgba8(digit(0)?, digit(1)?, digit(2)?, 255)),
        4 => Some(Color::from_rgba8(digit(0)?, digit(1)?, digit(2)?, digit(3)?)),
        6 => Some(Color::from_rgba8(pair(0)?, pair(2)?, pair(4)?, 255)),
        8 => Some(Color::from_rgba8(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
        _ => None,
    }
}

/// Parses `value`, or `fallback` when `value` is absent. An unparsable value
/// is logged and replaced by the fallback; a broken fallback yields black.
pub fn resolve_color(value: Option<&str>, fallback: &str) -> Color {
    if let Some(value) = value {
        match parse_color(value) {
            Ok(color) => return color,
            Err(err) => warn!("{}, using {}", err, fallback),
        }
    }
    parse_color(fallback).unwrap_or_else(|err| {
        warn!("Default {}", err);
        Color::BLACK
    })
}

/// Same colour with its alpha multiplied by `factor`.
pub fn with_opacity(color: Color, factor: f32) -> Color {
    let mut out = color;
    out.set_alpha((color.alpha() * factor).clamp(0.0, 1.0));
    out
}
