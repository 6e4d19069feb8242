//! Style and data property records carried by features.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Prefix of data keys managed by the editor itself.
///
/// Such keys are stored with the feature but hidden from attribute tables and
/// legends, and left untouched by [`overwrite`](super::FeatureEntity::overwrite_data_properties).
pub const RESERVED_PREFIX: &str = "carto:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillPattern {
    #[default]
    Flat,
    HatchingObliqueRight,
    HatchingObliqueLeft,
    HatchingVertical,
    HatchingHorizontal,
    Dots,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillProperties {
    /// Background colour, or the whole fill for [`FillPattern::Flat`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color1: Option<String>,
    /// Pattern foreground colour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<FillPattern>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<TextAlignment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Value-level description of how a feature looks.
///
/// Every field is optional. Missing fields are filled with configured defaults
/// when a drawable style is built; they are never stored as defaults here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleProperties {
    pub stroke: StrokeProperties,
    pub fill: FillProperties,
    pub text: TextProperties,
    pub point: PointProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

/// Copies `src` into `dst` when `src` is present.
fn overwrite<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
    if let Some(value) = src {
        *dst = Some(value.clone());
    }
}

impl StyleProperties {
    /// Overwrites the fields present in `partial`; absent fields are kept.
    pub fn merge(&mut self, partial: &StyleProperties) {
        overwrite(&mut self.stroke.color, &partial.stroke.color);
        overwrite(&mut self.stroke.width, &partial.stroke.width);

        overwrite(&mut self.fill.color1, &partial.fill.color1);
        overwrite(&mut self.fill.color2, &partial.fill.color2);
        overwrite(&mut self.fill.pattern, &partial.fill.pattern);

        overwrite(&mut self.text.value, &partial.text.value);
        overwrite(&mut self.text.color, &partial.text.color);
        overwrite(&mut self.text.size, &partial.text.size);
        overwrite(&mut self.text.font, &partial.text.font);
        overwrite(&mut self.text.offset_x, &partial.text.offset_x);
        overwrite(&mut self.text.offset_y, &partial.text.offset_y);
        overwrite(&mut self.text.alignment, &partial.text.alignment);

        overwrite(&mut self.point.icon, &partial.point.icon);
        overwrite(&mut self.point.size, &partial.point.size);
        overwrite(&mut self.point.color, &partial.point.color);

        overwrite(&mut self.z_index, &partial.z_index);
    }

    pub fn merged(&self, partial: &StyleProperties) -> StyleProperties {
        let mut out = self.clone();
        out.merge(partial);
        out
    }

    pub fn is_empty(&self) -> bool {
        *self == StyleProperties::default()
    }

    /// Text to draw, if any. Blank values count as no text.
    pub fn text_value(&self) -> Option<&str> {
        self.text
            .value
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }

    // Builder-style helpers, mostly used by tests and sample data.

    pub fn with_stroke(mut self, color: &str, width: f64) -> Self {
        self.stroke.color = Some(color.to_string());
        self.stroke.width = Some(width);
        self
    }

    pub fn with_fill(mut self, color1: &str, color2: &str, pattern: FillPattern) -> Self {
        self.fill.color1 = Some(color1.to_string());
        self.fill.color2 = Some(color2.to_string());
        self.fill.pattern = Some(pattern);
        self
    }

    pub fn with_point(mut self, icon: &str, size: f64, color: &str) -> Self {
        self.point.icon = Some(icon.to_string());
        self.point.size = Some(size);
        self.point.color = Some(color.to_string());
        self
    }

    pub fn with_text(mut self, value: &str) -> Self {
        self.text.value = Some(value.to_string());
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }
}

/// A user attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(f64),
    String(String),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Number(n) => write!(f, "{}", n),
            PropertyValue::String(s) => f.write_str(s),
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Number(f64::from(value))
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

/// User attributes keyed by name, kept sorted for stable attribute tables.
pub type DataProperties = BTreeMap<String, PropertyValue>;

pub fn is_reserved_key(key: &str) -> bool {
    key.starts_with(RESERVED_PREFIX)
}
