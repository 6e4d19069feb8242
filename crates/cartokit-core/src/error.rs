//! Error handling for Cartokit
//!
//! Provides error types for the layers of the editing core:
//! - Style errors (style building, colour parsing, icon loading)
//! - Render errors (draw surfaces, deferred symbol draws)
//! - History errors (operations that could not capture their snapshots)
//!
//! Render paths never propagate these to the UI; they log them and degrade to a
//! best-effort result. History errors are raised before an operation is
//! registered, never during undo or redo.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Style error type
///
/// Represents problems met while turning style properties into a drawable style.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleError {
    /// The geometry kind has no style branch
    #[error("Unsupported geometry kind: {kind}")]
    UnsupportedGeometry {
        /// The geometry kind name.
        kind: String,
    },

    /// A colour string could not be parsed
    #[error("Invalid color '{value}'")]
    InvalidColor {
        /// The rejected colour string.
        value: String,
    },

    /// An icon could not be produced by its loader
    #[error("Icon '{icon}' unavailable: {reason}")]
    IconUnavailable {
        /// The icon name.
        icon: String,
        /// The reason the icon could not be loaded.
        reason: String,
    },
}

/// Render error type
///
/// Represents failures of the drawing surface or of a deferred draw.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A surface with the requested dimensions could not be allocated
    #[error("Cannot allocate a {width}x{height} surface")]
    SurfaceAllocation {
        /// The requested width in pixels.
        width: u32,
        /// The requested height in pixels.
        height: u32,
    },

    /// The target surface was dropped before a deferred draw ran
    #[error("Render target disposed before drawing")]
    TargetDisposed,

    /// Image encoding failed
    #[error("Image encoding failed: {reason}")]
    Encoding {
        /// The reason the encoding failed.
        reason: String,
    },
}

/// History error type
///
/// Raised when a reversible operation cannot capture its before/after state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    /// The feature has no geometry to snapshot
    #[error("Feature {feature_id} has no geometry")]
    MissingGeometry {
        /// The feature id.
        feature_id: String,
    },

    /// The operation would not change anything
    #[error("Operation '{operation}' has nothing to record")]
    EmptyOperation {
        /// The operation description.
        operation: String,
    },

    /// The referenced feature is not part of the layer
    #[error("Feature {feature_id} not found")]
    UnknownFeature {
        /// The feature id.
        feature_id: String,
    },

    /// The referenced legend item does not exist
    #[error("Legend item {item_id} not found")]
    UnknownLegendItem {
        /// The legend item id.
        item_id: String,
    },
}

/// Main error type for Cartokit
///
/// Umbrella error type that can represent any error in the system.
#[derive(Error, Debug)]
pub enum Error {
    /// Style error
    #[error(transparent)]
    Style(#[from] StyleError),

    /// Render error
    #[error(transparent)]
    Render(#[from] RenderError),

    /// History error
    #[error(transparent)]
    History(#[from] HistoryError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a style error
    pub fn is_style_error(&self) -> bool {
        matches!(self, Error::Style(_))
    }

    /// Check if this is a render error
    pub fn is_render_error(&self) -> bool {
        matches!(self, Error::Render(_))
    }

    /// Check if this is a history error
    pub fn is_history_error(&self) -> bool {
        matches!(self, Error::History(_))
    }
}

/// Result type for Cartokit operations
pub type Result<T> = std::result::Result<T, Error>;
