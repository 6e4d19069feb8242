//! # Cartokit Core
//!
//! Core types shared by every Cartokit crate: the error taxonomy and the
//! single-threaded shared-state aliases used by the editing model.

pub mod error;
pub mod types;

pub use error::{Error, HistoryError, RenderError, Result, StyleError};

pub use types::{shared, OnceCallback, OnceCallbackList, Shared};
