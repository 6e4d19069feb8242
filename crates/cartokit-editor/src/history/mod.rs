//! Reversible edits and the per-context undo/redo history.
//!
//! A UI action mutates features, wraps the before/after state in a [`Task`]
//! and registers it under the active [`HistoryKey`]. Undo and redo only ever
//! touch that key's stack.

pub mod stack;
pub mod task;
pub mod tasks;

pub use stack::{History, HistoryKey};
pub use task::{BatchTask, Task};
pub use tasks::{
    AddFeaturesTask, AddLegendItemTask, DataChange, GeometryChange, RemoveFeaturesTask,
    RemoveLegendItemTask, StyleChange, UpdateDataTask, UpdateGeometriesTask, UpdateStyleTask,
};
