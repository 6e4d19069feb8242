//! Undo/redo stacks, one per editing context.

use super::task::Task;
use cartokit_settings::HistorySettings;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Identifies an independent undo/redo stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HistoryKey {
    /// The main map editing surface.
    Map,
    /// The layout/export preview surface.
    Layout,
    Named(String),
}

impl HistoryKey {
    pub const MAP: &'static str = "main-map-history";
    pub const LAYOUT: &'static str = "layout-history";

    pub fn as_str(&self) -> &str {
        match self {
            HistoryKey::Map => Self::MAP,
            HistoryKey::Layout => Self::LAYOUT,
            HistoryKey::Named(name) => name,
        }
    }
}

impl From<&str> for HistoryKey {
    fn from(value: &str) -> Self {
        match value {
            Self::MAP => HistoryKey::Map,
            Self::LAYOUT => HistoryKey::Layout,
            other => HistoryKey::Named(other.to_string()),
        }
    }
}

impl From<String> for HistoryKey {
    fn from(value: String) -> Self {
        HistoryKey::from(value.as_str())
    }
}

impl From<&HistoryKey> for HistoryKey {
    fn from(value: &HistoryKey) -> Self {
        value.clone()
    }
}

impl fmt::Display for HistoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Applied operations of one context. Everything below `cursor` is live;
/// everything from `cursor` on has been undone and can be redone.
#[derive(Default)]
struct HistoryStack {
    tasks: Vec<Box<dyn Task>>,
    cursor: usize,
}

impl HistoryStack {
    fn push(&mut self, task: Box<dyn Task>, max_depth: usize) -> usize {
        let pruned = self.tasks.len() - self.cursor;
        self.tasks.truncate(self.cursor);
        self.tasks.push(task);
        if self.tasks.len() > max_depth {
            let excess = self.tasks.len() - max_depth;
            self.tasks.drain(..excess);
        }
        self.cursor = self.tasks.len();
        pruned
    }
}

/// Undo/redo history across editing contexts.
///
/// Operations are applied by the caller before [`register`](History::register);
/// the history only replays them.
pub struct History {
    stacks: HashMap<HistoryKey, HistoryStack>,
    max_depth: usize,
}

impl History {
    pub const DEFAULT_DEPTH: usize = 100;

    pub fn new() -> Self {
        Self::with_depth(Self::DEFAULT_DEPTH)
    }

    /// Creates a history keeping at most `max_depth` operations per context.
    pub fn with_depth(max_depth: usize) -> Self {
        Self {
            stacks: HashMap::new(),
            max_depth: max_depth.max(1),
        }
    }

    pub fn from_settings(settings: &HistorySettings) -> Self {
        Self::with_depth(settings.max_depth)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Records an already applied operation, discarding any redo branch.
    pub fn register(&mut self, key: impl Into<HistoryKey>, task: impl Task + 'static) {
        let key = key.into();
        let description = task.description().to_string();
        let max_depth = self.max_depth;
        let stack = self.stacks.entry(key.clone()).or_default();
        let pruned = stack.push(Box::new(task), max_depth);
        debug!(
            "[{}] registered '{}' ({} undoable, {} redo entries pruned)",
            key, description, stack.cursor, pruned
        );
    }

    /// Reverts the most recent live operation. Returns false at the bottom
    /// of the stack.
    pub fn undo(&mut self, key: impl Into<HistoryKey>) -> bool {
        let key = key.into();
        let Some(stack) = self.stacks.get_mut(&key) else {
            return false;
        };
        if stack.cursor == 0 {
            return false;
        }
        stack.cursor -= 1;
        let task = &mut stack.tasks[stack.cursor];
        task.undo();
        debug!("[{}] undo '{}'", key, task.description());
        true
    }

    /// Re-applies the most recently undone operation. Returns false when
    /// nothing is left to redo.
    pub fn redo(&mut self, key: impl Into<HistoryKey>) -> bool {
        let key = key.into();
        let Some(stack) = self.stacks.get_mut(&key) else {
            return false;
        };
        let Some(task) = stack.tasks.get_mut(stack.cursor) else {
            return false;
        };
        task.apply();
        debug!("[{}] redo '{}'", key, task.description());
        stack.cursor += 1;
        true
    }

    pub fn can_undo(&self, key: impl Into<HistoryKey>) -> bool {
        self.undo_count(key) > 0
    }

    pub fn can_redo(&self, key: impl Into<HistoryKey>) -> bool {
        self.redo_count(key) > 0
    }

    pub fn undo_count(&self, key: impl Into<HistoryKey>) -> usize {
        self.stacks.get(&key.into()).map_or(0, |stack| stack.cursor)
    }

    pub fn redo_count(&self, key: impl Into<HistoryKey>) -> usize {
        self.stacks
            .get(&key.into())
            .map_or(0, |stack| stack.tasks.len() - stack.cursor)
    }

    /// Description of the operation the next undo would revert.
    pub fn undo_description(&self, key: impl Into<HistoryKey>) -> Option<&str> {
        let stack = self.stacks.get(&key.into())?;
        let index = stack.cursor.checked_sub(1)?;
        stack.tasks.get(index).map(|task| task.description())
    }

    /// Description of the operation the next redo would re-apply.
    pub fn redo_description(&self, key: impl Into<HistoryKey>) -> Option<&str> {
        let stack = self.stacks.get(&key.into())?;
        stack.tasks.get(stack.cursor).map(|task| task.description())
    }

    /// Drops every operation of one context.
    pub fn clear(&mut self, key: impl Into<HistoryKey>) {
        self.stacks.remove(&key.into());
    }

    pub fn clear_all(&mut self) {
        self.stacks.clear();
    }

    /// Contexts that currently hold at least one operation.
    pub fn keys(&self) -> Vec<HistoryKey> {
        let mut keys: Vec<HistoryKey> = self
            .stacks
            .iter()
            .filter(|(_, stack)| !stack.tasks.is_empty())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        keys
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for key in self.keys() {
            map.entry(
                &key.as_str(),
                &(self.undo_count(&key), self.redo_count(&key)),
            );
        }
        map.finish()
    }
}
